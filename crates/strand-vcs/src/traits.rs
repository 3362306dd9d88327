//! The [`VersionControl`] trait defining the repository interface.
//!
//! Any backend implements this trait to give each project directory its own
//! history. The persistence layer only ever talks to this trait.

use std::path::Path;

use async_trait::async_trait;
use strand_types::{Commit, Revision};

use crate::error::Result;

/// Per-directory version control.
///
/// Every method takes the repository root explicitly; implementations hold
/// no per-repository state between calls, so one backend instance serves
/// every project.
#[async_trait]
pub trait VersionControl: Send + Sync {
    /// Create a new, empty repository at `path`.
    ///
    /// Fails with `AlreadyInitialized` if `path` already holds one.
    async fn initialize(&self, path: &Path) -> Result<()>;

    /// Returns `true` if `path` is the root of a repository.
    async fn is_initialized(&self, path: &Path) -> Result<bool>;

    /// Stage every change under `path` (additions, modifications and
    /// deletions) and record one commit.
    ///
    /// A commit with nothing staged is allowed and still produces a new
    /// revision.
    async fn commit(&self, path: &Path, message: &str) -> Result<Revision>;

    /// History of the repository, newest first.
    ///
    /// An initialized repository with no commits yields an empty list;
    /// a missing repository fails with `NotInitialized`.
    async fn log(&self, path: &Path) -> Result<Vec<Commit>>;

    /// Content of `file` (relative to the repository root) as of `revision`.
    ///
    /// Never touches the working tree.
    async fn read_at_revision(&self, path: &Path, file: &Path, revision: &Revision)
        -> Result<String>;
}
