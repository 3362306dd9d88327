//! Version control for strand projects.
//!
//! Each project directory is its own repository. This crate defines the
//! [`VersionControl`] trait the persistence layer programs against and a
//! git implementation built on libgit2.
//!
//! # Operations
//!
//! - `initialize` / `is_initialized` -- repository setup
//! - `commit` -- stage everything under the root and record a revision
//! - `log` -- history, newest first
//! - `read_at_revision` -- historical file content, working tree untouched

pub mod error;
pub mod git;
pub mod traits;

pub use error::{Result, VcsError};
pub use git::{GitAuthor, GitBackend};
pub use traits::VersionControl;
