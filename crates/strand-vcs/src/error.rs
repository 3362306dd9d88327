//! Error types for version control operations.

use std::path::PathBuf;

use strand_types::{Revision, TypeError};
use thiserror::Error;

/// Errors that can occur during version control operations.
#[derive(Debug, Error)]
pub enum VcsError {
    /// No repository exists at the given path.
    #[error("no repository at {}", path.display())]
    NotInitialized { path: PathBuf },

    /// A repository already exists at the given path.
    #[error("repository already exists at {}", path.display())]
    AlreadyInitialized { path: PathBuf },

    /// The revision is malformed or not part of the repository.
    #[error("revision not found: {revision}")]
    RevisionNotFound { revision: String },

    /// The file did not exist at the requested revision.
    #[error("{} not found at revision {revision}", file.display())]
    FileNotFound { revision: Revision, file: PathBuf },

    /// Historical content is not valid UTF-8.
    #[error("{} at revision {revision} is not valid UTF-8", file.display())]
    InvalidContent { revision: Revision, file: PathBuf },

    /// The backend produced an identifier that is not a valid revision.
    #[error("invalid revision: {0}")]
    InvalidRevision(#[from] TypeError),

    /// Failure reported by the git backend.
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    /// The blocking task running the backend call panicked or was cancelled.
    #[error("background task failed: {0}")]
    Task(String),
}

impl VcsError {
    /// Returns `true` for every variant that means "nothing there":
    /// missing repository, unknown revision, or file absent at the revision.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotInitialized { .. } | Self::RevisionNotFound { .. } | Self::FileNotFound { .. }
        )
    }
}

/// Convenience type alias for version control operations.
pub type Result<T> = std::result::Result<T, VcsError>;
