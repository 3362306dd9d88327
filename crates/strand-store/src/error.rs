use std::io;
use std::path::{Path, PathBuf};

use strand_types::SequenceHash;

/// Errors from filesystem and sequence store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The file or directory does not exist.
    #[error("not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// No sequence is stored under this hash.
    #[error("sequence not found: {0}")]
    SequenceNotFound(SequenceHash),

    /// Any other OS-level failure.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A file that should hold text is not valid UTF-8.
    #[error("file {} is not valid UTF-8", path.display())]
    NotUtf8 { path: PathBuf },
}

impl StoreError {
    /// Classify an I/O error, splitting "not found" from everything else.
    pub fn from_io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    /// Returns `true` if this is a `NotFound` error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::SequenceNotFound(_))
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
