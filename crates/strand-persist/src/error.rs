use std::fmt;
use std::path::PathBuf;

use strand_store::StoreError;
use strand_vcs::VcsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    /// Entity, sequence, or revision absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// `create` on an identifier that is already present.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// The validator rejected the manifest.
    #[error("invalid model for {0}")]
    InvalidModel(String),

    /// A manifest on disk could not be parsed.
    #[error("malformed manifest at {}: {reason}", path.display())]
    MalformedContent { path: PathBuf, reason: String },

    #[error("filesystem error: {0}")]
    FileSystem(#[source] StoreError),

    #[error("version control error: {0}")]
    Vcs(#[source] VcsError),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<StoreError> for PersistError {
    fn from(err: StoreError) -> Self {
        if err.is_not_found() {
            Self::NotFound(err.to_string())
        } else {
            Self::FileSystem(err)
        }
    }
}

impl From<VcsError> for PersistError {
    fn from(err: VcsError) -> Self {
        if err.is_not_found() {
            Self::NotFound(err.to_string())
        } else {
            Self::Vcs(err)
        }
    }
}

/// Coarse classification of a [`PersistError`] for callers that translate
/// failures into protocol status codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    InvalidModel,
    MalformedContent,
    FileSystem,
    VersionControl,
    Configuration,
}

impl ErrorKind {
    /// HTTP status for this kind. A missing entity on a read is "no
    /// content", on a write it is "not found".
    pub fn http_status(self, read: bool) -> u16 {
        match self {
            Self::NotFound if read => 204,
            Self::NotFound => 404,
            Self::AlreadyExists | Self::InvalidModel => 400,
            Self::MalformedContent
            | Self::FileSystem
            | Self::VersionControl
            | Self::Configuration => 500,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotFound => "not_found",
            Self::AlreadyExists => "already_exists",
            Self::InvalidModel => "invalid_model",
            Self::MalformedContent => "malformed_content",
            Self::FileSystem => "file_system",
            Self::VersionControl => "version_control",
            Self::Configuration => "configuration",
        };
        f.write_str(name)
    }
}

impl PersistError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Self::InvalidModel(_) => ErrorKind::InvalidModel,
            Self::MalformedContent { .. } => ErrorKind::MalformedContent,
            Self::FileSystem(_) => ErrorKind::FileSystem,
            Self::Vcs(_) => ErrorKind::VersionControl,
            Self::Config(_) => ErrorKind::Configuration,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

pub type PersistResult<T> = Result<T, PersistError>;
