use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid identifier {value:?}: {reason}")]
    InvalidId { value: String, reason: String },

    #[error("invalid sequence hash {0:?}")]
    InvalidHash(String),

    #[error("invalid revision {0:?}")]
    InvalidRevision(String),

    #[error("manifest must be a JSON object, got {0}")]
    NotAnObject(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
