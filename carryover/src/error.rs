use std::path::PathBuf;

use thiserror::Error;

/// Error types for reconciliation, persistence and auditing
#[derive(Error, Debug)]
pub enum CarryError {
    /// Reading or writing a file failed
    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A translation table could not be serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// A persisted table exists but cannot be parsed as a whole
    #[error("malformed translation table '{document}': {reason}")]
    MalformedTable { document: String, reason: String },
    /// A document name that cannot be mapped onto a record file
    #[error("invalid document name: {0:?}")]
    InvalidDocumentName(String),
}

impl CarryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CarryError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for carryover operations
pub type CarryResult<T> = Result<T, CarryError>;
