use party_types::{PartyError, PartyStatus};
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage-layer errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    /// Compare-and-set on the party status lost.
    #[error("stale status: expected {expected}, found {found}")]
    StaleStatus {
        expected: PartyStatus,
        found: PartyStatus,
    },

    /// A domain rule evaluated inside the atomic unit refused the write.
    #[error(transparent)]
    Rejected(#[from] PartyError),

    #[error("backend error: {0}")]
    Backend(String),
}

impl From<StorageError> for PartyError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(what) => PartyError::NotFound(what),
            StorageError::Conflict(what) => PartyError::Conflict(what),
            StorageError::StaleStatus { expected, found } => PartyError::PreconditionFailed(
                format!("party is {found}, expected {expected}"),
            ),
            StorageError::Rejected(inner) => inner,
            StorageError::Backend(msg) => PartyError::Storage(msg),
        }
    }
}
