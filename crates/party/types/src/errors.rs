//! Error types for party operations

use thiserror::Error;

/// Errors that can occur in party operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PartyError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("party is full: at most {max} members")]
    CapacityExceeded { max: u32 },

    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("candidate generator failed: {0}")]
    Generator(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl PartyError {
    /// Whether this is the expected outcome of swiping the same candidate twice.
    ///
    /// Callers should treat it as a no-op success from the actor's point of view.
    pub fn is_duplicate_swipe(&self) -> bool {
        matches!(self, PartyError::Conflict(msg) if msg.starts_with(DUPLICATE_SWIPE))
    }
}

/// Message prefix used for duplicate-swipe conflicts.
pub const DUPLICATE_SWIPE: &str = "duplicate swipe";

/// Result type alias for party operations
pub type PartyResult<T> = Result<T, PartyError>;
