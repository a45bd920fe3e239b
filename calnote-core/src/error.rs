//! Error types for calnote.

use thiserror::Error;

/// Errors that can occur in calnote operations.
#[derive(Error, Debug)]
pub enum CalNoteError {
    #[error("Not signed in to the remote calendar")]
    Unauthenticated,

    #[error("Remote sync failed: {0}")]
    SyncFailed(String),

    #[error("Invalid item: {0}")]
    ValidationFailed(String),

    #[error("Item not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CalNoteError {
    /// True for failures a later sync attempt may recover from.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CalNoteError::SyncFailed(_) | CalNoteError::Unauthenticated
        )
    }
}

impl From<serde_json::Error> for CalNoteError {
    fn from(e: serde_json::Error) -> Self {
        CalNoteError::Serialization(e.to_string())
    }
}

/// Result type alias for calnote operations.
pub type CalNoteResult<T> = Result<T, CalNoteError>;
