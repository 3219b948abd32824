use thiserror::Error;
use tracing::warn;

/// Error types for the compute module
#[derive(Error, Debug)]
pub enum ComputeError {
    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Input that can never produce a result, e.g. a payment day outside
    /// the range of its frequency.
    #[error("{0}")]
    Validation(String),

    /// A referenced record does not exist
    #[error("{0}")]
    NotFound(String),

    /// The change would break a uniqueness rule, e.g. two sheets in one month
    #[error("{0}")]
    Conflict(String),

    /// Date arithmetic left the supported calendar range
    #[error("Date error: {0}")]
    Date(String),
}

impl ComputeError {
    pub fn validation(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(%message, "Validation failed");
        ComputeError::Validation(message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ComputeError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(%message, "Conflicting change rejected");
        ComputeError::Conflict(message)
    }
}

/// Type alias for Result with ComputeError
pub type Result<T> = std::result::Result<T, ComputeError>;
