//! Error types for the sqlx backend.

use thiserror::Error;

/// Errors raised while setting up a backend.
#[derive(Debug, Error)]
pub enum SqlxBackendError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The tokio runtime for blocking execution could not be built.
    #[error("runtime error: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Result type alias for backend setup.
pub type Result<T> = std::result::Result<T, SqlxBackendError>;
