//! Library error types.

use thiserror::Error;

/// Errors produced while building or executing queries.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("connection pool is closed")]
    PoolNotReady,

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("query failed: {0}")]
    Query(#[from] sqlx::Error),
}

/// Result type alias using GridError.
pub type GridResult<T> = Result<T, GridError>;
