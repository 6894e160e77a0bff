//! Common error types for Musicboard

use thiserror::Error;

use crate::validation::ValidationError;

/// Common result type for Musicboard operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across Musicboard services
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// User input rejected before any store write
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Uniqueness violation (e.g. username already taken)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Caller is not the owner of the resource
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(feature = "sqlx")]
impl Error {
    /// Map a unique-constraint violation to `Conflict`, leaving other errors as `Database`
    pub fn from_unique_violation(err: sqlx::Error, what: &str) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Error::Conflict(format!("{} already exists", what))
            }
            _ => Error::Database(err),
        }
    }
}
