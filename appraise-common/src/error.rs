//! Common error types for Appraise

use thiserror::Error;

/// Common result type for Appraise operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across Appraise crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid caller input (malformed identifier, overlong name, wrong family)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Task identifier already taken by another task
    #[error("Duplicate task identifier: {0}")]
    DuplicateTaskId(String),

    /// Stored value outside its closed label set
    #[error("Unknown {field} value: {value:?}")]
    UnknownLabel {
        field: &'static str,
        value: String,
    },
}

impl Error {
    pub(crate) fn unknown_label(field: &'static str, value: impl Into<String>) -> Self {
        Error::UnknownLabel {
            field,
            value: value.into(),
        }
    }
}
