//! Error types for tagbook.

use thiserror::Error;

/// Result type alias using tagbook's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for tagbook operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Authentication missing, expired, or rejected
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// HTTP/network request failed (non-success status, connection error)
    #[error("Request error: {0}")]
    Request(String),

    /// Remote call exceeded its bounded timeout
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Note not found in the local store
    #[error("Note not found: {0}")]
    NoteNotFound(String),

    /// Invalid input, rejected before any network call
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Local snapshot read/write failed (non-fatal for in-memory operation)
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Error::Timeout(e.to_string())
        } else {
            Error::Request(e.to_string())
        }
    }
}
