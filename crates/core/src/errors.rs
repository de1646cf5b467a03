//! Core error types for the quote sync engine.
//!
//! Transport-specific errors (HTTP, file system) are converted into these
//! variants at the boundary so callers only deal with one taxonomy.

use thiserror::Error;

use crate::quotes::Quote;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the sync engine.
#[derive(Error, Debug)]
pub enum Error {
    /// The remote collection could not be fetched (network, timeout, non-2xx).
    #[error("Remote service unavailable: {0}")]
    RemoteUnavailable(String),

    /// A single unsynced quote was rejected or could not be delivered.
    #[error("Failed to push quote \"{}\": {cause}", quote.text)]
    PushFailed { quote: Box<Quote>, cause: String },

    /// The durable store rejected a write.
    #[error("Failed to persist quotes: {0}")]
    PersistenceFailed(String),

    /// A caller-supplied import payload was not an array of records.
    #[error("Malformed import payload: {0}")]
    MalformedImport(String),

    #[error("Input validation failed: {0}")]
    Validation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a push failure for the given quote.
    pub fn push_failed(quote: &Quote, cause: impl Into<String>) -> Self {
        Self::PushFailed {
            quote: Box::new(quote.clone()),
            cause: cause.into(),
        }
    }

    /// Create a remote unavailable error.
    pub fn remote_unavailable(message: impl Into<String>) -> Self {
        Self::RemoteUnavailable(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
