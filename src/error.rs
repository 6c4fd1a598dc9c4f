//! Error types for docstore-sessions.

use thiserror::Error;

/// Main error type for session store operations.
#[derive(Error, Debug)]
pub enum SessionStoreError {
    /// The operating system random source could not produce bytes.
    #[error("secure random source unavailable: {0}")]
    Randomness(String),

    /// Stored payload bytes are not in a recognized format.
    #[error("payload deserialization failed: {0}")]
    Deserialization(String),

    /// Payload could not be encoded for storage.
    #[error("payload serialization failed: {0}")]
    Serialization(String),

    /// The backing repository failed a lookup or delete.
    #[error("repository error: {0}")]
    Repository(String),

    /// No record is stored under the given id.
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// Identifier contains characters outside the URL-safe alphabet.
    #[error("invalid session id: {0:?}")]
    InvalidSessionId(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON document error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal lock was poisoned.
    #[error("internal lock poisoned")]
    LockPoisoned,
}

/// Convenience Result type for session store operations.
pub type Result<T> = std::result::Result<T, SessionStoreError>;
