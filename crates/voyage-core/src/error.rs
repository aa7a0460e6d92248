//! Error types for Voyage core operations.
//!
//! Errors are descriptive at the core level; the CLI layer maps these
//! to user-friendly messages and exit codes.

use thiserror::Error;
use uuid::Uuid;

/// Result type alias for Voyage operations.
pub type Result<T> = std::result::Result<T, VoyageError>;

/// Core error type for Voyage operations.
#[derive(Debug, Error)]
pub enum VoyageError {
    /// Incorrect passphrase during decryption
    #[error("Incorrect passphrase")]
    IncorrectPassphrase,

    /// Journal file not found
    #[error("Journal file not found")]
    JournalFileNotFound,

    /// Encryption or decryption error
    #[error("Encryption error: {0}")]
    Crypto(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Storage backend error (generic)
    #[error("Storage error: {0}")]
    Storage(String),

    /// SQLite-specific storage error
    #[error("SQLite error: {source}")]
    Sqlite {
        #[from]
        source: rusqlite::Error,
    },

    /// Journal entry not found by ID
    #[error("Journal entry not found: {0}")]
    JournalNotFound(Uuid),

    /// Generic resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// The session user does not own the resource
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O error
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    /// Generic error (fallback)
    #[error("{0}")]
    Other(String),
}
