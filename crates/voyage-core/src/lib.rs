//! # Voyage Core
//!
//! Core library for Voyage, an encrypted travel journal for a sailing
//! itinerary.
//!
//! This crate provides the journal content model, storage abstractions and
//! data models independent of the CLI interface.
//!
//! ## Architecture
//!
//! - **content**: block-structured entry bodies (parse, serialize, preview, edit)
//! - **itinerary**: read-only stop and phase reference data
//! - **storage**: storage engine trait and the Age-encrypted SQLite backend
//! - **comments**: threading of flat comment lists
//! - **session**: the acting user passed to storage calls
//! - **crypto**: passphrase checks

pub mod comments;
pub mod content;
pub mod crypto;
pub mod error;
pub mod fs;
pub mod itinerary;
pub mod session;
pub mod storage;

pub use comments::comment_threads;
pub use error::{Result, VoyageError};
pub use session::Session;
pub use storage::StorageEngine;

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
