//! Cryptographic helpers for Voyage.
//!
//! Journal files are encrypted at rest with Age passphrase encryption
//! (scrypt KDF). This module holds the checks applied to passphrases before
//! they reach the encryptor.

pub mod passphrase;

pub use passphrase::validate_passphrase;
