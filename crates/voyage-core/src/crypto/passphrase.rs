//! Passphrase validation.

use crate::error::{Result, VoyageError};

/// Minimum passphrase length in characters.
const MIN_PASSPHRASE_LENGTH: usize = 8;

/// Validate that a passphrase meets minimum requirements.
///
/// The passphrase must not be blank and must be at least
/// eight characters long.
///
/// # Examples
///
/// ```
/// use voyage_core::crypto::validate_passphrase;
///
/// assert!(validate_passphrase("fair-winds-2026").is_ok());
/// assert!(validate_passphrase("short").is_err());
/// ```
pub fn validate_passphrase(passphrase: &str) -> Result<()> {
    if passphrase.trim().is_empty() {
        return Err(VoyageError::InvalidInput(
            "Passphrase cannot be empty".to_string(),
        ));
    }

    let length = passphrase.chars().count();
    if length < MIN_PASSPHRASE_LENGTH {
        return Err(VoyageError::InvalidInput(format!(
            "Passphrase must be at least {} characters (got {})",
            MIN_PASSPHRASE_LENGTH, length
        )));
    }

    Ok(())
}
