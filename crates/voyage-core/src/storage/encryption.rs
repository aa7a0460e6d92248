//! Age passphrase encryption for journal files.
//!
//! Age derives the file key from the passphrase with scrypt, so no separate
//! KDF parameters are stored alongside the journal.

use std::io::{Read, Write};
use std::iter;

use age::secrecy::SecretString;

use crate::error::{Result, VoyageError};

/// Encrypt data using Age passphrase-based encryption.
///
/// # Examples
///
/// ```
/// use voyage_core::storage::encryption::encrypt;
///
/// let plaintext = b"log of the day";
/// let encrypted = encrypt(plaintext, "fair-winds-2026").unwrap();
/// assert_ne!(encrypted.as_slice(), plaintext);
/// ```
pub fn encrypt(data: &[u8], passphrase: &str) -> Result<Vec<u8>> {
    let encryptor =
        age::Encryptor::with_user_passphrase(SecretString::from(passphrase.to_string()));

    let mut encrypted = Vec::new();
    let mut writer = encryptor
        .wrap_output(&mut encrypted)
        .map_err(|e| VoyageError::Crypto(format!("Failed to create encryptor: {}", e)))?;

    writer
        .write_all(data)
        .map_err(|e| VoyageError::Crypto(format!("Encryption write failed: {}", e)))?;

    writer
        .finish()
        .map_err(|e| VoyageError::Crypto(format!("Encryption finish failed: {}", e)))?;

    Ok(encrypted)
}

/// Decrypt data produced by [`encrypt`].
///
/// # Errors
///
/// Returns `VoyageError::IncorrectPassphrase` when the passphrase does not
/// unlock the file, and `VoyageError::Crypto` for corrupt input.
///
/// # Examples
///
/// ```
/// use voyage_core::storage::encryption::{decrypt, encrypt};
///
/// let encrypted = encrypt(b"log of the day", "fair-winds-2026").unwrap();
/// let decrypted = decrypt(&encrypted, "fair-winds-2026").unwrap();
/// assert_eq!(decrypted.as_slice(), b"log of the day");
/// ```
pub fn decrypt(encrypted_data: &[u8], passphrase: &str) -> Result<Vec<u8>> {
    let decryptor = age::Decryptor::new(encrypted_data)
        .map_err(|e| VoyageError::Crypto(format!("Failed to create decryptor: {}", e)))?;

    let identity = age::scrypt::Identity::new(SecretString::from(passphrase.to_string()));
    let mut reader = decryptor
        .decrypt(iter::once(&identity as &dyn age::Identity))
        .map_err(|e| match e {
            age::DecryptError::NoMatchingKeys
            | age::DecryptError::DecryptionFailed
            | age::DecryptError::KeyDecryptionFailed => VoyageError::IncorrectPassphrase,
            _ => VoyageError::Crypto(format!("Decryption failed: {}", e)),
        })?;

    let mut decrypted = Vec::new();
    reader
        .read_to_end(&mut decrypted)
        .map_err(|e| VoyageError::Crypto(format!("Failed to read decrypted data: {}", e)))?;

    Ok(decrypted)
}
