//! Passphrase handling and storage opening with retry logic.

use std::io::IsTerminal;
use std::path::Path;

use voyage_core::storage::AgeSqliteStorage;
use voyage_core::{StorageEngine, VoyageError};

use crate::errors::CliError;
use crate::helpers::prompt_passphrase;

use super::resolver::missing_journal_message;

const MAX_ATTEMPTS: u32 = 3;

const FORGOTTEN_HINT: &str = "Hint: If you forgot your passphrase, the journal cannot be recovered.\n      Backups use the same passphrase.";

/// Open the journal at `target`, prompting for the passphrase if needed.
///
/// `VOYAGE_PASSPHRASE` is tried first and gets a single attempt. An
/// interactive prompt allows three.
pub fn open_storage_with_retry(
    target: &str,
    no_input: bool,
) -> anyhow::Result<(AgeSqliteStorage, String)> {
    let interactive = std::io::stdin().is_terminal() && !no_input;
    let target_path = Path::new(target);

    let env_passphrase = std::env::var("VOYAGE_PASSPHRASE")
        .ok()
        .filter(|v| !v.trim().is_empty());
    if let Some(passphrase) = env_passphrase {
        return match AgeSqliteStorage::open(target_path, &passphrase) {
            Ok(storage) => Ok((storage, passphrase)),
            Err(VoyageError::IncorrectPassphrase) => {
                CliError::auth_failed("Incorrect passphrase.").exit()
            }
            Err(VoyageError::JournalFileNotFound) => Err(missing_journal(target_path)),
            Err(err) => Err(err.into()),
        };
    }

    let max_attempts = if interactive { MAX_ATTEMPTS } else { 1 };
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        let passphrase = prompt_passphrase(interactive)?;
        match AgeSqliteStorage::open(target_path, &passphrase) {
            Ok(storage) => return Ok((storage, passphrase)),
            Err(VoyageError::IncorrectPassphrase) => {
                let remaining = max_attempts.saturating_sub(attempts);
                if remaining == 0 {
                    CliError::auth_failed_with_hint(
                        "Too many failed passphrase attempts.",
                        FORGOTTEN_HINT,
                    )
                    .exit()
                }
                eprintln!(
                    "Incorrect passphrase. {} attempt{} remaining.",
                    remaining,
                    if remaining == 1 { "" } else { "s" }
                );
            }
            Err(VoyageError::JournalFileNotFound) => return Err(missing_journal(target_path)),
            Err(err) => return Err(err.into()),
        }
    }
}

fn missing_journal(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(missing_journal_message(path))
}
