//! Path resolution for config and journal files.

use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::config::{default_config_path, read_config, VoyageConfig};

/// Resolve the config file path, checking VOYAGE_CONFIG env var first.
pub fn resolve_config_path() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("VOYAGE_CONFIG") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value));
        }
    }
    default_config_path()
}

/// Load the config file if one exists.
pub fn load_config() -> anyhow::Result<Option<VoyageConfig>> {
    let config_path = resolve_config_path()?;
    if !config_path.exists() {
        return Ok(None);
    }
    read_config(&config_path).map(Some)
}

/// Resolve the journal file path from CLI args or config.
pub fn resolve_journal_path(cli: &Cli, config: Option<&VoyageConfig>) -> anyhow::Result<String> {
    if let Some(path) = cli.journal.clone() {
        return Ok(path);
    }

    match config {
        Some(config) => Ok(config.journal.path.clone()),
        None => {
            let config_path = resolve_config_path()?;
            Err(anyhow::anyhow!(missing_config_message(&config_path)))
        }
    }
}

/// Error message when the journal file is missing.
pub fn missing_journal_message(path: &Path) -> String {
    format!(
        "No journal found at {}\n\nRun:\n  voyage init\n\nOr specify a journal path:\n  VOYAGE_PATH=/path/to/my.journal voyage init",
        path.display()
    )
}

/// Error message when the config file is missing.
pub fn missing_config_message(config_path: &Path) -> String {
    format!(
        "No journal configured at {}\n\nRun:\n  voyage init\n\nOr set VOYAGE_CONFIG to specify a different config location.",
        config_path.display()
    )
}
