//! Application context for the Voyage CLI.
//!
//! Bundles the parsed CLI arguments with the lazily-loaded config file so
//! handlers don't re-read it or thread several parameters around.

use std::path::Path;

use chrono_tz::Tz;
use once_cell::unsync::OnceCell;
use tracing::{debug, warn};
use uuid::Uuid;

use voyage_core::itinerary::Itinerary;
use voyage_core::storage::AgeSqliteStorage;
use voyage_core::Session;

use crate::cli::Cli;
use crate::config::VoyageConfig;
use crate::errors::CliError;
use crate::ui::UiContext;

use super::passphrase::open_storage_with_retry;
use super::resolver::{load_config, resolve_journal_path};

/// Environment variable overriding the session user.
pub const USER_ENV: &str = "VOYAGE_USER";

/// Environment variable overriding the itinerary file.
pub const ITINERARY_ENV: &str = "VOYAGE_ITINERARY";

pub struct AppContext<'a> {
    cli: &'a Cli,
    config: OnceCell<Option<VoyageConfig>>,
}

impl<'a> AppContext<'a> {
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            config: OnceCell::new(),
        }
    }

    pub fn cli(&self) -> &Cli {
        self.cli
    }

    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    /// The config file, if one exists. Loaded once.
    pub fn config(&self) -> anyhow::Result<Option<&VoyageConfig>> {
        Ok(self.config.get_or_try_init(load_config)?.as_ref())
    }

    /// Build the UI context for a command's output flags.
    pub fn ui_context(&self, json: bool, format: Option<&str>) -> UiContext {
        UiContext::from_env(json, format)
    }

    /// Journal file path from `--journal`, `VOYAGE_PATH` or config.
    pub fn journal_path(&self) -> anyhow::Result<String> {
        resolve_journal_path(self.cli, self.config()?)
    }

    /// Configured editor override, if any.
    pub fn editor(&self) -> anyhow::Result<Option<&str>> {
        Ok(self
            .config()?
            .and_then(|config| config.ui.editor.as_deref()))
    }

    /// Display timezone. Unknown names fall back to UTC with a warning.
    pub fn timezone(&self) -> anyhow::Result<Option<Tz>> {
        let Some(name) = self
            .config()?
            .and_then(|config| config.ui.timezone.as_deref())
        else {
            return Ok(None);
        };
        match name.parse::<Tz>() {
            Ok(tz) => Ok(Some(tz)),
            Err(_) => {
                warn!(timezone = name, "unknown timezone in config, using UTC");
                Ok(None)
            }
        }
    }

    /// The acting user: `VOYAGE_USER` first, then `[session]` in config.
    pub fn session(&self) -> anyhow::Result<Session> {
        let config = self.config()?;
        let config_user = config
            .map(|c| parse_user_id(&c.session.user_id, "config session.user_id"))
            .transpose()?;

        let user_id = match std::env::var(USER_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
        {
            Some(value) => parse_user_id(&value, USER_ENV)?,
            None => config_user.ok_or_else(|| {
                CliError::not_found(
                    "No session user configured.",
                    "Hint: Run `voyage init` or set VOYAGE_USER=<uuid>.",
                )
            })?,
        };

        // The configured display name belongs to the configured user only.
        let display_name = config
            .filter(|_| config_user == Some(user_id))
            .and_then(|c| c.session.display_name.clone());

        let session = Session::new(user_id);
        Ok(match display_name {
            Some(name) => session.with_display_name(name)?,
            None => session,
        })
    }

    /// The configured itinerary. Errors when none is configured.
    pub fn itinerary(&self) -> anyhow::Result<Itinerary> {
        match self.itinerary_path()? {
            Some(path) => {
                debug!(path = %path, "loading itinerary");
                Ok(Itinerary::load(Path::new(&path))?)
            }
            None => Err(CliError::not_found(
                "No itinerary configured.",
                "Hint: Run `voyage init --itinerary <stops.json>` or set VOYAGE_ITINERARY.",
            )
            .into()),
        }
    }

    /// The itinerary when available, for decorating output with stop names.
    pub fn itinerary_if_configured(&self) -> Option<Itinerary> {
        match self.itinerary_path() {
            Ok(Some(path)) => match Itinerary::load(Path::new(&path)) {
                Ok(itinerary) => Some(itinerary),
                Err(err) => {
                    warn!(path = %path, error = %err, "could not load itinerary");
                    None
                }
            },
            _ => None,
        }
    }

    /// Reject stop IDs missing from the configured itinerary.
    ///
    /// Without an itinerary any ID is accepted.
    pub fn require_stop(&self, stop_id: i64) -> anyhow::Result<()> {
        match self.itinerary_if_configured() {
            Some(itinerary) if itinerary.stop(stop_id).is_none() => Err(CliError::not_found(
                format!("Stop not found: {}", stop_id),
                "Hint: Run `voyage stops` to list stop IDs.",
            )
            .into()),
            _ => Ok(()),
        }
    }

    fn itinerary_path(&self) -> anyhow::Result<Option<String>> {
        if let Ok(value) = std::env::var(ITINERARY_ENV) {
            if !value.trim().is_empty() {
                return Ok(Some(value));
            }
        }
        Ok(self
            .config()?
            .and_then(|config| config.itinerary.path.clone()))
    }

    /// Open storage with passphrase handling and retry logic.
    pub fn open_storage(&self, no_input: bool) -> anyhow::Result<(AgeSqliteStorage, String)> {
        let target = self.journal_path()?;
        open_storage_with_retry(&target, no_input)
    }
}

fn parse_user_id(value: &str, source: &str) -> anyhow::Result<Uuid> {
    Uuid::parse_str(value.trim()).map_err(|e| {
        CliError::invalid_input(format!("Invalid user id in {}: {}", source, e)).into()
    })
}
