use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use dialoguer::{theme::ColorfulTheme, Completion, FuzzySelect, Input, Select};
use tracing::{debug, info};
use uuid::Uuid;

use voyage_core::itinerary::Itinerary;
use voyage_core::storage::{AgeSqliteStorage, StorageEngine};
use voyage_core::{Session, VERSION};

use crate::app::{resolve_config_path, AppContext};
use crate::cli::InitArgs;
use crate::config::{default_journal_path, write_config, VoyageConfig};
use crate::helpers::{parse_timezone, prompt_init_passphrase};
use crate::ui::theme::{styled, styles};
use crate::ui::{badge, hint, print, Badge, OutputMode, UiContext};

const TOTAL_STEPS: usize = 5;

/// Print a step indicator for the wizard flow.
fn print_step(ctx: &UiContext, step: usize, title: &str, detail: Option<&str>) {
    if !ctx.mode.is_pretty() {
        return;
    }
    let progress = styled(&format!("{}/{}", step, TOTAL_STEPS), styles::dim(), ctx.color);
    println!("{}  {}", progress, styled(title, styles::bold(), ctx.color));
    if let Some(text) = detail {
        println!("    {}", styled(text, styles::dim(), ctx.color));
    }
}

fn timezone_options() -> Vec<String> {
    let mut zones: Vec<String> = chrono_tz::TZ_VARIANTS
        .iter()
        .map(|tz| tz.to_string())
        .filter(|tz| tz != "UTC")
        .collect();
    zones.sort();
    zones.insert(0, "UTC".to_string());
    zones.insert(0, "Auto (system)".to_string());
    zones
}

fn command_exists(cmd: &str) -> bool {
    std::process::Command::new("sh")
        .arg("-c")
        .arg(format!("command -v {} >/dev/null 2>&1", cmd))
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

fn available_editors() -> Vec<String> {
    let mut editors = Vec::new();
    if let Ok(editor) = std::env::var("EDITOR") {
        if editor
            .split_whitespace()
            .next()
            .is_some_and(command_exists)
        {
            editors.push(editor);
        }
    }
    for candidate in ["nano", "vim", "nvim", "vi", "emacs", "hx", "micro"] {
        if command_exists(candidate) && !editors.iter().any(|e| e == candidate) {
            editors.push(candidate.to_string());
        }
    }
    editors
}

/// Tab completion for file paths in the wizard, with `~` expansion.
struct PathCompletion;

impl PathCompletion {
    fn expand_tilde(input: &str) -> String {
        let Ok(home) = std::env::var("HOME") else {
            return input.to_string();
        };
        match input.strip_prefix('~') {
            Some("") => home,
            Some(rest) if rest.starts_with('/') => format!("{}{}", home, rest),
            _ => input.to_string(),
        }
    }
}

impl Completion for PathCompletion {
    fn get(&self, input: &str) -> Option<String> {
        if input.trim().is_empty() {
            return None;
        }
        if input == "~" {
            return Some("~/".to_string());
        }

        let separator = std::path::MAIN_SEPARATOR;
        let typed_dir = match input.rsplit_once(separator) {
            Some((dir, _)) => format!("{}{}", dir, separator),
            None => String::new(),
        };
        let expanded = Self::expand_tilde(input);
        let (search_dir, prefix) = match expanded.rsplit_once(separator) {
            Some((dir, file)) => (PathBuf::from(format!("{}{}", dir, separator)), file),
            None => (std::env::current_dir().ok()?, expanded.as_str()),
        };

        let mut matches: Vec<(bool, String)> = std::fs::read_dir(&search_dir)
            .ok()?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().to_string();
                if !name.starts_with(prefix) {
                    return None;
                }
                let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
                Some((is_dir, name))
            })
            .collect();
        // Directories first, then alphabetical.
        matches.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        let (is_dir, name) = matches.first()?;

        let mut suggestion = format!("{}{}", typed_dir, name);
        if *is_dir {
            suggestion.push(separator);
        }
        Some(suggestion)
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

pub fn handle_init(ctx: &AppContext, args: &InitArgs) -> anyhow::Result<()> {
    let interactive = std::io::stdin().is_terminal() && !args.no_input;
    let ui_ctx = ctx.ui_context(false, None);
    let theme = ColorfulTheme::default();

    if !ctx.quiet() && interactive && ui_ctx.mode.is_pretty() {
        println!(
            "{} \u{00B7} init  {}\n",
            styled("Voyage", styles::bold(), ui_ctx.color),
            styled(&format!("v{}", VERSION), styles::dim(), ui_ctx.color)
        );
    }

    // 1. Location
    let journal_path = match args.path.clone().or_else(|| ctx.cli().journal.clone()) {
        Some(value) => PathBuf::from(value),
        None if !interactive => default_journal_path()?,
        None => {
            print_step(
                &ui_ctx,
                1,
                "Choose location",
                Some("Where your encrypted journal file will live."),
            );
            let input: String = Input::with_theme(&theme)
                .with_prompt("Journal file location")
                .completion_with(&PathCompletion)
                .default(default_journal_path()?.to_string_lossy().to_string())
                .interact_text()?;
            println!();
            PathBuf::from(PathCompletion::expand_tilde(&input))
        }
    };

    // 2. Passphrase
    if interactive {
        print_step(
            &ui_ctx,
            2,
            "Create passphrase",
            Some("Used to encrypt and unlock your journal."),
        );
    }
    let passphrase = prompt_init_passphrase(interactive)?;
    if interactive {
        println!();
    }

    // 3. Profile and itinerary
    let mut display_name = args.display_name.clone();
    let mut itinerary_path = args.itinerary.clone();
    if interactive {
        print_step(
            &ui_ctx,
            3,
            "Crew and route",
            Some("Your name on comments, and the stops you will write about."),
        );
        if display_name.is_none() {
            let name: String = Input::with_theme(&theme)
                .with_prompt("Display name (optional)")
                .allow_empty(true)
                .interact_text()?;
            display_name = Some(name).filter(|n| !n.trim().is_empty());
        }
        if itinerary_path.is_none() {
            let path: String = Input::with_theme(&theme)
                .with_prompt("Itinerary JSON file (optional)")
                .completion_with(&PathCompletion)
                .allow_empty(true)
                .interact_text()?;
            itinerary_path =
                Some(PathCompletion::expand_tilde(&path)).filter(|p| !p.trim().is_empty());
        }
        println!();
    }

    // Existing configs keep their user so authored rows stay theirs.
    let user_id = match ctx.config()? {
        Some(existing) => existing.session.user_id.clone(),
        None => Uuid::new_v4().to_string(),
    };
    let mut session = Session::new(Uuid::parse_str(&user_id)?);
    if let Some(ref name) = display_name {
        session = session.with_display_name(name.as_str())?;
    }

    let itinerary_path = match itinerary_path {
        Some(path) => {
            let path = absolute(Path::new(&path));
            let itinerary = Itinerary::load(&path)?;
            debug!(stops = itinerary.stops.len(), "itinerary validated");
            Some(path)
        }
        None => None,
    };

    // 4. Preferences
    let mut timezone = args.timezone.clone();
    let mut editor = args.editor.clone();
    if interactive {
        print_step(
            &ui_ctx,
            4,
            "Preferences",
            Some("Timezone for timestamps and the editor for entries."),
        );
        if timezone.is_none() {
            let options = timezone_options();
            let selection = FuzzySelect::with_theme(&theme)
                .with_prompt("Timezone")
                .default(0)
                .items(&options)
                .interact()?;
            timezone = options
                .get(selection)
                .filter(|choice| choice.as_str() != "Auto (system)")
                .cloned();
        }
        if editor.is_none() {
            let choices = available_editors();
            if !choices.is_empty() {
                let selection = Select::with_theme(&theme)
                    .with_prompt("Default editor")
                    .default(0)
                    .items(&choices)
                    .interact()?;
                editor = choices.get(selection).cloned();
            }
        }
        println!();
    }
    let timezone = parse_timezone(timezone.as_deref().unwrap_or(""))?;

    // 5. Create
    if interactive {
        print_step(
            &ui_ctx,
            5,
            "Creating journal",
            Some("Writing the encrypted journal and config files."),
        );
    }
    if let Some(parent) = journal_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create journal directory {}: {}",
                parent.display(),
                e
            )
        })?;
    }

    let device_id = AgeSqliteStorage::create(&journal_path, &passphrase)?;
    let mut storage = AgeSqliteStorage::open(&journal_path, &passphrase)?;
    storage.upsert_profile(&session)?;
    storage.close(&passphrase)?;
    info!(path = %journal_path.display(), device = %device_id, "journal created");

    let config_path = resolve_config_path()?;
    let config = VoyageConfig::new(
        journal_path.clone(),
        user_id.clone(),
        display_name,
        itinerary_path,
        timezone,
        editor,
    );
    write_config(&config_path, &config)?;

    if ctx.quiet() {
        return Ok(());
    }
    match ui_ctx.mode {
        OutputMode::Pretty => {
            println!();
            print(
                &ui_ctx,
                &badge(
                    &ui_ctx,
                    Badge::Ok,
                    &format!("Journal created at {}", journal_path.display()),
                ),
            );
            print(
                &ui_ctx,
                &badge(
                    &ui_ctx,
                    Badge::Ok,
                    &format!("Config written to {}", config_path.display()),
                ),
            );
            println!();
            print(
                &ui_ctx,
                &hint(
                    &ui_ctx,
                    "voyage stops  \u{00B7}  voyage add <stop> --title <title>  \u{00B7}  voyage --help",
                ),
            );
        }
        OutputMode::Plain | OutputMode::Json => {
            println!("status=ok");
            println!("journal_path={}", journal_path.display());
            println!("config_path={}", config_path.display());
            println!("user_id={}", user_id);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timezone_options_start_with_auto_and_utc() {
        let options = timezone_options();
        assert_eq!(options[0], "Auto (system)");
        assert_eq!(options[1], "UTC");
        assert!(options.iter().any(|tz| tz == "Europe/Athens"));
        assert_eq!(options.iter().filter(|tz| *tz == "UTC").count(), 1);
    }

    #[test]
    fn test_path_completion_lists_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("route.json"), "{}").unwrap();
        std::fs::create_dir(dir.path().join("routes")).unwrap();

        let input = format!("{}/rou", dir.path().display());
        let suggestion = PathCompletion.get(&input).unwrap();
        assert_eq!(suggestion, format!("{}/routes/", dir.path().display()));
    }
}
