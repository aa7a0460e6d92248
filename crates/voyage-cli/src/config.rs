use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct VoyageConfig {
    pub journal: JournalSection,
    pub session: SessionSection,
    #[serde(default)]
    pub itinerary: ItinerarySection,
    #[serde(default)]
    pub ui: UiSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JournalSection {
    pub path: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionSection {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct ItinerarySection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct UiSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,
}

impl VoyageConfig {
    pub fn new(
        journal_path: PathBuf,
        user_id: String,
        display_name: Option<String>,
        itinerary_path: Option<PathBuf>,
        timezone: Option<String>,
        editor: Option<String>,
    ) -> Self {
        Self {
            journal: JournalSection {
                path: journal_path.to_string_lossy().to_string(),
            },
            session: SessionSection {
                user_id,
                display_name,
            },
            itinerary: ItinerarySection {
                path: itinerary_path.map(|p| p.to_string_lossy().to_string()),
            },
            ui: UiSection { timezone, editor },
        }
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_journal_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join("voyage.journal"))
}

pub fn read_config(path: &Path) -> anyhow::Result<VoyageConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

pub fn write_config(path: &Path, config: &VoyageConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create config directory {}: {}",
                parent.display(),
                e
            )
        })?;
    }
    let contents =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {}", e))?;
    std::fs::write(path, contents)
        .map_err(|e| anyhow::anyhow!("Failed to write config {}: {}", path.display(), e))?;
    Ok(())
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("voyage"));
        }
    }
    Ok(home_dir()?.join(".config").join("voyage"))
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_DATA_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("voyage"));
        }
    }
    Ok(home_dir()?.join(".local").join("share").join("voyage"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            [journal]
            path = "/tmp/voyage.journal"

            [session]
            user_id = "7a2e3c0b-1234-5678-9abc-def012345678"
            display_name = "Skipper"

            [itinerary]
            path = "/tmp/stops.json"

            [ui]
            timezone = "Europe/Athens"
            editor = "vim"
        "#;
        let config: VoyageConfig = toml::from_str(toml).expect("parse config");
        assert_eq!(config.journal.path, "/tmp/voyage.journal");
        assert_eq!(
            config.session.user_id,
            "7a2e3c0b-1234-5678-9abc-def012345678"
        );
        assert_eq!(config.session.display_name.as_deref(), Some("Skipper"));
        assert_eq!(config.itinerary.path.as_deref(), Some("/tmp/stops.json"));
        assert_eq!(config.ui.timezone.as_deref(), Some("Europe/Athens"));
        assert_eq!(config.ui.editor.as_deref(), Some("vim"));
    }

    #[test]
    fn test_optional_sections_default() {
        let toml = r#"
            [journal]
            path = "/tmp/voyage.journal"

            [session]
            user_id = "7a2e3c0b-1234-5678-9abc-def012345678"
        "#;
        let config: VoyageConfig = toml::from_str(toml).expect("parse config");
        assert!(config.itinerary.path.is_none());
        assert!(config.ui.timezone.is_none());
        assert!(config.session.display_name.is_none());
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("config.toml");
        let config = VoyageConfig::new(
            PathBuf::from("/tmp/voyage.journal"),
            "7a2e3c0b-1234-5678-9abc-def012345678".to_string(),
            None,
            None,
            Some("UTC".to_string()),
            None,
        );
        write_config(&path, &config).expect("write config");
        let loaded = read_config(&path).expect("read config");
        assert_eq!(loaded.journal.path, "/tmp/voyage.journal");
        assert_eq!(loaded.ui.timezone.as_deref(), Some("UTC"));
        assert!(loaded.ui.editor.is_none());
    }

    #[test]
    fn test_xdg_paths_use_env() {
        let _guard = ENV_LOCK.lock().expect("env lock");
        std::env::set_var("XDG_CONFIG_HOME", "/tmp/voyage-config-test");
        std::env::set_var("XDG_DATA_HOME", "/tmp/voyage-data-test");

        let config_dir = xdg_config_dir().expect("config dir");
        let data_dir = xdg_data_dir().expect("data dir");

        assert_eq!(
            config_dir,
            PathBuf::from("/tmp/voyage-config-test").join("voyage")
        );
        assert_eq!(
            data_dir,
            PathBuf::from("/tmp/voyage-data-test").join("voyage")
        );
    }
}
