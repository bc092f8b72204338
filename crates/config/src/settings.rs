// User settings
// Loaded from ~/.config/homework-recon/settings.toml

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the settings file location.
pub const SETTINGS_ENV: &str = "HWCHECK_SETTINGS";

/// Where run notifications go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifierKind {
    /// Print to stderr (default)
    #[default]
    Console,
    /// Route through the log facade
    Log,
    /// Drop notifications
    Quiet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Engine config used when `--config` is not given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recon_config: Option<PathBuf>,

    /// Stop words added on top of the engine config
    pub extra_stop_words: Vec<String>,

    pub notifier: NotifierKind,

    /// Default log filter when RUST_LOG is unset
    pub log_level: String,

    /// Only count emails received in the last N days when no explicit
    /// window is given on the command line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_days: Option<u32>,

    /// Exit non-zero when anyone is missing
    pub strict: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            recon_config: None,
            extra_stop_words: Vec::new(),
            notifier: NotifierKind::Console,
            log_level: "warn".into(),
            window_days: None,
            strict: false,
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        if let Some(path) = std::env::var_os(SETTINGS_ENV) {
            return PathBuf::from(path);
        }
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("homework-recon");
        config_dir.join("settings.toml")
    }

    /// Load settings from disk. A missing file means defaults; a broken
    /// file is reported so the caller can warn and fall back.
    pub fn load() -> Result<Self, String> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, String> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("error reading {}: {e}", path.display()))?;
        toml::from_str(&contents).map_err(|e| format!("error parsing {}: {e}", path.display()))
    }

    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| e.to_string())
    }

    /// Write a commented default settings file. Existing files are left alone.
    pub fn create_default_file(path: &Path) -> Result<bool, String> {
        if path.exists() {
            return Ok(false);
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("error creating config directory: {e}"))?;
        }

        let default_config = r#"# hwcheck settings

# Engine config (stop words, name length, script) used when --config is omitted
# recon_config = "/path/to/weekly.recon.toml"

# Extra schedule/status labels to ignore when extracting names
extra_stop_words = []

# Notifications: "console", "log" or "quiet"
notifier = "console"

# Log filter when RUST_LOG is unset
log_level = "warn"

# Only count emails from the last N days unless --since/--until is given
# window_days = 7

# Exit with code 3 when anyone is missing
strict = false
"#;

        fs::write(path, default_config).map_err(|e| format!("error writing {}: {e}", path.display()))?;
        Ok(true)
    }

    /// Get the config file path for display/opening
    pub fn config_path_display() -> String {
        Self::config_path().to_string_lossy().to_string()
    }
}
