// src/infrastructure/config.rs
use crate::constants::{APP_DIR_NAME, AUTOSAVE_DELAY_MS, DEFAULT_FOLDER_NAME, ERROR_CLEAR_DELAY_MS};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// TOML configuration for hiyo-notes
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub timing: TimingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct StorageConfig {
    /// Key-value state file; empty means `<config dir>/hiyo-notes/state.json`
    #[serde(default)]
    pub state_file: String,
    #[serde(default = "default_folder")]
    pub default_folder: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct TimingConfig {
    #[serde(default = "default_autosave_delay_ms")]
    pub autosave_delay_ms: u64,
    #[serde(default = "default_error_clear_ms")]
    pub error_clear_ms: u64,
}

fn default_folder() -> String { DEFAULT_FOLDER_NAME.to_string() }
fn default_autosave_delay_ms() -> u64 { AUTOSAVE_DELAY_MS }
fn default_error_clear_ms() -> u64 { ERROR_CLEAR_DELAY_MS }

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_file: String::new(),
            default_folder: default_folder(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            autosave_delay_ms: default_autosave_delay_ms(),
            error_clear_ms: default_error_clear_ms(),
        }
    }
}

impl TimingConfig {
    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }

    pub fn error_clear_delay(&self) -> Duration {
        Duration::from_millis(self.error_clear_ms)
    }
}

impl AppConfig {
    /// Load configuration from TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .context("Failed to read config file")?;

        let config: AppConfig = toml::from_str(&content)
            .context("Failed to parse TOML config")?;

        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file does not exist
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            debug!(?path, "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Resolved location of the key-value state file
    pub fn state_file_path(&self) -> Result<PathBuf> {
        if self.storage.state_file.is_empty() {
            Ok(app_config_dir()?.join("state.json"))
        } else {
            Ok(PathBuf::from(&self.storage.state_file))
        }
    }
}

/// `<config dir>/hiyo-notes`
pub fn app_config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Could not find config directory")?;
    Ok(base.join(APP_DIR_NAME))
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(app_config_dir()?.join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn given_partial_toml_when_loading_then_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("partial.toml");
        fs::write(&config_path, "[timing]\nautosave_delay_ms = 250\n").unwrap();

        let config = AppConfig::load(&config_path).unwrap();

        // Specified value
        assert_eq!(config.timing.autosave_delay(), Duration::from_millis(250));
        // Default values
        assert_eq!(config.timing.error_clear_ms, 3000);
        assert_eq!(config.storage.default_folder, "HiyoNotes");
    }

    #[test]
    fn given_missing_file_when_loading_or_default_then_returns_defaults() {
        let config = AppConfig::load_or_default("/nonexistent/path/config.toml").unwrap();

        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn given_invalid_toml_when_loading_then_returns_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("broken.toml");
        fs::write(&config_path, "[timing\n").unwrap();

        assert!(AppConfig::load(&config_path).is_err());
    }

    #[test]
    fn given_explicit_state_file_when_resolving_then_uses_it() {
        let mut config = AppConfig::default();
        config.storage.state_file = "/var/tmp/hiyo/state.json".to_string();

        assert_eq!(
            config.state_file_path().unwrap(),
            PathBuf::from("/var/tmp/hiyo/state.json")
        );
    }
}
