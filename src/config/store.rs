//! Configuration Storage
//!
//! Loads settings from disk.

use super::{Settings, SettingsError};
use std::path::{Path, PathBuf};

/// Get the configuration directory path
pub fn config_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "batchscribe", "Batchscribe")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| {
            // Fallback to current directory
            std::env::current_dir().unwrap_or_default().join("config")
        })
}

/// Get the configuration file path
pub fn config_file() -> PathBuf {
    config_dir().join("settings.toml")
}

/// Load settings from disk
///
/// A missing file is not an error; defaults are returned. The tool
/// never writes the file back.
pub fn load_settings() -> Result<Settings, SettingsError> {
    read_settings(&config_file())
}

fn read_settings(path: &Path) -> Result<Settings, SettingsError> {
    if !path.exists() {
        tracing::info!("No settings file found, using defaults");
        return Ok(Settings::default());
    }

    let content = std::fs::read_to_string(path)?;
    let settings: Settings = toml::from_str(&content)?;

    tracing::info!("Settings loaded from {:?}", path);
    Ok(settings)
}
