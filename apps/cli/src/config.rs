//! Configuration: extraction settings from a JSON file, media service and
//! vault locations from the environment.

use std::path::{Path, PathBuf};

use vaultcards_core::Settings;

use crate::error::{CliError, Result};

pub const MEDIA_URL_VAR: &str = "VAULTCARDS_MEDIA_URL";
pub const MEDIA_DIR_VAR: &str = "VAULTCARDS_MEDIA_DIR";
pub const VAULT_DIR_VAR: &str = "VAULTCARDS_VAULT_DIR";

/// Where the media service lives and where it should store files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaConfig {
    pub url: String,
    /// Media folder of the card store's collection.
    pub media_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub settings: Settings,
    pub vault_dir: Option<PathBuf>,
    /// Absent when no media service is configured; extraction then runs
    /// offline.
    pub media: Option<MediaConfig>,
}

impl Config {
    /// Load settings from `settings_path`, or from the default location when
    /// it exists, then read the environment.
    pub fn load(settings_path: Option<&Path>, vault_dir: Option<PathBuf>) -> Result<Self> {
        let settings = match settings_path {
            Some(path) => read_settings(path)?,
            None => match default_settings_path() {
                Some(path) if path.exists() => read_settings(&path)?,
                _ => Settings::default(),
            },
        };
        Ok(Self::from_env(settings, vault_dir, |key| std::env::var(key).ok()))
    }

    /// Complete a configuration from environment lookups. An explicit vault
    /// directory wins over the environment.
    pub fn from_env(
        settings: Settings,
        vault_dir: Option<PathBuf>,
        var: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let non_empty = |key: &str| var(key).filter(|value| !value.trim().is_empty());
        let vault_dir = vault_dir.or_else(|| non_empty(VAULT_DIR_VAR).map(PathBuf::from));
        let media = non_empty(MEDIA_URL_VAR).map(|url| MediaConfig {
            url,
            media_dir: non_empty(MEDIA_DIR_VAR).map(PathBuf::from),
        });
        Self {
            settings,
            vault_dir,
            media,
        }
    }
}

/// `<config dir>/vaultcards/settings.json`
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("vaultcards").join("settings.json"))
}

pub fn read_settings(path: &Path) -> Result<Settings> {
    let json = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let settings = serde_json::from_str(&json).map_err(|source| CliError::Settings {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "loaded settings");
    Ok(settings)
}
