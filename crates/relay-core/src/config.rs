use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::mode::Mode;

/// Session identifier sent with every chat request.
pub const DEFAULT_USER_ID: &str = "12345";

pub const ENV_ENDPOINT: &str = "RELAY_ENDPOINT";
pub const ENV_MODE: &str = "RELAY_MODE";
pub const ENV_USER_ID: &str = "RELAY_USER_ID";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub mode: Mode,
    /// Falls back to the mode's default endpoint when unset
    pub endpoint_url: Option<String>,
    pub user_id: String,
    /// Falls back to the mode's default message when unset
    pub failure_message: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            mode: Mode::default(),
            endpoint_url: None,
            user_id: DEFAULT_USER_ID.to_string(),
            failure_message: None,
        }
    }

    /// Load from the user config directory; a missing file yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(io_err)?;
        Ok(())
    }

    /// Apply `RELAY_*` environment overrides.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = lookup(ENV_ENDPOINT) {
            self.endpoint_url = Some(url);
        }
        if let Some(user_id) = lookup(ENV_USER_ID) {
            self.user_id = user_id;
        }

        // A bad mode is reported after the other overrides have been applied
        match lookup(ENV_MODE) {
            Some(mode) => {
                self.mode = Mode::from_str(&mode).ok_or(ConfigError::InvalidMode(mode))?;
                Ok(())
            }
            None => Ok(()),
        }
    }

    pub fn endpoint_url(&self) -> &str {
        self.endpoint_url
            .as_deref()
            .unwrap_or_else(|| self.mode.default_endpoint())
    }

    pub fn failure_message(&self) -> &str {
        self.failure_message
            .as_deref()
            .unwrap_or_else(|| self.mode.default_failure_message())
    }

    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("relay"))
    }

    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.json"))
    }
}
