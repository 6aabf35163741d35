//! Configuration management for jiragen.
//!
//! This module handles loading and saving the user configuration file:
//! the backend URL and application settings. Tokens are never written here;
//! they live in the OS keyring (see [`crate::session`]).

mod settings;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::validation::validate_project_key;

pub use settings::{Settings, DEFAULT_BANNER_SECONDS};

/// Backend used when none is configured.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8080";

/// Errors that can occur while loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform configuration directory could not be determined.
    #[error("could not determine configuration directory")]
    NoConfigDir,

    /// The configuration directory could not be created.
    #[error("failed to create config directory: {0}")]
    CreateDirError(std::io::Error),

    /// The configuration file could not be read.
    #[error("failed to read config file: {0}")]
    ReadError(std::io::Error),

    /// The configuration file could not be written.
    #[error("failed to write config file: {0}")]
    WriteError(std::io::Error),

    /// The configuration file is not valid TOML.
    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    /// The configuration could not be serialized.
    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// A value is present but unusable.
    #[error("invalid configuration: {0}")]
    ValidationError(String),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// The full configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the generation backend.
    pub backend_url: String,
    /// Application settings.
    pub settings: Settings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            settings: Settings::default(),
        }
    }
}

impl Config {
    /// Path of the configuration file: `<config_dir>/jiragen/config.toml`.
    pub fn path() -> Result<PathBuf> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(dir.join("jiragen").join("config.toml"))
    }

    /// Load the configuration from the default path.
    ///
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load the configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Save the configuration to the default path.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Save the configuration to a specific file, creating its directory.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::CreateDirError)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(ConfigError::WriteError)?;
        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Validate this configuration.
    ///
    /// Checks that:
    /// - The backend URL is non-empty and uses http or https
    /// - The default project key, if set, is two to four uppercase letters
    /// - The banner duration is positive
    pub fn validate(&self) -> Result<()> {
        let url = self.backend_url.trim();
        if url.is_empty() {
            return Err(ConfigError::ValidationError(
                "backend_url cannot be empty".to_string(),
            ));
        }
        if !url.starts_with("https://") && !url.starts_with("http://") {
            return Err(ConfigError::ValidationError(format!(
                "backend_url '{}' must start with http:// or https://",
                url
            )));
        }

        if let Some(key) = &self.settings.default_project_key {
            validate_project_key(key)
                .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        }

        if self.settings.banner_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "banner_seconds must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
