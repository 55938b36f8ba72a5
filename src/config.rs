//! Configuration module for roster
//!
//! Manages application configuration: catalog endpoint, cache tuning and
//! where the search term is persisted. Configuration is stored in the
//! user's config directory and created with defaults on first load.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::cache::{CacheConfig, DEFAULT_CAPACITY};
use crate::catalog::{CatalogClientConfig, DEFAULT_CATALOG_URL};

fn default_api_url() -> String {
    DEFAULT_CATALOG_URL.to_string()
}

const fn default_cache_capacity() -> usize {
    DEFAULT_CAPACITY
}

const fn default_request_timeout_secs() -> u64 {
    10
}

/// Application configuration structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RosterConfig {
    /// Base URL of the character catalog API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Number of distinct (search, page) results kept in memory
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Refetch cached results older than this many seconds on access.
    /// Unset: results stay fresh until focus revalidation or reload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stale_after_secs: Option<u64>,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Directory of the persisted search store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Suppress informational output by default
    #[serde(default)]
    pub quiet: bool,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            cache_capacity: default_cache_capacity(),
            stale_after_secs: None,
            request_timeout_secs: default_request_timeout_secs(),
            data_dir: None,
            quiet: false,
        }
    }
}

impl RosterConfig {
    /// Get the path to the config file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the system config directory cannot be determined.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::Message("Could not determine config directory".to_string()))?;

        Ok(config_dir.join("roster").join("config.toml"))
    }

    /// Load configuration from the default location, creating it if needed
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config file cannot be read, parsed, or created.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, writing defaults there if it is missing
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read, parsed, or created.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let default_config = Self::default();
            default_config.save_to(path)?;
            return Ok(default_config);
        }

        let settings = Config::builder()
            .add_source(File::from(path.to_path_buf()).format(FileFormat::Toml))
            .build()?;

        settings.try_deserialize()
    }

    /// Parse configuration from a TOML string
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the string is not valid TOML for this structure.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    /// Save configuration to `path`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the directory cannot be created, the configuration
    /// cannot be serialized to TOML, or the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::Message(format!("Failed to create config directory: {e}")))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Message(format!("Failed to serialize config: {e}")))?;

        fs::write(path, toml_string)
            .map_err(|e| ConfigError::Message(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Directory of the search store, falling back to the local data dir
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("roster")
        })
    }

    #[must_use]
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            capacity: self.cache_capacity,
            stale_after: self.stale_after_secs.map(Duration::from_secs),
        }
    }

    #[must_use]
    pub fn catalog_config(&self) -> CatalogClientConfig {
        CatalogClientConfig {
            catalog_url: self.api_url.clone(),
            timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}
