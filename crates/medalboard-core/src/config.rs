//! Application configuration management.
//!
//! Configuration says where the dataset lives and how long to wait for it.
//! It is stored at `~/.config/medalboard/config.json`; environment
//! variables override the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::client::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::api::{AnySource, DEFAULT_DATA_PATH};
use crate::repository::Repository;

/// Application name used for the config directory path
const APP_NAME: &str = "medalboard";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Overrides the dataset location (file path or http(s) URL)
pub const ENV_DATA: &str = "MEDALBOARD_DATA";

/// Overrides the HTTP request timeout in seconds
pub const ENV_TIMEOUT_SECS: &str = "MEDALBOARD_TIMEOUT_SECS";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    pub data_location: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    /// Load the user config file (if any), then apply environment overrides.
    pub fn load() -> Result<Self> {
        let config = match Self::config_path() {
            Some(path) => Self::load_from(&path)?,
            None => {
                warn!("Could not find config directory, using defaults");
                Self::default()
            }
        };
        Ok(config.with_overrides(|key| std::env::var(key).ok()))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Apply overrides from `lookup` (normally the process environment).
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(location) = lookup(ENV_DATA).filter(|s| !s.trim().is_empty()) {
            self.data_location = Some(location);
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.request_timeout_secs = Some(secs),
                _ => warn!(value = %raw, "Ignoring invalid {}", ENV_TIMEOUT_SECS),
            }
        }
        self
    }

    pub fn data_location(&self) -> &str {
        self.data_location.as_deref().unwrap_or(DEFAULT_DATA_PATH)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS))
    }

    pub fn source(&self) -> Result<AnySource> {
        AnySource::from_location(self.data_location(), self.request_timeout())
            .with_context(|| format!("Failed to set up dataset source for {}", self.data_location()))
    }

    /// Build the session repository for the configured source.
    pub fn repository(&self) -> Result<Repository> {
        Ok(Repository::new(self.source()?))
    }
}
