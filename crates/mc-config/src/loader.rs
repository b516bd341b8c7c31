//! Configuration loader with file and environment variable support

use crate::{AppConfig, ConfigError};
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};

/// Standard config file search paths
const CONFIG_PATHS: &[&str] = &[
    "mailcast.toml",
    "config.toml",
    "./config/mailcast.toml",
    "/etc/mailcast/config.toml",
];

/// Configuration loader
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Create a loader with a specific config file path
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// Load configuration from file (if found) with environment variable overrides
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let mut config = AppConfig::default();

        if let Some(path) = self.find_config_file() {
            info!(?path, "Loading configuration from file");
            config = AppConfig::from_file(&path)?;
        }

        apply_overrides(&mut config, |key| env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Find the configuration file to use
    fn find_config_file(&self) -> Option<PathBuf> {
        if let Some(path) = &self.config_path {
            if path.exists() {
                return Some(path.clone());
            }
            warn!(?path, "Configured file not found, falling back to search paths");
        }

        if let Ok(path) = env::var("MAILCAST_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        CONFIG_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply `MAILCAST_*` overrides using `lookup` to read variables
fn apply_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    // API
    if let Some(val) = lookup("MAILCAST_API_URL") {
        config.api.base_url = val;
    }
    if let Some(val) = lookup("MAILCAST_API_TIMEOUT_MS") {
        if let Ok(timeout) = val.parse() {
            config.api.timeout_ms = timeout;
        }
    }
    if let Some(val) = lookup("MAILCAST_API_CONNECT_TIMEOUT_MS") {
        if let Ok(timeout) = val.parse() {
            config.api.connect_timeout_ms = timeout;
        }
    }

    // Credentials
    if let Some(val) = lookup("MAILCAST_CREDENTIALS_BACKEND") {
        config.credentials.backend = val;
    }
    if let Some(val) = lookup("MAILCAST_CREDENTIALS_PATH") {
        config.credentials.path = val;
    }

    // General
    if let Some(val) = lookup("MAILCAST_DATA_DIR") {
        config.data_dir = val;
    }
}
