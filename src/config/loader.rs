use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::{Config, Environment};

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl Config {
    /// Returns the path to the configuration file.
    ///
    /// Uses `~/.config/ayahhub/config.toml` on Unix/macOS,
    /// or equivalent on other platforms via `dirs::config_dir()`.
    /// Falls back to current directory if config_dir is unavailable.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("ayahhub").join("config.toml")
    }

    /// Loads configuration from the default config file.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Loads configuration from `path`.
    ///
    /// - If the file doesn't exist, returns `Config::default()`.
    /// - If the file exists, parses it as TOML and validates.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - Both API base URLs and the upstream URL are non-empty
    /// - The proxy bind address parses as host:port
    /// - The proxy prefix is an absolute path
    /// - Timeouts are non-zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        let urls = [
            ("api.direct_base_url", &self.api.direct_base_url),
            ("api.proxy_base_url", &self.api.proxy_base_url),
            ("proxy.upstream_base_url", &self.proxy.upstream_base_url),
        ];
        for (field, value) in urls {
            if value.trim().is_empty() {
                return Err(ConfigError::ValidationError {
                    message: format!("{} must not be empty", field),
                });
            }
        }

        if self.proxy.bind_addr.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::ValidationError {
                message: format!("Invalid bind address '{}'", self.proxy.bind_addr),
            });
        }

        if !self.proxy.prefix.starts_with('/') {
            return Err(ConfigError::ValidationError {
                message: format!("Proxy prefix '{}' must start with '/'", self.proxy.prefix),
            });
        }

        if self.api.timeout_seconds == 0 || self.proxy.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError {
                message: "Timeouts must be greater than zero".to_string(),
            });
        }

        if self.api.default_language.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "api.default_language must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Applies `AYAHHUB_ENV` on top of the file's environment.
    ///
    /// Unknown values are ignored with a warning.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(value) = std::env::var(Environment::ENV_VAR) {
            match Environment::parse(&value) {
                Some(env) => self.api.environment = env,
                None => tracing::warn!(
                    value = %value,
                    "Ignoring unknown {} value",
                    Environment::ENV_VAR
                ),
            }
        }
        self
    }

    /// Location of the persisted preference file.
    pub fn preferences_path(&self) -> PathBuf {
        if let Some(path) = &self.preferences.path {
            return path.clone();
        }
        let data_dir = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        data_dir.join("ayahhub").join("preferences.toml")
    }
}
