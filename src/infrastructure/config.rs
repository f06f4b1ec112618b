//! Configuration loading with hierarchical merging.

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::Config;

/// Configuration error types.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("Invalid page_size: {0}. Must be at least 1")]
    InvalidPageSize(usize),

    #[error("API key cannot be empty")]
    EmptyApiKey,

    #[error("Invalid trigger rate limit: {0}. Must be at least 1")]
    InvalidTriggerRateLimit(u32),
}

/// Configuration loader with hierarchical merging.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging.
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. issuepilot.yaml in the working directory
    /// 3. Environment variables (ISSUEPILOT_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file("issuepilot.yaml"))
            .merge(Env::prefixed("ISSUEPILOT_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading.
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.database.path.is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }

        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(
                config.database.max_connections,
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        if config.github.page_size == 0 {
            return Err(ConfigError::InvalidPageSize(config.github.page_size));
        }

        if config.server.api_key.is_empty() {
            return Err(ConfigError::EmptyApiKey);
        }

        if config.server.trigger_rate_limit_per_minute == 0 {
            return Err(ConfigError::InvalidTriggerRateLimit(
                config.server.trigger_rate_limit_per_minute,
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(ConfigLoader::validate(&Config::default()).is_ok());
    }

    #[test]
    fn empty_database_path_is_rejected() {
        let config = Config {
            database: crate::domain::models::DatabaseConfig {
                path: String::new(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::EmptyDatabasePath)
        ));
    }

    #[test]
    fn bad_log_level_is_rejected() {
        let config = Config {
            logging: crate::domain::models::LoggingConfig {
                level: "verbose".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLogLevel(_))
        ));
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let config = Config {
            github: crate::domain::models::GithubConfig {
                page_size: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidPageSize(0))
        ));
    }
}
