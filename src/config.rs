// Console Configuration
// Environment-driven startup settings for the console binary

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use log::LevelFilter;
use thiserror::Error;

use crate::services::{is_valid_url, DEFAULT_API_BASE_URL};

pub const DATA_DIR_VAR: &str = "BLOG_CONSOLE_DATA_DIR";
pub const LOG_DIR_VAR: &str = "BLOG_CONSOLE_LOG_DIR";
pub const API_BASE_URL_VAR: &str = "BLOG_CONSOLE_API_BASE_URL";
pub const LOG_LEVEL_VAR: &str = "BLOG_CONSOLE_LOG_LEVEL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid log level '{0}' (expected off, error, warn, info, debug or trace)")]
    InvalidLogLevel(String),

    #[error("Invalid API base URL '{0}' (must start with http:// or https://)")]
    InvalidApiBaseUrl(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// Directory holding the settings and session files
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
    pub api_base_url: String,
    pub log_level: LevelFilter,
}

impl ConsoleConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, treating blank values as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let data_dir = read(DATA_DIR_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);
        let log_dir = read(LOG_DIR_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("logs"));

        let api_base_url = read(API_BASE_URL_VAR).unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        if !is_valid_url(&api_base_url) {
            return Err(ConfigError::InvalidApiBaseUrl(api_base_url));
        }

        let log_level = match read(LOG_LEVEL_VAR) {
            Some(level) => {
                LevelFilter::from_str(&level).map_err(|_| ConfigError::InvalidLogLevel(level))?
            }
            None => LevelFilter::Info,
        };

        Ok(Self {
            data_dir,
            log_dir,
            api_base_url,
            log_level,
        })
    }
}

fn default_data_dir() -> PathBuf {
    dirs_next::data_dir()
        .map(|dir| dir.join("blog-console"))
        .unwrap_or_else(|| PathBuf::from("data"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<ConsoleConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ConsoleConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.log_level, LevelFilter::Info);
        assert_eq!(config.log_dir, config.data_dir.join("logs"));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            (DATA_DIR_VAR, "/srv/blog"),
            (API_BASE_URL_VAR, "https://api.example.com"),
            (LOG_LEVEL_VAR, "debug"),
        ])
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/srv/blog"));
        assert_eq!(config.log_dir, PathBuf::from("/srv/blog/logs"));
        assert_eq!(config.api_base_url, "https://api.example.com");
        assert_eq!(config.log_level, LevelFilter::Debug);
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = config_from(&[(LOG_DIR_VAR, "  "), (DATA_DIR_VAR, "d")]).unwrap();
        assert_eq!(config.log_dir, PathBuf::from("d").join("logs"));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            config_from(&[(LOG_LEVEL_VAR, "loud")]),
            Err(ConfigError::InvalidLogLevel(_))
        ));
        assert!(matches!(
            config_from(&[(API_BASE_URL_VAR, "localhost:8080")]),
            Err(ConfigError::InvalidApiBaseUrl(_))
        ));
    }
}
