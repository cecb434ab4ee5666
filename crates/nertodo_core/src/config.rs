//! Application configuration.
//!
//! # Responsibility
//! - Provide defaults for every runtime knob.
//! - Overlay `NERTODO_*` environment variables on top of defaults.
//!
//! # Invariants
//! - `log_dir` is absolute.
//! - `ner_base_url` is an `http://` or `https://` URL without trailing slash.
//! - Timeouts and session lifetime are strictly positive.

use crate::logging::{default_log_level, normalize_level};
use chrono::Duration as CalendarDuration;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DB_PATH: &str = "NERTODO_DB_PATH";
pub const ENV_NER_URL: &str = "NERTODO_NER_URL";
pub const ENV_NER_TIMEOUT_SECS: &str = "NERTODO_NER_TIMEOUT_SECS";
pub const ENV_LOG_LEVEL: &str = "NERTODO_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "NERTODO_LOG_DIR";
pub const ENV_SESSION_TTL_DAYS: &str = "NERTODO_SESSION_TTL_DAYS";

const DEFAULT_DB_FILE_NAME: &str = "nertodo.sqlite3";
const DEFAULT_NER_URL: &str = "http://localhost:8000";
const DEFAULT_NER_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SESSION_TTL_DAYS: i64 = 30;

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub key: &'static str,
    pub message: String,
}

impl ConfigError {
    fn new(key: &'static str, message: impl Into<String>) -> Self {
        Self {
            key,
            message: message.into(),
        }
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid `{}`: {}", self.key, self.message)
    }
}

impl Error for ConfigError {}

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub ner_base_url: String,
    pub ner_timeout: Duration,
    pub log_level: &'static str,
    pub log_dir: PathBuf,
    pub session_ttl: CalendarDuration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            ner_base_url: DEFAULT_NER_URL.to_string(),
            ner_timeout: Duration::from_secs(DEFAULT_NER_TIMEOUT_SECS),
            log_level: default_log_level(),
            log_dir: std::env::temp_dir().join("nertodo").join("logs"),
            session_ttl: CalendarDuration::days(DEFAULT_SESSION_TTL_DAYS),
        }
    }
}

impl AppConfig {
    /// Defaults overlaid with process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(value) = get(ENV_DB_PATH) {
            config.db_path = PathBuf::from(value.trim());
        }
        if let Some(value) = get(ENV_NER_URL) {
            config.set_ner_base_url(&value)?;
        }
        if let Some(value) = get(ENV_NER_TIMEOUT_SECS) {
            let secs = parse_positive(ENV_NER_TIMEOUT_SECS, &value)?;
            config.ner_timeout = Duration::from_secs(secs);
        }
        if let Some(value) = get(ENV_LOG_LEVEL) {
            config.set_log_level(&value)?;
        }
        if let Some(value) = get(ENV_LOG_DIR) {
            config.set_log_dir(&value)?;
        }
        if let Some(value) = get(ENV_SESSION_TTL_DAYS) {
            let days = parse_positive(ENV_SESSION_TTL_DAYS, &value)?;
            let days = i64::try_from(days)
                .map_err(|_| ConfigError::new(ENV_SESSION_TTL_DAYS, "value too large"))?;
            config.session_ttl = CalendarDuration::try_days(days)
                .ok_or_else(|| ConfigError::new(ENV_SESSION_TTL_DAYS, "value too large"))?;
        }

        Ok(config)
    }

    pub fn set_ner_base_url(&mut self, value: &str) -> Result<(), ConfigError> {
        let trimmed = value.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(ConfigError::new(
                ENV_NER_URL,
                format!("expected http(s) URL, got `{trimmed}`"),
            ));
        }
        self.ner_base_url = trimmed.to_string();
        Ok(())
    }

    pub fn set_log_level(&mut self, value: &str) -> Result<(), ConfigError> {
        self.log_level =
            normalize_level(value).map_err(|err| ConfigError::new(ENV_LOG_LEVEL, err.to_string()))?;
        Ok(())
    }

    pub fn set_log_dir(&mut self, value: &str) -> Result<(), ConfigError> {
        let path = PathBuf::from(value.trim());
        if !path.is_absolute() {
            return Err(ConfigError::new(
                ENV_LOG_DIR,
                format!("must be an absolute path, got `{}`", path.display()),
            ));
        }
        self.log_dir = path;
        Ok(())
    }
}

fn parse_positive(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::new(key, "must be greater than zero")),
        Ok(parsed) => Ok(parsed),
        Err(_) => Err(ConfigError::new(
            key,
            format!("expected a positive integer, got `{}`", value.trim()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ENV_LOG_DIR, ENV_LOG_LEVEL, ENV_NER_TIMEOUT_SECS, ENV_NER_URL};
    use std::collections::HashMap;
    use std::time::Duration;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.ner_base_url, "http://localhost:8000");
        assert_eq!(config.ner_timeout, Duration::from_secs(10));
        assert_eq!(config.session_ttl.num_days(), 30);
        assert!(config.log_dir.is_absolute());
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = AppConfig::from_lookup(lookup(&[
            (ENV_NER_URL, "https://ner.internal:9000/"),
            (ENV_NER_TIMEOUT_SECS, "3"),
            (ENV_LOG_LEVEL, "WARNING"),
        ]))
        .unwrap();
        assert_eq!(config.ner_base_url, "https://ner.internal:9000");
        assert_eq!(config.ner_timeout, Duration::from_secs(3));
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn empty_values_are_ignored() {
        let config = AppConfig::from_lookup(lookup(&[(ENV_NER_URL, "  ")])).unwrap();
        assert_eq!(config.ner_base_url, "http://localhost:8000");
    }

    #[test]
    fn invalid_values_name_the_offending_key() {
        let err = AppConfig::from_lookup(lookup(&[(ENV_NER_TIMEOUT_SECS, "0")])).unwrap_err();
        assert_eq!(err.key, ENV_NER_TIMEOUT_SECS);

        let err = AppConfig::from_lookup(lookup(&[(ENV_NER_URL, "localhost:8000")])).unwrap_err();
        assert_eq!(err.key, ENV_NER_URL);

        let err = AppConfig::from_lookup(lookup(&[(ENV_LOG_DIR, "logs/dev")])).unwrap_err();
        assert!(err.message.contains("absolute"));

        let err = AppConfig::from_lookup(lookup(&[(ENV_LOG_LEVEL, "loud")])).unwrap_err();
        assert_eq!(err.key, ENV_LOG_LEVEL);
    }
}
