//! Runtime configuration for opening an application context.
//!
//! # Responsibility
//! - Provide defaults for database location, logging and the PIN gate.
//! - Apply `TASKDECK_*` environment overrides.
//!
//! # Invariants
//! - Empty or whitespace-only override values are ignored.
//! - `log_level` is always one of `trace|debug|info|warn|error`.

use crate::logging::{default_log_level, normalize_level};
use crate::store::DEMO_PIN;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "TASKDECK_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "TASKDECK_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "TASKDECK_LOG_DIR";
pub const ENV_PIN: &str = "TASKDECK_PIN";

const DEFAULT_DB_FILE_NAME: &str = "taskdeck_state.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { key: &'static str, message: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, message } => write!(f, "invalid `{key}`: {message}"),
        }
    }
}

impl Error for ConfigError {}

/// Settings consumed by `AppContext::open`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// SQLite file holding the persisted store records.
    pub db_path: PathBuf,
    pub log_level: &'static str,
    /// Absolute directory for rolling log files; `None` disables file logging.
    pub log_dir: Option<PathBuf>,
    /// PIN accepted by the auth gate. Placeholder only; see `AuthStore`.
    pub pin: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level(),
            log_dir: None,
            pin: DEMO_PIN.to_string(),
        }
    }
}

impl AppConfig {
    /// Defaults overridden by `TASKDECK_*` process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides looked up through `lookup`.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(path) = read(ENV_DB_PATH) {
            self.db_path = PathBuf::from(path);
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            self.log_level = normalize_level(&level).map_err(|message| {
                ConfigError::InvalidValue {
                    key: ENV_LOG_LEVEL,
                    message,
                }
            })?;
        }
        if let Some(dir) = read(ENV_LOG_DIR) {
            self.log_dir = Some(PathBuf::from(dir));
        }
        if let Some(pin) = read(ENV_PIN) {
            self.pin = pin;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ConfigError, ENV_DB_PATH, ENV_LOG_LEVEL, ENV_PIN};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_use_demo_pin_and_no_file_logging() {
        let config = AppConfig::default();
        assert_eq!(config.pin, "1234");
        assert!(config.log_dir.is_none());
        assert!(config.db_path.ends_with("taskdeck_state.sqlite3"));
    }

    #[test]
    fn overrides_replace_defaults_and_ignore_blanks() {
        let config = AppConfig::default()
            .with_overrides(lookup(&[
                (ENV_DB_PATH, " /tmp/td.sqlite3 "),
                (ENV_LOG_LEVEL, "WARNING"),
                (ENV_PIN, "   "),
            ]))
            .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/td.sqlite3"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.pin, "1234");
    }

    #[test]
    fn unsupported_level_is_rejected() {
        let err = AppConfig::default()
            .with_overrides(lookup(&[(ENV_LOG_LEVEL, "verbose")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key, .. } if key == ENV_LOG_LEVEL));
    }
}
