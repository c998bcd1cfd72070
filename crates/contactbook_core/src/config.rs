//! Runtime configuration loaded from environment variables.
//!
//! # Environment Variables
//! - `CONTACTBOOK_DB_PATH` - SQLite store file (default: `contactbook.sqlite3`)
//! - `CONTACTBOOK_LOG_LEVEL` - `trace|debug|info|warn|error`
//!   (default: `debug` in debug builds, `info` in release builds)
//! - `CONTACTBOOK_LOG_DIR` - absolute directory for rolling log files; file
//!   logging stays off when unset

use crate::logging::{default_log_level, normalize_level};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "CONTACTBOOK_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "CONTACTBOOK_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "CONTACTBOOK_LOG_DIR";
pub const DEFAULT_DB_FILE_NAME: &str = "contactbook.sqlite3";

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

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: &'static str,
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    /// - Unsupported log level.
    /// - Empty database path, or a log directory that is not absolute.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = lookup(DB_PATH_ENV) {
            let trimmed = path.trim();
            if trimmed.is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: DB_PATH_ENV,
                    message: "path cannot be empty".to_string(),
                });
            }
            config.db_path = PathBuf::from(trimmed);
        }

        if let Some(level) = lookup(LOG_LEVEL_ENV) {
            config.log_level = normalize_level(&level).map_err(|message| {
                ConfigError::InvalidValue {
                    key: LOG_LEVEL_ENV,
                    message,
                }
            })?;
        }

        if let Some(dir) = lookup(LOG_DIR_ENV).filter(|dir| !dir.trim().is_empty()) {
            let path = PathBuf::from(dir.trim());
            if !path.is_absolute() {
                return Err(ConfigError::InvalidValue {
                    key: LOG_DIR_ENV,
                    message: format!("must be an absolute path, got `{}`", path.display()),
                });
            }
            config.log_dir = Some(path);
        }

        Ok(config)
    }
}
