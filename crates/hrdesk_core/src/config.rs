//! Process configuration for core callers.
//!
//! # Responsibility
//! - Describe where slots are stored, how logs are written, and how
//!   dashboard percentages are rounded.
//! - Load from JSON and apply `HRDESK_*` environment overrides.
//!
//! # Invariants
//! - A returned `CoreConfig` has passed `validate()`.

use crate::logging::{default_log_level, normalize_level};
use crate::metrics::DEFAULT_PERCENT_PRECISION;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_DB_PATH: &str = "HRDESK_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "HRDESK_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "HRDESK_LOG_DIR";
pub const ENV_PERCENT_PRECISION: &str = "HRDESK_PERCENT_PRECISION";

/// Upper bound for percentage decimal places.
pub const MAX_PERCENT_PRECISION: u32 = 4;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(serde_json::Error),
    InvalidValue { key: &'static str, message: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config json: {err}"),
            Self::InvalidValue { key, message } => write!(f, "invalid `{key}`: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::InvalidValue { .. } => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Core runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// SQLite file holding namespace slots. `None` means in-memory.
    pub db_path: Option<PathBuf>,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute directory for rolling log files. `None` disables file logs.
    pub log_dir: Option<PathBuf>,
    /// Decimal places used for dashboard percentages.
    pub percent_precision: u32,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
            percent_precision: DEFAULT_PERCENT_PRECISION,
        }
    }
}

impl CoreConfig {
    /// Parses a JSON document; absent keys keep their defaults.
    pub fn from_json_str(value: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(value)?;
        config.validated()
    }

    /// Reads and parses a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Applies `HRDESK_*` process environment overrides.
    pub fn with_env_overrides(self) -> ConfigResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary key lookup.
    ///
    /// Blank values are ignored so an exported-but-empty variable does not
    /// clear a file setting.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> ConfigResult<Self> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(path) = read(ENV_DB_PATH) {
            self.db_path = Some(PathBuf::from(path));
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            self.log_level = level;
        }
        if let Some(dir) = read(ENV_LOG_DIR) {
            self.log_dir = Some(PathBuf::from(dir));
        }
        if let Some(precision) = read(ENV_PERCENT_PRECISION) {
            self.percent_precision =
                precision
                    .parse::<u32>()
                    .map_err(|err| ConfigError::InvalidValue {
                        key: ENV_PERCENT_PRECISION,
                        message: err.to_string(),
                    })?;
        }

        self.validated()
    }

    /// Checks cross-field constraints.
    pub fn validate(&self) -> ConfigResult<()> {
        normalize_level(&self.log_level).map_err(|err| ConfigError::InvalidValue {
            key: "log_level",
            message: err.to_string(),
        })?;
        if let Some(dir) = &self.log_dir {
            if !dir.is_absolute() {
                return Err(ConfigError::InvalidValue {
                    key: "log_dir",
                    message: format!("must be absolute, got `{}`", dir.display()),
                });
            }
        }
        if self.percent_precision > MAX_PERCENT_PRECISION {
            return Err(ConfigError::InvalidValue {
                key: "percent_precision",
                message: format!(
                    "must be at most {MAX_PERCENT_PRECISION}, got {}",
                    self.percent_precision
                ),
            });
        }
        Ok(())
    }

    fn validated(mut self) -> ConfigResult<Self> {
        self.validate()?;
        if let Ok(level) = normalize_level(&self.log_level) {
            self.log_level = level.to_string();
        }
        Ok(self)
    }
}
