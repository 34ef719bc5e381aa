//! Service configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Service configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage settings.
    pub storage: StorageConfig,
    /// Historical sync settings.
    pub history: HistoryConfig,
    /// Live "today" polling settings.
    pub live: LiveConfig,
    /// Optional HTTP step source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceConfig>,
}

impl Config {
    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = default_config_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Save configuration to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        std::fs::write(path.as_ref(), content).map_err(|e| ConfigError::Write {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Validate the configuration, collecting every problem.
    ///
    /// # Example
    ///
    /// ```
    /// use stepquest_service::Config;
    ///
    /// let config = Config::default();
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.storage.validate());
        errors.extend(self.history.validate());
        errors.extend(self.live.validate());
        if let Some(source) = &self.source {
            errors.extend(source.validate());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file path. A leading `~` is expanded to the home directory.
    #[serde(deserialize_with = "deserialize_path")]
    pub path: PathBuf,
}

fn deserialize_path<'de, D>(deserializer: D) -> Result<PathBuf, D::Error>
where
    D: serde::Deserializer<'de>,
{
    PathBuf::deserialize(deserializer).map(expand_home)
}

/// Expand a leading `~` component to the user's home directory.
///
/// Paths without one, and `~user` forms, are returned unchanged.
pub fn expand_home(path: PathBuf) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path;
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path,
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: stepquest_store::default_db_path(),
        }
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if self.path.as_os_str().is_empty() {
            errors.push(ValidationError::new(
                "storage.path",
                "database path cannot be empty",
            ));
        } else if self.path.starts_with("~") {
            errors.push(ValidationError::new(
                "storage.path",
                format!(
                    "'{}' starts with an unexpanded ~ (no home directory found)",
                    self.path.display()
                ),
            ));
        }
        errors
    }
}

/// Historical sync configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Days before today covered by each historical sync.
    pub days: u32,
    /// Seconds between background full reconciles.
    pub refresh_interval: u64,
}

/// Allowed range for `history.days`.
pub const HISTORY_DAYS_RANGE: std::ops::RangeInclusive<u32> = 1..=90;
/// Allowed range for `history.refresh_interval` in seconds.
pub const REFRESH_INTERVAL_RANGE: std::ops::RangeInclusive<u64> = 60..=86_400;

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            days: stepquest_core::DEFAULT_HISTORY_DAYS,
            refresh_interval: 900,
        }
    }
}

impl HistoryConfig {
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if !HISTORY_DAYS_RANGE.contains(&self.days) {
            errors.push(ValidationError::new(
                "history.days",
                format!(
                    "{} is out of range ({}-{} days)",
                    self.days,
                    HISTORY_DAYS_RANGE.start(),
                    HISTORY_DAYS_RANGE.end()
                ),
            ));
        }

        if self.refresh_interval < *REFRESH_INTERVAL_RANGE.start() {
            errors.push(ValidationError::new(
                "history.refresh_interval",
                format!(
                    "refresh interval {} is too short (minimum {} seconds)",
                    self.refresh_interval,
                    REFRESH_INTERVAL_RANGE.start()
                ),
            ));
        } else if self.refresh_interval > *REFRESH_INTERVAL_RANGE.end() {
            errors.push(ValidationError::new(
                "history.refresh_interval",
                format!(
                    "refresh interval {} is too long (maximum {} seconds / 1 day)",
                    self.refresh_interval,
                    REFRESH_INTERVAL_RANGE.end()
                ),
            ));
        }

        errors
    }
}

/// Live polling configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveConfig {
    /// Seconds between live "today" polls.
    pub poll_interval: u64,
}

/// Minimum live poll interval in seconds.
pub const MIN_POLL_INTERVAL: u64 = 1;
/// Maximum live poll interval in seconds (1 hour).
pub const MAX_POLL_INTERVAL: u64 = 3600;

impl Default for LiveConfig {
    fn default() -> Self {
        Self { poll_interval: 5 }
    }
}

impl LiveConfig {
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if self.poll_interval < MIN_POLL_INTERVAL {
            errors.push(ValidationError::new(
                "live.poll_interval",
                format!(
                    "poll interval {} is too short (minimum {} second)",
                    self.poll_interval, MIN_POLL_INTERVAL
                ),
            ));
        } else if self.poll_interval > MAX_POLL_INTERVAL {
            errors.push(ValidationError::new(
                "live.poll_interval",
                format!(
                    "poll interval {} is too long (maximum {} seconds / 1 hour)",
                    self.poll_interval, MAX_POLL_INTERVAL
                ),
            ));
        }
        errors
    }
}

/// HTTP step source settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Base URL of the step endpoint.
    pub url: String,
    /// Optional bearer token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl SourceConfig {
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.url.is_empty() {
            errors.push(ValidationError::new("source.url", "URL cannot be empty"));
        } else if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            errors.push(ValidationError::new(
                "source.url",
                format!("'{}' must start with http:// or https://", self.url),
            ));
        }

        if let Some(token) = &self.token
            && token.is_empty()
        {
            errors.push(ValidationError::new(
                "source.token",
                "token cannot be empty string (omit it instead)",
            ));
        }

        errors
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),
    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// A single validation error with context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The field path (e.g., `history.days`).
    pub field: String,
    /// Description of the validation failure.
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("stepquest")
        .join("config.toml")
}
