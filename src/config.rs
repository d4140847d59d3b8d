//! Runtime configuration
//!
//! Loaded from a JSON file; every field has a default so an empty object is
//! a valid configuration.
//!
//! ```json
//! {
//!   "buffer": { "initial_page_size": 4096 },
//!   "throttle": { "max_workers": 16 },
//!   "log_level": "info"
//! }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::Severity;
use crate::observability::{log_event_with_fields, Event, Logger, Severity as LogSeverity};

/// Chunked buffer sizing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferConfig {
    /// Capacity of the first page; later pages double.
    #[serde(default = "default_initial_page_size")]
    pub initial_page_size: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            initial_page_size: default_initial_page_size(),
        }
    }
}

/// Throttle sizing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrottleConfig {
    /// Maximum concurrently admitted workers.
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
        }
    }
}

/// Top-level runtime configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub buffer: BufferConfig,

    #[serde(default)]
    pub throttle: ThrottleConfig,

    /// Minimum log severity: trace, info, warn, error or fatal.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_initial_page_size() -> usize {
    4096
}
fn default_max_workers() -> usize {
    16
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            buffer: BufferConfig::default(),
            throttle: ThrottleConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl RuntimeConfig {
    /// Load and validate configuration from a JSON file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Parse and validate configuration from a JSON string
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: RuntimeConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field
    pub fn validate(&self) -> ConfigResult<()> {
        if self.buffer.initial_page_size == 0 {
            return Err(ConfigError::Invalid(
                "buffer.initial_page_size must be > 0".to_string(),
            ));
        }
        if self.throttle.max_workers == 0 {
            return Err(ConfigError::Invalid(
                "throttle.max_workers must be > 0".to_string(),
            ));
        }
        self.log_severity()?;
        Ok(())
    }

    /// Parsed `log_level`
    pub fn log_severity(&self) -> ConfigResult<LogSeverity> {
        self.log_level
            .parse::<LogSeverity>()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Install process-wide settings (the log level).
    pub fn apply(&self) -> ConfigResult<()> {
        let severity = self.log_severity()?;
        Logger::set_min_severity(severity);
        log_event_with_fields(
            Event::ConfigLoaded,
            &[
                ("initial_page_size", &self.buffer.initial_page_size.to_string()),
                ("log_level", severity.as_str()),
                ("max_workers", &self.throttle.max_workers.to_string()),
            ],
        );
        Ok(())
    }
}

/// Configuration errors
///
/// Error codes:
/// - AERO_CONFIG_READ_FAILED (FATAL severity)
/// - AERO_CONFIG_PARSE_FAILED (FATAL severity)
/// - AERO_CONFIG_INVALID (FATAL severity)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::Read { .. } => "AERO_CONFIG_READ_FAILED",
            ConfigError::Parse(_) => "AERO_CONFIG_PARSE_FAILED",
            ConfigError::Invalid(_) => "AERO_CONFIG_INVALID",
        }
    }

    /// Configuration errors stop startup.
    pub fn severity(&self) -> Severity {
        Severity::Fatal
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
