//! Logging settings.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::domain::models::LoggingConfig;

/// Resolved logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Console output format
    pub format: LogFormat,

    /// Directory for log files (optional, if None logs only to the console)
    pub log_dir: Option<PathBuf>,

    /// Enable console logging (stderr, so command output on stdout stays clean)
    pub enable_console: bool,

    /// Log rotation policy
    pub rotation: RotationPolicy,
}

/// Console log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line.
    Json,
    /// Compact human-readable lines.
    Pretty,
}

/// When the log file rolls over.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    /// New file every day.
    #[default]
    Daily,
    /// New file every hour.
    Hourly,
    /// Single file.
    Never,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => anyhow::bail!("Invalid log format: {other}"),
        }
    }
}

impl FromStr for RotationPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "hourly" => Ok(Self::Hourly),
            "never" => Ok(Self::Never),
            other => anyhow::bail!("Invalid log rotation: {other}"),
        }
    }
}

impl LogConfig {
    /// Resolve the string-typed settings from the application config.
    pub fn from_settings(settings: &LoggingConfig) -> anyhow::Result<Self> {
        Ok(Self {
            level: settings.level.clone(),
            format: settings.format.parse()?,
            log_dir: settings.log_dir.clone(),
            enable_console: true,
            rotation: settings.rotation.parse()?,
        })
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            log_dir: None,
            enable_console: true,
            rotation: RotationPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_settings() {
        let settings = LoggingConfig {
            level: "debug".to_string(),
            format: "JSON".to_string(),
            log_dir: Some(PathBuf::from("/tmp/arcadia-logs")),
            rotation: "hourly".to_string(),
        };
        let config = LogConfig::from_settings(&settings).unwrap();
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.rotation, RotationPolicy::Hourly);
        assert!(config.enable_console);
    }

    #[test]
    fn test_invalid_rotation_rejected() {
        let settings = LoggingConfig {
            rotation: "weekly".to_string(),
            ..LoggingConfig::default()
        };
        assert!(LogConfig::from_settings(&settings).is_err());
    }
}
