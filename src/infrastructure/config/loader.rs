//! Layered configuration loading and validation.

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Directory holding project configuration files.
pub const CONFIG_DIR: &str = ".arcadia";

/// Legacy single-variable override for the starting threshold.
pub const QUALITY_THRESHOLD_ENV: &str = "QUALITY_THRESHOLD";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Batch size of zero.
    #[error("Invalid batch_size: {0}. Must be at least 1")]
    InvalidBatchSize(usize),

    /// Concurrency of zero.
    #[error("Invalid max_concurrency: {0}. Must be at least 1")]
    InvalidConcurrency(usize),

    /// Threshold bounds out of order.
    #[error("Invalid threshold bounds: min ({0}) must be less than max ({1})")]
    InvalidThresholdBounds(f64, f64),

    /// Initial threshold outside its bounds.
    #[error("Initial threshold {0} outside bounds [{1}, {2}]")]
    InitialThresholdOutOfBounds(f64, f64, f64),

    /// Epsilon bounds out of order or outside [0,1].
    #[error("Invalid epsilon bounds: min ({0}) must be less than max ({1}), both within [0, 1]")]
    InvalidEpsilonBounds(f64, f64),

    /// Initial epsilon outside its bounds.
    #[error("Initial epsilon {0} outside bounds [{1}, {2}]")]
    InitialEpsilonOutOfBounds(f64, f64, f64),

    /// Non-positive distance ceiling.
    #[error("Invalid distance_ceiling: {0}. Must be positive")]
    InvalidDistanceCeiling(f64),

    /// Target pass rate not strictly inside (0,1).
    #[error("Invalid target_pass_rate: {0}. Must be strictly between 0 and 1")]
    InvalidTargetPassRate(f64),

    /// Unknown log level.
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    /// Unknown log format.
    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    /// Unknown rotation policy.
    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),

    /// Initial backoff not below the cap.
    #[error(
        "Invalid backoff configuration: initial_backoff_ms ({0}) must be less than max_backoff_ms ({1})"
    )]
    InvalidBackoff(u64, u64),

    /// Any other validation failure.
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .arcadia/config.yaml (project config)
    /// 3. .arcadia/local.yaml (project local overrides, optional)
    /// 4. QUALITY_THRESHOLD (starting threshold only)
    /// 5. Environment variables (ARCADIA_* prefix, `__` separates sections)
    pub fn load() -> Result<Config> {
        Self::load_from_dir(".")
    }

    /// Same as [`Self::load`], resolving `.arcadia/` under `root`.
    pub fn load_from_dir(root: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Self::figment(root.as_ref())
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Self::env_providers())
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    fn figment(root: &Path) -> Figment {
        let dir = root.join(CONFIG_DIR);
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(dir.join("config.yaml")))
            .merge(Yaml::file(dir.join("local.yaml")))
            .merge(Self::env_providers())
    }

    fn env_providers() -> Figment {
        Figment::new()
            .merge(
                Env::raw()
                    .only(&[QUALITY_THRESHOLD_ENV])
                    .map(|_| "controller.initial_threshold".into()),
            )
            .merge(Env::prefixed("ARCADIA_").split("__"))
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let generation = &config.generation;
        if generation.batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize(generation.batch_size));
        }
        if generation.max_concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency(generation.max_concurrency));
        }

        let controller = &config.controller;
        let bounds_ordered = controller.min_threshold < controller.max_threshold;
        if !bounds_ordered {
            return Err(ConfigError::InvalidThresholdBounds(
                controller.min_threshold,
                controller.max_threshold,
            ));
        }
        if !(controller.min_threshold..=controller.max_threshold)
            .contains(&controller.initial_threshold)
        {
            return Err(ConfigError::InitialThresholdOutOfBounds(
                controller.initial_threshold,
                controller.min_threshold,
                controller.max_threshold,
            ));
        }
        let epsilon_ordered = 0.0 <= controller.epsilon_min
            && controller.epsilon_min < controller.epsilon_max
            && controller.epsilon_max <= 1.0;
        if !epsilon_ordered {
            return Err(ConfigError::InvalidEpsilonBounds(
                controller.epsilon_min,
                controller.epsilon_max,
            ));
        }
        if !(controller.epsilon_min..=controller.epsilon_max).contains(&controller.initial_epsilon)
        {
            return Err(ConfigError::InitialEpsilonOutOfBounds(
                controller.initial_epsilon,
                controller.epsilon_min,
                controller.epsilon_max,
            ));
        }
        let pass_rate_open = controller.target_pass_rate > 0.0 && controller.target_pass_rate < 1.0;
        if !pass_rate_open {
            return Err(ConfigError::InvalidTargetPassRate(controller.target_pass_rate));
        }
        if controller.max_step <= 0.0 {
            return Err(ConfigError::ValidationFailed(
                "controller.max_step must be positive".to_string(),
            ));
        }
        if controller.recalibration_interval == 0 || controller.window_size == 0 {
            return Err(ConfigError::ValidationFailed(
                "controller.recalibration_interval and window_size must be at least 1".to_string(),
            ));
        }

        let ceiling_positive = config.diversity.distance_ceiling > 0.0;
        if !ceiling_positive {
            return Err(ConfigError::InvalidDistanceCeiling(
                config.diversity.distance_ceiling,
            ));
        }

        // Validate logging config
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        // Validate retry config
        if config.retry.initial_backoff_ms >= config.retry.max_backoff_ms {
            return Err(ConfigError::InvalidBackoff(
                config.retry.initial_backoff_ms,
                config.retry.max_backoff_ms,
            ));
        }

        let studio = &config.studio;
        for (name, rate) in [
            ("failure_rate", studio.failure_rate),
            ("outage_rate", studio.outage_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(ConfigError::ValidationFailed(format!(
                    "studio.{name} must be within [0, 1], got {rate}"
                )));
            }
        }

        Ok(())
    }
}
