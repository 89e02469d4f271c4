//! Global tracing subscriber setup.

use super::config::{LogConfig, LogFormat, RotationPolicy};
use anyhow::{Context, Result};
use std::io;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// File name prefix for rolling log files.
const LOG_FILE_NAME: &str = "arcadia.log";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Logger implementation using tracing
pub struct LoggerImpl {
    _guard: Option<WorkerGuard>,
}

impl LoggerImpl {
    /// Initialize the global subscriber.
    ///
    /// The console layer honours `format`; the optional file layer is always
    /// JSON. The returned logger owns the file writer's guard and must be kept
    /// alive for the duration of the program.
    pub fn init(config: &LogConfig) -> Result<Self> {
        let (layers, guard) = Self::layers(config)?;

        tracing_subscriber::registry()
            .with(layers)
            .try_init()
            .context("Failed to install global tracing subscriber")?;

        tracing::info!(
            level = %config.level,
            format = ?config.format,
            file_output = config.log_dir.is_some(),
            "logger initialized"
        );

        Ok(Self { _guard: guard })
    }

    fn layers(config: &LogConfig) -> Result<(Vec<BoxedLayer>, Option<WorkerGuard>)> {
        let level = parse_log_level(&config.level)?;
        let mut layers: Vec<BoxedLayer> = Vec::new();

        if config.enable_console {
            let layer: BoxedLayer = match config.format {
                LogFormat::Json => tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(io::stderr)
                    .with_current_span(true)
                    .with_target(true)
                    .with_filter(env_filter(level))
                    .boxed(),
                LogFormat::Pretty => tracing_subscriber::fmt::layer()
                    .compact()
                    .with_writer(io::stderr)
                    .with_target(false)
                    .with_filter(env_filter(level))
                    .boxed(),
            };
            layers.push(layer);
        }

        let guard = if let Some(ref log_dir) = config.log_dir {
            let file_appender = match config.rotation {
                RotationPolicy::Daily => rolling::daily(log_dir, LOG_FILE_NAME),
                RotationPolicy::Hourly => rolling::hourly(log_dir, LOG_FILE_NAME),
                RotationPolicy::Never => rolling::never(log_dir, LOG_FILE_NAME),
            };
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

            layers.push(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(non_blocking_file)
                    .with_ansi(false)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_filter(env_filter(level))
                    .boxed(),
            );
            Some(guard)
        } else {
            None
        };

        Ok((layers, guard))
    }
}

/// `RUST_LOG` wins over the configured default level.
fn env_filter(level: Level) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy()
}

/// Parse log level string to Level
fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!("Invalid log level: {level}"),
    }
}
