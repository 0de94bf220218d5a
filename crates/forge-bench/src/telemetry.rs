//! Tracing setup.
//!
//! Installs a global `tracing-subscriber` with console or JSON output.
//! `RUST_LOG`, when set, takes precedence over the configured level.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::config::LoggingConfig;
use crate::error::{BenchError, BenchResult};

/// Tracing output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable console output.
    Console,
    /// JSON structured logging.
    Json,
}

impl LogFormat {
    /// Parse a configured format name.
    pub fn parse(name: &str) -> BenchResult<Self> {
        match name {
            "console" => Ok(LogFormat::Console),
            "json" => Ok(LogFormat::Json),
            other => Err(BenchError::Config(format!("unknown log format '{other}'"))),
        }
    }
}

/// Build the level filter for a configuration.
pub fn env_filter(config: &LoggingConfig) -> BenchResult<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| BenchError::Config(format!("invalid log level '{}': {e}", config.level)))
}

/// Initialize the global tracing subscriber.
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> BenchResult<()> {
    let filter = env_filter(config)?;

    let fmt_layer = match LogFormat::parse(&config.format)? {
        LogFormat::Console => fmt::layer().with_target(true).boxed(),
        LogFormat::Json => fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .json()
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| BenchError::Telemetry(e.to_string()))?;

    tracing::info!("Tracing initialized ({} output)", config.format);
    Ok(())
}
