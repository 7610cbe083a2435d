//! Logging initialization.
//!
//! Sets up the global tracing subscriber. Initialization failures (including
//! a subscriber already being installed) are reported, not fatal; callers
//! typically ignore them.

use crate::config::{LogConfig, LogError, LogFormat, Verbosity};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Initialize tracing with a format and verbosity, default config otherwise.
pub fn init_tracing(format: LogFormat, verbosity: Verbosity) -> Result<(), LogError> {
    init_tracing_with_config(
        LogConfig::new()
            .with_format(format)
            .with_verbosity(verbosity),
    )
}

/// Initialize tracing from a full configuration.
///
/// Output always goes to stderr: stdout carries filter payloads that git
/// writes into the worktree or the object store.
pub fn init_tracing_with_config(config: LogConfig) -> Result<(), LogError> {
    let filter = build_env_filter(&config)?;
    let registry = Registry::default().with(filter);

    let result = match config.format {
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(config.include_targets)
                    .with_ansi(config.use_color)
                    .without_time()
                    .pretty(),
            )
            .try_init(),
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(config.include_targets)
                    .with_ansi(config.use_color)
                    .without_time()
                    .compact(),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .json()
                    .with_target(config.include_targets),
            )
            .try_init(),
    };

    result.map_err(|e| LogError::ConfigError(e.to_string()))
}

fn build_env_filter(config: &LogConfig) -> Result<EnvFilter, LogError> {
    let directive = config.effective_filter();
    EnvFilter::try_new(&directive)
        .map_err(|e| LogError::ConfigError(format!("bad log filter '{directive}': {e}")))
}
