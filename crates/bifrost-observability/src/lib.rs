//! Structured logging for git-bifrost
//!
//! All diagnostics go through `tracing` to **stderr**; stdout is reserved for
//! filter payloads (the smudge and clean outputs git consumes). The default
//! level comes from the `GITBIFROST_VERBOSITY` environment variable
//! (`normal`, `loud` or `debug`); `RUST_LOG` overrides it with a full filter
//! expression when set.
//!
//! # Example
//!
//! ```ignore
//! use bifrost_observability::{init_tracing, LogFormat, Verbosity};
//!
//! init_tracing(LogFormat::Compact, Verbosity::from_env())?;
//! tracing::info!("ready");
//! ```

pub mod config;
pub mod initialization;

pub use config::{LogConfig, LogError, LogFormat, Verbosity, VERBOSITY_ENV};
pub use initialization::{init_tracing, init_tracing_with_config};

/// Tracing re-exports for convenience
pub use tracing::{debug, error, info, trace, warn};
