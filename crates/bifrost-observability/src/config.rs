//! Logging configuration types.

use std::io;
use thiserror::Error;

/// Environment variable selecting the default diagnostic level.
pub const VERBOSITY_ENV: &str = "GITBIFROST_VERBOSITY";

/// Errors that can occur during logging configuration
#[derive(Error, Debug)]
pub enum LogError {
    #[error("invalid verbosity: {0}")]
    InvalidVerbosity(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("configuration error: {0}")]
    ConfigError(String),
}

/// Diagnostic verbosity, from `GITBIFROST_VERBOSITY`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Warnings and errors only
    #[default]
    Normal,

    /// Progress-level information
    Loud,

    /// Full diagnostic output
    Debug,
}

impl Verbosity {
    /// Parse a verbosity name, case-insensitively.
    pub fn parse(s: &str) -> Result<Self, LogError> {
        match s.to_ascii_lowercase().as_str() {
            "normal" => Ok(Verbosity::Normal),
            "loud" => Ok(Verbosity::Loud),
            "debug" => Ok(Verbosity::Debug),
            _ => Err(LogError::InvalidVerbosity(format!(
                "unknown verbosity '{s}'; expected one of: normal, loud, debug"
            ))),
        }
    }

    /// Verbosity from the environment; unset or unparseable means Normal.
    pub fn from_env() -> Self {
        std::env::var(VERBOSITY_ENV)
            .ok()
            .and_then(|value| Self::parse(&value).ok())
            .unwrap_or_default()
    }

    /// The tracing filter directive this verbosity maps to.
    pub fn filter_directive(self) -> &'static str {
        match self {
            Verbosity::Normal => "warn",
            Verbosity::Loud => "info",
            Verbosity::Debug => "debug",
        }
    }
}

/// Output format for logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Pretty-printed multi-line output
    Pretty,

    /// Compact single-line format
    #[default]
    Compact,

    /// JSON for machine-readable logs
    Json,
}

impl LogFormat {
    /// Parse a format name.
    pub fn parse(s: &str) -> Result<Self, LogError> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            _ => Err(LogError::ConfigError(format!(
                "unknown format '{s}'; expected one of: pretty, compact, json"
            ))),
        }
    }
}

/// Configuration for logging
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Output format for logs
    pub format: LogFormat,

    /// Default verbosity; `RUST_LOG` overrides it when set
    pub verbosity: Verbosity,

    /// Whether to use ANSI colors
    pub use_color: bool,

    /// Whether to include target module names
    pub include_targets: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            format: LogFormat::Compact,
            verbosity: Verbosity::Normal,
            use_color: true,
            include_targets: false,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn with_color(mut self, use_color: bool) -> Self {
        self.use_color = use_color;
        self
    }

    pub fn with_targets(mut self, include_targets: bool) -> Self {
        self.include_targets = include_targets;
        self
    }

    /// Effective filter expression: `RUST_LOG` wins over the verbosity.
    pub fn effective_filter(&self) -> String {
        std::env::var("RUST_LOG")
            .ok()
            .unwrap_or_else(|| self.verbosity.filter_directive().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_parsing() {
        assert_eq!(Verbosity::parse("normal").unwrap(), Verbosity::Normal);
        assert_eq!(Verbosity::parse("Loud").unwrap(), Verbosity::Loud);
        assert_eq!(Verbosity::parse("DEBUG").unwrap(), Verbosity::Debug);
        assert!(Verbosity::parse("shouty").is_err());
    }

    #[test]
    fn test_verbosity_filter_directives() {
        assert_eq!(Verbosity::Normal.filter_directive(), "warn");
        assert_eq!(Verbosity::Loud.filter_directive(), "info");
        assert_eq!(Verbosity::Debug.filter_directive(), "debug");
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!(LogFormat::parse("pretty").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("compact").unwrap(), LogFormat::Compact);
        assert_eq!(LogFormat::parse("JSON").unwrap(), LogFormat::Json);
        assert!(LogFormat::parse("xml").is_err());
    }

    #[test]
    fn test_config_builder() {
        let config = LogConfig::new()
            .with_format(LogFormat::Json)
            .with_verbosity(Verbosity::Debug)
            .with_color(false);

        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.verbosity, Verbosity::Debug);
        assert!(!config.use_color);
    }
}
