// SPDX-License-Identifier: AGPL-3.0
// Copyright (C) 2026 Bifrost Contributors

//! Error types for catalog and threshold configuration

use thiserror::Error;

/// Result type alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while building the store catalog
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A declared store has no `url` key
    #[error("store '{0}' is missing the required url key")]
    MissingUrl(String),

    /// A store url did not parse as an absolute URI
    #[error("store '{name}' has an invalid url '{url}': {source}")]
    InvalidUrl {
        name: String,
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// A config value could not be interpreted for its key
    #[error("invalid value '{value}' for config key '{key}'")]
    InvalidValue { key: String, value: String },

    /// A config line was not of the `store.<name>.<key> <value>` shape
    #[error("malformed config line: '{0}'")]
    MalformedLine(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_store() {
        let err = ConfigError::MissingUrl("depot".to_string());
        assert!(err.to_string().contains("depot"));

        let err = ConfigError::InvalidValue {
            key: "store.depot.primary".to_string(),
            value: "yes".to_string(),
        };
        assert!(err.to_string().contains("store.depot.primary"));
        assert!(err.to_string().contains("yes"));
    }
}
