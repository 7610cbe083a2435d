// SPDX-License-Identifier: AGPL-3.0
// Copyright (C) 2026 Bifrost Contributors

//! Storage error types

use std::io;
use thiserror::Error;

/// Result type alias for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during cache and store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// No transport is registered for the URI scheme
    #[error("unsupported store scheme '{0}'")]
    UnsupportedScheme(String),

    /// The store URI is not usable by its transport
    #[error("unusable store url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Session establishment failed (connect or authenticate)
    #[error("failed to open store {url}: {reason}")]
    OpenFailed { url: String, reason: String },

    /// A transfer failed mid-session
    #[error("transfer failed on store {url}: {reason}")]
    TransferFailed { url: String, reason: String },

    /// A transfer was attempted on a session that is not open
    #[error("store session for {0} is not open")]
    NotOpen(String),

    /// I/O error on the local side
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Transparent wrapper for backend-specific errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StoreError {
    /// Create an OpenFailed error naming the store.
    pub fn open_failed(url: impl Into<String>, reason: impl ToString) -> Self {
        StoreError::OpenFailed {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a TransferFailed error naming the store.
    pub fn transfer_failed(url: impl Into<String>, reason: impl ToString) -> Self {
        StoreError::TransferFailed {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_name_the_store() {
        let err = StoreError::open_failed("ftp://host/data", "connection refused");
        assert!(err.to_string().contains("ftp://host/data"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_unsupported_scheme_message() {
        let err = StoreError::UnsupportedScheme("gopher".to_string());
        assert!(err.to_string().contains("gopher"));
    }
}
