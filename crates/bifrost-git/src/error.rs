// SPDX-License-Identifier: AGPL-3.0
// Copyright (C) 2026 Bifrost Contributors

//! Error types for proxy handling, git plumbing and hook operations

use std::path::PathBuf;
use thiserror::Error;

/// Result type for git-bifrost operations
pub type GitResult<T> = Result<T, GitError>;

/// Errors raised by the filter, hook and verify operations
#[derive(Debug, Error)]
pub enum GitError {
    /// Input stream does not begin with the proxy sentinel
    #[error("content is not a bifrost proxy")]
    NotAProxy,

    /// Sentinel recognized but the proxy body is malformed
    #[error("corrupt proxy: {0}")]
    CorruptProxy(String),

    /// The clean filter received a proxy as input
    #[error("refusing to clean '{0}': input is already a proxy")]
    DoubleClean(String),

    /// No store could provide verified bytes for a proxy
    #[error("no store holds a valid blob for '{path}' (digest {digest})")]
    BlobUnavailable { path: String, digest: String },

    /// Local cache directory is gone while there are blobs to push
    #[error("local cache missing at {0}; cannot source blobs for push")]
    CacheMissing(PathBuf),

    /// A referenced blob was not found in the local cache during push
    #[error("blob {digest} is not in the local cache; cannot push it")]
    MissingLocalSource { digest: String },

    /// A push completed without updating any primary store
    #[error("no primary store was updated for remote '{remote}'")]
    NoPrimaryUpdated { remote: String },

    /// A transfer to a store failed hard mid-push
    #[error("push to store {store} failed")]
    PushFailed { store: String },

    /// git reported an 'X' (unknown) status entry
    #[error("git reported an unknown status for {commit}:{path}")]
    VcsInternal { commit: String, path: String },

    /// A git subprocess exited non-zero
    #[error("git {command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    /// I/O error talking to a subprocess or the filesystem
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog or threshold configuration error
    #[error(transparent)]
    Config(#[from] bifrost_config::ConfigError),

    /// Cache or store error
    #[error(transparent)]
    Store(#[from] bifrost_storage::StoreError),
}
