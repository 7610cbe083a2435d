// Git-Bifrost - Large File Transport for Git
// Copyright (C) 2026 Bifrost Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.

//! Storage layer for git-bifrost
//!
//! This crate provides the two halves of blob storage:
//!
//! - [`BlobCache`]: the content-addressed cache under `.git/bifrost/data`,
//!   keyed by digest with a three-level hex fanout and idempotent,
//!   atomically-renamed writes.
//! - [`StoreBackend`]: the session contract every configured store transport
//!   implements, with per-scheme backends for `file`, `ftp`/`ftps` and
//!   `sftp`, selected through [`registry::open_store`].
//!
//! A store session is owned by the calling operation: `open` establishes the
//! connection, `push`/`pull` move whole objects by their cache-relative name,
//! and `close` releases the session. Pull distinguishes *absent* (`Ok(None)`)
//! from transport failure (`Err`), which the smudge filter relies on to fail
//! over to the next store.
//!
//! # Examples
//!
//! ```no_run
//! use bifrost_storage::{registry, BlobCache, PushOutcome};
//! use bifrost_config::StoreRecord;
//!
//! # async fn example(record: &StoreRecord) -> anyhow::Result<()> {
//! let cache = BlobCache::new(".git/bifrost/data");
//! let digest = "2AAE6C35C94FCFB415DBE95F408B9CE91EE846ED";
//!
//! let mut store = registry::open_store(record).await?;
//! let outcome = store
//!     .push(&cache.blob_path(digest), &BlobCache::relative_path(digest))
//!     .await?;
//! assert!(!matches!(outcome, PushOutcome::Failed));
//! store.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod error;
pub mod file;
pub mod ftp;
pub mod mock;
pub mod registry;
pub mod sftp;

use async_trait::async_trait;
use std::fmt::Debug;
use std::path::Path;

pub use cache::BlobCache;
pub use error::{StoreError, StoreResult};
pub use file::FileBackend;
pub use ftp::FtpBackend;
pub use mock::MemoryBackend;
pub use sftp::SftpBackend;

/// Result of pushing one object to a store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Bytes were transferred and the destination now holds them
    Success,

    /// The destination already held the bytes; nothing was transferred
    Skipped,

    /// The transfer was attempted before the transport noticed the
    /// destination already held the bytes
    SkippedLate,

    /// The transfer failed; the store must not be trusted for this push
    Failed,
}

impl PushOutcome {
    /// Whether the destination holds the object after this outcome.
    pub fn is_stored(self) -> bool {
        !matches!(self, PushOutcome::Failed)
    }
}

/// Session contract for a configured store transport
///
/// Implementations are stateful sessions: [`open`](StoreBackend::open) must
/// be called before any transfer and [`close`](StoreBackend::close) after the
/// last one (or after the first hard failure). Object names are
/// cache-relative paths as produced by [`BlobCache::relative_path`], using
/// `/` separators regardless of platform.
#[async_trait]
pub trait StoreBackend: Send + Debug {
    /// Establish the session: connect and authenticate.
    ///
    /// Failure is recoverable for the caller (skip this store); calling
    /// `open` again on the same backend is permitted.
    async fn open(&mut self) -> StoreResult<()>;

    /// Upload the file at `local_path` to `relative_name` within the store.
    ///
    /// Returns [`PushOutcome::Skipped`] when the destination is detected to
    /// already hold the bytes before transfer, [`PushOutcome::SkippedLate`]
    /// when that is detected only afterwards, and [`PushOutcome::Failed`] on
    /// a hard transfer error. `Err` is reserved for protocol misuse such as
    /// transferring on an unopened session.
    async fn push(&mut self, local_path: &Path, relative_name: &str) -> StoreResult<PushOutcome>;

    /// Download the full bytes of `relative_name`, or `None` if the store
    /// does not hold the object. Transport failures are `Err`.
    async fn pull(&mut self, relative_name: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Release session resources. Idempotent.
    async fn close(&mut self) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trait_is_object_safe() {
        fn _check_object_safe(_: &dyn StoreBackend) {}
    }

    #[test]
    fn test_push_outcome_stored() {
        assert!(PushOutcome::Success.is_stored());
        assert!(PushOutcome::Skipped.is_stored());
        assert!(PushOutcome::SkippedLate.is_stored());
        assert!(!PushOutcome::Failed.is_stored());
    }
}
