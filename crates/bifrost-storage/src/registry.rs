// SPDX-License-Identifier: AGPL-3.0
// Copyright (C) 2026 Bifrost Contributors

//! Scheme-to-transport registry
//!
//! Maps a store record's URI scheme to its backend implementation and opens
//! the session. Unknown schemes are an [`StoreError::UnsupportedScheme`];
//! callers decide whether that skips the store (smudge, push) or aborts the
//! operation (verify).

use crate::error::{StoreError, StoreResult};
use crate::{FileBackend, FtpBackend, SftpBackend, StoreBackend};
use bifrost_config::StoreRecord;
use tracing::debug;

/// Construct the backend for a record without opening the session.
pub fn backend_for(record: &StoreRecord) -> StoreResult<Box<dyn StoreBackend>> {
    match record.url.scheme() {
        "file" => Ok(Box::new(FileBackend::new(&record.url)?)),
        "ftp" | "ftps" => Ok(Box::new(FtpBackend::new(record)?)),
        "sftp" => Ok(Box::new(SftpBackend::new(record)?)),
        other => Err(StoreError::UnsupportedScheme(other.to_string())),
    }
}

/// Construct and open the backend for a record.
pub async fn open_store(record: &StoreRecord) -> StoreResult<Box<dyn StoreBackend>> {
    let mut backend = backend_for(record)?;
    backend.open().await?;
    debug!(store = %record.url, name = %record.name, "store opened");
    Ok(backend)
}
