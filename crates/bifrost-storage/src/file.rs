// SPDX-License-Identifier: AGPL-3.0
// Copyright (C) 2026 Bifrost Contributors

//! Local filesystem store backend
//!
//! Backs `file://` store URIs. The store root is the URI path; objects live
//! beneath it under their cache-relative names. Writes go through a temporary
//! file and an atomic rename so concurrent pushers of the same object cannot
//! corrupt each other.

use crate::error::{StoreError, StoreResult};
use crate::{PushOutcome, StoreBackend};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use url::Url;

/// Store backend for `file://` URIs
#[derive(Debug)]
pub struct FileBackend {
    url: Url,
    root: PathBuf,
    open: bool,
}

impl FileBackend {
    /// Create a backend for a `file://` store URI.
    pub fn new(url: &Url) -> StoreResult<Self> {
        let root = url.to_file_path().map_err(|_| StoreError::InvalidUrl {
            url: url.to_string(),
            reason: "not a usable file path".to_string(),
        })?;
        Ok(FileBackend {
            url: url.clone(),
            root,
            open: false,
        })
    }

    /// Create a backend rooted at a plain directory path (test convenience).
    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let url = Url::from_directory_path(&root)
            .unwrap_or_else(|_| Url::parse("file:///").expect("static file url"));
        FileBackend {
            url,
            root,
            open: false,
        }
    }

    fn object_path(&self, relative_name: &str) -> PathBuf {
        let mut path = self.root.clone();
        for component in relative_name.split('/') {
            path.push(component);
        }
        path
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.open {
            Ok(())
        } else {
            Err(StoreError::NotOpen(self.url.to_string()))
        }
    }
}

#[async_trait]
impl StoreBackend for FileBackend {
    async fn open(&mut self) -> StoreResult<()> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StoreError::open_failed(self.url.as_str(), e))?;
        self.open = true;
        Ok(())
    }

    async fn push(&mut self, local_path: &Path, relative_name: &str) -> StoreResult<PushOutcome> {
        self.ensure_open()?;
        let dest = self.object_path(relative_name);

        let source_len = match fs::metadata(local_path).await {
            Ok(meta) => meta.len(),
            Err(e) => {
                tracing::warn!(store = %self.url, path = %local_path.display(), error = %e,
                    "local source unreadable");
                return Ok(PushOutcome::Failed);
            }
        };

        // Content addressing makes same-name same-content: matching size is
        // enough to skip the copy.
        if let Ok(meta) = fs::metadata(&dest).await {
            if meta.len() == source_len {
                debug!(store = %self.url, object = relative_name, "destination already current");
                return Ok(PushOutcome::Skipped);
            }
        }

        let result: std::io::Result<()> = async {
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent).await?;
            }
            let temp = dest.with_extension("bin.tmp");
            let data = fs::read(local_path).await?;
            let mut file = fs::File::create(&temp).await?;
            file.write_all(&data).await?;
            file.sync_all().await?;
            drop(file);
            fs::rename(&temp, &dest).await?;
            Ok(())
        }
        .await;

        match result {
            Ok(()) => Ok(PushOutcome::Success),
            Err(e) => {
                tracing::warn!(store = %self.url, object = relative_name, error = %e,
                    "transfer failed");
                Ok(PushOutcome::Failed)
            }
        }
    }

    async fn pull(&mut self, relative_name: &str) -> StoreResult<Option<Vec<u8>>> {
        self.ensure_open()?;
        match fs::read(self.object_path(relative_name)).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::transfer_failed(self.url.as_str(), e)),
        }
    }

    async fn close(&mut self) -> StoreResult<()> {
        self.open = false;
        Ok(())
    }
}
