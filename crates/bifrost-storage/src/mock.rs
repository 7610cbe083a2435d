// SPDX-License-Identifier: AGPL-3.0
// Copyright (C) 2026 Bifrost Contributors

//! In-memory store backend for testing
//!
//! Implements [`StoreBackend`](crate::StoreBackend) over a shared `HashMap`,
//! with knobs to refuse `open` and to report late skips, so filter and hook
//! code can be exercised against failing or already-populated stores without
//! any network.

use crate::error::{StoreError, StoreResult};
use crate::{PushOutcome, StoreBackend};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory store backend for tests
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    objects: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    fail_open: bool,
    skip_late: bool,
    open: bool,
}

impl MemoryBackend {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose `open` always fails.
    pub fn failing_open() -> Self {
        MemoryBackend {
            fail_open: true,
            ..Self::default()
        }
    }

    /// Report `SkippedLate` instead of `Skipped` for objects already held.
    pub fn with_late_skips(mut self) -> Self {
        self.skip_late = true;
        self
    }

    /// Seed an object directly, bypassing the session contract. Tests use
    /// this to plant corrupt bytes under a given name.
    pub async fn insert(&self, relative_name: &str, data: Vec<u8>) {
        self.objects
            .write()
            .await
            .insert(relative_name.to_string(), data);
    }

    /// Number of objects held.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    /// Whether the store holds no objects.
    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl StoreBackend for MemoryBackend {
    async fn open(&mut self) -> StoreResult<()> {
        if self.fail_open {
            return Err(StoreError::open_failed("memory://", "open refused"));
        }
        self.open = true;
        Ok(())
    }

    async fn push(&mut self, local_path: &Path, relative_name: &str) -> StoreResult<PushOutcome> {
        if !self.open {
            return Err(StoreError::NotOpen("memory://".to_string()));
        }
        let data = match std::fs::read(local_path) {
            Ok(data) => data,
            Err(_) => return Ok(PushOutcome::Failed),
        };

        let mut objects = self.objects.write().await;
        if let Some(existing) = objects.get(relative_name) {
            if *existing == data {
                return Ok(if self.skip_late {
                    PushOutcome::SkippedLate
                } else {
                    PushOutcome::Skipped
                });
            }
        }
        objects.insert(relative_name.to_string(), data);
        Ok(PushOutcome::Success)
    }

    async fn pull(&mut self, relative_name: &str) -> StoreResult<Option<Vec<u8>>> {
        if !self.open {
            return Err(StoreError::NotOpen("memory://".to_string()));
        }
        Ok(self.objects.read().await.get(relative_name).cloned())
    }

    async fn close(&mut self) -> StoreResult<()> {
        self.open = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_push_pull_roundtrip() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("blob");
        std::fs::write(&src, b"payload").unwrap();

        let mut backend = MemoryBackend::new();
        backend.open().await.unwrap();
        assert_eq!(backend.push(&src, "a/b/c.bin").await.unwrap(), PushOutcome::Success);
        assert_eq!(backend.pull("a/b/c.bin").await.unwrap().unwrap(), b"payload");
    }

    #[tokio::test]
    async fn test_duplicate_push_skips() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("blob");
        std::fs::write(&src, b"payload").unwrap();

        let mut backend = MemoryBackend::new();
        backend.open().await.unwrap();
        backend.push(&src, "a/b/c.bin").await.unwrap();
        assert_eq!(backend.push(&src, "a/b/c.bin").await.unwrap(), PushOutcome::Skipped);

        let mut late = MemoryBackend::new().with_late_skips();
        late.open().await.unwrap();
        late.push(&src, "a/b/c.bin").await.unwrap();
        assert_eq!(late.push(&src, "a/b/c.bin").await.unwrap(), PushOutcome::SkippedLate);
    }

    #[tokio::test]
    async fn test_failing_open() {
        let mut backend = MemoryBackend::failing_open();
        assert!(backend.open().await.is_err());
    }

    #[tokio::test]
    async fn test_absent_pull_is_none() {
        let mut backend = MemoryBackend::new();
        backend.open().await.unwrap();
        assert!(backend.pull("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clones_share_objects() {
        let backend = MemoryBackend::new();
        let mut a = backend.clone();
        let mut b = backend.clone();
        a.open().await.unwrap();
        b.open().await.unwrap();

        backend.insert("x", b"data".to_vec()).await;
        assert_eq!(a.pull("x").await.unwrap().unwrap(), b"data");
        assert_eq!(b.pull("x").await.unwrap().unwrap(), b"data");
    }
}
