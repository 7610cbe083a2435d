// SPDX-License-Identifier: AGPL-3.0
// Copyright (C) 2026 Bifrost Contributors

//! Content-addressed local blob cache
//!
//! The cache lives under `.git/bifrost/data` and is keyed by the blob digest.
//! For digest `H = h0 h1 h2 ...`, the blob is stored at `h0/h1/h2/H.bin`,
//! giving a 4096-way fanout so no single directory grows unbounded.
//!
//! Writes are idempotent and atomic: content for an existing digest is never
//! rewritten, and new content lands under a temporary name that is renamed
//! into place, so a reader can never observe a partially written blob under
//! its final name. There is no eviction; removal is outside the cache's
//! responsibility.

use crate::error::StoreResult;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Content-addressed blob cache with a three-level hex fanout
#[derive(Debug, Clone)]
pub struct BlobCache {
    root: PathBuf,
}

impl BlobCache {
    /// Create a handle on a cache rooted at `root`.
    ///
    /// The directory itself is only created on the first write; a missing
    /// root is a meaningful state the pre-push orchestrator inspects.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        BlobCache { root: root.into() }
    }

    /// The cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether the cache root exists on disk.
    pub fn root_exists(&self) -> bool {
        self.root.is_dir()
    }

    /// Cache-relative path for a digest: `h0/h1/h2/<DIGEST>.bin`.
    ///
    /// The same layout is used as the object name inside every store, so a
    /// store holding a blob mirrors the local cache exactly.
    pub fn relative_path(digest: &str) -> String {
        let mut chars = digest.chars();
        let h0 = chars.next().unwrap_or('0');
        let h1 = chars.next().unwrap_or('0');
        let h2 = chars.next().unwrap_or('0');
        format!("{h0}/{h1}/{h2}/{digest}.bin")
    }

    /// Absolute path of the cached blob for `digest`.
    pub fn blob_path(&self, digest: &str) -> PathBuf {
        let relative = Self::relative_path(digest);
        let mut path = self.root.clone();
        for component in relative.split('/') {
            path.push(component);
        }
        path
    }

    /// Whether the cache holds a blob for `digest`.
    pub async fn contains(&self, digest: &str) -> bool {
        fs::try_exists(self.blob_path(digest)).await.unwrap_or(false)
    }

    /// Store `data` under `digest`.
    ///
    /// Returns `false` without touching the filesystem when the blob is
    /// already present. Concurrent puts of the same digest are safe: both
    /// writers stage identical content and the rename is atomic.
    pub async fn put(&self, digest: &str, data: &[u8]) -> StoreResult<bool> {
        let path = self.blob_path(digest);

        if fs::try_exists(&path).await.unwrap_or(false) {
            debug!(digest, "blob already cached");
            return Ok(false);
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let temp_path = path.with_extension("bin.tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp_path, &path).await?;
        debug!(digest, bytes = data.len(), "blob cached");
        Ok(true)
    }

    /// Read the cached blob for `digest`, or `None` if not cached.
    pub async fn read(&self, digest: &str) -> StoreResult<Option<Vec<u8>>> {
        match fs::read(self.blob_path(digest)).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DIGEST: &str = "2AAE6C35C94FCFB415DBE95F408B9CE91EE846ED";

    #[test]
    fn test_relative_path_layout() {
        assert_eq!(
            BlobCache::relative_path(DIGEST),
            "2/A/A/2AAE6C35C94FCFB415DBE95F408B9CE91EE846ED.bin"
        );
    }

    #[tokio::test]
    async fn test_put_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let cache = BlobCache::new(temp_dir.path());

        assert!(!cache.contains(DIGEST).await);
        assert!(cache.put(DIGEST, b"hello world").await.unwrap());
        assert!(cache.contains(DIGEST).await);
        assert_eq!(cache.read(DIGEST).await.unwrap().unwrap(), b"hello world");
    }

    #[tokio::test]
    async fn test_put_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let cache = BlobCache::new(temp_dir.path());

        assert!(cache.put(DIGEST, b"hello world").await.unwrap());
        // Second put is a no-op and must not rewrite the existing blob.
        assert!(!cache.put(DIGEST, b"something else").await.unwrap());
        assert_eq!(cache.read(DIGEST).await.unwrap().unwrap(), b"hello world");
    }

    #[tokio::test]
    async fn test_put_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let cache = BlobCache::new(temp_dir.path());

        cache.put(DIGEST, b"hello world").await.unwrap();
        let path = cache.blob_path(DIGEST);
        assert!(path.exists());
        assert!(!path.with_extension("bin.tmp").exists());
    }

    #[tokio::test]
    async fn test_read_missing_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let cache = BlobCache::new(temp_dir.path());
        assert!(cache.read(DIGEST).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_root_exists_after_first_put() {
        let temp_dir = TempDir::new().unwrap();
        let cache = BlobCache::new(temp_dir.path().join("data"));

        assert!(!cache.root_exists());
        cache.put(DIGEST, b"hello world").await.unwrap();
        assert!(cache.root_exists());
    }

    #[tokio::test]
    async fn test_empty_blob() {
        let temp_dir = TempDir::new().unwrap();
        let cache = BlobCache::new(temp_dir.path());

        cache.put(DIGEST, b"").await.unwrap();
        assert_eq!(cache.read(DIGEST).await.unwrap().unwrap(), Vec::<u8>::new());
    }
}
