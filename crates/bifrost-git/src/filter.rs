// SPDX-License-Identifier: AGPL-3.0
// Copyright (C) 2026 Bifrost Contributors

//! Clean and smudge filter driver
//!
//! The clean filter turns a blob into its proxy on the way into the index,
//! parking the real bytes in the local cache. The smudge filter reverses the
//! substitution at checkout, locating the bytes across the configured stores
//! in catalog order and refusing to emit anything that fails digest or
//! length verification.
//!
//! Both filters operate on fully buffered content: git pipes the whole blob
//! through the process, and the design assumes blobs fit in memory.

use crate::error::{GitError, GitResult};
use crate::proxy::ProxyFile;
use bifrost_config::{Catalog, StoreRecord};
use bifrost_storage::{registry, BlobCache, StoreBackend, StoreError};
use tracing::{debug, error, info, warn};

/// Driver for the clean and smudge filter operations
#[derive(Debug)]
pub struct FilterDriver {
    cache: BlobCache,
    catalog: Catalog,
}

impl FilterDriver {
    /// Create a driver over the repository's cache and store catalog.
    pub fn new(cache: BlobCache, catalog: Catalog) -> Self {
        FilterDriver { cache, catalog }
    }

    /// Clean filter: blob in, proxy out.
    ///
    /// The input is refused outright when it is already a proxy; emitting a
    /// proxy whose content is itself a proxy would corrupt history. On
    /// success the blob is cached and the encoded proxy returned.
    pub async fn clean(&self, path: &str, input: &[u8]) -> GitResult<Vec<u8>> {
        if ProxyFile::is_proxy(input) {
            return Err(GitError::DoubleClean(path.to_string()));
        }

        let proxy = ProxyFile::for_content(input);
        self.cache.put(&proxy.digest, input).await?;

        info!(
            path,
            digest = %proxy.digest,
            bytes = proxy.size,
            "clean: blob replaced by proxy"
        );
        Ok(proxy.encode())
    }

    /// Smudge filter: proxy in, blob out.
    ///
    /// Stores are tried in catalog order, the internal cache pseudo-store
    /// first; the first store whose bytes pass verification wins. Integrity
    /// failures are isolated to the offending store and do not fail the
    /// operation while another store can still serve valid bytes.
    pub async fn smudge(&self, path: &str, input: &[u8]) -> GitResult<Vec<u8>> {
        let proxy = ProxyFile::parse(input)?;
        debug!(path, digest = %proxy.digest, size = proxy.size, "smudge: resolving proxy");

        for record in self.catalog.stores() {
            match self.try_store(record, &proxy).await {
                Some(data) => {
                    self.cache.put(&proxy.digest, &data).await?;
                    info!(path, digest = %proxy.digest, store = %record.url, "smudge: blob restored");
                    return Ok(data);
                }
                None => continue,
            }
        }

        Err(GitError::BlobUnavailable {
            path: path.to_string(),
            digest: proxy.digest,
        })
    }

    /// Attempt one store; `None` means move on to the next.
    async fn try_store(&self, record: &StoreRecord, proxy: &ProxyFile) -> Option<Vec<u8>> {
        if record.is_internal() {
            return match self.cache.read(&proxy.digest).await {
                Ok(Some(data)) if proxy.matches(&data) => Some(data),
                Ok(Some(_)) => {
                    error!(
                        digest = %proxy.digest,
                        "integrity mismatch in local cache; trying configured stores"
                    );
                    None
                }
                Ok(None) => None,
                Err(e) => {
                    warn!(digest = %proxy.digest, error = %e, "local cache read failed");
                    None
                }
            };
        }

        let mut store = match registry::backend_for(record) {
            Ok(store) => store,
            Err(StoreError::UnsupportedScheme(scheme)) => {
                warn!(store = %record.url, scheme, "skipping store with unsupported scheme");
                return None;
            }
            Err(e) => {
                warn!(store = %record.url, error = %e, "skipping unusable store");
                return None;
            }
        };

        if let Err(e) = store.open().await {
            warn!(store = %record.url, error = %e, "store open failed");
            return None;
        }

        let relative = BlobCache::relative_path(&proxy.digest);
        let result = store.pull(&relative).await;
        let _ = store.close().await;

        match result {
            Ok(Some(data)) => {
                if proxy.matches(&data) {
                    Some(data)
                } else {
                    error!(
                        store = %record.url,
                        digest = %proxy.digest,
                        got_bytes = data.len(),
                        want_bytes = proxy.size,
                        "integrity mismatch: store returned bytes that do not match the proxy"
                    );
                    None
                }
            }
            Ok(None) => {
                debug!(store = %record.url, digest = %proxy.digest, "store does not hold blob");
                None
            }
            Err(e) => {
                warn!(store = %record.url, error = %e, "pull failed");
                None
            }
        }
    }
}
