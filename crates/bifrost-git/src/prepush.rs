// SPDX-License-Identifier: AGPL-3.0
// Copyright (C) 2026 Bifrost Contributors

//! Pre-push orchestrator
//!
//! Runs in two phases. Phase one walks every outgoing revision, parses each
//! changed blob as a potential proxy and collects the referenced digests.
//! Phase two replicates the backing blobs from the local cache to every
//! catalog store bound to the destination remote; the push succeeds only if
//! at least one primary store is brought up to date without a hard failure.

use crate::error::{GitError, GitResult};
use crate::git::{Git, ZERO_SHA};
use crate::proxy::ProxyFile;
use bifrost_config::Catalog;
use bifrost_storage::{registry, BlobCache, PushOutcome, StoreBackend, StoreError};
use tracing::{debug, error, info, warn};

// Enough bytes for sentinel, version, digest and length lines.
const PROXY_READ_LIMIT: usize = 256;

/// One line of the pre-push hook's stdin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushRecord {
    pub local_ref: String,
    pub local_sha: String,
    pub remote_ref: String,
    pub remote_sha: String,
}

impl PushRecord {
    /// Parse a `<local_ref> <local_sha> <remote_ref> <remote_sha>` line.
    pub fn parse(line: &str) -> Option<Self> {
        let mut fields = line.split_whitespace();
        let record = PushRecord {
            local_ref: fields.next()?.to_string(),
            local_sha: fields.next()?.to_string(),
            remote_ref: fields.next()?.to_string(),
            remote_sha: fields.next()?.to_string(),
        };
        match fields.next() {
            None => Some(record),
            Some(_) => None,
        }
    }

    /// A deletion push carries the zero id and ships no objects.
    pub fn is_delete(&self) -> bool {
        self.local_sha == ZERO_SHA
    }
}

/// Parse every record line from the hook's stdin.
pub fn parse_push_records(input: &str) -> Vec<PushRecord> {
    input.lines().filter_map(PushRecord::parse).collect()
}

/// Tally of one pre-push replication run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PushSummary {
    /// Distinct proxies referenced by the outgoing revisions
    pub proxies: usize,

    /// Per-object outcomes across all stores
    pub copied: usize,
    pub skipped: usize,
    pub skipped_late: usize,

    /// Stores fully brought up to date
    pub stores_updated: usize,

    /// Primary stores among them
    pub primaries_updated: usize,
}

/// The pre-push hook implementation
#[derive(Debug)]
pub struct PrePushOrchestrator {
    git: Git,
    cache: BlobCache,
    catalog: Catalog,
}

impl PrePushOrchestrator {
    pub fn new(git: Git, cache: BlobCache, catalog: Catalog) -> Self {
        PrePushOrchestrator {
            git,
            cache,
            catalog,
        }
    }

    /// Replicate every proxy referenced by the outgoing revisions.
    pub async fn run(
        &self,
        remote_name: &str,
        remote_url: &str,
        records: &[PushRecord],
    ) -> GitResult<PushSummary> {
        let digests = self.collect_proxies(remote_name, records).await?;

        if digests.is_empty() {
            // Nothing outgoing references a proxy; an absent cache is fine.
            debug!(remote = remote_name, "no proxies in outgoing revisions");
            return Ok(PushSummary::default());
        }

        if !self.cache.root_exists() {
            return Err(GitError::CacheMissing(self.cache.root().to_path_buf()));
        }

        let mut summary = PushSummary {
            proxies: digests.len(),
            ..PushSummary::default()
        };

        for record in self.catalog.stores_for_remote(remote_url) {
            let mut store = match registry::backend_for(record) {
                Ok(store) => store,
                Err(StoreError::UnsupportedScheme(scheme)) => {
                    warn!(store = %record.url, scheme, "skipping store with unsupported scheme");
                    continue;
                }
                Err(e) => {
                    warn!(store = %record.url, error = %e, "skipping unusable store");
                    continue;
                }
            };

            if let Err(e) = store.open().await {
                warn!(store = %record.url, error = %e, "store open failed; not updated");
                continue;
            }

            for digest in &digests {
                if !self.cache.contains(digest).await {
                    error!(
                        digest = %digest,
                        cache = %self.cache.root().display(),
                        "blob referenced by outgoing history is not in the local cache"
                    );
                    let _ = store.close().await;
                    return Err(GitError::MissingLocalSource {
                        digest: digest.clone(),
                    });
                }

                let local = self.cache.blob_path(digest);
                let relative = BlobCache::relative_path(digest);
                match store.push(&local, &relative).await {
                    Ok(PushOutcome::Success) => summary.copied += 1,
                    Ok(PushOutcome::Skipped) => summary.skipped += 1,
                    Ok(PushOutcome::SkippedLate) => summary.skipped_late += 1,
                    Ok(PushOutcome::Failed) => {
                        let _ = store.close().await;
                        return Err(GitError::PushFailed {
                            store: record.url.to_string(),
                        });
                    }
                    Err(e) => {
                        let _ = store.close().await;
                        return Err(e.into());
                    }
                }
            }

            let _ = store.close().await;
            summary.stores_updated += 1;
            if record.primary {
                summary.primaries_updated += 1;
            }
            info!(store = %record.url, primary = record.primary, "store updated");
        }

        if summary.primaries_updated == 0 {
            return Err(GitError::NoPrimaryUpdated {
                remote: remote_name.to_string(),
            });
        }

        Ok(summary)
    }

    /// Phase one: digests of every proxy referenced by outgoing commits.
    async fn collect_proxies(
        &self,
        remote_name: &str,
        records: &[PushRecord],
    ) -> GitResult<Vec<String>> {
        let mut digests: Vec<String> = Vec::new();

        for record in records {
            if record.is_delete() {
                continue;
            }

            let commits = self
                .git
                .rev_list_not_remotes(&record.local_ref, remote_name)
                .await?;
            debug!(
                local_ref = %record.local_ref,
                commits = commits.len(),
                "outgoing revisions"
            );

            for commit in commits {
                for entry in self.git.changed_entries(&commit).await? {
                    if entry.status == 'X' {
                        return Err(GitError::VcsInternal {
                            commit,
                            path: entry.path,
                        });
                    }
                    if entry.status == 'D' {
                        continue;
                    }

                    let spec = format!("{commit}:{}", entry.path);
                    let head = match self.git.read_blob_prefix(&spec, PROXY_READ_LIMIT).await {
                        Ok(head) => head,
                        Err(e) => {
                            // Submodule entries and the like have no blob.
                            debug!(spec = %spec, error = %e, "unreadable entry skipped");
                            continue;
                        }
                    };

                    if let Ok(proxy) = ProxyFile::parse(&head) {
                        if !digests.contains(&proxy.digest) {
                            digests.push(proxy.digest);
                        }
                    }
                }
            }
        }

        Ok(digests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_push_record() {
        let record = PushRecord::parse(
            "refs/heads/main 1111111111111111111111111111111111111111 \
             refs/heads/main 2222222222222222222222222222222222222222",
        )
        .unwrap();
        assert_eq!(record.local_ref, "refs/heads/main");
        assert!(!record.is_delete());
    }

    #[test]
    fn test_parse_push_record_delete() {
        let line = format!("(delete) {ZERO_SHA} refs/heads/gone 2222222222222222222222222222222222222222");
        assert!(PushRecord::parse(&line).unwrap().is_delete());
    }

    #[test]
    fn test_parse_push_record_rejects_malformed() {
        assert!(PushRecord::parse("too few fields").is_none());
        assert!(PushRecord::parse("a b c d e").is_none());
        assert!(PushRecord::parse("").is_none());
    }

    #[test]
    fn test_parse_push_records_stream() {
        let input = "refs/heads/main 1111111111111111111111111111111111111111 refs/heads/main 2222222222222222222222222222222222222222\n\
                     refs/tags/v1 3333333333333333333333333333333333333333 refs/tags/v1 4444444444444444444444444444444444444444\n";
        assert_eq!(parse_push_records(input).len(), 2);
    }
}
