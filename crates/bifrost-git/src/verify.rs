// SPDX-License-Identifier: AGPL-3.0
// Copyright (C) 2026 Bifrost Contributors

//! Verify sweep
//!
//! Audits a single store against every proxy reachable in history: each
//! referenced blob is pulled from the store and checked for presence, length
//! and digest. The number of bad files is the sweep's result (and the
//! process exit status of the `verify` command).

use crate::error::GitResult;
use crate::git::Git;
use crate::proxy::{digest_hex, ProxyFile};
use bifrost_storage::{BlobCache, StoreBackend};
use std::collections::HashMap;
use tracing::{debug, warn};

const PROXY_READ_LIMIT: usize = 256;

/// Options for a verify sweep
#[derive(Debug, Clone, Copy, Default)]
pub struct VerifyOptions {
    /// Report healthy entries too
    pub verbose: bool,
}

/// Health of one store object, shared by every history entry naming it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectHealth {
    pub missing: bool,
    pub wrong_size: bool,
    pub bad_digest: bool,
}

impl ObjectHealth {
    const OK: ObjectHealth = ObjectHealth {
        missing: false,
        wrong_size: false,
        bad_digest: false,
    };

    /// Whether any check failed.
    pub fn is_bad(&self) -> bool {
        self.missing || self.wrong_size || self.bad_digest
    }

    /// Short condition list for diagnostics, e.g. `missing`, `wrong-size`.
    pub fn conditions(&self) -> Vec<&'static str> {
        let mut conditions = Vec::new();
        if self.missing {
            conditions.push("missing");
        }
        if self.wrong_size {
            conditions.push("wrong-size");
        }
        if self.bad_digest {
            conditions.push("bad-digest");
        }
        conditions
    }
}

/// One checked history entry
#[derive(Debug, Clone)]
pub struct VerifyEntry {
    /// `commit:path` naming the proxy
    pub revision: String,

    /// Digest the proxy claims
    pub digest: String,

    pub health: ObjectHealth,
}

/// Result of sweeping one store
#[derive(Debug, Default)]
pub struct VerifyReport {
    /// Every proxy-bearing entry examined
    pub entries: Vec<VerifyEntry>,

    /// Commits walked
    pub commits: usize,
}

impl VerifyReport {
    /// Count of entries with at least one failed condition.
    pub fn bad_files(&self) -> usize {
        self.entries.iter().filter(|e| e.health.is_bad()).count()
    }

    /// Whether the store holds valid bytes for every reachable proxy.
    pub fn clean(&self) -> bool {
        self.bad_files() == 0
    }
}

/// Sweep one opened store against all reachable history
pub struct VerifySweep<'a> {
    git: &'a Git,
    store: &'a mut dyn StoreBackend,
}

impl<'a> VerifySweep<'a> {
    /// The store session must already be open; the caller owns `close`.
    pub fn new(git: &'a Git, store: &'a mut dyn StoreBackend) -> Self {
        VerifySweep { git, store }
    }

    pub async fn run(&mut self, options: VerifyOptions) -> GitResult<VerifyReport> {
        let commits = self.git.rev_list_all().await?;
        let mut report = VerifyReport {
            commits: commits.len(),
            ..VerifyReport::default()
        };

        // Many entries reference the same blob; each object is pulled and
        // checked once.
        let mut checked: HashMap<String, ObjectHealth> = HashMap::new();

        for commit in commits {
            for entry in self.git.changed_entries(&commit).await? {
                if entry.status == 'D' {
                    continue;
                }

                let spec = format!("{commit}:{}", entry.path);
                let head = match self.git.read_blob_prefix(&spec, PROXY_READ_LIMIT).await {
                    Ok(head) => head,
                    Err(_) => continue,
                };
                let Ok(proxy) = ProxyFile::parse(&head) else {
                    continue;
                };

                let health = match checked.get(&proxy.digest) {
                    Some(health) => *health,
                    None => {
                        let health = self.check_object(&proxy).await;
                        checked.insert(proxy.digest.clone(), health);
                        health
                    }
                };

                if health.is_bad() {
                    warn!(revision = %spec, digest = %proxy.digest,
                        conditions = ?health.conditions(), "bad store object");
                } else {
                    debug!(revision = %spec, digest = %proxy.digest, "object ok");
                }

                if health.is_bad() || options.verbose {
                    report.entries.push(VerifyEntry {
                        revision: spec,
                        digest: proxy.digest,
                        health,
                    });
                }
            }
        }

        Ok(report)
    }

    async fn check_object(&mut self, proxy: &ProxyFile) -> ObjectHealth {
        let relative = BlobCache::relative_path(&proxy.digest);
        match self.store.pull(&relative).await {
            Ok(Some(data)) => ObjectHealth {
                missing: false,
                wrong_size: data.len() as u64 != proxy.size,
                bad_digest: digest_hex(&data) != proxy.digest,
            },
            Ok(None) => ObjectHealth {
                missing: true,
                ..ObjectHealth::OK
            },
            Err(e) => {
                warn!(digest = %proxy.digest, error = %e, "pull failed during verify");
                ObjectHealth {
                    missing: true,
                    ..ObjectHealth::OK
                }
            }
        }
    }
}
