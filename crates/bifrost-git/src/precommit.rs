// SPDX-License-Identifier: AGPL-3.0
// Copyright (C) 2026 Bifrost Contributors

//! Pre-commit guard
//!
//! Walks the staged paths and rejects the commit when either invariant is
//! broken:
//!
//! - a path carrying `filter=bifrost` whose staged content does not begin
//!   with the proxy sentinel (the clean filter was not applied, typically
//!   because attributes changed after staging);
//! - an unfiltered blob larger than the size threshold for its kind.
//!
//! Binary classification uses the `binary` attribute when set either way,
//! otherwise a NUL-byte scan over the first 4,000 bytes of the blob.

use crate::error::{GitError, GitResult};
use crate::git::Git;
use crate::proxy::SENTINEL;
use bifrost_config::SizeThresholds;
use std::fmt;
use tracing::debug;

/// Attribute value that routes a path through the bifrost filter.
pub const FILTER_NAME: &str = "bifrost";

const NUL_SCAN_WINDOW: usize = 4_000;

/// Why a staged path blocks the commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Offence {
    /// `filter=bifrost` path whose staged content is not a proxy
    RequiresRestage,

    /// Unfiltered blob above its size threshold
    OversizeUnfiltered { size: u64, binary: bool },
}

/// A staged path that failed the guard, with its diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlaggedFile {
    pub path: String,
    pub offence: Offence,
}

impl fmt::Display for FlaggedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.offence {
            Offence::RequiresRestage => write!(
                f,
                "File '{}' is marked filter={} but its staged content is not a proxy.",
                self.path, FILTER_NAME
            ),
            Offence::OversizeUnfiltered { size, binary } => {
                let kind = if *binary { "Binary" } else { "Text" };
                write!(
                    f,
                    "{kind} file too big '{}' ({} bytes).",
                    self.path,
                    group_digits(*size)
                )
            }
        }
    }
}

/// Outcome of a guard run
#[derive(Debug, Default)]
pub struct PrecommitReport {
    /// Paths examined, in staged order
    pub checked: usize,

    /// Offending paths, in staged order
    pub flagged: Vec<FlaggedFile>,
}

impl PrecommitReport {
    /// Whether the commit may proceed.
    pub fn passed(&self) -> bool {
        self.flagged.is_empty()
    }

    /// Whether any flagged file needs re-staging (vs. attribute changes).
    pub fn needs_restage(&self) -> bool {
        self.flagged
            .iter()
            .any(|file| file.offence == Offence::RequiresRestage)
    }
}

/// The pre-commit hook implementation
#[derive(Debug)]
pub struct PrecommitGuard {
    git: Git,
    thresholds: SizeThresholds,
}

impl PrecommitGuard {
    pub fn new(git: Git, thresholds: SizeThresholds) -> Self {
        PrecommitGuard { git, thresholds }
    }

    /// Check every staged path, reporting progress as `(done, total)`.
    pub async fn run<F>(&self, mut progress: F) -> GitResult<PrecommitReport>
    where
        F: FnMut(usize, usize),
    {
        let paths = self.git.staged_paths().await?;
        let total = paths.len();
        let mut report = PrecommitReport::default();

        for (index, path) in paths.into_iter().enumerate() {
            if let Some(offence) = self.check_path(&path).await? {
                report.flagged.push(FlaggedFile { path, offence });
            }
            report.checked += 1;
            progress(index + 1, total);
        }

        Ok(report)
    }

    async fn check_path(&self, path: &str) -> GitResult<Option<Offence>> {
        let spec = format!(":{path}");
        let filtered = self.git.filter_attribute(path).await?.as_deref() == Some(FILTER_NAME);

        let result = if filtered {
            self.check_filtered(&spec).await
        } else {
            self.check_unfiltered(path, &spec).await
        };

        match result {
            // A staged deletion has no blob behind its path; nothing to check.
            Err(GitError::CommandFailed { .. }) => {
                debug!(path, "no staged blob for path; skipping");
                Ok(None)
            }
            other => other,
        }
    }

    async fn check_filtered(&self, spec: &str) -> GitResult<Option<Offence>> {
        let head = self.git.read_blob_prefix(spec, SENTINEL.len()).await?;
        if head == SENTINEL.as_bytes() {
            Ok(None)
        } else {
            Ok(Some(Offence::RequiresRestage))
        }
    }

    async fn check_unfiltered(&self, path: &str, spec: &str) -> GitResult<Option<Offence>> {
        let binary = match self.git.attribute_state(path, "binary").await? {
            Some(explicit) => explicit,
            None => {
                let head = self.git.read_blob_prefix(spec, NUL_SCAN_WINDOW).await?;
                head.contains(&0u8)
            }
        };

        let size = self.git.blob_size(spec).await?;
        if self.thresholds.exceeded(size, binary) {
            Ok(Some(Offence::OversizeUnfiltered { size, binary }))
        } else {
            Ok(None)
        }
    }
}

/// Render a byte count with thousands separators: `6000000` -> `6,000,000`.
pub fn group_digits(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_digits() {
        assert_eq!(group_digits(0), "0");
        assert_eq!(group_digits(999), "999");
        assert_eq!(group_digits(1_000), "1,000");
        assert_eq!(group_digits(6_000_000), "6,000,000");
        assert_eq!(group_digits(102_401), "102,401");
    }

    #[test]
    fn test_oversize_text_message() {
        let flagged = FlaggedFile {
            path: "big.txt".to_string(),
            offence: Offence::OversizeUnfiltered {
                size: 6_000_000,
                binary: false,
            },
        };
        assert_eq!(
            flagged.to_string(),
            "Text file too big 'big.txt' (6,000,000 bytes)."
        );
    }

    #[test]
    fn test_oversize_binary_message() {
        let flagged = FlaggedFile {
            path: "asset.bin".to_string(),
            offence: Offence::OversizeUnfiltered {
                size: 200_000,
                binary: true,
            },
        };
        assert_eq!(
            flagged.to_string(),
            "Binary file too big 'asset.bin' (200,000 bytes)."
        );
    }

    #[test]
    fn test_restage_message_names_the_file() {
        let flagged = FlaggedFile {
            path: "asset.bin".to_string(),
            offence: Offence::RequiresRestage,
        };
        assert!(flagged.to_string().contains("asset.bin"));
        assert!(flagged.to_string().contains("filter=bifrost"));
    }

    #[test]
    fn test_report_pass_and_restage_flags() {
        let mut report = PrecommitReport::default();
        assert!(report.passed());
        assert!(!report.needs_restage());

        report.flagged.push(FlaggedFile {
            path: "asset.bin".to_string(),
            offence: Offence::RequiresRestage,
        });
        assert!(!report.passed());
        assert!(report.needs_restage());
    }
}
