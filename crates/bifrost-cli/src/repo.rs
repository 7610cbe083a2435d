// SPDX-License-Identifier: AGPL-3.0
// Copyright (C) 2026 Bifrost Contributors

//! Repository context discovery.
//!
//! Resolves the enclosing repository, its blob cache location and its
//! bifrost configuration. The catalog comes from `store.*` entries in
//! `.gitbifrost`, overlaid by `.gitbifrostuser` when present; both are read
//! through git's own config parser so quoting and include rules match git's.

use anyhow::{Context, Result};
use bifrost_config::{Catalog, SizeThresholds, CONFIG_FILE, USER_CONFIG_FILE};
use bifrost_git::Git;
use bifrost_storage::BlobCache;
use std::path::PathBuf;
use tracing::debug;

const STORE_KEY_PATTERN: &str = r"store\..*";

/// A discovered repository with its cache and configuration sources
pub struct RepoContext {
    pub git: Git,
    pub cache: BlobCache,
    pub toplevel: PathBuf,
    pub git_dir: PathBuf,
}

impl RepoContext {
    /// Discover the repository enclosing the current directory.
    pub async fn discover() -> Result<Self> {
        let probe = Git::new();
        let toplevel = probe
            .toplevel()
            .await
            .context("not inside a git repository")?;

        let git = Git::in_dir(&toplevel);
        let git_dir = git.git_dir().await.context("failed to locate .git")?;
        let cache = BlobCache::new(git_dir.join("bifrost").join("data"));
        debug!(toplevel = %toplevel.display(), cache = %cache.root().display(), "repository discovered");

        Ok(RepoContext {
            git,
            cache,
            toplevel,
            git_dir,
        })
    }

    /// Load the store catalog from the repository's config files.
    pub async fn catalog(&self) -> Result<Catalog> {
        let mut lines = self
            .git
            .config_get_regex(STORE_KEY_PATTERN, &self.config_path(CONFIG_FILE))
            .await?;
        lines.extend(
            self.git
                .config_get_regex(STORE_KEY_PATTERN, &self.config_path(USER_CONFIG_FILE))
                .await?,
        );
        Catalog::from_config_lines(lines).context("invalid store configuration")
    }

    /// Load the pre-commit size thresholds.
    pub async fn thresholds(&self) -> Result<SizeThresholds> {
        let file = self.config_path(CONFIG_FILE);
        let text = self
            .git
            .config_get_int("repo.text-size-threshold", &file)
            .await?;
        let binary = self
            .git
            .config_get_int("repo.bin-size-threshold", &file)
            .await?;
        Ok(SizeThresholds::from_config_values(text, binary))
    }

    fn config_path(&self, file: &str) -> String {
        self.toplevel.join(file).to_string_lossy().into_owned()
    }
}
