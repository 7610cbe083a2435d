// SPDX-License-Identifier: AGPL-3.0
// Copyright (C) 2026 Bifrost Contributors

//! Pre-push hook command.
//!
//! git invokes this with the destination remote's name and URL as arguments
//! and one `<local_ref> <local_sha> <remote_ref> <remote_sha>` line per ref
//! on stdin.

use crate::output;
use crate::repo::RepoContext;
use anyhow::{Context, Result};
use bifrost_git::{parse_push_records, PrePushOrchestrator};
use clap::Args;
use tokio::io::AsyncReadExt;

#[derive(Debug, Args)]
pub struct HookPrePushCmd {
    /// Name of the destination remote
    #[arg(value_name = "REMOTE_NAME")]
    pub remote_name: String,

    /// URL of the destination remote
    #[arg(value_name = "REMOTE_URL")]
    pub remote_url: String,
}

impl HookPrePushCmd {
    pub async fn execute(self) -> Result<()> {
        let mut input = String::new();
        tokio::io::stdin()
            .read_to_string(&mut input)
            .await
            .context("failed to read push records from stdin")?;
        let records = parse_push_records(&input);

        let ctx = RepoContext::discover().await?;
        let catalog = ctx.catalog().await?;
        let orchestrator = PrePushOrchestrator::new(ctx.git.clone(), ctx.cache.clone(), catalog);

        let summary = orchestrator
            .run(&self.remote_name, &self.remote_url, &records)
            .await
            .with_context(|| format!("pre-push replication to '{}' failed", self.remote_name))?;

        if summary.proxies > 0 {
            output::info(&format!(
                "replicated {} blob(s) to {} store(s): {} copied, {} already present, {} late-skipped",
                summary.proxies,
                summary.stores_updated,
                summary.copied,
                summary.skipped,
                summary.skipped_late,
            ));
        }

        Ok(())
    }
}
