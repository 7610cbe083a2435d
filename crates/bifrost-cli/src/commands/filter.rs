// SPDX-License-Identifier: AGPL-3.0
// Copyright (C) 2026 Bifrost Contributors

//! Clean and smudge filter commands.
//!
//! git invokes these with the blob (clean) or proxy (smudge) piped on stdin
//! and expects the transformed content on stdout. The path argument is
//! diagnostic only.

use crate::repo::RepoContext;
use anyhow::{Context, Result};
use clap::Args;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

#[derive(Debug, Args)]
pub struct FilterCleanCmd {
    /// Worktree path of the file being cleaned
    #[arg(value_name = "FILE")]
    pub path: String,
}

impl FilterCleanCmd {
    pub async fn execute(self) -> Result<()> {
        let ctx = RepoContext::discover().await?;
        let catalog = ctx.catalog().await?;
        let driver = bifrost_git::FilterDriver::new(ctx.cache.clone(), catalog);

        let input = read_stdin().await?;
        let proxy = driver
            .clean(&self.path, &input)
            .await
            .with_context(|| format!("clean filter failed for '{}'", self.path))?;
        write_stdout(&proxy).await
    }
}

#[derive(Debug, Args)]
pub struct FilterSmudgeCmd {
    /// Worktree path of the file being smudged
    #[arg(value_name = "FILE")]
    pub path: String,
}

impl FilterSmudgeCmd {
    pub async fn execute(self) -> Result<()> {
        let ctx = RepoContext::discover().await?;
        let catalog = ctx.catalog().await?;
        let driver = bifrost_git::FilterDriver::new(ctx.cache.clone(), catalog);

        let input = read_stdin().await?;
        let blob = driver
            .smudge(&self.path, &input)
            .await
            .with_context(|| format!("smudge filter failed for '{}'", self.path))?;
        write_stdout(&blob).await
    }
}

async fn read_stdin() -> Result<Vec<u8>> {
    let mut input = Vec::new();
    tokio::io::stdin()
        .read_to_end(&mut input)
        .await
        .context("failed to read stdin")?;
    Ok(input)
}

async fn write_stdout(data: &[u8]) -> Result<()> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(data).await.context("failed to write stdout")?;
    stdout.flush().await.context("failed to flush stdout")?;
    Ok(())
}
