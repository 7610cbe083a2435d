// Git-Bifrost - Large File Transport for Git
// Copyright (C) 2026 Bifrost Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.

mod commands;
mod output;
mod progress;
mod repo;

use anyhow::Result;
use bifrost_observability::{init_tracing, LogFormat, Verbosity};
use clap::{Parser, Subcommand};
use commands::*;

#[derive(Parser)]
#[command(name = "git-bifrost")]
#[command(version, about = "Large file transport for git")]
#[command(
    long_about = "git-bifrost keeps large blobs out of git history. Committed files are \
replaced by small proxy records through git's clean/smudge filters; the real bytes live in \
a local cache and are replicated to configured stores on push."
)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean filter: read a blob on stdin, emit its proxy on stdout
    FilterClean(FilterCleanCmd),

    /// Smudge filter: read a proxy on stdin, emit the blob on stdout
    FilterSmudge(FilterSmudgeCmd),

    /// Pre-commit hook: reject oversize unfiltered blobs and stale proxies
    HookPreCommit(HookPreCommitCmd),

    /// Pre-push hook: replicate outgoing blobs to the remote's stores
    HookPrePush(HookPrePushCmd),

    /// Audit a store against all reachable history
    Verify(VerifyCmd),

    /// Install filter configuration and hooks into the current repository
    Init(InitCmd),

    /// Clone a repository and install git-bifrost into the result
    Clone(CloneCmd),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Diagnostics go to stderr; stdout belongs to the filter payloads.
    init_tracing(LogFormat::Compact, Verbosity::from_env()).ok();

    let result = match cli.command {
        Commands::FilterClean(cmd) => cmd.execute().await,
        Commands::FilterSmudge(cmd) => cmd.execute().await,
        Commands::HookPreCommit(cmd) => cmd.execute().await,
        Commands::HookPrePush(cmd) => cmd.execute().await,
        Commands::Verify(cmd) => {
            // Verify's exit status is the number of bad files.
            match cmd.execute().await {
                Ok(bad_files) => std::process::exit(bad_files.min(i32::MAX as usize) as i32),
                Err(e) => Err(e),
            }
        }
        Commands::Init(cmd) => cmd.execute().await,
        Commands::Clone(cmd) => cmd.execute().await,
    };

    if let Err(e) = result {
        output::error(&format!("{e:#}"));
        std::process::exit(1);
    }

    Ok(())
}
