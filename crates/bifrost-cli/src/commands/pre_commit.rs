// SPDX-License-Identifier: AGPL-3.0
// Copyright (C) 2026 Bifrost Contributors

//! Pre-commit hook command.

use crate::progress::percentage_bar;
use crate::repo::RepoContext;
use anyhow::Result;
use bifrost_git::PrecommitGuard;
use clap::Args;
use console::style;

#[derive(Debug, Args)]
pub struct HookPreCommitCmd {}

impl HookPreCommitCmd {
    pub async fn execute(self) -> Result<()> {
        let ctx = RepoContext::discover().await?;
        let thresholds = ctx.thresholds().await?;
        let guard = PrecommitGuard::new(ctx.git.clone(), thresholds);

        let bar = percentage_bar("Checking staged files");
        let report = guard
            .run(|done, total| {
                bar.set_length(total as u64);
                bar.set_position(done as u64);
            })
            .await?;
        bar.finish_and_clear();

        if report.passed() {
            return Ok(());
        }

        for flagged in &report.flagged {
            eprintln!("{} {}", style("rejected:").red().bold(), flagged);
        }
        eprintln!();
        if report.needs_restage() {
            eprintln!(
                "Some staged files are routed through filter=bifrost but were staged before \
                 the filter applied. Run 'git add' on them again to re-stage."
            );
        }
        eprintln!(
            "Oversize files can be routed through bifrost by adding a 'filter=bifrost' \
             .gitattributes entry, or the thresholds in .gitbifrost can be raised."
        );

        anyhow::bail!("{} of {} staged files rejected", report.flagged.len(), report.checked)
    }
}
