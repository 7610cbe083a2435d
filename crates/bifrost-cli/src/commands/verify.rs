// SPDX-License-Identifier: AGPL-3.0
// Copyright (C) 2026 Bifrost Contributors

//! Verify command - audit one store against reachable history

use crate::output;
use crate::repo::RepoContext;
use anyhow::{Context, Result};
use bifrost_config::StoreRecord;
use bifrost_git::{VerifyOptions, VerifySweep};
use bifrost_storage::{registry, StoreBackend};
use clap::Args;
use console::style;
use url::Url;

/// Audit a store: every proxy reachable in history must be backed by bytes
/// of the right length and digest.
///
/// The exit status is the number of bad files, so `0` means the store holds
/// valid bytes for the entire history.
#[derive(Debug, Args)]
pub struct VerifyCmd {
    /// Username for the store transport
    #[arg(long, value_name = "USER")]
    pub username: Option<String>,

    /// Password for the store transport
    #[arg(long, value_name = "PASS")]
    pub password: Option<String>,

    /// Report healthy entries too
    #[arg(long)]
    pub verbose: bool,

    /// Store URI to audit
    #[arg(value_name = "STORE_URI")]
    pub store_uri: String,
}

impl VerifyCmd {
    /// Returns the number of bad files found.
    pub async fn execute(self) -> Result<usize> {
        let url = Url::parse(&self.store_uri)
            .with_context(|| format!("'{}' is not an absolute store URI", self.store_uri))?;

        let ctx = RepoContext::discover().await?;

        // Start from the catalog record when this store is declared there,
        // so configured credentials apply; flags override either way.
        let mut record = match ctx.catalog().await?.store_by_url(&url) {
            Some(record) => record.clone(),
            None => StoreRecord {
                name: "verify-target".to_string(),
                url: url.clone(),
                remote: None,
                primary: false,
                username: None,
                password: None,
            },
        };
        if self.username.is_some() {
            record.username = self.username.clone();
        }
        if self.password.is_some() {
            record.password = self.password.clone();
        }

        let mut store = registry::open_store(&record)
            .await
            .with_context(|| format!("cannot open store {url}"))?;

        let report = VerifySweep::new(&ctx.git, store.as_mut())
            .run(VerifyOptions {
                verbose: self.verbose,
            })
            .await
            .context("verify sweep failed")?;
        store.close().await.ok();

        for entry in &report.entries {
            if entry.health.is_bad() {
                eprintln!(
                    "{} {} ({}) [{}]",
                    style("bad:").red().bold(),
                    entry.revision,
                    entry.digest,
                    entry.health.conditions().join(", ")
                );
            } else if self.verbose {
                eprintln!("{} {} ({})", style("ok:").green(), entry.revision, entry.digest);
            }
        }

        let bad_files = report.bad_files();
        if bad_files == 0 {
            output::success(&format!(
                "store {url} holds valid bytes for all {} commit(s)",
                report.commits
            ));
        } else {
            output::error(&format!("{bad_files} bad file(s) in store {url}"));
        }

        Ok(bad_files)
    }
}
