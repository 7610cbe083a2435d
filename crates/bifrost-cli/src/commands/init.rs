// SPDX-License-Identifier: AGPL-3.0
// Copyright (C) 2026 Bifrost Contributors

//! Install git-bifrost into a repository.
//!
//! Adds the `filter.bifrost.*` config entries and drops pre-commit and
//! pre-push hook shims into `.git/hooks`. Existing foreign hooks are left
//! untouched unless `--force` is given.

use crate::output;
use crate::repo::RepoContext;
use anyhow::{Context, Result};
use bifrost_git::FILTER_NAME;
use clap::Args;
use std::path::Path;

#[derive(Debug, Args)]
pub struct InitCmd {
    /// Overwrite hooks that were not installed by git-bifrost
    #[arg(short, long)]
    pub force: bool,
}

const HOOK_MARKER: &str = "# installed by git-bifrost";

impl InitCmd {
    pub async fn execute(self) -> Result<()> {
        let ctx = RepoContext::discover().await?;
        let binary = std::env::current_exe()
            .context("failed to resolve the git-bifrost executable path")?;
        let binary = binary.display();

        // Filter driver entries, written with git's own config machinery
        // into the repository-local config file.
        let config_file = ctx.git_dir.join("config").to_string_lossy().into_owned();
        for (key, value) in [
            (format!("filter.{FILTER_NAME}.clean"), format!("{binary} filter-clean %f")),
            (format!("filter.{FILTER_NAME}.smudge"), format!("{binary} filter-smudge %f")),
            (format!("filter.{FILTER_NAME}.required"), "true".to_string()),
        ] {
            ctx.git
                .config_set(&key, &value, &config_file)
                .await
                .with_context(|| format!("failed to set {key}"))?;
        }

        let hooks_dir = ctx.git_dir.join("hooks");
        self.install_hook(&hooks_dir, "pre-commit", &format!("{binary} hook-pre-commit"))?;
        self.install_hook(
            &hooks_dir,
            "pre-push",
            &format!("{binary} hook-pre-push \"$1\" \"$2\""),
        )?;

        output::success("git-bifrost installed");
        output::detail("clean filter", &format!("{binary} filter-clean %f"));
        output::detail("smudge filter", &format!("{binary} filter-smudge %f"));
        output::detail("hooks", &hooks_dir.display().to_string());
        output::info(
            "route files through bifrost with a .gitattributes entry such as: \
             '*.psd filter=bifrost'",
        );

        Ok(())
    }

    fn install_hook(&self, hooks_dir: &Path, name: &str, command: &str) -> Result<()> {
        std::fs::create_dir_all(hooks_dir)
            .with_context(|| format!("failed to create {}", hooks_dir.display()))?;
        let path = hooks_dir.join(name);

        if path.exists() {
            let existing = std::fs::read_to_string(&path).unwrap_or_default();
            if !existing.contains(HOOK_MARKER) && !self.force {
                output::warning(&format!(
                    "existing {name} hook is not from git-bifrost; leaving it alone (use --force to replace)"
                ));
                return Ok(());
            }
        }

        let script = format!("#!/bin/sh\n{HOOK_MARKER}\nexec {command}\n");
        std::fs::write(&path, script)
            .with_context(|| format!("failed to write {}", path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
                .with_context(|| format!("failed to mark {} executable", path.display()))?;
        }

        Ok(())
    }
}
