// SPDX-License-Identifier: AGPL-3.0
// Copyright (C) 2026 Bifrost Contributors

//! Clone a repository and install git-bifrost into the result.
//!
//! All arguments are handed to `git clone` untouched (stdio inherited so
//! git's own progress output comes through), then `init` runs inside the new
//! working tree.

use crate::output;
use anyhow::{Context, Result};
use clap::Args;

#[derive(Debug, Args)]
pub struct CloneCmd {
    /// Arguments passed through to `git clone`
    #[arg(
        value_name = "GIT_CLONE_ARGS",
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub args: Vec<String>,
}

impl CloneCmd {
    pub async fn execute(self) -> Result<()> {
        let status = tokio::process::Command::new("git")
            .arg("clone")
            .args(&self.args)
            .status()
            .await
            .context("failed to run git clone")?;
        if !status.success() {
            anyhow::bail!("git clone failed");
        }

        let target = clone_target(&self.args)
            .context("could not determine the clone directory; run 'git-bifrost init' inside it")?;

        output::info(&format!("installing git-bifrost in '{target}'"));
        let binary = std::env::current_exe()
            .context("failed to resolve the git-bifrost executable path")?;
        let status = tokio::process::Command::new(binary)
            .arg("init")
            .current_dir(&target)
            .status()
            .await
            .context("failed to run git-bifrost init")?;
        if !status.success() {
            anyhow::bail!("git-bifrost init failed in '{target}'");
        }

        Ok(())
    }
}

/// Figure out the directory `git clone` produced.
///
/// With two trailing non-flag arguments the second is the explicit target;
/// otherwise the directory is derived from the source the way git does:
/// the last path component with any `.git` suffix stripped.
fn clone_target(args: &[String]) -> Option<String> {
    let positional: Vec<&String> = args.iter().filter(|a| !a.starts_with('-')).collect();
    match positional.as_slice() {
        [] => None,
        [source] => {
            let trimmed = source.trim_end_matches('/').trim_end_matches(".git");
            let name = trimmed.rsplit(['/', ':']).next()?;
            if name.is_empty() {
                None
            } else {
                Some(name.to_string())
            }
        }
        [.., target] => Some((*target).clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_explicit_target() {
        assert_eq!(
            clone_target(&args(&["https://example.com/repo.git", "workdir"])),
            Some("workdir".to_string())
        );
    }

    #[test]
    fn test_derived_from_url() {
        assert_eq!(
            clone_target(&args(&["https://example.com/group/repo.git"])),
            Some("repo".to_string())
        );
    }

    #[test]
    fn test_derived_from_scp_syntax() {
        assert_eq!(
            clone_target(&args(&["git@example.com:group/repo.git"])),
            Some("repo".to_string())
        );
    }

    #[test]
    fn test_flags_are_ignored() {
        assert_eq!(
            clone_target(&args(&["--bare", "https://example.com/repo"])),
            Some("repo".to_string())
        );
    }

    #[test]
    fn test_no_positional_arguments() {
        assert_eq!(clone_target(&args(&["--mirror"])), None);
    }
}
