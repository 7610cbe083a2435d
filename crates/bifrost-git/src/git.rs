// SPDX-License-Identifier: AGPL-3.0
// Copyright (C) 2026 Bifrost Contributors

//! Adapter over the `git` binary
//!
//! Every interaction with the host repository goes through git plumbing
//! subprocesses: stdin is never inherited, stdout is captured, the pager and
//! terminal prompts are disabled, and a non-zero exit is surfaced as
//! [`GitError::CommandFailed`] unless the specific operation tolerates it
//! (config lookups treat "not set" as `None`).
//!
//! `diff-tree` and `check-attr` are driven with `-z` so NUL-delimited records
//! survive arbitrary bytes in filenames.

use crate::error::{GitError, GitResult};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::{debug, trace};

/// All-zero object id marking a ref deletion in pre-push input.
pub const ZERO_SHA: &str = "0000000000000000000000000000000000000000";

/// One entry of a commit's change set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedEntry {
    /// Status letter: `A`, `M`, `D`, `R`, `C`, `T`, or `X` for unknown
    pub status: char,

    /// Affected path (the destination path for renames and copies)
    pub path: String,
}

/// Handle for running git plumbing in a repository
#[derive(Debug, Clone, Default)]
pub struct Git {
    working_dir: Option<PathBuf>,
}

impl Git {
    /// Adapter running git in the current directory.
    pub fn new() -> Self {
        Git::default()
    }

    /// Adapter running git in `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Git {
            working_dir: Some(dir.into()),
        }
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new("git");
        cmd.arg("--no-pager")
            .args(args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }
        cmd
    }

    /// Run git and capture stdout; non-zero exit is an error.
    async fn run(&self, args: &[&str]) -> GitResult<Vec<u8>> {
        trace!(?args, "git");
        let output = self.command(args).output().await?;
        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output.stdout)
    }

    /// Run git and capture stdout; non-zero exit yields `None`.
    ///
    /// Used for config lookups, where "key not set" and "file absent" are
    /// ordinary answers rather than failures.
    async fn run_tolerant(&self, args: &[&str]) -> GitResult<Option<Vec<u8>>> {
        trace!(?args, "git (tolerant)");
        let output = self.command(args).output().await?;
        if output.status.success() {
            Ok(Some(output.stdout))
        } else {
            Ok(None)
        }
    }

    /// Commits reachable from `local_ref` but from no ref of `remote`.
    pub async fn rev_list_not_remotes(
        &self,
        local_ref: &str,
        remote: &str,
    ) -> GitResult<Vec<String>> {
        let remotes = format!("--remotes={remote}");
        let stdout = self
            .run(&["rev-list", local_ref, "--not", &remotes])
            .await?;
        Ok(parse_lines(&stdout))
    }

    /// All reachable commits.
    pub async fn rev_list_all(&self) -> GitResult<Vec<String>> {
        let stdout = self.run(&["rev-list", "--all"]).await?;
        Ok(parse_lines(&stdout))
    }

    /// The files touched by a commit, with their status letters.
    pub async fn changed_entries(&self, commit: &str) -> GitResult<Vec<ChangedEntry>> {
        let stdout = self
            .run(&[
                "diff-tree",
                "-z",
                "-r",
                "--root",
                "--no-commit-id",
                "--name-status",
                commit,
            ])
            .await?;
        parse_name_status(&stdout)
    }

    /// Full content of a historical blob (`commit:path` or `:path`).
    pub async fn read_blob(&self, spec: &str) -> GitResult<Vec<u8>> {
        self.run(&["cat-file", "blob", spec]).await
    }

    /// Up to `limit` leading bytes of a blob.
    ///
    /// The pipe is closed without draining the rest; git's resulting
    /// complaint is expected and suppressed.
    pub async fn read_blob_prefix(&self, spec: &str, limit: usize) -> GitResult<Vec<u8>> {
        let mut child = self.command(&["cat-file", "blob", spec]).spawn()?;
        let mut stdout = child.stdout.take().ok_or_else(|| {
            GitError::CommandFailed {
                command: format!("cat-file blob {spec}"),
                stderr: "stdout not captured".to_string(),
            }
        })?;

        let mut buffer = vec![0u8; limit];
        let mut filled = 0;
        while filled < limit {
            let n = stdout.read(&mut buffer[filled..]).await?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        buffer.truncate(filled);

        drop(stdout);
        let status = child.wait().await?;
        if filled == 0 && !status.success() {
            // Nothing was produced at all: the revision spec itself was bad.
            return Err(GitError::CommandFailed {
                command: format!("cat-file blob {spec}"),
                stderr: "no such blob".to_string(),
            });
        }
        Ok(buffer)
    }

    /// Byte size of a blob without reading its content.
    pub async fn blob_size(&self, spec: &str) -> GitResult<u64> {
        let stdout = self.run(&["cat-file", "-s", spec]).await?;
        let text = String::from_utf8_lossy(&stdout);
        text.trim().parse().map_err(|_| GitError::CommandFailed {
            command: format!("cat-file -s {spec}"),
            stderr: format!("unparseable size '{}'", text.trim()),
        })
    }

    /// Paths staged in the index, in git's reported order.
    pub async fn staged_paths(&self) -> GitResult<Vec<String>> {
        let stdout = self
            .run(&["diff", "--cached", "--name-only", "-z"])
            .await?;
        Ok(parse_nul_fields(&stdout))
    }

    /// Value of the `filter` attribute for a path, from the index state.
    pub async fn filter_attribute(&self, path: &str) -> GitResult<Option<String>> {
        match self.attribute_value(path, "filter").await? {
            Some(value) if value == "unspecified" || value == "unset" => Ok(None),
            other => Ok(other),
        }
    }

    /// Tri-state of a boolean attribute: set, unset, or unspecified.
    pub async fn attribute_state(&self, path: &str, name: &str) -> GitResult<Option<bool>> {
        match self.attribute_value(path, name).await?.as_deref() {
            Some("set") => Ok(Some(true)),
            Some("unset") => Ok(Some(false)),
            _ => Ok(None),
        }
    }

    async fn attribute_value(&self, path: &str, name: &str) -> GitResult<Option<String>> {
        let stdout = self
            .run(&["check-attr", "--cached", "-z", name, "--", path])
            .await?;
        // -z output is `path NUL attribute NUL value NUL` records.
        let fields = parse_nul_fields(&stdout);
        Ok(fields.get(2).cloned())
    }

    /// Integer config value from a file, `None` when unset or file absent.
    pub async fn config_get_int(&self, key: &str, file: &str) -> GitResult<Option<i64>> {
        let stdout = self
            .run_tolerant(&["config", "-f", file, "--int", "--get", key])
            .await?;
        match stdout {
            Some(bytes) => {
                let text = String::from_utf8_lossy(&bytes);
                let trimmed = text.trim();
                trimmed.parse().map(Some).map_err(|_| GitError::CommandFailed {
                    command: format!("config --int --get {key}"),
                    stderr: format!("unparseable integer '{trimmed}'"),
                })
            }
            None => Ok(None),
        }
    }

    /// All `key value` lines whose key matches `pattern` in a config file.
    ///
    /// A missing file or no matching key yields an empty list.
    pub async fn config_get_regex(&self, pattern: &str, file: &str) -> GitResult<Vec<String>> {
        let stdout = self
            .run_tolerant(&["config", "-f", file, "--get-regexp", pattern])
            .await?;
        Ok(stdout.map(|bytes| parse_lines(&bytes)).unwrap_or_default())
    }

    /// Set a config key in a file.
    pub async fn config_set(&self, key: &str, value: &str, file: &str) -> GitResult<()> {
        self.run(&["config", "-f", file, key, value]).await?;
        Ok(())
    }

    /// Absolute path of the repository's `.git` directory.
    pub async fn git_dir(&self) -> GitResult<PathBuf> {
        let stdout = self
            .run(&["rev-parse", "--absolute-git-dir"])
            .await?;
        Ok(PathBuf::from(String::from_utf8_lossy(&stdout).trim()))
    }

    /// Absolute path of the working tree root.
    pub async fn toplevel(&self) -> GitResult<PathBuf> {
        let stdout = self.run(&["rev-parse", "--show-toplevel"]).await?;
        Ok(PathBuf::from(String::from_utf8_lossy(&stdout).trim()))
    }
}

fn parse_lines(stdout: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(stdout)
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_nul_fields(stdout: &[u8]) -> Vec<String> {
    stdout
        .split(|&b| b == 0)
        .filter(|field| !field.is_empty())
        .map(|field| String::from_utf8_lossy(field).into_owned())
        .collect()
}

/// Parse `diff-tree -z --name-status` output.
///
/// Records are `STATUS NUL path NUL`; rename and copy records carry a score
/// after the letter and are followed by both the source and the destination
/// path. The destination is the one that exists in the commit.
fn parse_name_status(stdout: &[u8]) -> GitResult<Vec<ChangedEntry>> {
    let fields = parse_nul_fields(stdout);
    let mut entries = Vec::new();
    let mut iter = fields.into_iter();

    while let Some(status_field) = iter.next() {
        let status = status_field.chars().next().unwrap_or('X');
        let path = match status {
            'R' | 'C' => {
                let _source = iter.next();
                iter.next()
            }
            _ => iter.next(),
        };
        let Some(path) = path else {
            debug!(status = %status_field, "truncated diff-tree record");
            break;
        };
        entries.push(ChangedEntry { status, path });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nul_joined(fields: &[&str]) -> Vec<u8> {
        let mut out = Vec::new();
        for field in fields {
            out.extend_from_slice(field.as_bytes());
            out.push(0);
        }
        out
    }

    #[test]
    fn test_parse_name_status_simple() {
        let raw = nul_joined(&["A", "assets/logo.psd", "M", "README.md", "D", "old.bin"]);
        let entries = parse_name_status(&raw).unwrap();
        assert_eq!(
            entries,
            vec![
                ChangedEntry { status: 'A', path: "assets/logo.psd".to_string() },
                ChangedEntry { status: 'M', path: "README.md".to_string() },
                ChangedEntry { status: 'D', path: "old.bin".to_string() },
            ]
        );
    }

    #[test]
    fn test_parse_name_status_rename_uses_destination() {
        let raw = nul_joined(&["R100", "old/name.bin", "new/name.bin", "M", "other.txt"]);
        let entries = parse_name_status(&raw).unwrap();
        assert_eq!(entries[0].status, 'R');
        assert_eq!(entries[0].path, "new/name.bin");
        assert_eq!(entries[1].path, "other.txt");
    }

    #[test]
    fn test_parse_name_status_copy_uses_destination() {
        let raw = nul_joined(&["C075", "src.bin", "copy.bin"]);
        let entries = parse_name_status(&raw).unwrap();
        assert_eq!(entries[0].status, 'C');
        assert_eq!(entries[0].path, "copy.bin");
    }

    #[test]
    fn test_parse_name_status_unknown_status() {
        let raw = nul_joined(&["X", "weird.bin"]);
        let entries = parse_name_status(&raw).unwrap();
        assert_eq!(entries[0].status, 'X');
    }

    #[test]
    fn test_parse_name_status_empty() {
        assert!(parse_name_status(b"").unwrap().is_empty());
    }

    #[test]
    fn test_parse_nul_fields_tolerates_trailing_nul() {
        let raw = nul_joined(&["a.txt", "b.txt"]);
        assert_eq!(parse_nul_fields(&raw), vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn test_parse_lines_skips_blank() {
        assert_eq!(parse_lines(b"abc\n\ndef\n"), vec!["abc", "def"]);
    }
}
