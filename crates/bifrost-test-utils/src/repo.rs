// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Bifrost Contributors

//! Test repository helper for integration tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A temporary git repository with automatic cleanup.
///
/// # Example
/// ```ignore
/// use bifrost_test_utils::TestRepo;
///
/// let repo = TestRepo::new();
/// repo.write_file("file.txt", b"content");
/// repo.add(&["file.txt"]);
/// repo.commit("Add file");
/// ```
pub struct TestRepo {
    temp_dir: TempDir,
}

impl TestRepo {
    /// Create and initialize a fresh repository on branch `main`.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let repo = TestRepo { temp_dir };

        repo.git(&["init", "--initial-branch=main"]);
        repo.git(&["config", "user.name", "Test User"]);
        repo.git(&["config", "user.email", "test@example.com"]);
        // Keep hooks from interfering with fixture commits.
        repo.git(&["config", "commit.gpgsign", "false"]);

        repo
    }

    /// Path of the working tree.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path of the `.git` directory.
    pub fn git_dir(&self) -> PathBuf {
        self.temp_dir.path().join(".git")
    }

    /// Path of the bifrost blob cache within the repository.
    pub fn cache_dir(&self) -> PathBuf {
        self.git_dir().join("bifrost").join("data")
    }

    /// Run git in the repository, panicking on failure.
    pub fn git(&self, args: &[&str]) -> Output {
        let output = Command::new("git")
            .args(args)
            .current_dir(self.temp_dir.path())
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .expect("Failed to run git");
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        output
    }

    /// Run git and return trimmed stdout.
    pub fn git_stdout(&self, args: &[&str]) -> String {
        let output = self.git(args);
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    /// Write a file under the working tree.
    pub fn write_file(&self, name: &str, content: &[u8]) {
        let path = self.temp_dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        fs::write(&path, content).expect("Failed to write file");
    }

    /// Read a file from the working tree.
    pub fn read_file(&self, name: &str) -> Vec<u8> {
        fs::read(self.temp_dir.path().join(name)).expect("Failed to read file")
    }

    /// Stage paths.
    pub fn add(&self, paths: &[&str]) {
        let mut args = vec!["add", "--"];
        args.extend_from_slice(paths);
        self.git(&args);
    }

    /// Commit with a message.
    pub fn commit(&self, message: &str) {
        self.git(&["commit", "--no-verify", "-m", message]);
    }

    /// The commit id of HEAD.
    pub fn head(&self) -> String {
        self.git_stdout(&["rev-parse", "HEAD"])
    }

    /// Replace `.gitattributes` with the given content.
    pub fn set_attributes(&self, content: &str) {
        self.write_file(".gitattributes", content.as_bytes());
    }

    /// Declare a store in `.gitbifrost`.
    pub fn declare_store(&self, name: &str, url: &str, remote: Option<&str>, primary: bool) {
        let file = ".gitbifrost";
        self.git(&["config", "-f", file, &format!("store.{name}.url"), url]);
        if let Some(remote) = remote {
            self.git(&["config", "-f", file, &format!("store.{name}.remote"), remote]);
        }
        if primary {
            self.git(&["config", "-f", file, &format!("store.{name}.primary"), "true"]);
        }
    }

    /// Set a threshold key in `.gitbifrost`.
    pub fn set_threshold(&self, key: &str, value: i64) {
        self.git(&["config", "-f", ".gitbifrost", key, &value.to_string()]);
    }

    /// Create a sibling bare repository and register it as a remote.
    ///
    /// Returns the bare repository's path (the remote URL).
    pub fn add_bare_remote(&self, name: &str) -> PathBuf {
        let bare = self.temp_dir.path().join(format!("{name}.git"));
        let output = Command::new("git")
            .args(["init", "--bare", "--initial-branch=main"])
            .arg(&bare)
            .output()
            .expect("Failed to run git init --bare");
        assert!(output.status.success());

        self.git(&["remote", "add", name, bare.to_str().expect("utf-8 path")]);
        bare
    }
}

impl Default for TestRepo {
    fn default() -> Self {
        Self::new()
    }
}
