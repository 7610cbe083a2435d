// SPDX-License-Identifier: AGPL-3.0
// Copyright (C) 2026 Bifrost Contributors

//! End-to-end tests driving the git-bifrost binary.

use bifrost_test_utils::TestRepo;
use std::io::Write;
use std::process::{Command, Output, Stdio};

const HELLO_PROXY: &str = "~*@git-bifrost@*~\n1\n2AAE6C35C94FCFB415DBE95F408B9CE91EE846ED\n11\n";
const HELLO_CACHE_PATH: &str = "2/A/A/2AAE6C35C94FCFB415DBE95F408B9CE91EE846ED.bin";

fn bifrost(repo: &TestRepo, args: &[&str]) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_git-bifrost"));
    cmd.args(args)
        .current_dir(repo.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    cmd
}

fn run_with_stdin(repo: &TestRepo, args: &[&str], input: &[u8]) -> Output {
    let mut child = bifrost(repo, args).spawn().expect("failed to spawn git-bifrost");
    child
        .stdin
        .as_mut()
        .expect("stdin piped")
        .write_all(input)
        .expect("failed to write stdin");
    child.wait_with_output().expect("failed to wait for git-bifrost")
}

#[test]
fn test_filter_clean_emits_proxy_and_fills_cache() {
    let repo = TestRepo::new();

    let output = run_with_stdin(&repo, &["filter-clean", "hello.txt"], b"hello world");
    assert!(
        output.status.success(),
        "clean failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(output.stdout, HELLO_PROXY.as_bytes());

    let cached = repo.cache_dir().join(HELLO_CACHE_PATH);
    assert_eq!(std::fs::read(cached).unwrap(), b"hello world");
}

#[test]
fn test_filter_clean_refuses_double_clean() {
    let repo = TestRepo::new();

    let output = run_with_stdin(&repo, &["filter-clean", "hello.txt"], HELLO_PROXY.as_bytes());
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("already a proxy"), "stderr was: {stderr}");
}

#[test]
fn test_filter_smudge_restores_from_cache() {
    let repo = TestRepo::new();

    let clean = run_with_stdin(&repo, &["filter-clean", "hello.txt"], b"hello world");
    assert!(clean.status.success());

    let smudge = run_with_stdin(&repo, &["filter-smudge", "hello.txt"], &clean.stdout);
    assert!(smudge.status.success());
    assert_eq!(smudge.stdout, b"hello world");
}

#[test]
fn test_filter_smudge_restores_from_file_store() {
    let repo = TestRepo::new();

    // The blob lives only in a declared file store; the cache is empty.
    let store_dir = repo.path().join("blobstore");
    let object = store_dir.join(HELLO_CACHE_PATH);
    std::fs::create_dir_all(object.parent().unwrap()).unwrap();
    std::fs::write(&object, b"hello world").unwrap();
    repo.declare_store("depot", &format!("file://{}", store_dir.display()), None, false);

    let smudge = run_with_stdin(&repo, &["filter-smudge", "hello.txt"], HELLO_PROXY.as_bytes());
    assert!(
        smudge.status.success(),
        "smudge failed: {}",
        String::from_utf8_lossy(&smudge.stderr)
    );
    assert_eq!(smudge.stdout, b"hello world");

    // The pull repopulates the local cache.
    assert!(repo.cache_dir().join(HELLO_CACHE_PATH).exists());
}

#[test]
fn test_filter_smudge_rejects_corrupt_store() {
    let repo = TestRepo::new();

    // Right length, wrong bytes; there is no second store to fall back to.
    let store_dir = repo.path().join("blobstore");
    let object = store_dir.join(HELLO_CACHE_PATH);
    std::fs::create_dir_all(object.parent().unwrap()).unwrap();
    std::fs::write(&object, b"HELLO WORLD").unwrap();
    repo.declare_store("depot", &format!("file://{}", store_dir.display()), None, false);

    let smudge = run_with_stdin(&repo, &["filter-smudge", "hello.txt"], HELLO_PROXY.as_bytes());
    assert!(!smudge.status.success());
    let stderr = String::from_utf8_lossy(&smudge.stderr);
    assert!(stderr.contains("integrity mismatch"), "stderr was: {stderr}");
}

#[test]
fn test_hook_pre_commit_rejects_oversize_text() {
    let repo = TestRepo::new();
    repo.write_file("big.txt", &bifrost_test_utils::text_blob(6_000_000));
    repo.add(&["big.txt"]);

    let output = run_with_stdin(&repo, &["hook-pre-commit"], b"");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Text file too big 'big.txt' (6,000,000 bytes)."),
        "stderr was: {stderr}"
    );
}

#[test]
fn test_hook_pre_commit_passes_clean_index() {
    let repo = TestRepo::new();
    repo.write_file("small.txt", b"fine");
    repo.add(&["small.txt"]);

    let output = run_with_stdin(&repo, &["hook-pre-commit"], b"");
    assert!(
        output.status.success(),
        "pre-commit failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn test_hook_pre_push_replicates_and_requires_primary() {
    let repo = TestRepo::new();
    let remote_url = repo.add_bare_remote("origin");
    let store_dir = repo.path().join("blobstore");

    // A committed proxy whose blob sits in the cache.
    repo.write_file("asset.bin", HELLO_PROXY.as_bytes());
    repo.add(&["asset.bin"]);
    repo.commit("add asset");
    let cached = repo.cache_dir().join(HELLO_CACHE_PATH);
    std::fs::create_dir_all(cached.parent().unwrap()).unwrap();
    std::fs::write(&cached, b"hello world").unwrap();

    repo.declare_store(
        "depot",
        &format!("file://{}", store_dir.display()),
        Some(&remote_url.to_string_lossy()),
        true,
    );

    let records = format!(
        "refs/heads/main {} refs/heads/main 0000000000000000000000000000000000000000\n",
        repo.head()
    );
    let output = run_with_stdin(
        &repo,
        &[
            "hook-pre-push",
            "origin",
            &remote_url.to_string_lossy(),
        ],
        records.as_bytes(),
    );
    assert!(
        output.status.success(),
        "pre-push failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(
        std::fs::read(store_dir.join(HELLO_CACHE_PATH)).unwrap(),
        b"hello world"
    );
}

#[test]
fn test_verify_exit_status_counts_bad_files() {
    let repo = TestRepo::new();

    repo.write_file("asset.bin", HELLO_PROXY.as_bytes());
    repo.add(&["asset.bin"]);
    repo.commit("add asset");

    let store_dir = repo.path().join("blobstore");
    std::fs::create_dir_all(&store_dir).unwrap();
    let store_uri = format!("file://{}", store_dir.display());

    // Empty store: one bad (missing) file.
    let output = run_with_stdin(&repo, &["verify", &store_uri], b"");
    assert_eq!(output.status.code(), Some(1));

    // Store the valid bytes: verify is clean.
    let object = store_dir.join(HELLO_CACHE_PATH);
    std::fs::create_dir_all(object.parent().unwrap()).unwrap();
    std::fs::write(&object, b"hello world").unwrap();

    let output = run_with_stdin(&repo, &["verify", &store_uri], b"");
    assert_eq!(
        output.status.code(),
        Some(0),
        "verify stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn test_verify_rejects_unsupported_scheme() {
    let repo = TestRepo::new();
    let output = run_with_stdin(&repo, &["verify", "gopher://example.com/data"], b"");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("gopher"), "stderr was: {stderr}");
}

#[test]
fn test_init_installs_filter_and_hooks() {
    let repo = TestRepo::new();

    let output = run_with_stdin(&repo, &["init"], b"");
    assert!(
        output.status.success(),
        "init failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let clean = repo.git_stdout(&["config", "--local", "filter.bifrost.clean"]);
    assert!(clean.contains("filter-clean"), "config was: {clean}");
    let required = repo.git_stdout(&["config", "--local", "filter.bifrost.required"]);
    assert_eq!(required, "true");

    assert!(repo.git_dir().join("hooks").join("pre-commit").exists());
    assert!(repo.git_dir().join("hooks").join("pre-push").exists());
}
