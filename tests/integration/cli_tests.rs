//! Integration tests for the CLI binary.
//!
//! Runs the `ttx` binary against temporary data directories. Only commands
//! that need no network are exercised here.
//!
//! This test is registered as a [[test]] in the trust-txt-cli crate so that
//! CARGO_BIN_EXE_ttx is available.

use std::path::Path;
use std::process::{Command, Output};

/// Get a Command pointing to the `ttx` binary with an isolated data dir.
fn ttx(data_dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_ttx"));
    cmd.arg("--data-dir").arg(data_dir);
    cmd.env_remove("TRUSTTXT_FETCH_TIMEOUT_MS");
    cmd.env_remove("TRUSTTXT_VALIDATOR_URL");
    cmd
}

fn run(cmd: &mut Command) -> Output {
    cmd.output().expect("failed to execute ttx")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn cli_responds_to_help() {
    let output = run(Command::new(env!("CARGO_BIN_EXE_ttx")).arg("--help"));
    assert!(
        output.status.success(),
        "ttx --help should exit with success, stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let text = stdout(&output);
    assert!(text.contains("Usage"), "got: {text}");
    assert!(text.contains("resolve"), "got: {text}");
}

#[test]
fn cli_responds_to_version() {
    let output = run(Command::new(env!("CARGO_BIN_EXE_ttx")).arg("--version"));
    assert!(output.status.success());
    assert!(stdout(&output).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn cli_exits_with_error_on_unknown_flag() {
    let output = run(Command::new(env!("CARGO_BIN_EXE_ttx")).arg("--nonexistent-flag"));
    assert!(!output.status.success(), "ttx with unknown flag should exit with error");
}

#[test]
fn parse_reports_entries_and_warnings() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = dir.path().join("trust.txt");
    std::fs::write(
        &manifest,
        "# acme\nsocial=https://twitter.com/acme\nmember=example.org\nmystery=1\n",
    )
    .unwrap();

    let output = run(ttx(dir.path()).args(["--json", "parse"]).arg(&manifest));
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["manifest"]["social"][0], "https://twitter.com/acme");
    assert_eq!(json["manifest"]["member"][0], "example.org");
    assert_eq!(json["warnings"][0]["line"], 4);
    assert_eq!(json["warnings"][0]["variable"], "mystery");
}

#[test]
fn parse_normalize_prints_canonical_text() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = dir.path().join("trust.txt");
    std::fs::write(&manifest, "SOCIAL = https://twitter.com/acme\n\n# x\n").unwrap();

    let output = run(ttx(dir.path()).arg("parse").arg("--normalize").arg(&manifest));
    assert!(output.status.success());
    assert_eq!(stdout(&output), "social=https://twitter.com/acme\n");
}

#[test]
fn parse_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(ttx(dir.path()).args(["parse", "does-not-exist.txt"]));
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("error:"));
}

#[test]
fn severity_reduces_statuses() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(ttx(dir.path()).args(["--json", "severity", "found", "error"]));
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "\"warning\"");

    let output = run(ttx(dir.path()).args(["severity", "found"]));
    assert!(stdout(&output).contains("Verified"));
}

#[test]
fn settings_auto_scan_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(ttx(dir.path()).args(["settings", "auto-scan", "off"]));
    assert!(output.status.success());

    let output = run(ttx(dir.path()).args(["--json", "settings", "show"]));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["settings"]["autoScan"], false);

    // Disabled auto scan skips without touching the network.
    let page = dir.path().join("page.html");
    std::fs::write(&page, "<p>trust://acme.example!</p>").unwrap();
    let output = run(
        ttx(dir.path())
            .args(["--json", "scan", "--auto", "--page-url", "https://twitter.com/acme"])
            .arg(&page),
    );
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["skipped"], true);
}

#[test]
fn scan_without_uris_reports_nothing_found() {
    let dir = tempfile::tempdir().unwrap();
    let page = dir.path().join("page.html");
    std::fs::write(&page, "<p>no links here</p>").unwrap();
    let output = run(
        ttx(dir.path())
            .args(["scan", "--page-url", "https://twitter.com/acme"])
            .arg(&page),
    );
    assert!(output.status.success());
    assert!(stdout(&output).contains("No trust:// URIs found"));
}

#[test]
fn cache_show_and_clear_on_empty_session() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(ttx(dir.path()).args(["cache", "show"]));
    assert!(output.status.success());
    assert!(stdout(&output).contains("no cached results"));

    let output = run(ttx(dir.path()).args(["--json", "cache", "clear"]));
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["removed"], 0);
}

#[test]
fn cache_clear_refuses_corrupt_session() {
    let dir = tempfile::tempdir().unwrap();
    let session = dir.path().join("session");
    std::fs::create_dir_all(&session).unwrap();
    std::fs::write(session.join("trust_results.json"), "{ not json").unwrap();

    let output = run(ttx(dir.path()).args(["cache", "clear"]));
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error:"), "got: {stderr}");
    assert!(stderr.contains("failed to load session"), "got: {stderr}");
    assert!(session.join("trust_results.json").exists());
}

#[test]
fn platforms_lists_builtins() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(ttx(dir.path()).arg("platforms"));
    assert!(output.status.success());
    let text = stdout(&output);
    for name in ["Twitter", "GitHub", "YouTube"] {
        assert!(text.contains(name), "missing {name} in {text}");
    }
}

#[test]
fn resolve_rejects_invalid_trust_uri_without_network() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(ttx(dir.path()).args([
        "--json",
        "resolve",
        "https://twitter.com/acme",
        "https://acme.example",
    ]));
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["type"], "error");
    assert_eq!(json["baseUrl"], "https://acme.example");
}

#[test]
fn zero_timeout_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(ttx(dir.path()).args(["--timeout-ms", "0", "platforms"]));
    assert!(!output.status.success());
}
