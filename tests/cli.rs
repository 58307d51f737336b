use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::{TempDir, tempdir};

/// `kt` with its root and config directories pointed at a scratch dir.
fn kt(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("kt").unwrap();
    cmd.env("KT_ROOT", dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join("config"))
        .env_remove("KT_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

fn robot_json(cmd: &mut Command) -> Value {
    let output = cmd.output().unwrap();
    serde_json::from_slice(&output.stdout).unwrap()
}

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(path)
}

#[test]
fn test_cli_help() {
    let dir = tempdir().unwrap();
    kt(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"));
}

#[test]
fn test_cli_version() {
    let dir = tempdir().unwrap();
    kt(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_triage_robot_matches_oomkilled() {
    let dir = tempdir().unwrap();
    let json = robot_json(kt(&dir).args(["--robot", "triage", "Reason: OOMKilled", "Exit", "Code:", "137"]));

    assert_eq!(json["status"], "ok");
    assert_eq!(json["data"]["status"], "matched");
    assert_eq!(json["data"]["snapshot_version"], 1);
    let title = json["data"]["hits"][0]["title"].as_str().unwrap();
    assert!(title.contains("OOMKilled"), "unexpected top hit {title}");
}

#[test]
fn test_triage_nonsense_is_no_match_not_failure() {
    let dir = tempdir().unwrap();
    let mut cmd = kt(&dir);
    cmd.args(["--robot", "triage", "zzzqqqxyz"]);
    cmd.assert().success();
    let json = robot_json(&mut cmd);
    assert_eq!(json["data"]["status"], "no_match");
    assert_eq!(json["data"]["info_requests"].as_array().unwrap().len(), 3);
}

#[test]
fn test_triage_reads_stdin() {
    let dir = tempdir().unwrap();
    kt(&dir)
        .args(["triage", "--stdin"])
        .write_stdin("Warning  Failed  Back-off pulling image \"app:v9\": ErrImagePull\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("ImagePullBackOff"));
}

#[test]
fn test_triage_rejects_zero_top_k() {
    let dir = tempdir().unwrap();
    let json = robot_json(kt(&dir).args(["--robot", "triage", "-k", "0", "OOMKilled"]));
    assert_eq!(json["error"], true);
    assert_eq!(json["code"], "config");
}

#[test]
fn test_index_reports_bundled_corpus() {
    let dir = tempdir().unwrap();
    let json = robot_json(kt(&dir).args(["--robot", "index", "--rebuild"]));
    assert_eq!(json["data"]["documents"], 10);
    assert_eq!(json["data"]["snapshot_version"], 2);
    assert!(json["data"]["terms"].as_u64().unwrap() > 0);
}

#[test]
fn test_show_unknown_document_fails() {
    let dir = tempdir().unwrap();
    let mut cmd = kt(&dir);
    cmd.args(["--robot", "show", "999"]);
    cmd.assert().failure();
    let json = robot_json(&mut cmd);
    assert_eq!(json["code"], "document_not_found");
}

#[test]
fn test_show_human_output() {
    let dir = tempdir().unwrap();
    kt(&dir)
        .args(["show", "6"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DNS"));
}

#[test]
fn test_list_bundled_documents() {
    let dir = tempdir().unwrap();
    let json = robot_json(kt(&dir).args(["--robot", "list", "-n", "4", "--offset", "2"]));
    let entries = json["data"].as_array().unwrap();
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[0]["id"], 2);
}

#[test]
fn test_doctor_flags_destructive_step() {
    let dir = tempdir().unwrap();
    kt(&dir)
        .args(["--robot", "doctor"])
        .assert()
        .success()
        .stdout(predicate::str::contains("unsafe-step"));
}

#[test]
fn test_completions_bash() {
    let dir = tempdir().unwrap();
    kt(&dir)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("kt"));
}

#[test]
fn test_custom_corpus_and_separator() {
    let dir = tempdir().unwrap();
    let corpus = fixture("corpus");
    let json = robot_json(kt(&dir).args([
        "--robot",
        "--corpus",
        corpus.to_str().unwrap(),
        "--separator",
        "=====DOC=====",
        "triage",
        "x509: certificate signed by unknown authority",
    ]));
    assert_eq!(json["data"]["status"], "matched");
    let title = json["data"]["hits"][0]["title"].as_str().unwrap();
    assert!(title.starts_with("Certificate errors"));
}

#[test]
fn test_index_warns_about_sparse_documents() {
    let dir = tempdir().unwrap();
    let bundled = robot_json(kt(&dir).args(["--robot", "index"]));
    assert!(bundled.get("warnings").is_none());

    let corpus = dir.path().join("mixed.txt");
    let separator = kt::corpus::DEFAULT_SEPARATOR;
    std::fs::write(
        &corpus,
        format!("# A\n## Symptoms\n- pods crash\n{separator}\nsomething broke, nobody knows why"),
    )
    .unwrap();
    let json = robot_json(kt(&dir).args(["--robot", "--corpus", corpus.to_str().unwrap(), "index"]));
    assert_eq!(json["data"]["documents"], 2);
    assert_eq!(json["warnings"][0], "document 1 has no structured sections");
}

#[test]
fn test_empty_corpus_is_an_error() {
    let dir = tempdir().unwrap();
    let empty = dir.path().join("empty.txt");
    std::fs::write(&empty, "   \n").unwrap();
    let json = robot_json(kt(&dir).args(["--robot", "--corpus", empty.to_str().unwrap(), "index"]));
    assert_eq!(json["code"], "empty_corpus");
}

#[test]
fn test_missing_explicit_config_fails() {
    let dir = tempdir().unwrap();
    kt(&dir)
        .args(["--config", "/nonexistent/kt.toml", "index"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}
