//! Command-line behaviour: exit codes, output formats, config discovery.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../aiwrite-core/test_fixtures")
        .join(name)
}

/// Run in an empty directory so no `.aiwrite.yaml` or user config is picked up
fn aiwrite(dir: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("aiwrite").unwrap();
    cmd.current_dir(dir.path())
        .env("XDG_CONFIG_HOME", dir.path())
        .env_remove("RUST_LOG");
    cmd
}

// ============================================================================
// Exit codes and text output
// ============================================================================

#[test]
fn findings_exit_with_one() {
    let dir = tempfile::tempdir().unwrap();
    aiwrite(&dir)
        .arg(fixture("sample.md"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("sample.md:3:"))
        .stdout(predicate::str::contains("[no-ai-formal-expressions]"))
        .stdout(predicate::str::contains("3 problems (3 errors) in 1 file"));
}

#[test]
fn clean_file_exits_with_zero() {
    let dir = tempfile::tempdir().unwrap();
    aiwrite(&dir)
        .arg(fixture("clean.md"))
        .assert()
        .success()
        .stdout(predicate::str::contains("0 problems"));
}

#[test]
fn missing_file_is_an_operational_failure() {
    let dir = tempfile::tempdir().unwrap();
    aiwrite(&dir)
        .arg("does-not-exist.md")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("does-not-exist.md"));
}

#[test]
fn reads_stdin() {
    let dir = tempfile::tempdir().unwrap();
    aiwrite(&dir)
        .write_stdin("- ✅ 完了した項目\n")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("<stdin>:1:3: error"));
}

#[test]
fn warnings_alone_exit_with_zero() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("warn.yaml");
    std::fs::write(
        &config,
        "rules:\n  no-ai-list-formatting:\n    severity: warning\n",
    )
    .unwrap();
    aiwrite(&dir)
        .arg("--config")
        .arg(&config)
        .write_stdin("- ✅ 完了した項目\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("warning"));
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn preset_flag_enables_all_families() {
    let dir = tempfile::tempdir().unwrap();
    aiwrite(&dir)
        .args(["--preset", "all"])
        .write_stdin("実行します:\n\n```\nnpm install\n```\n")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("[no-ai-colon-continuation]"));
}

#[test]
fn local_config_file_is_discovered() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(".aiwrite.yaml"),
        "rules:\n  no-ai-list-formatting:\n    enabled: false\n",
    )
    .unwrap();
    aiwrite(&dir)
        .write_stdin("- ✅ 完了した項目\n")
        .assert()
        .success();
}

#[test]
fn invalid_config_is_an_operational_failure() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("bad.yaml");
    std::fs::write(
        &config,
        "rules:\n  no-ai-formal-expressions:\n    allows: [\"/x/z\"]\n",
    )
    .unwrap();
    aiwrite(&dir)
        .arg("--config")
        .arg(&config)
        .write_stdin("テキスト\n")
        .assert()
        .code(2);
}

#[test]
fn misspelled_rule_option_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(".aiwrite.yaml"),
        "rules:\n  no-ai-list-formatting:\n    disableEmojiListItem: true\n",
    )
    .unwrap();
    aiwrite(&dir)
        .write_stdin("- ✅ 完了\n")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("disableEmojiListItem"));
}

#[test]
fn unknown_preset_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    aiwrite(&dir)
        .args(["--preset", "strict"])
        .assert()
        .failure();
}

#[test]
fn show_config_prints_yaml() {
    let dir = tempfile::tempdir().unwrap();
    aiwrite(&dir)
        .args(["--preset", "all", "--show-config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("preset: all"))
        .stdout(predicate::str::contains("ai-tech-writing-guideline"));
}

// ============================================================================
// JSON output
// ============================================================================

#[test]
fn json_report_shape() {
    let dir = tempfile::tempdir().unwrap();
    let output = aiwrite(&dir)
        .args(["--format", "json"])
        .write_stdin("- **重要**: これは重要な項目です\n")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(report["created_at"].is_string());
    let diagnostic = &report["files"][0]["diagnostics"][0];
    assert_eq!(report["files"][0]["path"], "<stdin>");
    assert_eq!(diagnostic["rule"], "no-ai-list-formatting");
    assert_eq!(diagnostic["category"], "label-colon-list");
    assert_eq!(diagnostic["severity"], "error");
    assert_eq!(diagnostic["range"]["start"], 0);
    assert_eq!(diagnostic["range"]["end"], 13);
    assert_eq!(diagnostic["line"], 1);
    assert_eq!(diagnostic["column"], 1);
}
