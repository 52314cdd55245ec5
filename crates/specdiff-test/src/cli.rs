//! CLI regression tests for the `specdiff` binary.
//!
//! These tests invoke the binary as a subprocess to catch regressions in flag
//! names, exit codes, and report formats that the library tests can't catch.
//!
//! Run with: `cargo test -p specdiff-test`
//! Requires the `specdiff` binary to be built first (`cargo build -p specdiff`).

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Returns an assert_cmd Command wrapping the `specdiff` binary.
fn specdiff() -> Command {
    // cargo_bin is deprecated for custom build-dir setups; fine for standard workspace use.
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("specdiff")
        .expect("specdiff binary not found, run `cargo build -p specdiff` first");
    cmd.env_remove("RUST_LOG")
        .env_remove("SPECDIFF_LOG_LEVEL")
        .env_remove("SPECDIFF_LOG_FORMAT");
    cmd
}

/// Absolute path to the shared test fixtures directory.
fn fixtures() -> PathBuf {
    // CARGO_MANIFEST_DIR = .../crates/specdiff-test
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("crates/")
        .parent()
        .expect("workspace root")
        .join("tests/fixtures")
}

fn compare(old: &str, new: &str) -> Command {
    let mut cmd = specdiff();
    cmd.arg("compare")
        .arg("--old")
        .arg(fixtures().join(old))
        .arg("--new")
        .arg(fixtures().join(new));
    cmd
}

// ---------------------------------------------------------------------------
// specdiff compare
// ---------------------------------------------------------------------------

#[test]
fn compare_identical_documents_exits_zero() {
    compare("widgets-old.yaml", "widgets-old.yaml")
        .assert()
        .success()
        .stdout("")
        .stderr(contains("0 error(s), 0 warning(s)"));
}

#[test]
fn compare_yaml_against_equivalent_json_exits_zero() {
    compare("widgets-old.yaml", "widgets-same.json")
        .assert()
        .success()
        .stdout("");
}

#[test]
fn compare_breaking_change_exits_one() {
    compare("widgets-old.yaml", "widgets-breaking.yaml")
        .assert()
        .failure()
        .code(1)
        .stdout(contains(
            "| summary | error | The summary for operation \"Widgets_Get\" changed: \"Get a widget\" -> \"Gets a widget\" |",
        ))
        .stdout(contains(
            "| operationId | error | The operationId \"Widgets_List\" is missing in new document: \"Widgets_List\" -> null |",
        ))
        .stdout(contains(
            "| operationId | error | The operationId \"Widgets_ListAll\" is missing in old document: null -> \"Widgets_ListAll\" |",
        ))
        .stdout(contains(
            "| properties | error | The property names of definition \"WidgetProperties\" changed: [\"color\",\"size\"] -> [\"colour\",\"size\"] |",
        ))
        .stderr(contains("5 error(s), 0 warning(s)"));
}

#[test]
fn compare_reports_operations_before_definitions() {
    let output = compare("widgets-old.yaml", "widgets-breaking.yaml")
        .output()
        .expect("specdiff runs");
    let stdout = String::from_utf8(output.stdout).expect("utf-8 output");
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines[0].starts_with("| summary |"));
    assert!(lines[1].starts_with("| operationId |"));
    assert!(lines[2].starts_with("| operationId |"));
    assert!(lines[3].starts_with("| properties |"));
    assert!(lines[4].starts_with("| properties |"));
}

#[test]
fn compare_system_data_addition_is_a_warning() {
    compare("widgets-old.yaml", "widgets-systemdata.yaml")
        .assert()
        .success()
        .stdout(contains("| properties | warning | The property names of definition \"Widget\" changed:"))
        .stderr(contains("0 error(s), 2 warning(s)"));
}

#[test]
fn compare_fail_on_warning_exits_one() {
    compare("widgets-old.yaml", "widgets-systemdata.yaml")
        .args(["--fail-on", "warning"])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn compare_json_format() {
    let output = compare("widgets-old.yaml", "widgets-breaking.yaml")
        .args(["--format", "json"])
        .output()
        .expect("specdiff runs");
    assert_eq!(output.status.code(), Some(1));

    let diffs: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is a JSON array");
    let diffs = diffs.as_array().expect("array");
    assert_eq!(diffs.len(), 5);
    assert_eq!(diffs[0]["operationId"], "Widgets_Get");
    assert_eq!(diffs[0]["type"], "summary");
    assert_eq!(diffs[3]["name"], "WidgetProperties");
    assert_eq!(diffs[3]["level"], "error");
}

#[test]
fn compare_markdown_format() {
    compare("widgets-old.yaml", "widgets-systemdata.yaml")
        .args(["--format", "markdown"])
        .assert()
        .success()
        .stdout(contains("| Type | Level | Message |"))
        .stdout(contains("**0 error(s), 2 warning(s)**"));
}

#[test]
fn compare_invalid_format_exits_two() {
    compare("widgets-old.yaml", "widgets-old.yaml")
        .args(["--format", "xml"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("invalid format"));
}

#[test]
fn compare_without_common_types_loses_inherited_properties() {
    compare("resource-inline.yaml", "resource-common.yaml")
        .assert()
        .failure()
        .code(1)
        .stderr(contains("4 error(s), 0 warning(s)"));
}

#[test]
fn compare_with_common_types_flag() {
    compare("resource-inline.yaml", "resource-common.yaml")
        .arg("--common-types")
        .arg(fixtures().join("common-types/v5/types.json"))
        .assert()
        .success()
        .stdout("");
}

#[test]
fn compare_with_manifest() {
    compare("resource-inline.yaml", "resource-common.yaml")
        .arg("--config")
        .arg(fixtures().join("specdiff.yaml"))
        .assert()
        .success()
        .stdout("");
}

#[test]
fn compare_manifest_fail_on_applies() {
    // The fixture manifest sets fail_on: warning.
    compare("widgets-old.yaml", "widgets-systemdata.yaml")
        .arg("--config")
        .arg(fixtures().join("specdiff.yaml"))
        .assert()
        .failure()
        .code(1);

    compare("widgets-old.yaml", "widgets-systemdata.yaml")
        .arg("--config")
        .arg(fixtures().join("specdiff.yaml"))
        .args(["--fail-on", "error"])
        .assert()
        .success();
}

#[test]
fn compare_invalid_manifest_exits_two() {
    let dir = TempDir::new().expect("temp dir");
    let manifest = dir.path().join("specdiff.yaml");
    std::fs::write(&manifest, "fail_on: sometimes\n").expect("write manifest");

    compare("widgets-old.yaml", "widgets-old.yaml")
        .arg("--config")
        .arg(&manifest)
        .assert()
        .failure()
        .code(2)
        .stderr(contains("fail_on"));
}

#[test]
fn compare_missing_common_type_file_exits_two() {
    compare("resource-inline.yaml", "resource-common.yaml")
        .args(["--common-types", "this-file-does-not-exist.json"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("E2004"));
}

#[test]
fn compare_missing_document_exits_two() {
    specdiff()
        .args([
            "compare",
            "--old",
            "this-file-does-not-exist.yaml",
            "--new",
            "this-file-does-not-exist.yaml",
        ])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("E2004"));
}

#[test]
fn compare_openapi3_document_exits_two() {
    compare("widgets-old.yaml", "invalid/openapi3.yaml")
        .assert()
        .failure()
        .code(2)
        .stderr(contains("E2003"));
}

#[test]
fn compare_requires_both_documents() {
    specdiff()
        .args(["compare", "--old"])
        .arg(fixtures().join("widgets-old.yaml"))
        .assert()
        .failure()
        .stderr(contains("--new"));
}

#[test]
fn compare_json_logs_go_to_stderr() {
    let output = compare("widgets-old.yaml", "widgets-same.json")
        .args(["--log-format", "json", "--log-level", "info"])
        .output()
        .expect("specdiff runs");
    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    let stderr = String::from_utf8(output.stderr).expect("utf-8 output");
    assert!(stderr.contains("\"event\":\"documents_loaded\""));
    assert!(stderr.contains("\"event\":\"comparison_completed\""));
}

#[test]
fn compare_log_level_from_env() {
    compare("widgets-old.yaml", "widgets-same.json")
        .env("SPECDIFF_LOG_LEVEL", "info")
        .env("SPECDIFF_LOG_FORMAT", "json")
        .assert()
        .success()
        .stderr(contains("comparison_completed"));
}

#[test]
fn compare_invalid_log_format_exits_two() {
    compare("widgets-old.yaml", "widgets-old.yaml")
        .args(["--log-format", "xml"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("invalid log format"));
}

// ---------------------------------------------------------------------------
// specdiff check
// ---------------------------------------------------------------------------

#[test]
fn check_valid_documents_exits_zero() {
    specdiff()
        .args(["check", "--spec"])
        .arg(fixtures().join("widgets-old.yaml"))
        .arg(fixtures().join("common-types/v5/types.json"))
        .assert()
        .success()
        .stderr(contains("(3 operation(s), 3 definition(s))"))
        .stderr(contains("checked 2 document(s): 2 valid, 0 invalid"));
}

#[test]
fn check_parse_error_exits_two() {
    specdiff()
        .args(["check", "--spec"])
        .arg(fixtures().join("invalid/parse-error.yaml"))
        .assert()
        .failure()
        .code(2)
        .stderr(contains("E2002"));
}

#[test]
fn check_unknown_format_exits_two() {
    specdiff()
        .args(["check", "--spec"])
        .arg(fixtures().join("invalid/not-a-spec.yaml"))
        .assert()
        .failure()
        .code(2)
        .stderr(contains("E2001"));
}

#[test]
fn check_mixed_documents_reports_each() {
    specdiff()
        .args(["check", "--spec"])
        .arg(fixtures().join("widgets-old.yaml"))
        .arg(fixtures().join("invalid/openapi3.yaml"))
        .assert()
        .failure()
        .code(2)
        .stderr(contains("1 valid, 1 invalid").and(contains("E2003")));
}

#[test]
fn check_json_output() {
    let output = specdiff()
        .args(["check", "--format", "json", "--spec"])
        .arg(fixtures().join("widgets-old.yaml"))
        .output()
        .expect("specdiff runs");
    assert!(output.status.success());

    let results: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(results[0]["valid"], true);
    assert_eq!(results[0]["swagger"], "2.0");
    assert_eq!(results[0]["operations"], 3);
    assert_eq!(results[0]["definitions"], 3);
}

#[test]
fn check_requires_spec() {
    specdiff()
        .arg("check")
        .assert()
        .failure()
        .stderr(contains("--spec"));
}

// ---------------------------------------------------------------------------
// General
// ---------------------------------------------------------------------------

#[test]
fn version_flag() {
    specdiff()
        .arg("--version")
        .assert()
        .success()
        .stdout(contains("specdiff"));
}

#[test]
fn help_lists_subcommands() {
    specdiff()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("compare").and(contains("check")));
}
