//! CLI smoke tests for catala-wasm.
//!
//! These tests never reach the network: every run either stops at argument
//! parsing, at configuration loading, or at staging a repository that does
//! not exist.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

fn catala_wasm_cmd() -> Command {
  cargo_bin_cmd!("catala-wasm")
}

/// Create a temp directory with a `bundle.json` holding `content`.
fn temp_config(content: &str) -> TempDir {
  let temp = TempDir::new().unwrap();
  std::fs::write(temp.path().join("bundle.json"), content).unwrap();
  temp
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_works() {
  catala_wasm_cmd()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("Usage"))
    .stdout(predicate::str::contains("--skip-interpreter"))
    .stdout(predicate::str::contains("--base-url"));
}

#[test]
fn version_flag_works() {
  catala_wasm_cmd()
    .arg("--version")
    .assert()
    .success()
    .stdout(predicate::str::contains("catala-wasm"));
}

#[test]
fn unknown_base_url_mode_is_rejected() {
  catala_wasm_cmd()
    .args(["--base-url", "absolute"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn unknown_output_format_is_rejected() {
  catala_wasm_cmd()
    .args(["--output", "yaml"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("invalid value"));
}

// =============================================================================
// Configuration errors
// =============================================================================

#[test]
fn missing_config_file_fails() {
  let temp = TempDir::new().unwrap();

  catala_wasm_cmd()
    .current_dir(temp.path())
    .args(["--config", "missing.json"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("failed to read config"));

  assert!(!temp.path().join("dist").exists());
}

#[test]
fn malformed_config_file_fails() {
  let temp = temp_config("{ \"parsers\": ");

  catala_wasm_cmd()
    .current_dir(temp.path())
    .args(["--config", "bundle.json"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("failed to parse config"));
}

// =============================================================================
// Pipeline failures
// =============================================================================

#[test]
fn unreachable_parser_repo_fails_without_output() {
  let temp = temp_config(
    r#"{
  "build_dir": "work",
  "dist_dir": "out",
  "parsers": { "repo": { "url": "file:///nonexistent/tree-sitter-catala" } }
}"#,
  );

  catala_wasm_cmd()
    .current_dir(temp.path())
    .args(["--config", "bundle.json", "--skip-interpreter"])
    .env("RUST_LOG", "off")
    .assert()
    .failure()
    .stderr(predicate::str::contains("Bundle failed"));

  assert!(!temp.path().join("out").exists());
}

#[test]
fn failure_reports_error_chain_in_json_mode() {
  let temp = temp_config(
    r#"{ "dist_dir": "out", "parsers": { "repo": { "url": "file:///nonexistent/tree-sitter-catala" } } }"#,
  );

  catala_wasm_cmd()
    .current_dir(temp.path())
    .args(["--config", "bundle.json", "--output", "json"])
    .assert()
    .failure()
    .stdout(predicate::str::is_empty())
    .stderr(predicate::str::contains("tree-sitter-catala"));
}
