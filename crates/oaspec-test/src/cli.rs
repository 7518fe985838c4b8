//! CLI regression tests for the `oaspec` binary.
//!
//! These tests invoke the binary as a subprocess to catch regressions in flag
//! names, exit codes, and output formats.
//!
//! Run with: `cargo test -p oaspec-test`
//! Requires the `oaspec` binary to be built first (`cargo build -p oaspec-cli`).

use assert_cmd::Command;
use predicates::str::contains;
use tempfile::TempDir;

use crate::fixture;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Returns an assert_cmd Command wrapping the `oaspec` binary.
fn oaspec() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("oaspec")
        .expect("oaspec binary not found, run `cargo build -p oaspec-cli` first");
    cmd.env_remove("OASPEC_LOG")
        .env_remove("OASPEC_LOG_FORMAT")
        .env_remove("RUST_LOG");
    cmd
}

// ---------------------------------------------------------------------------
// oaspec validate
// ---------------------------------------------------------------------------

#[test]
fn validate_valid_spec_exits_zero() {
    oaspec()
        .args(["validate", "--spec"])
        .arg(fixture("petstore.yaml"))
        .assert()
        .success()
        .stderr(contains("is valid"));
}

#[test]
fn validate_several_specs() {
    oaspec()
        .args(["validate", "--spec"])
        .arg(fixture("petstore.yaml"))
        .arg(fixture("petstore.json"))
        .arg(fixture("minimal.yaml"))
        .assert()
        .success()
        .stderr(contains("validated 3 spec(s): 3 valid, 0 invalid"));
}

#[test]
fn validate_invalid_spec_lists_every_field() {
    oaspec()
        .args(["validate", "--spec"])
        .arg(fixture("invalid-missing-fields.yaml"))
        .assert()
        .failure()
        .code(1)
        .stderr(contains("has 5 error(s)"))
        .stderr(contains("E1003 [info.version]: required field missing"))
        .stderr(contains("E1003 [info.contact.url]: required field missing"))
        .stderr(contains("E1003 [paths./pets.get.parameters[0].in]"))
        .stderr(contains("E1003 [paths./pets.get.responses]"));
}

#[test]
fn validate_parse_error_exits_one() {
    oaspec()
        .args(["validate", "--spec"])
        .arg(fixture("invalid-parse-error.yaml"))
        .assert()
        .failure()
        .code(1)
        .stderr(contains("E1002"));
}

#[test]
fn validate_missing_file_exits_one() {
    oaspec()
        .args(["validate", "--spec", "this-file-does-not-exist.yaml"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("E1004"));
}

#[test]
fn validate_mixed_results_exits_one() {
    oaspec()
        .args(["validate", "--spec"])
        .arg(fixture("petstore.yaml"))
        .arg(fixture("invalid-missing-fields.yaml"))
        .assert()
        .failure()
        .code(1)
        .stderr(contains("1 valid, 1 invalid"));
}

#[test]
fn validate_json_format_outputs_valid_json() {
    let output = oaspec()
        .args(["validate", "--spec"])
        .arg(fixture("petstore.yaml"))
        .args(["--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let s = String::from_utf8(output).expect("stdout should be valid UTF-8");
    let v: serde_json::Value =
        serde_json::from_str(&s).expect("--format json output should be valid JSON");
    assert_eq!(v["summary"]["total"], 1);
    assert_eq!(v["results"][0]["valid"], true);
}

#[test]
fn validate_json_format_invalid_spec_reports_fields() {
    let output = oaspec()
        .args(["validate", "--spec"])
        .arg(fixture("invalid-missing-fields.yaml"))
        .args(["--format", "json"])
        .assert()
        .failure()
        .code(1)
        .get_output()
        .stdout
        .clone();

    let s = String::from_utf8(output).expect("stdout should be valid UTF-8");
    let v: serde_json::Value =
        serde_json::from_str(&s).expect("--format json output should be valid JSON even on error");
    let errors = v["results"][0]["errors"]
        .as_array()
        .expect("errors should be an array");
    assert_eq!(errors.len(), 5);
    assert_eq!(errors[0]["field"], "info.version");
    assert_eq!(errors[0]["code"], "E1003");
    assert_eq!(v["summary"]["invalid"], 1);
}

#[test]
fn validate_without_spec_exits_two() {
    oaspec().arg("validate").assert().failure().code(2);
}

#[test]
fn validate_unknown_format_exits_two() {
    oaspec()
        .args(["validate", "--spec"])
        .arg(fixture("minimal.yaml"))
        .args(["--format", "xml"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn invalid_log_format_exits_one() {
    oaspec()
        .args(["validate", "--log-format", "xml", "--spec"])
        .arg(fixture("minimal.yaml"))
        .assert()
        .failure()
        .code(1)
        .stderr(contains("invalid log format"));
}

#[test]
fn json_logs_go_to_stderr() {
    let output = oaspec()
        .args(["validate", "--format", "json", "--log-format", "json", "--log-level", "info"])
        .arg("--spec")
        .arg(fixture("minimal.yaml"))
        .assert()
        .success()
        .stderr(contains("spec_loaded"))
        .get_output()
        .stdout
        .clone();

    let s = String::from_utf8(output).expect("stdout should be valid UTF-8");
    serde_json::from_str::<serde_json::Value>(&s).expect("stdout carries only the report");
}

// ---------------------------------------------------------------------------
// oaspec convert
// ---------------------------------------------------------------------------

#[test]
fn convert_yaml_to_json_on_stdout() {
    let output = oaspec()
        .args(["convert", "--to", "json", "--spec"])
        .arg(fixture("petstore.yaml"))
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let s = String::from_utf8(output).expect("stdout should be valid UTF-8");
    assert!(s.contains("  \"openapi\": \"3.0.1\""));
    let converted = oaspec::Spec::from_json(&s).expect("converted JSON should load");
    let original = oaspec::Spec::from_file(fixture("petstore.yaml")).expect("fixture loads");
    assert_eq!(converted, original);
}

#[test]
fn convert_json_to_yaml_file() {
    let tmp = TempDir::new().expect("temp dir");
    let out = tmp.path().join("petstore.yaml");

    oaspec()
        .args(["convert", "--to", "yaml", "--spec"])
        .arg(fixture("petstore.json"))
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    let text = std::fs::read_to_string(&out).expect("output written");
    let raw: serde_json::Value = serde_yaml::from_str(&text).expect("output is YAML");
    assert_eq!(raw["paths"]["/pets/{petId}"]["get"]["parameters"][0]["in"], "path");
    assert_eq!(raw["x-api-id"], "petstore");
}

#[test]
fn convert_invalid_spec_exits_one() {
    oaspec()
        .args(["convert", "--to", "json", "--spec"])
        .arg(fixture("invalid-missing-fields.yaml"))
        .assert()
        .failure()
        .code(1)
        .stdout("")
        .stderr(contains("E1003"))
        .stderr(contains("info.license.url: required field missing"));
}

#[test]
fn convert_requires_target_format() {
    oaspec()
        .args(["convert", "--spec"])
        .arg(fixture("minimal.yaml"))
        .assert()
        .failure()
        .code(2);
}

#[test]
fn convert_unknown_target_exits_two() {
    oaspec()
        .args(["convert", "--to", "toml", "--spec"])
        .arg(fixture("minimal.yaml"))
        .assert()
        .failure()
        .code(2);
}
