//! Integration tests for the jsonbind CLI.
//!
//! These run the built binary against signature files in a temp dir and
//! check what a user sees on stdout and the exit status.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::{json, Value};

fn cmd() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_jsonbind"));
    cmd.env_remove("JSONBIND_INCLUDE_DETAIL")
        .env_remove("JSONBIND_DEFAULT_STATUS")
        .env("RUST_LOG", "off");
    cmd
}

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("write file");
    path
}

fn set_status_signature(dir: &Path) -> PathBuf {
    write_file(
        dir,
        "set_status.json",
        &json!({
            "name": "setStatus",
            "parameters": [
                {"name": "id", "type": {"type": "integer"}},
                {"name": "status", "type": {"type": "enum", "name": "Status", "variants": ["Active", "Inactive"]}}
            ],
            "returns": {"type": "bool"}
        })
        .to_string(),
    )
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is json")
}

/// Split `print_response` output into its status line and parsed body.
fn response_parts(output: &Output) -> (String, Value) {
    let text = String::from_utf8_lossy(&output.stdout);
    let mut lines = text.lines();
    let status_line = lines.next().expect("status line").to_string();
    let body = serde_json::from_str(lines.next().expect("body line")).expect("json body");
    (status_line, body)
}

#[test]
fn test_check_reports_strategy() {
    let temp = tempfile::tempdir().expect("tempdir");
    let signature = set_status_signature(temp.path());

    let output = cmd()
        .args(["check", signature.to_str().unwrap()])
        .output()
        .expect("run check");
    assert!(output.status.success());

    let report = stdout_json(&output);
    assert_eq!(report["name"], "setStatus");
    assert_eq!(report["strategy"], "wrapped");
    assert_eq!(report["parameters"], json!(["id", "status"]));
    assert_eq!(report["requestFormatter"], true);
    assert_eq!(report["replyFormatter"], true);
}

#[test]
fn test_check_rejects_invalid_signature() {
    let temp = tempfile::tempdir().expect("tempdir");
    let signature = write_file(
        temp.path(),
        "dup.json",
        r#"{"name":"dup","parameters":[{"name":"a","type":{"type":"integer"}},{"name":"a","type":{"type":"string"}}]}"#,
    );

    let output = cmd()
        .args(["check", signature.to_str().unwrap()])
        .output()
        .expect("run check");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Duplicate parameter"));
}

#[test]
fn test_decode_wrapped_body() {
    let temp = tempfile::tempdir().expect("tempdir");
    let signature = set_status_signature(temp.path());
    let body = write_file(
        temp.path(),
        "body.json",
        r#"{"status":"Inactive","ignored":[1,2],"id":7}"#,
    );

    let output = cmd()
        .args([
            "decode",
            "-s",
            signature.to_str().unwrap(),
            body.to_str().unwrap(),
        ])
        .output()
        .expect("run decode");
    assert!(output.status.success());
    assert_eq!(stdout_json(&output), json!({"id": 7, "status": "Inactive"}));
}

#[test]
fn test_decode_rejection_prints_fault() {
    let temp = tempfile::tempdir().expect("tempdir");
    let signature = set_status_signature(temp.path());
    let body = write_file(temp.path(), "body.json", r#"[7, "Active"]"#);

    let output = cmd()
        .args([
            "decode",
            "-s",
            signature.to_str().unwrap(),
            body.to_str().unwrap(),
        ])
        .output()
        .expect("run decode");
    assert!(!output.status.success());

    let (status_line, body) = response_parts(&output);
    assert_eq!(status_line, "500 application/json");
    assert_eq!(
        body,
        json!({"error": {"message": "Input needs to be wrapped in an object"}})
    );
}

#[test]
fn test_fault_hides_detail_by_default() {
    let output = cmd()
        .args(["fault", "outer", "inner"])
        .output()
        .expect("run fault");
    assert!(output.status.success());

    let (status_line, body) = response_parts(&output);
    assert_eq!(status_line, "500 application/json");
    assert_eq!(body, json!({"error": {"message": "outer"}}));
}

#[test]
fn test_fault_with_detail_and_status() {
    let output = cmd()
        .args(["--include-detail", "fault", "--status", "409", "outer", "inner"])
        .output()
        .expect("run fault");
    assert!(output.status.success());

    let (status_line, body) = response_parts(&output);
    assert_eq!(status_line, "409 application/json");
    assert_eq!(body["error"]["message"], "outer");
    assert_eq!(body["error"]["inner"]["message"], "inner");
}
