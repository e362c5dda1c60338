//! Integration tests driving the `sparse` binary.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

fn sparse() -> Command {
    Command::new(env!("CARGO_BIN_EXE_sparse"))
}

fn write_file(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("Failed to write fixture");
    path
}

fn run_with_stdin(args: &[&str], stdin: &str) -> Output {
    let mut child = sparse()
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn sparse");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(stdin.as_bytes())
        .expect("Failed to write stdin");
    child.wait_with_output().expect("Failed to wait for sparse")
}

#[test]
fn test_version() {
    let output = sparse().arg("version").output().expect("Failed to run sparse");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("sparse "), "got {stdout}");
}

#[test]
fn test_version_json() {
    let output = sparse()
        .args(["--json", "version"])
        .output()
        .expect("Failed to run sparse");
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be valid JSON");
    assert_eq!(json["name"], "sparse");
    assert_eq!(json["max_depth"], sparse_parser::DEFAULT_MAX_DEPTH);
}

#[test]
fn test_parse_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_file(dir.path(), "a.js", "var x = 1 + 2;\n");

    let output = sparse().arg("parse").arg(&file).output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be valid JSON");
    assert_eq!(json["type"], "Programs");
    let decl = &json["body"][0];
    assert_eq!(decl["type"], "VariableDeclaration");
    assert_eq!(decl["declarations"][0]["init"]["type"], "binaryExpression");
}

#[test]
fn test_parse_compact_from_stdin() {
    let output = run_with_stdin(&["parse", "--compact", "-"], "a.b");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim_end().lines().count(), 1);
    assert!(stdout.starts_with(r#"{"type":"Programs","loc":"#), "got {stdout}");
}

#[test]
fn test_parse_error_exits_with_status_1() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_file(dir.path(), "bad.js", "var a = 1;\nvar = 2;\n");

    let output = sparse().arg("parse").arg(&file).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Unexpected token: operator(=) (2:4)"),
        "got {stderr}"
    );
}

#[test]
fn test_parse_error_json() {
    let output = run_with_stdin(&["--json", "parse"], "continue");
    assert_eq!(output.status.code(), Some(1));
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be valid JSON");
    assert_eq!(json["ok"], false);
    assert_eq!(json["file"], "<stdin>");
    assert_eq!(json["error"]["kind"], "syntax");
    assert_eq!(json["error"]["position"]["line"], 1);
}

#[test]
fn test_max_depth_flag() {
    let output = run_with_stdin(&["--max-depth", "3", "parse"], "((((a))))");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Maximum nesting depth of 3 exceeded"), "got {stderr}");
}

#[test]
fn test_config_file_and_override() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_file(dir.path(), "sparse.json", r#"{"parser": {"max_depth": 3}}"#);

    let output = run_with_stdin(
        &["--config", config.to_str().unwrap(), "parse"],
        "((((a))))",
    );
    assert_eq!(output.status.code(), Some(1));

    let output = run_with_stdin(
        &["--config", config.to_str().unwrap(), "--max-depth", "64", "parse"],
        "((((a))))",
    );
    assert!(output.status.success());
}

#[test]
fn test_bad_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_file(dir.path(), "sparse.json", "{");
    let output = sparse()
        .args(["--config", config.to_str().unwrap(), "version"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to parse config"), "got {stderr}");
}

#[test]
fn test_tokens() {
    let output = run_with_stdin(&["tokens"], "a / b");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, ["0..1 name a", "2..3 operator /", "4..5 name b"]);
}

#[test]
fn test_tokens_json() {
    let output = run_with_stdin(&["--json", "tokens"], "x = /re/g");
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be valid JSON");
    let tokens = json.as_array().unwrap();
    assert_eq!(tokens.len(), 3);
    assert_eq!(tokens[2]["kind"], "regx");
    assert_eq!(tokens[2]["value"], "/re/g");
}

#[test]
fn test_check_reports_failures() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_file(dir.path(), "good.js", "if (a) b(); else c();");
    let bad = write_file(dir.path(), "bad.js", "break;");
    let missing = dir.path().join("missing.js");

    let output = sparse()
        .args(["--json", "check"])
        .arg(&good)
        .arg(&bad)
        .arg(&missing)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be valid JSON");
    assert_eq!(json["checked"], 3);
    assert_eq!(json["failed"], 2);
    let results = json["results"].as_array().unwrap();
    assert_eq!(results[0]["ok"], true);
    assert!(results[0].get("error").is_none());
    assert_eq!(results[1]["error"]["kind"], "syntax");
    assert!(results[2]["io_error"].is_string());
}

#[test]
fn test_check_all_good() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_file(dir.path(), "a.js", "var a = 1");
    let b = write_file(dir.path(), "b.js", "function f() { return }");

    let output = sparse().arg("check").arg(&a).arg(&b).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("checked 2 file(s), 0 failed"), "got {stdout}");
}

#[test]
fn test_print() {
    let output = run_with_stdin(&["print"], "if(a){b()}else c");
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "if (a) {\n  b();\n} else c;\n"
    );
}

#[test]
fn test_print_minify() {
    let output = run_with_stdin(&["print", "--minify"], "var a = 1,\n    b = a + 2;");
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "var a=1,b=a+2;\n");
}

#[test]
fn test_verbose_logs_go_to_stderr() {
    let output = run_with_stdin(&["-v", "--json", "parse", "--compact"], "a");
    assert!(output.status.success());

    // stdout stays a single JSON document
    let _: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be valid JSON");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("parse started"), "got {stderr}");
}
