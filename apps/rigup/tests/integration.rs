//! Integration tests for the rigup CLI

use std::process::Command;

#[test]
fn test_cli_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_rigup"))
        .arg("--version")
        .output()
        .expect("Failed to execute rigup");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("rigup"));
}

#[test]
fn test_cli_help() {
    let output = Command::new(env!("CARGO_BIN_EXE_rigup"))
        .arg("--help")
        .output()
        .expect("Failed to execute rigup");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Idempotent provisioning runner"));
    assert!(stdout.contains("run"));
    assert!(stdout.contains("check"));
    assert!(stdout.contains("list"));
}

#[test]
fn test_cli_invalid_command() {
    let output = Command::new(env!("CARGO_BIN_EXE_rigup"))
        .arg("invalid-command")
        .output()
        .expect("Failed to execute rigup");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unrecognized subcommand"));
}

#[test]
fn test_missing_plan_exits_with_plan_code() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("no-such-plan.toml");

    let output = Command::new(env!("CARGO_BIN_EXE_rigup"))
        .args(["--plan", missing.to_str().expect("utf8 path"), "list"])
        .output()
        .expect("Failed to execute rigup");

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error:"));
}

#[test]
fn test_list_renders_plan_steps() {
    let dir = tempfile::tempdir().expect("tempdir");
    let plan_path = dir.path().join("plan.toml");
    std::fs::write(
        &plan_path,
        r#"
name = "ocr-stack"

[[step]]
name = "build-tools"

[step.packages]
entries = [
    { name = "autoconf" },
    { name = "libtool" },
]

[[step]]
name = "ocr-engine"

[step.postcondition]
command = ["tesseract", "-v"]

[[step.build]]
argv = ["make", "install"]
"#,
    )
    .expect("write plan");

    let output = Command::new(env!("CARGO_BIN_EXE_rigup"))
        .args(["--plan", plan_path.to_str().expect("utf8 path"), "list"])
        .output()
        .expect("Failed to execute rigup");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ocr-stack"));
    assert!(stdout.contains("build-tools"));
    assert!(stdout.contains("ocr-engine"));
    assert!(stdout.contains("2 steps."));
}

#[test]
fn test_json_list_output() {
    let dir = tempfile::tempdir().expect("tempdir");
    let plan_path = dir.path().join("plan.toml");
    std::fs::write(
        &plan_path,
        r#"
[[step]]
name = "ocr-engine"

[step.postcondition]
command = ["tesseract", "-v"]

[[step.build]]
argv = ["make", "install"]
"#,
    )
    .expect("write plan");

    let output = Command::new(env!("CARGO_BIN_EXE_rigup"))
        .args([
            "--plan",
            plan_path.to_str().expect("utf8 path"),
            "--json",
            "list",
        ])
        .output()
        .expect("Failed to execute rigup");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let value: serde_json::Value = serde_json::from_str(stdout.trim()).expect("valid json");
    assert_eq!(value["result"], "steps");
    assert_eq!(value["total"], 1);
    assert_eq!(value["steps"][0]["name"], "ocr-engine");
}

#[test]
fn test_check_reports_pending_steps() {
    let dir = tempfile::tempdir().expect("tempdir");
    let plan_path = dir.path().join("plan.toml");
    let absent = dir.path().join("never-created");
    std::fs::write(
        &plan_path,
        format!(
            r#"
[[step]]
name = "ocr-data"

[step.postcondition]
file = "{}"

[[step.build]]
argv = ["true"]
"#,
            absent.display()
        ),
    )
    .expect("write plan");

    let output = Command::new(env!("CARGO_BIN_EXE_rigup"))
        .args(["--plan", plan_path.to_str().expect("utf8 path"), "check"])
        .output()
        .expect("Failed to execute rigup");

    // Checking never provisions, so a pending step still exits zero
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("pending"));
    assert!(!absent.exists());
}

#[test]
fn test_failed_build_step_exit_code() {
    let dir = tempfile::tempdir().expect("tempdir");
    let plan_path = dir.path().join("plan.toml");
    std::fs::write(
        &plan_path,
        r#"
[[step]]
name = "doomed"

[step.postcondition]
file = "/nonexistent/never-created"

[[step.build]]
argv = ["sh", "-c", "exit 7"]
"#,
    )
    .expect("write plan");

    let output = Command::new(env!("CARGO_BIN_EXE_rigup"))
        .args(["--plan", plan_path.to_str().expect("utf8 path"), "run"])
        .output()
        .expect("Failed to execute rigup");

    assert_eq!(output.status.code(), Some(13));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error:"));
}

#[test]
fn test_run_only_rejects_unknown_step() {
    let dir = tempfile::tempdir().expect("tempdir");
    let plan_path = dir.path().join("plan.toml");
    std::fs::write(
        &plan_path,
        r#"
[[step]]
name = "ocr-engine"

[step.postcondition]
command = ["tesseract", "-v"]

[[step.build]]
argv = ["make", "install"]
"#,
    )
    .expect("write plan");

    let output = Command::new(env!("CARGO_BIN_EXE_rigup"))
        .args([
            "--plan",
            plan_path.to_str().expect("utf8 path"),
            "run",
            "--only",
            "no-such-step",
        ])
        .output()
        .expect("Failed to execute rigup");

    assert_eq!(output.status.code(), Some(3));
}
