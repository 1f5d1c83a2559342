//! CLI argument contract tests
//!
//! The binary accepts exactly `errand <api-key> <task-description>`. Any
//! other argument count must print a usage message and exit with status 1
//! before anything network-facing is constructed.

use std::process::Command;

fn run_binary(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_errand"))
        .args(args)
        .output()
        .expect("failed to spawn errand binary")
}

fn assert_usage_exit(output: &std::process::Output) {
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Usage: errand <openai-api-key> <task-description>"),
        "expected usage line, got: {}",
        stderr
    );

    // No run was started, so no start message either
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("Starting task:"));
}

#[test]
fn no_arguments_exits_one_with_usage() {
    let output = run_binary(&[]);
    assert_usage_exit(&output);
}

#[test]
fn one_argument_exits_one_with_usage() {
    let output = run_binary(&["sk-only-a-key"]);
    assert_usage_exit(&output);
}

#[test]
fn three_arguments_exit_one_with_usage() {
    let output = run_binary(&["sk-key", "some task", "unexpected-extra"]);
    assert_usage_exit(&output);
}

#[test]
fn unknown_flag_exits_one_with_usage() {
    let output = run_binary(&["--frobnicate"]);
    assert_usage_exit(&output);
}

#[test]
fn help_flag_prints_help_and_exits_zero() {
    let output = run_binary(&["--help"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("errand"));
    assert!(stdout.contains("task"));
}
