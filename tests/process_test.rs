#![cfg(unix)]

use commons_kit::utils::error::{FailureCode, KclError};
use commons_kit::SystemProcess;
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn shell() -> SystemProcess {
    SystemProcess::new("/bin/sh")
}

#[test]
fn test_exit_code_and_streams_are_captured() {
    let output = shell()
        .execute(&["-c", "echo out; echo err 1>&2; exit 3"])
        .unwrap();

    assert_eq!(output.exit_code, 3);
    assert!(!output.success());
    assert_eq!(output.stdout_text(), "out\n");
    assert_eq!(output.stderr_text(), "err\n");
}

#[test]
fn test_large_output_does_not_block() {
    // Larger than a typical pipe buffer on both streams.
    let output = shell()
        .execute(&[
            "-c",
            "i=0; while [ $i -lt 20000 ]; do echo line$i; echo err$i 1>&2; i=$((i+1)); done",
        ])
        .unwrap();

    assert!(output.success());
    assert_eq!(output.stdout_text().lines().count(), 20000);
    assert_eq!(output.stderr_text().lines().count(), 20000);
}

#[test]
fn test_variables_without_inherited_environment() {
    std::env::set_var("COMMONS_KIT_PARENT_ONLY", "parent");
    let output = shell()
        .inherit_environment(false)
        .with_variable("GREETING", "hello")
        .execute(&["-c", "echo \"$GREETING:${COMMONS_KIT_PARENT_ONLY:-unset}\""])
        .unwrap();

    assert_eq!(output.stdout_text(), "hello:unset\n");
}

#[test]
fn test_inherited_environment() {
    std::env::set_var("COMMONS_KIT_INHERITED", "visible");
    let output = shell()
        .execute(&["-c", "echo $COMMONS_KIT_INHERITED"])
        .unwrap();

    assert_eq!(output.stdout_text(), "visible\n");
}

#[test]
fn test_working_directory() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("marker.txt"), "x").unwrap();

    let output = shell()
        .working_dir(temp_dir.path())
        .execute(&["-c", "ls"])
        .unwrap();

    assert_eq!(output.stdout_text().trim(), "marker.txt");
}

#[test]
fn test_timeout_kills_process() {
    let started = Instant::now();
    let result = shell()
        .timeout(Duration::from_millis(200))
        .execute(&["-c", "exec sleep 5"]);

    assert!(started.elapsed() < Duration::from_secs(4));
    match result {
        Err(KclError::TimeoutError { millis }) => assert_eq!(millis, 200),
        other => panic!("expected timeout, got {:?}", other),
    }
}

#[test]
fn test_timeout_returns_while_grandchild_holds_streams() {
    let started = Instant::now();
    let result = shell()
        .timeout(Duration::from_millis(200))
        .execute(&["-c", "sleep 6; echo late"]);

    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(matches!(result, Err(KclError::TimeoutError { millis: 200 })));
}

#[test]
fn test_timeout_with_background_descendant() {
    let started = Instant::now();
    let result = shell()
        .timeout(Duration::from_millis(300))
        .buffer_size(16)
        .execute(&["-c", "echo early; (sleep 6; echo late) & wait"]);

    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(matches!(result, Err(KclError::TimeoutError { millis: 300 })));
}

#[test]
fn test_fast_process_within_timeout() {
    let output = shell()
        .timeout(Duration::from_secs(10))
        .execute(&["-c", "echo done"])
        .unwrap();

    assert_eq!(output.stdout_text(), "done\n");
}

#[test]
fn test_missing_executable() {
    let result = SystemProcess::new("/no/such/program").execute::<&str>(&[]);
    let err = result.unwrap_err();
    assert_eq!(err.failure_code(), FailureCode::Io);
    assert!(err.to_string().contains("/no/such/program"));
}
