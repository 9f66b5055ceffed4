//! End-to-end tests for `memtrace run`

use std::process::Command;

use memtrace_core::types::Address;

const MEMTRACE: &str = env!("CARGO_BIN_EXE_memtrace");
const WORKLOAD: &str = env!("CARGO_BIN_EXE_memory-intensive-workload");

#[test]
fn test_run_drives_the_workload()
{
    let output = Command::new(MEMTRACE)
        .args(["run", "--timeout", "60", "--quiet-workload-stderr", WORKLOAD])
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to launch memtrace");
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(output.status.success(), "stdout: {stdout}");

    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 4, "stdout: {stdout}");
    assert_eq!(lines[0], "-----begin workload info-----");
    let address: Address = lines[1].parse().unwrap();
    assert!(!address.is_null());
    assert_eq!(lines[2], "-----end workload info-----");

    let millis = lines[3]
        .strip_prefix("tracing_duration_in_milliseconds: ")
        .expect("duration line");
    millis.parse::<u128>().unwrap();
}

#[test]
fn test_run_fails_for_missing_program()
{
    let output = Command::new(MEMTRACE)
        .args(["run", "/nonexistent/workload"])
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to launch memtrace");
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_markers_lists_protocol()
{
    let output = Command::new(MEMTRACE).arg("markers").output().expect("failed to launch memtrace");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let begin = stdout.find("-----begin workload info-----").unwrap();
    let ready = stdout.find("Ready to trace. Press enter to continue").unwrap();
    let stop = stdout.find("Stop tracing").unwrap();
    assert!(begin < ready && ready < stop);
}
