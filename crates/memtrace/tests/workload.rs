//! End-to-end tests for the workload binary

use std::io::{BufRead, BufReader, Read, Write};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use memtrace_core::types::Address;
use memtrace_protocol::{BEGIN_WORKLOAD_INFO, END_WORKLOAD_INFO, READY_TO_TRACE, STOP_TRACING};

const WORKLOAD: &str = env!("CARGO_BIN_EXE_memory-intensive-workload");

fn run_to_completion() -> (String, i32)
{
    let mut child = Command::new(WORKLOAD)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to launch workload");

    child.stdin.take().unwrap().write_all(b"\n").unwrap();
    let output = child.wait_with_output().unwrap();
    (String::from_utf8(output.stdout).unwrap(), output.status.code().unwrap())
}

/// Split stdout into (address, remaining marker lines)
fn parse(stdout: &str) -> (Address, Vec<&str>)
{
    let mut lines = stdout.lines();
    assert_eq!(lines.next(), Some(BEGIN_WORKLOAD_INFO));
    let info_line = lines.next().unwrap();
    let address_text = info_line.strip_suffix(END_WORKLOAD_INFO).expect("end marker follows the address");
    (address_text.parse().unwrap(), lines.collect())
}

#[test]
fn test_workload_prints_markers_in_order()
{
    let (stdout, code) = run_to_completion();
    assert_eq!(code, 0);

    let (address, rest) = parse(&stdout);
    assert!(!address.is_null());
    assert_eq!(rest, vec![READY_TO_TRACE, STOP_TRACING]);
    assert!(stdout.ends_with("Stop tracing\n"));
}

#[test]
fn test_workload_structure_is_stable_across_runs()
{
    let (first, _) = run_to_completion();
    let (second, _) = run_to_completion();

    let (_, first_rest) = parse(&first);
    let (_, second_rest) = parse(&second);
    assert_eq!(first_rest, second_rest);
    assert_eq!(first.lines().count(), second.lines().count());
}

#[test]
fn test_workload_blocks_until_input_arrives()
{
    let mut child = Command::new(WORKLOAD)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to launch workload");
    let stdin = child.stdin.take().unwrap();
    let mut stdout = BufReader::new(child.stdout.take().unwrap());

    let mut seen = String::new();
    while !seen.contains(READY_TO_TRACE) {
        let mut line = String::new();
        assert_ne!(stdout.read_line(&mut line).unwrap(), 0, "workload exited early");
        seen.push_str(&line);
    }

    thread::sleep(Duration::from_millis(300));
    assert!(child.try_wait().unwrap().is_none(), "workload ran without being released");

    child.kill().unwrap();
    child.wait().unwrap();
    drop(stdin);

    let mut rest = String::new();
    stdout.read_to_string(&mut rest).unwrap();
    assert!(!rest.contains(STOP_TRACING));
}

#[test]
fn test_workload_released_by_closed_stdin()
{
    let output = Command::new(WORKLOAD)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .expect("failed to launch workload");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).ends_with("Stop tracing\n"));
}
