//! Memory-intensive trace target
//!
//! Allocates 10,000 `i32` cells, prints the buffer address between the
//! workload info markers, waits for enter, then increments cell zero 50,000
//! times before printing "Stop tracing".
//!
//! ## Usage:
//!
//! ```bash
//! # Drive it by hand
//! cargo run --bin memory-intensive-workload
//!
//! # Or let the native harness release it and time the window
//! cargo run --bin memtrace -- run target/debug/memory-intensive-workload
//! ```
//!
//! stdout carries only the protocol. Logs (off below `warn` unless
//! `RUST_LOG` says otherwise) go to stderr.

use std::io;
use std::process::ExitCode;

use memtrace_core::Workload;
use memtrace_utils::{debug, init_logging, LogLevel};

fn main() -> ExitCode
{
    // Logging failures never stop the workload
    let _guard = match init_logging(LogLevel::Warn) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            None
        }
    };

    let mut input = io::stdin().lock();
    let mut output = io::stdout().lock();

    let mut workload = Workload::new();
    match workload.run(&mut input, &mut output) {
        Ok(report) => {
            debug!(
                address = %report.address,
                final_value = report.final_value,
                "workload finished"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
