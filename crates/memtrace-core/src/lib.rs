//! # memtrace-core
//!
//! A deterministic trace target for memory-access tracers, page-fault
//! monitors and cache profilers.
//!
//! The workload allocates a buffer of [`CELL_COUNT`](workload::CELL_COUNT)
//! `i32` cells, reports the buffer address to its harness, waits to be
//! released, then writes to cell zero exactly
//! [`TOTAL_INCREMENTS`](workload::TOTAL_INCREMENTS) times. A tracer that
//! watches the window between the ready prompt and the stop marker should see
//! that many stores to the printed address.
//!
//! ```rust
//! use std::io::Cursor;
//!
//! use memtrace_core::Workload;
//!
//! let mut workload = Workload::new();
//! let mut output = Vec::new();
//! let report = workload.run(&mut Cursor::new("\n"), &mut output)?;
//! assert_eq!(report.final_value - report.initial_value, 50_000);
//! # Ok::<(), memtrace_core::WorkloadError>(())
//! ```

pub mod error;
pub mod types;
pub mod workload;

pub use error::{WorkloadError, WorkloadResult};
pub use types::Address;
pub use workload::{Workload, WorkloadBuffer, WorkloadReport};
