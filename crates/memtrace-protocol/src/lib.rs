//! # memtrace-protocol
//!
//! The line protocol a traced workload speaks to its harness over stdout.
//!
//! A workload prints, in order:
//!
//! 1. [`BEGIN_WORKLOAD_INFO`]
//! 2. free-form runtime info (may be empty, may lack a trailing newline)
//! 3. [`END_WORKLOAD_INFO`]
//! 4. [`READY_TO_TRACE`], then blocks until a line arrives on stdin
//! 5. [`STOP_TRACING`] once the traced section is done
//!
//! The harness presses enter after step 4 and measures the window until
//! step 5. [`ProtocolParser`] recognises these markers in arbitrary chunks of
//! workload output.
//!
//! ```rust
//! use memtrace_protocol::{ProtocolEvent, ProtocolParser};
//!
//! let mut parser = ProtocolParser::new();
//! let events = parser.feed("-----begin workload info-----\n0x1000-----end workload info-----\n");
//! assert_eq!(events, vec![ProtocolEvent::WorkloadInfo("0x1000".to_string())]);
//! ```

pub mod error;
pub mod markers;
pub mod parser;

pub use error::{ProtocolError, ProtocolResult};
pub use markers::{write_marker, BEGIN_WORKLOAD_INFO, END_WORKLOAD_INFO, READY_TO_TRACE, STOP_TRACING};
pub use parser::{ProtocolEvent, ProtocolParser, ProtocolStage};
