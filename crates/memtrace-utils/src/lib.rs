//! # memtrace utilities
//!
//! Shared helpers for the memtrace workspace. Right now that is the logging
//! setup used by both the workload binary and the harness, built on `tracing`.

pub mod logging;

// Re-export commonly used logging functions for convenience
pub use logging::{init_logging, init_logging_with_level, LogFormat, LogLevel, LoggingError};
pub use tracing::{debug, error, info, trace, warn};
