//! # Error Types
//!
//! The workload has a single failure mode it can observe: its stdio handles.
//! A failed allocation aborts the process before any of this code runs.

use thiserror::Error;

/// Error raised while running the workload
#[derive(Error, Debug)]
pub enum WorkloadError
{
    /// Writing a marker or reading the release line failed
    ///
    /// Typically the harness closed its end of the pipe early.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for `Result<T, WorkloadError>`
pub type WorkloadResult<T> = std::result::Result<T, WorkloadError>;
