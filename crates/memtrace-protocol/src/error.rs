//! # Error Types
//!
//! Failures detected while following a workload's marker stream.

use thiserror::Error;

use crate::parser::ProtocolStage;

/// Protocol violation reported by [`ProtocolParser`](crate::ProtocolParser)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError
{
    /// The workload's output ended before it printed every marker
    ///
    /// Usually means the workload crashed or was not written against this
    /// protocol. The stage says how far it got.
    #[error("workload output ended while {stage}")]
    UnexpectedEof
    {
        /// Stage the parser was in when the stream closed
        stage: ProtocolStage,
    },
}

/// Convenience type alias for `Result<T, ProtocolError>`
pub type ProtocolResult<T> = std::result::Result<T, ProtocolError>;
