//! Incremental marker parser.

use std::fmt;

use tracing::{debug, trace};

use crate::error::{ProtocolError, ProtocolResult};
use crate::markers::{BEGIN_WORKLOAD_INFO, END_WORKLOAD_INFO, READY_TO_TRACE, STOP_TRACING};

/// Something the workload announced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolEvent
{
    /// Text found between the info markers, surrounding whitespace trimmed
    WorkloadInfo(String),
    /// The workload is blocked on stdin and waiting to be released
    ReadyToTrace,
    /// The traced section has finished
    StopTracing,
}

/// How far a workload has progressed through the protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolStage
{
    /// Waiting for the begin-info marker
    AwaitingInfo,
    /// Inside the info block, waiting for the end-info marker
    CollectingInfo,
    /// Info seen, waiting for the ready prompt
    AwaitingReady,
    /// Released, waiting for the stop marker
    Tracing,
    /// Every marker has been seen
    Finished,
}

impl ProtocolStage
{
    /// Marker that moves the stream out of this stage, if any
    pub const fn expected_marker(self) -> Option<&'static str>
    {
        match self {
            ProtocolStage::AwaitingInfo => Some(BEGIN_WORKLOAD_INFO),
            ProtocolStage::CollectingInfo => Some(END_WORKLOAD_INFO),
            ProtocolStage::AwaitingReady => Some(READY_TO_TRACE),
            ProtocolStage::Tracing => Some(STOP_TRACING),
            ProtocolStage::Finished => None,
        }
    }

    const fn next(self) -> Self
    {
        match self {
            ProtocolStage::AwaitingInfo => ProtocolStage::CollectingInfo,
            ProtocolStage::CollectingInfo => ProtocolStage::AwaitingReady,
            ProtocolStage::AwaitingReady => ProtocolStage::Tracing,
            ProtocolStage::Tracing | ProtocolStage::Finished => ProtocolStage::Finished,
        }
    }
}

impl fmt::Display for ProtocolStage
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let text = match self {
            ProtocolStage::AwaitingInfo => "waiting for the workload info block",
            ProtocolStage::CollectingInfo => "reading the workload info block",
            ProtocolStage::AwaitingReady => "waiting for the ready-to-trace prompt",
            ProtocolStage::Tracing => "tracing (waiting for the stop marker)",
            ProtocolStage::Finished => "finished",
        };
        f.write_str(text)
    }
}

/// Streaming recogniser for workload output
///
/// Feed it whatever the workload wrote, in whatever chunks the pipe hands
/// out. Markers are matched only in protocol order; anything else the
/// workload prints is skipped. While waiting for a marker the parser holds
/// at most one marker's worth of unmatched text, except inside the info
/// block where the text is the payload.
#[derive(Debug, Clone)]
pub struct ProtocolParser
{
    pending: String,
    stage: ProtocolStage,
}

impl Default for ProtocolParser
{
    fn default() -> Self
    {
        Self::new()
    }
}

impl ProtocolParser
{
    /// Create a parser positioned before the begin-info marker
    #[must_use]
    pub fn new() -> Self
    {
        Self {
            pending: String::new(),
            stage: ProtocolStage::AwaitingInfo,
        }
    }

    /// Current stage
    pub fn stage(&self) -> ProtocolStage
    {
        self.stage
    }

    /// Whether the stop marker has been seen
    pub fn is_finished(&self) -> bool
    {
        self.stage == ProtocolStage::Finished
    }

    /// Consume a chunk of workload output and return the events it completed
    pub fn feed(&mut self, text: &str) -> Vec<ProtocolEvent>
    {
        let mut events = Vec::new();
        if self.is_finished() {
            return events;
        }
        // Text already searched cannot hold a full marker; only its tail can start one
        let mut resume_at = Some(self.pending.len());
        self.pending.push_str(text);

        while let Some(marker) = self.stage.expected_marker() {
            let start = resume_at
                .take()
                .map_or(0, |len| self.boundary_at_or_after(len.saturating_sub(marker.len() - 1)));
            let Some(pos) = self.pending[start..].find(marker).map(|rel| start + rel) else {
                if self.stage != ProtocolStage::CollectingInfo {
                    self.discard_unmatchable(marker.len());
                }
                break;
            };

            let event = match self.stage {
                ProtocolStage::CollectingInfo => {
                    Some(ProtocolEvent::WorkloadInfo(self.pending[..pos].trim().to_string()))
                }
                ProtocolStage::AwaitingReady => Some(ProtocolEvent::ReadyToTrace),
                ProtocolStage::Tracing => Some(ProtocolEvent::StopTracing),
                ProtocolStage::AwaitingInfo | ProtocolStage::Finished => None,
            };
            if pos > 0 && self.stage != ProtocolStage::CollectingInfo {
                trace!(skipped = %&self.pending[..pos], "ignoring workload output");
            }

            self.pending.drain(..pos + marker.len());
            self.stage = self.stage.next();
            debug!(stage = ?self.stage, "protocol marker matched");
            events.extend(event);
        }

        if self.is_finished() {
            self.pending.clear();
        }
        events
    }

    /// Check that the stream ended in a complete state
    ///
    /// ## Errors
    ///
    /// Returns [`ProtocolError::UnexpectedEof`] unless the stop marker has
    /// been seen.
    pub fn finish(&self) -> ProtocolResult<()>
    {
        if self.is_finished() {
            Ok(())
        } else {
            Err(ProtocolError::UnexpectedEof { stage: self.stage })
        }
    }

    /// Drop buffered text that can no longer start a match for a marker of
    /// `marker_len` bytes.
    fn discard_unmatchable(&mut self, marker_len: usize)
    {
        let keep_from = self.boundary_at_or_after(self.pending.len().saturating_sub(marker_len.saturating_sub(1)));
        self.pending.drain(..keep_from);
    }

    /// First char boundary of `pending` at or after `index`
    fn boundary_at_or_after(&self, mut index: usize) -> usize
    {
        while !self.pending.is_char_boundary(index) {
            index += 1;
        }
        index
    }
}
