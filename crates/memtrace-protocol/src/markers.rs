//! Marker lines shared by workloads and harnesses.

use std::io::{self, Write};

/// Opens the workload info block
pub const BEGIN_WORKLOAD_INFO: &str = "-----begin workload info-----";

/// Closes the workload info block
pub const END_WORKLOAD_INFO: &str = "-----end workload info-----";

/// Printed by the workload right before it blocks on stdin
pub const READY_TO_TRACE: &str = "Ready to trace. Press enter to continue";

/// Printed by the workload when the traced section is over
pub const STOP_TRACING: &str = "Stop tracing";

/// Write `marker` as a full line and flush, so an observer reading the pipe
/// sees it immediately.
///
/// ## Errors
///
/// Propagates any error from the underlying writer.
pub fn write_marker<W: Write>(out: &mut W, marker: &str) -> io::Result<()>
{
    writeln!(out, "{marker}")?;
    out.flush()
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_write_marker_appends_newline()
    {
        let mut out = Vec::new();
        write_marker(&mut out, STOP_TRACING).unwrap();
        assert_eq!(out, b"Stop tracing\n");
    }

    #[test]
    fn test_markers_are_distinct()
    {
        let markers = [BEGIN_WORKLOAD_INFO, END_WORKLOAD_INFO, READY_TO_TRACE, STOP_TRACING];
        for (i, a) in markers.iter().enumerate() {
            for b in &markers[i + 1..] {
                assert!(!a.contains(b) && !b.contains(a), "{a:?} overlaps {b:?}");
            }
        }
    }
}
