//! # Workload
//!
//! The trace target itself.
//!
//! ## Sequence
//!
//! 1. Allocate [`CELL_COUNT`] cells
//! 2. Print the buffer address inside the workload info markers
//! 3. Print the ready prompt and block until one line arrives on the input
//! 4. Increment cell zero [`OUTER_ITERATIONS`] × [`INNER_ITERATIONS`] times
//! 5. Print the stop marker
//!
//! Every marker is flushed as soon as it is written. The input line's content
//! is ignored, and end of input releases the workload just like a newline.
//!
//! ## Access pattern
//!
//! The loop always targets cell zero, never a varying index. Each increment
//! goes through [`std::hint::black_box`], so the optimiser has to perform
//! every load and store instead of folding the loop into a single add. A
//! tracer watching the window sees [`TOTAL_INCREMENTS`] writes to the
//! printed address.

use std::io::{BufRead, Write};
use std::{hint, ptr};

use memtrace_protocol::{write_marker, BEGIN_WORKLOAD_INFO, END_WORKLOAD_INFO, READY_TO_TRACE, STOP_TRACING};
use tracing::{debug, info};

use crate::error::WorkloadResult;
use crate::types::Address;

/// Number of `i32` cells in the workload buffer
pub const CELL_COUNT: usize = 10_000;

/// Passes over the inner loop
pub const OUTER_ITERATIONS: usize = 5;

/// Increments per pass
pub const INNER_ITERATIONS: usize = CELL_COUNT;

/// Writes to cell zero during one run
pub const TOTAL_INCREMENTS: usize = OUTER_ITERATIONS * INNER_ITERATIONS;

/// Fixed-size block of `i32` cells
///
/// Allocated once and never resized, so the address of cell zero stays
/// valid for as long as the buffer lives.
#[derive(Debug, Clone)]
pub struct WorkloadBuffer
{
    cells: Box<[i32]>,
}

impl Default for WorkloadBuffer
{
    fn default() -> Self
    {
        Self::new()
    }
}

impl WorkloadBuffer
{
    /// Allocate [`CELL_COUNT`] zeroed cells
    #[must_use]
    pub fn new() -> Self
    {
        Self {
            cells: vec![0; CELL_COUNT].into_boxed_slice(),
        }
    }

    /// Number of cells
    pub fn len(&self) -> usize
    {
        self.cells.len()
    }

    /// Always `false`; the buffer has a fixed non-zero size
    pub fn is_empty(&self) -> bool
    {
        self.cells.is_empty()
    }

    /// Start of the buffer, which is also the address of cell zero
    pub fn address(&self) -> Address
    {
        Address::from_ptr(self.cells.as_ptr())
    }

    /// Address of cell `index`, or `None` past the end
    pub fn cell_address(&self, index: usize) -> Option<Address>
    {
        self.cells.get(index).map(|cell| Address::from_ptr(ptr::from_ref(cell)))
    }

    /// Value of cell `index`, or `None` past the end
    pub fn get(&self, index: usize) -> Option<i32>
    {
        self.cells.get(index).copied()
    }

    /// Value of cell zero
    pub fn first(&self) -> i32
    {
        self.cells[0]
    }

    /// Add one to cell zero, forcing a real load and store
    #[inline(never)]
    pub fn increment_first(&mut self)
    {
        let cell = hint::black_box(&mut self.cells[0]);
        *cell = cell.wrapping_add(1);
    }
}

/// Run the fixed 5 × 10,000 increment loop on cell zero
///
/// Returns the number of increments performed.
pub fn memory_intensive_loop(buffer: &mut WorkloadBuffer) -> usize
{
    let mut increments = 0;
    for _ in 0..OUTER_ITERATIONS {
        for _ in 0..INNER_ITERATIONS {
            buffer.increment_first();
            increments += 1;
        }
    }
    increments
}

/// What a single run observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkloadReport
{
    /// Address printed in the workload info block
    pub address: Address,
    /// Cell zero before the loop
    pub initial_value: i32,
    /// Cell zero after the loop
    pub final_value: i32,
    /// Increments performed by the loop
    pub increments: usize,
}

/// The trace target: a buffer plus the marker sequence around the loop
#[derive(Debug, Default)]
pub struct Workload
{
    buffer: WorkloadBuffer,
}

impl Workload
{
    /// Allocate the buffer
    #[must_use]
    pub fn new() -> Self
    {
        Self {
            buffer: WorkloadBuffer::new(),
        }
    }

    /// The buffer the loop writes to
    pub fn buffer(&self) -> &WorkloadBuffer
    {
        &self.buffer
    }

    /// Run the full marker / pause / loop / marker sequence
    ///
    /// `input` is read for exactly one line after the ready prompt. `output`
    /// receives the protocol text and nothing else.
    ///
    /// ## Errors
    ///
    /// Returns [`WorkloadError::Io`](crate::WorkloadError::Io) if a marker
    /// cannot be written or the release line cannot be read.
    pub fn run<R, W>(&mut self, input: &mut R, output: &mut W) -> WorkloadResult<WorkloadReport>
    where
        R: BufRead,
        W: Write,
    {
        let address = self.buffer.address();
        info!(%address, cells = self.buffer.len(), "workload buffer allocated");

        write_marker(output, BEGIN_WORKLOAD_INFO)?;
        write!(output, "{address}")?;
        write_marker(output, END_WORKLOAD_INFO)?;

        write_marker(output, READY_TO_TRACE)?;
        let mut line = Vec::new();
        let read = input.read_until(b'\n', &mut line)?;
        debug!(bytes = read, "released by harness");

        let initial_value = self.buffer.first();
        let increments = memory_intensive_loop(&mut self.buffer);
        let final_value = self.buffer.first();
        debug!(increments, initial_value, final_value, "memory loop finished");

        write_marker(output, STOP_TRACING)?;

        Ok(WorkloadReport {
            address,
            initial_value,
            final_value,
            increments,
        })
    }
}
