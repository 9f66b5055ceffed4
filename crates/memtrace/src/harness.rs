//! # Native harness
//!
//! Runs a workload on the host and plays the tracer's side of the marker
//! protocol: collect the workload info, press enter when the workload says it
//! is ready, and time the window until it prints the stop marker.
//!
//! No tracing is attached here. The measured duration is the baseline a
//! traced run can be compared against.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use memtrace_protocol::{write_marker, ProtocolError, ProtocolEvent, ProtocolParser, BEGIN_WORKLOAD_INFO, END_WORKLOAD_INFO};
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, Command};
use tracing::{debug, info, warn};

const READ_CHUNK_SIZE: usize = 4096;

/// How to launch the workload
#[derive(Debug, Clone)]
pub struct HarnessConfig
{
    /// Executable to run
    pub program: PathBuf,
    /// Arguments passed through to the workload
    pub args: Vec<String>,
    /// Upper bound for the whole run; `None` waits forever
    pub timeout: Option<Duration>,
    /// Discard the workload's stderr instead of inheriting it
    pub quiet_workload_stderr: bool,
}

impl HarnessConfig
{
    /// Config for `program` with no arguments, no timeout and inherited stderr
    pub fn new(program: impl Into<PathBuf>) -> Self
    {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: None,
            quiet_workload_stderr: false,
        }
    }
}

/// Result of one harness run
#[derive(Debug, Clone)]
pub struct TraceReport
{
    /// Text between the workload info markers
    pub workload_info: String,
    /// Time from releasing the workload to its stop marker
    pub tracing_duration: Duration,
}

impl TraceReport
{
    /// Print the report in the harness output format
    ///
    /// The info block is skipped when the workload printed no info.
    ///
    /// ## Errors
    ///
    /// Propagates any error from `out`.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()>
    {
        if !self.workload_info.is_empty() {
            write_marker(out, BEGIN_WORKLOAD_INFO)?;
            writeln!(out, "{}", self.workload_info)?;
            write_marker(out, END_WORKLOAD_INFO)?;
        }
        writeln!(out, "tracing_duration_in_milliseconds: {}", self.tracing_duration.as_millis())?;
        out.flush()
    }
}

/// Errors from a harness run
#[derive(Error, Debug)]
pub enum HarnessError
{
    /// The workload could not be started
    #[error("Failed to launch workload {}: {source}", program.display())]
    Spawn
    {
        /// Program that failed to start
        program: PathBuf,
        /// Underlying spawn error
        #[source]
        source: io::Error,
    },

    /// The workload broke the marker protocol
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The run exceeded the configured timeout
    #[error("Workload did not finish within {0:?}")]
    TimedOut(Duration),

    /// The workload completed the protocol but exited unsuccessfully
    #[error("Workload exited with {0}")]
    WorkloadFailed(ExitStatus),

    /// A stdio pipe requested at spawn time was not available
    #[error("Workload {0} was not captured")]
    MissingPipe(&'static str),

    /// I/O error talking to the workload
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Convenience type alias for `Result<T, HarnessError>`
pub type HarnessResult<T> = std::result::Result<T, HarnessError>;

/// Launch the workload and follow it through the protocol
///
/// ## Errors
///
/// See [`HarnessError`]. On timeout the workload is killed before returning.
pub async fn run_workload(config: &HarnessConfig) -> HarnessResult<TraceReport>
{
    let mut command = Command::new(&config.program);
    command
        .args(&config.args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(if config.quiet_workload_stderr {
            Stdio::null()
        } else {
            Stdio::inherit()
        })
        .kill_on_drop(true);

    let mut child = command.spawn().map_err(|source| HarnessError::Spawn {
        program: config.program.clone(),
        source,
    })?;
    info!(pid = ?child.id(), program = %config.program.display(), "workload launched");

    let Some(limit) = config.timeout else {
        return drive(&mut child).await;
    };

    let outcome = tokio::time::timeout(limit, drive(&mut child)).await;
    match outcome {
        Ok(result) => result,
        Err(_) => {
            warn!(?limit, "workload timed out, killing it");
            child.kill().await?;
            Err(HarnessError::TimedOut(limit))
        }
    }
}

async fn drive(child: &mut Child) -> HarnessResult<TraceReport>
{
    let mut stdin = child.stdin.take().ok_or(HarnessError::MissingPipe("stdin"))?;
    let mut stdout = child.stdout.take().ok_or(HarnessError::MissingPipe("stdout"))?;

    let mut parser = ProtocolParser::new();
    let mut workload_info = String::new();
    let mut released_at: Option<Instant> = None;
    let mut tracing_duration = Duration::ZERO;
    let mut chunk = [0_u8; READ_CHUNK_SIZE];
    let mut undecoded = Vec::new();

    // Keep draining after the stop marker so the workload never blocks on a full pipe
    loop {
        let read = stdout.read(&mut chunk).await?;
        if read == 0 {
            break;
        }
        undecoded.extend_from_slice(&chunk[..read]);

        for event in parser.feed(&decode_available(&mut undecoded)) {
            match event {
                ProtocolEvent::WorkloadInfo(text) => {
                    info!(workload_info = %text, "workload info received");
                    workload_info = text;
                }
                ProtocolEvent::ReadyToTrace => {
                    debug!("workload ready, pressing enter");
                    released_at = Some(Instant::now());
                    match press_enter(&mut stdin).await {
                        Ok(()) => {}
                        // The stop marker, or its absence, decides the outcome
                        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                            warn!(error = %e, "workload closed stdin before it was released");
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
                ProtocolEvent::StopTracing => {
                    tracing_duration = released_at.map(|t| t.elapsed()).unwrap_or_default();
                    info!(duration_ms = tracing_duration.as_millis(), "workload stopped tracing");
                }
            }
        }
    }
    drop(stdin);

    if !undecoded.is_empty() {
        parser.feed(&String::from_utf8_lossy(&undecoded));
    }
    parser.finish()?;

    let exit_status = child.wait().await?;
    if !exit_status.success() {
        return Err(HarnessError::WorkloadFailed(exit_status));
    }
    debug!(status = %exit_status, "workload exited");

    Ok(TraceReport {
        workload_info,
        tracing_duration,
    })
}

async fn press_enter(stdin: &mut ChildStdin) -> io::Result<()>
{
    stdin.write_all(b"\n").await?;
    stdin.flush().await
}

/// Take the longest valid UTF-8 prefix out of `bytes` as text
///
/// An incomplete sequence at the end stays in `bytes` for the next read.
/// Invalid sequences become U+FFFD.
fn decode_available(bytes: &mut Vec<u8>) -> String
{
    let mut text = String::new();
    loop {
        match std::str::from_utf8(bytes) {
            Ok(valid) => {
                text.push_str(valid);
                bytes.clear();
                return text;
            }
            Err(e) => {
                let valid_up_to = e.valid_up_to();
                text.push_str(&String::from_utf8_lossy(&bytes[..valid_up_to]));
                match e.error_len() {
                    Some(invalid) => {
                        text.push(char::REPLACEMENT_CHARACTER);
                        bytes.drain(..valid_up_to + invalid);
                    }
                    None => {
                        bytes.drain(..valid_up_to);
                        return text;
                    }
                }
            }
        }
    }
}
