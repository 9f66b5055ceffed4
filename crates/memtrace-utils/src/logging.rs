//! # Logging Utilities
//!
//! Logging infrastructure for memtrace using `tracing`.
//!
//! Both binaries in this workspace talk to their observer over stdout, so
//! every log line goes to **stderr** (and optionally to a file). Nothing
//! logged here can ever interleave with the workload protocol markers.
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Log filter (e.g. `RUST_LOG=debug`, `RUST_LOG=memtrace_core=trace`)
//! - `MEMTRACE_LOG_FORMAT`: Output format (`json` or `pretty`, default: `pretty`)
//! - `MEMTRACE_LOG_FILE`: Optional path to a log file, rotated daily
//!
//! ## Example
//!
//! ```rust,no_run
//! use memtrace_utils::{LogLevel, init_logging};
//!
//! // Keep the guard alive for as long as logs should be written
//! let _guard = init_logging(LogLevel::Info).expect("Failed to initialize logging");
//! tracing::info!("harness started");
//! ```

use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{env, fmt as std_fmt};

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::{self};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Environment variable selecting the log output format
pub const LOG_FORMAT_ENV: &str = "MEMTRACE_LOG_FORMAT";

/// Environment variable naming an optional log file
pub const LOG_FILE_ENV: &str = "MEMTRACE_LOG_FILE";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat
{
    /// Pretty-printed, human-readable format
    #[default]
    Pretty,
    /// JSON lines, one object per event
    Json,
}

impl FromStr for LogFormat
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "pretty" | "dev" | "development" => Ok(LogFormat::Pretty),
            "json" | "prod" | "production" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {s}. Use 'pretty' or 'json'")),
        }
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel
{
    /// Error level
    Error,
    /// Warning level
    Warn,
    /// Info level
    Info,
    /// Debug level
    Debug,
    /// Trace level (most verbose)
    Trace,
}

impl From<LogLevel> for Level
{
    fn from(level: LogLevel) -> Self
    {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

impl FromStr for LogLevel
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "error" | "err" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "dbg" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(format!(
                "Unknown log level: {s}. Use 'error', 'warn', 'info', 'debug', or 'trace'"
            )),
        }
    }
}

impl std_fmt::Display for LogLevel
{
    fn fmt(&self, f: &mut std_fmt::Formatter<'_>) -> std_fmt::Result
    {
        let directive = match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        };
        f.write_str(directive)
    }
}

/// Keeps the background file writer alive.
///
/// Dropping the guard flushes and stops the file appender, so hold it until
/// the program exits. When no log file is configured the guard is empty.
#[must_use = "dropping the guard stops file logging"]
#[derive(Debug, Default)]
pub struct LoggingGuard
{
    _file_writer: Option<WorkerGuard>,
}

/// Initialize logging from the environment
///
/// `default_level` applies when `RUST_LOG` is unset or unparsable. The format
/// comes from `MEMTRACE_LOG_FORMAT` and an optional file from
/// `MEMTRACE_LOG_FILE`.
///
/// ## Errors
///
/// Returns an error if:
/// - `MEMTRACE_LOG_FORMAT` holds an unknown format
/// - A global subscriber is already installed
/// - The log file cannot be created
pub fn init_logging(default_level: LogLevel) -> Result<LoggingGuard, LoggingError>
{
    let format = format_from_env()?;
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level.to_string()));
    init_logging_internal(format, env_filter)
}

/// Initialize logging with an explicit level and format
///
/// The level wins over `RUST_LOG`; `MEMTRACE_LOG_FILE` is still honoured.
///
/// ## Errors
///
/// Returns an error if a global subscriber is already installed or the log
/// file cannot be created.
pub fn init_logging_with_level(level: LogLevel, format: LogFormat) -> Result<LoggingGuard, LoggingError>
{
    init_logging_internal(format, EnvFilter::new(level.to_string()))
}

/// Read `MEMTRACE_LOG_FORMAT`, defaulting to pretty output
///
/// ## Errors
///
/// Returns [`LoggingError::InvalidFormat`] when the variable is set to an
/// unknown format.
pub fn format_from_env() -> Result<LogFormat, LoggingError>
{
    match env::var(LOG_FORMAT_ENV) {
        Ok(value) => LogFormat::from_str(&value).map_err(LoggingError::InvalidFormat),
        Err(_) => Ok(LogFormat::default()),
    }
}

fn init_logging_internal(format: LogFormat, env_filter: EnvFilter) -> Result<LoggingGuard, LoggingError>
{
    let mut layers: Vec<BoxedLayer> = vec![console_layer(format, env_filter.clone())];
    let mut guard = LoggingGuard::default();

    if let Some(file_path) = env::var(LOG_FILE_ENV).ok().map(PathBuf::from) {
        let appender = file_appender(&file_path)?;
        let (non_blocking, worker_guard) = tracing_appender::non_blocking(appender);
        guard._file_writer = Some(worker_guard);

        let layer = fmt::layer()
            .with_writer(non_blocking)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_ansi(false); // No ANSI in files
        let layer: BoxedLayer = match format {
            LogFormat::Pretty => layer.with_filter(env_filter).boxed(),
            LogFormat::Json => layer
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_filter(env_filter)
                .boxed(),
        };
        layers.push(layer);
    }

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|e| LoggingError::InitializationFailed(e.to_string()))?;

    Ok(guard)
}

fn console_layer(format: LogFormat, env_filter: EnvFilter) -> BoxedLayer
{
    let layer = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_timer(ChronoUtc::rfc_3339())
        .with_writer(io::stderr);

    match format {
        LogFormat::Pretty => layer
            .with_ansi(io::stderr().is_terminal())
            .with_filter(env_filter)
            .boxed(),
        LogFormat::Json => layer
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_filter(env_filter)
            .boxed(),
    }
}

fn file_appender(file_path: &Path) -> Result<RollingFileAppender, LoggingError>
{
    let directory = file_path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let file_name = file_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "memtrace.log".to_string());

    Ok(RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(file_name)
        .build(directory)?)
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError
{
    /// Invalid log format
    #[error("Invalid log format: {0}")]
    InvalidFormat(String),

    /// Failed to install the global subscriber
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),

    /// File logging error
    #[error("File logging error: {0}")]
    FileError(#[from] InitError),
}
