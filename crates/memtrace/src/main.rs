use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use memtrace_protocol::{BEGIN_WORKLOAD_INFO, END_WORKLOAD_INFO, READY_TO_TRACE, STOP_TRACING};
use memtrace_utils::logging::format_from_env;
use memtrace_utils::{info, init_logging, init_logging_with_level, LogLevel, LoggingError};

mod harness;

use harness::{HarnessConfig, TraceReport};

/// Native harness for memory-tracing workloads.
#[derive(Parser, Debug)]
#[command(name = "memtrace")]
#[command(version)]
#[command(about = "Run trace-target workloads natively and time their traced window", long_about = None)]
struct Cli
{
    /// Log level for harness diagnostics on stderr (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands
{
    /// Launch a workload, press enter when it is ready, and time it until it stops tracing
    Run
    {
        /// Kill the workload and fail if the run takes longer than this many seconds
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
        /// Discard the workload's stderr
        #[arg(long, default_value_t = false)]
        quiet_workload_stderr: bool,
        /// Path to the workload executable
        program: PathBuf,
        /// Arguments to pass to the workload
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Print the marker lines a workload has to emit, in order
    Markers,
}

fn main() -> ExitCode
{
    let cli = Cli::parse();

    let _guard = match init(cli.log_level) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Run {
            timeout,
            quiet_workload_stderr,
            program,
            args,
        } => {
            let mut config = HarnessConfig::new(program);
            config.args = args;
            config.timeout = timeout.map(Duration::from_secs);
            config.quiet_workload_stderr = quiet_workload_stderr;
            match run(&config) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("Error: {e}");
                    ExitCode::FAILURE
                }
            }
        }
        Commands::Markers => {
            println!("{BEGIN_WORKLOAD_INFO}");
            println!("<workload info, may be empty>");
            println!("{END_WORKLOAD_INFO}");
            println!("{READY_TO_TRACE}");
            println!("<wait for enter, then run the traced code>");
            println!("{STOP_TRACING}");
            ExitCode::SUCCESS
        }
    }
}

fn init(level: Option<LogLevel>) -> Result<memtrace_utils::logging::LoggingGuard, LoggingError>
{
    match level {
        Some(level) => init_logging_with_level(level, format_from_env()?),
        None => init_logging(LogLevel::Info),
    }
}

fn run(config: &HarnessConfig) -> Result<(), Box<dyn std::error::Error>>
{
    info!(program = %config.program.display(), args = ?config.args, "running workload natively");

    let rt = tokio::runtime::Runtime::new()?;
    let report: TraceReport = rt.block_on(harness::run_workload(config))?;
    info!(duration_ms = report.tracing_duration.as_millis(), "workload finished tracing");
    report.write_to(&mut io::stdout().lock())?;
    Ok(())
}
