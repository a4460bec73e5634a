//! Signals CLI - Command-line interface for client-signals
//!
//! Commands:
//! - collect: Run the collection pipeline against a host described in JSON
//! - replay: Replay page events and devtools samples through the behavior monitor
//! - config: Print the effective configuration

use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use client_signals::behavior::{BehaviorMonitor, DevToolsHeuristic, PageEvent};
use client_signals::host::{StaticHost, WindowGeometry};
use client_signals::{collect_signals, CollectorConfig, SignalError, VERSION};

/// Signals - client-side signal collector for bot and automation detection
#[derive(Parser)]
#[command(name = "signals")]
#[command(version = VERSION)]
#[command(about = "Collect client signals and replay page behavior", long_about = None)]
struct Cli {
    /// Collector configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the collection pipeline against a host described in JSON
    Collect {
        /// Host description file (use - for stdin)
        #[arg(long)]
        host: PathBuf,
    },

    /// Replay NDJSON page events and devtools samples
    Replay {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Page start time in Unix milliseconds (defaults to now)
        #[arg(long)]
        start_time_ms: Option<i64>,
    },

    /// Print the effective configuration
    Config,
}

/// One replay line: either a devtools geometry sample or a page event
#[derive(Deserialize)]
#[serde(untagged)]
enum ReplayEntry {
    Sample { devtools_tick: WindowGeometry },
    Event(PageEvent),
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let error = CliError::from(e);
            eprintln!(
                "{}",
                serde_json::to_string(&error).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), SignalsCliError> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Collect { host } => cmd_collect(&host, &config),
        Commands::Replay {
            input,
            start_time_ms,
        } => cmd_replay(&input, start_time_ms, &config),
        Commands::Config => print_json(&config),
    }
}

fn load_config(path: Option<&Path>) -> Result<CollectorConfig, SignalsCliError> {
    match path {
        Some(path) => Ok(CollectorConfig::from_json(&fs::read_to_string(path)?)?),
        None => Ok(CollectorConfig::default()),
    }
}

fn read_input(path: &Path) -> Result<String, SignalsCliError> {
    if path.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn cmd_collect(host_path: &Path, config: &CollectorConfig) -> Result<(), SignalsCliError> {
    let host = StaticHost::from_json(&read_input(host_path)?)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;

    let snapshot = runtime
        .block_on(collect_signals(Arc::new(host), config))
        .ok_or(SignalsCliError::NoSnapshot)?;

    print_json(snapshot.as_ref())
}

fn cmd_replay(
    input: &Path,
    start_time_ms: Option<i64>,
    config: &CollectorConfig,
) -> Result<(), SignalsCliError> {
    let input_data = read_input(input)?;

    let monitor = match start_time_ms {
        Some(start) => BehaviorMonitor::new(start),
        None => BehaviorMonitor::starting_now(),
    };
    let mut devtools = DevToolsHeuristic::new(config.devtools.clone());

    for (line_num, line) in input_data.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let entry: ReplayEntry = serde_json::from_str(line).map_err(|e| {
            SignalsCliError::ParseError(format!("line {}: {}", line_num + 1, e))
        })?;

        match entry {
            ReplayEntry::Sample { devtools_tick } => {
                devtools.sample(Some(devtools_tick), &monitor);
            }
            ReplayEntry::Event(event) => monitor.dispatch(&event),
        }
    }

    print_json(&monitor.snapshot())
}

/// Pretty-print for terminals, compact JSON for pipes
fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<(), SignalsCliError> {
    let output = if atty::is(atty::Stream::Stdout) {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", output);
    Ok(())
}

// Error types

#[derive(Debug)]
enum SignalsCliError {
    Io(io::Error),
    Signal(SignalError),
    Json(serde_json::Error),
    NoSnapshot,
    ParseError(String),
}

impl From<io::Error> for SignalsCliError {
    fn from(e: io::Error) -> Self {
        SignalsCliError::Io(e)
    }
}

impl From<SignalError> for SignalsCliError {
    fn from(e: SignalError) -> Self {
        SignalsCliError::Signal(e)
    }
}

impl From<serde_json::Error> for SignalsCliError {
    fn from(e: serde_json::Error) -> Self {
        SignalsCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<SignalsCliError> for CliError {
    fn from(e: SignalsCliError) -> Self {
        match e {
            SignalsCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            SignalsCliError::Signal(e) => CliError {
                code: "CONFIG_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'signals config' to see the expected shape".to_string()),
            },
            SignalsCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            SignalsCliError::NoSnapshot => CliError {
                code: "NO_SNAPSHOT".to_string(),
                message: "Signal collection produced no snapshot".to_string(),
                hint: Some("Set RUST_LOG=debug to see which step failed".to_string()),
            },
            SignalsCliError::ParseError(msg) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: Some(
                    "Each line must be a page event or {\"devtools_tick\": {...}}".to_string(),
                ),
            },
        }
    }
}
