//! netsim CLI
//!
//! Load a scenario file, run it, and print the arrival log.
//!
//! # Example
//!
//! ```bash
//! # Run a YAML scenario for its own duration, text output
//! netsim demos/triangle.yaml
//!
//! # Override the duration and print JSON
//! netsim demos/triangle.yaml -d 10 --format json
//!
//! # Run twice and compare log hashes
//! netsim demos/triangle.yaml --verify
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use netsim::{NetSimError, NetSimResult, Scenario, SimulationLog};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// One line per arrival
    Text,
    /// Pretty-printed JSON array
    Json,
}

/// Packet-network simulator
///
/// Runs a scenario (YAML, or JSON for `.json` files) and prints every
/// packet arrival in order. Runs are deterministic.
#[derive(Parser, Debug)]
#[command(name = "netsim")]
#[command(version, about, long_about = None)]
struct Args {
    /// Scenario file
    scenario: PathBuf,

    /// Simulation duration, overriding the scenario's own
    #[arg(short = 'd', long)]
    duration: Option<f64>,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Run the scenario twice and check that both logs are identical
    #[arg(long)]
    verify: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,netsim=info")),
        )
        .init();

    let args = Args::parse();

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            error!(error = %e, "simulation failed");
            ExitCode::FAILURE
        }
    }
}

/// Returns `false` if `--verify` found diverging runs.
fn run(args: &Args) -> NetSimResult<bool> {
    let mut scenario = Scenario::from_path(&args.scenario)?;
    if let Some(duration) = args.duration {
        scenario.duration = duration;
    }

    info!(
        path = %args.scenario.display(),
        nodes = scenario.nodes.len(),
        links = scenario.links.len(),
        packets = scenario.packets.len(),
        duration = scenario.duration,
        protocol = %scenario.config.protocol,
        "Starting simulation"
    );

    let (sim, log) = scenario.run()?;
    print_log(&log, args.format)?;

    info!(
        entries = log.len(),
        delivered = sim.delivered_packets().len(),
        pending = sim.pending_events(),
        clock = sim.current_time().as_secs(),
        "Simulation finished"
    );

    if !args.verify {
        return Ok(true);
    }

    let (_, replay) = scenario.run()?;
    let (first, second) = (log.log_hash(), replay.log_hash());
    eprintln!("run 1 log hash: {first:016x}");
    eprintln!("run 2 log hash: {second:016x}");
    if netsim::logs_match(&log, &replay) {
        eprintln!("logs are identical");
        Ok(true)
    } else {
        eprintln!("logs differ");
        Ok(false)
    }
}

fn print_log(log: &SimulationLog, format: OutputFormat) -> NetSimResult<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Text => log.export(&mut out)?,
        OutputFormat::Json => {
            let json = log
                .to_json()
                .map_err(|e| NetSimError::Serialization(e.to_string()))?;
            writeln!(out, "{json}")?;
        }
    }
    Ok(())
}
