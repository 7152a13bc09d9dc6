//! Trace-driven CLI for the hard-to-predict branch analysis core.
//!
//! This binary replays a JSON trace of retired operations through an
//! [`H2pCore`], driving the Backward-Walk Engine and periodic maintenance on
//! the same cadence a real pipeline would, then reports which branches were
//! classified hard-to-predict and what got cached for them.

use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use serde::Deserialize;

use h2p_core::{Config, H2pCore, Op};

#[derive(Parser, Debug)]
#[command(
    name = "h2p-sim",
    author,
    version,
    about = "Replay a retired-op trace through the H2P branch analysis core",
    long_about = "Reads a JSON trace of retired operations, replays it through the core \
one op at a time, and reports which branches were classified hard-to-predict \
and what dependency/block chains were cached for them.\n\n\
Example:\n  h2p-sim run trace.json\n  h2p-sim run trace.json --config config.json"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Replay a trace and report the resulting H2P classifications and caches.
    Run {
        /// Path to a JSON trace file (see [`Trace`]).
        trace: PathBuf,

        /// Path to a JSON core configuration file. Defaults are used if omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Core id the trace is replayed against.
        #[arg(long, default_value_t = 0)]
        core: usize,

        /// Cycles between periodic maintenance sweeps. `0` disables maintenance.
        #[arg(long, default_value_t = 0)]
        maintenance_period: u64,
    },
}

/// One retired-op entry in a JSON trace: the op itself plus the cycle at
/// which it retired, matching what a real pipeline's retirement stage would
/// hand this core alongside the op.
#[derive(Debug, Deserialize)]
struct TraceEntry {
    op: Op,
    #[serde(default)]
    retire_cycle: u64,
}

/// A replayable trace: one entry per retired op, oldest first.
#[derive(Debug, Deserialize)]
struct Trace {
    ops: Vec<TraceEntry>,
}

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            trace,
            config,
            core,
            maintenance_period,
        } => cmd_run(&trace, config.as_deref(), core, maintenance_period),
    }
}

fn cmd_run(
    trace_path: &std::path::Path,
    config_path: Option<&std::path::Path>,
    core_id: usize,
    maintenance_period: u64,
) {
    let config = load_config(config_path);
    let trace = load_trace(trace_path);

    let mut engine = H2pCore::new(config).unwrap_or_else(|e| {
        eprintln!("invalid configuration: {e}");
        process::exit(1);
    });

    if core_id >= engine.num_cores() {
        eprintln!(
            "core {core_id} is out of range (configured cores: {})",
            engine.num_cores()
        );
        process::exit(1);
    }

    println!(
        "Replaying {} ops on core {core_id} ({} cores configured)",
        trace.ops.len(),
        engine.num_cores()
    );

    let mut cycle = 0u64;
    for entry in trace.ops {
        let pc = entry.op.pc;
        if let Err(e) = engine.retire(core_id, entry.op, entry.retire_cycle) {
            eprintln!("retire failed at pc {pc:#x}: {e}");
            process::exit(1);
        }
        if let Err(e) = engine.cycle_bwe(core_id) {
            unreachable!("core id {core_id} was validated before the replay loop: {e}");
        }

        cycle += 1;
        if maintenance_period != 0 && cycle % maintenance_period == 0 {
            if let Err(e) = engine.periodically_reset_caches(core_id) {
                unreachable!("core id {core_id} was validated before the replay loop: {e}");
            }
        }
    }

    report(&engine, core_id);
}

fn load_config(path: Option<&std::path::Path>) -> Config {
    match path {
        None => Config::default(),
        Some(path) => {
            let raw = fs::read_to_string(path).unwrap_or_else(|e| {
                eprintln!("error reading config {}: {e}", path.display());
                process::exit(1);
            });
            serde_json::from_str(&raw).unwrap_or_else(|e| {
                eprintln!("error parsing config {}: {e}", path.display());
                process::exit(1);
            })
        }
    }
}

fn load_trace(path: &std::path::Path) -> Trace {
    let raw = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("error reading trace {}: {e}", path.display());
        process::exit(1);
    });
    serde_json::from_str(&raw).unwrap_or_else(|e| {
        eprintln!("error parsing trace {}: {e}", path.display());
        process::exit(1);
    })
}

fn report(engine: &H2pCore, core_id: usize) {
    let Ok(stats) = engine.stats(core_id) else {
        unreachable!("core id {core_id} was validated before the replay loop");
    };

    println!();
    println!("--- retirement stats ---");
    println!("ops retired:           {}", stats.ops_retired);
    println!("branches retired:      {}", stats.branches_retired);
    println!("H2P retirements:       {}", stats.h2p_retirements);
    println!("walks armed/completed: {}/{}", stats.walks_armed, stats.walks_completed);
    println!("DCC writes:            {}", stats.dcc_writes);
    println!("BCC merges:            {}", stats.bcc_merges);
    println!("EBTS empty blocks:     {}", stats.ebts_empty_blocks);
    println!("OOPR records:          {}", stats.oopr_records);
    println!("RRB pushes dropped:    {}", stats.rrb_pushes_dropped);
    println!("maintenance sweeps:    {}", stats.maintenance_sweeps);
}
