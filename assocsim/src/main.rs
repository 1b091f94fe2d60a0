mod log;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::time::Instant;
use clap::{ArgAction, Parser};
use tracing::info;
use assoccache::config::{ParseMode, ReplacementPolicyConfig, SimulatorConfig};
use assoccache::io::get_reader;
use assoccache::simulator::Simulator;

#[cfg(debug_assertions)]
const DEBUG_DEFAULT: bool = true;

#[cfg(not(debug_assertions))]
const DEBUG_DEFAULT: bool = false;

#[derive(Parser, Debug)]
#[command(about = String::from("Set-associative cache simulator"))]
struct Args {
    /// The instruction script to run
    script: String,

    /// A JSON simulator configuration
    #[arg(short, long)]
    config: Option<String>,

    /// Seed for the memory contents, overrides the configuration
    #[arg(short, long)]
    seed: Option<u64>,

    /// Replacement policy, overrides the configuration
    #[arg(long, value_parser = ["age", "fifo"])]
    policy: Option<String>,

    /// Stop at the first unrecognised line or rejected access
    #[arg(long)]
    strict: bool,

    /// Print the final counters as JSON
    #[arg(short, long)]
    json: bool,

    #[arg(short, long)]
    performance: bool,

    /// Print the configuration and cache occupancy after the run, `-d false` turns it off
    #[arg(short, long, default_value_t = DEBUG_DEFAULT, action = ArgAction::Set)]
    debug: bool,
}

fn main() -> Result<(), String> {
    let start = Instant::now();
    let args = Args::parse();
    log::init();
    let mut config = match &args.config {
        Some(path) => SimulatorConfig::from_path(path).map_err(|e| e.to_string())?,
        None => SimulatorConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    match args.policy.as_deref() {
        Some("age") => config.replacement_policy = ReplacementPolicyConfig::AgeCounter,
        Some("fifo") => config.replacement_policy = ReplacementPolicyConfig::InstallOrder,
        _ => {}
    }
    if args.strict {
        config.parse_mode = ParseMode::Strict;
    }
    info!(?config, "Starting simulation");
    let mut simulator = Simulator::new(&config);
    let script_file = File::open(&args.script).map_err(|e| format!("Couldn't open the script file at path {}: {e}", args.script))?;
    let script_reader = get_reader(script_file)?;
    let mut out = BufWriter::new(io::stdout().lock());
    let result = simulator.simulate(script_reader, &mut out).map_err(|e| format!("Simulation failed: {e}"))?;
    if args.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&result).map_err(|e| format!("Couldn't serialise the output {e}"))?)
            .map_err(|e| format!("Couldn't write the output {e}"))?;
    }
    out.flush().map_err(|e| format!("Couldn't write the output {e}"))?;
    drop(out);
    if args.performance {
        let end = Instant::now();
        let simulation_time = simulator.get_execution_time();
        let total_time = end - start;
        println!("Simulation time: {}s", simulation_time.as_nanos() as f64 / 1e9);
        println!("Total execution time (includes initial parsing, configuration, and output): {}s", total_time.as_nanos() as f64 / 1e9)
    }
    if args.debug {
        #[cfg(debug_assertions)]
        println!("Running the debug binary, debug mode is enabled by default. If benchmarking, do not use this binary, re-compile with the --release argument when using cargo run");
        println!("Parsed input configuration: {config:?}");
        println!("Final counters: {} hits, {} misses", result.hits, result.misses);
        println!("Uninitialised cache lines: {}", simulator.get_uninitialised_line_count());
    }
    Ok(())
}
