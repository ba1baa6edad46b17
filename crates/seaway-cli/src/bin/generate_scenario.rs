//! Write a synthetic weather scenario for seaway-route.
//!
//! Usage:
//!   cargo run -p seaway-cli --bin generate-scenario -- --out scenario.json --seed 7

use clap::Parser;
use seaway_cli::{generate, logging, SynthOptions};
use std::path::PathBuf;

/// Generate a synthetic scenario with a drifting storm and an island
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Output file
    #[arg(long, default_value = "scenario.json")]
    out: PathBuf,

    /// Wave grid longitude count
    #[arg(long, default_value_t = 40)]
    nlon: usize,

    /// Wave grid latitude count
    #[arg(long, default_value_t = 30)]
    nlat: usize,

    /// Number of 6-hourly weather slices
    #[arg(long, default_value_t = 3)]
    slices: usize,

    /// Random seed (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init(args.json_logs)?;

    let options = SynthOptions {
        nlon: args.nlon,
        nlat: args.nlat,
        slices: args.slices,
        seed: args.seed,
        ..SynthOptions::default()
    };
    let (scenario, seed) = generate(&options)?;
    scenario.save(&args.out)?;

    tracing::info!(path = %args.out.display(), seed, "wrote scenario");
    Ok(())
}
