//! Optimize a vessel route through a JSON scenario.
//!
//! Request fields given on the command line override the scenario's own
//! request. The result is printed as JSON on stdout; route failures print a
//! JSON error object and exit with status 2.
//!
//! Usage:
//!   cargo run -p seaway-cli --bin seaway-route -- --scenario scenario.json \
//!       --ship-type tanker --departure 2024-08-26T00:00:00Z

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Parser;
use seaway_cli::scenario::parse_departure;
use seaway_cli::{logging, Config, RequestSpec, Scenario};
use seaway_core::{RouteEngine, RouteError};
use std::path::PathBuf;
use std::process::ExitCode;

/// Find the cheapest route for a vessel through a weather scenario
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scenario JSON file
    #[arg(long)]
    scenario: PathBuf,

    /// Engine config JSON file (any subset of fields)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Vessel class: passenger, cargo or tanker
    #[arg(long)]
    ship_type: Option<String>,

    /// Start position as lon,lat
    #[arg(long, value_parser = parse_position, allow_hyphen_values = true)]
    start: Option<[f64; 2]>,

    /// End position as lon,lat
    #[arg(long, value_parser = parse_position, allow_hyphen_values = true)]
    end: Option<[f64; 2]>,

    /// Departure time (RFC 3339, or YYYY-MM-DD for midnight UTC)
    #[arg(long, value_parser = parse_departure)]
    departure: Option<DateTime<Utc>>,

    /// Vessel draft in meters
    #[arg(long)]
    draft: Option<f64>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

fn parse_position(raw: &str) -> Result<[f64; 2], String> {
    let (lon, lat) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected lon,lat but got '{raw}'"))?;
    let parse = |value: &str| {
        value
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("bad coordinate '{value}': {e}"))
    };
    Ok([parse(lon)?, parse(lat)?])
}

fn run(args: Args) -> anyhow::Result<()> {
    let engine_config = Config::from_env().engine_config(args.config.as_deref())?;
    let scenario = Scenario::load(&args.scenario)?;

    let overrides = RequestSpec {
        ship_type: args.ship_type,
        start: args.start,
        end: args.end,
        departure: args.departure,
        draft_m: args.draft,
        ship_dimensions: None,
    };
    let request = overrides.or(scenario.request.clone()).into_request()?;
    let bundle = scenario
        .to_bundle()
        .with_context(|| format!("loading datasets from {}", args.scenario.display()))?;

    tracing::info!(
        vessel = %request.vessel.class,
        start = ?request.start,
        end = ?request.end,
        departure = %request.departure,
        "optimizing route"
    );
    let result = RouteEngine::new(engine_config).optimize_route(&bundle, &request)?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(e) = logging::init(args.json_logs) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match e.downcast_ref::<RouteError>() {
            Some(route_error) => {
                tracing::error!(kind = route_error.kind(), "{e:#}");
                let body = serde_json::json!({
                    "error": route_error.kind(),
                    "message": format!("{e:#}"),
                });
                println!("{body}");
                ExitCode::from(2)
            }
            None => {
                eprintln!("Error: {e:#}");
                ExitCode::FAILURE
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_parse_with_signs_and_spaces() {
        assert_eq!(parse_position("-65.5, 10.25"), Ok([-65.5, 10.25]));
        assert!(parse_position("-65.5").is_err());
        assert!(parse_position("east,10").is_err());
    }

    #[test]
    fn negative_positions_are_accepted_as_values() {
        let args = Args::try_parse_from([
            "seaway-route",
            "--scenario",
            "s.json",
            "--start",
            "-65,10",
            "--departure",
            "2024-08-26T00:00:00Z",
        ])
        .unwrap();
        assert_eq!(args.start, Some([-65.0, 10.0]));
        assert!(args.departure.is_some());

        let date_only = Args::try_parse_from([
            "seaway-route",
            "--scenario",
            "s.json",
            "--departure",
            "2024-08-26",
        ])
        .unwrap();
        assert_eq!(date_only.departure, args.departure);
    }
}
