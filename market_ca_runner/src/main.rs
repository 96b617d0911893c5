// Market simulation runner: CLI entry point.
//
// Seeds a grid with companies and clients, then steps the market the way
// the interactive front end did: check for bankruptcy, tick, and replenish
// clients on the configured interval. After each tick the map is printed as
// ASCII (`*` company, `P` product, `$` client, `.` empty). Presentation
// lives only here; the engine reports cell tags, not symbols.
//
// Usage:
//   cargo run -p market_ca_runner -- [--rows N] [--cols N] [--seed N]
//     [--companies PCT] [--clients PCT] [--max-ticks N] [--config PATH]
//     [--no-replenish] [--quiet] [--events]
//
// Logging goes to stderr through `tracing-subscriber`; set `RUST_LOG`
// (e.g. `RUST_LOG=market_ca_sim=debug`) to see engine lifecycle events.

use market_ca_sim::config::SimConfig;
use market_ca_sim::sim::{Simulation, StepOutcome};
use market_ca_sim::types::{CellTag, Position, UnitKind};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{error, info};
use tracing_subscriber::prelude::*;

fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().collect();

    let rows: u32 = parse_flag(&args, "--rows").unwrap_or(20);
    let cols: u32 = parse_flag(&args, "--cols").unwrap_or(40);
    let company_percent: u32 = parse_flag(&args, "--companies").unwrap_or(1);
    let client_percent: u32 = parse_flag(&args, "--clients").unwrap_or(5);
    let max_ticks: u64 = parse_flag(&args, "--max-ticks").unwrap_or(200);
    let seed: u64 = parse_flag(&args, "--seed").unwrap_or_else(clock_seed);
    let config_path: Option<String> = parse_flag(&args, "--config");
    let quiet = has_flag(&args, "--quiet");
    let print_events = has_flag(&args, "--events");

    let mut config = match config_path {
        Some(path) => match SimConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                error!(%path, %err, "could not load config");
                std::process::exit(1);
            }
        },
        None => SimConfig::default(),
    };
    if has_flag(&args, "--no-replenish") {
        config.replenish_enabled = false;
    }

    info!(rows, cols, seed, company_percent, client_percent, "starting market");
    let mut sim = Simulation::with_config(rows, cols, seed, config);
    for (kind, percent) in [
        (UnitKind::Company, company_percent),
        (UnitKind::Client, client_percent),
    ] {
        if let Err(err) = sim.generate_units(kind, percent) {
            error!(%err, ?kind, "could not seed units");
            std::process::exit(1);
        }
    }

    if !quiet {
        println!("{}", render(&sim));
    }

    let mut sales = 0;
    for _ in 0..max_ticks {
        match sim.step() {
            StepOutcome::Ticked {
                report,
                replenished,
            } => {
                sales += report.sales();
                if print_events {
                    for event in &report.events {
                        match serde_json::to_string(event) {
                            Ok(line) => println!("{line}"),
                            Err(err) => error!(%err, "could not encode event"),
                        }
                    }
                }
                if !quiet {
                    println!(
                        "tick {}: {} sold, {} spawned, {} dropped, {} clients added",
                        report.tick,
                        report.sales(),
                        report.spawns(),
                        report.drops(),
                        replenished
                    );
                    println!("{}", render(&sim));
                }
            }
            StepOutcome::Finished(message) => {
                println!("{message}");
                break;
            }
        }
    }

    info!(ticks = sim.tick(), sales, units = sim.unit_count(), "market stopped");
    for (kind, code, count) in survivors(&sim) {
        info!(?kind, code, count, "survivors");
    }
}

/// Live unit count per kind, tagged with the kind's factory code.
fn survivors(sim: &Simulation) -> Vec<(UnitKind, u8, usize)> {
    UnitKind::ALL
        .into_iter()
        .map(|kind| (kind, kind.code(), sim.unit_count_of(kind)))
        .collect()
}

fn parse_flag<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

fn symbol(tag: CellTag) -> char {
    match tag {
        CellTag::Empty => '.',
        CellTag::Company => '*',
        CellTag::Product => 'P',
        CellTag::Client => '$',
    }
}

/// One line per grid row.
fn render(sim: &Simulation) -> String {
    let grid = sim.grid();
    let mut out = String::with_capacity(grid.size() + grid.rows() as usize);
    for row in 0..grid.rows() {
        for col in 0..grid.cols() {
            let tag = sim
                .cell_tag(Position::new(row, col))
                .unwrap_or(CellTag::Empty);
            out.push(symbol(tag));
        }
        out.push('\n');
    }
    out
}
