use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use sha2::{Digest, Sha256};
use trapwalk_core::{Action, SearchStopReason, Solver, parse_level};

mod config_file;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the level JSON file to solve
    level: PathBuf,
    /// Optional TOML file with a `[search]` table of budgets
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Stop after expanding this many states
    #[arg(long)]
    max_expanded: Option<usize>,
    /// Stop after this many milliseconds of wall-clock time
    #[arg(long)]
    time_limit_ms: Option<u64>,
    /// Print a machine-readable JSON report instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct SolveReport {
    level: String,
    level_sha256: String,
    solved: bool,
    stop_reason: SearchStopReason,
    plan: Vec<Action>,
    expanded: usize,
    elapsed_ms: u128,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = config_file::load_solver_config(args.config.as_deref())?;
    let limits =
        config_file::apply_overrides(config.search, args.max_expanded, args.time_limit_ms);

    let text = fs::read_to_string(&args.level)
        .with_context(|| format!("Failed to read level file: {}", args.level.display()))?;
    let start = parse_level(&text)
        .with_context(|| format!("Failed to load level: {}", args.level.display()))?;
    let digest = Sha256::digest(text.as_bytes());
    log::info!(
        "loaded {} with {} tiles and {} traps",
        args.level.display(),
        start.tiles.len(),
        start.traps.len()
    );

    let started = Instant::now();
    let outcome = Solver::new(limits).search(&start);
    let report = SolveReport {
        level: args.level.display().to_string(),
        level_sha256: format!("{digest:064x}"),
        solved: outcome.is_solved(),
        stop_reason: outcome.stop_reason,
        plan: outcome.plan,
        expanded: outcome.expanded,
        elapsed_ms: started.elapsed().as_millis(),
    };

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{json}");
        return Ok(());
    }

    if report.solved {
        let steps: Vec<&str> = report.plan.iter().map(|action| action.label()).collect();
        println!("Plan ({} actions): {}", steps.len(), steps.join(", "));
    } else {
        println!("No plan found.");
    }
    println!("Stop reason: {:?}", report.stop_reason);
    println!("Expanded states: {}", report.expanded);
    println!("Elapsed: {} ms", report.elapsed_ms);
    Ok(())
}
