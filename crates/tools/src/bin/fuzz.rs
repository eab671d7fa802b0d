use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use trapwalk_core::{Action, load_level_from_file};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the level JSON file to walk
    level: PathBuf,
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(long, default_value_t = 10_000)]
    steps: u32,
}

fn choose<T: Copy>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    let p = rng.next_u64() as usize % slice.len();
    slice[p]
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let start = load_level_from_file(&args.level)
        .with_context(|| format!("Failed to load level: {}", args.level.display()))?;
    start.check_invariants().context("Level violates invariants before any action")?;

    println!("Starting fuzz harness on seed {} for {} steps...", args.seed, args.steps);
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut state = start.clone();
    let (mut effective, mut wins, mut losses) = (0u32, 0u32, 0u32);

    for step in 0..args.steps {
        let action = choose(&mut rng, &Action::ALL);
        if state.apply_action(action) {
            effective += 1;
        }
        if let Err(violation) = state.check_invariants() {
            bail!("Invariant failed at step {step} after {action}: {violation}");
        }

        if state.is_solved() {
            wins += 1;
            log::debug!("goal reached at step {step}, restarting");
            state = start.clone();
        } else if state.is_lost() {
            losses += 1;
            log::debug!("agent lost at {} on step {step}, restarting", state.agent_coord());
            state = start.clone();
        }
    }

    println!("Done: {effective} effective actions, {wins} goals reached, {losses} agents lost.");
    Ok(())
}
