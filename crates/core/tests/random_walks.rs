use std::path::Path;

use proptest::{
    arbitrary::any,
    test_runner::{Config as ProptestConfig, TestCaseError, TestRunner},
};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use trapwalk_core::{Action, GameState, load_level_from_file};

fn choose<T: Copy>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    let p = rng.next_u64() as usize % slice.len();
    slice[p]
}

fn gauntlet() -> GameState {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../levels/gauntlet.json");
    load_level_from_file(&path).expect("gauntlet should load")
}

fn run_random_walk(start: &GameState, seed: u64, steps: u32) -> Result<(), String> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut state = start.clone();

    for step in 0..steps {
        let action = choose(&mut rng, &Action::ALL);
        let before = state.clone();
        let changed = state.apply_action(action);

        if let Err(violation) = state.check_invariants() {
            return Err(format!("seed {seed} step {step} after {action}: {violation}"));
        }
        if !changed && state != before {
            return Err(format!(
                "seed {seed} step {step}: {action} reported no effect but changed the state"
            ));
        }
        if state == before && state.fingerprint() != before.fingerprint() {
            return Err(format!(
                "seed {seed} step {step}: equal states with different fingerprints"
            ));
        }
        if state.agent_coord().z > 0 {
            return Err(format!("seed {seed} step {step}: agent rose above the start level"));
        }
        if state.is_lost() || state.is_solved() {
            state = start.clone();
        }
    }
    Ok(())
}

#[test]
fn random_walks_preserve_invariants() {
    let start = gauntlet();
    let mut runner = TestRunner::new(ProptestConfig::with_cases(64));

    runner
        .run(&any::<u64>(), |seed| {
            run_random_walk(&start, seed, 300).map_err(TestCaseError::fail)?;
            Ok(())
        })
        .expect("random walks should preserve invariants");
}

#[test]
fn lost_agents_never_act_again() {
    let start = gauntlet();
    let mut state = start.clone();
    assert!(state.apply_action(Action::MoveRight));
    assert!(state.apply_action(Action::MoveRight), "walking into the snake's guard is an ambush");
    assert!(state.is_lost());

    let frozen = state.clone();
    for action in Action::ALL {
        assert!(!state.apply_action(action));
    }
    assert_eq!(state, frozen);
}
