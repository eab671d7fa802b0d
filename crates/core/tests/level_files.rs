use std::fs;
use std::path::{Path, PathBuf};

use trapwalk_core::{
    Action, GameState, SearchLimits, SearchStopReason, Solver, TrapKind, load_level_from_file,
};

fn level_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../levels").join(name)
}

fn load(name: &str) -> GameState {
    load_level_from_file(&level_path(name)).expect("bundled level should load")
}

fn replay(start: &GameState, plan: &[Action]) -> GameState {
    let mut state = start.clone();
    for &action in plan {
        assert!(state.apply_action(action), "{action} should take effect during replay");
        state.check_invariants().expect("replayed state should stay consistent");
    }
    state
}

#[test]
fn corridor_is_solved_through_the_lever() {
    let start = load("corridor.json");
    let outcome = Solver::default().search(&start);

    assert_eq!(outcome.stop_reason, SearchStopReason::GoalReached);
    assert_eq!(
        outcome.plan,
        vec![Action::UseLever, Action::MoveDown, Action::MoveDown, Action::MoveDown]
    );
    assert_eq!(outcome.expanded, 5);
    assert!(replay(&start, &outcome.plan).is_solved());
}

#[test]
fn gauntlet_plan_spears_the_snake_and_crosses_the_crack() {
    let start = load("gauntlet.json");
    let kinds: Vec<TrapKind> = start.traps.values().map(|trap| trap.strategy.kind()).collect();
    assert_eq!(kinds, vec![TrapKind::Snake, TrapKind::Saw, TrapKind::Lizard]);

    let outcome = Solver::default().search(&start);
    assert_eq!(
        outcome.plan,
        vec![
            Action::MoveRight,
            Action::UseItem,
            Action::MoveRight,
            Action::MoveRight,
            Action::MoveRight,
        ]
    );

    let end = replay(&start, &outcome.plan);
    assert!(end.is_solved());
    assert_eq!(end.traps.len(), 2, "only the snake was speared");
    assert!(end.items.is_empty());
}

#[test]
fn expansion_budget_cuts_the_gauntlet_short() {
    let start = load("gauntlet.json");
    let mut solver = Solver::new(SearchLimits { max_expanded: Some(1), time_limit_ms: None });
    let outcome = solver.search(&start);

    assert_eq!(outcome.stop_reason, SearchStopReason::ExpansionBudget);
    assert!(outcome.plan.is_empty());
    assert_eq!(outcome.expanded, 1);
}

#[test]
fn copied_level_loads_from_a_temporary_directory() {
    let dir = tempfile::tempdir().expect("temp dir");
    let copy = dir.path().join("copy.json");
    fs::copy(level_path("gauntlet.json"), &copy).expect("copy level");

    let original = load("gauntlet.json");
    let loaded = load_level_from_file(&copy).expect("copied level should load");
    assert_eq!(loaded, original);
    assert_eq!(loaded.fingerprint(), original.fingerprint());
}
