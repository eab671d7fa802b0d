//! Shared fixtures for the unit test suites.
//! This module exists to avoid repeating level wiring across many tests.
//! It does not own production rules.

pub(crate) use crate::level::LevelBuilder;
use crate::state::GameState;
use crate::tile::TileKind;
use crate::trap::{Chase, Patrol, TrapStrategy};
use crate::types::*;

fn link_both(builder: &mut LevelBuilder, from: TileId, direction: Direction, to: TileId) {
    let back = match direction {
        Direction::Up => Direction::Down,
        Direction::Down => Direction::Up,
        Direction::Left => Direction::Right,
        Direction::Right => Direction::Left,
    };
    builder.link(from, direction, to);
    builder.link(to, back, from);
}

/// Eleven normal tiles labelled 0..=10, returned in label order:
///
/// ```text
///         5  6  7
///      0  1  2  3  4
///         8  9  10
/// ```
///
/// The agent starts on 0 and the goal is 10.
pub(crate) fn plus_grid() -> (LevelBuilder, Vec<TileId>) {
    let mut builder = LevelBuilder::new();
    let ids: Vec<TileId> =
        (0..=10).map(|label| builder.add_tile(label, TileKind::Normal)).collect();

    for row in [&ids[0..5], &ids[5..8], &ids[8..11]] {
        for pair in row.windows(2) {
            link_both(&mut builder, pair[0], Direction::Right, pair[1]);
        }
    }
    for column in 0..3 {
        link_both(&mut builder, ids[1 + column], Direction::Up, ids[5 + column]);
        link_both(&mut builder, ids[1 + column], Direction::Down, ids[8 + column]);
    }
    builder.place_agent(ids[0]);
    builder.mark_goal(ids[10]);
    (builder, ids)
}

/// Vertical corridor 1..=6 walking down: 1 is the start, 2 an inactive moving tile,
/// 3 a cracked tile without drop, 4 the goal. With `with_lever`, tile 1 holds a lever
/// that toggles tile 2.
pub(crate) fn corridor(with_lever: bool) -> GameState {
    let mut builder = LevelBuilder::new();
    let kinds = [
        TileKind::Normal,
        TileKind::Moving { active: false },
        TileKind::cracked(None),
        TileKind::Normal,
        TileKind::Normal,
        TileKind::Normal,
    ];
    let ids: Vec<TileId> =
        (1..).zip(kinds).map(|(label, kind)| builder.add_tile(label, kind)).collect();
    for pair in ids.windows(2) {
        link_both(&mut builder, pair[0], Direction::Down, pair[1]);
    }
    if with_lever {
        builder.add_lever(&[ids[0]], &[ids[1]]);
    }
    builder.place_agent(ids[0]);
    builder.mark_goal(ids[3]);
    builder.finish().expect("corridor is a valid level")
}

pub(crate) fn patrol_saw(sequence: &[Direction]) -> TrapStrategy {
    TrapStrategy::Saw(Patrol::new(sequence.to_vec()))
}

pub(crate) fn patrol_spider(sequence: &[Direction]) -> TrapStrategy {
    TrapStrategy::Spider(Patrol::new(sequence.to_vec()))
}

pub(crate) fn chase(trigger: TileId) -> TrapStrategy {
    TrapStrategy::Lizard(Chase::new(trigger))
}

pub(crate) fn chase_state(trigger: TileId, active: bool, target: Option<TileId>) -> TrapStrategy {
    TrapStrategy::Lizard(Chase { trigger, active, target })
}

/// Applies `actions` in order, requiring each one to take effect.
pub(crate) fn play(state: &mut GameState, actions: &[Action]) {
    for &action in actions {
        assert!(state.apply_action(action), "{action} had no effect");
    }
}
