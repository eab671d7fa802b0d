//! Best-first planning over whole game states.
//! This module exists to turn the transition model into an optimal action plan under budgets.
//! It does not own the rules themselves; every successor comes from `GameState::apply_action`.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::config::SearchLimits;
use crate::state::GameState;
use crate::types::*;

/// Creation-order identity of a state inside one solver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OpenNode {
    f: u32,
    h: u32,
    id: StateId,
}

#[derive(Clone, Debug)]
struct SearchNode {
    state: GameState,
    plan: Vec<Action>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStopReason {
    GoalReached,
    Exhausted,
    ExpansionBudget,
    TimeBudget,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchOutcome {
    /// Actions from the start state to the goal; empty unless the goal was reached.
    pub plan: Vec<Action>,
    /// States taken off the open set and closed, the goal state included.
    pub expanded: usize,
    pub stop_reason: SearchStopReason,
}

impl SearchOutcome {
    pub fn is_solved(&self) -> bool {
        self.stop_reason == SearchStopReason::GoalReached
    }
}

/// Previously expanded states, bucketed by fingerprint and confirmed by full equality.
#[derive(Debug, Default)]
struct ClosedSet {
    buckets: BTreeMap<u64, Vec<GameState>>,
}

impl ClosedSet {
    fn contains(&self, state: &GameState) -> bool {
        self.buckets
            .get(&state.fingerprint())
            .is_some_and(|bucket| bucket.iter().any(|closed| closed == state))
    }

    fn insert(&mut self, state: GameState) {
        self.buckets.entry(state.fingerprint()).or_default().push(state);
    }
}

/// Manhattan distance from the agent to the goal over all three axes.
pub fn heuristic(state: &GameState) -> u32 {
    state.agent_coord().manhattan(state.goal_coord())
}

/// Coordinates no move should target: guarded tiles and cracked tiles with nowhere to drop.
pub fn forbidden_coords(state: &GameState) -> BTreeSet<Coord> {
    state
        .tiles
        .values()
        .filter(|tile| tile.is_guarded || tile.is_spent_crack())
        .map(|tile| tile.coord)
        .collect()
}

fn is_forbidden(
    state: &GameState,
    forbidden: &BTreeSet<Coord>,
    last: Option<Action>,
    action: Action,
) -> bool {
    match action.direction() {
        Some(direction) => state
            .neighbor(state.agent.tile, direction)
            .is_some_and(|next| forbidden.contains(&state.tiles[next].coord)),
        None => action == Action::UseLever && last == Some(Action::UseLever),
    }
}

/// Every non-forbidden action that changes `state`, paired with the state it leads to.
pub fn successors(state: &GameState, plan: &[Action]) -> Vec<(Action, GameState)> {
    let forbidden = forbidden_coords(state);
    let last = plan.last().copied();
    let mut result = Vec::with_capacity(Action::ALL.len());
    for action in Action::ALL {
        if is_forbidden(state, &forbidden, last, action) {
            continue;
        }
        let mut next = state.clone();
        if next.apply_action(action) {
            result.push((action, next));
        }
    }
    result
}

#[derive(Debug, Default)]
pub struct Solver {
    limits: SearchLimits,
    next_state_id: u64,
}

impl Solver {
    pub fn new(limits: SearchLimits) -> Self {
        Self { limits, next_state_id: 0 }
    }

    fn next_id(&mut self) -> StateId {
        let id = StateId(self.next_state_id);
        self.next_state_id += 1;
        id
    }

    pub fn search(&mut self, start: &GameState) -> SearchOutcome {
        let started = Instant::now();
        let time_limit = self.limits.time_limit();
        let mut open = BTreeSet::new();
        let mut frontier = BTreeMap::new();
        let mut closed = ClosedSet::default();
        let mut expanded = 0;

        let id = self.next_id();
        let h = heuristic(start);
        open.insert(OpenNode { f: h, h, id });
        frontier.insert(id, SearchNode { state: start.clone(), plan: Vec::new() });

        let stop_reason = loop {
            if self.limits.max_expanded.is_some_and(|max| expanded >= max) {
                break SearchStopReason::ExpansionBudget;
            }
            if time_limit.is_some_and(|limit| started.elapsed() >= limit) {
                break SearchStopReason::TimeBudget;
            }
            let Some(node) = open.pop_first() else {
                break SearchStopReason::Exhausted;
            };
            let Some(SearchNode { state, plan }) = frontier.remove(&node.id) else {
                continue;
            };
            if closed.contains(&state) {
                continue;
            }
            expanded += 1;
            debug_assert_eq!(state.check_invariants(), Ok(()), "corrupted state {:?}", node.id);

            if state.is_solved() {
                log::info!(
                    "goal reached after {expanded} expansions with a {}-action plan",
                    plan.len()
                );
                return SearchOutcome {
                    plan,
                    expanded,
                    stop_reason: SearchStopReason::GoalReached,
                };
            }

            let next_states = successors(&state, &plan);
            log::debug!(
                "expand {:?}: f={} h={} g={} successors={} open={}",
                node.id,
                node.f,
                node.h,
                plan.len(),
                next_states.len(),
                open.len()
            );
            closed.insert(state);

            for (action, next) in next_states {
                let id = self.next_id();
                if closed.contains(&next) {
                    log::trace!("{:?} via {action} repeats a closed state", id);
                    continue;
                }
                let h = heuristic(&next);
                let g = u32::try_from(plan.len() + 1).unwrap_or(u32::MAX);
                log::trace!("{:?} via {action}: g={g} h={h} at {}", id, next.agent_coord());
                let mut next_plan = plan.clone();
                next_plan.push(action);
                open.insert(OpenNode { f: g.saturating_add(h), h, id });
                frontier.insert(id, SearchNode { state: next, plan: next_plan });
            }
        };

        log::info!("search stopped ({stop_reason:?}) after {expanded} expansions");
        SearchOutcome { plan: Vec::new(), expanded, stop_reason }
    }
}
