//! Hostile traps: their strategies, the per-tick reaction skeleton, and trap death.
//! This module exists to keep every trap movement and attack rule behind one `tick` dispatch.
//! It does not own agent entry rules or the order in which the agent acts.

use crate::state::GameState;
use crate::tile::CrackOutcome;
use crate::types::*;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Trap {
    pub tile: TileId,
    pub guarded: TileId,
    pub attack_able: bool,
    pub strategy: TrapStrategy,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TrapStrategy {
    Snake,
    Saw(Patrol),
    Spider(Patrol),
    Lizard(Chase),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TrapKind {
    Snake,
    Saw,
    Spider,
    Lizard,
}

/// Cyclic patrol: the direction at `index` picks the next guarded tile after each step.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Patrol {
    pub sequence: Vec<Direction>,
    pub index: usize,
}

/// Triggered pursuit one step behind the agent's last distinct tile.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Chase {
    pub trigger: TileId,
    pub active: bool,
    pub target: Option<TileId>,
}

impl Patrol {
    pub fn new(sequence: Vec<Direction>) -> Self {
        Self { sequence, index: 0 }
    }

    fn current(&self) -> Option<Direction> {
        self.sequence.get(self.index).copied()
    }

    fn advance(&mut self) {
        if !self.sequence.is_empty() {
            self.index = (self.index + 1) % self.sequence.len();
        }
    }
}

impl Chase {
    pub fn new(trigger: TileId) -> Self {
        Self { trigger, active: false, target: None }
    }
}

impl TrapStrategy {
    pub fn kind(&self) -> TrapKind {
        match self {
            TrapStrategy::Snake => TrapKind::Snake,
            TrapStrategy::Saw(_) => TrapKind::Saw,
            TrapStrategy::Spider(_) => TrapKind::Spider,
            TrapStrategy::Lizard(_) => TrapKind::Lizard,
        }
    }

    fn patrol_mut(&mut self) -> Option<&mut Patrol> {
        match self {
            TrapStrategy::Saw(patrol) | TrapStrategy::Spider(patrol) => Some(patrol),
            TrapStrategy::Snake | TrapStrategy::Lizard(_) => None,
        }
    }
}

impl GameState {
    /// Kills `id` if it is attack-able. Unkillable traps are left untouched.
    pub fn kill_trap(&mut self, id: TrapId) -> bool {
        if !self.traps.get(id).is_some_and(|trap| trap.attack_able) {
            return false;
        }
        self.remove_trap(id);
        true
    }

    /// Detaches `id` from its tile and guard claim, regardless of `attack_able`.
    fn remove_trap(&mut self, id: TrapId) {
        let Some(trap) = self.traps.remove(id) else {
            return;
        };
        if self.tiles[trap.tile].trap == Some(id) {
            self.tiles[trap.tile].trap = None;
        }
        self.refresh_guard(trap.guarded);
        log::trace!("trap {:?} removed from {}", trap.strategy.kind(), self.tiles[trap.tile].coord);
    }

    /// The world's reaction to an agent move: every live trap acts once, in arena order.
    pub(crate) fn tick_traps(&mut self) {
        let order: Vec<TrapId> = self.traps.keys().collect();
        for id in order {
            if self.traps.contains_key(id) {
                self.tick_trap(id);
            }
        }
    }

    fn tick_trap(&mut self, id: TrapId) {
        match self.traps[id].strategy.kind() {
            TrapKind::Snake => {
                if self.agent.tile == self.traps[id].guarded {
                    self.lose_agent();
                }
            }
            TrapKind::Saw => {
                self.patrol_step(id);
                self.strike(id);
            }
            TrapKind::Spider | TrapKind::Lizard => {
                let moved = match self.traps[id].strategy.kind() {
                    TrapKind::Spider => self.patrol_step(id),
                    _ => self.chase_step(id),
                };
                if moved && !self.land(id) {
                    return;
                }
                self.strike(id);
            }
        }
    }

    /// Resolves a crawler arriving on a new tile. The agent standing there dies before the
    /// tile's crack is applied, so a collapse never leaves it on a destroyed tile. Returns
    /// whether the trap is still in play.
    fn land(&mut self, id: TrapId) -> bool {
        if self.agent.tile == self.traps[id].tile {
            self.lose_agent();
        }
        self.settle(id)
    }

    /// Whether `id` can leave its tile and stand on `to` this tick.
    fn can_step(&self, id: TrapId, to: TileId) -> bool {
        let trap = &self.traps[id];
        let from = &self.tiles[trap.tile];
        let dest = &self.tiles[to];
        from.can_be_entered() && dest.accepts_trap() && dest.trap.is_none_or(|other| other == id)
    }

    fn relocate(&mut self, id: TrapId, to: TileId, guarded: TileId) {
        let trap = &mut self.traps[id];
        let (old_tile, old_guard) = (trap.tile, trap.guarded);
        trap.tile = to;
        trap.guarded = guarded;

        self.tiles[old_tile].trap = None;
        self.tiles[to].trap = Some(id);
        self.refresh_guard(old_guard);
        self.tiles[guarded].is_guarded = true;
    }

    /// One cyclic patrol step onto the guarded tile. Returns whether the trap moved.
    fn patrol_step(&mut self, id: TrapId) -> bool {
        let trap = &self.traps[id];
        let to = trap.guarded;
        let direction = match &trap.strategy {
            TrapStrategy::Saw(patrol) | TrapStrategy::Spider(patrol) => patrol.current(),
            TrapStrategy::Snake | TrapStrategy::Lizard(_) => None,
        };
        let Some(direction) = direction else {
            return false;
        };
        let Some(next_guard) = self.neighbor(to, direction) else {
            return false;
        };
        if !self.can_step(id, to) {
            return false;
        }

        self.relocate(id, to, next_guard);
        if let Some(patrol) = self.traps[id].strategy.patrol_mut() {
            patrol.advance();
        }
        true
    }

    /// Lizard pursuit. Returns whether the trap moved.
    fn chase_step(&mut self, id: TrapId) -> bool {
        let agent_tile = self.agent.tile;
        let agent_lost = self.is_lost();
        let trap = &mut self.traps[id];
        let to = trap.guarded;
        let TrapStrategy::Lizard(chase) = &mut trap.strategy else {
            return false;
        };

        if !chase.active {
            if agent_tile == chase.trigger {
                chase.active = true;
                chase.target = Some(agent_tile);
            }
            return false;
        }
        let Some(target) = chase.target else {
            return false;
        };
        if agent_lost || target == agent_tile || !self.can_step(id, to) {
            return false;
        }

        self.relocate(id, to, target);
        if let TrapStrategy::Lizard(chase) = &mut self.traps[id].strategy {
            chase.target = Some(agent_tile);
        }
        true
    }

    /// Applies the two-hit rule to the tile a trap just stepped onto. Returns whether the
    /// trap is still in play.
    fn settle(&mut self, id: TrapId) -> bool {
        let here = self.traps[id].tile;
        let outcome = self.tiles[here].crack();
        match outcome {
            CrackOutcome::Solid | CrackOutcome::Cracked => true,
            CrackOutcome::Collapsed { drop: Some(below) }
                if self.tiles[below].accepts_trap() && self.tiles[below].trap.is_none() =>
            {
                self.relocate(id, below, below);
                true
            }
            CrackOutcome::Collapsed { .. } | CrackOutcome::Gone => {
                self.remove_trap(id);
                false
            }
        }
    }

    /// Contact after movement: the agent dies on the trap's tile, and a killable trap sitting
    /// on the guarded tile is destroyed.
    fn strike(&mut self, id: TrapId) {
        let Some(trap) = self.traps.get(id) else {
            return;
        };
        let (here, guarded) = (trap.tile, trap.guarded);
        if self.agent.tile == here {
            self.lose_agent();
        }
        if let Some(other) = self.tiles[guarded].trap
            && other != id
        {
            self.kill_trap(other);
        }
    }
}
