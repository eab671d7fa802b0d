//! The controllable agent and the action state machine that mutates the world.
//! This module exists to turn one requested action into tile, item and trap mutations.
//! It does not own trap strategies or decide which actions are worth trying.

use crate::state::GameState;
use crate::tile::{CrackOutcome, TileKind};
use crate::types::*;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Agent {
    pub tile: TileId,
    pub item: Option<ItemId>,
}

impl GameState {
    /// Applies `action` and reports whether it had any effect. No-op actions leave the state
    /// untouched.
    pub fn apply_action(&mut self, action: Action) -> bool {
        if self.is_lost() {
            return false;
        }
        match action {
            Action::UseLever => self.use_lever(),
            Action::UseItem => self.use_item(),
            _ => match action.direction() {
                Some(direction) => self.move_agent(direction),
                None => false,
            },
        }
    }

    fn move_agent(&mut self, direction: Direction) -> bool {
        let Some(dest) = self.neighbor(self.agent.tile, direction) else {
            return false;
        };
        if !self.tiles[dest].can_be_entered() {
            return false;
        }

        self.vacate_agent();
        let landed = self.resolve_entry(dest);
        self.place_agent(landed);
        self.pick_up_item(landed);
        self.tick_traps();
        true
    }

    /// Runs the entry rules of `dest` and returns the tile the arriving agent ends up on.
    fn resolve_entry(&mut self, dest: TileId) -> TileId {
        if let Some(trap) = self.tiles[dest].trap
            && !self.kill_trap(trap)
        {
            return self.spawn_dead_end(dest);
        }
        if self.tiles[dest].is_guarded {
            return self.spawn_dead_end(dest);
        }

        match self.tiles[dest].kind {
            TileKind::Normal | TileKind::DeadEnd | TileKind::Moving { active: true } => dest,
            TileKind::Moving { active: false } => self.spawn_dead_end(dest),
            TileKind::Cracked { .. } => {
                let outcome = self.tiles[dest].crack();
                match outcome {
                    CrackOutcome::Solid | CrackOutcome::Cracked => dest,
                    CrackOutcome::Collapsed { drop: Some(below) } => self.resolve_entry(below),
                    CrackOutcome::Collapsed { drop: None } | CrackOutcome::Gone => {
                        self.spawn_dead_end(dest)
                    }
                }
            }
        }
    }

    fn pick_up_item(&mut self, tile: TileId) {
        if self.agent.item.is_some() {
            return;
        }
        let Some(item) = self.tiles[tile].item.take() else {
            return;
        };
        self.items[item].place = ItemPlace::Carried;
        self.agent.item = Some(item);
    }

    fn use_lever(&mut self) -> bool {
        let Some(lever) = self.agent_tile().lever else {
            return false;
        };
        let Self { tiles, levers, .. } = self;
        for &target in &levers[lever].targets {
            tiles[target].flip_active();
        }
        true
    }

    fn use_item(&mut self) -> bool {
        let Some(item) = self.agent.item else {
            return false;
        };
        let here = self.agent.tile;
        if self.tiles[here].air.is_empty() {
            return false;
        }
        let target = self.tiles[here].air.remove(0);

        match self.items[item].kind {
            ItemKind::Spear => {
                if let Some(trap) = self.tiles[target].trap
                    && self.kill_trap(trap)
                {
                    self.items.remove(item);
                    self.agent.item = None;
                }
            }
        }
        true
    }
}
