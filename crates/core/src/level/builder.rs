//! Incremental construction of a `GameState` from arena keys.
//! This module exists so the JSON loader and test fixtures share one place that wires
//! occupancy, guard flags and coordinates.
//! It does not own JSON parsing or label resolution.

use slotmap::SlotMap;

use super::LevelLoadError;
use crate::agent::Agent;
use crate::state::GameState;
use crate::tile::{Tile, TileKind};
use crate::trap::{Trap, TrapStrategy};
use crate::types::*;

#[derive(Debug, Default)]
pub struct LevelBuilder {
    tiles: SlotMap<TileId, Tile>,
    traps: SlotMap<TrapId, Trap>,
    items: SlotMap<ItemId, Item>,
    levers: SlotMap<LeverId, Lever>,
    agent: Option<TileId>,
    goals: Vec<TileId>,
}

impl LevelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_tile(&mut self, label: u32, kind: TileKind) -> TileId {
        self.tiles.insert(Tile::new(Some(label), kind))
    }

    pub fn tile_kind(&self, tile: TileId) -> TileKind {
        self.tiles[tile].kind
    }

    /// One-way link: `from` sees `to` in `direction`. Reverse links are declared separately.
    pub fn link(&mut self, from: TileId, direction: Direction, to: TileId) {
        self.tiles[from].links[direction.index()] = Some(to);
    }

    pub fn connect_air(&mut self, from: TileId, to: TileId) {
        self.tiles[from].air.push(to);
    }

    /// Sets the drop target of a cracked tile. Other variants ignore it.
    pub fn set_drop(&mut self, tile: TileId, below: TileId) {
        if let TileKind::Cracked { drop, .. } = &mut self.tiles[tile].kind {
            *drop = Some(below);
        }
    }

    pub fn mark_goal(&mut self, tile: TileId) {
        self.tiles[tile].is_goal = true;
        self.goals.push(tile);
    }

    pub fn place_agent(&mut self, tile: TileId) {
        self.agent = Some(tile);
    }

    pub fn add_item(&mut self, kind: ItemKind, tile: TileId) -> ItemId {
        let item = self.items.insert(Item { kind, place: ItemPlace::Tile(tile) });
        self.tiles[tile].item = Some(item);
        item
    }

    pub fn add_lever(&mut self, positions: &[TileId], targets: &[TileId]) -> LeverId {
        let lever =
            self.levers.insert(Lever { positions: positions.to_vec(), targets: targets.to_vec() });
        for &tile in positions {
            self.tiles[tile].lever = Some(lever);
        }
        lever
    }

    pub fn add_trap(
        &mut self,
        tile: TileId,
        guarded: TileId,
        attack_able: bool,
        strategy: TrapStrategy,
    ) -> Result<TrapId, LevelLoadError> {
        if self.tiles[tile].trap.is_some() {
            return Err(LevelLoadError::TileAlreadyHasTrap {
                id: self.tiles[tile].label.unwrap_or_default(),
            });
        }
        let trap = self.traps.insert(Trap { tile, guarded, attack_able, strategy });
        self.tiles[tile].trap = Some(trap);
        self.tiles[guarded].is_guarded = true;
        Ok(trap)
    }

    /// Places the agent, assigns coordinates and picks the first declared goal.
    pub fn finish(self) -> Result<GameState, LevelLoadError> {
        let start = self.agent.ok_or(LevelLoadError::NoAgent)?;
        let goal = self.goals.first().copied().ok_or(LevelLoadError::NoGoal)?;
        let mut state = GameState {
            tiles: self.tiles,
            traps: self.traps,
            items: self.items,
            levers: self.levers,
            agent: Agent { tile: start, item: None },
            goal,
        };
        state.place_agent(start);
        state.assign_coordinates();
        Ok(state)
    }
}
