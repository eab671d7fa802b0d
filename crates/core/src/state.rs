//! The game-state aggregate and the tile-graph primitives every rule builds on.
//! This module exists to keep arena bookkeeping (occupancy, guard flags, coordinates) in one place.
//! It does not own action handling, trap strategies, or search.

use std::collections::{BTreeSet, VecDeque};

use slotmap::SlotMap;

use crate::agent::Agent;
use crate::tile::{Tile, TileKind};
use crate::trap::Trap;
use crate::types::*;

/// One complete world: the unit the solver clones, compares and hashes.
#[derive(Clone, Debug)]
pub struct GameState {
    pub tiles: SlotMap<TileId, Tile>,
    pub traps: SlotMap<TrapId, Trap>,
    pub items: SlotMap<ItemId, Item>,
    pub levers: SlotMap<LeverId, Lever>,
    pub agent: Agent,
    pub goal: TileId,
}

impl GameState {
    pub fn neighbor(&self, tile: TileId, direction: Direction) -> Option<TileId> {
        self.tiles.get(tile).and_then(|tile| tile.neighbor(direction))
    }

    pub fn tile_by_label(&self, label: u32) -> Option<TileId> {
        self.tiles.iter().find(|(_, tile)| tile.label == Some(label)).map(|(id, _)| id)
    }

    pub fn agent_tile(&self) -> &Tile {
        &self.tiles[self.agent.tile]
    }

    pub fn agent_coord(&self) -> Coord {
        self.agent_tile().coord
    }

    pub fn goal_coord(&self) -> Coord {
        self.tiles[self.goal].coord
    }

    pub fn is_solved(&self) -> bool {
        self.agent_tile().is_goal
    }

    /// The agent is stuck in a sink and no action can change that.
    pub fn is_lost(&self) -> bool {
        self.agent_tile().is_dead_end()
    }

    pub(crate) fn place_agent(&mut self, tile: TileId) {
        self.tiles[tile].has_agent = true;
        self.agent.tile = tile;
    }

    pub(crate) fn vacate_agent(&mut self) {
        self.tiles[self.agent.tile].has_agent = false;
    }

    /// Adds a fresh sink tile sharing the coordinates of `at`.
    pub(crate) fn spawn_dead_end(&mut self, at: TileId) -> TileId {
        let coord = self.tiles[at].coord;
        self.tiles.insert(Tile::dead_end(coord))
    }

    /// Moves the agent into a fresh dead end next to wherever it stands now.
    pub(crate) fn lose_agent(&mut self) {
        let here = self.agent.tile;
        self.vacate_agent();
        let sink = self.spawn_dead_end(here);
        let tile = &self.tiles[here];
        log::trace!("agent lost on {} tile at {}", tile.kind.name(), tile.coord);
        self.place_agent(sink);
    }

    /// Recomputes the guard flag of `tile` from the live traps.
    pub(crate) fn refresh_guard(&mut self, tile: TileId) {
        let guarded = self.traps.values().any(|trap| trap.guarded == tile);
        if let Some(tile) = self.tiles.get_mut(tile) {
            tile.is_guarded = guarded;
        }
    }

    /// Breadth-first coordinate assignment from the agent's start tile.
    pub(crate) fn assign_coordinates(&mut self) {
        let start = self.agent.tile;
        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::new();
        self.tiles[start].coord = Coord::default();
        visited.insert(start);
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            let tile = &self.tiles[current];
            let coord = tile.coord;
            let mut discovered = Vec::with_capacity(5);
            for direction in Direction::ALL {
                if let Some(next) = tile.neighbor(direction) {
                    discovered.push((next, coord.step(direction)));
                }
            }
            if let TileKind::Cracked { drop: Some(below), .. } = tile.kind {
                discovered.push((below, coord.below()));
            }

            for (next, next_coord) in discovered {
                if self.tiles.contains_key(next) && visited.insert(next) {
                    self.tiles[next].coord = next_coord;
                    queue.push_back(next);
                }
            }
        }
    }
}
