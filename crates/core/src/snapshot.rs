//! State identity for the solver: structural equality, a stable fingerprint, and invariant checks.
//! This module exists to keep "are these two worlds the same" in one place the search can trust.
//! It does not own search bookkeeping or decide which states to explore.

use std::error::Error;
use std::fmt;
use std::hash::{Hash, Hasher};

use slotmap::Key;
use xxhash_rust::xxh3::Xxh3;

use crate::state::GameState;
use crate::tile::TileKind;
use crate::trap::TrapStrategy;
use crate::types::*;

/// Compares the agent, every tile and every live trap field by field, so two worlds with the
/// same trap count but traps in different places or patrol phases are distinct.
impl PartialEq for GameState {
    fn eq(&self, other: &Self) -> bool {
        self.agent == other.agent
            && self.tiles.len() == other.tiles.len()
            && self.tiles.iter().all(|(id, tile)| other.tiles.get(id) == Some(tile))
            && self.traps.len() == other.traps.len()
            && self.traps.iter().all(|(id, trap)| other.traps.get(id) == Some(trap))
    }
}

impl Eq for GameState {}

impl Hash for GameState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.fingerprint());
    }
}

fn key_bits(key: impl Key) -> u64 {
    key.data().as_ffi()
}

fn optional_key_bits(key: Option<impl Key>) -> u64 {
    key.map_or(u64::MAX, key_bits)
}

impl GameState {
    /// Stable 64-bit digest of the mutable parts of the world. Equal states always share a
    /// fingerprint; collisions are resolved by full equality.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.write_u64(key_bits(self.agent.tile));
        hasher.write_u64(optional_key_bits(self.agent.item));

        hasher.write_usize(self.tiles.len());
        for (id, tile) in &self.tiles {
            hasher.write_u64(key_bits(id));
            hasher.write_u8(match tile.kind {
                TileKind::Normal => 0,
                TileKind::Cracked { cracked: false, .. } => 1,
                TileKind::Cracked { cracked: true, destroyed: false, .. } => 2,
                TileKind::Cracked { destroyed: true, .. } => 3,
                TileKind::Moving { active: false } => 4,
                TileKind::Moving { active: true } => 5,
                TileKind::DeadEnd => 6,
            });
            hasher.write_u8(u8::from(tile.is_guarded));
            hasher.write_u64(optional_key_bits(tile.trap));
            hasher.write_u64(optional_key_bits(tile.item));
            hasher.write_usize(tile.air.len());
        }

        hasher.write_usize(self.traps.len());
        for (id, trap) in &self.traps {
            hasher.write_u64(key_bits(id));
            hasher.write_u64(key_bits(trap.tile));
            hasher.write_u64(key_bits(trap.guarded));
            match &trap.strategy {
                TrapStrategy::Snake => hasher.write_u8(0),
                TrapStrategy::Saw(patrol) | TrapStrategy::Spider(patrol) => {
                    hasher.write_u8(1);
                    hasher.write_usize(patrol.index);
                }
                TrapStrategy::Lizard(chase) => {
                    hasher.write_u8(2);
                    hasher.write_u8(u8::from(chase.active));
                    hasher.write_u64(optional_key_bits(chase.target));
                }
            }
        }
        hasher.finish()
    }

    /// Verifies the bookkeeping every transition must preserve.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let occupied: Vec<TileId> =
            self.tiles.iter().filter(|(_, tile)| tile.has_agent).map(|(id, _)| id).collect();
        if occupied != [self.agent.tile] {
            return Err(InvariantViolation::AgentOccupancy { occupied: occupied.len() });
        }
        let agent_tile = &self.tiles[self.agent.tile];
        if matches!(agent_tile.kind, TileKind::Cracked { destroyed: true, .. }) {
            return Err(InvariantViolation::AgentOnDestroyedTile { tile: agent_tile.label });
        }
        if !self.tiles.contains_key(self.goal) || !self.tiles[self.goal].is_goal {
            return Err(InvariantViolation::MissingGoal);
        }

        for (id, trap) in &self.traps {
            let Some(tile) = self.tiles.get(trap.tile) else {
                return Err(InvariantViolation::DanglingTrap { trap: id });
            };
            if tile.trap != Some(id) {
                return Err(InvariantViolation::TrapTileMismatch { trap: id });
            }
            if !self.tiles.get(trap.guarded).is_some_and(|tile| tile.is_guarded) {
                return Err(InvariantViolation::UnflaggedGuard { trap: id });
            }
        }
        for (id, tile) in &self.tiles {
            if let Some(trap) = tile.trap
                && self.traps.get(trap).is_none_or(|trap| trap.tile != id)
            {
                return Err(InvariantViolation::StaleTrapReference { tile: tile.label });
            }
            let claimed = self.traps.values().any(|trap| trap.guarded == id);
            if tile.is_guarded != claimed {
                return Err(InvariantViolation::StaleGuard { tile: tile.label });
            }
            if let Some(item) = tile.item
                && self.items.get(item).is_none_or(|item| item.place != ItemPlace::Tile(id))
            {
                return Err(InvariantViolation::ItemMismatch { tile: tile.label });
            }
        }

        if let Some(item) = self.agent.item
            && self.items.get(item).is_none_or(|item| item.place != ItemPlace::Carried)
        {
            return Err(InvariantViolation::CarriedItemMismatch);
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    AgentOccupancy { occupied: usize },
    AgentOnDestroyedTile { tile: Option<u32> },
    MissingGoal,
    DanglingTrap { trap: TrapId },
    TrapTileMismatch { trap: TrapId },
    UnflaggedGuard { trap: TrapId },
    StaleTrapReference { tile: Option<u32> },
    StaleGuard { tile: Option<u32> },
    ItemMismatch { tile: Option<u32> },
    CarriedItemMismatch,
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AgentOccupancy { occupied } => {
                write!(f, "expected exactly one tile holding the agent, found {occupied}")
            }
            Self::AgentOnDestroyedTile { tile } => {
                write!(f, "agent stands on destroyed tile {tile:?}")
            }
            Self::MissingGoal => write!(f, "goal tile is missing or not flagged"),
            Self::DanglingTrap { trap } => write!(f, "trap {trap:?} stands on a missing tile"),
            Self::TrapTileMismatch { trap } => {
                write!(f, "trap {trap:?} is not referenced by the tile it stands on")
            }
            Self::UnflaggedGuard { trap } => {
                write!(f, "tile guarded by trap {trap:?} is not flagged as guarded")
            }
            Self::StaleTrapReference { tile } => {
                write!(f, "tile {tile:?} references a trap that is elsewhere or dead")
            }
            Self::StaleGuard { tile } => {
                write!(f, "guard flag of tile {tile:?} disagrees with the live traps")
            }
            Self::ItemMismatch { tile } => {
                write!(f, "item on tile {tile:?} does not record that placement")
            }
            Self::CarriedItemMismatch => write!(f, "carried item is missing or placed on a tile"),
        }
    }
}

impl Error for InvariantViolation {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    #[test]
    fn clones_are_equal_and_share_a_fingerprint() {
        let state = corridor(true);
        let copy = state.clone();
        assert_eq!(state, copy);
        assert_eq!(state.fingerprint(), copy.fingerprint());
        assert_eq!(state.check_invariants(), Ok(()));
    }

    #[test]
    fn agent_moves_change_identity() {
        let (builder, _) = plus_grid();
        let start = builder.finish().expect("valid level");
        let mut moved = start.clone();
        assert!(moved.apply_action(Action::MoveRight));

        assert_ne!(start, moved);
        assert_ne!(start.fingerprint(), moved.fingerprint());
    }

    #[test]
    fn lever_flip_changes_identity_and_flipping_back_restores_it() {
        let start = corridor(true);
        let mut flipped = start.clone();
        assert!(flipped.apply_action(Action::UseLever));
        assert_ne!(start, flipped);
        assert_ne!(start.fingerprint(), flipped.fingerprint());

        assert!(flipped.apply_action(Action::UseLever));
        assert_eq!(start, flipped);
        assert_eq!(start.fingerprint(), flipped.fingerprint());
    }

    #[test]
    fn trap_progress_is_part_of_identity() {
        let (mut builder, ids) = plus_grid();
        let sequence = [
            Direction::Down,
            Direction::Up,
            Direction::Up,
            Direction::Down,
            Direction::Down,
            Direction::Up,
        ];
        let saw =
            builder.add_trap(ids[7], ids[3], false, patrol_saw(&sequence)).expect("free tile");
        let start = builder.finish().expect("valid level");
        let mut ticked = start.clone();
        for _ in 0..4 {
            ticked.tick_traps();
        }

        assert_eq!(start.traps[saw].tile, ticked.traps[saw].tile);
        assert_eq!(start.traps[saw].guarded, ticked.traps[saw].guarded);
        assert_ne!(start, ticked, "same trap tiles but the patrol index moved on");
        assert_ne!(start.fingerprint(), ticked.fingerprint());
    }

    #[test]
    fn each_tracked_field_breaks_equality() {
        let (mut builder, ids) = plus_grid();
        let snake = builder.add_trap(ids[3], ids[2], true, TrapStrategy::Snake).expect("free tile");
        let mut state = builder.finish().expect("valid level");
        state.tiles[ids[9]].kind = TileKind::cracked(None);

        let mutations: [(&str, fn(&mut GameState, &[TileId], TrapId)); 4] = [
            ("crack flag", |s, ids, _| {
                s.tiles[ids[9]].crack();
            }),
            ("guard flag", |s, ids, _| s.tiles[ids[8]].is_guarded = true),
            ("trap position", |s, ids, trap| {
                s.tiles[ids[3]].trap = None;
                s.tiles[ids[7]].trap = Some(trap);
                s.traps[trap].tile = ids[7];
            }),
            ("occupant", |s, ids, _| {
                s.vacate_agent();
                s.place_agent(ids[1]);
            }),
        ];
        for (field, mutate) in mutations {
            let mut copy = state.clone();
            mutate(&mut copy, &ids, snake);
            assert_ne!(copy, state, "{field} must be part of equality");
        }
    }

    #[test]
    fn corrupted_bookkeeping_is_reported() {
        let (mut builder, ids) = plus_grid();
        builder.add_trap(ids[3], ids[2], true, TrapStrategy::Snake).expect("free tile");
        let state = builder.finish().expect("valid level");

        let mut doubled = state.clone();
        doubled.tiles[ids[4]].has_agent = true;
        assert_eq!(
            doubled.check_invariants(),
            Err(InvariantViolation::AgentOccupancy { occupied: 2 })
        );

        let mut unguarded = state.clone();
        unguarded.tiles[ids[2]].is_guarded = false;
        assert!(matches!(
            unguarded.check_invariants(),
            Err(InvariantViolation::UnflaggedGuard { .. })
        ));

        let mut stale = state.clone();
        stale.tiles[ids[9]].is_guarded = true;
        assert_eq!(stale.check_invariants(), Err(InvariantViolation::StaleGuard { tile: Some(9) }));

        let mut collapsed = state;
        collapsed.tiles[ids[0]].kind = TileKind::cracked(None);
        collapsed.tiles[ids[0]].crack();
        collapsed.tiles[ids[0]].crack();
        assert_eq!(
            collapsed.check_invariants(),
            Err(InvariantViolation::AgentOnDestroyedTile { tile: Some(0) })
        );
    }
}
