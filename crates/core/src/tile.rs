//! Tile nodes of the level graph and their variant-specific entry rules.
//! This module exists so every "what happens when something steps here" rule lives in one match.
//! It does not own agent movement or trap scheduling.

use crate::types::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileKind {
    Normal,
    Cracked { cracked: bool, destroyed: bool, drop: Option<TileId> },
    Moving { active: bool },
    DeadEnd,
}

impl TileKind {
    pub fn cracked(drop: Option<TileId>) -> Self {
        TileKind::Cracked { cracked: false, destroyed: false, drop }
    }

    pub fn name(self) -> &'static str {
        match self {
            TileKind::Normal => "normal",
            TileKind::Cracked { .. } => "cracked",
            TileKind::Moving { .. } => "moving",
            TileKind::DeadEnd => "dead-end",
        }
    }
}

/// Result of one arrival on a tile under the two-hit cracked rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CrackOutcome {
    /// Not a cracked tile; nothing happens.
    Solid,
    /// First arrival: the tile cracked and still holds its occupant.
    Cracked,
    /// Second arrival: the tile is destroyed and the occupant falls to `drop`, if any.
    Collapsed { drop: Option<TileId> },
    /// The tile was destroyed by an earlier arrival.
    Gone,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tile {
    /// Identifier from the level description; spawned dead ends have none.
    pub label: Option<u32>,
    pub kind: TileKind,
    pub coord: Coord,
    pub links: [Option<TileId>; 4],
    pub air: Vec<TileId>,
    pub has_agent: bool,
    pub item: Option<ItemId>,
    pub lever: Option<LeverId>,
    pub trap: Option<TrapId>,
    pub is_goal: bool,
    pub is_guarded: bool,
}

impl Tile {
    pub fn new(label: Option<u32>, kind: TileKind) -> Self {
        Self {
            label,
            kind,
            coord: Coord::default(),
            links: [None; 4],
            air: Vec::new(),
            has_agent: false,
            item: None,
            lever: None,
            trap: None,
            is_goal: false,
            is_guarded: false,
        }
    }

    pub fn dead_end(coord: Coord) -> Self {
        Self { coord, ..Self::new(None, TileKind::DeadEnd) }
    }

    pub fn neighbor(&self, direction: Direction) -> Option<TileId> {
        self.links[direction.index()]
    }

    /// Whether an occupant may attempt to step here at all. Only inactive Moving tiles refuse.
    pub fn can_be_entered(&self) -> bool {
        !matches!(self.kind, TileKind::Moving { active: false })
    }

    /// Whether a patrolling trap can stand here: enterable, not a sink, not already collapsed.
    pub fn accepts_trap(&self) -> bool {
        self.can_be_entered()
            && !matches!(
                self.kind,
                TileKind::DeadEnd | TileKind::Cracked { destroyed: true, .. }
            )
    }

    pub fn is_dead_end(&self) -> bool {
        self.kind == TileKind::DeadEnd
    }

    /// A cracked tile with nowhere to drop: the next arrival is lost.
    pub fn is_spent_crack(&self) -> bool {
        matches!(self.kind, TileKind::Cracked { cracked: true, drop: None, .. })
    }

    /// Registers one arrival. Cracked and destroyed flags only ever go from false to true.
    pub fn crack(&mut self) -> CrackOutcome {
        let TileKind::Cracked { cracked, destroyed, drop } = self.kind else {
            return CrackOutcome::Solid;
        };
        if destroyed {
            return CrackOutcome::Gone;
        }
        if cracked {
            self.kind = TileKind::Cracked { cracked: true, destroyed: true, drop };
            return CrackOutcome::Collapsed { drop };
        }
        self.kind = TileKind::Cracked { cracked: true, destroyed: false, drop };
        CrackOutcome::Cracked
    }

    pub fn flip_active(&mut self) {
        if let TileKind::Moving { active } = &mut self.kind {
            *active = !*active;
        }
    }
}
