use std::fmt;

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    pub struct TileId;
    pub struct TrapId;
    pub struct ItemId;
    pub struct LeverId;
}

/// Grid coordinates assigned once at load time. `z` only decreases through cracked-tile drops.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Coord {
    pub fn step(self, direction: Direction) -> Self {
        match direction {
            Direction::Up => Self { y: self.y + 1, ..self },
            Direction::Down => Self { y: self.y - 1, ..self },
            Direction::Left => Self { x: self.x - 1, ..self },
            Direction::Right => Self { x: self.x + 1, ..self },
        }
    }

    pub fn below(self) -> Self {
        Self { z: self.z - 1, ..self }
    }

    pub fn manhattan(self, other: Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y) + self.z.abs_diff(other.z)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] =
        [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// Slot of this direction in a tile's link array.
    pub fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }

    /// Parses the single-letter codes used by level files (`u`, `d`, `l`, `r`).
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "u" | "U" => Some(Direction::Up),
            "d" | "D" => Some(Direction::Down),
            "l" | "L" => Some(Direction::Left),
            "r" | "R" => Some(Direction::Right),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    UseLever,
    UseItem,
}

impl Action {
    /// Every action, in the order the solver tries them.
    pub const ALL: [Action; 6] = [
        Action::MoveUp,
        Action::MoveDown,
        Action::MoveLeft,
        Action::MoveRight,
        Action::UseLever,
        Action::UseItem,
    ];

    pub fn direction(self) -> Option<Direction> {
        match self {
            Action::MoveUp => Some(Direction::Up),
            Action::MoveDown => Some(Direction::Down),
            Action::MoveLeft => Some(Direction::Left),
            Action::MoveRight => Some(Direction::Right),
            Action::UseLever | Action::UseItem => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Action::MoveUp => "MOVE_UP",
            Action::MoveDown => "MOVE_DOWN",
            Action::MoveLeft => "MOVE_LEFT",
            Action::MoveRight => "MOVE_RIGHT",
            Action::UseLever => "USE_LEVER",
            Action::UseItem => "USE_ITEM",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Spear,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemPlace {
    Tile(TileId),
    Carried,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    pub kind: ItemKind,
    pub place: ItemPlace,
}

/// A lever standing on one or more tiles that flips every Moving tile in `targets`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lever {
    pub positions: Vec<TileId>,
    pub targets: Vec<TileId>,
}
