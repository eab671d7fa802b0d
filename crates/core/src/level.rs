//! JSON level descriptions and their translation into a ready-to-search `GameState`.
//! This module exists to validate every cross-reference once, before any state is constructed.
//! It does not own runtime rules; the produced state is handed to the agent and search layers.

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::slice;

use serde::{Deserialize, Serialize};

use crate::state::GameState;
use crate::tile::TileKind;
use crate::trap::{Chase, Patrol, TrapStrategy};
use crate::types::*;

mod builder;

pub use builder::LevelBuilder;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDescription {
    pub tiles: Vec<TileSpec>,
    #[serde(default)]
    pub traps: Vec<TrapSpec>,
    #[serde(default)]
    pub items: Vec<ItemSpec>,
    #[serde(default)]
    pub levers: Vec<LeverSpec>,
    pub agent: AgentSpec,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileType {
    #[default]
    Tile,
    CrackedTile,
    MovingTile,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSpec {
    pub id: u32,
    #[serde(rename = "type", default)]
    pub kind: TileType,
    #[serde(default)]
    pub left: Option<u32>,
    #[serde(default)]
    pub right: Option<u32>,
    #[serde(default)]
    pub up: Option<u32>,
    #[serde(default)]
    pub down: Option<u32>,
    #[serde(default)]
    pub is_goal: bool,
    #[serde(default)]
    pub air_connect: Vec<u32>,
    /// Tile one level down that a collapsing cracked tile drops onto.
    #[serde(default)]
    pub drop: Option<u32>,
    #[serde(default)]
    pub active: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrapType {
    Snake,
    Saw,
    Spider,
    Lizard,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrapSpec {
    #[serde(rename = "type")]
    pub kind: TrapType,
    #[serde(default)]
    pub can_attack: bool,
    pub pos: u32,
    pub guards: u32,
    /// Direction codes (`u`, `d`, `l`, `r`) for patrolling traps.
    #[serde(default)]
    pub moving_seq: Vec<String>,
    #[serde(default)]
    pub trigger: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemType {
    Spear,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSpec {
    #[serde(rename = "type")]
    pub kind: ItemType,
    pub pos: u32,
}

/// A lever may stand on a single tile or span several.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LeverPositions {
    One(u32),
    Many(Vec<u32>),
}

impl LeverPositions {
    pub fn ids(&self) -> &[u32] {
        match self {
            LeverPositions::One(id) => slice::from_ref(id),
            LeverPositions::Many(ids) => ids,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeverSpec {
    pub pos: LeverPositions,
    pub tiles: Vec<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSpec {
    pub pos: u32,
}

/// Describes why a level description could not be turned into a game state.
#[derive(Debug)]
pub enum LevelLoadError {
    /// Underlying I/O failure.
    Io(io::Error),
    /// The file is not valid JSON or does not match the level schema.
    Json(serde_json::Error),
    DuplicateTile { id: u32 },
    /// A reference names a tile id that the level never declares.
    UnknownTile { id: u32, context: &'static str },
    BadDirection { code: String },
    /// A Saw or Spider without a patrol sequence.
    MissingSequence { pos: u32 },
    /// A Lizard without a trigger tile.
    MissingTrigger { pos: u32 },
    NotAMovingTile { id: u32 },
    TileAlreadyHasTrap { id: u32 },
    NoAgent,
    NoGoal,
}

impl fmt::Display for LevelLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "level I/O error: {e}"),
            Self::Json(e) => write!(f, "invalid level JSON: {e}"),
            Self::DuplicateTile { id } => write!(f, "tile id {id} is declared twice"),
            Self::UnknownTile { id, context } => {
                write!(f, "{context} references unknown tile id {id}")
            }
            Self::BadDirection { code } => {
                write!(f, "unknown direction code {code:?}, expected one of u, d, l, r")
            }
            Self::MissingSequence { pos } => {
                write!(f, "patrolling trap on tile {pos} has no moving_seq")
            }
            Self::MissingTrigger { pos } => write!(f, "lizard on tile {pos} has no trigger"),
            Self::NotAMovingTile { id } => {
                write!(f, "lever targets tile {id}, which is not a MovingTile")
            }
            Self::TileAlreadyHasTrap { id } => write!(f, "tile {id} already holds a trap"),
            Self::NoAgent => write!(f, "level does not place the agent"),
            Self::NoGoal => write!(f, "level has no goal tile"),
        }
    }
}

impl Error for LevelLoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

pub fn parse_level(text: &str) -> Result<GameState, LevelLoadError> {
    let description: LevelDescription =
        serde_json::from_str(text).map_err(LevelLoadError::Json)?;
    description.build()
}

pub fn load_level_from_file(path: &Path) -> Result<GameState, LevelLoadError> {
    let text = fs::read_to_string(path).map_err(LevelLoadError::Io)?;
    parse_level(&text)
}

impl LevelDescription {
    /// Resolves every tile reference and assembles the initial state.
    pub fn build(&self) -> Result<GameState, LevelLoadError> {
        let mut builder = LevelBuilder::new();
        let mut ids = BTreeMap::new();

        for spec in &self.tiles {
            let kind = match spec.kind {
                TileType::Tile => TileKind::Normal,
                TileType::CrackedTile => TileKind::cracked(None),
                TileType::MovingTile => TileKind::Moving { active: spec.active },
            };
            if ids.insert(spec.id, builder.add_tile(spec.id, kind)).is_some() {
                return Err(LevelLoadError::DuplicateTile { id: spec.id });
            }
        }
        let resolve = |id: u32, context: &'static str| {
            ids.get(&id).copied().ok_or(LevelLoadError::UnknownTile { id, context })
        };

        for spec in &self.tiles {
            let tile = resolve(spec.id, "tile")?;
            let links = [
                (Direction::Up, spec.up),
                (Direction::Down, spec.down),
                (Direction::Left, spec.left),
                (Direction::Right, spec.right),
            ];
            for (direction, target) in links {
                if let Some(target) = target {
                    builder.link(tile, direction, resolve(target, "tile link")?);
                }
            }
            for &target in &spec.air_connect {
                builder.connect_air(tile, resolve(target, "air link")?);
            }
            if let Some(drop) = spec.drop
                && spec.kind == TileType::CrackedTile
            {
                builder.set_drop(tile, resolve(drop, "cracked tile drop")?);
            }
            if spec.is_goal {
                builder.mark_goal(tile);
            }
        }

        for spec in &self.traps {
            let tile = resolve(spec.pos, "trap position")?;
            let guarded = resolve(spec.guards, "trap guard")?;
            let strategy = match spec.kind {
                TrapType::Snake => TrapStrategy::Snake,
                TrapType::Saw => TrapStrategy::Saw(patrol(spec)?),
                TrapType::Spider => TrapStrategy::Spider(patrol(spec)?),
                TrapType::Lizard => {
                    let trigger =
                        spec.trigger.ok_or(LevelLoadError::MissingTrigger { pos: spec.pos })?;
                    TrapStrategy::Lizard(Chase::new(resolve(trigger, "lizard trigger")?))
                }
            };
            builder.add_trap(tile, guarded, spec.can_attack, strategy)?;
        }

        for spec in &self.items {
            let tile = resolve(spec.pos, "item position")?;
            let kind = match spec.kind {
                ItemType::Spear => ItemKind::Spear,
            };
            builder.add_item(kind, tile);
        }

        for spec in &self.levers {
            let positions = spec
                .pos
                .ids()
                .iter()
                .map(|&id| resolve(id, "lever position"))
                .collect::<Result<Vec<_>, _>>()?;
            let mut targets = Vec::with_capacity(spec.tiles.len());
            for &id in &spec.tiles {
                let target = resolve(id, "lever target")?;
                if !matches!(builder.tile_kind(target), TileKind::Moving { .. }) {
                    return Err(LevelLoadError::NotAMovingTile { id });
                }
                targets.push(target);
            }
            builder.add_lever(&positions, &targets);
        }

        builder.place_agent(resolve(self.agent.pos, "agent position")?);
        let state = builder.finish()?;
        log::debug!(
            "level built: {} tiles, {} traps, {} items, {} levers",
            state.tiles.len(),
            state.traps.len(),
            state.items.len(),
            state.levers.len()
        );
        Ok(state)
    }
}

fn patrol(spec: &TrapSpec) -> Result<Patrol, LevelLoadError> {
    if spec.moving_seq.is_empty() {
        return Err(LevelLoadError::MissingSequence { pos: spec.pos });
    }
    let sequence = spec
        .moving_seq
        .iter()
        .map(|code| {
            Direction::from_code(code).ok_or_else(|| LevelLoadError::BadDirection {
                code: code.clone(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Patrol::new(sequence))
}
