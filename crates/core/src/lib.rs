pub mod agent;
pub mod config;
pub mod level;
pub mod search;
pub mod snapshot;
pub mod state;
pub mod tile;
pub mod trap;
pub mod types;

#[cfg(test)]
mod test_support;

pub use agent::Agent;
pub use config::{SearchLimits, SolverConfig};
pub use level::{LevelBuilder, LevelDescription, LevelLoadError, load_level_from_file, parse_level};
pub use search::{SearchOutcome, SearchStopReason, Solver, StateId};
pub use snapshot::InvariantViolation;
pub use state::GameState;
pub use tile::{CrackOutcome, Tile, TileKind};
pub use trap::{Chase, Patrol, Trap, TrapKind, TrapStrategy};
pub use types::*;
