//! HEXCONQUEST Core - Game engine and AI
//!
//! This crate provides the core game logic for HEXCONQUEST:
//! - Hex geometry (axial coordinates, hexagonal grids)
//! - Territory generation, island pruning and player assignment
//! - Dice combat and the paced combat queue
//! - Game controller (turn/phase state machine, reinforcements)
//! - Heuristic attack-scoring AI
//! - Replay recording and playback

pub mod hex;
pub mod grid;
pub mod config;
pub mod error;
pub mod state;
pub mod generator;
pub mod island;
pub mod regions;
pub mod combat;
pub mod queue;
pub mod controller;
pub mod ai;
pub mod replay;

// Re-exports for convenient access
pub use hex::{HexCoord, Point, HEX_DIRECTIONS};
pub use grid::{HexGrid, HexGridConfig};
pub use config::GameConfig;
pub use error::{ConfigError, ReplayError};
pub use state::{
    GameState, PlayerData, PlayerId, TerritoryData, TerritoryId, TurnPhase, UiState,
    MAX_DICE_PER_TERRITORY, MAX_PLAYERS,
};
pub use generator::TerritoryGenerator;
pub use island::{find_islands, keep_largest_island_only, Island};
pub use regions::{find_contiguous_regions, largest_region, ContiguousRegion};
pub use combat::{win_probability, CombatResult, CombatSystem};
pub use queue::{CombatAction, CombatQueue, LoggedAction};
pub use controller::{GameController, AI_THINK_DELAY};
pub use ai::{AiController, AttackEvaluation};
pub use replay::{Replay, ReplayAction, ReplayOutcome, ReplayWriter, MAX_REPLAY_TURN_GAP};
