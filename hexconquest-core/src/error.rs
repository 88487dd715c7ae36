//! Error types for configuration and replay I/O

use thiserror::Error;

/// Rejected game configuration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("player count must be between 2 and {max}, got {got}")]
    PlayerCount { got: usize, max: usize },

    #[error("grid radius must be at least 1, got {0}")]
    GridRadius(i32),

    #[error("target territory count must be positive")]
    TerritoryCount,

    #[error("human player index {index} is out of range for {players} players")]
    HumanPlayerIndex { index: u8, players: usize },

    #[error("hex size must be positive, got {0}")]
    HexSize(f32),
}

/// Failure reading or writing a replay or config file
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("replay has no [CONFIG] section")]
    MissingConfig,

    #[error(transparent)]
    Config(#[from] ConfigError),
}
