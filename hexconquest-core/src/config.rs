//! Game configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ReplayError};
use crate::grid::HexGridConfig;
use crate::state::{PlayerId, MAX_PLAYERS};

/// Options recognized when starting a game
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Hex grid radius
    pub grid_radius: i32,
    /// Hex size in world units
    pub hex_size: f32,
    /// Number of players (2-8)
    pub player_count: usize,
    /// Which player is human (None = all AI)
    pub human_player_index: Option<PlayerId>,
    /// Target number of territories
    pub target_territory_count: usize,
    /// Generation hint: minimum hexes per territory
    pub min_territory_size: usize,
    /// Generation hint: maximum hexes per territory
    pub max_territory_size: usize,
    /// Dice each player starts with
    pub starting_dice_per_player: u32,
    /// RNG seed (0 = draw from system entropy)
    pub seed: u64,
    /// Absorb small unassigned hex groups after generation
    pub fill_holes: bool,
    /// Holes smaller than this get absorbed
    pub min_hole_size: usize,
    /// Remove every territory island except the largest
    pub keep_largest_island_only: bool,
    /// Seconds between queued combat actions (0 = instant)
    pub combat_queue_delay: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_radius: 8,
            hex_size: 24.0,
            player_count: 8,
            human_player_index: Some(0),
            target_territory_count: 48,
            min_territory_size: 3,
            max_territory_size: 12,
            starting_dice_per_player: 20,
            seed: 0,
            fill_holes: false,
            min_hole_size: 4,
            keep_largest_island_only: false,
            combat_queue_delay: 0.0,
        }
    }
}

impl GameConfig {
    /// All-AI game with the given seed
    pub fn headless(seed: u64) -> Self {
        Self {
            human_player_index: None,
            seed,
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_players(mut self, player_count: usize) -> Self {
        self.player_count = player_count;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(2..=MAX_PLAYERS).contains(&self.player_count) {
            return Err(ConfigError::PlayerCount {
                got: self.player_count,
                max: MAX_PLAYERS,
            });
        }
        if self.grid_radius < 1 {
            return Err(ConfigError::GridRadius(self.grid_radius));
        }
        if self.target_territory_count == 0 {
            return Err(ConfigError::TerritoryCount);
        }
        if let Some(index) = self.human_player_index {
            if usize::from(index) >= self.player_count {
                return Err(ConfigError::HumanPlayerIndex {
                    index,
                    players: self.player_count,
                });
            }
        }
        if self.hex_size <= 0.0 || !self.hex_size.is_finite() {
            return Err(ConfigError::HexSize(self.hex_size));
        }
        Ok(())
    }

    pub fn grid_config(&self) -> HexGridConfig {
        HexGridConfig {
            radius: self.grid_radius,
            hex_size: self.hex_size,
        }
    }

    /// Load from a JSON file; missing fields take their defaults
    pub fn load(path: &Path) -> Result<Self, ReplayError> {
        let content = std::fs::read_to_string(path)?;
        let config: GameConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save to a JSON file
    pub fn save(&self, path: &Path) -> Result<(), ReplayError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// `key=value` pairs in replay-file order
    pub fn to_key_values(&self) -> Vec<(&'static str, String)> {
        let human = self
            .human_player_index
            .map_or_else(|| "-1".to_string(), |p| p.to_string());
        vec![
            ("gridRadius", self.grid_radius.to_string()),
            ("playerCount", self.player_count.to_string()),
            ("humanPlayerIndex", human),
            ("targetTerritoryCount", self.target_territory_count.to_string()),
            ("minTerritorySize", self.min_territory_size.to_string()),
            ("maxTerritorySize", self.max_territory_size.to_string()),
            ("startingDicePerPlayer", self.starting_dice_per_player.to_string()),
            ("hexSize", self.hex_size.to_string()),
            ("seed", self.seed.to_string()),
            ("fillHoles", u8::from(self.fill_holes).to_string()),
            ("minHoleSize", self.min_hole_size.to_string()),
            ("keepLargestIslandOnly", u8::from(self.keep_largest_island_only).to_string()),
            ("combatQueueDelay", self.combat_queue_delay.to_string()),
        ]
    }

    /// Apply one `key=value` pair.
    ///
    /// Returns false for unknown keys or unparseable values; the config is
    /// left untouched in that case.
    pub fn apply_key_value(&mut self, key: &str, value: &str) -> bool {
        fn flag(value: &str) -> Option<bool> {
            value.parse::<i64>().ok().map(|v| v != 0)
        }

        let value = value.trim();
        let applied = match key.trim() {
            "gridRadius" => value.parse().ok().map(|v| self.grid_radius = v),
            "playerCount" => value.parse().ok().map(|v| self.player_count = v),
            "humanPlayerIndex" => value.parse::<i32>().ok().map(|v| {
                self.human_player_index = PlayerId::try_from(v).ok();
            }),
            "targetTerritoryCount" => value.parse().ok().map(|v| self.target_territory_count = v),
            "minTerritorySize" => value.parse().ok().map(|v| self.min_territory_size = v),
            "maxTerritorySize" => value.parse().ok().map(|v| self.max_territory_size = v),
            "startingDicePerPlayer" => value.parse().ok().map(|v| self.starting_dice_per_player = v),
            "hexSize" => value.parse().ok().map(|v| self.hex_size = v),
            "seed" => value.parse().ok().map(|v| self.seed = v),
            "fillHoles" => flag(value).map(|v| self.fill_holes = v),
            "minHoleSize" => value.parse().ok().map(|v| self.min_hole_size = v),
            "keepLargestIslandOnly" => flag(value).map(|v| self.keep_largest_island_only = v),
            "combatQueueDelay" => value.parse().ok().map(|v| self.combat_queue_delay = v),
            _ => None,
        };
        applied.is_some()
    }
}
