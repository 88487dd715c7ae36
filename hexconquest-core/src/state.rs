//! Game state: players, territories, turn and selection

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::combat::CombatResult;
use crate::config::GameConfig;
use crate::hex::HexCoord;

// ============================================================================
// CONSTANTS
// ============================================================================

pub type PlayerId = u8;
pub type TerritoryId = usize;

pub const MAX_PLAYERS: usize = 8;
pub const MAX_DICE_PER_TERRITORY: u8 = 8;

/// Seconds a combat result stays on screen
pub const COMBAT_DISPLAY_DURATION: f32 = 1.5;

/// Turns an attack stays in the ledger
pub const ATTACK_MEMORY_TURNS: u32 = 3;

/// Player colors, indexed by player id
pub const PLAYER_COLORS: [[f32; 3]; MAX_PLAYERS] = [
    [0.90, 0.30, 0.30], // Red
    [0.30, 0.60, 0.90], // Blue
    [0.30, 0.80, 0.40], // Green
    [0.95, 0.75, 0.20], // Yellow
    [0.70, 0.40, 0.80], // Purple
    [0.95, 0.55, 0.25], // Orange
    [0.50, 0.80, 0.85], // Cyan
    [0.85, 0.50, 0.70], // Pink
];

// ============================================================================
// CORE TYPES
// ============================================================================

/// A participant in the game
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerData {
    pub id: PlayerId,
    pub is_human: bool,
    pub is_eliminated: bool,
    pub color: [f32; 3],
    pub name: String,
}

impl PlayerData {
    pub fn new(id: PlayerId, is_human: bool) -> Self {
        let name = if is_human {
            "Player".to_string()
        } else {
            format!("AI {id}")
        };
        Self {
            id,
            is_human,
            is_eliminated: false,
            color: PLAYER_COLORS[usize::from(id) % MAX_PLAYERS],
            name,
        }
    }
}

/// A contiguous group of hexes, the unit of attack and defense
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerritoryData {
    pub id: TerritoryId,
    pub owner: Option<PlayerId>,
    pub dice_count: u8,
    pub hexes: Vec<HexCoord>,
    pub neighbors: Vec<TerritoryId>,
    pub center_hex: HexCoord,
}

impl TerritoryData {
    pub fn new(id: TerritoryId) -> Self {
        Self {
            id,
            owner: None,
            dice_count: 1,
            hexes: Vec::new(),
            neighbors: Vec::new(),
            center_hex: HexCoord::default(),
        }
    }

    pub fn is_owned_by(&self, player: PlayerId) -> bool {
        self.owner == Some(player)
    }

    /// At least two dice are needed to attack
    pub fn can_attack(&self) -> bool {
        self.dice_count >= 2
    }

    pub fn is_full(&self) -> bool {
        self.dice_count >= MAX_DICE_PER_TERRITORY
    }

    pub fn borders(&self, other: TerritoryId) -> bool {
        self.neighbors.contains(&other)
    }
}

/// Turn phases
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnPhase {
    /// Human selecting territory to attack from
    SelectAttacker,
    /// Human selecting target territory
    SelectTarget,
    /// Combat being resolved (only inside an attack)
    Resolving,
    /// AI player making decisions
    AiTurn,
    /// End-of-turn dice distribution (only inside end_turn)
    Reinforcement,
    /// Victory condition met
    GameOver,
}

/// Most recent combat, kept around for display
#[derive(Clone, Debug, Default)]
pub struct LastCombat {
    pub result: Option<CombatResult>,
    pub display_timer: f32,
}

impl LastCombat {
    pub fn is_displayed(&self) -> bool {
        self.result.is_some() && self.display_timer > 0.0
    }
}

/// One entry in the attack ledger
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackRecord {
    pub attacker: PlayerId,
    pub defender: PlayerId,
    pub turn: u32,
}

/// Who attacked whom recently
#[derive(Clone, Debug, Default)]
pub struct AttackHistory {
    records: Vec<AttackRecord>,
}

impl AttackHistory {
    pub fn record(&mut self, attacker: PlayerId, defender: PlayerId, turn: u32) {
        self.records.retain(|r| r.turn + ATTACK_MEMORY_TURNS > turn);
        self.records.push(AttackRecord { attacker, defender, turn });
    }

    /// Attacks by `attacker` against `victim` within the memory window
    pub fn count_attacks_from(&self, attacker: PlayerId, victim: PlayerId, current_turn: u32) -> usize {
        self.records
            .iter()
            .filter(|r| r.attacker == attacker && r.defender == victim)
            .filter(|r| r.turn + ATTACK_MEMORY_TURNS > current_turn)
            .count()
    }

    /// True when `from` has not attacked `toward` within the memory window
    pub fn has_been_peaceful(&self, from: PlayerId, toward: PlayerId, current_turn: u32) -> bool {
        self.count_attacks_from(from, toward, current_turn) == 0
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Read-only highlight snapshot for the renderer
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UiState {
    pub hovered_territory: Option<TerritoryId>,
    pub selected_hexes: Vec<HexCoord>,
    pub valid_target_hexes: Vec<HexCoord>,
    pub hover_hexes: Vec<HexCoord>,
    pub show_combat_result: bool,
}

// ============================================================================
// GAME STATE
// ============================================================================

/// Authoritative game model. Mutated only through `GameController`.
#[derive(Clone, Debug)]
pub struct GameState {
    pub config: GameConfig,

    pub players: Vec<PlayerData>,
    pub active_player_count: usize,

    pub current_player: PlayerId,
    pub turn_number: u32,
    pub phase: TurnPhase,

    pub territories: Vec<TerritoryData>,
    pub hex_to_territory: FxHashMap<HexCoord, TerritoryId>,

    pub selected_territory: Option<TerritoryId>,
    pub valid_targets: Vec<TerritoryId>,

    pub last_combat: LastCombat,

    /// Set when territory ownership changes
    pub map_needs_refresh: bool,

    pub winner: Option<PlayerId>,

    pub attack_history: AttackHistory,
}

impl GameState {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            players: Vec::new(),
            active_player_count: 0,
            current_player: 0,
            turn_number: 1,
            phase: TurnPhase::SelectAttacker,
            territories: Vec::new(),
            hex_to_territory: FxHashMap::default(),
            selected_territory: None,
            valid_targets: Vec::new(),
            last_combat: LastCombat::default(),
            map_needs_refresh: false,
            winner: None,
            attack_history: AttackHistory::default(),
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.winner.is_some()
    }

    pub fn is_human_turn(&self) -> bool {
        self.player(self.current_player)
            .is_some_and(|p| p.is_human && !p.is_eliminated)
    }

    pub fn territory(&self, id: TerritoryId) -> Option<&TerritoryData> {
        self.territories.get(id)
    }

    pub fn territory_mut(&mut self, id: TerritoryId) -> Option<&mut TerritoryData> {
        self.territories.get_mut(id)
    }

    pub fn territory_at(&self, coord: HexCoord) -> Option<TerritoryId> {
        self.hex_to_territory.get(&coord).copied()
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerData> {
        self.players.get(usize::from(id))
    }

    pub fn owned_territories(&self, player: PlayerId) -> impl Iterator<Item = &TerritoryData> + '_ {
        self.territories.iter().filter(move |t| t.is_owned_by(player))
    }

    pub fn count_territories_owned(&self, player: PlayerId) -> usize {
        self.owned_territories(player).count()
    }

    pub fn count_dice_owned(&self, player: PlayerId) -> u32 {
        self.owned_territories(player)
            .map(|t| u32::from(t.dice_count))
            .sum()
    }
}
