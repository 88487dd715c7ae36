//! Dice combat resolution and win-probability estimation

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::state::{GameState, PlayerId, TerritoryData, TerritoryId};

/// Mean of one d6
const DIE_MEAN: f32 = 3.5;

/// Variance of one d6 (35/12)
const DIE_VARIANCE: f32 = 35.0 / 12.0;

/// Logistic slope approximating the normal CDF
const LOGISTIC_SCALE: f32 = 1.7;

/// Outcome of one attack, with every roll
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatResult {
    pub attacker_id: TerritoryId,
    pub defender_id: TerritoryId,
    pub attacker_player: Option<PlayerId>,
    pub defender_player: Option<PlayerId>,
    pub attacker_rolls: Vec<u8>,
    pub defender_rolls: Vec<u8>,
    pub attacker_total: u32,
    pub defender_total: u32,
    pub attacker_wins: bool,
}

impl CombatResult {
    /// Build a result from rolls already made.
    ///
    /// Ties go to the attacker.
    pub fn from_rolls(
        attacker: &TerritoryData,
        defender: &TerritoryData,
        attacker_rolls: Vec<u8>,
        defender_rolls: Vec<u8>,
    ) -> Self {
        let attacker_total = attacker_rolls.iter().map(|&d| u32::from(d)).sum();
        let defender_total = defender_rolls.iter().map(|&d| u32::from(d)).sum();
        Self {
            attacker_id: attacker.id,
            defender_id: defender.id,
            attacker_player: attacker.owner,
            defender_player: defender.owner,
            attacker_rolls,
            defender_rolls,
            attacker_total,
            defender_total,
            attacker_wins: attacker_total >= defender_total,
        }
    }
}

/// Dice roller bound to its own RNG stream
#[derive(Clone, Debug)]
pub struct CombatSystem {
    rng: ChaCha8Rng,
}

impl CombatSystem {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    fn roll_dice(&mut self, count: u8) -> Vec<u8> {
        (0..count).map(|_| self.rng.gen_range(1..=6)).collect()
    }

    /// Roll both sides and decide the winner
    pub fn resolve_combat(&mut self, attacker: &TerritoryData, defender: &TerritoryData) -> CombatResult {
        let attacker_rolls = self.roll_dice(attacker.dice_count);
        let defender_rolls = self.roll_dice(defender.dice_count);
        CombatResult::from_rolls(attacker, defender, attacker_rolls, defender_rolls)
    }

    /// Apply a resolved combat to the game state.
    ///
    /// Either way the attacking territory is left with one die.
    pub fn apply_combat_result(state: &mut GameState, result: &CombatResult) {
        let Some(attacker_dice) = state.territory(result.attacker_id).map(|t| t.dice_count) else {
            return;
        };
        if state.territory(result.defender_id).is_none() {
            return;
        }

        if result.attacker_wins {
            let moving = attacker_dice.saturating_sub(1).max(1);
            if let Some(defender) = state.territory_mut(result.defender_id) {
                defender.owner = result.attacker_player;
                defender.dice_count = moving;
            }
            state.map_needs_refresh = true;
        }

        if let Some(attacker) = state.territory_mut(result.attacker_id) {
            attacker.dice_count = 1;
        }
    }
}

/// Approximate chance that `attacker_dice` d6 beat `defender_dice` d6.
///
/// Normal approximation of the difference of sums, squashed through a
/// logistic curve. Good enough for scoring, not for deciding outcomes.
pub fn win_probability(attacker_dice: u8, defender_dice: u8) -> f32 {
    if attacker_dice == 0 || defender_dice == 0 {
        return 0.0;
    }
    let a = f32::from(attacker_dice);
    let d = f32::from(defender_dice);

    let diff_mean = (a - d) * DIE_MEAN;
    let diff_std = ((a + d) * DIE_VARIANCE).sqrt();
    let z = diff_mean / diff_std;

    1.0 / (1.0 + (-LOGISTIC_SCALE * z).exp())
}
