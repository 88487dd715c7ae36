//! Heuristic attack-scoring AI

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::combat::win_probability;
use crate::controller::GameController;
use crate::regions::{find_contiguous_regions, largest_region, ContiguousRegion};
use crate::state::{GameState, PlayerId, TerritoryId};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Attacks below this win chance are never made
pub const MIN_WIN_PROBABILITY: f32 = 0.40;

/// Attacks below this score are never made
pub const MIN_ATTACK_SCORE: f32 = 0.3;

const WEIGHT_CONNECTION: f32 = 1.5;
const WEIGHT_INCOME_GAIN: f32 = 0.1;
const WEIGHT_NON_MAIN_REGION: f32 = 0.6;
const WEIGHT_EXPOSURE_RISK: f32 = 0.5;
const WEIGHT_RETRIBUTION: f32 = 0.3;
const WEIGHT_HONOR: f32 = 0.3;

/// Chance of taking the runner-up when it is close to the best
const ALTERNATIVE_PICK_CHANCE: f64 = 0.3;
const ALTERNATIVE_SCORE_RATIO: f32 = 0.9;

// ============================================================================
// EVALUATION
// ============================================================================

/// One candidate attack with its score
#[derive(Clone, Debug, PartialEq)]
pub struct AttackEvaluation {
    pub from: TerritoryId,
    pub to: TerritoryId,
    pub win_probability: f32,
    pub score: f32,
    pub from_largest_region: bool,
    pub would_connect: bool,
    pub potential_income_gain: usize,
}

/// Computer player: scores every legal attack and makes the best one
#[derive(Clone, Debug)]
pub struct AiController {
    rng: ChaCha8Rng,
}

impl AiController {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Make one attack for `player`. Returns false when the AI is done for
    /// this turn.
    pub fn take_action(&mut self, controller: &mut GameController, player: PlayerId) -> bool {
        if controller.is_game_over() || controller.current_player() != player {
            return false;
        }

        let mut candidates: Vec<AttackEvaluation> = evaluate_attacks(controller, player)
            .into_iter()
            .filter(|e| e.win_probability >= MIN_WIN_PROBABILITY && e.score >= MIN_ATTACK_SCORE)
            .collect();
        if candidates.is_empty() {
            tracing::debug!("AI {} has no worthwhile attack", player);
            return false;
        }

        // Stable sort keeps generation order among equal scores
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

        let mut choice = &candidates[0];
        if let Some(runner_up) = candidates.get(1) {
            if runner_up.score >= choice.score * ALTERNATIVE_SCORE_RATIO
                && self.rng.gen_bool(ALTERNATIVE_PICK_CHANCE)
            {
                choice = runner_up;
            }
        }

        tracing::debug!(
            "AI {} attacks {} -> {} (p={:.2}, score={:.2}, {} candidates)",
            player,
            choice.from,
            choice.to,
            choice.win_probability,
            choice.score,
            candidates.len()
        );

        controller.attack_from(choice.from, choice.to)
    }
}

/// Score every attack `player` can legally make right now.
///
/// Candidates come out in attacker-id order, then neighbor order.
pub fn evaluate_attacks(controller: &GameController, player: PlayerId) -> Vec<AttackEvaluation> {
    let state = controller.state();
    let regions = find_contiguous_regions(state, player);
    let largest = largest_region(&regions);

    let mut evaluations = Vec::new();
    for from in state.owned_territories(player).filter(|t| t.can_attack()) {
        for &to in &from.neighbors {
            if !controller.can_attack(from.id, to) {
                continue;
            }
            let Some(defender) = state.territory(to) else {
                continue;
            };

            let (would_connect, potential_income_gain) = would_connect_regions(state, to, &regions);
            let mut evaluation = AttackEvaluation {
                from: from.id,
                to,
                win_probability: win_probability(from.dice_count, defender.dice_count),
                score: 0.0,
                from_largest_region: largest.is_some_and(|r| r.contains(from.id)),
                would_connect,
                potential_income_gain,
            };
            evaluation.score = score_attack(state, player, &evaluation);
            evaluations.push(evaluation);
        }
    }
    evaluations
}

/// Strategic score of one attack, starting from its win probability
pub fn score_attack(state: &GameState, player: PlayerId, eval: &AttackEvaluation) -> f32 {
    let (Some(attacker), Some(defender)) = (state.territory(eval.from), state.territory(eval.to)) else {
        return 0.0;
    };
    let attacker_dice = attacker.dice_count;
    let defender_dice = defender.dice_count;

    let mut score = eval.win_probability;

    if defender_dice < attacker_dice {
        score *= 1.2;
    }
    if eval.win_probability > 0.7 {
        score *= 1.3;
    }
    if attacker_dice == 2 {
        score *= 0.8;
    }
    if defender_dice >= 6 {
        score *= 0.7;
    }

    if eval.would_connect {
        score *= WEIGHT_CONNECTION;
        score *= 1.0 + WEIGHT_INCOME_GAIN * eval.potential_income_gain as f32;
    } else if !eval.from_largest_region {
        score *= WEIGHT_NON_MAIN_REGION;
    }

    score *= 1.0 - WEIGHT_EXPOSURE_RISK * exposure_risk(state, player, eval.from, eval.to);

    if let Some(victim) = defender.owner {
        score *= 1.0 + WEIGHT_RETRIBUTION * retribution_score(state, player, victim);
        score *= 1.0 - WEIGHT_HONOR * honor_penalty(state, player, victim);

        let foreign_neighbors = defender
            .neighbors
            .iter()
            .filter_map(|&n| state.territory(n))
            .filter(|t| t.owner != Some(victim))
            .count();
        if foreign_neighbors >= 3 {
            score *= 1.2;
        }
    }

    score * (1.0 + 0.3 * territory_value(state, player, eval.to))
}

/// Whether taking `target` would join two or more of the player's regions,
/// and the reinforcement gain if so
pub fn would_connect_regions(state: &GameState, target: TerritoryId, regions: &[ContiguousRegion]) -> (bool, usize) {
    let Some(territory) = state.territory(target) else {
        return (false, 0);
    };

    let mut touched: Vec<usize> = territory
        .neighbors
        .iter()
        .filter_map(|&n| regions.iter().position(|r| r.contains(n)))
        .collect();
    touched.sort_unstable();
    touched.dedup();

    if touched.len() < 2 {
        return (false, 0);
    }

    let sizes = touched.iter().map(|&i| regions[i].size());
    let total: usize = sizes.clone().sum();
    let largest = sizes.max().unwrap_or(0);
    (true, 1 + total - largest)
}

/// How exposed the attack leaves us, in [0, 1].
///
/// The attacking territory drops to one die; the captured one holds the
/// moved dice against third parties around it. The defender's other
/// territories are left out of the captured side.
pub fn exposure_risk(state: &GameState, player: PlayerId, from: TerritoryId, to: TerritoryId) -> f32 {
    let (Some(attacker), Some(target)) = (state.territory(from), state.territory(to)) else {
        return 0.0;
    };

    // Enemies of `player` around `neighbors`, ignoring `skip` and `spared`'s own territories
    let strongest_enemy = |neighbors: &[TerritoryId], skip: TerritoryId, spared: Option<PlayerId>| -> u8 {
        neighbors
            .iter()
            .filter(|&&n| n != skip)
            .filter_map(|&n| state.territory(n))
            .filter(|t| t.owner.is_some() && !t.is_owned_by(player) && t.owner != spared)
            .map(|t| t.dice_count)
            .max()
            .unwrap_or(0)
    };

    let attacker_threat = strongest_enemy(attacker.neighbors.as_slice(), to, None);
    let attacker_risk = if attacker_threat >= 3 {
        (f32::from(attacker_threat - 1) / 7.0).min(1.0)
    } else {
        0.0
    };

    let moving = attacker.dice_count.saturating_sub(1).max(1);
    let target_threat = strongest_enemy(target.neighbors.as_slice(), from, target.owner);
    let captured_risk = if target_threat >= moving.saturating_add(2) {
        (f32::from(target_threat - moving) / 6.0).min(1.0)
    } else {
        0.0
    };

    0.6 * attacker_risk + 0.4 * captured_risk
}

/// 0, 0.5 or 1.0 depending on how often `victim` attacked `player` recently
pub fn retribution_score(state: &GameState, player: PlayerId, victim: PlayerId) -> f32 {
    match state
        .attack_history
        .count_attacks_from(victim, player, state.turn_number)
    {
        0 => 0.0,
        1 => 0.5,
        _ => 1.0,
    }
}

/// Reluctance to break a peace
pub fn honor_penalty(state: &GameState, player: PlayerId, victim: PlayerId) -> f32 {
    let turn = state.turn_number;
    let they_were_peaceful = state.attack_history.has_been_peaceful(victim, player, turn);
    let we_were_peaceful = state.attack_history.has_been_peaceful(player, victim, turn);
    match (they_were_peaceful, we_were_peaceful) {
        (true, true) => 1.0,
        (true, false) => 0.3,
        _ => 0.0,
    }
}

/// Positional value of a territory, in [0, 1]
pub fn territory_value(state: &GameState, player: PlayerId, id: TerritoryId) -> f32 {
    let Some(territory) = state.territory(id) else {
        return 0.0;
    };

    let friendly = territory
        .neighbors
        .iter()
        .filter(|&&n| state.territory(n).is_some_and(|t| t.is_owned_by(player)))
        .count();
    let enemy = territory.neighbors.len() - friendly;

    let mut value = 0.1 * territory.neighbors.len() as f32;
    if friendly > enemy {
        value += 0.3;
    }
    value += 0.02 * territory.hexes.len() as f32;
    value.min(1.0)
}

// ============================================================================
// TESTS
// ============================================================================
