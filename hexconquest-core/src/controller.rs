//! Game controller: the turn/phase state machine.
//!
//! Owns the grid, the state and every subsystem that mutates it. Players act
//! only through the methods here; the renderer polls `state()` and
//! `ui_state()`.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::ai::AiController;
use crate::combat::CombatSystem;
use crate::config::GameConfig;
use crate::error::ConfigError;
use crate::generator::{distribute_dice, TerritoryGenerator};
use crate::grid::HexGrid;
use crate::hex::HexCoord;
use crate::island::keep_largest_island_only;
use crate::queue::{CombatAction, CombatQueue, LoggedAction};
use crate::regions::{find_contiguous_regions, largest_region, largest_region_size, ContiguousRegion};
use crate::state::{
    GameState, PlayerData, PlayerId, TerritoryId, TurnPhase, UiState, COMBAT_DISPLAY_DURATION,
};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Seconds between AI actions
pub const AI_THINK_DELAY: f32 = 0.5;

/// Per-subsystem offsets added to the game seed
const COMBAT_SEED_OFFSET: u64 = 1;
const REINFORCEMENT_SEED_OFFSET: u64 = 2;
const AI_SEED_OFFSET: u64 = 3;

// ============================================================================
// CONTROLLER
// ============================================================================

pub struct GameController {
    grid: HexGrid,
    state: GameState,
    combat: CombatSystem,
    queue: CombatQueue,
    reinforcement_rng: ChaCha8Rng,
    action_log: Vec<LoggedAction>,
    ai: Option<AiController>,
    ai_think_timer: f32,
}

impl GameController {
    /// Build and start a new game.
    ///
    /// A zero seed is replaced by one entropy draw; the resolved seed is
    /// written back into the stored config so the game can be replayed.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut config = config;
        config.seed = resolve_seed(config.seed);

        let grid = HexGrid::new(config.grid_config());
        let mut state = GameState::new(config);
        let mut generator = TerritoryGenerator::new(state.config.seed);

        generator.generate(&grid, &mut state);
        if state.config.keep_largest_island_only {
            keep_largest_island_only(&mut state);
        }
        create_players(&mut state);
        generator.assign_to_players(&mut state);

        tracing::info!(
            "New game: seed {}, {} players, {} territories on radius {}",
            state.config.seed,
            state.players.len(),
            state.territories.len(),
            grid.radius()
        );

        Ok(Self::assemble(grid, state))
    }

    /// Wrap a map that was built elsewhere.
    ///
    /// Players are created from the config when the state has none. Play
    /// starts with the state's current player.
    pub fn from_parts(grid: HexGrid, mut state: GameState) -> Result<Self, ConfigError> {
        state.config.validate()?;
        state.config.seed = resolve_seed(state.config.seed);
        if state.players.is_empty() {
            create_players(&mut state);
        }
        Ok(Self::assemble(grid, state))
    }

    fn assemble(grid: HexGrid, state: GameState) -> Self {
        let seed = state.config.seed;
        let first = state.current_player;
        let mut controller = Self {
            grid,
            combat: CombatSystem::new(seed.wrapping_add(COMBAT_SEED_OFFSET)),
            queue: CombatQueue::new(state.config.combat_queue_delay),
            reinforcement_rng: ChaCha8Rng::seed_from_u64(seed.wrapping_add(REINFORCEMENT_SEED_OFFSET)),
            action_log: Vec::new(),
            ai: None,
            ai_think_timer: AI_THINK_DELAY,
            state,
        };
        controller.start_turn(first);
        controller
    }

    /// Install the default AI, seeded from the game seed
    pub fn with_default_ai(mut self) -> Self {
        let seed = self.state.config.seed.wrapping_add(AI_SEED_OFFSET);
        self.set_ai_controller(AiController::new(seed));
        self
    }

    pub fn set_ai_controller(&mut self, ai: AiController) {
        self.ai = Some(ai);
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn grid(&self) -> &HexGrid {
        &self.grid
    }

    pub fn config(&self) -> &GameConfig {
        &self.state.config
    }

    pub fn seed(&self) -> u64 {
        self.state.config.seed
    }

    pub fn current_player(&self) -> PlayerId {
        self.state.current_player
    }

    pub fn phase(&self) -> TurnPhase {
        self.state.phase
    }

    pub fn turn_number(&self) -> u32 {
        self.state.turn_number
    }

    pub fn is_game_over(&self) -> bool {
        self.state.phase == TurnPhase::GameOver
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.state.winner
    }

    /// Every resolved attack so far, oldest first
    pub fn action_log(&self) -> &[LoggedAction] {
        &self.action_log
    }

    /// Next paced combat action for animation, if its delay has elapsed
    pub fn pop_combat_action(&mut self) -> Option<CombatAction> {
        self.queue.pop_next_action()
    }

    pub fn pending_combat_actions(&self) -> usize {
        self.queue.len()
    }

    /// Read and clear the map-refresh flag
    pub fn take_map_refresh(&mut self) -> bool {
        std::mem::take(&mut self.state.map_needs_refresh)
    }

    // ========================================================================
    // PLAYER ACTIONS
    // ========================================================================

    /// Select (or, if already selected, deselect) an attacking territory
    pub fn select_territory(&mut self, id: TerritoryId) -> bool {
        if !matches!(self.state.phase, TurnPhase::SelectAttacker | TurnPhase::SelectTarget) {
            return false;
        }
        if self.state.selected_territory == Some(id) {
            self.cancel_selection();
            return false;
        }

        let current = self.state.current_player;
        let selectable = self
            .state
            .territory(id)
            .is_some_and(|t| t.is_owned_by(current) && t.can_attack());
        if !selectable {
            return false;
        }

        self.state.selected_territory = Some(id);
        self.state.valid_targets = self.valid_targets(id);
        self.state.phase = TurnPhase::SelectTarget;
        true
    }

    /// Attack `target` from the selected territory
    pub fn attack(&mut self, target: TerritoryId) -> bool {
        if !matches!(self.state.phase, TurnPhase::SelectTarget | TurnPhase::AiTurn) {
            return false;
        }
        let Some(from) = self.state.selected_territory else {
            return false;
        };
        if !self.can_attack(from, target) {
            return false;
        }

        let resume_phase = self.state.phase;
        self.state.phase = TurnPhase::Resolving;

        let attacker = &self.state.territories[from];
        let defender = &self.state.territories[target];
        let action = CombatAction {
            attacker_id: from,
            defender_id: target,
            attacker_player: self.state.current_player,
            attacker_dice: attacker.dice_count,
            defender_dice: defender.dice_count,
        };
        let result = self.combat.resolve_combat(attacker, defender);

        tracing::debug!(
            "Player {} attacks {} -> {} ({} vs {}): {} vs {}, {}",
            action.attacker_player,
            from,
            target,
            action.attacker_dice,
            action.defender_dice,
            result.attacker_total,
            result.defender_total,
            if result.attacker_wins { "captured" } else { "repelled" }
        );

        CombatSystem::apply_combat_result(&mut self.state, &result);
        if let Some(victim) = result.defender_player {
            let turn = self.state.turn_number;
            self.state
                .attack_history
                .record(action.attacker_player, victim, turn);
        }

        self.queue.queue_action(action);
        self.action_log.push(LoggedAction {
            turn: self.state.turn_number,
            action,
        });
        self.state.last_combat.result = Some(result);
        self.state.last_combat.display_timer = COMBAT_DISPLAY_DURATION;

        self.state.selected_territory = None;
        self.state.valid_targets.clear();
        self.state.phase = match resume_phase {
            TurnPhase::AiTurn => TurnPhase::AiTurn,
            _ => TurnPhase::SelectAttacker,
        };

        self.check_elimination();
        self.check_victory();
        true
    }

    /// AI path: select and attack in one call, only during an AI turn
    pub fn attack_from(&mut self, from: TerritoryId, to: TerritoryId) -> bool {
        if self.state.phase != TurnPhase::AiTurn {
            return false;
        }
        self.state.selected_territory = Some(from);
        let attacked = self.attack(to);
        if !attacked {
            self.state.selected_territory = None;
        }
        attacked
    }

    pub fn cancel_selection(&mut self) {
        self.state.selected_territory = None;
        self.state.valid_targets.clear();
        if self.state.phase == TurnPhase::SelectTarget {
            self.state.phase = TurnPhase::SelectAttacker;
        }
    }

    /// Reinforce the current player and pass the turn
    pub fn end_turn(&mut self) -> bool {
        if matches!(self.state.phase, TurnPhase::GameOver | TurnPhase::Resolving) {
            return false;
        }

        self.cancel_selection();
        self.state.phase = TurnPhase::Reinforcement;

        let player = self.state.current_player;
        let reinforcements = self.calculate_reinforcements(player);
        self.distribute_reinforcements(player, reinforcements);

        self.advance_to_next_player();
        true
    }

    /// Advance timers and let the AI act when its think delay runs out
    pub fn update(&mut self, dt: f32) {
        if self.state.last_combat.display_timer > 0.0 {
            self.state.last_combat.display_timer = (self.state.last_combat.display_timer - dt).max(0.0);
        }
        self.queue.update(dt);

        if self.state.phase != TurnPhase::AiTurn {
            return;
        }
        self.ai_think_timer -= dt;
        if self.ai_think_timer > 0.0 {
            return;
        }

        let player = self.state.current_player;
        // Without an AI installed, computer players pass
        let Some(mut ai) = self.ai.take() else {
            self.end_turn();
            return;
        };
        let acted = ai.take_action(self, player);
        self.ai = Some(ai);

        if acted {
            self.ai_think_timer = AI_THINK_DELAY;
        } else {
            self.end_turn();
        }
    }

    /// Drive the AI until someone wins, `max_turns` pass, or a human is up.
    ///
    /// Combat actions are drained as they come; nothing animates them.
    pub fn play_out(&mut self, max_turns: u32) -> Option<PlayerId> {
        while !self.is_game_over()
            && self.state.turn_number <= max_turns
            && self.state.phase == TurnPhase::AiTurn
        {
            self.update(AI_THINK_DELAY);
            while self.pop_combat_action().is_some() {}
        }
        self.state.winner
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// Whether the current player may attack `to` from `from`
    pub fn can_attack(&self, from: TerritoryId, to: TerritoryId) -> bool {
        if self.state.phase == TurnPhase::GameOver {
            return false;
        }
        let (Some(attacker), Some(defender)) = (self.state.territory(from), self.state.territory(to)) else {
            return false;
        };
        attacker.is_owned_by(self.state.current_player)
            && attacker.can_attack()
            && defender.owner != attacker.owner
            && attacker.borders(to)
    }

    /// Neighbors of `from` it may attack right now
    pub fn valid_targets(&self, from: TerritoryId) -> Vec<TerritoryId> {
        let Some(territory) = self.state.territory(from) else {
            return Vec::new();
        };
        territory
            .neighbors
            .iter()
            .copied()
            .filter(|&n| self.can_attack(from, n))
            .collect()
    }

    /// Dice earned at end of turn: size of the largest contiguous region
    pub fn calculate_reinforcements(&self, player: PlayerId) -> usize {
        largest_region_size(&self.state, player)
    }

    pub fn largest_contiguous_region(&self, player: PlayerId) -> Option<ContiguousRegion> {
        let regions = find_contiguous_regions(&self.state, player);
        largest_region(&regions).cloned()
    }

    /// Highlight snapshot; `hovered` is the hex under the cursor
    pub fn ui_state(&self, hovered: Option<HexCoord>) -> UiState {
        let hexes_of = |id: TerritoryId| -> Vec<HexCoord> {
            self.state
                .territory(id)
                .map(|t| t.hexes.clone())
                .unwrap_or_default()
        };

        let hovered_territory = hovered.and_then(|hex| self.state.territory_at(hex));
        UiState {
            hovered_territory,
            selected_hexes: self.state.selected_territory.map(hexes_of).unwrap_or_default(),
            valid_target_hexes: self
                .state
                .valid_targets
                .iter()
                .flat_map(|&id| hexes_of(id))
                .collect(),
            hover_hexes: hovered_territory.map(hexes_of).unwrap_or_default(),
            show_combat_result: self.state.last_combat.is_displayed(),
        }
    }

    // ========================================================================
    // TURN FLOW
    // ========================================================================

    fn start_turn(&mut self, player: PlayerId) {
        self.state.current_player = player;
        self.state.selected_territory = None;
        self.state.valid_targets.clear();
        self.state.phase = if self.state.is_human_turn() {
            TurnPhase::SelectAttacker
        } else {
            TurnPhase::AiTurn
        };
        self.ai_think_timer = AI_THINK_DELAY;
    }

    fn distribute_reinforcements(&mut self, player: PlayerId, count: usize) {
        let mut pool: Vec<TerritoryId> = self.state.owned_territories(player).map(|t| t.id).collect();
        let dropped = distribute_dice(&mut self.reinforcement_rng, &mut self.state, &mut pool, count);
        tracing::debug!(
            "Player {} reinforced with {} dice ({} lost to the cap)",
            player,
            count - dropped,
            dropped
        );
    }

    /// Next non-eliminated player, wrapping into a new turn
    fn advance_to_next_player(&mut self) {
        let count = self.state.players.len();
        let current = usize::from(self.state.current_player);
        let mut next = current;
        loop {
            next = (next + 1) % count;
            if next == current {
                self.finish(self.state.current_player);
                return;
            }
            if !self.state.players[next].is_eliminated {
                break;
            }
        }

        if next <= current {
            self.state.turn_number += 1;
        }
        self.start_turn(next as PlayerId);
    }

    fn check_elimination(&mut self) {
        for idx in 0..self.state.players.len() {
            let id = idx as PlayerId;
            if self.state.players[idx].is_eliminated || self.state.count_territories_owned(id) > 0 {
                continue;
            }
            self.state.players[idx].is_eliminated = true;
            self.state.active_player_count = self.state.active_player_count.saturating_sub(1);
            tracing::info!(
                "Player {} eliminated on turn {}, {} remain",
                id,
                self.state.turn_number,
                self.state.active_player_count
            );
        }
    }

    fn check_victory(&mut self) {
        let mut owners = self.state.territories.iter().map(|t| t.owner);
        let Some(first) = owners.next().flatten() else {
            return;
        };
        if owners.all(|owner| owner == Some(first)) {
            self.finish(first);
        }
    }

    fn finish(&mut self, winner: PlayerId) {
        self.state.winner = Some(winner);
        self.state.phase = TurnPhase::GameOver;
        self.state.selected_territory = None;
        self.state.valid_targets.clear();
        tracing::info!("Player {} wins on turn {}", winner, self.state.turn_number);
    }
}

fn resolve_seed(seed: u64) -> u64 {
    if seed != 0 {
        return seed;
    }
    // Zero is reserved for "pick one"
    rand::thread_rng().gen_range(1..=u64::MAX)
}

fn create_players(state: &mut GameState) {
    let human = state.config.human_player_index;
    state.players = (0..state.config.player_count as PlayerId)
        .map(|id| PlayerData::new(id, human == Some(id)))
        .collect();
    state.active_player_count = state.players.len();
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regions::tests::chain_state;
    use crate::state::MAX_DICE_PER_TERRITORY;

    fn small_config(seed: u64) -> GameConfig {
        GameConfig {
            grid_radius: 5,
            player_count: 3,
            target_territory_count: 15,
            starting_dice_per_player: 12,
            ..GameConfig::headless(seed)
        }
    }

    /// Chain map wrapped in a controller; player 0 is human
    fn chain_controller(owners: &[PlayerId], dice: u8) -> GameController {
        let mut state = chain_state(owners, dice);
        state.config.seed = 11;
        state.config.human_player_index = Some(0);
        let grid = HexGrid::from_coords(std::iter::empty(), 10.0);
        GameController::from_parts(grid, state).unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = GameConfig::default().with_players(1);
        assert!(matches!(
            GameController::new(config),
            Err(ConfigError::PlayerCount { .. })
        ));
    }

    #[test]
    fn test_new_game_setup() {
        let controller = GameController::new(small_config(5)).unwrap();
        let state = controller.state();
        assert_eq!(state.players.len(), 3);
        assert_eq!(state.active_player_count, 3);
        assert_eq!(state.turn_number, 1);
        assert_eq!(state.current_player, 0);
        assert_eq!(state.phase, TurnPhase::AiTurn);
        assert!(state.territories.iter().all(|t| t.owner.is_some()));
        assert!(state
            .territories
            .iter()
            .all(|t| (1..=MAX_DICE_PER_TERRITORY).contains(&t.dice_count)));
    }

    #[test]
    fn test_zero_seed_is_resolved() {
        let controller = GameController::new(small_config(0)).unwrap();
        assert_ne!(controller.seed(), 0);
        assert_eq!(controller.config().seed, controller.seed());
    }

    #[test]
    fn test_human_starts_in_select_attacker() {
        let config = GameConfig {
            human_player_index: Some(0),
            ..small_config(3)
        };
        let controller = GameController::new(config).unwrap();
        assert!(controller.state().players[0].is_human);
        assert_eq!(controller.phase(), TurnPhase::SelectAttacker);
    }

    #[test]
    fn test_select_toggles() {
        let mut controller = chain_controller(&[0, 1], 3);
        assert!(controller.select_territory(0));
        assert_eq!(controller.phase(), TurnPhase::SelectTarget);
        assert_eq!(controller.state().valid_targets, vec![1]);

        assert!(!controller.select_territory(0));
        assert_eq!(controller.state().selected_territory, None);
        assert_eq!(controller.phase(), TurnPhase::SelectAttacker);
    }

    #[test]
    fn test_invalid_selection_is_noop() {
        let mut controller = chain_controller(&[0, 1, 0], 1);
        // One die cannot attack; enemy territory; out of range
        assert!(!controller.select_territory(0));
        assert!(!controller.select_territory(1));
        assert!(!controller.select_territory(99));
        assert_eq!(controller.phase(), TurnPhase::SelectAttacker);
        assert!(controller.state().selected_territory.is_none());
    }

    #[test]
    fn test_attack_without_selection_is_noop() {
        let mut controller = chain_controller(&[0, 1], 3);
        let before = controller.state().territories.clone();
        assert!(!controller.attack(1));
        assert_eq!(controller.state().territories, before);
        assert!(controller.action_log().is_empty());
    }

    #[test]
    fn test_attack_own_territory_rejected() {
        let mut controller = chain_controller(&[0, 0, 1], 3);
        assert!(controller.select_territory(0));
        assert!(!controller.can_attack(0, 1));
        assert!(!controller.attack(1));
        assert_eq!(controller.state().territories[1].dice_count, 3);
    }

    #[test]
    fn test_attack_from_requires_ai_turn() {
        let mut controller = chain_controller(&[0, 1], 3);
        assert!(!controller.attack_from(0, 1));
        assert!(controller.action_log().is_empty());
    }

    #[test]
    fn test_two_player_elimination_and_victory() {
        let mut controller = chain_controller(&[0, 1], 1);
        // Eight dice always beat one
        controller.state.territories[0].dice_count = 8;

        assert!(controller.select_territory(0));
        assert!(controller.attack(1));

        let state = controller.state();
        assert_eq!(state.territories[1].owner, Some(0));
        assert_eq!(state.territories[1].dice_count, 7);
        assert_eq!(state.territories[0].dice_count, 1);
        assert!(state.players[1].is_eliminated);
        assert_eq!(state.active_player_count, 1);
        assert_eq!(state.winner, Some(0));
        assert_eq!(state.phase, TurnPhase::GameOver);

        // Nothing works after the game ends
        assert!(!controller.end_turn());
        assert!(!controller.select_territory(1));
    }

    #[test]
    fn test_attack_logs_and_queues() {
        let mut controller = chain_controller(&[0, 1, 1], 4);
        assert!(controller.select_territory(0));
        assert!(controller.attack(1));

        let log = controller.action_log();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].turn, 1);
        assert_eq!(log[0].action.attacker_dice, 4);
        assert_eq!(log[0].action.defender_dice, 4);
        let first = log[0].action;
        assert_eq!(controller.pop_combat_action(), Some(first));

        let state = controller.state();
        assert_eq!(state.territories[0].dice_count, 1);
        assert!(state.last_combat.is_displayed());
        assert_eq!(state.phase, TurnPhase::SelectAttacker);
        assert_eq!(state.attack_history.count_attacks_from(0, 1, 1), 1);
    }

    #[test]
    fn test_combat_display_timer_runs_out() {
        let mut controller = chain_controller(&[0, 1, 1], 4);
        controller.select_territory(0);
        controller.attack(1);
        assert!(controller.ui_state(None).show_combat_result);
        controller.update(COMBAT_DISPLAY_DURATION);
        assert!(!controller.ui_state(None).show_combat_result);
    }

    #[test]
    fn test_end_turn_reinforces_largest_region() {
        // Player 0 regions: {0, 1} and {3}; largest is 2
        let mut controller = chain_controller(&[0, 0, 1, 0], 1);
        assert_eq!(controller.calculate_reinforcements(0), 2);
        let before = controller.state().count_dice_owned(0);

        assert!(controller.end_turn());
        assert_eq!(controller.state().count_dice_owned(0), before + 2);
        assert_eq!(controller.current_player(), 1);
        assert_eq!(controller.turn_number(), 1);
    }

    #[test]
    fn test_reinforcement_respects_cap() {
        let mut controller = chain_controller(&[0, 0, 0, 1], 7);
        assert!(controller.end_turn());
        let state = controller.state();
        assert!(state.owned_territories(0).all(|t| t.dice_count == MAX_DICE_PER_TERRITORY));
        assert_eq!(state.count_dice_owned(0), 24);
    }

    #[test]
    fn test_turn_wraps_and_skips_eliminated() {
        let mut state = chain_state(&[0, 2, 0, 2], 1);
        state.config = state.config.clone().with_players(3).with_seed(2);
        let grid = HexGrid::from_coords(std::iter::empty(), 10.0);
        let mut controller = GameController::from_parts(grid, state).unwrap();
        controller.state.players[1].is_eliminated = true;
        controller.state.active_player_count = 2;

        assert!(controller.end_turn());
        assert_eq!(controller.current_player(), 2);
        assert_eq!(controller.turn_number(), 1);

        assert!(controller.end_turn());
        assert_eq!(controller.current_player(), 0);
        assert_eq!(controller.turn_number(), 2);
    }

    #[test]
    fn test_last_player_standing_ends_game() {
        let mut controller = chain_controller(&[0, 0], 1);
        controller.state.players[1].is_eliminated = true;
        assert!(controller.end_turn());
        assert_eq!(controller.phase(), TurnPhase::GameOver);
        assert_eq!(controller.winner(), Some(0));
    }

    #[test]
    fn test_ai_without_controller_passes() {
        let mut controller = chain_controller(&[0, 1], 3);
        controller.end_turn();
        assert_eq!(controller.phase(), TurnPhase::AiTurn);
        controller.update(AI_THINK_DELAY);
        assert_eq!(controller.current_player(), 0);
        assert_eq!(controller.turn_number(), 2);
    }

    #[test]
    fn test_update_makes_one_ai_attack_per_think() {
        // Player 0 has two full stacks, each next to a one-die enemy
        let mut state = chain_state(&[1, 0, 1, 0, 1], 1);
        state.territories[1].dice_count = MAX_DICE_PER_TERRITORY;
        state.territories[3].dice_count = MAX_DICE_PER_TERRITORY;
        state.config.human_player_index = None;
        state.config.seed = 3;
        let grid = HexGrid::from_coords(std::iter::empty(), 10.0);
        let mut controller = GameController::from_parts(grid, state).unwrap().with_default_ai();
        assert_eq!(controller.phase(), TurnPhase::AiTurn);

        // A long frame still only buys one attack
        controller.update(10.0);
        assert_eq!(controller.action_log().len(), 1);
        assert_eq!(controller.current_player(), 0);
        assert_eq!(controller.phase(), TurnPhase::AiTurn);

        // The think delay starts over after the attack
        controller.update(AI_THINK_DELAY / 2.0);
        assert_eq!(controller.action_log().len(), 1);
        controller.update(AI_THINK_DELAY / 2.0);
        assert_eq!(controller.action_log().len(), 2);
        assert_eq!(controller.current_player(), 0);
        assert_eq!(controller.turn_number(), 1);
    }

    #[test]
    fn test_play_out_finishes_or_hits_cap() {
        let mut controller = GameController::new(small_config(17)).unwrap().with_default_ai();
        let winner = controller.play_out(200);
        let state = controller.state();
        match winner {
            Some(w) => {
                assert_eq!(state.phase, TurnPhase::GameOver);
                assert!(state.territories.iter().all(|t| t.is_owned_by(w)));
                assert_eq!(state.active_player_count, 1);
            }
            None => assert!(state.turn_number > 200),
        }
        assert_eq!(controller.pending_combat_actions(), 0);
    }

    #[test]
    fn test_ui_state_tracks_selection_and_hover() {
        let mut state = chain_state(&[0, 1], 3);
        state.config.human_player_index = Some(0);
        state.config.seed = 1;
        state.territories[0].hexes = vec![HexCoord::new(0, 0)];
        state.territories[1].hexes = vec![HexCoord::new(1, 0), HexCoord::new(2, 0)];
        state.hex_to_territory.insert(HexCoord::new(0, 0), 0);
        state.hex_to_territory.insert(HexCoord::new(1, 0), 1);
        state.hex_to_territory.insert(HexCoord::new(2, 0), 1);
        let grid = HexGrid::from_coords(state.hex_to_territory.keys().copied(), 10.0);
        let mut controller = GameController::from_parts(grid, state).unwrap();

        controller.select_territory(0);
        let ui = controller.ui_state(Some(HexCoord::new(2, 0)));
        assert_eq!(ui.selected_hexes, vec![HexCoord::new(0, 0)]);
        assert_eq!(ui.valid_target_hexes.len(), 2);
        assert_eq!(ui.hovered_territory, Some(1));
        assert_eq!(ui.hover_hexes.len(), 2);
        assert!(!ui.show_combat_result);

        assert!(controller.ui_state(Some(HexCoord::new(9, 9))).hovered_territory.is_none());
    }

    #[test]
    fn test_largest_contiguous_region() {
        let controller = chain_controller(&[0, 1, 0, 0], 2);
        let region = controller.largest_contiguous_region(0).unwrap();
        assert_eq!(region.territories, vec![2, 3]);
        assert_eq!(region.total_dice, 4);
        assert!(controller.largest_contiguous_region(1).is_some());
    }

    #[test]
    fn test_map_refresh_flag_is_consumed() {
        let mut controller = chain_controller(&[0, 1], 1);
        controller.state.territories[0].dice_count = 8;
        controller.select_territory(0);
        controller.attack(1);
        assert!(controller.take_map_refresh());
        assert!(!controller.take_map_refresh());
    }
}
