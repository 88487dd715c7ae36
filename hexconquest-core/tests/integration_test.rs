//! Integration tests for the HEXCONQUEST engine
//!
//! Tests the full stack: map generation, controller, AI and replays

use hexconquest_core::{
    find_islands, keep_largest_island_only, GameConfig, GameController, GameState, HexCoord,
    HexGrid, HexGridConfig, PlayerData, PlayerId, Replay, TerritoryData, TerritoryGenerator, TurnPhase,
    MAX_DICE_PER_TERRITORY,
};

// ============================================================================
// TEST FIXTURES
// ============================================================================

fn ai_config(seed: u64) -> GameConfig {
    GameConfig {
        grid_radius: 6,
        player_count: 4,
        target_territory_count: 24,
        starting_dice_per_player: 16,
        ..GameConfig::headless(seed)
    }
}

fn assert_consistent(state: &GameState) {
    for territory in &state.territories {
        let owner = territory.owner.expect("every territory is owned");
        assert!((1..=MAX_DICE_PER_TERRITORY).contains(&territory.dice_count));
        assert!(!state.players[usize::from(owner)].is_eliminated);
    }

    let alive = state.players.iter().filter(|p| !p.is_eliminated).count();
    assert_eq!(state.active_player_count, alive);
    for player in &state.players {
        assert_eq!(player.is_eliminated, state.count_territories_owned(player.id) == 0);
    }

    if let Some(winner) = state.winner {
        assert_eq!(state.phase, TurnPhase::GameOver);
        assert!(state.territories.iter().all(|t| t.is_owned_by(winner)));
    }
}

// ============================================================================
// FULL GAMES
// ============================================================================

#[test]
fn test_ai_games_stay_consistent() {
    for seed in 1..=4 {
        let mut controller = GameController::new(ai_config(seed)).unwrap().with_default_ai();
        controller.play_out(150);
        assert_consistent(controller.state());
        assert!(!controller.action_log().is_empty(), "seed {seed} made no attacks");
    }
}

#[test]
fn test_same_seed_same_game() {
    let play = |seed| {
        let mut controller = GameController::new(ai_config(seed)).unwrap().with_default_ai();
        controller.play_out(80);
        controller
    };

    let a = play(42);
    let b = play(42);
    assert_eq!(a.action_log(), b.action_log());
    assert_eq!(a.state().territories, b.state().territories);
    assert_eq!(a.winner(), b.winner());

    let c = play(43);
    assert_ne!(a.state().territories, c.state().territories);
}

#[test]
fn test_radius_two_one_hex_per_territory() {
    let config = GameConfig {
        grid_radius: 2,
        player_count: 2,
        target_territory_count: 19,
        ..GameConfig::headless(6)
    };
    let controller = GameController::new(config).unwrap();
    let state = controller.state();

    assert_eq!(state.territories.len(), 19);
    for territory in &state.territories {
        assert_eq!(territory.hexes.len(), 1);
        assert_eq!(territory.center_hex, territory.hexes[0]);
        for &n in &territory.neighbors {
            assert!(state.territories[n].neighbors.contains(&territory.id));
            assert_eq!(territory.hexes[0].distance_to(state.territories[n].hexes[0]), 1);
        }
    }
    // Territories alternate between the two players
    let first = state.count_territories_owned(0);
    assert!(first == 9 || first == 10);
}

#[test]
fn test_two_player_capture_ends_game() {
    let mut state = GameState::new(GameConfig {
        player_count: 2,
        human_player_index: Some(0),
        seed: 3,
        ..Default::default()
    });
    for (id, (owner, dice)) in [(0, 8u8), (1, 1u8)].into_iter().enumerate() {
        let mut t = TerritoryData::new(id);
        t.owner = Some(owner as PlayerId);
        t.dice_count = dice;
        t.hexes = vec![HexCoord::new(id as i32, 0)];
        t.center_hex = t.hexes[0];
        t.neighbors = vec![1 - id];
        state.hex_to_territory.insert(t.hexes[0], id);
        state.territories.push(t);
    }
    let grid = HexGrid::from_coords([HexCoord::new(0, 0), HexCoord::new(1, 0)], 24.0);
    let mut controller = GameController::from_parts(grid, state).unwrap();

    assert!(controller.select_territory(0));
    assert!(controller.attack(1));
    assert!(controller.state().players[1].is_eliminated);
    assert_eq!(controller.winner(), Some(0));
    assert_eq!(controller.phase(), TurnPhase::GameOver);
    assert_consistent(controller.state());
}

// ============================================================================
// ISLANDS
// ============================================================================

#[test]
fn test_island_pruned_map_is_playable() {
    let mut coords: Vec<HexCoord> = HexGrid::new(HexGridConfig { radius: 4, hex_size: 24.0 })
        .coords()
        .to_vec();
    coords.extend((0..4).map(|q| HexCoord::new(20 + q, 0)));
    let grid = HexGrid::from_coords(coords, 24.0);

    let mut state = GameState::new(GameConfig {
        player_count: 3,
        target_territory_count: 14,
        starting_dice_per_player: 12,
        keep_largest_island_only: true,
        ..GameConfig::headless(12)
    });
    let mut generator = TerritoryGenerator::new(12);
    generator.generate(&grid, &mut state);
    keep_largest_island_only(&mut state);
    assert_eq!(find_islands(&state).len(), 1);
    assert!(state.territory_at(HexCoord::new(20, 0)).is_none());

    state.players = (0..3).map(|id| PlayerData::new(id, false)).collect();
    state.active_player_count = 3;
    generator.assign_to_players(&mut state);

    let mut controller = GameController::from_parts(grid, state).unwrap().with_default_ai();
    controller.play_out(60);
    assert_consistent(controller.state());
}

// ============================================================================
// REPLAYS
// ============================================================================

#[test]
fn test_replay_file_round_trip() {
    let mut controller = GameController::new(ai_config(99)).unwrap().with_default_ai();
    controller.play_out(40);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("replays").join("game_99.replay");
    Replay::from_controller(&controller).save(&path).unwrap();

    let replay = Replay::load(&path).unwrap();
    assert_eq!(replay.actions.len(), controller.action_log().len());

    let outcome = replay.play().unwrap();
    assert_eq!(outcome.diverged, 0);
    assert_eq!(outcome.applied, replay.actions.len());
    if controller.is_game_over() {
        assert_eq!(outcome.state.territories, controller.state().territories);
    }
}
