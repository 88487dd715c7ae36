//! Simulate command - play one AI-only game
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_config(), play_game(), report_summary()
//! - Level 3: summarize()
//! - Level 4: formatting utilities

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use hexconquest_core::{GameConfig, GameController, PlayerId, Replay};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args, Clone, Debug)]
pub struct SimulateArgs {
    /// Game config JSON file (missing fields take defaults)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Grid radius in hexes
    #[arg(long)]
    pub radius: Option<i32>,

    /// Number of players (2-8)
    #[arg(long)]
    pub players: Option<usize>,

    /// Target number of territories
    #[arg(long)]
    pub territories: Option<usize>,

    /// Random seed (0 or omitted = random)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Stop after this many turns without a winner
    #[arg(long, default_value = "500")]
    pub max_turns: u32,

    /// Write a replay of the game to this file
    #[arg(long, value_name = "FILE")]
    pub record: Option<PathBuf>,

    /// Output summary as JSON
    #[arg(long)]
    pub json: bool,
}

/// Final standing of one player
#[derive(Clone, Debug, Serialize)]
pub struct PlayerSummary {
    pub id: PlayerId,
    pub name: String,
    pub territories: usize,
    pub dice: u32,
    pub eliminated: bool,
}

/// What happened in one game
#[derive(Clone, Debug, Serialize)]
pub struct GameSummary {
    pub seed: u64,
    pub winner: Option<PlayerId>,
    pub turns: u32,
    pub attacks: usize,
    pub territories: usize,
    pub players: Vec<PlayerSummary>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run simulate command
pub fn run(args: SimulateArgs) -> Result<()> {
    let config = build_config(&args)?;

    tracing::info!(
        "Simulating: radius {}, {} players, {} territories, max {} turns",
        config.grid_radius,
        config.player_count,
        config.target_territory_count,
        args.max_turns
    );

    let controller = play_game(config, args.max_turns)?;

    if let Some(path) = &args.record {
        Replay::from_controller(&controller)
            .save(path)
            .with_context(|| format!("Failed to write replay: {}", path.display()))?;
        tracing::info!("Replay written to {}", path.display());
    }

    report_summary(&summarize(&controller), args.json);
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Config from file (if any) with command-line overrides; never has a human
pub fn build_config(args: &SimulateArgs) -> Result<GameConfig> {
    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => GameConfig::default(),
    };

    config.human_player_index = None;
    if let Some(radius) = args.radius {
        config.grid_radius = radius;
    }
    if let Some(players) = args.players {
        config.player_count = players;
    }
    if let Some(territories) = args.territories {
        config.target_territory_count = territories;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    config.validate().context("Invalid game config")?;
    Ok(config)
}

/// Build the game and let the AI play it out
pub fn play_game(config: GameConfig, max_turns: u32) -> Result<GameController> {
    let mut controller = GameController::new(config)
        .context("Failed to create game")?
        .with_default_ai();

    match controller.play_out(max_turns) {
        Some(winner) => tracing::info!(
            "Player {} won on turn {}",
            winner,
            controller.turn_number()
        ),
        None => tracing::info!("No winner after {} turns", max_turns),
    }

    Ok(controller)
}

fn report_summary(summary: &GameSummary, json: bool) {
    if json {
        print_json_summary(summary);
    } else {
        print_text_summary(summary);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Standings at the end of a game
pub fn summarize(controller: &GameController) -> GameSummary {
    let state = controller.state();
    GameSummary {
        seed: controller.seed(),
        winner: controller.winner(),
        turns: controller.turn_number(),
        attacks: controller.action_log().len(),
        territories: state.territories.len(),
        players: state
            .players
            .iter()
            .map(|p| PlayerSummary {
                id: p.id,
                name: p.name.clone(),
                territories: state.count_territories_owned(p.id),
                dice: state.count_dice_owned(p.id),
                eliminated: p.is_eliminated,
            })
            .collect(),
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn print_json_summary(summary: &GameSummary) {
    if let Ok(json) = serde_json::to_string_pretty(summary) {
        println!("{}", json);
    }
}

fn print_text_summary(summary: &GameSummary) {
    println!("\n=== Game Summary ===");
    println!("Seed:        {}", summary.seed);
    println!("Turns:       {}", summary.turns);
    println!("Attacks:     {}", summary.attacks);
    match summary.winner {
        Some(w) => println!("Winner:      Player {}", w),
        None => println!("Winner:      none (turn limit)"),
    }
    println!();
    println!("{:<8} {:>11} {:>6}  Status", "Player", "Territories", "Dice");
    for p in &summary.players {
        let status = if p.eliminated { "eliminated" } else { "alive" };
        println!("{:<8} {:>11} {:>6}  {}", p.name, p.territories, p.dice, status);
    }
}
