//! Replay command - load a recorded game and play it back

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use hexconquest_core::{PlayerId, Replay};

#[derive(Args, Clone, Debug)]
pub struct ReplayArgs {
    /// Replay file written by `simulate --record`
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Output report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct ReplayReport {
    pub seed: u64,
    pub actions: usize,
    pub applied: usize,
    pub diverged: usize,
    pub winner: Option<PlayerId>,
    pub final_turn: u32,
}

/// Run replay command
pub fn run(args: ReplayArgs) -> Result<()> {
    let report = replay_file(&args.file)?;

    if args.json {
        if let Ok(json) = serde_json::to_string_pretty(&report) {
            println!("{}", json);
        }
    } else {
        println!("\n=== Replay ===");
        println!("Seed:      {}", report.seed);
        println!("Actions:   {}", report.actions);
        println!("Applied:   {}", report.applied);
        println!("Diverged:  {}", report.diverged);
        match report.winner {
            Some(w) => println!("Winner:    Player {}", w),
            None => println!("Winner:    none"),
        }
    }

    if report.diverged > 0 {
        tracing::warn!("{} of {} actions diverged", report.diverged, report.actions);
    }
    Ok(())
}

/// Load and play back a replay file
pub fn replay_file(path: &std::path::Path) -> Result<ReplayReport> {
    let replay = Replay::load(path)
        .with_context(|| format!("Failed to load replay: {}", path.display()))?;
    let outcome = replay
        .play()
        .with_context(|| format!("Replay has an invalid config: {}", path.display()))?;

    Ok(ReplayReport {
        seed: replay.config.seed,
        actions: replay.actions.len(),
        applied: outcome.applied,
        diverged: outcome.diverged,
        winner: outcome.winner,
        final_turn: outcome.state.turn_number,
    })
}
