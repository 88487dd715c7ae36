//! HEXCONQUEST CLI - Command-line interface
//!
//! Commands:
//! - simulate: Play one AI-only game
//! - batch: Play many AI games in parallel
//! - replay: Play back a recorded game

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use hexconquest_cli::{batch, replay_cmd, simulate};

#[derive(Parser)]
#[command(name = "hexconquest")]
#[command(about = "HEXCONQUEST territory conquest simulator")]
struct Cli {
    /// Debug-level logging (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one AI-only game
    Simulate(simulate::SimulateArgs),
    /// Play many AI games in parallel
    Batch(batch::BatchArgs),
    /// Play back a replay file
    Replay(replay_cmd::ReplayArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Simulate(args) => simulate::run(args),
        Commands::Batch(args) => batch::run(args),
        Commands::Replay(args) => replay_cmd::run(args),
    }
}
