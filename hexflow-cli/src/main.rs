//! HEXFLOW CLI - Command-line interface
//!
//! Commands:
//! - play: Self-play a single game and show the result
//! - check: Judge a candidate placement on a saved position
//! - batch: Self-play many games in parallel and report statistics

mod batch_cmd;
mod check_cmd;
mod play_cmd;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hexflow")]
#[command(about = "HEXFLOW rules engine driver")]
struct Cli {
    /// Random seed for tile draws (random if omitted)
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one self-play game
    Play(play_cmd::PlayArgs),
    /// Check a candidate placement against a saved position
    Check(check_cmd::CheckArgs),
    /// Play many self-play games and report win/draw statistics
    Batch(batch_cmd::BatchArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so --json output stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => play_cmd::run(args, cli.seed),
        Commands::Check(args) => check_cmd::run(args),
        Commands::Batch(args) => batch_cmd::run(args, cli.seed),
    }
}
