//! Batch command - many self-play games in parallel
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_batch(), report_results()
//! - Level 3: play_single_game(), compute_statistics()
//! - Level 4: progress bar and formatting

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use hexflow_core::{GameSettings, GameState, Outcome, ScoringAi};

use crate::play_cmd::{resolve_settings, SettingsArgs};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct BatchArgs {
    /// Number of games to play
    #[arg(long, default_value = "20")]
    pub games: usize,

    #[command(flatten)]
    pub game: SettingsArgs,
}

/// Result of a single game
#[derive(Clone, Debug)]
struct GameRecord {
    outcome: Outcome,
    actions: usize,
}

/// Aggregated batch results
#[derive(Clone, Debug)]
struct BatchResults {
    games: usize,
    /// Indexed by player id
    wins: Vec<usize>,
    shared_wins: usize,
    draws: usize,
    avg_actions: f32,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

pub fn run(args: BatchArgs, seed: Option<u64>) -> Result<()> {
    let settings = resolve_settings(&args.game)?;
    // Fail on bad settings before spinning up workers
    GameState::new(settings.clone()).context("Invalid game settings")?;
    let base_seed = seed.unwrap_or_else(rand::random);

    tracing::info!(
        "Starting batch: {} games, {} players, radius {}, {:?} legality, base seed {}",
        args.games,
        settings.num_players,
        settings.board_radius,
        settings.legality,
        base_seed
    );

    let records = play_batch(&settings, args.games, base_seed)?;
    let results = compute_statistics(&records, settings.num_players);
    report_results(&results);
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Game `i` uses seed `base_seed + i`, so any game can be replayed alone
fn play_batch(settings: &GameSettings, games: usize, base_seed: u64) -> Result<Vec<GameRecord>> {
    let progress = create_progress_bar(games as u64);

    let records = (0..games as u64)
        .into_par_iter()
        .map(|i| {
            let record = play_single_game(settings, base_seed.wrapping_add(i));
            progress.inc(1);
            record
        })
        .collect::<Result<Vec<_>>>()?;

    progress.finish_and_clear();
    Ok(records)
}

fn report_results(results: &BatchResults) {
    println!("\n=== Batch Results ===");
    println!("Total games: {}", results.games);
    for (player, &wins) in results.wins.iter().enumerate() {
        println!("Player {} wins: {} ({:.1}%)", player, wins, percent(wins, results.games));
    }
    println!(
        "Shared wins: {} ({:.1}%)",
        results.shared_wins,
        percent(results.shared_wins, results.games)
    );
    println!("Draws:       {} ({:.1}%)", results.draws, percent(results.draws, results.games));
    println!("Avg actions: {:.1}", results.avg_actions);
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn play_single_game(settings: &GameSettings, seed: u64) -> Result<GameRecord> {
    let state = GameState::new(settings.clone())?;
    let (final_state, actions) = ScoringAi::with_seed(seed).play_game(state);
    tracing::debug!("seed {}: {:?}", seed, final_state.outcome());
    Ok(GameRecord {
        outcome: final_state.outcome().clone(),
        actions: actions.len(),
    })
}

fn compute_statistics(records: &[GameRecord], num_players: usize) -> BatchResults {
    let mut wins = vec![0; num_players];
    let mut shared_wins = 0;
    let mut draws = 0;

    for record in records {
        match &record.outcome {
            Outcome::Victory(winners) => {
                for &winner in winners {
                    if let Some(count) = wins.get_mut(winner as usize) {
                        *count += 1;
                    }
                }
                if winners.len() > 1 {
                    shared_wins += 1;
                }
            }
            Outcome::Draw | Outcome::Ongoing => draws += 1,
        }
    }

    let total_actions: usize = records.iter().map(|r| r.actions).sum();
    let avg_actions = if records.is_empty() {
        0.0
    } else {
        total_actions as f32 / records.len() as f32
    };

    BatchResults {
        games: records.len(),
        wins,
        shared_wins,
        draws,
        avg_actions,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn create_progress_bar(len: u64) -> ProgressBar {
    let bar = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} games ({eta})") {
        bar.set_style(style.progress_chars("=> "));
    }
    bar
}

fn percent(count: usize, total: usize) -> f32 {
    if total == 0 {
        0.0
    } else {
        count as f32 * 100.0 / total as f32
    }
}
