//! Check command - judge one candidate placement on a saved position
//!
//! Position files are JSON:
//!
//! ```json
//! {
//!   "radius": 3,
//!   "num_players": 2,
//!   "tiles": [{ "kind": "ThreeSharps", "rotation": 0, "position": { "row": 1, "col": -1 } }],
//!   "candidate": { "kind": "ThreeSharps", "rotation": 0, "position": { "row": 0, "col": 0 } }
//! }
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::{Deserialize, Serialize};

use hexflow_core::{
    check_move, score_move, seating, viability_report, Board, LegalityMode, MoveVerdict,
    PlacedTile, Player, PlayerId,
};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct CheckArgs {
    /// Position JSON file
    #[arg(long, value_name = "FILE")]
    pub position: PathBuf,

    /// Output the verdict as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Deserialize)]
struct Position {
    radius: u8,
    num_players: usize,
    tiles: Vec<PlacedTile>,
    candidate: PlacedTile,
    #[serde(default)]
    legality: LegalityMode,
}

#[derive(Serialize)]
struct PlayerCheck {
    player: PlayerId,
    /// Viable after the candidate is placed
    viable: bool,
    path_length: usize,
    score: Option<i32>,
}

#[derive(Serialize)]
struct CheckReport {
    legality: LegalityMode,
    verdict: MoveVerdict,
    players: Vec<PlayerCheck>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

pub fn run(args: CheckArgs) -> Result<()> {
    let position = load_position(&args.position)?;
    let (board, players) = build_position(&position)?;
    let report = check_candidate(&board, &players, &position)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_text_report(&position.candidate, &report);
    }
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn load_position(path: &Path) -> Result<Position> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read position: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse position: {}", path.display()))
}

fn build_position(position: &Position) -> Result<(Board, Vec<Player>)> {
    let players = seating(position.num_players);
    if players.is_empty() {
        bail!("a game needs 2 to 6 players, got {}", position.num_players);
    }
    let board = Board::from_tiles(position.radius, position.tiles.iter().copied())
        .context("Invalid tiles in position")?;
    Ok((board, players))
}

fn check_candidate(board: &Board, players: &[Player], position: &Position) -> Result<CheckReport> {
    let candidate = &position.candidate;
    let verdict = check_move(board, candidate, players, position.legality)
        .context("Candidate cannot be placed")?;

    let after = board.with_tile(*candidate)?;
    let players = players
        .iter()
        .map(|player| -> Result<PlayerCheck> {
            let report = viability_report(&after, player, player.target_edge());
            Ok(PlayerCheck {
                player: player.id,
                viable: report.has_path,
                path_length: report.path_to_target.len(),
                score: score_move(board, candidate, player)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CheckReport {
        legality: position.legality,
        verdict,
        players,
    })
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn print_text_report(candidate: &PlacedTile, report: &CheckReport) {
    println!(
        "Candidate: {:?} rotation {} at {}",
        candidate.kind,
        candidate.rotation.steps(),
        candidate.position
    );
    match &report.verdict {
        MoveVerdict::Legal => println!("Verdict: legal ({:?})", report.legality),
        MoveVerdict::Blocked { players } => {
            println!("Verdict: illegal ({:?}), blocks players {:?}", report.legality, players)
        }
    }
    for check in &report.players {
        match check.score {
            Some(score) => println!(
                "  player {}: viable, path of {} cells, score {}",
                check.player, check.path_length, score
            ),
            None => println!("  player {}: no path", check.player),
        }
    }
}
