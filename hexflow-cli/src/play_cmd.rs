//! Play command - one self-play game
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: resolve_settings(), play_game(), report_game()
//! - Level 3: summarize_flows()
//! - Level 4: formatting utilities

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use hexflow_core::{
    Action, Board, FlowMap, GameSettings, GameState, LegalityMode, Outcome, PlayerId, ScoringAi,
};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

/// Game settings flags shared by `play` and `batch`
#[derive(Args, Default)]
pub struct SettingsArgs {
    /// Number of players (2-6)
    #[arg(long)]
    pub players: Option<usize>,

    /// Board radius (1-7)
    #[arg(long)]
    pub radius: Option<u8>,

    /// Settings JSON file; other flags override its values
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Enforce the stricter contention legality rule
    #[arg(long)]
    pub contention: bool,
}

#[derive(Args)]
pub struct PlayArgs {
    #[command(flatten)]
    pub game: SettingsArgs,

    /// Output the game as JSON
    #[arg(long)]
    pub json: bool,
}

/// What one player's flow covers at the end of the game
#[derive(Serialize)]
struct FlowSummary {
    player: PlayerId,
    home_edge: u8,
    cells: usize,
    flow_edges: usize,
    reached_target: bool,
}

#[derive(Serialize)]
struct GameReport {
    seed: u64,
    settings: GameSettings,
    outcome: Outcome,
    board: Board,
    flows: Vec<FlowSummary>,
    actions: Vec<Action>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
///
/// 1. Resolve settings from file and flags
/// 2. Play the game
/// 3. Report the final position
pub fn run(args: PlayArgs, seed: Option<u64>) -> Result<()> {
    let settings = resolve_settings(&args.game)?;
    let seed = seed.unwrap_or_else(rand::random);

    tracing::info!(
        "Starting game: {} players, radius {}, {:?} legality, seed {}",
        settings.num_players,
        settings.board_radius,
        settings.legality,
        seed
    );

    let report = play_game(settings, seed)?;
    report_game(&report, args.json)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Settings file (or defaults) with command-line overrides applied
pub fn resolve_settings(args: &SettingsArgs) -> Result<GameSettings> {
    let mut settings = match &args.settings {
        Some(path) => GameSettings::load(path)?,
        None => GameSettings::default(),
    };
    if let Some(players) = args.players {
        settings.num_players = players;
    }
    if let Some(radius) = args.radius {
        settings.board_radius = radius;
    }
    if args.contention {
        settings.legality = LegalityMode::Contention;
    }
    Ok(settings)
}

fn play_game(settings: GameSettings, seed: u64) -> Result<GameReport> {
    let state = GameState::new(settings.clone()).context("Invalid game settings")?;
    let (final_state, actions) = ScoringAi::with_seed(seed).play_game(state);

    tracing::info!(
        "Game finished after {} actions: {:?}",
        actions.len(),
        final_state.outcome()
    );

    Ok(GameReport {
        seed,
        settings,
        outcome: final_state.outcome().clone(),
        board: final_state.board().clone(),
        flows: summarize_flows(&final_state, &final_state.flows()),
        actions,
    })
}

fn report_game(report: &GameReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print_text_report(report);
    }
    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn summarize_flows(state: &GameState, flows: &FlowMap) -> Vec<FlowSummary> {
    let topology = state.board().topology();
    state
        .players()
        .iter()
        .filter_map(|player| {
            let flow = flows.flow(player.id)?;
            Some(FlowSummary {
                player: player.id,
                home_edge: player.home_edge.index(),
                cells: flow.positions.len(),
                flow_edges: flow.edges.len(),
                reached_target: flow.reaches(topology, player.target_edge()),
            })
        })
        .collect()
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn print_text_report(report: &GameReport) {
    println!("\n=== Final Board (seed {}) ===", report.seed);
    print!("{}", report.board);

    println!("\n=== Flows ===");
    for flow in &report.flows {
        println!(
            "Player {} (edge {}): {} cells, {} flow edges{}",
            flow.player,
            flow.home_edge,
            flow.cells,
            flow.flow_edges,
            if flow.reached_target { ", reached target" } else { "" }
        );
    }

    println!("\n=== Outcome ===");
    match &report.outcome {
        Outcome::Victory(winners) => println!("Victory: players {:?}", winners),
        Outcome::Draw => println!("Draw"),
        Outcome::Ongoing => println!("Unfinished"),
    }
    println!("Actions: {}", report.actions.len());
}
