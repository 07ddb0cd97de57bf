//! Integration tests for the HEXFLOW rules engine
//!
//! Tests the full stack: topology, flows, legality, scoring, game state, AI,
//! and the `hexflow` binary

use std::process::Command;

use hexflow_core::{
    best_move, blocked_players, calculate_flows, check_move, seating, trace_flow, Action, Board,
    Direction, GameSettings, GameState, HexPos, LegalityMode, MoveVerdict, Outcome, PlacedTile,
    Rotation, ScoringAi, TileKind, TraceEnd,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

// ============================================================================
// TEST FIXTURES
// ============================================================================

fn tile(kind: TileKind, rotation: u8, row: i8, col: i8) -> PlacedTile {
    PlacedTile::new(kind, Rotation::new(rotation), HexPos::new(row, col))
}

/// ThreeSharps rotation 0 on the `row + col == 0` line, minus the center
fn open_wall() -> Board {
    Board::from_tiles(
        3,
        [-3, -2, -1, 1, 2, 3]
            .into_iter()
            .map(|r| tile(TileKind::ThreeSharps, 0, r, -r)),
    )
    .unwrap()
}

fn temp_file(name: &str, content: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!("hexflow-{}-{}", std::process::id(), name));
    std::fs::write(&path, content).unwrap();
    path
}

// ============================================================================
// ENGINE SCENARIOS
// ============================================================================

#[test]
fn test_corner_tile_scenario() {
    let board = Board::from_tiles(3, [tile(TileKind::NoSharps, 0, 3, 0)]).unwrap();
    let players = seating(2);
    let flows = calculate_flows(&board, &players);

    let home = flows.flow(0).unwrap();
    assert_eq!(home.positions.len(), 1);
    assert_eq!(home.edges.len(), 2);
    assert!(flows.flow(1).unwrap().is_empty());

    let trace = trace_flow(&board, HexPos::new(3, 0), Direction::East, 0);
    assert_eq!(trace.end, TraceEnd::EmptyCell(HexPos::new(2, 0)));
}

#[test]
fn test_wall_scenario() {
    let board = open_wall();
    let players = seating(2);
    let closing = tile(TileKind::ThreeSharps, 0, 0, 0);
    assert_eq!(blocked_players(&board, &closing, &players).unwrap(), vec![0, 1]);

    // The scorer never proposes the closing move
    let best = best_move(&board, TileKind::ThreeSharps, &players[0], &players, LegalityMode::Independent)
        .unwrap();
    assert_ne!(best.tile, closing);
}

#[test]
fn test_contention_is_stricter() {
    let mut rng = ChaCha8Rng::seed_from_u64(21);
    let players = seating(2);
    let mut board = Board::new(3).unwrap();
    for _ in 0..20 {
        let vacant: Vec<HexPos> = board.vacant_cells().collect();
        let candidate = PlacedTile::new(
            TileKind::ALL[rng.gen_range(0..4)],
            Rotation::new(rng.gen_range(0..6)),
            vacant[rng.gen_range(0..vacant.len())],
        );
        let contention = check_move(&board, &candidate, &players, LegalityMode::Contention).unwrap();
        let independent = check_move(&board, &candidate, &players, LegalityMode::Independent).unwrap();
        if contention.is_legal() {
            assert_eq!(independent, MoveVerdict::Legal);
            board.place(candidate).unwrap();
        }
    }
}

// ============================================================================
// GAME FLOW
// ============================================================================

#[test]
fn test_self_play_all_player_counts() {
    for num_players in 2..=6 {
        let state = GameState::new(GameSettings {
            num_players,
            board_radius: 2,
            tiles_per_kind: 5,
            ..GameSettings::default()
        })
        .unwrap();
        let (final_state, actions) = ScoringAi::with_seed(num_players as u64).play_game(state);
        assert!(final_state.is_over(), "{} players", num_players);
        assert!(actions.iter().any(|a| matches!(a, Action::PlaceTile { .. })));
    }
}

#[test]
fn test_history_round_trips_through_json() {
    let settings = GameSettings {
        board_radius: 2,
        ..GameSettings::default()
    };
    let (state, actions) = ScoringAi::with_seed(8).play_game(GameState::new(settings.clone()).unwrap());

    let json = serde_json::to_string(&actions).unwrap();
    let parsed: Vec<Action> = serde_json::from_str(&json).unwrap();
    let replayed = GameState::from_actions(settings, parsed).unwrap();
    assert_eq!(replayed.board(), state.board());
    assert_eq!(replayed.outcome(), state.outcome());
    assert_ne!(*replayed.outcome(), Outcome::Ongoing);
}

// ============================================================================
// BINARY
// ============================================================================

fn hexflow() -> Command {
    Command::new(env!("CARGO_BIN_EXE_hexflow"))
}

#[test]
fn test_cli_check_reports_blocked_players() {
    let board = open_wall();
    let position = serde_json::json!({
        "radius": 3,
        "num_players": 2,
        "tiles": board.tiles().collect::<Vec<_>>(),
        "candidate": tile(TileKind::ThreeSharps, 0, 0, 0),
    });
    let path = temp_file("wall.json", &position.to_string());

    let output = hexflow()
        .args(["check", "--json", "--position"])
        .arg(&path)
        .output()
        .unwrap();
    std::fs::remove_file(&path).ok();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["verdict"]["Blocked"]["players"], serde_json::json!([0, 1]));
    assert_eq!(report["players"][0]["viable"], serde_json::json!(false));
}

#[test]
fn test_cli_play_json() {
    let output = hexflow()
        .args(["play", "--radius", "2", "--seed", "5", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["seed"], serde_json::json!(5));
    assert_eq!(report["settings"]["board_radius"], serde_json::json!(2));
    assert_ne!(report["outcome"], serde_json::json!("Ongoing"));
}

#[test]
fn test_cli_rejects_bad_settings() {
    let output = hexflow().args(["play", "--players", "9"]).output().unwrap();
    assert!(!output.status.success());
}

#[test]
fn test_cli_batch_accepts_game_settings() {
    let output = hexflow()
        .args(["batch", "--games", "2", "--radius", "1", "--players", "3", "--contention", "--seed", "4"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Total games: 2"));
    assert!(stdout.contains("Player 2 wins"));
}

#[test]
fn test_cli_check_rejects_bad_rotation() {
    let position = serde_json::json!({
        "radius": 3,
        "num_players": 2,
        "tiles": [],
        "candidate": { "kind": "NoSharps", "rotation": 9, "position": { "row": 0, "col": 0 } },
    });
    let path = temp_file("bad-rotation.json", &position.to_string());
    let output = hexflow()
        .args(["check", "--position"])
        .arg(&path)
        .output()
        .unwrap();
    std::fs::remove_file(&path).ok();
    assert!(!output.status.success());
}
