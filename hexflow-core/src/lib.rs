//! HEXFLOW Core - Rules engine for the hex flow connection game
//!
//! This crate provides the engine and a thin game layer on top of it:
//! - Board topology (hex grid with axial coordinates, edge entry points)
//! - Tile kinds and their chord tables
//! - Flow tracing and per-player flow aggregation
//! - Viability search and the move legality gate
//! - Move scoring and a self-play AI
//! - Game state: settings, tile bag, turns, outcome

pub mod hex;
pub mod tiles;
pub mod board;
pub mod error;
pub mod flow;
pub mod viability;
pub mod contention;
pub mod legality;
pub mod eval;
pub mod settings;
pub mod game;
pub mod ai;

// Re-exports for convenient access
pub use hex::{Direction, Edge, EntryPoint, HexPos, Rotation, Topology, DEFAULT_RADIUS, MAX_RADIUS};
pub use tiles::{realizable, Chord, PlacedTile, TileKind};
pub use board::Board;
pub use error::{BoardError, GameError};
pub use flow::{calculate_flows, trace_flow, Flow, FlowEdge, FlowMap, Trace, TraceEnd};
pub use viability::{has_viable_path, viability_report, ViabilityReport};
pub use legality::{blocked_players, check_move, is_legal_move, LegalityMode, MoveVerdict};
pub use eval::{best_move, score_move, ScoredMove};
pub use settings::GameSettings;
pub use game::{seating, Action, GameState, Outcome, Player, PlayerId, TileBag};
pub use ai::ScoringAi;
