//! Move evaluation built on the viability search

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::error::BoardError;
use crate::game::Player;
use crate::legality::{position_verdict, LegalityMode};
use crate::tiles::{PlacedTile, TileKind};
use crate::viability::viability_report;

/// Reward for each witness-path cell already covered by a tile
pub const OCCUPIED_CELL_SCORE: i32 = 1;

/// Penalty for each witness-path cell still left to fill
pub const EMPTY_CELL_SCORE: i32 = -2;

/// A legal placement and its score
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredMove {
    pub tile: PlacedTile,
    pub score: i32,
}

impl ScoredMove {
    /// Ordering key: higher score first, then lowest (row, col, rotation)
    fn beats(&self, other: &ScoredMove) -> bool {
        let key = |m: &ScoredMove| (m.tile.position, m.tile.rotation);
        self.score > other.score || (self.score == other.score && key(self) < key(other))
    }
}

/// Score of the player's shortest remaining path on `board`, or `None` if
/// the player has no path
pub fn path_score(board: &Board, player: &Player) -> Option<i32> {
    let report = viability_report(board, player, player.target_edge());
    if !report.has_path {
        return None;
    }
    Some(
        report
            .path_to_target
            .iter()
            .map(|&pos| {
                if board.is_vacant(pos) {
                    EMPTY_CELL_SCORE
                } else {
                    OCCUPIED_CELL_SCORE
                }
            })
            .sum(),
    )
}

/// Score `candidate` for `player` as if it were placed
pub fn score_move(
    board: &Board,
    candidate: &PlacedTile,
    player: &Player,
) -> Result<Option<i32>, BoardError> {
    let after = board.with_tile(*candidate)?;
    Ok(path_score(&after, player))
}

/// Every vacant cell in row-major order times each distinct rotation
pub fn candidate_tiles(board: &Board, kind: TileKind) -> Vec<PlacedTile> {
    let rotations = kind.distinct_rotations();
    board
        .vacant_cells()
        .flat_map(|pos| {
            rotations
                .iter()
                .map(move |&rotation| PlacedTile::new(kind, rotation, pos))
        })
        .collect()
}

/// Legal score for one candidate; each call works on its own board copy
fn evaluate_candidate(
    board: &Board,
    candidate: PlacedTile,
    player: &Player,
    players: &[Player],
    mode: LegalityMode,
) -> Option<ScoredMove> {
    let after = board.with_tile(candidate).ok()?;
    if !position_verdict(&after, players, mode).is_legal() {
        return None;
    }
    let score = path_score(&after, player)?;
    tracing::trace!(
        "candidate {:?} r{} at {} scores {}",
        candidate.kind,
        candidate.rotation.steps(),
        candidate.position,
        score
    );
    Some(ScoredMove {
        tile: candidate,
        score,
    })
}

/// Highest-scoring legal placement of `kind` for `player`, or `None` if no
/// placement is legal
pub fn best_move(
    board: &Board,
    kind: TileKind,
    player: &Player,
    players: &[Player],
    mode: LegalityMode,
) -> Option<ScoredMove> {
    let candidates = candidate_tiles(board, kind);
    let scored = score_candidates(board, &candidates, player, players, mode);
    scored.into_iter().fold(None, |best, m| match best {
        Some(b) if !m.beats(&b) => Some(b),
        _ => Some(m),
    })
}

#[cfg(not(feature = "parallel"))]
fn score_candidates(
    board: &Board,
    candidates: &[PlacedTile],
    player: &Player,
    players: &[Player],
    mode: LegalityMode,
) -> Vec<ScoredMove> {
    candidates
        .iter()
        .filter_map(|&c| evaluate_candidate(board, c, player, players, mode))
        .collect()
}

#[cfg(feature = "parallel")]
fn score_candidates(
    board: &Board,
    candidates: &[PlacedTile],
    player: &Player,
    players: &[Player],
    mode: LegalityMode,
) -> Vec<ScoredMove> {
    use rayon::prelude::*;

    // Indexed collect keeps candidate order, so the fold stays deterministic
    candidates
        .par_iter()
        .filter_map(|&c| evaluate_candidate(board, c, player, players, mode))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::seating;
    use crate::hex::{HexPos, Rotation};

    #[test]
    fn test_empty_board_path_score() {
        let board = Board::new(3).unwrap();
        let player = seating(2)[0];
        assert_eq!(path_score(&board, &player), Some(7 * EMPTY_CELL_SCORE));
    }

    #[test]
    fn test_score_move_counts_new_tile() {
        // ThreeSharps wall on row + col == 0 with the center open; an
        // east-west straight there is the only crossing
        let tiles = [-3, -2, -1, 1, 2, 3].into_iter().map(|r| {
            PlacedTile::new(TileKind::ThreeSharps, Rotation::ZERO, HexPos::new(r, -r))
        });
        let board = Board::from_tiles(3, tiles).unwrap();
        let player = seating(2)[0];
        let straight = PlacedTile::new(TileKind::NoSharps, Rotation::new(1), HexPos::new(0, 0));
        assert_eq!(
            score_move(&board, &straight, &player).unwrap(),
            Some(OCCUPIED_CELL_SCORE + 6 * EMPTY_CELL_SCORE)
        );

        let off_board = PlacedTile::new(TileKind::NoSharps, Rotation::ZERO, HexPos::new(5, 0));
        assert_eq!(
            score_move(&board, &off_board, &player),
            Err(BoardError::InvalidPosition(HexPos::new(5, 0)))
        );
    }

    #[test]
    fn test_unviable_player_has_no_score() {
        let tiles = (-3..=2).map(|r| {
            PlacedTile::new(TileKind::ThreeSharps, Rotation::ZERO, HexPos::new(r, -r))
        });
        let board = Board::from_tiles(3, tiles).unwrap();
        let closing = PlacedTile::new(TileKind::ThreeSharps, Rotation::ZERO, HexPos::new(3, -3));
        let player = seating(2)[0];
        assert_eq!(score_move(&board, &closing, &player).unwrap(), None);
    }

    #[test]
    fn test_candidates_skip_duplicate_rotations() {
        let board = Board::new(1).unwrap();
        assert_eq!(candidate_tiles(&board, TileKind::ThreeSharps).len(), 7 * 2);
        assert_eq!(candidate_tiles(&board, TileKind::OneSharp).len(), 7 * 6);
    }

    #[test]
    fn test_best_move_is_legal_and_maximal() {
        let board = Board::new(2).unwrap();
        let players = seating(2);
        let player = players[0];
        let best = best_move(&board, TileKind::NoSharps, &player, &players, LegalityMode::Independent)
            .unwrap();

        for candidate in candidate_tiles(&board, TileKind::NoSharps) {
            if let Some(score) = score_move(&board, &candidate, &player).unwrap() {
                assert!(score <= best.score);
                if score == best.score {
                    assert!((best.tile.position, best.tile.rotation) <= (candidate.position, candidate.rotation));
                }
            }
        }
        assert!(is_legal(&board, &best.tile, &players));
    }

    fn is_legal(board: &Board, tile: &PlacedTile, players: &[Player]) -> bool {
        crate::legality::is_legal_move(board, tile, players).unwrap()
    }

    #[test]
    fn test_winning_candidate_is_scored() {
        // The center tile completes player 0's row and strands player 1
        let tile = |rotation, row, col| {
            PlacedTile::new(TileKind::NoSharps, Rotation::new(rotation), HexPos::new(row, col))
        };
        let board = Board::from_tiles(
            1,
            [tile(1, 0, 1), tile(1, 0, -1), tile(0, 1, -1), tile(0, -1, 0)],
        )
        .unwrap();
        let players = seating(3);
        let winning = tile(1, 0, 0);

        for mode in [LegalityMode::Independent, LegalityMode::Contention] {
            let scored = evaluate_candidate(&board, winning, &players[0], &players, mode).unwrap();
            assert_eq!(scored.tile, winning);
            assert!(best_move(&board, TileKind::NoSharps, &players[0], &players, mode).is_some());
        }
    }

    #[test]
    fn test_best_move_none_on_full_board() {
        // A full board offers no candidates
        let board = Board::from_tiles(
            1,
            Board::new(1)
                .unwrap()
                .topology()
                .cells()
                .iter()
                .map(|&pos| PlacedTile::new(TileKind::NoSharps, Rotation::ZERO, pos)),
        )
        .unwrap();
        let players = seating(2);
        assert_eq!(
            best_move(&board, TileKind::OneSharp, &players[0], &players, LegalityMode::Independent),
            None
        );
    }

    #[test]
    fn test_best_move_is_repeatable() {
        let board = Board::from_tiles(
            3,
            [PlacedTile::new(TileKind::TwoSharps, Rotation::new(1), HexPos::new(1, 1))],
        )
        .unwrap();
        let players = seating(2);
        let first = best_move(&board, TileKind::OneSharp, &players[1], &players, LegalityMode::Contention);
        assert!(first.is_some());
        assert_eq!(
            first,
            best_move(&board, TileKind::OneSharp, &players[1], &players, LegalityMode::Contention)
        );
    }
}
