//! Legality gate: a placement may not seal off any player's last path

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::contention::contended_player;
use crate::error::BoardError;
use crate::flow::calculate_flows;
use crate::game::{Player, PlayerId};
use crate::tiles::PlacedTile;
use crate::viability::has_viable_path;

/// Which blocking rule a game enforces
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegalityMode {
    /// Every player keeps some path of their own
    #[default]
    Independent,
    /// All players keep paths that fit on the board together
    Contention,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveVerdict {
    Legal,
    Blocked { players: Vec<PlayerId> },
}

impl MoveVerdict {
    pub fn is_legal(&self) -> bool {
        matches!(self, MoveVerdict::Legal)
    }

    /// Stranded players, empty when legal
    pub fn blocked(&self) -> &[PlayerId] {
        match self {
            MoveVerdict::Legal => &[],
            MoveVerdict::Blocked { players } => players,
        }
    }
}

/// Judge `candidate` against `board` without modifying it.
///
/// Off-board or occupied positions are caller errors, not verdicts.
pub fn check_move(
    board: &Board,
    candidate: &PlacedTile,
    players: &[Player],
    mode: LegalityMode,
) -> Result<MoveVerdict, BoardError> {
    let after = board.with_tile(*candidate)?;
    let verdict = position_verdict(&after, players, mode);
    if let MoveVerdict::Blocked { players: blocked } = &verdict {
        tracing::debug!(
            "{:?} r{} at {} blocks players {:?}",
            candidate.kind,
            candidate.rotation.steps(),
            candidate.position,
            blocked
        );
    }
    Ok(verdict)
}

/// Verdict for a board that already holds the candidate tile.
///
/// A placement that wins the game is legal whoever it strands.
pub fn position_verdict(board: &Board, players: &[Player], mode: LegalityMode) -> MoveVerdict {
    if !calculate_flows(board, players)
        .winners(board.topology(), players)
        .is_empty()
    {
        return MoveVerdict::Legal;
    }

    let blocked: Vec<PlayerId> = match mode {
        LegalityMode::Independent => players
            .iter()
            .filter(|p| !has_viable_path(board, p, p.target_edge()))
            .map(|p| p.id)
            .collect(),
        LegalityMode::Contention => contended_player(board, players).into_iter().collect(),
    };

    if blocked.is_empty() {
        MoveVerdict::Legal
    } else {
        MoveVerdict::Blocked { players: blocked }
    }
}

pub fn is_legal_move(
    board: &Board,
    candidate: &PlacedTile,
    players: &[Player],
) -> Result<bool, BoardError> {
    Ok(check_move(board, candidate, players, LegalityMode::Independent)?.is_legal())
}

/// Players left without a path, in input order
pub fn blocked_players(
    board: &Board,
    candidate: &PlacedTile,
    players: &[Player],
) -> Result<Vec<PlayerId>, BoardError> {
    match check_move(board, candidate, players, LegalityMode::Independent)? {
        MoveVerdict::Legal => Ok(Vec::new()),
        MoveVerdict::Blocked { players } => Ok(players),
    }
}
