//! Error types for board and game operations

use crate::game::PlayerId;
use crate::hex::{HexPos, MAX_RADIUS};
use crate::tiles::TileKind;

/// Caller bugs detected at the engine boundary
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("board radius must be between 1 and {max}, got {0}", max = MAX_RADIUS)]
    InvalidRadius(u8),

    #[error("position {0} is not on the board")]
    InvalidPosition(HexPos),

    #[error("position {0} is already occupied")]
    Occupied(HexPos),

    #[error("rotation must be below 6, got {0}")]
    InvalidRotation(u8),

    #[error("board edge must be below 6, got {0}")]
    InvalidEdge(u8),
}

/// Reasons an action is rejected by a running game
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("a game needs 2 to 6 players, got {0}")]
    InvalidPlayerCount(usize),

    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    #[error("game is already over")]
    GameOver,

    #[error("it is player {expected}'s turn, not player {actual}'s")]
    WrongTurn { expected: PlayerId, actual: PlayerId },

    #[error("player {0} already holds a tile")]
    HandFull(PlayerId),

    #[error("player {player} does not hold a {kind:?} tile")]
    NotInHand { player: PlayerId, kind: TileKind },

    #[error("no {0:?} tiles remain in the bag")]
    KindExhausted(TileKind),

    #[error("illegal move: would block players {0:?}")]
    Blocked(Vec<PlayerId>),

    #[error(transparent)]
    Board(#[from] BoardError),
}
