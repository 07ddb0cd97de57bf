//! Game state: seating, tile bag, hands, turns and outcome

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::error::GameError;
use crate::eval::candidate_tiles;
use crate::flow::{calculate_flows, FlowMap};
use crate::hex::Edge;
use crate::legality::{check_move, position_verdict, MoveVerdict};
use crate::settings::GameSettings;
use crate::tiles::{PlacedTile, TileKind};

// ============================================================================
// PLAYERS
// ============================================================================

pub type PlayerId = u8;

/// A seated player; flows start on `home_edge`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub home_edge: Edge,
}

impl Player {
    pub fn target_edge(&self) -> Edge {
        self.home_edge.opposite()
    }
}

/// Home edges by player count, starting at 2 players
const SEATS: [&[u8]; 5] = [
    &[0, 3],
    &[0, 2, 4],
    &[0, 1, 3, 4],
    &[0, 1, 2, 3, 4],
    &[0, 1, 2, 3, 4, 5],
];

/// Players for a game of `num_players`; empty outside 2..=6
pub fn seating(num_players: usize) -> Vec<Player> {
    let Some(edges) = num_players.checked_sub(2).and_then(|i| SEATS.get(i)) else {
        return Vec::new();
    };
    edges
        .iter()
        .enumerate()
        .map(|(i, &edge)| Player {
            id: i as PlayerId,
            home_edge: Edge::new(edge),
        })
        .collect()
}

// ============================================================================
// TILE BAG
// ============================================================================

/// Undrawn tiles, counted per kind
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileBag {
    counts: [u32; 4],
}

impl TileBag {
    pub fn new(per_kind: u32) -> Self {
        Self {
            counts: [per_kind; 4],
        }
    }

    pub fn remaining(&self, kind: TileKind) -> u32 {
        self.counts[kind as usize]
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Pick a kind with odds proportional to what is left; `None` if empty
    pub fn peek_random<R: Rng>(&self, rng: &mut R) -> Option<TileKind> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        let mut pick = rng.gen_range(0..total);
        for kind in TileKind::ALL {
            let count = self.remaining(kind);
            if pick < count {
                return Some(kind);
            }
            pick -= count;
        }
        None
    }

    fn take(&mut self, kind: TileKind) -> Result<(), GameError> {
        let count = &mut self.counts[kind as usize];
        if *count == 0 {
            return Err(GameError::KindExhausted(kind));
        }
        *count -= 1;
        Ok(())
    }
}

// ============================================================================
// ACTIONS AND OUTCOME
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Move a tile from the bag into an empty hand (any player, any time)
    DrawTile { player: PlayerId, kind: TileKind },
    /// Play the held tile; only on the player's turn
    PlaceTile { player: PlayerId, tile: PlacedTile },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Ongoing,
    /// Players whose flow reached the opposite edge, plus whoever sits there
    Victory(Vec<PlayerId>),
    /// The player to move can neither draw nor place
    Draw,
}

// ============================================================================
// GAME STATE
// ============================================================================

#[derive(Clone, Debug)]
pub struct GameState {
    settings: GameSettings,
    board: Board,
    players: Vec<Player>,
    bag: TileBag,
    hands: Vec<Option<TileKind>>,
    /// Index into `players`
    current: usize,
    history: Vec<Action>,
    outcome: Outcome,
}

impl GameState {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    pub fn new(settings: GameSettings) -> Result<Self, GameError> {
        let players = seating(settings.num_players);
        if players.is_empty() {
            return Err(GameError::InvalidPlayerCount(settings.num_players));
        }
        let board = Board::new(settings.board_radius)?;

        let mut state = Self {
            bag: TileBag::new(settings.tiles_per_kind),
            hands: vec![None; players.len()],
            settings,
            board,
            players,
            current: 0,
            history: Vec::new(),
            outcome: Outcome::Ongoing,
        };
        state.check_stalemate();
        Ok(state)
    }

    /// Replay a recorded history
    pub fn from_actions<I>(settings: GameSettings, actions: I) -> Result<Self, GameError>
    where
        I: IntoIterator<Item = Action>,
    {
        let mut state = Self::new(settings)?;
        for action in actions {
            state.apply_action(action)?;
        }
        Ok(state)
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Player whose turn it is to place
    pub fn current_player(&self) -> &Player {
        &self.players[self.current]
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id as usize)
    }

    pub fn hand(&self, id: PlayerId) -> Option<TileKind> {
        self.hands.get(id as usize).copied().flatten()
    }

    pub fn bag(&self) -> &TileBag {
        &self.bag
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    pub fn is_over(&self) -> bool {
        self.outcome != Outcome::Ongoing
    }

    pub fn action_history(&self) -> &[Action] {
        &self.history
    }

    /// Current flows of every player
    pub fn flows(&self) -> FlowMap {
        calculate_flows(&self.board, &self.players)
    }

    /// Pick a kind to draw, weighted by the bag; does not draw it
    pub fn draw_random_tile<R: Rng>(&self, rng: &mut R) -> Option<TileKind> {
        self.bag.peek_random(rng)
    }

    /// Judge a placement under this game's legality mode
    pub fn check_placement(&self, tile: &PlacedTile) -> Result<MoveVerdict, GameError> {
        Ok(check_move(
            &self.board,
            tile,
            &self.players,
            self.settings.legality,
        )?)
    }

    /// True if `kind` can go somewhere without blocking anyone
    pub fn has_legal_placement(&self, kind: TileKind) -> bool {
        candidate_tiles(&self.board, kind).into_iter().any(|tile| {
            self.board
                .with_tile(tile)
                .map(|after| position_verdict(&after, &self.players, self.settings.legality).is_legal())
                .unwrap_or(false)
        })
    }

    // ========================================================================
    // ACTIONS
    // ========================================================================

    /// Validate and apply one action. The state is unchanged on error.
    pub fn apply_action(&mut self, action: Action) -> Result<(), GameError> {
        if self.is_over() {
            return Err(GameError::GameOver);
        }

        match action {
            Action::DrawTile { player, kind } => {
                let seat = self.seat(player)?;
                if self.hands[seat].is_some() {
                    return Err(GameError::HandFull(player));
                }
                self.bag.take(kind)?;
                self.hands[seat] = Some(kind);
            }
            Action::PlaceTile { player, tile } => {
                let seat = self.seat(player)?;
                if seat != self.current {
                    return Err(GameError::WrongTurn {
                        expected: self.current_player().id,
                        actual: player,
                    });
                }
                if self.hands[seat] != Some(tile.kind) {
                    return Err(GameError::NotInHand {
                        player,
                        kind: tile.kind,
                    });
                }
                if let MoveVerdict::Blocked { players } = self.check_placement(&tile)? {
                    return Err(GameError::Blocked(players));
                }

                self.board.place(tile)?;
                self.hands[seat] = None;
                self.update_outcome();
                if !self.is_over() {
                    self.current = (self.current + 1) % self.players.len();
                }
            }
        }

        self.history.push(action);
        if !self.is_over() {
            self.check_stalemate();
        }
        Ok(())
    }

    fn seat(&self, id: PlayerId) -> Result<usize, GameError> {
        let seat = id as usize;
        if seat < self.players.len() {
            Ok(seat)
        } else {
            Err(GameError::UnknownPlayer(id))
        }
    }

    /// Victory if any flow reached its target edge; several players can win
    /// on the same placement
    fn update_outcome(&mut self) {
        let winners = self.flows().winners(self.board.topology(), &self.players);
        if !winners.is_empty() {
            self.outcome = Outcome::Victory(winners);
        }
    }

    /// Draw when the player to move is stuck
    fn check_stalemate(&mut self) {
        let stuck = match self.hands[self.current] {
            None => self.bag.is_empty(),
            Some(kind) => !self.has_legal_placement(kind),
        };
        if stuck {
            self.outcome = Outcome::Draw;
        }
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.board)?;
        writeln!(f, "Bag: {} tiles left", self.bag.total())?;
        for player in &self.players {
            let marker = if player.id == self.current_player().id { '*' } else { ' ' };
            match self.hand(player.id) {
                Some(kind) => writeln!(f, "{} player {} ({}) holds {:?}", marker, player.id, player.home_edge, kind)?,
                None => writeln!(f, "{} player {} ({}) empty hand", marker, player.id, player.home_edge)?,
            }
        }
        writeln!(f, "Outcome: {:?}", self.outcome)
    }
}
