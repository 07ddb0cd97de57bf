//! Board snapshot: placed tiles over a fixed topology

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::BoardError;
use crate::hex::{HexPos, Topology};
use crate::tiles::PlacedTile;

/// Tiles on a hex board (clone to mutate).
///
/// Engine functions only read boards; hypothetical moves go through
/// [`Board::with_tile`], which returns a fresh copy.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(into = "BoardSnapshot", try_from = "BoardSnapshot")]
pub struct Board {
    topology: Arc<Topology>,
    /// Sparse representation: position -> tile
    tiles: FxHashMap<HexPos, PlacedTile>,
}

impl Board {
    /// Empty board of the given radius
    pub fn new(radius: u8) -> Result<Self, BoardError> {
        Ok(Self::with_topology(Arc::new(Topology::new(radius)?)))
    }

    /// Empty board sharing an existing topology
    pub fn with_topology(topology: Arc<Topology>) -> Self {
        Self {
            topology,
            tiles: FxHashMap::default(),
        }
    }

    /// Board with the given tiles placed in order
    pub fn from_tiles<I>(radius: u8, tiles: I) -> Result<Self, BoardError>
    where
        I: IntoIterator<Item = PlacedTile>,
    {
        let mut board = Self::new(radius)?;
        for tile in tiles {
            board.place(tile)?;
        }
        Ok(board)
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn radius(&self) -> u8 {
        self.topology.radius()
    }

    /// Get tile at position
    pub fn tile(&self, pos: HexPos) -> Option<&PlacedTile> {
        self.tiles.get(&pos)
    }

    /// On the board and not yet covered
    pub fn is_vacant(&self, pos: HexPos) -> bool {
        self.topology.is_on_board(pos) && !self.tiles.contains_key(&pos)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.tiles.len() == self.topology.cell_count()
    }

    /// Placed tiles in row-major order
    pub fn tiles(&self) -> impl Iterator<Item = &PlacedTile> + '_ {
        self.topology
            .cells()
            .iter()
            .filter_map(move |pos| self.tiles.get(pos))
    }

    /// Vacant cells in row-major order
    pub fn vacant_cells(&self) -> impl Iterator<Item = HexPos> + '_ {
        self.topology
            .cells()
            .iter()
            .copied()
            .filter(move |pos| !self.tiles.contains_key(pos))
    }

    // ========================================================================
    // PLACEMENT
    // ========================================================================

    /// Check that `tile` may go on this board as-is
    pub fn validate(&self, tile: &PlacedTile) -> Result<(), BoardError> {
        if !self.topology.is_on_board(tile.position) {
            return Err(BoardError::InvalidPosition(tile.position));
        }
        if self.tiles.contains_key(&tile.position) {
            return Err(BoardError::Occupied(tile.position));
        }
        Ok(())
    }

    pub fn place(&mut self, tile: PlacedTile) -> Result<(), BoardError> {
        self.validate(&tile)?;
        self.tiles.insert(tile.position, tile);
        Ok(())
    }

    /// Copy of this board with one more tile
    pub fn with_tile(&self, tile: PlacedTile) -> Result<Board, BoardError> {
        let mut board = self.clone();
        board.place(tile)?;
        Ok(board)
    }
}

/// Serialized form: radius plus tiles in row-major order
#[derive(Serialize, Deserialize)]
struct BoardSnapshot {
    radius: u8,
    tiles: Vec<PlacedTile>,
}

impl From<Board> for BoardSnapshot {
    fn from(board: Board) -> Self {
        Self {
            radius: board.radius(),
            tiles: board.tiles().copied().collect(),
        }
    }
}

impl TryFrom<BoardSnapshot> for Board {
    type Error = BoardError;

    fn try_from(snapshot: BoardSnapshot) -> Result<Self, BoardError> {
        Board::from_tiles(snapshot.radius, snapshot.tiles)
    }
}

impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.radius() == other.radius() && self.tiles == other.tiles
    }
}

impl Eq for Board {}

/// One character per cell (`.` for vacant, else the tile's sharp count),
/// north row first, indented into a hexagon
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.radius() as i8;
        for row in (-r..=r).rev() {
            write!(f, "{}", " ".repeat(row.unsigned_abs() as usize))?;
            let cells = self.topology.cells().iter().filter(|pos| pos.row == row);
            for pos in cells {
                match self.tiles.get(pos) {
                    Some(tile) => write!(f, "{} ", tile.kind.num_sharps())?,
                    None => write!(f, ". ")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
