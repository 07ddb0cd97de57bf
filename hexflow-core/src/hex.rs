//! Hex board topology with axial coordinates
//!
//! Cells are `(row, col)` pairs; a cell is on a board of radius `R` when
//! `|row| <= R`, `|col| <= R` and `|row + col| <= R`.

use std::fmt;
use std::ops::Add;

use serde::{Deserialize, Serialize};

use crate::error::BoardError;

/// Board radius used when nothing else is configured (37 cells)
pub const DEFAULT_RADIUS: u8 = 3;

/// Largest supported radius (169 cells)
pub const MAX_RADIUS: u8 = 7;

/// Direction vectors in axial coordinates (d_row, d_col)
/// Index: 0=NE, 1=NW, 2=W, 3=SW, 4=SE, 5=E
pub const DIRECTIONS: [(i8, i8); 6] = [
    (1, 0),   // NE
    (1, -1),  // NW
    (0, -1),  // W
    (-1, 0),  // SW
    (-1, 1),  // SE
    (0, 1),   // E
];

// ============================================================================
// COORDINATES
// ============================================================================

/// Axial hex coordinates
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HexPos {
    pub row: i8,
    pub col: i8,
}

impl HexPos {
    pub const fn new(row: i8, col: i8) -> Self {
        Self { row, col }
    }

    /// Adjacent coordinate in `direction`, whether or not it is on the board
    pub fn neighbor(self, direction: Direction) -> HexPos {
        let (dr, dc) = direction.delta();
        HexPos::new(self.row + dr, self.col + dc)
    }

    /// Rotate 60 degrees about the center, carrying direction `d` onto `d + 1`
    fn rotated_once(self) -> HexPos {
        HexPos::new(self.row + self.col, -self.row)
    }

    fn unrotated_once(self) -> HexPos {
        HexPos::new(-self.col, self.row + self.col)
    }

    /// Rotate about the board center
    pub fn rotated(self, rotation: Rotation) -> HexPos {
        (0..rotation.steps()).fold(self, |pos, _| pos.rotated_once())
    }
}

impl fmt::Display for HexPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.row, self.col)
    }
}

// ============================================================================
// ROTATION
// ============================================================================

/// Number of 60 degree steps, always in 0..6
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rotation(u8);

impl Rotation {
    pub const ZERO: Rotation = Rotation(0);
    pub const HALF_TURN: Rotation = Rotation(3);
    pub const ALL: [Rotation; 6] = [
        Rotation(0),
        Rotation(1),
        Rotation(2),
        Rotation(3),
        Rotation(4),
        Rotation(5),
    ];

    /// Wraps modulo 6
    pub const fn new(steps: u8) -> Self {
        Rotation(steps % 6)
    }

    pub const fn steps(self) -> u8 {
        self.0
    }

    /// Rotation that undoes this one
    pub const fn reversed(self) -> Self {
        Rotation((6 - self.0) % 6)
    }
}

impl Add for Rotation {
    type Output = Rotation;

    fn add(self, rhs: Rotation) -> Rotation {
        Rotation::new(self.0 + rhs.0)
    }
}

impl TryFrom<u8> for Rotation {
    type Error = BoardError;

    fn try_from(steps: u8) -> Result<Self, BoardError> {
        if steps < 6 {
            Ok(Rotation(steps))
        } else {
            Err(BoardError::InvalidRotation(steps))
        }
    }
}

impl From<Rotation> for u8 {
    fn from(rotation: Rotation) -> u8 {
        rotation.0
    }
}

// ============================================================================
// DIRECTION
// ============================================================================

/// One of the six sides of a hex, counter-clockwise from north-east
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    NorthEast = 0,
    NorthWest = 1,
    West = 2,
    SouthWest = 3,
    SouthEast = 4,
    East = 5,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::NorthEast,
        Direction::NorthWest,
        Direction::West,
        Direction::SouthWest,
        Direction::SouthEast,
        Direction::East,
    ];

    /// Wraps modulo 6
    pub const fn from_index(index: u8) -> Self {
        Self::ALL[(index % 6) as usize]
    }

    pub const fn index(self) -> u8 {
        self as u8
    }

    pub const fn rotate(self, rotation: Rotation) -> Self {
        Self::from_index(self as u8 + rotation.steps())
    }

    pub const fn opposite(self) -> Self {
        self.rotate(Rotation::HALF_TURN)
    }

    /// (d_row, d_col) to the adjacent cell
    pub const fn delta(self) -> (i8, i8) {
        DIRECTIONS[self as usize]
    }
}

// ============================================================================
// BOARD EDGES
// ============================================================================

/// One of the six sides of the board.
///
/// Edge `k` faces outward through directions `k - 1` and `k`; edge 0 holds the
/// cells with `row + col == R`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Edge(u8);

impl Edge {
    pub const ALL: [Edge; 6] = [Edge(0), Edge(1), Edge(2), Edge(3), Edge(4), Edge(5)];

    /// Wraps modulo 6
    pub const fn new(index: u8) -> Self {
        Edge(index % 6)
    }

    pub const fn index(self) -> u8 {
        self.0
    }

    pub const fn opposite(self) -> Self {
        Edge::new(self.0 + 3)
    }

    /// Rotation carrying edge 0 onto this edge
    pub const fn rotation(self) -> Rotation {
        Rotation::new(self.0)
    }

    /// The two directions that leave the board through this edge
    pub const fn outward_directions(self) -> [Direction; 2] {
        [Direction::from_index(self.0 + 5), Direction::from_index(self.0)]
    }
}

impl TryFrom<u8> for Edge {
    type Error = BoardError;

    fn try_from(index: u8) -> Result<Self, BoardError> {
        if index < 6 {
            Ok(Edge(index))
        } else {
            Err(BoardError::InvalidEdge(index))
        }
    }
}

impl From<Edge> for u8 {
    fn from(edge: Edge) -> u8 {
        edge.0
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "edge {}", self.0)
    }
}

/// A boundary cell side through which flow enters from outside the board
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntryPoint {
    pub position: HexPos,
    pub direction: Direction,
}

// ============================================================================
// TOPOLOGY
// ============================================================================

/// Cell enumeration and edge tables for one board radius
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Topology {
    radius: u8,
    /// All cells, row-major (row ascending, then col ascending)
    cells: Vec<HexPos>,
    /// Dense index of the first cell of each row, indexed by `row + R`
    row_starts: Vec<usize>,
    entry_points: [Vec<EntryPoint>; 6],
}

impl Topology {
    pub fn new(radius: u8) -> Result<Self, BoardError> {
        if radius == 0 || radius > MAX_RADIUS {
            return Err(BoardError::InvalidRadius(radius));
        }

        let r = radius as i8;
        let mut cells = Vec::new();
        let mut row_starts = Vec::with_capacity(2 * radius as usize + 1);
        for row in -r..=r {
            row_starts.push(cells.len());
            let (lo, hi) = col_range(r, row);
            cells.extend((lo..=hi).map(|col| HexPos::new(row, col)));
        }

        let entry_points = Edge::ALL.map(|edge| edge_entries(r, edge));

        Ok(Self {
            radius,
            cells,
            row_starts,
            entry_points,
        })
    }

    pub fn radius(&self) -> u8 {
        self.radius
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// All on-board cells in row-major order
    pub fn cells(&self) -> &[HexPos] {
        &self.cells
    }

    pub fn is_on_board(&self, pos: HexPos) -> bool {
        // Widened so extreme i8 coordinates cannot overflow
        let (row, col, r) = (i16::from(pos.row), i16::from(pos.col), i16::from(self.radius));
        row.abs() <= r && col.abs() <= r && (row + col).abs() <= r
    }

    /// Dense row-major index of an on-board cell
    pub fn index(&self, pos: HexPos) -> Option<usize> {
        if !self.is_on_board(pos) {
            return None;
        }
        let r = self.radius as i8;
        let (lo, _) = col_range(r, pos.row);
        Some(self.row_starts[(pos.row + r) as usize] + (pos.col - lo) as usize)
    }

    /// Adjacent on-board cell, or `None` when `direction` leaves the board
    pub fn neighbor(&self, pos: HexPos, direction: Direction) -> Option<HexPos> {
        let next = pos.neighbor(direction);
        self.is_on_board(next).then_some(next)
    }

    /// Entry points of `edge`, starting at its corner cell
    pub fn edge_entry_points(&self, edge: Edge) -> &[EntryPoint] {
        &self.entry_points[edge.index() as usize]
    }

    /// Boundary cells of `edge` in entry-point order
    pub fn edge_cells(&self, edge: Edge) -> Vec<HexPos> {
        let mut cells: Vec<HexPos> = self
            .edge_entry_points(edge)
            .iter()
            .map(|entry| entry.position)
            .collect();
        cells.dedup();
        cells
    }

    pub fn is_on_edge(&self, pos: HexPos, edge: Edge) -> bool {
        if !self.is_on_board(pos) {
            return false;
        }
        let base = (0..edge.index()).fold(pos, |p, _| p.unrotated_once());
        base.row + base.col == self.radius as i8
    }
}

/// Inclusive column bounds of `row` on a board of radius `r`
fn col_range(r: i8, row: i8) -> (i8, i8) {
    ((-r).max(-r - row), r.min(r - row))
}

/// Edge 0 runs (R,0), (R-1,1), ..., (0,R). The corner (R,0) also faces
/// direction 0, which belongs to edge 1, so it contributes one entry.
fn edge_entries(r: i8, edge: Edge) -> Vec<EntryPoint> {
    let rotation = edge.rotation();
    let [first, second] = Edge::new(0).outward_directions();

    let mut entries = Vec::with_capacity(2 * r as usize + 1);
    for i in 0..=r {
        let position = HexPos::new(r - i, i).rotated(rotation);
        entries.push(EntryPoint {
            position,
            direction: first.rotate(rotation),
        });
        if i > 0 {
            entries.push(EntryPoint {
                position,
                direction: second.rotate(rotation),
            });
        }
    }
    entries
}

// ============================================================================
// VISITED SETS
// ============================================================================

/// Bitset over `(cell, direction)` pairs of one topology
#[derive(Clone, Debug)]
pub struct DirectedCellSet {
    words: Vec<u64>,
}

impl DirectedCellSet {
    pub fn new(topology: &Topology) -> Self {
        let bits = topology.cell_count() * 6;
        Self {
            words: vec![0; bits.div_ceil(64)],
        }
    }

    fn bit(topology: &Topology, pos: HexPos, direction: Direction) -> Option<usize> {
        topology
            .index(pos)
            .map(|index| index * 6 + direction.index() as usize)
    }

    /// Returns true if the pair was not already present. Off-board cells are
    /// never stored.
    pub fn insert(&mut self, topology: &Topology, pos: HexPos, direction: Direction) -> bool {
        let Some(bit) = Self::bit(topology, pos, direction) else {
            return false;
        };
        let (word, mask) = (bit / 64, 1u64 << (bit % 64));
        let fresh = self.words[word] & mask == 0;
        self.words[word] |= mask;
        fresh
    }

    pub fn contains(&self, topology: &Topology, pos: HexPos, direction: Direction) -> bool {
        Self::bit(topology, pos, direction)
            .is_some_and(|bit| self.words[bit / 64] & (1u64 << (bit % 64)) != 0)
    }
}
