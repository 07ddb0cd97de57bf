//! Tile kinds and their chord tables

use serde::{Deserialize, Serialize};

use crate::hex::{Direction, HexPos, Rotation};

/// A pairing of two tile sides that a flow passes straight through
pub type Chord = (Direction, Direction);

/// Tile kind, named after how many sharp (adjacent-side) turns it carries
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TileKind {
    NoSharps = 0,
    OneSharp = 1,
    TwoSharps = 2,
    ThreeSharps = 3,
}

/// Partner of each side at rotation 0, indexed by kind then direction
const EXITS: [[u8; 6]; 4] = [
    [2, 4, 0, 5, 1, 3], // NoSharps:    0-2, 1-4, 3-5
    [5, 3, 4, 1, 2, 0], // OneSharp:    0-5, 1-3, 2-4
    [5, 4, 3, 2, 1, 0], // TwoSharps:   0-5, 1-4, 2-3
    [5, 2, 1, 4, 3, 0], // ThreeSharps: 0-5, 1-2, 3-4
];

impl TileKind {
    pub const ALL: [TileKind; 4] = [
        TileKind::NoSharps,
        TileKind::OneSharp,
        TileKind::TwoSharps,
        TileKind::ThreeSharps,
    ];

    pub fn num_sharps(self) -> usize {
        self as usize
    }

    pub fn from_num_sharps(sharps: usize) -> Option<Self> {
        Self::ALL.get(sharps).copied()
    }

    /// Partner of `entry` at the given rotation
    pub fn partner(self, rotation: Rotation, entry: Direction) -> Direction {
        let canonical = entry.rotate(rotation.reversed());
        Direction::from_index(EXITS[self as usize][canonical as usize]).rotate(rotation)
    }

    /// The three chords at `rotation`, each ordered low side first
    pub fn chords(self, rotation: Rotation) -> [Chord; 3] {
        let mut chords = [(Direction::NorthEast, Direction::NorthEast); 3];
        let mut n = 0;
        for d in Direction::ALL {
            let other = self.partner(rotation, d);
            if d < other {
                chords[n] = (d, other);
                n += 1;
            }
        }
        debug_assert_eq!(n, 3);
        chords
    }

    /// Rotations that give pairwise different chord sets, lowest first
    pub fn distinct_rotations(self) -> Vec<Rotation> {
        let mut seen: Vec<[Chord; 3]> = Vec::with_capacity(6);
        let mut rotations = Vec::with_capacity(6);
        for rotation in Rotation::ALL {
            let mut chords = self.chords(rotation);
            chords.sort();
            if !seen.contains(&chords) {
                seen.push(chords);
                rotations.push(rotation);
            }
        }
        rotations
    }

    pub fn connects(self, rotation: Rotation, a: Direction, b: Direction) -> bool {
        a != b && self.partner(rotation, a) == b
    }
}

/// True if some kind and rotation carries every chord in `demands` at once
pub fn realizable<'a, I>(demands: I) -> bool
where
    I: IntoIterator<Item = &'a Chord> + Clone,
{
    TileKind::ALL.iter().any(|&kind| {
        Rotation::ALL.iter().any(|&rotation| {
            demands
                .clone()
                .into_iter()
                .all(|&(a, b)| kind.connects(rotation, a, b))
        })
    })
}

/// A tile fixed on the board
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlacedTile {
    pub kind: TileKind,
    pub rotation: Rotation,
    pub position: HexPos,
}

impl PlacedTile {
    pub fn new(kind: TileKind, rotation: Rotation, position: HexPos) -> Self {
        Self {
            kind,
            rotation,
            position,
        }
    }

    pub fn chords(&self) -> [Chord; 3] {
        self.kind.chords(self.rotation)
    }

    /// Side a flow leaves through after entering at `entry`, or `None` if no
    /// chord uses that side
    pub fn exit_direction(&self, entry: Direction) -> Option<Direction> {
        self.chords().iter().find_map(|&(a, b)| {
            if a == entry {
                Some(b)
            } else if b == entry {
                Some(a)
            } else {
                None
            }
        })
    }
}
