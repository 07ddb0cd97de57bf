//! Flow tracing and per-player flow aggregation
//!
//! Flows are a derived view of the board: they are rebuilt from scratch on
//! every call and never cached.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::game::{Player, PlayerId};
use crate::hex::{DirectedCellSet, Direction, Edge, EntryPoint, HexPos, Topology};

/// One tile side carrying a player's flow
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FlowEdge {
    pub position: HexPos,
    pub direction: Direction,
    pub owner: PlayerId,
}

/// Why a traced strand stopped
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraceEnd {
    /// Reached a cell with no tile (or started off the board)
    EmptyCell(HexPos),
    /// The tile had no chord for the entry side
    DeadEnd(HexPos),
    /// Left the board through this cell side
    BoardEdge(EntryPoint),
    /// Came back to a (cell, entry) pair it had already passed
    Loop,
}

/// A single strand followed from one entry side
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    pub owner: PlayerId,
    pub positions: BTreeSet<HexPos>,
    pub edges: BTreeSet<FlowEdge>,
    pub end: TraceEnd,
    /// Tiles passed through, counting repeat visits via other chords
    pub steps: usize,
}

/// Follow the strand entering `start` through side `entry`.
///
/// Each tile has exactly one exit per entry, so this is a straight walk; it
/// stops at an empty cell, a missing chord, the board edge, or a repeated
/// (cell, entry) pair.
pub fn trace_flow(board: &Board, start: HexPos, entry: Direction, owner: PlayerId) -> Trace {
    let topology = board.topology();
    let mut seen = DirectedCellSet::new(topology);
    let mut positions = BTreeSet::new();
    let mut edges = BTreeSet::new();
    let mut steps = 0;

    let (mut pos, mut entry) = (start, entry);
    let end = loop {
        let Some(tile) = board.tile(pos) else {
            break TraceEnd::EmptyCell(pos);
        };
        if !seen.insert(topology, pos, entry) {
            break TraceEnd::Loop;
        }
        let Some(exit) = tile.exit_direction(entry) else {
            break TraceEnd::DeadEnd(pos);
        };

        steps += 1;
        positions.insert(pos);
        edges.insert(FlowEdge { position: pos, direction: entry, owner });
        edges.insert(FlowEdge { position: pos, direction: exit, owner });

        match topology.neighbor(pos, exit) {
            Some(next) => {
                pos = next;
                entry = exit.opposite();
            }
            None => {
                break TraceEnd::BoardEdge(EntryPoint {
                    position: pos,
                    direction: exit,
                })
            }
        }
    };

    Trace {
        owner,
        positions,
        edges,
        end,
        steps,
    }
}

// ============================================================================
// AGGREGATION
// ============================================================================

/// Everything one player's flow currently covers
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flow {
    pub player: PlayerId,
    pub positions: BTreeSet<HexPos>,
    pub edges: BTreeSet<FlowEdge>,
}

impl Flow {
    fn empty(player: PlayerId) -> Self {
        Self {
            player,
            positions: BTreeSet::new(),
            edges: BTreeSet::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn occupies(&self, pos: HexPos) -> bool {
        self.positions.contains(&pos)
    }

    /// Flow edges recorded at one cell, in direction order
    pub fn directions_at(&self, pos: HexPos) -> Vec<Direction> {
        self.edges
            .iter()
            .filter(|edge| edge.position == pos)
            .map(|edge| edge.direction)
            .collect()
    }

    /// True if the flow leaves the board through one of `edge`'s sides
    pub fn reaches(&self, topology: &Topology, edge: Edge) -> bool {
        topology.edge_entry_points(edge).iter().any(|entry| {
            self.edges.contains(&FlowEdge {
                position: entry.position,
                direction: entry.direction,
                owner: self.player,
            })
        })
    }
}

/// Owner of each side of a cell, indexed by direction
pub type EdgeOwners = [Option<PlayerId>; 6];

/// All players' flows plus a per-cell view for rendering
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlowMap {
    /// One entry per player, in input order
    pub flows: Vec<Flow>,
    /// Sides carrying flow; a side shared by several players shows the last
    /// player in input order
    pub edges_by_position: BTreeMap<HexPos, EdgeOwners>,
}

impl FlowMap {
    pub fn flow(&self, player: PlayerId) -> Option<&Flow> {
        self.flows.iter().find(|flow| flow.player == player)
    }

    pub fn owner_at(&self, pos: HexPos, direction: Direction) -> Option<PlayerId> {
        self.edges_by_position
            .get(&pos)
            .and_then(|owners| owners[direction as usize])
    }

    /// Players whose flow reached their target edge, together with whoever is
    /// seated on that edge. Sorted by id, empty while nobody has won.
    pub fn winners(&self, topology: &Topology, players: &[Player]) -> Vec<PlayerId> {
        let mut winners = BTreeSet::new();
        for player in players {
            let reached = self
                .flow(player.id)
                .is_some_and(|flow| flow.reaches(topology, player.target_edge()));
            if !reached {
                continue;
            }
            winners.insert(player.id);
            if let Some(teammate) = players.iter().find(|p| p.home_edge == player.target_edge()) {
                winners.insert(teammate.id);
            }
        }
        winners.into_iter().collect()
    }
}

/// Compute every player's flow from their home edge
pub fn calculate_flows(board: &Board, players: &[Player]) -> FlowMap {
    let flows: Vec<Flow> = players.iter().map(|player| player_flow(board, player)).collect();

    let mut edges_by_position: BTreeMap<HexPos, EdgeOwners> = BTreeMap::new();
    for flow in &flows {
        for edge in &flow.edges {
            edges_by_position.entry(edge.position).or_default()[edge.direction as usize] =
                Some(flow.player);
        }
    }

    FlowMap {
        flows,
        edges_by_position,
    }
}

/// Multi-source walk from every entry point of the player's home edge.
/// Two entries can feed the same (cell, side), so visits are deduplicated.
fn player_flow(board: &Board, player: &Player) -> Flow {
    let topology = board.topology();
    let mut flow = Flow::empty(player.id);
    let mut visited = DirectedCellSet::new(topology);
    let mut queue: VecDeque<(HexPos, Direction)> = topology
        .edge_entry_points(player.home_edge)
        .iter()
        .map(|entry| (entry.position, entry.direction))
        .collect();

    while let Some((pos, entry)) = queue.pop_front() {
        if !visited.insert(topology, pos, entry) {
            continue;
        }
        let Some(exit) = board.tile(pos).and_then(|tile| tile.exit_direction(entry)) else {
            continue;
        };

        flow.positions.insert(pos);
        for direction in [entry, exit] {
            flow.edges.insert(FlowEdge {
                position: pos,
                direction,
                owner: player.id,
            });
        }

        if let Some(next) = topology.neighbor(pos, exit) {
            queue.push_back((next, exit.opposite()));
        }
    }

    flow
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::seating;
    use crate::hex::Rotation;
    use crate::tiles::{PlacedTile, TileKind};
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn place(board: &mut Board, kind: TileKind, rotation: u8, row: i8, col: i8) {
        board
            .place(PlacedTile::new(kind, Rotation::new(rotation), HexPos::new(row, col)))
            .unwrap();
    }

    /// Row 0 filled with straights running east-west
    fn straight_row(radius: u8) -> Board {
        let mut board = Board::new(radius).unwrap();
        let r = radius as i8;
        for col in -r..=r {
            place(&mut board, TileKind::NoSharps, 1, 0, col);
        }
        board
    }

    fn random_board(seed: u64, fill: f64) -> Board {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut board = Board::new(3).unwrap();
        let cells = board.topology().cells().to_vec();
        for pos in cells {
            if rng.gen_bool(fill) {
                let kind = TileKind::ALL[rng.gen_range(0..4)];
                let rotation = Rotation::new(rng.gen_range(0..6));
                board.place(PlacedTile::new(kind, rotation, pos)).unwrap();
            }
        }
        board
    }

    #[test]
    fn test_empty_board_has_empty_flows() {
        let board = Board::new(3).unwrap();
        let flows = calculate_flows(&board, &seating(2));
        assert_eq!(flows.flows.len(), 2);
        assert!(flows.flows.iter().all(Flow::is_empty));
        assert!(flows.edges_by_position.is_empty());
    }

    #[test]
    fn test_corner_tile_joins_home_flow() {
        let mut board = Board::new(3).unwrap();
        place(&mut board, TileKind::NoSharps, 0, 3, 0);
        let players = seating(2);
        let flows = calculate_flows(&board, &players);

        let home = flows.flow(0).unwrap();
        let corner = HexPos::new(3, 0);
        assert!(home.occupies(corner));
        assert_eq!(home.edges.len(), 2);
        assert_eq!(
            home.directions_at(corner),
            vec![Direction::SouthWest, Direction::East]
        );
        assert!(flows.flow(1).unwrap().is_empty());
        assert_eq!(flows.owner_at(corner, Direction::East), Some(0));
        assert_eq!(flows.owner_at(corner, Direction::West), None);
    }

    #[test]
    fn test_trace_straight_row() {
        let board = straight_row(3);
        let trace = trace_flow(&board, HexPos::new(0, 3), Direction::East, 0);
        assert_eq!(trace.positions.len(), 7);
        assert_eq!(trace.edges.len(), 14);
        assert_eq!(trace.steps, 7);
        assert_eq!(
            trace.end,
            TraceEnd::BoardEdge(EntryPoint {
                position: HexPos::new(0, -3),
                direction: Direction::West,
            })
        );
    }

    #[test]
    fn test_trace_stops_at_empty_cell() {
        let mut board = Board::new(3).unwrap();
        place(&mut board, TileKind::NoSharps, 1, 0, 3);
        let trace = trace_flow(&board, HexPos::new(0, 3), Direction::East, 0);
        assert_eq!(trace.end, TraceEnd::EmptyCell(HexPos::new(0, 2)));
        assert_eq!(trace.steps, 1);

        let off_board = trace_flow(&board, HexPos::new(9, 9), Direction::East, 0);
        assert!(off_board.positions.is_empty());
        assert_eq!(off_board.steps, 0);
    }

    #[test]
    fn test_trace_detects_closed_loop() {
        // Ring around the center; the cell in direction d gets a curve
        // joining sides d+2 and d+4
        let mut board = Board::new(3).unwrap();
        for d in Direction::ALL {
            let pos = HexPos::new(0, 0).neighbor(d);
            place(&mut board, TileKind::NoSharps, d.index() + 2, pos.row, pos.col);
        }
        let trace = trace_flow(&board, HexPos::new(1, 0), Direction::West, 0);
        assert_eq!(trace.end, TraceEnd::Loop);
        assert_eq!(trace.positions.len(), 6);
        assert_eq!(trace.steps, 6);
    }

    #[test]
    fn test_flow_reaches_far_edge() {
        let board = straight_row(3);
        let players = seating(2);
        let flows = calculate_flows(&board, &players);
        let topology = board.topology();

        let home = flows.flow(0).unwrap();
        assert!(home.reaches(topology, Edge::new(3)));
        assert!(!home.reaches(topology, Edge::new(1)));
        // The row also touches edge 3, so the second player flows back east
        let other = flows.flow(1).unwrap();
        assert!(other.reaches(topology, Edge::new(0)));
        // Shared sides show the later player
        assert_eq!(flows.owner_at(HexPos::new(0, 0), Direction::East), Some(1));
        assert_eq!(flows.winners(topology, &players), vec![0, 1]);

        // With three seats nobody sits on edge 3, so only player 0 wins
        let three = seating(3);
        assert_eq!(calculate_flows(&board, &three).winners(topology, &three), vec![0]);
        let empty = Board::new(3).unwrap();
        assert!(calculate_flows(&empty, &three).winners(empty.topology(), &three).is_empty());
    }

    #[test]
    fn test_trace_termination_bound() {
        for seed in 0..40 {
            let board = random_board(seed, 0.8);
            let bound = 6 * board.topology().cell_count();
            for &pos in board.topology().cells() {
                for d in Direction::ALL {
                    assert!(trace_flow(&board, pos, d, 0).steps <= bound);
                }
            }
        }
    }

    #[test]
    fn test_aggregate_equals_union_of_traces() {
        for seed in 0..40 {
            let board = random_board(seed, 0.7);
            let players = seating(3);
            let flows = calculate_flows(&board, &players);

            for player in &players {
                let mut positions = BTreeSet::new();
                let mut edges = BTreeSet::new();
                for entry in board.topology().edge_entry_points(player.home_edge) {
                    let trace = trace_flow(&board, entry.position, entry.direction, player.id);
                    positions.extend(trace.positions);
                    edges.extend(trace.edges);
                }
                let flow = flows.flow(player.id).unwrap();
                assert_eq!(flow.positions, positions, "seed {}", seed);
                assert_eq!(flow.edges, edges, "seed {}", seed);
            }
        }
    }

    #[test]
    fn test_flows_are_deterministic() {
        let board = random_board(7, 0.6);
        let mut reversed = Board::new(3).unwrap();
        let tiles: Vec<_> = board.tiles().copied().collect();
        for tile in tiles.into_iter().rev() {
            reversed.place(tile).unwrap();
        }
        let players = seating(4);
        let first = calculate_flows(&board, &players);
        assert_eq!(first, calculate_flows(&board, &players));
        assert_eq!(first, calculate_flows(&reversed, &players));
    }
}
