//! Viability search: can a player still connect home edge to target edge?
//!
//! Empty cells are wildcards (a flow may leave through any side other than
//! the one it came in by); placed tiles must be followed along their chords.
//! The search is a BFS over `(cell, entry side)` states, since a placed tile
//! routes differently depending on where the flow enters it.

use std::collections::{BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::game::Player;
use crate::hex::{DirectedCellSet, Direction, Edge, HexPos};

/// Result of one viability search
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViabilityReport {
    pub has_path: bool,
    /// Shortest witness path, home-edge cell first, target-edge cell last.
    /// Empty when there is no path.
    pub path_to_target: Vec<HexPos>,
    /// Cells the search expanded before stopping
    pub visited: BTreeSet<HexPos>,
}

/// Search node: a cell plus the index of the node it was reached from
struct Node {
    position: HexPos,
    parent: Option<usize>,
}

pub fn has_viable_path(board: &Board, player: &Player, target: Edge) -> bool {
    viability_report(board, player, target).has_path
}

pub fn viability_report(board: &Board, player: &Player, target: Edge) -> ViabilityReport {
    let topology = board.topology();
    let mut seen = DirectedCellSet::new(topology);
    let mut nodes: Vec<Node> = Vec::new();
    let mut queue: VecDeque<(HexPos, Direction, usize)> = VecDeque::new();
    let mut report = ViabilityReport::default();

    for entry in topology.edge_entry_points(player.home_edge) {
        if seen.insert(topology, entry.position, entry.direction) {
            nodes.push(Node {
                position: entry.position,
                parent: None,
            });
            queue.push_back((entry.position, entry.direction, nodes.len() - 1));
        }
    }

    while let Some((pos, entry, node)) = queue.pop_front() {
        report.visited.insert(pos);
        if topology.is_on_edge(pos, target) {
            report.has_path = true;
            report.path_to_target = walk_back(&nodes, node);
            break;
        }

        for exit in exits(board, pos, entry) {
            let Some(next) = topology.neighbor(pos, exit) else {
                continue;
            };
            let next_entry = exit.opposite();
            if seen.insert(topology, next, next_entry) {
                nodes.push(Node {
                    position: next,
                    parent: Some(node),
                });
                queue.push_back((next, next_entry, nodes.len() - 1));
            }
        }
    }

    report
}

/// Sides a flow entering `pos` through `entry` may leave by
fn exits(board: &Board, pos: HexPos, entry: Direction) -> Vec<Direction> {
    match board.tile(pos) {
        Some(tile) => tile.exit_direction(entry).into_iter().collect(),
        None => Direction::ALL.into_iter().filter(|&d| d != entry).collect(),
    }
}

fn walk_back(nodes: &[Node], mut index: usize) -> Vec<HexPos> {
    let mut path = vec![nodes[index].position];
    while let Some(parent) = nodes[index].parent {
        path.push(nodes[parent].position);
        index = parent;
    }
    path.reverse();
    path
}
