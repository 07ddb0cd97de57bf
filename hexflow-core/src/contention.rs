//! Contention search: can all players route at once without sharing?
//!
//! Players claim potential paths in turn. A later player may not cross a
//! hex side an earlier path claimed, and where paths meet in an empty cell
//! their combined chord demands must still fit on a single tile.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;

use crate::board::Board;
use crate::game::{Player, PlayerId};
use crate::hex::{DirectedCellSet, Direction, HexPos, Topology};
use crate::tiles::{realizable, Chord};

/// Sides and empty-cell chords taken by paths claimed so far
struct Claims {
    sides: DirectedCellSet,
    demands: FxHashMap<HexPos, Vec<Chord>>,
}

impl Claims {
    fn new(topology: &Topology) -> Self {
        Self {
            sides: DirectedCellSet::new(topology),
            demands: FxHashMap::default(),
        }
    }

    fn side_taken(&self, topology: &Topology, pos: HexPos, direction: Direction) -> bool {
        let (pos, direction) = canonical_side(topology, pos, direction);
        self.sides.contains(topology, pos, direction)
    }

    fn claim_side(&mut self, topology: &Topology, pos: HexPos, direction: Direction) {
        let (pos, direction) = canonical_side(topology, pos, direction);
        self.sides.insert(topology, pos, direction);
    }

    /// Some tile must still carry `chord` plus every chord already claimed
    /// in the empty cell at `pos`
    fn accepts(&self, pos: HexPos, chord: Chord) -> bool {
        match self.demands.get(&pos) {
            Some(existing) => realizable(existing.iter().chain(std::iter::once(&chord))),
            None => true,
        }
    }
}

/// Both cells sharing a side name it; pick the smaller (cell, direction)
fn canonical_side(topology: &Topology, pos: HexPos, direction: Direction) -> (HexPos, Direction) {
    match topology.neighbor(pos, direction) {
        Some(other) if (other, direction.opposite()) < (pos, direction) => (other, direction.opposite()),
        _ => (pos, direction),
    }
}

struct Node {
    position: HexPos,
    entry: Direction,
    parent: Option<usize>,
}

/// Verify that the players can claim non-conflicting paths.
///
/// Players go in input order; if one fails, the order is retried once with
/// that player first. Returns the player that could not route on the retry.
pub fn contended_player(board: &Board, players: &[Player]) -> Option<PlayerId> {
    let failed = claim_in_order(board, players.iter())?;
    let retry = players
        .iter()
        .filter(|p| p.id == failed)
        .chain(players.iter().filter(|p| p.id != failed));
    claim_in_order(board, retry)
}

fn claim_in_order<'a, I>(board: &Board, order: I) -> Option<PlayerId>
where
    I: IntoIterator<Item = &'a Player>,
{
    let mut claims = Claims::new(board.topology());
    for player in order {
        let Some(path) = find_path(board, player, &claims) else {
            return Some(player.id);
        };
        claim_path(board, &path, &mut claims);
    }
    None
}

/// BFS over `(cell, entry)` states that respects earlier claims. Returns the
/// states from the home edge to the first target-edge cell.
fn find_path(board: &Board, player: &Player, claims: &Claims) -> Option<Vec<(HexPos, Direction)>> {
    let topology = board.topology();
    let target = player.target_edge();
    let mut seen = DirectedCellSet::new(topology);
    let mut nodes: Vec<Node> = Vec::new();
    let mut queue = VecDeque::new();

    for entry in topology.edge_entry_points(player.home_edge) {
        if claims.side_taken(topology, entry.position, entry.direction) {
            continue;
        }
        if seen.insert(topology, entry.position, entry.direction) {
            nodes.push(Node {
                position: entry.position,
                entry: entry.direction,
                parent: None,
            });
            queue.push_back(nodes.len() - 1);
        }
    }

    while let Some(index) = queue.pop_front() {
        let (pos, entry) = (nodes[index].position, nodes[index].entry);
        if topology.is_on_edge(pos, target) {
            return Some(states_back(&nodes, index));
        }

        let tile = board.tile(pos);
        for exit in Direction::ALL {
            let allowed = match tile {
                Some(tile) => tile.exit_direction(entry) == Some(exit),
                None => exit != entry && claims.accepts(pos, (entry, exit)),
            };
            if !allowed || claims.side_taken(topology, pos, exit) {
                continue;
            }
            let Some(next) = topology.neighbor(pos, exit) else {
                continue;
            };
            if seen.insert(topology, next, exit.opposite()) {
                nodes.push(Node {
                    position: next,
                    entry: exit.opposite(),
                    parent: Some(index),
                });
                queue.push_back(nodes.len() - 1);
            }
        }
    }

    None
}

fn states_back(nodes: &[Node], mut index: usize) -> Vec<(HexPos, Direction)> {
    let mut states = vec![(nodes[index].position, nodes[index].entry)];
    while let Some(parent) = nodes[index].parent {
        states.push((nodes[parent].position, nodes[parent].entry));
        index = parent;
    }
    states.reverse();
    states
}

fn claim_path(board: &Board, path: &[(HexPos, Direction)], claims: &mut Claims) {
    let topology = board.topology();
    for (i, &(pos, entry)) in path.iter().enumerate() {
        claims.claim_side(topology, pos, entry);
        let Some(&(_, next_entry)) = path.get(i + 1) else {
            continue;
        };
        let exit = next_entry.opposite();
        claims.claim_side(topology, pos, exit);
        if board.tile(pos).is_none() {
            claims.demands.entry(pos).or_default().push((entry, exit));
        }
    }
}
