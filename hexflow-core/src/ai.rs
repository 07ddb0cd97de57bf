//! Self-play driver using the move scorer

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::eval::best_move;
use crate::game::{Action, GameState};

/// Plays for whoever is to move: draws at random, then places the
/// highest-scoring legal tile
pub struct ScoringAi {
    rng: ChaCha8Rng,
}

impl Default for ScoringAi {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoringAi {
    pub fn new() -> Self {
        Self::with_seed(42)
    }

    /// Seeded tile draws make whole games reproducible
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Next action for the player to move, or `None` if the game is over
    /// or they are stuck
    pub fn choose_action(&mut self, state: &GameState) -> Option<Action> {
        if state.is_over() {
            return None;
        }
        let player = state.current_player();
        let Some(kind) = state.hand(player.id) else {
            let kind = state.draw_random_tile(&mut self.rng)?;
            return Some(Action::DrawTile {
                player: player.id,
                kind,
            });
        };

        let chosen = best_move(
            state.board(),
            kind,
            player,
            state.players(),
            state.settings().legality,
        )?;
        tracing::debug!(
            "player {} places {:?} r{} at {} (score {})",
            player.id,
            chosen.tile.kind,
            chosen.tile.rotation.steps(),
            chosen.tile.position,
            chosen.score
        );
        Some(Action::PlaceTile {
            player: player.id,
            tile: chosen.tile,
        })
    }

    /// Play a complete game
    pub fn play_game(&mut self, initial: GameState) -> (GameState, Vec<Action>) {
        let mut state = initial;
        let mut actions = Vec::new();

        while let Some(action) = self.choose_action(&state) {
            if let Err(err) = state.apply_action(action) {
                tracing::warn!("engine rejected {:?}: {}", action, err);
                break;
            }
            actions.push(action);
        }

        (state, actions)
    }
}
