//! Game settings, loadable from JSON

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::hex::DEFAULT_RADIUS;
use crate::legality::LegalityMode;

/// Everything needed to start a game
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// 2 to 6
    pub num_players: usize,
    /// 1 to 7
    pub board_radius: u8,
    /// Starting count of each tile kind in the bag
    pub tiles_per_kind: u32,
    pub legality: LegalityMode,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            num_players: 2,
            board_radius: DEFAULT_RADIUS,
            tiles_per_kind: 10,
            legality: LegalityMode::Independent,
        }
    }
}

impl GameSettings {
    /// Load from a JSON file; missing fields take their defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        let settings = serde_json::from_str(&content)
            .with_context(|| format!("parsing settings in {}", path.display()))?;
        Ok(settings)
    }

    /// Save to JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("writing settings to {}", path.display()))?;
        Ok(())
    }
}
