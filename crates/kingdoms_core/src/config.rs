//! Simulation configuration.
//!
//! All tunable knobs of the world live here so that servers and tests can
//! construct games of any size from one value.

use serde::{Deserialize, Serialize};

/// Configuration for a game world.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// World width in terrain cells (one cell = one world unit).
    pub world_width: u32,
    /// World height in terrain cells.
    pub world_height: u32,
    /// Simulation ticks per second.
    pub tick_rate: u32,
    /// Length of one in-game day in seconds.
    pub day_length: f32,
    /// Maximum members per kingdom.
    pub max_players_per_kingdom: usize,
    /// Fraction of each biome's cells seeded with a resource node.
    pub resource_density: f32,
    /// Random seed for terrain, weather, and events.
    ///
    /// Two games built from the same seed and fed the same commands
    /// produce the same world.
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            world_width: 512,
            world_height: 512,
            tick_rate: 20,
            day_length: 20.0 * 60.0,
            max_players_per_kingdom: 50,
            resource_density: 0.05,
            seed: 12345,
        }
    }
}

impl GameConfig {
    /// Duration of one tick in seconds.
    #[must_use]
    pub fn tick_duration(&self) -> f32 {
        1.0 / self.tick_rate as f32
    }

    /// Set the random seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Create a small world suitable for tests.
    #[must_use]
    pub fn small() -> Self {
        Self {
            world_width: 64,
            world_height: 64,
            ..Default::default()
        }
    }
}
