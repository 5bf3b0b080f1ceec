//! Weather state machine.
//!
//! Weather is a world-wide state (`clear`, `rain`, `storm`, or `drought`)
//! with a random intensity and duration. While active it scales gathering
//! and movement, drifts terrain moisture, and - for storms - damages
//! entities that are not weather-proofed.

use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::terrain::TerrainGrid;

/// Weather kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum WeatherKind {
    Clear,
    Rain,
    Storm,
    Drought,
}

impl WeatherKind {
    const ALL: [Self; 4] = [Self::Clear, Self::Rain, Self::Storm, Self::Drought];

    /// Multiplier on gathering yields.
    #[must_use]
    pub const fn resource_multiplier(self) -> f64 {
        match self {
            Self::Clear => 1.0,
            Self::Rain => 0.8,
            Self::Storm => 0.6,
            Self::Drought => 0.5,
        }
    }

    /// Multiplier on movement speed.
    #[must_use]
    pub const fn movement_multiplier(self) -> f32 {
        match self {
            Self::Clear | Self::Drought => 1.0,
            Self::Rain => 0.9,
            Self::Storm => 0.7,
        }
    }

    /// Moisture drift applied to terrain, per full intensity.
    #[must_use]
    pub const fn moisture_effect(self) -> f32 {
        match self {
            Self::Clear => 0.0,
            Self::Rain => 0.2,
            Self::Storm => 0.4,
            Self::Drought => -0.3,
        }
    }

    /// Health damage per second at full intensity, for unprotected entities.
    #[must_use]
    pub const fn damage_per_second(self) -> f32 {
        match self {
            Self::Storm => 1.0,
            _ => 0.0,
        }
    }
}

/// Current weather snapshot, broadcast to clients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherInfo {
    /// Weather kind.
    #[serde(rename = "type")]
    pub kind: WeatherKind,
    /// Intensity, `[0.5, 1.0]`.
    pub intensity: f32,
    /// Seconds until the next weather roll.
    pub duration: f32,
}

/// The weather state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherSystem {
    kind: WeatherKind,
    intensity: f32,
    remaining: f32,
}

impl WeatherSystem {
    /// Start with calm weather for the first stretch of the game.
    #[must_use]
    pub fn new() -> Self {
        Self {
            kind: WeatherKind::Clear,
            intensity: 0.5,
            remaining: 300.0,
        }
    }

    /// Advance the weather clock, rolling new weather when the current
    /// spell runs out, and drift terrain moisture.
    pub fn update(&mut self, delta_time: f32, terrain: &mut TerrainGrid, rng: &mut StdRng) {
        self.remaining -= delta_time;
        if self.remaining <= 0.0 {
            self.roll(rng);
        }
        self.apply_moisture(delta_time, terrain, rng);
    }

    fn roll(&mut self, rng: &mut StdRng) {
        self.kind = WeatherKind::ALL[rng.gen_range(0..WeatherKind::ALL.len())];
        self.intensity = rng.gen_range(0.5..1.0);
        self.remaining = rng.gen_range(300.0..900.0);
        tracing::debug!(kind = ?self.kind, intensity = self.intensity, "Weather changed");
    }

    /// Drift moisture on a bounded random sample of tiles rather than the
    /// whole map every tick.
    fn apply_moisture(&self, delta_time: f32, terrain: &mut TerrainGrid, rng: &mut StdRng) {
        let effect = self.kind.moisture_effect() * self.intensity;
        if effect == 0.0 {
            return;
        }

        let samples = 100.min(terrain.width() * terrain.height());
        let drift = effect * (delta_time / 10.0);
        for _ in 0..samples {
            let x = rng.gen_range(0..terrain.width());
            let y = rng.gen_range(0..terrain.height());
            if let Some(tile) = terrain.tile_mut(x, y) {
                tile.moisture = (tile.moisture + drift).clamp(0.0, 1.0);
            }
        }
    }

    /// Current weather kind.
    #[must_use]
    pub const fn kind(&self) -> WeatherKind {
        self.kind
    }

    /// Gathering multiplier for the current weather.
    #[must_use]
    pub fn resource_multiplier(&self) -> f64 {
        self.kind.resource_multiplier()
    }

    /// Movement multiplier for the current weather.
    #[must_use]
    pub fn movement_multiplier(&self) -> f32 {
        self.kind.movement_multiplier()
    }

    /// Damage per second dealt to unprotected entities right now.
    #[must_use]
    pub fn damage_per_second(&self) -> f32 {
        self.kind.damage_per_second() * self.intensity
    }

    /// Snapshot for the wire.
    #[must_use]
    pub fn info(&self) -> WeatherInfo {
        WeatherInfo {
            kind: self.kind,
            intensity: self.intensity,
            duration: self.remaining,
        }
    }

    /// Force a weather state. Test hook.
    #[cfg(any(test, feature = "debug-validation"))]
    pub fn force(&mut self, kind: WeatherKind, intensity: f32, duration: f32) {
        self.kind = kind;
        self.intensity = intensity;
        self.remaining = duration;
    }
}

impl Default for WeatherSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_starts_clear() {
        let weather = WeatherSystem::new();
        assert_eq!(weather.kind(), WeatherKind::Clear);
        assert_eq!(weather.damage_per_second(), 0.0);
    }

    #[test]
    fn test_rolls_after_duration() {
        let mut weather = WeatherSystem::new();
        let mut terrain = TerrainGrid::generate(8, 8, 1);
        let mut rng = StdRng::seed_from_u64(3);

        weather.update(301.0, &mut terrain, &mut rng);
        let info = weather.info();
        assert!(info.duration > 0.0);
        assert!(info.intensity >= 0.5 && info.intensity <= 1.0);
    }

    #[test]
    fn test_storm_damages_and_slows() {
        let mut weather = WeatherSystem::new();
        weather.force(WeatherKind::Storm, 1.0, 100.0);
        assert_eq!(weather.damage_per_second(), 1.0);
        assert_eq!(weather.movement_multiplier(), 0.7);
        assert_eq!(weather.resource_multiplier(), 0.6);
    }

    #[test]
    fn test_drought_dries_terrain() {
        let mut weather = WeatherSystem::new();
        weather.force(WeatherKind::Drought, 1.0, 1000.0);
        let mut terrain = TerrainGrid::generate(4, 4, 1);
        let mut rng = StdRng::seed_from_u64(5);

        let before: f32 = (0..4)
            .flat_map(|y| (0..4).map(move |x| (x, y)))
            .map(|(x, y)| terrain.tile(x, y).unwrap().moisture)
            .sum();

        for _ in 0..100 {
            weather.update(1.0, &mut terrain, &mut rng);
        }

        let after: f32 = (0..4)
            .flat_map(|y| (0..4).map(move |x| (x, y)))
            .map(|(x, y)| terrain.tile(x, y).unwrap().moisture)
            .sum();

        assert!(after < before);
    }
}
