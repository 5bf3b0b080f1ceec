//! Terrain grid and biome classification.
//!
//! The grid is generated once at world creation from a seeded value noise
//! and is static afterwards, except for moisture, which weather drifts over
//! time. The simulation consumes it only as passability/biome/moisture per
//! cell; fancier noise sources are the map tooling's business.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::economy::NodeKind;

/// Biome classification of a terrain cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum Biome {
    Ocean,
    Beach,
    Forest,
    HighlandForest,
    Plains,
    Savanna,
    Desert,
    Mountain,
    SnowMountain,
    Swamp,
    Hills,
    RockyHills,
}

impl Biome {
    /// All biomes, in canonical order.
    pub const ALL: [Self; 12] = [
        Self::Ocean,
        Self::Beach,
        Self::Forest,
        Self::HighlandForest,
        Self::Plains,
        Self::Savanna,
        Self::Desert,
        Self::Mountain,
        Self::SnowMountain,
        Self::Swamp,
        Self::Hills,
        Self::RockyHills,
    ];

    /// Classify a cell from its elevation and moisture, both `[0, 1]`.
    #[must_use]
    pub fn classify(elevation: f32, moisture: f32) -> Self {
        if elevation < 0.2 {
            return Self::Ocean;
        }
        if elevation < 0.3 {
            return Self::Beach;
        }
        if elevation > 0.8 {
            return if moisture > 0.6 {
                Self::SnowMountain
            } else {
                Self::Mountain
            };
        }
        if elevation > 0.6 {
            if moisture > 0.7 {
                return Self::HighlandForest;
            }
            if moisture > 0.4 {
                return Self::Hills;
            }
            return Self::RockyHills;
        }
        if moisture > 0.8 {
            Self::Swamp
        } else if moisture > 0.6 {
            Self::Forest
        } else if moisture > 0.4 {
            Self::Plains
        } else if moisture > 0.2 {
            Self::Savanna
        } else {
            Self::Desert
        }
    }

    /// Resource node flavors this biome can host.
    #[must_use]
    pub const fn resources(self) -> &'static [NodeKind] {
        match self {
            Self::Ocean => &[NodeKind::Fish, NodeKind::Pearls, NodeKind::Salt],
            Self::Beach => &[NodeKind::Salt, NodeKind::Clay, NodeKind::Fish],
            Self::Forest => &[NodeKind::Wood, NodeKind::Berries, NodeKind::Game, NodeKind::Herbs],
            Self::HighlandForest => &[NodeKind::Wood, NodeKind::Game, NodeKind::Herbs],
            Self::Plains => &[NodeKind::Grain, NodeKind::Cattle, NodeKind::Berries],
            Self::Savanna => &[NodeKind::Grain, NodeKind::Wood, NodeKind::Game],
            Self::Desert => &[NodeKind::Gold, NodeKind::Gems, NodeKind::Stone],
            Self::Mountain => &[NodeKind::Stone, NodeKind::Iron, NodeKind::Coal],
            Self::SnowMountain => &[NodeKind::Silver, NodeKind::Gems, NodeKind::Fur],
            Self::Swamp => &[NodeKind::Herbs, NodeKind::Clay],
            Self::Hills => &[NodeKind::Stone, NodeKind::Iron, NodeKind::Clay],
            Self::RockyHills => &[NodeKind::Stone, NodeKind::Gold, NodeKind::Gems],
        }
    }
}

/// One terrain cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    /// Elevation, `[0, 1]`.
    pub elevation: f32,
    /// Moisture, `[0, 1]`; weather drifts this over time.
    pub moisture: f32,
    /// Biome classification.
    pub biome: Biome,
    /// Whether units can stand here.
    pub passable: bool,
}

/// Down-sampled cell snapshot sent to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileInfo {
    /// Cell x coordinate.
    pub x: u32,
    /// Cell y coordinate.
    pub y: u32,
    /// Biome classification.
    pub biome: Biome,
    /// Whether units can stand here.
    pub passable: bool,
}

/// The static terrain grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainGrid {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
}

impl TerrainGrid {
    /// Generate a terrain grid from a seed.
    ///
    /// Elevation and moisture come from two independent octaves of a
    /// seeded value noise, then each cell is classified into a biome.
    #[must_use]
    pub fn generate(width: u32, height: u32, seed: u64) -> Self {
        let mut tiles = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                let elevation = value_noise(seed, x as f32, y as f32, 0.02);
                let moisture = value_noise(seed.wrapping_add(0x9E37), x as f32, y as f32, 0.012);
                tiles.push(Tile {
                    elevation,
                    moisture,
                    biome: Biome::classify(elevation, moisture),
                    passable: elevation > 0.2,
                });
            }
        }
        Self {
            width,
            height,
            tiles,
        }
    }

    /// Grid width in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Borrow the tile at a cell coordinate.
    #[must_use]
    pub fn tile(&self, x: u32, y: u32) -> Option<&Tile> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.tiles.get((y * self.width + x) as usize)
    }

    /// Mutably borrow the tile at a cell coordinate.
    pub fn tile_mut(&mut self, x: u32, y: u32) -> Option<&mut Tile> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.tiles.get_mut((y * self.width + x) as usize)
    }

    /// Whether a world position lands on a passable cell.
    #[must_use]
    pub fn is_passable(&self, x: f32, y: f32) -> bool {
        if x < 0.0 || y < 0.0 {
            return false;
        }
        self.tile(x as u32, y as u32).is_some_and(|t| t.passable)
    }

    /// Pick a random passable land cell.
    ///
    /// Returns the cell center in world coordinates, or `None` for a map
    /// with no land at all.
    pub fn random_passable_position<R: Rng>(&self, rng: &mut R) -> Option<(f32, f32)> {
        // Rejection sampling with a bounded number of draws, then a linear
        // scan as the fallback for nearly-drowned maps.
        for _ in 0..256 {
            let x = rng.gen_range(0..self.width);
            let y = rng.gen_range(0..self.height);
            if self.tile(x, y).is_some_and(|t| t.passable) {
                return Some((x as f32 + 0.5, y as f32 + 0.5));
            }
        }
        for y in 0..self.height {
            for x in 0..self.width {
                if self.tile(x, y).is_some_and(|t| t.passable) {
                    return Some((x as f32 + 0.5, y as f32 + 0.5));
                }
            }
        }
        None
    }

    /// Cells of each biome, for resource distribution.
    pub fn cells_by_biome(&self) -> std::collections::HashMap<Biome, Vec<(u32, u32)>> {
        let mut map: std::collections::HashMap<Biome, Vec<(u32, u32)>> =
            std::collections::HashMap::new();
        for y in 0..self.height {
            for x in 0..self.width {
                if let Some(tile) = self.tile(x, y) {
                    map.entry(tile.biome).or_default().push((x, y));
                }
            }
        }
        map
    }

    /// Down-sampled snapshot for the wire.
    ///
    /// Samples every `sample_rate`-th cell in both axes, matching what the
    /// presentation layer actually draws.
    #[must_use]
    pub fn snapshot(&self, sample_rate: u32) -> Vec<Vec<TileInfo>> {
        let step = sample_rate.max(1);
        let mut rows = Vec::new();
        let mut y = 0;
        while y < self.height {
            let mut row = Vec::new();
            let mut x = 0;
            while x < self.width {
                if let Some(tile) = self.tile(x, y) {
                    row.push(TileInfo {
                        x,
                        y,
                        biome: tile.biome,
                        passable: tile.passable,
                    });
                }
                x += step;
            }
            rows.push(row);
            y += step;
        }
        rows
    }
}

/// Deterministic value noise in `[0, 1]`.
///
/// Hash-lattice noise with bilinear interpolation and smoothstep easing;
/// enough structure for biome patches without an external noise crate.
fn value_noise(seed: u64, x: f32, y: f32, scale: f32) -> f32 {
    let sx = x * scale;
    let sy = y * scale;
    let x0 = sx.floor();
    let y0 = sy.floor();
    let fx = smoothstep(sx - x0);
    let fy = smoothstep(sy - y0);

    let v00 = lattice(seed, x0 as i64, y0 as i64);
    let v10 = lattice(seed, x0 as i64 + 1, y0 as i64);
    let v01 = lattice(seed, x0 as i64, y0 as i64 + 1);
    let v11 = lattice(seed, x0 as i64 + 1, y0 as i64 + 1);

    let top = v00 + (v10 - v00) * fx;
    let bottom = v01 + (v11 - v01) * fx;
    top + (bottom - top) * fy
}

fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

/// Hash a lattice point into `[0, 1]`.
fn lattice(seed: u64, x: i64, y: i64) -> f32 {
    let mut h = seed
        .wrapping_mul(0x9E37_79B9_7F4A_7C15)
        .wrapping_add(x as u64)
        .wrapping_mul(0xBF58_476D_1CE4_E5B9)
        .wrapping_add(y as u64)
        .wrapping_mul(0x94D0_49BB_1331_11EB);
    h ^= h >> 31;
    h = h.wrapping_mul(0xD6E8_FEB8_6659_FD93);
    h ^= h >> 32;
    (h & 0xFFFF) as f32 / 65535.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generation_is_deterministic() {
        let a = TerrainGrid::generate(32, 32, 7);
        let b = TerrainGrid::generate(32, 32, 7);
        for y in 0..32 {
            for x in 0..32 {
                assert_eq!(a.tile(x, y), b.tile(x, y));
            }
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = TerrainGrid::generate(32, 32, 7);
        let b = TerrainGrid::generate(32, 32, 8);
        let same = (0..32)
            .flat_map(|y| (0..32).map(move |x| (x, y)))
            .all(|(x, y)| a.tile(x, y) == b.tile(x, y));
        assert!(!same);
    }

    #[test]
    fn test_ocean_is_impassable() {
        let grid = TerrainGrid::generate(64, 64, 42);
        for y in 0..64 {
            for x in 0..64 {
                let tile = grid.tile(x, y).unwrap();
                if tile.biome == Biome::Ocean {
                    assert!(!tile.passable);
                }
            }
        }
    }

    #[test]
    fn test_random_passable_position_is_passable() {
        let grid = TerrainGrid::generate(64, 64, 42);
        let mut rng = StdRng::seed_from_u64(1);
        let (x, y) = grid.random_passable_position(&mut rng).unwrap();
        assert!(grid.is_passable(x, y));
    }

    #[test]
    fn test_out_of_bounds_is_impassable() {
        let grid = TerrainGrid::generate(16, 16, 1);
        assert!(!grid.is_passable(-1.0, 4.0));
        assert!(!grid.is_passable(4.0, 1000.0));
    }

    #[test]
    fn test_snapshot_downsamples() {
        let grid = TerrainGrid::generate(16, 16, 1);
        let snapshot = grid.snapshot(4);
        assert_eq!(snapshot.len(), 4);
        assert_eq!(snapshot[0].len(), 4);
        assert_eq!(snapshot[1][1].x, 4);
        assert_eq!(snapshot[1][1].y, 4);
    }

    #[test]
    fn test_classify_table() {
        assert_eq!(Biome::classify(0.1, 0.5), Biome::Ocean);
        assert_eq!(Biome::classify(0.25, 0.5), Biome::Beach);
        assert_eq!(Biome::classify(0.9, 0.7), Biome::SnowMountain);
        assert_eq!(Biome::classify(0.9, 0.3), Biome::Mountain);
        assert_eq!(Biome::classify(0.5, 0.85), Biome::Swamp);
        assert_eq!(Biome::classify(0.5, 0.65), Biome::Forest);
        assert_eq!(Biome::classify(0.5, 0.5), Biome::Plains);
        assert_eq!(Biome::classify(0.5, 0.3), Biome::Savanna);
        assert_eq!(Biome::classify(0.5, 0.1), Biome::Desert);
    }
}
