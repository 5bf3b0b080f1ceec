//! Building type definitions and stats.

use serde::{Deserialize, Serialize};

use crate::data::unit_data::UnitKind;
use crate::economy::Stockpile;
use crate::player::Age;

/// Every constructible building type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum BuildingKind {
    TownCenter,
    House,
    Barracks,
    ArcheryRange,
    Stable,
    Market,
}

/// Static stats for a building type.
#[derive(Debug, Clone, Copy)]
pub struct BuildingStats {
    /// Maximum health points.
    pub max_health: f32,
    /// Footprint edge length in cells.
    pub size: u32,
    /// Construction effort in worker-seconds.
    pub build_time: f32,
    /// Whether the building has a training queue.
    pub can_train_units: bool,
    /// Population cap increase granted on completion.
    pub population_increase: u32,
    /// Cost debited atomically when construction is ordered.
    pub cost: Stockpile,
}

impl BuildingKind {
    /// All building types.
    pub const ALL: [Self; 6] = [
        Self::TownCenter,
        Self::House,
        Self::Barracks,
        Self::ArcheryRange,
        Self::Stable,
        Self::Market,
    ];

    /// Wire/display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TownCenter => "town_center",
            Self::House => "house",
            Self::Barracks => "barracks",
            Self::ArcheryRange => "archery_range",
            Self::Stable => "stable",
            Self::Market => "market",
        }
    }

    /// Age at which the building becomes available.
    #[must_use]
    pub const fn unlocked_at(self) -> Age {
        match self {
            Self::TownCenter | Self::House => Age::Initial,
            Self::Barracks | Self::ArcheryRange | Self::Market => Age::Feudal,
            Self::Stable => Age::Castle,
        }
    }

    /// Whether carried resources can be deposited here once built.
    #[must_use]
    pub const fn is_drop_off(self) -> bool {
        matches!(self, Self::TownCenter | Self::Market)
    }

    /// Unit types this building can train.
    #[must_use]
    pub const fn trains(self) -> &'static [UnitKind] {
        match self {
            Self::TownCenter => &[UnitKind::Villager],
            Self::Barracks => &[UnitKind::Swordsman, UnitKind::Spearman],
            Self::ArcheryRange => &[UnitKind::Archer, UnitKind::Crossbowman],
            Self::Stable => &[UnitKind::Scout, UnitKind::Knight],
            Self::House | Self::Market => &[],
        }
    }

    /// Static stats for this building type.
    #[must_use]
    pub const fn stats(self) -> BuildingStats {
        match self {
            Self::TownCenter => BuildingStats {
                max_health: 2000.0,
                size: 4,
                build_time: 120.0,
                can_train_units: true,
                population_increase: 0,
                cost: Stockpile::cost(0.0, 300.0, 100.0, 0.0),
            },
            Self::House => BuildingStats {
                max_health: 500.0,
                size: 2,
                build_time: 30.0,
                can_train_units: false,
                population_increase: 5,
                cost: Stockpile::cost(0.0, 50.0, 20.0, 0.0),
            },
            Self::Barracks => BuildingStats {
                max_health: 1000.0,
                size: 3,
                build_time: 50.0,
                can_train_units: true,
                population_increase: 0,
                cost: Stockpile::cost(0.0, 150.0, 0.0, 0.0),
            },
            Self::ArcheryRange => BuildingStats {
                max_health: 900.0,
                size: 3,
                build_time: 45.0,
                can_train_units: true,
                population_increase: 0,
                cost: Stockpile::cost(0.0, 175.0, 0.0, 0.0),
            },
            Self::Stable => BuildingStats {
                max_health: 1000.0,
                size: 3,
                build_time: 50.0,
                can_train_units: true,
                population_increase: 0,
                cost: Stockpile::cost(50.0, 175.0, 0.0, 0.0),
            },
            Self::Market => BuildingStats {
                max_health: 800.0,
                size: 3,
                build_time: 40.0,
                can_train_units: false,
                population_increase: 0,
                cost: Stockpile::cost(0.0, 150.0, 50.0, 0.0),
            },
        }
    }
}
