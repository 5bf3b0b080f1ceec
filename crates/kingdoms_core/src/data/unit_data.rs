//! Unit type definitions and stats.

use serde::{Deserialize, Serialize};

use crate::economy::Stockpile;
use crate::player::Age;

/// Every trainable unit type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum UnitKind {
    Villager,
    Swordsman,
    Spearman,
    Archer,
    Crossbowman,
    Scout,
    Knight,
}

/// Static stats for a unit type.
#[derive(Debug, Clone, Copy)]
pub struct UnitStats {
    /// Maximum health points.
    pub max_health: f32,
    /// Movement speed in world units per second.
    pub speed: f32,
    /// Damage per attack.
    pub attack_damage: f32,
    /// Attack range in world units.
    pub attack_range: f32,
    /// Attacks per second.
    pub attack_speed: f32,
    /// Whether the unit can harvest resource nodes.
    pub can_gather: bool,
    /// Whether the unit can construct buildings.
    pub can_build: bool,
    /// Whether the unit can fight.
    pub can_attack: bool,
    /// Base harvest yield per gathering pulse.
    pub gather_rate: f64,
    /// Maximum carried resources.
    pub max_carry: f64,
    /// Training duration in seconds.
    pub train_time: f32,
    /// Cost debited when the unit is queued for training.
    pub cost: Stockpile,
}

impl UnitKind {
    /// All unit types.
    pub const ALL: [Self; 7] = [
        Self::Villager,
        Self::Swordsman,
        Self::Spearman,
        Self::Archer,
        Self::Crossbowman,
        Self::Scout,
        Self::Knight,
    ];

    /// Wire/display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Villager => "villager",
            Self::Swordsman => "swordsman",
            Self::Spearman => "spearman",
            Self::Archer => "archer",
            Self::Crossbowman => "crossbowman",
            Self::Scout => "scout",
            Self::Knight => "knight",
        }
    }

    /// Age at which the unit becomes available.
    #[must_use]
    pub const fn unlocked_at(self) -> Age {
        match self {
            Self::Villager => Age::Initial,
            Self::Swordsman | Self::Spearman | Self::Archer | Self::Scout => Age::Feudal,
            Self::Crossbowman | Self::Knight => Age::Castle,
        }
    }

    /// Static stats for this unit type.
    #[must_use]
    pub const fn stats(self) -> UnitStats {
        match self {
            Self::Villager => UnitStats {
                max_health: 25.0,
                speed: 60.0,
                attack_damage: 3.0,
                attack_range: 0.0,
                attack_speed: 1.5,
                can_gather: true,
                can_build: true,
                can_attack: true,
                gather_rate: 10.0,
                max_carry: 10.0,
                train_time: 20.0,
                cost: Stockpile::cost(50.0, 0.0, 0.0, 0.0),
            },
            Self::Swordsman => UnitStats {
                max_health: 60.0,
                speed: 50.0,
                attack_damage: 12.0,
                attack_range: 5.0,
                attack_speed: 1.2,
                can_gather: false,
                can_build: false,
                can_attack: true,
                gather_rate: 0.0,
                max_carry: 0.0,
                train_time: 15.0,
                cost: Stockpile::cost(60.0, 0.0, 0.0, 20.0),
            },
            Self::Spearman => UnitStats {
                max_health: 45.0,
                speed: 55.0,
                attack_damage: 8.0,
                attack_range: 10.0,
                attack_speed: 1.5,
                can_gather: false,
                can_build: false,
                can_attack: true,
                gather_rate: 0.0,
                max_carry: 0.0,
                train_time: 12.0,
                cost: Stockpile::cost(35.0, 25.0, 0.0, 0.0),
            },
            Self::Archer => UnitStats {
                max_health: 35.0,
                speed: 60.0,
                attack_damage: 7.0,
                attack_range: 60.0,
                attack_speed: 1.0,
                can_gather: false,
                can_build: false,
                can_attack: true,
                gather_rate: 0.0,
                max_carry: 0.0,
                train_time: 18.0,
                cost: Stockpile::cost(0.0, 30.0, 0.0, 40.0),
            },
            Self::Crossbowman => UnitStats {
                max_health: 40.0,
                speed: 50.0,
                attack_damage: 10.0,
                attack_range: 70.0,
                attack_speed: 0.8,
                can_gather: false,
                can_build: false,
                can_attack: true,
                gather_rate: 0.0,
                max_carry: 0.0,
                train_time: 25.0,
                cost: Stockpile::cost(0.0, 35.0, 0.0, 55.0),
            },
            Self::Scout => UnitStats {
                max_health: 55.0,
                speed: 90.0,
                attack_damage: 5.0,
                attack_range: 5.0,
                attack_speed: 1.5,
                can_gather: false,
                can_build: false,
                can_attack: true,
                gather_rate: 0.0,
                max_carry: 0.0,
                train_time: 30.0,
                cost: Stockpile::cost(80.0, 0.0, 0.0, 0.0),
            },
            Self::Knight => UnitStats {
                max_health: 120.0,
                speed: 70.0,
                attack_damage: 15.0,
                attack_range: 5.0,
                attack_speed: 1.0,
                can_gather: false,
                can_build: false,
                can_attack: true,
                gather_rate: 0.0,
                max_carry: 0.0,
                train_time: 35.0,
                cost: Stockpile::cost(70.0, 0.0, 0.0, 75.0),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_villagers_gather_and_build() {
        for kind in UnitKind::ALL {
            let stats = kind.stats();
            assert_eq!(stats.can_gather, kind == UnitKind::Villager);
            assert_eq!(stats.can_build, kind == UnitKind::Villager);
        }
    }

    #[test]
    fn test_every_unit_has_positive_vitals() {
        for kind in UnitKind::ALL {
            let stats = kind.stats();
            assert!(stats.max_health > 0.0, "{} health", kind.as_str());
            assert!(stats.speed > 0.0, "{} speed", kind.as_str());
            assert!(stats.train_time > 0.0, "{} train time", kind.as_str());
        }
    }
}
