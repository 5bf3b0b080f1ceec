//! Technology catalog.
//!
//! Technologies are pure data: an era, a cost, prerequisites, and one
//! effect. The tree logic in [`crate::tech`] interprets them; nothing here
//! mutates anything.

use serde::{Deserialize, Serialize};

use crate::economy::{ResourceKind, Stockpile};
use crate::player::Age;

/// Combat stat a bonus can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum BonusStat {
    Attack,
    Defense,
    Range,
    Speed,
}

/// Effect of researching a technology.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TechEffect {
    /// Multiply one gathering rate.
    GatherRate {
        /// Affected wallet resource.
        resource: ResourceKind,
        /// Multiplier applied to the base rate (e.g. 1.15 for +15%).
        multiplier: f64,
    },
    /// Add to one combat bonus.
    CombatBonus {
        /// Affected stat.
        stat: BonusStat,
        /// Additive amount (e.g. 0.10 for +10%).
        amount: f64,
    },
    /// Add to the night vision bonus.
    NightVision {
        /// Additional visibility range at night.
        amount: f64,
    },
}

/// A researchable technology definition.
#[derive(Debug, Clone, Copy)]
pub struct TechDef {
    /// Unique string identifier.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Display description.
    pub description: &'static str,
    /// Era the technology belongs to.
    pub age: Age,
    /// Research cost.
    pub cost: Stockpile,
    /// Technology ids that must be researched first.
    pub requires: &'static [&'static str],
    /// What the research does.
    pub effect: TechEffect,
}

/// The full technology catalog, ordered by era.
pub const TECHNOLOGIES: &[TechDef] = &[
    // Initial age
    TechDef {
        id: "woodcutting",
        name: "Woodcutting Techniques",
        description: "Increases wood gathering efficiency by 15%",
        age: Age::Initial,
        cost: Stockpile::cost(75.0, 0.0, 0.0, 0.0),
        requires: &[],
        effect: TechEffect::GatherRate {
            resource: ResourceKind::Wood,
            multiplier: 1.15,
        },
    },
    TechDef {
        id: "farming",
        name: "Basic Agriculture",
        description: "Increases food gathering efficiency by 15%",
        age: Age::Initial,
        cost: Stockpile::cost(50.0, 75.0, 0.0, 0.0),
        requires: &[],
        effect: TechEffect::GatherRate {
            resource: ResourceKind::Food,
            multiplier: 1.15,
        },
    },
    // Feudal age
    TechDef {
        id: "double_bit_axe",
        name: "Double-Bit Axe",
        description: "Increases wood gathering efficiency by 20%",
        age: Age::Feudal,
        cost: Stockpile::cost(100.0, 50.0, 0.0, 0.0),
        requires: &["woodcutting"],
        effect: TechEffect::GatherRate {
            resource: ResourceKind::Wood,
            multiplier: 1.2,
        },
    },
    TechDef {
        id: "horse_collar",
        name: "Horse Collar",
        description: "Increases food gathering efficiency by 20%",
        age: Age::Feudal,
        cost: Stockpile::cost(75.0, 75.0, 0.0, 0.0),
        requires: &["farming"],
        effect: TechEffect::GatherRate {
            resource: ResourceKind::Food,
            multiplier: 1.2,
        },
    },
    TechDef {
        id: "scale_armor",
        name: "Scale Armor",
        description: "Increases military unit defense by 10%",
        age: Age::Feudal,
        cost: Stockpile::cost(100.0, 0.0, 0.0, 50.0),
        requires: &[],
        effect: TechEffect::CombatBonus {
            stat: BonusStat::Defense,
            amount: 0.1,
        },
    },
    // Castle age
    TechDef {
        id: "bow_saw",
        name: "Bow Saw",
        description: "Increases wood gathering efficiency by 25%",
        age: Age::Castle,
        cost: Stockpile::cost(150.0, 100.0, 0.0, 0.0),
        requires: &["double_bit_axe"],
        effect: TechEffect::GatherRate {
            resource: ResourceKind::Wood,
            multiplier: 1.25,
        },
    },
    TechDef {
        id: "heavy_plow",
        name: "Heavy Plow",
        description: "Increases food gathering efficiency by 25%",
        age: Age::Castle,
        cost: Stockpile::cost(125.0, 125.0, 0.0, 0.0),
        requires: &["horse_collar"],
        effect: TechEffect::GatherRate {
            resource: ResourceKind::Food,
            multiplier: 1.25,
        },
    },
    TechDef {
        id: "chain_mail",
        name: "Chain Mail",
        description: "Increases military unit defense by 15%",
        age: Age::Castle,
        cost: Stockpile::cost(200.0, 0.0, 0.0, 100.0),
        requires: &["scale_armor"],
        effect: TechEffect::CombatBonus {
            stat: BonusStat::Defense,
            amount: 0.15,
        },
    },
    // Imperial age
    TechDef {
        id: "two_man_saw",
        name: "Two-Man Saw",
        description: "Increases wood gathering efficiency by 30%",
        age: Age::Imperial,
        cost: Stockpile::cost(200.0, 150.0, 0.0, 0.0),
        requires: &["bow_saw"],
        effect: TechEffect::GatherRate {
            resource: ResourceKind::Wood,
            multiplier: 1.3,
        },
    },
    TechDef {
        id: "crop_rotation",
        name: "Crop Rotation",
        description: "Increases food gathering efficiency by 30%",
        age: Age::Imperial,
        cost: Stockpile::cost(250.0, 200.0, 0.0, 0.0),
        requires: &["heavy_plow"],
        effect: TechEffect::GatherRate {
            resource: ResourceKind::Food,
            multiplier: 1.3,
        },
    },
    TechDef {
        id: "plate_mail",
        name: "Plate Mail",
        description: "Increases military unit defense by 20%",
        age: Age::Imperial,
        cost: Stockpile::cost(300.0, 0.0, 0.0, 150.0),
        requires: &["chain_mail"],
        effect: TechEffect::CombatBonus {
            stat: BonusStat::Defense,
            amount: 0.2,
        },
    },
];

/// Look up a technology definition by id.
#[must_use]
pub fn find_tech(id: &str) -> Option<&'static TechDef> {
    TECHNOLOGIES.iter().find(|tech| tech.id == id)
}
