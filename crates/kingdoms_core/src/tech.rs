//! Technology tree logic.
//!
//! The catalog itself lives in [`crate::data::tech_data`]; this module
//! validates research requests and applies effects to players. Every
//! failing check returns a structured reason without mutating anything.

use thiserror::Error;

use crate::data::tech_data::{find_tech, TechDef, TechEffect, BonusStat, TECHNOLOGIES};
use crate::player::{Age, Player};

/// Reasons a research request can be refused.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TechError {
    /// No technology with that id.
    #[error("Technology not found")]
    NotFound,

    /// The player's age is below the technology's era.
    #[error("Requires the {required} age or later")]
    AgeTooLow {
        /// Era the technology belongs to.
        required: &'static str,
    },

    /// Already researched.
    #[error("Technology already researched")]
    AlreadyResearched,

    /// Not currently offered to the player.
    #[error("Technology not available")]
    NotAvailable,

    /// A prerequisite has not been researched.
    #[error("Prerequisites not met")]
    PrerequisitesNotMet,

    /// Cannot afford the research cost.
    #[error("Insufficient resources: need {required} {resource}")]
    InsufficientResources {
        /// Missing resource.
        resource: &'static str,
        /// Amount required.
        required: u32,
    },
}

/// The technology tree.
///
/// Stateless over the static catalog; per-player research state lives on
/// the [`Player`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TechnologyTree;

impl TechnologyTree {
    /// Create the tree.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Offer every technology of `age` whose prerequisites are already
    /// researched.
    pub fn unlock_age_technologies(&self, player: &mut Player, age: Age) {
        for tech in TECHNOLOGIES.iter().filter(|t| t.age == age) {
            if self.prerequisites_met(player, tech)
                && !player.researched.iter().any(|id| id == tech.id)
                && !player.available_technologies.iter().any(|id| id == tech.id)
            {
                player.available_technologies.push(tech.id.to_string());
            }
        }
    }

    /// Research a technology for a player.
    ///
    /// Validates, in order: the technology exists, the player's era is
    /// high enough, it is not already researched, it is currently offered,
    /// prerequisites hold, and the cost is affordable. On success the cost
    /// is debited, the effect applied, and newly satisfied dependents are
    /// offered.
    pub fn research(&self, player: &mut Player, tech_id: &str) -> Result<&'static TechDef, TechError> {
        let tech = find_tech(tech_id).ok_or(TechError::NotFound)?;

        if player.age < tech.age {
            return Err(TechError::AgeTooLow {
                required: tech.age.as_str(),
            });
        }
        if player.researched.iter().any(|id| id == tech.id) {
            return Err(TechError::AlreadyResearched);
        }
        if !player.available_technologies.iter().any(|id| id == tech.id) {
            return Err(TechError::NotAvailable);
        }
        if !self.prerequisites_met(player, tech) {
            return Err(TechError::PrerequisitesNotMet);
        }
        if let Some((kind, required, _)) = player.resources.first_shortfall(&tech.cost) {
            return Err(TechError::InsufficientResources {
                resource: kind.as_str(),
                required: required as u32,
            });
        }

        player.resources.debit_all(&tech.cost);
        Self::apply_effect(player, tech.effect);
        player.researched.push(tech.id.to_string());
        player.available_technologies.retain(|id| id != tech.id);
        self.unlock_dependents(player);

        tracing::debug!(player = %player.id, tech = tech.id, "Technology researched");
        Ok(tech)
    }

    fn prerequisites_met(&self, player: &Player, tech: &TechDef) -> bool {
        tech.requires
            .iter()
            .all(|req| player.researched.iter().any(|id| id == req))
    }

    fn apply_effect(player: &mut Player, effect: TechEffect) {
        match effect {
            TechEffect::GatherRate {
                resource,
                multiplier,
            } => player.gathering_rates.scale(resource, multiplier),
            TechEffect::CombatBonus { stat, amount } => {
                let bonus = match stat {
                    BonusStat::Attack => &mut player.combat_bonuses.attack,
                    BonusStat::Defense => &mut player.combat_bonuses.defense,
                    BonusStat::Range => &mut player.combat_bonuses.range,
                    BonusStat::Speed => &mut player.combat_bonuses.speed,
                };
                *bonus += amount;
            }
            TechEffect::NightVision { amount } => player.night_vision_bonus += amount,
        }
    }

    /// Re-scan reachable eras and offer technologies whose prerequisites
    /// have just been satisfied.
    pub fn unlock_dependents(&self, player: &mut Player) {
        for tech in TECHNOLOGIES.iter().filter(|t| t.age <= player.age) {
            if self.prerequisites_met(player, tech)
                && !player.researched.iter().any(|id| id == tech.id)
                && !player.available_technologies.iter().any(|id| id == tech.id)
            {
                player.available_technologies.push(tech.id.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economy::{ResourceKind, Stockpile};
    use uuid::Uuid;

    fn rich_player() -> Player {
        let mut player = Player::new(Uuid::new_v4(), "test", (0.0, 0.0), "#FF0000".into());
        player.resources = Stockpile::cost(10_000.0, 10_000.0, 10_000.0, 10_000.0);
        player
    }

    #[test]
    fn test_research_applies_effect_and_moves_lists() {
        let tree = TechnologyTree::new();
        let mut player = rich_player();

        tree.research(&mut player, "woodcutting").unwrap();

        assert!((player.gathering_rates.rate(ResourceKind::Wood) - 1.15).abs() < 1e-9);
        assert!(player.researched.contains(&"woodcutting".to_string()));
        assert!(!player
            .available_technologies
            .contains(&"woodcutting".to_string()));
    }

    #[test]
    fn test_research_debits_cost() {
        let tree = TechnologyTree::new();
        let mut player = rich_player();
        tree.research(&mut player, "woodcutting").unwrap();
        assert_eq!(player.resources.food, 10_000.0 - 75.0);
    }

    #[test]
    fn test_unaffordable_research_mutates_nothing() {
        let tree = TechnologyTree::new();
        let mut player = Player::new(Uuid::new_v4(), "poor", (0.0, 0.0), "#FF0000".into());
        player.resources = Stockpile::cost(10.0, 0.0, 0.0, 0.0);

        let err = tree.research(&mut player, "woodcutting").unwrap_err();
        assert!(matches!(err, TechError::InsufficientResources { .. }));
        assert_eq!(player.resources.food, 10.0);
        assert!(player.researched.is_empty());
        assert!((player.gathering_rates.rate(ResourceKind::Wood) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_era_gate() {
        let tree = TechnologyTree::new();
        let mut player = rich_player();
        player.available_technologies.push("double_bit_axe".into());

        let err = tree.research(&mut player, "double_bit_axe").unwrap_err();
        assert_eq!(err, TechError::AgeTooLow { required: "feudal" });
    }

    #[test]
    fn test_prerequisite_chain_unlocks_dependents() {
        let tree = TechnologyTree::new();
        let mut player = rich_player();
        player.age = Age::Feudal;
        tree.unlock_age_technologies(&mut player, Age::Feudal);

        // double_bit_axe requires woodcutting, so it is not offered yet.
        assert!(!player
            .available_technologies
            .contains(&"double_bit_axe".to_string()));

        tree.research(&mut player, "woodcutting").unwrap();
        assert!(player
            .available_technologies
            .contains(&"double_bit_axe".to_string()));
    }

    #[test]
    fn test_double_research_rejected() {
        let tree = TechnologyTree::new();
        let mut player = rich_player();
        tree.research(&mut player, "farming").unwrap();
        let err = tree.research(&mut player, "farming").unwrap_err();
        assert_eq!(err, TechError::AlreadyResearched);
    }

    #[test]
    fn test_defense_bonuses_stack_additively() {
        let tree = TechnologyTree::new();
        let mut player = rich_player();
        player.age = Age::Castle;
        tree.unlock_age_technologies(&mut player, Age::Feudal);
        tree.unlock_age_technologies(&mut player, Age::Castle);

        tree.research(&mut player, "scale_armor").unwrap();
        tree.research(&mut player, "chain_mail").unwrap();
        assert!((player.combat_bonuses.defense - 0.25).abs() < 1e-9);
    }
}
