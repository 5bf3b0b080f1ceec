//! Per-player economic and progression state.
//!
//! A [`Player`] is owned exclusively by the game aggregate; entities refer
//! back to it only through its id. Everything that can refuse - unit
//! creation at the population cap, debits without funds - refuses here,
//! before any state changes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::building::Building;
use crate::data::{BuildingKind, UnitKind};
use crate::economy::{ResourceKind, Stockpile};
use crate::error::GameError;
use crate::time_of_day::TimeOfDay;
use crate::unit::Unit;

/// Unique identifier for players (one per connected session).
pub type PlayerId = Uuid;

/// Progression tier gating technologies, units, and buildings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum Age {
    Initial,
    Feudal,
    Castle,
    Imperial,
}

impl Age {
    /// Wire/display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Feudal => "feudal",
            Self::Castle => "castle",
            Self::Imperial => "imperial",
        }
    }

    /// The next age and its advancement cost, or `None` at imperial.
    #[must_use]
    pub fn next_with_cost(self) -> Option<(Self, Stockpile)> {
        match self {
            Self::Initial => Some((Self::Feudal, Stockpile::cost(500.0, 200.0, 0.0, 0.0))),
            Self::Feudal => Some((Self::Castle, Stockpile::cost(800.0, 200.0, 200.0, 0.0))),
            Self::Castle => Some((Self::Imperial, Stockpile::cost(1000.0, 300.0, 300.0, 200.0))),
            Self::Imperial => None,
        }
    }
}

/// Per-resource gathering rate multipliers, as modified by technology.
///
/// These are the *base* rates: day/night and weather scaling are computed
/// from them on demand each tick and never written back, so crossing dawn
/// restores the exact pre-night values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GatheringRates {
    /// Food rate multiplier.
    pub food: f64,
    /// Wood rate multiplier.
    pub wood: f64,
    /// Stone rate multiplier.
    pub stone: f64,
    /// Gold rate multiplier.
    pub gold: f64,
}

impl Default for GatheringRates {
    fn default() -> Self {
        Self {
            food: 1.0,
            wood: 1.0,
            stone: 1.0,
            gold: 1.0,
        }
    }
}

impl GatheringRates {
    /// Rate for one resource kind.
    #[must_use]
    pub const fn rate(&self, kind: ResourceKind) -> f64 {
        match kind {
            ResourceKind::Food => self.food,
            ResourceKind::Wood => self.wood,
            ResourceKind::Stone => self.stone,
            ResourceKind::Gold => self.gold,
        }
    }

    /// Multiply one rate (technology effect).
    pub fn scale(&mut self, kind: ResourceKind, multiplier: f64) {
        let rate = match kind {
            ResourceKind::Food => &mut self.food,
            ResourceKind::Wood => &mut self.wood,
            ResourceKind::Stone => &mut self.stone,
            ResourceKind::Gold => &mut self.gold,
        };
        *rate *= multiplier;
    }
}

/// Additive combat modifiers from technology and events.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CombatBonuses {
    /// Fractional bonus to damage dealt.
    pub attack: f64,
    /// Fractional reduction of damage taken.
    pub defense: f64,
    /// Bonus attack range.
    pub range: f64,
    /// Fractional bonus to movement speed.
    pub speed: f64,
}

/// Per-account economic and progression state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Unique id (matches the session id at the transport layer).
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Display color (hex).
    pub color: String,
    /// Resource wallet. Never negative.
    pub resources: Stockpile,
    /// Current population.
    pub population: u32,
    /// Population cap; never exceeded by unit creation.
    pub population_cap: u32,
    /// Kingdom membership, if any.
    pub kingdom_id: Option<crate::kingdom::KingdomId>,
    /// Whether this player leads their kingdom.
    pub is_kingdom_leader: bool,
    /// Current age.
    pub age: Age,
    /// Researched technology ids.
    pub researched: Vec<String>,
    /// Technology ids currently offered for research.
    pub available_technologies: Vec<String>,
    /// Unit types this player can train.
    pub available_units: Vec<UnitKind>,
    /// Building types this player can construct.
    pub available_buildings: Vec<BuildingKind>,
    /// Tech-modified base gathering rates.
    pub gathering_rates: GatheringRates,
    /// Combat modifiers.
    pub combat_bonuses: CombatBonuses,
    /// Current visibility range, updated from the day/night cycle.
    pub visibility_range: f64,
    /// Extra visibility at night.
    pub night_vision_bonus: f64,
    /// Start position x (town center site).
    pub start_x: f32,
    /// Start position y.
    pub start_y: f32,
}

/// Base visibility range during the day.
const BASE_VISIBILITY: f64 = 10.0;

impl Player {
    /// Create a player with starting resources and the initial unlocks.
    #[must_use]
    pub fn new(id: PlayerId, name: impl Into<String>, start: (f32, f32), color: String) -> Self {
        Self {
            id,
            name: name.into(),
            color,
            resources: Stockpile::cost(200.0, 200.0, 100.0, 100.0),
            population: 0,
            population_cap: 5,
            kingdom_id: None,
            is_kingdom_leader: false,
            age: Age::Initial,
            researched: Vec::new(),
            available_technologies: vec!["woodcutting".into(), "farming".into()],
            available_units: vec![UnitKind::Villager],
            available_buildings: vec![BuildingKind::TownCenter, BuildingKind::House],
            gathering_rates: GatheringRates::default(),
            combat_bonuses: CombatBonuses::default(),
            visibility_range: BASE_VISIBILITY,
            night_vision_bonus: 0.0,
            start_x: start.0,
            start_y: start.1,
        }
    }

    /// Whether the player has unlocked a building type.
    #[must_use]
    pub fn can_build(&self, kind: BuildingKind) -> bool {
        self.available_buildings.contains(&kind)
    }

    /// Whether the player has unlocked a unit type.
    #[must_use]
    pub fn can_train(&self, kind: UnitKind) -> bool {
        self.available_units.contains(&kind)
    }

    /// Night factor applied to one gathering rate when the sun is down.
    ///
    /// Gold is mined underground and suffers least from the dark.
    #[must_use]
    const fn night_factor(kind: ResourceKind) -> f64 {
        match kind {
            ResourceKind::Food => 0.8,
            ResourceKind::Wood | ResourceKind::Stone => 0.7,
            ResourceKind::Gold => 0.9,
        }
    }

    /// Effective gathering rate for one resource right now.
    ///
    /// Base (tech-modified) rate scaled by the day/night factor. Weather
    /// scaling is applied by the world on top of this.
    #[must_use]
    pub fn effective_gathering_rate(&self, kind: ResourceKind, is_day_time: bool) -> f64 {
        let base = self.gathering_rates.rate(kind);
        if is_day_time {
            base
        } else {
            base * Self::night_factor(kind)
        }
    }

    /// Refresh visibility from the day/night cycle.
    pub fn update_visibility(&mut self, time: &TimeOfDay) {
        self.visibility_range = if time.is_day_time {
            BASE_VISIBILITY
        } else {
            (BASE_VISIBILITY * 0.6 + self.night_vision_bonus).max(5.0)
        };
    }

    /// Create a unit of the given kind, consuming one population slot.
    ///
    /// # Errors
    ///
    /// Refused with [`GameError::PopulationCapReached`] when at cap;
    /// population is unchanged in that case.
    pub fn spawn_unit(&mut self, kind: UnitKind, x: f32, y: f32) -> Result<Unit, GameError> {
        if self.population >= self.population_cap {
            return Err(GameError::PopulationCapReached {
                cap: self.population_cap,
            });
        }
        self.population += 1;
        Ok(Unit::new(kind, x, y, self.id))
    }

    /// Free the population slot of a destroyed unit.
    pub fn release_population(&mut self) {
        self.population = self.population.saturating_sub(1);
    }

    /// Create a building foundation at the given position.
    #[must_use]
    pub fn found_building(&self, kind: BuildingKind, x: f32, y: f32) -> Building {
        Building::new(kind, x, y, self.id)
    }

    /// Create the player's starting town center, already constructed.
    #[must_use]
    pub fn found_town_center(&self) -> Building {
        Building::completed(BuildingKind::TownCenter, self.start_x, self.start_y, self.id)
    }

    /// Unlock the units and buildings of a newly reached age.
    pub fn unlock_for_age(&mut self, age: Age) {
        for kind in UnitKind::ALL {
            if kind.unlocked_at() == age && !self.available_units.contains(&kind) {
                self.available_units.push(kind);
            }
        }
        for kind in BuildingKind::ALL {
            if kind.unlocked_at() == age && !self.available_buildings.contains(&kind) {
                self.available_buildings.push(kind);
            }
        }
    }
}

/// Display colors assigned round-robin-by-chance to players and kingdoms.
pub const PLAYER_COLORS: [&str; 8] = [
    "#FF0000", "#0000FF", "#00FF00", "#FFFF00", "#FF00FF", "#00FFFF", "#FFA500", "#800080",
];

#[cfg(test)]
mod tests {
    use super::*;

    fn test_player() -> Player {
        Player::new(Uuid::new_v4(), "ragnar", (10.0, 10.0), "#FF0000".into())
    }

    #[test]
    fn test_spawn_refused_at_cap() {
        let mut player = test_player();
        player.population = player.population_cap;

        let result = player.spawn_unit(UnitKind::Villager, 0.0, 0.0);
        assert!(matches!(
            result,
            Err(GameError::PopulationCapReached { cap: 5 })
        ));
        assert_eq!(player.population, 5);
    }

    #[test]
    fn test_spawn_consumes_population() {
        let mut player = test_player();
        let unit = player.spawn_unit(UnitKind::Villager, 0.0, 0.0).unwrap();
        assert_eq!(player.population, 1);
        assert_eq!(unit.owner, player.id);
    }

    #[test]
    fn test_night_rates_restore_at_day() {
        let mut player = test_player();
        player.gathering_rates.scale(ResourceKind::Wood, 1.15);

        let night = player.effective_gathering_rate(ResourceKind::Wood, false);
        let day = player.effective_gathering_rate(ResourceKind::Wood, true);

        assert!((night - 1.15 * 0.7).abs() < 1e-9);
        assert!((day - 1.15).abs() < 1e-9);

        // A second night does not compound.
        let night_again = player.effective_gathering_rate(ResourceKind::Wood, false);
        assert!((night_again - night).abs() < 1e-9);
    }

    #[test]
    fn test_visibility_by_phase() {
        let mut player = test_player();
        let day = TimeOfDay {
            time: 0.5,
            hour: 12,
            is_day_time: true,
            light_level: 1.0,
            phase: crate::time_of_day::DayPhase::Day,
        };
        let night = TimeOfDay {
            time: 0.9,
            hour: 21,
            is_day_time: false,
            light_level: 0.3,
            phase: crate::time_of_day::DayPhase::Night,
        };

        player.update_visibility(&day);
        assert_eq!(player.visibility_range, 10.0);

        player.update_visibility(&night);
        assert_eq!(player.visibility_range, 6.0);

        player.night_vision_bonus = 3.0;
        player.update_visibility(&night);
        assert_eq!(player.visibility_range, 9.0);
    }

    #[test]
    fn test_age_unlocks() {
        let mut player = test_player();
        assert!(!player.can_build(BuildingKind::Barracks));

        player.age = Age::Feudal;
        player.unlock_for_age(Age::Feudal);
        assert!(player.can_build(BuildingKind::Barracks));
        assert!(player.can_train(UnitKind::Swordsman));
        assert!(!player.can_train(UnitKind::Knight));
    }

    #[test]
    fn test_age_ladder() {
        let (next, cost) = Age::Initial.next_with_cost().unwrap();
        assert_eq!(next, Age::Feudal);
        assert_eq!(cost, Stockpile::cost(500.0, 200.0, 0.0, 0.0));
        assert!(Age::Imperial.next_with_cost().is_none());
    }
}
