//! # Kingdoms Core
//!
//! Authoritative simulation core for the Kingdoms multiplayer strategy
//! game.
//!
//! This crate contains **only** simulation logic:
//! - No rendering
//! - No IO or networking
//! - Randomness only through seeded RNGs
//!
//! This separation enables:
//! - Headless server builds
//! - Reproducible simulation tests
//! - Snapshot/restore of running games
//!
//! ## Crate Structure
//!
//! - [`game`] - Top-level orchestrator and command boundary
//! - [`world`] - Entity container, terrain, clocks, command dispatch
//! - [`unit`] / [`building`] / [`economy`] - Entities and the economy
//! - [`player`] / [`kingdom`] - Per-account state and alliances
//! - [`tech`] / [`trade`] / [`events`] - The three game systems
//! - [`data`] - Static stat tables

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod building;
pub mod config;
pub mod data;
pub mod economy;
pub mod entity;
pub mod error;
pub mod events;
pub mod game;
pub mod kingdom;
pub mod player;
pub mod tech;
pub mod terrain;
pub mod time_of_day;
pub mod trade;
pub mod unit;
pub mod weather;
pub mod world;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::building::Building;
    pub use crate::config::GameConfig;
    pub use crate::data::{BuildingKind, UnitKind};
    pub use crate::economy::{NodeKind, ResourceKind, ResourceNode, Stockpile};
    pub use crate::entity::{Entity, EntityId, EntityStorage};
    pub use crate::error::{GameError, Result};
    pub use crate::game::{Command, Game, GameState, Notice, Notification};
    pub use crate::kingdom::{Kingdom, KingdomId};
    pub use crate::player::{Age, Player, PlayerId};
    pub use crate::tech::TechnologyTree;
    pub use crate::time_of_day::{DayPhase, TimeOfDay};
    pub use crate::trade::{TradeId, TradeOffer, TradeStatus, TradeSystem};
    pub use crate::unit::{Unit, UnitAction};
    pub use crate::weather::WeatherKind;
    pub use crate::world::World;
}
