//! Economy and resource management.
//!
//! Covers the four wallet resources players stockpile, the richer set of
//! node flavors found in the world (each of which deposits into one wallet
//! resource), and the depletable resource nodes themselves.
//!
//! The one hard rule of the economy: **no balance ever goes negative**.
//! Every debit is preceded by an affordability check inside the same call.

use serde::{Deserialize, Serialize};

/// The four wallet resources tracked per player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Food from farms, berries, game, and fishing.
    Food,
    /// Wood from forests.
    Wood,
    /// Stone, clay, and ores.
    Stone,
    /// Gold and other precious trade goods.
    Gold,
}

impl ResourceKind {
    /// All wallet resources, in canonical order.
    pub const ALL: [Self; 4] = [Self::Food, Self::Wood, Self::Stone, Self::Gold];

    /// Wire/display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Wood => "wood",
            Self::Stone => "stone",
            Self::Gold => "gold",
        }
    }
}

/// A bundle of wallet resources.
///
/// Serves as a player's wallet, a cost, and a trade lot - all three are
/// just amounts per resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Stockpile {
    /// Food amount.
    #[serde(default)]
    pub food: f64,
    /// Wood amount.
    #[serde(default)]
    pub wood: f64,
    /// Stone amount.
    #[serde(default)]
    pub stone: f64,
    /// Gold amount.
    #[serde(default)]
    pub gold: f64,
}

impl Stockpile {
    /// An empty bundle.
    pub const EMPTY: Self = Self::cost(0.0, 0.0, 0.0, 0.0);

    /// Build a bundle from explicit amounts.
    #[must_use]
    pub const fn cost(food: f64, wood: f64, stone: f64, gold: f64) -> Self {
        Self {
            food,
            wood,
            stone,
            gold,
        }
    }

    /// Amount of a single resource kind.
    #[must_use]
    pub const fn amount(&self, kind: ResourceKind) -> f64 {
        match kind {
            ResourceKind::Food => self.food,
            ResourceKind::Wood => self.wood,
            ResourceKind::Stone => self.stone,
            ResourceKind::Gold => self.gold,
        }
    }

    fn amount_mut(&mut self, kind: ResourceKind) -> &mut f64 {
        match kind {
            ResourceKind::Food => &mut self.food,
            ResourceKind::Wood => &mut self.wood,
            ResourceKind::Stone => &mut self.stone,
            ResourceKind::Gold => &mut self.gold,
        }
    }

    /// Add an amount of one resource kind.
    pub fn credit(&mut self, kind: ResourceKind, amount: f64) {
        *self.amount_mut(kind) += amount;
    }

    /// Add a whole bundle.
    pub fn credit_all(&mut self, bundle: &Self) {
        for kind in ResourceKind::ALL {
            self.credit(kind, bundle.amount(kind));
        }
    }

    /// Check whether every amount in `cost` is covered.
    #[must_use]
    pub fn can_afford(&self, cost: &Self) -> bool {
        ResourceKind::ALL
            .iter()
            .all(|&kind| self.amount(kind) >= cost.amount(kind))
    }

    /// Debit a whole bundle if it is affordable.
    ///
    /// Returns `true` and applies every debit together, or returns `false`
    /// and leaves the wallet untouched. There is no partial debit.
    pub fn debit_all(&mut self, cost: &Self) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        for kind in ResourceKind::ALL {
            *self.amount_mut(kind) -= cost.amount(kind);
        }
        true
    }

    /// Remove up to `amount` of one kind, clamped at the current balance.
    ///
    /// Returns the amount actually removed.
    pub fn drain(&mut self, kind: ResourceKind, amount: f64) -> f64 {
        let balance = self.amount_mut(kind);
        let taken = amount.min(*balance);
        *balance -= taken;
        taken
    }

    /// First resource kind whose balance falls short of `cost`, if any.
    #[must_use]
    pub fn first_shortfall(&self, cost: &Self) -> Option<(ResourceKind, f64, f64)> {
        ResourceKind::ALL
            .iter()
            .find(|&&kind| self.amount(kind) < cost.amount(kind))
            .map(|&kind| (kind, cost.amount(kind), self.amount(kind)))
    }
}

/// World resource node flavor.
///
/// Nodes are flavored by biome (a snow mountain yields silver, a forest
/// yields wood and berries); each flavor deposits into exactly one wallet
/// resource when carried home.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum NodeKind {
    Wood,
    Berries,
    Game,
    Grain,
    Cattle,
    Fish,
    Stone,
    Clay,
    Iron,
    Coal,
    Gold,
    Gems,
    Silver,
    Pearls,
    Salt,
    Herbs,
    Fur,
}

impl NodeKind {
    /// Wallet resource this node deposits into.
    #[must_use]
    pub const fn wallet_kind(self) -> ResourceKind {
        match self {
            Self::Berries | Self::Game | Self::Grain | Self::Cattle | Self::Fish => {
                ResourceKind::Food
            }
            Self::Wood => ResourceKind::Wood,
            Self::Stone | Self::Clay | Self::Iron | Self::Coal => ResourceKind::Stone,
            Self::Gold
            | Self::Gems
            | Self::Silver
            | Self::Pearls
            | Self::Salt
            | Self::Herbs
            | Self::Fur => ResourceKind::Gold,
        }
    }

    /// Starting amount for a freshly seeded node.
    #[must_use]
    pub const fn base_amount(self) -> f64 {
        match self {
            Self::Wood => 500.0,
            Self::Grain => 500.0,
            Self::Stone | Self::Clay | Self::Coal => 400.0,
            Self::Iron | Self::Game | Self::Salt => 350.0,
            Self::Berries | Self::Cattle | Self::Gold | Self::Herbs => 300.0,
            Self::Fish => 450.0,
            Self::Silver => 250.0,
            Self::Gems | Self::Pearls => 200.0,
            Self::Fur => 300.0,
        }
    }

    /// Maximum yield per harvest pulse.
    #[must_use]
    pub const fn harvest_rate(self) -> f64 {
        match self {
            Self::Wood | Self::Fish => 10.0,
            Self::Grain => 12.0,
            Self::Berries => 15.0,
            Self::Stone | Self::Clay | Self::Coal | Self::Game => 8.0,
            Self::Iron | Self::Cattle | Self::Salt => 7.0,
            Self::Herbs | Self::Fur => 6.0,
            Self::Gold => 5.0,
            Self::Silver => 4.0,
            Self::Gems | Self::Pearls => 3.0,
        }
    }

    /// Wire/display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wood => "wood",
            Self::Berries => "berries",
            Self::Game => "game",
            Self::Grain => "grain",
            Self::Cattle => "cattle",
            Self::Fish => "fish",
            Self::Stone => "stone",
            Self::Clay => "clay",
            Self::Iron => "iron",
            Self::Coal => "coal",
            Self::Gold => "gold",
            Self::Gems => "gems",
            Self::Silver => "silver",
            Self::Pearls => "pearls",
            Self::Salt => "salt",
            Self::Herbs => "herbs",
            Self::Fur => "fur",
        }
    }
}

/// A depletable resource node in the world.
///
/// Removed from the world the moment `amount` reaches zero; `amount` is
/// mutated only by harvesting and regeneration and never goes negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceNode {
    /// Entity id (assigned by the entity storage).
    pub id: crate::entity::EntityId,
    /// World x coordinate.
    pub x: f32,
    /// World y coordinate.
    pub y: f32,
    /// Node flavor.
    pub kind: NodeKind,
    /// Remaining amount.
    pub amount: f64,
    /// Starting amount; regeneration never tops up beyond this.
    pub initial_amount: f64,
    /// Maximum yield per harvest pulse.
    pub harvest_rate: f64,
}

impl ResourceNode {
    /// Create a new node of the given flavor with its default stats.
    #[must_use]
    pub fn new(x: f32, y: f32, kind: NodeKind) -> Self {
        Self {
            id: 0,
            x,
            y,
            kind,
            amount: kind.base_amount(),
            initial_amount: kind.base_amount(),
            harvest_rate: kind.harvest_rate(),
        }
    }

    /// Check if this node is depleted.
    #[must_use]
    pub fn is_depleted(&self) -> bool {
        self.amount <= 0.0
    }

    /// Extract resources from this node.
    ///
    /// Returns the actual amount extracted (may be less than requested if
    /// the node is nearly depleted).
    pub fn harvest(&mut self, requested: f64) -> f64 {
        let extracted = requested.min(self.amount);
        self.amount -= extracted;
        extracted
    }

    /// Top the node back up, capped at its initial amount.
    pub fn regenerate(&mut self, amount: f64) {
        self.amount = (self.amount + amount).min(self.initial_amount);
    }
}
