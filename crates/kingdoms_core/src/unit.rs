//! Unit entities and their action state machine.
//!
//! A unit is always in exactly one of six actions: `idle`, `moving`,
//! `gathering`, `building`, `attacking`, or `returning`. Long-running work
//! is state advanced a little every tick, never a blocking operation.
//! There is no terminal state - a destroyed unit is removed from the world
//! entirely - and any missing target fails safe into `idle`.

use serde::{Deserialize, Serialize};

use crate::data::unit_data::UnitKind;
use crate::economy::ResourceKind;
use crate::entity::{distance, Entity, EntityId};
use crate::player::{CombatBonuses, PlayerId};
use crate::world::EntityCtx;

/// Distance at which a moving unit counts as arrived.
pub const ARRIVAL_EPSILON: f32 = 5.0;
/// Distance within which a unit can harvest a resource node.
pub const GATHER_RANGE: f32 = 20.0;
/// Distance within which a unit can work on a construction site.
pub const BUILD_RANGE: f32 = 30.0;
/// Seconds between harvest pulses.
const GATHER_PULSE: f32 = 1.0;

/// Current action of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum UnitAction {
    #[default]
    Idle,
    Moving,
    Gathering,
    Building,
    Attacking,
    Returning,
}

/// A mobile actor in the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    /// Entity id (assigned by the entity storage).
    pub id: EntityId,
    /// Unit type.
    pub kind: UnitKind,
    /// World x coordinate.
    pub x: f32,
    /// World y coordinate.
    pub y: f32,
    /// Owning player id (a lookup key, not a reference).
    pub owner: PlayerId,
    /// Current health.
    pub health: f32,
    /// Maximum health.
    pub max_health: f32,
    /// Movement speed in world units per second.
    pub speed: f32,
    /// Damage per attack.
    pub attack_damage: f32,
    /// Attack range.
    pub attack_range: f32,
    /// Attacks per second.
    pub attack_speed: f32,
    /// Seconds until the next attack is allowed.
    pub attack_cooldown: f32,
    /// Capability flags.
    pub can_move: bool,
    /// Whether the unit can fight.
    pub can_attack: bool,
    /// Whether the unit can harvest.
    pub can_gather: bool,
    /// Whether the unit can construct.
    pub can_build: bool,
    /// Current action.
    pub action: UnitAction,
    /// Movement target x.
    pub target_x: Option<f32>,
    /// Movement target y.
    pub target_y: Option<f32>,
    /// Task target entity (resource, construction site, or attack victim).
    pub target_entity: Option<EntityId>,
    /// Wallet kind of the carried resources.
    pub carrying: Option<ResourceKind>,
    /// Carried amount; always within `[0, max_carry]`.
    pub carrying_amount: f64,
    /// Carry capacity.
    pub max_carry: f64,
    /// Base harvest yield per gathering pulse.
    pub gather_rate: f64,
    /// Seconds until the next harvest pulse.
    pub gathering_cooldown: f32,
}

impl Unit {
    /// Create a unit of the given kind at a position.
    #[must_use]
    pub fn new(kind: UnitKind, x: f32, y: f32, owner: PlayerId) -> Self {
        let stats = kind.stats();
        Self {
            id: 0,
            kind,
            x,
            y,
            owner,
            health: stats.max_health,
            max_health: stats.max_health,
            speed: stats.speed,
            attack_damage: stats.attack_damage,
            attack_range: stats.attack_range,
            attack_speed: stats.attack_speed,
            attack_cooldown: 0.0,
            can_move: true,
            can_attack: stats.can_attack,
            can_gather: stats.can_gather,
            can_build: stats.can_build,
            action: UnitAction::Idle,
            target_x: None,
            target_y: None,
            target_entity: None,
            carrying: None,
            carrying_amount: 0.0,
            max_carry: stats.max_carry,
            gather_rate: stats.gather_rate,
            gathering_cooldown: 0.0,
        }
    }

    /// Set a movement destination.
    pub fn set_move_target(&mut self, x: f32, y: f32) {
        self.target_x = Some(x);
        self.target_y = Some(y);
    }

    /// Apply damage. Returns `true` if the unit is destroyed.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        self.health -= amount;
        self.health <= 0.0
    }

    /// Advance this unit by one tick.
    ///
    /// The unit has been taken out of the entity storage for the duration
    /// of the call; `ctx` holds everything else in the world. Targets are
    /// re-resolved by id on every use.
    pub fn update(&mut self, delta_time: f32, ctx: &mut EntityCtx<'_>) {
        if self.attack_cooldown > 0.0 {
            self.attack_cooldown -= delta_time;
        }
        if self.gathering_cooldown > 0.0 {
            self.gathering_cooldown -= delta_time;
        }

        match self.action {
            UnitAction::Idle => {}
            UnitAction::Moving => self.update_moving(delta_time, ctx),
            UnitAction::Gathering => self.update_gathering(ctx),
            UnitAction::Building => self.update_building(delta_time, ctx),
            UnitAction::Attacking => self.update_attacking(ctx),
            UnitAction::Returning => self.update_returning(delta_time, ctx),
        }
    }

    /// Step toward the current movement target. Returns `true` on arrival.
    fn step_toward(&mut self, delta_time: f32, ctx: &EntityCtx<'_>) -> bool {
        let (Some(tx), Some(ty)) = (self.target_x, self.target_y) else {
            return false;
        };

        let dist = distance(self.x, self.y, tx, ty);
        if dist < ARRIVAL_EPSILON {
            self.x = tx;
            self.y = ty;
            self.target_x = None;
            self.target_y = None;
            return true;
        }

        let speed_bonus = 1.0 + self.owner_bonuses(ctx).speed as f32;
        let step = self.speed * speed_bonus * ctx.weather_movement_multiplier * delta_time;
        if step >= dist {
            self.x = tx;
            self.y = ty;
            self.target_x = None;
            self.target_y = None;
            return true;
        }

        let ratio = step / dist;
        self.x += (tx - self.x) * ratio;
        self.y += (ty - self.y) * ratio;
        false
    }

    fn update_moving(&mut self, delta_time: f32, ctx: &mut EntityCtx<'_>) {
        if self.target_x.is_none() || self.target_y.is_none() {
            self.action = UnitAction::Idle;
            return;
        }

        if self.step_toward(delta_time, ctx) {
            self.resume_task(ctx);
        }
    }

    /// On arrival, pick up the task associated with the target entity.
    fn resume_task(&mut self, ctx: &EntityCtx<'_>) {
        let Some(target_id) = self.target_entity else {
            self.action = UnitAction::Idle;
            return;
        };

        match ctx.entities.get(target_id) {
            Some(Entity::Resource(_)) if self.can_gather => {
                self.action = UnitAction::Gathering;
            }
            Some(Entity::Building(building))
                if !building.is_built && self.can_build && building.owner == self.owner =>
            {
                self.action = UnitAction::Building;
            }
            Some(_) if self.can_attack => {
                self.action = UnitAction::Attacking;
            }
            _ => {
                self.target_entity = None;
                self.action = UnitAction::Idle;
            }
        }
    }

    fn update_gathering(&mut self, ctx: &mut EntityCtx<'_>) {
        if !self.can_gather {
            self.action = UnitAction::Idle;
            return;
        }
        let Some(target_id) = self.target_entity else {
            self.action = UnitAction::Idle;
            return;
        };
        let Some(node) = ctx.entities.resource(target_id) else {
            self.target_entity = None;
            self.action = UnitAction::Idle;
            return;
        };

        let (node_x, node_y) = (node.x, node.y);
        if distance(self.x, self.y, node_x, node_y) > GATHER_RANGE {
            self.set_move_target(node_x, node_y);
            self.action = UnitAction::Moving;
            return;
        }

        if self.gathering_cooldown > 0.0 {
            return;
        }

        if self.carrying_amount >= self.max_carry {
            self.carrying = Some(node.kind.wallet_kind());
            self.start_returning(ctx);
            return;
        }

        let wallet_kind = node.kind.wallet_kind();
        let rate_multiplier = ctx
            .players
            .get(&self.owner)
            .map_or(1.0, |p| p.effective_gathering_rate(wallet_kind, ctx.time.is_day_time))
            * ctx.weather_resource_multiplier;

        let Some(node) = ctx.entities.resource_mut(target_id) else {
            return;
        };
        let requested =
            (self.gather_rate.min(node.harvest_rate) * rate_multiplier).min(self.max_carry - self.carrying_amount);
        let harvested = node.harvest(requested);
        self.carrying_amount += harvested;
        self.carrying = Some(wallet_kind);
        self.gathering_cooldown = GATHER_PULSE;

        if node.is_depleted() {
            ctx.entities.remove(target_id);
            self.target_entity = None;
            if self.carrying_amount > 0.0 {
                self.start_returning(ctx);
            } else {
                self.action = UnitAction::Idle;
            }
        } else if self.carrying_amount >= self.max_carry {
            self.start_returning(ctx);
        }
    }

    /// Head for the nearest completed drop-off building of the owner.
    ///
    /// Keeps `target_entity` so the gather target can be resumed after
    /// depositing. Without any drop-off the unit just goes idle with its
    /// load intact.
    fn start_returning(&mut self, ctx: &EntityCtx<'_>) {
        let nearest = ctx
            .entities
            .iter()
            .filter_map(|(_, entity)| match entity {
                Entity::Building(b)
                    if b.owner == self.owner && b.is_built && b.kind.is_drop_off() =>
                {
                    Some((b.x, b.y))
                }
                _ => None,
            })
            .min_by(|a, b| {
                let da = distance(self.x, self.y, a.0, a.1);
                let db = distance(self.x, self.y, b.0, b.1);
                da.total_cmp(&db)
            });

        match nearest {
            Some((x, y)) => {
                self.set_move_target(x, y);
                self.action = UnitAction::Returning;
            }
            None => self.action = UnitAction::Idle,
        }
    }

    fn update_returning(&mut self, delta_time: f32, ctx: &mut EntityCtx<'_>) {
        if self.carrying.is_none() || self.carrying_amount <= 0.0 {
            self.action = UnitAction::Idle;
            return;
        }

        if self.target_x.is_none() || self.target_y.is_none() {
            // Drop-off vanished mid-trip; look for another.
            self.start_returning(ctx);
            if self.action != UnitAction::Returning {
                return;
            }
        }

        if self.step_toward(delta_time, ctx) {
            if let (Some(kind), Some(player)) = (self.carrying, ctx.players.get_mut(&self.owner)) {
                player.resources.credit(kind, self.carrying_amount);
            }
            self.carrying = None;
            self.carrying_amount = 0.0;

            // Resume the previous gather target if it still exists.
            match self.target_entity {
                Some(id) if ctx.entities.resource(id).is_some() => {
                    self.action = UnitAction::Gathering;
                }
                _ => {
                    self.target_entity = None;
                    self.action = UnitAction::Idle;
                }
            }
        }
    }

    fn update_building(&mut self, delta_time: f32, ctx: &mut EntityCtx<'_>) {
        if !self.can_build {
            self.action = UnitAction::Idle;
            return;
        }
        let Some(target_id) = self.target_entity else {
            self.action = UnitAction::Idle;
            return;
        };
        let Some(building) = ctx.entities.building(target_id) else {
            self.target_entity = None;
            self.action = UnitAction::Idle;
            return;
        };
        if building.is_built {
            self.target_entity = None;
            self.action = UnitAction::Idle;
            return;
        }

        let (bx, by) = (building.x, building.y);
        if distance(self.x, self.y, bx, by) > BUILD_RANGE {
            self.set_move_target(bx, by);
            self.action = UnitAction::Moving;
            return;
        }

        // Progress is additive across workers; each contributes its own
        // delta independently.
        let Some(building) = ctx.entities.building_mut(target_id) else {
            return;
        };
        if building.apply_build_effort(delta_time) {
            let owner = building.owner;
            let bonus = building.kind.stats().population_increase;
            if let Some(player) = ctx.players.get_mut(&owner) {
                player.population_cap += bonus;
            }
            self.target_entity = None;
            self.action = UnitAction::Idle;
        }
    }

    fn update_attacking(&mut self, ctx: &mut EntityCtx<'_>) {
        if !self.can_attack {
            self.action = UnitAction::Idle;
            return;
        }
        let Some(target_id) = self.target_entity else {
            self.action = UnitAction::Idle;
            return;
        };
        let Some(target) = ctx.entities.get(target_id) else {
            self.target_entity = None;
            self.action = UnitAction::Idle;
            return;
        };
        if matches!(target, Entity::Resource(_)) {
            self.target_entity = None;
            self.action = UnitAction::Idle;
            return;
        }

        let (tx, ty) = target.position();
        let bonuses = self.owner_bonuses(ctx);
        let range = self.attack_range + bonuses.range as f32;
        if distance(self.x, self.y, tx, ty) > range {
            self.set_move_target(tx, ty);
            self.action = UnitAction::Moving;
            return;
        }

        if self.attack_cooldown > 0.0 {
            return;
        }

        let target_defense = ctx
            .entities
            .get(target_id)
            .and_then(Entity::owner)
            .and_then(|owner| ctx.players.get(&owner))
            .map_or(0.0, |p| p.combat_bonuses.defense);
        let damage = self.attack_damage
            * (1.0 + bonuses.attack as f32)
            * (1.0 - target_defense as f32).max(0.0);

        let destroyed = match ctx.entities.get_mut(target_id) {
            Some(Entity::Unit(unit)) => unit.take_damage(damage),
            Some(Entity::Building(building)) => building.take_damage(damage),
            _ => false,
        };
        self.attack_cooldown = 1.0 / self.attack_speed;

        if destroyed {
            ctx.despawn(target_id);
            self.target_entity = None;
            self.action = UnitAction::Idle;
        }
    }

    fn owner_bonuses(&self, ctx: &EntityCtx<'_>) -> CombatBonuses {
        ctx.players
            .get(&self.owner)
            .map(|p| p.combat_bonuses)
            .unwrap_or_default()
    }
}
