//! Entity storage.
//!
//! All world entities - units, buildings, and resource nodes - live in a
//! single id-keyed arena. Cross-entity references (`owner`, gather and
//! attack targets) are stored as ids and re-resolved on every use, never
//! as cached pointers, which is what lets a target despawn mid-task
//! without invalidating anything.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::building::Building;
use crate::economy::ResourceNode;
use crate::player::PlayerId;
use crate::unit::Unit;

/// Unique identifier for entities.
///
/// Ids are assigned by [`EntityStorage`] and never reused within a game.
pub type EntityId = u64;

/// Any entity that can live in the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Entity {
    /// A mobile actor.
    Unit(Unit),
    /// A stationary structure.
    Building(Building),
    /// A depletable resource node.
    Resource(ResourceNode),
}

impl Entity {
    /// The entity's id.
    #[must_use]
    pub fn id(&self) -> EntityId {
        match self {
            Self::Unit(unit) => unit.id,
            Self::Building(building) => building.id,
            Self::Resource(node) => node.id,
        }
    }

    /// World position.
    #[must_use]
    pub fn position(&self) -> (f32, f32) {
        match self {
            Self::Unit(unit) => (unit.x, unit.y),
            Self::Building(building) => (building.x, building.y),
            Self::Resource(node) => (node.x, node.y),
        }
    }

    /// Owning player, if any (resource nodes are unowned).
    #[must_use]
    pub fn owner(&self) -> Option<PlayerId> {
        match self {
            Self::Unit(unit) => Some(unit.owner),
            Self::Building(building) => Some(building.owner),
            Self::Resource(_) => None,
        }
    }

    fn set_id(&mut self, id: EntityId) {
        match self {
            Self::Unit(unit) => unit.id = id,
            Self::Building(building) => building.id = id,
            Self::Resource(node) => node.id = id,
        }
    }
}

/// Storage for all entities in the world.
///
/// A `HashMap` for O(1) lookup by id, with deterministic iteration via
/// sorted keys when processing the tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityStorage {
    entities: HashMap<EntityId, Entity>,
    next_id: EntityId,
}

impl EntityStorage {
    /// Create empty entity storage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entities: HashMap::new(),
            next_id: 1,
        }
    }

    /// Insert a new entity, assigning it a fresh id.
    ///
    /// Returns the assigned id.
    pub fn insert(&mut self, mut entity: Entity) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        entity.set_id(id);
        self.entities.insert(id, entity);
        id
    }

    /// Remove an entity by id.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    /// Re-insert an entity that was temporarily taken out for updating.
    ///
    /// The entity keeps the id it was originally assigned.
    pub fn reinsert(&mut self, entity: Entity) {
        self.entities.insert(entity.id(), entity);
    }

    /// Get an entity by id.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Get a mutable reference to an entity by id.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Check if an entity exists.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Get the number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check if storage is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Get sorted entity ids for deterministic iteration.
    #[must_use]
    pub fn sorted_ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<_> = self.entities.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Iterate over all entities (not in deterministic order).
    pub fn iter(&self) -> impl Iterator<Item = (&EntityId, &Entity)> {
        self.entities.iter()
    }

    /// Iterate mutably over all entities (not in deterministic order).
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&EntityId, &mut Entity)> {
        self.entities.iter_mut()
    }

    /// Borrow a unit by id.
    #[must_use]
    pub fn unit(&self, id: EntityId) -> Option<&Unit> {
        match self.entities.get(&id) {
            Some(Entity::Unit(unit)) => Some(unit),
            _ => None,
        }
    }

    /// Mutably borrow a unit by id.
    pub fn unit_mut(&mut self, id: EntityId) -> Option<&mut Unit> {
        match self.entities.get_mut(&id) {
            Some(Entity::Unit(unit)) => Some(unit),
            _ => None,
        }
    }

    /// Borrow a building by id.
    #[must_use]
    pub fn building(&self, id: EntityId) -> Option<&Building> {
        match self.entities.get(&id) {
            Some(Entity::Building(building)) => Some(building),
            _ => None,
        }
    }

    /// Mutably borrow a building by id.
    pub fn building_mut(&mut self, id: EntityId) -> Option<&mut Building> {
        match self.entities.get_mut(&id) {
            Some(Entity::Building(building)) => Some(building),
            _ => None,
        }
    }

    /// Borrow a resource node by id.
    #[must_use]
    pub fn resource(&self, id: EntityId) -> Option<&ResourceNode> {
        match self.entities.get(&id) {
            Some(Entity::Resource(node)) => Some(node),
            _ => None,
        }
    }

    /// Mutably borrow a resource node by id.
    pub fn resource_mut(&mut self, id: EntityId) -> Option<&mut ResourceNode> {
        match self.entities.get_mut(&id) {
            Some(Entity::Resource(node)) => Some(node),
            _ => None,
        }
    }
}

/// Squared distance between two points.
#[must_use]
pub fn distance_sq(ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    let dx = bx - ax;
    let dy = by - ay;
    dx * dx + dy * dy
}

/// Euclidean distance between two points.
#[must_use]
pub fn distance(ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    distance_sq(ax, ay, bx, by).sqrt()
}
