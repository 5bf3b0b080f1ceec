//! Building entities: construction progress and unit training.
//!
//! Buildings move one way through `under construction -> built`; once
//! `is_built` flips it never reverts. The training queue only drains while
//! built.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::data::building_data::BuildingKind;
use crate::data::unit_data::UnitKind;
use crate::entity::EntityId;
use crate::player::PlayerId;

/// Maximum entries in a training queue.
pub const MAX_TRAINING_QUEUE: usize = 5;

/// A stationary structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    /// Entity id (assigned by the entity storage).
    pub id: EntityId,
    /// Building type.
    pub kind: BuildingKind,
    /// World x coordinate.
    pub x: f32,
    /// World y coordinate.
    pub y: f32,
    /// Owning player id.
    pub owner: PlayerId,
    /// Current health.
    pub health: f32,
    /// Maximum health.
    pub max_health: f32,
    /// Footprint edge length in cells.
    pub size: u32,
    /// Accumulated construction effort in worker-seconds.
    pub build_progress: f32,
    /// Required construction effort.
    pub build_time: f32,
    /// Whether construction has completed. One-way.
    pub is_built: bool,
    /// Whether this building has a training queue.
    pub can_train_units: bool,
    /// Population cap increase granted on completion.
    pub population_increase: u32,
    /// FIFO queue of unit types to train.
    pub training_queue: VecDeque<UnitKind>,
    /// Progress on the queue head, in seconds.
    pub current_training_progress: f32,
}

impl Building {
    /// Create a building foundation awaiting construction.
    #[must_use]
    pub fn new(kind: BuildingKind, x: f32, y: f32, owner: PlayerId) -> Self {
        let stats = kind.stats();
        Self {
            id: 0,
            kind,
            x,
            y,
            owner,
            health: stats.max_health,
            max_health: stats.max_health,
            size: stats.size,
            build_progress: 0.0,
            build_time: stats.build_time,
            is_built: stats.build_time <= 0.0,
            can_train_units: stats.can_train_units,
            population_increase: stats.population_increase,
            training_queue: VecDeque::new(),
            current_training_progress: 0.0,
        }
    }

    /// Create a fully constructed building (starting town centers).
    #[must_use]
    pub fn completed(kind: BuildingKind, x: f32, y: f32, owner: PlayerId) -> Self {
        let mut building = Self::new(kind, x, y, owner);
        building.build_progress = building.build_time;
        building.is_built = true;
        building
    }

    /// Contribute construction effort.
    ///
    /// Progress is monotonic and additive across workers. Returns `true`
    /// exactly once, on the contribution that completes the building.
    pub fn apply_build_effort(&mut self, effort: f32) -> bool {
        if self.is_built {
            return false;
        }
        self.build_progress += effort;
        if self.build_progress >= self.build_time {
            self.is_built = true;
            return true;
        }
        false
    }

    /// Apply damage. Returns `true` if the building is destroyed.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        self.health -= amount;
        self.health <= 0.0
    }

    /// Append a unit to the training queue.
    ///
    /// Returns `false` when the building cannot train, is not built, or the
    /// queue is full. The caller debits the cost before queueing.
    pub fn queue_unit(&mut self, kind: UnitKind) -> bool {
        if !self.can_train_units || !self.is_built {
            return false;
        }
        if self.training_queue.len() >= MAX_TRAINING_QUEUE {
            return false;
        }
        self.training_queue.push_back(kind);
        true
    }

    /// Advance the training queue.
    ///
    /// Returns the unit type that finished this tick, if any. The caller is
    /// responsible for actually spawning it (and for discarding the result
    /// when the owner is at population cap).
    pub fn update_training(&mut self, delta_time: f32) -> Option<UnitKind> {
        if !self.is_built {
            return None;
        }
        let &kind = self.training_queue.front()?;

        self.current_training_progress += delta_time;
        if self.current_training_progress >= kind.stats().train_time {
            self.current_training_progress = 0.0;
            self.training_queue.pop_front();
            return Some(kind);
        }
        None
    }

    /// Offset from the building origin where trained units appear.
    #[must_use]
    pub fn spawn_offset(&self) -> f32 {
        self.size as f32 * 10.0
    }
}
