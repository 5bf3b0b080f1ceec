//! Error types for the game simulation.

use thiserror::Error;

use crate::entity::EntityId;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all game simulation errors.
///
/// Validation failures are ordinary values: command handlers convert them
/// into `{success: false, message}` notifications and the simulation
/// continues. Nothing here is fatal to the tick loop.
#[derive(Debug, Error)]
pub enum GameError {
    /// Player id not present in the game.
    #[error("Player not found")]
    PlayerNotFound,

    /// Invalid entity reference.
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    /// The entity exists but belongs to another player.
    #[error("Entity {0} is not owned by the commanding player")]
    NotOwned(EntityId),

    /// Insufficient resources.
    #[error("Insufficient resources: need {required} {resource}, have {available}")]
    InsufficientResources {
        /// Resource type.
        resource: String,
        /// Amount required.
        required: u32,
        /// Amount available.
        available: u32,
    },

    /// Unit creation refused because the player is at population cap.
    #[error("Population limit reached ({cap})")]
    PopulationCapReached {
        /// Current population cap.
        cap: u32,
    },

    /// The building type has not been unlocked by the player's age.
    #[error("Building type '{0}' is not available yet")]
    BuildingNotAvailable(String),

    /// The unit type has not been unlocked by the player's age.
    #[error("Unit type '{0}' is not available yet")]
    UnitNotAvailable(String),

    /// Training was requested from a building that cannot produce the unit.
    #[error("Building cannot train '{0}'")]
    CannotTrainUnit(String),

    /// The building is still under construction.
    #[error("Building is not yet constructed")]
    BuildingNotConstructed,

    /// The training queue is full.
    #[error("Training queue is full")]
    TrainingQueueFull,

    /// Target cell is impassable or out of bounds.
    #[error("Invalid placement at ({x:.0}, {y:.0})")]
    InvalidPlacement {
        /// Requested x coordinate.
        x: f32,
        /// Requested y coordinate.
        y: f32,
    },

    /// A build command had no capable units to dispatch.
    #[error("No valid units for this command")]
    NoValidUnits,

    /// Age advancement requested while already imperial.
    #[error("Already at the most advanced age")]
    AlreadyMaxAge,

    /// Technology research failure.
    #[error(transparent)]
    Tech(#[from] crate::tech::TechError),

    /// Trade protocol failure.
    #[error(transparent)]
    Trade(#[from] crate::trade::TradeError),

    /// Invalid game state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}
