//! # Simulation Errors

use skirmish_core::{CoreError, EntityId};
use skirmish_shared::ConfigError;
use thiserror::Error;

use crate::animation::AnimationError;

/// Simulation-level errors
#[derive(Debug, Error)]
pub enum SimError {
    /// Entity, component or property lookup failed
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The camera was asked to follow an entity with no transform
    #[error("camera target {0} does not exist or has no transform")]
    MissingTransform(EntityId),

    /// Animation data failed validation
    #[error("invalid animation data: {0}")]
    Animation(#[from] AnimationError),

    /// Configuration failed to load
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for simulation operations
pub type SimResult<T> = Result<T, SimError>;
