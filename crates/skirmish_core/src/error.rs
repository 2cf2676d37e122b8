//! Lookup errors for the kernel.
//!
//! These are the recoverable "expected absence" cases. Contract violations
//! (double frees, duplicate components) panic instead.

use thiserror::Error;

use crate::ecs::{ComponentKind, EntityId};

/// Kernel errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The entity was never created or has been destroyed
    #[error("entity {0} is not alive")]
    EntityNotFound(EntityId),

    /// The entity is alive but has no component of this kind
    #[error("entity {entity} has no {kind} component")]
    ComponentNotFound {
        /// Entity looked up
        entity: EntityId,
        /// Missing kind
        kind: ComponentKind,
    },

    /// The entity is alive but has no such property
    #[error("entity {entity} has no property `{key}`")]
    PropertyNotFound {
        /// Entity looked up
        entity: EntityId,
        /// Missing key
        key: String,
    },

    /// The property exists but holds a different type
    #[error("property `{key}` is not {expected}")]
    PropertyType {
        /// Property key
        key: String,
        /// Type the caller asked for
        expected: &'static str,
    },
}

/// Result type for kernel lookups
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// True for any flavour of "not there".
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        !matches!(self, Self::PropertyType { .. })
    }
}
