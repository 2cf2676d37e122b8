//! # Entity Properties
//!
//! Open-ended per-entity data (health, damage, experience...) that does not
//! warrant its own component kind.

use std::collections::BTreeMap;

use super::EntityId;
use crate::error::{CoreError, CoreResult};

/// Property bag of one entity, ordered by key.
pub type PropertyMap = BTreeMap<String, PropertyValue>;

/// A dynamically typed property value.
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyValue {
    /// Integer counter (health, damage, xp)
    Int(i64),
    /// Real number
    Float(f32),
    /// Flag
    Bool(bool),
    /// Free text
    Text(String),
    /// Reference to another entity. May be stale.
    Entity(EntityId),
}

impl PropertyValue {
    /// Type name used in error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "an integer",
            Self::Float(_) => "a float",
            Self::Bool(_) => "a bool",
            Self::Text(_) => "text",
            Self::Entity(_) => "an entity",
        }
    }

    /// Integer value.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Float value. Integers widen.
    #[must_use]
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            #[allow(clippy::cast_precision_loss)]
            Self::Int(v) => Some(*v as f32),
            _ => None,
        }
    }

    /// Bool value.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Entity reference.
    #[must_use]
    pub const fn as_entity(&self) -> Option<EntityId> {
        match self {
            Self::Entity(v) => Some(*v),
            _ => None,
        }
    }

    /// Integer value or a [`CoreError::PropertyType`] naming `key`.
    ///
    /// # Errors
    ///
    /// Fails when the value is not an integer.
    pub fn expect_int(&self, key: &str) -> CoreResult<i64> {
        self.as_int().ok_or_else(|| CoreError::PropertyType {
            key: key.to_owned(),
            expected: "an integer",
        })
    }

    /// Float value or a [`CoreError::PropertyType`] naming `key`.
    ///
    /// # Errors
    ///
    /// Fails when the value is neither a float nor an integer.
    pub fn expect_float(&self, key: &str) -> CoreResult<f32> {
        self.as_float().ok_or_else(|| CoreError::PropertyType {
            key: key.to_owned(),
            expected: "a float",
        })
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f32> for PropertyValue {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<EntityId> for PropertyValue {
    fn from(v: EntityId) -> Self {
        Self::Entity(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_access() {
        let health = PropertyValue::from(40_i64);
        assert_eq!(health.as_int(), Some(40));
        assert_eq!(health.as_float(), Some(40.0));
        assert_eq!(health.as_bool(), None);

        let name = PropertyValue::from("tank");
        assert_eq!(name.as_text(), Some("tank"));
        assert_eq!(name.type_name(), "text");
    }

    #[test]
    fn test_expect_reports_key() {
        let err = PropertyValue::Bool(true).expect_int("health").unwrap_err();
        assert_eq!(
            err,
            CoreError::PropertyType {
                key: "health".into(),
                expected: "an integer"
            }
        );
    }
}
