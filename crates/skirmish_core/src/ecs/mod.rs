//! # Entity Component System
//!
//! Entities are bare ids. Each live entity owns one row in the
//! [`EntityTable`]: a slot index per [`ComponentKind`] plus a property bag.
//! Component state itself lives in per-kind [`crate::SlotArena`]s owned by
//! the caller.
//!
//! ## Design Philosophy
//!
//! - Ids are issued monotonically and never reused
//! - Sibling components are found through the table at point of use, never
//!   through cached references
//! - A dead entity answers every lookup with `NotFound`

mod component;
mod entity;
mod property;
mod table;

pub use component::ComponentKind;
pub use entity::EntityId;
pub use property::{PropertyMap, PropertyValue};
pub use table::{EntityRow, EntityTable};
