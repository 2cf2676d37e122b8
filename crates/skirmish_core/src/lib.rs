//! # SKIRMISH Core Engine
//!
//! The kernel the simulation is built on:
//! - [`SlotArena`]: recycling component storage with an intrusive free list
//! - [`EntityTable`]: entity ids, per-kind slot indices and the property bag
//! - [`SpatialHashGrid`]: uniform-grid broad phase
//!
//! ## Architecture Rules
//!
//! 1. **Ids are never reused** - a destroyed entity stays dead for the session
//! 2. **Contract violations panic** - double frees and duplicate components abort
//! 3. **Expected absence is a `Result`** - lookups on dead entities return [`CoreError`]
//!
//! ## Example
//!
//! ```rust
//! use skirmish_core::{ComponentKind, EntityTable, SlotArena};
//!
//! let mut table: EntityTable<()> = EntityTable::new();
//! let mut transforms: SlotArena<(f32, f32)> = SlotArena::new();
//!
//! let id = table.reserve_id();
//! table.create(id, ());
//! let slot = transforms.add(id, (0.0, 0.0));
//! table.attach(id, ComponentKind::Transform, slot).unwrap();
//! assert_eq!(table.slot(id, ComponentKind::Transform).unwrap(), slot);
//! ```

#![deny(unsafe_code)]

pub mod ecs;
pub mod error;
pub mod memory;
pub mod spatial;

pub use ecs::{ComponentKind, EntityId, EntityRow, EntityTable, PropertyMap, PropertyValue};
pub use error::{CoreError, CoreResult};
pub use memory::SlotArena;
pub use spatial::{Cell, CellRange, SpatialHashGrid};
