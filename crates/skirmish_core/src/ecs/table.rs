//! # Entity Table
//!
//! Maps every live entity to its row: one optional slot index per
//! [`ComponentKind`], a [`PropertyMap`] and an on-death payload `H`.
//!
//! Ids are issued once per table. An id that was created and destroyed is
//! retired: it stays dead and cannot be created again, so a stale reference
//! never aliases a newer entity.
//!
//! The table never touches component storage. [`EntityTable::destroy`]
//! hands the removed row back so the owner of the arenas can free each slot
//! and act on the payload.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use super::{ComponentKind, EntityId, PropertyMap, PropertyValue};
use crate::error::{CoreError, CoreResult};

/// Everything the table stores about one entity.
#[derive(Clone, Debug)]
pub struct EntityRow<H> {
    /// Slot index per component kind, `None` when absent
    pub slots: [Option<usize>; ComponentKind::COUNT],
    /// Property bag
    pub properties: PropertyMap,
    /// Payload handed back on destruction
    pub on_death: H,
}

impl<H> EntityRow<H> {
    fn new(on_death: H) -> Self {
        Self {
            slots: [None; ComponentKind::COUNT],
            properties: PropertyMap::new(),
            on_death,
        }
    }

    /// Attached kinds with their slot indices, in column order.
    pub fn components(&self) -> impl Iterator<Item = (ComponentKind, usize)> + '_ {
        ComponentKind::ALL
            .into_iter()
            .filter_map(|kind| self.slots[kind.index()].map(|slot| (kind, slot)))
    }
}

/// The entity registry.
///
/// Rows are kept ordered by id so that every walk over live entities is
/// deterministic.
#[derive(Clone, Debug)]
pub struct EntityTable<H> {
    rows: BTreeMap<EntityId, EntityRow<H>>,
    /// Issued by `reserve_id` but not created yet
    reserved: BTreeSet<EntityId>,
    next_id: EntityId,
}

impl<H> Default for EntityTable<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> EntityTable<H> {
    /// Creates an empty table. The first issued id is 1.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
            reserved: BTreeSet::new(),
            next_id: EntityId::new(1),
        }
    }

    /// Issues a fresh id without creating the entity yet.
    ///
    /// Lets a spawner refer to the entity before the spawn is applied.
    pub fn reserve_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id = id.next();
        self.reserved.insert(id);
        id
    }

    /// Registers `id` with no components and an empty property bag.
    ///
    /// # Panics
    ///
    /// Panics if `id` is already alive, or if it was issued before and is
    /// not an outstanding reservation (it belonged to an entity that is now
    /// dead).
    pub fn create(&mut self, id: EntityId, on_death: H) {
        assert!(!self.rows.contains_key(&id), "entity {id} created twice");
        if id >= self.next_id {
            self.next_id = id.next();
        } else {
            assert!(self.reserved.remove(&id), "entity {id} is retired");
        }
        self.rows.insert(id, EntityRow::new(on_death));
        debug!(entity = id.raw(), "entity created");
    }

    /// Removes `id` and returns its row. `None` if it was not alive, so
    /// destroying twice is harmless.
    pub fn destroy(&mut self, id: EntityId) -> Option<EntityRow<H>> {
        let row = self.rows.remove(&id)?;
        debug!(entity = id.raw(), "entity destroyed");
        Some(row)
    }

    /// True between `create` and `destroy`.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.rows.contains_key(&id)
    }

    /// Number of live entities.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when no entity is alive.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Live ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.rows.keys().copied()
    }

    /// Full row of a live entity.
    ///
    /// # Errors
    ///
    /// [`CoreError::EntityNotFound`] if `id` is not alive.
    pub fn row(&self, id: EntityId) -> CoreResult<&EntityRow<H>> {
        self.rows.get(&id).ok_or(CoreError::EntityNotFound(id))
    }

    fn row_mut(&mut self, id: EntityId) -> CoreResult<&mut EntityRow<H>> {
        self.rows.get_mut(&id).ok_or(CoreError::EntityNotFound(id))
    }

    // =========================================================================
    // COMPONENTS
    // =========================================================================

    /// Records that `id`'s `kind` component lives at `slot`.
    ///
    /// # Errors
    ///
    /// [`CoreError::EntityNotFound`] if `id` is not alive.
    ///
    /// # Panics
    ///
    /// Panics if `id` already has a `kind` component.
    pub fn attach(&mut self, id: EntityId, kind: ComponentKind, slot: usize) -> CoreResult<()> {
        let row = self.row_mut(id)?;
        let column = &mut row.slots[kind.index()];
        assert!(column.is_none(), "entity {id} already has a {kind} component");
        *column = Some(slot);
        Ok(())
    }

    /// Forgets `id`'s `kind` component and returns the slot it used.
    ///
    /// # Errors
    ///
    /// [`CoreError::EntityNotFound`] or [`CoreError::ComponentNotFound`].
    pub fn detach(&mut self, id: EntityId, kind: ComponentKind) -> CoreResult<usize> {
        self.row_mut(id)?.slots[kind.index()]
            .take()
            .ok_or(CoreError::ComponentNotFound { entity: id, kind })
    }

    /// Slot index of `id`'s `kind` component.
    ///
    /// # Errors
    ///
    /// [`CoreError::EntityNotFound`] or [`CoreError::ComponentNotFound`].
    pub fn slot(&self, id: EntityId, kind: ComponentKind) -> CoreResult<usize> {
        self.row(id)?.slots[kind.index()].ok_or(CoreError::ComponentNotFound { entity: id, kind })
    }

    /// True if `id` is alive and has a `kind` component.
    #[must_use]
    pub fn has(&self, id: EntityId, kind: ComponentKind) -> bool {
        self.slot(id, kind).is_ok()
    }

    // =========================================================================
    // PROPERTIES
    // =========================================================================

    /// Property `key` of `id`.
    ///
    /// # Errors
    ///
    /// [`CoreError::EntityNotFound`] or [`CoreError::PropertyNotFound`].
    pub fn property(&self, id: EntityId, key: &str) -> CoreResult<&PropertyValue> {
        self.row(id)?
            .properties
            .get(key)
            .ok_or_else(|| CoreError::PropertyNotFound {
                entity: id,
                key: key.to_owned(),
            })
    }

    /// Integer property `key` of `id`.
    ///
    /// # Errors
    ///
    /// As [`Self::property`], plus [`CoreError::PropertyType`].
    pub fn int_property(&self, id: EntityId, key: &str) -> CoreResult<i64> {
        self.property(id, key)?.expect_int(key)
    }

    /// Float property `key` of `id`. Integer values widen.
    ///
    /// # Errors
    ///
    /// As [`Self::property`], plus [`CoreError::PropertyType`].
    pub fn float_property(&self, id: EntityId, key: &str) -> CoreResult<f32> {
        self.property(id, key)?.expect_float(key)
    }

    /// Sets property `key` of `id`, returning the previous value.
    ///
    /// # Errors
    ///
    /// [`CoreError::EntityNotFound`] if `id` is not alive.
    pub fn set_property(
        &mut self,
        id: EntityId,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> CoreResult<Option<PropertyValue>> {
        Ok(self.row_mut(id)?.properties.insert(key.into(), value.into()))
    }

    /// Whole property bag of `id`.
    ///
    /// # Errors
    ///
    /// [`CoreError::EntityNotFound`] if `id` is not alive.
    pub fn properties(&self, id: EntityId) -> CoreResult<&PropertyMap> {
        Ok(&self.row(id)?.properties)
    }
}
