//! # World
//!
//! The aggregate every system runs against: one [`SlotArena`] per component
//! kind, the [`EntityTable`], one [`SpatialHashGrid`] per collision
//! category, the action queue, the camera and the seeded RNG.
//!
//! Nothing here is global. Two worlds never share state, which is what
//! makes snapshots and side-by-side determinism tests possible.
//!
//! ## Collider registration
//!
//! A collider is in its category grid exactly when it is active, alive and
//! its entity has a transform. Every path that changes one of those
//! (component add/remove, activation, destruction) updates the grid on the
//! spot.

use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use skirmish_core::{
    ComponentKind, CoreError, CoreResult, EntityId, EntityTable, PropertyMap, PropertyValue,
    SlotArena, SpatialHashGrid,
};
use skirmish_shared::{CollisionCategory, SimulationConfig, Vec2};
use tracing::debug;

use crate::actions::{Action, ActionQueue};
use crate::animation::{AnimationLibrary, Animator};
use crate::audio::SoundRequest;
use crate::barrel::BarrelManager;
use crate::camera::Camera;
use crate::components::{Collider, Graphics, HealthBar, LifeTimer, Physics, Transform, Ui};
use crate::controller::Controller;
use crate::error::{SimError, SimResult};
use crate::{
    animation, barrel, camera, collision, controller, health_bar, life_timer, physics,
};

// =============================================================================
// COMPONENT REGISTRY
// =============================================================================

/// A type stored in one of the world's arenas.
///
/// Ties a Rust type to its [`ComponentKind`] column and its arena, so the
/// generic accessors on [`World`] resolve statically.
pub trait Component: Sized {
    /// Column in the entity table
    const KIND: ComponentKind;

    /// Arena holding every component of this kind.
    fn arena(world: &World) -> &SlotArena<Self>;

    /// Mutable arena.
    fn arena_mut(world: &mut World) -> &mut SlotArena<Self>;
}

macro_rules! register_component {
    ($($ty:ty => $kind:ident, $field:ident;)*) => {
        $(
            impl Component for $ty {
                const KIND: ComponentKind = ComponentKind::$kind;

                #[inline]
                fn arena(world: &World) -> &SlotArena<Self> {
                    &world.$field
                }

                #[inline]
                fn arena_mut(world: &mut World) -> &mut SlotArena<Self> {
                    &mut world.$field
                }
            }
        )*
    };
}

register_component! {
    Transform => Transform, transforms;
    Physics => Physics, physics;
    Graphics => Graphics, graphics;
    Controller => Controller, controllers;
    BarrelManager => BarrelManager, barrels;
    LifeTimer => LifeTimer, life_timers;
    Collider => Collider, colliders;
    HealthBar => HealthBar, health_bars;
    Animator => Animator, animators;
    Ui => Ui, uis;
}

/// Running counters, handy for tests and debug overlays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorldStats {
    /// Fixed steps simulated
    pub steps: u64,
    /// Entities created
    pub created: u64,
    /// Entities destroyed
    pub destroyed: u64,
    /// Actions applied by drains
    pub actions_applied: u64,
    /// Life timers that ran out
    pub expirations: u64,
    /// Projectile collisions resolved
    pub projectile_hits: u64,
}

// =============================================================================
// WORLD
// =============================================================================

/// Complete simulation state.
#[derive(Clone, Debug)]
pub struct World {
    pub(crate) config: SimulationConfig,
    pub(crate) entities: EntityTable<Vec<Action>>,

    // ===== ARENAS =====
    pub(crate) transforms: SlotArena<Transform>,
    pub(crate) physics: SlotArena<Physics>,
    pub(crate) graphics: SlotArena<Graphics>,
    pub(crate) controllers: SlotArena<Controller>,
    pub(crate) barrels: SlotArena<BarrelManager>,
    pub(crate) life_timers: SlotArena<LifeTimer>,
    pub(crate) colliders: SlotArena<Collider>,
    pub(crate) health_bars: SlotArena<HealthBar>,
    pub(crate) animators: SlotArena<Animator>,
    pub(crate) uis: SlotArena<Ui>,

    /// One grid per [`CollisionCategory`], indexed by `category.index()`
    pub(crate) grids: [SpatialHashGrid<EntityId>; CollisionCategory::COUNT],
    pub(crate) actions: ActionQueue,
    pub(crate) camera: Camera,
    pub(crate) animations: Arc<AnimationLibrary>,
    pub(crate) sounds: Vec<SoundRequest>,
    pub(crate) rng: ChaCha8Rng,
    pub(crate) player: Option<EntityId>,
    pub(crate) stats: WorldStats,
}

impl World {
    /// Creates an empty world.
    ///
    /// `config` is expected to be validated; cell sizes must be positive.
    #[must_use]
    pub fn new(config: SimulationConfig, animations: AnimationLibrary) -> Self {
        let grids = CollisionCategory::ALL.map(|category| {
            SpatialHashGrid::new(config.grids.cell_size(category))
        });
        Self {
            camera: Camera::new(config.viewport, config.camera_pan_speed),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            entities: EntityTable::new(),
            transforms: SlotArena::new(),
            physics: SlotArena::new(),
            graphics: SlotArena::new(),
            controllers: SlotArena::new(),
            barrels: SlotArena::new(),
            life_timers: SlotArena::new(),
            colliders: SlotArena::new(),
            health_bars: SlotArena::new(),
            animators: SlotArena::new(),
            uis: SlotArena::new(),
            grids,
            actions: ActionQueue::new(),
            animations: Arc::new(animations),
            sounds: Vec::new(),
            player: None,
            stats: WorldStats::default(),
        }
    }

    /// World with the default configuration and the built-in animations.
    ///
    /// # Errors
    ///
    /// Fails only if the bundled animation data does not validate.
    pub fn with_defaults() -> SimResult<Self> {
        Ok(Self::new(
            SimulationConfig::default(),
            AnimationLibrary::builtin()?,
        ))
    }

    /// Configuration the world was built with.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Animation data shared by every animator.
    #[inline]
    #[must_use]
    pub fn animations(&self) -> &AnimationLibrary {
        &self.animations
    }

    /// Counters since creation.
    #[inline]
    #[must_use]
    pub const fn stats(&self) -> &WorldStats {
        &self.stats
    }

    /// The entity table.
    #[inline]
    #[must_use]
    pub const fn table(&self) -> &EntityTable<Vec<Action>> {
        &self.entities
    }

    // =========================================================================
    // ENTITIES
    // =========================================================================

    /// Issues an id for an entity that a queued action will create.
    pub fn reserve_id(&mut self) -> EntityId {
        self.entities.reserve_id()
    }

    /// Registers `id`. `on_death` is queued when the entity is destroyed.
    ///
    /// # Panics
    ///
    /// Panics if `id` is already alive.
    pub fn create_entity(&mut self, id: EntityId, on_death: Vec<Action>) {
        self.entities.create(id, on_death);
        self.stats.created += 1;
    }

    /// Frees every component of `id`, pulls its collider out of the grid and
    /// queues its on-death actions. Returns `false` if `id` was not alive.
    pub fn destroy_entity(&mut self, id: EntityId) -> bool {
        let Some(row) = self.entities.destroy(id) else {
            return false;
        };

        for (kind, slot) in row.components() {
            self.free_slot(id, kind, slot);
        }
        self.actions.extend(row.on_death);

        if self.player == Some(id) {
            self.player = None;
        }
        if self.camera.target() == Some(id) {
            self.camera.clear_target();
        }
        self.stats.destroyed += 1;
        true
    }

    fn free_slot(&mut self, id: EntityId, kind: ComponentKind, slot: usize) {
        match kind {
            ComponentKind::Transform => {
                let _ = self.transforms.remove(slot);
            }
            ComponentKind::Physics => {
                let _ = self.physics.remove(slot);
            }
            ComponentKind::Graphics => {
                let _ = self.graphics.remove(slot);
            }
            ComponentKind::Controller => {
                let _ = self.controllers.remove(slot);
            }
            ComponentKind::BarrelManager => {
                let _ = self.barrels.remove(slot);
            }
            ComponentKind::LifeTimer => {
                let _ = self.life_timers.remove(slot);
            }
            ComponentKind::Collider => {
                let collider = self.colliders.remove(slot);
                if let Some(cells) = collider.cells {
                    self.grids[collider.category.index()].remove(id, cells);
                }
            }
            ComponentKind::HealthBar => {
                let _ = self.health_bars.remove(slot);
            }
            ComponentKind::Animator => {
                let _ = self.animators.remove(slot);
            }
            ComponentKind::Ui => {
                let _ = self.uis.remove(slot);
            }
        }
    }

    /// True between creation and destruction.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.entities.is_alive(id)
    }

    /// Number of live entities.
    #[inline]
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Live ids, ascending.
    #[must_use]
    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.entities.ids().collect()
    }

    /// The player tank, while it lives.
    #[inline]
    #[must_use]
    pub const fn player(&self) -> Option<EntityId> {
        self.player
    }

    // =========================================================================
    // COMPONENTS
    // =========================================================================

    /// Stores `component` for `id` and returns its slot.
    ///
    /// # Errors
    ///
    /// [`CoreError::EntityNotFound`] if `id` is not alive.
    ///
    /// # Panics
    ///
    /// Panics if `id` already has a component of this kind.
    pub fn add_component<C: Component>(&mut self, id: EntityId, component: C) -> CoreResult<usize> {
        if !self.entities.is_alive(id) {
            return Err(CoreError::EntityNotFound(id));
        }
        assert!(
            !self.entities.has(id, C::KIND),
            "entity {id} already has a {} component",
            C::KIND
        );
        let slot = C::arena_mut(self).add(id, component);
        self.entities.attach(id, C::KIND, slot)?;

        if matches!(C::KIND, ComponentKind::Collider | ComponentKind::Transform) {
            self.register_collider(id);
        }
        Ok(slot)
    }

    /// Detaches and returns `id`'s component of kind `C`.
    ///
    /// # Errors
    ///
    /// [`CoreError::EntityNotFound`] or [`CoreError::ComponentNotFound`].
    pub fn remove_component<C: Component>(&mut self, id: EntityId) -> CoreResult<C> {
        if matches!(C::KIND, ComponentKind::Collider | ComponentKind::Transform) {
            self.unregister_collider(id);
        }
        let slot = self.entities.detach(id, C::KIND)?;
        Ok(C::arena_mut(self).remove(slot))
    }

    /// Component `C` of `id`.
    ///
    /// # Errors
    ///
    /// [`CoreError::EntityNotFound`] or [`CoreError::ComponentNotFound`].
    pub fn get<C: Component>(&self, id: EntityId) -> CoreResult<&C> {
        let slot = self.entities.slot(id, C::KIND)?;
        C::arena(self).get(slot).ok_or(CoreError::ComponentNotFound {
            entity: id,
            kind: C::KIND,
        })
    }

    /// Mutable component `C` of `id`.
    ///
    /// # Errors
    ///
    /// [`CoreError::EntityNotFound`] or [`CoreError::ComponentNotFound`].
    pub fn get_mut<C: Component>(&mut self, id: EntityId) -> CoreResult<&mut C> {
        let slot = self.entities.slot(id, C::KIND)?;
        C::arena_mut(self)
            .get_mut(slot)
            .ok_or(CoreError::ComponentNotFound {
                entity: id,
                kind: C::KIND,
            })
    }

    /// True if `id` is alive and has a `C`.
    #[must_use]
    pub fn has<C: Component>(&self, id: EntityId) -> bool {
        self.entities.has(id, C::KIND)
    }

    /// Read access to the arena of `C`.
    #[must_use]
    pub fn arena<C: Component>(&self) -> &SlotArena<C> {
        C::arena(self)
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
        self.entities.property(id, key)
    }

    /// Integer property `key` of `id`.
    ///
    /// # Errors
    ///
    /// As [`Self::property`], plus [`CoreError::PropertyType`].
    pub fn int_property(&self, id: EntityId, key: &str) -> CoreResult<i64> {
        self.entities.int_property(id, key)
    }

    /// Float property `key` of `id`.
    ///
    /// # Errors
    ///
    /// As [`Self::property`], plus [`CoreError::PropertyType`].
    pub fn float_property(&self, id: EntityId, key: &str) -> CoreResult<f32> {
        self.entities.float_property(id, key)
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
        self.entities.set_property(id, key, value)
    }

    /// Whole property bag of `id`.
    ///
    /// # Errors
    ///
    /// [`CoreError::EntityNotFound`] if `id` is not alive.
    pub fn properties(&self, id: EntityId) -> CoreResult<&PropertyMap> {
        self.entities.properties(id)
    }

    // =========================================================================
    // ACTIONS
    // =========================================================================

    /// Queues `action` for the next drain.
    #[inline]
    pub fn push_action(&mut self, action: Action) {
        self.actions.push(action);
    }

    /// Queues several actions, keeping their order.
    pub fn extend_actions(&mut self, actions: impl IntoIterator<Item = Action>) {
        self.actions.extend(actions);
    }

    /// Actions waiting for the next drain.
    #[must_use]
    pub fn pending_actions(&self) -> &[Action] {
        self.actions.pending()
    }

    // =========================================================================
    // COLLIDERS
    // =========================================================================

    /// Grid of `category`.
    #[must_use]
    pub fn grid(&self, category: CollisionCategory) -> &SpatialHashGrid<EntityId> {
        &self.grids[category.index()]
    }

    /// World-space centre of `id`'s collider.
    #[must_use]
    pub fn collider_center(&self, id: EntityId) -> Option<Vec2> {
        let collider = self.get::<Collider>(id).ok()?;
        let transform = self.get::<Transform>(id).ok()?;
        Some(transform.position + collider.offset)
    }

    /// Takes `id`'s collider out of every pass and out of its grid.
    /// Returns `false` if there is no collider.
    pub fn deactivate_collider(&mut self, id: EntityId) -> bool {
        let Ok(collider) = self.get_mut::<Collider>(id) else {
            return false;
        };
        collider.active = false;
        self.unregister_collider(id);
        true
    }

    /// Puts `id`'s collider back into play. Returns `false` if there is no
    /// collider.
    pub fn activate_collider(&mut self, id: EntityId) -> bool {
        let Ok(collider) = self.get_mut::<Collider>(id) else {
            return false;
        };
        collider.active = true;
        self.register_collider(id);
        true
    }

    /// Moves `id`'s collider to the `category` grid. Returns `false` if there
    /// is no collider.
    pub fn set_collider_category(&mut self, id: EntityId, category: CollisionCategory) -> bool {
        if !self.entities.has(id, ComponentKind::Collider) {
            return false;
        }
        self.unregister_collider(id);
        if let Ok(collider) = self.get_mut::<Collider>(id) {
            collider.category = category;
        }
        self.register_collider(id);
        true
    }

    fn register_collider(&mut self, id: EntityId) {
        let Some(position) = self.get::<Transform>(id).ok().map(|t| t.position) else {
            return;
        };
        let Ok(slot) = self.entities.slot(id, ComponentKind::Collider) else {
            return;
        };
        let Some(collider) = self.colliders.get_mut(slot) else {
            return;
        };
        if !collider.active || collider.cells.is_some() {
            return;
        }
        let grid = &mut self.grids[collider.category.index()];
        collider.cells = Some(grid.insert(id, position + collider.offset, collider.radius));
    }

    fn unregister_collider(&mut self, id: EntityId) {
        let Ok(slot) = self.entities.slot(id, ComponentKind::Collider) else {
            return;
        };
        let Some(collider) = self.colliders.get_mut(slot) else {
            return;
        };
        if let Some(cells) = collider.cells.take() {
            self.grids[collider.category.index()].remove(id, cells);
        }
    }

    // =========================================================================
    // CAMERA
    // =========================================================================

    /// The camera.
    #[inline]
    #[must_use]
    pub const fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Makes the camera follow `id`, jumping to it when `jump` is set.
    ///
    /// # Errors
    ///
    /// [`SimError::MissingTransform`] if `id` has no transform.
    pub fn set_camera_target(&mut self, id: EntityId, jump: bool) -> SimResult<()> {
        let position = self
            .get::<Transform>(id)
            .map_err(|_| SimError::MissingTransform(id))?
            .position;
        self.camera.set_target(id, position, jump);
        debug!(entity = id.raw(), jump, "camera retargeted");
        Ok(())
    }

    /// Stops following and centres the camera on `center`.
    pub fn position_camera(&mut self, center: Vec2) {
        self.camera.clear_target();
        self.camera.set_position(center);
    }

    // =========================================================================
    // STEP
    // =========================================================================

    /// Advances the simulation by one fixed step of `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        life_timer::step(self, dt);
        controller::step(self, dt);
        barrel::step(self, dt);
        physics::step(self, dt);
        camera::step(self, dt);
        collision::step(self);
        self.drain_actions();
        animation::step(self, dt);
        health_bar::step(self, dt);
        self.stats.steps += 1;
    }
}

#[cfg(test)]
mod tests {
    use skirmish_core::Cell;

    use super::*;

    fn world() -> World {
        World::with_defaults().unwrap()
    }

    fn spawn_body(world: &mut World, position: Vec2, radius: f32) -> EntityId {
        let id = world.reserve_id();
        world.create_entity(id, Vec::new());
        world.add_component(id, Transform::at(position)).unwrap();
        world
            .add_component(id, Collider::new(radius, CollisionCategory::Actors, id))
            .unwrap();
        id
    }

    #[test]
    fn test_generic_component_access() {
        let mut world = world();
        let id = world.reserve_id();
        world.create_entity(id, Vec::new());
        world.add_component(id, Transform::at(Vec2::new(3.0, 4.0))).unwrap();

        assert_eq!(world.get::<Transform>(id).unwrap().position, Vec2::new(3.0, 4.0));
        world.get_mut::<Transform>(id).unwrap().rotation = 90.0;
        assert_eq!(world.get::<Transform>(id).unwrap().rotation, 90.0);
        assert!(matches!(
            world.get::<Physics>(id),
            Err(CoreError::ComponentNotFound { .. })
        ));
    }

    #[test]
    fn test_collider_registered_on_add() {
        let mut world = world();
        let id = spawn_body(&mut world, Vec2::ZERO, 10.0);
        let grid = world.grid(CollisionCategory::Actors);
        assert!(grid.contains(id, Cell::new(-1, -1)));
        assert!(grid.contains(id, Cell::new(0, 0)));
        assert_eq!(grid.cells_of(id).len(), 4);
    }

    #[test]
    fn test_collider_waits_for_transform() {
        let mut world = world();
        let id = world.reserve_id();
        world.create_entity(id, Vec::new());
        world
            .add_component(id, Collider::new(5.0, CollisionCategory::Shapes, id))
            .unwrap();
        assert!(world.grid(CollisionCategory::Shapes).is_empty());

        world.add_component(id, Transform::at(Vec2::new(32.0, 32.0))).unwrap();
        assert!(world.grid(CollisionCategory::Shapes).contains(id, Cell::new(0, 0)));
    }

    #[test]
    fn test_destroy_frees_slots_and_grid() {
        let mut world = world();
        let id = spawn_body(&mut world, Vec2::ZERO, 10.0);
        assert!(world.destroy_entity(id));

        assert!(world.grid(CollisionCategory::Actors).is_empty());
        assert!(world.arena::<Transform>().is_empty());
        assert!(world.arena::<Collider>().is_empty());
        assert!(!world.destroy_entity(id));
        assert_eq!(world.stats().destroyed, 1);
    }

    #[test]
    fn test_destroy_queues_on_death() {
        let mut world = world();
        let id = world.reserve_id();
        let follow_up = Action::PositionCamera(Vec2::new(1.0, 1.0));
        world.create_entity(id, vec![follow_up.clone()]);

        world.destroy_entity(id);
        assert_eq!(world.pending_actions(), &[follow_up]);
    }

    #[test]
    fn test_deactivate_and_reactivate() {
        let mut world = world();
        let id = spawn_body(&mut world, Vec2::new(100.0, 100.0), 4.0);

        assert!(world.deactivate_collider(id));
        assert!(world.grid(CollisionCategory::Actors).is_empty());
        assert!(!world.get::<Collider>(id).unwrap().is_active());

        assert!(world.activate_collider(id));
        assert!(world.grid(CollisionCategory::Actors).contains(id, Cell::new(1, 1)));
    }

    #[test]
    fn test_remove_component_unregisters() {
        let mut world = world();
        let id = spawn_body(&mut world, Vec2::ZERO, 4.0);
        let collider: Collider = world.remove_component(id).unwrap();
        assert_eq!(collider.parent, id);
        assert!(world.grid(CollisionCategory::Actors).is_empty());
        assert!(world.remove_component::<Collider>(id).is_err());
    }

    #[test]
    #[should_panic(expected = "already has a transform component")]
    fn test_duplicate_component_panics() {
        let mut world = world();
        let id = world.reserve_id();
        world.create_entity(id, Vec::new());
        world.add_component(id, Transform::at(Vec2::ZERO)).unwrap();
        let _ = world.add_component(id, Transform::at(Vec2::ZERO));
    }

    #[test]
    fn test_camera_target_needs_transform() {
        let mut world = world();
        let id = world.reserve_id();
        world.create_entity(id, Vec::new());
        assert!(matches!(
            world.set_camera_target(id, true),
            Err(SimError::MissingTransform(_))
        ));
    }
}
