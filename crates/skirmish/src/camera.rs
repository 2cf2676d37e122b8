//! # Camera
//!
//! Follows one entity with a proportional pan: every step the camera moves
//! `pan_speed * dt` of the way from its centre to the target. The top-left
//! `corner` is the world-to-screen offset used by every draw.

use skirmish_core::EntityId;
use skirmish_shared::{Vec2, Viewport};
use tracing::debug;

use crate::components::Transform;
use crate::world::World;

/// Smoothly panning view.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    corner: Vec2,
    half_extents: Vec2,
    pan_speed: f32,
    velocity: Vec2,
    target: Option<EntityId>,
}

impl Camera {
    /// Camera with its corner at the origin.
    #[must_use]
    pub fn new(viewport: Viewport, pan_speed: f32) -> Self {
        Self {
            corner: Vec2::ZERO,
            half_extents: viewport.half_extents(),
            pan_speed,
            velocity: Vec2::ZERO,
            target: None,
        }
    }

    /// Top-left corner in world space.
    #[inline]
    #[must_use]
    pub const fn corner(&self) -> Vec2 {
        self.corner
    }

    /// Centre of the view in world space.
    #[inline]
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.corner + self.half_extents
    }

    /// Pan velocity of the last step.
    #[inline]
    #[must_use]
    pub const fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Entity being followed.
    #[inline]
    #[must_use]
    pub const fn target(&self) -> Option<EntityId> {
        self.target
    }

    /// Follows `id`, currently at `position`.
    pub fn set_target(&mut self, id: EntityId, position: Vec2, jump: bool) {
        self.target = Some(id);
        if jump {
            self.set_position(position);
        }
    }

    /// Stops following.
    pub fn clear_target(&mut self) {
        self.target = None;
        self.velocity = Vec2::ZERO;
    }

    /// Centres the view on `center` immediately.
    pub fn set_position(&mut self, center: Vec2) {
        self.corner = center - self.half_extents;
    }

    /// World position to screen position.
    #[inline]
    #[must_use]
    pub fn to_screen(&self, world: Vec2) -> Vec2 {
        world - self.corner
    }

    /// Screen position to world position.
    #[inline]
    #[must_use]
    pub fn to_world(&self, screen: Vec2) -> Vec2 {
        screen + self.corner
    }

    /// One pan step toward `target`.
    pub fn follow(&mut self, target: Vec2, dt: f32) {
        self.velocity = (target - self.center()) * self.pan_speed;
        self.corner += self.velocity * dt;
    }
}

/// Pans toward the target, dropping it once it is gone.
pub(crate) fn step(world: &mut World, dt: f32) {
    let Some(target) = world.camera.target() else {
        return;
    };
    match world.get::<Transform>(target).map(|t| t.position) {
        Ok(position) => world.camera.follow(position, dt),
        Err(_) => {
            debug!(entity = target.raw(), "camera target lost");
            world.camera.clear_target();
        }
    }
}
