//! # Components
//!
//! Plain component state. Components never hold references to siblings;
//! systems look siblings up through the entity table every step.
//!
//! Controller, barrel manager and animator state live next to their systems
//! in [`crate::controller`], [`crate::barrel`] and [`crate::animation`].

use skirmish_core::{CellRange, EntityId};
use skirmish_shared::{CollisionCategory, Vec2};

// =============================================================================
// TRANSFORM & PHYSICS
// =============================================================================

/// Position, rotation (degrees) and uniform scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// World position
    pub position: Vec2,
    /// Facing in degrees
    pub rotation: f32,
    /// Uniform scale applied to every image layer
    pub scale: f32,
}

impl Transform {
    /// Unrotated, unit scale transform at `position`.
    #[must_use]
    pub const fn at(position: Vec2) -> Self {
        Self {
            position,
            rotation: 0.0,
            scale: 1.0,
        }
    }

    /// Same transform facing `rotation`.
    #[must_use]
    pub const fn rotated(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    /// Same transform with `scale`.
    #[must_use]
    pub const fn scaled(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }
}

/// Velocity integration with acceleration toward a target velocity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Physics {
    /// Current velocity, units/second
    pub velocity: Vec2,
    /// Velocity the body is steering toward
    pub target_velocity: Vec2,
    /// Top speed used by controllers
    pub max_speed: f32,
    /// Fraction of the gap closed per second while accelerating
    pub accel: f32,
    /// Fraction of the gap closed per second while coasting to a stop
    pub decel: f32,
    /// Multiplier on `decel`
    pub friction: f32,
    /// Angular drive; rotation grows by `force * ROTATION_FORCE_SCALE` per second
    pub rotational_force: f32,
    /// Decay rate of `rotational_force`, `None` for a free spin
    pub rotational_friction: Option<f32>,
}

impl Physics {
    /// A body at rest with the given movement tuning.
    #[must_use]
    pub const fn new(max_speed: f32, accel: f32, decel: f32, friction: f32) -> Self {
        Self {
            velocity: Vec2::ZERO,
            target_velocity: Vec2::ZERO,
            max_speed,
            accel,
            decel,
            friction,
            rotational_force: 0.0,
            rotational_friction: None,
        }
    }

    /// Body moving at a constant `velocity` that never steers.
    #[must_use]
    pub const fn ballistic(velocity: Vec2) -> Self {
        Self {
            velocity,
            target_velocity: velocity,
            max_speed: 0.0,
            accel: 0.0,
            decel: 0.0,
            friction: 0.0,
            rotational_force: 0.0,
            rotational_friction: None,
        }
    }

    /// Body launched at `velocity` that slows down at `decel`.
    #[must_use]
    pub const fn coasting(velocity: Vec2, decel: f32) -> Self {
        Self {
            velocity,
            target_velocity: Vec2::ZERO,
            max_speed: 0.0,
            accel: 0.0,
            decel,
            friction: 1.0,
            rotational_force: 0.0,
            rotational_friction: None,
        }
    }

    /// Adds a spin that decays at `friction`.
    #[must_use]
    pub const fn with_spin(mut self, force: f32, friction: Option<f32>) -> Self {
        self.rotational_force = force;
        self.rotational_friction = friction;
        self
    }
}

// =============================================================================
// GRAPHICS
// =============================================================================

/// One named image layer of a sprite ("body", "barrel"...).
///
/// The drawn image is `"{sheet} {image}"`: the sheet is fixed at spawn
/// ("enemy tank body"), animations switch the image within it.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageLayer {
    /// Layer name, addressed by animation frames
    pub name: String,
    /// Image sheet of this layer
    pub sheet: String,
    /// Current image within the sheet
    pub image: String,
    /// Offset from the transform, rotated with it
    pub offset: Vec2,
    /// Scale on top of the transform's
    pub scale: f32,
}

impl ImageLayer {
    /// Image every layer starts on.
    pub const DEFAULT_IMAGE: &'static str = "normal";

    /// Layer `name` drawing from `sheet` at the transform origin.
    #[must_use]
    pub fn new(name: impl Into<String>, sheet: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sheet: sheet.into(),
            image: Self::DEFAULT_IMAGE.to_owned(),
            offset: Vec2::ZERO,
            scale: 1.0,
        }
    }

    /// Starts on `image` instead of the default.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    /// Full image name handed to the presentation layer.
    #[must_use]
    pub fn resolved(&self) -> String {
        format!("{} {}", self.sheet, self.image)
    }
}

/// Drawable layers, back to front.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Graphics {
    /// Layers in draw order
    pub layers: Vec<ImageLayer>,
    /// Hidden sprites are skipped by the draw list
    pub visible: bool,
}

impl Graphics {
    /// Visible sprite made of `layers`.
    #[must_use]
    pub fn new(layers: Vec<ImageLayer>) -> Self {
        Self {
            layers,
            visible: true,
        }
    }

    /// Layer called `name`.
    pub fn layer_mut(&mut self, name: &str) -> Option<&mut ImageLayer> {
        self.layers.iter_mut().find(|layer| layer.name == name)
    }

    /// Layer called `name`.
    #[must_use]
    pub fn layer(&self, name: &str) -> Option<&ImageLayer> {
        self.layers.iter().find(|layer| layer.name == name)
    }
}

// =============================================================================
// COLLIDER
// =============================================================================

/// Circular collision volume.
#[derive(Clone, Debug, PartialEq)]
pub struct Collider {
    /// Circle radius
    pub radius: f32,
    /// Offset of the centre from the transform
    pub offset: Vec2,
    /// Grid this collider lives in; changed through `World::set_collider_category`
    pub(crate) category: CollisionCategory,
    /// Grids this collider queries
    pub collidable: Vec<CollisionCategory>,
    /// Colliders sharing a parent never collide (a bullet and its shooter)
    pub parent: EntityId,
    /// Inactive colliders are out of the grid and skipped by every pass
    pub(crate) active: bool,
    /// Cells currently occupied in the category grid
    pub(crate) cells: Option<CellRange>,
}

impl Collider {
    /// Active collider of `radius` in `category`, parented to `parent`.
    #[must_use]
    pub fn new(radius: f32, category: CollisionCategory, parent: EntityId) -> Self {
        Self {
            radius,
            offset: Vec2::ZERO,
            category,
            collidable: Vec::new(),
            parent,
            active: true,
            cells: None,
        }
    }

    /// Sets the categories this collider tests against.
    #[must_use]
    pub fn collides_with(mut self, categories: &[CollisionCategory]) -> Self {
        self.collidable = categories.to_vec();
        self
    }

    /// Sets the centre offset.
    #[must_use]
    pub const fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    /// Grid this collider lives in.
    #[inline]
    #[must_use]
    pub const fn category(&self) -> CollisionCategory {
        self.category
    }

    /// Participates in collision passes.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Cells the collider is registered in, `None` while out of the grid.
    #[inline]
    #[must_use]
    pub const fn cells(&self) -> Option<CellRange> {
        self.cells
    }
}

// =============================================================================
// TIMERS & DISPLAY
// =============================================================================

/// Bounded lifetime. Fires once when `elapsed` reaches `duration`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LifeTimer {
    /// Lifetime in seconds
    pub duration: f32,
    /// Seconds lived so far
    pub elapsed: f32,
    pub(crate) expired: bool,
}

impl LifeTimer {
    /// Timer that expires after `duration` seconds.
    #[must_use]
    pub const fn new(duration: f32) -> Self {
        Self {
            duration,
            elapsed: 0.0,
            expired: false,
        }
    }

    /// True once the timer has fired.
    #[inline]
    #[must_use]
    pub const fn has_expired(&self) -> bool {
        self.expired
    }
}

/// Smoothed health display.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HealthBar {
    /// Displayed fraction of max health, 0..=1
    pub fraction: f32,
    /// Fraction of the gap closed per second
    pub smoothing: f32,
    /// Where the bar sits relative to the transform
    pub offset: Vec2,
}

impl Default for HealthBar {
    fn default() -> Self {
        Self {
            fraction: 1.0,
            smoothing: 8.0,
            offset: Vec2::new(0.0, 40.0),
        }
    }
}

/// Screen anchor for UI text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Anchor {
    /// Position is the top-left corner
    TopLeft,
    /// Position is the centre
    Center,
}

/// Screen-space text label. Ignores the camera.
#[derive(Clone, Debug, PartialEq)]
pub struct Ui {
    /// Text to show
    pub text: String,
    /// How `position` is interpreted
    pub anchor: Anchor,
    /// Screen position in pixels
    pub position: Vec2,
}
