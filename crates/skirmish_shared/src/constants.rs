//! # Simulation Constants
//!
//! Defaults baked into [`crate::SimulationConfig`]. Anything a level
//! designer may want to tune lives in the config file instead.

// =============================================================================
// TIMING
// =============================================================================

/// Fixed simulation step in milliseconds (100 Hz).
pub const DEFAULT_TIMESTEP_MS: u64 = 10;

/// Maximum fixed steps executed for one visible frame.
pub const DEFAULT_MAX_SUBSTEPS: u32 = 250;

// =============================================================================
// SPATIAL
// =============================================================================

/// Edge length of a collision grid cell in world units.
pub const DEFAULT_CELL_SIZE: f32 = 64.0;

// =============================================================================
// CAMERA & AUDIO
// =============================================================================

/// How fast the camera closes the gap to its target (per second).
pub const DEFAULT_PAN_SPEED: f32 = 3.0;

/// Default viewport width in pixels.
pub const DEFAULT_VIEWPORT_WIDTH: f32 = 600.0;

/// Default viewport height in pixels.
pub const DEFAULT_VIEWPORT_HEIGHT: f32 = 600.0;

/// Volume lost per `sqrt(world unit)` between a sound and the camera centre.
pub const DEFAULT_SOUND_FALLOFF: f32 = 0.01;

// =============================================================================
// PHYSICS
// =============================================================================

/// Degrees per second produced by a rotational force of 1.0.
pub const ROTATION_FORCE_SCALE: f32 = 60.0;

/// Rate at which enemies turn toward their target (fraction per second).
pub const ENEMY_TURN_RATE: f32 = 1.25;
