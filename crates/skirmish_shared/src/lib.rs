//! # SKIRMISH Shared
//!
//! Common types used by the engine kernel and the simulation.
//!
//! ## RULE
//!
//! This crate must never depend on `skirmish_core` or `skirmish`.
//! Anything that knows about entities belongs one layer up.

#![deny(unsafe_code)]

pub mod config;
pub mod constants;
pub mod math;

pub use config::{
    ActorTuning, CollisionCategory, ConfigError, ConfigResult, GridConfig, SimulationConfig,
    Viewport,
};
pub use constants::{
    DEFAULT_CELL_SIZE, DEFAULT_MAX_SUBSTEPS, DEFAULT_PAN_SPEED, DEFAULT_TIMESTEP_MS,
    ROTATION_FORCE_SCALE,
};
pub use math::Vec2;
