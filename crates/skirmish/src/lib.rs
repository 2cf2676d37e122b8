//! # SKIRMISH
//!
//! Deterministic top-down tank skirmish simulation.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────────┐
//! │                              GameLoop                                 │
//! │   accumulator ──> World::step(dt) × N ──> draw_list / drain_audible   │
//! ├───────────────────────────────────────────────────────────────────────┤
//! │                                World                                  │
//! │                                                                       │
//! │  ┌──────────────┐   ┌────────────────────┐   ┌─────────────────────┐  │
//! │  │ EntityTable  │   │ SlotArena × 10     │   │ SpatialHashGrid × 4 │  │
//! │  │ ids, slots,  │──>│ transform, physics │<──│ one per collision   │  │
//! │  │ properties   │   │ collider, animator │   │ category            │  │
//! │  └──────────────┘   └────────────────────┘   └─────────────────────┘  │
//! │          ^                                                            │
//! │          │ apply (next drain)                                         │
//! │  ┌───────┴──────┐  <── controllers, barrels, collision, animators     │
//! │  │ ActionQueue  │  <── input events                                   │
//! │  └──────────────┘                                                     │
//! └───────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//!
//! 1. **Systems never mutate the alive-set directly** - they queue [`Action`]s
//! 2. **Components never point at siblings** - siblings are re-fetched every step
//! 3. **Everything random draws from the world's seeded RNG**
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//! use skirmish::{Action, GameLoop, SimulationConfig, Vec2};
//!
//! let mut game = GameLoop::from_config(SimulationConfig::default()).unwrap();
//! let player = game.world_mut().reserve_id();
//! game.world_mut().push_action(Action::SpawnPlayer { id: player, position: Vec2::ZERO });
//! game.world_mut().push_action(Action::FocusCamera { id: player, jump: true });
//!
//! let stats = game.advance(Duration::from_millis(16));
//! assert_eq!(stats.steps, 1);
//! assert!(game.world().is_alive(player));
//! assert!(!game.world().draw_list().sprites.is_empty());
//! ```

#![deny(unsafe_code)]

pub mod actions;
pub mod animation;
pub mod audio;
pub mod barrel;
pub mod camera;
pub mod collision;
pub mod components;
pub mod controller;
pub mod error;
pub mod game_loop;
pub mod health_bar;
pub mod life_timer;
pub mod physics;
pub mod presentation;
pub mod snapshot;
pub mod spawn;
pub mod world;

pub use skirmish_core::{CoreError, CoreResult, EntityId, PropertyValue};
pub use skirmish_shared::{CollisionCategory, SimulationConfig, Vec2};

pub use actions::{clips, props, Action, ActionQueue};
pub use animation::{AnimationError, AnimationLibrary, Animator};
pub use audio::{AudibleSound, SoundRequest};
pub use barrel::{Barrel, BarrelManager, BulletSpec};
pub use camera::Camera;
pub use collision::Contact;
pub use components::{
    Anchor, Collider, Graphics, HealthBar, ImageLayer, LifeTimer, Physics, Transform, Ui,
};
pub use controller::{Controller, Direction, InputEvent, Key, MouseButton};
pub use error::{SimError, SimResult};
pub use game_loop::{FrameStats, GameLoop};
pub use presentation::{BarSprite, DrawList, Label, Sprite};
pub use snapshot::StateSnapshot;
pub use spawn::{BulletSpawn, ParticleSpawn, ParticleStyle};
pub use world::{Component, World, WorldStats};
