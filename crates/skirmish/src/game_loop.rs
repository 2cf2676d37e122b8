//! # Game Loop
//!
//! Fixed-timestep driver. Wall-clock frame time is banked in an accumulator
//! and spent in whole simulation steps:
//! ```text
//! advance(frame_time):
//! ┌──────────────────────────────────────────────────────────────┐
//! │ accumulator += frame_time                                    │
//! │ while accumulator >= timestep:                               │
//! │   ├─ life timers → controllers → barrels                     │
//! │   ├─ physics → camera → collision → action drain             │
//! │   ├─ animators → health bars                                 │
//! │   └─ accumulator -= timestep                                 │
//! │ (at most max_substeps times; whole steps beyond are dropped) │
//! └──────────────────────────────────────────────────────────────┘
//! then, once per drawn frame: draw_list(), drain_audible()
//! ```
//!
//! The accumulator is a `Duration`, so splitting the same total time into
//! different frame chunks always yields the same number of steps.

use std::time::Duration;

use skirmish_shared::SimulationConfig;
use tracing::warn;

use crate::animation::AnimationLibrary;
use crate::controller::InputEvent;
use crate::error::SimResult;
use crate::snapshot::StateSnapshot;
use crate::world::World;

/// What one `advance` call did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Fixed steps simulated
    pub steps: u32,
    /// Whole steps dropped by the sub-step bound
    pub skipped: u64,
    /// Frame number, starting at 1
    pub frame: u64,
}

/// Owns a [`World`] and feeds it fixed steps.
#[derive(Debug)]
pub struct GameLoop {
    world: World,
    timestep: Duration,
    dt: f32,
    max_substeps: u32,
    accumulator: Duration,
    frame: u64,
}

impl GameLoop {
    /// Drives `world` with the timing in its config.
    #[must_use]
    pub fn new(world: World) -> Self {
        let config = world.config();
        Self {
            timestep: config.timestep(),
            dt: config.dt(),
            max_substeps: config.max_substeps,
            accumulator: Duration::ZERO,
            frame: 0,
            world,
        }
    }

    /// Validates `config` and builds a world with the built-in animations.
    ///
    /// # Errors
    ///
    /// Invalid configuration or broken bundled animation data.
    pub fn from_config(config: SimulationConfig) -> SimResult<Self> {
        config.validate()?;
        Ok(Self::new(World::new(config, AnimationLibrary::builtin()?)))
    }

    /// Runs as many fixed steps as `frame_time` (plus leftovers) pays for.
    pub fn advance(&mut self, frame_time: Duration) -> FrameStats {
        self.frame += 1;
        self.accumulator += frame_time;

        let mut stats = FrameStats {
            frame: self.frame,
            ..FrameStats::default()
        };
        while self.accumulator >= self.timestep {
            if stats.steps == self.max_substeps {
                stats.skipped = self.discard_whole_steps();
                warn!(
                    frame = self.frame,
                    skipped = stats.skipped,
                    max_substeps = self.max_substeps,
                    "sub-step bound hit, dropping simulation time"
                );
                break;
            }
            self.world.step(self.dt);
            self.accumulator -= self.timestep;
            stats.steps += 1;
        }
        stats
    }

    /// Keeps only the sub-step remainder. Returns the steps dropped.
    fn discard_whole_steps(&mut self) -> u64 {
        let step = self.timestep.as_nanos();
        let banked = self.accumulator.as_nanos();
        self.accumulator = Duration::from_nanos(u64::try_from(banked % step).unwrap_or(0));
        u64::try_from(banked / step).unwrap_or(u64::MAX)
    }

    /// Queues the actions `event` maps to. Applied by the next step.
    pub fn handle_input(&mut self, event: InputEvent) {
        self.world.handle_input(event);
    }

    /// Fraction of a step banked in the accumulator, for render interpolation.
    #[must_use]
    pub fn alpha(&self) -> f32 {
        self.accumulator.as_secs_f32() / self.timestep.as_secs_f32()
    }

    /// Time banked but not yet simulated.
    #[inline]
    #[must_use]
    pub const fn accumulator(&self) -> Duration {
        self.accumulator
    }

    /// The simulated world.
    #[inline]
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access, for scripting spawns between frames.
    #[inline]
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Captures the world.
    #[must_use]
    pub fn snapshot(&self) -> StateSnapshot {
        self.world.snapshot()
    }

    /// Restores the world and forgets banked time.
    pub fn restore(&mut self, snapshot: StateSnapshot) {
        self.world.restore(snapshot);
        self.accumulator = Duration::ZERO;
    }

    /// Gives the world back.
    #[must_use]
    pub fn into_world(self) -> World {
        self.world
    }
}
