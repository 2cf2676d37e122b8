//! # State Snapshots
//!
//! A [`StateSnapshot`] is an opaque copy of a whole [`World`]: entity
//! table, arenas, grids, pending actions, camera and RNG. Screens that
//! pause the game (menus) take one and restore it on the way back.

use tracing::debug;

use crate::actions::Action;
use crate::world::World;

/// Saved simulation state.
#[derive(Clone, Debug)]
pub struct StateSnapshot {
    world: Box<World>,
}

impl StateSnapshot {
    /// Fixed steps the world had run when captured.
    #[must_use]
    pub fn step(&self) -> u64 {
        self.world.stats().steps
    }

    /// Live entities in the snapshot.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.world.entity_count()
    }
}

impl World {
    /// Captures the complete state.
    #[must_use]
    pub fn snapshot(&self) -> StateSnapshot {
        debug!(
            step = self.stats().steps,
            entities = self.entity_count(),
            "snapshot taken"
        );
        StateSnapshot {
            world: Box::new(self.clone()),
        }
    }

    /// Replaces the current state with `snapshot`.
    ///
    /// Player tanks get a queued `StopFiring`: a button released while the
    /// snapshot was parked never reached them.
    pub fn restore(&mut self, snapshot: StateSnapshot) {
        *self = *snapshot.world;

        let players: Vec<_> = self
            .controllers
            .iter()
            .filter(|(_, _, controller)| controller.is_player())
            .map(|(_, owner, _)| owner)
            .collect();
        for &id in &players {
            self.push_action(Action::StopFiring(id));
        }
        debug!(
            step = self.stats().steps,
            players = players.len(),
            "snapshot restored"
        );
    }
}
