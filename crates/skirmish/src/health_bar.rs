//! # Health Bars
//!
//! Displayed health eases toward `health / max_health` so hits read as a
//! drain rather than a jump.

use skirmish_core::{EntityId, EntityTable};
use skirmish_shared::math::lerp;

use crate::actions::{props, Action};
use crate::components::HealthBar;
use crate::world::World;

impl HealthBar {
    /// Eases the displayed fraction toward `target`.
    pub fn ease_toward(&mut self, target: f32, dt: f32) {
        let target = target.clamp(0.0, 1.0);
        self.fraction = lerp(self.fraction, target, (self.smoothing * dt).min(1.0));
    }
}

#[allow(clippy::cast_precision_loss)]
fn health_fraction(entities: &EntityTable<Vec<Action>>, id: EntityId) -> Option<f32> {
    let health = entities.int_property(id, props::HEALTH).ok()?;
    let max = entities.int_property(id, props::MAX_HEALTH).ok()?;
    (max > 0).then(|| health as f32 / max as f32)
}

pub(crate) fn step(world: &mut World, dt: f32) {
    let World {
        health_bars,
        entities,
        ..
    } = world;

    for (_, owner, bar) in health_bars.iter_mut() {
        if let Some(target) = health_fraction(entities, owner) {
            bar.ease_toward(target, dt);
        }
    }
}
