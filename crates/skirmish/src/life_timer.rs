//! # Life Timers
//!
//! Bounded lifetimes for bullets and particles. A timer queues one
//! [`Action::Expire`] when it runs out and never fires again.

use crate::actions::Action;
use crate::components::LifeTimer;
use crate::world::World;

impl LifeTimer {
    /// Adds `dt` and reports whether the timer ran out on this tick.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.expired {
            return false;
        }
        self.elapsed += dt;
        if self.elapsed >= self.duration {
            self.expired = true;
            return true;
        }
        false
    }

    /// Seconds left, zero once expired.
    #[must_use]
    pub fn remaining(&self) -> f32 {
        (self.duration - self.elapsed).max(0.0)
    }
}

pub(crate) fn step(world: &mut World, dt: f32) {
    let expired: Vec<Action> = world
        .life_timers
        .iter_mut()
        .filter_map(|(_, owner, timer)| timer.tick(dt).then_some(Action::Expire(owner)))
        .collect();
    world.extend_actions(expired);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once() {
        let mut timer = LifeTimer::new(0.25);
        let fired: usize = (0..100).filter(|_| timer.tick(0.1)).count();
        assert_eq!(fired, 1);
        assert!(timer.has_expired());
        assert_eq!(timer.remaining(), 0.0);
    }

    #[test]
    fn test_zero_duration_fires_on_first_tick() {
        let mut timer = LifeTimer::new(0.0);
        assert!(timer.tick(0.01));
        assert!(!timer.tick(0.01));
    }
}
