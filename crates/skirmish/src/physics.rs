//! # Physics
//!
//! Semi-implicit Euler: velocity eases toward the target velocity, then
//! position integrates the new velocity. There is no collision response;
//! contacts are gameplay events, not impulses.

use skirmish_shared::math::lerp;
use skirmish_shared::{Vec2, ROTATION_FORCE_SCALE};

use crate::components::{Physics, Transform};
use crate::world::{Component, World};

/// Fraction of the velocity gap closed this step, capped at 1 so a large
/// rate snaps instead of overshooting.
#[inline]
#[must_use]
pub fn ease_rate(body: &Physics, dt: f32) -> f32 {
    let per_second = if body.target_velocity.is_zero() {
        body.decel * body.friction
    } else {
        body.accel
    };
    (per_second * dt).min(1.0)
}

/// Advances one body and its transform by `dt`.
pub fn integrate(body: &mut Physics, transform: &mut Transform, dt: f32) {
    let rate = ease_rate(body, dt);
    body.velocity = body.velocity.lerp(body.target_velocity, rate);
    transform.position += body.velocity * dt;

    transform.rotation += body.rotational_force * ROTATION_FORCE_SCALE * dt;
    if let Some(friction) = body.rotational_friction {
        if body.rotational_force != 0.0 {
            body.rotational_force = lerp(body.rotational_force, 0.0, (friction * dt).min(1.0));
        }
    }
}

/// Runs every physics body with a transform.
pub(crate) fn step(world: &mut World, dt: f32) {
    let World {
        physics,
        transforms,
        entities,
        ..
    } = world;

    for (_, owner, body) in physics.iter_mut() {
        let Some(transform) = entities
            .slot(owner, Transform::KIND)
            .ok()
            .and_then(|slot| transforms.get_mut(slot))
        else {
            continue;
        };
        integrate(body, transform, dt);
    }
}

/// Velocity a steering body settles at for a held direction.
#[must_use]
pub fn steering_velocity(direction: Vec2, max_speed: f32) -> Vec2 {
    direction.scale_to_length(max_speed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ballistic_keeps_velocity() {
        let mut body = Physics::ballistic(Vec2::new(100.0, 0.0));
        let mut transform = Transform::at(Vec2::ZERO);
        for _ in 0..10 {
            integrate(&mut body, &mut transform, 0.1);
        }
        assert_eq!(body.velocity, Vec2::new(100.0, 0.0));
        assert!((transform.position.x - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_rate_is_clamped() {
        let mut body = Physics::new(100.0, 500.0, 0.0, 0.0);
        body.target_velocity = Vec2::new(50.0, 0.0);
        assert_eq!(ease_rate(&body, 1.0), 1.0);

        let mut transform = Transform::at(Vec2::ZERO);
        integrate(&mut body, &mut transform, 1.0);
        assert_eq!(body.velocity, Vec2::new(50.0, 0.0));
    }

    #[test]
    fn test_accelerates_toward_target() {
        let mut body = Physics::new(100.0, 5.0, 5.0, 1.0);
        body.target_velocity = Vec2::new(100.0, 0.0);
        let mut transform = Transform::at(Vec2::ZERO);

        integrate(&mut body, &mut transform, 0.1);
        assert!((body.velocity.x - 50.0).abs() < 1e-4);
        assert!((transform.position.x - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_coasting_uses_friction() {
        let mut body = Physics::coasting(Vec2::new(100.0, 0.0), 2.0);
        body.friction = 2.0;
        assert!((ease_rate(&body, 0.1) - 0.4).abs() < 1e-6);

        let mut transform = Transform::at(Vec2::ZERO);
        integrate(&mut body, &mut transform, 0.1);
        assert!((body.velocity.x - 60.0).abs() < 1e-4);
    }

    #[test]
    fn test_spin_decays_with_friction() {
        let mut body = Physics::ballistic(Vec2::ZERO).with_spin(1.0, Some(5.0));
        let mut transform = Transform::at(Vec2::ZERO);

        integrate(&mut body, &mut transform, 0.1);
        assert!((transform.rotation - 6.0).abs() < 1e-4);
        assert!((body.rotational_force - 0.5).abs() < 1e-6);

        let mut free = Physics::ballistic(Vec2::ZERO).with_spin(1.0, None);
        integrate(&mut free, &mut transform, 0.1);
        assert_eq!(free.rotational_force, 1.0);
    }

    #[test]
    fn test_steering_velocity() {
        let v = steering_velocity(Vec2::new(1.0, 1.0), 10.0);
        assert!((v.length() - 10.0).abs() < 1e-4);
        assert_eq!(steering_velocity(Vec2::ZERO, 10.0), Vec2::ZERO);
    }
}
