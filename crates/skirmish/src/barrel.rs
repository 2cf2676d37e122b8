//! # Barrels
//!
//! A [`BarrelManager`] owns every barrel of one tank. While firing, each
//! barrel emits a [`Action::SpawnBullet`] whenever its reload runs out and
//! asks the animator for the recoil clip.

use skirmish_core::{ComponentKind, EntityId, PropertyValue};
use skirmish_shared::{ActorTuning, Vec2};

use crate::actions::{clips, props, Action};
use crate::spawn::BulletSpawn;
use crate::world::World;

/// One gun.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Barrel {
    /// Offset from the tank's facing, degrees
    pub angle: f32,
    /// Muzzle distance from the tank centre
    pub length: f32,
    /// Seconds between shots
    pub reload: f32,
    /// Seconds until the next shot is allowed
    pub cooldown: f32,
}

impl Barrel {
    /// Ready-to-fire barrel.
    #[must_use]
    pub const fn new(angle: f32, length: f32, reload: f32) -> Self {
        Self {
            angle,
            length,
            reload,
            cooldown: 0.0,
        }
    }

    /// Counts the cooldown down; true when a shot leaves the barrel.
    pub fn tick(&mut self, firing: bool, dt: f32) -> bool {
        self.cooldown = (self.cooldown - dt).max(0.0);
        if firing && self.cooldown <= 0.0 {
            self.cooldown = self.reload;
            return true;
        }
        false
    }
}

/// What every barrel of a manager shoots.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BulletSpec {
    /// Units per second
    pub speed: f32,
    /// Damage per hit
    pub damage: i64,
    /// Seconds before the bullet expires
    pub lifetime: f32,
    /// Collider radius
    pub radius: f32,
}

impl From<&ActorTuning> for BulletSpec {
    fn from(tuning: &ActorTuning) -> Self {
        Self {
            speed: tuning.bullet_speed,
            damage: tuning.bullet_damage,
            lifetime: tuning.bullet_lifetime,
            radius: tuning.bullet_radius,
        }
    }
}

/// Barrel manager component.
#[derive(Clone, Debug, PartialEq)]
pub struct BarrelManager {
    /// Guns, in firing order
    pub barrels: Vec<Barrel>,
    /// Shooting while set
    pub firing: bool,
    /// Ammunition
    pub bullet: BulletSpec,
}

impl BarrelManager {
    /// Idle manager.
    #[must_use]
    pub fn new(barrels: Vec<Barrel>, bullet: BulletSpec) -> Self {
        Self {
            barrels,
            firing: false,
            bullet,
        }
    }
}

fn faction_of(world: &World, id: EntityId) -> String {
    world
        .property(id, props::FACTION)
        .ok()
        .and_then(PropertyValue::as_text)
        .unwrap_or("neutral")
        .to_owned()
}

pub(crate) fn step(world: &mut World, dt: f32) {
    let mut shots = Vec::new();
    {
        let World {
            barrels,
            transforms,
            entities,
            ..
        } = &mut *world;

        for (_, owner, manager) in barrels.iter_mut() {
            let Some(transform) = entities
                .slot(owner, ComponentKind::Transform)
                .ok()
                .and_then(|slot| transforms.get(slot))
            else {
                continue;
            };

            for barrel in &mut manager.barrels {
                if !barrel.tick(manager.firing, dt) {
                    continue;
                }
                let heading = transform.rotation + barrel.angle;
                shots.push((
                    owner,
                    manager.bullet,
                    transform.position + Vec2::from_angle(heading) * barrel.length * transform.scale,
                    heading,
                ));
            }
        }
    }

    for (owner, bullet, position, rotation) in shots {
        let faction = faction_of(world, owner);
        world.push_action(Action::SpawnBullet(BulletSpawn {
            shooter: owner,
            position,
            rotation,
            speed: bullet.speed,
            damage: bullet.damage,
            lifetime: bullet.lifetime,
            radius: bullet.radius,
            faction,
        }));
        world.push_action(Action::PlayAnimation {
            id: owner,
            name: clips::SHOOT_BARREL.to_owned(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reload_gates_shots() {
        let mut barrel = Barrel::new(0.0, 10.0, 0.25);
        let shots = (0..100).filter(|_| barrel.tick(true, 0.01)).count();
        assert_eq!(shots, 4);
    }

    #[test]
    fn test_idle_barrel_cools_down() {
        let mut barrel = Barrel::new(0.0, 10.0, 1.0);
        assert!(barrel.tick(true, 0.01));
        for _ in 0..200 {
            assert!(!barrel.tick(false, 0.01));
        }
        assert!(barrel.tick(true, 0.01));
    }

    #[test]
    fn test_bullet_spec_from_tuning() {
        let spec = BulletSpec::from(&ActorTuning::player());
        assert_eq!(spec.damage, 10);
        assert_eq!(spec.lifetime, 3.0);
    }
}
