//! # Spawners
//!
//! Assemble every kind of entity from components and properties. Spawners
//! are only called while an action is being applied, so they may create
//! entities directly.
//!
//! Anything random (particle scatter, shape placement) draws from the
//! world's seeded RNG, never from a thread-local one.

use std::ops::Range;

use rand::Rng;
use serde::Deserialize;
use skirmish_core::EntityId;
use skirmish_shared::constants::ENEMY_TURN_RATE;
use skirmish_shared::{ActorTuning, CollisionCategory, Vec2};
use tracing::debug;

use crate::actions::{clips, props, Action};
use crate::animation::Animator;
use crate::barrel::{Barrel, BarrelManager, BulletSpec};
use crate::components::{
    Anchor, Collider, Graphics, HealthBar, ImageLayer, LifeTimer, Physics, Transform, Ui,
};
use crate::controller::{Controller, EnemyController, PlayerController};
use crate::error::SimResult;
use crate::world::World;

/// Radius of shape colliders.
pub const SHAPE_RADIUS: f32 = 20.0;

/// Radius of experience pickups.
pub const COLLECTIBLE_RADIUS: f32 = 12.0;

/// Gap between a tank's collider and its muzzle.
const MUZZLE_CLEARANCE: f32 = 16.0;

/// Particle lifetime range in seconds.
const PARTICLE_LIFETIME: Range<f32> = 3.0..5.0;

/// Bullet fired by a barrel.
#[derive(Clone, Debug, PartialEq)]
pub struct BulletSpawn {
    /// Tank that fired; the bullet never collides with it
    pub shooter: EntityId,
    /// Muzzle position
    pub position: Vec2,
    /// Heading in degrees
    pub rotation: f32,
    /// Units per second
    pub speed: f32,
    /// Damage on hit
    pub damage: i64,
    /// Seconds before expiring
    pub lifetime: f32,
    /// Collider radius
    pub radius: f32,
    /// Shooter's faction, picks the image
    pub faction: String,
}

/// Look of a particle burst.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticleStyle {
    /// Heavy, slow chunks (tanks, shapes)
    Debris,
    /// Small, fast sparks (bullets)
    Sparks,
}

impl ParticleStyle {
    /// Sheet suffix.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Debris => "debris",
            Self::Sparks => "sparks",
        }
    }

    /// Launch speed range.
    #[must_use]
    pub const fn speed(self) -> Range<f32> {
        match self {
            Self::Debris => 40.0..160.0,
            Self::Sparks => 120.0..260.0,
        }
    }

    /// Scale range.
    #[must_use]
    pub const fn scale(self) -> Range<f32> {
        match self {
            Self::Debris => 0.6..1.2,
            Self::Sparks => 0.5..0.8,
        }
    }
}

/// One decorative particle.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleSpawn {
    /// Start position
    pub position: Vec2,
    /// Launch velocity
    pub velocity: Vec2,
    /// Start rotation, degrees
    pub rotation: f32,
    /// Rotational force
    pub spin: f32,
    /// Uniform scale; bigger particles stop sooner
    pub scale: f32,
    /// Seconds before expiring
    pub lifetime: f32,
    /// Image sheet
    pub sheet: String,
    /// Image within the sheet
    pub image: String,
}

impl ParticleSpawn {
    /// Random particle of `style` leaving `origin`.
    pub fn random(rng: &mut impl Rng, origin: Vec2, style: ParticleStyle, tint: &str) -> Self {
        let heading: f32 = rng.gen_range(0.0..360.0);
        let speed = rng.gen_range(style.speed());
        Self {
            position: origin,
            velocity: Vec2::from_angle(heading) * speed,
            rotation: rng.gen_range(0.0..360.0),
            spin: rng.gen_range(-3.0..3.0),
            scale: rng.gen_range(style.scale()),
            lifetime: rng.gen_range(PARTICLE_LIFETIME),
            sheet: format!("{tint} {}", style.name()),
            image: rng.gen_range(1..=3_u32).to_string(),
        }
    }
}

/// Deceleration of a particle of `scale`: the bigger, the sooner it stops.
#[must_use]
pub fn particle_decel(scale: f32) -> f32 {
    ((scale - 0.5) / 0.7 * 10.0).max(0.0)
}

/// Sprite with one layer per layer of `set`, each drawing from
/// `"{prefix} {layer}"`.
fn sprite(world: &World, set: &str, prefix: &str) -> Graphics {
    let layers = world.animations().set(set).map_or_else(
        || vec![ImageLayer::new("body", format!("{prefix} body"))],
        |set| {
            set.layers
                .iter()
                .map(|layer| ImageLayer::new(layer.as_str(), format!("{prefix} {layer}")))
                .collect()
        },
    );
    Graphics::new(layers)
}

// =============================================================================
// TANKS
// =============================================================================

fn tank(
    world: &mut World,
    id: EntityId,
    position: Vec2,
    tuning: &ActorTuning,
    faction: &str,
) -> SimResult<()> {
    let set = format!("{faction} tank");
    world.create_entity(id, Vec::new());
    world.set_property(id, props::HEALTH, tuning.health)?;
    world.set_property(id, props::MAX_HEALTH, tuning.health)?;
    world.set_property(id, props::XP, 0_i64)?;
    world.set_property(id, props::FACTION, faction)?;

    world.add_component(id, Transform::at(position))?;
    world.add_component(
        id,
        Physics::new(tuning.max_speed, tuning.accel, tuning.decel, tuning.friction),
    )?;
    let graphics = sprite(world, &set, faction);
    world.add_component(id, graphics)?;
    world.add_component(
        id,
        BarrelManager::new(
            vec![Barrel::new(
                0.0,
                tuning.collider_radius + MUZZLE_CLEARANCE,
                tuning.reload,
            )],
            BulletSpec::from(tuning),
        ),
    )?;
    world.add_component(
        id,
        Collider::new(tuning.collider_radius, CollisionCategory::Actors, id)
            .collides_with(&[CollisionCategory::Projectiles]),
    )?;
    world.add_component(id, HealthBar::default())?;
    world.add_component(id, Animator::new(set))?;
    Ok(())
}

/// Player tank. Becomes [`World::player`].
///
/// # Errors
///
/// Only if the entity vanished mid-assembly, which cannot happen while an
/// action is being applied.
pub fn player(world: &mut World, id: EntityId, position: Vec2) -> SimResult<()> {
    let tuning = world.config.player;
    tank(world, id, position, &tuning, "player")?;
    world.add_component(id, Controller::Player(PlayerController::default()))?;
    world.player = Some(id);
    world.play_animation(id, clips::SPAWN);
    debug!(entity = id.raw(), x = position.x, y = position.y, "player spawned");
    Ok(())
}

/// Enemy tank, already firing.
///
/// # Errors
///
/// As [`player`].
pub fn enemy(world: &mut World, id: EntityId, position: Vec2) -> SimResult<()> {
    let tuning = world.config.enemy;
    tank(world, id, position, &tuning, "enemy")?;
    world.add_component(
        id,
        Controller::Enemy(EnemyController {
            turn_rate: ENEMY_TURN_RATE,
        }),
    )?;
    world.get_mut::<BarrelManager>(id)?.firing = true;
    world.play_animation(id, clips::SPAWN);
    Ok(())
}

// =============================================================================
// PROJECTILES & PARTICLES
// =============================================================================

/// Bullet. The id is issued here.
///
/// # Errors
///
/// As [`player`].
pub fn bullet(world: &mut World, spawn: &BulletSpawn) -> SimResult<EntityId> {
    let id = world.reserve_id();
    world.create_entity(id, Vec::new());
    world.set_property(id, props::DAMAGE, spawn.damage)?;
    world.set_property(id, props::FACTION, spawn.faction.as_str())?;

    world.add_component(id, Transform::at(spawn.position).rotated(spawn.rotation))?;
    world.add_component(
        id,
        Physics::ballistic(Vec2::from_angle(spawn.rotation) * spawn.speed),
    )?;
    let graphics = sprite(world, "bullet", &spawn.faction);
    world.add_component(id, graphics)?;
    world.add_component(
        id,
        Collider::new(spawn.radius, CollisionCategory::Projectiles, spawn.shooter).collides_with(&[
            CollisionCategory::Actors,
            CollisionCategory::Projectiles,
            CollisionCategory::Shapes,
        ]),
    )?;
    world.add_component(id, LifeTimer::new(spawn.lifetime))?;
    world.add_component(id, Animator::new("bullet"))?;
    Ok(id)
}

/// Single particle. The id is issued here.
///
/// # Errors
///
/// As [`player`].
pub fn particle(world: &mut World, spawn: &ParticleSpawn) -> SimResult<EntityId> {
    let id = world.reserve_id();
    world.create_entity(id, Vec::new());
    world.add_component(
        id,
        Transform::at(spawn.position)
            .rotated(spawn.rotation)
            .scaled(spawn.scale),
    )?;
    world.add_component(
        id,
        Physics::coasting(spawn.velocity, particle_decel(spawn.scale)).with_spin(spawn.spin, Some(1.0)),
    )?;
    world.add_component(
        id,
        Graphics::new(vec![
            ImageLayer::new("body", spawn.sheet.as_str()).with_image(spawn.image.as_str())
        ]),
    )?;
    world.add_component(id, LifeTimer::new(spawn.lifetime))?;
    world.add_component(id, Animator::new("particle"))?;
    Ok(id)
}

/// `count` random particles around `origin`.
///
/// # Errors
///
/// As [`player`].
pub fn particle_burst(
    world: &mut World,
    origin: Vec2,
    count: u32,
    style: ParticleStyle,
    tint: &str,
) -> SimResult<()> {
    for _ in 0..count {
        let spawn = ParticleSpawn::random(&mut world.rng, origin, style, tint);
        particle(world, &spawn)?;
    }
    Ok(())
}

// =============================================================================
// SHAPES & PICKUPS
// =============================================================================

/// Static destructible shape. Drops `xp` where it stood when destroyed.
///
/// # Errors
///
/// As [`player`].
pub fn shape(world: &mut World, id: EntityId, position: Vec2, health: i64, xp: i64) -> SimResult<()> {
    world.create_entity(id, vec![Action::DropExperience { position, xp }]);
    world.set_property(id, props::HEALTH, health)?;
    world.set_property(id, props::MAX_HEALTH, health)?;
    world.set_property(id, props::FACTION, "shape")?;

    let facing = world.rng.gen_range(0.0..360.0);
    let spin = world.rng.gen_range(-0.5..0.5);
    world.add_component(id, Transform::at(position).rotated(facing))?;
    world.add_component(id, Physics::ballistic(Vec2::ZERO).with_spin(spin, None))?;
    let graphics = sprite(world, "shape", "shape");
    world.add_component(id, graphics)?;
    world.add_component(
        id,
        Collider::new(SHAPE_RADIUS, CollisionCategory::Shapes, id)
            .collides_with(&[CollisionCategory::Projectiles]),
    )?;
    world.add_component(id, HealthBar::default())?;
    world.add_component(id, Animator::new("shape"))?;
    world.play_animation(id, clips::SPAWN);
    Ok(())
}

/// `count` shapes at uniform positions inside `min..max`.
///
/// # Errors
///
/// As [`player`].
pub fn scatter_shapes(world: &mut World, count: u32, min: Vec2, max: Vec2) -> SimResult<()> {
    for _ in 0..count {
        let position = Vec2::new(
            sample(&mut world.rng, min.x, max.x),
            sample(&mut world.rng, min.y, max.y),
        );
        let health = world.rng.gen_range(20..=40_i64);
        let id = world.reserve_id();
        shape(world, id, position, health, health / 2)?;
    }
    Ok(())
}

/// Uniform in `low..high`, or `low` when the range is empty.
fn sample(rng: &mut impl Rng, low: f32, high: f32) -> f32 {
    if high > low {
        rng.gen_range(low..high)
    } else {
        low
    }
}

/// Experience pickup. The id is issued here.
///
/// # Errors
///
/// As [`player`].
pub fn collectible(world: &mut World, position: Vec2, xp: i64) -> SimResult<EntityId> {
    let id = world.reserve_id();
    world.create_entity(id, Vec::new());
    world.set_property(id, props::XP, xp)?;
    world.set_property(id, props::FACTION, "experience")?;

    world.add_component(id, Transform::at(position))?;
    let graphics = sprite(world, "collectible", "experience");
    world.add_component(id, graphics)?;
    world.add_component(
        id,
        Collider::new(COLLECTIBLE_RADIUS, CollisionCategory::Collectibles, id)
            .collides_with(&[CollisionCategory::Actors]),
    )?;
    world.add_component(id, Animator::new("collectible"))?;
    world.play_animation(id, clips::SPAWN);
    Ok(id)
}

// =============================================================================
// EFFECTS & UI
// =============================================================================

/// Entity that only plays `animation` of `set`, then dies and queues
/// `on_death`. An unknown animation destroys it at once.
///
/// # Errors
///
/// As [`player`].
pub fn effect(
    world: &mut World,
    id: EntityId,
    set: &str,
    animation: &str,
    position: Vec2,
    on_death: Vec<Action>,
) -> SimResult<()> {
    world.create_entity(id, on_death);
    world.add_component(id, Transform::at(position))?;
    let graphics = sprite(world, set, set);
    world.add_component(id, graphics)?;
    world.add_component(id, Animator::new(set))?;
    if !world.play_animation(id, animation) {
        world.destroy_entity(id);
    }
    Ok(())
}

/// Screen-space text.
///
/// # Errors
///
/// As [`player`].
pub fn label(
    world: &mut World,
    id: EntityId,
    text: String,
    anchor: Anchor,
    position: Vec2,
) -> SimResult<()> {
    world.create_entity(id, Vec::new());
    world.add_component(
        id,
        Ui {
            text,
            anchor,
            position,
        },
    )?;
    Ok(())
}
