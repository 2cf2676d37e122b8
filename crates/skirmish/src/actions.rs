//! # Actions
//!
//! Every entity mutation triggered by gameplay is an [`Action`] pushed onto
//! the [`ActionQueue`] and applied at the next drain, in submission order.
//!
//! ## Drain semantics
//!
//! A drain takes the queue as it stands and applies exactly those actions.
//! Anything queued while draining (on-death spawns, follow-up kills) waits
//! for the next drain, so one drain can never cascade.
//!
//! ## Dead targets
//!
//! Applying an action addressed to a dead entity does nothing. Destroy
//! followed by any other action on the same id is always safe.

use skirmish_core::{EntityId, PropertyValue};
use skirmish_shared::Vec2;
use tracing::{debug, trace, warn};

use crate::animation::Animator;
use crate::barrel::BarrelManager;
use crate::components::{Anchor, Collider, Physics};
use crate::controller::{Controller, Direction};
use crate::error::SimResult;
use crate::spawn::{self, BulletSpawn, ParticleSpawn, ParticleStyle};
use crate::world::World;

/// Property keys shared by actions and spawners.
pub mod props {
    /// Current health (int)
    pub const HEALTH: &str = "health";
    /// Health cap (int)
    pub const MAX_HEALTH: &str = "max_health";
    /// Damage dealt on hit (int)
    pub const DAMAGE: &str = "damage";
    /// Experience carried or collected (int)
    pub const XP: &str = "xp";
    /// Particle tint / team name (text)
    pub const FACTION: &str = "faction";
    /// Set once the entity started dying (bool)
    pub const DYING: &str = "dying";
    /// Set once a collectible was picked up (bool)
    pub const COLLECTED: &str = "collected";
}

/// Animation names the gameplay actions request.
pub mod clips {
    /// Played on spawn
    pub const SPAWN: &str = "spawn";
    /// Played when health hits zero
    pub const DIE: &str = "die";
    /// Played on a non-lethal hit
    pub const DAMAGED: &str = "damaged";
    /// Played on heal
    pub const HEALING: &str = "healing";
    /// Played when a life timer runs out
    pub const EXPIRED: &str = "expired";
    /// Played when a projectile hits something
    pub const COLLIDED: &str = "collided";
    /// Played when a collectible is picked up
    pub const COLLECTED: &str = "collected experience";
    /// Played on every shot
    pub const SHOOT_BARREL: &str = "shoot barrel";
}

/// A deferred mutation.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    // ===== SPAWNS =====
    /// Player tank, becomes the world's player
    SpawnPlayer {
        /// Reserved id
        id: EntityId,
        /// Spawn point
        position: Vec2,
    },
    /// Enemy tank, starts firing as soon as it exists
    SpawnEnemy {
        /// Reserved id
        id: EntityId,
        /// Spawn point
        position: Vec2,
    },
    /// Bullet fired by a barrel
    SpawnBullet(BulletSpawn),
    /// Single decorative particle
    SpawnParticle(ParticleSpawn),
    /// Burst of random particles, ids issued on apply
    SpawnParticleBurst {
        /// Burst centre
        origin: Vec2,
        /// Number of particles
        count: u32,
        /// Particle look
        style: ParticleStyle,
        /// Image suffix ("player", "enemy"...)
        tint: String,
    },
    /// Static destructible shape
    SpawnShape {
        /// Reserved id
        id: EntityId,
        /// Position
        position: Vec2,
        /// Starting health
        health: i64,
        /// Experience dropped on destruction
        xp: i64,
    },
    /// `count` shapes scattered uniformly inside `min..max`
    ScatterShapes {
        /// Number of shapes
        count: u32,
        /// Lower corner
        min: Vec2,
        /// Upper corner
        max: Vec2,
    },
    /// Experience pickup, id issued on apply
    DropExperience {
        /// Position
        position: Vec2,
        /// Experience carried
        xp: i64,
    },
    /// Animation-only entity; `on_death` runs when the animation ends
    SpawnEffect {
        /// Reserved id
        id: EntityId,
        /// Animation set
        set: String,
        /// Animation to play; must end with a destroy
        animation: String,
        /// Position
        position: Vec2,
        /// Actions queued when the effect is destroyed
        on_death: Vec<Action>,
    },
    /// Screen-space text
    SpawnLabel {
        /// Reserved id
        id: EntityId,
        /// Text
        text: String,
        /// Anchor
        anchor: Anchor,
        /// Screen position
        position: Vec2,
    },

    // ===== CONTROL =====
    /// Start every barrel of `id`
    StartFiring(EntityId),
    /// Stop every barrel of `id`
    StopFiring(EntityId),
    /// Movement key pressed or released
    Move {
        /// Player entity
        id: EntityId,
        /// Direction of the key
        direction: Direction,
        /// Pressed (true) or released
        pressed: bool,
    },
    /// Pointer moved (screen coordinates)
    Aim {
        /// Player entity
        id: EntityId,
        /// Pointer position on screen
        pointer: Vec2,
    },

    // ===== GAMEPLAY =====
    /// Lower health, kill at zero
    Damage {
        /// Entity hit
        target: EntityId,
        /// Health removed
        amount: i64,
    },
    /// Raise health up to the max
    Heal {
        /// Entity healed
        target: EntityId,
        /// Health restored
        amount: i64,
    },
    /// Start dying: "die" animation if the entity has one, else destroy
    Kill(EntityId),
    /// Remove the entity now
    Destroy(EntityId),
    /// Life timer ran out
    Expire(EntityId),
    /// Projectile hit something
    Collided(EntityId),
    /// Collectible touched by an actor
    Collect {
        /// Collectible
        item: EntityId,
        /// Actor picking it up
        collector: EntityId,
    },
    /// Play a named animation of the entity's set
    PlayAnimation {
        /// Animated entity
        id: EntityId,
        /// Animation name
        name: String,
    },
    /// Write a property
    SetProperty {
        /// Entity
        id: EntityId,
        /// Key
        key: String,
        /// Value
        value: PropertyValue,
    },

    // ===== CAMERA =====
    /// Follow `id`, optionally jumping straight to it
    FocusCamera {
        /// Entity to follow
        id: EntityId,
        /// Skip the pan
        jump: bool,
    },
    /// Stop following and centre on a point
    PositionCamera(Vec2),
}

impl Action {
    /// Entity the action is addressed to, `None` for world-scoped actions.
    #[must_use]
    pub fn target(&self) -> Option<EntityId> {
        match self {
            Self::SpawnPlayer { .. }
            | Self::SpawnEnemy { .. }
            | Self::SpawnBullet(_)
            | Self::SpawnParticle(_)
            | Self::SpawnParticleBurst { .. }
            | Self::SpawnShape { .. }
            | Self::ScatterShapes { .. }
            | Self::DropExperience { .. }
            | Self::SpawnEffect { .. }
            | Self::SpawnLabel { .. }
            | Self::PositionCamera(_) => None,
            Self::StartFiring(id)
            | Self::StopFiring(id)
            | Self::Kill(id)
            | Self::Destroy(id)
            | Self::Expire(id)
            | Self::Collided(id)
            | Self::Move { id, .. }
            | Self::Aim { id, .. }
            | Self::PlayAnimation { id, .. }
            | Self::SetProperty { id, .. }
            | Self::FocusCamera { id, .. } => Some(*id),
            Self::Damage { target, .. } | Self::Heal { target, .. } => Some(*target),
            Self::Collect { item, .. } => Some(*item),
        }
    }

    /// Applies the action. Dead targets are skipped silently.
    pub fn execute(self, world: &mut World) {
        if let Some(target) = self.target() {
            if !world.is_alive(target) {
                trace!(entity = target.raw(), action = ?self, "action target dead, skipped");
                return;
            }
        }

        match self {
            Self::SpawnPlayer { id, position } => report("player", spawn::player(world, id, position)),
            Self::SpawnEnemy { id, position } => report("enemy", spawn::enemy(world, id, position)),
            Self::SpawnBullet(bullet) => report("bullet", spawn::bullet(world, &bullet)),
            Self::SpawnParticle(particle) => report("particle", spawn::particle(world, &particle)),
            Self::SpawnParticleBurst {
                origin,
                count,
                style,
                tint,
            } => report(
                "particle burst",
                spawn::particle_burst(world, origin, count, style, &tint),
            ),
            Self::SpawnShape {
                id,
                position,
                health,
                xp,
            } => report("shape", spawn::shape(world, id, position, health, xp)),
            Self::ScatterShapes { count, min, max } => {
                report("shapes", spawn::scatter_shapes(world, count, min, max));
            }
            Self::DropExperience { position, xp } => {
                report("collectible", spawn::collectible(world, position, xp));
            }
            Self::SpawnEffect {
                id,
                set,
                animation,
                position,
                on_death,
            } => report(
                "effect",
                spawn::effect(world, id, &set, &animation, position, on_death),
            ),
            Self::SpawnLabel {
                id,
                text,
                anchor,
                position,
            } => report("label", spawn::label(world, id, text, anchor, position)),
            Self::StartFiring(id) => set_firing(world, id, true),
            Self::StopFiring(id) => set_firing(world, id, false),
            Self::Move {
                id,
                direction,
                pressed,
            } => {
                if let Ok(Controller::Player(player)) = world.get_mut::<Controller>(id) {
                    player.held.set(direction, pressed);
                }
            }
            Self::Aim { id, pointer } => {
                if let Ok(Controller::Player(player)) = world.get_mut::<Controller>(id) {
                    player.pointer = pointer;
                }
            }
            Self::Damage { target, amount } => damage(world, target, amount),
            Self::Heal { target, amount } => heal(world, target, amount),
            Self::Kill(id) => kill(world, id),
            Self::Destroy(id) => {
                world.destroy_entity(id);
            }
            Self::Expire(id) => expire(world, id),
            Self::Collided(id) => collided(world, id),
            Self::Collect { item, collector } => collect(world, item, collector),
            Self::PlayAnimation { id, name } => {
                world.play_animation(id, &name);
            }
            Self::SetProperty { id, key, value } => {
                let _ = world.set_property(id, key, value);
            }
            Self::FocusCamera { id, jump } => {
                if let Err(err) = world.set_camera_target(id, jump) {
                    warn!(%err, "camera focus failed");
                }
            }
            Self::PositionCamera(center) => world.position_camera(center),
        }
    }
}

// =============================================================================
// QUEUE
// =============================================================================

/// FIFO of pending actions.
#[derive(Clone, Debug, Default)]
pub struct ActionQueue {
    pending: Vec<Action>,
}

impl ActionQueue {
    /// Creates an empty queue.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    /// Appends an action.
    #[inline]
    pub fn push(&mut self, action: Action) {
        self.pending.push(action);
    }

    /// Number of pending actions.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// True when nothing is pending.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Pending actions in submission order.
    #[must_use]
    pub fn pending(&self) -> &[Action] {
        &self.pending
    }

    /// Takes the current batch and leaves the queue empty.
    #[must_use]
    pub fn take_batch(&mut self) -> Vec<Action> {
        std::mem::take(&mut self.pending)
    }
}

impl Extend<Action> for ActionQueue {
    fn extend<I: IntoIterator<Item = Action>>(&mut self, iter: I) {
        self.pending.extend(iter);
    }
}

impl World {
    /// Applies every action queued before this call. Returns how many ran.
    pub fn drain_actions(&mut self) -> usize {
        let batch = self.actions.take_batch();
        let count = batch.len();
        for action in batch {
            action.execute(self);
        }
        self.stats.actions_applied += count as u64;
        if count > 16 {
            debug!(count, "action drain");
        }
        count
    }
}

// =============================================================================
// GAMEPLAY EFFECTS
// =============================================================================

/// Logs a spawn that could not be completed.
fn report<T>(what: &'static str, result: SimResult<T>) {
    if let Err(err) = result {
        warn!(%err, what, "spawn failed");
    }
}

fn set_firing(world: &mut World, id: EntityId, firing: bool) {
    if let Ok(manager) = world.get_mut::<BarrelManager>(id) {
        manager.firing = firing;
    }
}

fn is_flagged(world: &World, id: EntityId, key: &str) -> bool {
    world
        .property(id, key)
        .ok()
        .and_then(PropertyValue::as_bool)
        .unwrap_or(false)
}

/// True if `id` has an animator whose set defines `clip`.
fn has_clip(world: &World, id: EntityId, clip: &str) -> bool {
    world
        .get::<Animator>(id)
        .is_ok_and(|animator| world.animations().contains(&animator.set, clip))
}

fn damage(world: &mut World, target: EntityId, amount: i64) {
    if is_flagged(world, target, props::DYING) {
        return;
    }
    let Ok(health) = world.int_property(target, props::HEALTH) else {
        return;
    };
    let health = health - amount;
    let _ = world.set_property(target, props::HEALTH, health);

    if health <= 0 {
        kill(world, target);
    } else if has_clip(world, target, clips::DAMAGED) {
        world.play_animation(target, clips::DAMAGED);
    }
}

fn heal(world: &mut World, target: EntityId, amount: i64) {
    let (Ok(health), Ok(max)) = (
        world.int_property(target, props::HEALTH),
        world.int_property(target, props::MAX_HEALTH),
    ) else {
        return;
    };
    let _ = world.set_property(target, props::HEALTH, (health + amount).min(max));
    if has_clip(world, target, clips::HEALING) {
        world.play_animation(target, clips::HEALING);
    }
}

/// Starts the death of `id` once. Dying entities stop shooting and colliding.
fn kill(world: &mut World, id: EntityId) {
    if is_flagged(world, id, props::DYING) {
        return;
    }
    let _ = world.set_property(id, props::DYING, true);
    world.deactivate_collider(id);
    set_firing(world, id, false);

    if has_clip(world, id, clips::DIE) {
        world.play_animation(id, clips::DIE);
    } else {
        world.destroy_entity(id);
    }
}

fn expire(world: &mut World, id: EntityId) {
    world.stats.expirations += 1;
    if has_clip(world, id, clips::EXPIRED) {
        world.deactivate_collider(id);
        world.play_animation(id, clips::EXPIRED);
    } else {
        world.destroy_entity(id);
    }
}

fn collided(world: &mut World, id: EntityId) {
    if !world.get::<Collider>(id).is_ok_and(Collider::is_active) {
        return;
    }
    world.stats.projectile_hits += 1;
    world.deactivate_collider(id);
    if let Ok(physics) = world.get_mut::<Physics>(id) {
        physics.velocity = Vec2::ZERO;
        physics.target_velocity = Vec2::ZERO;
    }

    if has_clip(world, id, clips::COLLIDED) {
        world.play_animation(id, clips::COLLIDED);
    } else {
        world.destroy_entity(id);
    }
}

fn collect(world: &mut World, item: EntityId, collector: EntityId) {
    if !world.is_alive(collector) || is_flagged(world, item, props::COLLECTED) {
        return;
    }
    let xp = world.int_property(item, props::XP).unwrap_or(0);
    let gained = world.int_property(collector, props::XP).unwrap_or(0) + xp;
    let _ = world.set_property(collector, props::XP, gained);
    let _ = world.set_property(item, props::COLLECTED, true);
    world.deactivate_collider(item);

    if has_clip(world, item, clips::COLLECTED) {
        world.play_animation(item, clips::COLLECTED);
    } else {
        world.destroy_entity(item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_take_batch_empties() {
        let mut queue = ActionQueue::new();
        queue.push(Action::Destroy(EntityId::new(1)));
        queue.push(Action::Kill(EntityId::new(2)));
        assert_eq!(queue.len(), 2);

        let batch = queue.take_batch();
        assert_eq!(batch.len(), 2);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_targets() {
        let id = EntityId::new(3);
        assert_eq!(Action::Destroy(id).target(), Some(id));
        assert_eq!(
            Action::Damage {
                target: id,
                amount: 1
            }
            .target(),
            Some(id)
        );
        assert_eq!(Action::PositionCamera(Vec2::ZERO).target(), None);
    }
}
