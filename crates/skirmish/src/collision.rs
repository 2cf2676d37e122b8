//! # Collision
//!
//! Runs once per fixed step, in three passes:
//!
//! 1. **Membership**: every active collider is relocated in its category
//!    grid to match its transform.
//! 2. **Detection**: each active collider queries the grids of its
//!    collidable categories and keeps the candidates whose circles overlap.
//!    Pairs sharing a parent are skipped.
//! 3. **Dispatch**: contacts are turned into actions by category pair.
//!
//! Contacts are reported from the querying collider's side only. A pair
//! where both sides list each other is seen twice, once from each side,
//! and each side's handler acts on its own entity.

use std::collections::BTreeSet;

use skirmish_core::{ComponentKind, EntityId};
use skirmish_shared::CollisionCategory;
use tracing::trace;

use crate::actions::{props, Action};
use crate::components::Collider;
use crate::world::World;

/// One overlapping pair, seen from `this`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Contact {
    /// Collider that ran the query
    pub this: EntityId,
    /// Its category
    pub this_category: CollisionCategory,
    /// Collider found
    pub other: EntityId,
    /// Its category
    pub other_category: CollisionCategory,
}

/// Membership, detection and dispatch for one step.
pub(crate) fn step(world: &mut World) {
    update_membership(world);
    let contacts = detect(world);
    dispatch(world, &contacts);
}

/// Brings every active collider's grid cells up to date.
pub fn update_membership(world: &mut World) {
    let World {
        colliders,
        transforms,
        entities,
        grids,
        ..
    } = world;

    for (_, owner, collider) in colliders.iter_mut() {
        if !collider.active {
            continue;
        }
        let Some(position) = entities
            .slot(owner, ComponentKind::Transform)
            .ok()
            .and_then(|slot| transforms.get(slot))
            .map(|transform| transform.position)
        else {
            continue;
        };

        let center = position + collider.offset;
        let grid = &mut grids[collider.category.index()];
        collider.cells = Some(match collider.cells {
            Some(previous) => grid.relocate(owner, previous, center, collider.radius),
            None => grid.insert(owner, center, collider.radius),
        });
    }
}

/// Every overlapping pair, in collider slot order then candidate id order.
#[must_use]
pub fn detect(world: &World) -> Vec<Contact> {
    let mut contacts = Vec::new();
    let mut candidates = BTreeSet::new();

    for (_, owner, collider) in world.colliders.iter() {
        if !collider.active {
            continue;
        }
        let Some(center) = world.collider_center(owner) else {
            continue;
        };

        candidates.clear();
        for category in &collider.collidable {
            let grid = world.grid(*category);
            grid.query_into(grid.range_of(center, collider.radius), owner, &mut candidates);
        }

        for &other in &candidates {
            let Ok(found) = world.get::<Collider>(other) else {
                continue;
            };
            if !found.active || found.parent == collider.parent {
                continue;
            }
            let Some(other_center) = world.collider_center(other) else {
                continue;
            };

            let reach = collider.radius + found.radius;
            if center.distance_squared(other_center) < reach * reach {
                trace!(
                    this = owner.raw(),
                    other = other.raw(),
                    this_category = %collider.category,
                    other_category = %found.category,
                    "contact"
                );
                contacts.push(Contact {
                    this: owner,
                    this_category: collider.category,
                    other,
                    other_category: found.category,
                });
            }
        }
    }
    contacts
}

/// Queues the gameplay outcome of each contact.
///
/// A projectile is disposed of at most once per step however many things it
/// touches; the same holds for a collectible.
pub fn dispatch(world: &mut World, contacts: &[Contact]) {
    use CollisionCategory::{Actors, Collectibles, Projectiles, Shapes};

    let mut disposed = BTreeSet::new();
    for contact in contacts {
        let action = match (contact.this_category, contact.other_category) {
            (Projectiles, _) => disposed
                .insert(contact.this)
                .then_some(Action::Collided(contact.this)),
            (Actors | Shapes, Projectiles) => Some(Action::Damage {
                target: contact.this,
                amount: world.int_property(contact.other, props::DAMAGE).unwrap_or(0),
            }),
            (Collectibles, Actors) => disposed.insert(contact.this).then_some(Action::Collect {
                item: contact.this,
                collector: contact.other,
            }),
            _ => None,
        };
        if let Some(action) = action {
            world.push_action(action);
        }
    }
}

#[cfg(test)]
mod tests {
    use skirmish_shared::Vec2;

    use super::*;
    use crate::components::Transform;

    fn body(
        world: &mut World,
        position: Vec2,
        radius: f32,
        category: CollisionCategory,
        collidable: &[CollisionCategory],
    ) -> EntityId {
        let id = world.reserve_id();
        world.create_entity(id, Vec::new());
        world.add_component(id, Transform::at(position)).unwrap();
        world
            .add_component(id, Collider::new(radius, category, id).collides_with(collidable))
            .unwrap();
        id
    }

    #[test]
    fn test_membership_follows_transform() {
        let mut world = World::with_defaults().unwrap();
        let id = body(&mut world, Vec2::new(10.0, 10.0), 5.0, CollisionCategory::Actors, &[]);
        world.get_mut::<Transform>(id).unwrap().position = Vec2::new(300.0, 10.0);

        update_membership(&mut world);
        let cells = world.get::<Collider>(id).unwrap().cells().unwrap();
        assert_eq!(
            world.grid(CollisionCategory::Actors).cells_of(id),
            cells.cells().collect::<BTreeSet<_>>()
        );
        assert_eq!(cells.min.x, 4);
    }

    #[test]
    fn test_overlap_is_strict() {
        let mut world = World::with_defaults().unwrap();
        let a = body(
            &mut world,
            Vec2::ZERO,
            5.0,
            CollisionCategory::Shapes,
            &[CollisionCategory::Shapes],
        );
        let b = body(
            &mut world,
            Vec2::new(10.0, 0.0),
            5.0,
            CollisionCategory::Shapes,
            &[CollisionCategory::Shapes],
        );
        assert!(detect(&world).is_empty());

        world.get_mut::<Transform>(b).unwrap().position = Vec2::new(9.0, 0.0);
        update_membership(&mut world);
        let contacts = detect(&world);
        assert_eq!(contacts.len(), 2);
        assert_eq!(contacts[0].this, a);
        assert_eq!(contacts[0].other, b);
    }

    #[test]
    fn test_shared_parent_never_collides() {
        let mut world = World::with_defaults().unwrap();
        let shooter = body(
            &mut world,
            Vec2::ZERO,
            20.0,
            CollisionCategory::Actors,
            &[CollisionCategory::Projectiles],
        );
        let bullet = world.reserve_id();
        world.create_entity(bullet, Vec::new());
        world.add_component(bullet, Transform::at(Vec2::ZERO)).unwrap();
        world
            .add_component(
                bullet,
                Collider::new(4.0, CollisionCategory::Projectiles, shooter)
                    .collides_with(&[CollisionCategory::Actors]),
            )
            .unwrap();

        assert!(detect(&world).is_empty());
    }

    #[test]
    fn test_dispatch_disposes_projectile_once() {
        let mut world = World::with_defaults().unwrap();
        let bullet = EntityId::new(1);
        let contacts = [
            Contact {
                this: bullet,
                this_category: CollisionCategory::Projectiles,
                other: EntityId::new(2),
                other_category: CollisionCategory::Actors,
            },
            Contact {
                this: bullet,
                this_category: CollisionCategory::Projectiles,
                other: EntityId::new(3),
                other_category: CollisionCategory::Shapes,
            },
        ];
        dispatch(&mut world, &contacts);
        assert_eq!(world.pending_actions(), &[Action::Collided(bullet)]);
    }

    #[test]
    fn test_dispatch_ignores_unhandled_pairs() {
        let mut world = World::with_defaults().unwrap();
        dispatch(
            &mut world,
            &[Contact {
                this: EntityId::new(1),
                this_category: CollisionCategory::Actors,
                other: EntityId::new(2),
                other_category: CollisionCategory::Shapes,
            }],
        );
        assert!(world.pending_actions().is_empty());
    }
}
