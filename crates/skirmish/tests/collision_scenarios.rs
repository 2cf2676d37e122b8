//! Integration tests for collision detection and its gameplay outcomes.

use skirmish::collision::detect;
use skirmish::{
    clips, props, Action, Animator, BulletSpawn, Collider, CollisionCategory, EntityId, Transform,
    Vec2, World,
};

use CollisionCategory::{Actors, Shapes};

fn world() -> World {
    World::with_defaults().unwrap()
}

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

fn still_bullet(shooter: EntityId, position: Vec2) -> Action {
    Action::SpawnBullet(BulletSpawn {
        shooter,
        position,
        rotation: 0.0,
        speed: 0.0,
        damage: 10,
        lifetime: 3.0,
        radius: 6.0,
        faction: "enemy".into(),
    })
}

#[test]
fn test_symmetric_pair_seen_from_both_sides() {
    let mut world = world();
    let a = body(&mut world, Vec2::ZERO, 10.0, Actors, &[Shapes]);
    let b = body(&mut world, Vec2::new(15.0, 0.0), 10.0, Shapes, &[Actors]);

    let contacts = detect(&world);
    assert_eq!(contacts.len(), 2);
    assert!(contacts.iter().any(|c| c.this == a && c.other == b));
    assert!(contacts.iter().any(|c| c.this == b && c.other == a));
}

#[test]
fn test_asymmetric_pair_seen_from_querying_side() {
    let mut world = world();
    let a = body(&mut world, Vec2::ZERO, 10.0, Actors, &[Shapes]);
    let b = body(&mut world, Vec2::new(15.0, 0.0), 10.0, Shapes, &[]);

    let contacts = detect(&world);
    assert_eq!(contacts.len(), 1);
    assert_eq!((contacts[0].this, contacts[0].other), (a, b));
    assert_eq!(contacts[0].other_category, Shapes);
}

#[test]
fn test_pair_spanning_many_cells_reported_once_per_side() {
    let mut world = world();
    // Both circles straddle the cell boundary at x = 64.
    body(&mut world, Vec2::new(60.0, 63.0), 30.0, Actors, &[Actors]);
    body(&mut world, Vec2::new(70.0, 66.0), 30.0, Actors, &[Actors]);
    assert_eq!(detect(&world).len(), 2);
}

#[test]
fn test_two_projectiles_collide_exactly_once() {
    let mut world = world();
    world.push_action(still_bullet(EntityId::new(900), Vec2::new(62.0, 0.0)));
    world.push_action(still_bullet(EntityId::new(901), Vec2::new(66.0, 0.0)));
    world.step(0.01);
    let bullets = world.entity_ids();
    assert_eq!(bullets.len(), 2);
    assert_eq!(detect(&world).len(), 2);

    world.step(0.01);
    assert_eq!(world.stats().projectile_hits, 2);
    for &bullet in &bullets {
        assert!(!world.get::<Collider>(bullet).unwrap().is_active());
        let destroys = world
            .pending_actions()
            .iter()
            .filter(|action| **action == Action::Destroy(bullet))
            .count();
        assert_eq!(destroys, 1);
    }

    for _ in 0..10 {
        world.step(0.01);
    }
    assert_eq!(world.stats().projectile_hits, 2);
    assert!(bullets.iter().all(|&bullet| !world.is_alive(bullet)));
}

#[test]
fn test_bullet_never_hits_its_shooter() {
    let mut world = world();
    let tank = world.reserve_id();
    world.push_action(Action::SpawnEnemy {
        id: tank,
        position: Vec2::ZERO,
    });
    world.step(0.01);
    world.push_action(still_bullet(tank, Vec2::ZERO));

    for _ in 0..5 {
        world.step(0.01);
    }
    assert_eq!(world.stats().projectile_hits, 0);
    assert_eq!(
        world.int_property(tank, props::HEALTH).unwrap(),
        world.config().enemy.health
    );
}

#[test]
fn test_bullet_damages_enemy() {
    let mut world = world();
    let tank = world.reserve_id();
    world.push_action(Action::SpawnEnemy {
        id: tank,
        position: Vec2::ZERO,
    });
    world.push_action(still_bullet(EntityId::new(900), Vec2::new(20.0, 0.0)));
    world.step(0.01);
    world.step(0.01);

    assert_eq!(
        world.int_property(tank, props::HEALTH).unwrap(),
        world.config().enemy.health - 10
    );
    assert!(world.get::<Animator>(tank).unwrap().is_playing(clips::DAMAGED));
    assert_eq!(world.stats().projectile_hits, 1);
}

#[test]
fn test_experience_is_dropped_and_collected() {
    let mut world = world();
    let player = world.reserve_id();
    let shape = world.reserve_id();
    world.push_action(Action::SpawnPlayer {
        id: player,
        position: Vec2::ZERO,
    });
    world.push_action(Action::SpawnShape {
        id: shape,
        position: Vec2::new(10.0, 0.0),
        health: 30,
        xp: 15,
    });
    world.step(0.01);
    world.push_action(Action::Damage {
        target: shape,
        amount: 100,
    });

    for _ in 0..100 {
        world.step(0.01);
    }
    assert!(!world.is_alive(shape));
    assert_eq!(world.int_property(player, props::XP).unwrap(), 15);
    assert_eq!(world.grid(CollisionCategory::Collectibles).occupied_cells(), 0);
}
