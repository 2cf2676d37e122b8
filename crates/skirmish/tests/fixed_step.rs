//! Integration tests for the fixed-timestep driver: determinism under
//! different frame chunkings, bounded lifetimes and snapshots.

use std::time::Duration;

use skirmish::{
    clips, props, Action, Animator, BulletSpawn, Collider, EntityId, GameLoop, InputEvent, Key,
    MouseButton, SimulationConfig, Transform, Vec2, World,
};

/// Splits `total_ms` into frames cycling through `pattern`, the last one
/// trimmed so the sum is exact.
fn frames(total_ms: u64, pattern: &[u64]) -> Vec<Duration> {
    let mut left = total_ms;
    let mut out = Vec::new();
    for &ms in pattern.iter().cycle() {
        if left == 0 {
            break;
        }
        let ms = ms.min(left);
        out.push(Duration::from_millis(ms));
        left -= ms;
    }
    out
}

fn game() -> GameLoop {
    GameLoop::from_config(SimulationConfig {
        seed: 99,
        ..SimulationConfig::default()
    })
    .unwrap()
}

/// Sets up a small battle and plays it out over `pattern`-sized frames.
fn battle(pattern: &[u64]) -> World {
    let mut game = game();
    {
        let world = game.world_mut();
        let player = world.reserve_id();
        world.push_action(Action::SpawnPlayer {
            id: player,
            position: Vec2::new(300.0, 300.0),
        });
        world.push_action(Action::FocusCamera {
            id: player,
            jump: true,
        });
        for (i, x) in [100.0, 500.0].into_iter().enumerate() {
            let enemy = world.reserve_id();
            world.push_action(Action::SpawnEnemy {
                id: enemy,
                position: Vec2::new(x, 80.0 + 40.0 * i as f32),
            });
        }
        world.push_action(Action::ScatterShapes {
            count: 12,
            min: Vec2::ZERO,
            max: Vec2::new(600.0, 600.0),
        });
    }
    // One exact step applies the spawns so input has controllers to reach.
    assert_eq!(game.advance(Duration::from_millis(10)).steps, 1);

    game.handle_input(InputEvent::KeyDown(Key::Char('w')));
    game.handle_input(InputEvent::KeyDown(Key::Char('d')));
    game.handle_input(InputEvent::MouseMotion(Vec2::new(100.0, 40.0)));
    game.handle_input(InputEvent::MouseDown(MouseButton::Left));

    for frame in frames(2_990, pattern) {
        game.advance(frame);
    }
    assert_eq!(game.world().stats().steps, 300);
    game.into_world()
}

#[derive(Debug, PartialEq)]
struct Fingerprint {
    alive: Vec<EntityId>,
    transforms: Vec<(EntityId, Vec2, f32)>,
    health: Vec<(EntityId, i64)>,
    pending: Vec<Action>,
}

fn fingerprint(world: &World) -> Fingerprint {
    let alive = world.entity_ids();
    let transforms = alive
        .iter()
        .filter_map(|&id| {
            world
                .get::<Transform>(id)
                .ok()
                .map(|t| (id, t.position, t.rotation))
        })
        .collect();
    let health = alive
        .iter()
        .filter_map(|&id| world.int_property(id, props::HEALTH).ok().map(|h| (id, h)))
        .collect();
    Fingerprint {
        alive,
        transforms,
        health,
        pending: world.pending_actions().to_vec(),
    }
}

#[test]
fn test_chunking_does_not_change_the_outcome() {
    let reference = fingerprint(&battle(&[10]));
    assert!(reference.alive.len() > 3);

    for pattern in [&[16][..], &[33, 7, 1, 50], &[3, 250, 9, 12, 1]] {
        assert_eq!(fingerprint(&battle(pattern)), reference, "pattern {pattern:?}");
    }
}

#[test]
fn test_bullet_expires_exactly_once() {
    let mut game = game();
    game.world_mut().push_action(Action::SpawnBullet(BulletSpawn {
        shooter: EntityId::new(500),
        position: Vec2::ZERO,
        rotation: 45.0,
        speed: 300.0,
        damage: 1,
        lifetime: 3.0,
        radius: 4.0,
        faction: "player".into(),
    }));

    for frame in frames(3_100, &[7, 16, 33, 4]) {
        game.advance(frame);
    }
    let world = game.world();
    assert_eq!(world.stats().expirations, 1);
    if let Some(&bullet) = world.entity_ids().first() {
        assert!(!world.get::<Collider>(bullet).unwrap().is_active());
        assert!(world.get::<Animator>(bullet).unwrap().is_playing(clips::EXPIRED));
    }

    for frame in frames(500, &[20]) {
        game.advance(frame);
    }
    assert_eq!(game.world().stats().expirations, 1);
    assert_eq!(game.world().entity_count(), 0);
}

#[test]
fn test_stall_is_bounded() {
    let mut game = GameLoop::from_config(SimulationConfig {
        max_substeps: 20,
        ..SimulationConfig::default()
    })
    .unwrap();
    let stats = game.advance(Duration::from_secs(5));
    assert_eq!(stats.steps, 20);
    assert_eq!(stats.skipped, 480);

    let stats = game.advance(Duration::from_millis(10));
    assert_eq!(stats.steps, 1);
    assert_eq!(stats.skipped, 0);
}

#[test]
fn test_snapshot_round_trip_replays_identically() {
    let mut game = game();
    let player = game.world_mut().reserve_id();
    game.world_mut().push_action(Action::SpawnPlayer {
        id: player,
        position: Vec2::ZERO,
    });
    game.world_mut().push_action(Action::ScatterShapes {
        count: 5,
        min: Vec2::new(-200.0, -200.0),
        max: Vec2::new(200.0, 200.0),
    });
    game.advance(Duration::from_millis(50));

    let saved = game.snapshot();
    game.handle_input(InputEvent::KeyDown(Key::Char('s')));
    game.advance(Duration::from_millis(500));
    let first = fingerprint(game.world());

    game.restore(saved);
    game.handle_input(InputEvent::KeyDown(Key::Char('s')));
    game.advance(Duration::from_millis(500));
    let second = fingerprint(game.world());
    assert_eq!(first, second);
}
