//! # Controllers
//!
//! Turn input events (player) or world state (enemy AI) into steering,
//! aiming and firing. A closed enum, dispatched by `match`.

use skirmish_core::EntityId;
use skirmish_shared::math::{angle_toward, lerp, shortest_arc};
use skirmish_shared::Vec2;

use crate::actions::Action;
use crate::components::{Physics, Transform};
use crate::physics::steering_velocity;
use crate::world::{Component, World};

// =============================================================================
// INPUT
// =============================================================================

/// Keyboard key, as delivered by the input collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Printable key, lowercase
    Char(char),
    /// Arrow left
    ArrowLeft,
    /// Arrow right
    ArrowRight,
    /// Arrow up
    ArrowUp,
    /// Arrow down
    ArrowDown,
    /// Escape
    Escape,
    /// Return / Enter
    Return,
    /// Space bar
    Space,
}

/// Mouse button.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary button
    Left,
    /// Secondary button
    Right,
    /// Wheel button
    Middle,
}

/// Discrete input event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    /// Key pressed
    KeyDown(Key),
    /// Key released
    KeyUp(Key),
    /// Button pressed
    MouseDown(MouseButton),
    /// Button released
    MouseUp(MouseButton),
    /// Pointer moved, screen coordinates
    MouseMotion(Vec2),
}

/// Movement direction of a key binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// -x
    Left,
    /// +x
    Right,
    /// -y (screen up)
    Up,
    /// +y
    Down,
}

/// Key bindings for movement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveKeys {
    /// Left binding
    pub left: Key,
    /// Right binding
    pub right: Key,
    /// Up binding
    pub up: Key,
    /// Down binding
    pub down: Key,
}

impl MoveKeys {
    /// Direction bound to `key`, if any.
    #[must_use]
    pub fn direction(&self, key: Key) -> Option<Direction> {
        if key == self.left {
            Some(Direction::Left)
        } else if key == self.right {
            Some(Direction::Right)
        } else if key == self.up {
            Some(Direction::Up)
        } else if key == self.down {
            Some(Direction::Down)
        } else {
            None
        }
    }
}

impl Default for MoveKeys {
    fn default() -> Self {
        Self {
            left: Key::Char('a'),
            right: Key::Char('d'),
            up: Key::Char('w'),
            down: Key::Char('s'),
        }
    }
}

/// Which movement keys are currently held.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeldKeys {
    left: bool,
    right: bool,
    up: bool,
    down: bool,
}

impl HeldKeys {
    /// Records a press or release.
    pub fn set(&mut self, direction: Direction, pressed: bool) {
        match direction {
            Direction::Left => self.left = pressed,
            Direction::Right => self.right = pressed,
            Direction::Up => self.up = pressed,
            Direction::Down => self.down = pressed,
        }
    }

    /// Unnormalised steering vector; opposite keys cancel.
    #[must_use]
    pub fn vector(&self) -> Vec2 {
        let axis = |neg: bool, pos: bool| f32::from(u8::from(pos)) - f32::from(u8::from(neg));
        Vec2::new(axis(self.left, self.right), axis(self.up, self.down))
    }
}

// =============================================================================
// CONTROLLERS
// =============================================================================

/// Human-driven tank.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlayerController {
    /// Key bindings
    pub keys: MoveKeys,
    /// Held movement keys
    pub held: HeldKeys,
    /// Last pointer position on screen
    pub pointer: Vec2,
}

/// AI tank that turns toward the player.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemyController {
    /// Fraction of the angle gap closed per second
    pub turn_rate: f32,
}

/// Controller component.
#[derive(Clone, Debug, PartialEq)]
pub enum Controller {
    /// Input driven
    Player(PlayerController),
    /// AI driven
    Enemy(EnemyController),
}

impl Controller {
    /// True for input-driven controllers.
    #[must_use]
    pub const fn is_player(&self) -> bool {
        matches!(self, Self::Player(_))
    }

    /// Action for `event` on behalf of `owner`, if this controller reacts to it.
    #[must_use]
    pub fn action_for(&self, owner: EntityId, event: InputEvent) -> Option<Action> {
        let Self::Player(player) = self else {
            return None;
        };
        match event {
            InputEvent::KeyDown(key) | InputEvent::KeyUp(key) => {
                player.keys.direction(key).map(|direction| Action::Move {
                    id: owner,
                    direction,
                    pressed: matches!(event, InputEvent::KeyDown(_)),
                })
            }
            InputEvent::MouseDown(MouseButton::Left) => Some(Action::StartFiring(owner)),
            InputEvent::MouseUp(MouseButton::Left) => Some(Action::StopFiring(owner)),
            InputEvent::MouseMotion(pointer) => Some(Action::Aim { id: owner, pointer }),
            InputEvent::MouseDown(_) | InputEvent::MouseUp(_) => None,
        }
    }
}

impl World {
    /// Offers `event` to every controller and queues the resulting actions.
    pub fn handle_input(&mut self, event: InputEvent) {
        let actions: Vec<Action> = self
            .controllers
            .iter()
            .filter_map(|(_, owner, controller)| controller.action_for(owner, event))
            .collect();
        self.extend_actions(actions);
    }
}

/// Runs every controller for one step.
pub(crate) fn step(world: &mut World, dt: f32) {
    let corner = world.camera.corner();
    let player_position = world
        .player()
        .and_then(|player| world.get::<Transform>(player).ok())
        .map(|transform| transform.position);

    let World {
        controllers,
        transforms,
        physics,
        entities,
        ..
    } = world;

    for (_, owner, controller) in controllers.iter() {
        let Some(transform) = entities
            .slot(owner, Transform::KIND)
            .ok()
            .and_then(|slot| transforms.get_mut(slot))
        else {
            continue;
        };

        match controller {
            Controller::Player(player) => {
                transform.rotation = angle_toward(transform.position, player.pointer + corner);
                if let Some(body) = entities
                    .slot(owner, Physics::KIND)
                    .ok()
                    .and_then(|slot| physics.get_mut(slot))
                {
                    body.target_velocity = steering_velocity(player.held.vector(), body.max_speed);
                }
            }
            Controller::Enemy(enemy) => {
                let Some(target) = player_position else {
                    continue;
                };
                let (current, wanted) =
                    shortest_arc(transform.rotation, angle_toward(transform.position, target));
                transform.rotation = lerp(current, wanted, (enemy.turn_rate * dt).min(1.0));
            }
        }
    }
}
