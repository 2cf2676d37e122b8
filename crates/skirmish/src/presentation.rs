//! # Presentation Read-Out
//!
//! Everything a renderer needs for one frame, as plain data in screen
//! space. Building a [`DrawList`] never mutates the world.

use skirmish_core::{ComponentKind, EntityId};
use skirmish_shared::Vec2;

use crate::components::{Anchor, Transform};
use crate::world::World;

/// One image layer to draw.
#[derive(Clone, Debug, PartialEq)]
pub struct Sprite {
    /// Owning entity
    pub entity: EntityId,
    /// Layer name
    pub layer: String,
    /// Full image name, `"{sheet} {image}"`
    pub image: String,
    /// Screen position of the layer centre
    pub position: Vec2,
    /// Degrees
    pub rotation: f32,
    /// Transform scale times layer scale
    pub scale: f32,
}

/// One health bar to draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BarSprite {
    /// Owning entity
    pub entity: EntityId,
    /// Screen position of the bar centre
    pub position: Vec2,
    /// Filled fraction, 0..=1
    pub fraction: f32,
}

/// One text label to draw. Labels ignore the camera.
#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    /// Owning entity
    pub entity: EntityId,
    /// Text
    pub text: String,
    /// How `position` is interpreted
    pub anchor: Anchor,
    /// Screen position
    pub position: Vec2,
}

/// A frame's worth of drawing, back to front within each list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrawList {
    /// World offset of the screen's top-left corner
    pub camera_corner: Vec2,
    /// Image layers
    pub sprites: Vec<Sprite>,
    /// Health bars, drawn over sprites
    pub health_bars: Vec<BarSprite>,
    /// Labels, drawn last
    pub labels: Vec<Label>,
}

fn transform_of(world: &World, id: EntityId) -> Option<&Transform> {
    let slot = world.table().slot(id, ComponentKind::Transform).ok()?;
    world.arena::<Transform>().get(slot)
}

impl World {
    /// Snapshot of what is on screen.
    #[must_use]
    pub fn draw_list(&self) -> DrawList {
        let camera = self.camera();
        let mut list = DrawList {
            camera_corner: camera.corner(),
            ..DrawList::default()
        };

        for (_, owner, graphics) in self.graphics.iter() {
            if !graphics.visible {
                continue;
            }
            let Some(transform) = transform_of(self, owner) else {
                continue;
            };
            for layer in &graphics.layers {
                let offset = (layer.offset * transform.scale).rotate(transform.rotation);
                list.sprites.push(Sprite {
                    entity: owner,
                    layer: layer.name.clone(),
                    image: layer.resolved(),
                    position: camera.to_screen(transform.position + offset),
                    rotation: transform.rotation,
                    scale: transform.scale * layer.scale,
                });
            }
        }

        for (_, owner, bar) in self.health_bars.iter() {
            if let Some(transform) = transform_of(self, owner) {
                list.health_bars.push(BarSprite {
                    entity: owner,
                    position: camera.to_screen(transform.position + bar.offset),
                    fraction: bar.fraction,
                });
            }
        }

        list.labels.extend(self.uis.iter().map(|(_, owner, ui)| Label {
            entity: owner,
            text: ui.text.clone(),
            anchor: ui.anchor,
            position: ui.position,
        }));
        list
    }
}
