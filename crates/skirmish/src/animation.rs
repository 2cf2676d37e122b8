//! # Animation
//!
//! Declarative, data-driven sprite animation.
//!
//! An [`AnimationLibrary`] maps set names ("player tank", "bullet"...) to an
//! [`AnimationSet`]: the image layers the set animates and its named
//! [`Animation`]s. An animation has a duration, an optional initial
//! keyframe applied on `play`, and keyframes whose `delay` values are
//! fractions of the duration between consecutive frames. Keyframes change
//! a layer's scale or image and may cue a sound.
//!
//! ## JSON layout
//!
//! ```json
//! {
//!   "bullet": {
//!     "layers": ["body"],
//!     "animations": {
//!       "expired": {
//!         "duration": 0.3,
//!         "on_finish": [{ "effect": "destroy" }],
//!         "initial": { "layers": { "body": { "scale": 1.0 } } },
//!         "frames": [{ "delay": 1.0, "layers": { "body": { "scale": 0.0 } } }]
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! Every document is validated when loaded; the [`Animator`] never sees
//! malformed data.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;
use skirmish_core::{EntityId, PropertyValue};
use thiserror::Error;
use tracing::{info, warn};

use crate::actions::{props, Action};
use crate::audio::SoundRequest;
use crate::components::{Graphics, Transform};
use crate::spawn::ParticleStyle;
use crate::world::World;

/// Animation data bundled with the crate.
const BUILTIN: &str = include_str!("../assets/animations.json");

/// Slack allowed on the sum of frame delays.
const DELAY_EPSILON: f32 = 1e-4;

// =============================================================================
// ERRORS
// =============================================================================

/// Malformed animation data.
#[derive(Debug, Error)]
pub enum AnimationError {
    /// Not valid JSON or not the expected shape
    #[error("animation data: {0}")]
    Json(#[from] serde_json::Error),

    /// A keyframe addresses a layer the set does not declare
    #[error("{set}/{animation}: unknown layer {layer:?}")]
    UnknownLayer {
        /// Set name
        set: String,
        /// Animation name
        animation: String,
        /// Offending layer
        layer: String,
    },

    /// A frame delay is negative or not finite
    #[error("{set}/{animation}: frame {frame} has an invalid delay")]
    InvalidDelay {
        /// Set name
        set: String,
        /// Animation name
        animation: String,
        /// Frame index
        frame: usize,
    },

    /// Frame delays add up to more than the whole animation
    #[error("{set}/{animation}: frame delays sum to {total}, more than 1")]
    DelayOverflow {
        /// Set name
        set: String,
        /// Animation name
        animation: String,
        /// Sum of the delays
        total: f32,
    },

    /// Duration is negative or not finite, or zero on a looping animation
    #[error("{set}/{animation}: invalid duration {duration}")]
    InvalidDuration {
        /// Set name
        set: String,
        /// Animation name
        animation: String,
        /// Offending duration
        duration: f32,
    },
}

// =============================================================================
// DATA
// =============================================================================

/// Change applied to one image layer.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayerChange {
    /// New layer scale
    pub scale: Option<f32>,
    /// New image within the layer's sheet
    pub image: Option<String>,
}

/// Sound played when a keyframe fires.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SoundCue {
    /// Sound name
    pub name: String,
    /// Volume before distance attenuation
    #[serde(default = "full_volume")]
    pub volume: f32,
}

const fn full_volume() -> f32 {
    1.0
}

/// One keyframe.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Keyframe {
    /// Fraction of the duration after the previous frame
    #[serde(default)]
    pub delay: f32,
    /// Layer changes by layer name
    #[serde(default)]
    pub layers: BTreeMap<String, LayerChange>,
    /// Optional sound
    #[serde(default)]
    pub sound: Option<SoundCue>,
}

/// Something done when a non-looping animation completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum FinishEffect {
    /// Destroy the animated entity
    Destroy,
    /// Burst of particles at the entity, tinted by its faction
    SpawnParticles {
        /// Number of particles
        count: u32,
        /// Particle look
        style: ParticleStyle,
    },
}

/// One named animation.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Animation {
    /// Seconds from start to finish
    pub duration: f32,
    /// Restart instead of finishing
    #[serde(default, rename = "loop")]
    pub looping: bool,
    /// Effects run on completion
    #[serde(default)]
    pub on_finish: Vec<FinishEffect>,
    /// Applied as soon as the animation starts
    #[serde(default)]
    pub initial: Option<Keyframe>,
    /// Keyframes in firing order
    #[serde(default)]
    pub frames: Vec<Keyframe>,
}

impl Animation {
    /// Progress fraction (0..=1) at which frame `index` fires.
    #[must_use]
    pub fn fire_at(&self, index: usize) -> f32 {
        self.frames.iter().take(index + 1).map(|frame| frame.delay).sum()
    }
}

/// Layers and animations of one kind of sprite.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnimationSet {
    /// Layer names, back to front
    pub layers: Vec<String>,
    /// Animations by name
    pub animations: BTreeMap<String, Animation>,
}

/// Every animation set, validated.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnimationLibrary {
    sets: BTreeMap<String, AnimationSet>,
}

impl AnimationLibrary {
    /// Parses and validates a JSON document.
    ///
    /// # Errors
    ///
    /// [`AnimationError::Json`] for malformed JSON, otherwise the first
    /// validation failure.
    pub fn from_json(source: &str) -> Result<Self, AnimationError> {
        let sets: BTreeMap<String, AnimationSet> = serde_json::from_str(source)?;
        let library = Self { sets };
        library.validate()?;
        info!(
            sets = library.sets.len(),
            animations = library.sets.values().map(|s| s.animations.len()).sum::<usize>(),
            "animation library loaded"
        );
        Ok(library)
    }

    /// The library shipped with the crate.
    ///
    /// # Errors
    ///
    /// Only if the bundled data is broken.
    pub fn builtin() -> Result<Self, AnimationError> {
        Self::from_json(BUILTIN)
    }

    /// Set called `name`.
    #[must_use]
    pub fn set(&self, name: &str) -> Option<&AnimationSet> {
        self.sets.get(name)
    }

    /// Animation `animation` of set `set`.
    #[must_use]
    pub fn animation(&self, set: &str, animation: &str) -> Option<&Animation> {
        self.set(set)?.animations.get(animation)
    }

    /// True if `set` defines `animation`.
    #[must_use]
    pub fn contains(&self, set: &str, animation: &str) -> bool {
        self.animation(set, animation).is_some()
    }

    /// Set names, sorted.
    pub fn set_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.sets.keys().map(String::as_str)
    }

    fn validate(&self) -> Result<(), AnimationError> {
        for (set_name, set) in &self.sets {
            for (name, animation) in &set.animations {
                validate_animation(set_name, set, name, animation)?;
            }
        }
        Ok(())
    }
}

fn validate_animation(
    set_name: &str,
    set: &AnimationSet,
    name: &str,
    animation: &Animation,
) -> Result<(), AnimationError> {
    let duration = animation.duration;
    if !duration.is_finite() || duration < 0.0 || (animation.looping && duration == 0.0) {
        return Err(AnimationError::InvalidDuration {
            set: set_name.to_owned(),
            animation: name.to_owned(),
            duration,
        });
    }

    let keyframes = animation.initial.iter().chain(&animation.frames);
    for layer in keyframes.flat_map(|frame| frame.layers.keys()) {
        if !set.layers.contains(layer) {
            return Err(AnimationError::UnknownLayer {
                set: set_name.to_owned(),
                animation: name.to_owned(),
                layer: layer.clone(),
            });
        }
    }

    let mut total = 0.0;
    for (frame, keyframe) in animation.frames.iter().enumerate() {
        if !keyframe.delay.is_finite() || keyframe.delay < 0.0 {
            return Err(AnimationError::InvalidDelay {
                set: set_name.to_owned(),
                animation: name.to_owned(),
                frame,
            });
        }
        total += keyframe.delay;
    }
    if total > 1.0 + DELAY_EPSILON {
        return Err(AnimationError::DelayOverflow {
            set: set_name.to_owned(),
            animation: name.to_owned(),
            total,
        });
    }
    Ok(())
}

// =============================================================================
// ANIMATOR
// =============================================================================

#[derive(Clone, Debug, PartialEq)]
struct Playback {
    name: String,
    elapsed: f32,
    next_frame: usize,
}

/// Animator component: the set it draws from and what is playing.
///
/// Several animations may run at once ("shoot barrel" over "damaged").
/// Playing an animation that is already running restarts it.
#[derive(Clone, Debug, PartialEq)]
pub struct Animator {
    /// Animation set name
    pub set: String,
    playing: Vec<Playback>,
}

impl Animator {
    /// Idle animator over `set`.
    #[must_use]
    pub fn new(set: impl Into<String>) -> Self {
        Self {
            set: set.into(),
            playing: Vec::new(),
        }
    }

    /// True while `name` is running.
    #[must_use]
    pub fn is_playing(&self, name: &str) -> bool {
        self.playing.iter().any(|playback| playback.name == name)
    }

    /// Names of the running animations, oldest first.
    pub fn playing(&self) -> impl Iterator<Item = &str> + '_ {
        self.playing.iter().map(|playback| playback.name.as_str())
    }

    /// Stops `name` without running its finish effects.
    pub fn stop(&mut self, name: &str) {
        self.playing.retain(|playback| playback.name != name);
    }

    fn start(&mut self, name: &str) {
        self.stop(name);
        self.playing.push(Playback {
            name: name.to_owned(),
            elapsed: 0.0,
            next_frame: 0,
        });
    }

    /// Advances every playback by `dt`. Keyframes that came due are pushed
    /// to `fired`, completed non-looping animations to `finished`.
    fn advance<'a>(
        &mut self,
        set: &'a AnimationSet,
        dt: f32,
        fired: &mut Vec<&'a Keyframe>,
        finished: &mut Vec<&'a Animation>,
    ) {
        self.playing.retain_mut(|playback| {
            let Some(animation) = set.animations.get(&playback.name) else {
                return false;
            };
            playback.elapsed += dt;

            loop {
                let progress = if animation.duration > 0.0 {
                    playback.elapsed / animation.duration
                } else {
                    f32::INFINITY
                };

                while let Some(frame) = animation.frames.get(playback.next_frame) {
                    if progress < 1.0 && animation.fire_at(playback.next_frame) > progress {
                        break;
                    }
                    fired.push(frame);
                    playback.next_frame += 1;
                }

                if progress < 1.0 {
                    return true;
                }
                if !animation.looping {
                    finished.push(animation);
                    return false;
                }
                playback.elapsed -= animation.duration;
                playback.next_frame = 0;
                fired.extend(animation.initial.as_ref());
            }
        });
    }
}

// =============================================================================
// SYSTEM
// =============================================================================

impl World {
    /// Starts animation `name` of `id`'s set and applies its initial frame.
    ///
    /// Returns `false` (with a warning) when `id` has no animator or its set
    /// lacks `name`.
    pub fn play_animation(&mut self, id: EntityId, name: &str) -> bool {
        let library = Arc::clone(&self.animations);
        let Ok(animator) = self.get_mut::<Animator>(id) else {
            return false;
        };
        let Some(animation) = library.animation(&animator.set, name) else {
            warn!(
                entity = id.raw(),
                set = %animator.set,
                animation = name,
                "animation missing from set"
            );
            return false;
        };

        animator.start(name);
        if let Some(initial) = &animation.initial {
            apply_keyframe(self, id, initial);
        }
        true
    }
}

fn apply_keyframe(world: &mut World, id: EntityId, keyframe: &Keyframe) {
    if let Ok(graphics) = world.get_mut::<Graphics>(id) {
        for (layer_name, change) in &keyframe.layers {
            let Some(layer) = graphics.layer_mut(layer_name) else {
                continue;
            };
            if let Some(scale) = change.scale {
                layer.scale = scale;
            }
            if let Some(image) = &change.image {
                layer.image.clone_from(image);
            }
        }
    }

    if let Some(cue) = &keyframe.sound {
        if let Ok(transform) = world.get::<Transform>(id) {
            let request = SoundRequest {
                name: cue.name.clone(),
                position: transform.position,
                volume: cue.volume,
            };
            world.sounds.push(request);
        }
    }
}

fn run_finish_effects(world: &mut World, id: EntityId, effects: &[FinishEffect]) {
    for effect in effects {
        match *effect {
            FinishEffect::Destroy => world.push_action(Action::Destroy(id)),
            FinishEffect::SpawnParticles { count, style } => {
                let Ok(origin) = world.get::<Transform>(id).map(|t| t.position) else {
                    continue;
                };
                let tint = world
                    .property(id, props::FACTION)
                    .ok()
                    .and_then(PropertyValue::as_text)
                    .unwrap_or("neutral")
                    .to_owned();
                world.push_action(Action::SpawnParticleBurst {
                    origin,
                    count,
                    style,
                    tint,
                });
            }
        }
    }
}

/// Advances every animator by `dt`.
pub(crate) fn step(world: &mut World, dt: f32) {
    let library = Arc::clone(&world.animations);
    let owners: Vec<EntityId> = world
        .animators
        .iter()
        .map(|(_, owner, _)| owner)
        .collect();

    let mut fired = Vec::new();
    let mut finished = Vec::new();
    for owner in owners {
        fired.clear();
        finished.clear();

        let Ok(animator) = world.get_mut::<Animator>(owner) else {
            continue;
        };
        let Some(set) = library.set(&animator.set) else {
            continue;
        };
        animator.advance(set, dt, &mut fired, &mut finished);

        for keyframe in &fired {
            apply_keyframe(world, owner, keyframe);
        }
        for animation in &finished {
            run_finish_effects(world, owner, &animation.on_finish);
        }
    }
}
