//! # Audio Requests
//!
//! The simulation never plays sound. Animators leave fire-and-forget
//! [`SoundRequest`]s in the world; once per drawn frame the audio
//! collaborator drains them, already attenuated by distance to the camera.

use skirmish_shared::Vec2;

use crate::world::World;

/// A sound cued at a world position.
#[derive(Clone, Debug, PartialEq)]
pub struct SoundRequest {
    /// Sound name
    pub name: String,
    /// Where it happened
    pub position: Vec2,
    /// Volume at the source
    pub volume: f32,
}

/// A request that survived attenuation.
#[derive(Clone, Debug, PartialEq)]
pub struct AudibleSound {
    /// Sound name
    pub name: String,
    /// Volume at the listener, in `(0, 1]`
    pub volume: f32,
}

/// Volume left after travelling `distance`: `volume - falloff * sqrt(distance)`.
#[inline]
#[must_use]
pub fn attenuate(volume: f32, distance: f32, falloff: f32) -> f32 {
    volume - falloff * distance.sqrt()
}

impl World {
    /// Sound requests not yet drained.
    #[must_use]
    pub fn pending_sounds(&self) -> &[SoundRequest] {
        &self.sounds
    }

    /// Takes every pending request and returns those still audible from the
    /// camera centre.
    pub fn drain_audible(&mut self) -> Vec<AudibleSound> {
        let listener = self.camera.center();
        let falloff = self.config.sound_falloff;
        self.sounds
            .drain(..)
            .filter_map(|request| {
                let volume = attenuate(request.volume, request.position.distance(listener), falloff);
                (volume > 0.0).then(|| AudibleSound {
                    name: request.name,
                    volume: volume.min(1.0),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attenuation() {
        assert_eq!(attenuate(1.0, 0.0, 0.01), 1.0);
        assert!((attenuate(1.0, 100.0, 0.01) - 0.9).abs() < 1e-6);
        assert!(attenuate(0.3, 10_000.0, 0.01) < 0.0);
    }

    #[test]
    fn test_drain_drops_inaudible() {
        let mut world = World::with_defaults().unwrap();
        world.position_camera(Vec2::ZERO);
        world.sounds.push(SoundRequest {
            name: "near".into(),
            position: Vec2::new(100.0, 0.0),
            volume: 1.0,
        });
        world.sounds.push(SoundRequest {
            name: "far".into(),
            position: Vec2::new(20_000.0, 0.0),
            volume: 1.0,
        });

        let audible = world.drain_audible();
        assert_eq!(audible.len(), 1);
        assert_eq!(audible[0].name, "near");
        assert!((audible[0].volume - 0.9).abs() < 1e-5);
        assert!(world.pending_sounds().is_empty());
    }
}
