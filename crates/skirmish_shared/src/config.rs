//! # Simulation Configuration
//!
//! Loaded once at startup from TOML. Every field has a default so an empty
//! file (or no file at all) yields a playable setup.
//!
//! ```toml
//! timestep_ms = 10
//! max_substeps = 250
//! seed = 42
//!
//! [grids]
//! projectiles = 32.0
//!
//! [player]
//! max_speed = 220.0
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::info;

use crate::constants::{
    DEFAULT_CELL_SIZE, DEFAULT_MAX_SUBSTEPS, DEFAULT_PAN_SPEED, DEFAULT_SOUND_FALLOFF,
    DEFAULT_TIMESTEP_MS, DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH,
};
use crate::math::Vec2;

// =============================================================================
// ERRORS
// =============================================================================

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML or has wrongly typed fields
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but makes no sense
    #[error("invalid config value `{field}`: {reason}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// What is wrong with it
        reason: &'static str,
    },
}

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// COLLISION CATEGORIES
// =============================================================================

/// Partition label for colliders.
///
/// A collider lives in exactly one category's grid and queries the grids of
/// the categories it may collide with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionCategory {
    /// Tanks, player and enemies
    Actors,
    /// Bullets
    Projectiles,
    /// Destructible scenery
    Shapes,
    /// Experience pickups
    Collectibles,
}

impl CollisionCategory {
    /// Every category, in grid order.
    pub const ALL: [Self; 4] = [
        Self::Actors,
        Self::Projectiles,
        Self::Shapes,
        Self::Collectibles,
    ];

    /// Number of categories.
    pub const COUNT: usize = Self::ALL.len();

    /// Dense index for per-category tables.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Lowercase name, matching the serialized form.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Actors => "actors",
            Self::Projectiles => "projectiles",
            Self::Shapes => "shapes",
            Self::Collectibles => "collectibles",
        }
    }
}

impl std::fmt::Display for CollisionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// SECTIONS
// =============================================================================

/// Visible area in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    /// Width in pixels
    pub width: f32,
    /// Height in pixels
    pub height: f32,
}

impl Viewport {
    /// Half extents, used to centre the camera.
    #[must_use]
    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: DEFAULT_VIEWPORT_WIDTH,
            height: DEFAULT_VIEWPORT_HEIGHT,
        }
    }
}

/// Cell size of each collision grid.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Actors grid
    pub actors: f32,
    /// Projectiles grid
    pub projectiles: f32,
    /// Shapes grid
    pub shapes: f32,
    /// Collectibles grid
    pub collectibles: f32,
}

impl GridConfig {
    /// Cell size used for `category`.
    #[must_use]
    pub const fn cell_size(&self, category: CollisionCategory) -> f32 {
        match category {
            CollisionCategory::Actors => self.actors,
            CollisionCategory::Projectiles => self.projectiles,
            CollisionCategory::Shapes => self.shapes,
            CollisionCategory::Collectibles => self.collectibles,
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            actors: DEFAULT_CELL_SIZE,
            projectiles: DEFAULT_CELL_SIZE,
            shapes: DEFAULT_CELL_SIZE,
            collectibles: DEFAULT_CELL_SIZE,
        }
    }
}

/// Movement, durability and weapon tuning for one kind of tank.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActorTuning {
    /// Top speed in units/second
    pub max_speed: f32,
    /// Acceleration rate (fraction of the gap closed per second)
    pub accel: f32,
    /// Deceleration rate when no input is held
    pub decel: f32,
    /// Multiplier on `decel`
    pub friction: f32,
    /// Starting and maximum health
    pub health: i64,
    /// Collider radius
    pub collider_radius: f32,
    /// Seconds between shots per barrel
    pub reload: f32,
    /// Bullet speed in units/second
    pub bullet_speed: f32,
    /// Damage dealt per bullet
    pub bullet_damage: i64,
    /// Bullet lifetime in seconds
    pub bullet_lifetime: f32,
    /// Bullet collider radius
    pub bullet_radius: f32,
}

impl ActorTuning {
    /// Defaults for the player tank.
    #[must_use]
    pub const fn player() -> Self {
        Self {
            max_speed: 200.0,
            accel: 8.0,
            decel: 6.0,
            friction: 1.0,
            health: 100,
            collider_radius: 24.0,
            reload: 0.25,
            bullet_speed: 600.0,
            bullet_damage: 10,
            bullet_lifetime: 3.0,
            bullet_radius: 6.0,
        }
    }

    /// Defaults for enemy tanks.
    #[must_use]
    pub const fn enemy() -> Self {
        Self {
            max_speed: 120.0,
            accel: 4.0,
            decel: 4.0,
            friction: 1.0,
            health: 50,
            collider_radius: 24.0,
            reload: 1.0,
            bullet_speed: 400.0,
            bullet_damage: 5,
            bullet_lifetime: 3.0,
            bullet_radius: 6.0,
        }
    }

    fn validate(&self, section: &'static str) -> ConfigResult<()> {
        if ![self.max_speed, self.accel, self.decel, self.friction]
            .into_iter()
            .all(non_negative)
        {
            return Err(ConfigError::Invalid {
                field: section,
                reason: "movement rates must not be negative",
            });
        }
        if self.health <= 0 {
            return Err(ConfigError::Invalid {
                field: section,
                reason: "health must be positive",
            });
        }
        if !(positive(self.reload) && positive(self.bullet_lifetime)) {
            return Err(ConfigError::Invalid {
                field: section,
                reason: "reload and bullet_lifetime must be positive",
            });
        }
        if !(non_negative(self.collider_radius) && non_negative(self.bullet_radius)) {
            return Err(ConfigError::Invalid {
                field: section,
                reason: "radii must be finite and not negative",
            });
        }
        Ok(())
    }
}

/// Partially specified tuning section. Missing fields keep the defaults of
/// the section being overridden.
#[derive(Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TuningOverride {
    max_speed: Option<f32>,
    accel: Option<f32>,
    decel: Option<f32>,
    friction: Option<f32>,
    health: Option<i64>,
    collider_radius: Option<f32>,
    reload: Option<f32>,
    bullet_speed: Option<f32>,
    bullet_damage: Option<i64>,
    bullet_lifetime: Option<f32>,
    bullet_radius: Option<f32>,
}

impl TuningOverride {
    fn apply(self, base: ActorTuning) -> ActorTuning {
        ActorTuning {
            max_speed: self.max_speed.unwrap_or(base.max_speed),
            accel: self.accel.unwrap_or(base.accel),
            decel: self.decel.unwrap_or(base.decel),
            friction: self.friction.unwrap_or(base.friction),
            health: self.health.unwrap_or(base.health),
            collider_radius: self.collider_radius.unwrap_or(base.collider_radius),
            reload: self.reload.unwrap_or(base.reload),
            bullet_speed: self.bullet_speed.unwrap_or(base.bullet_speed),
            bullet_damage: self.bullet_damage.unwrap_or(base.bullet_damage),
            bullet_lifetime: self.bullet_lifetime.unwrap_or(base.bullet_lifetime),
            bullet_radius: self.bullet_radius.unwrap_or(base.bullet_radius),
        }
    }
}

fn player_tuning<'de, D: Deserializer<'de>>(de: D) -> Result<ActorTuning, D::Error> {
    TuningOverride::deserialize(de).map(|o| o.apply(ActorTuning::player()))
}

fn enemy_tuning<'de, D: Deserializer<'de>>(de: D) -> Result<ActorTuning, D::Error> {
    TuningOverride::deserialize(de).map(|o| o.apply(ActorTuning::enemy()))
}

// =============================================================================
// ROOT
// =============================================================================

/// Root configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Fixed simulation step in milliseconds
    pub timestep_ms: u64,
    /// Fixed steps allowed per `advance` before time is discarded
    pub max_substeps: u32,
    /// Visible area
    pub viewport: Viewport,
    /// Camera smoothing speed
    pub camera_pan_speed: f32,
    /// Audio attenuation per `sqrt(distance)`
    pub sound_falloff: f32,
    /// RNG seed for particle bursts
    pub seed: u64,
    /// Grid cell sizes
    pub grids: GridConfig,
    /// Player tuning
    #[serde(deserialize_with = "player_tuning")]
    pub player: ActorTuning,
    /// Enemy tuning
    #[serde(deserialize_with = "enemy_tuning")]
    pub enemy: ActorTuning,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            timestep_ms: DEFAULT_TIMESTEP_MS,
            max_substeps: DEFAULT_MAX_SUBSTEPS,
            viewport: Viewport::default(),
            camera_pan_speed: DEFAULT_PAN_SPEED,
            sound_falloff: DEFAULT_SOUND_FALLOFF,
            seed: 0,
            grids: GridConfig::default(),
            player: ActorTuning::player(),
            enemy: ActorTuning::enemy(),
        }
    }
}

impl SimulationConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed TOML and
    /// `ConfigError::Invalid` for values that fail validation.
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        info!(
            timestep_ms = config.timestep_ms,
            max_substeps = config.max_substeps,
            seed = config.seed,
            "simulation config loaded"
        );
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read, otherwise the
    /// same errors as [`Self::from_toml_str`].
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Checks semantic constraints that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field found.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.timestep_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "timestep_ms",
                reason: "must be positive",
            });
        }
        if self.max_substeps == 0 {
            return Err(ConfigError::Invalid {
                field: "max_substeps",
                reason: "must be at least 1",
            });
        }
        for category in CollisionCategory::ALL {
            let size = self.grids.cell_size(category);
            if !positive(size) {
                return Err(ConfigError::Invalid {
                    field: "grids",
                    reason: "cell sizes must be positive",
                });
            }
        }
        if !(positive(self.viewport.width) && positive(self.viewport.height)) {
            return Err(ConfigError::Invalid {
                field: "viewport",
                reason: "dimensions must be positive",
            });
        }
        if !(non_negative(self.camera_pan_speed) && non_negative(self.sound_falloff)) {
            return Err(ConfigError::Invalid {
                field: "camera_pan_speed",
                reason: "rates must not be negative",
            });
        }
        self.player.validate("player")?;
        self.enemy.validate("enemy")?;
        Ok(())
    }

    /// The fixed step as a `Duration`.
    #[must_use]
    pub const fn timestep(&self) -> Duration {
        Duration::from_millis(self.timestep_ms)
    }

    /// The fixed step in seconds.
    #[must_use]
    pub fn dt(&self) -> f32 {
        self.timestep().as_secs_f32()
    }
}

/// Finite and above zero. Rejects NaN.
fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

/// Finite and not below zero. Rejects NaN.
fn non_negative(value: f32) -> bool {
    value.is_finite() && value >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_yields_defaults() {
        let config = SimulationConfig::from_toml_str("").expect("empty config");
        assert_eq!(config, SimulationConfig::default());
        assert_eq!(config.timestep(), Duration::from_millis(10));
        assert_eq!(config.enemy, ActorTuning::enemy());
    }

    #[test]
    fn test_partial_override() {
        let config = SimulationConfig::from_toml_str(
            r#"
            seed = 7
            [grids]
            projectiles = 32.0
            [player]
            max_speed = 300.0
            "#,
        )
        .expect("valid config");

        assert_eq!(config.seed, 7);
        assert_eq!(config.grids.cell_size(CollisionCategory::Projectiles), 32.0);
        assert_eq!(config.grids.cell_size(CollisionCategory::Actors), DEFAULT_CELL_SIZE);
        assert_eq!(config.player.max_speed, 300.0);
        assert_eq!(config.player.health, ActorTuning::player().health);
    }

    #[test]
    fn test_enemy_override_keeps_enemy_defaults() {
        let config = SimulationConfig::from_toml_str("[enemy]\nreload = 2.0").expect("valid");
        assert_eq!(config.enemy.reload, 2.0);
        assert_eq!(config.enemy.max_speed, ActorTuning::enemy().max_speed);
    }

    #[test]
    fn test_rejects_zero_timestep() {
        let err = SimulationConfig::from_toml_str("timestep_ms = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "timestep_ms", .. }));
    }

    #[test]
    fn test_rejects_bad_cell_size() {
        let err = SimulationConfig::from_toml_str("[grids]\nactors = 0.0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "grids", .. }));
    }

    #[test]
    fn test_rejects_non_finite_values() {
        let err = SimulationConfig::from_toml_str("[player]\ncollider_radius = inf").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "player", .. }));

        let err = SimulationConfig::from_toml_str("[enemy]\nbullet_radius = nan").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "enemy", .. }));

        let err = SimulationConfig::from_toml_str("[enemy]\nreload = nan").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "enemy", .. }));

        let err = SimulationConfig::from_toml_str("[viewport]\nwidth = inf").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "viewport", .. }));

        let err = SimulationConfig::from_toml_str("[viewport]\nheight = nan").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "viewport", .. }));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let err = SimulationConfig::from_toml_str("timestep_ms = \"fast\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_category_serde_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            category: CollisionCategory,
        }
        let parsed: Wrapper = toml::from_str("category = \"collectibles\"").expect("parse");
        assert_eq!(parsed.category, CollisionCategory::Collectibles);
        assert_eq!(CollisionCategory::Projectiles.to_string(), "projectiles");
        assert_eq!(CollisionCategory::Shapes.index(), 2);
    }
}
