//! # Component Kinds
//!
//! The closed set of component kinds an entity row can reference.

/// Every component kind the simulation stores.
///
/// The discriminant doubles as the column in an entity row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentKind {
    /// Position, rotation, scale
    Transform,
    /// Velocity and rotational force integration
    Physics,
    /// Drawable image layers
    Graphics,
    /// Input or AI decision making
    Controller,
    /// Gun barrels and firing state
    BarrelManager,
    /// Bounded lifetime
    LifeTimer,
    /// Circular collision volume
    Collider,
    /// Smoothed health display
    HealthBar,
    /// Keyframe animation playback
    Animator,
    /// Screen-space widget anchor
    Ui,
}

impl ComponentKind {
    /// Every kind, in column order.
    pub const ALL: [Self; 10] = [
        Self::Transform,
        Self::Physics,
        Self::Graphics,
        Self::Controller,
        Self::BarrelManager,
        Self::LifeTimer,
        Self::Collider,
        Self::HealthBar,
        Self::Animator,
        Self::Ui,
    ];

    /// Number of kinds (row width).
    pub const COUNT: usize = Self::ALL.len();

    /// Column index in an entity row.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Human readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Transform => "transform",
            Self::Physics => "physics",
            Self::Graphics => "graphics",
            Self::Controller => "controller",
            Self::BarrelManager => "barrel manager",
            Self::LifeTimer => "life timer",
            Self::Collider => "collider",
            Self::HealthBar => "health bar",
            Self::Animator => "animator",
            Self::Ui => "ui",
        }
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_are_dense() {
        for (i, kind) in ComponentKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
        assert_eq!(ComponentKind::COUNT, 10);
    }
}
