//! 2D math shared by the kernel and the simulation.
//!
//! Positions are world units, angles are degrees measured the way the
//! presentation layer draws them (0° points along +x, +90° along +y).

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// 2D Vector - positions, velocities, offsets
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Vec2 {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
}

impl Vec2 {
    /// Creates a new Vec2
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Zero vector
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Creates a vector with both components set to `v`
    #[must_use]
    pub const fn splat(v: f32) -> Self {
        Self::new(v, v)
    }

    /// Unit vector pointing at `degrees`.
    #[must_use]
    pub fn from_angle(degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self::new(cos, sin)
    }

    /// Converts to array
    #[must_use]
    pub const fn to_array(self) -> [f32; 2] {
        [self.x, self.y]
    }

    /// Dot product
    #[must_use]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Length squared (avoids sqrt)
    #[must_use]
    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    /// Length
    #[must_use]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Distance squared (avoids sqrt)
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f32 {
        (self - other).length_squared()
    }

    /// Distance to another point
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        (self - other).length()
    }

    /// True when both components are exactly zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Unit vector in the same direction, or zero for the zero vector.
    #[must_use]
    pub fn normalize_or_zero(self) -> Self {
        let len = self.length();
        if len > f32::EPSILON {
            self / len
        } else {
            Self::ZERO
        }
    }

    /// Same direction, new length. The zero vector stays zero.
    #[must_use]
    pub fn scale_to_length(self, length: f32) -> Self {
        self.normalize_or_zero() * length
    }

    /// Linear interpolation toward `target`. `t` is not clamped.
    #[must_use]
    pub fn lerp(self, target: Self, t: f32) -> Self {
        self + (target - self) * t
    }

    /// Angle of this vector in degrees, in `(-180, 180]`.
    #[must_use]
    pub fn angle_degrees(self) -> f32 {
        self.y.atan2(self.x).to_degrees()
    }

    /// Rotates the vector by `degrees`.
    #[must_use]
    pub fn rotate(self, degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl std::ops::Div<f32> for Vec2 {
    type Output = Self;
    fn div(self, rhs: f32) -> Self {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

impl std::ops::Neg for Vec2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

/// Scalar lerp. `t` is not clamped.
#[inline]
#[must_use]
pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

/// Angle in degrees from `origin` toward `target`.
#[must_use]
pub fn angle_toward(origin: Vec2, target: Vec2) -> f32 {
    (target - origin).angle_degrees()
}

/// Unwraps `target` so that interpolating from `current` takes the short
/// way around the circle.
///
/// Returns `(current, target)` where `|target - current| <= 180`.
#[must_use]
pub fn shortest_arc(current: f32, target: f32) -> (f32, f32) {
    let current = current.rem_euclid(360.0);
    let mut target = target.rem_euclid(360.0);
    if target - current > 180.0 {
        target -= 360.0;
    } else if current - target > 180.0 {
        target += 360.0;
    }
    (current, target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec2_operations() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(3.0, 4.0);

        let sum = a + b;
        assert_eq!(sum, Vec2::new(4.0, 6.0));
        assert_eq!(a.dot(b), 11.0);
        assert_eq!(b.length(), 5.0);
        assert_eq!(a.distance_squared(b), 8.0);
    }

    #[test]
    fn test_normalize_zero_is_zero() {
        assert_eq!(Vec2::ZERO.normalize_or_zero(), Vec2::ZERO);
        assert_eq!(Vec2::ZERO.scale_to_length(10.0), Vec2::ZERO);
        let v = Vec2::new(3.0, 4.0).scale_to_length(10.0);
        assert!((v.length() - 10.0).abs() < 1e-5);
    }

    #[test]
    fn test_angles() {
        let right = Vec2::from_angle(0.0);
        assert!((right.x - 1.0).abs() < 1e-6);
        let up = Vec2::new(1.0, 0.0).rotate(90.0);
        assert!(up.x.abs() < 1e-6 && (up.y - 1.0).abs() < 1e-6);
        assert!((angle_toward(Vec2::ZERO, Vec2::new(0.0, 5.0)) - 90.0).abs() < 1e-4);
    }

    #[test]
    fn test_shortest_arc() {
        let (c, t) = shortest_arc(350.0, 10.0);
        assert!((t - c - 20.0).abs() < 1e-4);
        let (c, t) = shortest_arc(10.0, 350.0);
        assert!((c - t - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_vec2_bytemuck() {
        let v = Vec2::new(1.0, 2.0);
        let bytes: &[u8] = bytemuck::bytes_of(&v);
        assert_eq!(bytes.len(), 8);
    }
}
