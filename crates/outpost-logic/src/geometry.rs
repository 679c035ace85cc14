//! 2D geometry primitives shared by the scheduler and combat engine.

use serde::{Deserialize, Serialize};

/// 2D position/direction vector
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_squared(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance(&self, other: &Self) -> f32 {
        self.distance_squared(other).sqrt()
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Self {
                x: self.x / len,
                y: self.y / len,
            }
        } else {
            Self::ZERO
        }
    }

    /// Dot product with another vector.
    pub fn dot(&self, other: &Self) -> f32 {
        self.x * other.x + self.y * other.y
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}

/// Axis-aligned world bounds
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_size(width: f32, height: f32) -> Self {
        Self {
            min: Vec2::ZERO,
            max: Vec2::new(width, height),
        }
    }

    pub fn contains(&self, point: &Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Clamp a point into the bounds.
    pub fn clamp(&self, point: Vec2) -> Vec2 {
        Vec2::new(
            point.x.clamp(self.min.x, self.max.x),
            point.y.clamp(self.min.y, self.max.y),
        )
    }
}

/// Unsigned angle in degrees between two direction vectors, in [0, 180].
/// Returns 0.0 when either vector is degenerate.
pub fn angle_between_deg(a: Vec2, b: Vec2) -> f32 {
    let la = a.length();
    let lb = b.length();
    if la <= f32::EPSILON || lb <= f32::EPSILON {
        return 0.0;
    }
    let cos = (a.dot(&b) / (la * lb)).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// Circle overlap test (touching counts as overlapping).
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let r = ra + rb;
    a.distance_squared(&b) <= r * r
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec2_operations() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(4.0, 6.0);

        let sum = a + b;
        assert_eq!(sum.x, 5.0);
        assert_eq!(sum.y, 8.0);

        let diff = b - a;
        assert_eq!(diff.x, 3.0);

        let scaled = a * 2.0;
        assert_eq!(scaled.y, 4.0);

        assert!((a.distance(&b) - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_vec2_normalize() {
        let v = Vec2::new(3.0, 4.0);
        let n = v.normalize();
        assert!((n.length() - 1.0).abs() < 0.001);
        assert_eq!(Vec2::ZERO.normalize(), Vec2::ZERO);
    }

    #[test]
    fn test_bounds_clamp() {
        let bounds = Bounds::from_size(100.0, 100.0);
        assert!(bounds.contains(&Vec2::new(50.0, 50.0)));
        assert!(!bounds.contains(&Vec2::new(150.0, 50.0)));

        let clamped = bounds.clamp(Vec2::new(150.0, -10.0));
        assert_eq!(clamped, Vec2::new(100.0, 0.0));
    }

    #[test]
    fn test_angle_between() {
        let east = Vec2::new(1.0, 0.0);
        let north = Vec2::new(0.0, 1.0);
        let west = Vec2::new(-1.0, 0.0);

        assert!(angle_between_deg(east, east).abs() < 0.001);
        assert!((angle_between_deg(east, north) - 90.0).abs() < 0.001);
        assert!((angle_between_deg(east, west) - 180.0).abs() < 0.001);
        assert_eq!(angle_between_deg(east, Vec2::ZERO), 0.0);
    }

    #[test]
    fn test_circles_overlap() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(3.0, 0.0);
        assert!(circles_overlap(a, 2.0, b, 2.0));
        assert!(!circles_overlap(a, 1.0, b, 1.5));
    }
}
