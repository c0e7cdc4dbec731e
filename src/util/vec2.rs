use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// World-space point or displacement. Serializes as `{ "x": .., "y": .. }`,
/// which is also the wire shape of a worm segment.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing along `angle` (radians, +x axis = 0)
    #[inline]
    pub fn from_angle(angle: f32) -> Self {
        Self::new(angle.cos(), angle.sin())
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.length_sq().sqrt()
    }

    #[inline]
    pub fn length_sq(&self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    #[inline]
    pub fn distance_to(&self, other: Vec2) -> f32 {
        (*self - other).length()
    }

    #[inline]
    pub fn distance_sq_to(&self, other: Vec2) -> f32 {
        (*self - other).length_sq()
    }

    pub fn lerp(&self, other: Vec2, t: f32) -> Self {
        *self + (other - *self) * t
    }

    /// Heading of this vector in radians
    pub fn angle(&self) -> f32 {
        self.y.atan2(self.x)
    }

    /// Heading from `self` toward `target`
    pub fn angle_to_point(&self, target: Vec2) -> f32 {
        (target - *self).angle()
    }

    /// Clamp both components into `[min, max]`
    pub fn clamp_each(&self, min: f32, max: f32) -> Self {
        Self::new(self.x.clamp(min, max), self.y.clamp(min, max))
    }

    pub fn approx_eq(&self, other: Vec2, epsilon: f32) -> bool {
        (self.x - other.x).abs() < epsilon && (self.y - other.y).abs() < epsilon
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl MulAssign<f32> for Vec2 {
    fn mul_assign(&mut self, rhs: f32) {
        self.x *= rhs;
        self.y *= rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_length_and_distance() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(3.0, 4.0);
        assert!((b.length() - 5.0).abs() < EPSILON);
        assert!((a.distance_to(b) - 5.0).abs() < EPSILON);
        assert!((a.distance_sq_to(b) - 25.0).abs() < EPSILON);
    }

    #[test]
    fn test_from_angle_matches_angle() {
        let v = Vec2::from_angle(PI / 2.0);
        assert!(v.approx_eq(Vec2::new(0.0, 1.0), EPSILON));
        assert!((v.angle() - PI / 2.0).abs() < EPSILON);
    }

    #[test]
    fn test_angle_to_point() {
        let from = Vec2::new(10.0, 10.0);
        assert!((from.angle_to_point(Vec2::new(10.0, 20.0)) - PI / 2.0).abs() < EPSILON);
        assert!((from.angle_to_point(Vec2::new(0.0, 10.0)) - PI).abs() < EPSILON);
    }

    #[test]
    fn test_lerp_edges() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, -10.0);
        assert!(a.lerp(b, 0.0).approx_eq(a, EPSILON));
        assert!(a.lerp(b, 1.0).approx_eq(b, EPSILON));
        assert!(a.lerp(b, 0.2).approx_eq(Vec2::new(2.0, -2.0), EPSILON));
    }

    #[test]
    fn test_clamp_each() {
        let v = Vec2::new(-5.0, 5000.0).clamp_each(10.0, 3990.0);
        assert_eq!(v, Vec2::new(10.0, 3990.0));
    }

    #[test]
    fn test_operators() {
        let mut a = Vec2::new(1.0, 2.0);
        a += Vec2::new(3.0, 4.0);
        assert_eq!(a, Vec2::new(4.0, 6.0));
        a -= Vec2::new(1.0, 1.0);
        assert_eq!(a, Vec2::new(3.0, 5.0));
        a *= 2.0;
        assert_eq!(a, Vec2::new(6.0, 10.0));
        assert_eq!(-a, Vec2::new(-6.0, -10.0));
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_string(&Vec2::new(1.5, 2.5)).unwrap();
        assert_eq!(json, r#"{"x":1.5,"y":2.5}"#);
    }
}
