//! Scalar and angle helpers shared by the simulation stages.

use std::f32::consts::{PI, TAU};

use crate::util::vec2::Vec2;

#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance_to(b)
}

/// Wrap an angle into (-PI, PI]
pub fn normalize_angle(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    let mut a = angle % TAU;
    if a > PI {
        a -= TAU;
    } else if a <= -PI {
        a += TAU;
    }
    a
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Interpolate along the shorter arc from `a` toward `b`
pub fn lerp_angle(a: f32, b: f32, t: f32) -> f32 {
    a + normalize_angle(b - a) * t
}
