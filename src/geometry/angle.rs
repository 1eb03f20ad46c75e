//! Angle helpers for headings
//!
//! Headings are radians measured counter-clockwise from the positive x axis
//! and stored normalized to `[0, 2π)`.

use std::f64::consts::{PI, TAU};

use kurbo::Vec2;

/// Normalize an angle into `[0, 2π)`.
pub fn normalize_angle(angle: f64) -> f64 {
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Wrap an angle difference into `(-π, π]`.
pub fn wrap_delta(delta: f64) -> f64 {
    let wrapped = normalize_angle(delta);
    if wrapped > PI {
        wrapped - TAU
    } else {
        wrapped
    }
}

/// Signed shortest-arc difference going from `from` to `to`.
pub fn shortest_arc(from: f64, to: f64) -> f64 {
    wrap_delta(normalize_angle(to) - normalize_angle(from))
}

/// Interpolate between two headings along the shortest arc.
///
/// The result is normalized, and never travels more than half a turn.
pub fn lerp_angle(from: f64, to: f64, t: f64) -> f64 {
    normalize_angle(normalize_angle(from) + shortest_arc(from, to) * t)
}

/// Unit vector pointing along a heading.
pub fn heading_vector(heading: f64) -> Vec2 {
    Vec2::from_angle(heading)
}

/// Heading of a direction vector, or `None` for a zero vector.
pub fn heading_of(direction: Vec2) -> Option<f64> {
    if direction.hypot2() == 0.0 || !direction.is_finite() {
        return None;
    }
    Some(normalize_angle(direction.atan2()))
}
