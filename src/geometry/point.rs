//! Points, poses and group pivots
//!
//! Positions are `kurbo::Point`s in meters from the scene origin.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

use super::angle::normalize_angle;

/// Below this cross product magnitude three points count as collinear.
const COLLINEAR_EPSILON: f64 = 1e-9;

/// Position plus heading of a single entity
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub position: Point,
    /// Radians in `[0, 2π)`
    pub heading: f64,
}

impl Pose {
    pub fn new(position: impl Into<Point>, heading: f64) -> Self {
        Self {
            position: position.into(),
            heading: normalize_angle(heading),
        }
    }

    /// Apply a position and heading offset, keeping the heading normalized.
    pub fn offset(self, position_delta: Vec2, heading_delta: f64) -> Self {
        Self {
            position: self.position + position_delta,
            heading: normalize_angle(self.heading + heading_delta),
        }
    }
}

/// How a group transform picks its fixed point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PivotMode {
    /// Arithmetic mean of the selection
    #[default]
    Centroid,
    /// Circumcenter for exactly three non-collinear points, else centroid
    Circumcenter,
}

/// Arithmetic mean of a set of points.
pub fn centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    let sum = points
        .iter()
        .fold(Vec2::ZERO, |acc, p| acc + p.to_vec2());
    Some((sum / points.len() as f64).to_point())
}

/// The point equidistant from `a`, `b` and `c`.
///
/// Returns `None` when the three points are collinear (or coincident),
/// since the perpendicular bisectors never meet.
pub fn circumcenter(a: Point, b: Point, c: Point) -> Option<Point> {
    let ab = b - a;
    let ac = c - a;
    let d = 2.0 * ab.cross(ac);
    if d.abs() < COLLINEAR_EPSILON {
        return None;
    }
    let ab2 = ab.hypot2();
    let ac2 = ac.hypot2();
    let ux = (ac.y * ab2 - ab.y * ac2) / d;
    let uy = (ab.x * ac2 - ac.x * ab2) / d;
    Some(a + Vec2::new(ux, uy))
}

/// Pivot for a group transform.
pub fn pivot(points: &[Point], mode: PivotMode) -> Option<Point> {
    match (mode, points) {
        (PivotMode::Circumcenter, &[a, b, c]) => {
            circumcenter(a, b, c).or_else(|| centroid(points))
        }
        _ => centroid(points),
    }
}
