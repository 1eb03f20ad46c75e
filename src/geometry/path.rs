//! Heading-aware transition curves
//!
//! A transition between two keyframes is drawn as a cubic Bézier whose end
//! tangents follow the entity's heading at each end. An entity that faces
//! north and must end up facing east therefore sweeps around in an arc
//! instead of sliding sideways.
//!
//! # Curve strength
//! The control points sit along the headings at a distance we call the
//! *curve strength*: a fixed fraction of the straight-line distance, capped
//! so long transitions don't bulge, then boosted by how much the entity has
//! to turn. A half turn gets 1.5x the base strength.

use std::f64::consts::PI;

use kurbo::{CubicBez, Point};

use super::angle::{heading_vector, shortest_arc};
use super::point::Pose;
use crate::core::settings::PathSettings;

/// Builds transition curves between two poses
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathBuilder {
    /// Fraction of the straight-line distance used as control offset
    pub strength_ratio: f64,
    /// Upper bound on the unboosted control offset, in meters
    pub strength_cap: f64,
    /// Extra strength for a half turn, as a fraction of the base
    pub turn_boost: f64,
}

impl Default for PathBuilder {
    fn default() -> Self {
        Self::from_settings(&PathSettings::default())
    }
}

impl PathBuilder {
    pub fn from_settings(settings: &PathSettings) -> Self {
        Self {
            strength_ratio: settings.strength_ratio,
            strength_cap: settings.strength_cap,
            turn_boost: settings.turn_boost,
        }
    }

    /// Control point offset length for a transition.
    pub fn curve_strength(&self, from: Pose, to: Pose) -> f64 {
        let distance = from.position.distance(to.position);
        let base = (distance * self.strength_ratio).min(self.strength_cap);
        let turn = shortest_arc(from.heading, to.heading).abs();
        base * (1.0 + (turn / PI) * self.turn_boost)
    }

    /// Build the transition curve from one pose to another.
    ///
    /// Coincident endpoints yield a zero-length curve with all four control
    /// points on the same spot.
    pub fn build(&self, from: Pose, to: Pose) -> CubicBez {
        let strength = self.curve_strength(from, to);
        let p1 = from.position + heading_vector(from.heading) * strength;
        let p2 = to.position - heading_vector(to.heading) * strength;
        CubicBez::new(from.position, p1, p2, to.position)
    }
}

/// Build a transition curve with the default builder.
pub fn build_curve(
    from_pos: Point,
    from_heading: f64,
    to_pos: Point,
    to_heading: f64,
) -> CubicBez {
    PathBuilder::default().build(
        Pose::new(from_pos, from_heading),
        Pose::new(to_pos, to_heading),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{ParamCurve, ParamCurveDeriv, Vec2};
    use std::f64::consts::FRAC_PI_2;

    fn builder() -> PathBuilder {
        PathBuilder {
            strength_ratio: 0.4,
            strength_cap: 20.0,
            turn_boost: 0.5,
        }
    }

    #[test]
    fn endpoints_match_poses() {
        let curve = build_curve(
            Point::new(1.0, 2.0),
            0.3,
            Point::new(7.0, -4.0),
            2.0,
        );
        assert_eq!(curve.p0, Point::new(1.0, 2.0));
        assert_eq!(curve.p3, Point::new(7.0, -4.0));
        assert_eq!(curve.eval(0.0), curve.p0);
        assert_eq!(curve.eval(1.0), curve.p3);
    }

    #[test]
    fn straight_ahead_uses_base_strength() {
        let from = Pose::new((0.0, 0.0), 0.0);
        let to = Pose::new((10.0, 0.0), 0.0);
        assert!((builder().curve_strength(from, to) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn half_turn_boosts_by_half() {
        let from = Pose::new((0.0, 0.0), 0.0);
        let to = Pose::new((10.0, 0.0), PI);
        assert!((builder().curve_strength(from, to) - 6.0).abs() < 1e-12);
    }

    #[test]
    fn strength_is_capped_before_boost() {
        let from = Pose::new((0.0, 0.0), 0.0);
        let to = Pose::new((100.0, 0.0), PI);
        // base 40 is capped to 20, then boosted 1.5x
        assert!((builder().curve_strength(from, to) - 30.0).abs() < 1e-12);
    }

    #[test]
    fn end_tangents_follow_headings() {
        let from = Pose::new((0.0, 0.0), 0.0);
        let to = Pose::new((10.0, 0.0), FRAC_PI_2);
        let curve = builder().build(from, to);
        let deriv = curve.deriv();

        let start = deriv.eval(0.0).to_vec2().normalize();
        assert!((start - Vec2::new(1.0, 0.0)).hypot() < 1e-9);

        let end = deriv.eval(1.0).to_vec2().normalize();
        assert!((end - Vec2::new(0.0, 1.0)).hypot() < 1e-9);
    }

    #[test]
    fn coincident_points_make_zero_length_curve() {
        let p = Point::new(3.0, 3.0);
        let curve = build_curve(p, 0.0, p, PI);
        assert_eq!(curve.p1, p);
        assert_eq!(curve.p2, p);
        assert!(curve.eval(0.5).distance(p) < 1e-12);
    }
}
