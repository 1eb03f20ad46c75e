//! Choosing the displayed heading during a transition

use kurbo::Vec2;

use crate::core::settings::HeadingSettings;
use crate::geometry::angle::{heading_of, lerp_angle};

/// Picks between angular interpolation and the curve tangent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadingResolver {
    /// Displacements shorter than this (meters) turn in place
    pub tangent_min_distance: f64,
}

impl Default for HeadingResolver {
    fn default() -> Self {
        Self::from_settings(&HeadingSettings::default())
    }
}

impl HeadingResolver {
    pub fn from_settings(settings: &HeadingSettings) -> Self {
        Self {
            tangent_min_distance: settings.tangent_min_distance,
        }
    }

    /// Heading at `phase` of a transition covering `distance` meters.
    ///
    /// Short moves rotate along the shortest arc, since the tangent of a
    /// nearly degenerate curve swings wildly. Longer moves face along the
    /// path. A zero tangent also falls back to the shortest arc.
    pub fn resolve(
        &self,
        from_heading: f64,
        to_heading: f64,
        phase: f64,
        distance: f64,
        tangent: Vec2,
    ) -> f64 {
        if distance < self.tangent_min_distance {
            return lerp_angle(from_heading, to_heading, phase);
        }
        heading_of(tangent)
            .unwrap_or_else(|| lerp_angle(from_heading, to_heading, phase))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn short_moves_use_shortest_arc() {
        let resolver = HeadingResolver::default();
        let west = Vec2::new(-1.0, 0.0);
        let h = resolver.resolve(0.0, FRAC_PI_2, 0.5, 1.0, west);
        assert!((h - FRAC_PI_2 / 2.0).abs() < 1e-12);
    }

    #[test]
    fn long_moves_follow_tangent() {
        let resolver = HeadingResolver::default();
        let west = Vec2::new(-1.0, 0.0);
        let h = resolver.resolve(0.0, FRAC_PI_2, 0.5, 10.0, west);
        assert!((h - PI).abs() < 1e-12);
    }

    #[test]
    fn zero_tangent_falls_back() {
        let resolver = HeadingResolver::default();
        let h = resolver.resolve(0.0, PI / 3.0, 1.0, 10.0, Vec2::ZERO);
        assert!((h - PI / 3.0).abs() < 1e-12);
    }

    #[test]
    fn threshold_is_exclusive() {
        let resolver = HeadingResolver {
            tangent_min_distance: 4.0,
        };
        let tangent = Vec2::new(0.0, -1.0);
        let h = resolver.resolve(0.0, 0.0, 0.5, 4.0, tangent);
        assert!((h - 3.0 * FRAC_PI_2).abs() < 1e-12);
    }
}
