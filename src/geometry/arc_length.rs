//! Arc-length sampling of transition curves
//!
//! A cubic Bézier evaluated at evenly spaced `t` values does not move at an
//! even speed; samples bunch up where the curve bends. We sample the curve
//! into a polyline, measure it, and then map a linear phase onto a distance
//! along that polyline so playback covers equal ground in equal time.

use kurbo::{CubicBez, ParamCurve, ParamCurveDeriv, Point, Vec2};

/// A point on a sampled curve and the direction of travel there
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSample {
    pub position: Point,
    /// Unit tangent, or zero where the curve has no direction
    pub tangent: Vec2,
}

/// Unit vector in the direction of `v`, or zero for a zero vector.
fn unit_or_zero(v: Vec2) -> Vec2 {
    let len = v.hypot();
    if len > 0.0 && len.is_finite() {
        v / len
    } else {
        Vec2::ZERO
    }
}

/// Sample a curve at `segments + 1` evenly spaced parameter values.
///
/// At least one segment is always produced, so the result holds at least
/// the two endpoints.
pub fn sample(curve: &CubicBez, segments: usize) -> Vec<PathSample> {
    let segments = segments.max(1);
    let deriv = curve.deriv();
    (0..=segments)
        .map(|i| {
            let t = i as f64 / segments as f64;
            PathSample {
                position: curve.eval(t),
                tangent: unit_or_zero(deriv.eval(t).to_vec2()),
            }
        })
        .collect()
}

/// Remap a linear phase to a constant-speed sample on a polyline.
///
/// Returns `None` only for an empty sample list.
pub fn remap(samples: &[PathSample], phase: f64) -> Option<PathSample> {
    if samples.is_empty() {
        return None;
    }
    Some(ArcLengthTable::new(samples).at(samples, phase))
}

/// Cumulative segment lengths of a sampled polyline
#[derive(Debug, Clone, PartialEq)]
struct ArcLengthTable {
    /// `cumulative[i]` is the distance from the first sample to sample `i`
    cumulative: Vec<f64>,
}

impl ArcLengthTable {
    fn new(samples: &[PathSample]) -> Self {
        let mut cumulative = Vec::with_capacity(samples.len());
        let mut total = 0.0;
        cumulative.push(0.0);
        for pair in samples.windows(2) {
            total += pair[0].position.distance(pair[1].position);
            cumulative.push(total);
        }
        Self { cumulative }
    }

    fn total(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    fn at(&self, samples: &[PathSample], phase: f64) -> PathSample {
        let first = samples[0];
        let last = samples[samples.len() - 1];
        let total = self.total();
        if phase.is_nan() || phase <= 0.0 || total <= 0.0 {
            return first;
        }
        if phase >= 1.0 {
            return last;
        }

        let target = phase * total;
        // first sample index whose distance reaches the target
        let end = self
            .cumulative
            .partition_point(|&len| len < target)
            .clamp(1, samples.len() - 1);
        let start = end - 1;

        let span = self.cumulative[end] - self.cumulative[start];
        let local = if span > 0.0 {
            (target - self.cumulative[start]) / span
        } else {
            0.0
        };

        let a = samples[start];
        let b = samples[end];
        PathSample {
            position: a.position.lerp(b.position, local),
            tangent: unit_or_zero(a.tangent.lerp(b.tangent, local)),
        }
    }
}

/// A curve sampled once and queried many times
#[derive(Debug, Clone, PartialEq)]
pub struct SampledPath {
    samples: Vec<PathSample>,
    table: ArcLengthTable,
}

impl SampledPath {
    pub fn new(curve: &CubicBez, segments: usize) -> Self {
        let samples = sample(curve, segments);
        let table = ArcLengthTable::new(&samples);
        Self { samples, table }
    }

    /// Polyline length of the sampled curve.
    pub fn length(&self) -> f64 {
        self.table.total()
    }

    pub fn samples(&self) -> &[PathSample] {
        &self.samples
    }

    /// Positions of the polyline, for path previews.
    pub fn polyline(&self) -> Vec<Point> {
        self.samples.iter().map(|s| s.position).collect()
    }

    /// Constant-speed sample at a linear phase in `[0, 1]`.
    pub fn at(&self, phase: f64) -> PathSample {
        self.table.at(&self.samples, phase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::path::build_curve;
    use kurbo::ParamCurveArclen;
    use std::f64::consts::FRAC_PI_2;

    /// A curve whose parameterization is badly uneven: the control points
    /// pile up near the start so early `t` values barely move.
    fn lopsided() -> CubicBez {
        CubicBez::new(
            (0.0, 0.0),
            (0.5, 0.0),
            (1.0, 0.0),
            (30.0, 20.0),
        )
    }

    #[test]
    fn sample_count_and_endpoints() {
        let curve = lopsided();
        let samples = sample(&curve, 16);
        assert_eq!(samples.len(), 17);
        assert_eq!(samples[0].position, curve.p0);
        assert_eq!(samples[16].position, curve.p3);

        assert_eq!(sample(&curve, 0).len(), 2);
    }

    #[test]
    fn tangents_are_unit_length() {
        for s in sample(&lopsided(), 20) {
            assert!((s.tangent.hypot() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn zero_derivative_gives_zero_tangent() {
        let p = Point::new(2.0, 2.0);
        let curve = CubicBez::new(p, p, p, p);
        for s in sample(&curve, 4) {
            assert_eq!(s.tangent, Vec2::ZERO);
            assert_eq!(s.position, p);
        }
    }

    #[test]
    fn remap_clamps_to_ends() {
        let samples = sample(&lopsided(), 32);
        let last = *samples.last().unwrap();
        assert_eq!(remap(&samples, 0.0), Some(samples[0]));
        assert_eq!(remap(&samples, -0.5), Some(samples[0]));
        assert_eq!(remap(&samples, 1.0), Some(last));
        assert_eq!(remap(&samples, 3.0), Some(last));
        assert_eq!(remap(&[], 0.5), None);
    }

    #[test]
    fn remap_covers_equal_distance_per_phase() {
        let curve = lopsided();
        let path = SampledPath::new(&curve, 256);
        let total = curve.arclen(1e-9);
        assert!((path.length() - total).abs() / total < 1e-3);

        for phase in [0.25, 0.5, 0.75] {
            let here = path.at(phase).position;
            // find the parameter of `here` by measuring true arc length
            let travelled = travelled_distance(&curve, here);
            assert!(
                (travelled / total - phase).abs() < 5e-3,
                "phase {phase}: travelled {}",
                travelled / total
            );
        }
    }

    /// Arc length from the start of `curve` to the closest point to `p`.
    fn travelled_distance(curve: &CubicBez, p: Point) -> f64 {
        let steps = 20_000;
        let best = (0..=steps)
            .map(|i| i as f64 / steps as f64)
            .min_by(|a, b| {
                let da = curve.eval(*a).distance(p);
                let db = curve.eval(*b).distance(p);
                da.total_cmp(&db)
            })
            .unwrap();
        curve.subsegment(0.0..best).arclen(1e-9)
    }

    #[test]
    fn zero_length_path_returns_first_sample() {
        let p = Point::new(5.0, 5.0);
        let path = SampledPath::new(&build_curve(p, 0.0, p, FRAC_PI_2), 8);
        assert_eq!(path.length(), 0.0);
        assert_eq!(path.at(0.5), path.samples()[0]);
    }

    #[test]
    fn polyline_matches_samples() {
        let path = SampledPath::new(&lopsided(), 4);
        assert_eq!(path.polyline().len(), 5);
        assert_eq!(path.polyline()[4], Point::new(30.0, 20.0));
    }
}
