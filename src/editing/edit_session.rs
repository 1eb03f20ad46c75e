//! Gesture sessions for continuous group transforms
//!
//! A session lives from pointer press to release. It captures the pivot and
//! every selected entity's pose once, and each frame's target is computed
//! from that baseline rather than from the previous frame.

use kurbo::{Affine, Point, Vec2};
use log::debug;

use crate::data::{EntityId, EntityUpdate, Keyframe};
use crate::geometry::point::pivot;
use crate::geometry::{PivotMode, Pose};

/// Cumulative transform since the gesture started
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureTransform {
    /// Offset in scene meters
    Translate(Vec2),
    /// Counter-clockwise angle in radians around the pivot
    Rotate(f64),
    /// Uniform factor around the pivot
    Scale(f64),
}

impl GestureTransform {
    pub fn description(&self) -> &'static str {
        match self {
            GestureTransform::Translate(_) => "Move",
            GestureTransform::Rotate(_) => "Rotate",
            GestureTransform::Scale(_) => "Scale",
        }
    }

    fn affine(&self, pivot: Point) -> Affine {
        match *self {
            GestureTransform::Translate(delta) => Affine::translate(delta),
            GestureTransform::Rotate(angle) => {
                Affine::rotate_about(angle, pivot)
            }
            GestureTransform::Scale(factor) => {
                Affine::scale_about(factor, pivot)
            }
        }
    }

    fn heading_delta(&self) -> f64 {
        match *self {
            GestureTransform::Rotate(angle) => angle,
            _ => 0.0,
        }
    }
}

/// Pivot and per-entity baseline captured at gesture start
#[derive(Debug, Clone, PartialEq)]
pub struct GestureSession {
    pub keyframe: usize,
    pub pivot: Point,
    pub baseline: Vec<(EntityId, Pose)>,
}

impl GestureSession {
    /// Start a gesture on the selected entities of `keyframe`.
    ///
    /// Ids that are not in the keyframe are skipped. Returns `None` when
    /// nothing is left to transform.
    pub fn begin(
        keyframe: &Keyframe,
        selection: &[EntityId],
        mode: PivotMode,
    ) -> Option<Self> {
        let baseline: Vec<_> = selection
            .iter()
            .filter_map(|&id| keyframe.entity(id).map(|e| (id, e.pose())))
            .collect();
        let points: Vec<Point> =
            baseline.iter().map(|(_, pose)| pose.position).collect();
        let pivot = pivot(&points, mode)?;
        debug!(
            "Gesture started on {} entities in keyframe {}, pivot {:?}",
            baseline.len(),
            keyframe.index,
            pivot
        );
        Some(Self {
            keyframe: keyframe.index,
            pivot,
            baseline,
        })
    }

    pub fn entity_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.baseline.iter().map(|(id, _)| *id)
    }

    /// Absolute pose of every baseline entity under `transform`.
    pub fn target(&self, transform: GestureTransform) -> Vec<(EntityId, Pose)> {
        let affine = transform.affine(self.pivot);
        let turn = transform.heading_delta();
        self.baseline
            .iter()
            .map(|&(id, pose)| {
                let position = affine * pose.position;
                (id, Pose::new(position, pose.heading + turn))
            })
            .collect()
    }

    /// Relative updates that carry the entities of `current` to the
    /// targets of `transform`.
    pub fn updates(
        &self,
        current: &Keyframe,
        transform: GestureTransform,
    ) -> Vec<EntityUpdate> {
        self.target(transform)
            .into_iter()
            .filter_map(|(id, target)| {
                let entity = current.entity(id)?;
                Some(EntityUpdate::between(id, entity.pose(), target))
            })
            .collect()
    }
}
