//! Resolving what every entity looks like at a given playback time
//!
//! Entities are matched between keyframes by label. For each matched pair
//! we build the heading-aware curve, walk it at constant speed, and pick a
//! heading. Entities that only exist on one side of a transition hold
//! still, so nothing blinks out of view mid-move.

use kurbo::Point;
use serde::Serialize;

use super::heading::HeadingResolver;
use super::locate::{locate, Playhead, TimelinePosition};
use crate::core::settings::ChoreoSettings;
use crate::data::{Entity, Keyframe, Label};
use crate::geometry::{PathBuilder, Pose, SampledPath};

/// Displayed state of one entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityPose {
    pub label: Label,
    pub position: Point,
    pub heading: f64,
}

impl EntityPose {
    fn held(entity: &Entity) -> Self {
        Self {
            label: entity.label.clone(),
            position: entity.position,
            heading: entity.heading,
        }
    }

    pub fn pose(&self) -> Pose {
        Pose {
            position: self.position,
            heading: self.heading,
        }
    }
}

/// Preview polyline for one entity's move between two keyframes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionPath {
    pub label: Label,
    pub points: Vec<Point>,
    /// Sampled length in meters
    pub length: f64,
}

/// Turns keyframes into continuous motion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interpolator {
    pub path: PathBuilder,
    pub heading: HeadingResolver,
    /// Polyline segments per transition curve
    pub samples: usize,
}

impl Default for Interpolator {
    fn default() -> Self {
        Self::from_settings(&ChoreoSettings::default())
    }
}

impl Interpolator {
    pub fn from_settings(settings: &ChoreoSettings) -> Self {
        Self {
            path: PathBuilder::from_settings(&settings.path),
            heading: HeadingResolver::from_settings(&settings.heading),
            samples: settings.path.samples,
        }
    }

    /// Sampled curve of one entity moving between two poses.
    pub fn transition(&self, from: Pose, to: Pose) -> SampledPath {
        SampledPath::new(&self.path.build(from, to), self.samples)
    }

    /// Pose of a single moving entity at `phase` of its transition.
    pub fn pose_between(&self, from: Pose, to: Pose, phase: f64) -> Pose {
        let path = self.transition(from, to);
        let sample = path.at(phase);
        let distance = from.position.distance(to.position);
        Pose {
            position: sample.position,
            heading: self.heading.resolve(
                from.heading,
                to.heading,
                phase,
                distance,
                sample.tangent,
            ),
        }
    }

    /// Displayed pose of every entity at playback time `time`.
    pub fn poses_at(
        &self,
        keyframes: &[Keyframe],
        time: f64,
    ) -> Vec<EntityPose> {
        match locate(keyframes, time) {
            Some(position) => self.poses_for(keyframes, position),
            None => Vec::new(),
        }
    }

    /// Same as [`Interpolator::poses_at`], reusing a playhead's cached scan.
    pub fn poses_with(
        &self,
        playhead: &mut Playhead,
        keyframes: &[Keyframe],
        time: f64,
    ) -> Vec<EntityPose> {
        match playhead.seek(keyframes, time) {
            Some(position) => self.poses_for(keyframes, position),
            None => Vec::new(),
        }
    }

    /// Displayed pose of every entity at an already located position.
    pub fn poses_for(
        &self,
        keyframes: &[Keyframe],
        position: TimelinePosition,
    ) -> Vec<EntityPose> {
        let Some(current) = keyframes.get(position.index) else {
            return Vec::new();
        };
        let next = position.next_index.and_then(|i| keyframes.get(i));

        // phase 1 on a keyframe with a successor means "arrived"
        if position.phase == 1.0 {
            if let Some(next) = next {
                return union_held(next, current);
            }
        }
        let next = match next {
            Some(next) if !position.is_at_keyframe() => next,
            _ => return current.entities.iter().map(EntityPose::held).collect(),
        };

        let mut poses: Vec<EntityPose> = current
            .entities
            .iter()
            .map(|entity| match next.by_label(&entity.label) {
                Some(target) => {
                    let pose = self.pose_between(
                        entity.pose(),
                        target.pose(),
                        position.phase,
                    );
                    EntityPose {
                        label: entity.label.clone(),
                        position: pose.position,
                        heading: pose.heading,
                    }
                }
                None => EntityPose::held(entity),
            })
            .collect();

        // entities appearing in the next keyframe wait at their destination
        poses.extend(
            next.entities
                .iter()
                .filter(|e| current.by_label(&e.label).is_none())
                .map(EntityPose::held),
        );
        poses
    }

    /// Preview paths for every label present in both `index` and the
    /// keyframe after it. Empty for the last keyframe.
    pub fn transition_paths(
        &self,
        keyframes: &[Keyframe],
        index: usize,
    ) -> Vec<TransitionPath> {
        let (Some(from), Some(to)) =
            (keyframes.get(index), keyframes.get(index + 1))
        else {
            return Vec::new();
        };
        from.entities
            .iter()
            .filter_map(|entity| {
                let target = to.by_label(&entity.label)?;
                let path = self.transition(entity.pose(), target.pose());
                Some(TransitionPath {
                    label: entity.label.clone(),
                    points: path.polyline(),
                    length: path.length(),
                })
            })
            .collect()
    }
}

/// Poses of `primary` plus anything only `secondary` has, all held still.
fn union_held(primary: &Keyframe, secondary: &Keyframe) -> Vec<EntityPose> {
    let mut poses: Vec<EntityPose> =
        primary.entities.iter().map(EntityPose::held).collect();
    poses.extend(
        secondary
            .entities
            .iter()
            .filter(|e| primary.by_label(&e.label).is_none())
            .map(EntityPose::held),
    );
    poses
}
