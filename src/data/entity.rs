//! Tracked entities and the updates applied to them

use std::fmt;

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::geometry::angle::normalize_angle;
use crate::geometry::Pose;

/// Stable cross-keyframe identity of an entity.
///
/// Ids are regenerated whenever a keyframe is duplicated, so the label is
/// what ties "rider 7" in one keyframe to "rider 7" in the next.
pub type Label = SmolStr;

/// Per-keyframe instance identifier
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Nominal gait of an entity, used to suggest keyframe durations
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SpeedClass {
    #[default]
    Walk,
    Trot,
    Canter,
    Gallop,
}

impl SpeedClass {
    /// Typical ground speed in meters per second
    pub fn meters_per_second(self) -> f64 {
        match self {
            SpeedClass::Walk => 1.5,
            SpeedClass::Trot => 3.5,
            SpeedClass::Canter => 6.0,
            SpeedClass::Gallop => 10.0,
        }
    }
}

/// One tracked participant inside a keyframe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub label: Label,
    pub position: Point,
    /// Radians in `[0, 2π)`, counter-clockwise from +x
    pub heading: f64,
    #[serde(default)]
    pub speed_class: SpeedClass,
}

impl Entity {
    pub fn new(
        id: EntityId,
        label: impl Into<Label>,
        position: impl Into<Point>,
        heading: f64,
    ) -> Self {
        Self {
            id,
            label: label.into(),
            position: position.into(),
            heading: normalize_angle(heading),
            speed_class: SpeedClass::default(),
        }
    }

    pub fn with_speed_class(mut self, speed_class: SpeedClass) -> Self {
        self.speed_class = speed_class;
        self
    }

    pub fn pose(&self) -> Pose {
        Pose {
            position: self.position,
            heading: self.heading,
        }
    }

    pub fn set_pose(&mut self, pose: Pose) {
        self.position = pose.position;
        self.heading = normalize_angle(pose.heading);
    }
}

/// A proposed change to one entity, as produced by the formation engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntityUpdate {
    pub entity_id: EntityId,
    pub position_delta: Vec2,
    pub heading_delta: f64,
}

impl EntityUpdate {
    /// The update that carries `from` to `to`.
    pub fn between(entity_id: EntityId, from: Pose, to: Pose) -> Self {
        Self {
            entity_id,
            position_delta: to.position - from.position,
            heading_delta: to.heading - from.heading,
        }
    }

    /// Whether applying this update leaves the entity where it is.
    pub fn is_identity(&self) -> bool {
        self.position_delta == Vec2::ZERO && self.heading_delta == 0.0
    }

    pub fn apply(&self, pose: Pose) -> Pose {
        pose.offset(self.position_delta, self.heading_delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn new_normalizes_heading() {
        let e = Entity::new(EntityId(1), "A", (0.0, 0.0), -FRAC_PI_2);
        assert!((e.heading - 3.0 * FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn update_between_round_trips() {
        let from = Pose::new((1.0, 2.0), 0.5);
        let to = Pose::new((4.0, -1.0), 2.0);
        let update = EntityUpdate::between(EntityId(3), from, to);
        let applied = update.apply(from);
        assert!((applied.position - to.position).hypot() < 1e-12);
        assert!((applied.heading - to.heading).abs() < 1e-12);
        assert!(!update.is_identity());
    }

    #[test]
    fn speed_classes_are_ordered() {
        assert!(
            SpeedClass::Walk.meters_per_second()
                < SpeedClass::Gallop.meters_per_second()
        );
    }

    #[test]
    fn speed_class_defaults_when_missing_from_json() {
        let json = r#"{
            "id": 4,
            "label": "B",
            "position": {"x": 1.0, "y": 2.0},
            "heading": 0.0
        }"#;
        let e: Entity = serde_json::from_str(json).unwrap();
        assert_eq!(e.speed_class, SpeedClass::Walk);
        assert_eq!(e.id, EntityId(4));
    }
}
