//! The keyframe store
//!
//! A `Sequence` is the single source of truth for entity state. Everything
//! else (playback, formation tools, undo) reads snapshots of it and hands
//! changes back through the methods here, which keep the timing chain and
//! label uniqueness intact.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityId, EntityUpdate, Label, SpeedClass};
use crate::core::errors::{
    bail, ensure, validate_duration, validate_finite_coords, ChoreoResult,
};
use crate::geometry::Pose;
use crate::{entity_not_found, keyframe_out_of_bounds};

/// A point in time holding the pose of every entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub index: usize,
    /// Seconds from the start; always the sum of earlier durations
    pub timestamp: f64,
    /// Seconds until the next keyframe
    pub duration: f64,
    pub entities: Vec<Entity>,
}

impl Keyframe {
    /// Time at which this keyframe hands over to the next one.
    pub fn end(&self) -> f64 {
        self.timestamp + self.duration
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    pub fn by_label(&self, label: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.label == label)
    }
}

/// Descriptive information about a drill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceInfo {
    pub title: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Default for SequenceInfo {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            title: "Untitled drill".to_string(),
            created: now,
            modified: now,
        }
    }
}

/// Ordered keyframes plus metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sequence {
    #[serde(default)]
    pub info: SequenceInfo,
    keyframes: Vec<Keyframe>,
    #[serde(skip)]
    next_id: u64,
}

impl Sequence {
    /// Create a sequence with a single keyframe holding `entities`.
    ///
    /// Entity ids are assigned here; any ids on the input are ignored.
    pub fn new(
        title: impl Into<String>,
        entities: Vec<Entity>,
        duration: f64,
    ) -> ChoreoResult<Self> {
        validate_duration(duration)?;
        let mut sequence = Self {
            info: SequenceInfo {
                title: title.into(),
                ..SequenceInfo::default()
            },
            keyframes: Vec::new(),
            next_id: 0,
        };
        let entities = entities
            .into_iter()
            .map(|mut e| {
                e.id = sequence.allocate_id();
                e
            })
            .collect();
        sequence.keyframes.push(Keyframe {
            index: 0,
            timestamp: 0.0,
            duration,
            entities,
        });
        sequence.validate()?;
        Ok(sequence)
    }

    /// Check invariants and rebuild derived fields after deserializing.
    pub fn normalize(&mut self) -> ChoreoResult<()> {
        for keyframe in &mut self.keyframes {
            for entity in &mut keyframe.entities {
                entity.set_pose(entity.pose());
            }
        }
        self.validate()?;
        self.next_id = self
            .keyframes
            .iter()
            .flat_map(|k| k.entities.iter())
            .map(|e| e.id.0 + 1)
            .max()
            .unwrap_or(0);
        self.retime();
        Ok(())
    }

    fn validate(&self) -> ChoreoResult<()> {
        ensure!(
            !self.keyframes.is_empty(),
            "A sequence must hold at least one keyframe"
        );
        for (index, keyframe) in self.keyframes.iter().enumerate() {
            validate_duration(keyframe.duration)?;
            let mut labels = HashSet::new();
            for entity in &keyframe.entities {
                validate_finite_coords(entity.position.x, entity.position.y)?;
                ensure!(
                    entity.heading.is_finite(),
                    "Heading of '{}' must be finite",
                    entity.label
                );
                ensure!(
                    labels.insert(entity.label.clone()),
                    "Duplicate label '{}' in keyframe {}",
                    entity.label,
                    index
                );
            }
        }
        Ok(())
    }

    /// Rebuild `index` and `timestamp` from the duration chain.
    fn retime(&mut self) {
        let mut timestamp = 0.0;
        for (index, keyframe) in self.keyframes.iter_mut().enumerate() {
            keyframe.index = index;
            keyframe.timestamp = timestamp;
            timestamp += keyframe.duration;
        }
    }

    fn touch(&mut self) {
        self.info.modified = Utc::now();
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    pub fn keyframe(&self, index: usize) -> Option<&Keyframe> {
        self.keyframes.get(index)
    }

    fn keyframe_mut(&mut self, index: usize) -> ChoreoResult<&mut Keyframe> {
        let len = self.keyframes.len();
        self.keyframes
            .get_mut(index)
            .ok_or_else(|| keyframe_out_of_bounds!(index, len))
    }

    /// Number of keyframes; never zero.
    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    /// Always false, a sequence keeps at least one keyframe.
    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Length of the whole drill in seconds.
    pub fn total_duration(&self) -> f64 {
        self.keyframes.last().map(Keyframe::end).unwrap_or(0.0)
    }

    /// Duplicate keyframe `after` and insert the copy right behind it.
    ///
    /// The copy keeps labels and poses but gets fresh entity ids. Returns
    /// the index of the new keyframe.
    pub fn insert_copy(&mut self, after: usize) -> ChoreoResult<usize> {
        let mut copy = self
            .keyframe(after)
            .cloned()
            .ok_or_else(|| keyframe_out_of_bounds!(after, self.len()))?;
        for entity in &mut copy.entities {
            entity.id = self.allocate_id();
        }
        let at = after + 1;
        self.keyframes.insert(at, copy);
        self.retime();
        self.touch();
        debug!("Inserted keyframe {} as a copy of {}", at, after);
        Ok(at)
    }

    /// Put a previously removed keyframe back at `at`.
    pub fn insert_keyframe(
        &mut self,
        at: usize,
        keyframe: Keyframe,
    ) -> ChoreoResult<()> {
        if at > self.len() {
            return Err(keyframe_out_of_bounds!(at, self.len()));
        }
        validate_duration(keyframe.duration)?;
        for entity in &keyframe.entities {
            self.next_id = self.next_id.max(entity.id.0 + 1);
        }
        self.keyframes.insert(at, keyframe);
        self.retime();
        self.touch();
        Ok(())
    }

    pub fn remove_keyframe(&mut self, index: usize) -> ChoreoResult<Keyframe> {
        if index >= self.len() {
            return Err(keyframe_out_of_bounds!(index, self.len()));
        }
        if self.len() == 1 {
            bail!("Cannot remove the only keyframe of a sequence");
        }
        let removed = self.keyframes.remove(index);
        self.retime();
        self.touch();
        debug!("Removed keyframe {}", index);
        Ok(removed)
    }

    /// Change a keyframe's duration, returning the previous one.
    pub fn set_duration(
        &mut self,
        index: usize,
        duration: f64,
    ) -> ChoreoResult<f64> {
        validate_duration(duration)?;
        let keyframe = self.keyframe_mut(index)?;
        let previous = std::mem::replace(&mut keyframe.duration, duration);
        self.retime();
        self.touch();
        Ok(previous)
    }

    /// Add a new entity to one keyframe.
    pub fn add_entity(
        &mut self,
        keyframe: usize,
        label: impl Into<Label>,
        pose: Pose,
        speed_class: SpeedClass,
    ) -> ChoreoResult<EntityId> {
        let label = label.into();
        validate_finite_coords(pose.position.x, pose.position.y)?;
        ensure!(
            self.keyframe(keyframe)
                .ok_or_else(|| keyframe_out_of_bounds!(keyframe, self.len()))?
                .by_label(&label)
                .is_none(),
            "Label '{}' already exists in keyframe {}",
            label,
            keyframe
        );
        let id = self.allocate_id();
        let entity = Entity::new(id, label, pose.position, pose.heading)
            .with_speed_class(speed_class);
        self.keyframe_mut(keyframe)?.entities.push(entity);
        self.touch();
        Ok(id)
    }

    pub fn remove_entity(
        &mut self,
        keyframe: usize,
        id: EntityId,
    ) -> ChoreoResult<Entity> {
        let frame = self.keyframe_mut(keyframe)?;
        let position = frame
            .entities
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| entity_not_found!(id, keyframe))?;
        let removed = frame.entities.remove(position);
        self.touch();
        Ok(removed)
    }

    /// Put a previously removed entity back at `slot`, keeping its id.
    pub fn restore_entity(
        &mut self,
        keyframe: usize,
        slot: usize,
        entity: Entity,
    ) -> ChoreoResult<()> {
        let frame = self.keyframe_mut(keyframe)?;
        ensure!(
            frame.by_label(&entity.label).is_none(),
            "Label '{}' already exists in keyframe {}",
            entity.label,
            keyframe
        );
        let slot = slot.min(frame.entities.len());
        let next = entity.id.0 + 1;
        frame.entities.insert(slot, entity);
        self.next_id = self.next_id.max(next);
        self.touch();
        Ok(())
    }

    pub fn pose(&self, keyframe: usize, id: EntityId) -> ChoreoResult<Pose> {
        self.keyframe(keyframe)
            .ok_or_else(|| keyframe_out_of_bounds!(keyframe, self.len()))?
            .entity(id)
            .map(Entity::pose)
            .ok_or_else(|| entity_not_found!(id, keyframe))
    }

    /// Set an entity's pose outright.
    pub fn place(
        &mut self,
        keyframe: usize,
        id: EntityId,
        pose: Pose,
    ) -> ChoreoResult<()> {
        validate_finite_coords(pose.position.x, pose.position.y)?;
        ensure!(pose.heading.is_finite(), "Heading must be finite");
        self.keyframe_mut(keyframe)?
            .entity_mut(id)
            .ok_or_else(|| entity_not_found!(id, keyframe))?
            .set_pose(pose);
        self.touch();
        Ok(())
    }

    /// Apply a relative update, returning the resulting pose.
    pub fn offset(
        &mut self,
        keyframe: usize,
        update: &EntityUpdate,
    ) -> ChoreoResult<Pose> {
        let pose = update.apply(self.pose(keyframe, update.entity_id)?);
        self.place(keyframe, update.entity_id, pose)?;
        Ok(pose)
    }
}
