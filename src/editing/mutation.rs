//! Mutation requests sent to the keyframe store

use kurbo::Vec2;

use super::edit_type::EditType;
use crate::data::{EntityId, EntityUpdate};
use crate::geometry::Pose;

/// A single change to one entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PoseEdit {
    /// Move and turn relative to the current pose
    Offset(EntityUpdate),
    /// Set the pose outright
    Place { entity_id: EntityId, pose: Pose },
}

impl PoseEdit {
    pub fn entity_id(&self) -> EntityId {
        match self {
            PoseEdit::Offset(update) => update.entity_id,
            PoseEdit::Place { entity_id, .. } => *entity_id,
        }
    }

    /// Nudge an entity by a fixed offset.
    pub fn translate(entity_id: EntityId, delta: Vec2) -> Self {
        PoseEdit::Offset(EntityUpdate {
            entity_id,
            position_delta: delta,
            heading_delta: 0.0,
        })
    }
}

/// A batch of edits to one keyframe, tagged transient or durable
#[derive(Debug, Clone, PartialEq)]
pub struct Mutation {
    pub keyframe: usize,
    pub edits: Vec<PoseEdit>,
    pub edit_type: EditType,
    /// Shown in the undo menu for durable mutations
    pub description: String,
}

impl Mutation {
    /// A change recorded in the undo history.
    pub fn durable(
        keyframe: usize,
        description: impl Into<String>,
        edits: Vec<PoseEdit>,
    ) -> Self {
        Self {
            keyframe,
            edits,
            edit_type: EditType::Normal,
            description: description.into(),
        }
    }

    /// A drag frame: applied but never recorded.
    pub fn transient(keyframe: usize, edits: Vec<PoseEdit>) -> Self {
        Self {
            keyframe,
            edits,
            edit_type: EditType::Drag,
            description: String::new(),
        }
    }

    /// Durable edits from formation engine output.
    pub fn from_updates(
        keyframe: usize,
        description: impl Into<String>,
        updates: &[EntityUpdate],
    ) -> Self {
        Self::durable(
            keyframe,
            description,
            updates.iter().copied().map(PoseEdit::Offset).collect(),
        )
    }

    pub fn with_edit_type(mut self, edit_type: EditType) -> Self {
        self.edit_type = edit_type;
        self
    }

    pub fn is_transient(&self) -> bool {
        self.edit_type.is_transient()
    }
}
