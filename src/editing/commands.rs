//! Undoable changes to a `Sequence`

use crate::core::errors::ChoreoResult;
use crate::data::{Entity, EntityId, Keyframe, Sequence};
use crate::editing::undo::Command;
use crate::geometry::Pose;

/// One entity's pose before and after an edit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseChange {
    pub keyframe: usize,
    pub entity_id: EntityId,
    pub before: Pose,
    pub after: Pose,
}

/// A batch of pose changes recorded as a single undo step.
///
/// Poses are stored absolutely, so undo lands exactly on the old values no
/// matter how they were reached.
#[derive(Debug, Clone, PartialEq)]
pub struct EditPoses {
    pub description: String,
    pub changes: Vec<PoseChange>,
}

impl Command<Sequence> for EditPoses {
    fn description(&self) -> &str {
        &self.description
    }

    fn undo(&self, sequence: &mut Sequence) -> ChoreoResult<()> {
        for change in self.changes.iter().rev() {
            sequence.place(change.keyframe, change.entity_id, change.before)?;
        }
        Ok(())
    }

    fn redo(&self, sequence: &mut Sequence) -> ChoreoResult<()> {
        for change in &self.changes {
            sequence.place(change.keyframe, change.entity_id, change.after)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetDuration {
    pub keyframe: usize,
    pub before: f64,
    pub after: f64,
}

impl Command<Sequence> for SetDuration {
    fn description(&self) -> &str {
        "Change duration"
    }

    fn undo(&self, sequence: &mut Sequence) -> ChoreoResult<()> {
        sequence.set_duration(self.keyframe, self.before)?;
        Ok(())
    }

    fn redo(&self, sequence: &mut Sequence) -> ChoreoResult<()> {
        sequence.set_duration(self.keyframe, self.after)?;
        Ok(())
    }
}

/// A keyframe that was added to or removed from the sequence
#[derive(Debug, Clone, PartialEq)]
pub struct KeyframeChange {
    pub at: usize,
    pub keyframe: Keyframe,
    /// True for an insertion, false for a removal
    pub inserted: bool,
}

impl KeyframeChange {
    fn insert(&self, sequence: &mut Sequence) -> ChoreoResult<()> {
        sequence.insert_keyframe(self.at, self.keyframe.clone())
    }

    fn remove(&self, sequence: &mut Sequence) -> ChoreoResult<()> {
        sequence.remove_keyframe(self.at).map(|_| ())
    }
}

impl Command<Sequence> for KeyframeChange {
    fn description(&self) -> &str {
        if self.inserted {
            "Insert keyframe"
        } else {
            "Delete keyframe"
        }
    }

    fn undo(&self, sequence: &mut Sequence) -> ChoreoResult<()> {
        if self.inserted {
            self.remove(sequence)
        } else {
            self.insert(sequence)
        }
    }

    fn redo(&self, sequence: &mut Sequence) -> ChoreoResult<()> {
        if self.inserted {
            self.insert(sequence)
        } else {
            self.remove(sequence)
        }
    }
}

/// An entity that was added to or removed from one keyframe
#[derive(Debug, Clone, PartialEq)]
pub struct EntityChange {
    pub keyframe: usize,
    /// Position in the keyframe's entity list
    pub slot: usize,
    pub entity: Entity,
    /// True for an addition, false for a removal
    pub added: bool,
}

impl EntityChange {
    fn restore(&self, sequence: &mut Sequence) -> ChoreoResult<()> {
        sequence.restore_entity(self.keyframe, self.slot, self.entity.clone())
    }

    fn remove(&self, sequence: &mut Sequence) -> ChoreoResult<()> {
        sequence
            .remove_entity(self.keyframe, self.entity.id)
            .map(|_| ())
    }
}

impl Command<Sequence> for EntityChange {
    fn description(&self) -> &str {
        if self.added {
            "Add entity"
        } else {
            "Delete entity"
        }
    }

    fn undo(&self, sequence: &mut Sequence) -> ChoreoResult<()> {
        if self.added {
            self.remove(sequence)
        } else {
            self.restore(sequence)
        }
    }

    fn redo(&self, sequence: &mut Sequence) -> ChoreoResult<()> {
        if self.added {
            self.restore(sequence)
        } else {
            self.remove(sequence)
        }
    }
}
