//! Editor state management.
//!
//! `DrillState` owns the sequence and its undo history. Every change to
//! entity state goes through it, so the history sees exactly one command
//! per durable edit and none for drag frames.

use log::{debug, warn};

use super::errors::{bail, ChoreoContext, ChoreoResult};
use super::settings::ChoreoSettings;
use crate::data::{Entity, EntityId, Label, Sequence, SpeedClass};
use crate::editing::{
    EditPoses, EditType, EntityChange, FormationOp, GestureSession,
    GestureTransform, History, KeyframeChange, Mutation, PoseChange, PoseEdit,
    SetDuration,
};
use crate::geometry::{PivotMode, Pose};
use crate::timeline::{
    suggest_duration, EntityPose, Interpolator, TransitionPath,
};
use crate::{entity_not_found, keyframe_out_of_bounds};

/// The drill being edited plus everything needed to undo changes to it
#[derive(Debug)]
pub struct DrillState {
    sequence: Sequence,
    history: History<Sequence>,
    settings: ChoreoSettings,
    interpolator: Interpolator,
    /// Present between `begin_gesture` and `end_gesture`
    gesture: Option<GestureSession>,
}

impl DrillState {
    pub fn new(sequence: Sequence, settings: ChoreoSettings) -> Self {
        Self {
            sequence,
            history: History::with_capacity(settings.history.capacity),
            interpolator: Interpolator::from_settings(&settings),
            settings,
            gesture: None,
        }
    }

    /// Start a fresh drill whose first keyframe lasts the configured
    /// default duration.
    pub fn create(
        title: impl Into<String>,
        entities: Vec<Entity>,
        settings: ChoreoSettings,
    ) -> ChoreoResult<Self> {
        let sequence =
            Sequence::new(title, entities, settings.timing.default_duration)?;
        Ok(Self::new(sequence, settings))
    }

    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    pub fn settings(&self) -> &ChoreoSettings {
        &self.settings
    }

    pub fn interpolator(&self) -> &Interpolator {
        &self.interpolator
    }

    pub fn history(&self) -> &History<Sequence> {
        &self.history
    }

    /// Hand the sequence back, e.g. for saving.
    pub fn into_sequence(self) -> Sequence {
        self.sequence
    }

    /// Apply a batch of pose edits.
    ///
    /// Transient mutations only change the sequence. Durable ones are also
    /// recorded as a single undo step, unless nothing actually moved. If
    /// any edit fails the whole batch is rolled back.
    ///
    /// A durable mutation cancels a running gesture first, so the recorded
    /// before poses never include an uncommitted drag frame.
    pub fn apply(&mut self, mutation: Mutation) -> ChoreoResult<()> {
        if !mutation.is_transient() {
            self.cancel_gesture()?;
        }
        let mut changes = Vec::with_capacity(mutation.edits.len());
        for edit in &mutation.edits {
            match self.apply_edit(mutation.keyframe, edit) {
                Ok(change) => changes.push(change),
                Err(err) => {
                    self.roll_back(&changes);
                    return Err::<(), _>(err)
                        .with_keyframe_context("edit", mutation.keyframe);
                }
            }
        }

        if mutation.is_transient() {
            return Ok(());
        }
        changes.retain(|c| c.before != c.after);
        if changes.is_empty() {
            return Ok(());
        }
        debug!(
            "Recording '{}' for {} entities",
            mutation.description,
            changes.len()
        );
        self.history.push(Box::new(EditPoses {
            description: mutation.description,
            changes,
        }));
        Ok(())
    }

    fn apply_edit(
        &mut self,
        keyframe: usize,
        edit: &PoseEdit,
    ) -> ChoreoResult<PoseChange> {
        let entity_id = edit.entity_id();
        let before = self.sequence.pose(keyframe, entity_id)?;
        match edit {
            PoseEdit::Offset(update) => {
                self.sequence.offset(keyframe, update)?;
            }
            PoseEdit::Place { pose, .. } => {
                self.sequence.place(keyframe, entity_id, *pose)?;
            }
        }
        // read back the stored pose so undo restores bit-identical values
        let after = self.sequence.pose(keyframe, entity_id)?;
        Ok(PoseChange {
            keyframe,
            entity_id,
            before,
            after,
        })
    }

    fn roll_back(&mut self, changes: &[PoseChange]) {
        for change in changes.iter().rev() {
            if let Err(err) =
                self.sequence
                    .place(change.keyframe, change.entity_id, change.before)
            {
                warn!("Could not roll back {}: {err:#}", change.entity_id);
            }
        }
    }

    /// The gesture in progress, if any.
    pub fn gesture(&self) -> Option<&GestureSession> {
        self.gesture.as_ref()
    }

    /// Capture pivot and baseline for a continuous transform.
    ///
    /// Returns false when none of the selected ids exist in the keyframe.
    /// A gesture that is still running is cancelled first.
    pub fn begin_gesture(
        &mut self,
        keyframe: usize,
        selection: &[EntityId],
        mode: PivotMode,
    ) -> ChoreoResult<bool> {
        self.cancel_gesture()?;
        let len = self.sequence.len();
        let frame = self
            .sequence
            .keyframe(keyframe)
            .ok_or_else(|| keyframe_out_of_bounds!(keyframe, len))?;
        self.gesture = GestureSession::begin(frame, selection, mode);
        Ok(self.gesture.is_some())
    }

    /// Show one drag frame. Never recorded.
    pub fn update_gesture(
        &mut self,
        transform: GestureTransform,
    ) -> ChoreoResult<()> {
        let Some(session) = &self.gesture else {
            warn!("Ignoring gesture update with no gesture in progress");
            return Ok(());
        };
        let mutation = Mutation::transient(
            session.keyframe,
            places(session.target(transform)),
        );
        self.apply(mutation)
    }

    /// Finish the gesture with its final transform.
    ///
    /// Entities are first put back on their baseline, then the final
    /// transform is applied as one durable edit, so undo returns to the
    /// layout from before the gesture started.
    pub fn end_gesture(
        &mut self,
        transform: GestureTransform,
    ) -> ChoreoResult<()> {
        let Some(session) = self.gesture.take() else {
            warn!("Ignoring gesture end with no gesture in progress");
            return Ok(());
        };
        self.apply(Mutation::transient(
            session.keyframe,
            places(session.baseline.clone()),
        ))?;
        debug!(
            "Committing {} of {} entities",
            transform.description(),
            session.baseline.len()
        );
        let commit = Mutation::durable(
            session.keyframe,
            transform.description(),
            places(session.target(transform)),
        )
        .with_edit_type(EditType::DragEnd);
        self.apply(commit)
    }

    /// Abandon the gesture and restore the baseline.
    pub fn cancel_gesture(&mut self) -> ChoreoResult<()> {
        match self.gesture.take() {
            Some(session) => {
                debug!("Cancelling gesture in keyframe {}", session.keyframe);
                self.apply(Mutation::transient(
                    session.keyframe,
                    places(session.baseline),
                ))
            }
            None => Ok(()),
        }
    }

    /// Run a formation operation on a selection as one undoable edit.
    pub fn apply_formation(
        &mut self,
        keyframe: usize,
        op: FormationOp,
        selection: &[EntityId],
    ) -> ChoreoResult<()> {
        self.cancel_gesture()?;
        let len = self.sequence.len();
        let frame = self
            .sequence
            .keyframe(keyframe)
            .ok_or_else(|| keyframe_out_of_bounds!(keyframe, len))?;
        let updates = op.updates(&frame.entities, selection);
        let description = op.description();
        self.apply(Mutation::from_updates(keyframe, description, &updates))
    }

    pub fn set_duration(
        &mut self,
        keyframe: usize,
        duration: f64,
    ) -> ChoreoResult<()> {
        self.cancel_gesture()?;
        let before = self.sequence.set_duration(keyframe, duration)?;
        if before != duration {
            self.history.push(Box::new(SetDuration {
                keyframe,
                before,
                after: duration,
            }));
        }
        Ok(())
    }

    /// Set a keyframe's duration from the gaits of its entities.
    ///
    /// Returns the chosen duration. The last keyframe has nothing to move
    /// towards and is rejected.
    pub fn auto_duration(&mut self, keyframe: usize) -> ChoreoResult<f64> {
        let keyframes = self.sequence.keyframes();
        let (Some(from), Some(to)) =
            (keyframes.get(keyframe), keyframes.get(keyframe + 1))
        else {
            bail!("Keyframe {} has no following keyframe", keyframe);
        };
        let duration = suggest_duration(
            &self.interpolator,
            &self.settings.timing,
            from,
            to,
        );
        self.set_duration(keyframe, duration)?;
        Ok(duration)
    }

    /// Duplicate keyframe `after` right behind it. Returns the new index.
    pub fn insert_keyframe(&mut self, after: usize) -> ChoreoResult<usize> {
        self.cancel_gesture()?;
        let at = self.sequence.insert_copy(after)?;
        let keyframe = self.sequence.keyframes()[at].clone();
        self.history.push(Box::new(KeyframeChange {
            at,
            keyframe,
            inserted: true,
        }));
        Ok(at)
    }

    pub fn remove_keyframe(&mut self, index: usize) -> ChoreoResult<()> {
        self.cancel_gesture()?;
        let keyframe = self.sequence.remove_keyframe(index)?;
        self.history.push(Box::new(KeyframeChange {
            at: index,
            keyframe,
            inserted: false,
        }));
        Ok(())
    }

    /// Add an entity to one keyframe as an undoable edit.
    pub fn add_entity(
        &mut self,
        keyframe: usize,
        label: impl Into<Label>,
        pose: Pose,
        speed_class: SpeedClass,
    ) -> ChoreoResult<EntityId> {
        self.cancel_gesture()?;
        let id = self
            .sequence
            .add_entity(keyframe, label, pose, speed_class)?;
        let entities = self
            .sequence
            .keyframe(keyframe)
            .map(|k| k.entities.as_slice())
            .unwrap_or_default();
        let Some(slot) = entities.iter().position(|e| e.id == id) else {
            return Err(entity_not_found!(id, keyframe));
        };
        self.history.push(Box::new(EntityChange {
            keyframe,
            slot,
            entity: entities[slot].clone(),
            added: true,
        }));
        Ok(id)
    }

    /// Remove an entity from one keyframe as an undoable edit.
    pub fn remove_entity(
        &mut self,
        keyframe: usize,
        id: EntityId,
    ) -> ChoreoResult<()> {
        self.cancel_gesture()?;
        let slot = self
            .sequence
            .keyframe(keyframe)
            .and_then(|k| k.entities.iter().position(|e| e.id == id));
        let entity = self.sequence.remove_entity(keyframe, id)?;
        self.history.push(Box::new(EntityChange {
            keyframe,
            slot: slot.unwrap_or_default(),
            entity,
            added: false,
        }));
        Ok(())
    }

    /// Returns false when there was nothing to undo.
    pub fn undo(&mut self) -> ChoreoResult<bool> {
        self.cancel_gesture()?;
        self.history.undo(&mut self.sequence)
    }

    /// Returns false when there was nothing to redo.
    pub fn redo(&mut self) -> ChoreoResult<bool> {
        self.cancel_gesture()?;
        self.history.redo(&mut self.sequence)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.history.undo_description()
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.history.redo_description()
    }

    pub fn poses_at(&self, time: f64) -> Vec<EntityPose> {
        self.interpolator.poses_at(self.sequence.keyframes(), time)
    }

    pub fn transition_paths(&self, index: usize) -> Vec<TransitionPath> {
        self.interpolator
            .transition_paths(self.sequence.keyframes(), index)
    }
}

fn places(poses: Vec<(EntityId, Pose)>) -> Vec<PoseEdit> {
    poses
        .into_iter()
        .map(|(entity_id, pose)| PoseEdit::Place { entity_id, pose })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Point, Vec2};

    fn state() -> DrillState {
        let sequence = Sequence::new(
            "state",
            vec![
                Entity::new(EntityId(0), "A", (0.0, 0.0), 0.0),
                Entity::new(EntityId(0), "B", (4.0, 0.0), 0.0),
            ],
            4.0,
        )
        .unwrap();
        DrillState::new(sequence, ChoreoSettings::default())
    }

    fn ids(state: &DrillState) -> Vec<EntityId> {
        state.sequence().keyframes()[0]
            .entities
            .iter()
            .map(|e| e.id)
            .collect()
    }

    #[test]
    fn create_uses_default_duration() {
        let mut settings = ChoreoSettings::default();
        settings.timing.default_duration = 2.5;
        let state = DrillState::create("new", Vec::new(), settings).unwrap();
        assert_eq!(state.sequence().total_duration(), 2.5);
        assert!(!state.can_undo());
    }

    #[test]
    fn transient_mutations_are_not_recorded() {
        let mut state = state();
        let id = ids(&state)[0];
        state
            .apply(Mutation::transient(
                0,
                vec![PoseEdit::translate(id, Vec2::new(1.0, 0.0))],
            ))
            .unwrap();
        assert!(!state.can_undo());
        assert_eq!(
            state.sequence().pose(0, id).unwrap().position,
            Point::new(1.0, 0.0)
        );
    }

    #[test]
    fn durable_mutation_is_one_command() {
        let mut state = state();
        let all = ids(&state);
        let edits = all
            .iter()
            .map(|&id| PoseEdit::translate(id, Vec2::new(0.0, 2.0)))
            .collect();
        state.apply(Mutation::durable(0, "Nudge", edits)).unwrap();
        assert_eq!(state.history().len(), 1);
        assert_eq!(state.undo_description(), Some("Nudge"));
        assert!(state.undo().unwrap());
        assert_eq!(
            state.sequence().pose(0, all[1]).unwrap().position,
            Point::new(4.0, 0.0)
        );
    }

    #[test]
    fn failed_batch_rolls_back() {
        let mut state = state();
        let id = ids(&state)[0];
        let edits = vec![
            PoseEdit::translate(id, Vec2::new(3.0, 3.0)),
            PoseEdit::translate(EntityId(42), Vec2::new(1.0, 1.0)),
        ];
        assert!(state.apply(Mutation::durable(0, "Bad", edits)).is_err());
        let position = state.sequence().pose(0, id).unwrap().position;
        assert_eq!(position, Point::ZERO);
        assert!(!state.can_undo());
    }

    #[test]
    fn drag_records_a_single_command() {
        let mut state = state();
        let all = ids(&state);
        assert!(state.begin_gesture(0, &all, PivotMode::Centroid).unwrap());
        for step in 1..=20 {
            let offset = Vec2::new(step as f64 * 0.1, 0.0);
            state
                .update_gesture(GestureTransform::Translate(offset))
                .unwrap();
        }
        assert!(!state.can_undo());
        state
            .end_gesture(GestureTransform::Translate(Vec2::new(2.0, 0.0)))
            .unwrap();
        assert!(state.gesture().is_none());
        assert_eq!(state.history().len(), 1);
        assert_eq!(state.undo_description(), Some("Move"));

        state.undo().unwrap();
        assert_eq!(
            state.sequence().pose(0, all[0]).unwrap().position,
            Point::ZERO
        );
    }

    #[test]
    fn identity_gesture_leaves_no_history() {
        let mut state = state();
        let all = ids(&state);
        state.begin_gesture(0, &all, PivotMode::Centroid).unwrap();
        state.update_gesture(GestureTransform::Rotate(1.0)).unwrap();
        state.end_gesture(GestureTransform::Rotate(0.0)).unwrap();
        assert!(!state.can_undo());
    }

    #[test]
    fn keyframe_edits_are_undoable() {
        let mut state = state();
        let at = state.insert_keyframe(0).unwrap();
        state.set_duration(at, 2.0).unwrap();
        assert_eq!(state.sequence().total_duration(), 6.0);

        state.undo().unwrap();
        assert_eq!(state.sequence().total_duration(), 8.0);
        state.undo().unwrap();
        assert_eq!(state.sequence().len(), 1);
        state.redo().unwrap();
        assert_eq!(state.sequence().len(), 2);

        state.remove_keyframe(0).unwrap();
        assert_eq!(state.undo_description(), Some("Delete keyframe"));
        state.undo().unwrap();
        assert_eq!(state.sequence().len(), 2);
    }

    #[test]
    fn auto_duration_uses_next_keyframe() {
        let mut state = state();
        assert!(state.auto_duration(0).is_err());
        let at = state.insert_keyframe(0).unwrap();
        let id = state.sequence().keyframes()[at].entities[0].id;
        state
            .apply(Mutation::durable(
                at,
                "Move",
                vec![PoseEdit::translate(id, Vec2::new(5.5, 0.0))],
            ))
            .unwrap();
        assert_eq!(state.auto_duration(0).unwrap(), 4.0);
    }

    #[test]
    fn undo_cancels_running_gesture() {
        let mut state = state();
        let all = ids(&state);
        state
            .apply(Mutation::durable(
                0,
                "Nudge",
                vec![PoseEdit::translate(all[0], Vec2::new(1.0, 0.0))],
            ))
            .unwrap();
        state.begin_gesture(0, &all, PivotMode::Centroid).unwrap();
        state.update_gesture(GestureTransform::Scale(2.0)).unwrap();
        state.undo().unwrap();
        assert!(state.gesture().is_none());
        assert_eq!(
            state.sequence().pose(0, all[1]).unwrap().position,
            Point::new(4.0, 0.0)
        );
        assert_eq!(
            state.sequence().pose(0, all[0]).unwrap().position,
            Point::ZERO
        );
    }

    #[test]
    fn durable_edit_during_gesture_keeps_history_exact() {
        let mut state = state();
        let all = ids(&state);
        state.begin_gesture(0, &all, PivotMode::Centroid).unwrap();
        let drag = GestureTransform::Translate(Vec2::new(5.0, 0.0));
        state.update_gesture(drag).unwrap();
        state
            .apply(Mutation::durable(
                0,
                "Nudge",
                vec![PoseEdit::translate(all[0], Vec2::new(1.0, 0.0))],
            ))
            .unwrap();
        assert!(state.gesture().is_none());
        assert_eq!(
            state.sequence().pose(0, all[0]).unwrap().position,
            Point::new(1.0, 0.0)
        );
        // nothing left to end
        state.end_gesture(drag).unwrap();
        assert_eq!(state.history().len(), 1);

        while state.undo().unwrap() {}
        assert_eq!(
            state.sequence().pose(0, all[0]).unwrap().position,
            Point::ZERO
        );
        assert_eq!(
            state.sequence().pose(0, all[1]).unwrap().position,
            Point::new(4.0, 0.0)
        );
    }

    #[test]
    fn entity_edits_are_undoable() {
        let mut state = state();
        let first = state.sequence().keyframes()[0].entities[0].clone();
        let id = state
            .add_entity(0, "C", Pose::new((2.0, 2.0), 0.0), SpeedClass::Walk)
            .unwrap();
        assert_eq!(state.undo_description(), Some("Add entity"));
        assert!(state
            .add_entity(0, "C", Pose::default(), SpeedClass::Walk)
            .is_err());
        assert_eq!(state.history().len(), 1);

        state.remove_entity(0, first.id).unwrap();
        assert_eq!(state.sequence().keyframes()[0].entities.len(), 2);

        state.undo().unwrap();
        assert_eq!(state.sequence().keyframes()[0].entities[0], first);
        state.undo().unwrap();
        assert!(state.sequence().pose(0, id).is_err());
        state.redo().unwrap();
        assert_eq!(
            state.sequence().pose(0, id).unwrap().position,
            Point::new(2.0, 2.0)
        );
        assert!(state.remove_entity(0, EntityId(77)).is_err());
        assert_eq!(state.redo_description(), Some("Delete entity"));
    }
}
