//! Managing undo state

use std::collections::VecDeque;
use std::fmt;

use anyhow::Context;
use log::debug;

use crate::core::errors::ChoreoResult;
use crate::core::settings::HISTORY_CAPACITY;

/// A reversible change to some state `S`.
pub trait Command<S>: fmt::Debug {
    /// Short text for the undo/redo menu entries
    fn description(&self) -> &str;
    /// Revert the change.
    fn undo(&self, state: &mut S) -> ChoreoResult<()>;
    /// Apply the change again after it was undone.
    fn redo(&self, state: &mut S) -> ChoreoResult<()>;
}

/// A bounded list of commands with a cursor.
///
/// The first `applied` commands are in effect; the rest have been undone
/// and can be redone until something new is pushed.
#[derive(Debug)]
pub struct History<S> {
    /// Maximum number of commands to keep.
    max_undo_count: usize,
    commands: VecDeque<Box<dyn Command<S>>>,
    /// How many commands, counted from the front, are applied.
    applied: usize,
}

impl<S> Default for History<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> History<S> {
    /// Create a new history with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    /// Create a new history with a specific capacity (at least one).
    pub fn with_capacity(max_undo_count: usize) -> Self {
        Self {
            max_undo_count: max_undo_count.max(1),
            commands: VecDeque::new(),
            applied: 0,
        }
    }

    /// Record a command that has already been applied.
    pub fn push(&mut self, command: Box<dyn Command<S>>) {
        // If we have undone commands and then edit, the redo branch is gone
        self.commands.truncate(self.applied);

        self.commands.push_back(command);
        self.applied += 1;

        // If we exceed the max number of commands, remove the oldest one
        if self.commands.len() > self.max_undo_count {
            if let Some(evicted) = self.commands.pop_front() {
                debug!(
                    "Undo history full, dropping '{}'",
                    evicted.description()
                );
            }
            self.applied -= 1;
        }
    }

    /// Undo the command under the cursor. Returns false if there was none.
    pub fn undo(&mut self, state: &mut S) -> ChoreoResult<bool> {
        if self.applied == 0 {
            return Ok(false);
        }
        let command = &self.commands[self.applied - 1];
        command.undo(state).with_context(|| {
            format!("Failed to undo '{}'", command.description())
        })?;
        self.applied -= 1;
        Ok(true)
    }

    /// Redo the next undone command. Returns false if there was none.
    pub fn redo(&mut self, state: &mut S) -> ChoreoResult<bool> {
        if self.applied == self.commands.len() {
            return Ok(false);
        }
        let command = &self.commands[self.applied];
        command.redo(state).with_context(|| {
            format!("Failed to redo '{}'", command.description())
        })?;
        self.applied += 1;
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        self.applied > 0
    }

    pub fn can_redo(&self) -> bool {
        self.applied < self.commands.len()
    }

    /// Drop every command.
    pub fn clear(&mut self) {
        self.commands.clear();
        self.applied = 0;
    }

    /// Index of the last applied command, `None` when nothing is applied.
    pub fn current_index(&self) -> Option<usize> {
        self.applied.checked_sub(1)
    }

    /// Description of the command `undo` would revert.
    pub fn undo_description(&self) -> Option<&str> {
        let index = self.current_index()?;
        self.commands.get(index).map(|c| c.description())
    }

    /// Description of the command `redo` would re-apply.
    pub fn redo_description(&self) -> Option<&str> {
        self.commands.get(self.applied).map(|c| c.description())
    }

    /// Get the number of commands in the history.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if the history is empty.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_undo_count
    }
}
