//! Types of state modifications, for the purposes of undo.

use serde::{Deserialize, Serialize};

/// Types of state modifications, for the purposes of undo.
///
/// While a gesture is in progress every pointer move changes the drill, but
/// none of those intermediate frames belong in the undo history. Only the
/// edit that finishes the gesture is recorded.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
pub enum EditType {
    /// Any change that always gets its own undo entry
    #[default]
    Normal,
    /// An edit where a drag of some kind is in progress
    Drag,
    /// An edit that finishes a drag
    DragEnd,
}

impl EditType {
    /// Transient edits are applied but never recorded.
    pub fn is_transient(self) -> bool {
        matches!(self, EditType::Drag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_drag_frames_are_transient() {
        assert!(EditType::Drag.is_transient());
        assert!(!EditType::DragEnd.is_transient());
        assert!(!EditType::Normal.is_transient());
        assert_eq!(EditType::default(), EditType::Normal);
    }
}
