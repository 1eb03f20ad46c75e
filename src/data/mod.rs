//! Drill data: entities, keyframes and the keyframe store
//!
//! This module holds the authoritative state of a drill:
//! - Entities with their stable labels and per-keyframe ids
//! - Keyframes with their derived timestamps
//! - The `Sequence` store that every mutation goes through

pub mod entity;
pub mod sequence;

pub use entity::{Entity, EntityId, EntityUpdate, Label, SpeedClass};
pub use sequence::{Keyframe, Sequence, SequenceInfo};
