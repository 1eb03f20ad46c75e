//! Input/Output Operations
//!
//! Drill files are plain serde JSON of the keyframe store.

pub mod drill;

pub use drill::{load_drill, parse_drill, save_drill};
