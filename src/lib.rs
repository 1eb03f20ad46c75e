//! Choreography editing core
//!
//! Keyframed drills of labelled entities: heading-aware curved playback,
//! formation tools and an undo history for an editor to drive.

pub mod core;
pub mod data;
pub mod editing;
pub mod geometry;
pub mod io;
pub mod timeline;
pub mod utils;


pub use crate::core::{ChoreoSettings, DrillState};
pub use crate::data::{Entity, EntityId, Keyframe, Sequence};
pub use crate::timeline::{EntityPose, Interpolator};
