//! Playback: from discrete keyframes to continuous motion
//!
//! - [`locate`] maps a time onto a keyframe and a phase
//! - [`heading`] picks the displayed heading along a move
//! - [`playback`] resolves every entity's pose at a time
//! - [`duration`] suggests keyframe durations from entity gaits

pub mod duration;
pub mod heading;
pub mod locate;
pub mod playback;

pub use duration::suggest_duration;
pub use heading::HeadingResolver;
pub use locate::{locate, Playhead, TimelinePosition};
pub use playback::{EntityPose, Interpolator, TransitionPath};
