//! Geometric Primitives and Operations

pub mod angle;
pub mod arc_length;
pub mod path;
pub mod point;

// Re-export commonly used items
pub use arc_length::{PathSample, SampledPath};
pub use path::PathBuilder;
pub use point::{PivotMode, Pose};
