pub mod commands;
pub mod edit_session;
pub mod edit_type;
pub mod formation;
pub mod mutation;
pub mod undo;

// Re-export the types hosts work with
pub use commands::{
    EditPoses, EntityChange, KeyframeChange, PoseChange, SetDuration,
};
pub use edit_session::{GestureSession, GestureTransform};
pub use edit_type::EditType;
pub use formation::{AlignAxis, CircleHeading, FormationOp};
pub use mutation::{Mutation, PoseEdit};
pub use undo::{Command, History};
