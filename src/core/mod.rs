//! Core application functionality
//!
//! This module contains the core editor logic, including:
//! - Editor state and the single mutation path
//! - Settings and CLI handling
//! - Error handling

pub mod cli;
pub mod errors;
pub mod settings;
pub mod state;

// Re-export commonly used items
pub use cli::CliArgs;
pub use errors::ChoreoResult;
pub use settings::ChoreoSettings;
pub use state::DrillState;
