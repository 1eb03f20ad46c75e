//! Utilities and Helper Functions
//!
//! - Logging configuration and setup

pub mod logger;
