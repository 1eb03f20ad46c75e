//!    Error handling
//!
//! This module provides error handling using anyhow.
//! The interpolation and geometry engines never fail; only the keyframe
//! store, settings and file loading report errors, and those all surface
//! to the host as plain messages.

#[allow(unused_imports)]
pub use anyhow::{anyhow, bail, ensure, Error};
use anyhow::{Context, Result};

/// Result type alias for convenience throughout the crate
pub type ChoreoResult<T> = Result<T>;

/// Helper functions for creating common error contexts
pub trait ChoreoContext<T> {
    /// Add file operation context to an error
    fn with_file_context<P: AsRef<std::path::Path>>(
        self,
        operation: &str,
        path: P,
    ) -> ChoreoResult<T>;

    /// Add keyframe operation context to an error
    fn with_keyframe_context(
        self,
        operation: &str,
        keyframe: usize,
    ) -> ChoreoResult<T>;
}

impl<T, E> ChoreoContext<T> for Result<T, E>
where
    E: Into<Error>,
{
    fn with_file_context<P: AsRef<std::path::Path>>(
        self,
        operation: &str,
        path: P,
    ) -> ChoreoResult<T> {
        self.map_err(Into::<Error>::into).with_context(|| {
            format!("Failed to {} file: {}", operation, path.as_ref().display())
        })
    }

    fn with_keyframe_context(
        self,
        operation: &str,
        keyframe: usize,
    ) -> ChoreoResult<T> {
        self.map_err(Into::<Error>::into).with_context(|| {
            format!("Failed to {operation} keyframe {keyframe}")
        })
    }
}

/// Helper macros for common error patterns
#[macro_export]
macro_rules! keyframe_out_of_bounds {
    ($index:expr, $len:expr) => {
        anyhow::anyhow!(
            "Keyframe index {} out of bounds (sequence has {} keyframes)",
            $index,
            $len
        )
    };
}

#[macro_export]
macro_rules! entity_not_found {
    ($id:expr, $keyframe:expr) => {
        anyhow::anyhow!(
            "Entity {} not found in keyframe {}",
            $id,
            $keyframe
        )
    };
}

/// Validation helpers that return anyhow errors
pub fn validate_finite_coords(x: f64, y: f64) -> ChoreoResult<()> {
    ensure!(x.is_finite(), "X coordinate must be finite, got: {}", x);
    ensure!(y.is_finite(), "Y coordinate must be finite, got: {}", y);
    Ok(())
}

pub fn validate_duration(duration: f64) -> ChoreoResult<()> {
    ensure!(
        duration.is_finite() && duration > 0.0,
        "Keyframe duration must be a positive number of seconds, got: {}",
        duration
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_finite_coords() {
        assert!(validate_finite_coords(1.0, 2.0).is_ok());
        assert!(validate_finite_coords(f64::NAN, 2.0).is_err());
        assert!(validate_finite_coords(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn rejects_bad_durations() {
        assert!(validate_duration(0.5).is_ok());
        assert!(validate_duration(0.0).is_err());
        assert!(validate_duration(-1.0).is_err());
        assert!(validate_duration(f64::NAN).is_err());
    }

    #[test]
    fn keyframe_context_mentions_index() {
        let failed: Result<(), std::io::Error> =
            Err(std::io::Error::other("boom"));
        let err = failed.with_keyframe_context("remove", 3).unwrap_err();
        assert_eq!(err.to_string(), "Failed to remove keyframe 3");
    }

    #[test]
    fn context_wraps_anyhow_errors_too() {
        let failed: ChoreoResult<()> = Err(anyhow!("inner"));
        let err = failed.with_keyframe_context("edit", 1).unwrap_err();
        assert_eq!(format!("{err:#}"), "Failed to edit keyframe 1: inner");
    }
}
