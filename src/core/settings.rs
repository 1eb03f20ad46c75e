// Settings ///////////////////////////////////////////////////////////////////
// This module contains all the tunable settings for playback and editing.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::errors::{ChoreoContext, ChoreoResult};

// Path Settings //////////////////////////////////////////////////////////////

/// Control offset as a fraction of the straight-line distance
pub const CURVE_STRENGTH_RATIO: f64 = 0.4;
/// Largest control offset before the turn boost, in meters
pub const CURVE_STRENGTH_CAP: f64 = 20.0;
/// Extra control offset for a half turn (0.5 means 1.5x the base)
pub const CURVE_TURN_BOOST: f64 = 0.5;
/// Number of polyline segments a transition curve is sampled into
pub const PATH_SAMPLES: usize = 32;

// Heading Settings ///////////////////////////////////////////////////////////

/// Below this displacement (meters) headings are interpolated by angle
/// instead of following the curve tangent
pub const TANGENT_MIN_DISTANCE: f64 = 4.0;

// History Settings ///////////////////////////////////////////////////////////

/// Default size of the undo history
pub const HISTORY_CAPACITY: usize = 128;

// Timing Settings ////////////////////////////////////////////////////////////

/// Duration given to new keyframes, in seconds
pub const DEFAULT_KEYFRAME_DURATION: f64 = 4.0;
/// Shortest duration the auto-duration helper will suggest
pub const MIN_AUTO_DURATION: f64 = 1.0;
/// Suggested durations are rounded up to a multiple of this
pub const AUTO_DURATION_STEP: f64 = 0.5;

/// All settings, loadable from a JSON file
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChoreoSettings {
    pub path: PathSettings,
    pub heading: HeadingSettings,
    pub history: HistorySettings,
    pub timing: TimingSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    pub strength_ratio: f64,
    pub strength_cap: f64,
    pub turn_boost: f64,
    pub samples: usize,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            strength_ratio: CURVE_STRENGTH_RATIO,
            strength_cap: CURVE_STRENGTH_CAP,
            turn_boost: CURVE_TURN_BOOST,
            samples: PATH_SAMPLES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadingSettings {
    pub tangent_min_distance: f64,
}

impl Default for HeadingSettings {
    fn default() -> Self {
        Self {
            tangent_min_distance: TANGENT_MIN_DISTANCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    pub capacity: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            capacity: HISTORY_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingSettings {
    pub default_duration: f64,
    pub min_auto_duration: f64,
    pub duration_step: f64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            default_duration: DEFAULT_KEYFRAME_DURATION,
            min_auto_duration: MIN_AUTO_DURATION,
            duration_step: AUTO_DURATION_STEP,
        }
    }
}

impl ChoreoSettings {
    /// Load settings from a JSON file; missing fields keep their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> ChoreoResult<Self> {
        let path = path.as_ref();
        let text =
            std::fs::read_to_string(path).with_file_context("read", path)?;
        let settings: ChoreoSettings =
            serde_json::from_str(&text).with_file_context("parse", path)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> ChoreoResult<()> {
        anyhow::ensure!(
            self.path.strength_ratio.is_finite()
                && self.path.strength_ratio >= 0.0,
            "path.strength_ratio must be a non-negative number, got {}",
            self.path.strength_ratio
        );
        anyhow::ensure!(
            self.path.strength_cap.is_finite() && self.path.strength_cap >= 0.0,
            "path.strength_cap must be a non-negative number, got {}",
            self.path.strength_cap
        );
        anyhow::ensure!(
            self.path.turn_boost.is_finite() && self.path.turn_boost >= 0.0,
            "path.turn_boost must be a non-negative number, got {}",
            self.path.turn_boost
        );
        anyhow::ensure!(self.path.samples > 0, "path.samples must be positive");
        anyhow::ensure!(
            self.heading.tangent_min_distance.is_finite(),
            "heading.tangent_min_distance must be finite"
        );
        anyhow::ensure!(
            self.history.capacity > 0,
            "history.capacity must be positive"
        );
        let timing = &self.timing;
        for (name, value) in [
            ("default_duration", timing.default_duration),
            ("min_auto_duration", timing.min_auto_duration),
            ("duration_step", timing.duration_step),
        ] {
            anyhow::ensure!(
                value.is_finite() && value > 0.0,
                "timing.{} must be a positive number, got {}",
                name,
                value
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = ChoreoSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.path.samples, PATH_SAMPLES);
        assert_eq!(settings.history.capacity, HISTORY_CAPACITY);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let settings: ChoreoSettings =
            serde_json::from_str(r#"{ "path": { "strength_cap": 8.0 } }"#)
                .unwrap();
        assert_eq!(settings.path.strength_cap, 8.0);
        assert_eq!(settings.path.strength_ratio, CURVE_STRENGTH_RATIO);
        assert_eq!(settings.heading, HeadingSettings::default());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let mut settings = ChoreoSettings::default();
        settings.history.capacity = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn non_finite_timing_is_rejected() {
        let mut settings = ChoreoSettings::default();
        settings.timing.duration_step = f64::INFINITY;
        let err = settings.validate().unwrap_err();
        assert!(format!("{err}").contains("duration_step"));

        let mut settings = ChoreoSettings::default();
        settings.timing.default_duration = f64::NAN;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = ChoreoSettings::load("does/not/exist.json").unwrap_err();
        assert!(format!("{err}").contains("does/not/exist.json"));
    }
}
