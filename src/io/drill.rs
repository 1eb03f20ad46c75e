//! Reading and writing drill files
//!
//! A drill file is the JSON form of a `Sequence`.

use std::path::Path;

use log::info;

use crate::core::errors::{ChoreoContext, ChoreoResult};
use crate::data::Sequence;

pub fn load_drill<P: AsRef<Path>>(path: P) -> ChoreoResult<Sequence> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).with_file_context("read", path)?;
    let sequence = parse_drill(&text).with_file_context("load", path)?;
    info!(
        "Loaded '{}' with {} keyframes from {}",
        sequence.info.title,
        sequence.len(),
        path.display()
    );
    Ok(sequence)
}

/// Parse a drill and rebuild the fields that are not stored.
pub fn parse_drill(text: &str) -> ChoreoResult<Sequence> {
    let mut sequence: Sequence = serde_json::from_str(text)?;
    sequence.normalize()?;
    Ok(sequence)
}

pub fn save_drill<P: AsRef<Path>>(
    sequence: &Sequence,
    path: P,
) -> ChoreoResult<()> {
    let path = path.as_ref();
    let text = serde_json::to_string_pretty(sequence)?;
    std::fs::write(path, text).with_file_context("write", path)?;
    info!("Saved '{}' to {}", sequence.info.title, path.display());
    Ok(())
}
