//! Overlay import and export files.
//!
//! The interchange format is a JSON array of overlay objects keyed by
//! column name. Enumerated fields must hold one of their accepted values;
//! any `id` present is ignored by the store on import.

use crate::core::OverlayItem;
use crate::error::{IoError, Result, StorageError};
use crate::io::reader::read_file;
use std::path::Path;

/// Parses overlays from JSON text.
///
/// `source` names the input in error messages.
///
/// # Errors
///
/// Returns [`IoError::InvalidImport`] if the text is not a JSON array of
/// well-formed overlays.
pub fn parse_overlays(json: &str, source: &str) -> Result<Vec<OverlayItem>> {
    serde_json::from_str(json).map_err(|e| {
        IoError::InvalidImport {
            path: source.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

/// Reads and parses an overlay import file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not parse.
///
/// # Examples
///
/// ```no_run
/// use overlay_store::io::read_overlays;
///
/// let overlays = read_overlays("overlays.json").unwrap();
/// ```
pub fn read_overlays<P: AsRef<Path>>(path: P) -> Result<Vec<OverlayItem>> {
    let path = path.as_ref();
    let content = read_file(path)?;
    parse_overlays(&content, &path.to_string_lossy())
}

/// Renders overlays as pretty JSON that [`parse_overlays`] accepts.
///
/// # Errors
///
/// Returns a [`crate::error::ValidationError`] for an overlay with a
/// non-finite time, which JSON cannot carry, or
/// [`StorageError::Serialization`] if encoding fails.
pub fn export_overlays(overlays: &[OverlayItem]) -> Result<String> {
    for item in overlays {
        item.validate()?;
    }
    Ok(serde_json::to_string_pretty(overlays).map_err(StorageError::from)?)
}
