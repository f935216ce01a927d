//! Format conversion utilities
//!
//! HX (binary) ↔ JSON. The JSON form is the serde representation of
//! [`Document`](crate::formats::Document): tags by name, values as externally
//! tagged enums. It is meant for diffing and hand-editing exporter output.

mod hx_to_json;
mod json_to_hx;

use std::path::Path;

use crate::error::{Error, Result};

/// Progress callback type for conversion operations.
/// The callback receives a message describing the current step.
pub type ProgressCallback<'a> = &'a dyn Fn(&str);

pub use hx_to_json::{convert_hx_to_json, convert_hx_to_json_with_progress, to_json};
pub use json_to_hx::{convert_json_to_hx, convert_json_to_hx_with_progress, from_json};

/// Lowercased extension of `path`, or an empty string.
pub(crate) fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default()
}

/// Convert between HX and JSON, picking the direction from the file extensions
///
/// # Errors
/// Returns [`Error::UnsupportedConversion`] for any other pair of extensions,
/// or the error of the conversion itself.
pub fn convert<P: AsRef<Path>>(source: P, dest: P) -> Result<()> {
    convert_with_progress(source, dest, &|_| {})
}

/// Convert between HX and JSON with a progress callback
///
/// # Errors
/// See [`convert`].
pub fn convert_with_progress<P: AsRef<Path>>(
    source: P,
    dest: P,
    progress: ProgressCallback,
) -> Result<()> {
    let from = extension_of(source.as_ref());
    let to = extension_of(dest.as_ref());
    match (from.as_str(), to.as_str()) {
        ("hx", "json") => convert_hx_to_json_with_progress(source, dest, progress),
        ("json", "hx") => convert_json_to_hx_with_progress(source, dest, progress),
        _ => Err(Error::UnsupportedConversion { from, to }),
    }
}
