//! HX to JSON conversion

use std::path::Path;

use crate::error::Result;
use crate::formats::{Document, read_document};

/// Convert HX file to JSON format
///
/// # Errors
/// Returns an error if the source is not a valid document or the
/// destination cannot be written.
pub fn convert_hx_to_json<P: AsRef<Path>>(source: P, dest: P) -> Result<()> {
    convert_hx_to_json_with_progress(source, dest, &|_| {})
}

/// Convert HX file to JSON format with progress callback
///
/// # Errors
/// See [`convert_hx_to_json`].
pub fn convert_hx_to_json_with_progress<P: AsRef<Path>>(
    source: P,
    dest: P,
    progress: crate::converter::ProgressCallback,
) -> Result<()> {
    tracing::info!("Converting HX→JSON: {:?} → {:?}", source.as_ref(), dest.as_ref());

    progress("Reading HX file...");
    let doc = read_document(&source)?;

    progress(&format!("Serializing {} blocks...", doc.blocks.len()));
    let json = to_json(&doc, true)?;

    progress("Writing JSON file...");
    std::fs::write(dest, json)?;

    tracing::info!("Conversion complete");
    Ok(())
}

/// Serialize a document to JSON
///
/// # Errors
/// Returns [`crate::Error::Json`] if serialization fails.
pub fn to_json(doc: &Document, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(doc)?
    } else {
        serde_json::to_string(doc)?
    };
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::PropertyTag;

    #[test]
    fn test_tags_serialize_by_name() {
        let mut doc = Document::new(1);
        doc.header.push(PropertyTag::Generator, "tool-x");
        let json = to_json(&doc, false).unwrap();
        assert!(json.contains(r#"{"tag":"VERSION","value":{"UInt":1}}"#), "{json}");
        assert!(json.contains(r#""tag":"GENERATOR""#));
        assert!(json.contains(r#""blocks":[]"#));
    }
}
