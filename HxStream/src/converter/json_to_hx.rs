//! JSON to HX conversion

use std::path::Path;

use crate::error::Result;
use crate::formats::{Document, encode_document};

/// Convert JSON file to HX format
///
/// # Errors
/// Returns an error if the JSON does not describe a valid document or the
/// destination cannot be written.
pub fn convert_json_to_hx<P: AsRef<Path>>(source: P, dest: P) -> Result<()> {
    convert_json_to_hx_with_progress(source, dest, &|_| {})
}

/// Convert JSON file to HX format with progress callback
///
/// # Errors
/// See [`convert_json_to_hx`].
pub fn convert_json_to_hx_with_progress<P: AsRef<Path>>(
    source: P,
    dest: P,
    progress: crate::converter::ProgressCallback,
) -> Result<()> {
    tracing::info!("Converting JSON→HX: {:?} → {:?}", source.as_ref(), dest.as_ref());

    progress("Reading JSON file...");
    let json = std::fs::read_to_string(&source)?;
    let doc: Document = serde_json::from_str(&json)?;

    progress(&format!("Encoding {} blocks...", doc.blocks.len()));
    let bytes = encode_document(&doc)?;

    progress("Writing HX file...");
    std::fs::write(dest, bytes)?;

    tracing::info!("Conversion complete");
    Ok(())
}

/// Parse a document from JSON
///
/// The result is checked by encoding it, so a document returned here always
/// writes.
///
/// # Errors
/// Returns [`crate::Error::Json`] for malformed JSON and an encode error for a
/// document the binary format cannot represent.
pub fn from_json(json: &str) -> Result<Document> {
    let doc: Document = serde_json::from_str(json)?;
    encode_document(&doc)?;
    Ok(doc)
}
