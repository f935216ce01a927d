//! The HX property-stream format
//!
//! `tags` is the shared vocabulary, `property` moves one record to and from
//! bytes, and `document` frames records into header and object blocks.

pub mod document;
pub mod modes;
pub mod property;
pub mod tags;
pub mod types;

/// Newest codec revision this build reads and writes.
pub const CURRENT_VERSION: u32 = 1;

// Re-export the document model and entry points
pub use document::{
    DecodeOptions, Document, ObjectBlock, PropertyRecord, decode_document, decode_document_with,
    encode_document, read_document, write_document,
};
pub use tags::{Category, PropertyTag, TAG_TABLE, TagInfo};
pub use types::{BlendState, IndexData, IndexType, PropertyValue, Shape, VertexAttribute};
