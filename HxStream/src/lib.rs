//! # `HxStream`
//!
//! A pure-Rust codec for the HX property stream, the tagged binary format a
//! scene exporter uses to hand meshes, nodes, lights, textures, materials,
//! cameras and skeletons to the HX loader.
//!
//! ## Format
//!
//! A document is a header block followed by object blocks. Each block is a
//! run of `[tag: u16][payload]` records closed by a NULL tag, and the payload
//! layout is fixed by the tag. All values are little-endian.
//!
//! ## Quick Start
//!
//! ```
//! use hxstream::prelude::*;
//!
//! let mut doc = Document::new(1);
//! doc.header.push(PropertyTag::Generator, "tool-x");
//! doc.push_block(
//!     ObjectBlock::new()
//!         .with(PropertyTag::NumVertices, 4u32)
//!         .with(PropertyTag::IndexType, IndexType::U16)
//!         .with(PropertyTag::IndexData, IndexData::U16(vec![0, 1, 2, 0, 2, 3])),
//! );
//!
//! let bytes = encode_document(&doc)?;
//! assert_eq!(decode_document(&bytes)?, doc);
//! # Ok::<(), hxstream::Error>(())
//! ```
//!
//! ### Converting to JSON
//!
//! ```no_run
//! use hxstream::converter::convert_hx_to_json;
//!
//! convert_hx_to_json("scene.hx", "scene.json")?;
//! # Ok::<(), hxstream::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `hxstream` command-line binary

pub mod converter;
pub mod error;
pub mod formats;
pub mod validate;

// Re-exports for convenience
pub use error::{Error, Result};
pub use formats::{decode_document, encode_document};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::formats::modes::{
        BlendFactor, BlendOperator, CullMode, ElementType, LightingMode, LightingModel,
        SpecularMapMode, TextureFilter, TextureWrapMode,
    };
    pub use crate::formats::{
        BlendState, Category, DecodeOptions, Document, IndexData, IndexType, ObjectBlock,
        PropertyRecord, PropertyTag, PropertyValue, Shape, VertexAttribute, decode_document,
        decode_document_with, encode_document, read_document, write_document,
    };

    pub use crate::converter;
    pub use crate::validate::{
        BatchValidateResult, FileReport, batch_validate, find_documents, validate_file,
    };
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
