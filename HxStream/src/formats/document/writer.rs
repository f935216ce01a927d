//! Document encoding

use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};

use super::{Document, ObjectBlock, admit};
use crate::error::{Error, Result};
use crate::formats::CURRENT_VERSION;
use crate::formats::property::{CodecContext, encode_record};
use crate::formats::tags::{Category, PropertyTag};
use crate::formats::types::PropertyValue;

/// Write an HX document to disk
///
/// # Errors
/// Returns an error if the document is invalid or the file cannot be written.
pub fn write_document<P: AsRef<Path>>(doc: &Document, path: P) -> Result<()> {
    let bytes = encode_document(doc)?;
    std::fs::write(path.as_ref(), &bytes)?;
    tracing::debug!("Wrote {} bytes to {:?}", bytes.len(), path.as_ref());
    Ok(())
}

/// Serialize a document to bytes
///
/// The array padding convention is taken from the header's PAD_ARRAYS record.
///
/// # Errors
/// Returns [`Error::ShapeMismatch`] or [`Error::Encoding`] if any record or
/// block cannot be represented. Block errors carry the block index.
pub fn encode_document(doc: &Document) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut ctx = CodecContext::default();

    write_header(&mut buf, &doc.header, &mut ctx)?;
    for (index, block) in doc.blocks.iter().enumerate() {
        write_block(&mut buf, block, &mut ctx).map_err(|e| e.in_block(index))?;
    }
    buf.write_u16::<LittleEndian>(PropertyTag::Null.value())?;

    tracing::debug!("Encoded document: {} blocks, {} bytes", doc.blocks.len(), buf.len());
    Ok(buf)
}

fn write_header(buf: &mut Vec<u8>, header: &ObjectBlock, ctx: &mut CodecContext) -> Result<()> {
    let Some(first) = header.records.first() else {
        return Err(Error::encoding(None, "header is empty, VERSION is required"));
    };
    if first.tag != PropertyTag::Version {
        return Err(Error::encoding(
            Some(first.tag),
            "the first header record must be VERSION",
        ));
    }
    let supported = 1..=CURRENT_VERSION;
    if let Some(version) = first.value.as_uint().filter(|v| !supported.contains(v)) {
        return Err(Error::encoding(
            Some(PropertyTag::Version),
            format!("version {version} is not supported (1-{CURRENT_VERSION})"),
        ));
    }

    let mut seen_pad_arrays = false;
    for (i, record) in header.records.iter().enumerate() {
        if !matches!(record.tag.category(), Category::Header | Category::Common) {
            return Err(Error::encoding(
                Some(record.tag),
                format!("{} tag not allowed in the header", record.tag.category()),
            ));
        }
        if i > 0 && record.tag == PropertyTag::Version {
            return Err(Error::encoding(Some(record.tag), "VERSION repeated in the header"));
        }
        if record.tag == PropertyTag::PadArrays {
            if seen_pad_arrays {
                return Err(Error::encoding(Some(record.tag), "PAD_ARRAYS repeated in the header"));
            }
            seen_pad_arrays = true;
        }
        encode_record(buf, record, ctx)?;
        if let (PropertyTag::PadArrays, PropertyValue::Bool(pad)) = (record.tag, &record.value) {
            ctx.pad_arrays = *pad;
        }
    }
    buf.write_u16::<LittleEndian>(PropertyTag::Null.value())?;
    Ok(())
}

fn write_block(buf: &mut Vec<u8>, block: &ObjectBlock, ctx: &mut CodecContext) -> Result<()> {
    if block.is_empty() {
        return Err(Error::encoding(None, "object block is empty"));
    }
    ctx.index_type = None;

    let mut category = None;
    for record in &block.records {
        category = admit(category, record.tag)
            .map_err(|reason| Error::encoding(Some(record.tag), reason))?;
        encode_record(buf, record, ctx)?;
        if let PropertyValue::IndexType(index_type) = record.value {
            ctx.index_type = Some(index_type);
        }
    }
    let Some(category) = category else {
        return Err(Error::encoding(None, "object block has no category-defining record"));
    };

    buf.write_u16::<LittleEndian>(PropertyTag::Null.value())?;
    tracing::trace!("Wrote {} block: {} records", category, block.len());
    Ok(())
}
