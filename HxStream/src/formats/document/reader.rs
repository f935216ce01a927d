//! Document decoding

use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::{DecodeOptions, Document, ObjectBlock, PropertyRecord, admit};
use crate::error::{Error, Result};
use crate::formats::CURRENT_VERSION;
use crate::formats::property::{CodecContext, PropertyReader, decode_value, skip_unknown};
use crate::formats::tags::{Category, PropertyTag};
use crate::formats::types::PropertyValue;

/// Position of the decoder in the document grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamState {
    AwaitingHeader,
    InHeader,
    AwaitingBlock,
    InBlock(Option<Category>),
    Done,
}

/// Read an HX document from disk
///
/// # Errors
/// Returns an error if the file cannot be read or is not a valid document.
pub fn read_document<P: AsRef<Path>>(path: P) -> Result<Document> {
    let mut file = File::open(path.as_ref())?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)?;
    tracing::debug!("Read {} bytes from {:?}", buffer.len(), path.as_ref());
    decode_document(&buffer)
}

/// Decode a document with the default options (unknown extension tags are skipped)
///
/// # Errors
/// Returns the first decode error; no partial document is produced.
pub fn decode_document(data: &[u8]) -> Result<Document> {
    decode_document_with(data, &DecodeOptions::default())
}

/// Decode a document
///
/// # Errors
/// Returns [`Error::TruncatedStream`], [`Error::UnknownTag`],
/// [`Error::UnsupportedVersion`] or [`Error::MalformedDocument`] with the
/// byte offset and last good tag.
pub fn decode_document_with(data: &[u8], options: &DecodeOptions) -> Result<Document> {
    let mut decoder = DocumentDecoder {
        reader: PropertyReader::new(data),
        ctx: CodecContext {
            skip_unknown_tags: options.skip_unknown_tags,
            ..CodecContext::default()
        },
        options,
        state: StreamState::AwaitingHeader,
    };

    let header = decoder.read_header()?;
    let mut blocks = Vec::new();
    loop {
        let offset = decoder.reader.offset();
        let raw = decoder.reader.read_u16()?;
        if raw == PropertyTag::Null.value() {
            decoder.transition(StreamState::Done);
            break;
        }
        blocks.push(decoder.read_block(raw, offset)?);
    }

    let trailing = decoder.reader.remaining();
    if trailing > 0 {
        return Err(decoder
            .reader
            .malformed(format!("{trailing} trailing bytes after the end of the document")));
    }

    tracing::debug!("Decoded document: {} bytes, {} blocks", data.len(), blocks.len());
    Ok(Document { header, blocks })
}

struct DocumentDecoder<'a, 'o> {
    reader: PropertyReader<'a>,
    ctx: CodecContext,
    options: &'o DecodeOptions,
    state: StreamState,
}

impl DocumentDecoder<'_, '_> {
    fn transition(&mut self, next: StreamState) {
        tracing::trace!("{:?} -> {:?} at byte {}", self.state, next, self.reader.offset());
        self.state = next;
    }

    /// Map a raw tag to the table, skipping extension records when allowed.
    ///
    /// Returns `None` for a skipped record.
    fn resolve(&mut self, raw: u16, offset: u64) -> Result<Option<PropertyTag>> {
        if let Some(tag) = PropertyTag::from_u16(raw) {
            return Ok(Some(tag));
        }
        if Category::of_raw(raw).is_none() && self.options.skip_unknown_tags {
            let len = skip_unknown(&mut self.reader, &self.ctx)?;
            tracing::warn!("Skipped unknown tag {} at byte {} ({} payload bytes)", raw, offset, len);
            return Ok(None);
        }
        Err(Error::UnknownTag {
            tag: raw,
            offset,
            last_tag: self.reader.last_tag(),
        })
    }

    fn read_record(&mut self, tag: PropertyTag) -> Result<PropertyRecord> {
        let value = decode_value(tag, &mut self.reader, &self.ctx)?;
        self.reader.set_last_tag(tag);
        tracing::trace!("{} = {}", tag, value.kind_name());
        Ok(PropertyRecord { tag, value })
    }

    fn read_header(&mut self) -> Result<ObjectBlock> {
        let offset = self.reader.offset();
        let raw = self.reader.read_u16()?;
        if raw != PropertyTag::Version.value() {
            return Err(self.reader.malformed_at(
                offset,
                format!("document must start with VERSION, found tag {raw}"),
            ));
        }
        self.transition(StreamState::InHeader);

        let version_offset = self.reader.offset();
        let record = self.read_record(PropertyTag::Version)?;
        let version = record.value.as_uint().unwrap_or_default();
        if !(1..=CURRENT_VERSION).contains(&version) {
            return Err(Error::UnsupportedVersion {
                version,
                offset: version_offset,
            });
        }
        let mut header = ObjectBlock { records: vec![record] };

        loop {
            let offset = self.reader.offset();
            let raw = self.reader.read_u16()?;
            if raw == PropertyTag::Null.value() {
                break;
            }
            let Some(tag) = self.resolve(raw, offset)? else {
                continue;
            };
            match tag.category() {
                Category::Header | Category::Common => {}
                other => {
                    return Err(self
                        .reader
                        .malformed_at(offset, format!("{other} tag {tag} inside the header")));
                }
            }
            if tag == PropertyTag::Version {
                return Err(self.reader.malformed_at(offset, "VERSION repeated in the header"));
            }
            if tag == PropertyTag::PadArrays && header.get(tag).is_some() {
                return Err(self.reader.malformed_at(offset, "PAD_ARRAYS repeated in the header"));
            }

            let record = self.read_record(tag)?;
            if let (PropertyTag::PadArrays, PropertyValue::Bool(pad)) = (tag, &record.value) {
                self.ctx.pad_arrays = *pad;
            }
            header.records.push(record);
        }

        tracing::debug!(
            "Header: version {}, {} records, pad_arrays={}",
            version,
            header.len(),
            self.ctx.pad_arrays
        );
        self.transition(StreamState::AwaitingBlock);
        Ok(header)
    }

    /// Read one object block whose first tag has already been consumed.
    fn read_block(&mut self, first: u16, first_offset: u64) -> Result<ObjectBlock> {
        self.ctx.index_type = None;
        self.transition(StreamState::InBlock(None));

        let mut category = None;
        let mut block = ObjectBlock::new();
        let (mut raw, mut offset) = (first, first_offset);
        while raw != PropertyTag::Null.value() {
            if let Some(tag) = self.resolve(raw, offset)? {
                let next = admit(category, tag)
                    .map_err(|reason| self.reader.malformed_at(offset, reason))?;
                if next != category {
                    category = next;
                    self.transition(StreamState::InBlock(category));
                }
                let record = self.read_record(tag)?;
                if let PropertyValue::IndexType(index_type) = record.value {
                    self.ctx.index_type = Some(index_type);
                }
                block.records.push(record);
            }
            offset = self.reader.offset();
            raw = self.reader.read_u16()?;
        }

        if block.is_empty() {
            return Err(self
                .reader
                .malformed_at(first_offset, "object block holds no known records"));
        }
        let Some(category) = category else {
            return Err(self
                .reader
                .malformed_at(first_offset, "object block has no category-defining record"));
        };

        tracing::debug!("Closed {} block: {} records", category, block.len());
        self.transition(StreamState::AwaitingBlock);
        Ok(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::document::encode_document;
    use crate::formats::types::{IndexData, IndexType};

    fn header_only() -> Vec<u8> {
        // VERSION=1, header NULL, end NULL
        vec![10, 0, 1, 0, 0, 0, 0, 0, 0, 0]
    }

    #[test]
    fn test_minimal_document() {
        let doc = decode_document(&header_only()).unwrap();
        assert_eq!(doc.version(), Some(1));
        assert!(doc.blocks.is_empty());
    }

    #[test]
    fn test_missing_version() {
        // GENERATOR "x" first
        let bytes = [11, 0, 1, 0, 0, 0, b'x', 0, 0, 0, 0];
        let err = decode_document(&bytes).unwrap_err();
        assert!(matches!(err, Error::MalformedDocument { offset: 0, .. }));
    }

    #[test]
    fn test_unsupported_version() {
        let bytes = [10, 0, 7, 0, 0, 0, 0, 0, 0, 0];
        let err = decode_document(&bytes).unwrap_err();
        assert!(matches!(err, Error::UnsupportedVersion { version: 7, offset: 2 }));

        let bytes = [10, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        let err = decode_document(&bytes).unwrap_err();
        assert!(matches!(err, Error::UnsupportedVersion { version: 0, .. }));
    }

    #[test]
    fn test_trailing_bytes() {
        let mut bytes = header_only();
        bytes.push(0xFF);
        let err = decode_document(&bytes).unwrap_err();
        assert!(matches!(err, Error::MalformedDocument { offset: 10, .. }));
    }

    #[test]
    fn test_object_tag_in_header() {
        let mut bytes = vec![10, 0, 1, 0, 0, 0];
        // NUM_VERTICES = 3 before the header NULL
        bytes.extend_from_slice(&[20, 0, 3, 0, 0, 0, 0, 0, 0, 0]);
        let err = decode_document(&bytes).unwrap_err();
        match err {
            Error::MalformedDocument { offset, last_tag, .. } => {
                assert_eq!(offset, 6);
                assert_eq!(last_tag, Some(PropertyTag::Version));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_repeated_version() {
        let bytes = [10, 0, 1, 0, 0, 0, 10, 0, 1, 0, 0, 0, 0, 0, 0, 0];
        let err = decode_document(&bytes).unwrap_err();
        assert!(matches!(err, Error::MalformedDocument { offset: 6, .. }));
    }

    #[test]
    fn test_repeated_pad_arrays() {
        // VERSION=1, PAD_ARRAYS=0, PAD_ARRAYS=1, header NULL, end NULL
        let bytes = [10, 0, 1, 0, 0, 0, 12, 0, 0, 12, 0, 1, 0, 0, 0, 0];
        let err = decode_document(&bytes).unwrap_err();
        match err {
            Error::MalformedDocument { offset, last_tag, .. } => {
                assert_eq!(offset, 9);
                assert_eq!(last_tag, Some(PropertyTag::PadArrays));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_block_without_category() {
        let mut bytes = vec![10, 0, 1, 0, 0, 0, 0, 0];
        // NAME "a", block NULL, end NULL
        bytes.extend_from_slice(&[1, 0, 1, 0, 0, 0, b'a', 0, 0, 0, 0]);
        let err = decode_document(&bytes).unwrap_err();
        assert!(matches!(err, Error::MalformedDocument { offset: 8, .. }));
    }

    #[test]
    fn test_mixed_categories() {
        let mut bytes = vec![10, 0, 1, 0, 0, 0, 0, 0];
        // NUM_VERTICES = 3, then WRAP_MODE = 0
        bytes.extend_from_slice(&[20, 0, 3, 0, 0, 0, 50, 0, 0, 0, 0, 0, 0]);
        let err = decode_document(&bytes).unwrap_err();
        match err {
            Error::MalformedDocument { offset, last_tag, .. } => {
                assert_eq!(offset, 14);
                assert_eq!(last_tag, Some(PropertyTag::NumVertices));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_known_namespace_gap_is_fatal() {
        let mut bytes = vec![10, 0, 1, 0, 0, 0, 0, 0];
        // tag 27 lies in the mesh range but is not assigned
        bytes.extend_from_slice(&[27, 0, 0, 0, 0, 0, 4, 0, 0, 0, 0]);
        let err = decode_document(&bytes).unwrap_err();
        assert!(matches!(err, Error::UnknownTag { tag: 27, offset: 8, .. }));
    }

    #[test]
    fn test_extension_tag_strict_and_lenient() {
        let mut bytes = vec![10, 0, 1, 0, 0, 0, 0, 0];
        // FOV = 1.0, tag 200 with two bytes, block NULL, end NULL
        bytes.extend_from_slice(&[91, 0]);
        bytes.extend_from_slice(&1.0f32.to_le_bytes());
        bytes.extend_from_slice(&[200, 0, 2, 0, 0, 0, 1, 0xAB, 0xCD]);
        bytes.extend_from_slice(&[0, 0, 0, 0]);

        let doc = decode_document(&bytes).unwrap();
        assert_eq!(doc.blocks.len(), 1);
        assert_eq!(doc.blocks[0].len(), 1);
        assert_eq!(doc.blocks[0].category(), Some(Category::Camera));

        let err = decode_document_with(&bytes, &DecodeOptions::strict()).unwrap_err();
        assert!(matches!(err, Error::UnknownTag { tag: 200, last_tag: Some(PropertyTag::Fov), .. }));
    }

    #[test]
    fn test_index_type_resets_per_block() {
        let mut doc = Document::new(1);
        doc.push_block(
            ObjectBlock::new()
                .with(PropertyTag::IndexType, IndexType::U16)
                .with(PropertyTag::IndexData, IndexData::U16(vec![0, 1, 2])),
        );
        let mut bytes = encode_document(&doc).unwrap();
        // Append a second block with INDEX_DATA but no INDEX_TYPE: drop the end NULL first.
        bytes.truncate(bytes.len() - 2);
        bytes.extend_from_slice(&[24, 0, 1, 0, 0, 0, 2, 0, 0, 0, 0, 0, 0]);
        let err = decode_document(&bytes).unwrap_err();
        assert!(matches!(err, Error::MalformedDocument { last_tag: Some(PropertyTag::IndexData), .. }));
    }
}
