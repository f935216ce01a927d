//! Property decoding

use std::io::Cursor;

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};

use super::{CodecContext, padding_at};
use crate::error::{Error, Result};
use crate::formats::modes::{BlendFactor, BlendOperator};
use crate::formats::tags::{Category, PropertyTag};
use crate::formats::types::{
    BlendState, IndexData, IndexType, PropertyValue, Shape, VertexAttribute,
};

/// Bounds-checked little-endian cursor over an in-memory document.
///
/// Every read checks the remaining length first, so a short stream is
/// reported as [`Error::TruncatedStream`] with the offset of the failed read
/// and the last tag decoded so far.
#[derive(Debug)]
pub struct PropertyReader<'a> {
    cursor: Cursor<&'a [u8]>,
    last_tag: Option<PropertyTag>,
}

impl<'a> PropertyReader<'a> {
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(data),
            last_tag: None,
        }
    }

    /// Current byte offset from the start of the stream.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.cursor.position()
    }

    /// Bytes left after the current offset.
    #[must_use]
    pub fn remaining(&self) -> usize {
        let len = self.cursor.get_ref().len();
        len.saturating_sub(self.cursor.position() as usize)
    }

    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.remaining() == 0
    }

    /// The last record successfully decoded.
    #[must_use]
    pub fn last_tag(&self) -> Option<PropertyTag> {
        self.last_tag
    }

    pub(crate) fn set_last_tag(&mut self, tag: PropertyTag) {
        self.last_tag = Some(tag);
    }

    fn ensure(&self, needed: usize) -> Result<()> {
        let available = self.remaining();
        if available < needed {
            return Err(Error::TruncatedStream {
                offset: self.offset(),
                needed,
                available,
                last_tag: self.last_tag,
            });
        }
        Ok(())
    }

    /// Builds a [`Error::MalformedDocument`] at the current offset.
    pub fn malformed(&self, reason: impl Into<String>) -> Error {
        self.malformed_at(self.offset(), reason)
    }

    pub(crate) fn malformed_at(&self, offset: u64, reason: impl Into<String>) -> Error {
        Error::MalformedDocument {
            offset,
            last_tag: self.last_tag,
            reason: reason.into(),
        }
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        Ok(self.cursor.read_u8()?)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.ensure(2)?;
        Ok(self.cursor.read_u16::<LittleEndian>()?)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.ensure(4)?;
        Ok(self.cursor.read_u32::<LittleEndian>()?)
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.ensure(4)?;
        Ok(self.cursor.read_f32::<LittleEndian>()?)
    }

    /// Borrow the next `len` bytes without copying.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        self.ensure(len)?;
        let data: &'a [u8] = *self.cursor.get_ref();
        let start = self.cursor.position() as usize;
        self.cursor.set_position((start + len) as u64);
        Ok(&data[start..start + len])
    }

    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.read_bytes(len).map(|_| ())
    }
}

/// Decode the payload of `tag` at the reader's position.
///
/// # Errors
/// Returns [`Error::TruncatedStream`] if the payload is cut short and
/// [`Error::MalformedDocument`] if it holds a value the shape forbids.
pub fn decode_value(
    tag: PropertyTag,
    reader: &mut PropertyReader<'_>,
    ctx: &CodecContext,
) -> Result<PropertyValue> {
    let value = match tag.shape() {
        Shape::Terminator => return Err(reader.malformed("NULL terminator carries no value")),
        Shape::String => PropertyValue::String(read_string(reader)?),
        Shape::Bool => PropertyValue::Bool(read_bool(reader)?),
        Shape::UInt => PropertyValue::UInt(reader.read_u32()?),
        Shape::Float => PropertyValue::Float(reader.read_f32()?),
        Shape::Float2 => PropertyValue::Float2(read_floats(reader)?),
        Shape::Float3 => PropertyValue::Float3(read_floats(reader)?),
        Shape::Float4 => PropertyValue::Float4(read_floats(reader)?),
        Shape::Mode(count) => PropertyValue::Mode(read_mode(reader, tag, count)?),
        Shape::IndexType => {
            let offset = reader.offset();
            let bits = reader.read_u8()?;
            let index_type = IndexType::from_bits(bits).ok_or_else(|| {
                reader.malformed_at(offset, format!("invalid index width {bits} (expected 16 or 32)"))
            })?;
            PropertyValue::IndexType(index_type)
        }
        Shape::IndexArray => {
            let index_type = ctx
                .index_type
                .ok_or_else(|| reader.malformed(format!("{tag} without a preceding INDEX_TYPE")))?;
            let (count, bytes) = read_array(reader, ctx, index_type.width())?;
            PropertyValue::Indices(match index_type {
                IndexType::U16 => {
                    let mut indices = vec![0u16; count];
                    LittleEndian::read_u16_into(bytes, &mut indices);
                    IndexData::U16(indices)
                }
                IndexType::U32 => {
                    let mut indices = vec![0u32; count];
                    LittleEndian::read_u32_into(bytes, &mut indices);
                    IndexData::U32(indices)
                }
            })
        }
        Shape::FloatArray => {
            let offset = reader.offset();
            let (count, bytes) = read_array(reader, ctx, 4)?;
            if tag == PropertyTag::InverseBindPose && count % 16 != 0 {
                return Err(reader.malformed_at(
                    offset,
                    format!("{tag} holds {count} floats, not whole 4x4 matrices"),
                ));
            }
            let mut floats = vec![0f32; count];
            LittleEndian::read_f32_into(bytes, &mut floats);
            PropertyValue::Floats(floats)
        }
        Shape::VertexAttribute => PropertyValue::VertexAttribute(read_vertex_attribute(reader)?),
        Shape::BlendState => PropertyValue::BlendState(read_blend_state(reader, ctx)?),
    };
    Ok(value)
}

/// Skip the payload of a tag that is not in the table.
///
/// Unknown tags beyond every namespace are assumed to use the array layout,
/// whose header records both element count and element width.
///
/// # Errors
/// Returns [`Error::TruncatedStream`] if the payload is cut short.
pub fn skip_unknown(reader: &mut PropertyReader<'_>, ctx: &CodecContext) -> Result<usize> {
    let count = reader.read_u32()? as usize;
    let width = reader.read_u8()? as usize;
    let len = array_len(reader, count, width)?;
    reader.skip(padding_at(reader.offset(), ctx.pad_arrays))?;
    reader.skip(len)?;
    Ok(len)
}

fn array_len(reader: &PropertyReader<'_>, count: usize, width: usize) -> Result<usize> {
    count
        .checked_mul(width)
        .ok_or_else(|| reader.malformed(format!("array of {count} x {width} bytes overflows")))
}

/// Reads an array header and returns the element count and element bytes.
fn read_array<'a>(
    reader: &mut PropertyReader<'a>,
    ctx: &CodecContext,
    expected_width: u8,
) -> Result<(usize, &'a [u8])> {
    let count = reader.read_u32()? as usize;
    let width_offset = reader.offset();
    let width = reader.read_u8()?;
    if width != expected_width {
        return Err(reader.malformed_at(
            width_offset,
            format!("array element width {width}, expected {expected_width}"),
        ));
    }
    let len = array_len(reader, count, width as usize)?;
    reader.skip(padding_at(reader.offset(), ctx.pad_arrays))?;
    Ok((count, reader.read_bytes(len)?))
}

fn read_string(reader: &mut PropertyReader<'_>) -> Result<String> {
    let len = reader.read_u32()? as usize;
    let offset = reader.offset();
    let bytes = reader.read_bytes(len)?;
    String::from_utf8(bytes.to_vec())
        .map_err(|e| reader.malformed_at(offset, format!("string is not valid UTF-8: {e}")))
}

fn read_bool(reader: &mut PropertyReader<'_>) -> Result<bool> {
    let offset = reader.offset();
    match reader.read_u8()? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(reader.malformed_at(offset, format!("invalid bool value {other}"))),
    }
}

fn read_floats<const N: usize>(reader: &mut PropertyReader<'_>) -> Result<[f32; N]> {
    let bytes = reader.read_bytes(N * 4)?;
    let mut out = [0f32; N];
    LittleEndian::read_f32_into(bytes, &mut out);
    Ok(out)
}

fn read_mode(reader: &mut PropertyReader<'_>, tag: PropertyTag, count: u8) -> Result<u8> {
    let offset = reader.offset();
    let value = reader.read_u8()?;
    if value >= count {
        return Err(reader.malformed_at(
            offset,
            format!("{tag} value {value} out of range (0-{})", count - 1),
        ));
    }
    Ok(value)
}

fn read_vertex_attribute(reader: &mut PropertyReader<'_>) -> Result<VertexAttribute> {
    let name = read_string(reader)?;
    let offset = reader.offset();
    let num_components = reader.read_u8()?;
    if !(1..=VertexAttribute::MAX_COMPONENTS).contains(&num_components) {
        return Err(reader.malformed_at(
            offset,
            format!("vertex attribute '{name}' has {num_components} components"),
        ));
    }
    let stream_index = reader.read_u8()?;
    Ok(VertexAttribute {
        name,
        num_components,
        stream_index,
    })
}

fn read_blend_state(reader: &mut PropertyReader<'_>, ctx: &CodecContext) -> Result<BlendState> {
    let mut state = BlendState::default();
    loop {
        let offset = reader.offset();
        let raw = reader.read_u16()?;
        if raw == PropertyTag::Null as u16 {
            return Ok(state);
        }
        let Some(tag) = PropertyTag::from_u16(raw) else {
            if Category::of_raw(raw).is_none() && ctx.skip_unknown_tags {
                let len = skip_unknown(reader, ctx)?;
                tracing::warn!(
                    "Skipped unknown tag {} inside BLEND_STATE at byte {} ({} payload bytes)",
                    raw,
                    offset,
                    len
                );
                continue;
            }
            return Err(Error::UnknownTag {
                tag: raw,
                offset,
                last_tag: reader.last_tag(),
            });
        };
        if tag.category() != Category::BlendState {
            return Err(reader.malformed_at(offset, format!("{tag} inside BLEND_STATE")));
        }
        let Shape::Mode(count) = tag.shape() else {
            return Err(reader.malformed_at(offset, format!("{tag} is not a blend mode")));
        };
        let value = read_mode(reader, tag, count)?;
        let duplicate = match tag {
            PropertyTag::BlendStateSrcFactor => state.src_factor.replace(factor(value)).is_some(),
            PropertyTag::BlendStateDstFactor => state.dst_factor.replace(factor(value)).is_some(),
            PropertyTag::BlendStateOperator => state.operator.replace(operator(value)).is_some(),
            PropertyTag::BlendStateSrcFactorAlpha => {
                state.src_factor_alpha.replace(factor(value)).is_some()
            }
            PropertyTag::BlendStateDstFactorAlpha => {
                state.dst_factor_alpha.replace(factor(value)).is_some()
            }
            _ => state.operator_alpha.replace(operator(value)).is_some(),
        };
        if duplicate {
            return Err(reader.malformed_at(offset, format!("{tag} repeated inside BLEND_STATE")));
        }
        reader.set_last_tag(tag);
    }
}

// Range was checked against the table count by read_mode
fn factor(value: u8) -> BlendFactor {
    BlendFactor::try_from(value).unwrap_or(BlendFactor::Zero)
}

fn operator(value: u8) -> BlendOperator {
    BlendOperator::try_from(value).unwrap_or(BlendOperator::Add)
}
