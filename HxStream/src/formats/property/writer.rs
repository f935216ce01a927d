//! Property encoding

use byteorder::{LittleEndian, WriteBytesExt};

use super::{CodecContext, padding_at};
use crate::error::{Error, Result};
use crate::formats::document::PropertyRecord;
use crate::formats::tags::PropertyTag;
use crate::formats::types::{BlendState, IndexData, PropertyValue, Shape, VertexAttribute};

/// Append one complete record, tag first.
///
/// # Errors
/// Returns [`Error::ShapeMismatch`] or [`Error::Encoding`] if the record
/// cannot be represented; nothing is written in that case.
pub fn encode_record(buf: &mut Vec<u8>, record: &PropertyRecord, ctx: &CodecContext) -> Result<()> {
    if record.tag == PropertyTag::Null {
        return Err(Error::encoding(
            Some(PropertyTag::Null),
            "NULL is a terminator, not a property",
        ));
    }
    check_value(record.tag, &record.value, ctx)?;
    buf.write_u16::<LittleEndian>(record.tag.value())?;
    write_payload(buf, record.tag, &record.value, ctx)
}

/// Append the payload of `tag` without the tag itself.
///
/// The value is checked completely before the first byte is written.
///
/// # Errors
/// Returns [`Error::ShapeMismatch`] if the value's kind differs from the
/// tag's shape and [`Error::Encoding`] if its contents are out of range.
pub fn encode_value(
    buf: &mut Vec<u8>,
    tag: PropertyTag,
    value: &PropertyValue,
    ctx: &CodecContext,
) -> Result<()> {
    check_value(tag, value, ctx)?;
    write_payload(buf, tag, value, ctx)
}

fn check_value(tag: PropertyTag, value: &PropertyValue, ctx: &CodecContext) -> Result<()> {
    let shape = tag.shape();
    if !value.fits(shape) {
        return Err(Error::ShapeMismatch {
            block: None,
            tag,
            expected: shape,
            actual: value.kind_name(),
        });
    }
    match (shape, value) {
        (Shape::String, PropertyValue::String(s)) => check_len(tag, s.len()),
        (Shape::Mode(count), PropertyValue::Mode(v)) if *v >= count => Err(Error::encoding(
            Some(tag),
            format!("value {v} out of range (0-{})", count - 1),
        )),
        (Shape::IndexArray, PropertyValue::Indices(data)) => {
            let Some(index_type) = ctx.index_type else {
                return Err(Error::encoding(Some(tag), "no preceding INDEX_TYPE"));
            };
            if index_type != data.index_type() {
                return Err(Error::encoding(
                    Some(tag),
                    format!(
                        "{}-bit indices under a {}-bit INDEX_TYPE",
                        data.index_type().bits(),
                        index_type.bits()
                    ),
                ));
            }
            check_len(tag, data.len())
        }
        (Shape::FloatArray, PropertyValue::Floats(data)) => {
            if tag == PropertyTag::InverseBindPose && data.len() % 16 != 0 {
                return Err(Error::encoding(
                    Some(tag),
                    format!("{} floats is not a whole number of 4x4 matrices", data.len()),
                ));
            }
            check_len(tag, data.len())
        }
        (Shape::VertexAttribute, PropertyValue::VertexAttribute(attr)) => {
            if !(1..=VertexAttribute::MAX_COMPONENTS).contains(&attr.num_components) {
                return Err(Error::encoding(
                    Some(tag),
                    format!(
                        "attribute '{}' has {} components (1-{})",
                        attr.name,
                        attr.num_components,
                        VertexAttribute::MAX_COMPONENTS
                    ),
                ));
            }
            check_len(tag, attr.name.len())
        }
        _ => Ok(()),
    }
}

fn check_len(tag: PropertyTag, len: usize) -> Result<()> {
    if u32::try_from(len).is_err() {
        return Err(Error::encoding(Some(tag), format!("length {len} exceeds u32")));
    }
    Ok(())
}

// Lengths were range-checked by check_value
fn write_payload(
    buf: &mut Vec<u8>,
    tag: PropertyTag,
    value: &PropertyValue,
    ctx: &CodecContext,
) -> Result<()> {
    match value {
        PropertyValue::String(s) => write_string(buf, s)?,
        PropertyValue::Bool(b) => buf.write_u8(u8::from(*b))?,
        PropertyValue::UInt(v) => buf.write_u32::<LittleEndian>(*v)?,
        PropertyValue::Float(v) => buf.write_f32::<LittleEndian>(*v)?,
        PropertyValue::Float2(v) => write_floats(buf, v)?,
        PropertyValue::Float3(v) => write_floats(buf, v)?,
        PropertyValue::Float4(v) => write_floats(buf, v)?,
        PropertyValue::Mode(v) => buf.write_u8(*v)?,
        PropertyValue::IndexType(t) => buf.write_u8(t.bits())?,
        PropertyValue::Indices(data) => {
            let index_type = data.index_type();
            write_array_header(buf, data.len() as u32, index_type.width(), ctx)?;
            match data {
                IndexData::U16(indices) => {
                    for &i in indices {
                        buf.write_u16::<LittleEndian>(i)?;
                    }
                }
                IndexData::U32(indices) => {
                    for &i in indices {
                        buf.write_u32::<LittleEndian>(i)?;
                    }
                }
            }
        }
        PropertyValue::Floats(data) => {
            write_array_header(buf, data.len() as u32, 4, ctx)?;
            write_floats(buf, data)?;
        }
        PropertyValue::VertexAttribute(attr) => {
            write_string(buf, &attr.name)?;
            buf.write_u8(attr.num_components)?;
            buf.write_u8(attr.stream_index)?;
        }
        PropertyValue::BlendState(state) => write_blend_state(buf, state)?,
    }
    tracing::trace!("Encoded {} ({})", tag, value.kind_name());
    Ok(())
}

fn write_string(buf: &mut Vec<u8>, s: &str) -> Result<()> {
    buf.write_u32::<LittleEndian>(s.len() as u32)?;
    buf.extend_from_slice(s.as_bytes());
    Ok(())
}

fn write_floats(buf: &mut Vec<u8>, values: &[f32]) -> Result<()> {
    for &v in values {
        buf.write_f32::<LittleEndian>(v)?;
    }
    Ok(())
}

fn write_array_header(buf: &mut Vec<u8>, count: u32, width: u8, ctx: &CodecContext) -> Result<()> {
    buf.write_u32::<LittleEndian>(count)?;
    buf.write_u8(width)?;
    let padding = padding_at(buf.len() as u64, ctx.pad_arrays);
    buf.resize(buf.len() + padding, 0);
    Ok(())
}

fn write_blend_state(buf: &mut Vec<u8>, state: &BlendState) -> Result<()> {
    let entries = [
        (PropertyTag::BlendStateSrcFactor, state.src_factor.map(u8::from)),
        (PropertyTag::BlendStateDstFactor, state.dst_factor.map(u8::from)),
        (PropertyTag::BlendStateOperator, state.operator.map(u8::from)),
        (PropertyTag::BlendStateSrcFactorAlpha, state.src_factor_alpha.map(u8::from)),
        (PropertyTag::BlendStateDstFactorAlpha, state.dst_factor_alpha.map(u8::from)),
        (PropertyTag::BlendStateOperatorAlpha, state.operator_alpha.map(u8::from)),
    ];
    for (tag, value) in entries {
        if let Some(value) = value {
            buf.write_u16::<LittleEndian>(tag.value())?;
            buf.write_u8(value)?;
        }
    }
    buf.write_u16::<LittleEndian>(PropertyTag::Null.value())?;
    Ok(())
}
