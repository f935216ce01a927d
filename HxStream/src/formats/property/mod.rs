//! Property codec: one `(tag, value)` record to and from bytes
//!
//! Record layout is `[tag: u16][payload]`, with the payload shape looked up
//! from the tag table. Array payloads are
//! `[count: u32][element_width: u8][padding][elements]`, where padding aligns
//! the elements to 4 bytes when the document header sets PAD_ARRAYS.

mod reader;
mod writer;

pub use reader::{PropertyReader, decode_value, skip_unknown};
pub use writer::{encode_record, encode_value};

use super::types::IndexType;

/// Array element alignment when PAD_ARRAYS is enabled.
pub const ARRAY_ALIGNMENT: u64 = 4;

/// State that the shape of a payload depends on beyond its tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CodecContext {
    /// Align array elements to [`ARRAY_ALIGNMENT`] (header PAD_ARRAYS).
    pub pad_arrays: bool,
    /// The INDEX_TYPE most recently seen in the current block.
    pub index_type: Option<IndexType>,
    /// Decoder only: skip extension tags (110 and up), including those nested
    /// in BLEND_STATE.
    pub skip_unknown_tags: bool,
}

impl CodecContext {
    #[must_use]
    pub fn new(pad_arrays: bool) -> Self {
        Self {
            pad_arrays,
            index_type: None,
            skip_unknown_tags: false,
        }
    }
}

/// Number of zero bytes needed after `offset` to reach the array alignment.
#[must_use]
pub(crate) fn padding_at(offset: u64, pad_arrays: bool) -> usize {
    if pad_arrays {
        ((ARRAY_ALIGNMENT - offset % ARRAY_ALIGNMENT) % ARRAY_ALIGNMENT) as usize
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::formats::modes::{BlendFactor, BlendOperator, CullMode};
    use crate::formats::tags::PropertyTag;
    use crate::formats::types::{BlendState, IndexData, PropertyValue, VertexAttribute};

    fn round_trip(tag: PropertyTag, value: &PropertyValue, ctx: &CodecContext) -> PropertyValue {
        let mut buf = Vec::new();
        encode_value(&mut buf, tag, value, ctx).unwrap();
        let mut reader = PropertyReader::new(&buf);
        let decoded = decode_value(tag, &mut reader, ctx).unwrap();
        assert!(reader.is_at_end(), "{tag} left {} bytes", reader.remaining());
        decoded
    }

    #[test]
    fn test_padding_at() {
        assert_eq!(padding_at(5, false), 0);
        assert_eq!(padding_at(4, true), 0);
        assert_eq!(padding_at(5, true), 3);
        assert_eq!(padding_at(7, true), 1);
    }

    #[test]
    fn test_scalar_layouts() {
        let ctx = CodecContext::default();
        let mut buf = Vec::new();
        encode_value(&mut buf, PropertyTag::Intensity, &PropertyValue::Float(2.5), &ctx).unwrap();
        assert_eq!(buf, 2.5f32.to_le_bytes());

        buf.clear();
        encode_value(&mut buf, PropertyTag::Name, &"cube".into(), &ctx).unwrap();
        assert_eq!(buf, [4, 0, 0, 0, b'c', b'u', b'b', b'e']);

        buf.clear();
        encode_value(&mut buf, PropertyTag::Visible, &true.into(), &ctx).unwrap();
        assert_eq!(buf, [1]);
    }

    #[test]
    fn test_record_starts_with_tag() {
        let ctx = CodecContext::default();
        let mut buf = Vec::new();
        let record = crate::formats::document::PropertyRecord::new(PropertyTag::NumVertices, 4u32);
        encode_record(&mut buf, &record, &ctx).unwrap();
        assert_eq!(buf, [20, 0, 4, 0, 0, 0]);

        let mut reader = PropertyReader::new(&buf);
        assert_eq!(reader.read_u16().unwrap(), 20);
    }

    #[test]
    fn test_shape_round_trips() {
        let ctx = CodecContext::default();
        let cases = [
            (PropertyTag::Generator, PropertyValue::from("exporter 0.3")),
            (PropertyTag::CastShadows, PropertyValue::Bool(false)),
            (PropertyTag::DefaultSceneIndex, PropertyValue::UInt(7)),
            (PropertyTag::SpotAngles, PropertyValue::Float2([0.5, 0.75])),
            (PropertyTag::Position, PropertyValue::Float3([1.0, -2.0, 3.5])),
            (PropertyTag::Rotation, PropertyValue::Float4([0.0, 0.0, 0.0, 1.0])),
            (PropertyTag::CullMode, CullMode::Front.into()),
            (PropertyTag::IndexType, PropertyValue::IndexType(IndexType::U32)),
            (
                PropertyTag::VertexAttribute,
                VertexAttribute::new("hx_normal", 3, 1).into(),
            ),
            (
                PropertyTag::BlendState,
                BlendState {
                    src_factor: Some(BlendFactor::SourceAlpha),
                    operator_alpha: Some(BlendOperator::ReverseSubtract),
                    ..BlendState::default()
                }
                .into(),
            ),
        ];
        for (tag, value) in cases {
            assert_eq!(round_trip(tag, &value, &ctx), value, "{tag}");
        }
    }

    #[test]
    fn test_index_data_follows_index_type() {
        let ctx = CodecContext {
            index_type: Some(IndexType::U16),
            ..CodecContext::default()
        };
        let value = PropertyValue::Indices(IndexData::U16(vec![0, 1, 2, 0, 2, 3]));
        let mut buf = Vec::new();
        encode_value(&mut buf, PropertyTag::IndexData, &value, &ctx).unwrap();
        // count, width, 6 x u16
        assert_eq!(buf.len(), 4 + 1 + 12);
        assert_eq!(buf[4], 2);
        assert_eq!(round_trip(PropertyTag::IndexData, &value, &ctx), value);
    }

    #[test]
    fn test_index_data_without_index_type() {
        let value = PropertyValue::Indices(IndexData::U32(vec![1, 2, 3]));
        let mut buf = Vec::new();
        let err = encode_value(&mut buf, PropertyTag::IndexData, &value, &CodecContext::default())
            .unwrap_err();
        assert!(matches!(err, Error::Encoding { tag: Some(PropertyTag::IndexData), .. }));

        let ctx = CodecContext {
            index_type: Some(IndexType::U32),
            ..CodecContext::default()
        };
        encode_value(&mut buf, PropertyTag::IndexData, &value, &ctx).unwrap();
        let mut reader = PropertyReader::new(&buf);
        let err = decode_value(PropertyTag::IndexData, &mut reader, &CodecContext::default())
            .unwrap_err();
        assert!(matches!(err, Error::MalformedDocument { .. }));
    }

    #[test]
    fn test_padded_array_alignment() {
        let ctx = CodecContext::new(true);
        let value = PropertyValue::Floats(vec![1.0, 2.0]);
        // one leading byte so the header ends unaligned
        let mut buf = vec![0xAA];
        encode_value(&mut buf, PropertyTag::VertexStreamData, &value, &ctx).unwrap();
        // 1 + count(4) + width(1) = 6 -> 2 bytes padding -> data at 8
        assert_eq!(buf.len(), 8 + 8);
        assert_eq!(&buf[6..8], &[0, 0]);
        assert_eq!(&buf[8..12], &1.0f32.to_le_bytes());

        let mut reader = PropertyReader::new(&buf);
        reader.skip(1).unwrap();
        assert_eq!(decode_value(PropertyTag::VertexStreamData, &mut reader, &ctx).unwrap(), value);
    }

    #[test]
    fn test_shape_mismatch() {
        let mut buf = Vec::new();
        let err = encode_value(
            &mut buf,
            PropertyTag::Color,
            &PropertyValue::Float3([1.0, 0.0, 0.0]),
            &CodecContext::default(),
        )
        .unwrap_err();
        match err {
            Error::ShapeMismatch { block, tag, expected, actual } => {
                assert_eq!(block, None);
                assert_eq!(tag, PropertyTag::Color);
                assert_eq!(expected, crate::formats::types::Shape::Float4);
                assert_eq!(actual, "float32x3");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(buf.is_empty());
    }

    #[test]
    fn test_inverse_bind_pose_needs_whole_matrices() {
        let mut buf = Vec::new();
        let err = encode_value(
            &mut buf,
            PropertyTag::InverseBindPose,
            &PropertyValue::Floats(vec![0.0; 15]),
            &CodecContext::default(),
        )
        .unwrap_err();
        assert!(err.is_encode_error());

        let identity: Vec<f32> = (0..16).map(|i| if i % 5 == 0 { 1.0 } else { 0.0 }).collect();
        let value = PropertyValue::Floats(identity);
        assert_eq!(
            round_trip(PropertyTag::InverseBindPose, &value, &CodecContext::default()),
            value
        );
    }

    #[test]
    fn test_decode_rejects_bad_payloads() {
        let ctx = CodecContext::default();

        let mut reader = PropertyReader::new(&[2]);
        let err = decode_value(PropertyTag::Visible, &mut reader, &ctx).unwrap_err();
        assert!(matches!(err, Error::MalformedDocument { .. }));

        let mut reader = PropertyReader::new(&[4]);
        let err = decode_value(PropertyTag::CullMode, &mut reader, &ctx).unwrap_err();
        assert!(matches!(err, Error::MalformedDocument { .. }));

        let mut reader = PropertyReader::new(&[8]);
        let err = decode_value(PropertyTag::IndexType, &mut reader, &ctx).unwrap_err();
        assert!(matches!(err, Error::MalformedDocument { .. }));

        let mut reader = PropertyReader::new(&[2, 0, 0, 0, 0xFF, 0xFE]);
        let err = decode_value(PropertyTag::Name, &mut reader, &ctx).unwrap_err();
        assert!(matches!(err, Error::MalformedDocument { .. }));
    }

    #[test]
    fn test_decode_truncated_payload() {
        let ctx = CodecContext::default();
        let mut reader = PropertyReader::new(&[0, 0, 128]);
        let err = decode_value(PropertyTag::Radius, &mut reader, &ctx).unwrap_err();
        match err {
            Error::TruncatedStream { offset, needed, available, .. } => {
                assert_eq!(offset, 0);
                assert_eq!(needed, 4);
                assert_eq!(available, 3);
            }
            other => panic!("unexpected error: {other}"),
        }

        // Array header claims more elements than remain
        let mut bytes = vec![10, 0, 0, 0, 4];
        bytes.extend_from_slice(&1.0f32.to_le_bytes());
        let mut reader = PropertyReader::new(&bytes);
        let err = decode_value(PropertyTag::VertexStreamData, &mut reader, &ctx).unwrap_err();
        assert!(matches!(err, Error::TruncatedStream { needed: 40, available: 4, .. }));
    }

    #[test]
    fn test_skip_unknown_array() {
        let ctx = CodecContext::default();
        let mut bytes = vec![3, 0, 0, 0, 4];
        for v in [1.0f32, 2.0, 3.0] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        bytes.extend_from_slice(&[0xEE]);
        let mut reader = PropertyReader::new(&bytes);
        skip_unknown(&mut reader, &ctx).unwrap();
        assert_eq!(reader.remaining(), 1);
    }

    /// BLEND_STATE payload: SRC_FACTOR=One, then extension tag 9001 with
    /// three floats, then the nested NULL.
    fn blend_state_with_extension() -> Vec<u8> {
        let mut bytes = vec![80, 0, 1];
        bytes.extend_from_slice(&9001u16.to_le_bytes());
        bytes.extend_from_slice(&[3, 0, 0, 0, 4]);
        for v in [0.25f32, 0.5, 0.75] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        bytes.extend_from_slice(&[0, 0]);
        bytes
    }

    #[test]
    fn test_blend_state_skips_extension_tag() {
        let bytes = blend_state_with_extension();
        let ctx = CodecContext {
            skip_unknown_tags: true,
            ..CodecContext::default()
        };
        let mut reader = PropertyReader::new(&bytes);
        let value = decode_value(PropertyTag::BlendState, &mut reader, &ctx).unwrap();
        assert!(reader.is_at_end());
        assert_eq!(
            value,
            PropertyValue::BlendState(BlendState {
                src_factor: Some(BlendFactor::One),
                ..BlendState::default()
            })
        );
    }

    #[test]
    fn test_blend_state_extension_tag_strict() {
        let bytes = blend_state_with_extension();
        let mut reader = PropertyReader::new(&bytes);
        let err = decode_value(PropertyTag::BlendState, &mut reader, &CodecContext::default())
            .unwrap_err();
        assert!(matches!(err, Error::UnknownTag { tag: 9001, offset: 3, .. }));

        // Inside the blend-state range the shape is unknowable, so never skipped
        let bytes = [87, 0, 0, 0];
        let ctx = CodecContext {
            skip_unknown_tags: true,
            ..CodecContext::default()
        };
        let mut reader = PropertyReader::new(&bytes);
        let err = decode_value(PropertyTag::BlendState, &mut reader, &ctx).unwrap_err();
        assert!(matches!(err, Error::UnknownTag { tag: 87, offset: 0, .. }));
    }
}
