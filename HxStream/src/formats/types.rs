//! Wire shapes and property values

use std::fmt;

use serde::{Deserialize, Serialize};

use super::modes::{BlendFactor, BlendOperator};

/// Binary layout of a property payload. A pure function of the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// NULL: block, header and document terminator. No payload.
    Terminator,
    /// `u32` byte length followed by UTF-8 bytes.
    String,
    /// `u8`, 0 or 1.
    Bool,
    /// `u32`.
    UInt,
    /// `f32`.
    Float,
    Float2,
    Float3,
    Float4,
    /// `u8` ordinal below the given variant count.
    Mode(u8),
    /// `u8` index width in bits (16 or 32).
    IndexType,
    /// Length-prefixed array of 16 or 32-bit indices, width set by INDEX_TYPE.
    IndexArray,
    /// Length-prefixed array of `f32`.
    FloatArray,
    /// Name, component count and stream index of one vertex attribute.
    VertexAttribute,
    /// Nested blend-state records terminated by NULL.
    BlendState,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Terminator => f.write_str("terminator"),
            Shape::String => f.write_str("string"),
            Shape::Bool => f.write_str("bool"),
            Shape::UInt => f.write_str("uint32"),
            Shape::Float => f.write_str("float32"),
            Shape::Float2 => f.write_str("float32x2"),
            Shape::Float3 => f.write_str("float32x3"),
            Shape::Float4 => f.write_str("float32x4"),
            Shape::Mode(count) => write!(f, "mode[{count}]"),
            Shape::IndexType => f.write_str("index type"),
            Shape::IndexArray => f.write_str("index array"),
            Shape::FloatArray => f.write_str("float32 array"),
            Shape::VertexAttribute => f.write_str("vertex attribute"),
            Shape::BlendState => f.write_str("blend state"),
        }
    }
}

/// Width of the indices in an INDEX_DATA record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexType {
    U16,
    U32,
}

impl IndexType {
    /// Parse the on-wire bit width.
    #[must_use]
    pub fn from_bits(bits: u8) -> Option<IndexType> {
        match bits {
            16 => Some(IndexType::U16),
            32 => Some(IndexType::U32),
            _ => None,
        }
    }

    #[must_use]
    pub fn bits(self) -> u8 {
        match self {
            IndexType::U16 => 16,
            IndexType::U32 => 32,
        }
    }

    /// Element width in bytes.
    #[must_use]
    pub fn width(self) -> u8 {
        self.bits() / 8
    }
}

/// Index buffer contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexData {
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl IndexData {
    #[must_use]
    pub fn index_type(&self) -> IndexType {
        match self {
            IndexData::U16(_) => IndexType::U16,
            IndexData::U32(_) => IndexType::U32,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            IndexData::U16(v) => v.len(),
            IndexData::U32(v) => v.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Describes how one vertex attribute is laid out in the vertex streams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexAttribute {
    /// Attribute name as the loader's shaders know it, e.g. `"hx_position"`.
    pub name: String,
    /// Number of float components (1-4).
    pub num_components: u8,
    /// Index of the VERTEX_STREAM_DATA record holding the attribute.
    pub stream_index: u8,
}

impl VertexAttribute {
    pub const MAX_COMPONENTS: u8 = 4;

    #[must_use]
    pub fn new(name: impl Into<String>, num_components: u8, stream_index: u8) -> Self {
        Self {
            name: name.into(),
            num_components,
            stream_index,
        }
    }
}

/// Blend state of a material. Absent fields are left to the loader's defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlendState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_factor: Option<BlendFactor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dst_factor: Option<BlendFactor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<BlendOperator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_factor_alpha: Option<BlendFactor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dst_factor_alpha: Option<BlendFactor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator_alpha: Option<BlendOperator>,
}

impl BlendState {
    /// Plain `src * srcAlpha + dst * (1 - srcAlpha)` alpha blending.
    #[must_use]
    pub fn alpha() -> Self {
        Self {
            src_factor: Some(BlendFactor::SourceAlpha),
            dst_factor: Some(BlendFactor::OneMinusSourceAlpha),
            operator: Some(BlendOperator::Add),
            ..Self::default()
        }
    }
}

/// The value carried by one property record.
///
/// Floats serialize as numbers, except infinities and NaN which become the
/// strings `"inf"`, `"-inf"` and `"nan"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    String(String),
    Bool(bool),
    UInt(u32),
    Float(#[serde(with = "json_float")] f32),
    Float2(#[serde(with = "json_float::array")] [f32; 2]),
    Float3(#[serde(with = "json_float::array")] [f32; 3]),
    Float4(#[serde(with = "json_float::array")] [f32; 4]),
    Mode(u8),
    IndexType(IndexType),
    Indices(IndexData),
    Floats(#[serde(with = "json_float::vec")] Vec<f32>),
    VertexAttribute(VertexAttribute),
    BlendState(BlendState),
}

impl PropertyValue {
    /// Short name of the value's kind, used in shape-mismatch errors.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            PropertyValue::String(_) => "string",
            PropertyValue::Bool(_) => "bool",
            PropertyValue::UInt(_) => "uint32",
            PropertyValue::Float(_) => "float32",
            PropertyValue::Float2(_) => "float32x2",
            PropertyValue::Float3(_) => "float32x3",
            PropertyValue::Float4(_) => "float32x4",
            PropertyValue::Mode(_) => "mode",
            PropertyValue::IndexType(_) => "index type",
            PropertyValue::Indices(_) => "index array",
            PropertyValue::Floats(_) => "float32 array",
            PropertyValue::VertexAttribute(_) => "vertex attribute",
            PropertyValue::BlendState(_) => "blend state",
        }
    }

    /// Whether this value has the layout `shape` describes.
    #[must_use]
    pub fn fits(&self, shape: Shape) -> bool {
        matches!(
            (shape, self),
            (Shape::String, PropertyValue::String(_))
                | (Shape::Bool, PropertyValue::Bool(_))
                | (Shape::UInt, PropertyValue::UInt(_))
                | (Shape::Float, PropertyValue::Float(_))
                | (Shape::Float2, PropertyValue::Float2(_))
                | (Shape::Float3, PropertyValue::Float3(_))
                | (Shape::Float4, PropertyValue::Float4(_))
                | (Shape::Mode(_), PropertyValue::Mode(_))
                | (Shape::IndexType, PropertyValue::IndexType(_))
                | (Shape::IndexArray, PropertyValue::Indices(_))
                | (Shape::FloatArray, PropertyValue::Floats(_))
                | (Shape::VertexAttribute, PropertyValue::VertexAttribute(_))
                | (Shape::BlendState, PropertyValue::BlendState(_))
        )
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_uint(&self) -> Option<u32> {
        match self {
            PropertyValue::UInt(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f32> {
        match self {
            PropertyValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_mode(&self) -> Option<u8> {
        match self {
            PropertyValue::Mode(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_indices(&self) -> Option<&IndexData> {
        match self {
            PropertyValue::Indices(data) => Some(data),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_floats(&self) -> Option<&[f32]> {
        match self {
            PropertyValue::Floats(data) => Some(data),
            _ => None,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<u32> for PropertyValue {
    fn from(value: u32) -> Self {
        PropertyValue::UInt(value)
    }
}

impl From<f32> for PropertyValue {
    fn from(value: f32) -> Self {
        PropertyValue::Float(value)
    }
}

impl From<[f32; 2]> for PropertyValue {
    fn from(value: [f32; 2]) -> Self {
        PropertyValue::Float2(value)
    }
}

impl From<[f32; 3]> for PropertyValue {
    fn from(value: [f32; 3]) -> Self {
        PropertyValue::Float3(value)
    }
}

impl From<[f32; 4]> for PropertyValue {
    fn from(value: [f32; 4]) -> Self {
        PropertyValue::Float4(value)
    }
}

impl From<IndexType> for PropertyValue {
    fn from(value: IndexType) -> Self {
        PropertyValue::IndexType(value)
    }
}

impl From<IndexData> for PropertyValue {
    fn from(value: IndexData) -> Self {
        PropertyValue::Indices(value)
    }
}

impl From<Vec<f32>> for PropertyValue {
    fn from(value: Vec<f32>) -> Self {
        PropertyValue::Floats(value)
    }
}

impl From<VertexAttribute> for PropertyValue {
    fn from(value: VertexAttribute) -> Self {
        PropertyValue::VertexAttribute(value)
    }
}

impl From<BlendState> for PropertyValue {
    fn from(value: BlendState) -> Self {
        PropertyValue::BlendState(value)
    }
}

/// Serde adapters that keep non-finite `f32` values representable in JSON.
mod json_float {
    use std::fmt;

    use serde::de::{self, Deserializer, Visitor};
    use serde::{Deserialize, Serialize, Serializer};

    struct Repr(f32);

    impl Serialize for Repr {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let v = self.0;
            if v.is_finite() {
                serializer.serialize_f32(v)
            } else if v.is_nan() {
                serializer.serialize_str("nan")
            } else if v > 0.0 {
                serializer.serialize_str("inf")
            } else {
                serializer.serialize_str("-inf")
            }
        }
    }

    struct ReprVisitor;

    impl Visitor<'_> for ReprVisitor {
        type Value = Repr;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a number or one of \"inf\", \"-inf\", \"nan\"")
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Repr, E> {
            Ok(Repr(v as f32))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Repr, E> {
            Ok(Repr(v as f32))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Repr, E> {
            Ok(Repr(v as f32))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Repr, E> {
            match v {
                "inf" => Ok(Repr(f32::INFINITY)),
                "-inf" => Ok(Repr(f32::NEG_INFINITY)),
                "nan" => Ok(Repr(f32::NAN)),
                _ => Err(E::invalid_value(de::Unexpected::Str(v), &self)),
            }
        }
    }

    impl<'de> Deserialize<'de> for Repr {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_any(ReprVisitor)
        }
    }

    // serde `with` signatures take the field by reference
    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S: Serializer>(v: &f32, serializer: S) -> Result<S::Ok, S::Error> {
        Repr(*v).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
        Repr::deserialize(deserializer).map(|r| r.0)
    }

    pub mod array {
        use super::{Deserializer, de};

        pub fn serialize<S: serde::Serializer, const N: usize>(
            v: &[f32; N],
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            super::vec::serialize(v, serializer)
        }

        pub fn deserialize<'de, D: Deserializer<'de>, const N: usize>(
            deserializer: D,
        ) -> Result<[f32; N], D::Error> {
            let values = super::vec::deserialize(deserializer)?;
            let len = values.len();
            <[f32; N]>::try_from(values).map_err(|_| {
                <D::Error as de::Error>::invalid_length(len, &"as many floats as the shape holds")
            })
        }
    }

    pub mod vec {
        use super::{Deserialize, Deserializer, Repr, Serializer};

        pub fn serialize<S: Serializer>(v: &[f32], serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_seq(v.iter().map(|&f| Repr(f)))
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f32>, D::Error> {
            Ok(Vec::<Repr>::deserialize(deserializer)?
                .into_iter()
                .map(|r| r.0)
                .collect())
        }
    }
}
