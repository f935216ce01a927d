//! Property tag table - the shared vocabulary of the HX property stream
//!
//! Tag values are a wire contract with the HX loader and must never be
//! renumbered. Gaps inside each namespace are reserved for future tags.

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use super::types::Shape;

/// Identifies one field of one object category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u16)]
pub enum PropertyTag {
    // common properties
    Null = 0,
    Name = 1,
    Url = 2,
    CastShadows = 3,
    Color = 4,
    ColorAlpha = 5,

    // header (meta) properties
    Version = 10,
    Generator = 11,
    PadArrays = 12,
    DefaultSceneIndex = 13,
    LightingMode = 14,

    // mesh properties
    NumVertices = 20,
    NumIndices = 21,
    ElementType = 22,
    IndexType = 23,
    IndexData = 24,
    VertexAttribute = 25,
    VertexStreamData = 26,

    // scene node / entity properties
    Position = 30,
    Rotation = 31,
    Scale = 32,
    Visible = 33,

    // light properties
    Intensity = 40,
    Radius = 41,
    SpotAngles = 42,

    // texture properties
    WrapMode = 50,
    Filter = 51,

    // material properties
    UseVertexColors = 60,
    Alpha = 61,
    EmissiveColor = 62,
    SpecularMapMode = 63,
    Metallicness = 64,
    SpecularReflectance = 65,
    Roughness = 66,
    RoughnessRange = 67,
    AlphaThreshold = 68,
    LightingModel = 69,
    CullMode = 70,
    BlendState = 71,
    WriteDepth = 72,
    WriteColor = 73,

    // blend state properties (only valid nested inside BLEND_STATE)
    BlendStateSrcFactor = 80,
    BlendStateDstFactor = 81,
    BlendStateOperator = 82,
    BlendStateSrcFactorAlpha = 83,
    BlendStateDstFactorAlpha = 84,
    BlendStateOperatorAlpha = 85,

    // camera properties
    ClipDistances = 90,
    Fov = 91,

    // skeleton / bone properties
    InverseBindPose = 100,
}

/// The object category a tag belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Common,
    Header,
    Mesh,
    Node,
    Light,
    Texture,
    Material,
    BlendState,
    Camera,
    Skeleton,
}

impl Category {
    /// Every category, in namespace order.
    pub const ALL: [Category; 10] = [
        Category::Common,
        Category::Header,
        Category::Mesh,
        Category::Node,
        Category::Light,
        Category::Texture,
        Category::Material,
        Category::BlendState,
        Category::Camera,
        Category::Skeleton,
    ];

    /// The reserved tag range of this category's namespace.
    #[must_use]
    pub fn range(self) -> RangeInclusive<u16> {
        match self {
            Category::Common => 0..=9,
            Category::Header => 10..=19,
            Category::Mesh => 20..=29,
            Category::Node => 30..=39,
            Category::Light => 40..=49,
            Category::Texture => 50..=59,
            Category::Material => 60..=79,
            Category::BlendState => 80..=89,
            Category::Camera => 90..=99,
            Category::Skeleton => 100..=109,
        }
    }

    /// Classify a raw tag that is missing from [`TAG_TABLE`].
    ///
    /// Returns `None` when the value lies beyond every namespace, in which
    /// case the category cannot be determined and the record is skippable.
    #[must_use]
    pub fn of_raw(raw: u16) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.range().contains(&raw))
    }

    /// Lower-case display name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Category::Common => "common",
            Category::Header => "header",
            Category::Mesh => "mesh",
            Category::Node => "node",
            Category::Light => "light",
            Category::Texture => "texture",
            Category::Material => "material",
            Category::BlendState => "blend state",
            Category::Camera => "camera",
            Category::Skeleton => "skeleton",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Static description of one tag: its name, category and wire shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagInfo {
    pub tag: PropertyTag,
    pub name: &'static str,
    pub category: Category,
    pub shape: Shape,
}

const fn info(tag: PropertyTag, name: &'static str, category: Category, shape: Shape) -> TagInfo {
    TagInfo { tag, name, category, shape }
}

use Category as C;
use PropertyTag as T;

/// The complete tag table, sorted by tag value.
pub static TAG_TABLE: [TagInfo; 50] = [
    info(T::Null, "NULL", C::Common, Shape::Terminator),
    info(T::Name, "NAME", C::Common, Shape::String),
    info(T::Url, "URL", C::Common, Shape::String),
    info(T::CastShadows, "CAST_SHADOWS", C::Common, Shape::Bool),
    info(T::Color, "COLOR", C::Common, Shape::Float4),
    info(T::ColorAlpha, "COLOR_ALPHA", C::Common, Shape::Float),
    info(T::Version, "VERSION", C::Header, Shape::UInt),
    info(T::Generator, "GENERATOR", C::Header, Shape::String),
    info(T::PadArrays, "PAD_ARRAYS", C::Header, Shape::Bool),
    info(T::DefaultSceneIndex, "DEFAULT_SCENE_INDEX", C::Header, Shape::UInt),
    info(T::LightingMode, "LIGHTING_MODE", C::Header, Shape::Mode(3)),
    info(T::NumVertices, "NUM_VERTICES", C::Mesh, Shape::UInt),
    info(T::NumIndices, "NUM_INDICES", C::Mesh, Shape::UInt),
    info(T::ElementType, "ELEMENT_TYPE", C::Mesh, Shape::Mode(7)),
    info(T::IndexType, "INDEX_TYPE", C::Mesh, Shape::IndexType),
    info(T::IndexData, "INDEX_DATA", C::Mesh, Shape::IndexArray),
    info(T::VertexAttribute, "VERTEX_ATTRIBUTE", C::Mesh, Shape::VertexAttribute),
    info(T::VertexStreamData, "VERTEX_STREAM_DATA", C::Mesh, Shape::FloatArray),
    info(T::Position, "POSITION", C::Node, Shape::Float3),
    info(T::Rotation, "ROTATION", C::Node, Shape::Float4),
    info(T::Scale, "SCALE", C::Node, Shape::Float3),
    info(T::Visible, "VISIBLE", C::Node, Shape::Bool),
    info(T::Intensity, "INTENSITY", C::Light, Shape::Float),
    info(T::Radius, "RADIUS", C::Light, Shape::Float),
    info(T::SpotAngles, "SPOT_ANGLES", C::Light, Shape::Float2),
    info(T::WrapMode, "WRAP_MODE", C::Texture, Shape::Mode(2)),
    info(T::Filter, "FILTER", C::Texture, Shape::Mode(6)),
    info(T::UseVertexColors, "USE_VERTEX_COLORS", C::Material, Shape::Bool),
    info(T::Alpha, "ALPHA", C::Material, Shape::Float),
    info(T::EmissiveColor, "EMISSIVE_COLOR", C::Material, Shape::Float3),
    info(T::SpecularMapMode, "SPECULAR_MAP_MODE", C::Material, Shape::Mode(4)),
    info(T::Metallicness, "METALLICNESS", C::Material, Shape::Float),
    info(T::SpecularReflectance, "SPECULAR_REFLECTANCE", C::Material, Shape::Float),
    info(T::Roughness, "ROUGHNESS", C::Material, Shape::Float),
    info(T::RoughnessRange, "ROUGHNESS_RANGE", C::Material, Shape::Float2),
    info(T::AlphaThreshold, "ALPHA_THRESHOLD", C::Material, Shape::Float),
    info(T::LightingModel, "LIGHTING_MODEL", C::Material, Shape::Mode(5)),
    info(T::CullMode, "CULL_MODE", C::Material, Shape::Mode(4)),
    info(T::BlendState, "BLEND_STATE", C::Material, Shape::BlendState),
    info(T::WriteDepth, "WRITE_DEPTH", C::Material, Shape::Bool),
    info(T::WriteColor, "WRITE_COLOR", C::Material, Shape::Bool),
    info(T::BlendStateSrcFactor, "BLEND_STATE_SRC_FACTOR", C::BlendState, Shape::Mode(13)),
    info(T::BlendStateDstFactor, "BLEND_STATE_DST_FACTOR", C::BlendState, Shape::Mode(13)),
    info(T::BlendStateOperator, "BLEND_STATE_OPERATOR", C::BlendState, Shape::Mode(3)),
    info(T::BlendStateSrcFactorAlpha, "BLEND_STATE_SRC_FACTOR_ALPHA", C::BlendState, Shape::Mode(13)),
    info(T::BlendStateDstFactorAlpha, "BLEND_STATE_DST_FACTOR_ALPHA", C::BlendState, Shape::Mode(13)),
    info(T::BlendStateOperatorAlpha, "BLEND_STATE_OPERATOR_ALPHA", C::BlendState, Shape::Mode(3)),
    info(T::ClipDistances, "CLIP_DISTANCES", C::Camera, Shape::Float2),
    info(T::Fov, "FOV", C::Camera, Shape::Float),
    info(T::InverseBindPose, "INVERSE_BIND_POSE", C::Skeleton, Shape::FloatArray),
];

impl PropertyTag {
    /// Look up a raw wire value in the tag table.
    #[must_use]
    pub fn from_u16(raw: u16) -> Option<PropertyTag> {
        TAG_TABLE
            .binary_search_by_key(&raw, |info| info.tag as u16)
            .ok()
            .map(|index| TAG_TABLE[index].tag)
    }

    /// Look up a tag by its symbolic name (e.g. `"INDEX_DATA"`).
    #[must_use]
    pub fn from_name(name: &str) -> Option<PropertyTag> {
        TAG_TABLE
            .iter()
            .find(|info| info.name.eq_ignore_ascii_case(name))
            .map(|info| info.tag)
    }

    /// The table entry for this tag.
    #[must_use]
    pub fn info(self) -> &'static TagInfo {
        let index = TAG_TABLE.partition_point(|info| (info.tag as u16) < self as u16);
        &TAG_TABLE[index]
    }

    #[must_use]
    pub fn value(self) -> u16 {
        self as u16
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        self.info().name
    }

    #[must_use]
    pub fn category(self) -> Category {
        self.info().category
    }

    #[must_use]
    pub fn shape(self) -> Shape {
        self.info().shape
    }
}

impl fmt::Display for PropertyTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl From<PropertyTag> for u16 {
    fn from(tag: PropertyTag) -> u16 {
        tag as u16
    }
}

impl TryFrom<u16> for PropertyTag {
    type Error = u16;

    fn try_from(raw: u16) -> std::result::Result<Self, Self::Error> {
        PropertyTag::from_u16(raw).ok_or(raw)
    }
}
