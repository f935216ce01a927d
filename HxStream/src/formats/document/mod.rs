//! HX document model and stream framing
//!
//! A document is a header block (VERSION first) followed by object blocks.
//! Every block is terminated by a NULL tag, and one more NULL where the next
//! block would start marks the end of the document.

mod reader;
mod writer;

pub use reader::{decode_document, decode_document_with, read_document};
pub use writer::{encode_document, write_document};

use serde::{Deserialize, Serialize};

use super::modes::LightingMode;
use super::tags::{Category, PropertyTag};
use super::types::PropertyValue;

/// One `(tag, value)` pair.
///
/// Construction does not check the value against the tag's shape; the
/// encoder does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub tag: PropertyTag,
    pub value: PropertyValue,
}

impl PropertyRecord {
    #[must_use]
    pub fn new(tag: PropertyTag, value: impl Into<PropertyValue>) -> Self {
        Self {
            tag,
            value: value.into(),
        }
    }
}

/// An ordered run of records describing one scene object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectBlock {
    pub records: Vec<PropertyRecord>,
}

impl ObjectBlock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tag: PropertyTag, value: impl Into<PropertyValue>) {
        self.records.push(PropertyRecord::new(tag, value));
    }

    /// Builder form of [`ObjectBlock::push`].
    #[must_use]
    pub fn with(mut self, tag: PropertyTag, value: impl Into<PropertyValue>) -> Self {
        self.push(tag, value);
        self
    }

    /// The first value recorded for `tag`.
    #[must_use]
    pub fn get(&self, tag: PropertyTag) -> Option<&PropertyValue> {
        self.records.iter().find(|r| r.tag == tag).map(|r| &r.value)
    }

    /// Every value recorded for `tag`, in stream order.
    pub fn get_all(&self, tag: PropertyTag) -> impl Iterator<Item = &PropertyValue> {
        self.records.iter().filter(move |r| r.tag == tag).map(|r| &r.value)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The object category implied by the block's records.
    ///
    /// `None` if no record defines a category or the records mix categories.
    #[must_use]
    pub fn category(&self) -> Option<Category> {
        self.records
            .iter()
            .try_fold(None, |current, record| admit(current, record.tag))
            .ok()
            .flatten()
    }
}

/// A decoded or to-be-encoded HX document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Header (meta) records, VERSION first.
    pub header: ObjectBlock,
    /// Object blocks in stream order.
    pub blocks: Vec<ObjectBlock>,
}

impl Document {
    /// Start a document whose header holds only VERSION.
    #[must_use]
    pub fn new(version: u32) -> Self {
        Self {
            header: ObjectBlock::new().with(PropertyTag::Version, version),
            blocks: Vec::new(),
        }
    }

    pub fn push_block(&mut self, block: ObjectBlock) {
        self.blocks.push(block);
    }

    #[must_use]
    pub fn version(&self) -> Option<u32> {
        self.header.get(PropertyTag::Version).and_then(PropertyValue::as_uint)
    }

    #[must_use]
    pub fn generator(&self) -> Option<&str> {
        self.header.get(PropertyTag::Generator).and_then(PropertyValue::as_str)
    }

    /// Whether array payloads are aligned to 4 bytes. Off unless the header says so.
    #[must_use]
    pub fn pad_arrays(&self) -> bool {
        self.header
            .get(PropertyTag::PadArrays)
            .and_then(PropertyValue::as_bool)
            .unwrap_or(false)
    }

    #[must_use]
    pub fn default_scene_index(&self) -> Option<u32> {
        self.header
            .get(PropertyTag::DefaultSceneIndex)
            .and_then(PropertyValue::as_uint)
    }

    #[must_use]
    pub fn lighting_mode(&self) -> Option<LightingMode> {
        self.header
            .get(PropertyTag::LightingMode)
            .and_then(PropertyValue::as_mode)
            .and_then(|v| LightingMode::try_from(v).ok())
    }

    /// Counts for display by `hxstream inspect`.
    #[must_use]
    pub fn summary(&self) -> DocumentSummary {
        let mut categories: Vec<(Category, usize)> = Vec::new();
        let mut uncategorized = 0;
        for block in &self.blocks {
            match block.category() {
                Some(category) => match categories.iter_mut().find(|(c, _)| *c == category) {
                    Some((_, count)) => *count += 1,
                    None => categories.push((category, 1)),
                },
                None => uncategorized += 1,
            }
        }
        categories.sort_by_key(|(c, _)| Category::ALL.iter().position(|a| a == c));

        DocumentSummary {
            version: self.version(),
            generator: self.generator().map(str::to_string),
            pad_arrays: self.pad_arrays(),
            block_count: self.blocks.len(),
            record_count: self.header.len() + self.blocks.iter().map(ObjectBlock::len).sum::<usize>(),
            categories,
            uncategorized,
        }
    }
}

/// Block and record counts of a [`Document`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentSummary {
    pub version: Option<u32>,
    pub generator: Option<String>,
    pub pad_arrays: bool,
    pub block_count: usize,
    /// Records across the header and every block.
    pub record_count: usize,
    /// Number of blocks per category, in namespace order.
    pub categories: Vec<(Category, usize)>,
    /// Blocks whose records do not imply a single category.
    pub uncategorized: usize,
}

/// Decoder settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Skip records whose tag lies beyond every known namespace instead of
    /// failing with [`crate::Error::UnknownTag`].
    pub skip_unknown_tags: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            skip_unknown_tags: true,
        }
    }
}

impl DecodeOptions {
    /// Fail on every tag missing from the table.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            skip_unknown_tags: false,
        }
    }
}

/// Folds one record's tag into the category of the block being built.
///
/// Common tags fit anywhere. Lights and cameras are scene nodes, so a node
/// block can be refined into either, and both accept node tags.
pub(crate) fn admit(
    current: Option<Category>,
    tag: PropertyTag,
) -> std::result::Result<Option<Category>, String> {
    let category = tag.category();
    match category {
        Category::Common => Ok(current),
        Category::Header => Err(format!("header tag {tag} inside an object block")),
        Category::BlendState => Err(format!("{tag} outside BLEND_STATE")),
        _ => match current {
            None => Ok(Some(category)),
            Some(current) if current == category => Ok(Some(current)),
            Some(Category::Node) if matches!(category, Category::Light | Category::Camera) => {
                Ok(Some(category))
            }
            Some(current @ (Category::Light | Category::Camera)) if category == Category::Node => {
                Ok(Some(current))
            }
            Some(current) => Err(format!("{category} tag {tag} inside a {current} block")),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::modes::{LightingMode, TextureWrapMode};

    #[test]
    fn test_admit_categories() {
        assert_eq!(admit(None, PropertyTag::Name), Ok(None));
        assert_eq!(admit(None, PropertyTag::NumVertices), Ok(Some(Category::Mesh)));
        assert_eq!(
            admit(Some(Category::Material), PropertyTag::Color),
            Ok(Some(Category::Material))
        );
        assert_eq!(
            admit(Some(Category::Node), PropertyTag::Intensity),
            Ok(Some(Category::Light))
        );
        assert_eq!(
            admit(Some(Category::Camera), PropertyTag::Position),
            Ok(Some(Category::Camera))
        );
        assert!(admit(Some(Category::Mesh), PropertyTag::Roughness).is_err());
        assert!(admit(Some(Category::Light), PropertyTag::Fov).is_err());
        assert!(admit(None, PropertyTag::Generator).is_err());
        assert!(admit(Some(Category::Material), PropertyTag::BlendStateOperator).is_err());
    }

    #[test]
    fn test_block_category() {
        let light = ObjectBlock::new()
            .with(PropertyTag::Name, "sun")
            .with(PropertyTag::Position, [0.0f32, 10.0, 0.0])
            .with(PropertyTag::Intensity, 3.0f32);
        assert_eq!(light.category(), Some(Category::Light));

        let common_only = ObjectBlock::new().with(PropertyTag::Name, "orphan");
        assert_eq!(common_only.category(), None);

        let mixed = ObjectBlock::new()
            .with(PropertyTag::NumVertices, 3u32)
            .with(PropertyTag::WrapMode, TextureWrapMode::Repeat);
        assert_eq!(mixed.category(), None);
    }

    #[test]
    fn test_header_accessors() {
        let mut doc = Document::new(1);
        assert_eq!(doc.version(), Some(1));
        assert!(!doc.pad_arrays());
        assert_eq!(doc.generator(), None);

        doc.header.push(PropertyTag::Generator, "tool-x");
        doc.header.push(PropertyTag::PadArrays, true);
        doc.header.push(PropertyTag::LightingMode, LightingMode::Dynamic);
        assert_eq!(doc.generator(), Some("tool-x"));
        assert!(doc.pad_arrays());
        assert_eq!(doc.lighting_mode(), Some(LightingMode::Dynamic));
    }

    #[test]
    fn test_get_all_keeps_order() {
        let block = ObjectBlock::new()
            .with(PropertyTag::VertexStreamData, vec![1.0f32])
            .with(PropertyTag::NumVertices, 1u32)
            .with(PropertyTag::VertexStreamData, vec![2.0f32]);
        let streams: Vec<_> = block.get_all(PropertyTag::VertexStreamData).collect();
        assert_eq!(streams.len(), 2);
        assert_eq!(streams[1].as_floats(), Some(&[2.0f32][..]));
    }

    #[test]
    fn test_summary_counts() {
        let mut doc = Document::new(1);
        doc.push_block(ObjectBlock::new().with(PropertyTag::Alpha, 1.0f32));
        doc.push_block(ObjectBlock::new().with(PropertyTag::NumVertices, 3u32));
        doc.push_block(ObjectBlock::new().with(PropertyTag::Roughness, 0.5f32));
        let summary = doc.summary();
        assert_eq!(summary.block_count, 3);
        assert_eq!(summary.record_count, 4);
        assert_eq!(
            summary.categories,
            vec![(Category::Mesh, 1), (Category::Material, 2)]
        );
    }
}
