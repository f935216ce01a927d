//! Error types for `HxStream`

use thiserror::Error;

use crate::formats::tags::PropertyTag;
use crate::formats::types::Shape;

/// Formats the "last good tag" context of a decode error.
fn after(last_tag: Option<&PropertyTag>) -> String {
    match last_tag {
        Some(tag) => format!("after {tag}"),
        None => "before any record".to_string(),
    }
}

/// Formats the block/tag location of an encode error.
fn location(block: Option<&usize>, tag: Option<&PropertyTag>) -> String {
    let mut out = String::new();
    if let Some(block) = block {
        out.push_str(&format!(" block {block}"));
    }
    if let Some(tag) = tag {
        out.push_str(&format!(" {tag}"));
    }
    out
}

/// The error type for `HxStream` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ==================== Decode Errors ====================
    /// A tag value that this codec revision does not know.
    ///
    /// Tags inside a known namespace (0-109) cannot be skipped because their
    /// shape is unknown. Tags beyond every namespace are skipped unless the
    /// decoder runs in strict mode.
    #[error("unknown tag {tag} at byte {offset} ({})", after(.last_tag.as_ref()))]
    UnknownTag {
        /// The raw tag value read from the stream.
        tag: u16,
        /// Byte offset of the tag.
        offset: u64,
        /// The last record successfully decoded.
        last_tag: Option<PropertyTag>,
    },

    /// Fewer bytes remain than the current shape requires.
    #[error(
        "truncated stream at byte {offset}: needed {needed} bytes, {available} available ({})",
        after(.last_tag.as_ref())
    )]
    TruncatedStream {
        /// Byte offset of the short read.
        offset: u64,
        /// Number of bytes the read required.
        needed: usize,
        /// Number of bytes left in the stream.
        available: usize,
        /// The last record successfully decoded.
        last_tag: Option<PropertyTag>,
    },

    /// Structural violation: missing VERSION, block mix-ups, bad payloads.
    #[error("malformed document at byte {offset}: {reason} ({})", after(.last_tag.as_ref()))]
    MalformedDocument {
        /// Byte offset where the violation was detected.
        offset: u64,
        /// The last record successfully decoded.
        last_tag: Option<PropertyTag>,
        /// Description of the violation.
        reason: String,
    },

    /// The header names a codec revision this build cannot interpret.
    #[error("unsupported document version {version} at byte {offset} (supported: 1-{})", crate::formats::CURRENT_VERSION)]
    UnsupportedVersion {
        /// The version found in the header.
        version: u32,
        /// Byte offset of the VERSION payload.
        offset: u64,
    },

    // ==================== Encode Errors ====================
    /// A value whose shape disagrees with its tag.
    #[error("wrong shape for{} {tag}: expected {expected}, found {actual}", location(.block.as_ref(), None))]
    ShapeMismatch {
        /// Index of the object block, `None` for the header or a lone value.
        block: Option<usize>,
        /// The tag being encoded.
        tag: PropertyTag,
        /// The shape the tag requires.
        expected: Shape,
        /// The kind of value that was supplied.
        actual: &'static str,
    },

    /// A structurally invalid document or block handed to the encoder.
    #[error("cannot encode{}: {reason}", location(.block.as_ref(), .tag.as_ref()))]
    Encoding {
        /// Index of the object block, `None` for the header.
        block: Option<usize>,
        /// The tag being encoded, if any.
        tag: Option<PropertyTag>,
        /// Description of the problem.
        reason: String,
    },

    // ==================== Conversion Errors ====================
    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid file path.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// No converter exists between the two formats.
    #[error("unsupported conversion: {from} -> {to}")]
    UnsupportedConversion {
        /// Source format.
        from: String,
        /// Destination format.
        to: String,
    },
}

impl Error {
    /// Builds an [`Error::Encoding`] for a tag outside any block context.
    pub(crate) fn encoding(tag: Option<PropertyTag>, reason: impl Into<String>) -> Self {
        Error::Encoding {
            block: None,
            tag,
            reason: reason.into(),
        }
    }

    /// Attaches an object block index to an encode-side error.
    #[must_use]
    pub(crate) fn in_block(self, index: usize) -> Self {
        match self {
            Error::Encoding { tag, reason, .. } => Error::Encoding {
                block: Some(index),
                tag,
                reason,
            },
            Error::ShapeMismatch {
                tag,
                expected,
                actual,
                ..
            } => Error::ShapeMismatch {
                block: Some(index),
                tag,
                expected,
                actual,
            },
            other => other,
        }
    }

    /// Byte offset in the stream where a decode error was detected.
    #[must_use]
    pub fn offset(&self) -> Option<u64> {
        match self {
            Error::UnknownTag { offset, .. }
            | Error::TruncatedStream { offset, .. }
            | Error::MalformedDocument { offset, .. }
            | Error::UnsupportedVersion { offset, .. } => Some(*offset),
            _ => None,
        }
    }

    /// The last successfully decoded tag, for diagnosing version skew.
    #[must_use]
    pub fn last_tag(&self) -> Option<PropertyTag> {
        match self {
            Error::UnknownTag { last_tag, .. }
            | Error::TruncatedStream { last_tag, .. }
            | Error::MalformedDocument { last_tag, .. } => *last_tag,
            _ => None,
        }
    }

    /// Whether the error came from the decode side of the codec.
    #[must_use]
    pub fn is_decode_error(&self) -> bool {
        self.offset().is_some()
    }

    /// Whether the error came from handing the encoder an invalid value.
    #[must_use]
    pub fn is_encode_error(&self) -> bool {
        matches!(self, Error::ShapeMismatch { .. } | Error::Encoding { .. })
    }
}

/// A specialized Result type for `HxStream` operations.
pub type Result<T> = std::result::Result<T, Error>;
