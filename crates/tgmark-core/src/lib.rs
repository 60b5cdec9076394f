//! Markdown to Telegram plain text + message entities.
//!
//! [`convert`] turns Markdown into the `(text, entities)` pair the Bot API
//! expects, with entity offsets in UTF-16 code units. [`split_entities`] and
//! [`trim_newlines`] cut that pair into sendable messages without breaking
//! entities.

pub mod buffer;
pub mod config;
pub mod entity;
pub mod filename;
pub mod math;
pub mod preprocess;
pub mod scope;
pub mod segment;
pub mod split;
pub mod walker;

use std::borrow::Cow;

pub use config::{Config, RenderConfig, Symbols};
pub use entity::{Entity, EntityKind, EntityType, count_text, utf16_len};
pub use filename::infer_filename;
pub use segment::{Segment, SegmentKind};
pub use split::{
    DEFAULT_MAX_MESSAGE_LENGTH, TextChunk, slice_text_entities, split_entities, trim_newlines,
    trim_whitespace,
};

use crate::math::UnicodeMath;

/// Output of a conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversion {
    pub text: String,
    pub entities: Vec<Entity>,
    /// Code and diagram blocks, in document order.
    pub segments: Vec<Segment>,
}

/// Converts Markdown to plain text and entities.
pub fn convert(markdown: &str, config: &RenderConfig) -> (String, Vec<Entity>) {
    let conversion = convert_with_segments(markdown, config);
    (conversion.text, conversion.entities)
}

/// Converts Markdown to plain text and entities, also reporting where code
/// and diagram blocks landed.
pub fn convert_with_segments(markdown: &str, config: &RenderConfig) -> Conversion {
    let source: Cow<'_, str> = if config.latex_escape {
        Cow::Owned(preprocess::escape_math(markdown, &UnicodeMath))
    } else {
        Cow::Borrowed(markdown)
    };
    let source = preprocess::mark_spoilers(&source);

    let conversion = walker::render(&source, config);
    tracing::debug!(
        input_bytes = markdown.len(),
        text_units = utf16_len(&conversion.text),
        entities = conversion.entities.len(),
        segments = conversion.segments.len(),
        "converted markdown"
    );
    conversion
}
