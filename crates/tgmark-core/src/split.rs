//! Entity-preserving message splitting and trimming.
//!
//! All functions here keep entities anchored to the text they annotate:
//! whenever text is cut or trimmed, entities are clipped to the surviving
//! range and rebased onto it. Entities left empty are dropped.

use std::ops::Range;

use serde::Serialize;

use crate::entity::{Entity, clip_entities, utf16_len};

/// Telegram's maximum message length in UTF-16 code units.
pub const DEFAULT_MAX_MESSAGE_LENGTH: usize = 4096;

/// A slice of text with entities in its own coordinate space.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TextChunk {
    pub text: String,
    pub entities: Vec<Entity>,
}

impl TextChunk {
    pub fn new(text: impl Into<String>, entities: Vec<Entity>) -> Self {
        Self {
            text: text.into(),
            entities,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Character boundary: byte index and the UTF-16 offset at that index.
#[derive(Debug, Clone, Copy)]
struct Mark {
    byte: usize,
    units: u32,
}

/// Splits `text` into chunks of at most `max_len` UTF-16 code units.
///
/// Cuts prefer the position right after a newline. When a single line does not
/// fit, the chunk is cut at the last character boundary within budget; a lone
/// character wider than the budget still becomes its own chunk so the split
/// always makes progress. A `max_len` of 0 means [`DEFAULT_MAX_MESSAGE_LENGTH`].
///
/// The chunk texts concatenate back to `text` exactly.
pub fn split_entities(text: &str, entities: &[Entity], max_len: usize) -> Vec<TextChunk> {
    let max_len = normalize_max_len(max_len);
    if text.is_empty() {
        return Vec::new();
    }
    if utf16_len(text) as usize <= max_len as usize {
        return vec![TextChunk::new(text, entities.to_vec())];
    }

    let mut marks = Vec::with_capacity(text.len() + 1);
    // Indices into `marks` of the boundaries right after a newline.
    let mut breaks = Vec::new();
    let mut units = 0u32;
    for (byte, ch) in text.char_indices() {
        marks.push(Mark { byte, units });
        units += ch.len_utf16() as u32;
        if ch == '\n' {
            breaks.push(marks.len());
        }
    }
    marks.push(Mark {
        byte: text.len(),
        units,
    });

    let last = marks.len() - 1;
    let mut start = 0;
    let mut chunks = Vec::new();
    while start < last {
        let budget = marks[start].units.saturating_add(max_len);
        let end = if marks[last].units <= budget {
            last
        } else {
            breaks
                .iter()
                .copied()
                .skip_while(|&index| index <= start)
                .take_while(|&index| marks[index].units <= budget)
                .last()
                .unwrap_or_else(|| hard_cut(&marks, start, budget))
        };

        chunks.push(slice_text_entities(
            text,
            entities,
            marks[start].byte..marks[end].byte,
            marks[start].units..marks[end].units,
        ));
        start = end;
    }
    chunks
}

/// Last boundary after `start` that fits the budget, or the next boundary when
/// even one character does not fit.
fn hard_cut(marks: &[Mark], start: usize, budget: u32) -> usize {
    let fitting = marks[start + 1..].partition_point(|mark| mark.units <= budget);
    start + fitting.max(1)
}

fn normalize_max_len(max_len: usize) -> u32 {
    if max_len == 0 {
        DEFAULT_MAX_MESSAGE_LENGTH as u32
    } else {
        u32::try_from(max_len).unwrap_or(u32::MAX)
    }
}

/// Extracts `text[bytes]` with the entities overlapping `units`, rebased onto
/// the slice.
///
/// `bytes` and `units` must describe the same range of `text`.
pub fn slice_text_entities(
    text: &str,
    entities: &[Entity],
    bytes: Range<usize>,
    units: Range<u32>,
) -> TextChunk {
    let slice = text.get(bytes).unwrap_or_default();
    TextChunk::new(slice, clip_entities(entities, units.start, units.end))
}

/// Strips leading and trailing runs of `\n`, re-anchoring entities.
///
/// Text made only of newlines reduces to an empty chunk without entities.
pub fn trim_newlines(text: &str, entities: &[Entity]) -> TextChunk {
    trim_matching(text, entities, |ch| ch == '\n')
}

/// Strips leading and trailing spaces, tabs, `\r` and `\n`, re-anchoring
/// entities.
pub fn trim_whitespace(text: &str, entities: &[Entity]) -> TextChunk {
    trim_matching(text, entities, |ch| matches!(ch, ' ' | '\t' | '\n' | '\r'))
}

fn trim_matching(text: &str, entities: &[Entity], pattern: impl Fn(char) -> bool) -> TextChunk {
    let without_leading = text.trim_start_matches(&pattern);
    let trimmed = without_leading.trim_end_matches(&pattern);
    if trimmed.len() == text.len() {
        return TextChunk::new(text, entities.to_vec());
    }
    if trimmed.is_empty() {
        return TextChunk::default();
    }

    let leading = utf16_len(&text[..text.len() - without_leading.len()]);
    let kept = utf16_len(trimmed);
    TextChunk::new(trimmed, clip_entities(entities, leading, leading + kept))
}
