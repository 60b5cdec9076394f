//! Code and diagram block ranges recorded during conversion.

use std::ops::Range;

/// Fenced-code language that marks a diagram block (compared case-insensitively).
pub const DIAGRAM_LANGUAGE: &str = "mermaid";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    CodeBlock,
    Diagram,
}

impl SegmentKind {
    pub fn for_language(language: &str) -> Self {
        if language.eq_ignore_ascii_case(DIAGRAM_LANGUAGE) {
            SegmentKind::Diagram
        } else {
            SegmentKind::CodeBlock
        }
    }
}

/// Where a code or diagram block landed in the output text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    /// Byte range in the output text.
    pub byte_range: Range<usize>,
    /// UTF-16 range in the output text.
    pub utf16_range: Range<u32>,
    /// Language tag (first word of the info string, before any comma).
    pub language: String,
    /// Block source with one trailing newline removed.
    pub raw_source: String,
}

impl Segment {
    pub fn line_count(&self) -> usize {
        self.raw_source.matches('\n').count() + 1
    }
}

#[derive(Debug, Default)]
pub(crate) struct SegmentRecorder {
    segments: Vec<Segment>,
}

impl SegmentRecorder {
    pub(crate) fn record(
        &mut self,
        language: String,
        raw_source: String,
        byte_range: Range<usize>,
        utf16_range: Range<u32>,
    ) {
        self.segments.push(Segment {
            kind: SegmentKind::for_language(&language),
            byte_range,
            utf16_range,
            language,
            raw_source,
        });
    }

    pub(crate) fn into_segments(self) -> Vec<Segment> {
        self.segments
    }
}
