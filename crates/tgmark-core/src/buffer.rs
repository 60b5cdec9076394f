//! Append-only text buffer that tracks UTF-16 and byte offsets.

use crate::entity::utf16_len;

/// Accumulates output fragments and reports the running offsets.
///
/// Fragments are kept separately so the most recent one can be retracted
/// (see [`TextBuffer::pop_last`]); the final string is only assembled once in
/// [`TextBuffer::into_string`].
#[derive(Debug, Default)]
pub struct TextBuffer {
    parts: Vec<String>,
    utf16_offset: u32,
    byte_offset: usize,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a fragment. Empty fragments are not recorded.
    pub fn write(&mut self, fragment: impl Into<String>) {
        let fragment = fragment.into();
        if fragment.is_empty() {
            return;
        }
        self.utf16_offset += utf16_len(&fragment);
        self.byte_offset += fragment.len();
        self.parts.push(fragment);
    }

    /// Current position in UTF-16 code units.
    pub fn utf16_offset(&self) -> u32 {
        self.utf16_offset
    }

    /// Current position in bytes.
    pub fn byte_offset(&self) -> usize {
        self.byte_offset
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// The most recently written fragment.
    pub fn last(&self) -> Option<&str> {
        self.parts.last().map(String::as_str)
    }

    /// Removes and returns the most recently written fragment.
    pub fn pop_last(&mut self) -> Option<String> {
        let last = self.parts.pop()?;
        self.utf16_offset -= utf16_len(&last);
        self.byte_offset -= last.len();
        Some(last)
    }

    /// Number of consecutive `\n` at the end of the written text.
    pub fn trailing_newline_count(&self) -> usize {
        let mut count = 0;
        for part in self.parts.iter().rev() {
            let trimmed = part.trim_end_matches('\n');
            count += part.len() - trimmed.len();
            if !trimmed.is_empty() {
                break;
            }
        }
        count
    }

    pub fn into_string(self) -> String {
        self.parts.concat()
    }
}
