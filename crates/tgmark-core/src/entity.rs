//! Message entities: typed spans over the plain output text.
//!
//! Telegram measures entity offsets and lengths in UTF-16 code units, not
//! bytes or scalar values. Every offset in this module is a UTF-16 count.

use serde::{Deserialize, Serialize};

/// Returns the length of `text` in UTF-16 code units.
///
/// Scalar values above the Basic Multilingual Plane take a surrogate pair
/// (2 units); everything else takes 1.
pub fn utf16_len(text: &str) -> u32 {
    text.chars().map(|ch| ch.len_utf16() as u32).sum()
}

/// Returns the length Telegram counts for `text`.
///
/// The delivered text carries no markup (styling lives in entities), so this
/// is just the UTF-16 length.
pub fn count_text(text: &str) -> u32 {
    utf16_len(text)
}

/// Payload-free discriminant of [`EntityKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Spoiler,
    Code,
    Pre,
    TextLink,
    CustomEmoji,
    Blockquote,
    ExpandableBlockquote,
}

impl EntityType {
    /// Wire name used by the Bot API.
    pub fn as_str(self) -> &'static str {
        match self {
            EntityType::Bold => "bold",
            EntityType::Italic => "italic",
            EntityType::Underline => "underline",
            EntityType::Strikethrough => "strikethrough",
            EntityType::Spoiler => "spoiler",
            EntityType::Code => "code",
            EntityType::Pre => "pre",
            EntityType::TextLink => "text_link",
            EntityType::CustomEmoji => "custom_emoji",
            EntityType::Blockquote => "blockquote",
            EntityType::ExpandableBlockquote => "expandable_blockquote",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entity kind together with its kind-specific payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntityKind {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Spoiler,
    Code,
    Pre {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
    },
    TextLink {
        url: String,
    },
    CustomEmoji {
        custom_emoji_id: String,
    },
    Blockquote,
    ExpandableBlockquote,
}

impl EntityKind {
    /// Builds the kind for a type that carries no payload.
    ///
    /// Returns `None` for `Pre`, `TextLink` and `CustomEmoji`.
    pub fn plain(entity_type: EntityType) -> Option<Self> {
        match entity_type {
            EntityType::Bold => Some(EntityKind::Bold),
            EntityType::Italic => Some(EntityKind::Italic),
            EntityType::Underline => Some(EntityKind::Underline),
            EntityType::Strikethrough => Some(EntityKind::Strikethrough),
            EntityType::Spoiler => Some(EntityKind::Spoiler),
            EntityType::Code => Some(EntityKind::Code),
            EntityType::Blockquote => Some(EntityKind::Blockquote),
            EntityType::ExpandableBlockquote => Some(EntityKind::ExpandableBlockquote),
            EntityType::Pre | EntityType::TextLink | EntityType::CustomEmoji => None,
        }
    }

    pub fn entity_type(&self) -> EntityType {
        match self {
            EntityKind::Bold => EntityType::Bold,
            EntityKind::Italic => EntityType::Italic,
            EntityKind::Underline => EntityType::Underline,
            EntityKind::Strikethrough => EntityType::Strikethrough,
            EntityKind::Spoiler => EntityType::Spoiler,
            EntityKind::Code => EntityType::Code,
            EntityKind::Pre { .. } => EntityType::Pre,
            EntityKind::TextLink { .. } => EntityType::TextLink,
            EntityKind::CustomEmoji { .. } => EntityType::CustomEmoji,
            EntityKind::Blockquote => EntityType::Blockquote,
            EntityKind::ExpandableBlockquote => EntityType::ExpandableBlockquote,
        }
    }
}

/// A formatting span over the plain text, in UTF-16 code units.
///
/// Serializes to the Bot API `MessageEntity` shape:
/// `{"type": "text_link", "offset": 0, "length": 4, "url": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(flatten)]
    pub kind: EntityKind,
    pub offset: u32,
    pub length: u32,
}

impl Entity {
    pub fn new(kind: EntityKind, offset: u32, length: u32) -> Self {
        Self {
            kind,
            offset,
            length,
        }
    }

    pub fn entity_type(&self) -> EntityType {
        self.kind.entity_type()
    }

    /// Exclusive end offset.
    pub fn end(&self) -> u32 {
        self.offset.saturating_add(self.length)
    }

    pub fn url(&self) -> Option<&str> {
        match &self.kind {
            EntityKind::TextLink { url } => Some(url),
            _ => None,
        }
    }

    pub fn language(&self) -> Option<&str> {
        match &self.kind {
            EntityKind::Pre { language } => language.as_deref(),
            _ => None,
        }
    }

    pub fn custom_emoji_id(&self) -> Option<&str> {
        match &self.kind {
            EntityKind::CustomEmoji { custom_emoji_id } => Some(custom_emoji_id),
            _ => None,
        }
    }

    /// Clips the entity to the window `[start, end)` and rebases it so the
    /// window starts at offset 0.
    ///
    /// Returns `None` when nothing of the entity remains inside the window.
    pub fn clip(&self, start: u32, end: u32) -> Option<Entity> {
        let clipped_start = self.offset.max(start);
        let clipped_end = self.end().min(end);
        (clipped_end > clipped_start).then(|| Entity {
            kind: self.kind.clone(),
            offset: clipped_start - start,
            length: clipped_end - clipped_start,
        })
    }

    /// Returns the slice of `text` this entity covers, if it lands on
    /// character boundaries.
    pub fn slice<'a>(&self, text: &'a str) -> Option<&'a str> {
        let start = byte_index(text, self.offset)?;
        let end = byte_index(text, self.end())?;
        text.get(start..end)
    }
}

/// Clips every entity to `[start, end)`, dropping the ones left empty.
pub fn clip_entities(entities: &[Entity], start: u32, end: u32) -> Vec<Entity> {
    entities
        .iter()
        .filter_map(|entity| entity.clip(start, end))
        .collect()
}

/// Converts a UTF-16 offset into a byte index into `text`.
///
/// Returns `None` when the offset falls inside a surrogate pair or past the end.
pub fn byte_index(text: &str, utf16_offset: u32) -> Option<usize> {
    let mut units = 0u32;
    for (index, ch) in text.char_indices() {
        if units == utf16_offset {
            return Some(index);
        }
        if units > utf16_offset {
            return None;
        }
        units += ch.len_utf16() as u32;
    }
    (units == utf16_offset).then_some(text.len())
}
