//! Sendable artifacts produced by [`crate::process_markdown`].

use std::fmt;

use serde::Serialize;
use tgmark_core::Entity;

/// Where an artifact came from in the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentSource {
    Text,
    CodeBlock,
    Diagram,
}

/// Telegram send method an artifact maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Text,
    File,
    Photo,
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::File => "file",
            Self::Photo => "photo",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextMessage {
    pub text: String,
    pub entities: Vec<Entity>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAttachment {
    pub file_name: String,
    pub data: Vec<u8>,
    /// Fence language for code blocks; `None` for diagram fallbacks.
    pub language: Option<String>,
    pub source: ContentSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoAttachment {
    pub file_name: String,
    pub data: Vec<u8>,
    /// Link to an editable copy of the diagram.
    pub caption: String,
    pub source: ContentSource,
}

/// One message to send, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(TextMessage),
    File(FileAttachment),
    Photo(PhotoAttachment),
}

impl Content {
    pub fn content_type(&self) -> ContentType {
        match self {
            Self::Text(_) => ContentType::Text,
            Self::File(_) => ContentType::File,
            Self::Photo(_) => ContentType::Photo,
        }
    }

    pub fn source(&self) -> ContentSource {
        match self {
            Self::Text(_) => ContentSource::Text,
            Self::File(file) => file.source,
            Self::Photo(photo) => photo.source,
        }
    }

    pub fn as_text(&self) -> Option<&TextMessage> {
        match self {
            Self::Text(message) => Some(message),
            _ => None,
        }
    }

    /// File name for attachments, `None` for text.
    pub fn file_name(&self) -> Option<&str> {
        match self {
            Self::Text(_) => None,
            Self::File(file) => Some(&file.file_name),
            Self::Photo(photo) => Some(&photo.file_name),
        }
    }

    /// Attachment bytes, `None` for text.
    pub fn data(&self) -> Option<&[u8]> {
        match self {
            Self::Text(_) => None,
            Self::File(file) => Some(&file.data),
            Self::Photo(photo) => Some(&photo.data),
        }
    }
}
