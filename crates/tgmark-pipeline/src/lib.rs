//! Markdown to an ordered list of Telegram messages.
//!
//! [`process_markdown`] converts with `tgmark-core`, pulls out diagrams and
//! long code blocks as attachments, and splits the remaining text into
//! messages that fit the protocol limit.

pub mod content;
pub mod mermaid;
pub mod process;
pub mod render;

pub use content::{
    Content, ContentSource, ContentType, FileAttachment, PhotoAttachment, TextMessage,
};
pub use mermaid::MermaidInkRenderer;
pub use process::{PipelineOptions, process_markdown};
pub use render::{DiagramRenderer, DisabledRenderer, RenderError, RenderedDiagram};
