//! Markdown to an ordered list of sendable messages.

use std::ops::Range;
use std::time::Duration;

use tgmark_core::{
    Config, Conversion, DEFAULT_MAX_MESSAGE_LENGTH, RenderConfig, Segment, SegmentKind,
    convert_with_segments, infer_filename, slice_text_entities, split_entities, trim_newlines,
    utf16_len,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::content::{Content, ContentSource, FileAttachment, PhotoAttachment, TextMessage};
use crate::render::{DiagramRenderer, RenderError, RenderedDiagram};

const DIAGRAM_IMAGE_NAME: &str = "mermaid.webp";
const DIAGRAM_FALLBACK_NAME: &str = "invalid_mermaid.txt";
const DEFAULT_CODE_LANGUAGE: &str = "txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Maximum UTF-16 length of one text message. 0 means the protocol limit.
    pub max_message_length: usize,
    /// Code blocks with more lines than this become file attachments.
    pub code_file_line_threshold: usize,
    /// Upper bound for one diagram render; `None` waits indefinitely.
    pub render_timeout: Option<Duration>,
    pub render: RenderConfig,
}

impl PipelineOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_message_length: config.pipeline.max_message_length,
            code_file_line_threshold: config.pipeline.code_file_line_threshold,
            render_timeout: config.pipeline.render_timeout(),
            render: config.render.clone(),
        }
    }

    fn message_length(&self) -> usize {
        if self.max_message_length == 0 {
            DEFAULT_MAX_MESSAGE_LENGTH
        } else {
            self.max_message_length
        }
    }

    fn extracts(&self, segment: &Segment) -> bool {
        match segment.kind {
            SegmentKind::Diagram => true,
            SegmentKind::CodeBlock => segment.line_count() > self.code_file_line_threshold,
        }
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Converts `markdown` and cuts it into messages.
///
/// Diagrams and long code blocks become attachments placed where they appeared;
/// the text around them is split to fit `max_message_length`. Rendering
/// failures, timeouts and cancellation fall back to sending the diagram
/// source as a file, so this never fails.
pub async fn process_markdown<R: DiagramRenderer>(
    markdown: &str,
    options: &PipelineOptions,
    renderer: &R,
    cancel: &CancellationToken,
) -> Vec<Content> {
    let conversion = convert_with_segments(markdown, &options.render);
    let max_len = options.message_length();

    let mut contents = Vec::new();
    let mut bytes = 0;
    let mut units = 0;
    for segment in conversion.segments.iter().filter(|s| options.extracts(s)) {
        push_text(
            &mut contents,
            &conversion,
            bytes..segment.byte_range.start,
            units..segment.utf16_range.start,
            max_len,
        );

        let content = match segment.kind {
            SegmentKind::Diagram => {
                diagram_content(segment, renderer, options.render_timeout, cancel).await
            }
            SegmentKind::CodeBlock => code_file(segment),
        };
        contents.push(content);

        bytes = segment.byte_range.end;
        units = segment.utf16_range.end;
    }
    push_text(
        &mut contents,
        &conversion,
        bytes..conversion.text.len(),
        units..utf16_len(&conversion.text),
        max_len,
    );

    debug!(contents = contents.len(), "processed markdown");
    contents
}

fn push_text(
    contents: &mut Vec<Content>,
    conversion: &Conversion,
    bytes: Range<usize>,
    units: Range<u32>,
    max_len: usize,
) {
    if bytes.is_empty() {
        return;
    }
    let slice = slice_text_entities(&conversion.text, &conversion.entities, bytes, units);
    let slice = trim_newlines(&slice.text, &slice.entities);
    if slice.is_empty() {
        return;
    }

    for chunk in split_entities(&slice.text, &slice.entities, max_len) {
        let chunk = trim_newlines(&chunk.text, &chunk.entities);
        if chunk.is_empty() {
            continue;
        }
        contents.push(Content::Text(TextMessage {
            text: chunk.text,
            entities: chunk.entities,
        }));
    }
}

fn code_file(segment: &Segment) -> Content {
    let language = if segment.language.is_empty() {
        DEFAULT_CODE_LANGUAGE.to_string()
    } else {
        segment.language.clone()
    };
    let file_name = infer_filename(&segment.raw_source, &language);
    debug!(
        %file_name,
        lines = segment.line_count(),
        "sending code block as file"
    );

    Content::File(FileAttachment {
        file_name,
        data: segment.raw_source.clone().into_bytes(),
        language: Some(language),
        source: ContentSource::CodeBlock,
    })
}

async fn diagram_content<R: DiagramRenderer>(
    segment: &Segment,
    renderer: &R,
    timeout: Option<Duration>,
    cancel: &CancellationToken,
) -> Content {
    match render_bounded(renderer, &segment.raw_source, timeout, cancel).await {
        Ok(diagram) => {
            debug!(bytes = diagram.data.len(), "rendered diagram");
            Content::Photo(PhotoAttachment {
                file_name: DIAGRAM_IMAGE_NAME.to_string(),
                data: diagram.data,
                caption: diagram.caption,
                source: ContentSource::Diagram,
            })
        }
        Err(err) => {
            warn!(error = %err, "diagram rendering failed, sending source as file");
            Content::File(FileAttachment {
                file_name: DIAGRAM_FALLBACK_NAME.to_string(),
                data: segment.raw_source.clone().into_bytes(),
                language: None,
                source: ContentSource::Diagram,
            })
        }
    }
}

async fn render_bounded<R: DiagramRenderer>(
    renderer: &R,
    source: &str,
    timeout: Option<Duration>,
    cancel: &CancellationToken,
) -> Result<RenderedDiagram, RenderError> {
    if cancel.is_cancelled() {
        return Err(RenderError::Cancelled);
    }

    let render = async {
        match timeout {
            Some(limit) => match tokio::time::timeout(limit, renderer.render(source)).await {
                Ok(result) => result,
                Err(_elapsed) => Err(RenderError::Timeout(limit)),
            },
            None => renderer.render(source).await,
        }
    };

    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(RenderError::Cancelled),
        result = render => result,
    }
}
