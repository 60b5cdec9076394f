//! `tgmark process`: the full Markdown to messages pipeline.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tgmark_core::{Config, Entity};
use tgmark_pipeline::{
    Content, ContentSource, ContentType, DisabledRenderer, MermaidInkRenderer, PipelineOptions,
    process_markdown,
};
use tokio_util::sync::CancellationToken;

/// One line of the printed summary.
#[derive(Debug, Serialize)]
struct ContentSummary<'a> {
    #[serde(rename = "type")]
    content_type: ContentType,
    source: ContentSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    entities: Option<&'a [Entity]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bytes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    caption: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<PathBuf>,
}

impl<'a> ContentSummary<'a> {
    fn new(content: &'a Content) -> Self {
        let mut summary = Self {
            content_type: content.content_type(),
            source: content.source(),
            text: None,
            entities: None,
            file_name: content.file_name(),
            bytes: content.data().map(<[u8]>::len),
            language: None,
            caption: None,
            path: None,
        };
        match content {
            Content::Text(message) => {
                summary.text = Some(&message.text);
                summary.entities = Some(&message.entities);
            }
            Content::File(file) => summary.language = file.language.as_deref(),
            Content::Photo(photo) => summary.caption = Some(&photo.caption),
        }
        summary
    }
}

pub async fn run(
    markdown: &str,
    config: &Config,
    max_length: Option<usize>,
    out_dir: Option<&Path>,
) -> Result<()> {
    let mut options = PipelineOptions::from_config(config);
    if let Some(max_length) = max_length {
        options.max_message_length = max_length;
    }

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let contents = if config.mermaid.enabled {
        let renderer = MermaidInkRenderer::from_config(&config.mermaid);
        process_markdown(markdown, &options, &renderer, &cancel).await
    } else {
        process_markdown(markdown, &options, &DisabledRenderer, &cancel).await
    };

    let mut summaries: Vec<ContentSummary<'_>> = contents.iter().map(ContentSummary::new).collect();
    if let Some(dir) = out_dir {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
        for (index, (content, summary)) in contents.iter().zip(&mut summaries).enumerate() {
            summary.path = write_attachment(dir, index, content)?;
        }
    }

    let json = serde_json::to_string_pretty(&summaries).context("serialize contents")?;
    println!("{json}");
    Ok(())
}

/// Writes a file or photo attachment as `{index:02}-{file_name}` inside `dir`.
fn write_attachment(dir: &Path, index: usize, content: &Content) -> Result<Option<PathBuf>> {
    let (Some(file_name), Some(data)) = (content.file_name(), content.data()) else {
        return Ok(None);
    };
    let safe_name = Path::new(file_name)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("attachment");
    let path = dir.join(format!("{index:02}-{safe_name}"));
    fs::write(&path, data).with_context(|| format!("write {}", path.display()))?;
    tracing::debug!(path = %path.display(), bytes = data.len(), "wrote attachment");
    Ok(Some(path))
}
