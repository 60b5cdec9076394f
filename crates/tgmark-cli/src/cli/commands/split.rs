//! `tgmark split`: Markdown to message-sized chunks.

use anyhow::{Context, Result};
use tgmark_core::{Config, TextChunk, convert, split_entities, trim_newlines};

pub fn run(markdown: &str, config: &Config, max_length: Option<usize>) -> Result<()> {
    let max_length = max_length.unwrap_or(config.pipeline.max_message_length);
    let (text, entities) = convert(markdown, &config.render);

    let chunks: Vec<TextChunk> = split_entities(&text, &entities, max_length)
        .iter()
        .map(|chunk| trim_newlines(&chunk.text, &chunk.entities))
        .filter(|chunk| !chunk.is_empty())
        .collect();
    tracing::debug!(chunks = chunks.len(), max_length, "split conversion");

    let json = serde_json::to_string_pretty(&chunks).context("serialize chunks")?;
    println!("{json}");
    Ok(())
}
