//! `tgmark convert`: Markdown to text and entities.

use anyhow::{Context, Result};
use serde::Serialize;
use tgmark_core::{Config, Entity, convert};

#[derive(Serialize)]
struct Converted<'a> {
    text: &'a str,
    entities: &'a [Entity],
}

pub fn run(markdown: &str, config: &Config, no_latex: bool) -> Result<()> {
    let mut render = config.render.clone();
    if no_latex {
        render.latex_escape = false;
    }

    let (text, entities) = convert(markdown, &render);
    let json = serde_json::to_string_pretty(&Converted {
        text: &text,
        entities: &entities,
    })
    .context("serialize conversion")?;
    println!("{json}");
    Ok(())
}
