//! Markdown event walker.
//!
//! Drives a [`TextBuffer`] and a [`ScopeStack`] from the pulldown-cmark event
//! stream, producing plain text, entities and code/diagram segments in a
//! single pass.

mod table;

use pulldown_cmark::{
    CodeBlockKind, CowStr, Event, HeadingLevel, LinkType, Options, Parser, Tag, TagEnd,
};

use self::table::TableBuffer;
use crate::Conversion;
use crate::buffer::TextBuffer;
use crate::config::RenderConfig;
use crate::entity::{Entity, EntityKind, EntityType};
use crate::scope::ScopeStack;
use crate::segment::SegmentRecorder;

/// Written for a thematic break.
pub const HORIZONTAL_RULE: &str = "————————";
/// Written before each unordered list item.
pub const BULLET: &str = "⦁ ";

const CUSTOM_EMOJI_PREFIX: &str = "tg://emoji?id=";
const CUSTOM_EMOJI_ID_LEN: usize = 19;
const SPOILER_OPEN: &str = "<tg-spoiler>";
const SPOILER_CLOSE: &str = "</tg-spoiler>";

/// Parses `markdown` and renders it to text, entities and segments.
pub fn render(markdown: &str, config: &RenderConfig) -> Conversion {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    let parser = Parser::new_ext(markdown, options);

    let mut walker = Walker::new(config);
    for event in parser {
        walker.process_event(event);
    }
    walker.finish()
}

/// Returns the id of a `tg://emoji?id=<19 digits>` URL.
pub fn custom_emoji_id(url: &str) -> Option<&str> {
    let id = url.strip_prefix(CUSTOM_EMOJI_PREFIX)?;
    (id.len() == CUSTOM_EMOJI_ID_LEN && id.bytes().all(|b| b.is_ascii_digit())).then_some(id)
}

/// Language tag of a fenced block: first word of the info string, cut at the
/// first comma.
fn fence_language(info: &str) -> String {
    let word = info.split_whitespace().next().unwrap_or_default();
    word.split(',').next().unwrap_or_default().trim().to_string()
}

fn heading_rank(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn heading_styles(level: HeadingLevel) -> &'static [EntityType] {
    match level {
        HeadingLevel::H1 | HeadingLevel::H2 => &[EntityType::Bold, EntityType::Underline],
        HeadingLevel::H3 | HeadingLevel::H4 => &[EntityType::Bold],
        HeadingLevel::H5 | HeadingLevel::H6 => &[EntityType::Italic],
    }
}

/// Where inline text currently goes.
#[derive(Debug)]
enum Context {
    /// Straight into the output buffer.
    Flow,
    /// Collected as the source of a code block.
    CodeBlock { language: String, source: String },
    /// Collected into table cells, rendered when the table closes.
    Table(TableBuffer),
}

/// Marker written for the current list item, kept so a task checkbox can
/// replace it.
#[derive(Debug)]
struct ItemMarker {
    indent: String,
    marker: String,
}

struct Walker<'a> {
    config: &'a RenderConfig,
    buf: TextBuffer,
    scopes: ScopeStack,
    entities: Vec<Entity>,
    segments: SegmentRecorder,
    context: Context,
    /// Finished top-level blocks, drives blank-line separation.
    block_count: usize,
    /// One entry per open list: `Some(next number)` for ordered lists.
    lists: Vec<Option<u64>>,
    item: Option<ItemMarker>,
    /// Start offsets of open blockquotes.
    quotes: Vec<u32>,
    /// Scope type opened by each open link, if any.
    links: Vec<Option<EntityType>>,
    /// Whether each open image opened a scope.
    images: Vec<bool>,
    /// Nesting depth inside a skipped subtree.
    skip: Option<usize>,
}

impl<'a> Walker<'a> {
    fn new(config: &'a RenderConfig) -> Self {
        Self {
            config,
            buf: TextBuffer::new(),
            scopes: ScopeStack::new(),
            entities: Vec::new(),
            segments: SegmentRecorder::default(),
            context: Context::Flow,
            block_count: 0,
            lists: Vec::new(),
            item: None,
            quotes: Vec::new(),
            links: Vec::new(),
            images: Vec::new(),
            skip: None,
        }
    }

    fn process_event(&mut self, event: Event<'_>) {
        if let Some(depth) = self.skip {
            match event {
                Event::Start(_) => self.skip = Some(depth + 1),
                Event::End(_) => self.skip = depth.checked_sub(1),
                _ => {}
            }
            return;
        }

        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => {
                self.write_text(&text);
            }
            Event::Code(code) => self.add_inline_code(&code),
            Event::SoftBreak | Event::HardBreak => self.add_break(),
            Event::InlineHtml(html) => self.add_inline_html(&html),
            Event::TaskListMarker(checked) => self.add_task_marker(checked),
            Event::Rule => {
                self.ensure_block_spacing();
                self.buf.write(HORIZONTAL_RULE);
                self.block_count += 1;
            }
            _ => {}
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                if self.lists.is_empty() {
                    self.ensure_block_spacing();
                }
            }
            Tag::Heading { level, .. } => self.start_heading(level),
            Tag::BlockQuote(_) => {
                self.ensure_block_spacing();
                self.quotes.push(self.buf.utf16_offset());
            }
            Tag::CodeBlock(kind) => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) => fence_language(&info),
                    CodeBlockKind::Indented => String::new(),
                };
                self.context = Context::CodeBlock {
                    language,
                    source: String::new(),
                };
            }
            Tag::HtmlBlock => self.skip = Some(0),
            Tag::List(first) => {
                if self.lists.is_empty() {
                    self.ensure_block_spacing();
                }
                self.lists.push(first);
            }
            Tag::Item => self.start_item(),
            Tag::Table(_) => {
                self.ensure_block_spacing();
                self.context = Context::Table(TableBuffer::new());
            }
            Tag::Emphasis => self.open_scope(EntityKind::Italic),
            Tag::Strong => self.open_scope(EntityKind::Bold),
            Tag::Strikethrough => self.open_scope(EntityKind::Strikethrough),
            Tag::Link {
                link_type, dest_url, ..
            } => self.start_link(link_type, dest_url),
            Tag::Image { dest_url, .. } => self.start_image(&dest_url),
            _ => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                if self.lists.is_empty() {
                    self.block_count += 1;
                } else if self.buf.trailing_newline_count() == 0 {
                    self.buf.write("\n");
                }
            }
            TagEnd::Heading(level) => {
                for style in heading_styles(level).iter().rev() {
                    self.close_scope(*style);
                }
                self.block_count += 1;
            }
            TagEnd::BlockQuote(_) => {
                if let Some(start) = self.quotes.pop() {
                    self.push_entity(EntityKind::Blockquote, start);
                }
                self.block_count += 1;
            }
            TagEnd::CodeBlock => self.end_code_block(),
            TagEnd::List(_) => {
                self.lists.pop();
                if self.lists.is_empty() {
                    self.block_count += 1;
                }
            }
            TagEnd::Item => {
                if self.buf.trailing_newline_count() == 0 {
                    self.buf.write("\n");
                }
                self.item = None;
            }
            TagEnd::TableCell => {
                if let Context::Table(table) = &mut self.context {
                    table.finish_cell();
                }
            }
            TagEnd::TableHead | TagEnd::TableRow => {
                if let Context::Table(table) = &mut self.context {
                    table.finish_row();
                }
            }
            TagEnd::Table => self.end_table(),
            TagEnd::Emphasis => self.close_scope(EntityType::Italic),
            TagEnd::Strong => self.close_scope(EntityType::Bold),
            TagEnd::Strikethrough => self.close_scope(EntityType::Strikethrough),
            TagEnd::Link => {
                if let Some(Some(entity_type)) = self.links.pop() {
                    self.close_scope(entity_type);
                }
            }
            TagEnd::Image => {
                if self.images.pop() == Some(true)
                    && let Some(entity) = self.scopes.pop_any(self.buf.utf16_offset())
                {
                    self.entities.push(entity);
                }
            }
            _ => {}
        }
    }

    /// Writes inline text to wherever the current context sends it.
    ///
    /// Returns false when the text was diverted away from the buffer.
    fn write_text(&mut self, text: &str) -> bool {
        match &mut self.context {
            Context::Flow => {
                self.buf.write(text);
                true
            }
            Context::CodeBlock { source, .. } => {
                source.push_str(text);
                false
            }
            Context::Table(table) => {
                table.push_cell_text(text);
                false
            }
        }
    }

    fn add_inline_code(&mut self, code: &str) {
        let start = self.buf.utf16_offset();
        if self.write_text(code) {
            self.push_entity(EntityKind::Code, start);
        }
    }

    fn add_break(&mut self) {
        if let Context::Table(table) = &mut self.context {
            table.push_cell_text(" ");
            return;
        }
        self.write_text("\n");
    }

    fn add_inline_html(&mut self, html: &str) {
        let tag = html.trim().to_ascii_lowercase();
        if tag == SPOILER_OPEN {
            self.open_scope(EntityKind::Spoiler);
        } else if tag == SPOILER_CLOSE {
            self.close_scope(EntityType::Spoiler);
        }
    }

    fn start_heading(&mut self, level: HeadingLevel) {
        self.ensure_block_spacing();
        let glyph = self.config.symbols.heading(heading_rank(level));
        if !glyph.is_empty() {
            self.buf.write(format!("{glyph} "));
        }
        for style in heading_styles(level) {
            if let Some(kind) = EntityKind::plain(*style) {
                self.open_scope(kind);
            }
        }
    }

    fn start_item(&mut self) {
        let indent = "  ".repeat(self.lists.len().saturating_sub(1));
        // A nested item must not continue its parent's line.
        if self.buf.byte_offset() > 0 && self.buf.trailing_newline_count() == 0 {
            self.buf.write("\n");
        }

        let marker = match self.lists.last_mut() {
            Some(Some(next)) => {
                let marker = format!("{indent}{next}. ");
                *next += 1;
                marker
            }
            _ => format!("{indent}{BULLET}"),
        };
        self.buf.write(marker.clone());
        self.item = Some(ItemMarker { indent, marker });
    }

    fn add_task_marker(&mut self, checked: bool) {
        let glyph = self.config.symbols.task(checked);
        match &self.item {
            Some(item) if self.buf.last() == Some(item.marker.as_str()) => {
                let replacement = format!("{}{glyph} ", item.indent);
                self.buf.pop_last();
                self.buf.write(replacement);
            }
            _ => self.buf.write(format!("{glyph} ")),
        }
    }

    fn start_link(&mut self, link_type: LinkType, dest_url: CowStr<'_>) {
        if matches!(link_type, LinkType::Autolink | LinkType::Email) {
            let url = if link_type == LinkType::Email {
                format!("mailto:{dest_url}")
            } else {
                dest_url.to_string()
            };
            let start = self.buf.utf16_offset();
            if self.write_text(&dest_url) && !url.is_empty() {
                self.push_entity(EntityKind::TextLink { url }, start);
            }
            self.skip = Some(0);
            return;
        }

        let kind = if let Some(id) = custom_emoji_id(&dest_url) {
            Some(EntityKind::CustomEmoji {
                custom_emoji_id: id.to_string(),
            })
        } else if dest_url.is_empty() {
            None
        } else {
            Some(EntityKind::TextLink {
                url: dest_url.to_string(),
            })
        };

        self.links.push(kind.as_ref().map(EntityKind::entity_type));
        if let Some(kind) = kind {
            self.open_scope(kind);
        }
    }

    fn start_image(&mut self, dest_url: &str) {
        if let Some(id) = custom_emoji_id(dest_url) {
            self.open_scope(EntityKind::CustomEmoji {
                custom_emoji_id: id.to_string(),
            });
            self.images.push(true);
            return;
        }

        let glyph = self.config.symbols.image.clone();
        self.write_text(&glyph);
        if dest_url.is_empty() {
            self.images.push(false);
        } else {
            self.open_scope(EntityKind::TextLink {
                url: dest_url.to_string(),
            });
            self.images.push(true);
        }
    }

    fn end_code_block(&mut self) {
        let Context::CodeBlock {
            language,
            mut source,
        } = std::mem::replace(&mut self.context, Context::Flow)
        else {
            return;
        };
        if source.ends_with('\n') {
            source.pop();
        }

        self.ensure_block_spacing();
        let byte_start = self.buf.byte_offset();
        let start = self.buf.utf16_offset();
        self.buf.write(source.as_str());

        let pre_language = (!language.is_empty()).then(|| language.clone());
        self.push_entity(
            EntityKind::Pre {
                language: pre_language,
            },
            start,
        );
        self.segments.record(
            language,
            source,
            byte_start..self.buf.byte_offset(),
            start..self.buf.utf16_offset(),
        );
        self.block_count += 1;
    }

    fn end_table(&mut self) {
        let Context::Table(table) = std::mem::replace(&mut self.context, Context::Flow) else {
            return;
        };

        let start = self.buf.utf16_offset();
        self.buf.write(table.render());
        self.push_entity(EntityKind::Pre { language: None }, start);
        self.block_count += 1;
    }

    /// Tops trailing newlines up to a blank line once any block has been
    /// written.
    fn ensure_block_spacing(&mut self) {
        if self.block_count == 0 {
            return;
        }
        let trailing = self.buf.trailing_newline_count();
        if trailing < 2 {
            self.buf.write("\n".repeat(2 - trailing));
        }
    }

    fn open_scope(&mut self, kind: EntityKind) {
        self.scopes.push(kind, self.buf.utf16_offset());
    }

    fn close_scope(&mut self, entity_type: EntityType) {
        if let Some(entity) = self.scopes.pop(entity_type, self.buf.utf16_offset()) {
            self.entities.push(entity);
        }
    }

    /// Emits an entity from `start` to the current offset, unless empty.
    fn push_entity(&mut self, kind: EntityKind, start: u32) {
        let length = self.buf.utf16_offset().saturating_sub(start);
        if length > 0 {
            self.entities.push(Entity::new(kind, start, length));
        }
    }

    fn finish(mut self) -> Conversion {
        if self.config.cite_expandable {
            let threshold = self.config.expandable_quote_threshold;
            for entity in &mut self.entities {
                if entity.kind == EntityKind::Blockquote && entity.length > threshold {
                    entity.kind = EntityKind::ExpandableBlockquote;
                }
            }
        }

        Conversion {
            text: self.buf.into_string(),
            entities: self.entities,
            segments: self.segments.into_segments(),
        }
    }
}
