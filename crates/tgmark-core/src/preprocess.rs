//! Source rewrites applied before Markdown parsing.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::math::{MathTranslator, is_known_command};

static CODE_REGION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[\s\S]*?```|`[^`\n]+`").expect("valid code region regex"));
static DISPLAY_MATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\\[(.*?)\\\]").expect("valid display math regex"));
static INLINE_MATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\\((.*?)\\\)").expect("valid inline math regex"));
static COMMAND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\([a-zA-Z]+)").expect("valid command regex"));

const SPOILER_MARK: &str = "||";
const SPOILER_OPEN: &str = "<tg-spoiler>";
const SPOILER_CLOSE: &str = "</tg-spoiler>";

/// Minimum length of a math region worth translating.
const MIN_MATH_LEN: usize = 5;

/// Rewrites `||text||` into `<tg-spoiler>text</tg-spoiler>`.
///
/// Fenced and inline code are left untouched, and `\||` is not a marker.
/// Table rows (lines opening with a single `|`) are copied as-is so an empty
/// cell stays a cell. Markers pair up within each stretch of text between
/// code regions.
pub fn mark_spoilers(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for region in CODE_REGION_RE.find_iter(text) {
        replace_spoiler_marks(&text[last..region.start()], &mut out);
        out.push_str(region.as_str());
        last = region.end();
    }
    replace_spoiler_marks(&text[last..], &mut out);
    out
}

fn replace_spoiler_marks(part: &str, out: &mut String) {
    let mut open = false;
    for line in part.split_inclusive('\n') {
        if is_table_row(line) {
            out.push_str(line);
        } else {
            open = replace_line_marks(line, open, out);
        }
    }
}

fn is_table_row(line: &str) -> bool {
    let line = line.trim();
    line.starts_with('|') && !line.starts_with(SPOILER_MARK)
}

/// Returns whether a spoiler is still open at the end of `line`.
fn replace_line_marks(line: &str, mut open: bool, out: &mut String) -> bool {
    let mut rest = line;
    while let Some(index) = rest.find(SPOILER_MARK) {
        let escaped = rest[..index].ends_with('\\');
        out.push_str(&rest[..index]);
        if escaped {
            // Keep the first pipe; the second may still open a marker.
            out.push('|');
            rest = &rest[index + 1..];
            continue;
        }
        out.push_str(if open { SPOILER_CLOSE } else { SPOILER_OPEN });
        open = !open;
        rest = &rest[index + SPOILER_MARK.len()..];
    }
    out.push_str(rest);
    open
}

/// Returns true when `content` is long enough and uses at least one command
/// the translator understands.
pub fn contains_math_commands(content: &str) -> bool {
    content.len() >= MIN_MATH_LEN
        && COMMAND_RE
            .captures_iter(content)
            .any(|caps| is_known_command(&caps[1]))
}

/// Replaces `\[...\]` with `$$...$$` and `\(...\)` with `$...$`, translating
/// the math inside.
///
/// Regions never span paragraphs (`\n\n`) and are left alone unless they
/// contain recognized commands.
pub fn escape_math(text: &str, translator: &dyn MathTranslator) -> String {
    text.split("\n\n")
        .map(|paragraph| {
            let display = DISPLAY_MATH_RE.replace_all(paragraph, |caps: &Captures<'_>| {
                translate_region(caps, "$$", translator)
            });
            INLINE_MATH_RE
                .replace_all(&display, |caps: &Captures<'_>| {
                    translate_region(caps, "$", translator)
                })
                .into_owned()
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn translate_region(caps: &Captures<'_>, fence: &str, translator: &dyn MathTranslator) -> String {
    let content = &caps[1];
    if !contains_math_commands(content) {
        return caps[0].to_string();
    }
    let converted = translator.translate(content);
    format!("{fence}{}{fence}", converted.trim())
}
