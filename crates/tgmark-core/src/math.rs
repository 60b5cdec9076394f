//! Best-effort LaTeX math to Unicode text.
//!
//! Telegram has no math rendering, so `\frac{1}{2}` and friends are turned
//! into the closest plain-text approximation (`½`, `x²`, `√(a+b)`, `∑`).
//! Unknown commands are echoed verbatim; translation never fails.

/// Converts one math expression (without its `\(`/`\[` delimiters) to text.
pub trait MathTranslator {
    fn translate(&self, expression: &str) -> String;
}

/// Recursive-descent LaTeX translator backed by static Unicode tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeMath;

impl MathTranslator for UnicodeMath {
    fn translate(&self, expression: &str) -> String {
        translate_at(expression, 0)
    }
}

fn translate_at(expression: &str, depth: usize) -> String {
    MathParser::nested(expression, depth).parse_sequence(None)
}

/// Returns true when `name` (without the backslash) is a command the
/// translator knows how to render.
pub fn is_known_command(name: &str) -> bool {
    symbol(name).is_some()
        || style_kind(name).is_some()
        || combining_mark(name).is_some()
        || is_text_command(name)
        || matches!(
            name,
            "frac"
                | "dfrac"
                | "tfrac"
                | "sqrt"
                | "not"
                | "left"
                | "right"
                | "binom"
                | "tbinom"
                | "dbinom"
                | "boxed"
                | "pmod"
                | "overset"
                | "underset"
                | "stackrel"
                | "begin"
                | "end"
        )
}

/// Groups and command arguments nested deeper than this are copied through
/// untranslated.
const MAX_DEPTH: usize = 32;

struct MathParser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl MathParser {
    fn nested(source: &str, depth: usize) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            depth,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    /// Parses until `close` (consumed) or the end of input.
    fn parse_sequence(&mut self, close: Option<char>) -> String {
        let mut out = String::new();
        while let Some(ch) = self.peek() {
            if Some(ch) == close {
                self.pos += 1;
                break;
            }
            match ch {
                '\\' => {
                    let name = self.parse_command_name();
                    if matches!(name.as_str(), "frac" | "dfrac" | "tfrac")
                        && out.chars().last().is_some_and(|c| c.is_ascii_digit())
                    {
                        // Mixed number: 1\frac{1}{2} reads as "1 ½".
                        out.push(' ');
                    }
                    let rendered = self.handle_command(&name);
                    out.push_str(&rendered);
                }
                '{' => {
                    self.pos += 1;
                    let group = self.parse_group_body();
                    out.push_str(&group);
                }
                '^' | '_' => {
                    self.pos += 1;
                    let argument = self.parse_argument();
                    if ch == '^' {
                        out.push_str(&superscript(&argument));
                    } else {
                        out.push_str(&subscript(&argument));
                    }
                }
                c if c.is_whitespace() => {
                    while self.peek().is_some_and(char::is_whitespace) {
                        self.pos += 1;
                    }
                    out.push(' ');
                }
                c => {
                    self.pos += 1;
                    out.push(c);
                }
            }
        }
        out
    }

    /// Parses the inside of a `{...}` group whose opening brace was consumed.
    fn parse_group_body(&mut self) -> String {
        if self.depth >= MAX_DEPTH {
            return self.copy_raw_group();
        }
        self.depth += 1;
        let body = self.parse_sequence(Some('}'));
        self.depth -= 1;
        body
    }

    fn copy_raw_group(&mut self) -> String {
        let mut level = 1usize;
        let mut out = String::new();
        while let Some(ch) = self.peek() {
            self.pos += 1;
            match ch {
                '{' => level += 1,
                '}' => {
                    level -= 1;
                    if level == 0 {
                        break;
                    }
                }
                _ => {}
            }
            out.push(ch);
        }
        out
    }

    /// Reads `\name` at the cursor: a run of ASCII letters or one other char.
    fn parse_command_name(&mut self) -> String {
        self.pos += 1; // backslash
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
            self.pos += 1;
        }
        if self.pos == start {
            return match self.peek() {
                Some(ch) => {
                    self.pos += 1;
                    ch.to_string()
                }
                None => String::new(),
            };
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn skip_spaces(&mut self) {
        while self.peek().is_some_and(|c| c == ' ' || c == '\t') {
            self.pos += 1;
        }
    }

    /// One argument: a braced group, a command, or a single character.
    fn parse_argument(&mut self) -> String {
        self.skip_spaces();
        match self.peek() {
            Some('{') => {
                self.pos += 1;
                self.parse_group_body()
            }
            Some('\\') => {
                let name = self.parse_command_name();
                self.handle_command(&name)
            }
            Some(ch) => {
                self.pos += 1;
                ch.to_string()
            }
            None => String::new(),
        }
    }

    /// Optional `[...]` argument.
    fn parse_optional(&mut self) -> Option<String> {
        self.skip_spaces();
        if self.peek() != Some('[') {
            return None;
        }
        self.pos += 1;
        let start = self.pos;
        let mut level = 1usize;
        while let Some(ch) = self.peek() {
            self.pos += 1;
            match ch {
                '[' => level += 1,
                ']' => {
                    level -= 1;
                    if level == 0 {
                        let raw: String = self.chars[start..self.pos - 1].iter().collect();
                        return Some(translate_at(&raw, self.depth));
                    }
                }
                _ => {}
            }
        }
        let raw: String = self.chars[start..].iter().collect();
        Some(translate_at(&raw, self.depth))
    }

    /// Raw `{name}` used by `\begin`/`\end`.
    fn parse_raw_braced(&mut self) -> String {
        self.skip_spaces();
        if self.peek() != Some('{') {
            return String::new();
        }
        self.pos += 1;
        let start = self.pos;
        while let Some(ch) = self.peek() {
            self.pos += 1;
            if ch == '}' {
                return self.chars[start..self.pos - 1].iter().collect();
            }
        }
        self.chars[start..].iter().collect()
    }

    fn parse_delimiter(&mut self) -> String {
        self.skip_spaces();
        match self.peek() {
            Some('\\') => {
                let name = self.parse_command_name();
                symbol(&name).map_or(name, str::to_string)
            }
            Some('.') => {
                self.pos += 1;
                String::new()
            }
            Some(ch) => {
                self.pos += 1;
                ch.to_string()
            }
            None => String::new(),
        }
    }

    fn handle_command(&mut self, name: &str) -> String {
        if let Some(sym) = symbol(name) {
            return sym.to_string();
        }
        if self.depth >= MAX_DEPTH {
            return self.copy_rest(name);
        }
        self.depth += 1;
        let rendered = self.render_command(name);
        self.depth -= 1;
        rendered
    }

    /// `\name` followed by the unparsed remainder of the input.
    fn copy_rest(&mut self, name: &str) -> String {
        let rest: String = self.chars[self.pos..].iter().collect();
        self.pos = self.chars.len();
        format!("\\{name}{rest}")
    }

    fn render_command(&mut self, name: &str) -> String {
        if let Some(mark) = combining_mark(name) {
            let argument = self.parse_argument();
            return apply_combining(name, mark, &argument);
        }
        if let Some(style) = style_kind(name) {
            let argument = self.parse_argument();
            return argument.chars().map(|c| style.apply(c)).collect();
        }
        if is_text_command(name) {
            return self.parse_argument();
        }

        match name {
            "frac" | "dfrac" | "tfrac" => {
                let numerator = self.parse_argument();
                let denominator = self.parse_argument();
                fraction(&numerator, &denominator)
            }
            "sqrt" => {
                let index = self.parse_optional().unwrap_or_default();
                let radicand = self.parse_argument();
                root(index.trim(), radicand.trim())
            }
            "not" => {
                let negated = if self.peek() == Some('\\') {
                    let next = self.parse_command_name();
                    symbol(&next).map_or_else(|| format!("\\{next}"), str::to_string)
                } else {
                    self.parse_argument()
                };
                negate(&negated)
            }
            "left" | "right" => self.parse_delimiter(),
            "binom" | "tbinom" | "dbinom" => {
                let n = self.parse_argument();
                let k = self.parse_argument();
                format!("C({n},{k})")
            }
            "boxed" => format!("[{}]", self.parse_argument()),
            "pmod" => format!(" (mod {})", self.parse_argument()),
            "color" => {
                self.parse_raw_braced();
                String::new()
            }
            "overset" | "stackrel" => {
                let over = self.parse_argument();
                let base = self.parse_argument();
                format!("{base}{}", script_or_group(&over, superscript_char, '^'))
            }
            "underset" => {
                let under = self.parse_argument();
                let base = self.parse_argument();
                format!("{base}{}", script_or_group(&under, subscript_char, '_'))
            }
            "begin" => {
                let env = self.parse_raw_braced();
                let body = self.take_environment_body(&env);
                render_environment(&env, &body, self.depth)
            }
            "end" => {
                self.parse_raw_braced();
                String::new()
            }
            _ => format!("\\{name}"),
        }
    }

    /// Raw text up to the matching `\end{env}` (consumed).
    fn take_environment_body(&mut self, env: &str) -> String {
        let end_marker: Vec<char> = format!("\\end{{{env}}}").chars().collect();
        let rest = &self.chars[self.pos..];
        let found = rest
            .windows(end_marker.len())
            .position(|window| window == end_marker.as_slice());
        match found {
            Some(offset) => {
                let body: String = rest[..offset].iter().collect();
                self.pos += offset + end_marker.len();
                body
            }
            None => {
                let body: String = rest.iter().collect();
                self.pos = self.chars.len();
                body
            }
        }
    }
}

fn render_environment(env: &str, body: &str, depth: usize) -> String {
    let translate = |text: &str| translate_at(text.trim(), depth);
    let rows = || {
        body.split("\\\\")
            .map(str::trim)
            .filter(|row| !row.is_empty())
    };

    let delimiters = match env {
        "matrix" | "smallmatrix" => Some(("", "")),
        "pmatrix" => Some(("(", ")")),
        "bmatrix" => Some(("[", "]")),
        "Bmatrix" => Some(("{", "}")),
        "vmatrix" => Some(("|", "|")),
        "Vmatrix" => Some(("‖", "‖")),
        _ => None,
    };
    if let Some((left, right)) = delimiters {
        let compact = env == "smallmatrix";
        let (cell_sep, row_sep) = if compact { (", ", "; ") } else { ("  ", "\n") };
        let rendered: Vec<String> = rows()
            .map(|row| {
                row.split('&')
                    .map(translate)
                    .collect::<Vec<_>>()
                    .join(cell_sep)
            })
            .collect();
        return format!("{left}{}{right}", rendered.join(row_sep));
    }

    match env {
        "cases" => {
            let parts: Vec<String> = rows()
                .map(|row| match row.split_once('&') {
                    Some((value, condition)) => {
                        let condition = translate(condition);
                        if condition.is_empty() {
                            translate(value)
                        } else {
                            format!("{}, {condition}", translate(value))
                        }
                    }
                    None => translate(row),
                })
                .collect();
            let last = parts.len().saturating_sub(1);
            parts
                .iter()
                .enumerate()
                .map(|(index, part)| {
                    let brace = if index == 0 {
                        '⎧'
                    } else if index == last {
                        '⎩'
                    } else {
                        '⎨'
                    };
                    format!("{brace} {part}")
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
        "align" | "align*" | "aligned" | "gather" | "gather*" | "gathered" | "equation"
        | "equation*" | "multline" | "multline*" | "split" | "flalign" | "flalign*" => rows()
            .map(|row| translate(&row.replace('&', " ")))
            .collect::<Vec<_>>()
            .join("\n"),
        "array" => {
            let body = body.trim_start();
            let body = match body.strip_prefix('{').and_then(|rest| rest.split_once('}')) {
                Some((_, rest)) => rest,
                None => body,
            };
            render_environment("matrix", body, depth)
        }
        _ => translate_at(body, depth),
    }
}

fn fraction(numerator: &str, denominator: &str) -> String {
    let (n, d) = (numerator.trim(), denominator.trim());
    if n.is_empty() && d.is_empty() {
        return String::new();
    }
    let vulgar = match (n, d) {
        ("1", "2") => Some("½"),
        ("1", "3") => Some("⅓"),
        ("2", "3") => Some("⅔"),
        ("1", "4") => Some("¼"),
        ("3", "4") => Some("¾"),
        ("1", "5") => Some("⅕"),
        ("2", "5") => Some("⅖"),
        ("3", "5") => Some("⅗"),
        ("4", "5") => Some("⅘"),
        ("1", "6") => Some("⅙"),
        ("5", "6") => Some("⅚"),
        ("1", "8") => Some("⅛"),
        ("3", "8") => Some("⅜"),
        ("5", "8") => Some("⅝"),
        ("7", "8") => Some("⅞"),
        _ => None,
    };
    match vulgar {
        Some(glyph) => glyph.to_string(),
        None => format!("{}/{}", parenthesize(n), parenthesize(d)),
    }
}

fn root(index: &str, radicand: &str) -> String {
    let radix = match index {
        "" | "2" => "√".to_string(),
        "3" => "∛".to_string(),
        "4" => "∜".to_string(),
        _ => match map_all(index, superscript_char) {
            Some(sup) => format!("{sup}√"),
            None => format!("({index})√"),
        },
    };
    format!("{radix}{}", parenthesize(radicand))
}

/// Wraps compound terms in parentheses so `a+b` over `c` reads `(a+b)/c`.
fn parenthesize(text: &str) -> String {
    let simple = text
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || is_combining(c));
    if simple {
        text.to_string()
    } else {
        format!("({text})")
    }
}

fn is_combining(c: char) -> bool {
    matches!(c,
        '\u{0300}'..='\u{036F}'
        | '\u{1AB0}'..='\u{1AFF}'
        | '\u{1DC0}'..='\u{1DFF}'
        | '\u{20D0}'..='\u{20FF}'
        | '\u{FE20}'..='\u{FE2F}')
}

fn negate(symbol: &str) -> String {
    let trimmed = symbol.trim();
    let negated = match trimmed {
        "" => return " ".to_string(),
        "=" => "≠",
        "<" => "≮",
        ">" => "≯",
        "∈" => "∉",
        "∋" => "∌",
        "⊂" => "⊄",
        "⊃" => "⊅",
        "⊆" => "⊈",
        "⊇" => "⊉",
        "≡" => "≢",
        "≤" => "≰",
        "≥" => "≱",
        "∼" => "≁",
        "≈" => "≉",
        "≃" => "≄",
        "≅" => "≇",
        "∣" => "∤",
        "∥" => "∦",
        "∃" => "∄",
        _ => {
            let mut chars = trimmed.chars();
            let first = chars.next().unwrap_or_default();
            return format!("{first}\u{0338}{}", chars.as_str());
        }
    };
    negated.to_string()
}

fn apply_combining(name: &str, mark: char, text: &str) -> String {
    if text.is_empty() {
        return mark.to_string();
    }
    if matches!(name, "overline" | "underline") {
        return text.chars().flat_map(|c| [c, mark]).collect();
    }
    // Accent goes on the first character, after any marks already on it.
    let mut chars = text.char_indices().skip(1);
    let split = chars
        .find(|(_, c)| !is_combining(*c))
        .map_or(text.len(), |(index, _)| index);
    format!("{}{mark}{}", &text[..split], &text[split..])
}

fn combining_mark(name: &str) -> Option<char> {
    let mark = match name {
        "hat" | "widehat" => '\u{0302}',
        "tilde" | "widetilde" => '\u{0303}',
        "bar" => '\u{0304}',
        "overline" => '\u{0305}',
        "breve" => '\u{0306}',
        "dot" => '\u{0307}',
        "ddot" => '\u{0308}',
        "check" => '\u{030C}',
        "acute" => '\u{0301}',
        "grave" => '\u{0300}',
        "underline" => '\u{0332}',
        "vec" => '\u{20D7}',
        _ => return None,
    };
    Some(mark)
}

fn is_text_command(name: &str) -> bool {
    matches!(
        name,
        "text" | "operatorname" | "mbox" | "textrm" | "textup" | "textnormal" | "mathop"
    )
}

fn superscript(argument: &str) -> String {
    script_or_group(argument, superscript_char, '^')
}

fn subscript(argument: &str) -> String {
    script_or_group(argument, subscript_char, '_')
}

/// Maps every character through `map`, or falls back to `^x` / `^(xy)`.
fn script_or_group(text: &str, map: fn(char) -> Option<char>, marker: char) -> String {
    let text = text.trim();
    if text.is_empty() {
        return String::new();
    }
    if let Some(mapped) = map_all(text, map) {
        return mapped;
    }
    if text.chars().count() == 1 {
        format!("{marker}{text}")
    } else {
        format!("{marker}({text})")
    }
}

fn map_all(text: &str, map: fn(char) -> Option<char>) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    text.chars().map(map).collect()
}

fn superscript_char(c: char) -> Option<char> {
    let sup = match c {
        '0' => '⁰',
        '1' => '¹',
        '2' => '²',
        '3' => '³',
        '4' => '⁴',
        '5' => '⁵',
        '6' => '⁶',
        '7' => '⁷',
        '8' => '⁸',
        '9' => '⁹',
        '+' => '⁺',
        '-' | '−' => '⁻',
        '=' => '⁼',
        '(' => '⁽',
        ')' => '⁾',
        'a' => 'ᵃ',
        'b' => 'ᵇ',
        'c' => 'ᶜ',
        'd' => 'ᵈ',
        'e' => 'ᵉ',
        'f' => 'ᶠ',
        'g' => 'ᵍ',
        'h' => 'ʰ',
        'i' => 'ⁱ',
        'j' => 'ʲ',
        'k' => 'ᵏ',
        'l' => 'ˡ',
        'm' => 'ᵐ',
        'n' => 'ⁿ',
        'o' => 'ᵒ',
        'p' => 'ᵖ',
        'r' => 'ʳ',
        's' => 'ˢ',
        't' => 'ᵗ',
        'u' => 'ᵘ',
        'v' => 'ᵛ',
        'w' => 'ʷ',
        'x' => 'ˣ',
        'y' => 'ʸ',
        'z' => 'ᶻ',
        'A' => 'ᴬ',
        'B' => 'ᴮ',
        'D' => 'ᴰ',
        'E' => 'ᴱ',
        'G' => 'ᴳ',
        'H' => 'ᴴ',
        'I' => 'ᴵ',
        'J' => 'ᴶ',
        'K' => 'ᴷ',
        'L' => 'ᴸ',
        'M' => 'ᴹ',
        'N' => 'ᴺ',
        'O' => 'ᴼ',
        'P' => 'ᴾ',
        'R' => 'ᴿ',
        'T' => 'ᵀ',
        'U' => 'ᵁ',
        'V' => 'ⱽ',
        'W' => 'ᵂ',
        '′' => '′',
        _ => return None,
    };
    Some(sup)
}

fn subscript_char(c: char) -> Option<char> {
    let sub = match c {
        '0' => '₀',
        '1' => '₁',
        '2' => '₂',
        '3' => '₃',
        '4' => '₄',
        '5' => '₅',
        '6' => '₆',
        '7' => '₇',
        '8' => '₈',
        '9' => '₉',
        '+' => '₊',
        '-' | '−' => '₋',
        '=' => '₌',
        '(' => '₍',
        ')' => '₎',
        'a' => 'ₐ',
        'e' => 'ₑ',
        'h' => 'ₕ',
        'i' => 'ᵢ',
        'j' => 'ⱼ',
        'k' => 'ₖ',
        'l' => 'ₗ',
        'm' => 'ₘ',
        'n' => 'ₙ',
        'o' => 'ₒ',
        'p' => 'ₚ',
        'r' => 'ᵣ',
        's' => 'ₛ',
        't' => 'ₜ',
        'u' => 'ᵤ',
        'v' => 'ᵥ',
        'x' => 'ₓ',
        _ => return None,
    };
    Some(sub)
}

/// Mathematical alphanumeric styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Plain,
    Bold,
    Italic,
    DoubleStruck,
    Script,
    Fraktur,
}

fn style_kind(name: &str) -> Option<Style> {
    let style = match name {
        "mathrm" | "mathsf" | "mathtt" | "textsf" | "texttt" => Style::Plain,
        "mathbf" | "textbf" | "boldsymbol" | "bm" => Style::Bold,
        "mathit" | "textit" => Style::Italic,
        "mathbb" => Style::DoubleStruck,
        "mathcal" | "mathscr" => Style::Script,
        "mathfrak" => Style::Fraktur,
        _ => return None,
    };
    Some(style)
}

impl Style {
    fn apply(self, c: char) -> char {
        let styled = match self {
            Style::Plain => None,
            Style::Bold => offset_alnum(c, 0x1D400, 0x1D41A, Some(0x1D7CE)),
            Style::Italic => match c {
                'h' => Some('ℎ'),
                _ => offset_alnum(c, 0x1D434, 0x1D44E, None),
            },
            Style::DoubleStruck => match c {
                'C' => Some('ℂ'),
                'H' => Some('ℍ'),
                'N' => Some('ℕ'),
                'P' => Some('ℙ'),
                'Q' => Some('ℚ'),
                'R' => Some('ℝ'),
                'Z' => Some('ℤ'),
                _ => offset_alnum(c, 0x1D538, 0x1D552, Some(0x1D7D8)),
            },
            Style::Script => match c {
                'B' => Some('ℬ'),
                'E' => Some('ℰ'),
                'F' => Some('ℱ'),
                'H' => Some('ℋ'),
                'I' => Some('ℐ'),
                'L' => Some('ℒ'),
                'M' => Some('ℳ'),
                'R' => Some('ℛ'),
                'A'..='Z' => offset_alnum(c, 0x1D49C, 0, None),
                _ => None,
            },
            Style::Fraktur => match c {
                'C' => Some('ℭ'),
                'H' => Some('ℌ'),
                'I' => Some('ℑ'),
                'R' => Some('ℜ'),
                'Z' => Some('ℨ'),
                _ => offset_alnum(c, 0x1D504, 0x1D51E, None),
            },
        };
        styled.unwrap_or(c)
    }
}

fn offset_alnum(c: char, upper: u32, lower: u32, digit: Option<u32>) -> Option<char> {
    let code = match c {
        'A'..='Z' => upper + (c as u32 - 'A' as u32),
        'a'..='z' if lower != 0 => lower + (c as u32 - 'a' as u32),
        '0'..='9' => digit? + (c as u32 - '0' as u32),
        _ => return None,
    };
    char::from_u32(code)
}

fn symbol(name: &str) -> Option<&'static str> {
    let sym = match name {
        // Greek
        "alpha" => "α",
        "beta" => "β",
        "gamma" => "γ",
        "delta" => "δ",
        "epsilon" => "ϵ",
        "varepsilon" => "ε",
        "zeta" => "ζ",
        "eta" => "η",
        "theta" => "θ",
        "vartheta" => "ϑ",
        "iota" => "ι",
        "kappa" => "κ",
        "lambda" => "λ",
        "mu" => "μ",
        "nu" => "ν",
        "xi" => "ξ",
        "pi" => "π",
        "varpi" => "ϖ",
        "rho" => "ρ",
        "varrho" => "ϱ",
        "sigma" => "σ",
        "varsigma" => "ς",
        "tau" => "τ",
        "upsilon" => "υ",
        "phi" => "ϕ",
        "varphi" => "φ",
        "chi" => "χ",
        "psi" => "ψ",
        "omega" => "ω",
        "Gamma" => "Γ",
        "Delta" => "Δ",
        "Theta" => "Θ",
        "Lambda" => "Λ",
        "Xi" => "Ξ",
        "Pi" => "Π",
        "Sigma" => "Σ",
        "Upsilon" => "Υ",
        "Phi" => "Φ",
        "Psi" => "Ψ",
        "Omega" => "Ω",
        // Operators
        "times" => "×",
        "cdot" => "·",
        "div" => "÷",
        "pm" => "±",
        "mp" => "∓",
        "ast" => "∗",
        "star" => "⋆",
        "circ" => "∘",
        "bullet" => "•",
        "oplus" => "⊕",
        "ominus" => "⊖",
        "otimes" => "⊗",
        "odot" => "⊙",
        "cup" => "∪",
        "cap" => "∩",
        "setminus" => "∖",
        "wedge" | "land" => "∧",
        "vee" | "lor" => "∨",
        "neg" | "lnot" => "¬",
        "sum" => "∑",
        "prod" => "∏",
        "coprod" => "∐",
        "int" => "∫",
        "iint" => "∬",
        "iiint" => "∭",
        "oint" => "∮",
        "bigcup" => "⋃",
        "bigcap" => "⋂",
        "nabla" => "∇",
        "partial" => "∂",
        // Relations
        "leq" | "le" => "≤",
        "geq" | "ge" => "≥",
        "neq" | "ne" => "≠",
        "ll" => "≪",
        "gg" => "≫",
        "approx" => "≈",
        "equiv" => "≡",
        "sim" => "∼",
        "simeq" => "≃",
        "cong" => "≅",
        "propto" => "∝",
        "in" => "∈",
        "notin" => "∉",
        "ni" => "∋",
        "subset" => "⊂",
        "supset" => "⊃",
        "subseteq" => "⊆",
        "supseteq" => "⊇",
        "mid" => "∣",
        "parallel" => "∥",
        "perp" => "⊥",
        "models" => "⊨",
        "vdash" => "⊢",
        // Arrows
        "to" | "rightarrow" => "→",
        "gets" | "leftarrow" => "←",
        "leftrightarrow" => "↔",
        "Rightarrow" => "⇒",
        "Leftarrow" => "⇐",
        "Leftrightarrow" => "⇔",
        "implies" | "Longrightarrow" => "⟹",
        "impliedby" | "Longleftarrow" => "⟸",
        "iff" | "Longleftrightarrow" => "⟺",
        "longrightarrow" => "⟶",
        "longleftarrow" => "⟵",
        "mapsto" => "↦",
        "uparrow" => "↑",
        "downarrow" => "↓",
        // Misc
        "infty" => "∞",
        "forall" => "∀",
        "exists" => "∃",
        "nexists" => "∄",
        "emptyset" | "varnothing" => "∅",
        "angle" => "∠",
        "triangle" => "△",
        "degree" => "°",
        "prime" => "′",
        "hbar" => "ℏ",
        "ell" => "ℓ",
        "Re" => "ℜ",
        "Im" => "ℑ",
        "aleph" => "ℵ",
        "therefore" => "∴",
        "because" => "∵",
        "ldots" | "dots" | "dotsc" => "…",
        "cdots" | "dotsb" => "⋯",
        "vdots" => "⋮",
        "ddots" => "⋱",
        "langle" => "⟨",
        "rangle" => "⟩",
        "lfloor" => "⌊",
        "rfloor" => "⌋",
        "lceil" => "⌈",
        "rceil" => "⌉",
        "lvert" | "rvert" | "vert" => "|",
        "lVert" | "rVert" | "Vert" => "‖",
        // Function names
        "sin" => "sin",
        "cos" => "cos",
        "tan" => "tan",
        "cot" => "cot",
        "sec" => "sec",
        "csc" => "csc",
        "arcsin" => "arcsin",
        "arccos" => "arccos",
        "arctan" => "arctan",
        "sinh" => "sinh",
        "cosh" => "cosh",
        "tanh" => "tanh",
        "log" => "log",
        "ln" => "ln",
        "lg" => "lg",
        "exp" => "exp",
        "lim" => "lim",
        "max" => "max",
        "min" => "min",
        "sup" => "sup",
        "inf" => "inf",
        "det" => "det",
        "gcd" => "gcd",
        "deg" => "deg",
        "dim" => "dim",
        "ker" => "ker",
        "arg" => "arg",
        "mod" | "bmod" => " mod ",
        // Spacing
        "quad" => "  ",
        "qquad" => "    ",
        "," | ":" | ";" | " " => " ",
        "!" => "",
        "displaystyle" | "textstyle" | "limits" | "nolimits" => "",
        // Escapes
        "{" => "{",
        "}" => "}",
        "%" => "%",
        "$" => "$",
        "&" => "&",
        "#" => "#",
        "_" => "_",
        "|" => "‖",
        "\\" => "\n",
        _ => return None,
    };
    Some(sym)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tr(expression: &str) -> String {
        UnicodeMath.translate(expression)
    }

    #[test]
    fn test_symbols_and_greek() {
        assert_eq!(tr(r"\alpha + \beta \leq \infty"), "α + β ≤ ∞");
        assert_eq!(tr(r"\sum_{i=1}^{n} i"), "∑ᵢ₌₁ⁿ i");
    }

    #[test]
    fn test_fractions() {
        assert_eq!(tr(r"\frac{1}{2}"), "½");
        assert_eq!(tr(r"\frac{a}{b}"), "a/b");
        assert_eq!(tr(r"\frac{a+b}{c}"), "(a+b)/c");
        assert_eq!(tr(r"1\frac{1}{2}"), "1 ½");
    }

    #[test]
    fn test_roots() {
        assert_eq!(tr(r"\sqrt{x}"), "√x");
        assert_eq!(tr(r"\sqrt{x+1}"), "√(x+1)");
        assert_eq!(tr(r"\sqrt[3]{8}"), "∛8");
        assert_eq!(tr(r"\sqrt[n]{x}"), "ⁿ√x");
    }

    #[test]
    fn test_scripts_fall_back_to_carets() {
        assert_eq!(tr("x^2"), "x²");
        assert_eq!(tr("e^{-1}"), "e⁻¹");
        assert_eq!(tr("x^{q}"), "x^q");
        assert_eq!(tr("x^{2q}"), "x^(2q)");
        assert_eq!(tr("a_{ij}"), "aᵢⱼ");
        assert_eq!(tr("a_{yz}"), "a_(yz)");
    }

    #[test]
    fn test_styles() {
        assert_eq!(tr(r"\mathbb{R}^n"), "ℝⁿ");
        assert_eq!(tr(r"\mathbf{v}"), "𝐯");
        assert_eq!(tr(r"\text{if } x"), "if  x");
    }

    #[test]
    fn test_negation_and_delimiters() {
        assert_eq!(tr(r"a \not= b"), "a ≠ b");
        assert_eq!(tr(r"x \not\in A"), "x ∉ A");
        assert_eq!(tr(r"\left( x \right)"), "( x )");
        assert_eq!(tr(r"\left\langle v \right."), "⟨ v ");
    }

    #[test]
    fn test_accents() {
        assert_eq!(tr(r"\hat{x}"), "x\u{0302}");
        assert_eq!(tr(r"\vec{ab}"), "a\u{20D7}b");
        assert_eq!(tr(r"\overline{ab}"), "a\u{0305}b\u{0305}");
    }

    #[test]
    fn test_environments() {
        assert_eq!(
            tr(r"\begin{pmatrix} a & b \\ c & d \end{pmatrix}"),
            "(a  b\nc  d)"
        );
        assert_eq!(
            tr(r"\begin{cases} 1 & x > 0 \\ 0 & x \leq 0 \end{cases}"),
            "⎧ 1, x > 0\n⎩ 0, x ≤ 0"
        );
    }

    #[test]
    fn test_unknown_commands_are_echoed() {
        assert_eq!(tr(r"\foo{x}"), r"\foox");
        assert_eq!(tr(r"\unknown"), r"\unknown");
    }

    #[test]
    fn test_malformed_input_does_not_panic() {
        for input in [
            "", "\\", "{", "}", "^", "_", r"\frac", r"\frac{", r"\sqrt[", r"\begin{x",
            r"\left", r"\not", "{{{{{{", "😀^😀", r"\mathbb{😀}",
        ] {
            let _ = tr(input);
        }
        let deep = format!("{}x{}", "{".repeat(100), "}".repeat(100));
        assert!(tr(&deep).contains('x'));
    }

    #[test]
    fn test_chained_commands_are_bounded() {
        let roots = tr(&format!("{}x", r"\sqrt".repeat(10_000)));
        assert!(roots.starts_with('√'));
        assert!(roots.contains(r"\sqrt\sqrt"));
        assert!(roots.contains('x'));

        let hats = tr(&format!("{}y", r"\hat".repeat(10_000)));
        assert!(hats.contains('y'));

        let text = tr(&format!("{}z", r"\text".repeat(10_000)));
        assert!(text.ends_with('z'));
    }

    #[test]
    fn test_nested_optional_arguments_are_bounded() {
        let roots = tr(&format!("{}x", r"\sqrt[".repeat(5_000)));
        assert!(roots.contains('x'));

        let closed = format!("{}x{}", r"\sqrt[".repeat(2_000), "]".repeat(2_000));
        assert!(tr(&closed).contains('x'));
    }

    #[test]
    fn test_nested_environments_are_bounded() {
        let cases = tr(&format!("{}x", r"\begin{cases}".repeat(5_000)));
        assert!(cases.contains('x'));
    }

    #[test]
    fn test_shallow_nesting_still_translates() {
        assert_eq!(tr(r"\sqrt{\sqrt{x}}"), "√(√x)");
        assert_eq!(tr(r"\sqrt[\sqrt[2]{4}]{x}"), "(√4)√x");
    }

    #[test]
    fn test_is_known_command() {
        assert!(is_known_command("frac"));
        assert!(is_known_command("alpha"));
        assert!(is_known_command("mathbb"));
        assert!(!is_known_command("foo"));
    }
}
