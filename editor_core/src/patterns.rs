//! Pattern matchers for markdown structure.
//!
//! Every matcher is a pure function over a single line (or paragraph) of
//! text. Line matchers are anchored at the line start and accept leading
//! tabs and spaces as indentation. Offsets returned by span finders are
//! character offsets into the searched text.

use crate::attributes::TodoState;
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

static TODO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([ \t]*)- \[([x ])\] ").expect("valid todo regex"));
static BULLET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([ \t]*)([-–—*•>+]) ").expect("valid bullet regex"));
static ORDERED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([ \t]*)([0-9]+)\. ").expect("valid ordered regex"));
static STRIP_BULLET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-–—*•+]+ ").expect("valid bullet strip regex"));
static HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(#{1,6})(?: |$)").expect("valid header regex"));
static BOLD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*[^*\n]*\*\*|__[^_\n]*__").expect("valid bold regex"));
static ITALIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*[^*\n]+\*|_[^_\n]+_").expect("valid italic regex"));
static STRIKE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"~~[^~\n]*~~").expect("valid strike regex"));
static CODE_SPAN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"`[^`\n]*`").expect("valid code span regex"));

/// What kind of list marker a line starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// Literal `- [ ] ` or `- [x] `.
    Todo(TodoState),
    /// One of `-`, `*`, `•`, `+`, `>` and dashes, followed by a space.
    Bullet(char),
    /// `N. ` with its number.
    Ordered(u64),
}

/// A list marker matched at the start of a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListMarker {
    pub indent: String,
    pub marker: String,
    pub kind: MarkerKind,
}

impl ListMarker {
    /// Indentation plus marker.
    pub fn prefix(&self) -> String {
        format!("{}{}", self.indent, self.marker)
    }

    pub fn len_chars(&self) -> usize {
        self.indent.chars().count() + self.marker.chars().count()
    }

    /// Prefix for the line that follows this one in the same list.
    pub fn continuation(&self) -> String {
        match self.kind {
            MarkerKind::Todo(_) => format!("{}{} ", self.indent, TodoState::Unchecked.markdown()),
            MarkerKind::Ordered(n) => format!("{}{}. ", self.indent, n.saturating_add(1)),
            MarkerKind::Bullet(_) => self.prefix(),
        }
    }
}

/// Matches a literal todo marker (`- [ ] ` / `- [x] `).
pub fn match_todo(line: &str) -> Option<ListMarker> {
    let caps = TODO_RE.captures(line)?;
    let state = if &caps[2] == "x" {
        TodoState::Checked
    } else {
        TodoState::Unchecked
    };
    Some(ListMarker {
        indent: caps[1].to_string(),
        marker: format!("{} ", state.markdown()),
        kind: MarkerKind::Todo(state),
    })
}

/// Matches an unordered marker, todo markers included.
pub fn match_unordered(line: &str) -> Option<ListMarker> {
    if let Some(todo) = match_todo(line) {
        return Some(todo);
    }
    let caps = BULLET_RE.captures(line)?;
    let bullet = caps[2].chars().next()?;
    Some(ListMarker {
        indent: caps[1].to_string(),
        marker: format!("{} ", bullet),
        kind: MarkerKind::Bullet(bullet),
    })
}

/// Matches an ordered marker (`12. `).
pub fn match_ordered(line: &str) -> Option<ListMarker> {
    let caps = ORDERED_RE.captures(line)?;
    let number = caps[2].parse().unwrap_or(u64::MAX);
    Some(ListMarker {
        indent: caps[1].to_string(),
        marker: format!("{}. ", &caps[2]),
        kind: MarkerKind::Ordered(number),
    })
}

/// Matches any list marker.
pub fn match_list(line: &str) -> Option<ListMarker> {
    match_unordered(line).or_else(|| match_ordered(line))
}

/// Returns true if the line carries a list marker of the requested family.
/// Todo lines belong to neither family.
pub fn has_list_prefix(line: &str, ordered: bool) -> bool {
    if match_todo(line).is_some() {
        return false;
    }
    if ordered {
        return match_ordered(line).is_some();
    }
    matches!(match_unordered(line), Some(ListMarker { kind: MarkerKind::Bullet(c), .. }) if c != '>')
}

/// Removes a todo, ordered or bullet marker, keeping indentation.
pub fn strip_list_marker(line: &str) -> String {
    let (indent, body) = split_indent(line);
    let rest = if let Some(rest) = body
        .strip_prefix("- [ ] ")
        .or_else(|| body.strip_prefix("- [x] "))
    {
        rest
    } else if let Some(m) = ORDERED_RE.find(body) {
        &body[m.end()..]
    } else if let Some(m) = STRIP_BULLET_RE.find(body) {
        if body.contains("- [") {
            body
        } else {
            &body[m.end()..]
        }
    } else {
        body
    };
    format!("{}{}", indent, rest)
}

/// Splits a line into its leading tabs/spaces and the rest.
pub fn split_indent(line: &str) -> (&str, &str) {
    let idx = line
        .find(|c: char| c != ' ' && c != '\t')
        .unwrap_or(line.len());
    line.split_at(idx)
}

/// Level of a leading ATX header run, with the byte length of run plus space.
pub fn match_header(line: &str) -> Option<(usize, usize)> {
    let caps = HEADER_RE.captures(line)?;
    let level = caps[1].len();
    Some((level, caps[0].len()))
}

/// True if the text contains at least one letter.
pub fn contains_letters(text: &str) -> bool {
    text.chars().any(char::is_alphabetic)
}

/// Inline styles expressed with markdown delimiters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlineStyle {
    Bold,
    Italic,
    Strike,
}

impl InlineStyle {
    /// Delimiter inserted when wrapping.
    pub fn delimiter(self) -> &'static str {
        match self {
            InlineStyle::Bold => "**",
            InlineStyle::Italic => "_",
            InlineStyle::Strike => "~~",
        }
    }

    /// Every delimiter recognised for this style, longest first.
    pub fn delimiters(self) -> &'static [&'static str] {
        match self {
            InlineStyle::Bold => &["**", "__"],
            InlineStyle::Italic => &["*", "_"],
            InlineStyle::Strike => &["~~"],
        }
    }

    /// True if `text` contains any of the style's delimiters.
    pub fn contains_delimiter(self, text: &str) -> bool {
        self.delimiters().iter().any(|d| text.contains(d))
    }

    /// Finds the delimited span containing `offset` (ends inclusive).
    pub fn span_at(self, text: &str, offset: usize) -> Option<Range<usize>> {
        let spans: Vec<Range<usize>> = match self {
            InlineStyle::Bold => BOLD_RE.find_iter(text).map(|m| m.range()).collect(),
            InlineStyle::Strike => STRIKE_RE.find_iter(text).map(|m| m.range()).collect(),
            InlineStyle::Italic => italic_spans(text),
        };
        spans
            .into_iter()
            .map(|r| char_range(text, r))
            .find(|r| r.start <= offset && offset <= r.end)
    }
}

/// Byte ranges of single-delimiter italic spans. A match touching a second
/// copy of its delimiter is part of a bold run and is skipped.
fn italic_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut at = 0;
    while let Some(m) = ITALIC_RE.find_at(text, at) {
        let delim = &text[m.start()..m.start() + 1];
        if text[..m.start()].ends_with(delim) || text[m.end()..].starts_with(delim) {
            at = m.start() + 1;
        } else {
            spans.push(m.range());
            at = m.end();
        }
    }
    spans
}

/// Finds the code span containing `offset` (ends inclusive).
pub fn code_span_at(text: &str, offset: usize) -> Option<Range<usize>> {
    CODE_SPAN_RE
        .find_iter(text)
        .map(|m| char_range(text, m.range()))
        .find(|r| r.start <= offset && offset <= r.end)
}

/// Converts a byte range of `text` into a character range.
pub fn char_range(text: &str, bytes: Range<usize>) -> Range<usize> {
    let start = text[..bytes.start].chars().count();
    let len = text[bytes.start..bytes.end].chars().count();
    start..start + len
}
