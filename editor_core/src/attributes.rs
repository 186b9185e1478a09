//! Character attributes and the run map that stores them.
//!
//! Attributes live beside the text rather than inside it: a buffer owns an
//! [`AttributeRuns`] interval map whose spans are sorted, non-overlapping and
//! never carry an empty set. Offsets are character indices.

use std::ops::Range;

/// Completion state of a todo marker glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TodoState {
    Unchecked,
    Checked,
}

impl TodoState {
    /// Returns the opposite state.
    pub fn toggled(self) -> Self {
        match self {
            TodoState::Unchecked => TodoState::Checked,
            TodoState::Checked => TodoState::Unchecked,
        }
    }

    pub fn is_checked(self) -> bool {
        self == TodoState::Checked
    }

    /// Literal markdown form of a todo marker (without the trailing space).
    pub fn markdown(self) -> &'static str {
        match self {
            TodoState::Unchecked => "- [ ]",
            TodoState::Checked => "- [x]",
        }
    }
}

/// A single attribute carried by a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Bold,
    Italic,
    Underline,
    Strike,
    Todo(TodoState),
    Tag,
    YamlBlock,
}

/// Attribute identity without payload, used for lookups and removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttributeKind {
    Bold,
    Italic,
    Underline,
    Strike,
    Todo,
    Tag,
    YamlBlock,
}

impl Attribute {
    pub fn kind(&self) -> AttributeKind {
        match self {
            Attribute::Bold => AttributeKind::Bold,
            Attribute::Italic => AttributeKind::Italic,
            Attribute::Underline => AttributeKind::Underline,
            Attribute::Strike => AttributeKind::Strike,
            Attribute::Todo(_) => AttributeKind::Todo,
            Attribute::Tag => AttributeKind::Tag,
            Attribute::YamlBlock => AttributeKind::YamlBlock,
        }
    }
}

/// A set of attributes holding at most one attribute per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeSet {
    attrs: Vec<Attribute>,
}

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from the given attributes; later entries win per kind.
    pub fn of(attrs: &[Attribute]) -> Self {
        let mut set = Self::new();
        for attr in attrs {
            set.insert(*attr);
        }
        set
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.attrs.iter()
    }

    pub fn contains(&self, attr: Attribute) -> bool {
        self.attrs.contains(&attr)
    }

    pub fn contains_kind(&self, kind: AttributeKind) -> bool {
        self.get(kind).is_some()
    }

    pub fn get(&self, kind: AttributeKind) -> Option<Attribute> {
        self.attrs.iter().copied().find(|a| a.kind() == kind)
    }

    /// Returns the todo state, if the set carries a todo marker.
    pub fn todo(&self) -> Option<TodoState> {
        match self.get(AttributeKind::Todo) {
            Some(Attribute::Todo(state)) => Some(state),
            _ => None,
        }
    }

    /// Inserts an attribute, replacing any attribute of the same kind.
    pub fn insert(&mut self, attr: Attribute) {
        let kind = attr.kind();
        match self.attrs.binary_search_by(|a| a.kind().cmp(&kind)) {
            Ok(idx) => self.attrs[idx] = attr,
            Err(idx) => self.attrs.insert(idx, attr),
        }
    }

    /// Removes the attribute of the given kind, returning it.
    pub fn remove(&mut self, kind: AttributeKind) -> Option<Attribute> {
        let idx = self.attrs.iter().position(|a| a.kind() == kind)?;
        Some(self.attrs.remove(idx))
    }

    /// Inserts the attribute if its kind is absent, removes it otherwise.
    /// Returns true if the attribute is present afterwards.
    pub fn toggle(&mut self, attr: Attribute) -> bool {
        if self.remove(attr.kind()).is_some() {
            false
        } else {
            self.insert(attr);
            true
        }
    }
}

/// One attributed span of a run map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub range: Range<usize>,
    pub attrs: AttributeSet,
}

fn push_span(out: &mut Vec<Span>, range: Range<usize>, attrs: AttributeSet) {
    if range.is_empty() || attrs.is_empty() {
        return;
    }
    if let Some(last) = out.last_mut() {
        if last.range.end == range.start && last.attrs == attrs {
            last.range.end = range.end;
            return;
        }
    }
    out.push(Span { range, attrs });
}

/// Interval map from character ranges to attribute sets.
///
/// Characters not covered by any span carry no attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeRuns {
    spans: Vec<Span>,
}

impl AttributeRuns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a run map covering `0..len` with a single attribute set.
    pub fn uniform(len: usize, attrs: AttributeSet) -> Self {
        let mut spans = Vec::new();
        push_span(&mut spans, 0..len, attrs);
        Self { spans }
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Index of the first span ending after `pos`.
    fn first_after(&self, pos: usize) -> usize {
        self.spans.partition_point(|s| s.range.end <= pos)
    }

    /// Returns the attributes at a character position.
    pub fn attributes_at(&self, pos: usize) -> AttributeSet {
        let idx = self.first_after(pos);
        match self.spans.get(idx) {
            Some(span) if span.range.start <= pos => span.attrs.clone(),
            _ => AttributeSet::new(),
        }
    }

    /// Returns true if any character in `range` carries an attribute of `kind`.
    pub fn any_in(&self, range: Range<usize>, kind: AttributeKind) -> bool {
        self.find(range, kind).is_some()
    }

    /// Returns the first position in `range` carrying `kind`, and the attribute.
    pub fn find(&self, range: Range<usize>, kind: AttributeKind) -> Option<(usize, Attribute)> {
        let idx = self.first_after(range.start);
        for span in &self.spans[idx..] {
            if span.range.start >= range.end {
                break;
            }
            if let Some(attr) = span.attrs.get(kind) {
                return Some((span.range.start.max(range.start), attr));
            }
        }
        None
    }

    /// Applies `f` to the attribute set of every character in `range`.
    pub fn update<F>(&mut self, range: Range<usize>, mut f: F)
    where
        F: FnMut(&mut AttributeSet),
    {
        if range.is_empty() {
            return;
        }
        let mut out = Vec::with_capacity(self.spans.len() + 2);
        let mut cursor = range.start;

        for span in self.spans.drain(..) {
            if span.range.end <= range.start {
                push_span(&mut out, span.range, span.attrs);
                continue;
            }
            if span.range.start >= range.end {
                if cursor < range.end {
                    let mut attrs = AttributeSet::new();
                    f(&mut attrs);
                    push_span(&mut out, cursor..range.end, attrs);
                    cursor = range.end;
                }
                push_span(&mut out, span.range, span.attrs);
                continue;
            }

            if span.range.start < range.start {
                push_span(&mut out, span.range.start..range.start, span.attrs.clone());
            }
            let inner_start = span.range.start.max(range.start);
            if cursor < inner_start {
                let mut attrs = AttributeSet::new();
                f(&mut attrs);
                push_span(&mut out, cursor..inner_start, attrs);
            }
            let inner_end = span.range.end.min(range.end);
            let mut attrs = span.attrs.clone();
            f(&mut attrs);
            push_span(&mut out, inner_start..inner_end, attrs);
            cursor = inner_end;
            if span.range.end > range.end {
                push_span(&mut out, range.end..span.range.end, span.attrs);
            }
        }

        if cursor < range.end {
            let mut attrs = AttributeSet::new();
            f(&mut attrs);
            push_span(&mut out, cursor..range.end, attrs);
        }

        self.spans = out;
    }

    pub fn add(&mut self, range: Range<usize>, attr: Attribute) {
        self.update(range, |set| set.insert(attr));
    }

    pub fn remove(&mut self, range: Range<usize>, kind: AttributeKind) {
        self.update(range, |set| {
            set.remove(kind);
        });
    }

    /// Returns the runs inside `range`, rebased so that `range.start` is 0.
    pub fn slice(&self, range: Range<usize>) -> AttributeRuns {
        let mut spans = Vec::new();
        let idx = self.first_after(range.start);
        for span in &self.spans[idx..] {
            if span.range.start >= range.end {
                break;
            }
            let start = span.range.start.max(range.start) - range.start;
            let end = span.range.end.min(range.end) - range.start;
            push_span(&mut spans, start..end, span.attrs.clone());
        }
        AttributeRuns { spans }
    }

    /// Replaces the runs of `range` with `inserted`, which covers
    /// `inserted_len` characters. Spans after the range shift accordingly.
    pub fn splice(&mut self, range: Range<usize>, inserted_len: usize, inserted: &AttributeRuns) {
        let removed = range.end - range.start;
        let mut before = Vec::new();
        let mut after = Vec::new();

        for span in self.spans.drain(..) {
            if span.range.end <= range.start {
                before.push(span);
                continue;
            }
            if span.range.start >= range.end {
                let start = span.range.start - removed + inserted_len;
                let end = span.range.end - removed + inserted_len;
                after.push(Span { range: start..end, attrs: span.attrs });
                continue;
            }
            if span.range.start < range.start {
                before.push(Span {
                    range: span.range.start..range.start,
                    attrs: span.attrs.clone(),
                });
            }
            if span.range.end > range.end {
                let start = range.start + inserted_len;
                let end = span.range.end - removed + inserted_len;
                after.push(Span { range: start..end, attrs: span.attrs });
            }
        }

        let mut out = Vec::with_capacity(before.len() + inserted.spans.len() + after.len());
        for span in before {
            push_span(&mut out, span.range, span.attrs);
        }
        for span in &inserted.spans {
            let start = (range.start + span.range.start).min(range.start + inserted_len);
            let end = (range.start + span.range.end).min(range.start + inserted_len);
            push_span(&mut out, start..end, span.attrs.clone());
        }
        for span in after {
            push_span(&mut out, span.range, span.attrs);
        }
        self.spans = out;
    }
}

/// Text paired with its attribute runs; the unit of content that edits
/// insert and remove.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributedText {
    text: String,
    len: usize,
    runs: AttributeRuns,
}

impl AttributedText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates unattributed text.
    pub fn plain(text: impl Into<String>) -> Self {
        let text = text.into();
        let len = text.chars().count();
        Self {
            text,
            len,
            runs: AttributeRuns::new(),
        }
    }

    /// Creates text where every character carries `attrs`.
    pub fn styled(text: impl Into<String>, attrs: AttributeSet) -> Self {
        let text = text.into();
        let len = text.chars().count();
        Self {
            runs: AttributeRuns::uniform(len, attrs),
            text,
            len,
        }
    }

    pub(crate) fn from_parts(text: String, runs: AttributeRuns) -> Self {
        let len = text.chars().count();
        Self { text, len, runs }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn runs(&self) -> &AttributeRuns {
        &self.runs
    }

    /// Length in characters.
    pub fn len_chars(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn attributes_at(&self, pos: usize) -> AttributeSet {
        self.runs.attributes_at(pos)
    }

    pub fn has_attribute(&self, kind: AttributeKind) -> bool {
        self.runs.any_in(0..self.len, kind)
    }

    pub fn add_attribute(&mut self, range: Range<usize>, attr: Attribute) {
        let range = range.start.min(self.len)..range.end.min(self.len);
        self.runs.add(range, attr);
    }

    pub fn remove_attribute(&mut self, range: Range<usize>, kind: AttributeKind) {
        let range = range.start.min(self.len)..range.end.min(self.len);
        self.runs.remove(range, kind);
    }

    pub fn push_str(&mut self, s: &str) {
        self.text.push_str(s);
        self.len += s.chars().count();
    }

    pub fn push_styled(&mut self, s: &str, attrs: &AttributeSet) {
        let start = self.len;
        self.push_str(s);
        let end = self.len;
        let attrs = attrs.clone();
        self.runs.update(start..end, |set| *set = attrs.clone());
    }

    /// Appends another attributed text, keeping its attributes.
    pub fn push_attributed(&mut self, other: &AttributedText) {
        let start = self.len;
        self.text.push_str(&other.text);
        self.len += other.len;
        self.runs.splice(start..start, other.len, &other.runs);
    }

    /// Returns the characters in `range` with their attributes.
    pub fn slice(&self, range: Range<usize>) -> AttributedText {
        let start = range.start.min(self.len);
        let end = range.end.min(self.len).max(start);
        let text: String = self.text.chars().skip(start).take(end - start).collect();
        AttributedText {
            text,
            len: end - start,
            runs: self.runs.slice(start..end),
        }
    }

    /// Character ranges of each line, excluding the `\n` separators.
    pub fn line_ranges(&self) -> Vec<Range<usize>> {
        let mut ranges = Vec::new();
        let mut start = 0;
        for (idx, ch) in self.text.chars().enumerate() {
            if ch == '\n' {
                ranges.push(start..idx);
                start = idx + 1;
            }
        }
        ranges.push(start..self.len);
        ranges
    }

    /// Removes every occurrence of `pattern`, scanning left to right.
    pub fn strip_all(&self, pattern: &str) -> AttributedText {
        if pattern.is_empty() || !self.text.contains(pattern) {
            return self.clone();
        }
        let pattern_len = pattern.chars().count();
        let chars: Vec<char> = self.text.chars().collect();
        let pattern: Vec<char> = pattern.chars().collect();

        let mut out = AttributedText::new();
        let mut idx = 0;
        let mut keep_from = 0;
        while idx < chars.len() {
            if chars[idx..].starts_with(&pattern) {
                out.push_attributed(&self.slice(keep_from..idx));
                idx += pattern_len;
                keep_from = idx;
            } else {
                idx += 1;
            }
        }
        out.push_attributed(&self.slice(keep_from..chars.len()));
        out
    }
}

impl From<&str> for AttributedText {
    fn from(text: &str) -> Self {
        AttributedText::plain(text)
    }
}

impl From<String> for AttributedText {
    fn from(text: String) -> Self {
        AttributedText::plain(text)
    }
}
