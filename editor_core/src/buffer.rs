//! Attributed text buffer using ropey.

use crate::attributes::{Attribute, AttributeKind, AttributeRuns, AttributeSet, AttributedText};
use crate::error::{check_range, EditError};
use ropey::Rope;
use std::ops::Range;
use unicode_segmentation::UnicodeSegmentation;

/// A text buffer backed by a rope, with an attribute run map alongside.
/// All positions are character indices.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    rope: Rope,
    runs: AttributeRuns,
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextBuffer {
    /// Creates a new empty text buffer.
    pub fn new() -> Self {
        Self {
            rope: Rope::new(),
            runs: AttributeRuns::new(),
        }
    }

    /// Creates an unattributed text buffer from a string.
    pub fn from_str(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            runs: AttributeRuns::new(),
        }
    }

    /// Creates a buffer holding the given attributed text.
    pub fn from_attributed(text: &AttributedText) -> Self {
        Self {
            rope: Rope::from_str(text.as_str()),
            runs: text.runs().clone(),
        }
    }

    /// Returns the total number of characters in the buffer.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Returns the total number of lines in the buffer.
    pub fn len_lines(&self) -> usize {
        self.rope.len_lines()
    }

    /// Returns true if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Returns the character at the given index, if it exists.
    pub fn char_at(&self, char_idx: usize) -> Option<char> {
        if char_idx < self.len_chars() {
            Some(self.rope.char(char_idx))
        } else {
            None
        }
    }

    /// Replaces `range` with `content`, returning the removed text.
    pub fn replace(&mut self, range: Range<usize>, content: &AttributedText) -> Result<AttributedText, EditError> {
        check_range(&range, self.len_chars())?;
        let removed = self.attributed_slice(range.clone())?;
        if !range.is_empty() {
            self.rope.remove(range.clone());
        }
        if !content.is_empty() {
            self.rope.insert(range.start, content.as_str());
        }
        self.runs.splice(range, content.len_chars(), content.runs());
        Ok(removed)
    }

    /// Returns the text in `range`.
    pub fn slice(&self, range: Range<usize>) -> Result<String, EditError> {
        check_range(&range, self.len_chars())?;
        Ok(self.rope.slice(range).to_string())
    }

    /// Returns the text in `range` together with its attributes.
    pub fn attributed_slice(&self, range: Range<usize>) -> Result<AttributedText, EditError> {
        let text = self.slice(range.clone())?;
        Ok(AttributedText::from_parts(text, self.runs.slice(range)))
    }

    /// Returns the attribute runs of `range`, rebased to start at 0.
    pub fn runs_slice(&self, range: Range<usize>) -> Result<AttributeRuns, EditError> {
        check_range(&range, self.len_chars())?;
        Ok(self.runs.slice(range))
    }

    /// Overwrites the attribute runs of `range` without touching the text.
    pub fn set_runs(&mut self, range: Range<usize>, runs: &AttributeRuns) -> Result<(), EditError> {
        check_range(&range, self.len_chars())?;
        let len = range.end - range.start;
        self.runs.splice(range, len, runs);
        Ok(())
    }

    pub fn runs(&self) -> &AttributeRuns {
        &self.runs
    }

    /// Returns the attributes of the character at `pos`.
    pub fn attributes_at(&self, pos: usize) -> AttributeSet {
        self.runs.attributes_at(pos)
    }

    pub fn add_attribute(&mut self, range: Range<usize>, attr: Attribute) -> Result<(), EditError> {
        check_range(&range, self.len_chars())?;
        self.runs.add(range, attr);
        Ok(())
    }

    pub fn remove_attribute(&mut self, range: Range<usize>, kind: AttributeKind) -> Result<(), EditError> {
        check_range(&range, self.len_chars())?;
        self.runs.remove(range, kind);
        Ok(())
    }

    /// Returns the whole buffer as attributed text.
    pub fn to_attributed(&self) -> AttributedText {
        AttributedText::from_parts(self.rope.to_string(), self.runs.clone())
    }

    /// Widens `range` so neither end splits a grapheme cluster.
    pub fn snap_to_graphemes(&self, range: Range<usize>) -> Range<usize> {
        let start = self.grapheme_boundary(range.start, false);
        let end = self.grapheme_boundary(range.end, true).max(start);
        start..end
    }

    /// Nearest grapheme boundary at or before (or after, if `forward`) `pos`.
    fn grapheme_boundary(&self, pos: usize, forward: bool) -> usize {
        let pos = pos.min(self.len_chars());
        let line = self.rope.char_to_line(pos);
        let line_start = self.rope.line_to_char(line);
        let text = self.rope.line(line).to_string();
        let offset = pos - line_start;

        let mut boundary = 0;
        for grapheme in text.graphemes(true) {
            let next = boundary + grapheme.chars().count();
            if next > offset {
                if boundary == offset || !forward {
                    return line_start + boundary;
                }
                return line_start + next;
            }
            boundary = next;
        }
        line_start + boundary.min(offset)
    }

    /// Converts a character index to a (line, column) position.
    /// Both line and column are 0-indexed.
    pub fn char_to_line_col(&self, char_idx: usize) -> (usize, usize) {
        let char_idx = char_idx.min(self.len_chars());
        let line = self.rope.char_to_line(char_idx);
        let line_start = self.rope.line_to_char(line);
        (line, char_idx - line_start)
    }

    /// Returns the line index containing a character index.
    pub fn char_to_line(&self, char_idx: usize) -> usize {
        self.rope.char_to_line(char_idx.min(self.len_chars()))
    }

    /// Returns the length of a line in characters (excluding newline).
    pub fn line_len_chars(&self, line: usize) -> usize {
        if line >= self.len_lines() {
            return 0;
        }
        let line_slice = self.rope.line(line);
        let len = line_slice.len_chars();
        if len > 0 && line_slice.char(len - 1) == '\n' {
            return len - 1;
        }
        len
    }

    /// Returns the character index of the start of a line.
    pub fn line_start(&self, line: usize) -> usize {
        if line >= self.len_lines() {
            self.len_chars()
        } else {
            self.rope.line_to_char(line)
        }
    }

    /// Returns the character index of the end of a line (before newline).
    pub fn line_end(&self, line: usize) -> usize {
        if line >= self.len_lines() {
            self.len_chars()
        } else {
            self.rope.line_to_char(line) + self.line_len_chars(line)
        }
    }

    /// Returns the line at the given index as a string.
    pub fn line(&self, line: usize) -> Option<String> {
        if line >= self.len_lines() {
            return None;
        }
        let mut s = self.rope.line(line).to_string();
        if s.ends_with('\n') {
            s.pop();
        }
        Some(s)
    }

    /// Returns the entire buffer as a string.
    pub fn to_string(&self) -> String {
        self.rope.to_string()
    }
}
