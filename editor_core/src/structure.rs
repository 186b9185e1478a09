//! Structural attributes derived from markdown text.
//!
//! `#tag` words carry [`Attribute::Tag`] and a leading `---` front-matter
//! block carries [`Attribute::YamlBlock`]. These attributes are recomputed
//! from the text after every edit and are never recorded in undo history.

use crate::attributes::{Attribute, AttributeKind};
use crate::buffer::TextBuffer;
use crate::paragraph;
use crate::patterns::char_range;
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)(?:^|[ \t])(#[\p{L}\p{N}_/-]+)").expect("valid tag regex"));

/// Rescans the paragraphs overlapping `range` for tags, and the front
/// matter of the buffer.
pub fn rescan(buffer: &mut TextBuffer, range: Range<usize>) {
    let len = buffer.len_chars();
    let range = range.start.min(len)..range.end.min(len);
    if let Some(paragraph) = paragraph::paragraph_range(buffer, range) {
        scan_tags(buffer, paragraph);
    }
    scan_front_matter(buffer);
}

/// Rescans the whole buffer.
pub fn rescan_all(buffer: &mut TextBuffer) {
    let len = buffer.len_chars();
    scan_tags(buffer, 0..len);
    scan_front_matter(buffer);
}

fn scan_tags(buffer: &mut TextBuffer, paragraph: Range<usize>) {
    let Ok(text) = buffer.slice(paragraph.clone()) else {
        return;
    };
    if buffer.remove_attribute(paragraph.clone(), AttributeKind::Tag).is_err() {
        return;
    }
    let tags: Vec<Range<usize>> = TAG_RE
        .captures_iter(&text)
        .filter_map(|caps| caps.get(1))
        .map(|m| char_range(&text, m.range()))
        .collect();
    for tag in tags {
        let range = paragraph.start + tag.start..paragraph.start + tag.end;
        if let Err(err) = buffer.add_attribute(range, Attribute::Tag) {
            log::debug!("tag scan: {}", err);
        }
    }
}

/// Range of a leading `---` ... `---` block, closing line included.
pub fn front_matter_range(buffer: &TextBuffer) -> Option<Range<usize>> {
    if buffer.line(0).as_deref() != Some("---") {
        return None;
    }
    (1..buffer.len_lines())
        .find(|&line| matches!(buffer.line(line).as_deref(), Some("---") | Some("...")))
        .map(|line| 0..buffer.line_end(line))
}

fn scan_front_matter(buffer: &mut TextBuffer) {
    let len = buffer.len_chars();
    if buffer.remove_attribute(0..len, AttributeKind::YamlBlock).is_err() {
        return;
    }
    if let Some(range) = front_matter_range(buffer) {
        if let Err(err) = buffer.add_attribute(range, Attribute::YamlBlock) {
            log::debug!("front matter scan: {}", err);
        }
    }
}
