//! Paragraph location.
//!
//! A paragraph is the run of whole lines touched by a range, excluding the
//! line break that ends the last line. It is recomputed for every operation.

use crate::buffer::TextBuffer;
use std::ops::Range;

/// Extends `range` outward to whole lines.
///
/// Returns `None` if the range reaches past the end of the buffer. A non-empty
/// range that ends right after a line break stays on the line it ends.
pub fn paragraph_range(buffer: &TextBuffer, range: Range<usize>) -> Option<Range<usize>> {
    let len = buffer.len_chars();
    if range.end > len || range.start > range.end {
        log::debug!(
            "paragraph lookup for {}..{} on buffer of length {}",
            range.start,
            range.end,
            len
        );
        return None;
    }

    let first_line = buffer.char_to_line(range.start);
    let last_line = if range.end > range.start && buffer.char_at(range.end - 1) == Some('\n') {
        buffer.char_to_line(range.end - 1)
    } else {
        buffer.char_to_line(range.end)
    };

    Some(buffer.line_start(first_line)..buffer.line_end(last_line))
}

/// Paragraph containing a single position.
pub fn paragraph_at(buffer: &TextBuffer, pos: usize) -> Option<Range<usize>> {
    paragraph_range(buffer, pos..pos)
}

/// Extends a paragraph range over its trailing line break, if there is one.
pub fn with_line_break(buffer: &TextBuffer, paragraph: Range<usize>) -> Range<usize> {
    if buffer.char_at(paragraph.end) == Some('\n') {
        paragraph.start..paragraph.end + 1
    } else {
        paragraph
    }
}
