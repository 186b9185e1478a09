//! Todo checkbox markers.
//!
//! Inside a session a todo marker is two characters: an object replacement
//! glyph carrying [`Attribute::Todo`] followed by a plain space. On disk it is
//! the literal `- [ ] ` / `- [x] ` prefix. Loading converts literal prefixes
//! into glyphs and strikes through the rest of checked lines; unloading
//! reverses the glyph conversion.

use crate::attributes::{Attribute, AttributeKind, AttributeSet, AttributedText, TodoState};
use crate::patterns;

/// Character standing in for a checkbox.
pub const CHECKBOX_GLYPH: char = '\u{FFFC}';

/// Length in characters of a marker (glyph plus space).
pub const MARKER_LEN: usize = 2;

/// Builds an attributed todo marker.
pub fn marker(state: TodoState) -> AttributedText {
    let mut marker = AttributedText::new();
    marker.push_styled(
        &CHECKBOX_GLYPH.to_string(),
        &AttributeSet::of(&[Attribute::Todo(state)]),
    );
    marker.push_str(" ");
    marker
}

/// Replaces literal todo prefixes with attributed markers.
pub fn load_checkboxes(text: &AttributedText) -> AttributedText {
    let mut out = AttributedText::new();
    let lines = text.line_ranges();
    let count = lines.len();

    for (idx, range) in lines.into_iter().enumerate() {
        let line = text.slice(range);
        match patterns::match_todo(line.as_str()) {
            Some(found) => {
                let indent_len = found.indent.chars().count();
                let state = match found.kind {
                    patterns::MarkerKind::Todo(state) => state,
                    _ => TodoState::Unchecked,
                };
                out.push_attributed(&line.slice(0..indent_len));
                out.push_attributed(&marker(state));

                let rest_start = out.len_chars();
                out.push_attributed(&line.slice(found.len_chars()..line.len_chars()));
                if state.is_checked() {
                    let end = out.len_chars();
                    out.add_attribute(rest_start..end, Attribute::Strike);
                }
            }
            None => out.push_attributed(&line),
        }
        if idx + 1 < count {
            out.push_str("\n");
        }
    }
    out
}

/// Replaces attributed markers with their literal form.
///
/// Only the glyph is rewritten; the space after it is kept, so a marker
/// becomes `- [ ] ` and positions after it shift by four per marker.
pub fn unload_checkboxes(text: &AttributedText) -> AttributedText {
    if !text.has_attribute(AttributeKind::Todo) {
        return text.clone();
    }

    let mut out = AttributedText::new();
    let mut keep_from = 0;
    for (idx, ch) in text.as_str().chars().enumerate() {
        if ch != CHECKBOX_GLYPH {
            continue;
        }
        if let Some(state) = text.attributes_at(idx).todo() {
            out.push_attributed(&text.slice(keep_from..idx));
            out.push_str(state.markdown());
            keep_from = idx + 1;
        }
    }
    out.push_attributed(&text.slice(keep_from..text.len_chars()));
    out
}

/// Position of the first todo glyph in `text`, with its state.
pub fn find_marker(text: &AttributedText) -> Option<(usize, TodoState)> {
    let (pos, attr) = text.runs().find(0..text.len_chars(), AttributeKind::Todo)?;
    match attr {
        Attribute::Todo(state) => Some((pos, state)),
        _ => None,
    }
}
