//! Inline style toggles and headers.

use super::TextFormatter;
use crate::attributes::{Attribute, AttributedText};
use crate::cursor::Selection;
use crate::note::NoteMode;
use crate::patterns::{self, InlineStyle};
use crate::transaction::EditPlan;
use std::ops::Range;

fn style_name(style: InlineStyle) -> &'static str {
    match style {
        InlineStyle::Bold => "Bold",
        InlineStyle::Italic => "Italic",
        InlineStyle::Strike => "Strikethrough",
    }
}

const HEADER_NAMES: [&str; 6] = [
    "Header 1", "Header 2", "Header 3", "Header 4", "Header 5", "Header 6",
];

impl TextFormatter<'_> {
    pub fn bold(&mut self) -> bool {
        self.toggle_inline(InlineStyle::Bold, Attribute::Bold)
    }

    pub fn italic(&mut self) -> bool {
        self.toggle_inline(InlineStyle::Italic, Attribute::Italic)
    }

    pub fn strike(&mut self) -> bool {
        self.toggle_inline(InlineStyle::Strike, Attribute::Strike)
    }

    /// Underline has no markdown syntax and only applies to rich text.
    pub fn underline(&mut self) -> bool {
        if !self.requires("Underline", &[NoteMode::RichText]) {
            return false;
        }
        self.toggle_attribute(Attribute::Underline, "Underline")
    }

    fn toggle_inline(&mut self, style: InlineStyle, attr: Attribute) -> bool {
        match self.mode() {
            NoteMode::Markdown => self.toggle_delimiters(style),
            NoteMode::RichText => self.toggle_attribute(attr, style_name(style)),
            NoteMode::PlainText => {
                log::debug!("`{}` does not apply to plain text notes", style_name(style));
                false
            }
        }
    }

    /// Markdown toggle: unwrap the span around the caret, or a selection that
    /// contains or is enclosed by delimiters; wrap otherwise.
    fn toggle_delimiters(&mut self, style: InlineStyle) -> bool {
        let name = style_name(style);
        let sel = self.selection();
        let Some(paragraph) = self.paragraph() else {
            return false;
        };

        if sel.is_caret() {
            let text = self.text(paragraph.clone());
            if let Some(span) = style.span_at(&text, sel.location - paragraph.start) {
                let range = paragraph.start + span.start..paragraph.start + span.end;
                return self.unwrap_delimiters(style, name, range);
            }
        } else if style.contains_delimiter(&self.text(sel.range())) {
            return self.unwrap_delimiters(style, name, sel.range());
        }

        if let Some(range) = self.enclosing_delimiters(style, sel.range()) {
            return self.unwrap_delimiters(style, name, range);
        }

        let delimiter = style.delimiter();
        let mut wrapped = AttributedText::plain(delimiter);
        wrapped.push_attributed(&self.attributed(sel.range()));
        wrapped.push_str(delimiter);
        let select = Selection::new(sel.location + delimiter.chars().count(), sel.length);
        self.apply(EditPlan::new(name).replace(sel.range(), wrapped).select(select))
    }

    /// Range extended over a delimiter pair directly around `range`.
    fn enclosing_delimiters(&self, style: InlineStyle, range: Range<usize>) -> Option<Range<usize>> {
        let buffer = self.session.buffer();
        for delimiter in style.delimiters() {
            let n = delimiter.chars().count();
            if range.start < n || range.end + n > buffer.len_chars() {
                continue;
            }
            let outer = range.start - n..range.end + n;
            let before = buffer.slice(outer.start..range.start).ok()?;
            let after = buffer.slice(range.end..outer.end).ok()?;
            if before != *delimiter || after != *delimiter {
                continue;
            }
            // A single `*` inside `**` belongs to the bold pair.
            let fill = delimiter.chars().next();
            let doubled = (outer.start > 0 && buffer.char_at(outer.start - 1) == fill)
                || buffer.char_at(outer.end) == fill;
            if !doubled {
                return Some(outer);
            }
        }
        None
    }

    fn unwrap_delimiters(&mut self, style: InlineStyle, name: &'static str, range: Range<usize>) -> bool {
        let mut text = self.attributed(range.clone());
        for delimiter in style.delimiters() {
            text = text.strip_all(delimiter);
        }
        let select = Selection::new(range.start, text.len_chars());
        self.apply(EditPlan::new(name).replace(range, text).select(select))
    }

    /// Rich text toggle: flips `attr` over the selection based on the first
    /// selected character, or in the typing attributes for a caret.
    fn toggle_attribute(&mut self, attr: Attribute, name: &'static str) -> bool {
        let sel = self.selection();
        if sel.is_caret() {
            let on = self.session.typing_attributes_mut().toggle(attr);
            log::trace!("typing attribute {:?} {}", attr, if on { "on" } else { "off" });
            return true;
        }

        let present = self
            .session
            .buffer()
            .attributes_at(sel.location)
            .contains_kind(attr.kind());
        let plan = if present {
            EditPlan::new(name).remove_attribute(sel.range(), attr.kind())
        } else {
            EditPlan::new(name).add_attribute(sel.range(), attr)
        };
        if !self.apply(plan.select(sel)) {
            return false;
        }

        let typing = self.session.typing_attributes_mut();
        if present {
            typing.remove(attr.kind());
        } else {
            typing.insert(attr);
        }
        true
    }

    /// Sets the first line of the paragraph to an ATX header of `level`
    /// (1 to 6), or removes the header if it already has that level.
    pub fn header(&mut self, level: u8) -> bool {
        if !(1..=6).contains(&level) {
            log::debug!("header level {} out of range", level);
            return false;
        }
        let name = HEADER_NAMES[usize::from(level) - 1];
        if !self.requires(name, &[NoteMode::Markdown]) {
            return false;
        }
        let sel = self.selection();
        let Some(paragraph) = self.paragraph() else {
            return false;
        };

        let buffer = self.session.buffer();
        let line_end = buffer.line_end(buffer.char_to_line(paragraph.start));
        let line = self.text(paragraph.start..line_end);

        let new_line = match patterns::match_header(&line) {
            Some((existing, len)) if existing == usize::from(level) => line[len..].to_string(),
            Some((_, len)) => format!("{} {}", "#".repeat(level.into()), line[len..].trim_start()),
            None => format!("{} {}", "#".repeat(level.into()), line.trim_start()),
        };
        let new_len = new_line.chars().count();

        let full_selection = sel.has_selection() && sel.range() == paragraph;
        let select = if full_selection {
            let old_line_len = line_end - paragraph.start;
            Selection::new(paragraph.start, paragraph.end - paragraph.start - old_line_len + new_len)
        } else {
            Selection::caret(paragraph.start + new_len)
        };
        self.apply(
            EditPlan::new(name)
                .replace(paragraph.start..line_end, new_line)
                .select(select),
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::attributes::{Attribute, AttributeSet};
    use crate::config::FormatterConfig;
    use crate::cursor::Selection;
    use crate::note::{MemoryNote, NoteMode};
    use crate::session::EditorSession;

    fn markdown(text: &str, selection: Selection) -> EditorSession {
        let mut session = EditorSession::markdown(text);
        session.set_selection(selection);
        session
    }

    fn rich(text: &str, selection: Selection) -> EditorSession {
        let note = MemoryNote::rich_text(text.into());
        let mut session = EditorSession::open(&note, FormatterConfig::default());
        session.set_selection(selection);
        session
    }

    #[test]
    fn test_bold_wraps_selection() {
        let mut session = markdown("make it bold", Selection::new(8, 4));
        assert!(session.formatter().unwrap().bold());
        assert_eq!(session.text(), "make it **bold**");
        assert_eq!(session.selection(), Selection::new(10, 4));
    }

    #[test]
    fn test_bold_empty_selection_places_caret_between() {
        let mut session = markdown("", Selection::caret(0));
        assert!(session.formatter().unwrap().bold());
        assert_eq!(session.text(), "****");
        assert_eq!(session.selection(), Selection::caret(2));

        // Toggling again removes the empty pair.
        assert!(session.formatter().unwrap().bold());
        assert_eq!(session.text(), "");
    }

    #[test]
    fn test_bold_caret_inside_unwraps() {
        let mut session = markdown("say **bold** now", Selection::caret(8));
        assert!(session.formatter().unwrap().bold());
        assert_eq!(session.text(), "say bold now");
        assert_eq!(session.selection(), Selection::new(4, 4));
    }

    #[test]
    fn test_bold_selection_with_delimiters_unwraps() {
        let mut session = markdown("a __b__ c", Selection::new(0, 9));
        assert!(session.formatter().unwrap().bold());
        assert_eq!(session.text(), "a b c");
        assert_eq!(session.selection(), Selection::new(0, 5));
    }

    #[test]
    fn test_bold_round_trip() {
        let mut session = markdown("word", Selection::new(0, 4));
        session.formatter().unwrap().bold();
        assert_eq!(session.text(), "**word**");
        session.formatter().unwrap().bold();
        assert_eq!(session.text(), "word");
        assert_eq!(session.selection(), Selection::new(0, 4));
    }

    #[test]
    fn test_italic_uses_underscore() {
        let mut session = markdown("word", Selection::new(0, 4));
        session.formatter().unwrap().italic();
        assert_eq!(session.text(), "_word_");
        session.formatter().unwrap().italic();
        assert_eq!(session.text(), "word");
    }

    #[test]
    fn test_italic_inside_bold_wraps() {
        let mut session = markdown("**word**", Selection::new(2, 4));
        session.formatter().unwrap().italic();
        assert_eq!(session.text(), "**_word_**");
    }

    #[test]
    fn test_strike_caret_toggle_symmetry() {
        let mut session = markdown("x ~~gone~~ y", Selection::caret(5));
        session.formatter().unwrap().strike();
        assert_eq!(session.text(), "x gone y");
        session.formatter().unwrap().strike();
        assert_eq!(session.text(), "x ~~gone~~ y");
    }

    #[test]
    fn test_plain_text_ignores_inline() {
        let note = MemoryNote::plain_text("abc");
        let mut session = EditorSession::open(&note, FormatterConfig::default());
        session.set_selection(Selection::new(0, 3));
        assert!(!session.formatter().unwrap().bold());
        assert!(!session.can_undo());
    }

    #[test]
    fn test_underline_markdown_noop() {
        let mut session = markdown("abc", Selection::new(0, 3));
        assert!(!session.formatter().unwrap().underline());
        assert_eq!(session.text(), "abc");
    }

    #[test]
    fn test_rich_bold_toggles_attribute() {
        let mut session = rich("hello world", Selection::new(0, 5));
        assert!(session.formatter().unwrap().bold());
        assert_eq!(session.text(), "hello world");
        assert!(session.buffer().attributes_at(4).contains(Attribute::Bold));
        assert!(!session.buffer().attributes_at(5).contains(Attribute::Bold));
        assert!(session.typing_attributes().contains(Attribute::Bold));

        assert!(session.formatter().unwrap().bold());
        assert!(!session.buffer().attributes_at(0).contains(Attribute::Bold));

        session.undo();
        assert!(session.buffer().attributes_at(0).contains(Attribute::Bold));
    }

    #[test]
    fn test_rich_caret_toggles_typing_attributes() {
        let mut session = rich("", Selection::caret(0));
        assert!(session.formatter().unwrap().underline());
        assert_eq!(session.typing_attributes(), &AttributeSet::of(&[Attribute::Underline]));
        assert!(!session.can_undo());
        session.type_text("u");
        assert!(session.buffer().attributes_at(0).contains(Attribute::Underline));
    }

    #[test]
    fn test_header_add_replace_remove() {
        let mut session = markdown("Title", Selection::caret(2));
        assert!(session.formatter().unwrap().header(2));
        assert_eq!(session.text(), "## Title");
        assert_eq!(session.selection(), Selection::caret(8));

        assert!(session.formatter().unwrap().header(1));
        assert_eq!(session.text(), "# Title");

        assert!(session.formatter().unwrap().header(1));
        assert_eq!(session.text(), "Title");
    }

    #[test]
    fn test_header_keeps_full_selection() {
        let mut session = markdown("a\nTitle\nb", Selection::new(2, 5));
        assert!(session.formatter().unwrap().header(3));
        assert_eq!(session.text(), "a\n### Title\nb");
        assert_eq!(session.selection(), Selection::new(2, 9));
    }

    #[test]
    fn test_header_rejects_bad_level() {
        let mut session = markdown("x", Selection::caret(0));
        assert!(!session.formatter().unwrap().header(7));
        assert!(!session.formatter().unwrap().header(0));
    }

    #[test]
    fn test_header_rich_text_noop() {
        let mut session = rich("x", Selection::caret(0));
        assert!(!session.formatter().unwrap().header(1));
        assert_eq!(session.mode(), NoteMode::RichText);
    }
}
