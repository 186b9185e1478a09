//! Code blocks, code spans, quotes, links and paired brackets.

use super::TextFormatter;
use crate::attributes::AttributedText;
use crate::checkbox;
use crate::cursor::Selection;
use crate::note::NoteMode;
use crate::paragraph;
use crate::patterns;
use crate::transaction::EditPlan;
use std::ops::Range;

const FENCE: &str = "```";

/// Contents of a fenced block, without the fence lines and the line break
/// before the closing fence. `None` if `text` is not a fenced block.
fn unfence(text: &str) -> Option<String> {
    if !text.starts_with(FENCE) {
        return None;
    }
    let (_, body) = text.split_once('\n')?;
    let body = body
        .strip_suffix("```\n")
        .or_else(|| body.strip_suffix(FENCE))?;
    if !body.is_empty() && !body.ends_with('\n') {
        return None;
    }
    Some(body.strip_suffix('\n').unwrap_or(body).to_string())
}

impl TextFormatter<'_> {
    /// Wraps the selection in `open`/`close`, keeping its attributes.
    fn wrap_selection<F>(&mut self, name: &'static str, open: &str, close: &str, select: F) -> bool
    where
        F: FnOnce(usize, usize) -> Selection,
    {
        let sel = self.selection();
        let mut wrapped = AttributedText::plain(open);
        wrapped.push_attributed(&self.attributed(sel.range()));
        wrapped.push_str(close);
        let selection = select(sel.location, sel.length);
        self.apply(EditPlan::new(name).replace(sel.range(), wrapped).select(selection))
    }

    /// Fence-delimited block around line of `pos`, fence lines included.
    /// Fences pair up in document order.
    fn fenced_block_at(&self, pos: usize) -> Option<Range<usize>> {
        let buffer = self.session.buffer();
        let target = buffer.char_to_line(pos);
        let mut open = None;
        for idx in 0..buffer.len_lines() {
            if !buffer.line(idx).is_some_and(|line| line.starts_with(FENCE)) {
                continue;
            }
            match open.take() {
                None if idx > target => return None,
                None => open = Some(idx),
                Some(start) if target <= idx => {
                    return Some(buffer.line_start(start)..buffer.line_end(idx));
                }
                Some(_) => {}
            }
        }
        None
    }

    /// Toggles a fenced code block around the selection, or around the
    /// caret's block.
    pub fn code_block(&mut self) -> bool {
        const NAME: &str = "Code Block";
        if !self.requires(NAME, &[NoteMode::Markdown]) {
            return false;
        }
        let sel = self.selection();

        if sel.has_selection() {
            let text = self.text(sel.range());
            if let Some(inner) = unfence(&text) {
                let select = Selection::new(sel.location, inner.chars().count());
                return self.apply(EditPlan::new(NAME).replace(sel.range(), inner).select(select));
            }
            let mut wrapped = format!("{}\n{}", FENCE, text);
            if !text.ends_with('\n') {
                wrapped.push('\n');
            }
            wrapped.push_str("```\n");
            let caret = Selection::caret(sel.location + FENCE.len());
            return self.apply(EditPlan::new(NAME).replace(sel.range(), wrapped).select(caret));
        }

        if let Some(block) = self.fenced_block_at(sel.location) {
            let inner = unfence(&self.text(block.clone())).unwrap_or_default();
            if inner.is_empty() {
                let range = paragraph::with_line_break(self.session.buffer(), block.clone());
                let caret = Selection::caret(block.start);
                return self.apply(EditPlan::new(NAME).replace(range, "").select(caret));
            }
            // Drop the break the wrap put after the closing fence.
            let buffer = self.session.buffer();
            let range = if matches!(buffer.char_at(block.end + 1), None | Some('\n')) {
                paragraph::with_line_break(buffer, block.clone())
            } else {
                block.clone()
            };
            let select = Selection::new(block.start, inner.chars().count());
            return self.apply(EditPlan::new(NAME).replace(range, inner).select(select));
        }

        self.insert_at_selection(NAME, "```\n\n```\n", 4)
    }

    /// Toggles backticks around the selection or the caret's code span.
    pub fn back_tick(&mut self) -> bool {
        const NAME: &str = "Code Span";
        if !self.requires(NAME, &[NoteMode::Markdown]) {
            return false;
        }
        let sel = self.selection();
        let buffer = self.session.buffer();

        let unwrap = if sel.has_selection() {
            let text = self.text(sel.range());
            if sel.length >= 2 && text.starts_with('`') && text.ends_with('`') {
                Some(sel.range())
            } else if sel.location > 0
                && buffer.char_at(sel.location - 1) == Some('`')
                && buffer.char_at(sel.end()) == Some('`')
            {
                Some(sel.location - 1..sel.end() + 1)
            } else {
                None
            }
        } else {
            self.paragraph().and_then(|paragraph| {
                let text = self.text(paragraph.clone());
                patterns::code_span_at(&text, sel.location - paragraph.start)
                    .map(|span| paragraph.start + span.start..paragraph.start + span.end)
            })
        };

        if let Some(range) = unwrap {
            let inner = self.attributed(range.start + 1..range.end - 1);
            let select = Selection::new(range.start, inner.len_chars());
            return self.apply(EditPlan::new(NAME).replace(range, inner).select(select));
        }
        self.wrap_selection(NAME, "`", "`", |loc, len| Selection::new(loc + 1, len))
    }

    /// Toggles `> ` on every line of the paragraph.
    pub fn quote(&mut self) -> bool {
        const NAME: &str = "Quote";
        if !self.requires(NAME, &[NoteMode::Markdown]) {
            return false;
        }
        let sel = self.selection();
        let Some(paragraph) = self.paragraph() else {
            return false;
        };
        let content = self.attributed(paragraph.clone());
        if sel.is_caret() && !patterns::contains_letters(content.as_str()) {
            return self.insert_at_selection(NAME, "> ", 2);
        }

        let lines = content.line_ranges();
        let quoted = lines
            .iter()
            .any(|line| content.slice(line.clone()).as_str().starts_with("> "));

        let mut out = AttributedText::new();
        for (idx, range) in lines.iter().enumerate() {
            if idx > 0 {
                out.push_str("\n");
            }
            let line = content.slice(range.clone());
            if quoted {
                let cut = if line.as_str().starts_with("> ") {
                    2
                } else if line.as_str().starts_with('>') {
                    1
                } else {
                    0
                };
                out.push_attributed(&line.slice(cut..line.len_chars()));
            } else {
                out.push_str("> ");
                out.push_attributed(&line);
            }
        }

        let select = self.rewrite_selection(&paragraph, lines.len(), out.len_chars());
        self.apply(EditPlan::new(NAME).replace(paragraph, out).select(select))
    }

    /// `[text]()`, caret inside the parentheses.
    pub fn link(&mut self) -> bool {
        if !self.requires("Link", &[NoteMode::Markdown]) {
            return false;
        }
        self.wrap_selection("Link", "[", "]()", |loc, len| Selection::caret(loc + len + 3))
    }

    /// `![text]()`, caret inside the parentheses.
    pub fn image(&mut self) -> bool {
        if !self.requires("Image", &[NoteMode::Markdown]) {
            return false;
        }
        self.wrap_selection("Image", "![", "]()", |loc, len| Selection::caret(loc + len + 4))
    }

    /// `[[text]]`, with the title selected for completion.
    pub fn wiki_link(&mut self) -> bool {
        if !self.requires("Wiki Link", &[NoteMode::Markdown]) {
            return false;
        }
        self.wrap_selection("Wiki Link", "[[", "]]", |loc, len| Selection::new(loc + 2, len))
    }

    /// Types an opening bracket. With auto-close enabled the pair is
    /// inserted around the selection.
    pub fn insert_bracket(&mut self, open: char) -> bool {
        let close = match open {
            '(' => ')',
            '[' => ']',
            '{' => '}',
            '"' => '"',
            _ => {
                log::debug!("{:?} is not an opening bracket", open);
                return false;
            }
        };
        if !self.session.config().autoclose_brackets {
            return self.session.type_text(open.encode_utf8(&mut [0; 4]));
        }
        let (open, close) = (open.to_string(), close.to_string());
        self.wrap_selection("Brackets", &open, &close, |loc, len| Selection::new(loc + 1, len))
    }

    /// Removes the caret's paragraph with its line break and returns its
    /// trimmed text, checkboxes in literal form.
    pub fn cut_paragraph(&mut self) -> Option<String> {
        let sel = self.selection();
        if sel.has_selection() {
            return None;
        }
        let paragraph = self.paragraph()?;
        let range = paragraph::with_line_break(self.session.buffer(), paragraph.clone());
        if range.is_empty() {
            return None;
        }
        let text = checkbox::unload_checkboxes(&self.attributed(paragraph.clone()))
            .as_str()
            .trim()
            .to_string();
        let caret = Selection::caret(paragraph.start);
        self.apply(EditPlan::new("Cut").replace(range, "").select(caret))
            .then_some(text)
    }
}
