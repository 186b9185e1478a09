//! Formatting operations over an editing session.
//!
//! [`TextFormatter`] borrows a session for the duration of one operation.
//! Each operation reads the current selection and paragraph, decides what
//! the text should become, and submits a single [`EditPlan`]. Operations
//! return `true` if an edit (or a typing-attribute change) was made and
//! `false` for silent no-ops: a stale selection, or a request that does not
//! apply to the note's mode.

mod block;
mod inline;
mod list;
mod todo;

use crate::attributes::AttributedText;
use crate::config::IndentUnit;
use crate::cursor::Selection;
use crate::note::NoteMode;
use crate::paragraph;
use crate::session::EditorSession;
use crate::transaction::EditPlan;
use std::ops::Range;

/// Formatting entry point for one session.
pub struct TextFormatter<'a> {
    session: &'a mut EditorSession,
}

impl<'a> TextFormatter<'a> {
    pub(crate) fn new(session: &'a mut EditorSession) -> Self {
        Self { session }
    }

    fn mode(&self) -> NoteMode {
        self.session.mode()
    }

    fn selection(&self) -> Selection {
        self.session.selection()
    }

    fn indent_unit(&self) -> IndentUnit {
        self.session.config().indent
    }

    /// Paragraph of the selection, or `None` (logged) when it is stale.
    fn paragraph(&self) -> Option<Range<usize>> {
        let range = self.session.paragraph_range();
        if range.is_none() {
            log::debug!("selection {:?} is stale", self.selection());
        }
        range
    }

    fn paragraph_at(&self, pos: usize) -> Option<Range<usize>> {
        paragraph::paragraph_at(self.session.buffer(), pos)
    }

    fn text(&self, range: Range<usize>) -> String {
        self.session.buffer().slice(range).unwrap_or_default()
    }

    fn attributed(&self, range: Range<usize>) -> AttributedText {
        self.session.buffer().attributed_slice(range).unwrap_or_default()
    }

    fn apply(&mut self, plan: EditPlan) -> bool {
        self.session.apply(plan)
    }

    /// Replaces the selection with `text`, leaving the caret `caret_offset`
    /// characters after the selection start.
    fn insert_at_selection(&mut self, name: &'static str, text: &str, caret_offset: usize) -> bool {
        let sel = self.selection();
        let plan = EditPlan::new(name)
            .replace(sel.range(), text)
            .select(Selection::caret(sel.location + caret_offset));
        self.apply(plan)
    }

    /// True if the requested operation applies to the note's mode.
    fn requires(&self, name: &str, modes: &[NoteMode]) -> bool {
        let mode = self.mode();
        if modes.contains(&mode) {
            return true;
        }
        log::debug!("`{}` does not apply to {:?} notes", name, mode);
        false
    }

    /// Selection after a paragraph rewrite: a caret at the end of the new
    /// text for carets and single lines, the whole new text otherwise.
    fn rewrite_selection(&self, paragraph: &Range<usize>, lines: usize, new_len: usize) -> Selection {
        if self.selection().is_caret() || lines <= 1 {
            Selection::caret(paragraph.start + new_len)
        } else {
            Selection::new(paragraph.start, new_len)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locked_session_has_no_formatter() {
        let mut session = EditorSession::markdown("x");
        session.set_editable(false);
        assert!(session.formatter().is_none());
        session.set_editable(true);
        assert!(session.formatter().is_some());
    }

    #[test]
    fn test_rewrite_selection() {
        let mut session = EditorSession::markdown("a\nb");
        session.set_selection(Selection::new(0, 3));
        let formatter = session.formatter().unwrap();
        assert_eq!(formatter.rewrite_selection(&(0..3), 2, 7), Selection::new(0, 7));
        assert_eq!(formatter.rewrite_selection(&(0..3), 1, 5), Selection::caret(5));
    }
}
