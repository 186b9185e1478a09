//! Editing session state.
//!
//! An [`EditorSession`] owns everything that lives while a note is open:
//! the attributed buffer, the selection, undo history, typing attributes and
//! the note's mode. It is the single place where the buffer is mutated;
//! formatting operations build [`EditPlan`]s and submit them through
//! [`EditorSession::apply`].

use crate::attributes::{AttributeKind, AttributeSet, AttributedText};
use crate::buffer::TextBuffer;
use crate::checkbox;
use crate::config::FormatterConfig;
use crate::cursor::Selection;
use crate::error::EditError;
use crate::format::TextFormatter;
use crate::history::{EditOperation, History, TYPING};
use crate::note::{NoteMode, NoteSource};
use crate::paragraph;
use crate::structure;
use crate::transaction::{EditPlan, Transaction};
use std::ops::Range;
use std::time::Duration;

/// Attribute kinds that newly typed text inherits from the text before it.
const INHERITED: [AttributeKind; 4] = [
    AttributeKind::Bold,
    AttributeKind::Italic,
    AttributeKind::Underline,
    AttributeKind::Strike,
];

/// The state of a note open in an editor.
#[derive(Debug)]
pub struct EditorSession {
    /// The text buffer.
    buffer: TextBuffer,
    /// The active selection.
    selection: Selection,
    /// Undo/redo history.
    history: History,
    /// Attributes applied to the next typed characters.
    typing_attributes: AttributeSet,
    mode: NoteMode,
    editable: bool,
    config: FormatterConfig,
    /// Whether the buffer changed since it was loaded or saved.
    modified: bool,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(NoteMode::Markdown, FormatterConfig::default())
    }
}

impl EditorSession {
    /// Creates a session over an empty buffer.
    pub fn new(mode: NoteMode, config: FormatterConfig) -> Self {
        let mut history = History::new(config.history_limit);
        history.set_coalesce_window(Duration::from_millis(config.coalesce_window_ms));
        Self {
            buffer: TextBuffer::new(),
            selection: Selection::default(),
            history,
            typing_attributes: AttributeSet::new(),
            mode,
            editable: true,
            config,
            modified: false,
        }
    }

    /// Opens a note. Markdown content has its literal checkboxes loaded.
    pub fn open(note: &dyn NoteSource, config: FormatterConfig) -> Self {
        let mut session = Self::new(note.mode(), config);
        session.editable = note.is_editable();
        session.load(&note.content());
        session
    }

    /// Convenience for a markdown session with default configuration.
    pub fn markdown(text: &str) -> Self {
        let mut session = Self::default();
        session.load(&AttributedText::plain(text));
        session
    }

    /// Replaces the whole content, clearing history and selection.
    pub fn load(&mut self, content: &AttributedText) {
        let content = if self.mode.is_markdown() {
            checkbox::load_checkboxes(content)
        } else {
            content.clone()
        };
        self.buffer = TextBuffer::from_attributed(&content);
        if self.mode.is_markdown() {
            structure::rescan_all(&mut self.buffer);
        }
        self.selection = Selection::default();
        self.typing_attributes = AttributeSet::new();
        self.history.clear();
        self.modified = false;
    }

    /// Returns a reference to the buffer.
    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    /// Returns the entire buffer as a string.
    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    /// Returns the buffer with its attributes.
    pub fn content(&self) -> AttributedText {
        self.buffer.to_attributed()
    }

    /// Serializes a markdown note, turning checkbox glyphs back into text.
    pub fn markdown_text(&self) -> String {
        checkbox::unload_checkboxes(&self.content()).as_str().to_string()
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Moves the selection, clamped to the buffer. Typing attributes follow
    /// the character before the new location.
    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection.clamped(self.buffer.len_chars());
        self.typing_attributes = self.inherited_attributes(self.selection.location);
    }

    /// Returns the selected text, if any.
    pub fn selected_text(&self) -> Option<String> {
        if !self.selection.has_selection() {
            return None;
        }
        self.buffer.slice(self.selection.range()).ok()
    }

    pub fn mode(&self) -> NoteMode {
        self.mode
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    pub fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
    }

    pub fn config(&self) -> &FormatterConfig {
        &self.config
    }

    pub fn typing_attributes(&self) -> &AttributeSet {
        &self.typing_attributes
    }

    pub fn set_typing_attributes(&mut self, attrs: AttributeSet) {
        self.typing_attributes = attrs;
    }

    pub(crate) fn typing_attributes_mut(&mut self) -> &mut AttributeSet {
        &mut self.typing_attributes
    }

    /// Returns whether the buffer has unsaved changes.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Marks the content as persisted.
    pub fn mark_saved(&mut self) {
        self.modified = false;
    }

    /// Paragraph enclosing the current selection.
    pub fn paragraph_range(&self) -> Option<Range<usize>> {
        paragraph::paragraph_range(&self.buffer, self.selection.range())
    }

    /// Returns the formatter for this session, or `None` if the note is locked.
    pub fn formatter(&mut self) -> Option<TextFormatter<'_>> {
        if !self.editable {
            log::debug!("formatting requested on a locked note");
            return None;
        }
        Some(TextFormatter::new(self))
    }

    // ==================== Text Editing ====================

    /// Replaces `replacement` (the selection by default) with `content`, then
    /// selects `select` (a caret after the content by default).
    ///
    /// Returns false, leaving the buffer untouched, if the range is stale.
    pub fn insert_text(
        &mut self,
        content: impl Into<AttributedText>,
        replacement: Option<Range<usize>>,
        select: Option<Selection>,
    ) -> bool {
        let content = content.into();
        let range = replacement.unwrap_or_else(|| self.selection.range());
        let select = select.unwrap_or_else(|| Selection::caret(range.start + content.len_chars()));
        self.apply(EditPlan::new("Insert Text").replace(range, content).select(select))
    }

    /// Types text at the selection with the current typing attributes.
    pub fn type_text(&mut self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        let content = AttributedText::styled(text, self.typing_attributes.clone());
        let range = self.selection.range();
        let caret = Selection::caret(range.start + content.len_chars());
        self.apply(EditPlan::new(TYPING).replace(range, content).select(caret))
    }

    /// Deletes the selection, or the grapheme before the caret.
    pub fn delete_backward(&mut self) -> bool {
        let range = if self.selection.has_selection() {
            self.selection.range()
        } else if self.selection.location > 0 {
            let pos = self.selection.location;
            self.buffer.snap_to_graphemes(pos - 1..pos)
        } else {
            return false;
        };
        let caret = Selection::caret(range.start);
        self.apply(EditPlan::new(TYPING).replace(range, "").select(caret))
    }

    /// Applies a plan inside one undo group.
    ///
    /// Returns false without opening a group if the note is locked, the plan
    /// is empty, or any step's range is out of bounds.
    pub fn apply(&mut self, plan: EditPlan) -> bool {
        if !self.editable {
            log::debug!("`{}` dropped: note is not editable", plan.name);
            return false;
        }
        if plan.is_empty() {
            return false;
        }
        if let Err(err) = plan.validate(self.buffer.len_chars()) {
            log::debug!("`{}` dropped: {}", plan.name, err);
            return false;
        }
        log::trace!("applying `{}` ({} steps)", plan.name, plan.steps.len());

        let EditPlan { name, steps, selection } = plan;
        let touched = {
            let mut tx = Transaction::begin(&mut self.buffer, &mut self.history, &mut self.selection, name);
            for step in steps {
                if let Err(err) = tx.apply(step) {
                    log::debug!("`{}` stopped early: {}", name, err);
                    break;
                }
            }
            if let Some(selection) = selection {
                tx.select(selection);
            }
            tx.commit()
        };

        self.modified = true;
        if self.mode.is_markdown() {
            if let Some(range) = touched {
                structure::rescan(&mut self.buffer, range);
            }
        }
        true
    }

    fn inherited_attributes(&self, location: usize) -> AttributeSet {
        if location == 0 {
            return AttributeSet::new();
        }
        let before = self.buffer.attributes_at(location - 1);
        let mut attrs = AttributeSet::new();
        for kind in INHERITED {
            if let Some(attr) = before.get(kind) {
                attrs.insert(attr);
            }
        }
        attrs
    }

    // ==================== Undo/Redo ====================

    /// Undoes the last edit group.
    pub fn undo(&mut self) -> bool {
        let Some((ops, selection)) = self.history.undo() else {
            return false;
        };
        self.replay(&ops, selection);
        true
    }

    /// Redoes the last undone edit group.
    pub fn redo(&mut self) -> bool {
        let Some((ops, selection)) = self.history.redo() else {
            return false;
        };
        self.replay(&ops, selection);
        true
    }

    fn replay(&mut self, ops: &[EditOperation], selection: Selection) {
        for op in ops {
            if let Err(err) = self.apply_operation(op) {
                log::debug!("history replay failed: {}", err);
            }
        }
        self.selection = selection.clamped(self.buffer.len_chars());
        self.modified = true;
        if self.mode.is_markdown() {
            structure::rescan_all(&mut self.buffer);
        }
    }

    /// Applies an edit operation to the buffer.
    fn apply_operation(&mut self, op: &EditOperation) -> Result<(), EditError> {
        match op {
            EditOperation::Insert { position, text } => {
                self.buffer.replace(*position..*position, text)?;
            }
            EditOperation::Delete { position, text } => {
                let end = *position + text.len_chars();
                self.buffer.replace(*position..end, &AttributedText::new())?;
            }
            EditOperation::Restyle {
                position,
                len,
                after,
                ..
            } => {
                self.buffer.set_runs(*position..*position + *len, after)?;
            }
        }
        Ok(())
    }

    /// Returns true if undo is available.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Returns true if redo is available.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_name(&self) -> Option<&'static str> {
        self.history.undo_name()
    }

    /// Keeps the next typed text out of the current typing group.
    pub fn break_undo_coalescing(&mut self) {
        self.history.break_coalescing();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{Attribute, TodoState};
    use crate::note::MemoryNote;

    #[test]
    fn test_insert_text_defaults_to_selection() {
        let mut session = EditorSession::markdown("hello world");
        session.set_selection(Selection::new(6, 5));
        assert!(session.insert_text("there", None, None));
        assert_eq!(session.text(), "hello there");
        assert_eq!(session.selection(), Selection::caret(11));
        assert!(session.is_modified());
    }

    #[test]
    fn test_insert_text_stale_range_is_noop() {
        let mut session = EditorSession::markdown("abc");
        assert!(!session.insert_text("x", Some(2..10), None));
        assert_eq!(session.text(), "abc");
        assert!(!session.can_undo());
        assert!(!session.is_modified());
    }

    #[test]
    fn test_insert_text_clamps_selection() {
        let mut session = EditorSession::markdown("abc");
        assert!(session.insert_text("", Some(0..3), Some(Selection::new(2, 9))));
        assert_eq!(session.text(), "");
        assert_eq!(session.selection(), Selection::caret(0));
    }

    #[test]
    fn test_undo_restores_text_and_selection() {
        let mut session = EditorSession::markdown("hello");
        session.set_selection(Selection::new(0, 5));
        session.insert_text("bye", None, None);
        assert!(session.undo());
        assert_eq!(session.text(), "hello");
        assert_eq!(session.selection(), Selection::new(0, 5));
        assert!(session.redo());
        assert_eq!(session.text(), "bye");
        assert_eq!(session.selection(), Selection::caret(3));
    }

    #[test]
    fn test_typing_coalesces_until_broken() {
        let mut session = EditorSession::markdown("");
        session.type_text("a");
        session.type_text("b");
        session.break_undo_coalescing();
        session.type_text("c");
        assert_eq!(session.text(), "abc");

        session.undo();
        assert_eq!(session.text(), "ab");
        session.undo();
        assert_eq!(session.text(), "");
    }

    #[test]
    fn test_typing_uses_typing_attributes() {
        let mut session = EditorSession::new(NoteMode::RichText, FormatterConfig::default());
        session.set_typing_attributes(AttributeSet::of(&[Attribute::Bold]));
        session.type_text("hi");
        assert!(session.buffer().attributes_at(1).contains(Attribute::Bold));
    }

    #[test]
    fn test_delete_backward() {
        let mut session = EditorSession::markdown("ae\u{301}");
        session.set_selection(Selection::caret(3));
        assert!(session.delete_backward());
        assert_eq!(session.text(), "a");
        session.set_selection(Selection::caret(0));
        assert!(!session.delete_backward());
    }

    #[test]
    fn test_locked_note_is_read_only() {
        let note = MemoryNote::markdown("text").locked();
        let mut session = EditorSession::open(&note, FormatterConfig::default());
        assert!(session.formatter().is_none());
        assert!(!session.type_text("x"));
        assert_eq!(session.text(), "text");
    }

    #[test]
    fn test_open_loads_checkboxes() {
        let note = MemoryNote::markdown("- [x] done\n- [ ] todo");
        let session = EditorSession::open(&note, FormatterConfig::default());
        assert_eq!(session.text(), "\u{FFFC} done\n\u{FFFC} todo");
        assert_eq!(session.buffer().attributes_at(0).todo(), Some(TodoState::Checked));
        assert_eq!(session.markdown_text(), "- [x] done\n- [ ] todo");
    }

    #[test]
    fn test_plain_text_keeps_literal_checkboxes() {
        let note = MemoryNote::plain_text("- [ ] a");
        let session = EditorSession::open(&note, FormatterConfig::default());
        assert_eq!(session.text(), "- [ ] a");
    }

    #[test]
    fn test_paragraph_range() {
        let mut session = EditorSession::markdown("one\ntwo");
        session.set_selection(Selection::caret(5));
        assert_eq!(session.paragraph_range(), Some(4..7));
    }

    #[test]
    fn test_tags_follow_edits() {
        let mut session = EditorSession::markdown("note");
        session.set_selection(Selection::caret(4));
        session.type_text(" #idea");
        assert!(session.buffer().attributes_at(6).contains(Attribute::Tag));
        session.undo();
        assert!(!session.buffer().runs().any_in(0..4, AttributeKind::Tag));
    }
}
