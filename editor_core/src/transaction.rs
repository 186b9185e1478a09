//! Edit transactions.
//!
//! Every formatting operation computes an [`EditPlan`] from the current
//! buffer state and hands it to the session. The plan is validated against
//! the buffer before anything is touched, so a plan that would fail never
//! opens an undo group. Once validated, a [`Transaction`] applies the steps
//! inside exactly one undo group and closes it on every exit path.

use crate::attributes::{Attribute, AttributeKind, AttributedText};
use crate::buffer::TextBuffer;
use crate::cursor::Selection;
use crate::error::{check_range, EditError};
use crate::history::{EditOperation, History};
use std::ops::Range;

/// One mutation of a plan. Ranges refer to the buffer as left by the
/// previous steps.
#[derive(Debug, Clone, PartialEq)]
pub enum EditStep {
    Replace {
        range: Range<usize>,
        content: AttributedText,
    },
    AddAttribute {
        range: Range<usize>,
        attribute: Attribute,
    },
    RemoveAttribute {
        range: Range<usize>,
        kind: AttributeKind,
    },
}

/// A named list of steps and the selection to leave behind.
#[derive(Debug, Clone, PartialEq)]
pub struct EditPlan {
    pub name: &'static str,
    pub steps: Vec<EditStep>,
    pub selection: Option<Selection>,
}

impl EditPlan {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            steps: Vec::new(),
            selection: None,
        }
    }

    pub fn replace(mut self, range: Range<usize>, content: impl Into<AttributedText>) -> Self {
        self.steps.push(EditStep::Replace {
            range,
            content: content.into(),
        });
        self
    }

    pub fn add_attribute(mut self, range: Range<usize>, attribute: Attribute) -> Self {
        self.steps.push(EditStep::AddAttribute { range, attribute });
        self
    }

    pub fn remove_attribute(mut self, range: Range<usize>, kind: AttributeKind) -> Self {
        self.steps.push(EditStep::RemoveAttribute { range, kind });
        self
    }

    pub fn select(mut self, selection: Selection) -> Self {
        self.selection = Some(selection);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Checks every step against a buffer of `len` characters, tracking how
    /// earlier replacements change the length.
    pub fn validate(&self, len: usize) -> Result<(), EditError> {
        let mut len = len;
        for step in &self.steps {
            match step {
                EditStep::Replace { range, content } => {
                    check_range(range, len)?;
                    len = len - (range.end - range.start) + content.len_chars();
                }
                EditStep::AddAttribute { range, .. } | EditStep::RemoveAttribute { range, .. } => {
                    check_range(range, len)?;
                }
            }
        }
        Ok(())
    }
}

/// An open undo group over a buffer. Dropping the transaction commits it.
pub struct Transaction<'a> {
    buffer: &'a mut TextBuffer,
    history: &'a mut History,
    selection: &'a mut Selection,
    touched: Option<Range<usize>>,
    committed: bool,
}

impl<'a> Transaction<'a> {
    /// Opens a named undo group.
    pub fn begin(
        buffer: &'a mut TextBuffer,
        history: &'a mut History,
        selection: &'a mut Selection,
        name: &'static str,
    ) -> Self {
        history.begin_edit(*selection, name);
        Self {
            buffer,
            history,
            selection,
            touched: None,
            committed: false,
        }
    }

    /// Applies one step, recording it for undo.
    pub fn apply(&mut self, step: EditStep) -> Result<(), EditError> {
        match step {
            EditStep::Replace { range, content } => {
                let removed = self.buffer.replace(range.clone(), &content)?;
                if !removed.is_empty() {
                    self.history.record(EditOperation::Delete {
                        position: range.start,
                        text: removed,
                    });
                }
                let inserted_len = content.len_chars();
                if !content.is_empty() {
                    self.history.record(EditOperation::Insert {
                        position: range.start,
                        text: content,
                    });
                }
                self.mark_replaced(range, inserted_len);
            }
            EditStep::AddAttribute { range, attribute } => {
                let range = self.buffer.snap_to_graphemes(range);
                self.restyle(range, |buffer, range| buffer.add_attribute(range, attribute))?;
            }
            EditStep::RemoveAttribute { range, kind } => {
                let range = self.buffer.snap_to_graphemes(range);
                self.restyle(range, |buffer, range| buffer.remove_attribute(range, kind))?;
            }
        }
        Ok(())
    }

    fn restyle<F>(&mut self, range: Range<usize>, f: F) -> Result<(), EditError>
    where
        F: FnOnce(&mut TextBuffer, Range<usize>) -> Result<(), EditError>,
    {
        let before = self.buffer.runs_slice(range.clone())?;
        f(&mut *self.buffer, range.clone())?;
        let after = self.buffer.runs_slice(range.clone())?;
        if before != after {
            self.history.record(EditOperation::Restyle {
                position: range.start,
                len: range.end - range.start,
                before,
                after,
            });
            self.mark(range);
        }
        Ok(())
    }

    fn mark_replaced(&mut self, range: Range<usize>, inserted_len: usize) {
        if let Some(touched) = &mut self.touched {
            if touched.end >= range.end {
                touched.end = touched.end - (range.end - range.start) + inserted_len;
            }
        }
        self.mark(range.start..range.start + inserted_len);
    }

    fn mark(&mut self, range: Range<usize>) {
        self.touched = Some(match self.touched.take() {
            Some(touched) => touched.start.min(range.start)..touched.end.max(range.end),
            None => range,
        });
    }

    /// Sets the selection left by the transaction, clamped to the buffer.
    pub fn select(&mut self, selection: Selection) {
        *self.selection = selection.clamped(self.buffer.len_chars());
    }

    /// Closes the undo group and returns the range the edits touched.
    pub fn commit(mut self) -> Option<Range<usize>> {
        self.close();
        self.touched.take()
    }

    fn close(&mut self) {
        if self.committed {
            return;
        }
        *self.selection = self.selection.clamped(self.buffer.len_chars());
        self.history.set_selection_after(*self.selection);
        self.history.commit_edit();
        self.committed = true;
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        self.close();
    }
}
