//! Undo/Redo history system.

use crate::attributes::{AttributeRuns, AttributedText};
use crate::cursor::Selection;
use std::time::{Duration, Instant};

/// Default time window for coalescing edits (in milliseconds).
pub const COALESCE_WINDOW_MS: u64 = 300;

/// Name of the undo group used for plain typing. Only typing groups coalesce.
pub const TYPING: &str = "Typing";

/// Represents a single edit operation that can be undone/redone.
#[derive(Debug, Clone, PartialEq)]
pub enum EditOperation {
    /// Insert text at position.
    Insert {
        position: usize,
        text: AttributedText,
    },
    /// Delete text at range.
    Delete {
        position: usize,
        text: AttributedText,
    },
    /// Replace the attribute runs of `len` characters at position.
    Restyle {
        position: usize,
        len: usize,
        before: AttributeRuns,
        after: AttributeRuns,
    },
}

impl EditOperation {
    /// Returns the inverse operation (for undo).
    pub fn inverse(&self) -> EditOperation {
        match self {
            EditOperation::Insert { position, text } => EditOperation::Delete {
                position: *position,
                text: text.clone(),
            },
            EditOperation::Delete { position, text } => EditOperation::Insert {
                position: *position,
                text: text.clone(),
            },
            EditOperation::Restyle {
                position,
                len,
                before,
                after,
            } => EditOperation::Restyle {
                position: *position,
                len: *len,
                before: after.clone(),
                after: before.clone(),
            },
        }
    }
}

/// A group of edit operations that should be undone/redone together.
#[derive(Debug, Clone)]
pub struct EditGroup {
    /// Action name shown to the user ("Bold", "Typing", ...).
    pub name: &'static str,
    /// The operations in this group (in order of execution).
    pub operations: Vec<EditOperation>,
    /// Cursor selection before the edit.
    pub selection_before: Selection,
    /// Cursor selection after the edit.
    pub selection_after: Selection,
    /// Timestamp of the last edit in this group.
    pub last_edit_time: Option<Instant>,
}

impl EditGroup {
    pub fn new(name: &'static str, selection_before: Selection) -> Self {
        Self {
            name,
            operations: Vec::new(),
            selection_before,
            selection_after: selection_before,
            last_edit_time: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn push(&mut self, op: EditOperation) {
        self.operations.push(op);
        self.last_edit_time = Some(Instant::now());
    }

    pub fn set_selection_after(&mut self, selection: Selection) {
        self.selection_after = selection;
    }

    /// Returns true if this group can be coalesced with a new edit.
    /// Coalescing is allowed if:
    /// 1. The time since last edit is within the coalesce window
    /// 2. The new operation is compatible (e.g., consecutive inserts or deletes)
    pub fn can_coalesce(&self, new_op: &EditOperation, coalesce_window: Duration) -> bool {
        match self.last_edit_time {
            Some(last_time) if last_time.elapsed() <= coalesce_window => {}
            _ => return false,
        }

        let Some(last_op) = self.operations.last() else {
            return true;
        };
        match (last_op, new_op) {
            // Consecutive single-char inserts
            (
                EditOperation::Insert { position: pos1, text: text1 },
                EditOperation::Insert { position: pos2, text: text2 },
            ) => {
                text1.len_chars() == 1
                    && text2.len_chars() == 1
                    && *pos2 == *pos1 + 1
                    // Don't coalesce after newline
                    && !text1.as_str().ends_with('\n')
            }
            // Consecutive backspace deletions
            (
                EditOperation::Delete { position: pos1, .. },
                EditOperation::Delete { position: pos2, text: text2 },
            ) => text2.len_chars() == 1 && *pos2 == pos1.saturating_sub(1),
            _ => false,
        }
    }

    /// Merges operations from another group into this one.
    pub fn merge(&mut self, other: EditGroup) {
        self.operations.extend(other.operations);
        self.selection_after = other.selection_after;
        self.last_edit_time = other.last_edit_time;
    }
}

/// Manages undo/redo history.
#[derive(Debug)]
pub struct History {
    /// Stack of operations that can be undone.
    undo_stack: Vec<EditGroup>,
    /// Stack of operations that can be redone.
    redo_stack: Vec<EditGroup>,
    /// Maximum number of undo levels.
    max_size: usize,
    /// Current edit group being built.
    current_group: Option<EditGroup>,
    /// Time window for coalescing edits.
    coalesce_window: Duration,
    /// Whether coalescing is enabled.
    coalesce_enabled: bool,
}

impl Default for History {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl History {
    /// Creates a new history with the given maximum size.
    pub fn new(max_size: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_size,
            current_group: None,
            coalesce_window: Duration::from_millis(COALESCE_WINDOW_MS),
            coalesce_enabled: true,
        }
    }

    /// Sets the coalesce window duration.
    pub fn set_coalesce_window(&mut self, window: Duration) {
        self.coalesce_window = window;
    }

    /// Enables or disables coalescing.
    pub fn set_coalesce_enabled(&mut self, enabled: bool) {
        self.coalesce_enabled = enabled;
    }

    /// Returns true while a group is open.
    pub fn is_grouping(&self) -> bool {
        self.current_group.is_some()
    }

    /// Starts a new named edit group. Groups never nest: an open group is
    /// committed first.
    pub fn begin_edit(&mut self, selection: Selection, name: &'static str) {
        if let Some(open) = &self.current_group {
            log::debug!("undo group `{}` still open when `{}` began", open.name, name);
            self.commit_edit();
        }
        self.current_group = Some(EditGroup::new(name, selection));
    }

    /// Records an operation in the current group.
    pub fn record(&mut self, op: EditOperation) {
        match &mut self.current_group {
            Some(group) => group.push(op),
            None => log::debug!("edit recorded outside of an undo group"),
        }
    }

    /// Commits the current edit group. Empty groups are discarded.
    pub fn commit_edit(&mut self) {
        let Some(group) = self.current_group.take() else {
            return;
        };
        if group.is_empty() {
            return;
        }
        if self.coalesce_enabled && group.name == TYPING {
            if let Some(last_group) = self.undo_stack.last_mut() {
                if last_group.name == TYPING {
                    if let Some(first_op) = group.operations.first() {
                        if last_group.can_coalesce(first_op, self.coalesce_window) {
                            last_group.merge(group);
                            self.redo_stack.clear();
                            return;
                        }
                    }
                }
            }
        }
        self.push_undo(group);
    }

    /// Stops the next edit from joining the most recent group.
    pub fn break_coalescing(&mut self) {
        if let Some(last_group) = self.undo_stack.last_mut() {
            last_group.last_edit_time = None;
        }
    }

    /// Sets the selection after the current edit.
    pub fn set_selection_after(&mut self, selection: Selection) {
        if let Some(group) = &mut self.current_group {
            group.set_selection_after(selection);
        }
    }

    /// Pushes an edit group to the undo stack.
    fn push_undo(&mut self, group: EditGroup) {
        self.undo_stack.push(group);
        // Clear redo stack on new edit
        self.redo_stack.clear();
        // Enforce size limit
        while self.undo_stack.len() > self.max_size {
            self.undo_stack.remove(0);
        }
    }

    /// Returns true if undo is available.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns true if redo is available.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Name of the group the next undo reverts.
    pub fn undo_name(&self) -> Option<&'static str> {
        self.undo_stack.last().map(|g| g.name)
    }

    /// Name of the group the next redo reapplies.
    pub fn redo_name(&self) -> Option<&'static str> {
        self.redo_stack.last().map(|g| g.name)
    }

    /// Pops the last edit group for undo.
    /// Returns the operations to undo and the selection to restore.
    pub fn undo(&mut self) -> Option<(Vec<EditOperation>, Selection)> {
        // Commit any pending edit
        self.commit_edit();

        self.undo_stack.pop().map(|group| {
            let selection = group.selection_before;
            // Create inverse operations in reverse order
            let ops: Vec<EditOperation> = group
                .operations
                .iter()
                .rev()
                .map(|op| op.inverse())
                .collect();
            self.redo_stack.push(group);
            (ops, selection)
        })
    }

    /// Pops the last undone edit group for redo.
    /// Returns the operations to redo and the selection to restore.
    pub fn redo(&mut self) -> Option<(Vec<EditOperation>, Selection)> {
        self.redo_stack.pop().map(|mut group| {
            let selection = group.selection_after;
            let ops = group.operations.clone();
            group.last_edit_time = None;
            self.undo_stack.push(group);
            (ops, selection)
        })
    }

    /// Clears all history.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_group = None;
    }
}
