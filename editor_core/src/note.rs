//! The note an editing session is opened on.

use crate::attributes::AttributedText;
use serde::{Deserialize, Serialize};

/// How a note's text is interpreted. Fixed when the note is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteMode {
    /// Formatting is expressed as markdown syntax in the text.
    #[default]
    Markdown,
    /// Formatting is expressed as character attributes.
    RichText,
    /// No formatting beyond structural lists and indentation.
    PlainText,
}

impl NoteMode {
    pub fn is_markdown(self) -> bool {
        self == NoteMode::Markdown
    }
}

/// Storage-side view of a note, consumed when a session opens it.
pub trait NoteSource {
    fn mode(&self) -> NoteMode;

    /// Stored content. Markdown notes keep checkboxes as literal text.
    fn content(&self) -> AttributedText;

    /// False for locked or read-only notes.
    fn is_editable(&self) -> bool {
        true
    }
}

/// A note held entirely in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryNote {
    pub mode: NoteMode,
    pub content: AttributedText,
    pub editable: bool,
}

impl MemoryNote {
    pub fn markdown(text: &str) -> Self {
        Self {
            mode: NoteMode::Markdown,
            content: AttributedText::plain(text),
            editable: true,
        }
    }

    pub fn rich_text(content: AttributedText) -> Self {
        Self {
            mode: NoteMode::RichText,
            content,
            editable: true,
        }
    }

    pub fn plain_text(text: &str) -> Self {
        Self {
            mode: NoteMode::PlainText,
            content: AttributedText::plain(text),
            editable: true,
        }
    }

    pub fn locked(mut self) -> Self {
        self.editable = false;
        self
    }
}

impl NoteSource for MemoryNote {
    fn mode(&self) -> NoteMode {
        self.mode
    }

    fn content(&self) -> AttributedText {
        self.content.clone()
    }

    fn is_editable(&self) -> bool {
        self.editable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_note_source() {
        let note = MemoryNote::markdown("- [ ] a");
        assert_eq!(note.mode(), NoteMode::Markdown);
        assert_eq!(note.content().as_str(), "- [ ] a");
        assert!(note.is_editable());
        assert!(!note.locked().is_editable());
    }

    #[test]
    fn test_mode_serde_names() {
        let mode: NoteMode = serde_json::from_str("\"rich_text\"").unwrap();
        assert_eq!(mode, NoteMode::RichText);
        assert_eq!(serde_json::to_string(&NoteMode::PlainText).unwrap(), "\"plain_text\"");
        assert!(NoteMode::default().is_markdown());
    }
}
