//! Markdown note formatting core.
//!
//! This crate holds the editing state of an open note and the formatting
//! operations applied to it: inline styles, headers, lists and todos,
//! indentation, Enter-key continuation, code blocks, quotes and links. It
//! has no dependencies on windowing or rendering systems.

pub mod attributes;
pub mod buffer;
pub mod checkbox;
pub mod command;
pub mod config;
pub mod cursor;
pub mod error;
pub mod format;
pub mod history;
pub mod note;
pub mod paragraph;
pub mod patterns;
pub mod session;
pub mod structure;
pub mod transaction;

pub use attributes::{Attribute, AttributeKind, AttributeSet, AttributedText, TodoState};
pub use buffer::TextBuffer;
pub use command::{execute_command, execute_key, FormatCommand, KeyCommand};
pub use config::{FormatterConfig, IndentUnit};
pub use cursor::Selection;
pub use error::{ConfigError, EditError};
pub use format::TextFormatter;
pub use history::{EditOperation, History};
pub use note::{MemoryNote, NoteMode, NoteSource};
pub use session::EditorSession;
pub use transaction::{EditPlan, EditStep};
