//! Commands and key dispatch.

use crate::session::EditorSession;

/// A formatting request from a menu, toolbar or shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatCommand {
    // Inline styles
    Bold,
    Italic,
    Underline,
    Strike,
    Header(u8),

    // Lists
    List,
    OrderedList,
    Todo,
    ToggleTodo(usize),
    Indent,
    Unindent,

    // Blocks
    CodeBlock,
    CodeSpan,
    Quote,
    Link,
    Image,
    WikiLink,
}

impl FormatCommand {
    /// Parses a menu identifier such as `format.bold` or `format.h2`.
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        let name = identifier.strip_prefix("format.")?;
        let command = match name {
            "bold" => FormatCommand::Bold,
            "italic" => FormatCommand::Italic,
            "underline" => FormatCommand::Underline,
            "strike" | "strikethrough" => FormatCommand::Strike,
            "list" => FormatCommand::List,
            "ordered_list" => FormatCommand::OrderedList,
            "todo" => FormatCommand::Todo,
            "indent" => FormatCommand::Indent,
            "unindent" => FormatCommand::Unindent,
            "code_block" => FormatCommand::CodeBlock,
            "code_span" => FormatCommand::CodeSpan,
            "quote" => FormatCommand::Quote,
            "link" => FormatCommand::Link,
            "image" => FormatCommand::Image,
            "wiki_link" => FormatCommand::WikiLink,
            _ => {
                let level: u8 = name.strip_prefix('h')?.parse().ok()?;
                if !(1..=6).contains(&level) {
                    return None;
                }
                FormatCommand::Header(level)
            }
        };
        Some(command)
    }
}

/// A key press routed through the formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Enter,
    Tab,
    ShiftTab,
    Char(char),
    Backspace,
    Undo,
    Redo,
}

/// Runs a formatting command. Returns true if the session changed.
pub fn execute_command(session: &mut EditorSession, command: FormatCommand) -> bool {
    let Some(mut formatter) = session.formatter() else {
        return false;
    };
    match command {
        FormatCommand::Bold => formatter.bold(),
        FormatCommand::Italic => formatter.italic(),
        FormatCommand::Underline => formatter.underline(),
        FormatCommand::Strike => formatter.strike(),
        FormatCommand::Header(level) => formatter.header(level),

        FormatCommand::List => formatter.list(),
        FormatCommand::OrderedList => formatter.ordered_list(),
        FormatCommand::Todo => formatter.todo(),
        FormatCommand::ToggleTodo(location) => formatter.toggle_todo(location),
        FormatCommand::Indent => formatter.tab(),
        FormatCommand::Unindent => formatter.un_tab(),

        FormatCommand::CodeBlock => formatter.code_block(),
        FormatCommand::CodeSpan => formatter.back_tick(),
        FormatCommand::Quote => formatter.quote(),
        FormatCommand::Link => formatter.link(),
        FormatCommand::Image => formatter.image(),
        FormatCommand::WikiLink => formatter.wiki_link(),
    }
}

/// Handles a key press. Returns true if the session changed.
pub fn execute_key(session: &mut EditorSession, key: KeyCommand) -> bool {
    match key {
        KeyCommand::Enter => {
            // A line break is its own undo step.
            session.break_undo_coalescing();
            let changed = session.formatter().is_some_and(|mut f| f.new_line());
            session.break_undo_coalescing();
            changed
        }
        KeyCommand::Tab => session.formatter().is_some_and(|mut f| f.tab_key(false)),
        KeyCommand::ShiftTab => session.formatter().is_some_and(|mut f| f.tab_key(true)),
        KeyCommand::Char(ch @ ('(' | '[' | '{' | '"')) => {
            session.formatter().is_some_and(|mut f| f.insert_bracket(ch))
        }
        KeyCommand::Char(ch) => session.type_text(ch.encode_utf8(&mut [0; 4])),
        KeyCommand::Backspace => session.delete_backward(),
        KeyCommand::Undo => session.undo(),
        KeyCommand::Redo => session.redo(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::Selection;

    #[test]
    fn test_from_identifier() {
        assert_eq!(FormatCommand::from_identifier("format.bold"), Some(FormatCommand::Bold));
        assert_eq!(FormatCommand::from_identifier("format.h3"), Some(FormatCommand::Header(3)));
        assert_eq!(
            FormatCommand::from_identifier("format.wiki_link"),
            Some(FormatCommand::WikiLink)
        );
        assert_eq!(FormatCommand::from_identifier("format.h7"), None);
        assert_eq!(FormatCommand::from_identifier("format.hx"), None);
        assert_eq!(FormatCommand::from_identifier("bold"), None);
    }

    #[test]
    fn test_execute_command() {
        let mut session = EditorSession::markdown("word");
        session.set_selection(Selection::new(0, 4));
        assert!(execute_command(&mut session, FormatCommand::Bold));
        assert_eq!(session.text(), "**word**");
        assert_eq!(session.undo_name(), Some("Bold"));
    }

    #[test]
    fn test_locked_session_ignores_commands() {
        let mut session = EditorSession::markdown("word");
        session.set_editable(false);
        assert!(!execute_command(&mut session, FormatCommand::Header(1)));
        assert!(!execute_key(&mut session, KeyCommand::Enter));
        assert!(!execute_key(&mut session, KeyCommand::Char('a')));
        assert_eq!(session.text(), "word");
    }

    #[test]
    fn test_enter_is_separate_undo_step() {
        let mut session = EditorSession::markdown("");
        for ch in "- a".chars() {
            execute_key(&mut session, KeyCommand::Char(ch));
        }
        execute_key(&mut session, KeyCommand::Enter);
        execute_key(&mut session, KeyCommand::Char('b'));
        assert_eq!(session.text(), "- a\n- b");

        execute_key(&mut session, KeyCommand::Undo);
        assert_eq!(session.text(), "- a\n- ");
        execute_key(&mut session, KeyCommand::Undo);
        assert_eq!(session.text(), "- a");
        execute_key(&mut session, KeyCommand::Redo);
        assert_eq!(session.text(), "- a\n- ");
    }

    #[test]
    fn test_tab_keys() {
        let mut session = EditorSession::markdown("- a");
        session.set_selection(Selection::caret(3));
        assert!(execute_key(&mut session, KeyCommand::Tab));
        assert_eq!(session.text(), "\t- a");
        assert!(execute_key(&mut session, KeyCommand::ShiftTab));
        assert_eq!(session.text(), "- a");
    }
}
