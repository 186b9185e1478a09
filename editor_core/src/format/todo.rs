//! Todo items.

use super::TextFormatter;
use crate::attributes::{Attribute, AttributeKind, AttributedText, TodoState};
use crate::checkbox::{self, MARKER_LEN};
use crate::cursor::Selection;
use crate::note::NoteMode;
use crate::patterns::{self, MarkerKind};
use crate::transaction::EditPlan;

const TODO_MODES: [NoteMode; 2] = [NoteMode::Markdown, NoteMode::RichText];

/// Length of a literal checkbox without its trailing space.
const LITERAL_LEN: usize = 5;

fn literal_state(line: &str) -> Option<TodoState> {
    match patterns::match_todo(line)?.kind {
        MarkerKind::Todo(state) => Some(state),
        _ => None,
    }
}

/// The line without its checkbox, leading or inline. `None` if it has none.
fn strip_todo(line: &str) -> Option<String> {
    if let Some(found) = patterns::match_todo(line) {
        return Some(format!("{}{}", found.indent, &line[found.prefix().len()..]));
    }
    ["- [ ] ", "- [x] "]
        .iter()
        .find(|literal| line.contains(*literal))
        .map(|literal| line.replacen(literal, "", 1))
}

impl TextFormatter<'_> {
    /// Adds or removes todo checkboxes on the paragraph's lines.
    ///
    /// A caret on a line without a checkbox gets a fresh unchecked one.
    /// Otherwise lines are stripped when most of them are todos, and turned
    /// into todos (keeping any existing checked state) when they are not.
    pub fn todo(&mut self) -> bool {
        if !self.requires("Todo", &TODO_MODES) {
            return false;
        }
        let sel = self.selection();
        let Some(paragraph) = self.paragraph() else {
            return false;
        };
        let content = self.attributed(paragraph.clone());
        let literal = checkbox::unload_checkboxes(&content);

        if sel.is_caret()
            && !content.has_attribute(AttributeKind::Todo)
            && literal_state(literal.as_str()).is_none()
        {
            let (indent, _) = patterns::split_indent(literal.as_str());
            let at = paragraph.start + indent.chars().count();
            let select = if sel.location >= at {
                sel.shifted(MARKER_LEN as isize)
            } else {
                sel
            };
            return self.apply(
                EditPlan::new("Todo")
                    .replace(at..at, checkbox::marker(TodoState::Unchecked))
                    .select(select),
            );
        }

        let lines: Vec<&str> = literal.as_str().split('\n').collect();
        let non_blank = lines.iter().filter(|line| !line.trim().is_empty()).count();
        let todos = lines.iter().filter(|line| strip_todo(line).is_some()).count();
        let strip = todos * 2 > non_blank;
        let single = lines.len() == 1;

        let rewritten: Vec<String> = lines
            .iter()
            .map(|line| {
                if !single && line.trim().is_empty() {
                    return line.to_string();
                }
                if strip {
                    return strip_todo(line).unwrap_or_else(|| line.to_string());
                }
                let state = literal_state(line).unwrap_or(TodoState::Unchecked);
                let stripped = patterns::strip_list_marker(line);
                let (indent, body) = patterns::split_indent(&stripped);
                format!("{}{} {}", indent, state.markdown(), body)
            })
            .collect();

        let new_content = checkbox::load_checkboxes(&AttributedText::plain(rewritten.join("\n")));
        let select = self.rewrite_selection(&paragraph, lines.len(), new_content.len_chars());
        self.apply(EditPlan::new("Todo").replace(paragraph, new_content).select(select))
    }

    /// Flips the checkbox at `location`, striking or unstriking the rest of
    /// its line. A literal `- [ ]`/`- [x]` there becomes a flipped glyph.
    pub fn toggle_todo(&mut self, location: usize) -> bool {
        if !self.requires("Toggle Todo", &TODO_MODES) {
            return false;
        }
        if location >= self.session.buffer().len_chars() {
            log::debug!("checkbox location {} is past the end", location);
            return false;
        }
        let Some(paragraph) = self.paragraph_at(location) else {
            return false;
        };

        if let Some(state) = self.session.buffer().attributes_at(location).todo() {
            let state = state.toggled();
            let rest = (location + MARKER_LEN).min(paragraph.end)..paragraph.end;
            let plan = EditPlan::new("Toggle Todo").add_attribute(location..location + 1, Attribute::Todo(state));
            let plan = if state.is_checked() {
                plan.add_attribute(rest, Attribute::Strike)
            } else {
                plan.remove_attribute(rest, AttributeKind::Strike)
            };
            if !self.apply(plan) {
                return false;
            }
            let caret = self.selection().location;
            if caret > paragraph.start && caret <= paragraph.end {
                let typing = self.session.typing_attributes_mut();
                if state.is_checked() {
                    typing.insert(Attribute::Strike);
                } else {
                    typing.remove(AttributeKind::Strike);
                }
            }
            return true;
        }

        let line = self.text(paragraph.clone());
        let Some(found) = patterns::match_todo(&line) else {
            log::debug!("no checkbox at {}", location);
            return false;
        };
        let MarkerKind::Todo(state) = found.kind else {
            return false;
        };
        let start = paragraph.start + found.indent.chars().count();
        if location < start || location - start >= LITERAL_LEN {
            log::debug!("no checkbox at {}", location);
            return false;
        }

        let state = state.toggled();
        let removed = found.marker.chars().count() - MARKER_LEN;
        let rest = start + MARKER_LEN..paragraph.end - removed;
        let sel = self.selection();
        let map = |pos: usize| {
            if pos <= start + MARKER_LEN {
                pos
            } else {
                pos.saturating_sub(removed).max(start + MARKER_LEN)
            }
        };
        let mut plan = EditPlan::new("Toggle Todo")
            .replace(start..start + found.marker.chars().count(), checkbox::marker(state))
            .select(Selection::from_range(map(sel.location)..map(sel.end())));
        if state.is_checked() {
            plan = plan.add_attribute(rest, Attribute::Strike);
        }
        self.apply(plan)
    }

    /// Flips the first checkbox of the caret's paragraph, or inserts an
    /// unchecked one at the caret.
    pub fn toggle_todo_at_caret(&mut self) -> bool {
        if !self.requires("Toggle Todo", &TODO_MODES) {
            return false;
        }
        let sel = self.selection();
        let Some(paragraph) = self.paragraph() else {
            return false;
        };
        let content = self.attributed(paragraph.clone());
        if let Some((glyph, _)) = checkbox::find_marker(&content) {
            return self.toggle_todo(paragraph.start + glyph);
        }
        if let Some(found) = patterns::match_todo(content.as_str()) {
            return self.toggle_todo(paragraph.start + found.indent.chars().count());
        }

        let at = sel.location;
        self.apply(
            EditPlan::new("Todo")
                .replace(at..at, checkbox::marker(TodoState::Unchecked))
                .select(Selection::caret(at + MARKER_LEN)),
        )
    }

    /// True if `location` is a checkbox glyph or inside a literal checkbox.
    pub fn is_todo(&self, location: usize) -> bool {
        let buffer = self.session.buffer();
        if location >= buffer.len_chars() {
            return false;
        }
        if buffer.attributes_at(location).todo().is_some() {
            return true;
        }
        let Some(paragraph) = self.paragraph_at(location) else {
            return false;
        };
        let line = self.text(paragraph.clone());
        patterns::match_todo(&line).is_some_and(|found| {
            let start = paragraph.start + found.indent.chars().count();
            location >= start && location < start + LITERAL_LEN
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::attributes::{Attribute, TodoState};
    use crate::config::FormatterConfig;
    use crate::cursor::Selection;
    use crate::note::MemoryNote;
    use crate::session::EditorSession;

    fn markdown(text: &str, selection: Selection) -> EditorSession {
        let mut session = EditorSession::markdown(text);
        session.set_selection(selection);
        session
    }

    #[test]
    fn test_todo_caret_inserts_checkbox() {
        let mut session = markdown("task", Selection::caret(2));
        assert!(session.formatter().unwrap().todo());
        assert_eq!(session.text(), "\u{FFFC} task");
        assert_eq!(session.selection(), Selection::caret(4));
        assert_eq!(session.markdown_text(), "- [ ] task");

        assert!(session.formatter().unwrap().todo());
        assert_eq!(session.text(), "task");
    }

    #[test]
    fn test_todo_caret_sees_inline_checkbox() {
        let mut session = markdown("buy milk", Selection::caret(4));
        assert!(session.formatter().unwrap().toggle_todo_at_caret());
        assert_eq!(session.markdown_text(), "buy - [ ] milk");

        session.set_selection(Selection::caret(1));
        assert!(session.formatter().unwrap().todo());
        assert_eq!(session.markdown_text(), "buy milk");
        assert!(!session.buffer().runs().any_in(0..8, crate::attributes::AttributeKind::Todo));
    }

    #[test]
    fn test_todo_caret_respects_indentation() {
        let mut session = markdown("\ttask", Selection::caret(0));
        assert!(session.formatter().unwrap().todo());
        assert_eq!(session.text(), "\t\u{FFFC} task");
        assert_eq!(session.selection(), Selection::caret(0));
    }

    #[test]
    fn test_todo_lines_skip_blanks() {
        let mut session = markdown("a\n- b\n\nc", Selection::new(0, 8));
        assert!(session.formatter().unwrap().todo());
        assert_eq!(session.markdown_text(), "- [ ] a\n- [ ] b\n\n- [ ] c");
        assert_eq!(session.selection(), Selection::new(0, 12));
    }

    #[test]
    fn test_todo_majority_strips() {
        let mut session = markdown("- [x] a\n- [ ] b\nc", Selection::new(0, 9));
        assert!(session.formatter().unwrap().todo());
        assert_eq!(session.text(), "a\nb\nc");
        assert!(!session.buffer().runs().any_in(0..5, crate::attributes::AttributeKind::Strike));
    }

    #[test]
    fn test_todo_minority_adds_and_keeps_state() {
        let mut session = markdown("- [x] a\nb\nc", Selection::new(0, 7));
        assert!(session.formatter().unwrap().todo());
        assert_eq!(session.markdown_text(), "- [x] a\n- [ ] b\n- [ ] c");
        assert!(session.buffer().attributes_at(2).contains(Attribute::Strike));
    }

    #[test]
    fn test_todo_plain_text_noop() {
        let note = MemoryNote::plain_text("task");
        let mut session = EditorSession::open(&note, FormatterConfig::default());
        assert!(!session.formatter().unwrap().todo());
        assert_eq!(session.text(), "task");
    }

    #[test]
    fn test_toggle_todo_flips_and_strikes() {
        let mut session = markdown("- [ ] buy\nnext", Selection::caret(0));
        assert!(session.formatter().unwrap().toggle_todo(0));
        assert_eq!(session.text(), "\u{FFFC} buy\nnext");
        assert_eq!(session.buffer().attributes_at(0).todo(), Some(TodoState::Checked));
        assert!(session.buffer().attributes_at(2).contains(Attribute::Strike));
        assert!(session.buffer().attributes_at(4).contains(Attribute::Strike));
        assert!(!session.buffer().attributes_at(1).contains(Attribute::Strike));
        assert!(!session.buffer().attributes_at(6).contains(Attribute::Strike));
        assert_eq!(session.markdown_text(), "- [x] buy\nnext");

        assert!(session.formatter().unwrap().toggle_todo(0));
        assert_eq!(session.buffer().attributes_at(0).todo(), Some(TodoState::Unchecked));
        assert!(!session.buffer().attributes_at(2).contains(Attribute::Strike));

        session.undo();
        assert_eq!(session.buffer().attributes_at(0).todo(), Some(TodoState::Checked));
    }

    #[test]
    fn test_toggle_todo_off_checkbox() {
        let mut session = markdown("- [ ] buy", Selection::caret(0));
        assert!(!session.formatter().unwrap().toggle_todo(3));
        assert!(!session.formatter().unwrap().toggle_todo(40));
        assert!(!session.can_undo());
    }

    #[test]
    fn test_toggle_todo_literal_checkbox() {
        let note = MemoryNote::rich_text("- [ ] x".into());
        let mut session = EditorSession::open(&note, FormatterConfig::default());
        session.set_selection(Selection::caret(7));
        assert!(session.formatter().unwrap().toggle_todo(2));
        assert_eq!(session.text(), "\u{FFFC} x");
        assert_eq!(session.buffer().attributes_at(0).todo(), Some(TodoState::Checked));
        assert!(session.buffer().attributes_at(2).contains(Attribute::Strike));
        assert_eq!(session.selection(), Selection::caret(3));
    }

    #[test]
    fn test_toggle_todo_at_caret() {
        let mut session = markdown("- [ ] a", Selection::caret(3));
        assert!(session.formatter().unwrap().toggle_todo_at_caret());
        assert_eq!(session.markdown_text(), "- [x] a");

        let mut session = markdown("plain", Selection::caret(5));
        assert!(session.formatter().unwrap().toggle_todo_at_caret());
        assert_eq!(session.markdown_text(), "plain- [ ] ");
        assert_eq!(session.selection(), Selection::caret(7));
    }

    #[test]
    fn test_is_todo() {
        let mut session = markdown("- [ ] a\nb", Selection::caret(0));
        let formatter = session.formatter().unwrap();
        assert!(formatter.is_todo(0));
        assert!(!formatter.is_todo(1));
        assert!(!formatter.is_todo(4));

        let note = MemoryNote::plain_text("  - [x] a");
        let mut plain = EditorSession::open(&note, FormatterConfig::default());
        let formatter = plain.formatter().unwrap();
        assert!(!formatter.is_todo(1));
        assert!(formatter.is_todo(2));
        assert!(formatter.is_todo(6));
        assert!(!formatter.is_todo(7));
    }
}
