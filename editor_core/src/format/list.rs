//! Lists, indentation and Enter-key continuation.

use super::TextFormatter;
use crate::attributes::{AttributeKind, AttributedText, TodoState};
use crate::checkbox::{self, CHECKBOX_GLYPH, MARKER_LEN};
use crate::cursor::Selection;
use crate::note::NoteMode;
use crate::patterns;
use crate::transaction::EditPlan;
use std::ops::Range;

/// Next ordered number for a line at `depth`. Any change of depth restarts
/// the count at 1.
fn next_number(counter: &mut Option<(usize, u64)>, depth: usize) -> u64 {
    let n = match *counter {
        Some((d, n)) if d == depth => n + 1,
        _ => 1,
    };
    *counter = Some((depth, n));
    n
}

impl TextFormatter<'_> {
    /// Toggles an unordered list over the paragraph.
    pub fn list(&mut self) -> bool {
        self.toggle_list(false)
    }

    /// Toggles an ordered list over the paragraph.
    pub fn ordered_list(&mut self) -> bool {
        self.toggle_list(true)
    }

    fn toggle_list(&mut self, ordered: bool) -> bool {
        let name = if ordered { "Ordered List" } else { "List" };
        let Some(paragraph) = self.paragraph() else {
            return false;
        };
        let content = checkbox::unload_checkboxes(&self.attributed(paragraph.clone()));
        let text = content.as_str();

        if !patterns::contains_letters(text) {
            let marker = if ordered { "1. " } else { "- " };
            return self.insert_at_selection(name, marker, marker.len());
        }

        let lines: Vec<&str> = text.split('\n').collect();
        let strip = lines.iter().any(|line| patterns::has_list_prefix(line, ordered));
        let mut counter = None;
        let rewritten: Vec<String> = lines
            .iter()
            .map(|line| {
                let stripped = patterns::strip_list_marker(line);
                if strip || stripped.trim().is_empty() {
                    return stripped;
                }
                let (indent, body) = patterns::split_indent(&stripped);
                if ordered {
                    let n = next_number(&mut counter, indent.chars().count());
                    format!("{}{}. {}", indent, n, body)
                } else {
                    format!("{}- {}", indent, body)
                }
            })
            .collect();
        let new_text = rewritten.join("\n");
        if new_text == self.text(paragraph.clone()) {
            log::debug!("`{}` leaves the paragraph unchanged", name);
            return false;
        }

        let select = self.rewrite_selection(&paragraph, lines.len(), new_text.chars().count());
        self.apply(EditPlan::new(name).replace(paragraph, new_text).select(select))
    }

    /// True if the selection's paragraph starts with a list or todo marker.
    pub fn is_list_paragraph(&self) -> bool {
        let Some(paragraph) = self.paragraph() else {
            return false;
        };
        let text = self.text(paragraph);
        let first = text.split('\n').next().unwrap_or_default();
        let (_, body) = patterns::split_indent(first);
        body.starts_with(CHECKBOX_GLYPH) || patterns::match_list(first).is_some()
    }

    /// Indents every line of the paragraph by one unit.
    pub fn tab(&mut self) -> bool {
        let sel = self.selection();
        let Some(paragraph) = self.paragraph() else {
            return false;
        };
        let unit = self.indent_unit();
        let content = self.attributed(paragraph.clone());
        let lines = content.line_ranges();

        let mut out = AttributedText::new();
        for (idx, line) in lines.iter().enumerate() {
            if idx > 0 {
                out.push_str("\n");
            }
            out.push_str(unit.as_str());
            out.push_attributed(&content.slice(line.clone()));
        }

        let starts: Vec<usize> = lines.iter().map(|line| paragraph.start + line.start).collect();
        // A selection starting at a line start keeps the new indent selected.
        let shift = |pos: usize, inclusive: bool| {
            let lines = starts.iter().filter(|&&s| s < pos || (inclusive && s == pos)).count();
            pos + unit.len_chars() * lines
        };
        let select = Selection::from_range(shift(sel.location, sel.is_caret())..shift(sel.end(), true));
        self.apply(EditPlan::new("Indent").replace(paragraph, out).select(select))
    }

    /// Removes one unit of indentation from every line that starts with it.
    pub fn un_tab(&mut self) -> bool {
        let sel = self.selection();
        let Some(paragraph) = self.paragraph() else {
            return false;
        };
        let unit = self.indent_unit();
        let content = self.attributed(paragraph.clone());

        let mut out = AttributedText::new();
        let mut removed: Vec<(usize, usize)> = Vec::new();
        for (idx, line) in content.line_ranges().into_iter().enumerate() {
            if idx > 0 {
                out.push_str("\n");
            }
            let text = content.slice(line.clone());
            let cut = if text.as_str().starts_with(unit.as_str()) {
                unit.len_chars()
            } else {
                0
            };
            out.push_attributed(&text.slice(cut..text.len_chars()));
            removed.push((paragraph.start + line.start, cut));
        }
        if removed.iter().all(|&(_, cut)| cut == 0) {
            log::debug!("nothing to unindent");
            return false;
        }

        let map = |pos: usize| {
            removed
                .iter()
                .filter(|&&(start, _)| start <= pos)
                .fold(pos, |acc, &(start, cut)| acc - cut.min(pos - start))
        };
        let select = Selection::from_range(map(sel.location)..map(sel.end()));
        self.apply(EditPlan::new("Unindent").replace(paragraph, out).select(select))
    }

    /// Tab key: indents or dedents list paragraphs and selections, otherwise
    /// inserts one indent unit.
    pub fn tab_key(&mut self, shift: bool) -> bool {
        if shift {
            return self.un_tab();
        }
        if self.is_list_paragraph() || self.selection().has_selection() {
            return self.tab();
        }
        let unit = self.indent_unit().as_str();
        self.insert_at_selection("Tab", unit, unit.len())
    }

    /// Enter key. Continues todo items and lists, ends them on an empty item,
    /// and carries leading indentation in markdown notes.
    pub fn new_line(&mut self) -> bool {
        let sel = self.selection();
        let Some(paragraph) = self.paragraph_at(sel.location) else {
            log::debug!("selection {:?} is stale", sel);
            return false;
        };
        let at_start = sel.location == paragraph.start;

        if !at_start {
            if let Some(applied) = self.continue_todo(sel, &paragraph) {
                return applied;
            }
        }

        let line = self.text(paragraph.clone());
        if !at_start {
            if let Some(found) = patterns::match_list(&line) {
                if line == found.prefix() {
                    return self.end_list(paragraph);
                }
                let insert = format!("\n{}", found.continuation());
                let caret = sel.location + insert.chars().count();
                return self.apply(
                    EditPlan::new("New Line")
                        .replace(sel.range(), insert)
                        .select(Selection::caret(caret)),
                );
            }
        }

        let unit = self.indent_unit();
        if !at_start && self.mode() == NoteMode::Markdown && line.starts_with(unit.as_str()) {
            let indent: String = line.chars().take_while(|&c| c == unit.fill()).collect();
            let insert = format!("\n{}", indent);
            return self.insert_at_selection("New Line", &insert, insert.chars().count());
        }

        self.insert_at_selection("New Line", "\n", 1)
    }

    /// Todo continuation for a caret after a checkbox. `None` if the
    /// paragraph has no leading checkbox before the caret.
    fn continue_todo(&mut self, sel: Selection, paragraph: &Range<usize>) -> Option<bool> {
        let content = self.attributed(paragraph.clone());
        let (glyph, _) = checkbox::find_marker(&content)?;
        let indent = content.slice(0..glyph);
        if !indent.as_str().trim().is_empty() || sel.location <= paragraph.start + glyph {
            return None;
        }

        let body_start = (glyph + MARKER_LEN).min(content.len_chars());
        if content.slice(body_start..content.len_chars()).as_str().trim().is_empty() {
            return Some(self.end_list(paragraph.clone()));
        }

        let mut insert = AttributedText::plain("\n");
        insert.push_str(indent.as_str());
        insert.push_attributed(&checkbox::marker(TodoState::Unchecked));
        let caret = sel.location + insert.len_chars();
        let applied = self.apply(
            EditPlan::new("New Line")
                .replace(sel.range(), insert)
                .select(Selection::caret(caret)),
        );
        if applied {
            self.session.typing_attributes_mut().remove(AttributeKind::Strike);
        }
        Some(applied)
    }

    /// Clears an empty list item, leaving a blank line.
    fn end_list(&mut self, paragraph: Range<usize>) -> bool {
        let caret = Selection::caret(paragraph.start);
        self.apply(EditPlan::new("New Line").replace(paragraph, "").select(caret))
    }
}

#[cfg(test)]
mod tests {
    use super::next_number;
    use crate::attributes::{AttributedText, TodoState};
    use crate::config::{FormatterConfig, IndentUnit};
    use crate::cursor::Selection;
    use crate::note::NoteMode;
    use crate::session::EditorSession;

    fn markdown(text: &str, selection: Selection) -> EditorSession {
        let mut session = EditorSession::markdown(text);
        session.set_selection(selection);
        session
    }

    fn with_indent(text: &str, indent: IndentUnit, selection: Selection) -> EditorSession {
        let config = FormatterConfig {
            indent,
            ..FormatterConfig::default()
        };
        let mut session = EditorSession::new(NoteMode::Markdown, config);
        session.load(&AttributedText::plain(text));
        session.set_selection(selection);
        session
    }

    #[test]
    fn test_next_number_per_depth() {
        let mut counter = None;
        let numbers: Vec<u64> = [0, 0, 1, 1, 2, 0, 0, 1]
            .iter()
            .map(|&d| next_number(&mut counter, d))
            .collect();
        assert_eq!(numbers, vec![1, 2, 1, 2, 1, 1, 2, 1]);
    }

    #[test]
    fn test_list_adds_marker() {
        let mut session = markdown("Buy milk", Selection::caret(0));
        assert!(session.formatter().unwrap().list());
        assert_eq!(session.text(), "- Buy milk");
        assert_eq!(session.selection(), Selection::caret(10));
    }

    #[test]
    fn test_list_strips_marker() {
        let mut session = markdown("- Buy milk", Selection::new(0, 10));
        assert!(session.formatter().unwrap().list());
        assert_eq!(session.text(), "Buy milk");
    }

    #[test]
    fn test_list_empty_paragraph_inserts_marker() {
        let mut session = markdown("", Selection::caret(0));
        assert!(session.formatter().unwrap().list());
        assert_eq!(session.text(), "- ");
        assert_eq!(session.selection(), Selection::caret(2));
    }

    #[test]
    fn test_list_any_marked_line_strips_all() {
        let mut session = markdown("one\n- two\n1. three", Selection::new(0, 18));
        assert!(session.formatter().unwrap().list());
        assert_eq!(session.text(), "one\ntwo\nthree");
        assert_eq!(session.selection(), Selection::new(0, 13));
    }

    #[test]
    fn test_list_converts_ordered_and_todo_lines() {
        let mut session = markdown("1. a\n- [ ] b", Selection::new(0, 8));
        assert!(session.formatter().unwrap().list());
        assert_eq!(session.text(), "- a\n- b");
    }

    #[test]
    fn test_ordered_list_numbers_lines() {
        let mut session = markdown("a\nb\nc", Selection::new(0, 5));
        assert!(session.formatter().unwrap().ordered_list());
        assert_eq!(session.text(), "1. a\n2. b\n3. c");
        assert_eq!(session.selection(), Selection::new(0, 14));

        assert!(session.formatter().unwrap().ordered_list());
        assert_eq!(session.text(), "a\nb\nc");
    }

    #[test]
    fn test_ordered_list_nested_restart() {
        let mut session = markdown("a\n\tb\n\tc\nd", Selection::new(0, 9));
        assert!(session.formatter().unwrap().ordered_list());
        assert_eq!(session.text(), "1. a\n\t1. b\n\t2. c\n1. d");
    }

    #[test]
    fn test_ordered_list_skips_blank_lines() {
        let mut session = markdown("a\n\nb", Selection::new(0, 4));
        assert!(session.formatter().unwrap().ordered_list());
        assert_eq!(session.text(), "1. a\n\n2. b");
    }

    #[test]
    fn test_is_list_paragraph() {
        let mut session = markdown("- a\nb\n- [ ] c", Selection::caret(1));
        assert!(session.formatter().unwrap().is_list_paragraph());
        session.set_selection(Selection::caret(5));
        assert!(!session.formatter().unwrap().is_list_paragraph());
        session.set_selection(Selection::caret(8));
        assert!(session.formatter().unwrap().is_list_paragraph());
    }

    #[test]
    fn test_tab_and_un_tab() {
        let mut session = markdown("- a\n- b", Selection::new(0, 7));
        assert!(session.formatter().unwrap().tab());
        assert_eq!(session.text(), "\t- a\n\t- b");
        assert_eq!(session.selection(), Selection::new(0, 9));

        assert!(session.formatter().unwrap().un_tab());
        assert_eq!(session.text(), "- a\n- b");
        assert_eq!(session.selection(), Selection::new(0, 7));
    }

    #[test]
    fn test_tab_moves_caret() {
        let mut session = markdown("- a", Selection::caret(3));
        assert!(session.formatter().unwrap().tab());
        assert_eq!(session.selection(), Selection::caret(4));
    }

    #[test]
    fn test_un_tab_only_touches_indented_lines() {
        let mut session = with_indent("    a\nb", IndentUnit::FourSpaces, Selection::new(0, 7));
        assert!(session.formatter().unwrap().un_tab());
        assert_eq!(session.text(), "a\nb");
        assert_eq!(session.selection(), Selection::new(0, 3));

        assert!(!session.formatter().unwrap().un_tab());
        assert!(session.can_undo());
        assert_eq!(session.undo_name(), Some("Unindent"));
    }

    #[test]
    fn test_un_tab_clamps_to_line_start() {
        let mut session = with_indent("  x", IndentUnit::TwoSpaces, Selection::caret(1));
        assert!(session.formatter().unwrap().un_tab());
        assert_eq!(session.text(), "x");
        assert_eq!(session.selection(), Selection::caret(0));
    }

    #[test]
    fn test_tab_key() {
        let mut session = markdown("text", Selection::caret(2));
        assert!(session.formatter().unwrap().tab_key(false));
        assert_eq!(session.text(), "te\txt");

        let mut session = markdown("- item", Selection::caret(6));
        assert!(session.formatter().unwrap().tab_key(false));
        assert_eq!(session.text(), "\t- item");
        assert!(session.formatter().unwrap().tab_key(true));
        assert_eq!(session.text(), "- item");
    }

    #[test]
    fn test_new_line_continues_ordered_list() {
        let mut session = markdown("1. first item", Selection::caret(13));
        assert!(session.formatter().unwrap().new_line());
        assert_eq!(session.text(), "1. first item\n2. ");
        assert_eq!(session.selection(), Selection::caret(17));
    }

    #[test]
    fn test_new_line_keeps_bullet_and_indent() {
        let mut session = markdown("\t* a", Selection::caret(4));
        assert!(session.formatter().unwrap().new_line());
        assert_eq!(session.text(), "\t* a\n\t* ");
    }

    #[test]
    fn test_new_line_ends_empty_item() {
        let mut session = markdown("- a\n- ", Selection::caret(6));
        assert!(session.formatter().unwrap().new_line());
        assert_eq!(session.text(), "- a\n");
        assert_eq!(session.selection(), Selection::caret(4));
    }

    #[test]
    fn test_new_line_at_item_start_is_plain() {
        let mut session = markdown("- a", Selection::caret(0));
        assert!(session.formatter().unwrap().new_line());
        assert_eq!(session.text(), "\n- a");
        assert_eq!(session.selection(), Selection::caret(1));
    }

    #[test]
    fn test_new_line_continues_todo() {
        let mut session = markdown("- [x] task", Selection::caret(6));
        assert!(session.formatter().unwrap().new_line());
        assert_eq!(session.text(), "\u{FFFC} task\n\u{FFFC} ");
        assert_eq!(session.selection(), Selection::caret(9));
        assert_eq!(session.buffer().attributes_at(7).todo(), Some(TodoState::Unchecked));
        assert_eq!(session.markdown_text(), "- [x] task\n- [ ] ");
    }

    #[test]
    fn test_new_line_ends_empty_todo() {
        let mut session = markdown("- [ ] ", Selection::caret(2));
        assert!(session.formatter().unwrap().new_line());
        assert_eq!(session.text(), "");
        assert_eq!(session.selection(), Selection::caret(0));
    }

    #[test]
    fn test_new_line_propagates_indent() {
        let mut session = markdown("\t\tcode", Selection::caret(6));
        assert!(session.formatter().unwrap().new_line());
        assert_eq!(session.text(), "\t\tcode\n\t\t");
        assert_eq!(session.selection(), Selection::caret(9));
    }

    #[test]
    fn test_new_line_at_indented_line_start_keeps_indent() {
        let mut session = markdown("\tfoo", Selection::caret(0));
        assert!(session.formatter().unwrap().new_line());
        assert_eq!(session.text(), "\n\tfoo");
        assert_eq!(session.selection(), Selection::caret(1));
    }

    #[test]
    fn test_new_line_plain() {
        let mut session = markdown("abc", Selection::new(1, 1));
        assert!(session.formatter().unwrap().new_line());
        assert_eq!(session.text(), "a\nc");
        assert_eq!(session.selection(), Selection::caret(2));
    }
}
