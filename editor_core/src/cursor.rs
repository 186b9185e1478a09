//! Selection handling.

use std::ops::Range;

/// A selection expressed as a start location and a length in characters.
/// A zero length is a caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub location: usize,
    pub length: usize,
}

impl Selection {
    /// Creates a selection covering `length` characters from `location`.
    pub fn new(location: usize, length: usize) -> Self {
        Self { location, length }
    }

    /// Creates a caret at the given position.
    pub fn caret(pos: usize) -> Self {
        Self::new(pos, 0)
    }

    /// Creates a selection covering a range.
    pub fn from_range(range: Range<usize>) -> Self {
        Self::new(range.start, range.end.saturating_sub(range.start))
    }

    /// Returns true if there's an active selection.
    pub fn has_selection(&self) -> bool {
        self.length > 0
    }

    pub fn is_caret(&self) -> bool {
        self.length == 0
    }

    /// Position just past the selection.
    pub fn end(&self) -> usize {
        self.location + self.length
    }

    pub fn range(&self) -> Range<usize> {
        self.location..self.end()
    }

    /// Collapses the selection to its end.
    pub fn collapse(&mut self) {
        self.location = self.end();
        self.length = 0;
    }

    /// Returns this selection shifted by `delta`, saturating at 0.
    pub fn shifted(&self, delta: isize) -> Self {
        let location = (self.location as isize + delta).max(0) as usize;
        Self::new(location, self.length)
    }

    /// Clamps the selection to a buffer of `len` characters.
    pub fn clamped(&self, len: usize) -> Self {
        let location = self.location.min(len);
        let length = self.length.min(len - location);
        Self::new(location, length)
    }
}

impl From<Range<usize>> for Selection {
    fn from(range: Range<usize>) -> Self {
        Selection::from_range(range)
    }
}
