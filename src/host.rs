//! Capabilities the host editor provides to the director.
//!
//! All offsets are character offsets into the buffer, not byte offsets. A
//! host implements [`Buffer`], [`Selection`], [`RegionStore`] and
//! [`CommandRunner`]; anything implementing all four is a [`Target`].

use crate::error::HostError;
use serde_yaml::Value;
use std::ops::Range;

/// The insertion point or selection threaded from one step to the next.
///
/// `anchor` is where the selection started and `head` where the caret is;
/// either may be the larger one. The covered text is always
/// `begin()..end()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cursor {
    pub anchor: usize,
    pub head: usize,
}

impl Cursor {
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// A zero-width cursor at `offset`.
    pub fn point(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    pub fn begin(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn end(&self) -> usize {
        self.anchor.max(self.head)
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }

    pub fn range(&self) -> Range<usize> {
        self.begin()..self.end()
    }
}

impl From<Range<usize>> for Cursor {
    fn from(range: Range<usize>) -> Self {
        Cursor::new(range.start, range.end)
    }
}

/// A linear, mutable text buffer addressed by character offsets.
pub trait Buffer {
    /// Number of characters in the buffer.
    fn size(&self) -> usize;

    /// Text covered by `range`, clamped to the buffer.
    fn read(&self, range: Range<usize>) -> String;

    /// Replace the text covered by `range` with `text`.
    fn replace(&mut self, range: Range<usize>, text: &str);

    /// The line containing `offset`, without its line break.
    fn line_at(&self, offset: usize) -> Range<usize>;

    /// Offset of `col` on `row`.
    ///
    /// Rows past the last line resolve to the end of the buffer; columns past
    /// the end of the line resolve to the end of that line.
    fn point_at(&self, row: usize, col: usize) -> usize;

    /// Row and column of `offset`.
    fn row_col_of(&self, offset: usize) -> (usize, usize);

    /// The line containing `offset`, including its trailing line break.
    fn full_line_at(&self, offset: usize) -> Range<usize> {
        let line = self.line_at(offset);
        if line.end < self.size() {
            line.start..line.end + 1
        } else {
            line
        }
    }

    /// Number of lines; an empty buffer has one empty line.
    fn line_count(&self) -> usize {
        self.row_col_of(self.size()).0 + 1
    }

    /// Next literal occurrence of `needle` starting at or after `from`.
    fn find(&self, needle: &str, from: usize) -> Option<Range<usize>> {
        if needle.is_empty() {
            return None;
        }
        let from = from.min(self.size());
        let haystack = self.read(from..self.size());
        haystack.find(needle).map(|byte_idx| {
            let start = from + haystack[..byte_idx].chars().count();
            start..start + needle.chars().count()
        })
    }
}

/// The live, user-visible selection of the target.
pub trait Selection {
    fn selections(&self) -> Vec<Cursor>;

    fn clear_selection(&mut self);

    fn add_selection(&mut self, cursor: Cursor);

    fn remove_selection(&mut self, cursor: Cursor);

    /// Replace the whole selection with `cursor`.
    fn select(&mut self, cursor: Cursor) {
        self.clear_selection();
        self.add_selection(cursor);
    }
}

/// Named ranges that follow the text as it is edited.
pub trait RegionStore {
    fn tag(&mut self, name: &str, ranges: Vec<Range<usize>>);

    fn get(&self, name: &str) -> Vec<Range<usize>>;

    fn untag(&mut self, name: &str);
}

/// Access to the host editor's own commands.
pub trait CommandRunner {
    /// Run the host command `name`; the resulting selection is read back
    /// through [`Selection`].
    fn run_command(&mut self, name: &str, args: Option<&Value>) -> Result<(), HostError>;
}

/// Everything a script needs from the buffer it drives.
pub trait Target: Buffer + Selection + RegionStore + CommandRunner {}

impl<T: Buffer + Selection + RegionStore + CommandRunner + ?Sized> Target for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_orders_its_ends() {
        let cursor = Cursor::new(7, 3);
        assert_eq!(cursor.begin(), 3);
        assert_eq!(cursor.end(), 7);
        assert_eq!(cursor.range(), 3..7);
        assert!(!cursor.is_empty());
        assert!(Cursor::point(4).is_empty());
    }
}
