//! An in-process [`Target`](crate::host::Target) backed by plain memory.
//!
//! Used by the CLI to play scripts into a file and by the tests to observe
//! every mutation without a real editor.

use crate::error::HostError;
use crate::host::{Buffer, CommandRunner, Cursor, RegionStore, Selection};
use serde_yaml::Value;
use std::collections::HashMap;
use std::ops::Range;

/// A host command recorded by [`MemoryTarget`].
#[derive(Debug, Clone, PartialEq)]
pub struct HostCommand {
    pub name: String,
    pub args: Option<Value>,
}

/// Text buffer, selection and tagged regions kept in memory.
///
/// Regions and selections follow edits: offsets before an edit stay put,
/// offsets at or after the edited range shift by the change in length, and
/// offsets inside a replaced range collapse to its start.
#[derive(Debug, Default)]
pub struct MemoryTarget {
    text: Vec<char>,
    selection: Vec<Cursor>,
    regions: HashMap<String, Vec<Range<usize>>>,
    commands: Vec<HostCommand>,
    offline: bool,
}

impl MemoryTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a target holding `text`, with the caret at the start.
    pub fn with_text(text: &str) -> Self {
        Self {
            text: text.chars().collect(),
            selection: vec![Cursor::point(0)],
            ..Self::default()
        }
    }

    /// The whole buffer as a string.
    pub fn text(&self) -> String {
        self.text.iter().collect()
    }

    /// Host commands run so far, oldest first.
    pub fn commands(&self) -> &[HostCommand] {
        &self.commands
    }

    /// Make every host command fail, as if the editor went away.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    fn shift(offset: usize, edit: &Range<usize>, inserted: usize) -> usize {
        if offset < edit.start {
            offset
        } else if offset >= edit.end {
            offset - (edit.end - edit.start) + inserted
        } else {
            edit.start
        }
    }

    fn shift_range(range: &Range<usize>, edit: &Range<usize>, inserted: usize) -> Range<usize> {
        Self::shift(range.start, edit, inserted)..Self::shift(range.end, edit, inserted)
    }

    fn map_selected(&mut self, f: fn(char) -> char) {
        for cursor in self.selection.clone() {
            let range = cursor.range();
            let mapped: String = self.read(range.clone()).chars().map(f).collect();
            self.replace(range, &mapped);
        }
    }
}

impl Buffer for MemoryTarget {
    fn size(&self) -> usize {
        self.text.len()
    }

    fn read(&self, range: Range<usize>) -> String {
        let end = range.end.min(self.text.len());
        let start = range.start.min(end);
        self.text[start..end].iter().collect()
    }

    fn replace(&mut self, range: Range<usize>, text: &str) {
        let end = range.end.min(self.text.len());
        let start = range.start.min(end);
        let inserted: Vec<char> = text.chars().collect();
        let count = inserted.len();
        self.text.splice(start..end, inserted);

        let edit = start..end;
        for ranges in self.regions.values_mut() {
            for region in ranges.iter_mut() {
                *region = Self::shift_range(region, &edit, count);
            }
        }
        for cursor in self.selection.iter_mut() {
            cursor.anchor = Self::shift(cursor.anchor, &edit, count);
            cursor.head = Self::shift(cursor.head, &edit, count);
        }
    }

    fn line_at(&self, offset: usize) -> Range<usize> {
        let offset = offset.min(self.text.len());
        let start = self.text[..offset]
            .iter()
            .rposition(|&ch| ch == '\n')
            .map_or(0, |idx| idx + 1);
        let end = self.text[offset..]
            .iter()
            .position(|&ch| ch == '\n')
            .map_or(self.text.len(), |idx| offset + idx);
        start..end
    }

    fn point_at(&self, row: usize, col: usize) -> usize {
        let mut line_start = 0;
        for _ in 0..row {
            match self.text[line_start..].iter().position(|&ch| ch == '\n') {
                Some(idx) => line_start += idx + 1,
                None => return self.text.len(),
            }
        }
        let line = self.line_at(line_start);
        (line.start + col).min(line.end)
    }

    fn row_col_of(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.text.len());
        let row = self.text[..offset].iter().filter(|&&ch| ch == '\n').count();
        (row, offset - self.line_at(offset).start)
    }
}

impl Selection for MemoryTarget {
    fn selections(&self) -> Vec<Cursor> {
        self.selection.clone()
    }

    fn clear_selection(&mut self) {
        self.selection.clear();
    }

    fn add_selection(&mut self, cursor: Cursor) {
        if !self.selection.contains(&cursor) {
            self.selection.push(cursor);
        }
    }

    fn remove_selection(&mut self, cursor: Cursor) {
        self.selection.retain(|existing| *existing != cursor);
    }
}

impl RegionStore for MemoryTarget {
    fn tag(&mut self, name: &str, ranges: Vec<Range<usize>>) {
        self.regions.insert(name.to_string(), ranges);
    }

    fn get(&self, name: &str) -> Vec<Range<usize>> {
        self.regions.get(name).cloned().unwrap_or_default()
    }

    fn untag(&mut self, name: &str) {
        self.regions.remove(name);
    }
}

impl CommandRunner for MemoryTarget {
    fn run_command(&mut self, name: &str, args: Option<&Value>) -> Result<(), HostError> {
        if self.offline {
            return Err(HostError::Unavailable("host command runner".to_string()));
        }
        self.commands.push(HostCommand {
            name: name.to_string(),
            args: args.cloned(),
        });
        match name {
            "upper_case" => self.map_selected(|ch| ch.to_ascii_uppercase()),
            "lower_case" => self.map_selected(|ch| ch.to_ascii_lowercase()),
            "single_selection" => {
                if let Some(first) = self.selection.first().copied() {
                    self.select(first);
                }
            }
            _ => {}
        }
        Ok(())
    }
}
