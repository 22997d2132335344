//! Compiled steps: one delayed, atomic mutation of the target each.

use crate::error::Result;
use crate::host::{Buffer, CommandRunner, Cursor, Selection, Target};
use crate::marks::MarkTable;
use crate::position;
use serde_yaml::Value;
use std::time::Duration;
use tracing::warn;

/// What a step does when the engine runs it.
#[derive(Debug, Clone, PartialEq)]
pub enum StepKind {
    /// Replace the cursor with `text` and leave a caret `advance` characters
    /// past the cursor's start.
    Replace { text: String, advance: usize },

    /// Nothing; only the delay matters.
    Pause,

    /// Move the caret by a signed number of characters from the cursor start.
    Go(i64),

    SelectAll,

    /// Grow or shrink the end of the selection.
    SelectDelta(i64),

    /// Select from the cursor start to the end of its line.
    SelectEol,

    GotoEol,

    /// Select the next literal occurrence at or after the cursor start.
    SelectNext(String),

    /// Select whole lines `first..=last`; negative rows count from the end.
    SelectLines { first: i64, last: i64 },

    /// Overwrite at an absolute position, growing the buffer as needed.
    WriteAt { row: usize, col: usize, text: String },

    /// Overwrite at a position relative to the cursor's row and column,
    /// keeping the cursor where it is.
    WriteRelative { rows: usize, cols: usize, text: String },

    SetMark(String),

    GotoMark(String),

    /// Select from a mark to the cursor's head.
    SelectFromMark(String),

    ClearMarks,

    /// Run a host command, then adopt the host's first selection.
    RunCommand { name: String, args: Option<Value> },
}

/// Where the cursor goes after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Unchanged,
    Point(usize),
    Range(usize, usize),
}

impl Outcome {
    /// The cursor the next step receives.
    pub fn into_cursor(self, previous: Cursor) -> Cursor {
        match self {
            Outcome::Unchanged => previous,
            Outcome::Point(offset) => Cursor::point(offset),
            Outcome::Range(anchor, head) => Cursor::new(anchor, head),
        }
    }
}

/// A queued step and the pause that follows it.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub kind: StepKind,
    pub delay: Duration,
}

impl Step {
    pub fn new(kind: StepKind, delay: Duration) -> Self {
        Self { kind, delay }
    }

    /// Apply the step to `target` at `cursor`.
    ///
    /// # Errors
    ///
    /// Only host command failures are reported; everything else either
    /// succeeds or leaves the cursor unchanged.
    pub fn apply<T: Target + ?Sized>(
        &self,
        target: &mut T,
        marks: &mut MarkTable,
        cursor: Cursor,
    ) -> Result<Outcome> {
        let outcome = match &self.kind {
            StepKind::Replace { text, advance } => {
                target.replace(cursor.range(), text);
                Outcome::Point(cursor.begin() + advance)
            }

            StepKind::Pause => Outcome::Unchanged,

            StepKind::Go(delta) => {
                let offset = offset_by(cursor.begin(), *delta).min(target.size());
                select(target, Outcome::Point(offset))
            }

            StepKind::SelectAll => select(target, Outcome::Range(0, target.size())),

            StepKind::SelectDelta(delta) => {
                let end = offset_by(cursor.end(), *delta).min(target.size());
                select(target, Outcome::Range(cursor.begin(), end))
            }

            StepKind::SelectEol => {
                let eol = target.line_at(cursor.anchor).end;
                select(target, Outcome::Range(cursor.begin(), eol))
            }

            StepKind::GotoEol => {
                let eol = target.line_at(cursor.anchor).end;
                select(target, Outcome::Point(eol))
            }

            StepKind::SelectNext(needle) => match target.find(needle, cursor.begin()) {
                Some(found) => select(target, Outcome::Range(found.start, found.end)),
                None => {
                    warn!(needle = %needle, "select_next found no match");
                    Outcome::Unchanged
                }
            },

            StepKind::SelectLines { first, last } => select_lines(target, *first, *last),

            StepKind::WriteAt { row, col, text } => {
                match position::write_at(target, *row, *col, text) {
                    Some(offset) => Outcome::Point(offset),
                    None => Outcome::Unchanged,
                }
            }

            StepKind::WriteRelative { rows, cols, text } => {
                let (row, col) = target.row_col_of(cursor.begin());
                position::write_at(target, row + rows, col + cols, text);
                Outcome::Point(cursor.begin())
            }

            StepKind::SetMark(name) => {
                marks.set(target, name, cursor.begin());
                Outcome::Unchanged
            }

            StepKind::GotoMark(name) => match marks.resolve(target, name) {
                Some(offset) => Outcome::Point(offset),
                None => {
                    warn!(mark = %name, "goto_mark: no such mark");
                    Outcome::Unchanged
                }
            },

            StepKind::SelectFromMark(name) => match marks.resolve(target, name) {
                Some(offset) => Outcome::Range(offset, cursor.head),
                None => {
                    warn!(mark = %name, "select_from_mark: no such mark");
                    Outcome::Unchanged
                }
            },

            StepKind::ClearMarks => {
                marks.clear(target);
                Outcome::Unchanged
            }

            StepKind::RunCommand { name, args } => {
                target.add_selection(cursor);
                target.run_command(name, args.as_ref())?;
                match target.selections().first() {
                    Some(selected) => Outcome::Range(selected.anchor, selected.head),
                    None => Outcome::Unchanged,
                }
            }
        };
        Ok(outcome)
    }
}

fn offset_by(offset: usize, delta: i64) -> usize {
    if delta < 0 {
        offset.saturating_sub(delta.unsigned_abs() as usize)
    } else {
        offset + delta as usize
    }
}

/// Make `outcome` the live selection as well as the next cursor.
fn select<T: Target + ?Sized>(target: &mut T, outcome: Outcome) -> Outcome {
    target.select(outcome.into_cursor(Cursor::default()));
    outcome
}

fn select_lines<T: Target + ?Sized>(target: &mut T, first: i64, last: i64) -> Outcome {
    let lines = target.line_count() as i64;
    let first_row = if first < 0 { lines + first } else { first };
    let last_row = if last < 0 { lines + last } else { last };
    if first_row < 0 || first_row >= lines {
        warn!(first, last, lines, "select_lines: rows out of reach");
        return Outcome::Unchanged;
    }
    let last_row = last_row.clamp(first_row, lines - 1);

    let start = target.full_line_at(target.point_at(first_row as usize, 0)).start;
    let stop = target.full_line_at(target.point_at(last_row as usize, 0)).end;
    select(target, Outcome::Range(start, stop))
}
