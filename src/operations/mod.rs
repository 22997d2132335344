mod host;
mod marks;
mod motion;
mod select;
mod write;
mod write_inside;
mod write_lines;

pub use host::{RunCommand, SetSyntax};
pub use marks::{ClearMarks, GotoMark, SelectFromMark, SetMark};
pub use motion::{AddCursor, Clear, Delay, Delete, Go, Goto, GotoEol, Nl};
pub use select::{ClearLines, SelectAll, SelectDelta, SelectEol, SelectLines, SelectNext};
pub use write::{Insert, InsertAt, Write, WriteAt, WriteParallel};
pub use write_inside::WriteInside;
pub use write_lines::WriteLines;
