//! Single-step cursor and editing primitives.
//!
//! Script syntax:
//! - `nl`, `delete`, `clear`, `goto_eol` (each takes an optional delay)
//! - `delay: 500`
//! - `go: -3`
//! - `goto: [row, col]`, `add_cursor: [row, col]`

use crate::compiler::{Args, Compiler, Operation};
use crate::error::Result;
use crate::operations::write::goto;
use crate::step::StepKind;
use std::time::Duration;

/// Types a line break.
#[derive(Debug)]
pub struct Nl {
    pub delay: Option<Duration>,
}

impl Nl {
    pub const NAME: &'static str = "nl";
}

impl Operation for Nl {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(args: Args) -> Result<Self> {
        args.arity(0, 1)?;
        Ok(Self {
            delay: args.delay(0)?,
        })
    }

    fn compile(&self, compiler: &mut Compiler<'_>) -> Result<()> {
        let kind = StepKind::Replace {
            text: "\n".to_string(),
            advance: 1,
        };
        compiler.push_step(kind, self.delay);
        Ok(())
    }
}

/// Pauses playback without touching the buffer.
#[derive(Debug)]
pub struct Delay {
    pub duration: Option<Duration>,
}

impl Delay {
    pub const NAME: &'static str = "delay";
}

impl Operation for Delay {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(args: Args) -> Result<Self> {
        args.arity(0, 1)?;
        Ok(Self {
            duration: args.delay(0)?,
        })
    }

    fn compile(&self, compiler: &mut Compiler<'_>) -> Result<()> {
        let duration = self
            .duration
            .unwrap_or_else(|| Duration::from_millis(compiler.timing().pause));
        compiler.push(StepKind::Pause, duration);
        Ok(())
    }
}

/// Moves the caret by a signed number of characters.
#[derive(Debug)]
pub struct Go {
    pub by: i64,
    pub delay: Option<Duration>,
}

impl Go {
    pub const NAME: &'static str = "go";
}

impl Operation for Go {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(args: Args) -> Result<Self> {
        args.arity(1, 2)?;
        Ok(Self {
            by: args.int(0)?,
            delay: args.delay(1)?,
        })
    }

    fn compile(&self, compiler: &mut Compiler<'_>) -> Result<()> {
        compiler.push_step(StepKind::Go(self.by), self.delay);
        Ok(())
    }
}

/// Jumps to `(row, col)`, growing the buffer if it is not there yet.
#[derive(Debug)]
pub struct Goto {
    pub row: usize,
    pub col: usize,
}

impl Goto {
    pub const NAME: &'static str = "goto";
}

impl Operation for Goto {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(args: Args) -> Result<Self> {
        args.arity(2, 2)?;
        Ok(Self {
            row: args.index(0)?,
            col: args.index(1)?,
        })
    }

    fn compile(&self, compiler: &mut Compiler<'_>) -> Result<()> {
        compiler.push(goto(self.row, self.col), Duration::ZERO);
        Ok(())
    }
}

/// Same as [`Goto`]; playback drives one cursor at a time.
#[derive(Debug)]
pub struct AddCursor(Goto);

impl AddCursor {
    pub const NAME: &'static str = "add_cursor";
}

impl Operation for AddCursor {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(args: Args) -> Result<Self> {
        Ok(Self(Goto::parse(args)?))
    }

    fn compile(&self, compiler: &mut Compiler<'_>) -> Result<()> {
        self.0.compile(compiler)
    }
}

/// Jumps to the end of the current line.
#[derive(Debug)]
pub struct GotoEol;

impl GotoEol {
    pub const NAME: &'static str = "goto_eol";
}

impl Operation for GotoEol {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(args: Args) -> Result<Self> {
        args.arity(0, 0)?;
        Ok(Self)
    }

    fn compile(&self, compiler: &mut Compiler<'_>) -> Result<()> {
        compiler.push(StepKind::GotoEol, Duration::ZERO);
        Ok(())
    }
}

/// Deletes the selection.
#[derive(Debug)]
pub struct Delete {
    pub delay: Option<Duration>,
}

impl Delete {
    pub const NAME: &'static str = "delete";
}

pub(crate) fn delete() -> StepKind {
    StepKind::Replace {
        text: String::new(),
        advance: 0,
    }
}

impl Operation for Delete {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(args: Args) -> Result<Self> {
        args.arity(0, 1)?;
        Ok(Self {
            delay: args.delay(0)?,
        })
    }

    fn compile(&self, compiler: &mut Compiler<'_>) -> Result<()> {
        compiler.push_step(delete(), self.delay);
        Ok(())
    }
}

/// Empties the buffer and forgets all marks.
#[derive(Debug)]
pub struct Clear {
    pub delay: Option<Duration>,
}

impl Clear {
    pub const NAME: &'static str = "clear";
}

impl Operation for Clear {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(args: Args) -> Result<Self> {
        args.arity(0, 1)?;
        Ok(Self {
            delay: args.delay(0)?,
        })
    }

    fn compile(&self, compiler: &mut Compiler<'_>) -> Result<()> {
        compiler.push_step(StepKind::SelectAll, self.delay);
        compiler.push_step(delete(), self.delay);
        compiler.push_step(StepKind::ClearMarks, self.delay);
        Ok(())
    }
}
