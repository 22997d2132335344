//! Selection primitives.
//!
//! Script syntax:
//! - `select_all`, `select_eol`
//! - `select_delta: 4`
//! - `select_next: "needle"`
//! - `select_lines: [0, -1]`, `clear_lines: [2, 3]`

use crate::compiler::{Args, Compiler, Operation};
use crate::error::Result;
use crate::operations::motion::delete;
use crate::step::StepKind;
use std::time::Duration;

/// Selects the whole buffer.
#[derive(Debug)]
pub struct SelectAll {
    pub delay: Option<Duration>,
}

impl SelectAll {
    pub const NAME: &'static str = "select_all";
}

impl Operation for SelectAll {
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
        Ok(())
    }
}

/// Moves the end of the selection by a signed amount.
#[derive(Debug)]
pub struct SelectDelta {
    pub by: i64,
    pub delay: Option<Duration>,
}

impl SelectDelta {
    pub const NAME: &'static str = "select_delta";
}

impl Operation for SelectDelta {
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
        compiler.push_step(StepKind::SelectDelta(self.by), self.delay);
        Ok(())
    }
}

/// Selects to the end of the current line.
#[derive(Debug)]
pub struct SelectEol {
    pub delay: Option<Duration>,
}

impl SelectEol {
    pub const NAME: &'static str = "select_eol";
}

impl Operation for SelectEol {
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
        compiler.push_step(StepKind::SelectEol, self.delay);
        Ok(())
    }
}

/// Selects the next literal occurrence of `needle`.
#[derive(Debug)]
pub struct SelectNext {
    pub needle: String,
    pub delay: Option<Duration>,
}

impl SelectNext {
    pub const NAME: &'static str = "select_next";
}

impl Operation for SelectNext {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(args: Args) -> Result<Self> {
        args.arity(1, 2)?;
        Ok(Self {
            needle: args.text(0)?,
            delay: args.delay(1)?,
        })
    }

    fn compile(&self, compiler: &mut Compiler<'_>) -> Result<()> {
        compiler.push_step(StepKind::SelectNext(self.needle.clone()), self.delay);
        Ok(())
    }
}

/// Selects whole lines; negative rows count back from the last line.
///
/// Rows that do not exist when the step runs leave the cursor alone.
#[derive(Debug)]
pub struct SelectLines {
    pub first: i64,
    pub last: i64,
    pub delay: Option<Duration>,
}

impl SelectLines {
    pub const NAME: &'static str = "select_lines";
}

impl Operation for SelectLines {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(args: Args) -> Result<Self> {
        args.arity(2, 3)?;
        Ok(Self {
            first: args.int(0)?,
            last: args.int(1)?,
            delay: args.delay(2)?,
        })
    }

    fn compile(&self, compiler: &mut Compiler<'_>) -> Result<()> {
        let kind = StepKind::SelectLines {
            first: self.first,
            last: self.last,
        };
        compiler.push_step(kind, self.delay);
        Ok(())
    }
}

/// [`SelectLines`] followed by a delete.
#[derive(Debug)]
pub struct ClearLines(SelectLines);

impl ClearLines {
    pub const NAME: &'static str = "clear_lines";
}

impl Operation for ClearLines {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(args: Args) -> Result<Self> {
        Ok(Self(SelectLines::parse(args)?))
    }

    fn compile(&self, compiler: &mut Compiler<'_>) -> Result<()> {
        self.0.compile(compiler)?;
        compiler.push_step(delete(), self.0.delay);
        Ok(())
    }
}
