//! Mark operations.
//!
//! Script syntax: `set_mark: name`, `goto_mark: name`,
//! `select_from_mark: name`, `clear_marks`. Without a name the default mark
//! is used.

use crate::compiler::{Args, Compiler, Operation};
use crate::error::Result;
use crate::marks::DEFAULT_MARK;
use crate::step::StepKind;
use std::time::Duration;
use tracing::debug;

fn mark_name(args: &Args) -> Result<String> {
    Ok(args
        .opt_text(0)?
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_MARK.to_string()))
}

/// Remembers the cursor position under a name.
#[derive(Debug)]
pub struct SetMark {
    pub name: String,
    pub delay: Option<Duration>,
}

impl SetMark {
    pub const NAME: &'static str = "set_mark";
}

impl Operation for SetMark {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(args: Args) -> Result<Self> {
        args.arity(0, 2)?;
        Ok(Self {
            name: mark_name(&args)?,
            delay: args.delay(1)?,
        })
    }

    fn compile(&self, compiler: &mut Compiler<'_>) -> Result<()> {
        compiler.note_mark();
        compiler.push_step(StepKind::SetMark(self.name.clone()), self.delay);
        Ok(())
    }
}

/// Moves the caret to a mark.
#[derive(Debug)]
pub struct GotoMark {
    pub name: String,
    pub delay: Option<Duration>,
}

impl GotoMark {
    pub const NAME: &'static str = "goto_mark";
}

impl Operation for GotoMark {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(args: Args) -> Result<Self> {
        args.arity(0, 2)?;
        Ok(Self {
            name: mark_name(&args)?,
            delay: args.delay(1)?,
        })
    }

    fn compile(&self, compiler: &mut Compiler<'_>) -> Result<()> {
        compiler.push_step(StepKind::GotoMark(self.name.clone()), self.delay);
        Ok(())
    }
}

/// Selects from a mark to the caret.
///
/// Compiles to nothing when no mark can exist yet.
#[derive(Debug)]
pub struct SelectFromMark {
    pub name: String,
    pub delay: Option<Duration>,
}

impl SelectFromMark {
    pub const NAME: &'static str = "select_from_mark";
}

impl Operation for SelectFromMark {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(args: Args) -> Result<Self> {
        args.arity(0, 2)?;
        Ok(Self {
            name: mark_name(&args)?,
            delay: args.delay(1)?,
        })
    }

    fn compile(&self, compiler: &mut Compiler<'_>) -> Result<()> {
        if !compiler.marks_known() {
            debug!(mark = %self.name, "select_from_mark skipped, no marks yet");
            return Ok(());
        }
        compiler.push_step(StepKind::SelectFromMark(self.name.clone()), self.delay);
        Ok(())
    }
}

/// Forgets every mark.
#[derive(Debug)]
pub struct ClearMarks {
    pub delay: Option<Duration>,
}

impl ClearMarks {
    pub const NAME: &'static str = "clear_marks";
}

impl Operation for ClearMarks {
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
        compiler.push_step(StepKind::ClearMarks, self.delay);
        Ok(())
    }
}
