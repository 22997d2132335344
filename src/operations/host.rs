//! Host pass-throughs: [`RunCommand`] and [`SetSyntax`].
//!
//! Script syntax:
//! - `run_command: upper_case`
//! - `run_command: [insert_snippet, {name: Packages/x.sublime-snippet}]`
//! - `set_syntax: Packages/Python/Python.sublime-syntax`

use crate::compiler::{Args, Compiler, Operation};
use crate::error::Result;
use crate::step::StepKind;
use serde_yaml::{Mapping, Value};

/// Runs a host editor command at the cursor and adopts the selection it
/// leaves behind.
#[derive(Debug)]
pub struct RunCommand {
    pub command: String,
    pub args: Option<Value>,
}

impl RunCommand {
    pub const NAME: &'static str = "run_command";
}

impl Operation for RunCommand {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(args: Args) -> Result<Self> {
        args.arity(1, 2)?;
        Ok(Self {
            command: args.text(0)?,
            args: args.get(1).cloned(),
        })
    }

    fn compile(&self, compiler: &mut Compiler<'_>) -> Result<()> {
        let kind = StepKind::RunCommand {
            name: self.command.clone(),
            args: self.args.clone(),
        };
        compiler.push_step(kind, None);
        Ok(())
    }
}

/// Asks the host to switch the target's syntax definition.
#[derive(Debug)]
pub struct SetSyntax {
    pub syntax: String,
}

impl SetSyntax {
    pub const NAME: &'static str = "set_syntax";
}

impl Operation for SetSyntax {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(args: Args) -> Result<Self> {
        args.arity(1, 1)?;
        Ok(Self {
            syntax: args.text(0)?,
        })
    }

    fn compile(&self, compiler: &mut Compiler<'_>) -> Result<()> {
        let mut args = Mapping::new();
        args.insert(Value::from("syntax"), Value::from(self.syntax.as_str()));
        let kind = StepKind::RunCommand {
            name: Self::NAME.to_string(),
            args: Some(Value::Mapping(args)),
        };
        compiler.push_step(kind, None);
        Ok(())
    }
}
