//! [`WriteInside`] operation: types matching brackets, then their content.
//!
//! Script syntax, three equivalent shapes:
//! - `write_inside: "'first and last character are the brackets'"`
//! - `write_inside: ["(", "explicit middle", ")"]`
//! - `write_inside: ["<<", {write: a}, nl, {write: b}, ">>"]`

use crate::compiler::{Args, Compiler, Operation};
use crate::error::Result;
use crate::operations::Write;
use crate::script::scalar_text;
use crate::step::StepKind;
use serde_yaml::Value;

/// Types each opening bracket together with its closing partner, outermost
/// first, then compiles `middle` between them.
///
/// The cursor ends right before the first closing bracket, so following
/// entries keep writing inside.
#[derive(Debug)]
pub struct WriteInside {
    pub left: Vec<char>,
    pub middle: Value,
    pub right: Vec<char>,
}

impl WriteInside {
    pub const NAME: &'static str = "write_inside";
}

impl Operation for WriteInside {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(args: Args) -> Result<Self> {
        args.arity(1, usize::MAX)?;
        let values = args.values();
        let (left, middle, right) = match values.len() {
            1 => {
                let whole: Vec<char> = args.text(0)?.chars().collect();
                let (first, last) = match (whole.first(), whole.last()) {
                    (Some(first), Some(last)) => (*first, *last),
                    _ => return Err(args.error("needs at least one bracket character")),
                };
                let inner: String = if whole.len() > 2 {
                    whole[1..whole.len() - 1].iter().collect()
                } else {
                    String::new()
                };
                (first.to_string(), Value::String(inner), last.to_string())
            }
            2 => {
                return Err(args.error(
                    "expected a single bracketed string, or left, middle and right; got 2 arguments",
                ));
            }
            3 => (args.text(0)?, values[1].clone(), args.text(2)?),
            n => (
                args.text(0)?,
                Value::Sequence(values[1..n - 1].to_vec()),
                args.text(n - 1)?,
            ),
        };

        let (left_len, right_len) = (left.chars().count(), right.chars().count());
        if left_len != right_len {
            return Err(args.error(format!(
                "len({left}) ({left_len}) != len({right}) ({right_len})"
            )));
        }

        Ok(Self {
            left: left.chars().collect(),
            middle,
            right: right.chars().collect(),
        })
    }

    fn compile(&self, compiler: &mut Compiler<'_>) -> Result<()> {
        for (open, close) in self.left.iter().zip(self.right.iter().rev()) {
            let kind = StepKind::Replace {
                text: format!("{open}{close}"),
                advance: 1,
            };
            compiler.push_step(kind, None);
        }

        match &self.middle {
            Value::Null => {}
            Value::Sequence(entries) => {
                for entry in entries {
                    compiler.execute(entry)?;
                }
            }
            Value::Mapping(_) => compiler.execute(&self.middle)?,
            scalar => {
                let text = scalar_text(scalar).unwrap_or_default();
                Write::new(text).compile(compiler)?;
            }
        }
        Ok(())
    }
}
