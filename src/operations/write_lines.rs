//! [`WriteLines`] operation: types a block of lines column by column.
//!
//! Script syntax:
//! - `write_lines: ["    if x:", "        y()"]`
//! - `write_lines: {lines: ["a", "b"], delay: 40}`

use crate::compiler::{Args, Compiler, Operation};
use crate::error::Result;
use crate::script::scalar_text;
use crate::step::StepKind;
use serde_yaml::Value;
use std::time::Duration;

/// Replays several lines in column-major order relative to the cursor.
///
/// Every character of a column lands in the same instant at
/// `(cursor row + line index, cursor column + column index)`, growing the
/// buffer as needed; a single pause follows each column. The cursor itself
/// does not move.
#[derive(Debug)]
pub struct WriteLines {
    pub lines: Vec<Vec<char>>,
    pub delay: Option<u64>,
}

impl WriteLines {
    pub const NAME: &'static str = "write_lines";
}

fn collect_lines(args: &Args, values: &[Value]) -> Result<Vec<Vec<char>>> {
    values
        .iter()
        .map(|value| {
            scalar_text(value)
                .map(|line| line.chars().collect())
                .ok_or_else(|| args.error("every line must be text"))
        })
        .collect()
}

impl Operation for WriteLines {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(args: Args) -> Result<Self> {
        let Some(options) = args.options() else {
            return Ok(Self {
                lines: collect_lines(&args, args.values())?,
                delay: None,
            });
        };

        let lines = match options.get("lines") {
            Some(Value::Sequence(lines)) => collect_lines(&args, lines)?,
            _ => return Err(args.error("option form needs a 'lines' sequence")),
        };
        Ok(Self {
            lines,
            delay: args.option_u64(options, "delay")?,
        })
    }

    fn compile(&self, compiler: &mut Compiler<'_>) -> Result<()> {
        let pause = Duration::from_millis(self.delay.unwrap_or(compiler.timing().column));
        let longest = self.lines.iter().map(Vec::len).max().unwrap_or(0);

        for col in 0..longest {
            for (row, line) in self.lines.iter().enumerate() {
                if let Some(ch) = line.get(col) {
                    let kind = StepKind::WriteRelative {
                        rows: row,
                        cols: col,
                        text: ch.to_string(),
                    };
                    compiler.push(kind, Duration::ZERO);
                }
            }
            compiler.push(StepKind::Pause, pause);
        }
        Ok(())
    }
}
