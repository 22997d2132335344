//! Typing operations: [`Write`], [`WriteAt`], [`WriteParallel`], [`Insert`]
//! and [`InsertAt`].
//!
//! Script syntax:
//! - `write: "text"` or `write: [line one, line two]`
//! - `write: {write: "text", delay_min: 10, delay_max: 20}`
//! - `write_at: [row, col, "text"]`
//! - `write_parallel: [[row, col, "text"], [row, col, "text"]]`
//! - `insert: ["text", delay]`
//! - `insert_at: [row, col, "text"]`

use crate::compiler::{Args, Compiler, Operation};
use crate::config::DelayRange;
use crate::error::Result;
use crate::script::{scalar_text, unquote};
use crate::step::StepKind;
use serde_yaml::Value;
use std::time::Duration;

/// Types text one character at a time with human-like pauses.
///
/// With more than one item every text item is typed as a line and gets a
/// trailing newline unless it already ends in one. Items that are sequences
/// or mappings are compiled as nested entries, so a `write` can embed other
/// operations. A text item wrapped in double quotes is unescaped first.
#[derive(Debug)]
pub struct Write {
    pub items: Vec<Value>,
    pub delay_min: Option<u64>,
    pub delay_max: Option<u64>,
}

impl Write {
    pub const NAME: &'static str = "write";

    pub fn new(text: impl Into<String>) -> Self {
        Self {
            items: vec![Value::String(text.into())],
            delay_min: None,
            delay_max: None,
        }
    }
}

impl Operation for Write {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(args: Args) -> Result<Self> {
        let Some(options) = args.options() else {
            return Ok(Self {
                items: args.values().to_vec(),
                delay_min: None,
                delay_max: None,
            });
        };

        let items = match options.get("write") {
            Some(Value::Sequence(items)) => items.clone(),
            Some(item) => vec![item.clone()],
            None => return Err(args.error("option form needs a 'write' key")),
        };
        Ok(Self {
            items,
            delay_min: args.option_u64(options, "delay_min")?,
            delay_max: args.option_u64(options, "delay_max")?,
        })
    }

    fn compile(&self, compiler: &mut Compiler<'_>) -> Result<()> {
        let defaults = compiler.timing().keystroke;
        let range = DelayRange::new(
            self.delay_min.unwrap_or(defaults.min),
            self.delay_max.unwrap_or(defaults.max),
        );
        let as_lines = self.items.len() > 1;

        for item in &self.items {
            let Some(mut text) = scalar_text(item) else {
                compiler.execute(item)?;
                continue;
            };
            if as_lines && !text.ends_with('\n') {
                text.push('\n');
            }
            compiler.type_text(&unquote(&text), range);
        }
        Ok(())
    }
}

/// Moves to `(row, col)`, growing the buffer if needed, then types `text`.
#[derive(Debug)]
pub struct WriteAt {
    pub row: usize,
    pub col: usize,
    pub text: String,
}

impl WriteAt {
    pub const NAME: &'static str = "write_at";
}

impl Operation for WriteAt {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(args: Args) -> Result<Self> {
        args.arity(3, 3)?;
        Ok(Self {
            row: args.index(0)?,
            col: args.index(1)?,
            text: args.text(2)?,
        })
    }

    fn compile(&self, compiler: &mut Compiler<'_>) -> Result<()> {
        compiler.push(goto(self.row, self.col), Duration::ZERO);
        Write::new(self.text.clone()).compile(compiler)
    }
}

/// Types several `(row, col, text)` lines at once, one column at a time.
#[derive(Debug)]
pub struct WriteParallel {
    pub lines: Vec<(usize, usize, Vec<char>)>,
}

impl WriteParallel {
    pub const NAME: &'static str = "write_parallel";
}

impl Operation for WriteParallel {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(args: Args) -> Result<Self> {
        args.arity(1, usize::MAX)?;
        let lines = args
            .values()
            .iter()
            .map(|value| {
                let triple = match value {
                    Value::Sequence(items) if items.len() == 3 => items.clone(),
                    _ => return Err(args.error("each line must be [row, col, text]")),
                };
                let line = Args::new(Self::NAME, triple);
                Ok((line.index(0)?, line.index(1)?, line.text(2)?.chars().collect()))
            })
            .collect::<Result<_>>()?;
        Ok(Self { lines })
    }

    fn compile(&self, compiler: &mut Compiler<'_>) -> Result<()> {
        let range = compiler.timing().parallel;
        let longest = self.lines.iter().map(|(_, _, text)| text.len()).max().unwrap_or(0);
        for offset in 0..longest {
            for (row, col, text) in &self.lines {
                let Some(ch) = text.get(offset) else {
                    continue;
                };
                compiler.push(goto(*row, col + offset), Duration::ZERO);
                compiler.type_text(&ch.to_string(), range);
            }
        }
        Ok(())
    }
}

/// Inserts `text` in one step, without per-character pacing.
#[derive(Debug)]
pub struct Insert {
    pub text: String,
    pub delay: Option<Duration>,
}

impl Insert {
    pub const NAME: &'static str = "insert";
}

impl Operation for Insert {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(args: Args) -> Result<Self> {
        args.arity(1, 2)?;
        Ok(Self {
            text: args.text(0)?,
            delay: args.delay(1)?,
        })
    }

    fn compile(&self, compiler: &mut Compiler<'_>) -> Result<()> {
        let kind = StepKind::Replace {
            text: self.text.clone(),
            advance: self.text.chars().count(),
        };
        compiler.push_step(kind, self.delay);
        Ok(())
    }
}

/// Overwrites at `(row, col)` in a single immediate step.
#[derive(Debug)]
pub struct InsertAt {
    pub row: usize,
    pub col: usize,
    pub text: String,
}

impl InsertAt {
    pub const NAME: &'static str = "insert_at";
}

impl Operation for InsertAt {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(args: Args) -> Result<Self> {
        args.arity(3, 3)?;
        Ok(Self {
            row: args.index(0)?,
            col: args.index(1)?,
            text: args.text(2)?,
        })
    }

    fn compile(&self, compiler: &mut Compiler<'_>) -> Result<()> {
        let kind = StepKind::WriteAt {
            row: self.row,
            col: self.col,
            text: self.text.clone(),
        };
        compiler.push(kind, Duration::ZERO);
        Ok(())
    }
}

/// A zero-text write that only moves the cursor.
pub(crate) fn goto(row: usize, col: usize) -> StepKind {
    StepKind::WriteAt {
        row,
        col,
        text: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use crate::compiler::tests::{compile, kinds};
    use crate::step::StepKind;
    use std::time::Duration;

    fn typed(text: &str) -> StepKind {
        StepKind::Replace {
            text: text.to_string(),
            advance: 1,
        }
    }

    #[test]
    fn test_write_one_step_per_character() {
        let steps = compile("- write: ab").unwrap();
        assert_eq!(kinds(&steps), vec![typed("a"), typed("b")]);
        for step in &steps {
            assert!((40..70).contains(&step.delay.as_millis()));
        }
    }

    #[test]
    fn test_three_entry_shapes_compile_alike() {
        let keyed = compile("- write: hi").unwrap();
        let positional = compile("- [write, hi]").unwrap();
        let listed = compile("- write: [hi]").unwrap();
        assert_eq!(keyed, positional);
        assert_eq!(keyed, listed);
    }

    #[test]
    fn test_write_lines_get_newlines() {
        let steps = compile("- write: [ab, \"c\\n\"]").unwrap();
        let text: String = kinds(&steps)
            .into_iter()
            .map(|kind| match kind {
                StepKind::Replace { text, .. } => text,
                other => panic!("unexpected step {other:?}"),
            })
            .collect();
        assert_eq!(text, "ab\nc\n");
    }

    #[test]
    fn test_write_unquotes_literals() {
        let steps = compile(r#"- write: '"a\tb"'"#).unwrap();
        assert_eq!(kinds(&steps), vec![typed("a"), typed("\t"), typed("b")]);
    }

    #[test]
    fn test_write_embeds_entries() {
        let steps = compile("- write: [a, [nl, 5], b]").unwrap();
        assert_eq!(steps.len(), 5);
        assert_eq!(
            steps[2].kind,
            StepKind::Replace {
                text: "\n".into(),
                advance: 1
            }
        );
        assert_eq!(steps[2].delay, Duration::from_millis(5));
    }

    #[test]
    fn test_write_option_form() {
        let steps = compile("- write: {write: xyz, delay_min: 7, delay_max: 7}").unwrap();
        assert_eq!(steps.len(), 3);
        assert!(steps.iter().all(|step| step.delay == Duration::from_millis(7)));
    }

    #[test]
    fn test_write_option_form_needs_text() {
        assert!(compile("- write: {delay_min: 7}").is_err());
    }

    #[test]
    fn test_write_at_positions_first() {
        let steps = compile("- write_at: [2, 4, ok]").unwrap();
        assert_eq!(
            steps[0].kind,
            StepKind::WriteAt {
                row: 2,
                col: 4,
                text: String::new()
            }
        );
        assert_eq!(steps[0].delay, Duration::ZERO);
        assert_eq!(steps.len(), 3);
    }

    #[test]
    fn test_write_parallel_interleaves() {
        let steps = compile("- write_parallel: [[0, 0, ab], [1, 2, c]]").unwrap();
        let expected = vec![
            StepKind::WriteAt { row: 0, col: 0, text: String::new() },
            typed("a"),
            StepKind::WriteAt { row: 1, col: 2, text: String::new() },
            typed("c"),
            StepKind::WriteAt { row: 0, col: 1, text: String::new() },
            typed("b"),
        ];
        assert_eq!(kinds(&steps), expected);
        assert!((20..40).contains(&steps[1].delay.as_millis()));
    }

    #[test]
    fn test_insert_is_one_step() {
        let steps = compile("- insert: [hello, 15]").unwrap();
        assert_eq!(
            kinds(&steps),
            vec![StepKind::Replace {
                text: "hello".into(),
                advance: 5
            }]
        );
        assert_eq!(steps[0].delay, Duration::from_millis(15));
    }
}
