//! The [`Operation`] trait, its arguments, and the [`Compiler`] that turns
//! decoded entries into queued [`Step`]s.

use crate::config::{DelayRange, Timing};
use crate::error::{DirectorError, Result};
use crate::operations::{
    AddCursor, Clear, ClearLines, ClearMarks, Delay, Delete, Go, Goto, GotoEol, GotoMark, Insert,
    InsertAt, Nl, RunCommand, SelectAll, SelectDelta, SelectEol, SelectFromMark, SelectLines,
    SelectNext, SetMark, SetSyntax, Write, WriteAt, WriteInside, WriteLines, WriteParallel,
};
use crate::script::{decode_entry, scalar_text};
use crate::step::{Step, StepKind};
use rand::rngs::StdRng;
use serde_yaml::{Mapping, Value};
use std::time::Duration;
use tracing::debug;

/// Positional arguments of one decoded entry.
#[derive(Debug, Clone)]
pub struct Args {
    operation: &'static str,
    values: Vec<Value>,
}

impl Args {
    pub fn new(operation: &'static str, values: Vec<Value>) -> Self {
        Self { operation, values }
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// A compile error attributed to this operation.
    pub fn error(&self, message: impl Into<String>) -> DirectorError {
        DirectorError::compile(self.operation, message)
    }

    /// Fail unless there are between `min` and `max` arguments.
    pub fn arity(&self, min: usize, max: usize) -> Result<()> {
        let got = self.values.len();
        if got < min || got > max {
            let expected = match (min, max) {
                (min, max) if min == max => format!("{min}"),
                (min, usize::MAX) => format!("at least {min}"),
                (min, max) => format!("{min} to {max}"),
            };
            return Err(self.error(format!("expected {expected} argument(s), got {got}")));
        }
        Ok(())
    }

    /// Argument `index`, treating null as absent.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index).filter(|value| !value.is_null())
    }

    pub fn text(&self, index: usize) -> Result<String> {
        self.opt_text(index)?
            .ok_or_else(|| self.error(format!("argument {} must be text", index + 1)))
    }

    pub fn opt_text(&self, index: usize) -> Result<Option<String>> {
        match self.get(index) {
            None => Ok(None),
            Some(value) => scalar_text(value)
                .map(Some)
                .ok_or_else(|| self.error(format!("argument {} must be text", index + 1))),
        }
    }

    pub fn int(&self, index: usize) -> Result<i64> {
        self.opt_int(index)?
            .ok_or_else(|| self.error(format!("argument {} must be an integer", index + 1)))
    }

    pub fn opt_int(&self, index: usize) -> Result<Option<i64>> {
        match self.get(index) {
            None => Ok(None),
            Some(value) => value
                .as_i64()
                .map(Some)
                .ok_or_else(|| self.error(format!("argument {} must be an integer", index + 1))),
        }
    }

    /// A non-negative integer such as a row or column.
    pub fn index(&self, index: usize) -> Result<usize> {
        usize::try_from(self.int(index)?)
            .map_err(|_| self.error(format!("argument {} must not be negative", index + 1)))
    }

    /// An optional delay in milliseconds.
    pub fn delay(&self, index: usize) -> Result<Option<Duration>> {
        match self.opt_int(index)? {
            None => Ok(None),
            Some(ms) => u64::try_from(ms)
                .map(|ms| Some(Duration::from_millis(ms)))
                .map_err(|_| self.error(format!("delay must not be negative, got {ms}"))),
        }
    }

    /// The single mapping argument of the option-mapping call form.
    pub fn options(&self) -> Option<&Mapping> {
        match self.values.as_slice() {
            [Value::Mapping(map)] => Some(map),
            _ => None,
        }
    }

    /// An unsigned integer option from [`options`](Self::options).
    pub fn option_u64(&self, map: &Mapping, key: &str) -> Result<Option<u64>> {
        match map.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value
                .as_u64()
                .map(Some)
                .ok_or_else(|| self.error(format!("option '{key}' must be a non-negative integer"))),
        }
    }
}

/// A named script operation.
///
/// Implement this trait to add an operation. Then:
///
/// 1. Define `pub const NAME: &'static str` on the struct; it is the key
///    scripts use (e.g. `"write"`).
/// 2. Re-export the struct from `src/operations/mod.rs`.
/// 3. Add `(MyOp::NAME, MyOp::parse_boxed)` to the `REGISTRY` below.
pub trait Operation: std::fmt::Debug + 'static {
    /// The operation name, accessible through a trait object.
    fn name(&self) -> &'static str;

    /// Build the operation from its decoded arguments.
    fn parse(args: Args) -> Result<Self>
    where
        Self: Sized;

    /// Parse and box. This is the function-pointer type stored in the
    /// registry.
    fn parse_boxed(args: Args) -> Result<Box<dyn Operation>>
    where
        Self: Sized,
    {
        Ok(Box::new(Self::parse(args)?))
    }

    /// Append this operation's steps to the compiler's queue.
    ///
    /// Nothing touches the buffer here; that only happens at playback.
    fn compile(&self, compiler: &mut Compiler<'_>) -> Result<()>;
}

type ParseFn = fn(Args) -> Result<Box<dyn Operation>>;

static REGISTRY: &[(&str, ParseFn)] = &[
    (Write::NAME, Write::parse_boxed),
    (WriteAt::NAME, WriteAt::parse_boxed),
    (WriteParallel::NAME, WriteParallel::parse_boxed),
    (WriteInside::NAME, WriteInside::parse_boxed),
    (WriteLines::NAME, WriteLines::parse_boxed),
    (Insert::NAME, Insert::parse_boxed),
    (InsertAt::NAME, InsertAt::parse_boxed),
    (Nl::NAME, Nl::parse_boxed),
    (Delay::NAME, Delay::parse_boxed),
    (Go::NAME, Go::parse_boxed),
    (Goto::NAME, Goto::parse_boxed),
    (AddCursor::NAME, AddCursor::parse_boxed),
    (GotoEol::NAME, GotoEol::parse_boxed),
    (Delete::NAME, Delete::parse_boxed),
    (Clear::NAME, Clear::parse_boxed),
    (SelectAll::NAME, SelectAll::parse_boxed),
    (SelectDelta::NAME, SelectDelta::parse_boxed),
    (SelectEol::NAME, SelectEol::parse_boxed),
    (SelectNext::NAME, SelectNext::parse_boxed),
    (SelectLines::NAME, SelectLines::parse_boxed),
    (ClearLines::NAME, ClearLines::parse_boxed),
    (SetMark::NAME, SetMark::parse_boxed),
    (GotoMark::NAME, GotoMark::parse_boxed),
    (SelectFromMark::NAME, SelectFromMark::parse_boxed),
    (ClearMarks::NAME, ClearMarks::parse_boxed),
    (RunCommand::NAME, RunCommand::parse_boxed),
    (SetSyntax::NAME, SetSyntax::parse_boxed),
];

/// Names of every registered operation, in registry order.
pub fn operation_names() -> impl Iterator<Item = &'static str> {
    REGISTRY.iter().map(|(name, _)| *name)
}

/// Parse one entry into its operation without compiling it.
///
/// # Errors
///
/// [`DirectorError::UnknownOperation`] if the name is not registered, or a
/// compile error if the arguments do not fit the operation.
pub fn parse_entry(entry: &Value) -> Result<Box<dyn Operation>> {
    let (name, values) = decode_entry(entry)?;
    let (name, parse) = REGISTRY
        .iter()
        .find(|(registered, _)| *registered == name)
        .ok_or_else(|| DirectorError::UnknownOperation(name.clone()))?;
    parse(Args::new(name, values))
}

/// Accumulates the steps of one compile pass.
pub struct Compiler<'a> {
    steps: Vec<Step>,
    timing: &'a Timing,
    rng: &'a mut StdRng,
    marks_known: bool,
}

impl<'a> Compiler<'a> {
    /// Start a pass. `marks_known` tells whether the mark table already
    /// holds marks from earlier runs.
    pub fn new(timing: &'a Timing, rng: &'a mut StdRng, marks_known: bool) -> Self {
        Self {
            steps: Vec::new(),
            timing,
            rng,
            marks_known,
        }
    }

    pub fn timing(&self) -> &Timing {
        self.timing
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut *self.rng
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn finish(self) -> Vec<Step> {
        self.steps
    }

    /// Whether a mark may exist by the time the next step runs.
    pub fn marks_known(&self) -> bool {
        self.marks_known
    }

    pub(crate) fn note_mark(&mut self) {
        self.marks_known = true;
    }

    /// Queue a step with an exact delay.
    pub fn push(&mut self, kind: StepKind, delay: Duration) {
        self.steps.push(Step::new(kind, delay));
    }

    /// Queue a step, drawing the delay from the default step range when
    /// none is given.
    pub fn push_step(&mut self, kind: StepKind, delay: Option<Duration>) {
        let delay = delay.unwrap_or_else(|| self.timing.step.sample(&mut *self.rng));
        self.push(kind, delay);
    }

    /// Queue one keystroke per character of `text`.
    ///
    /// A character repeating the previous one uses the range minimum, as do
    /// all characters when the range is fixed.
    pub fn type_text(&mut self, text: &str, range: DelayRange) {
        let mut previous = None;
        for ch in text.chars() {
            let delay = if previous == Some(ch) {
                Duration::from_millis(range.min)
            } else {
                range.sample(&mut *self.rng)
            };
            self.push(
                StepKind::Replace {
                    text: ch.to_string(),
                    advance: 1,
                },
                delay,
            );
            previous = Some(ch);
        }
    }

    /// Decode, parse and compile one entry.
    ///
    /// # Errors
    ///
    /// Propagates unknown operations and compile errors; steps queued by
    /// earlier entries stay queued.
    pub fn execute(&mut self, entry: &Value) -> Result<()> {
        let operation = parse_entry(entry)?;
        let before = self.steps.len();
        operation.compile(self)?;
        debug!(
            operation = operation.name(),
            steps = self.steps.len() - before,
            "compiled entry"
        );
        Ok(())
    }

    /// Compile every entry in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub fn compile_all(&mut self, entries: &[Value]) -> Result<()> {
        for entry in entries {
            self.execute(entry)?;
        }
        Ok(())
    }
}
