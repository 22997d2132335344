//! # Typecast
//!
//! A scripted typing director for screencasts.
//!
//! Typecast plays a YAML script of editing operations into a text buffer one
//! keystroke at a time, with human-looking delays between steps. It is useful
//! for recording coding walkthroughs without typos, and for reproducing an
//! editing session exactly.
//!
//! ## Quick start
//!
//! ```no_run
//! use typecast::{Director, DirectorConfig, MemoryTarget, RealTime};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let script = r#"
//! - write: "fn main() "
//! - write_inside: ["{", "\n    println!(\"hi\");\n", "}"]
//! "#;
//!
//!     let mut director = Director::new(DirectorConfig::default());
//!     let mut target = MemoryTarget::new();
//!     director.run_script(script, &mut target, &mut RealTime).await?;
//!     println!("{}", target.text());
//!     Ok(())
//! }
//! ```
//!
//! ## Scripts and blocks
//!
//! A script is a YAML sequence of entries. Every entry names an operation
//! and its arguments, in any of three forms that compile alike:
//!
//! ```yaml
//! - write: hello          # mapping
//! - [write, hello]        # sequence, name first
//! - write: [hello]        # mapping with listed arguments
//! - nl                    # bare name, no arguments
//! ```
//!
//! A source document may hold several scripts. [`split_blocks`] cuts it into
//! [`Block`]s at every `-` that follows a blank line, and
//! [`Director::bind_source`] lets you step through them one run at a time.
//!
//! ## Operations
//!
//! | Operation | Description |
//! |-----------|-------------|
//! | `write: text` | Type text at the cursor, one character per step |
//! | `write_at: [row, col, text]` | Move to a position, growing the buffer if needed, then type |
//! | `write_parallel: [[row, col, text], ...]` | Type several lines in lockstep |
//! | `write_inside: [left, middle, right]` | Type a bracket pair, then fill it |
//! | `write_lines: [line, line, ...]` | Type lines column by column, relative to the cursor |
//! | `insert: text` | Insert text in a single step |
//! | `insert_at: [row, col, text]` | Overwrite at a position in a single step |
//! | `nl` | Type a newline |
//! | `delay: ms` | Pause |
//! | `go: n` / `goto: [row, col]` / `goto_eol` | Move the cursor |
//! | `add_cursor: [row, col]` | Move the cursor (single-cursor hosts) |
//! | `delete` / `clear` | Delete the selection / the whole buffer |
//! | `select_all`, `select_delta: n`, `select_eol` | Select |
//! | `select_next: text` | Select the next literal match |
//! | `select_lines: [first, last]` / `clear_lines` | Select or delete whole lines |
//! | `set_mark`, `goto_mark`, `select_from_mark`, `clear_marks` | Named positions |
//! | `run_command: [name, args]` / `set_syntax: name` | Host editor commands |
//!
//! Most operations take an optional trailing delay in milliseconds.
//!
//! ## Hosts
//!
//! Playback drives any [`Target`]: a [`Buffer`] with a [`Selection`],
//! [`RegionStore`] and [`CommandRunner`]. [`MemoryTarget`] is the in-process
//! implementation used by the CLI.
//!
//! ## Implementing a custom operation
//!
//! Implement [`Operation`] and compile it straight into a [`Compiler`]:
//!
//! ```no_run
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//! use typecast::{Args, Compiler, Operation, Result, StepKind, Timing};
//!
//! #[derive(Debug)]
//! pub struct Shout(String);
//!
//! impl Shout {
//!     pub const NAME: &'static str = "shout";
//! }
//!
//! impl Operation for Shout {
//!     fn name(&self) -> &'static str { Self::NAME }
//!
//!     fn parse(args: Args) -> Result<Self> {
//!         args.arity(1, 1)?;
//!         Ok(Self(args.text(0)?))
//!     }
//!
//!     fn compile(&self, compiler: &mut Compiler<'_>) -> Result<()> {
//!         let range = compiler.timing().keystroke;
//!         compiler.type_text(&self.0.to_uppercase(), range);
//!         compiler.push_step(StepKind::Pause, None);
//!         Ok(())
//!     }
//! }
//!
//! let timing = Timing::default();
//! let mut rng = StdRng::seed_from_u64(1);
//! let mut compiler = Compiler::new(&timing, &mut rng, false);
//! Shout("hey".into()).compile(&mut compiler).unwrap();
//! assert_eq!(compiler.finish().len(), 4);
//! ```

pub mod compiler;
pub mod config;
pub mod director;
pub mod engine;
pub mod error;
pub mod host;
pub mod marks;
pub mod memory;
pub mod operations;
pub mod position;
pub mod script;
pub mod step;

pub use compiler::{Args, Compiler, Operation, operation_names, parse_entry};
pub use config::{DelayRange, DirectorConfig, Timing};
pub use director::Director;
pub use engine::{Engine, Immediate, Pacer, PlaybackReport, PlaybackState, RealTime};
pub use error::{DirectorError, HostError, Result};
pub use host::{Buffer, CommandRunner, Cursor, RegionStore, Selection, Target};
pub use memory::{HostCommand, MemoryTarget};
pub use script::{Block, decode_entry, parse_script, split_blocks, unquote};
pub use step::{Step, StepKind};
