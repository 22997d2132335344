//! The [`Director`] session: binds a source of script blocks and plays them
//! into a target.

use crate::compiler::Compiler;
use crate::config::DirectorConfig;
use crate::engine::{Engine, Pacer, PlaybackReport};
use crate::error::{DirectorError, Result};
use crate::host::Target;
use crate::script::{Block, parse_script, split_blocks};
use crate::step::Step;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

/// One playback session.
///
/// Holds the bound source blocks, the index of the block to play next, and
/// the engine whose mark table carries over from one run to the next.
#[derive(Debug)]
pub struct Director {
    config: DirectorConfig,
    rng: StdRng,
    engine: Engine,
    blocks: Vec<Block>,
    index: usize,
}

impl Default for Director {
    fn default() -> Self {
        Self::new(DirectorConfig::default())
    }
}

impl Director {
    pub fn new(config: DirectorConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            rng,
            engine: Engine::new(),
            blocks: Vec::new(),
            index: 0,
        }
    }

    pub fn config(&self) -> &DirectorConfig {
        &self.config
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    /// Split `source` into blocks and select the first one.
    ///
    /// # Errors
    ///
    /// [`DirectorError::EmptySource`] if the source holds no block.
    pub fn bind_source(&mut self, source: &str) -> Result<usize> {
        let blocks = split_blocks(source);
        if blocks.is_empty() {
            return Err(DirectorError::EmptySource);
        }
        info!(blocks = blocks.len(), "bound source");
        self.blocks = blocks;
        self.index = 0;
        Ok(self.blocks.len())
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&Block> {
        self.blocks.get(self.index)
    }

    /// Select block `index`. Returns `false` and keeps the current block if
    /// there is no such block.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.blocks.len() {
            self.index = index;
            true
        } else {
            false
        }
    }

    /// Move to the next block, wrapping to the first.
    pub fn next(&mut self) -> usize {
        if !self.blocks.is_empty() {
            self.index = (self.index + 1) % self.blocks.len();
        }
        self.index
    }

    /// Move to the previous block, wrapping to the last.
    pub fn previous(&mut self) -> usize {
        if !self.blocks.is_empty() {
            self.index = self.index.checked_sub(1).unwrap_or(self.blocks.len() - 1);
        }
        self.index
    }

    /// Compile a script into steps without playing it.
    ///
    /// # Errors
    ///
    /// Malformed YAML, unknown operations and compile errors. Nothing is
    /// queued when compilation fails.
    pub fn compile(&mut self, script: &str) -> Result<Vec<Step>> {
        let entries = parse_script(script)?;
        let marks_known = !self.engine.marks().is_empty();
        let mut compiler = Compiler::new(&self.config.timing, &mut self.rng, marks_known);
        compiler.compile_all(&entries)?;
        Ok(compiler.finish())
    }

    /// Compile `script` and play it into `target`.
    ///
    /// The whole script is compiled before the engine's queue is touched, so
    /// a failing script never interleaves with, or cancels, a previous one.
    ///
    /// # Errors
    ///
    /// Compile errors (before anything is played) and host failures (which
    /// abort the rest of the run).
    pub async fn run_script<T, P>(&mut self, script: &str, target: &mut T, pacer: &mut P) -> Result<PlaybackReport>
    where
        T: Target + ?Sized,
        P: Pacer + ?Sized,
    {
        let steps = self.compile(script)?;
        self.play(steps, target, pacer).await
    }

    /// Play the current block, then move to the next one.
    ///
    /// # Errors
    ///
    /// [`DirectorError::EmptySource`] if no source is bound, otherwise as
    /// [`run_script`](Self::run_script). The index only moves on success.
    pub async fn run_current<T, P>(&mut self, target: &mut T, pacer: &mut P) -> Result<PlaybackReport>
    where
        T: Target + ?Sized,
        P: Pacer + ?Sized,
    {
        let script = self.current().ok_or(DirectorError::EmptySource)?.text.clone();
        info!(block = self.index, "running block");
        let report = self.run_script(&script, target, pacer).await?;
        self.next();
        Ok(report)
    }

    /// Type `text` literally into `target` at paste speed.
    ///
    /// # Errors
    ///
    /// Host failures during playback.
    pub async fn paste<T, P>(&mut self, text: &str, target: &mut T, pacer: &mut P) -> Result<PlaybackReport>
    where
        T: Target + ?Sized,
        P: Pacer + ?Sized,
    {
        let range = self.config.timing.paste;
        let mut compiler = Compiler::new(&self.config.timing, &mut self.rng, false);
        compiler.type_text(text, range);
        let steps = compiler.finish();
        self.play(steps, target, pacer).await
    }

    async fn play<T, P>(&mut self, steps: Vec<Step>, target: &mut T, pacer: &mut P) -> Result<PlaybackReport>
    where
        T: Target + ?Sized,
        P: Pacer + ?Sized,
    {
        info!(steps = steps.len(), "starting playback");
        self.engine.load(steps);
        let report = self.engine.play(target, pacer).await?;
        info!(steps = report.steps, paused_ms = report.paused.as_millis() as u64, "playback finished");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Timing;
    use crate::engine::Immediate;
    use crate::host::Cursor;
    use crate::memory::MemoryTarget;

    fn director() -> Director {
        Director::new(DirectorConfig {
            timing: Timing::default(),
            seed: Some(11),
        })
    }

    #[test]
    fn test_block_navigation_wraps() {
        let mut director = director();
        assert_eq!(director.bind_source("- nl\n\n- delay\n\n- go: 1\n").unwrap(), 3);
        assert_eq!(director.index(), 0);
        assert_eq!(director.previous(), 2);
        assert_eq!(director.next(), 0);
        assert_eq!(director.next(), 1);
        assert_eq!(director.current().unwrap().text, "- delay");
        assert!(!director.select(3));
        assert!(director.select(2));
    }

    #[test]
    fn test_bind_empty_source() {
        assert!(matches!(
            director().bind_source("nothing here"),
            Err(DirectorError::EmptySource)
        ));
    }

    #[test]
    fn test_seeded_sessions_compile_identically() {
        let script = "- write: hello world\n- nl\n";
        assert_eq!(director().compile(script).unwrap(), director().compile(script).unwrap());
    }

    #[tokio::test]
    async fn test_run_current_advances() {
        let mut director = director();
        director.bind_source("- write: a\n\n- write: b\n").unwrap();
        let mut target = MemoryTarget::new();

        director.run_current(&mut target, &mut Immediate).await.unwrap();
        director.run_current(&mut target, &mut Immediate).await.unwrap();
        assert_eq!(target.text(), "ab");
        assert_eq!(director.index(), 0);
    }

    #[tokio::test]
    async fn test_failed_compile_keeps_index_and_buffer() {
        let mut director = director();
        director.bind_source("- write: a\n- bogus\n").unwrap();
        let mut target = MemoryTarget::new();
        assert!(director.run_current(&mut target, &mut Immediate).await.is_err());
        assert_eq!(target.text(), "");
        assert_eq!(director.index(), 0);
    }

    #[tokio::test]
    async fn test_marks_outlive_a_run() {
        let mut director = director();
        let mut target = MemoryTarget::new();
        director
            .run_script("- write: abc\n- go: -1\n- set_mark: m", &mut target, &mut Immediate)
            .await
            .unwrap();
        let steps = director.compile("- select_from_mark: m").unwrap();
        assert_eq!(steps.len(), 1);

        director
            .run_script("- go: 1\n- select_from_mark: m\n- delete", &mut target, &mut Immediate)
            .await
            .unwrap();
        assert_eq!(target.text(), "ab");
    }

    async fn play(script: &str, text: &str) -> (String, Cursor) {
        let mut director = director();
        let mut target = MemoryTarget::with_text(text);
        let report = director.run_script(script, &mut target, &mut Immediate).await.unwrap();
        (target.text(), report.cursor)
    }

    #[tokio::test]
    async fn test_write_types_one_step_per_character() {
        let mut director = director();
        assert_eq!(director.compile("- write: ab").unwrap().len(), 2);
        assert_eq!(play("- write: ab", "").await, ("ab".to_string(), Cursor::point(2)));
    }

    #[tokio::test]
    async fn test_write_inside_keeps_cursor_inside() {
        assert_eq!(play("- write_inside: \"()\"", "").await, ("()".to_string(), Cursor::point(1)));
        assert_eq!(
            play("- write_inside: [\"[\", x, \"]\"]\n- write: y", "").await,
            ("[xy]".to_string(), Cursor::point(3))
        );
    }

    #[tokio::test]
    async fn test_mark_survives_edits_above_it() {
        let script = "\
- write_at: [1, 2, x]
- set_mark: m
- goto: [0, 0]
- write: \"head \"
- goto_mark: m
- write: \"!\"
";
        let (text, _) = play(script, "one\ntwo").await;
        assert_eq!(text, "head one\ntwx!o");
    }

    #[tokio::test]
    async fn test_line_start_marks_stay_before_typed_text() {
        let script = "- set_mark: m\n- write: abc\n- goto_mark: m\n- write: \"|\"";
        assert_eq!(play(script, "").await, ("|abc".to_string(), Cursor::point(1)));

        let script = format!("- goto: [1, 0]\n{script}");
        assert_eq!(play(&script, "x\n").await, ("x\n|abc".to_string(), Cursor::point(3)));
    }

    #[tokio::test]
    async fn test_clear_then_mark_returns_to_start() {
        let script = "- clear\n- set_mark\n- write: body\n- goto_mark\n- write: \"> \"";
        assert_eq!(play(script, "old").await, ("> body".to_string(), Cursor::point(2)));
    }

    #[tokio::test]
    async fn test_write_lines_grows_below_the_cursor() {
        let (text, cursor) = play("- go: 1\n- write_lines: [ab, c]", "xyz").await;
        assert_eq!(text, "xab\n c");
        assert_eq!(cursor, Cursor::point(1));
    }

    #[tokio::test]
    async fn test_write_parallel_creates_missing_rows() {
        let (text, cursor) = play("- write_parallel: [[0, 0, ab], [1, 2, c]]", "").await;
        assert_eq!(text, "ab\n  c");
        assert_eq!(cursor, Cursor::point(2));
    }

    #[tokio::test]
    async fn test_insert_at_overwrites() {
        let (text, cursor) = play("- insert_at: [0, 6, there]", "hello world").await;
        assert_eq!(text, "hello there");
        assert_eq!(cursor, Cursor::point(11));
    }

    #[tokio::test]
    async fn test_goto_eol() {
        let (text, cursor) = play("- goto: [1, 1]\n- goto_eol\n- write: \"!\"", "abc\ndef\nghi").await;
        assert_eq!(text, "abc\ndef!\nghi");
        assert_eq!(cursor, Cursor::point(8));
    }

    #[tokio::test]
    async fn test_clear_empties_the_buffer() {
        let (text, cursor) = play("- set_mark\n- clear\n- write: z", "old\ntext").await;
        assert_eq!(text, "z");
        assert_eq!(cursor, Cursor::point(1));
    }

    #[tokio::test]
    async fn test_select_lines_out_of_range_is_a_no_op() {
        let (text, _) = play("- select_lines: [10, 10]\n- write: \"-\"", "a\nb\nc").await;
        assert_eq!(text, "-a\nb\nc");
    }

    #[tokio::test]
    async fn test_paste_types_every_character() {
        let mut director = director();
        let mut target = MemoryTarget::new();
        let report = director.paste("fn main() {}", &mut target, &mut Immediate).await.unwrap();
        assert_eq!(report.steps, 12);
        assert_eq!(report.cursor, Cursor::point(12));
        assert_eq!(target.text(), "fn main() {}");
    }
}
