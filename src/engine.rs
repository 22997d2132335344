//! The playback engine: drains compiled steps into a target, one at a time.

use crate::error::Result;
use crate::host::{Cursor, RegionStore, Selection, Target};
use crate::marks::MarkTable;
use crate::step::Step;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Region holding the playback cursor between steps.
///
/// Kept apart from the live selection so the user's own selection is never
/// fought over during playback.
pub const CURSOR_REGION: &str = "typecast.cursor";

/// Waits out the delay between two steps.
#[async_trait(?Send)]
pub trait Pacer {
    async fn pause(&mut self, delay: Duration);
}

/// Sleeps for each delay on the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealTime;

#[async_trait(?Send)]
impl Pacer for RealTime {
    async fn pause(&mut self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

/// Ignores delays; plays as fast as possible.
#[derive(Debug, Default, Clone, Copy)]
pub struct Immediate;

#[async_trait(?Send)]
impl Pacer for Immediate {
    async fn pause(&mut self, _delay: Duration) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Running,
}

/// Summary of one finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaybackReport {
    pub steps: usize,
    /// Total delay waited between steps.
    pub paused: Duration,
    pub cursor: Cursor,
}

type FrameHandler = Box<dyn FnMut(&str, Cursor)>;

/// Owns the step queue and the mark table of a session.
///
/// Exactly one step is in flight at a time: each step sees the buffer the
/// previous one left behind, and delays only change pacing, never order.
pub struct Engine {
    queue: VecDeque<Step>,
    state: PlaybackState,
    marks: MarkTable,
    frame_handler: Option<FrameHandler>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("pending", &self.queue.len())
            .field("state", &self.state)
            .field("marks", &self.marks)
            .finish()
    }
}

impl Engine {
    pub fn new() -> Self {
        Engine {
            queue: VecDeque::new(),
            state: PlaybackState::Idle,
            marks: MarkTable::new(),
            frame_handler: None,
        }
    }

    /// Call `handler` with the whole buffer and the new cursor after every
    /// step.
    pub fn set_frame_handler(&mut self, handler: impl FnMut(&str, Cursor) + 'static) {
        self.frame_handler = Some(Box::new(handler));
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn marks(&self) -> &MarkTable {
        &self.marks
    }

    /// Replace the queue with `steps`, discarding whatever was still pending.
    pub fn load(&mut self, steps: Vec<Step>) {
        if !self.queue.is_empty() {
            warn!(discarded = self.queue.len(), "discarding unfinished playback");
        }
        self.queue = steps.into();
        self.state = PlaybackState::Idle;
    }

    /// Seed the playback cursor from the target's current selection.
    pub fn start<T: Target + ?Sized>(&mut self, target: &mut T) {
        let cursor = target.selections().first().copied().unwrap_or_default();
        target.tag(CURSOR_REGION, vec![cursor.anchor..cursor.head]);
        if !self.queue.is_empty() {
            self.state = PlaybackState::Running;
        }
    }

    /// The playback cursor as it currently sits in the target.
    pub fn cursor<T: RegionStore + ?Sized>(&self, target: &T) -> Cursor {
        target
            .get(CURSOR_REGION)
            .first()
            .map(|range| Cursor::new(range.start, range.end))
            .unwrap_or_default()
    }

    /// Run the head step.
    ///
    /// Returns the delay to wait before the next step, or `None` once the
    /// queue is drained and the engine is idle again.
    ///
    /// # Errors
    ///
    /// A host failure aborts the run: the rest of the queue is dropped and
    /// the error returned.
    pub fn tick<T: Target + ?Sized>(&mut self, target: &mut T) -> Result<Option<Duration>> {
        let Some(step) = self.queue.pop_front() else {
            self.state = PlaybackState::Idle;
            return Ok(None);
        };

        let cursor = self.cursor(target);
        target.remove_selection(cursor);
        let outcome = match step.apply(target, &mut self.marks, cursor) {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(error = %err, dropped = self.queue.len(), "aborting playback");
                self.queue.clear();
                self.state = PlaybackState::Idle;
                return Err(err);
            }
        };

        let next = outcome.into_cursor(cursor);
        target.add_selection(next);
        target.tag(CURSOR_REGION, vec![next.anchor..next.head]);
        debug!(kind = ?step.kind, delay_ms = step.delay.as_millis() as u64, ?next, "step");

        if let Some(handler) = self.frame_handler.as_mut() {
            handler(&target.read(0..target.size()), next);
        }

        if self.queue.is_empty() {
            self.state = PlaybackState::Idle;
            Ok(None)
        } else {
            Ok(Some(step.delay))
        }
    }

    /// Drain the queue into `target`, pausing through `pacer` between steps.
    ///
    /// # Errors
    ///
    /// See [`tick`](Self::tick).
    pub async fn play<T, P>(&mut self, target: &mut T, pacer: &mut P) -> Result<PlaybackReport>
    where
        T: Target + ?Sized,
        P: Pacer + ?Sized,
    {
        let steps = self.queue.len();
        let mut paused = Duration::ZERO;
        self.start(target);
        while let Some(delay) = self.tick(target)? {
            pacer.pause(delay).await;
            paused += delay;
        }
        Ok(PlaybackReport {
            steps,
            paused,
            cursor: self.cursor(target),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Buffer;
    use crate::memory::MemoryTarget;
    use crate::step::StepKind;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn typed(text: &str, ms: u64) -> Step {
        Step::new(
            StepKind::Replace {
                text: text.to_string(),
                advance: text.chars().count(),
            },
            Duration::from_millis(ms),
        )
    }

    #[derive(Default)]
    struct Recorder(Vec<Duration>);

    #[async_trait(?Send)]
    impl Pacer for Recorder {
        async fn pause(&mut self, delay: Duration) {
            self.0.push(delay);
        }
    }

    #[tokio::test]
    async fn test_play_applies_steps_in_order() {
        let mut engine = Engine::new();
        let mut target = MemoryTarget::new();
        engine.load(vec![typed("a", 10), typed("b", 20), typed("c", 30)]);

        let mut recorder = Recorder::default();
        let report = engine.play(&mut target, &mut recorder).await.unwrap();

        assert_eq!(target.text(), "abc");
        assert_eq!(report.steps, 3);
        assert_eq!(report.cursor, Cursor::point(3));
        assert_eq!(
            recorder.0,
            vec![Duration::from_millis(10), Duration::from_millis(20)]
        );
        assert_eq!(engine.state(), PlaybackState::Idle);
    }

    #[tokio::test]
    async fn test_delays_never_change_the_outcome() {
        let build = |ms: [u64; 4]| {
            vec![
                typed("hello", ms[0]),
                Step::new(StepKind::Go(-3), Duration::from_millis(ms[1])),
                Step::new(StepKind::SelectDelta(1), Duration::from_millis(ms[2])),
                typed("ipp", ms[3]),
            ]
        };

        let mut results = Vec::new();
        for delays in [[0, 0, 0, 0], [500, 1, 90, 3], [7, 300, 0, 42]] {
            let mut engine = Engine::new();
            let mut target = MemoryTarget::new();
            engine.load(build(delays));
            engine.play(&mut target, &mut Immediate).await.unwrap();
            results.push((target.text(), engine.cursor(&target)));
        }
        assert_eq!(results[0], ("heipplo".to_string(), Cursor::point(5)));
        assert!(results.iter().all(|result| *result == results[0]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_real_time_waits_between_steps() {
        let mut engine = Engine::new();
        let mut target = MemoryTarget::new();
        engine.load(vec![typed("x", 1000), typed("y", 5000)]);

        let started = tokio::time::Instant::now();
        let report = engine.play(&mut target, &mut RealTime).await.unwrap();
        assert_eq!(report.paused, Duration::from_millis(1000));
        assert!(started.elapsed() >= Duration::from_millis(1000));
        assert_eq!(target.text(), "xy");
    }

    #[test]
    fn test_playback_starts_at_the_live_selection() {
        let mut engine = Engine::new();
        let mut target = MemoryTarget::with_text("ab");
        target.select(Cursor::point(1));
        engine.load(vec![typed("-", 0)]);
        engine.start(&mut target);
        assert_eq!(engine.state(), PlaybackState::Running);
        assert_eq!(engine.tick(&mut target).unwrap(), None);
        assert_eq!(target.text(), "a-b");
        assert_eq!(target.selections(), vec![Cursor::point(2)]);
    }

    #[test]
    fn test_user_edits_between_steps_move_the_cursor() {
        let mut engine = Engine::new();
        let mut target = MemoryTarget::new();
        engine.load(vec![typed("a", 0), typed("b", 0)]);
        engine.start(&mut target);
        engine.tick(&mut target).unwrap();

        target.replace(0..0, ">> ");
        engine.tick(&mut target).unwrap();
        assert_eq!(target.text(), ">> ab");
    }

    #[tokio::test]
    async fn test_host_failure_aborts_the_rest() {
        let mut engine = Engine::new();
        let mut target = MemoryTarget::new();
        target.set_offline(true);
        engine.load(vec![
            typed("a", 0),
            Step::new(
                StepKind::RunCommand {
                    name: "upper_case".into(),
                    args: None,
                },
                Duration::ZERO,
            ),
            typed("b", 0),
        ]);

        assert!(engine.play(&mut target, &mut Immediate).await.is_err());
        assert_eq!(target.text(), "a");
        assert_eq!(engine.pending(), 0);
        assert_eq!(engine.state(), PlaybackState::Idle);
    }

    #[test]
    fn test_load_discards_pending_steps() {
        let mut engine = Engine::new();
        engine.load(vec![typed("a", 0), typed("b", 0)]);
        engine.load(vec![typed("c", 0)]);
        assert_eq!(engine.pending(), 1);
    }

    #[tokio::test]
    async fn test_frame_handler_sees_every_step() {
        let frames = Rc::new(RefCell::new(Vec::new()));
        let sink = frames.clone();
        let mut engine = Engine::new();
        engine.set_frame_handler(move |text, cursor| {
            sink.borrow_mut().push((text.to_string(), cursor.head));
        });
        engine.load(vec![typed("o", 0), typed("k", 0)]);
        engine.play(&mut MemoryTarget::new(), &mut Immediate).await.unwrap();
        assert_eq!(
            *frames.borrow(),
            vec![("o".to_string(), 1), ("ok".to_string(), 2)]
        );
    }

    #[test]
    fn test_empty_queue_stays_idle() {
        let mut engine = Engine::new();
        let mut target = MemoryTarget::new();
        engine.start(&mut target);
        assert_eq!(engine.state(), PlaybackState::Idle);
        assert_eq!(engine.tick(&mut target).unwrap(), None);
    }
}
