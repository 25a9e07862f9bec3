//! Countdown primitives for the timer engine.
//!
//! A countdown maps a duration onto elapsed time: it fires one event per
//! elapsed tick unit, `tick` with the remaining count while the run is in
//! progress, then a terminal `done`. Units consume countdowns through the
//! [`Countdown`] capability trait, so a tree can be driven by wall-clock
//! time in production and by hand in tests.

use std::cell::RefCell;
use std::rc::Rc;

use tokio::time::{interval, Duration, MissedTickBehavior};

// ============================================================================
// Countdown capability
// ============================================================================

/// Raw event fired by a countdown primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownEvent {
    /// One tick unit elapsed; `remaining` counts the ticks left after this
    /// one.
    Tick { remaining: u32 },
    /// The final tick unit elapsed; no further events follow.
    Done,
}

/// Handler invoked once per countdown event.
pub type CountdownHandler = Box<dyn FnMut(CountdownEvent)>;

/// Cancellation surface of a running countdown.
///
/// Dropping a handle must not cancel the countdown; `stop` is the only
/// cancellation path.
pub trait CountdownHandle {
    /// Stops the countdown; no further events are delivered.
    fn stop(&mut self);
}

/// Capability for starting countdowns.
///
/// The engine receives this as an injected dependency rather than reaching
/// for a global timer facility, which keeps a composite tree deterministic
/// under a synthetic implementation.
pub trait Countdown {
    /// Starts a countdown of `duration` ticks, delivering events to
    /// `on_event`.
    fn start(&self, duration: u32, on_event: CountdownHandler) -> Box<dyn CountdownHandle>;
}

// ============================================================================
// TokioCountdown
// ============================================================================

/// Wall-clock countdown driven by a [`tokio::time::interval`].
///
/// Each countdown runs as a spawned local task, so a
/// [`tokio::task::LocalSet`] must be current when `start` is called. Event
/// handlers are not `Send`; the engine is single-threaded by design.
#[derive(Debug, Clone)]
pub struct TokioCountdown {
    period: Duration,
}

impl TokioCountdown {
    /// Creates a countdown source with the conventional one-second tick.
    pub fn new() -> Self {
        Self::with_period(Duration::from_secs(1))
    }

    /// Creates a countdown source with a custom tick period.
    pub fn with_period(period: Duration) -> Self {
        Self { period }
    }
}

impl Default for TokioCountdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Countdown for TokioCountdown {
    fn start(&self, duration: u32, mut on_event: CountdownHandler) -> Box<dyn CountdownHandle> {
        let period = self.period;
        let task = tokio::task::spawn_local(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // An interval's first tick completes immediately; consume it so
            // the first event lands one full period after start.
            ticker.tick().await;

            let mut elapsed = 0;
            loop {
                ticker.tick().await;
                elapsed += 1;
                if elapsed < duration {
                    on_event(CountdownEvent::Tick {
                        remaining: duration - elapsed,
                    });
                } else {
                    on_event(CountdownEvent::Done);
                    break;
                }
            }
        });
        Box::new(TokioCountdownHandle { task })
    }
}

/// Handle aborting the interval task behind a [`TokioCountdown`] run.
struct TokioCountdownHandle {
    task: tokio::task::JoinHandle<()>,
}

impl CountdownHandle for TokioCountdownHandle {
    fn stop(&mut self) {
        // Aborting is cancellation; a plain drop leaves the task running.
        self.task.abort();
    }
}

// ============================================================================
// MockCountdown
// ============================================================================

/// Synthetic countdown source for tests.
///
/// Records every countdown the engine starts and lets the caller advance
/// the active one a tick unit at a time, like a fake-timer test harness.
/// Clones share the same record, so a test can keep one copy and hand the
/// other to the tree builder.
#[derive(Clone, Default)]
pub struct MockCountdown {
    runs: Rc<RefCell<Vec<MockRun>>>,
}

struct MockRun {
    duration: u32,
    elapsed: u32,
    finished: bool,
    stopped: bool,
    handler: Rc<RefCell<CountdownHandler>>,
}

impl MockCountdown {
    /// Creates an empty countdown record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of countdowns started so far (restarts included).
    pub fn started(&self) -> usize {
        self.runs.borrow().len()
    }

    /// Advances the active countdown by one tick unit, firing exactly one
    /// event. Returns false when nothing is left to drive.
    pub fn advance(&self) -> bool {
        let (handler, event) = {
            let mut runs = self.runs.borrow_mut();
            let Some(run) = runs.iter_mut().rev().find(|r| !r.finished && !r.stopped) else {
                return false;
            };
            run.elapsed += 1;
            let event = if run.elapsed < run.duration {
                CountdownEvent::Tick {
                    remaining: run.duration - run.elapsed,
                }
            } else {
                run.finished = true;
                CountdownEvent::Done
            };
            (Rc::clone(&run.handler), event)
        };
        // The handler may start further countdowns; the borrow on `runs`
        // is released before it fires.
        (handler.borrow_mut().as_mut())(event);
        true
    }

    /// Drives every countdown (including ones spawned along the way) to
    /// completion.
    pub fn drive_to_completion(&self) {
        while self.advance() {}
    }
}

impl Countdown for MockCountdown {
    fn start(&self, duration: u32, on_event: CountdownHandler) -> Box<dyn CountdownHandle> {
        let mut runs = self.runs.borrow_mut();
        runs.push(MockRun {
            duration,
            elapsed: 0,
            finished: false,
            stopped: false,
            handler: Rc::new(RefCell::new(on_event)),
        });
        Box::new(MockCountdownHandle {
            runs: Rc::clone(&self.runs),
            index: runs.len() - 1,
        })
    }
}

struct MockCountdownHandle {
    runs: Rc<RefCell<Vec<MockRun>>>,
    index: usize,
}

impl CountdownHandle for MockCountdownHandle {
    fn stop(&mut self) {
        self.runs.borrow_mut()[self.index].stopped = true;
    }
}

// ============================================================================
// Tests
// ============================================================================
