//! Composite timers: the Unit/Sequence/Loop tree.
//!
//! Every node exposes the same contract: a fixed `duration`, a live
//! `state()` snapshot, an idempotent `start`, and the deliberately inert
//! `stop`/`pause` surface. Events flow bottom-up: each layer forwards its
//! child's ticks unchanged, translates intermediate child completions into
//! ticks of its own, and emits `done` only once its whole run is over.
//!
//! Continuation is an explicit transition: when a child completes, the
//! parent's event handler starts the next child (or repetition) from inside
//! the callback. The call stack unwinds between countdown events, so
//! nesting depth is bounded by tree depth, not by run length.

use std::cell::RefCell;
use std::rc::Rc;

use crate::engine::countdown::{Countdown, CountdownEvent};
use crate::types::{Target, TimerEvent, TimerState, TimerStatus};

// ============================================================================
// Timer
// ============================================================================

/// Callback receiving the event stream of a started timer.
///
/// Handlers are shared down the tree and re-used across continuation
/// starts, hence `Rc<dyn Fn>` rather than a plain `FnMut`.
pub type EventHandler = Rc<dyn Fn(TimerEvent)>;

/// Uniform contract of every node in a composite timer tree.
pub trait Timer {
    /// Total tick count of a full run. Fixed at construction.
    fn duration(&self) -> u32;

    /// Structural snapshot of the current run position.
    fn state(&self) -> TimerState;

    /// Begins a run, delivering events to `on_event`.
    ///
    /// Calling `start` on a node that is already on is a no-op. A node
    /// turns off again before its final `done` callback fires, so a
    /// listener reacting to that event can restart it synchronously.
    fn start(&self, on_event: EventHandler);

    /// Declared by the contract but deliberately inert: a running tree
    /// cannot currently be halted other than by dropping it and ignoring
    /// further callbacks.
    fn stop(&self);

    /// Declared by the contract but deliberately inert, like
    /// [`Timer::stop`].
    fn pause(&self);
}

// ============================================================================
// Unit
// ============================================================================

/// Leaf node: a single countdown under an identity label.
pub struct Unit {
    id: String,
    duration: u32,
    countdown: Rc<dyn Countdown>,
    run: Rc<RefCell<UnitRun>>,
}

/// Mutable run position of a [`Unit`].
struct UnitRun {
    status: TimerStatus,
    remaining: u32,
}

impl Unit {
    /// Creates a unit of `duration` ticks driven by the injected countdown
    /// source.
    pub fn new(id: impl Into<String>, duration: u32, countdown: Rc<dyn Countdown>) -> Self {
        Self {
            id: id.into(),
            duration,
            countdown,
            run: Rc::new(RefCell::new(UnitRun {
                status: TimerStatus::Off,
                remaining: duration,
            })),
        }
    }
}

impl Timer for Unit {
    fn duration(&self) -> u32 {
        self.duration
    }

    fn state(&self) -> TimerState {
        let run = self.run.borrow();
        TimerState::Unit {
            status: run.status,
            id: self.id.clone(),
            remaining: run.remaining,
        }
    }

    fn start(&self, on_event: EventHandler) {
        {
            let mut run = self.run.borrow_mut();
            if run.status.is_on() {
                return;
            }
            run.status = TimerStatus::On;
            run.remaining = self.duration;
        }

        let run = Rc::clone(&self.run);
        let id = self.id.clone();
        // The cancellation handle is dropped on purpose: `stop` is not
        // wired to the countdown, and dropping a handle never cancels.
        self.countdown.start(
            self.duration,
            Box::new(move |event| match event {
                CountdownEvent::Tick { remaining } => {
                    run.borrow_mut().remaining = remaining;
                    on_event(TimerEvent::tick(Target::Tick {
                        id: id.clone(),
                        remaining,
                    }));
                }
                CountdownEvent::Done => {
                    // Reset before notifying, so a listener reacting to
                    // the done event can immediately start a fresh run.
                    {
                        let mut run = run.borrow_mut();
                        run.status = TimerStatus::Off;
                        run.remaining = 0;
                    }
                    on_event(TimerEvent::done(Target::Done { id: id.clone() }));
                }
            }),
        );
    }

    fn stop(&self) {}

    fn pause(&self) {}
}

// ============================================================================
// Sequence
// ============================================================================

/// Ordered inner timers, run back to back.
pub struct Sequence {
    duration: u32,
    children: Rc<Vec<Rc<dyn Timer>>>,
    run: Rc<RefCell<SequenceRun>>,
}

/// Mutable run position of a [`Sequence`].
struct SequenceRun {
    status: TimerStatus,
    current: usize,
}

impl Sequence {
    /// Creates a sequence over `children`, in order. Duration is the sum
    /// of the children's durations, computed once here.
    pub fn new(children: Vec<Rc<dyn Timer>>) -> Self {
        let duration = children.iter().map(|child| child.duration()).sum();
        Self {
            duration,
            children: Rc::new(children),
            run: Rc::new(RefCell::new(SequenceRun {
                status: TimerStatus::Off,
                current: 0,
            })),
        }
    }

    /// Starts the child at the current index and continues the run from
    /// its completion events.
    fn start_current(
        children: &Rc<Vec<Rc<dyn Timer>>>,
        run: &Rc<RefCell<SequenceRun>>,
        on_event: &EventHandler,
    ) {
        let child = Rc::clone(&children[run.borrow().current]);
        let handler: EventHandler = {
            let children = Rc::clone(children);
            let run = Rc::clone(run);
            let outer = Rc::clone(on_event);
            Rc::new(move |event: TimerEvent| {
                if !event.is_done() {
                    outer(event);
                    return;
                }
                let is_last = run.borrow().current + 1 == children.len();
                if is_last {
                    run.borrow_mut().status = TimerStatus::Off;
                    outer(event);
                } else {
                    // The child finished but the sequence did not: the
                    // listener sees forward progress, not a completion.
                    outer(TimerEvent::tick(event.target));
                    run.borrow_mut().current += 1;
                    Self::start_current(&children, &run, &outer);
                }
            })
        };
        child.start(handler);
    }
}

impl Timer for Sequence {
    fn duration(&self) -> u32 {
        self.duration
    }

    fn state(&self) -> TimerState {
        let run = self.run.borrow();
        TimerState::Sequence {
            status: run.status,
            current: run.current,
            of: self.children.iter().map(|child| child.state()).collect(),
        }
    }

    fn start(&self, on_event: EventHandler) {
        {
            let mut run = self.run.borrow_mut();
            if run.status.is_on() {
                return;
            }
            run.status = TimerStatus::On;
            run.current = 0;
        }
        if self.children.is_empty() {
            // Nothing to delegate to; the run is over before it began.
            self.run.borrow_mut().status = TimerStatus::Off;
            return;
        }
        Self::start_current(&self.children, &self.run, &on_event);
    }

    fn stop(&self) {}

    fn pause(&self) {}
}

// ============================================================================
// Loop
// ============================================================================

/// One inner timer repeated a fixed number of times.
pub struct Loop {
    duration: u32,
    times: u32,
    inner: Rc<dyn Timer>,
    run: Rc<RefCell<LoopRun>>,
}

/// Mutable run position of a [`Loop`].
struct LoopRun {
    status: TimerStatus,
    /// Completed repetitions of the current (or just-finished) run
    iteration: u32,
    /// Repetitions not yet started
    remaining: u32,
}

impl Loop {
    /// Creates a loop running `inner` a fixed number of times. Negative
    /// counts are clamped to zero, never an error.
    pub fn new(times: i32, inner: Rc<dyn Timer>) -> Self {
        let times = times.max(0) as u32;
        Self {
            duration: inner.duration() * times,
            times,
            inner,
            run: Rc::new(RefCell::new(LoopRun {
                status: TimerStatus::Off,
                iteration: 0,
                remaining: times,
            })),
        }
    }

    /// Starts one repetition of the inner timer and continues the run from
    /// its completion events.
    fn start_repetition(
        inner: &Rc<dyn Timer>,
        run: &Rc<RefCell<LoopRun>>,
        on_event: &EventHandler,
    ) {
        let handler: EventHandler = {
            let inner = Rc::clone(inner);
            let run = Rc::clone(run);
            let outer = Rc::clone(on_event);
            Rc::new(move |event: TimerEvent| {
                if !event.is_done() {
                    outer(event);
                    return;
                }
                let finished = {
                    let mut run = run.borrow_mut();
                    run.iteration += 1;
                    run.remaining == 0
                };
                if finished {
                    run.borrow_mut().status = TimerStatus::Off;
                    outer(event);
                } else {
                    outer(TimerEvent::tick(event.target));
                    run.borrow_mut().remaining -= 1;
                    Self::start_repetition(&inner, &run, &outer);
                }
            })
        };
        inner.start(handler);
    }
}

impl Timer for Loop {
    fn duration(&self) -> u32 {
        self.duration
    }

    fn state(&self) -> TimerState {
        let run = self.run.borrow();
        TimerState::Loop {
            status: run.status,
            iteration: run.iteration,
            of: Box::new(self.inner.state()),
        }
    }

    fn start(&self, on_event: EventHandler) {
        {
            let mut run = self.run.borrow_mut();
            if run.status.is_on() {
                return;
            }
            run.status = TimerStatus::On;
            run.iteration = 0;
            run.remaining = self.times;
        }
        if self.times == 0 {
            // Nothing to run: flip back off without fabricating a
            // completion event for a run that never happened.
            self.run.borrow_mut().status = TimerStatus::Off;
            return;
        }
        self.run.borrow_mut().remaining -= 1;
        Self::start_repetition(&self.inner, &self.run, &on_event);
    }

    fn stop(&self) {}

    fn pause(&self) {}
}

// ============================================================================
// Tests
// ============================================================================
