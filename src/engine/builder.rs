//! Building composite timers from declarative configuration.
//!
//! The mapping is a pure recursive walk: every config variant has exactly
//! one timer counterpart, and the countdown capability is injected into
//! every unit along the way. Adding a config variant without handling it
//! here is a compile error, not a runtime gap.

use std::rc::Rc;

use crate::engine::countdown::Countdown;
use crate::engine::timer::{EventHandler, Loop, Sequence, Timer, Unit};
use crate::types::{RoutineEvent, TimerConfig};

/// Recursively instantiates the composite tree described by `config`,
/// injecting `countdown` into every unit.
pub fn build_timer(config: &TimerConfig, countdown: Rc<dyn Countdown>) -> Rc<dyn Timer> {
    match config {
        TimerConfig::Unit { name, duration, .. } => {
            Rc::new(Unit::new(name.clone(), *duration, countdown))
        }
        TimerConfig::Sequence { of, .. } => Rc::new(Sequence::new(
            of.iter()
                .map(|child| build_timer(child, Rc::clone(&countdown)))
                .collect(),
        )),
        TimerConfig::Loop { times, of, .. } => {
            Rc::new(Loop::new(*times, build_timer(of, countdown)))
        }
    }
}

/// Builds and starts the tree described by `config`, delivering every
/// event enriched with a snapshot of the whole tree taken at delivery
/// time.
///
/// Returns the root timer so the caller can keep querying it (or start
/// another run once this one finishes).
pub fn start_routine(
    config: &TimerConfig,
    countdown: Rc<dyn Countdown>,
    on_event: impl Fn(RoutineEvent) + 'static,
) -> Rc<dyn Timer> {
    let timer = build_timer(config, countdown);
    let handler: EventHandler = {
        let timer = Rc::clone(&timer);
        Rc::new(move |event| {
            on_event(RoutineEvent {
                event,
                state: timer.state(),
            });
        })
    };
    timer.start(handler);
    timer
}

// ============================================================================
// Tests
// ============================================================================
