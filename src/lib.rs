//! Cadence Timer Library
//!
//! This library provides the core functionality for the cadence interval
//! timer CLI. It includes:
//! - Composite timer engine: units, sequences, and loops sharing a uniform
//!   duration/state/start contract
//! - Countdown primitives: a tokio interval-backed implementation and a
//!   synthetic stand-in for tests
//! - Declarative routine configuration and the tree builder
//! - CLI command parsing and display utilities
//!
//! A routine is described as a tagged config tree and built into a live
//! timer with an injected countdown capability:
//!
//! ```
//! use std::rc::Rc;
//! use cadence::{build_timer, MockCountdown, TimerConfig};
//!
//! let config = TimerConfig::Loop {
//!     times: 2,
//!     tags: Vec::new(),
//!     of: Box::new(TimerConfig::Unit {
//!         name: "work".to_string(),
//!         duration: 30,
//!         tags: Vec::new(),
//!     }),
//! };
//!
//! let countdown = MockCountdown::new();
//! let timer = build_timer(&config, Rc::new(countdown.clone()));
//! assert_eq!(timer.duration(), 60);
//!
//! timer.start(Rc::new(|event| println!("{:?}", event)));
//! countdown.drive_to_completion();
//! ```

pub mod cli;
pub mod engine;
pub mod types;

// Re-export commonly used types for convenience
pub use engine::{
    build_timer, start_routine, Countdown, CountdownEvent, CountdownHandle, CountdownHandler,
    EventHandler, Loop, MockCountdown, Sequence, Timer, TokioCountdown, Unit,
};
pub use types::{
    ConfigError, EventKind, RoutineConfig, RoutineEvent, Target, TimerConfig, TimerEvent,
    TimerState, TimerStatus,
};
