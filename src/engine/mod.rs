//! Timer engine: countdown primitives, composite timers, and the tree
//! builder.
//!
//! - `countdown`: the injected capability that maps durations onto elapsed
//!   time, with a tokio-backed implementation and a synthetic stand-in
//! - `timer`: the Unit/Sequence/Loop composites and their uniform contract
//! - `builder`: declarative config to composite tree, plus the one-call
//!   routine driver
//!
//! Known limitation: `stop` and `pause` are declared across the contract
//! but not wired to anything. A running tree cannot currently be halted
//! other than by dropping it and ignoring further callbacks.

pub mod builder;
pub mod countdown;
pub mod timer;

pub use builder::{build_timer, start_routine};
pub use countdown::{
    Countdown, CountdownEvent, CountdownHandle, CountdownHandler, MockCountdown, TokioCountdown,
};
pub use timer::{EventHandler, Loop, Sequence, Timer, Unit};
