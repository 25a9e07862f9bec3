//! Core data types for the cadence timer engine.
//!
//! This module defines the data structures used for:
//! - Declarative routine configuration (`TimerConfig`, `RoutineConfig`)
//! - Structural state snapshots (`TimerState`)
//! - The event stream delivered to `start` callbacks (`TimerEvent`, `Target`)

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// TimerStatus
// ============================================================================

/// A node's own on/off run status, independent of its descendants.
///
/// A sequence can be on while the child it delegated to is itself on; the
/// two statuses answer different questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerStatus {
    /// No run in progress
    Off,
    /// A run is in progress
    On,
}

impl TimerStatus {
    /// Returns the string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerStatus::Off => "off",
            TimerStatus::On => "on",
        }
    }

    /// Returns true if a run is in progress.
    pub fn is_on(&self) -> bool {
        matches!(self, TimerStatus::On)
    }
}

impl Default for TimerStatus {
    fn default() -> Self {
        TimerStatus::Off
    }
}

// ============================================================================
// Target
// ============================================================================

/// The innermost unit-level event, carried unchanged as it bubbles through
/// ancestor nodes.
///
/// A listener at any level can always tell which leaf unit caused an event,
/// regardless of nesting depth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Target {
    /// A unit ticked; `remaining` counts the ticks left after this one.
    Tick { id: String, remaining: u32 },
    /// A unit finished its run.
    Done { id: String },
}

impl Target {
    /// Returns the id of the unit that produced this event.
    pub fn id(&self) -> &str {
        match self {
            Target::Tick { id, .. } | Target::Done { id } => id,
        }
    }
}

// ============================================================================
// TimerEvent
// ============================================================================

/// Whether an event reports forward progress or the emitting node's own
/// completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Forward progress
    Tick,
    /// The emitting node's run fully terminated
    Done,
}

/// The event delivered to a `start` callback.
///
/// A done-kinded event is only ever emitted by a node whose own run has
/// fully terminated. A child's intermediate completion reaches the outer
/// listener as a tick-kinded event that still carries the child's done
/// target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerEvent {
    /// Event kind as seen by the emitting node
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// The leaf unit event that caused this one
    pub target: Target,
}

impl TimerEvent {
    /// Creates a tick-kinded event around `target`.
    pub fn tick(target: Target) -> Self {
        Self {
            kind: EventKind::Tick,
            target,
        }
    }

    /// Creates a done-kinded event around `target`.
    pub fn done(target: Target) -> Self {
        Self {
            kind: EventKind::Done,
            target,
        }
    }

    /// Returns true if the emitting node's run fully terminated.
    pub fn is_done(&self) -> bool {
        self.kind == EventKind::Done
    }
}

// ============================================================================
// TimerState
// ============================================================================

/// Structural snapshot of a composite timer, isomorphic to its tree.
///
/// After a node turns off, its status (and its descendants' statuses) read
/// off, but the numeric fields (`current`, `iteration`, `remaining`) keep
/// the terminal values of the finished run until the next `start` resets
/// them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimerState {
    /// Leaf countdown state
    Unit {
        status: TimerStatus,
        id: String,
        remaining: u32,
    },
    /// Ordered children; `current` indexes the active child
    Sequence {
        status: TimerStatus,
        current: usize,
        of: Vec<TimerState>,
    },
    /// Repeated inner timer; `iteration` counts completed repetitions
    Loop {
        status: TimerStatus,
        iteration: u32,
        of: Box<TimerState>,
    },
}

impl TimerState {
    /// The node's own status, independent of its children.
    pub fn status(&self) -> TimerStatus {
        match self {
            TimerState::Unit { status, .. }
            | TimerState::Sequence { status, .. }
            | TimerState::Loop { status, .. } => *status,
        }
    }
}

// ============================================================================
// TimerConfig
// ============================================================================

/// Declarative description of a composite timer tree.
///
/// `tags` is opaque metadata for callers; the engine never reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimerConfig {
    /// A single countdown of `duration` ticks under an identity label
    Unit {
        name: String,
        duration: u32,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tags: Vec<String>,
    },
    /// An ordered list of inner timers, run back to back
    Sequence {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tags: Vec<String>,
        of: Vec<TimerConfig>,
    },
    /// One inner timer repeated a fixed number of times
    Loop {
        times: i32,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tags: Vec<String>,
        of: Box<TimerConfig>,
    },
}

impl TimerConfig {
    /// Total tick count of the tree this config describes.
    ///
    /// Matches the `duration` the built timer will report: sequences sum
    /// their children, loops multiply by the repetition count clamped to
    /// zero.
    pub fn total_duration(&self) -> u32 {
        match self {
            TimerConfig::Unit { duration, .. } => *duration,
            TimerConfig::Sequence { of, .. } => of.iter().map(TimerConfig::total_duration).sum(),
            TimerConfig::Loop { times, of, .. } => of.total_duration() * (*times).max(0) as u32,
        }
    }

    /// Validates a config loaded from a routine file.
    ///
    /// The engine itself accepts any config (empty sequences and
    /// non-positive loop counts are well-defined no-ops), but a file with
    /// an unnamed or zero-length unit is almost certainly a mistake.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            TimerConfig::Unit { name, duration, .. } => {
                if name.is_empty() {
                    return Err(ConfigError::UnnamedUnit);
                }
                if *duration == 0 {
                    return Err(ConfigError::ZeroDuration { name: name.clone() });
                }
                Ok(())
            }
            TimerConfig::Sequence { of, .. } => of.iter().try_for_each(TimerConfig::validate),
            TimerConfig::Loop { of, .. } => of.validate(),
        }
    }
}

// ============================================================================
// RoutineConfig
// ============================================================================

/// A named routine: the top-level document of a routine file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineConfig {
    /// Display name of the routine
    pub name: String,
    /// Opaque metadata, carried but never read
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// The timer tree to run
    pub timer: TimerConfig,
}

// ============================================================================
// RoutineEvent
// ============================================================================

/// A timer event enriched with the structural snapshot taken at the moment
/// the event fired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutineEvent {
    /// The raw event from the tree
    #[serde(flatten)]
    pub event: TimerEvent,
    /// Snapshot of the whole tree at delivery time
    pub state: TimerState,
}

// ============================================================================
// ConfigError
// ============================================================================

/// Errors surfaced when loading a routine file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A unit has an empty name.
    #[error("every unit needs a non-empty name")]
    UnnamedUnit,

    /// A unit has a duration of zero ticks.
    #[error("unit '{name}' has a duration of zero ticks")]
    ZeroDuration { name: String },
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------------
    // TimerStatus Tests
    // ------------------------------------------------------------------------

    mod timer_status_tests {
        use super::*;

        #[test]
        fn test_default_is_off() {
            assert_eq!(TimerStatus::default(), TimerStatus::Off);
        }

        #[test]
        fn test_as_str() {
            assert_eq!(TimerStatus::Off.as_str(), "off");
            assert_eq!(TimerStatus::On.as_str(), "on");
        }

        #[test]
        fn test_is_on() {
            assert!(TimerStatus::On.is_on());
            assert!(!TimerStatus::Off.is_on());
        }

        #[test]
        fn test_serialize_deserialize() {
            let json = serde_json::to_string(&TimerStatus::On).unwrap();
            assert_eq!(json, "\"on\"");

            let deserialized: TimerStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(deserialized, TimerStatus::On);
        }
    }

    // ------------------------------------------------------------------------
    // Target / TimerEvent Tests
    // ------------------------------------------------------------------------

    mod event_tests {
        use super::*;

        #[test]
        fn test_target_id() {
            let tick = Target::Tick {
                id: "warmup".to_string(),
                remaining: 10,
            };
            let done = Target::Done {
                id: "warmup".to_string(),
            };
            assert_eq!(tick.id(), "warmup");
            assert_eq!(done.id(), "warmup");
        }

        #[test]
        fn test_target_serializes_tagged() {
            let target = Target::Tick {
                id: "warmup".to_string(),
                remaining: 3,
            };
            let json = serde_json::to_string(&target).unwrap();
            assert_eq!(json, r#"{"type":"tick","id":"warmup","remaining":3}"#);
        }

        #[test]
        fn test_event_constructors() {
            let tick = TimerEvent::tick(Target::Tick {
                id: "a".to_string(),
                remaining: 1,
            });
            assert_eq!(tick.kind, EventKind::Tick);
            assert!(!tick.is_done());

            let done = TimerEvent::done(Target::Done {
                id: "a".to_string(),
            });
            assert_eq!(done.kind, EventKind::Done);
            assert!(done.is_done());
        }

        #[test]
        fn test_tick_event_can_carry_done_target() {
            // An inner completion forwarded as outer progress keeps the
            // child's done target.
            let event = TimerEvent::tick(Target::Done {
                id: "a".to_string(),
            });
            let json = serde_json::to_string(&event).unwrap();
            assert_eq!(json, r#"{"type":"tick","target":{"type":"done","id":"a"}}"#);
        }

        #[test]
        fn test_event_round_trip() {
            let event = TimerEvent::done(Target::Done {
                id: "cooldown".to_string(),
            });
            let json = serde_json::to_string(&event).unwrap();
            let back: TimerEvent = serde_json::from_str(&json).unwrap();
            assert_eq!(back, event);
        }
    }

    // ------------------------------------------------------------------------
    // TimerState Tests
    // ------------------------------------------------------------------------

    mod timer_state_tests {
        use super::*;

        #[test]
        fn test_status_accessor() {
            let unit = TimerState::Unit {
                status: TimerStatus::On,
                id: "a".to_string(),
                remaining: 5,
            };
            assert_eq!(unit.status(), TimerStatus::On);

            let sequence = TimerState::Sequence {
                status: TimerStatus::Off,
                current: 0,
                of: vec![unit.clone()],
            };
            assert_eq!(sequence.status(), TimerStatus::Off);

            let looped = TimerState::Loop {
                status: TimerStatus::On,
                iteration: 2,
                of: Box::new(unit),
            };
            assert_eq!(looped.status(), TimerStatus::On);
        }

        #[test]
        fn test_serializes_tagged_tree() {
            let state = TimerState::Loop {
                status: TimerStatus::On,
                iteration: 1,
                of: Box::new(TimerState::Unit {
                    status: TimerStatus::On,
                    id: "a".to_string(),
                    remaining: 2,
                }),
            };
            let json = serde_json::to_string(&state).unwrap();
            assert_eq!(
                json,
                r#"{"type":"loop","status":"on","iteration":1,"of":{"type":"unit","status":"on","id":"a","remaining":2}}"#
            );
        }
    }

    // ------------------------------------------------------------------------
    // TimerConfig Tests
    // ------------------------------------------------------------------------

    mod timer_config_tests {
        use super::*;

        fn unit(name: &str, duration: u32) -> TimerConfig {
            TimerConfig::Unit {
                name: name.to_string(),
                duration,
                tags: Vec::new(),
            }
        }

        #[test]
        fn test_unit_duration() {
            assert_eq!(unit("a", 30).total_duration(), 30);
        }

        #[test]
        fn test_sequence_duration_sums_children() {
            let config = TimerConfig::Sequence {
                tags: Vec::new(),
                of: vec![unit("a", 30), unit("b", 10), unit("c", 5)],
            };
            assert_eq!(config.total_duration(), 45);
        }

        #[test]
        fn test_empty_sequence_duration_is_zero() {
            let config = TimerConfig::Sequence {
                tags: Vec::new(),
                of: Vec::new(),
            };
            assert_eq!(config.total_duration(), 0);
        }

        #[test]
        fn test_loop_duration_multiplies() {
            let config = TimerConfig::Loop {
                times: 3,
                tags: Vec::new(),
                of: Box::new(unit("a", 20)),
            };
            assert_eq!(config.total_duration(), 60);
        }

        #[test]
        fn test_loop_negative_times_clamps_to_zero() {
            let config = TimerConfig::Loop {
                times: -1,
                tags: Vec::new(),
                of: Box::new(unit("a", 20)),
            };
            assert_eq!(config.total_duration(), 0);
        }

        #[test]
        fn test_nested_duration() {
            let config = TimerConfig::Sequence {
                tags: Vec::new(),
                of: vec![
                    unit("warmup", 60),
                    TimerConfig::Loop {
                        times: 2,
                        tags: Vec::new(),
                        of: Box::new(TimerConfig::Sequence {
                            tags: Vec::new(),
                            of: vec![unit("work", 30), unit("rest", 10)],
                        }),
                    },
                ],
            };
            assert_eq!(config.total_duration(), 60 + 2 * 40);
        }

        #[test]
        fn test_deserialize_routine_document() {
            let json = r#"{
                "type": "sequence",
                "of": [
                    { "type": "unit", "name": "warmup", "duration": 60 },
                    {
                        "type": "loop",
                        "times": 2,
                        "of": { "type": "unit", "name": "work", "duration": 30, "tags": ["hard"] }
                    }
                ]
            }"#;
            let config: TimerConfig = serde_json::from_str(json).unwrap();
            assert_eq!(config.total_duration(), 120);

            let TimerConfig::Sequence { of, .. } = &config else {
                panic!("expected a sequence");
            };
            assert_eq!(of.len(), 2);
        }

        #[test]
        fn test_serialize_skips_empty_tags() {
            let json = serde_json::to_string(&unit("a", 5)).unwrap();
            assert_eq!(json, r#"{"type":"unit","name":"a","duration":5}"#);
        }

        #[test]
        fn test_validate_accepts_degenerate_composites() {
            let empty = TimerConfig::Sequence {
                tags: Vec::new(),
                of: Vec::new(),
            };
            assert!(empty.validate().is_ok());

            let negative = TimerConfig::Loop {
                times: -3,
                tags: Vec::new(),
                of: Box::new(unit("a", 10)),
            };
            assert!(negative.validate().is_ok());
        }

        #[test]
        fn test_validate_rejects_unnamed_unit() {
            let config = unit("", 10);
            assert!(matches!(config.validate(), Err(ConfigError::UnnamedUnit)));
        }

        #[test]
        fn test_validate_rejects_zero_duration_nested() {
            let config = TimerConfig::Loop {
                times: 2,
                tags: Vec::new(),
                of: Box::new(TimerConfig::Sequence {
                    tags: Vec::new(),
                    of: vec![unit("ok", 10), unit("broken", 0)],
                }),
            };
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("broken"));
        }
    }

    // ------------------------------------------------------------------------
    // RoutineConfig / RoutineEvent Tests
    // ------------------------------------------------------------------------

    mod routine_tests {
        use super::*;

        #[test]
        fn test_routine_file_round_trip() {
            let json = r#"{
                "name": "Morning stretch",
                "tags": ["mobility"],
                "timer": { "type": "unit", "name": "neck rolls", "duration": 20 }
            }"#;
            let config: RoutineConfig = serde_json::from_str(json).unwrap();
            assert_eq!(config.name, "Morning stretch");
            assert_eq!(config.tags, vec!["mobility".to_string()]);
            assert_eq!(config.timer.total_duration(), 20);

            let back = serde_json::to_string(&config).unwrap();
            let again: RoutineConfig = serde_json::from_str(&back).unwrap();
            assert_eq!(again, config);
        }

        #[test]
        fn test_routine_event_flattens_event_fields() {
            let event = RoutineEvent {
                event: TimerEvent::done(Target::Done {
                    id: "a".to_string(),
                }),
                state: TimerState::Unit {
                    status: TimerStatus::Off,
                    id: "a".to_string(),
                    remaining: 0,
                },
            };
            let json = serde_json::to_value(&event).unwrap();
            assert_eq!(json["type"], "done");
            assert_eq!(json["target"]["id"], "a");
            assert_eq!(json["state"]["status"], "off");
        }
    }
}
