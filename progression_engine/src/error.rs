//! Progression Engine — Error Types
//!
//! Redundant events (flag already set, achievement already unlocked,
//! mission already active) are NOT errors. They produce a no-op
//! `TransitionOutcome`. Errors are reserved for events that would
//! corrupt numeric state or break the event stream.

use thiserror::Error;

use crate::domain::Archetype;

/// An event that references something outside the known enumerations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidEventError {
    #[error("day index {day} is outside the program range 1..={max}")]
    DayOutOfRange { day: u32, max: u32 },

    #[error("unknown archetype {0:?}")]
    UnknownArchetype(String),

    #[error("{field} must be within 1..=10, got {value}")]
    ScoreOutOfRange { field: &'static str, value: u8 },

    #[error("archetype level {0} is outside 1..=5")]
    LevelOutOfRange(u8),

    #[error("{0} must not be empty")]
    EmptyText(&'static str),

    #[error("invalid identifier {0:?}: must match [a-zA-Z0-9_-]+")]
    InvalidIdentifier(String),

    #[error("no mission directive available for {archetype} level {level}")]
    NoDirective { archetype: Archetype, level: u8 },

    #[error("mission deadline is outside the representable time range")]
    DeadlineOutOfRange,
}

/// Every failure the engine can report from `apply`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgressionError {
    #[error("invalid event: {0}")]
    InvalidEvent(#[from] InvalidEventError),

    #[error("schema version mismatch: expected {expected}, got {got}")]
    SchemaVersion { expected: u32, got: u32 },

    #[error("sequence violation: expected {expected}, got {got}")]
    Sequence { expected: u64, got: u64 },

    #[error("overflow: {a} {op} {b} overflows u64")]
    Overflow { a: u64, op: char, b: u64 },

    #[error("invariant violation: [INVARIANT:{code}] {detail}")]
    Invariant { code: &'static str, detail: String },

    #[error("canonical encoding failed: {0}")]
    Encoding(String),
}

pub type Result<T> = std::result::Result<T, ProgressionError>;
