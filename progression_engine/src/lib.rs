#![forbid(unsafe_code)]

/// Rule-set version bound into every canonical hash. Behavioral changes
/// to transitions require a new version.
pub const ENGINE_VERSION: u32 = 1;

pub mod error;
pub mod arithmetic;
pub mod bounded;
pub mod domain;
pub mod content;
pub mod events;
pub mod state;
pub mod streak;
pub mod achievements;
pub mod derived;
pub mod views;
pub mod transitions;
pub mod invariants;
pub mod hashing;
pub mod oracle;
pub mod engine;

pub use domain::{Archetype, ProgressState, ProgressionConstants, TransitionOutcome};
pub use engine::ProgressionEngine;
pub use error::{InvalidEventError, ProgressionError};
pub use events::{Event, EventEnvelope};
