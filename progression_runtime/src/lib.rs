#![forbid(unsafe_code)]

//! Progression Engine — Runtime
//!
//! Wraps the deterministic engine with per-user persistence,
//! hash-verified snapshots, configuration, sessions and replay.
//!
//! No domain logic lives here. All transitions and invariants are
//! delegated to the engine.

pub mod config;
pub mod snapshot;
pub mod store;
pub mod session;
pub mod replay;

pub use config::{ConfigError, RuntimeConfig};
pub use session::{SharedSession, UserSession};
pub use snapshot::{SnapshotError, StateSnapshot};
pub use store::{FileStore, MemoryStore, ProgressStore, StoreError};
