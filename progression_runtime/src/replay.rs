//! Replay orchestrator — rebuild state from an event stream.
//!
//! Delegates all domain logic to the engine. No shortcuts, no cached
//! state logic.

use progression_engine::content::StaticCatalog;
use progression_engine::hashing::canonical_hash;
use progression_engine::{EventEnvelope, ProgressState, ProgressionConstants, ProgressionEngine, ProgressionError};
use tracing::{info, warn};

/// Result of replaying the same stream twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismReport {
    pub events: usize,
    pub first_hash: String,
    pub second_hash: String,
}

impl DeterminismReport {
    pub fn is_deterministic(&self) -> bool {
        self.first_hash == self.second_hash
    }
}

/// Rebuild a user's state from `genesis` and an event stream.
///
/// 1. Create a fresh engine at `genesis`
/// 2. Pass each event sequentially to the engine
/// 3. Return (final_state, canonical_hash)
pub fn rebuild_state(
    genesis: &ProgressState,
    constants: &ProgressionConstants,
    events: &[EventEnvelope],
) -> Result<(ProgressState, String), ProgressionError> {
    let mut engine =
        ProgressionEngine::with_state(StaticCatalog, constants.clone(), genesis.clone(), 0);
    engine.apply_sequence(events)?;
    let state = engine.into_state();
    let hash = canonical_hash(&state)?;
    Ok((state, hash))
}

/// Rebuild state and return only the canonical hash.
pub fn rebuild_hash(
    genesis: &ProgressState,
    constants: &ProgressionConstants,
    events: &[EventEnvelope],
) -> Result<String, ProgressionError> {
    rebuild_state(genesis, constants, events).map(|(_, hash)| hash)
}

/// Replay twice through independent engines and compare hashes.
pub fn verify_determinism(
    genesis: &ProgressState,
    constants: &ProgressionConstants,
    events: &[EventEnvelope],
) -> Result<DeterminismReport, ProgressionError> {
    let report = DeterminismReport {
        events: events.len(),
        first_hash: rebuild_hash(genesis, constants, events)?,
        second_hash: rebuild_hash(genesis, constants, events)?,
    };
    if report.is_deterministic() {
        info!(events = report.events, hash = %report.first_hash, "replay deterministic");
    } else {
        warn!(
            events = report.events,
            first = %report.first_hash,
            second = %report.second_hash,
            "replay diverged"
        );
    }
    Ok(report)
}
