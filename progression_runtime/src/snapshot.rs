//! Snapshot layer — hash-verified state snapshots.
//!
//! A snapshot carries the engine's canonical JSON and its SHA-256, plus
//! the sequence of the last applied event so a session can resume the
//! stream. No wall-clock timestamps in snapshot content.
//!
//! - `StateSnapshot::take`:    state → snapshot
//! - `StateSnapshot::verify`:  version + hash check
//! - `StateSnapshot::restore`: verify + decode + recompute + invariants
//! - `encode_snapshot` / `decode_snapshot`: snapshot ↔ JSON text
//! - `save_snapshot` / `load_latest_snapshot`: per-user archive files

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use progression_engine::derived::compute_field;
use progression_engine::hashing::{canonical_serialize, hex_digest};
use progression_engine::invariants::validate_invariants;
use progression_engine::{ProgressState, ProgressionConstants, ProgressionError, ENGINE_VERSION};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("canonical encoding failed: {0}")]
    Encoding(#[source] ProgressionError),

    #[error("snapshot serialization failed: {0}")]
    Serialization(String),

    #[error("snapshot decode failed: {0}")]
    Deserialization(String),

    #[error("snapshot written by engine v{got}, this is v{expected}")]
    VersionMismatch { expected: u32, got: u32 },

    #[error("snapshot hash mismatch: recorded {recorded}, computed {computed}")]
    HashMismatch { recorded: String, computed: String },

    #[error("restored state is invalid: {0}")]
    Invariant(#[source] ProgressionError),

    #[error("snapshot I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Snapshot on-disk format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StateSnapshot {
    /// Engine version at snapshot time.
    pub engine_version: u32,
    /// Sequence of the last event applied to the state.
    pub sequence: u64,
    /// Canonical JSON of the state (UTF-8).
    pub canonical_json: String,
    /// SHA-256 of `canonical_json`, lowercase hex.
    pub hash: String,
}

impl StateSnapshot {
    pub fn take(state: &ProgressState, sequence: u64) -> Result<Self, SnapshotError> {
        let bytes = canonical_serialize(state).map_err(SnapshotError::Encoding)?;
        let hash = hex_digest(&bytes);
        let canonical_json =
            String::from_utf8(bytes).map_err(|e| SnapshotError::Serialization(e.to_string()))?;
        Ok(Self {
            engine_version: ENGINE_VERSION,
            sequence,
            canonical_json,
            hash,
        })
    }

    /// Check the engine version and that the hash matches the content.
    pub fn verify(&self) -> Result<(), SnapshotError> {
        if self.engine_version != ENGINE_VERSION {
            return Err(SnapshotError::VersionMismatch {
                expected: ENGINE_VERSION,
                got: self.engine_version,
            });
        }
        let computed = hex_digest(self.canonical_json.as_bytes());
        if computed != self.hash {
            return Err(SnapshotError::HashMismatch {
                recorded: self.hash.clone(),
                computed,
            });
        }
        Ok(())
    }

    /// Decode the state, rebuild its derived field, and validate it.
    ///
    /// Strict: unknown or missing state fields fail decoding.
    pub fn restore(&self, constants: &ProgressionConstants) -> Result<ProgressState, SnapshotError> {
        self.verify()?;
        let root: Value = serde_json::from_str(&self.canonical_json)
            .map_err(|e| SnapshotError::Deserialization(e.to_string()))?;
        let embedded = root.get("engine_version").and_then(Value::as_u64);
        if embedded != Some(u64::from(ENGINE_VERSION)) {
            return Err(SnapshotError::Deserialization(format!(
                "canonical engine_version is {:?}",
                embedded
            )));
        }
        let state_value = root
            .get("state")
            .cloned()
            .ok_or_else(|| SnapshotError::Deserialization("missing state".to_string()))?;
        let mut state: ProgressState = serde_json::from_value(state_value)
            .map_err(|e| SnapshotError::Deserialization(e.to_string()))?;
        state.derived_field = compute_field(&state);
        validate_invariants(&state, constants).map_err(SnapshotError::Invariant)?;
        Ok(state)
    }
}

pub fn encode_snapshot(snapshot: &StateSnapshot) -> Result<String, SnapshotError> {
    serde_json::to_string(snapshot).map_err(|e| SnapshotError::Serialization(e.to_string()))
}

pub fn decode_snapshot(json: &str) -> Result<StateSnapshot, SnapshotError> {
    serde_json::from_str(json).map_err(|e| SnapshotError::Deserialization(e.to_string()))
}

fn archive_name(user_id: &str, sequence: u64) -> String {
    format!("snapshot-{}-{:06}.json", user_id, sequence)
}

/// Write an archive copy of `snapshot` into `dir`, one file per sequence.
pub fn save_snapshot(
    dir: &Path,
    user_id: &str,
    snapshot: &StateSnapshot,
) -> Result<PathBuf, SnapshotError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(archive_name(user_id, snapshot.sequence));
    let content = encode_snapshot(snapshot)?;

    let mut file = File::create(&path)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()?;
    Ok(path)
}

/// Load the highest-sequence archive for `user_id` in `dir`, verified.
pub fn load_latest_snapshot(
    dir: &Path,
    user_id: &str,
) -> Result<Option<StateSnapshot>, SnapshotError> {
    if !dir.exists() {
        return Ok(None);
    }

    let prefix = format!("snapshot-{}-", user_id);
    let mut best_seq: Option<u64> = None;
    for entry in fs::read_dir(dir)? {
        let name = entry?.file_name();
        let name = name.to_string_lossy();
        let seq = name
            .strip_prefix(prefix.as_str())
            .and_then(|s| s.strip_suffix(".json"))
            .and_then(|s| s.parse::<u64>().ok());
        if let Some(seq) = seq {
            if best_seq.map_or(true, |best| seq > best) {
                best_seq = Some(seq);
            }
        }
    }

    let Some(seq) = best_seq else {
        return Ok(None);
    };
    let content = fs::read_to_string(dir.join(archive_name(user_id, seq)))?;
    let snapshot = decode_snapshot(&content)?;
    snapshot.verify()?;
    Ok(Some(snapshot))
}
