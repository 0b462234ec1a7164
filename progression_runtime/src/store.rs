//! Key-value persistence for per-user progress.
//!
//! The engine never calls a store. Sessions save after each applied
//! event and treat failures as non-fatal.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use progression_engine::arithmetic::validate_identifier;
use progression_engine::{InvalidEventError, ProgressionError};

use crate::snapshot::{decode_snapshot, encode_snapshot, SnapshotError, StateSnapshot};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid user id: {0}")]
    InvalidUserId(#[from] InvalidEventError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error("store I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("engine rejected stored state: {0}")]
    Engine(#[from] ProgressionError),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Save and load the latest snapshot for a user.
pub trait ProgressStore {
    fn save(&mut self, user_id: &str, snapshot: &StateSnapshot) -> Result<(), StoreError>;

    /// `Ok(None)` when the user has never been saved.
    fn load(&self, user_id: &str) -> Result<Option<StateSnapshot>, StoreError>;
}

// ---------------------------------------------------------------------------
// FileStore
// ---------------------------------------------------------------------------

/// One `progress-{user}.json` file per user in a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, user_id: &str) -> Result<PathBuf, StoreError> {
        validate_identifier(user_id)?;
        Ok(self.dir.join(format!("progress-{}.json", user_id)))
    }
}

/// Write to a sibling temp file, fsync, then rename over `path`.
fn atomic_write(path: &Path, data: &[u8]) -> io::Result<()> {
    let tmp = path.with_extension("json.tmp");
    let mut file = File::create(&tmp)?;
    file.write_all(data)?;
    file.sync_all()?;
    fs::rename(&tmp, path)
}

impl ProgressStore for FileStore {
    fn save(&mut self, user_id: &str, snapshot: &StateSnapshot) -> Result<(), StoreError> {
        let path = self.path_for(user_id)?;
        fs::create_dir_all(&self.dir)?;
        let content = encode_snapshot(snapshot)?;
        atomic_write(&path, content.as_bytes())?;
        info!(
            user = user_id,
            sequence = snapshot.sequence,
            path = %path.display(),
            "progress saved"
        );
        Ok(())
    }

    fn load(&self, user_id: &str) -> Result<Option<StateSnapshot>, StoreError> {
        let path = self.path_for(user_id)?;
        if !path.exists() {
            debug!(user = user_id, "no stored progress");
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        let snapshot = decode_snapshot(&content)?;
        snapshot.verify()?;
        info!(user = user_id, sequence = snapshot.sequence, "progress loaded");
        Ok(Some(snapshot))
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// In-memory store holding encoded snapshots. Can be switched to fail
/// every save, to exercise fire-and-forget persistence.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    fail_saves: bool,
    saves: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_saves: true,
            ..Self::default()
        }
    }

    pub fn set_failing(&mut self, fail: bool) {
        self.fail_saves = fail;
    }

    /// Successful saves so far.
    pub fn save_count(&self) -> u64 {
        self.saves
    }
}

impl ProgressStore for MemoryStore {
    fn save(&mut self, user_id: &str, snapshot: &StateSnapshot) -> Result<(), StoreError> {
        validate_identifier(user_id)?;
        if self.fail_saves {
            return Err(StoreError::Unavailable("memory store set to fail".to_string()));
        }
        self.entries
            .insert(user_id.to_string(), encode_snapshot(snapshot)?);
        self.saves += 1;
        Ok(())
    }

    fn load(&self, user_id: &str) -> Result<Option<StateSnapshot>, StoreError> {
        validate_identifier(user_id)?;
        match self.entries.get(user_id) {
            Some(json) => {
                let snapshot = decode_snapshot(json)?;
                snapshot.verify()?;
                Ok(Some(snapshot))
            }
            None => Ok(None),
        }
    }
}
