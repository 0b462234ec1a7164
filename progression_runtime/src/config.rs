//! Runtime configuration, loaded from a JSON file.
//!
//! Every field is optional in the file; missing fields take defaults.
//! Unknown fields are rejected so typos surface early.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use progression_engine::ProgressionConstants;

use crate::store::FileStore;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Directory holding one progress file per user.
    pub data_dir: PathBuf,
    /// Archive directory for numbered snapshots; `data_dir/snapshots`
    /// when unset.
    pub snapshot_dir: Option<PathBuf>,
    pub constants: ProgressionConstants,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("progress-data"),
            snapshot_dir: None,
            constants: ProgressionConstants::default(),
        }
    }
}

impl RuntimeConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn snapshot_dir(&self) -> PathBuf {
        self.snapshot_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("snapshots"))
    }

    pub fn file_store(&self) -> FileStore {
        FileStore::new(&self.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let config = RuntimeConfig::from_json("{}").unwrap();
        assert_eq!(config, RuntimeConfig::default());
        assert_eq!(config.snapshot_dir(), PathBuf::from("progress-data/snapshots"));
    }

    #[test]
    fn partial_constants_override_only_named_fields() {
        let config = RuntimeConfig::from_json(
            r#"{"data_dir": "/var/lib/progress", "constants": {"log_capacity": 20}}"#,
        )
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/progress"));
        assert_eq!(config.constants.log_capacity, 20);
        assert_eq!(config.constants.oracle_capacity, 10);
        assert_eq!(config.constants.level_thresholds, [0, 5000, 15000, 35000, 75000]);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(matches!(
            RuntimeConfig::from_json(r#"{"data_dirr": "x"}"#),
            Err(ConfigError::Parse(_))
        ));
        assert!(RuntimeConfig::from_json(r#"{"constants": {"bonus": 1}}"#).is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let path = std::env::temp_dir().join("progression_config_tests_missing.json");
        let _ = fs::remove_file(&path);
        match RuntimeConfig::load(&path) {
            Err(ConfigError::Io { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected Io error, got {other:?}"),
        }
    }
}
