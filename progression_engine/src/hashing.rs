//! Progression Engine — Canonical Hashing
//!
//! Deterministic canonical serialization + SHA-256 hashing.
//!
//! Rules:
//!   - `engine_version` is the first field, then `state`
//!   - State fields in declaration order (serde_json `preserve_order`)
//!   - Maps and sets are BTree-backed, so keys come out sorted
//!   - Bounded logs newest first, as stored
//!   - The cached derived field is excluded (it is recomputed, not stored)
//!   - UTF-8 JSON, no whitespace

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::domain::ProgressState;
use crate::error::{ProgressionError, Result};
use crate::ENGINE_VERSION;

/// Canonical serialization of `ProgressState` to UTF-8 JSON bytes.
pub fn canonical_serialize(state: &ProgressState) -> Result<Vec<u8>> {
    let value = build_canonical_value(state)?;
    serde_json::to_vec(&value).map_err(|e| ProgressionError::Encoding(e.to_string()))
}

/// SHA-256 of the canonical serialization. Lowercase hex string.
pub fn canonical_hash(state: &ProgressState) -> Result<String> {
    let bytes = canonical_serialize(state)?;
    Ok(hex_digest(&bytes))
}

/// Lowercase hex SHA-256 of arbitrary bytes.
pub fn hex_digest(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

fn build_canonical_value(state: &ProgressState) -> Result<Value> {
    let state_value =
        serde_json::to_value(state).map_err(|e| ProgressionError::Encoding(e.to_string()))?;

    // engine_version MUST be first: it binds the hash to the rule set.
    let mut root = Map::new();
    root.insert(
        "engine_version".to_string(),
        Value::Number(ENGINE_VERSION.into()),
    );
    root.insert("state".to_string(), state_value);
    Ok(Value::Object(root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derived::recompute;
    use crate::domain::{Archetype, ProgressionConstants};
    use crate::state::create_initial_state;

    #[test]
    fn hash_is_stable_and_lowercase_hex() {
        let s = create_initial_state(Some(Archetype::Creator), "ship it", &ProgressionConstants::default());
        let h1 = canonical_hash(&s).unwrap();
        let h2 = canonical_hash(&s.clone()).unwrap();
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
        assert!(h1.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn engine_version_leads_and_derived_field_is_excluded() {
        let constants = ProgressionConstants::default();
        let s = create_initial_state(None, "", &constants);
        let json = String::from_utf8(canonical_serialize(&s).unwrap()).unwrap();
        assert!(json.starts_with(r#"{"engine_version":1,"state":{"current_day_index":1"#));
        assert!(!json.contains("derived_field"));

        let mut recomputed = recompute(&s, &constants);
        recomputed.derived_field.coherence_level = 42.0;
        assert_eq!(canonical_hash(&s).unwrap(), canonical_hash(&recomputed).unwrap());
    }

    #[test]
    fn any_state_change_changes_hash() {
        let constants = ProgressionConstants::default();
        let a = create_initial_state(None, "", &constants);
        let mut b = a.clone();
        b.total_points = 1;
        assert_ne!(canonical_hash(&a).unwrap(), canonical_hash(&b).unwrap());
    }
}
