//! Progression Engine — Arithmetic Primitives
//!
//! Authoritative quantities (points, levels) are unsigned integers.
//! Fractional multipliers are fixed-point tenths (SCALE = 10), so
//! `1.5` is stored as `15`.

use crate::error::{InvalidEventError, ProgressionError, Result};

/// Fixed-point scale factor for multipliers.
pub const SCALE: u64 = 10;

/// Checked addition. Overflow is an error, never a wrap.
pub fn checked_add(a: u64, b: u64) -> Result<u64> {
    a.checked_add(b)
        .ok_or(ProgressionError::Overflow { a, op: '+', b })
}

/// Checked multiplication.
pub fn checked_mul(a: u64, b: u64) -> Result<u64> {
    a.checked_mul(b)
        .ok_or(ProgressionError::Overflow { a, op: '*', b })
}

/// `floor(value * multiplier / SCALE)` for a fixed-point multiplier.
pub fn scale_floor(value: u64, multiplier: u64) -> Result<u64> {
    Ok(checked_mul(value, multiplier)? / SCALE)
}

/// Reject scores outside the 1..=10 band used by evidence, impact,
/// intensity and urgency.
pub fn validate_score(field: &'static str, value: u8) -> std::result::Result<u8, InvalidEventError> {
    if (1..=10).contains(&value) {
        Ok(value)
    } else {
        Err(InvalidEventError::ScoreOutOfRange { field, value })
    }
}

/// Validate that an identifier matches `[a-zA-Z0-9_-]+`.
pub fn validate_identifier(id: &str) -> std::result::Result<(), InvalidEventError> {
    if id.is_empty()
        || !id
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
    {
        return Err(InvalidEventError::InvalidIdentifier(id.to_string()));
    }
    Ok(())
}
