//! Derived-field recompute.
//!
//! Coherence, malleability and amplification are pure functions of the
//! state, cached on `ProgressState::derived_field` and never persisted.
//! They are presentation values and use f64; nothing authoritative is
//! derived from them.
//!
//! The archetype level advances by at most one step per recompute,
//! even when the points have passed several thresholds.

use tracing::info;

use crate::achievements::unlock_achievement;
use crate::domain::{
    DerivedField, EvidenceCategory, ProgressState, ProgressionConstants, MAX_ARCHETYPE_LEVEL,
};

pub fn coherence_level(state: &ProgressState) -> f64 {
    let streak_bonus = (u64::from(state.streak_count) * 5).min(50) as f64;
    let points_bonus = (state.total_points as f64 / 1000.0).min(30.0);
    let evidence_bonus = (state.evidence_entries.len() as u64 * 2).min(20) as f64;
    let mastery_bonus = match state.current_day_index {
        d if d > 14 => 10.0,
        d if d > 7 => 5.0,
        _ => 0.0,
    };
    (streak_bonus + points_bonus + evidence_bonus + mastery_bonus).clamp(0.0, 100.0)
}

pub fn malleability_level(state: &ProgressState) -> f64 {
    let count = |category: EvidenceCategory| {
        state
            .evidence_entries
            .iter()
            .filter(|e| e.category == category)
            .count() as f64
    };
    let day_multiplier = match state.current_day_index {
        d if d > 28 => 2.0,
        d if d > 14 => 1.5,
        _ => 1.0,
    };
    let raw = count(EvidenceCategory::Manifestation) * 10.0
        + count(EvidenceCategory::Synchronicity) * 5.0;
    (raw * day_multiplier).clamp(0.0, 100.0)
}

pub fn compute_field(state: &ProgressState) -> DerivedField {
    let coherence = coherence_level(state);
    let malleability = malleability_level(state);
    DerivedField {
        coherence_level: coherence,
        manifestation_window_open: coherence > 80.0 && malleability > 70.0,
        amplification_factor: coherence / 50.0,
        malleability_level: malleability,
    }
}

/// Single-step level check. Returns the new level if it advanced.
pub fn advance_archetype_level(
    state: &mut ProgressState,
    constants: &ProgressionConstants,
) -> Option<u8> {
    if state.archetype_level >= MAX_ARCHETYPE_LEVEL {
        return None;
    }
    let threshold = *constants
        .level_thresholds
        .get(usize::from(state.archetype_level))?;
    if state.total_points < threshold {
        return None;
    }
    state.archetype_level += 1;
    info!(
        level = state.archetype_level,
        points = state.total_points,
        "archetype evolved"
    );
    Some(state.archetype_level)
}

/// One recompute pass in place: level step (with its evolution
/// achievement), then the cached derived field.
/// Returns the level reached and the achievement it unlocked.
pub fn recompute_in_place(
    state: &mut ProgressState,
    constants: &ProgressionConstants,
) -> Option<(u8, Option<String>)> {
    let evolved = advance_archetype_level(state, constants).map(|level| {
        let key = format!("archetype_evolution_{}", level);
        let unlocked = unlock_achievement(state, &key).then_some(key);
        (level, unlocked)
    });
    state.derived_field = compute_field(state);
    evolved
}

/// Pure recompute: returns the next state.
pub fn recompute(state: &ProgressState, constants: &ProgressionConstants) -> ProgressState {
    let mut next = state.clone();
    recompute_in_place(&mut next, constants);
    next
}
