//! Progression Engine — Invariant Checks
//!
//! Hard-fail validation. Every check returns `ProgressionError::Invariant`
//! tagged with a stable code on the first failure.
//!
//! `validate_invariants` checks a single state. `validate_transition`
//! checks the monotonic relations between a state and its successor.

use crate::derived::compute_field;
use crate::domain::{ProgressState, ProgressionConstants, MAX_ARCHETYPE_LEVEL, PROGRAM_DAYS};
use crate::error::{ProgressionError, Result};

fn violation(code: &'static str, detail: String) -> ProgressionError {
    ProgressionError::Invariant { code, detail }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run every single-state check. Returns the first failure.
pub fn validate_invariants(state: &ProgressState, constants: &ProgressionConstants) -> Result<()> {
    check_day_range(state)?;
    check_level_range(state)?;
    check_level_points(state, constants)?;
    check_completed_days(state)?;
    check_bounded_logs(state)?;
    check_scores(state)?;
    check_single_mission(state)?;
    check_derived_field(state)?;
    Ok(())
}

/// Check that nothing monotonic moved backwards between `old` and `new`.
pub fn validate_transition(old: &ProgressState, new: &ProgressState) -> Result<()> {
    if new.total_points < old.total_points {
        return Err(violation(
            "points_monotonic",
            format!("total_points fell from {} to {}", old.total_points, new.total_points),
        ));
    }
    if new.archetype_level < old.archetype_level {
        return Err(violation(
            "level_monotonic",
            format!(
                "archetype_level fell from {} to {}",
                old.archetype_level, new.archetype_level
            ),
        ));
    }
    for (day, before) in &old.daily_progress {
        let after = new.day_progress(*day);
        let reverted = (before.morning && !after.morning)
            || (before.midday && !after.midday)
            || (before.evening && !after.evening);
        if reverted {
            return Err(violation(
                "flags_monotonic",
                format!("a session flag on day {} reverted to false", day),
            ));
        }
    }
    if let Some(day) = old.completed_day_indices.difference(&new.completed_day_indices).next() {
        return Err(violation(
            "completed_days_monotonic",
            format!("day {} left completed_day_indices", day),
        ));
    }
    if let Some(id) = old
        .unlocked_achievement_ids
        .difference(&new.unlocked_achievement_ids)
        .next()
    {
        return Err(violation(
            "achievements_monotonic",
            format!("achievement {:?} was removed", id),
        ));
    }
    if let Some(id) = old.unlocked_skills.difference(&new.unlocked_skills).next() {
        return Err(violation(
            "skills_monotonic",
            format!("skill {:?} was removed", id),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Individual checks (private)
// ---------------------------------------------------------------------------

fn in_program(day: u32) -> bool {
    (1..=PROGRAM_DAYS).contains(&day)
}

/// Every day index anywhere in the state lies in 1..=60.
fn check_day_range(state: &ProgressState) -> Result<()> {
    let all_days = std::iter::once(state.current_day_index)
        .chain(state.daily_progress.keys().copied())
        .chain(state.completed_day_indices.iter().copied())
        .chain(state.insights.keys().copied());
    for day in all_days {
        if !in_program(day) {
            return Err(violation(
                "day_range",
                format!("day index {} outside 1..={}", day, PROGRAM_DAYS),
            ));
        }
    }
    Ok(())
}

fn check_level_range(state: &ProgressState) -> Result<()> {
    if !(1..=MAX_ARCHETYPE_LEVEL).contains(&state.archetype_level) {
        return Err(violation(
            "level_range",
            format!("archetype_level {} outside 1..={}", state.archetype_level, MAX_ARCHETYPE_LEVEL),
        ));
    }
    Ok(())
}

/// Level N is only reachable once the level N-1 exit threshold was met.
fn check_level_points(state: &ProgressState, constants: &ProgressionConstants) -> Result<()> {
    let level = usize::from(state.archetype_level);
    if level < 2 {
        return Ok(());
    }
    match constants.level_thresholds.get(level - 1) {
        Some(&required) if state.total_points >= required => Ok(()),
        Some(&required) => Err(violation(
            "level_points",
            format!(
                "level {} requires {} points, state has {}",
                level, required, state.total_points
            ),
        )),
        None => Err(violation(
            "level_points",
            format!("no threshold for level {}", level),
        )),
    }
}

/// D is completed iff all three of D's flags are set.
fn check_completed_days(state: &ProgressState) -> Result<()> {
    for (day, progress) in &state.daily_progress {
        if progress.is_complete() != state.completed_day_indices.contains(day) {
            return Err(violation(
                "completed_days",
                format!(
                    "day {}: flags complete={} but listed={}",
                    day,
                    progress.is_complete(),
                    state.completed_day_indices.contains(day)
                ),
            ));
        }
    }
    for day in &state.completed_day_indices {
        if !state.daily_progress.contains_key(day) {
            return Err(violation(
                "completed_days",
                format!("day {} listed as completed with no progress record", day),
            ));
        }
    }
    Ok(())
}

fn check_bounded_logs(state: &ProgressState) -> Result<()> {
    let logs = [
        ("evidence_entries", state.evidence_entries.len(), state.evidence_entries.capacity()),
        (
            "real_world_action_entries",
            state.real_world_action_entries.len(),
            state.real_world_action_entries.capacity(),
        ),
        (
            "embodiment_sessions",
            state.embodiment_sessions.len(),
            state.embodiment_sessions.capacity(),
        ),
        ("oracle_messages", state.oracle_messages.len(), state.oracle_messages.capacity()),
    ];
    for (name, len, capacity) in logs {
        if len > capacity {
            return Err(violation(
                "bounded_log",
                format!("{} holds {} entries, capacity {}", name, len, capacity),
            ));
        }
    }
    Ok(())
}

fn check_scores(state: &ProgressState) -> Result<()> {
    let score_ok = |v: u8| (1..=10).contains(&v);
    let bad = state
        .evidence_entries
        .iter()
        .find(|e| !score_ok(e.significance))
        .map(|e| (e.id.as_str(), "significance", e.significance))
        .or_else(|| {
            state
                .real_world_action_entries
                .iter()
                .find(|e| !score_ok(e.impact_level))
                .map(|e| (e.id.as_str(), "impact_level", e.impact_level))
        })
        .or_else(|| {
            state
                .embodiment_sessions
                .iter()
                .find(|e| !score_ok(e.intensity))
                .map(|e| (e.id.as_str(), "intensity", e.intensity))
        })
        .or_else(|| {
            state
                .oracle_messages
                .iter()
                .find(|e| !score_ok(e.urgency))
                .map(|e| (e.id.as_str(), "urgency", e.urgency))
        });
    match bad {
        Some((id, field, value)) => Err(violation(
            "score_range",
            format!("{}.{} = {} outside 1..=10", id, field, value),
        )),
        None => Ok(()),
    }
}

fn check_single_mission(state: &ProgressState) -> Result<()> {
    if let Some(mission) = &state.active_mission {
        if !(1..=MAX_ARCHETYPE_LEVEL).contains(&mission.level) {
            return Err(violation(
                "mission_level",
                format!("mission {} has level {}", mission.id, mission.level),
            ));
        }
        if mission.deadline < mission.issued_at {
            return Err(violation(
                "mission_deadline",
                format!("mission {} deadline precedes issue time", mission.id),
            ));
        }
    }
    Ok(())
}

/// The cached field must equal a fresh recompute.
fn check_derived_field(state: &ProgressState) -> Result<()> {
    let fresh = compute_field(state);
    if state.derived_field != fresh {
        return Err(violation(
            "derived_field",
            format!("cached {:?} differs from recomputed {:?}", state.derived_field, fresh),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derived::recompute;
    use crate::domain::{DayProgress, SessionSlot};
    use crate::state::create_initial_state;

    fn code(err: ProgressionError) -> &'static str {
        match err {
            ProgressionError::Invariant { code, .. } => code,
            other => panic!("expected invariant error, got {other:?}"),
        }
    }

    fn valid() -> ProgressState {
        let constants = ProgressionConstants::default();
        recompute(&create_initial_state(None, "", &constants), &constants)
    }

    #[test]
    fn initial_state_is_valid() {
        assert!(validate_invariants(&valid(), &ProgressionConstants::default()).is_ok());
    }

    #[test]
    fn completed_day_without_flags_is_rejected() {
        let mut s = valid();
        s.completed_day_indices.insert(4);
        let err = validate_invariants(&s, &ProgressionConstants::default()).unwrap_err();
        assert_eq!(code(err), "completed_days");

        let mut s = valid();
        let mut progress = DayProgress::default();
        progress.set(SessionSlot::Morning);
        progress.set(SessionSlot::Midday);
        progress.set(SessionSlot::Evening);
        s.daily_progress.insert(4, progress);
        let err = validate_invariants(&s, &ProgressionConstants::default()).unwrap_err();
        assert_eq!(code(err), "completed_days");
    }

    #[test]
    fn day_out_of_range_is_rejected() {
        let mut s = valid();
        s.insights.insert(61, "x".to_string());
        let err = validate_invariants(&s, &ProgressionConstants::default()).unwrap_err();
        assert_eq!(code(err), "day_range");
    }

    #[test]
    fn stale_derived_field_is_rejected() {
        let mut s = valid();
        s.streak_count = 3;
        let err = validate_invariants(&s, &ProgressionConstants::default()).unwrap_err();
        assert_eq!(code(err), "derived_field");
    }

    #[test]
    fn level_without_points_is_rejected() {
        let constants = ProgressionConstants::default();
        let mut s = valid();
        s.archetype_level = 3;
        let err = validate_invariants(&s, &constants).unwrap_err();
        assert_eq!(code(err), "level_points");
    }

    #[test]
    fn transition_rejects_regressions() {
        let old = valid();
        let mut new = old.clone();
        assert!(validate_transition(&old, &new).is_ok());

        let mut richer = old.clone();
        richer.total_points = 10;
        assert_eq!(code(validate_transition(&richer, &new).unwrap_err()), "points_monotonic");

        let mut flagged = old.clone();
        flagged.daily_progress.entry(2).or_default().set(SessionSlot::Midday);
        assert_eq!(code(validate_transition(&flagged, &new).unwrap_err()), "flags_monotonic");

        new.unlocked_achievement_ids.insert("a".to_string());
        assert_eq!(code(validate_transition(&new, &old).unwrap_err()), "achievements_monotonic");
    }
}
