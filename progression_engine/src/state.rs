//! Progression Engine — State Construction

use std::collections::{BTreeMap, BTreeSet};

use crate::bounded::BoundedLog;
use crate::domain::{Archetype, DerivedField, ProgressState, ProgressionConstants};

/// Create the onboarding state: day 1, level 1, zero points, empty
/// logs sized from `constants`.
pub fn create_initial_state(
    archetype: Option<Archetype>,
    goal: &str,
    constants: &ProgressionConstants,
) -> ProgressState {
    ProgressState {
        current_day_index: 1,
        archetype,
        goal: goal.to_string(),
        archetype_level: 1,
        total_points: 0,
        daily_progress: BTreeMap::new(),
        completed_day_indices: BTreeSet::new(),
        streak_count: 0,
        last_active_date: None,
        unlocked_achievement_ids: BTreeSet::new(),
        insights: BTreeMap::new(),
        evidence_entries: BoundedLog::with_capacity(constants.log_capacity),
        real_world_action_entries: BoundedLog::with_capacity(constants.log_capacity),
        embodiment_sessions: BoundedLog::with_capacity(constants.log_capacity),
        oracle_messages: BoundedLog::with_capacity(constants.oracle_capacity),
        active_mission: None,
        unlocked_skills: BTreeSet::new(),
        last_tick_window_open: false,
        derived_field: DerivedField::default(),
    }
}
