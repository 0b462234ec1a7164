//! Progression Engine — Derived Views
//!
//! Stateless presentation helpers. None of these mutate state and
//! none of them are consulted by the reducer except `classify_practice`.

use chrono::{DateTime, TimeDelta, Utc};

use crate::domain::{
    EmbodimentCategory, EvidenceEntry, MasteryLevel, Mission, ProgressState,
    ProgressionConstants, MAX_ARCHETYPE_LEVEL, PROGRAM_DAYS,
};

/// Integer division rounding half up.
fn round_div(n: u64, d: u64) -> u64 {
    (2 * n + d) / (2 * d)
}

/// Share of the 60-day program completed, rounded to a whole percent.
pub fn journey_completion_percent(state: &ProgressState) -> u32 {
    let done = state.completed_day_indices.len() as u64;
    round_div(done.saturating_mul(100), u64::from(PROGRAM_DAYS)) as u32
}

pub fn day_completion_percent(state: &ProgressState, day: u32) -> u32 {
    let set = u64::from(state.day_progress(day).completed_count());
    round_div(set * 100, 3) as u32
}

pub fn phase_for_day(day: u32) -> Option<MasteryLevel> {
    match day {
        1..=14 => Some(MasteryLevel::Foundation),
        15..=28 => Some(MasteryLevel::Activation),
        29..=42 => Some(MasteryLevel::Integration),
        43..=56 => Some(MasteryLevel::Mastery),
        57..=PROGRAM_DAYS => Some(MasteryLevel::Transcendence),
        _ => None,
    }
}

pub fn phase_name(day: u32) -> Option<&'static str> {
    phase_for_day(day).map(|phase| match phase {
        MasteryLevel::Foundation => "Foundation",
        MasteryLevel::Activation => "Activation",
        MasteryLevel::Integration => "Integration",
        MasteryLevel::Mastery => "Mastery",
        MasteryLevel::Transcendence => "Transcendence",
    })
}

// ── Missions ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRemaining {
    Remaining { hours: i64, minutes: i64 },
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissionStatus {
    Active,
    Expired,
    Completed,
}

pub fn mission_time_remaining(mission: &Mission, now: DateTime<Utc>) -> TimeRemaining {
    let left = mission.deadline.signed_duration_since(now);
    if left <= TimeDelta::zero() {
        return TimeRemaining::Expired;
    }
    TimeRemaining::Remaining {
        hours: left.num_hours(),
        minutes: left.num_minutes() % 60,
    }
}

/// 0 with a full day left, rising to 10 as the deadline nears.
pub fn mission_urgency(mission: &Mission, now: DateTime<Utc>) -> u8 {
    const DAY_MS: i64 = 24 * 60 * 60 * 1000;
    let left_ms = mission.deadline.signed_duration_since(now).num_milliseconds();
    if left_ms <= 0 {
        return 10;
    }
    let tenths = left_ms.saturating_mul(10) / DAY_MS;
    (10 - tenths).clamp(0, 10) as u8
}

pub fn mission_status(mission: &Mission, now: DateTime<Utc>) -> MissionStatus {
    if mission.is_complete {
        MissionStatus::Completed
    } else if now >= mission.deadline {
        MissionStatus::Expired
    } else {
        MissionStatus::Active
    }
}

// ── Logs ──────────────────────────────────────────────────────────

/// Entries the presentation layer raises as priority notifications.
pub fn is_high_significance(entry: &EvidenceEntry) -> bool {
    entry.significance >= 8
}

/// Keyword classification of a practice name. First match wins.
pub fn classify_practice(name: &str) -> EmbodimentCategory {
    let lower = name.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| lower.contains(w));
    if has(&["breath"]) {
        EmbodimentCategory::Breathwork
    } else if has(&["movement", "dance", "tai"]) {
        EmbodimentCategory::Movement
    } else if has(&["energy", "chakra", "aura"]) {
        EmbodimentCategory::Energy
    } else if has(&["ground", "earth", "anchor"]) {
        EmbodimentCategory::Grounding
    } else {
        EmbodimentCategory::Integration
    }
}

// ── Levels ────────────────────────────────────────────────────────

/// Points needed to leave the current level; `None` at the top level.
pub fn next_level_threshold(
    state: &ProgressState,
    constants: &ProgressionConstants,
) -> Option<u64> {
    if state.archetype_level >= MAX_ARCHETYPE_LEVEL {
        return None;
    }
    constants
        .level_thresholds
        .get(usize::from(state.archetype_level))
        .copied()
}

/// Progress through the current level band, 0..=100.
pub fn level_progress_percent(state: &ProgressState, constants: &ProgressionConstants) -> u32 {
    let Some(upper) = next_level_threshold(state, constants) else {
        return 100;
    };
    let lower = constants
        .level_thresholds
        .get(usize::from(state.archetype_level.saturating_sub(1)))
        .copied()
        .unwrap_or(0);
    if upper <= lower || state.total_points >= upper {
        return 100;
    }
    let into_band = state.total_points.saturating_sub(lower);
    round_div(into_band.saturating_mul(100), upper - lower).min(100) as u32
}
