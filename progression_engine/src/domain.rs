//! Progression Engine — Core Domain Types
//!
//! Pure data. No transition logic lives here.
//! Points are u64 integers; multipliers are fixed-point tenths.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::bounded::BoundedLog;
use crate::error::InvalidEventError;

/// Number of days in the program.
pub const PROGRAM_DAYS: u32 = 60;

/// Highest reachable archetype level.
pub const MAX_ARCHETYPE_LEVEL: u8 = 5;

// ── Enumerations ──────────────────────────────────────────────────

/// The four user-chosen personas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    Visionary,
    Creator,
    Warrior,
    Mystic,
}

impl Archetype {
    pub const ALL: [Archetype; 4] = [
        Archetype::Visionary,
        Archetype::Creator,
        Archetype::Warrior,
        Archetype::Mystic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Archetype::Visionary => "visionary",
            Archetype::Creator => "creator",
            Archetype::Warrior => "warrior",
            Archetype::Mystic => "mystic",
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Archetype {
    type Err = InvalidEventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Archetype::ALL
            .into_iter()
            .find(|a| a.as_str() == wanted)
            .ok_or_else(|| InvalidEventError::UnknownArchetype(s.to_string()))
    }
}

/// The three daily practice sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionSlot {
    Morning,
    Midday,
    Evening,
}

impl SessionSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionSlot::Morning => "morning",
            SessionSlot::Midday => "midday",
            SessionSlot::Evening => "evening",
        }
    }

    pub fn base_points(&self, constants: &ProgressionConstants) -> u64 {
        match self {
            SessionSlot::Morning => constants.morning_points,
            SessionSlot::Midday => constants.midday_points,
            SessionSlot::Evening => constants.evening_points,
        }
    }
}

/// Content difficulty tier attached to every program day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MasteryLevel {
    Foundation,
    Activation,
    Integration,
    Mastery,
    Transcendence,
}

impl MasteryLevel {
    /// Point multiplier in tenths: 1, 1.5, 2, 3, 5.
    pub fn multiplier_tenths(&self) -> u64 {
        match self {
            MasteryLevel::Foundation => 10,
            MasteryLevel::Activation => 15,
            MasteryLevel::Integration => 20,
            MasteryLevel::Mastery => 30,
            MasteryLevel::Transcendence => 50,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MasteryLevel::Foundation => "foundation",
            MasteryLevel::Activation => "activation",
            MasteryLevel::Integration => "integration",
            MasteryLevel::Mastery => "mastery",
            MasteryLevel::Transcendence => "transcendence",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceCategory {
    Synchronicity,
    Manifestation,
    Insight,
    EnergyShift,
    RealityGlitch,
}

impl EvidenceCategory {
    pub const ALL: [EvidenceCategory; 5] = [
        EvidenceCategory::Synchronicity,
        EvidenceCategory::Manifestation,
        EvidenceCategory::Insight,
        EvidenceCategory::EnergyShift,
        EvidenceCategory::RealityGlitch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EvidenceCategory::Synchronicity => "synchronicity",
            EvidenceCategory::Manifestation => "manifestation",
            EvidenceCategory::Insight => "insight",
            EvidenceCategory::EnergyShift => "energy_shift",
            EvidenceCategory::RealityGlitch => "reality_glitch",
        }
    }
}

/// Keyword-derived tags on a real-world action entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionTag {
    Synchronicity,
    Insight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbodimentCategory {
    Breathwork,
    Movement,
    Energy,
    Grounding,
    Integration,
}

impl EmbodimentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmbodimentCategory::Breathwork => "breathwork",
            EmbodimentCategory::Movement => "movement",
            EmbodimentCategory::Energy => "energy",
            EmbodimentCategory::Grounding => "grounding",
            EmbodimentCategory::Integration => "integration",
        }
    }
}

// ── Records ───────────────────────────────────────────────────────

/// Per-day session flags. Flags only ever flip false -> true.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DayProgress {
    pub morning: bool,
    pub midday: bool,
    pub evening: bool,
}

impl DayProgress {
    /// Set the flag for `slot`. Returns true if it was previously unset.
    pub fn set(&mut self, slot: SessionSlot) -> bool {
        let flag = match slot {
            SessionSlot::Morning => &mut self.morning,
            SessionSlot::Midday => &mut self.midday,
            SessionSlot::Evening => &mut self.evening,
        };
        let changed = !*flag;
        *flag = true;
        changed
    }

    pub fn is_complete(&self) -> bool {
        self.morning && self.midday && self.evening
    }

    pub fn completed_count(&self) -> u32 {
        [self.morning, self.midday, self.evening]
            .iter()
            .filter(|f| **f)
            .count() as u32
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EvidenceEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub category: EvidenceCategory,
    pub description: String,
    pub significance: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RealWorldActionEntry {
    pub id: String,
    pub action_ref: String,
    pub archetype: Archetype,
    pub category: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub impact_level: u8,
    pub tags: Vec<ActionTag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmbodimentSession {
    pub id: String,
    pub practice_name: String,
    pub category: EmbodimentCategory,
    pub intensity: u8,
    pub insight_text: String,
    pub timestamp: DateTime<Utc>,
    pub duration_minutes: u32,
}

/// A timed directive with a completion reward. At most one exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Mission {
    pub id: String,
    pub archetype: Archetype,
    pub level: u8,
    pub directive: String,
    pub issued_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    pub is_complete: bool,
    pub reward_points: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OracleMessage {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub kind: String,
    pub message: String,
    pub urgency: u8,
}

/// Recomputed scores. A cache of a pure function of the rest of the
/// state, never an independent source of truth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedField {
    pub coherence_level: f64,
    pub manifestation_window_open: bool,
    pub amplification_factor: f64,
    pub malleability_level: f64,
}

// ── Constants ─────────────────────────────────────────────────────

/// Achievement unlocked once `required_skills` skills are unlocked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SkillMilestone {
    pub required_skills: usize,
    pub achievement_id: String,
}

/// Every tunable table of the progression rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProgressionConstants {
    /// `level_thresholds[n]` points are required to leave level n.
    pub level_thresholds: [u64; 5],
    pub morning_points: u64,
    pub midday_points: u64,
    pub evening_points: u64,
    pub log_capacity: usize,
    pub oracle_capacity: usize,
    pub mission_duration_hours: i64,
    pub mission_reward_per_level: u64,
    pub real_world_points_per_impact: u64,
    pub impact_chars_per_level: usize,
    pub embodiment_points_per_intensity: u64,
    pub embodiment_minutes_per_intensity: u32,
    pub reality_shift_window_hours: i64,
    pub reality_shift_min_entries: usize,
    pub skill_milestones: Vec<SkillMilestone>,
}

impl Default for ProgressionConstants {
    fn default() -> Self {
        let milestone = |required_skills: usize, id: &str| SkillMilestone {
            required_skills,
            achievement_id: id.to_string(),
        };
        Self {
            level_thresholds: [0, 5000, 15000, 35000, 75000],
            morning_points: 150,
            midday_points: 100,
            evening_points: 200,
            log_capacity: 50,
            oracle_capacity: 10,
            mission_duration_hours: 24,
            mission_reward_per_level: 100,
            real_world_points_per_impact: 50,
            impact_chars_per_level: 20,
            embodiment_points_per_intensity: 100,
            embodiment_minutes_per_intensity: 2,
            reality_shift_window_hours: 24,
            reality_shift_min_entries: 3,
            skill_milestones: vec![
                milestone(1, "first_skill"),
                milestone(5, "skill_collector"),
                milestone(10, "skill_master"),
                milestone(15, "skill_virtuoso"),
                milestone(20, "skill_transcendent"),
            ],
        }
    }
}

// ── Outcome ───────────────────────────────────────────────────────

/// Structured outcome of a single `apply`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub event_type: String,
    /// True when the event changed nothing.
    pub no_op: bool,
    pub points_awarded: u64,
    /// Achievement ids unlocked by this event, in unlock order.
    pub newly_unlocked: Vec<String>,
    pub day_completed: Option<u32>,
    pub streak_changed: bool,
    pub level_reached: Option<u8>,
    pub reason: String,
}

// ── Aggregate ─────────────────────────────────────────────────────

/// The single progression aggregate. Mutated only through the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProgressState {
    pub current_day_index: u32,
    pub archetype: Option<Archetype>,
    pub goal: String,
    pub archetype_level: u8,
    pub total_points: u64,
    pub daily_progress: BTreeMap<u32, DayProgress>,
    pub completed_day_indices: BTreeSet<u32>,
    pub streak_count: u32,
    pub last_active_date: Option<NaiveDate>,
    pub unlocked_achievement_ids: BTreeSet<String>,
    pub insights: BTreeMap<u32, String>,
    pub evidence_entries: BoundedLog<EvidenceEntry>,
    pub real_world_action_entries: BoundedLog<RealWorldActionEntry>,
    pub embodiment_sessions: BoundedLog<EmbodimentSession>,
    pub oracle_messages: BoundedLog<OracleMessage>,
    pub active_mission: Option<Mission>,
    pub unlocked_skills: BTreeSet<String>,
    /// Manifestation window as seen by the last periodic tick.
    #[serde(default)]
    pub last_tick_window_open: bool,
    #[serde(skip)]
    pub derived_field: DerivedField,
}

impl ProgressState {
    pub fn day_progress(&self, day: u32) -> DayProgress {
        self.daily_progress.get(&day).copied().unwrap_or_default()
    }
}
