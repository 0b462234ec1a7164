//! Progression Engine — Event Definitions
//!
//! Events are pure data. They carry intent and payload only and
//! contain no transition logic. Time is carried on the envelope: the
//! core never reads a clock.
//!
//! Schema version is locked at 1. Envelopes with another version are
//! rejected by the engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Archetype, EvidenceCategory, SessionSlot};

/// Schema version for v1 events.
pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Every user action the reducer understands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum Event {
    CompleteSession {
        day_index: u32,
        slot: SessionSlot,
        #[serde(default)]
        insight: Option<String>,
    },
    LogEvidence {
        category: EvidenceCategory,
        description: String,
        significance: u8,
    },
    CompleteRealWorldAction {
        action_ref: String,
        description: String,
        /// Falls back to the state's archetype, then to visionary.
        #[serde(default)]
        archetype: Option<Archetype>,
    },
    CompleteEmbodimentPractice {
        practice_name: String,
        intensity: u8,
        #[serde(default)]
        insight_text: String,
    },
    GenerateMission {
        archetype: Archetype,
        level: u8,
        /// Caller-chosen index into the directive candidates (taken
        /// modulo their count).
        #[serde(default)]
        directive_choice: usize,
    },
    CompleteMission,
    ChangeDay {
        day_index: u32,
    },
    UnlockSkill {
        skill_id: String,
    },
    RecordOracleMessage {
        kind: String,
        message: String,
        urgency: u8,
    },
}

impl Event {
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::CompleteSession { .. } => "complete_session",
            Event::LogEvidence { .. } => "log_evidence",
            Event::CompleteRealWorldAction { .. } => "complete_real_world_action",
            Event::CompleteEmbodimentPractice { .. } => "complete_embodiment_practice",
            Event::GenerateMission { .. } => "generate_mission",
            Event::CompleteMission => "complete_mission",
            Event::ChangeDay { .. } => "change_day",
            Event::UnlockSkill { .. } => "unlock_skill",
            Event::RecordOracleMessage { .. } => "record_oracle_message",
        }
    }
}

/// Sequenced, timestamped wrapper around an `Event`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventEnvelope {
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub event: Event,
}

impl EventEnvelope {
    pub fn new(sequence: u64, timestamp: DateTime<Utc>, event: Event) -> Self {
        Self {
            sequence,
            timestamp,
            schema_version: SCHEMA_VERSION,
            event,
        }
    }
}
