//! Progression Engine — Centralized Transition Logic
//!
//! ALL state-mutation logic lives here.
//! Authoritative math is integer only; multipliers are fixed-point tenths.
//! Content and tunables are read through `RuleSet`, never from globals.

use chrono::{DateTime, TimeDelta, Utc};
use tracing::info;

use crate::achievements::{scan_skill_milestones, unlock_achievement};
use crate::arithmetic::{checked_add, checked_mul, scale_floor, validate_identifier, validate_score};
use crate::content::ContentCatalog;
use crate::derived::recompute_in_place;
use crate::domain::{
    ActionTag, Archetype, EvidenceCategory, EvidenceEntry, EmbodimentSession, Mission,
    OracleMessage, ProgressState, ProgressionConstants, RealWorldActionEntry, SessionSlot,
    TransitionOutcome, MAX_ARCHETYPE_LEVEL, PROGRAM_DAYS,
};
use crate::error::{InvalidEventError, Result};
use crate::events::{Event, EventEnvelope};
use crate::streak::record_day_completion;
use crate::views::classify_practice;

/// Read-only collaborators a transition consults.
#[derive(Clone, Copy)]
pub struct RuleSet<'a> {
    pub catalog: &'a dyn ContentCatalog,
    pub constants: &'a ProgressionConstants,
}

// ---------------------------------------------------------------------------
// Public dispatcher
// ---------------------------------------------------------------------------

/// Apply `envelope` to `state` and return `(new_state, outcome)`.
/// The input state is never mutated; a clone is made first.
/// Every event ends with one recompute pass (level step + derived field).
pub fn apply_event(
    state: &ProgressState,
    envelope: &EventEnvelope,
    rules: RuleSet<'_>,
) -> Result<(ProgressState, TransitionOutcome)> {
    let mut next = state.clone();
    let seq = envelope.sequence;
    let now = envelope.timestamp;

    let mut outcome = match &envelope.event {
        Event::CompleteSession {
            day_index,
            slot,
            insight,
        } => apply_complete_session(&mut next, rules, now, *day_index, *slot, insight.as_deref())?,
        Event::LogEvidence {
            category,
            description,
            significance,
        } => apply_log_evidence(&mut next, seq, now, *category, description, *significance)?,
        Event::CompleteRealWorldAction {
            action_ref,
            description,
            archetype,
        } => apply_real_world_action(&mut next, rules, seq, now, action_ref, description, *archetype)?,
        Event::CompleteEmbodimentPractice {
            practice_name,
            intensity,
            insight_text,
        } => apply_embodiment_practice(&mut next, rules, seq, now, practice_name, *intensity, insight_text)?,
        Event::GenerateMission {
            archetype,
            level,
            directive_choice,
        } => apply_generate_mission(&mut next, rules, seq, now, *archetype, *level, *directive_choice)?,
        Event::CompleteMission => apply_complete_mission(&mut next)?,
        Event::ChangeDay { day_index } => apply_change_day(&mut next, *day_index)?,
        Event::UnlockSkill { skill_id } => apply_unlock_skill(&mut next, rules, skill_id)?,
        Event::RecordOracleMessage {
            kind,
            message,
            urgency,
        } => apply_record_oracle_message(&mut next, seq, now, kind, message, *urgency)?,
    };

    outcome.event_type = envelope.event.event_type().to_string();

    if let Some((level, unlocked)) = recompute_in_place(&mut next, rules.constants) {
        outcome.level_reached = Some(level);
        outcome.newly_unlocked.extend(unlocked);
        outcome.no_op = false;
    }

    Ok((next, outcome))
}

// ---------------------------------------------------------------------------
// Outcome helpers
// ---------------------------------------------------------------------------

fn awarded(points: u64) -> TransitionOutcome {
    TransitionOutcome {
        points_awarded: points,
        ..Default::default()
    }
}

fn no_op(reason: &str) -> TransitionOutcome {
    TransitionOutcome {
        no_op: true,
        reason: reason.to_string(),
        ..Default::default()
    }
}

fn check_day(day: u32) -> std::result::Result<u32, InvalidEventError> {
    if (1..=PROGRAM_DAYS).contains(&day) {
        Ok(day)
    } else {
        Err(InvalidEventError::DayOutOfRange {
            day,
            max: PROGRAM_DAYS,
        })
    }
}

fn non_empty(field: &'static str, text: &str) -> std::result::Result<(), InvalidEventError> {
    if text.trim().is_empty() {
        Err(InvalidEventError::EmptyText(field))
    } else {
        Ok(())
    }
}

fn add_points(state: &mut ProgressState, points: u64) -> Result<()> {
    state.total_points = checked_add(state.total_points, points)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Individual transition handlers (private)
// ---------------------------------------------------------------------------

fn apply_complete_session(
    state: &mut ProgressState,
    rules: RuleSet<'_>,
    now: DateTime<Utc>,
    day: u32,
    slot: SessionSlot,
    insight: Option<&str>,
) -> Result<TransitionOutcome> {
    let day = check_day(day)?;
    let mastery = rules
        .catalog
        .mastery_level(day)
        .ok_or(InvalidEventError::DayOutOfRange {
            day,
            max: PROGRAM_DAYS,
        })?;

    let insight_changed = match insight.map(str::trim).filter(|t| !t.is_empty()) {
        Some(text) => state.insights.insert(day, text.to_string()).as_deref() != Some(text),
        None => false,
    };

    let progress = state.daily_progress.entry(day).or_default();
    if !progress.set(slot) {
        let mut outcome = no_op("session already completed");
        outcome.no_op = !insight_changed;
        return Ok(outcome);
    }
    let day_done = progress.is_complete();

    let points = scale_floor(slot.base_points(rules.constants), mastery.multiplier_tenths())?;
    add_points(state, points)?;

    let mut outcome = awarded(points);
    let slot_key = format!("{}_day_{}", slot.as_str(), day);
    if unlock_achievement(state, &slot_key) {
        outcome.newly_unlocked.push(slot_key);
    }

    if day_done && state.completed_day_indices.insert(day) {
        outcome.day_completed = Some(day);
        outcome.streak_changed = record_day_completion(state, now.date_naive());
        info!(
            day,
            streak = state.streak_count,
            points = state.total_points,
            "day completed"
        );
        let day_key = format!("day_{}_complete", day);
        if unlock_achievement(state, &day_key) {
            outcome.newly_unlocked.push(day_key);
        }
    }

    Ok(outcome)
}

fn apply_log_evidence(
    state: &mut ProgressState,
    seq: u64,
    now: DateTime<Utc>,
    category: EvidenceCategory,
    description: &str,
    significance: u8,
) -> Result<TransitionOutcome> {
    non_empty("description", description)?;
    let significance = validate_score("significance", significance)?;

    state.evidence_entries.push(EvidenceEntry {
        id: format!("evidence-{}", seq),
        timestamp: now,
        category,
        description: description.to_string(),
        significance,
    });

    Ok(awarded(0))
}

/// `clamp(len / chars_per_level, 1, 10)`, with `len` in UTF-16 code
/// units to match the client's string length.
fn impact_level(description: &str, chars_per_level: usize) -> u8 {
    let raw = description.encode_utf16().count() / chars_per_level.max(1);
    raw.clamp(1, 10) as u8
}

fn action_tags(description: &str) -> Vec<ActionTag> {
    let lower = description.to_lowercase();
    let mut tags = Vec::new();
    if lower.contains("synchron") || lower.contains("coinciden") {
        tags.push(ActionTag::Synchronicity);
    }
    if lower.contains("insight") || lower.contains("realiz") {
        tags.push(ActionTag::Insight);
    }
    tags
}

fn apply_real_world_action(
    state: &mut ProgressState,
    rules: RuleSet<'_>,
    seq: u64,
    now: DateTime<Utc>,
    action_ref: &str,
    description: &str,
    archetype: Option<Archetype>,
) -> Result<TransitionOutcome> {
    non_empty("action_ref", action_ref)?;
    non_empty("description", description)?;

    let impact = impact_level(description, rules.constants.impact_chars_per_level);
    let points = checked_mul(u64::from(impact), rules.constants.real_world_points_per_impact)?;
    add_points(state, points)?;

    state.real_world_action_entries.push(RealWorldActionEntry {
        id: format!("action-{}", seq),
        action_ref: action_ref.to_string(),
        archetype: archetype.or(state.archetype).unwrap_or(Archetype::Visionary),
        category: "real_world_action".to_string(),
        description: description.to_string(),
        timestamp: now,
        impact_level: impact,
        tags: action_tags(description),
    });

    Ok(awarded(points))
}

fn apply_embodiment_practice(
    state: &mut ProgressState,
    rules: RuleSet<'_>,
    seq: u64,
    now: DateTime<Utc>,
    practice_name: &str,
    intensity: u8,
    insight_text: &str,
) -> Result<TransitionOutcome> {
    non_empty("practice_name", practice_name)?;
    let intensity = validate_score("intensity", intensity)?;

    let points = checked_mul(
        u64::from(intensity),
        rules.constants.embodiment_points_per_intensity,
    )?;
    add_points(state, points)?;

    state.embodiment_sessions.push(EmbodimentSession {
        id: format!("embodiment-{}", seq),
        practice_name: practice_name.to_string(),
        category: classify_practice(practice_name),
        intensity,
        insight_text: insight_text.to_string(),
        timestamp: now,
        duration_minutes: u32::from(intensity)
            .saturating_mul(rules.constants.embodiment_minutes_per_intensity),
    });

    Ok(awarded(points))
}

fn apply_generate_mission(
    state: &mut ProgressState,
    rules: RuleSet<'_>,
    seq: u64,
    now: DateTime<Utc>,
    archetype: Archetype,
    level: u8,
    directive_choice: usize,
) -> Result<TransitionOutcome> {
    if !(1..=MAX_ARCHETYPE_LEVEL).contains(&level) {
        return Err(InvalidEventError::LevelOutOfRange(level).into());
    }
    if state.active_mission.as_ref().is_some_and(|m| !m.is_complete) {
        return Ok(no_op("mission already active"));
    }

    let candidates = rules.catalog.mission_directives(archetype, level);
    if candidates.is_empty() {
        return Err(InvalidEventError::NoDirective { archetype, level }.into());
    }
    let directive = candidates[directive_choice % candidates.len()].clone();

    let deadline = TimeDelta::try_hours(rules.constants.mission_duration_hours)
        .and_then(|d| now.checked_add_signed(d))
        .ok_or(InvalidEventError::DeadlineOutOfRange)?;
    let reward_points = checked_mul(u64::from(level), rules.constants.mission_reward_per_level)?;

    let mission = Mission {
        id: format!("mission-{}", seq),
        archetype,
        level,
        directive,
        issued_at: now,
        deadline,
        is_complete: false,
        reward_points,
    };
    info!(
        mission = %mission.id,
        %archetype,
        level,
        reward = reward_points,
        "mission generated"
    );
    state.active_mission = Some(mission);

    Ok(awarded(0))
}

fn apply_complete_mission(state: &mut ProgressState) -> Result<TransitionOutcome> {
    let reward = match state.active_mission.as_mut() {
        Some(mission) if !mission.is_complete => {
            mission.is_complete = true;
            info!(mission = %mission.id, reward = mission.reward_points, "mission completed");
            mission.reward_points
        }
        _ => return Ok(no_op("no active mission")),
    };
    add_points(state, reward)?;
    Ok(awarded(reward))
}

fn apply_change_day(state: &mut ProgressState, day: u32) -> Result<TransitionOutcome> {
    let day = check_day(day)?;
    if state.current_day_index == day {
        return Ok(no_op("day already selected"));
    }
    state.current_day_index = day;
    Ok(awarded(0))
}

fn apply_unlock_skill(
    state: &mut ProgressState,
    rules: RuleSet<'_>,
    skill_id: &str,
) -> Result<TransitionOutcome> {
    validate_identifier(skill_id)?;
    if !state.unlocked_skills.insert(skill_id.to_string()) {
        return Ok(no_op("skill already unlocked"));
    }

    let mut outcome = awarded(0);
    let key = format!("skill_unlock_{}", skill_id);
    if unlock_achievement(state, &key) {
        outcome.newly_unlocked.push(key);
    }
    outcome
        .newly_unlocked
        .extend(scan_skill_milestones(state, rules.constants));
    Ok(outcome)
}

fn apply_record_oracle_message(
    state: &mut ProgressState,
    seq: u64,
    now: DateTime<Utc>,
    kind: &str,
    message: &str,
    urgency: u8,
) -> Result<TransitionOutcome> {
    non_empty("kind", kind)?;
    non_empty("message", message)?;
    let urgency = validate_score("urgency", urgency)?;

    state.oracle_messages.push(OracleMessage {
        id: format!("oracle-{}", seq),
        timestamp: now,
        kind: kind.to_string(),
        message: message.to_string(),
        urgency,
    });

    Ok(awarded(0))
}
