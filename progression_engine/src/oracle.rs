//! Periodic tick.
//!
//! The presentation layer calls `on_tick` on its own schedule. The tick
//! recomputes derived fields and returns suggestions; it never records
//! them. A suggestion is persisted only when the caller feeds it back
//! as a `RecordOracleMessage` event.

use chrono::{DateTime, TimeDelta, Utc};

use crate::content::ContentCatalog;
use crate::derived::recompute_in_place;
use crate::domain::{Archetype, ProgressState, ProgressionConstants};
use crate::events::Event;
use crate::views::phase_for_day;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionKind {
    ManifestationWindow,
    MasteryGuidance,
    ArchetypeGuidance,
    RealityShift,
    MasteryTransition,
    QuantumUpgrade,
    ArchetypeEvolution,
}

impl SuggestionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionKind::ManifestationWindow => "manifestation_window",
            SuggestionKind::MasteryGuidance => "mastery_guidance",
            SuggestionKind::ArchetypeGuidance => "archetype_guidance",
            SuggestionKind::RealityShift => "reality_shift",
            SuggestionKind::MasteryTransition => "mastery_transition",
            SuggestionKind::QuantumUpgrade => "quantum_upgrade",
            SuggestionKind::ArchetypeEvolution => "archetype_evolution",
        }
    }

    pub fn urgency(&self) -> u8 {
        match self {
            SuggestionKind::ManifestationWindow => 9,
            SuggestionKind::MasteryGuidance => 6,
            SuggestionKind::ArchetypeGuidance => 5,
            SuggestionKind::RealityShift => 8,
            SuggestionKind::MasteryTransition => 8,
            SuggestionKind::QuantumUpgrade => 9,
            SuggestionKind::ArchetypeEvolution => 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub kind: SuggestionKind,
    pub message: String,
    pub urgency: u8,
}

impl Suggestion {
    fn new(kind: SuggestionKind, message: String) -> Self {
        Self {
            kind,
            message,
            urgency: kind.urgency(),
        }
    }

    /// The event that records this suggestion in the oracle log.
    pub fn into_event(self) -> Event {
        Event::RecordOracleMessage {
            kind: self.kind.as_str().to_string(),
            message: self.message,
            urgency: self.urgency,
        }
    }
}

/// Caller-drawn choices for the optional guidance messages.
///
/// `None` skips that message. `Some(i)` picks candidate `i` modulo the
/// candidate count, like `directive_choice` on missions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GuidanceChoice {
    pub mastery: Option<usize>,
    pub archetype: Option<usize>,
}

fn pick(candidates: Vec<String>, choice: Option<usize>) -> Option<String> {
    let choice = choice?;
    if candidates.is_empty() {
        return None;
    }
    let len = candidates.len();
    candidates.into_iter().nth(choice % len)
}

/// One tick at `now`. Returns the recomputed state and any suggestions.
///
/// The manifestation window is reported when it opens relative to the
/// previous tick, not the previous event: `last_tick_window_open` is
/// written here only.
pub fn on_tick(
    state: &ProgressState,
    now: DateTime<Utc>,
    guidance: GuidanceChoice,
    catalog: &dyn ContentCatalog,
    constants: &ProgressionConstants,
) -> (ProgressState, Vec<Suggestion>) {
    let mut next = state.clone();
    let evolved = recompute_in_place(&mut next, constants);
    let window_open = next.derived_field.manifestation_window_open;
    let mut suggestions = Vec::new();

    if window_open && !state.last_tick_window_open {
        suggestions.push(Suggestion::new(
            SuggestionKind::ManifestationWindow,
            "MANIFESTATION WINDOW OPEN: reality is highly malleable. Your intentions have maximum power now."
                .to_string(),
        ));
    }
    next.last_tick_window_open = window_open;

    let day = next.current_day_index;
    if let Some(message) = pick(catalog.mastery_guidance(day), guidance.mastery) {
        suggestions.push(Suggestion::new(SuggestionKind::MasteryGuidance, message));
    }
    let archetype = next.archetype.unwrap_or(Archetype::Visionary);
    let archetype_lines = catalog.archetype_guidance(archetype, next.archetype_level);
    if let Some(message) = pick(archetype_lines, guidance.archetype) {
        suggestions.push(Suggestion::new(SuggestionKind::ArchetypeGuidance, message));
    }

    let window = TimeDelta::try_hours(constants.reality_shift_window_hours).unwrap_or(TimeDelta::MAX);
    let recent = next
        .evidence_entries
        .iter()
        .filter(|e| {
            let age = now.signed_duration_since(e.timestamp);
            age >= TimeDelta::zero() && age < window
        })
        .count();
    if recent >= constants.reality_shift_min_entries {
        suggestions.push(Suggestion::new(
            SuggestionKind::RealityShift,
            format!(
                "QUANTUM COHERENCE DETECTED: {} reality shifts logged in {} hours. The field is responding.",
                recent, constants.reality_shift_window_hours
            ),
        ));
    }

    if let Some(content) = catalog.day(day) {
        if let Some(expected) = phase_for_day(day).filter(|p| *p != content.mastery_level) {
            suggestions.push(Suggestion::new(
                SuggestionKind::MasteryTransition,
                format!(
                    "CONSCIOUSNESS EVOLUTION: transitioning from {} to {} level mastery. Prepare for accelerated growth.",
                    content.mastery_level.as_str(),
                    expected.as_str()
                ),
            ));
        }
        if day % 7 == 0 {
            if let Some(upgrade) = content.quantum_upgrade {
                suggestions.push(Suggestion::new(
                    SuggestionKind::QuantumUpgrade,
                    format!("QUANTUM UPGRADE COMPLETE: {}", upgrade),
                ));
            }
        }
    }

    if let Some((level, _)) = evolved {
        let who = next
            .archetype
            .map(|a| catalog.profile(a).name.to_uppercase())
            .unwrap_or_else(|| "SEEKER".to_string());
        suggestions.push(Suggestion::new(
            SuggestionKind::ArchetypeEvolution,
            format!(
                "ARCHETYPE EVOLUTION COMPLETE: you are now {} LEVEL {}. New powers unlocked.",
                who, level
            ),
        ));
    }

    (next, suggestions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::StaticCatalog;
    use crate::domain::{EvidenceCategory, EvidenceEntry, MasteryLevel};
    use crate::state::create_initial_state;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    fn evidence(age_hours: i64, category: EvidenceCategory) -> EvidenceEntry {
        EvidenceEntry {
            id: format!("evidence-{}", age_hours),
            timestamp: now() - TimeDelta::hours(age_hours),
            category,
            description: "sign".to_string(),
            significance: 6,
        }
    }

    fn kinds(suggestions: &[Suggestion]) -> Vec<SuggestionKind> {
        suggestions.iter().map(|s| s.kind).collect()
    }

    #[test]
    fn quiet_state_emits_nothing() {
        let constants = ProgressionConstants::default();
        let s = create_initial_state(Some(Archetype::Visionary), "", &constants);
        let (_, suggestions) = on_tick(&s, now(), GuidanceChoice::default(), &StaticCatalog, &constants);
        assert!(suggestions.is_empty());
    }

    #[test]
    fn reality_shift_counts_recent_entries_only() {
        let constants = ProgressionConstants::default();
        let mut s = create_initial_state(None, "", &constants);
        s.evidence_entries.push(evidence(30, EvidenceCategory::Insight));
        s.evidence_entries.push(evidence(5, EvidenceCategory::Insight));
        s.evidence_entries.push(evidence(2, EvidenceCategory::Insight));
        let (_, suggestions) = on_tick(&s, now(), GuidanceChoice::default(), &StaticCatalog, &constants);
        assert!(suggestions.is_empty());

        s.evidence_entries.push(evidence(1, EvidenceCategory::Insight));
        let (_, suggestions) = on_tick(&s, now(), GuidanceChoice::default(), &StaticCatalog, &constants);
        assert_eq!(kinds(&suggestions), vec![SuggestionKind::RealityShift]);
        assert_eq!(suggestions[0].urgency, 8);
    }

    #[test]
    fn reality_shift_ignores_entries_dated_after_now() {
        let constants = ProgressionConstants::default();
        let mut s = create_initial_state(None, "", &constants);
        s.evidence_entries.push(evidence(1, EvidenceCategory::Insight));
        s.evidence_entries.push(evidence(-2, EvidenceCategory::Insight));
        s.evidence_entries.push(evidence(-5, EvidenceCategory::Insight));
        let (_, suggestions) = on_tick(&s, now(), GuidanceChoice::default(), &StaticCatalog, &constants);
        assert!(suggestions.is_empty());
    }

    #[test]
    fn guidance_uses_caller_choice() {
        let constants = ProgressionConstants::default();
        let mut s = create_initial_state(Some(Archetype::Mystic), "", &constants);
        s.current_day_index = 8;
        let choice = GuidanceChoice {
            mastery: Some(4),
            archetype: Some(0),
        };
        let (_, suggestions) = on_tick(&s, now(), choice, &StaticCatalog, &constants);
        assert_eq!(
            kinds(&suggestions),
            vec![SuggestionKind::MasteryGuidance, SuggestionKind::ArchetypeGuidance]
        );
        assert_eq!(
            suggestions[0].message,
            "Your Earth element work is creating lasting neural pathways. Trust the process."
        );
        assert_eq!(suggestions[0].urgency, 6);
        assert_eq!(
            suggestions[1].message,
            StaticCatalog.archetype_guidance(Archetype::Mystic, 1)[0]
        );
        assert_eq!(suggestions[1].urgency, 5);

        let only_archetype = GuidanceChoice {
            mastery: None,
            archetype: Some(7),
        };
        let (_, suggestions) = on_tick(&s, now(), only_archetype, &StaticCatalog, &constants);
        assert_eq!(kinds(&suggestions), vec![SuggestionKind::ArchetypeGuidance]);
    }

    #[test]
    fn archetype_guidance_falls_back_to_visionary() {
        let constants = ProgressionConstants::default();
        let s = create_initial_state(None, "", &constants);
        let choice = GuidanceChoice {
            mastery: None,
            archetype: Some(1),
        };
        let (_, suggestions) = on_tick(&s, now(), choice, &StaticCatalog, &constants);
        assert_eq!(
            suggestions[0].message,
            StaticCatalog.archetype_guidance(Archetype::Visionary, 1)[1]
        );
    }

    /// Built-in content, except day 20 is tagged foundation.
    struct LaggingCatalog;

    static BUILTIN: StaticCatalog = StaticCatalog;

    impl ContentCatalog for LaggingCatalog {
        fn day(&self, day: u32) -> Option<crate::content::DayContent> {
            StaticCatalog.day(day).map(|mut content| {
                if day == 20 {
                    content.mastery_level = MasteryLevel::Foundation;
                }
                content
            })
        }

        fn profile(&self, archetype: Archetype) -> &crate::content::ArchetypeProfile {
            BUILTIN.profile(archetype)
        }

        fn day_missions(&self, archetype: Archetype, day: u32) -> Vec<String> {
            StaticCatalog.day_missions(archetype, day)
        }
    }

    #[test]
    fn mastery_transition_when_day_content_lags_its_week() {
        let constants = ProgressionConstants::default();
        let mut s = create_initial_state(None, "", &constants);
        s.current_day_index = 20;
        let (_, suggestions) = on_tick(&s, now(), GuidanceChoice::default(), &LaggingCatalog, &constants);
        assert_eq!(kinds(&suggestions), vec![SuggestionKind::MasteryTransition]);
        assert!(suggestions[0].message.contains("from foundation to activation"));

        let (_, suggestions) = on_tick(&s, now(), GuidanceChoice::default(), &StaticCatalog, &constants);
        assert!(suggestions.is_empty());
    }

    #[test]
    fn evolution_is_reported_once_per_level() {
        let constants = ProgressionConstants::default();
        let mut s = create_initial_state(Some(Archetype::Warrior), "", &constants);
        s.total_points = 6000;
        let (s, suggestions) = on_tick(&s, now(), GuidanceChoice::default(), &StaticCatalog, &constants);
        assert_eq!(s.archetype_level, 2);
        assert_eq!(kinds(&suggestions), vec![SuggestionKind::ArchetypeEvolution]);
        assert!(suggestions[0].message.contains("LEVEL 2"));

        let (_, suggestions) = on_tick(&s, now(), GuidanceChoice::default(), &StaticCatalog, &constants);
        assert!(suggestions.is_empty());
    }

    #[test]
    fn window_opening_fires_on_transition_only() {
        let constants = ProgressionConstants::default();
        let mut s = create_initial_state(None, "", &constants);
        s.current_day_index = 30;
        s.streak_count = 10;
        s.total_points = 30_000;
        s.archetype_level = 3;
        for hours in [40, 41, 42, 43] {
            s.evidence_entries.push(evidence(hours, EvidenceCategory::Manifestation));
        }
        let (s, suggestions) = on_tick(&s, now(), GuidanceChoice::default(), &StaticCatalog, &constants);
        assert!(s.derived_field.manifestation_window_open);
        assert!(kinds(&suggestions).contains(&SuggestionKind::ManifestationWindow));

        let (_, suggestions) = on_tick(&s, now(), GuidanceChoice::default(), &StaticCatalog, &constants);
        assert!(!kinds(&suggestions).contains(&SuggestionKind::ManifestationWindow));
    }

    #[test]
    fn quantum_upgrade_on_week_boundary() {
        let constants = ProgressionConstants::default();
        let mut s = create_initial_state(None, "", &constants);
        s.current_day_index = 14;
        let (_, suggestions) = on_tick(&s, now(), GuidanceChoice::default(), &StaticCatalog, &constants);
        assert_eq!(kinds(&suggestions), vec![SuggestionKind::QuantumUpgrade]);
        assert!(suggestions[0].message.contains("Week 2"));
    }

    #[test]
    fn suggestion_becomes_oracle_event() {
        let suggestion = Suggestion::new(SuggestionKind::RealityShift, "m".to_string());
        assert_eq!(
            suggestion.into_event(),
            Event::RecordOracleMessage {
                kind: "reality_shift".to_string(),
                message: "m".to_string(),
                urgency: 8,
            }
        );
    }
}
