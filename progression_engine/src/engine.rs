//! Progression Engine — Engine
//!
//! Top-level orchestrator and the only mutation path for a
//! `ProgressState`. Delegates mutation to transitions, validates via
//! invariants, and commits only when every check passes.
//!
//! Strict sequence enforcement: sequences start at 1 and increase by
//! exactly one per applied event.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;

use crate::content::{ContentCatalog, StaticCatalog};
use crate::derived::compute_field;
use crate::domain::{Archetype, ProgressState, ProgressionConstants, TransitionOutcome};
use crate::error::{ProgressionError, Result};
use crate::events::{EventEnvelope, SCHEMA_VERSION};
use crate::invariants::{validate_invariants, validate_transition};
use crate::oracle::{on_tick, GuidanceChoice, Suggestion};
use crate::state::create_initial_state;
use crate::streak::check_streak_decay;
use crate::transitions::{apply_event, RuleSet};

/// Stateful engine wrapping the pure transition layer.
pub struct ProgressionEngine<C: ContentCatalog = StaticCatalog> {
    catalog: C,
    constants: ProgressionConstants,
    /// State and sequence the engine started from; `replay` resets to them.
    genesis: ProgressState,
    genesis_sequence: u64,
    state: ProgressState,
    last_sequence: u64,
}

impl ProgressionEngine<StaticCatalog> {
    /// Onboarding shortcut: built-in content and default constants.
    pub fn onboard(archetype: Option<Archetype>, goal: &str) -> Self {
        let constants = ProgressionConstants::default();
        let state = create_initial_state(archetype, goal, &constants);
        Self::with_state(StaticCatalog, constants, state, 0)
    }
}

impl<C: ContentCatalog> ProgressionEngine<C> {
    /// Fresh engine with an empty initial state and no archetype.
    pub fn new(catalog: C, constants: ProgressionConstants) -> Self {
        let state = create_initial_state(None, "", &constants);
        Self::with_state(catalog, constants, state, 0)
    }

    /// Resume from an existing state. The derived field is recomputed
    /// from the rest of the state; the cached value is ignored.
    pub fn with_state(
        catalog: C,
        constants: ProgressionConstants,
        state: ProgressState,
        last_sequence: u64,
    ) -> Self {
        let mut state = state;
        state.derived_field = compute_field(&state);
        Self {
            catalog,
            constants,
            genesis: state.clone(),
            genesis_sequence: last_sequence,
            state,
            last_sequence,
        }
    }

    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    pub fn last_sequence(&self) -> u64 {
        self.last_sequence
    }

    pub fn constants(&self) -> &ProgressionConstants {
        &self.constants
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn into_state(self) -> ProgressState {
        self.state
    }

    fn rules(&self) -> RuleSet<'_> {
        RuleSet {
            catalog: &self.catalog,
            constants: &self.constants,
        }
    }

    /// Apply a single event:
    ///   1. Validate schema version (must be 1)
    ///   2. Validate sequence (strictly increasing, no gaps)
    ///   3. Delegate to transitions (handler + recompute)
    ///   4. Validate state and transition invariants
    ///   5. Commit and return
    ///
    /// On any error the engine state is left unchanged.
    pub fn apply(&mut self, envelope: &EventEnvelope) -> Result<(&ProgressState, TransitionOutcome)> {
        if envelope.schema_version != SCHEMA_VERSION {
            return Err(ProgressionError::SchemaVersion {
                expected: SCHEMA_VERSION,
                got: envelope.schema_version,
            });
        }

        let expected = self.last_sequence.checked_add(1).ok_or(ProgressionError::Overflow {
            a: self.last_sequence,
            op: '+',
            b: 1,
        })?;
        if envelope.sequence != expected {
            return Err(ProgressionError::Sequence {
                expected,
                got: envelope.sequence,
            });
        }

        let (next, outcome) = apply_event(&self.state, envelope, self.rules())?;
        self.commit(next)?;
        self.last_sequence = envelope.sequence;

        debug!(
            sequence = envelope.sequence,
            event = outcome.event_type.as_str(),
            no_op = outcome.no_op,
            points = outcome.points_awarded,
            total = self.state.total_points,
            "event applied"
        );
        Ok((&self.state, outcome))
    }

    /// Apply an ordered sequence of events. Stops at the first error;
    /// events before it stay applied.
    pub fn apply_sequence(&mut self, events: &[EventEnvelope]) -> Result<&ProgressState> {
        for envelope in events {
            self.apply(envelope)?;
        }
        Ok(&self.state)
    }

    /// Event-sourced reconstruction: reset to the starting state and replay.
    pub fn replay(&mut self, events: &[EventEnvelope]) -> Result<&ProgressState> {
        self.state = self.genesis.clone();
        self.last_sequence = self.genesis_sequence;
        self.apply_sequence(events)
    }

    /// Reset the streak if `today` is more than a day past the last
    /// active date. Returns true if the streak was reset.
    ///
    /// Only the streak and the derived field change; level steps are
    /// left to the next event or tick.
    pub fn check_streak_decay(&mut self, today: NaiveDate) -> Result<bool> {
        let mut next = check_streak_decay(&self.state, today);
        let reset = next.streak_count != self.state.streak_count;
        if reset {
            next.derived_field = compute_field(&next);
            validate_invariants(&next, &self.constants)?;
            self.state = next;
        }
        Ok(reset)
    }

    /// Run one periodic tick at `now` and commit the recomputed state.
    pub fn on_tick(
        &mut self,
        now: DateTime<Utc>,
        guidance: GuidanceChoice,
    ) -> Result<Vec<Suggestion>> {
        let (next, suggestions) =
            on_tick(&self.state, now, guidance, &self.catalog, &self.constants);
        self.commit(next)?;
        Ok(suggestions)
    }

    fn commit(&mut self, next: ProgressState) -> Result<()> {
        validate_invariants(&next, &self.constants)?;
        validate_transition(&self.state, &next)?;
        self.state = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EvidenceCategory, SessionSlot};
    use crate::events::Event;
    use crate::oracle::SuggestionKind;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap()
    }

    fn morning(seq: u64, day: u32) -> EventEnvelope {
        EventEnvelope::new(
            seq,
            ts(),
            Event::CompleteSession {
                day_index: day,
                slot: SessionSlot::Morning,
                insight: None,
            },
        )
    }

    #[test]
    fn sequence_must_start_at_one_without_gaps() {
        let mut engine = ProgressionEngine::onboard(Some(Archetype::Creator), "");
        let err = engine.apply(&morning(2, 1)).unwrap_err();
        assert_eq!(err, ProgressionError::Sequence { expected: 1, got: 2 });
        engine.apply(&morning(1, 1)).unwrap();
        let err = engine.apply(&morning(1, 2)).unwrap_err();
        assert_eq!(err, ProgressionError::Sequence { expected: 2, got: 1 });
        assert_eq!(engine.last_sequence(), 1);
    }

    #[test]
    fn schema_version_is_enforced() {
        let mut engine = ProgressionEngine::onboard(None, "");
        let mut env = morning(1, 1);
        env.schema_version = 2;
        assert_eq!(
            engine.apply(&env).unwrap_err(),
            ProgressionError::SchemaVersion { expected: 1, got: 2 }
        );
    }

    #[test]
    fn failed_event_leaves_state_unchanged() {
        let mut engine = ProgressionEngine::onboard(None, "");
        engine.apply(&morning(1, 1)).unwrap();
        let before = engine.state().clone();
        assert!(engine.apply(&morning(2, 0)).is_err());
        assert_eq!(engine.state(), &before);
        assert_eq!(engine.last_sequence(), 1);
        // The failed sequence number is still available.
        engine.apply(&morning(2, 2)).unwrap();
    }

    #[test]
    fn replay_resets_to_genesis() {
        let mut engine = ProgressionEngine::onboard(Some(Archetype::Mystic), "calm");
        let events = vec![morning(1, 1), morning(2, 2)];
        engine.apply_sequence(&events).unwrap();
        let first = engine.state().clone();
        let replayed = engine.replay(&events).unwrap().clone();
        assert_eq!(first, replayed);
        assert_eq!(replayed.goal, "calm");
    }

    #[test]
    fn streak_decay_through_engine() {
        let engine = ProgressionEngine::onboard(None, "");
        let mut state = engine.state().clone();
        state.streak_count = 4;
        state.last_active_date = NaiveDate::from_ymd_opt(2026, 3, 1);
        let mut engine = ProgressionEngine::with_state(StaticCatalog, engine.constants().clone(), state, 0);
        assert!(!engine.check_streak_decay(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()).unwrap());
        assert!(engine.check_streak_decay(NaiveDate::from_ymd_opt(2026, 3, 5).unwrap()).unwrap());
        assert_eq!(engine.state().streak_count, 0);
        assert_eq!(engine.state().derived_field.coherence_level, 0.0);
    }

    #[test]
    fn streak_decay_does_not_step_level() {
        let constants = ProgressionConstants::default();
        let mut state = create_initial_state(Some(Archetype::Warrior), "", &constants);
        state.total_points = 6000;
        state.streak_count = 3;
        state.last_active_date = NaiveDate::from_ymd_opt(2026, 3, 1);
        let mut engine = ProgressionEngine::with_state(StaticCatalog, constants, state, 0);
        assert!(engine.check_streak_decay(NaiveDate::from_ymd_opt(2026, 3, 6).unwrap()).unwrap());
        assert_eq!(engine.state().archetype_level, 1);
        assert!(engine.state().unlocked_achievement_ids.is_empty());

        // The pending step is taken and reported by the next tick.
        let suggestions = engine.on_tick(ts(), GuidanceChoice::default()).unwrap();
        assert_eq!(engine.state().archetype_level, 2);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].kind, SuggestionKind::ArchetypeEvolution);
    }

    #[test]
    fn window_opened_by_events_is_reported_on_next_tick() {
        let constants = ProgressionConstants::default();
        let mut state = create_initial_state(None, "", &constants);
        state.current_day_index = 30;
        state.streak_count = 10;
        state.total_points = 30_000;
        state.archetype_level = 3;
        let mut engine = ProgressionEngine::with_state(StaticCatalog, constants, state, 0);

        let mut windows = 0;
        for seq in 1..=6u64 {
            let at = ts() + chrono::TimeDelta::days(seq as i64 * 2);
            let event = Event::LogEvidence {
                category: EvidenceCategory::Manifestation,
                description: format!("intention {} landed", seq),
                significance: 7,
            };
            engine.apply(&EventEnvelope::new(seq, at, event)).unwrap();
            let suggestions = engine.on_tick(at, GuidanceChoice::default()).unwrap();
            let opened = suggestions
                .iter()
                .any(|s| s.kind == SuggestionKind::ManifestationWindow);
            if opened {
                // Four manifestation entries on day 30 push malleability past 70.
                assert_eq!(seq, 4);
                windows += 1;
            }
        }
        assert_eq!(windows, 1);
        assert!(engine.state().last_tick_window_open);
    }
}
