//! Session manager — one user's engine with persist-after-apply semantics.
//!
//! Concurrency: `SharedSession` serializes access with a Mutex. There is
//! no global mutable state.
//!
//! Apply-before-persist order:
//!   1. engine.apply(event)  — rejected events change nothing
//!   2. store.save(snapshot) — best effort; failures are logged and dropped

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{info, warn};

use progression_engine::arithmetic::validate_identifier;
use progression_engine::content::StaticCatalog;
use progression_engine::hashing::canonical_hash;
use progression_engine::oracle::{GuidanceChoice, Suggestion};
use progression_engine::state::create_initial_state;
use progression_engine::{
    Archetype, EventEnvelope, ProgressState, ProgressionConstants, ProgressionEngine,
    ProgressionError, TransitionOutcome,
};

use crate::snapshot::{save_snapshot, StateSnapshot};
use crate::store::{ProgressStore, StoreError};

/// A single user's progression, backed by a store.
pub struct UserSession<S: ProgressStore> {
    user_id: String,
    store: S,
    engine: ProgressionEngine,
}

impl<S: ProgressStore> UserSession<S> {
    /// Load the user's state (or start an empty one) and run streak
    /// decay for `today`.
    pub fn open(
        store: S,
        user_id: &str,
        constants: ProgressionConstants,
        today: NaiveDate,
    ) -> Result<Self, StoreError> {
        validate_identifier(user_id)?;
        let engine = match store.load(user_id)? {
            Some(snapshot) => {
                let state = snapshot.restore(&constants)?;
                info!(user = user_id, sequence = snapshot.sequence, "session resumed");
                ProgressionEngine::with_state(StaticCatalog, constants, state, snapshot.sequence)
            }
            None => {
                info!(user = user_id, "session started without stored progress");
                ProgressionEngine::new(StaticCatalog, constants)
            }
        };

        let mut session = Self {
            user_id: user_id.to_string(),
            store,
            engine,
        };
        if session.engine.check_streak_decay(today)? {
            info!(user = user_id, %today, "streak reset on open");
            session.persist();
        }
        Ok(session)
    }

    /// Onboard a new user: fresh state with archetype and goal, saved once.
    pub fn create(
        store: S,
        user_id: &str,
        constants: ProgressionConstants,
        archetype: Option<Archetype>,
        goal: &str,
    ) -> Result<Self, StoreError> {
        validate_identifier(user_id)?;
        let state = create_initial_state(archetype, goal, &constants);
        let mut session = Self {
            user_id: user_id.to_string(),
            store,
            engine: ProgressionEngine::with_state(StaticCatalog, constants, state, 0),
        };
        info!(user = user_id, archetype = ?archetype, "user onboarded");
        session.persist();
        Ok(session)
    }

    /// Apply one event, then persist best-effort.
    ///
    /// Returns (state_clone, outcome). A rejected event is returned as
    /// an error and nothing is persisted.
    pub fn apply(
        &mut self,
        envelope: &EventEnvelope,
    ) -> Result<(ProgressState, TransitionOutcome), ProgressionError> {
        let (state, outcome) = self.engine.apply(envelope)?;
        let state = state.clone();
        if !outcome.no_op {
            self.persist();
        }
        Ok((state, outcome))
    }

    /// Periodic tick: recompute and collect suggestions, then persist.
    pub fn tick(
        &mut self,
        now: DateTime<Utc>,
        guidance: GuidanceChoice,
    ) -> Result<Vec<Suggestion>, ProgressionError> {
        let suggestions = self.engine.on_tick(now, guidance)?;
        self.persist();
        Ok(suggestions)
    }

    /// Write a numbered archive snapshot into `dir`.
    pub fn archive(&self, dir: &Path) -> Result<PathBuf, StoreError> {
        let snapshot = StateSnapshot::take(self.engine.state(), self.engine.last_sequence())?;
        Ok(save_snapshot(dir, &self.user_id, &snapshot)?)
    }

    /// Fire-and-forget save. Failures never reach the caller.
    fn persist(&mut self) {
        let result = StateSnapshot::take(self.engine.state(), self.engine.last_sequence())
            .map_err(StoreError::from)
            .and_then(|snapshot| self.store.save(&self.user_id, &snapshot));
        if let Err(err) = result {
            warn!(
                user = %self.user_id,
                sequence = self.engine.last_sequence(),
                error = %err,
                "progress save failed; continuing"
            );
        }
    }

    pub fn state(&self) -> &ProgressState {
        self.engine.state()
    }

    pub fn current_hash(&self) -> Result<String, ProgressionError> {
        canonical_hash(self.engine.state())
    }

    pub fn current_sequence(&self) -> u64 {
        self.engine.last_sequence()
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

/// Thread-safe session handle using Mutex.
pub struct SharedSession<S: ProgressStore> {
    inner: Mutex<UserSession<S>>,
}

impl<S: ProgressStore> SharedSession<S> {
    pub fn new(session: UserSession<S>) -> Self {
        Self {
            inner: Mutex::new(session),
        }
    }

    /// The engine commits whole states only, so a poisoned lock is
    /// still safe to use.
    fn lock(&self) -> MutexGuard<'_, UserSession<S>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply event under lock.
    pub fn apply(
        &self,
        envelope: &EventEnvelope,
    ) -> Result<(ProgressState, TransitionOutcome), ProgressionError> {
        self.lock().apply(envelope)
    }

    pub fn tick(
        &self,
        now: DateTime<Utc>,
        guidance: GuidanceChoice,
    ) -> Result<Vec<Suggestion>, ProgressionError> {
        self.lock().tick(now, guidance)
    }

    pub fn state(&self) -> ProgressState {
        self.lock().state().clone()
    }

    pub fn current_hash(&self) -> Result<String, ProgressionError> {
        self.lock().current_hash()
    }

    pub fn current_sequence(&self) -> u64 {
        self.lock().current_sequence()
    }

    pub fn into_inner(self) -> UserSession<S> {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}
