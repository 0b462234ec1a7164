//! Integration tests for progression_runtime.
//!
//! All tests use temporary directories for isolation.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use progression_engine::domain::{EvidenceCategory, SessionSlot};
use progression_engine::state::create_initial_state;
use progression_engine::{Archetype, Event, EventEnvelope, ProgressionConstants, ProgressionError};

use progression_runtime::replay::{rebuild_hash, rebuild_state, verify_determinism};
use progression_runtime::snapshot::load_latest_snapshot;
use progression_runtime::{FileStore, RuntimeConfig, UserSession};

/// Create a temp directory for a test.
fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir()
        .join("progression_runtime_tests")
        .join(name);
    if dir.exists() {
        fs::remove_dir_all(&dir).ok();
    }
    fs::create_dir_all(&dir).expect("Failed to create temp dir");
    dir
}

fn config_for(dir: &PathBuf, extra: &str) -> RuntimeConfig {
    let json = format!(r#"{{"data_dir": {:?}{}}}"#, dir.to_string_lossy(), extra);
    RuntimeConfig::from_json(&json).expect("config should parse")
}

fn at(day: u32, minute: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 1, 6, 0, 0).unwrap()
        + Duration::days(i64::from(day) - 1)
        + Duration::minutes(minute)
}

/// A two-day stream with evidence, a mission and a skill.
fn sample_events() -> Vec<EventEnvelope> {
    let mut events = Vec::new();
    let mut push = |timestamp: DateTime<Utc>, event: Event| {
        let seq = events.len() as u64 + 1;
        events.push(EventEnvelope::new(seq, timestamp, event));
    };
    for (i, slot) in [SessionSlot::Morning, SessionSlot::Midday, SessionSlot::Evening]
        .into_iter()
        .enumerate()
    {
        push(
            at(1, i as i64 * 60),
            Event::CompleteSession {
                day_index: 1,
                slot,
                insight: Some(format!("note {}", i)),
            },
        );
    }
    push(
        at(1, 200),
        Event::LogEvidence {
            category: EvidenceCategory::Synchronicity,
            description: "met the right person twice".to_string(),
            significance: 8,
        },
    );
    push(
        at(1, 210),
        Event::GenerateMission {
            archetype: Archetype::Warrior,
            level: 1,
            directive_choice: 2,
        },
    );
    push(at(1, 400), Event::CompleteMission);
    push(at(2, 0), Event::ChangeDay { day_index: 2 });
    push(
        at(2, 10),
        Event::UnlockSkill {
            skill_id: "breath_control".to_string(),
        },
    );
    push(
        at(2, 20),
        Event::CompleteSession {
            day_index: 2,
            slot: SessionSlot::Morning,
            insight: None,
        },
    );
    events
}

// ─────────────────────────────────────────────────────────────
// Replay
// ─────────────────────────────────────────────────────────────

#[test]
fn replay_matches_live_file_session() {
    let dir = temp_dir("replay_matches_live");
    let config = config_for(&dir, "");
    let events = sample_events();

    let mut session = UserSession::create(
        config.file_store(),
        "warrior-1",
        config.constants.clone(),
        Some(Archetype::Warrior),
        "courage",
    )
    .unwrap();
    for envelope in &events {
        session.apply(envelope).unwrap();
    }

    let genesis = create_initial_state(Some(Archetype::Warrior), "courage", &config.constants);
    let (state, hash) = rebuild_state(&genesis, &config.constants, &events).unwrap();
    assert_eq!(&state, session.state());
    assert_eq!(hash, session.current_hash().unwrap());
    assert!(state.unlocked_skills.contains("breath_control"));
    assert!(state.unlocked_achievement_ids.contains("day_1_complete"));
    assert!(state.active_mission.as_ref().is_some_and(|m| m.is_complete));
}

#[test]
fn replay_is_deterministic() {
    let constants = ProgressionConstants::default();
    let genesis = create_initial_state(Some(Archetype::Mystic), "stillness", &constants);
    let report = verify_determinism(&genesis, &constants, &sample_events()).unwrap();
    assert!(report.is_deterministic());
    assert_eq!(report.events, 9);
    assert_eq!(report.first_hash.len(), 64);
}

#[test]
fn replay_depends_on_genesis() {
    let constants = ProgressionConstants::default();
    let events = sample_events();
    let a = create_initial_state(Some(Archetype::Mystic), "stillness", &constants);
    let b = create_initial_state(Some(Archetype::Creator), "stillness", &constants);
    assert_ne!(
        rebuild_hash(&a, &constants, &events).unwrap(),
        rebuild_hash(&b, &constants, &events).unwrap()
    );
}

#[test]
fn replay_rejects_sequence_gap() {
    let constants = ProgressionConstants::default();
    let genesis = create_initial_state(None, "", &constants);
    let mut events = sample_events();
    events.remove(3);
    let err = rebuild_state(&genesis, &constants, &events).unwrap_err();
    assert_eq!(err, ProgressionError::Sequence { expected: 4, got: 5 });
}

// ─────────────────────────────────────────────────────────────
// Sessions over FileStore
// ─────────────────────────────────────────────────────────────

#[test]
fn file_session_survives_restart() {
    let dir = temp_dir("restart");
    let config = config_for(&dir, "");
    let events = sample_events();
    let (first, rest) = events.split_at(5);

    let mut session = UserSession::create(
        config.file_store(),
        "cy",
        config.constants.clone(),
        Some(Archetype::Visionary),
        "",
    )
    .unwrap();
    for envelope in first {
        session.apply(envelope).unwrap();
    }
    let hash_before = session.current_hash().unwrap();
    drop(session);
    assert!(dir.join("progress-cy.json").exists());

    // Restart with a fresh store handle on the same directory.
    let today = NaiveDate::from_ymd_opt(2026, 4, 2).unwrap();
    let mut resumed =
        UserSession::open(FileStore::new(&dir), "cy", config.constants.clone(), today).unwrap();
    assert_eq!(resumed.current_sequence(), 5);
    assert_eq!(resumed.current_hash().unwrap(), hash_before);
    for envelope in rest {
        resumed.apply(envelope).unwrap();
    }

    let genesis = create_initial_state(Some(Archetype::Visionary), "", &config.constants);
    let expected = rebuild_hash(&genesis, &config.constants, &events).unwrap();
    assert_eq!(resumed.current_hash().unwrap(), expected);
}

#[test]
fn open_unknown_user_starts_empty() {
    let dir = temp_dir("unknown_user");
    let config = config_for(&dir, "");
    let today = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();
    let session = UserSession::open(config.file_store(), "nobody", config.constants, today).unwrap();
    assert_eq!(session.current_sequence(), 0);
    assert_eq!(session.state().total_points, 0);
    assert_eq!(session.state().current_day_index, 1);
}

#[test]
fn archive_restores_exact_state() {
    let dir = temp_dir("archive");
    let config = config_for(&dir, "");
    let mut session = UserSession::create(
        config.file_store(),
        "dee",
        config.constants.clone(),
        Some(Archetype::Creator),
        "make",
    )
    .unwrap();
    for envelope in sample_events() {
        session.apply(&envelope).unwrap();
    }
    let path = session.archive(&config.snapshot_dir()).unwrap();
    assert!(path.starts_with(dir.join("snapshots")));

    let latest = load_latest_snapshot(&config.snapshot_dir(), "dee")
        .unwrap()
        .unwrap();
    assert_eq!(latest.sequence, 9);
    let restored = latest.restore(&config.constants).unwrap();
    assert_eq!(&restored, session.state());
}

#[test]
fn configured_log_capacity_bounds_entries() {
    let dir = temp_dir("log_capacity");
    let config = config_for(&dir, r#", "constants": {"log_capacity": 2}"#);
    let mut session =
        UserSession::create(config.file_store(), "eve", config.constants.clone(), None, "").unwrap();
    for seq in 1..=5u64 {
        let envelope = EventEnvelope::new(
            seq,
            at(1, seq as i64),
            Event::LogEvidence {
                category: EvidenceCategory::EnergyShift,
                description: format!("entry {}", seq),
                significance: 5,
            },
        );
        session.apply(&envelope).unwrap();
    }
    let entries = &session.state().evidence_entries;
    assert_eq!(entries.len(), 2);
    assert_eq!(entries.newest().map(|e| e.description.as_str()), Some("entry 5"));

    // The bounded log survives a restart unchanged.
    let today = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();
    let resumed = UserSession::open(FileStore::new(&dir), "eve", config.constants, today).unwrap();
    assert_eq!(resumed.state().evidence_entries, *entries);
}
