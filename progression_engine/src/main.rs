//! Progression Engine — Replay Harness
//!
//! Reads a JSON array of event envelopes, replays it twice through
//! fresh engines, and checks that both runs hash identically.
//!
//! Usage: progression_replay <events.json> [archetype] [goal]

use std::error::Error;
use std::fs;
use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use progression_engine::content::ContentCatalog;
use progression_engine::hashing::canonical_hash;
use progression_engine::views::{journey_completion_percent, phase_name};
use progression_engine::{Archetype, EventEnvelope, ProgressionEngine};

fn run_once(
    archetype: Option<Archetype>,
    goal: &str,
    events: &[EventEnvelope],
) -> Result<(String, ProgressionEngine), Box<dyn Error>> {
    let mut engine = ProgressionEngine::onboard(archetype, goal);
    engine.apply_sequence(events)?;
    let hash = canonical_hash(engine.state())?;
    Ok((hash, engine))
}

fn run() -> Result<bool, Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .ok_or("usage: progression_replay <events.json> [archetype] [goal]")?;
    let archetype = args.next().map(|a| a.parse::<Archetype>()).transpose()?;
    let goal = args.next().unwrap_or_default();

    let data = fs::read_to_string(&path)?;
    let events: Vec<EventEnvelope> = serde_json::from_str(&data)?;
    info!(path = %path, events = events.len(), "loaded event stream");

    let (h1, engine) = run_once(archetype, &goal, &events)?;
    let (h2, _) = run_once(archetype, &goal, &events)?;

    let state = engine.state();
    let field = state.derived_field;
    println!("events:      {}", events.len());
    println!("hash:        {}", h1);
    println!("points:      {}", state.total_points);
    println!("level:       {}", state.archetype_level);
    println!("streak:      {}", state.streak_count);
    println!(
        "day:         {} ({})",
        state.current_day_index,
        phase_name(state.current_day_index).unwrap_or("?")
    );
    println!("journey:     {}%", journey_completion_percent(state));
    if let Some(archetype) = state.archetype {
        let abilities = engine.catalog().abilities(archetype, state.archetype_level);
        println!("abilities:   {}", abilities.join(", "));
    }
    println!(
        "field:       coherence={:.1} malleability={:.1} amplification={:.2} window={}",
        field.coherence_level,
        field.malleability_level,
        field.amplification_factor,
        field.manifestation_window_open
    );

    if h1 != h2 {
        error!(run1 = %h1, run2 = %h2, "determinism check failed");
        return Ok(false);
    }
    println!("[OK] replay is deterministic");
    Ok(true)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!(error = %err, "replay failed");
            ExitCode::FAILURE
        }
    }
}
