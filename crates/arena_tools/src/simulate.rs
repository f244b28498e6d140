//! Headless session simulation.
//!
//! Runs a full session without pacing and collects every round report plus
//! the outcome. Useful for balance checks and for reproducing a seed.

use std::fmt::Write as _;
use std::sync::Arc;

use arena_core::data::ArenaTables;
use arena_core::outcome::{summarize, SessionOutcome};
use arena_core::participant::ParticipantId;
use arena_core::session::{ArenaId, RoundReport, Session, SessionStatus};
use serde::Serialize;
use tracing::{debug, info};

use crate::ToolError;

/// Settings for one simulated session.
#[derive(Debug, Clone)]
pub struct SimulationOptions {
    /// Number of participants to admit.
    pub participants: u64,
    /// Session seed.
    pub seed: u64,
    /// Base reward for the outcome.
    pub base_reward: u64,
    /// Round cap; the session is cancelled if reached.
    pub max_rounds: u32,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            participants: 12,
            seed: 0,
            base_reward: 100,
            max_rounds: 1_000,
        }
    }
}

/// Everything a simulated session produced.
#[derive(Debug, Clone, Serialize)]
pub struct Transcript {
    /// Seed used.
    pub seed: u64,
    /// Final status.
    pub status: SessionStatus,
    /// Every round, in order.
    pub rounds: Vec<RoundReport>,
    /// Outcome, when the session finished.
    pub outcome: Option<SessionOutcome>,
    /// Deterministic fingerprint of the final state.
    pub fingerprint: u64,
}

/// Run one session to completion.
///
/// # Errors
///
/// Returns [`ToolError::Arena`] if admission or start fails, or a round hits
/// a fatal error.
pub fn run(tables: Arc<ArenaTables>, options: &SimulationOptions) -> Result<Transcript, ToolError> {
    let mut session = Session::new(ArenaId(0), tables, options.seed);
    for n in 1..=options.participants {
        session.admit_participant(ParticipantId(n), &format!("Tribute {n}"))?;
    }
    session.start()?;
    info!(participants = options.participants, seed = options.seed, "Simulating session");

    let mut rounds = Vec::new();
    while session.status() == SessionStatus::Active {
        if session.round() >= options.max_rounds {
            session.cancel("round limit reached")?;
            break;
        }
        let report = session.play_round()?;
        debug!(round = report.round, alive = report.snapshot.alive, "Round simulated");
        rounds.push(report);
    }

    let outcome = match session.status() {
        SessionStatus::Finished => Some(summarize(&session, options.base_reward)?),
        _ => None,
    };
    Ok(Transcript {
        seed: options.seed,
        status: session.status(),
        rounds,
        outcome,
        fingerprint: session.fingerprint(),
    })
}

/// Human-readable rendering of a transcript.
#[must_use]
pub fn render_text(transcript: &Transcript) -> String {
    let mut out = String::new();
    for report in &transcript.rounds {
        let _ = writeln!(
            out,
            "== Round {} ({} alive of {}) ==",
            report.round, report.snapshot.alive, report.snapshot.total
        );
        for line in &report.messages {
            let _ = writeln!(out, "  {line}");
        }
    }
    let _ = writeln!(out, "Status: {:?}", transcript.status);
    if let Some(outcome) = &transcript.outcome {
        let _ = writeln!(
            out,
            "Winner: {} after {} rounds, reward {}",
            outcome.winner_name.as_deref().unwrap_or("nobody"),
            outcome.rounds,
            outcome.reward
        );
        for stat in outcome.stats.iter().filter(|s| s.kills > 0) {
            let _ = writeln!(out, "  {} - {} kills", stat.id, stat.kills);
        }
    }
    let _ = writeln!(out, "Fingerprint: {:016x}", transcript.fingerprint);
    out
}

/// JSON rendering of a transcript.
///
/// # Errors
///
/// Returns [`ToolError::Serialize`] if serialization fails.
pub fn render_json(transcript: &Transcript) -> Result<String, ToolError> {
    Ok(serde_json::to_string_pretty(transcript)?)
}
