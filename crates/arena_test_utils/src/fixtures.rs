//! Test fixtures and helpers.
//!
//! Pre-built sessions and tables for consistent testing.

use std::sync::Arc;

use arena_core::data::ArenaTables;
use arena_core::participant::ParticipantId;
use arena_core::session::{ArenaId, RoundReport, Session, SessionStatus};

/// Arena id used by fixtures.
pub const TEST_ARENA: ArenaId = ArenaId(1);

/// Upper bound on rounds for fixture runs; default tables finish far sooner.
pub const ROUND_LIMIT: u32 = 2_000;

/// Shared default tables.
#[must_use]
pub fn default_tables() -> Arc<ArenaTables> {
    Arc::new(ArenaTables::default())
}

/// Display name for the `n`th fixture participant.
#[must_use]
pub fn participant_name(n: u64) -> String {
    const NAMES: [&str; 8] = ["Ash", "Briar", "Cato", "Dell", "Ember", "Fern", "Glim", "Hale"];
    let idx = usize::try_from(n % NAMES.len() as u64).unwrap_or(0);
    format!("{}{}", NAMES[idx], n)
}

/// A recruiting session with `participants` admitted (ids `1..=participants`).
///
/// # Panics
///
/// Panics if `participants` exceeds the default capacity.
#[must_use]
pub fn recruiting_session(participants: u64, seed: u64) -> Session {
    recruiting_session_with(default_tables(), participants, seed)
}

/// Like [`recruiting_session`] with custom tables.
///
/// # Panics
///
/// Panics if admission fails.
#[must_use]
pub fn recruiting_session_with(tables: Arc<ArenaTables>, participants: u64, seed: u64) -> Session {
    let mut session = Session::new(TEST_ARENA, tables, seed);
    for n in 1..=participants {
        session
            .admit_participant(ParticipantId(n), &participant_name(n))
            .expect("fixture admission failed");
    }
    session
}

/// An active session with `participants` admitted.
///
/// # Panics
///
/// Panics if the session cannot start.
#[must_use]
pub fn active_session(participants: u64, seed: u64) -> Session {
    let mut session = recruiting_session(participants, seed);
    session.start().expect("fixture start failed");
    session
}

/// Play rounds until the session leaves `Active`, returning every report.
///
/// # Panics
///
/// Panics if a round errors or the session outlives [`ROUND_LIMIT`].
pub fn run_to_completion(session: &mut Session) -> Vec<RoundReport> {
    let mut reports = Vec::new();
    while session.status() == SessionStatus::Active {
        assert!(
            session.round() < ROUND_LIMIT,
            "session {} did not finish within {ROUND_LIMIT} rounds",
            session.seed()
        );
        reports.push(session.play_round().expect("round failed"));
    }
    reports
}
