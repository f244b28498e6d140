//! Rewards and per-participant statistics for a finished session.

use serde::{Deserialize, Serialize};

use crate::data::RewardTable;
use crate::error::{ArenaError, Result};
use crate::participant::ParticipantId;
use crate::session::{ArenaId, Session, SessionStatus};

/// Prize for a contest with `participants` starters, using the default brackets.
///
/// ```
/// use arena_core::outcome::compute_reward;
///
/// assert_eq!(compute_reward(4, 100), 100);
/// assert_eq!(compute_reward(5, 100), 150);
/// assert_eq!(compute_reward(30, 100), 300);
/// ```
#[must_use]
pub fn compute_reward(participants: usize, base_reward: u64) -> u64 {
    RewardTable::default().compute(participants, base_reward)
}

/// Stats delta for one participant, reported when a session finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantStats {
    /// Participant id.
    pub id: ParticipantId,
    /// Whether this participant won.
    pub won: bool,
    /// Eliminations credited.
    pub kills: u32,
    /// Times revived (0 or 1).
    pub revivals: u32,
    /// Round of the final elimination, if eliminated.
    pub eliminated_round: Option<u32>,
}

/// Result of a finished session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOutcome {
    /// Arena the session ran in.
    pub arena: ArenaId,
    /// Sole survivor.
    pub winner: Option<ParticipantId>,
    /// Winner's display name.
    pub winner_name: Option<String>,
    /// Rounds played.
    pub rounds: u32,
    /// Participants admitted.
    pub participants: usize,
    /// Prize for the winner.
    pub reward: u64,
    /// Per-participant deltas in join order.
    pub stats: Vec<ParticipantStats>,
}

/// Build the outcome of a finished session, using the session's reward table.
///
/// # Errors
///
/// Returns [`ArenaError::InvalidState`] unless the session is `Finished`.
pub fn summarize(session: &Session, base_reward: u64) -> Result<SessionOutcome> {
    if session.status() != SessionStatus::Finished {
        return Err(ArenaError::InvalidState {
            operation: "summarize",
            status: session.status(),
        });
    }

    let ledger = session.ledger();
    let winner = session.winner();
    let winner_id = winner.map(crate::participant::Participant::id);

    let stats = ledger
        .participants()
        .map(|p| ParticipantStats {
            id: p.id(),
            won: Some(p.id()) == winner_id,
            kills: p.kills(),
            revivals: p.revivals(),
            eliminated_round: if p.is_alive() {
                None
            } else {
                ledger
                    .elimination_log()
                    .iter()
                    .rev()
                    .find(|r| r.participant() == p.id() && r.is_active())
                    .map(crate::ledger::EliminationRecord::round)
            },
        })
        .collect();

    Ok(SessionOutcome {
        arena: session.arena(),
        winner: winner_id,
        winner_name: winner.map(|p| p.display_name().to_string()),
        rounds: session.round(),
        participants: ledger.total(),
        reward: session.tables().rewards.compute(ledger.total(), base_reward),
        stats,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::data::ArenaTables;

    #[test]
    fn test_reward_brackets() {
        assert_eq!(compute_reward(0, 100), 100);
        assert_eq!(compute_reward(9, 100), 150);
        assert_eq!(compute_reward(10, 100), 200);
        assert_eq!(compute_reward(29, 100), 250);
        assert_eq!(compute_reward(100, 100), 300);
        assert_eq!(compute_reward(12, 0), 0);
        assert_eq!(compute_reward(12, u64::MAX), u64::MAX);
        assert_eq!(compute_reward(3, u64::MAX / 2), u64::MAX / 2);
        assert_eq!(compute_reward(35, u64::MAX / 4), u64::MAX / 4 * 3);
        assert_eq!(compute_reward(35, u64::MAX / 2), u64::MAX);
    }

    #[test]
    fn test_summarize_requires_finished() {
        let session = Session::new(ArenaId(1), Arc::new(ArenaTables::default()), 1);
        assert!(matches!(
            summarize(&session, 100).unwrap_err(),
            ArenaError::InvalidState { .. }
        ));
    }

    #[test]
    fn test_summarize_finished_session() {
        let mut session = Session::new(ArenaId(3), Arc::new(ArenaTables::default()), 11);
        for i in 1..=6 {
            session
                .admit_participant(ParticipantId(i), &format!("P{i}"))
                .unwrap();
        }
        session.start().unwrap();
        while session.status() == SessionStatus::Active {
            session.play_round().unwrap();
        }

        let outcome = summarize(&session, 100).unwrap();

        assert_eq!(outcome.participants, 6);
        assert_eq!(outcome.reward, 150);
        assert_eq!(outcome.rounds, session.round());
        assert_eq!(outcome.stats.len(), 6);
        assert_eq!(outcome.stats.iter().filter(|s| s.won).count(), 1);
        let winner = outcome.winner.unwrap();
        for stat in &outcome.stats {
            assert_eq!(stat.won, stat.id == winner);
            assert_eq!(stat.eliminated_round.is_none(), stat.won);
        }
        let total_kills: u32 = outcome.stats.iter().map(|s| s.kills).sum();
        assert!(total_kills <= 5 + outcome.stats.iter().map(|s| s.revivals).sum::<u32>());
    }
}
