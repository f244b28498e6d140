//! Determinism testing utilities.
//!
//! Provides a harness for verifying that sessions produce identical
//! contests given identical seeds and admissions.
//!
//! # Testing Strategy
//!
//! A replayable contest depends on:
//!
//! - **Seeded randomness**: every draw comes from the session's own
//!   `ChaCha8Rng`. No thread-local or OS randomness.
//!
//! - **HashMap iteration order**: the default hasher is randomized, so the
//!   ledger always iterates in join order.
//!
//! - **No wall clock**: pacing is reported, never measured, inside the core.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: individual handlers are deterministic for a fixed RNG
//! 2. **Property tests**: any seed still replays identically
//! 3. **Integration tests**: full sessions are reproducible
//! 4. **Parallel tests**: N sessions on N threads all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use arena_core::session::{Session, SessionStatus};
use tracing::debug;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Rounds played in each run.
    pub rounds: Vec<u32>,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic session).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the runs were deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Session is non-deterministic!\n\
                 Runs: {}\n\
                 Rounds: {:?}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.rounds,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Play `session` until it leaves `Active` or `max_rounds` have been played,
/// hashing each round's narration into the running transcript hash.
fn play_out(session: &mut Session, max_rounds: u32) -> u64 {
    let mut transcript = DefaultHasher::new();
    while session.status() == SessionStatus::Active && session.round() < max_rounds {
        match session.play_round() {
            Ok(report) => report.messages.hash(&mut transcript),
            Err(e) => {
                debug!(error = %e, "Round failed during determinism run");
                break;
            }
        }
    }
    session.fingerprint().hash(&mut transcript);
    transcript.finish()
}

/// Run a session setup multiple times and verify every run matches.
///
/// # Arguments
///
/// * `runs` - Number of times to run the session
/// * `max_rounds` - Round cap per run
/// * `setup` - Function that creates an active (or recruiting) session
///
/// # Example
///
/// ```
/// use arena_test_utils::determinism::verify_session_determinism;
/// use arena_test_utils::fixtures::active_session;
///
/// let result = verify_session_determinism(3, 500, || active_session(8, 42));
/// result.assert_deterministic();
/// ```
pub fn verify_session_determinism<F>(runs: usize, max_rounds: u32, setup: F) -> DeterminismResult
where
    F: Fn() -> Session,
{
    let mut hashes = Vec::with_capacity(runs);
    let mut rounds = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut session = setup();
        hashes.push(play_out(&mut session, max_rounds));
        rounds.push(session.round());
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        rounds,
    }
}

/// Run N sessions on scoped threads and verify every one matches.
///
/// Catches state that leaks between threads or depends on scheduling.
///
/// # Panics
///
/// Panics if a worker thread panics.
pub fn run_parallel_sessions<F>(setup: F, num_sessions: usize, max_rounds: u32) -> DeterminismResult
where
    F: Fn() -> Session + Sync,
{
    let results: Vec<(u64, u32)> = thread::scope(|s| {
        let handles: Vec<_> = (0..num_sessions)
            .map(|_| {
                s.spawn(|| {
                    let mut session = setup();
                    let hash = play_out(&mut session, max_rounds);
                    (hash, session.round())
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("session thread panicked"))
            .collect()
    });

    let (hashes, rounds): (Vec<u64>, Vec<u32>) = results.into_iter().unzip();
    DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        rounds,
    }
}

/// Compare two runs round-by-round, finding the first divergence.
///
/// # Returns
///
/// `None` if the runs match, `Some(round)` for the first round whose
/// fingerprint differs (0 means the setups already differ).
pub fn find_first_divergence<F>(setup: F, max_rounds: u32) -> Option<u32>
where
    F: Fn() -> Session,
{
    let mut a = setup();
    let mut b = setup();

    if a.fingerprint() != b.fingerprint() {
        return Some(0);
    }

    for round in 1..=max_rounds {
        if a.status() != SessionStatus::Active && b.status() != SessionStatus::Active {
            return None;
        }
        let ra = a.play_round().map(|r| r.messages);
        let rb = b.play_round().map(|r| r.messages);
        if ra != rb || a.fingerprint() != b.fingerprint() {
            return Some(round);
        }
    }

    None
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{active_session, recruiting_session};

    #[test]
    fn test_same_seed_is_deterministic() {
        let result = verify_session_determinism(3, 1_000, || active_session(10, 7));
        result.assert_deterministic();
        assert_eq!(result.hashes.len(), 3);
    }

    #[test]
    fn test_different_seeds_diverge() {
        let a = verify_session_determinism(1, 1_000, || active_session(12, 1));
        let b = verify_session_determinism(1, 1_000, || active_session(12, 2));
        assert_ne!(a.hashes, b.hashes);
    }

    #[test]
    fn test_parallel_sessions_match() {
        let result = run_parallel_sessions(|| active_session(16, 99), 4, 1_000);
        result.assert_deterministic();
    }

    #[test]
    fn test_no_divergence_for_same_setup() {
        assert_eq!(find_first_divergence(|| active_session(9, 5), 1_000), None);
    }

    #[test]
    fn test_recruiting_session_does_not_play() {
        let result = verify_session_determinism(2, 10, || recruiting_session(4, 3));
        result.assert_deterministic();
        assert_eq!(result.rounds, vec![0, 0]);
    }

    #[test]
    fn test_compute_hash_stable() {
        assert_eq!(compute_hash(&"arena"), compute_hash(&"arena"));
    }
}
