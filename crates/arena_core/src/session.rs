//! Session state machine and round loop body.
//!
//! A [`Session`] moves `Recruiting -> Active -> {Finished, Cancelled}`.
//! [`Session::play_round`] runs exactly one iteration of the round loop
//! without any waiting; the host decides how long to pause between calls
//! (see [`RoundReport::pacing`]).
//!
//! # Determinism
//!
//! Every random decision draws from the session's own seeded RNG, and every
//! iteration over participants follows join order, so the same seed and the
//! same admissions always produce the same contest.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use arena_core::data::ArenaTables;
//! use arena_core::participant::ParticipantId;
//! use arena_core::session::{ArenaId, Session, SessionStatus};
//!
//! let mut session = Session::new(ArenaId(1), Arc::new(ArenaTables::default()), 42);
//! for (id, name) in [(1, "Ash"), (2, "Bo"), (3, "Cy"), (4, "Di")] {
//!     session.admit_participant(ParticipantId(id), name).unwrap();
//! }
//! session.start().unwrap();
//!
//! while session.status() == SessionStatus::Active {
//!     let report = session.play_round().unwrap();
//!     for line in &report.messages {
//!         println!("{line}");
//!     }
//! }
//! assert_eq!(session.ledger().alive_count(), 1);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::conditions::{Condition, ConditionManager};
use crate::data::{probability, ArenaTables, CategoryWeights, ConditionId};
use crate::error::{ArenaError, Result};
use crate::events::narration::{join_names, pick, render};
use crate::events::{batch_size, choose_category, EventCategory, EventOutcome, EventSelector};
use crate::ledger::Ledger;
use crate::participant::{Cohort, Participant, ParticipantId, ParticipantProfile};
use crate::tier::Tier;

/// Identifier of the arena (server, channel) hosting a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArenaId(pub u64);

impl fmt::Display for ArenaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "arena-{}", self.0)
    }
}

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionStatus {
    /// Accepting participants.
    Recruiting,
    /// Rounds are being played.
    Active,
    /// One participant (or none) remains.
    Finished,
    /// Stopped externally or by an unrecoverable error.
    Cancelled,
}

impl SessionStatus {
    /// Whether no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Cancelled)
    }
}

/// One-shot announcements fired when the population crosses a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Milestone {
    /// Three participants remain.
    FinalThree,
    /// Two participants remain.
    FinalDuel,
}

impl Milestone {
    /// Alive count that fires this milestone.
    #[must_use]
    pub const fn threshold(self) -> usize {
        match self {
            Milestone::FinalThree => 3,
            Milestone::FinalDuel => 2,
        }
    }
}

/// Kill leaderboard entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Participant id.
    pub id: ParticipantId,
    /// Display name.
    pub name: String,
    /// Eliminations credited.
    pub kills: u32,
    /// Whether still in play.
    pub alive: bool,
}

/// Structured status for the output sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Arena hosting the session.
    pub arena: ArenaId,
    /// Lifecycle state.
    pub status: SessionStatus,
    /// Rounds played.
    pub round: u32,
    /// Living participants.
    pub alive: usize,
    /// Participants admitted.
    pub total: usize,
    /// Name of the active condition.
    pub condition: Option<String>,
    /// Top participants by kills.
    pub leaderboard: Vec<LeaderboardEntry>,
}

/// Everything that happened in one round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundReport {
    /// Round number, starting at 1.
    pub round: u32,
    /// Tier the round was played in.
    pub tier: Tier,
    /// Condition active during the round.
    pub condition: Option<ConditionId>,
    /// Whether a new condition took hold this round.
    pub condition_changed: bool,
    /// Sub-events in execution order.
    pub events: Vec<EventOutcome>,
    /// Narration lines in order; never empty.
    pub messages: Vec<String>,
    /// Milestones fired this round.
    pub milestones: Vec<Milestone>,
    /// Status after the round.
    pub status: SessionStatus,
    /// Status snapshot after the round.
    pub snapshot: StatusSnapshot,
    /// Delay before the next round.
    pub pacing: Duration,
}

/// One elimination contest from recruitment to termination.
#[derive(Debug, Clone)]
pub struct Session {
    arena: ArenaId,
    tables: Arc<ArenaTables>,
    ledger: Ledger,
    round: u32,
    status: SessionStatus,
    announced: BTreeSet<Milestone>,
    conditions: ConditionManager,
    rng: ChaCha8Rng,
    seed: u64,
    forced_category: Option<EventCategory>,
    forced_condition: Option<ConditionId>,
    cancel_reason: Option<String>,
}

impl Session {
    /// Create an empty session in `Recruiting`.
    #[must_use]
    pub fn new(arena: ArenaId, tables: Arc<ArenaTables>, seed: u64) -> Self {
        Self {
            arena,
            conditions: ConditionManager::new(Arc::clone(&tables)),
            tables,
            ledger: Ledger::new(),
            round: 0,
            status: SessionStatus::Recruiting,
            announced: BTreeSet::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            forced_category: None,
            forced_condition: None,
            cancel_reason: None,
        }
    }

    fn require(&self, operation: &'static str, expected: SessionStatus) -> Result<()> {
        if self.status == expected {
            Ok(())
        } else {
            Err(ArenaError::InvalidState {
                operation,
                status: self.status,
            })
        }
    }

    /// Admit a participant with a generated title and cohort.
    ///
    /// # Errors
    ///
    /// - [`ArenaError::InvalidState`] outside `Recruiting`.
    /// - [`ArenaError::ArenaFull`] at the participant cap.
    /// - [`ArenaError::DuplicateParticipant`] if already admitted.
    pub fn admit_participant(&mut self, id: ParticipantId, display_name: &str) -> Result<()> {
        let title = self
            .tables
            .narration
            .titles
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or_default();
        let profile = ParticipantProfile {
            display_name: display_name.to_string(),
            title,
            cohort: Cohort::for_join_index(self.ledger.total()),
        };
        self.admit_with_profile(id, profile)
    }

    /// Admit a participant with an explicit profile.
    ///
    /// # Errors
    ///
    /// Same as [`Session::admit_participant`].
    pub fn admit_with_profile(&mut self, id: ParticipantId, profile: ParticipantProfile) -> Result<()> {
        self.require("admit participant", SessionStatus::Recruiting)?;
        let capacity = self.tables.session.max_participants;
        if self.ledger.total() >= capacity {
            return Err(ArenaError::ArenaFull { capacity });
        }
        self.ledger.admit(id, profile)?;
        debug!(arena = %self.arena, participant = %id, "Participant admitted");
        Ok(())
    }

    /// Move from `Recruiting` to `Active`.
    ///
    /// With too few participants the session goes straight to `Cancelled`.
    ///
    /// # Errors
    ///
    /// - [`ArenaError::InvalidState`] outside `Recruiting`.
    /// - [`ArenaError::InsufficientParticipants`] below the minimum.
    pub fn start(&mut self) -> Result<()> {
        self.require("start", SessionStatus::Recruiting)?;
        let required = self.tables.session.min_participants.max(2);
        let available = self.ledger.total();
        if available < required {
            let err = ArenaError::InsufficientParticipants {
                required,
                available,
            };
            self.status = SessionStatus::Cancelled;
            self.cancel_reason = Some(err.to_string());
            info!(arena = %self.arena, required, available, "Session cancelled before start");
            return Err(err);
        }
        self.status = SessionStatus::Active;
        info!(arena = %self.arena, participants = available, seed = self.seed, "Session started");
        Ok(())
    }

    /// Cancel the session from any non-terminal state.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::InvalidState`] if already terminal.
    pub fn cancel(&mut self, reason: &str) -> Result<()> {
        if self.status.is_terminal() {
            return Err(ArenaError::InvalidState {
                operation: "cancel",
                status: self.status,
            });
        }
        self.status = SessionStatus::Cancelled;
        self.cancel_reason = Some(reason.to_string());
        info!(arena = %self.arena, round = self.round, reason, "Session cancelled");
        Ok(())
    }

    /// Activate `id` at the start of the next round, replacing the current condition.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::InvalidState`] if the session is terminal.
    pub fn force_condition(&mut self, id: ConditionId) -> Result<()> {
        if self.status.is_terminal() {
            return Err(ArenaError::InvalidState {
                operation: "force condition",
                status: self.status,
            });
        }
        self.forced_condition = Some(id);
        Ok(())
    }

    /// Use `category` for the next sub-event instead of a weighted draw.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::InvalidState`] if the session is terminal.
    pub fn force_next_category(&mut self, category: EventCategory) -> Result<()> {
        if self.status.is_terminal() {
            return Err(ArenaError::InvalidState {
                operation: "force event category",
                status: self.status,
            });
        }
        self.forced_category = Some(category);
        Ok(())
    }

    /// Run one round.
    ///
    /// Increments the round, rotates the condition if needed, runs the event
    /// batch, fires milestones, and checks termination. A broken ledger
    /// invariant cancels the session and is returned as an error.
    ///
    /// # Errors
    ///
    /// - [`ArenaError::InvalidState`] outside `Active`.
    /// - [`ArenaError::InvariantViolation`] if the ledger no longer adds up.
    pub fn play_round(&mut self) -> Result<RoundReport> {
        self.require("play round", SessionStatus::Active)?;
        let tables = Arc::clone(&self.tables);

        self.round += 1;
        let round = self.round;
        self.ledger.set_round(round);
        let alive_at_start = self.ledger.alive_count();
        let mut messages = Vec::new();

        let expired = self.conditions.tick_duration();
        let forced = self.forced_condition.take();
        let condition_changed =
            forced.is_some() || expired || self.conditions.active().is_none();
        if condition_changed {
            self.conditions
                .select_condition(round, alive_at_start, forced.as_ref(), &mut self.rng);
            if let Some(condition) = self.conditions.active() {
                messages.push(condition.announcement().to_string());
            }
        }

        let tier = Tier::for_alive(alive_at_start);
        let profile = tables.tiers.profile(tier);
        let weights = self.conditions.apply_to_weights(profile.weights);
        let sponsor_chance = scaled_sponsor_chance(
            tables.events.sponsor_roll_chance,
            &profile.weights,
            &weights,
        );
        let batch = batch_size(profile, &mut self.rng);
        debug!(
            arena = %self.arena,
            round,
            tier = tier.label(),
            alive = alive_at_start,
            batch,
            "Round started"
        );

        let selector = EventSelector::new(&tables);
        let mut events = Vec::with_capacity(batch as usize);
        let mut milestones = Vec::new();
        for _ in 0..batch {
            if self.ledger.alive_count() <= 1 {
                break;
            }
            let alive_before = self.ledger.alive_count();
            let category = match self.forced_category.take() {
                Some(forced) => forced,
                None => choose_category(&weights, &mut self.rng),
            };
            let outcome = selector.resolve(
                category,
                &mut self.ledger,
                &self.conditions,
                sponsor_chance,
                &mut self.rng,
            );
            debug!(
                round,
                category = outcome.category.label(),
                eliminated = outcome.eliminated.len(),
                revived = outcome.revived.is_some(),
                "Event resolved"
            );
            messages.extend(outcome.messages.iter().cloned());
            events.push(outcome);

            if let Some(milestone) = self.next_milestone(alive_before) {
                messages.push(self.milestone_line(milestone, &selector));
                milestones.push(milestone);
            }
        }

        if let Err(e) = self.check_integrity() {
            error!(arena = %self.arena, round, error = %e, "Ledger corrupted, cancelling session");
            self.status = SessionStatus::Cancelled;
            self.cancel_reason = Some(e.to_string());
            return Err(e);
        }

        if self.ledger.alive_count() <= 1 {
            self.status = SessionStatus::Finished;
            messages.push(self.winner_line(&selector));
            info!(arena = %self.arena, rounds = round, "Session finished");
        }

        if messages.is_empty() {
            let line = pick(&tables.narration.quiet_round, "quiet round", &mut self.rng)
                .map_or_else(|_| selector.fallback_line(&mut self.rng), str::to_string);
            messages.push(line);
        }

        Ok(RoundReport {
            round,
            tier,
            condition: self.conditions.active().map(|c| c.id().clone()),
            condition_changed,
            events,
            messages,
            milestones,
            status: self.status,
            snapshot: self.snapshot(),
            pacing: self.pacing_delay(),
        })
    }

    fn check_integrity(&self) -> Result<()> {
        self.ledger.verify_invariants()?;
        if self.ledger.total() > 0 && self.ledger.alive_count() == 0 {
            return Err(ArenaError::InvariantViolation {
                round: self.round,
                message: "no participants left alive".to_string(),
            });
        }
        Ok(())
    }

    /// Milestone reached by dropping from `alive_before` onto its threshold.
    fn next_milestone(&mut self, alive_before: usize) -> Option<Milestone> {
        let alive = self.ledger.alive_count();
        if alive >= alive_before {
            return None;
        }
        [Milestone::FinalThree, Milestone::FinalDuel]
            .into_iter()
            .find(|m| m.threshold() == alive && !self.announced.contains(m))
            .map(|m| {
                self.announced.insert(m);
                m
            })
    }

    fn alive_names(&self) -> Vec<String> {
        self.ledger
            .alive_ids()
            .into_iter()
            .filter_map(|id| self.ledger.get(id))
            .map(|p| p.display_name().to_string())
            .collect()
    }

    fn milestone_line(&mut self, milestone: Milestone, selector: &EventSelector<'_>) -> String {
        let tables = Arc::clone(&self.tables);
        let owned = self.alive_names();
        let names: Vec<&str> = owned.iter().map(String::as_str).collect();
        let rendered = match (milestone, names.as_slice()) {
            (Milestone::FinalThree, _) => {
                let joined = join_names(&names);
                pick(&tables.narration.final_three, "final three", &mut self.rng)
                    .and_then(|t| render(t, &[("names", joined.as_str())]))
            }
            (Milestone::FinalDuel, &[a, b]) => {
                pick(&tables.narration.final_duel, "final duel", &mut self.rng)
                    .and_then(|t| render(t, &[("a", a), ("b", b)]))
            }
            (Milestone::FinalDuel, _) => Err(ArenaError::EventExecutionFailure(
                "final duel needs exactly two names".to_string(),
            )),
        };
        rendered.unwrap_or_else(|e| {
            warn!(?milestone, error = %e, "Milestone narration failed");
            selector.fallback_line(&mut self.rng)
        })
    }

    fn winner_line(&mut self, selector: &EventSelector<'_>) -> String {
        let tables = Arc::clone(&self.tables);
        let Some(winner) = self.winner().cloned() else {
            return selector.fallback_line(&mut self.rng);
        };
        let kills = winner.kills().to_string();
        let cohort = winner.cohort().to_string();
        pick(&tables.narration.winner, "winner", &mut self.rng)
            .and_then(|t| {
                render(
                    t,
                    &[
                        ("winner", winner.display_name()),
                        ("title", winner.title()),
                        ("kills", kills.as_str()),
                        ("cohort", cohort.as_str()),
                    ],
                )
            })
            .unwrap_or_else(|e| {
                warn!(error = %e, "Winner narration failed");
                selector.fallback_line(&mut self.rng)
            })
    }

    /// Sole survivor, once at most one participant remains.
    #[must_use]
    pub fn winner(&self) -> Option<&Participant> {
        let alive = self.ledger.alive_ids();
        match alive.as_slice() {
            [only] => self.ledger.get(*only),
            _ => None,
        }
    }

    /// Delay before the next round, from the current tier's pacing.
    #[must_use]
    pub fn pacing_delay(&self) -> Duration {
        let tier = Tier::for_alive(self.ledger.alive_count());
        Duration::from_millis(self.tables.tiers.profile(tier).pacing_ms)
    }

    /// Structured status for the output sink.
    #[must_use]
    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            arena: self.arena,
            status: self.status,
            round: self.round,
            alive: self.ledger.alive_count(),
            total: self.ledger.total(),
            condition: self.conditions.active().map(|c| c.name().to_string()),
            leaderboard: self
                .ledger
                .leaderboard(self.tables.session.leaderboard_size)
                .into_iter()
                .map(|p| LeaderboardEntry {
                    id: p.id(),
                    name: p.display_name().to_string(),
                    kills: p.kills(),
                    alive: p.is_alive(),
                })
                .collect(),
        }
    }

    /// Deterministic hash of the contest state.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.round.hash(&mut hasher);
        self.status.hash(&mut hasher);
        for participant in self.ledger.participants() {
            participant.id().hash(&mut hasher);
            participant.is_alive().hash(&mut hasher);
            participant.kills().hash(&mut hasher);
            participant.revivals().hash(&mut hasher);
        }
        for record in self.ledger.elimination_log() {
            record.hash(&mut hasher);
        }
        self.announced.hash(&mut hasher);
        if let Some(condition) = self.conditions.active() {
            condition.id().hash(&mut hasher);
            condition.remaining().hash(&mut hasher);
        }
        hasher.finish()
    }

    /// Arena hosting this session.
    #[must_use]
    pub const fn arena(&self) -> ArenaId {
        self.arena
    }

    /// Lifecycle state.
    #[must_use]
    pub const fn status(&self) -> SessionStatus {
        self.status
    }

    /// Rounds played so far.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Seed the session RNG was created from.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Read-only view of the ledger.
    #[must_use]
    pub const fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Shared tables.
    #[must_use]
    pub fn tables(&self) -> &ArenaTables {
        &self.tables
    }

    /// Active condition, if any.
    #[must_use]
    pub const fn active_condition(&self) -> Option<&Condition> {
        self.conditions.active()
    }

    /// Milestones already announced.
    #[must_use]
    pub const fn announced_milestones(&self) -> &BTreeSet<Milestone> {
        &self.announced
    }

    /// Why the session was cancelled.
    #[must_use]
    pub fn cancel_reason(&self) -> Option<&str> {
        self.cancel_reason.as_deref()
    }
}

/// Scale the sponsor roll by how much the condition moved the sponsor weight.
fn scaled_sponsor_chance(base_chance: f64, base: &CategoryWeights, adjusted: &CategoryWeights) -> f64 {
    let before = base.sponsor_revival;
    let after = adjusted.sponsor_revival;
    let factor = if before > 0.0 { after / before } else { 1.0 };
    let chance = base_chance * factor;
    if chance.is_finite() {
        probability(chance)
    } else {
        probability(base_chance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with(n: u64, seed: u64) -> Session {
        let mut session = Session::new(ArenaId(7), Arc::new(ArenaTables::default()), seed);
        for i in 1..=n {
            session
                .admit_participant(ParticipantId(i), &format!("P{i}"))
                .unwrap();
        }
        session
    }

    #[test]
    fn test_new_session_is_recruiting() {
        let session = session_with(0, 1);
        assert_eq!(session.status(), SessionStatus::Recruiting);
        assert_eq!(session.round(), 0);
        assert!(session.active_condition().is_none());
    }

    #[test]
    fn test_start_with_too_few_cancels() {
        let mut session = session_with(1, 1);
        let err = session.start().unwrap_err();
        assert_eq!(
            err,
            ArenaError::InsufficientParticipants {
                required: 2,
                available: 1
            }
        );
        assert_eq!(session.status(), SessionStatus::Cancelled);
        assert!(session.cancel_reason().is_some());
    }

    #[test]
    fn test_admission_only_while_recruiting() {
        let mut session = session_with(2, 1);
        session.start().unwrap();
        let err = session
            .admit_participant(ParticipantId(99), "Late")
            .unwrap_err();
        assert!(matches!(err, ArenaError::InvalidState { .. }));
        assert_eq!(session.ledger().total(), 2);
    }

    #[test]
    fn test_admission_respects_capacity() {
        let mut tables = ArenaTables::default();
        tables.session.max_participants = 2;
        let mut session = Session::new(ArenaId(1), Arc::new(tables), 1);
        session.admit_participant(ParticipantId(1), "A").unwrap();
        session.admit_participant(ParticipantId(2), "B").unwrap();
        assert_eq!(
            session.admit_participant(ParticipantId(3), "C").unwrap_err(),
            ArenaError::ArenaFull { capacity: 2 }
        );
    }

    #[test]
    fn test_admission_assigns_title_and_cohort() {
        let session = session_with(3, 1);
        let third = session.ledger().get(ParticipantId(3)).unwrap();
        assert_eq!(third.cohort(), Cohort(2));
        assert!(ArenaTables::default()
            .narration
            .titles
            .iter()
            .any(|t| t == third.title()));
    }

    #[test]
    fn test_play_round_requires_active() {
        let mut session = session_with(3, 1);
        assert!(matches!(
            session.play_round().unwrap_err(),
            ArenaError::InvalidState { .. }
        ));
    }

    #[test]
    fn test_first_round_announces_condition() {
        let mut session = session_with(12, 3);
        session.start().unwrap();
        let report = session.play_round().unwrap();

        assert_eq!(report.round, 1);
        assert!(report.condition_changed);
        assert!(report.condition.is_some());
        let announcement = session.active_condition().unwrap().announcement().to_string();
        assert_eq!(report.messages[0], announcement);
    }

    #[test]
    fn test_forced_condition_applies_next_round() {
        let mut session = session_with(12, 3);
        session.start().unwrap();
        session.play_round().unwrap();
        session
            .force_condition(ConditionId::new("blood_moon"))
            .unwrap();

        let report = session.play_round().unwrap();

        assert!(report.condition_changed);
        assert_eq!(report.condition, Some(ConditionId::new("blood_moon")));
    }

    #[test]
    fn test_forced_category_used_for_next_event() {
        let mut session = session_with(12, 3);
        session.start().unwrap();
        session
            .force_next_category(EventCategory::Alliance)
            .unwrap();

        let report = session.play_round().unwrap();

        assert_eq!(report.events[0].category, EventCategory::Alliance);
        assert!(report.events[0].eliminated.is_empty());
    }

    #[test]
    fn test_cancel_is_terminal() {
        let mut session = session_with(4, 1);
        session.start().unwrap();
        session.cancel("admin stop").unwrap();

        assert_eq!(session.status(), SessionStatus::Cancelled);
        assert_eq!(session.cancel_reason(), Some("admin stop"));
        assert!(session.cancel("again").is_err());
        assert!(session.play_round().is_err());
        assert!(session
            .force_next_category(EventCategory::Survival)
            .is_err());
    }

    #[test]
    fn test_two_participants_finish_with_winner_line() {
        let mut session = session_with(2, 9);
        session.start().unwrap();
        let mut last = None;
        for _ in 0..500 {
            if session.status() != SessionStatus::Active {
                break;
            }
            last = Some(session.play_round().unwrap());
        }

        let report = last.unwrap();
        assert_eq!(session.status(), SessionStatus::Finished);
        let winner = session.winner().unwrap();
        assert!(report
            .messages
            .last()
            .unwrap()
            .contains(winner.display_name()));
    }

    #[test]
    fn test_starting_at_a_threshold_announces_nothing_for_it() {
        for seed in 0..20 {
            let mut duel = session_with(2, seed);
            duel.start().unwrap();
            let mut trio = session_with(3, seed);
            trio.start().unwrap();

            for session in [&mut duel, &mut trio] {
                while session.status() == SessionStatus::Active {
                    let report = session.play_round().unwrap();
                    assert!(!report.milestones.contains(&Milestone::FinalThree));
                }
            }
            assert!(duel.announced_milestones().is_empty(), "seed {seed}");
        }
    }

    #[test]
    fn test_non_finite_chances_do_not_panic() {
        let mut tables = ArenaTables::default();
        tables.events.caused_chance = f64::NAN;
        tables.events.multi_victim_chance = f64::INFINITY;
        tables.events.sponsor_roll_chance = f64::NAN;
        tables.events.betrayal_chance = f64::NEG_INFINITY;
        tables.conditions.narration_chance = f64::NAN;

        let mut session = Session::new(ArenaId(7), Arc::new(tables), 5);
        for i in 1..=16 {
            session
                .admit_participant(ParticipantId(i), &format!("P{i}"))
                .unwrap();
        }
        session.start().unwrap();
        while session.status() == SessionStatus::Active {
            session.play_round().unwrap();
        }
        assert_eq!(session.status(), SessionStatus::Finished);
    }

    #[test]
    fn test_every_round_has_a_message() {
        let mut session = session_with(10, 4);
        session.start().unwrap();
        while session.status() == SessionStatus::Active {
            let report = session.play_round().unwrap();
            assert!(!report.messages.is_empty());
        }
    }

    #[test]
    fn test_pacing_shrinks_with_population() {
        let mut session = session_with(12, 5);
        session.start().unwrap();
        let mut previous = session.pacing_delay();
        while session.status() == SessionStatus::Active {
            session.play_round().unwrap();
            let alive = session.ledger().alive_count();
            let delay = session.pacing_delay();
            let expected = ArenaTables::default()
                .tiers
                .profile(Tier::for_alive(alive))
                .pacing_ms;
            assert_eq!(delay, Duration::from_millis(expected));
            previous = previous.max(delay);
        }
        assert!(session.pacing_delay() <= previous);
    }

    #[test]
    fn test_snapshot_reports_counts() {
        let mut session = session_with(6, 2);
        session.start().unwrap();
        session.play_round().unwrap();
        let snapshot = session.snapshot();

        assert_eq!(snapshot.arena, ArenaId(7));
        assert_eq!(snapshot.round, 1);
        assert_eq!(snapshot.total, 6);
        assert_eq!(snapshot.alive, session.ledger().alive_count());
        assert!(snapshot.leaderboard.len() <= 3);
        assert!(snapshot.condition.is_some());
    }

    #[test]
    fn test_sponsor_chance_scaling() {
        let base = CategoryWeights::new(1.0, 1.0, 10.0, 1.0, 1.0);
        let doubled = CategoryWeights::new(1.0, 1.0, 20.0, 1.0, 1.0);
        assert!((scaled_sponsor_chance(0.3, &base, &doubled) - 0.6).abs() < 1e-9);
        assert!((scaled_sponsor_chance(0.8, &base, &doubled) - 1.0).abs() < 1e-9);
        assert!((scaled_sponsor_chance(0.3, &base, &base) - 0.3).abs() < 1e-9);
    }
}
