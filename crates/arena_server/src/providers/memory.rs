//! In-memory collaborators that record what they receive.

use arena_core::outcome::SessionOutcome;
use arena_core::participant::ParticipantId;
use arena_core::session::{ArenaId, StatusSnapshot};
use async_trait::async_trait;
use parking_lot::Mutex;

use super::{OutputSink, Recruit, RecruitmentProvider, RewardIssuer, StatsProvider};
use crate::error::ProviderError;

/// Hands over a fixed roster.
#[derive(Debug, Clone, Default)]
pub struct FixedRoster {
    recruits: Vec<Recruit>,
}

impl FixedRoster {
    /// Roster of `recruits` in join order.
    #[must_use]
    pub fn new(recruits: Vec<Recruit>) -> Self {
        Self { recruits }
    }

    /// Roster from display names; ids are `1..=names.len()`.
    #[must_use]
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        Self::new(
            (1u64..)
                .zip(names)
                .map(|(id, name)| Recruit::new(id, name.as_ref()))
                .collect(),
        )
    }
}

#[async_trait]
impl RecruitmentProvider for FixedRoster {
    async fn recruit(&self, _arena: ArenaId) -> Result<Vec<Recruit>, ProviderError> {
        Ok(self.recruits.clone())
    }
}

/// Records narration and snapshots.
#[derive(Debug, Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<(ArenaId, String)>>,
    snapshots: Mutex<Vec<StatusSnapshot>>,
}

impl RecordingSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Narration received for `arena`, in order.
    #[must_use]
    pub fn messages_for(&self, arena: ArenaId) -> Vec<String> {
        self.messages
            .lock()
            .iter()
            .filter(|(a, _)| *a == arena)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// Snapshots received, in order.
    #[must_use]
    pub fn snapshots(&self) -> Vec<StatusSnapshot> {
        self.snapshots.lock().clone()
    }
}

#[async_trait]
impl OutputSink for RecordingSink {
    async fn narrate(&self, arena: ArenaId, message: &str) -> Result<(), ProviderError> {
        self.messages.lock().push((arena, message.to_string()));
        Ok(())
    }

    async fn status(&self, snapshot: &StatusSnapshot) -> Result<(), ProviderError> {
        self.snapshots.lock().push(snapshot.clone());
        Ok(())
    }
}

/// Records stats reports.
#[derive(Debug, Default)]
pub struct RecordingStats {
    outcomes: Mutex<Vec<SessionOutcome>>,
    cancellations: Mutex<Vec<(ArenaId, String)>>,
}

impl RecordingStats {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Outcomes received.
    #[must_use]
    pub fn outcomes(&self) -> Vec<SessionOutcome> {
        self.outcomes.lock().clone()
    }

    /// Cancellations received, with reasons.
    #[must_use]
    pub fn cancellations(&self) -> Vec<(ArenaId, String)> {
        self.cancellations.lock().clone()
    }
}

#[async_trait]
impl StatsProvider for RecordingStats {
    async fn record_outcome(&self, outcome: &SessionOutcome) -> Result<(), ProviderError> {
        self.outcomes.lock().push(outcome.clone());
        Ok(())
    }

    async fn record_cancellation(
        &self,
        snapshot: &StatusSnapshot,
        reason: &str,
    ) -> Result<(), ProviderError> {
        self.cancellations
            .lock()
            .push((snapshot.arena, reason.to_string()));
        Ok(())
    }
}

/// Records reward issuance; can be set to fail.
#[derive(Debug, Default)]
pub struct RecordingRewards {
    issued: Mutex<Vec<(ArenaId, ParticipantId, u64)>>,
    fail: bool,
}

impl RecordingRewards {
    /// Issuer that accepts every request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issuer that rejects every request but still records it.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            issued: Mutex::default(),
            fail: true,
        }
    }

    /// Requests received.
    #[must_use]
    pub fn issued(&self) -> Vec<(ArenaId, ParticipantId, u64)> {
        self.issued.lock().clone()
    }
}

#[async_trait]
impl RewardIssuer for RecordingRewards {
    async fn issue(
        &self,
        arena: ArenaId,
        winner: ParticipantId,
        amount: u64,
    ) -> Result<(), ProviderError> {
        self.issued.lock().push((arena, winner, amount));
        if self.fail {
            Err(ProviderError::Unavailable {
                provider: "rewards",
                message: "wallet offline".to_string(),
            })
        } else {
            Ok(())
        }
    }
}
