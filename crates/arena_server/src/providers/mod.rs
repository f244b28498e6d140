//! External collaborators of a running session.
//!
//! The orchestrator talks to the outside world only through these traits:
//! recruitment hands over the roster, the output sink receives narration
//! and status snapshots, the stats provider receives per-participant deltas,
//! and the reward issuer pays the winner. Implementations decide what
//! "outside" means (chat channel, database, wallet).

use std::fmt;
use std::sync::Arc;

use arena_core::outcome::SessionOutcome;
use arena_core::participant::ParticipantId;
use arena_core::session::{ArenaId, StatusSnapshot};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

pub mod logging;
pub mod memory;

pub use logging::{TracingRewards, TracingSink, TracingStats};
pub use memory::{FixedRoster, RecordingRewards, RecordingSink, RecordingStats};

/// One participant handed over by recruitment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recruit {
    /// Participant id.
    pub id: ParticipantId,
    /// Display name.
    pub display_name: String,
}

impl Recruit {
    /// Create a recruit.
    pub fn new(id: impl Into<ParticipantId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// Supplies the final roster for an arena.
#[async_trait]
pub trait RecruitmentProvider: Send + Sync + fmt::Debug {
    /// Final participant list, in join order.
    ///
    /// # Errors
    /// - `ProviderError::Unavailable` - Recruitment could not complete
    async fn recruit(&self, arena: ArenaId) -> Result<Vec<Recruit>, ProviderError>;
}

/// Receives narration and status.
#[async_trait]
pub trait OutputSink: Send + Sync + fmt::Debug {
    /// Deliver one narration line, already rendered.
    async fn narrate(&self, arena: ArenaId, message: &str) -> Result<(), ProviderError>;

    /// Deliver a status snapshot.
    async fn status(&self, snapshot: &StatusSnapshot) -> Result<(), ProviderError>;
}

/// Receives per-participant deltas.
#[async_trait]
pub trait StatsProvider: Send + Sync + fmt::Debug {
    /// Report a finished session.
    async fn record_outcome(&self, outcome: &SessionOutcome) -> Result<(), ProviderError>;

    /// Report a cancelled session.
    async fn record_cancellation(
        &self,
        snapshot: &StatusSnapshot,
        reason: &str,
    ) -> Result<(), ProviderError>;
}

/// Pays the winner.
#[async_trait]
pub trait RewardIssuer: Send + Sync + fmt::Debug {
    /// Issue `amount` to `winner`. Called at most once per session.
    async fn issue(
        &self,
        arena: ArenaId,
        winner: ParticipantId,
        amount: u64,
    ) -> Result<(), ProviderError>;
}

/// The collaborators a session task reports to.
#[derive(Debug, Clone)]
pub struct Providers {
    /// Narration and status.
    pub output: Arc<dyn OutputSink>,
    /// Stats deltas.
    pub stats: Arc<dyn StatsProvider>,
    /// Reward payment.
    pub rewards: Arc<dyn RewardIssuer>,
}

impl Providers {
    /// Collaborators that only write to the tracing log.
    #[must_use]
    pub fn logging() -> Self {
        Self {
            output: Arc::new(TracingSink),
            stats: Arc::new(TracingStats),
            rewards: Arc::new(TracingRewards),
        }
    }
}
