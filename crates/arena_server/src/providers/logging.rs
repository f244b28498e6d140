//! Collaborators that write to the tracing log.

use arena_core::outcome::SessionOutcome;
use arena_core::participant::ParticipantId;
use arena_core::session::{ArenaId, StatusSnapshot};
use async_trait::async_trait;
use tracing::info;

use super::{OutputSink, RewardIssuer, StatsProvider};
use crate::error::ProviderError;

/// Logs narration and status at `info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

#[async_trait]
impl OutputSink for TracingSink {
    async fn narrate(&self, arena: ArenaId, message: &str) -> Result<(), ProviderError> {
        info!(%arena, "{message}");
        Ok(())
    }

    async fn status(&self, snapshot: &StatusSnapshot) -> Result<(), ProviderError> {
        let leaders: Vec<String> = snapshot
            .leaderboard
            .iter()
            .map(|e| format!("{} ({})", e.name, e.kills))
            .collect();
        info!(
            arena = %snapshot.arena,
            round = snapshot.round,
            alive = snapshot.alive,
            total = snapshot.total,
            condition = snapshot.condition.as_deref().unwrap_or("none"),
            leaders = %leaders.join(", "),
            "Status"
        );
        Ok(())
    }
}

/// Logs stats deltas.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingStats;

#[async_trait]
impl StatsProvider for TracingStats {
    async fn record_outcome(&self, outcome: &SessionOutcome) -> Result<(), ProviderError> {
        for stat in &outcome.stats {
            info!(
                arena = %outcome.arena,
                participant = %stat.id,
                won = stat.won,
                kills = stat.kills,
                revivals = stat.revivals,
                "Stats delta"
            );
        }
        Ok(())
    }

    async fn record_cancellation(
        &self,
        snapshot: &StatusSnapshot,
        reason: &str,
    ) -> Result<(), ProviderError> {
        info!(arena = %snapshot.arena, round = snapshot.round, reason, "Session cancelled");
        Ok(())
    }
}

/// Logs reward issuance.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingRewards;

#[async_trait]
impl RewardIssuer for TracingRewards {
    async fn issue(
        &self,
        arena: ArenaId,
        winner: ParticipantId,
        amount: u64,
    ) -> Result<(), ProviderError> {
        info!(%arena, %winner, amount, "Reward issued");
        Ok(())
    }
}
