//! Prize multipliers keyed on starting participant count.

use serde::{Deserialize, Serialize};

/// One reward bracket: applies from `min_participants` up to the next bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardTier {
    /// Inclusive lower bound on participant count.
    pub min_participants: usize,
    /// Multiplier in percent (150 = 1.5x).
    pub multiplier_percent: u32,
}

/// Ordered reward brackets.
///
/// The first bracket starts at zero and bounds strictly increase, so the
/// brackets are contiguous, non-overlapping, and cover every count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardTable {
    /// Brackets in ascending order.
    pub tiers: Vec<RewardTier>,
}

impl RewardTable {
    /// Bracket that applies to `participants`.
    #[must_use]
    pub fn tier_for(&self, participants: usize) -> Option<&RewardTier> {
        self.tiers
            .iter()
            .rev()
            .find(|t| participants >= t.min_participants)
    }

    /// Multiplier in percent for `participants`; 100 if no bracket applies.
    #[must_use]
    pub fn multiplier_percent(&self, participants: usize) -> u32 {
        self.tier_for(participants)
            .map_or(100, |t| t.multiplier_percent)
    }

    /// `base_reward` scaled by the bracket multiplier, rounded down and
    /// saturating at `u64::MAX`.
    #[must_use]
    pub fn compute(&self, participants: usize, base_reward: u64) -> u64 {
        let pct = u128::from(self.multiplier_percent(participants));
        u64::try_from(u128::from(base_reward) * pct / 100).unwrap_or(u64::MAX)
    }

    pub(crate) fn validate(&self, errors: &mut Vec<String>) {
        match self.tiers.first() {
            None => errors.push("reward table has no tiers".to_string()),
            Some(first) if first.min_participants != 0 => errors.push(format!(
                "first reward tier starts at {}, expected 0",
                first.min_participants
            )),
            Some(_) => {}
        }
        for pair in self.tiers.windows(2) {
            if pair[1].min_participants <= pair[0].min_participants {
                errors.push(format!(
                    "reward tier bounds not increasing: {} then {}",
                    pair[0].min_participants, pair[1].min_participants
                ));
            }
            if pair[1].multiplier_percent <= pair[0].multiplier_percent {
                errors.push(format!(
                    "reward multipliers not increasing: {}% then {}%",
                    pair[0].multiplier_percent, pair[1].multiplier_percent
                ));
            }
        }
    }
}

impl Default for RewardTable {
    fn default() -> Self {
        let tier = |min_participants, multiplier_percent| RewardTier {
            min_participants,
            multiplier_percent,
        };
        Self {
            tiers: vec![
                tier(0, 100),
                tier(5, 150),
                tier(10, 200),
                tier(20, 250),
                tier(30, 300),
            ],
        }
    }
}
