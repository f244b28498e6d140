//! Per-tier base weights, batch sizes, and pacing.

use serde::{Deserialize, Serialize};

use crate::events::EventCategory;
use crate::tier::Tier;

/// Weight per event category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryWeights {
    /// Weight of [`EventCategory::Elimination`].
    pub elimination: f64,
    /// Weight of [`EventCategory::Survival`].
    pub survival: f64,
    /// Weight of [`EventCategory::SponsorRevival`].
    pub sponsor_revival: f64,
    /// Weight of [`EventCategory::Alliance`].
    pub alliance: f64,
    /// Weight of [`EventCategory::SupplyFind`].
    pub supply_find: f64,
}

impl CategoryWeights {
    /// All categories weighted zero.
    pub const ZERO: Self = Self {
        elimination: 0.0,
        survival: 0.0,
        sponsor_revival: 0.0,
        alliance: 0.0,
        supply_find: 0.0,
    };

    /// Build weights in [`EventCategory::ALL`] order.
    #[must_use]
    pub const fn new(
        elimination: f64,
        survival: f64,
        sponsor_revival: f64,
        alliance: f64,
        supply_find: f64,
    ) -> Self {
        Self {
            elimination,
            survival,
            sponsor_revival,
            alliance,
            supply_find,
        }
    }

    /// Weight for one category.
    #[must_use]
    pub const fn get(&self, category: EventCategory) -> f64 {
        match category {
            EventCategory::Elimination => self.elimination,
            EventCategory::Survival => self.survival,
            EventCategory::SponsorRevival => self.sponsor_revival,
            EventCategory::Alliance => self.alliance,
            EventCategory::SupplyFind => self.supply_find,
        }
    }

    /// Replace the weight for one category.
    pub fn set(&mut self, category: EventCategory, weight: f64) {
        let slot = match category {
            EventCategory::Elimination => &mut self.elimination,
            EventCategory::Survival => &mut self.survival,
            EventCategory::SponsorRevival => &mut self.sponsor_revival,
            EventCategory::Alliance => &mut self.alliance,
            EventCategory::SupplyFind => &mut self.supply_find,
        };
        *slot = weight;
    }

    /// `(category, weight)` pairs in [`EventCategory::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (EventCategory, f64)> + '_ {
        EventCategory::ALL.into_iter().map(|c| (c, self.get(c)))
    }

    /// Sum of all weights.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.iter().map(|(_, w)| w).sum()
    }
}

/// Tuning for one population tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierProfile {
    /// Base category weights before condition modifiers.
    pub weights: CategoryWeights,
    /// Fewest sub-events per round.
    pub batch_min: u32,
    /// Most sub-events per round.
    pub batch_max: u32,
    /// Delay after a round, in milliseconds.
    pub pacing_ms: u64,
}

/// Profiles for every tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierTable {
    /// Two or fewer alive.
    pub finale: TierProfile,
    /// Exactly three alive.
    pub near_finale: TierProfile,
    /// Four or five alive.
    pub endgame: TierProfile,
    /// Six to ten alive.
    pub midgame: TierProfile,
    /// More than ten alive.
    pub early: TierProfile,
}

impl TierTable {
    /// Profile for a tier.
    #[must_use]
    pub const fn profile(&self, tier: Tier) -> &TierProfile {
        match tier {
            Tier::Finale => &self.finale,
            Tier::NearFinale => &self.near_finale,
            Tier::Endgame => &self.endgame,
            Tier::Midgame => &self.midgame,
            Tier::Early => &self.early,
        }
    }

    pub(crate) fn validate(&self, floor: f64, errors: &mut Vec<String>) {
        let mut previous_pacing = 0;
        for tier in Tier::ALL {
            let profile = self.profile(tier);
            for (category, weight) in profile.weights.iter() {
                if !weight.is_finite() || weight < floor {
                    errors.push(format!(
                        "{} weight for {} is {weight}, below floor {floor}",
                        tier.label(),
                        category.label()
                    ));
                }
            }
            if profile.batch_min == 0 || profile.batch_min > profile.batch_max {
                errors.push(format!(
                    "{} batch range {}..={} is empty or zero",
                    tier.label(),
                    profile.batch_min,
                    profile.batch_max
                ));
            }
            // Tier::ALL runs smallest population first, so pacing must not shrink.
            if profile.pacing_ms < previous_pacing {
                errors.push(format!(
                    "{} pacing {}ms is shorter than a smaller tier ({previous_pacing}ms)",
                    tier.label(),
                    profile.pacing_ms
                ));
            }
            previous_pacing = profile.pacing_ms;
        }
    }
}

impl Default for TierTable {
    fn default() -> Self {
        Self {
            finale: TierProfile {
                weights: CategoryWeights::new(45.0, 20.0, 10.0, 10.0, 15.0),
                batch_min: 1,
                batch_max: 2,
                pacing_ms: 2_000,
            },
            near_finale: TierProfile {
                weights: CategoryWeights::new(40.0, 20.0, 10.0, 15.0, 15.0),
                batch_min: 1,
                batch_max: 3,
                pacing_ms: 3_000,
            },
            endgame: TierProfile {
                weights: CategoryWeights::new(40.0, 20.0, 8.0, 17.0, 15.0),
                batch_min: 2,
                batch_max: 3,
                pacing_ms: 4_000,
            },
            midgame: TierProfile {
                weights: CategoryWeights::new(35.0, 25.0, 6.0, 17.0, 17.0),
                batch_min: 2,
                batch_max: 4,
                pacing_ms: 5_000,
            },
            early: TierProfile {
                weights: CategoryWeights::new(30.0, 25.0, 5.0, 20.0, 20.0),
                batch_min: 3,
                batch_max: 5,
                pacing_ms: 6_000,
            },
        }
    }
}
