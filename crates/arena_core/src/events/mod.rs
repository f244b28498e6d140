//! Event categories, weighted selection, and dispatch to handlers.
//!
//! A round runs a batch of sub-events. For each one the selector draws a
//! category from the condition-adjusted tier weights, then resolves it
//! against the ledger. Resolution never fails: expected ledger errors turn
//! into a no-op, anything else into the generic fallback line.

mod handlers;
pub mod narration;

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::conditions::ConditionManager;
use crate::data::{ArenaTables, CategoryWeights, TierProfile};
use crate::error::ArenaError;
use crate::ledger::Ledger;
use crate::participant::ParticipantId;

/// Kind of sub-event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventCategory {
    /// One or more participants are eliminated.
    Elimination,
    /// A participant gets through the day.
    Survival,
    /// The most recently eliminated participant may be revived.
    SponsorRevival,
    /// Two participants cooperate or fall out.
    Alliance,
    /// One or two participants find supplies.
    SupplyFind,
}

impl EventCategory {
    /// Every category, in weight-table order.
    pub const ALL: [EventCategory; 5] = [
        EventCategory::Elimination,
        EventCategory::Survival,
        EventCategory::SponsorRevival,
        EventCategory::Alliance,
        EventCategory::SupplyFind,
    ];

    /// Short lowercase label for logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            EventCategory::Elimination => "elimination",
            EventCategory::Survival => "survival",
            EventCategory::SponsorRevival => "sponsor-revival",
            EventCategory::Alliance => "alliance",
            EventCategory::SupplyFind => "supply-find",
        }
    }

    /// Living participants a handler needs to run.
    #[must_use]
    pub const fn min_alive(self) -> usize {
        match self {
            EventCategory::Elimination | EventCategory::Alliance => 2,
            EventCategory::Survival | EventCategory::SupplyFind => 1,
            EventCategory::SponsorRevival => 0,
        }
    }
}

/// Weighted draw of a category.
///
/// Fails closed to [`EventCategory::Survival`] when no category has a
/// positive weight.
pub fn choose_category<R: Rng + ?Sized>(weights: &CategoryWeights, rng: &mut R) -> EventCategory {
    let values: Vec<f64> = EventCategory::ALL
        .iter()
        .map(|c| {
            let w = weights.get(*c);
            if w.is_finite() && w > 0.0 {
                w
            } else {
                0.0
            }
        })
        .collect();
    match WeightedIndex::new(&values) {
        Ok(dist) => EventCategory::ALL[dist.sample(rng)],
        Err(_) => EventCategory::Survival,
    }
}

/// Number of sub-events to run this round.
pub fn batch_size<R: Rng + ?Sized>(profile: &TierProfile, rng: &mut R) -> u32 {
    let min = profile.batch_min.max(1);
    let max = profile.batch_max.max(min);
    rng.gen_range(min..=max)
}

/// What one sub-event did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventOutcome {
    /// Category that was resolved.
    pub category: EventCategory,
    /// Narration lines, already rendered and condition-wrapped.
    pub messages: Vec<String>,
    /// Participants eliminated by this event.
    pub eliminated: Vec<ParticipantId>,
    /// Participant revived by this event.
    pub revived: Option<ParticipantId>,
    /// Whether the handler failed and the fallback line was used.
    pub fallback: bool,
}

impl EventOutcome {
    pub(crate) fn new(category: EventCategory) -> Self {
        Self {
            category,
            messages: Vec::new(),
            eliminated: Vec::new(),
            revived: None,
            fallback: false,
        }
    }

    pub(crate) fn with_message(category: EventCategory, message: String) -> Self {
        let mut outcome = Self::new(category);
        outcome.messages.push(message);
        outcome
    }
}

/// Resolves sub-events against a ledger using shared tables.
#[derive(Debug, Clone, Copy)]
pub struct EventSelector<'a> {
    tables: &'a ArenaTables,
}

impl<'a> EventSelector<'a> {
    /// Create a selector over `tables`.
    #[must_use]
    pub const fn new(tables: &'a ArenaTables) -> Self {
        Self { tables }
    }

    /// Resolve one sub-event of `category`.
    ///
    /// Categories needing more living participants than remain degrade to
    /// survival. `sponsor_chance` is the condition-adjusted revival roll.
    pub fn resolve<R: Rng + ?Sized>(
        &self,
        category: EventCategory,
        ledger: &mut Ledger,
        conditions: &ConditionManager,
        sponsor_chance: f64,
        rng: &mut R,
    ) -> EventOutcome {
        let alive = ledger.alive_count();
        let category = if alive < category.min_alive() {
            EventCategory::Survival
        } else {
            category
        };

        let result = if alive < category.min_alive() {
            Err(ArenaError::EventExecutionFailure(format!(
                "{} needs {} alive, have {alive}",
                category.label(),
                category.min_alive()
            )))
        } else {
            let rules = &self.tables.events;
            let narration = &self.tables.narration;
            match category {
                EventCategory::Elimination => handlers::elimination(ledger, rules, narration, rng),
                EventCategory::Survival => handlers::survival(ledger, narration, rng),
                EventCategory::SponsorRevival => {
                    handlers::sponsor_revival(ledger, narration, sponsor_chance, rng)
                }
                EventCategory::Alliance => handlers::alliance(ledger, rules, narration, rng),
                EventCategory::SupplyFind => handlers::supply_find(ledger, narration, rng),
            }
        };

        let mut outcome = match result {
            Ok(outcome) => outcome,
            Err(ArenaError::RevivalAlreadyUsed(id)) => {
                debug!(participant = %id, "Sponsor revival skipped, revival already used");
                EventOutcome::new(category)
            }
            Err(e) => {
                warn!(category = category.label(), error = %e, "Event handler failed, using fallback");
                let mut outcome = EventOutcome::with_message(category, self.fallback_line(rng));
                outcome.fallback = true;
                return outcome;
            }
        };

        outcome.messages = outcome
            .messages
            .into_iter()
            .map(|m| conditions.wrap_narration(m, rng))
            .collect();
        outcome
    }

    /// Generic line used when a handler cannot produce one.
    pub fn fallback_line<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        narration::pick(&self.tables.narration.fallback, "fallback", rng)
            .map_or_else(|_| "Something happens in the arena.".to_string(), str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::participant::{Cohort, ParticipantProfile};
    use proptest::prelude::{any, prop_assert, prop_assert_eq, prop_oneof, proptest, Just, Strategy};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn arb_weight() -> impl Strategy<Value = f64> {
        prop_oneof![
            Just(0.0),
            Just(-1.0),
            Just(f64::NAN),
            Just(f64::INFINITY),
            -1_000.0..1_000.0f64,
        ]
    }

    fn arb_weights() -> impl Strategy<Value = CategoryWeights> {
        (arb_weight(), arb_weight(), arb_weight(), arb_weight(), arb_weight())
            .prop_map(|(a, b, c, d, e)| CategoryWeights::new(a, b, c, d, e))
    }

    proptest! {
        #[test]
        fn choose_category_picks_a_positive_weight(weights in arb_weights(), seed in any::<u64>()) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let chosen = choose_category(&weights, &mut rng);
            let usable = |w: f64| w.is_finite() && w > 0.0;

            if EventCategory::ALL.iter().any(|c| usable(weights.get(*c))) {
                prop_assert!(usable(weights.get(chosen)), "{chosen:?} drawn from {weights:?}");
            } else {
                prop_assert_eq!(chosen, EventCategory::Survival);
            }
        }
    }

    fn ledger_with(n: u64) -> Ledger {
        let mut ledger = Ledger::new();
        for i in 1..=n {
            ledger
                .admit(
                    ParticipantId(i),
                    ParticipantProfile {
                        display_name: format!("P{i}"),
                        title: "the Tested".to_string(),
                        cohort: Cohort(1),
                    },
                )
                .unwrap();
        }
        ledger
    }

    #[test]
    fn test_choose_category_all_zero_is_survival() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        for _ in 0..10 {
            assert_eq!(
                choose_category(&CategoryWeights::ZERO, &mut rng),
                EventCategory::Survival
            );
        }
    }

    #[test]
    fn test_choose_category_single_nonzero() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let weights = CategoryWeights::new(0.0, 0.0, 0.0, 3.0, 0.0);
        for _ in 0..50 {
            assert_eq!(choose_category(&weights, &mut rng), EventCategory::Alliance);
        }
    }

    #[test]
    fn test_choose_category_ignores_invalid_weights() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let weights = CategoryWeights::new(f64::NAN, -4.0, 0.0, 0.0, 2.0);
        for _ in 0..50 {
            assert_eq!(choose_category(&weights, &mut rng), EventCategory::SupplyFind);
        }
    }

    #[test]
    fn test_batch_size_within_profile() {
        let tables = ArenaTables::default();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        for _ in 0..100 {
            let n = batch_size(&tables.tiers.early, &mut rng);
            assert!((3..=5).contains(&n));
            let n = batch_size(&tables.tiers.finale, &mut rng);
            assert!((1..=2).contains(&n));
        }
    }

    #[test]
    fn test_resolve_degrades_when_too_few_alive() {
        let tables = ArenaTables::default();
        let selector = EventSelector::new(&tables);
        let conditions = ConditionManager::new(Arc::new(tables.clone()));
        let mut ledger = ledger_with(2);
        ledger.eliminate(ParticipantId(2), None).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(9);

        let outcome = selector.resolve(
            EventCategory::Elimination,
            &mut ledger,
            &conditions,
            1.0,
            &mut rng,
        );

        assert_eq!(outcome.category, EventCategory::Survival);
        assert!(outcome.eliminated.is_empty());
        assert_eq!(outcome.messages.len(), 1);
        assert_eq!(ledger.alive_count(), 1);
    }

    #[test]
    fn test_resolve_with_nobody_alive_uses_fallback() {
        let tables = ArenaTables::default();
        let selector = EventSelector::new(&tables);
        let conditions = ConditionManager::new(Arc::new(tables.clone()));
        let mut ledger = ledger_with(1);
        ledger.eliminate(ParticipantId(1), None).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(9);

        let outcome = selector.resolve(
            EventCategory::Alliance,
            &mut ledger,
            &conditions,
            1.0,
            &mut rng,
        );

        assert!(outcome.fallback);
        assert_eq!(outcome.messages, vec![tables.narration.fallback[0].clone()]);
    }

    #[test]
    fn test_resolve_broken_template_uses_fallback() {
        let mut tables = ArenaTables::default();
        tables.narration.survival = vec!["{nobody} hides".to_string()];
        let selector = EventSelector::new(&tables);
        let conditions = ConditionManager::new(Arc::new(tables.clone()));
        let mut ledger = ledger_with(3);
        let mut rng = ChaCha8Rng::seed_from_u64(9);

        let outcome = selector.resolve(
            EventCategory::Survival,
            &mut ledger,
            &conditions,
            1.0,
            &mut rng,
        );

        assert!(outcome.fallback);
        assert_eq!(outcome.messages.len(), 1);
    }
}
