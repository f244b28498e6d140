//! Proptest strategies for session testing.
//!
//! These strategies generate random but reproducible inputs for
//! property-based testing of the contest rules.

use arena_core::data::ConditionId;
use arena_core::events::EventCategory;
use proptest::prelude::*;

/// Any session seed.
pub fn arb_seed() -> impl Strategy<Value = u64> {
    any::<u64>()
}

/// Participant counts that can start a session with default tables.
pub fn arb_participant_count() -> impl Strategy<Value = u64> {
    2u64..=48
}

/// Any event category.
pub fn arb_category() -> impl Strategy<Value = EventCategory> {
    prop::sample::select(EventCategory::ALL.to_vec())
}

/// A condition defined in the default tables.
pub fn arb_condition_id() -> impl Strategy<Value = ConditionId> {
    prop::sample::select(vec![
        "scorching_heat",
        "thick_fog",
        "acid_rain",
        "flash_flood",
        "blood_moon",
        "tracker_jacker_swarm",
        "gamemaker_gift",
        "whispering_woods",
        "earthquake",
        "firestorm",
        "sponsors_mercy",
    ])
    .prop_map(ConditionId::new)
}

/// An admin intervention applied between rounds.
#[derive(Debug, Clone)]
pub enum Intervention {
    /// Force the next sub-event's category.
    Category(EventCategory),
    /// Force a condition from the next round.
    Condition(ConditionId),
}

/// Generate an intervention.
pub fn arb_intervention() -> impl Strategy<Value = Intervention> {
    prop_oneof![
        arb_category().prop_map(Intervention::Category),
        arb_condition_id().prop_map(Intervention::Condition),
    ]
}

/// Generate interventions keyed by round (may repeat rounds).
pub fn arb_intervention_plan(max_len: usize) -> impl Strategy<Value = Vec<(u32, Intervention)>> {
    proptest::collection::vec((1u32..40, arb_intervention()), 0..max_len)
}
