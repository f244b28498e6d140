//! Rotating arena conditions.
//!
//! A condition stays active for a few rounds, biases event-category weights,
//! and occasionally prefixes event narration. New conditions are drawn from a
//! phase pool chosen by round number and population:
//!
//! | Phase        | When                                     |
//! |--------------|------------------------------------------|
//! | Basic        | `round <= early_round_limit`             |
//! | Supernatural | after the opening rounds                 |
//! | Cataclysmic  | `alive <= cataclysm_alive_threshold`     |
//!
//! Selection never fails from the caller's point of view: any problem falls
//! back to a neutral condition and is logged.

use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::data::{
    probability, ArenaTables, CategoryWeights, ConditionDef, ConditionId, WeightModifier,
};
use crate::error::{ArenaError, Result};

/// Id of the fallback condition.
pub const NEUTRAL_CONDITION_ID: &str = "clear_skies";

/// An active arena condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    id: ConditionId,
    name: String,
    announcement: String,
    remaining: u32,
    modifiers: Vec<WeightModifier>,
    narration: Vec<String>,
}

impl Condition {
    fn from_def(def: &ConditionDef, duration: u32) -> Self {
        Self {
            id: def.id.clone(),
            name: def.name.clone(),
            announcement: def.announcement.clone(),
            remaining: duration,
            modifiers: def.modifiers.clone(),
            narration: def.narration.clone(),
        }
    }

    /// Condition with no modifiers and no narration.
    #[must_use]
    pub fn neutral(duration: u32) -> Self {
        Self {
            id: ConditionId::new(NEUTRAL_CONDITION_ID),
            name: "Clear Skies".to_string(),
            announcement: "The skies clear and the arena holds its breath.".to_string(),
            remaining: duration,
            modifiers: Vec::new(),
            narration: Vec::new(),
        }
    }

    /// Identifier.
    #[must_use]
    pub const fn id(&self) -> &ConditionId {
        &self.id
    }

    /// Human-readable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Line narrated when the condition takes hold.
    #[must_use]
    pub fn announcement(&self) -> &str {
        &self.announcement
    }

    /// Rounds left before the condition expires.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Weight adjustments.
    #[must_use]
    pub fn modifiers(&self) -> &[WeightModifier] {
        &self.modifiers
    }

    /// Whether this is the fallback condition.
    #[must_use]
    pub fn is_neutral(&self) -> bool {
        self.id.as_str() == NEUTRAL_CONDITION_ID
    }
}

/// Owns the active condition for one session.
#[derive(Debug, Clone)]
pub struct ConditionManager {
    tables: Arc<ArenaTables>,
    active: Option<Condition>,
}

impl ConditionManager {
    /// Create a manager with no active condition.
    #[must_use]
    pub fn new(tables: Arc<ArenaTables>) -> Self {
        Self {
            tables,
            active: None,
        }
    }

    /// Currently active condition.
    #[must_use]
    pub const fn active(&self) -> Option<&Condition> {
        self.active.as_ref()
    }

    /// Select and activate a new condition.
    ///
    /// `forced` skips the phase pools and activates that condition directly.
    /// Any failure activates the neutral condition instead.
    pub fn select_condition<R: Rng + ?Sized>(
        &mut self,
        round: u32,
        alive: usize,
        forced: Option<&ConditionId>,
        rng: &mut R,
    ) -> ConditionId {
        let condition = match self.try_select(round, alive, forced, rng) {
            Ok(condition) => condition,
            Err(e) => {
                warn!(round, alive, error = %e, "Condition selection failed, using neutral condition");
                Condition::neutral(self.tables.conditions.min_duration.max(1))
            }
        };
        debug!(
            round,
            condition = %condition.id,
            duration = condition.remaining,
            "Condition activated"
        );
        let id = condition.id.clone();
        self.active = Some(condition);
        id
    }

    fn try_select<R: Rng + ?Sized>(
        &self,
        round: u32,
        alive: usize,
        forced: Option<&ConditionId>,
        rng: &mut R,
    ) -> Result<Condition> {
        let table = &self.tables.conditions;

        let def = match forced {
            Some(id) => table
                .definition(id)
                .ok_or_else(|| ArenaError::UnknownCondition(id.to_string()))?,
            None => {
                let phase = table.phase_for(round, alive);
                let entry = table
                    .pool(phase)
                    .choose_weighted(rng, |e| e.weight)
                    .map_err(|e| {
                        ArenaError::ValidationError(vec![format!("{phase:?} pool: {e}")])
                    })?;
                table
                    .definition(&entry.id)
                    .ok_or_else(|| ArenaError::UnknownCondition(entry.id.to_string()))?
            }
        };

        if table.min_duration == 0 || table.min_duration > table.max_duration {
            return Err(ArenaError::ValidationError(vec![format!(
                "condition duration range {}..={}",
                table.min_duration, table.max_duration
            )]));
        }
        let duration = rng.gen_range(table.min_duration..=table.max_duration);
        Ok(Condition::from_def(def, duration))
    }

    /// Apply the active condition's modifiers to `base`.
    ///
    /// Categories without a modifier pass through untouched; modified ones
    /// never drop below the weight floor.
    #[must_use]
    pub fn apply_to_weights(&self, base: CategoryWeights) -> CategoryWeights {
        let Some(condition) = &self.active else {
            return base;
        };
        let floor = self.tables.conditions.weight_floor;
        let mut adjusted = base;
        for modifier in &condition.modifiers {
            let weight = modifier.effect.apply(adjusted.get(modifier.category));
            let weight = if weight.is_finite() { weight.max(floor) } else { floor };
            adjusted.set(modifier.category, weight);
        }
        adjusted
    }

    /// Count down one round.
    ///
    /// Returns `true` exactly once, on the tick that reaches zero.
    pub fn tick_duration(&mut self) -> bool {
        match &mut self.active {
            Some(condition) if condition.remaining > 0 => {
                condition.remaining -= 1;
                condition.remaining == 0
            }
            _ => false,
        }
    }

    /// Possibly prefix `message` with condition flavor text.
    ///
    /// The prefix is inserted verbatim in front of an already-rendered
    /// message, so placeholders and formatting inside it are untouched.
    pub fn wrap_narration<R: Rng + ?Sized>(&self, message: String, rng: &mut R) -> String {
        let Some(condition) = &self.active else {
            return message;
        };
        let chance = probability(self.tables.conditions.narration_chance);
        if !rng.gen_bool(chance) {
            return message;
        }
        match condition.narration.choose(rng) {
            Some(prefix) => format!("{prefix} {message}"),
            None => message,
        }
    }
}
