//! Declarative tuning tables for the arena.
//!
//! Every weight, threshold, and narration pool the simulation reads lives in
//! [`ArenaTables`]. The tables are built once (from defaults or a RON file),
//! validated, and shared behind an `Arc` by the ledger-facing systems.
//!
//! **Note:** This module contains no IO - it only defines data types and
//! parses RON text. File loading is handled by the host crates.
//!
//! # Example RON
//!
//! ```ron
//! ArenaTables(
//!     session: (min_participants: 2, max_participants: 24),
//!     events: (caused_chance: 0.7),
//! )
//! ```
//!
//! Sections and fields left out fall back to the built-in defaults.

mod condition_data;
mod narration_data;
mod reward_data;
mod tier_data;

use serde::{Deserialize, Serialize};

pub use condition_data::{
    ConditionDef, ConditionId, ConditionTable, Effect, Phase, PoolEntry, WeightModifier,
};
pub use narration_data::NarrationTable;
pub use reward_data::{RewardTable, RewardTier};
pub use tier_data::{CategoryWeights, TierProfile, TierTable};

use crate::error::{ArenaError, Result};
use crate::tier::Tier;

/// Participant limits and reporting sizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionRules {
    /// Fewest participants needed to start.
    pub min_participants: usize,
    /// Most participants a session will admit.
    pub max_participants: usize,
    /// Entries in the kill leaderboard.
    pub leaderboard_size: usize,
}

impl Default for SessionRules {
    fn default() -> Self {
        Self {
            min_participants: 2,
            max_participants: 48,
            leaderboard_size: 3,
        }
    }
}

/// Probabilities used by the event handlers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventRules {
    /// Chance an elimination is credited to another participant.
    pub caused_chance: f64,
    /// Alive count at which multi-victim eliminations become possible.
    pub multi_victim_min_alive: usize,
    /// Chance a possible multi-victim elimination happens.
    pub multi_victim_chance: f64,
    /// Most victims in one elimination.
    pub multi_victim_max: usize,
    /// Base chance a sponsor-revival event actually revives someone.
    pub sponsor_roll_chance: f64,
    /// Chance an alliance event is a betrayal. Betrayals are narration only.
    pub betrayal_chance: f64,
}

impl Default for EventRules {
    fn default() -> Self {
        Self {
            caused_chance: 0.6,
            multi_victim_min_alive: 8,
            multi_victim_chance: 0.25,
            multi_victim_max: 3,
            sponsor_roll_chance: 0.6,
            betrayal_chance: 0.3,
        }
    }
}

impl EventRules {
    fn validate(&self, errors: &mut Vec<String>) {
        for (name, p) in [
            ("caused_chance", self.caused_chance),
            ("multi_victim_chance", self.multi_victim_chance),
            ("sponsor_roll_chance", self.sponsor_roll_chance),
            ("betrayal_chance", self.betrayal_chance),
        ] {
            if !(0.0..=1.0).contains(&p) {
                errors.push(format!("{name} {p} is not a probability"));
            }
        }
        if self.multi_victim_max < 2 {
            errors.push(format!(
                "multi_victim_max {} must be at least 2",
                self.multi_victim_max
            ));
        }
        // A multi-victim event must never jump the population past the
        // final-three milestone.
        if self.multi_victim_min_alive < self.multi_victim_max + Tier::NEAR_FINALE_MAX {
            errors.push(format!(
                "multi_victim_min_alive {} must be at least multi_victim_max + {}",
                self.multi_victim_min_alive,
                Tier::NEAR_FINALE_MAX
            ));
        }
    }
}

/// All tuning tables for an arena.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaTables {
    /// Participant limits.
    pub session: SessionRules,
    /// Per-tier weights, batch sizes, and pacing.
    pub tiers: TierTable,
    /// Event handler probabilities.
    pub events: EventRules,
    /// Condition rules, pools, and definitions.
    pub conditions: ConditionTable,
    /// Reward brackets.
    pub rewards: RewardTable,
    /// Narration templates.
    pub narration: NarrationTable,
}

impl ArenaTables {
    /// Parse tables from RON text and validate them.
    ///
    /// `origin` names the source in error messages.
    ///
    /// # Errors
    ///
    /// - [`ArenaError::DataParseError`] if the text is not valid RON for this schema.
    /// - [`ArenaError::ValidationError`] if the parsed tables are inconsistent.
    pub fn from_ron_str(text: &str, origin: &str) -> Result<Self> {
        let tables: Self = ron::from_str(text).map_err(|e| ArenaError::DataParseError {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        tables.validate()?;
        Ok(tables)
    }

    /// Check internal consistency.
    ///
    /// Checks for:
    /// - Positive finite weights at or above the condition weight floor
    /// - Non-empty batch ranges and pacing that never shrinks as tiers grow
    /// - Condition pools referencing defined conditions
    /// - Reward brackets starting at zero with increasing bounds and multipliers
    /// - Narration templates using only their documented placeholders
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::ValidationError`] listing every problem found.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.session.min_participants < 2 {
            errors.push(format!(
                "min_participants {} must be at least 2",
                self.session.min_participants
            ));
        }
        if self.session.max_participants < self.session.min_participants {
            errors.push(format!(
                "max_participants {} is below min_participants {}",
                self.session.max_participants, self.session.min_participants
            ));
        }

        self.tiers.validate(self.conditions.weight_floor, &mut errors);
        self.events.validate(&mut errors);
        self.conditions.validate(&mut errors);
        self.rewards.validate(&mut errors);
        self.narration.validate(&mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ArenaError::ValidationError(errors))
        }
    }
}

/// A table chance as a valid probability; non-finite values count as zero.
pub(crate) fn probability(chance: f64) -> f64 {
    if chance.is_finite() {
        chance.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probability_handles_non_finite() {
        assert_eq!(probability(f64::NAN), 0.0);
        assert_eq!(probability(f64::INFINITY), 0.0);
        assert_eq!(probability(-0.5), 0.0);
        assert_eq!(probability(1.5), 1.0);
        assert_eq!(probability(0.25), 0.25);
    }

    #[test]
    fn test_default_tables_are_valid() {
        ArenaTables::default().validate().unwrap();
    }

    #[test]
    fn test_partial_ron_keeps_defaults() {
        let tables = ArenaTables::from_ron_str(
            "(session: (min_participants: 3), events: (caused_chance: 0.9))",
            "inline",
        )
        .unwrap();

        assert_eq!(tables.session.min_participants, 3);
        assert_eq!(tables.session.max_participants, 48);
        assert!((tables.events.caused_chance - 0.9).abs() < f64::EPSILON);
        assert_eq!(tables.tiers, TierTable::default());
    }

    #[test]
    fn test_serialized_defaults_parse_back() {
        let text = ron::ser::to_string(&ArenaTables::default()).unwrap();
        let parsed = ArenaTables::from_ron_str(&text, "roundtrip").unwrap();
        assert_eq!(parsed, ArenaTables::default());
    }

    #[test]
    fn test_bad_ron_reports_origin() {
        let err = ArenaTables::from_ron_str("(session: oops)", "tables.ron").unwrap_err();
        assert!(matches!(err, ArenaError::DataParseError { ref path, .. } if path == "tables.ron"));
    }

    #[test]
    fn test_validation_collects_problems() {
        let mut tables = ArenaTables::default();
        tables.tiers.early.pacing_ms = 1;
        tables.conditions.basic[0].id = ConditionId::new("no_such_condition");
        tables.rewards.tiers[0].min_participants = 1;
        tables.narration.survival.push("{nobody} hides".to_string());
        tables.events.multi_victim_min_alive = 4;

        let Err(ArenaError::ValidationError(errors)) = tables.validate() else {
            panic!("expected validation errors");
        };
        assert_eq!(errors.len(), 5, "{errors:#?}");
    }

    #[test]
    fn test_condition_narration_may_not_carry_placeholders() {
        let mut tables = ArenaTables::default();
        tables.conditions.definitions[0]
            .narration
            .push("Under {victim},".to_string());
        assert!(tables.validate().is_err());
    }
}
