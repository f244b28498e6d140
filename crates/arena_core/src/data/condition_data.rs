//! Arena condition definitions and phase pools.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::events::EventCategory;

/// Identifier of an arena condition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConditionId(pub String);

impl ConditionId {
    /// Build an id from a string slice.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConditionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConditionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// How a modifier changes a category weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    /// Scale the weight.
    Multiply(f64),
    /// Shift the weight.
    Add(f64),
}

impl Effect {
    /// Apply to a weight without flooring.
    #[must_use]
    pub fn apply(self, weight: f64) -> f64 {
        match self {
            Effect::Multiply(factor) => weight * factor,
            Effect::Add(delta) => weight + delta,
        }
    }
}

/// Adjustment of one category's weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightModifier {
    /// Category affected.
    pub category: EventCategory,
    /// Adjustment applied.
    pub effect: Effect,
}

impl WeightModifier {
    const fn multiply(category: EventCategory, factor: f64) -> Self {
        Self {
            category,
            effect: Effect::Multiply(factor),
        }
    }

    const fn add(category: EventCategory, delta: f64) -> Self {
        Self {
            category,
            effect: Effect::Add(delta),
        }
    }
}

/// Full definition of a condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionDef {
    /// Identifier referenced by pools and admin overrides.
    pub id: ConditionId,
    /// Human-readable name.
    pub name: String,
    /// Line narrated when the condition takes hold.
    pub announcement: String,
    /// Weight adjustments while active.
    #[serde(default)]
    pub modifiers: Vec<WeightModifier>,
    /// Prefixes used to wrap event narration.
    #[serde(default)]
    pub narration: Vec<String>,
}

/// Weighted reference into the condition definitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolEntry {
    /// Condition id.
    pub id: ConditionId,
    /// Relative selection weight within the pool.
    pub weight: f64,
}

impl PoolEntry {
    fn new(id: &str, weight: f64) -> Self {
        Self {
            id: ConditionId::new(id),
            weight,
        }
    }
}

/// Game phase that decides which pool a new condition is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Opening rounds.
    Basic,
    /// After the opening rounds.
    Supernatural,
    /// Few participants left.
    Cataclysmic,
}

/// Rules and content for arena conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConditionTable {
    /// Shortest condition lifetime in rounds.
    pub min_duration: u32,
    /// Longest condition lifetime in rounds.
    pub max_duration: u32,
    /// Chance that an event message gets a condition prefix.
    pub narration_chance: f64,
    /// Lowest weight a modified category can reach.
    pub weight_floor: f64,
    /// Last round that still draws from the basic pool.
    pub early_round_limit: u32,
    /// Alive count at or below which the cataclysmic pool is used.
    pub cataclysm_alive_threshold: usize,
    /// Pool for the opening rounds.
    pub basic: Vec<PoolEntry>,
    /// Pool for the middle of the contest.
    pub supernatural: Vec<PoolEntry>,
    /// Pool for the end of the contest.
    pub cataclysmic: Vec<PoolEntry>,
    /// Every selectable condition.
    pub definitions: Vec<ConditionDef>,
}

impl ConditionTable {
    /// Phase for the current round and population.
    #[must_use]
    pub fn phase_for(&self, round: u32, alive: usize) -> Phase {
        if alive <= self.cataclysm_alive_threshold {
            Phase::Cataclysmic
        } else if round <= self.early_round_limit {
            Phase::Basic
        } else {
            Phase::Supernatural
        }
    }

    /// Candidate pool for a phase.
    #[must_use]
    pub fn pool(&self, phase: Phase) -> &[PoolEntry] {
        match phase {
            Phase::Basic => &self.basic,
            Phase::Supernatural => &self.supernatural,
            Phase::Cataclysmic => &self.cataclysmic,
        }
    }

    /// Find a definition by id.
    #[must_use]
    pub fn definition(&self, id: &ConditionId) -> Option<&ConditionDef> {
        self.definitions.iter().find(|d| &d.id == id)
    }

    pub(crate) fn validate(&self, errors: &mut Vec<String>) {
        if self.min_duration == 0 || self.min_duration > self.max_duration {
            errors.push(format!(
                "condition duration range {}..={} is empty or zero",
                self.min_duration, self.max_duration
            ));
        }
        if !(0.0..=1.0).contains(&self.narration_chance) {
            errors.push(format!(
                "narration chance {} is not a probability",
                self.narration_chance
            ));
        }
        if !self.weight_floor.is_finite() || self.weight_floor <= 0.0 {
            errors.push(format!("weight floor {} must be positive", self.weight_floor));
        }

        for phase in [Phase::Basic, Phase::Supernatural, Phase::Cataclysmic] {
            let pool = self.pool(phase);
            if pool.is_empty() {
                errors.push(format!("{phase:?} condition pool is empty"));
            }
            for entry in pool {
                if self.definition(&entry.id).is_none() {
                    errors.push(format!("{phase:?} pool references unknown condition '{}'", entry.id));
                }
                if !entry.weight.is_finite() || entry.weight <= 0.0 {
                    errors.push(format!(
                        "{phase:?} pool weight for '{}' must be positive",
                        entry.id
                    ));
                }
            }
        }

        for (index, def) in self.definitions.iter().enumerate() {
            if self.definitions[..index].iter().any(|d| d.id == def.id) {
                errors.push(format!("duplicate condition '{}'", def.id));
            }
            for line in &def.narration {
                if line.contains('{') || line.contains('}') {
                    errors.push(format!(
                        "condition '{}' narration contains placeholder braces: {line}",
                        def.id
                    ));
                }
            }
        }
    }
}

impl Default for ConditionTable {
    fn default() -> Self {
        use EventCategory::{Alliance, Elimination, SponsorRevival, SupplyFind, Survival};

        let def = |id: &str, name: &str, announcement: &str, modifiers: Vec<WeightModifier>, narration: &[&str]| {
            ConditionDef {
                id: ConditionId::new(id),
                name: name.to_string(),
                announcement: announcement.to_string(),
                modifiers,
                narration: narration.iter().map(|s| (*s).to_string()).collect(),
            }
        };

        Self {
            min_duration: 3,
            max_duration: 6,
            narration_chance: 0.35,
            weight_floor: 0.5,
            early_round_limit: 4,
            cataclysm_alive_threshold: 4,
            basic: vec![
                PoolEntry::new("scorching_heat", 3.0),
                PoolEntry::new("thick_fog", 3.0),
                PoolEntry::new("acid_rain", 2.0),
                PoolEntry::new("flash_flood", 2.0),
            ],
            supernatural: vec![
                PoolEntry::new("blood_moon", 3.0),
                PoolEntry::new("tracker_jacker_swarm", 2.0),
                PoolEntry::new("gamemaker_gift", 2.0),
                PoolEntry::new("whispering_woods", 2.0),
            ],
            cataclysmic: vec![
                PoolEntry::new("earthquake", 3.0),
                PoolEntry::new("firestorm", 3.0),
                PoolEntry::new("sponsors_mercy", 1.0),
            ],
            definitions: vec![
                def(
                    "scorching_heat",
                    "Scorching Heat",
                    "The sun swells overhead and the arena begins to bake.",
                    vec![
                        WeightModifier::multiply(Elimination, 1.2),
                        WeightModifier::multiply(SupplyFind, 0.7),
                    ],
                    &["Sweat stinging their eyes,", "As heat shimmers off the rocks,"],
                ),
                def(
                    "thick_fog",
                    "Thick Fog",
                    "A thick fog rolls across the arena floor.",
                    vec![
                        WeightModifier::multiply(Alliance, 0.6),
                        WeightModifier::multiply(Survival, 1.3),
                    ],
                    &["Hidden in the fog,", "Barely able to see an arm's length ahead,"],
                ),
                def(
                    "acid_rain",
                    "Acid Rain",
                    "Hissing rain begins to fall, pitting every surface it touches.",
                    vec![
                        WeightModifier::multiply(Elimination, 1.3),
                        WeightModifier::multiply(Survival, 0.8),
                    ],
                    &["Under the burning rain,", "Skin blistering from the downpour,"],
                ),
                def(
                    "flash_flood",
                    "Flash Flood",
                    "The river bursts its banks and the lowlands vanish under water.",
                    vec![
                        WeightModifier::add(Elimination, 5.0),
                        WeightModifier::multiply(SupplyFind, 1.4),
                    ],
                    &["Waist-deep in churning water,", "As the flood carries debris past,"],
                ),
                def(
                    "blood_moon",
                    "Blood Moon",
                    "A blood-red moon rises and the arena grows restless.",
                    vec![
                        WeightModifier::multiply(Elimination, 1.5),
                        WeightModifier::multiply(Alliance, 0.5),
                    ],
                    &["Beneath the blood moon,", "Bathed in crimson light,"],
                ),
                def(
                    "tracker_jacker_swarm",
                    "Tracker Jacker Swarm",
                    "A low droning fills the air as tracker jackers pour from their nests.",
                    vec![
                        WeightModifier::multiply(Elimination, 1.4),
                        WeightModifier::multiply(Survival, 0.7),
                    ],
                    &["Swatting at the swarm,", "Ears ringing with the drone of wings,"],
                ),
                def(
                    "gamemaker_gift",
                    "Gamemaker's Gift",
                    "Silver parachutes drift down across the arena.",
                    vec![
                        WeightModifier::multiply(SponsorRevival, 2.0),
                        WeightModifier::multiply(SupplyFind, 1.5),
                    ],
                    &["With sponsors watching closely,", "As parachutes drift overhead,"],
                ),
                def(
                    "whispering_woods",
                    "Whispering Woods",
                    "The trees begin to whisper the names of the fallen.",
                    vec![WeightModifier::multiply(Alliance, 1.6)],
                    &["Haunted by the whispers,", "Hearing voices among the trees,"],
                ),
                def(
                    "earthquake",
                    "Earthquake",
                    "The ground splits open as the arena shakes itself apart.",
                    vec![WeightModifier::multiply(Elimination, 1.6)],
                    &["As the earth heaves,", "Stumbling across shifting ground,"],
                ),
                def(
                    "firestorm",
                    "Firestorm",
                    "Walls of fire sweep in from the edges of the arena.",
                    vec![
                        WeightModifier::multiply(Elimination, 1.8),
                        WeightModifier::multiply(Survival, 0.6),
                    ],
                    &["Choking on smoke,", "With the flames closing in,"],
                ),
                def(
                    "sponsors_mercy",
                    "Sponsors' Mercy",
                    "The sponsors, moved by the carnage, open their purses one last time.",
                    vec![
                        WeightModifier::add(SponsorRevival, 15.0),
                        WeightModifier::multiply(Elimination, 0.8),
                    ],
                    &["Under the sponsors' gaze,"],
                ),
            ],
        }
    }
}
