//! Population tiers keyed on the number of living participants.

use serde::{Deserialize, Serialize};

/// Alive-count bucket used for base weights, batch sizes, and pacing.
///
/// Thresholds strictly decrease from `Early` to `Finale`; a count sitting on
/// a boundary belongs to the smaller-population tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    /// Two or fewer alive.
    Finale,
    /// Exactly three alive.
    NearFinale,
    /// Four or five alive.
    Endgame,
    /// Six to ten alive.
    Midgame,
    /// More than ten alive.
    Early,
}

impl Tier {
    /// Upper alive-count bound of [`Tier::Finale`].
    pub const FINALE_MAX: usize = 2;
    /// Upper alive-count bound of [`Tier::NearFinale`].
    pub const NEAR_FINALE_MAX: usize = 3;
    /// Upper alive-count bound of [`Tier::Endgame`].
    pub const ENDGAME_MAX: usize = 5;
    /// Upper alive-count bound of [`Tier::Midgame`].
    pub const MIDGAME_MAX: usize = 10;

    /// All tiers from smallest population to largest.
    pub const ALL: [Tier; 5] = [
        Tier::Finale,
        Tier::NearFinale,
        Tier::Endgame,
        Tier::Midgame,
        Tier::Early,
    ];

    /// Tier for the given number of living participants.
    #[must_use]
    pub const fn for_alive(alive: usize) -> Self {
        if alive <= Self::FINALE_MAX {
            Tier::Finale
        } else if alive <= Self::NEAR_FINALE_MAX {
            Tier::NearFinale
        } else if alive <= Self::ENDGAME_MAX {
            Tier::Endgame
        } else if alive <= Self::MIDGAME_MAX {
            Tier::Midgame
        } else {
            Tier::Early
        }
    }

    /// Short lowercase label for logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Tier::Finale => "finale",
            Tier::NearFinale => "near-finale",
            Tier::Endgame => "endgame",
            Tier::Midgame => "midgame",
            Tier::Early => "early",
        }
    }
}
