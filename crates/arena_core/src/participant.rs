//! Participant identifiers and records.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity token for a contestant, supplied by the host platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub u64);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for ParticipantId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Cohort tag grouping participants, shown as a district number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cohort(pub u16);

impl Cohort {
    /// Cohort for the participant at `join_index`, two per cohort.
    #[must_use]
    pub const fn for_join_index(join_index: usize) -> Self {
        Self((join_index / 2) as u16 + 1)
    }
}

impl fmt::Display for Cohort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "District {}", self.0)
    }
}

/// Explicit profile for an admitted participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantProfile {
    /// Name shown in narration.
    pub display_name: String,
    /// Flavor title, e.g. "the Relentless".
    pub title: String,
    /// Cohort tag.
    pub cohort: Cohort,
}

/// One contestant tracked by the ledger.
///
/// Fields are read-only outside the crate; all mutation goes through
/// [`Ledger`](crate::ledger::Ledger).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub(crate) id: ParticipantId,
    pub(crate) display_name: String,
    pub(crate) title: String,
    pub(crate) alive: bool,
    pub(crate) kills: u32,
    pub(crate) revivals: u32,
    pub(crate) cohort: Cohort,
    pub(crate) join_index: usize,
}

impl Participant {
    pub(crate) fn new(id: ParticipantId, profile: ParticipantProfile, join_index: usize) -> Self {
        Self {
            id,
            display_name: profile.display_name,
            title: profile.title,
            alive: true,
            kills: 0,
            revivals: 0,
            cohort: profile.cohort,
            join_index,
        }
    }

    /// Identity token.
    #[must_use]
    pub const fn id(&self) -> ParticipantId {
        self.id
    }

    /// Name shown in narration.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Flavor title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Whether the participant is still in play.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    /// Eliminations credited to this participant.
    #[must_use]
    pub const fn kills(&self) -> u32 {
        self.kills
    }

    /// Times this participant has been revived.
    #[must_use]
    pub const fn revivals(&self) -> u32 {
        self.revivals
    }

    /// Cohort tag.
    #[must_use]
    pub const fn cohort(&self) -> Cohort {
        self.cohort
    }

    /// Position in the join order.
    #[must_use]
    pub const fn join_index(&self) -> usize {
        self.join_index
    }
}
