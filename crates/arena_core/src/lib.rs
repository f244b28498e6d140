//! # Arena Core
//!
//! Deterministic elimination-contest simulation.
//!
//! This crate contains **only** the contest rules:
//! - No IO
//! - No timers or async runtime
//! - No system randomness (every session owns a seeded `ChaCha8Rng`)
//!
//! This separation enables:
//! - Hosting many sessions from one async server
//! - Offline simulation and balance checks
//! - Determinism testing by seed
//!
//! ## Crate Structure
//!
//! - [`ledger`] - Participant bookkeeping and the alive/eliminated invariant
//! - [`tier`] - Pacing tiers keyed on living population
//! - [`conditions`] - Arena conditions that reshape event weights
//! - [`events`] - Event categories, weighted selection, and handlers
//! - [`session`] - The session state machine and round loop body
//! - [`outcome`] - Rewards and stats for finished sessions
//! - [`data`] - RON-loadable tuning tables

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod conditions;
pub mod data;
pub mod error;
pub mod events;
pub mod ledger;
pub mod outcome;
pub mod participant;
pub mod session;
pub mod tier;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::conditions::{Condition, ConditionManager};
    pub use crate::data::{ArenaTables, CategoryWeights, ConditionId};
    pub use crate::error::{ArenaError, Result};
    pub use crate::events::{EventCategory, EventOutcome};
    pub use crate::ledger::{EliminationRecord, Ledger};
    pub use crate::outcome::{compute_reward, summarize, ParticipantStats, SessionOutcome};
    pub use crate::participant::{Cohort, Participant, ParticipantId, ParticipantProfile};
    pub use crate::session::{
        ArenaId, Milestone, RoundReport, Session, SessionStatus, StatusSnapshot,
    };
    pub use crate::tier::Tier;
}
