//! Error types for the arena simulation.

use thiserror::Error;

use crate::participant::ParticipantId;
use crate::session::SessionStatus;

/// Result type alias using [`ArenaError`].
pub type Result<T> = std::result::Result<T, ArenaError>;

/// Top-level error type for all arena simulation errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArenaError {
    /// Operation attempted in the wrong lifecycle state.
    #[error("Invalid state: {operation} is not allowed while {status:?}")]
    InvalidState {
        /// The rejected operation.
        operation: &'static str,
        /// Status the session was in.
        status: SessionStatus,
    },

    /// Participant id is not part of this session.
    #[error("Participant not found: {0}")]
    ParticipantNotFound(ParticipantId),

    /// Participant is already out of the contest.
    #[error("Participant {0} is already eliminated")]
    AlreadyEliminated(ParticipantId),

    /// Participant is still in play and cannot be revived.
    #[error("Participant {0} is still alive")]
    StillAlive(ParticipantId),

    /// Participant has spent their one revival.
    #[error("Participant {0} has already used their revival")]
    RevivalAlreadyUsed(ParticipantId),

    /// Participant was admitted twice.
    #[error("Participant {0} has already been admitted")]
    DuplicateParticipant(ParticipantId),

    /// Not enough participants to start.
    #[error("Insufficient participants: need at least {required}, have {available}")]
    InsufficientParticipants {
        /// Minimum required to start.
        required: usize,
        /// Participants actually admitted.
        available: usize,
    },

    /// Session has reached its participant cap.
    #[error("Arena is full ({capacity} participants)")]
    ArenaFull {
        /// Maximum participants allowed.
        capacity: usize,
    },

    /// An event handler could not produce a message.
    #[error("Event execution failed: {0}")]
    EventExecutionFailure(String),

    /// Forced or pooled condition id is not defined.
    #[error("Unknown condition: {0}")]
    UnknownCondition(String),

    /// Ledger bookkeeping no longer adds up.
    #[error("Invariant violated at round {round}: {message}")]
    InvariantViolation {
        /// Round where the violation was detected.
        round: u32,
        /// Description of the violation.
        message: String,
    },

    /// Data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParseError {
        /// Path to the file that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Tables failed validation.
    #[error("Tables failed validation: {0:?}")]
    ValidationError(Vec<String>),
}

impl ArenaError {
    /// Whether this error must end the session rather than be absorbed by the round.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InvalidState { .. } | Self::InvariantViolation { .. }
        )
    }
}
