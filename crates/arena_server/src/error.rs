//! Error types for the arena host.

use std::path::PathBuf;

use arena_core::error::ArenaError;
use arena_core::session::ArenaId;
use thiserror::Error;

/// Errors raised by the host: registry, configuration, and control.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The arena already has a running session.
    #[error("arena {0} already has a running session")]
    ArenaBusy(ArenaId),

    /// The session task has exited and no longer accepts commands.
    #[error("session for arena {0} has stopped")]
    SessionClosed(ArenaId),

    /// A rule from the core simulation was violated.
    #[error(transparent)]
    Core(#[from] ArenaError),

    /// A configuration or tables file could not be read.
    #[error("failed to read {path}: {source}")]
    ConfigLoad {
        /// File that failed.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// A configuration file could not be parsed or is out of range.
    #[error("invalid config {path}: {message}")]
    ConfigParse {
        /// File (or `<inline>`) that failed.
        path: PathBuf,
        /// What was wrong.
        message: String,
    },
}

/// Failure reported by an external collaborator.
///
/// These are logged by the orchestrator and never reopen or retry a session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The collaborator could not be reached.
    #[error("{provider} unavailable: {message}")]
    Unavailable {
        /// Which collaborator.
        provider: &'static str,
        /// Detail.
        message: String,
    },

    /// The collaborator refused the request.
    #[error("rejected: {0}")]
    Rejected(String),
}
