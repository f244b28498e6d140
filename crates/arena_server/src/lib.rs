//! # Arena Server
//!
//! Async host for elimination-contest sessions.
//!
//! Runs one tokio task per arena, paces rounds, and reports to the external
//! collaborators (output sink, stats, rewards). The rules themselves live in
//! `arena_core`; this crate only schedules them.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod config;
pub mod error;
pub mod handle;
pub mod orchestrator;
pub mod providers;
pub mod registry;

pub use config::ServerConfig;
pub use error::{ProviderError, ServerError};
pub use handle::{ControlCommand, SessionHandle};
pub use orchestrator::Orchestrator;
pub use registry::SessionRegistry;
