//! # Arena Development Tools
//!
//! Command-line tools for development:
//! - Tables validators
//! - Headless session simulator

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod simulate;
pub mod validate;

use std::path::PathBuf;

use arena_core::error::ArenaError;
use thiserror::Error;

/// Errors from the tools.
#[derive(Debug, Error)]
pub enum ToolError {
    /// A file or directory could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// A directory held no `.ron` files.
    #[error("no .ron files found in {0}")]
    NoDataFiles(PathBuf),

    /// The core rejected tables or a session operation.
    #[error(transparent)]
    Arena(#[from] ArenaError),

    /// Output could not be serialized.
    #[error("failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
}
