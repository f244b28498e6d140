//! Host configuration.
//!
//! Loaded from RON; missing fields take their defaults.
//!
//! ```ron
//! ServerConfig(
//!     base_reward: 250,
//!     pacing_scale: 0.5,
//!     seed: Some(42),
//!     tables_path: Some("assets/data/arena_tables.ron"),
//! )
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use arena_core::data::ArenaTables;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ServerError;

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Reward before the participant-count multiplier.
    pub base_reward: u64,
    /// Multiplier applied to every pacing delay (0 disables pacing).
    pub pacing_scale: f64,
    /// Fixed seed for every session; random per session when absent.
    pub seed: Option<u64>,
    /// Tables file; built-in tables when absent.
    pub tables_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_reward: 100,
            pacing_scale: 1.0,
            seed: None,
            tables_path: None,
        }
    }
}

impl ServerConfig {
    /// Parse from RON text.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::ConfigParse`] on malformed RON or a negative
    /// or non-finite pacing scale.
    pub fn from_ron_str(text: &str, origin: &Path) -> Result<Self, ServerError> {
        let config: Self = ron::from_str(text).map_err(|e| ServerError::ConfigParse {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })?;
        if !config.pacing_scale.is_finite() || config.pacing_scale < 0.0 {
            return Err(ServerError::ConfigParse {
                path: origin.to_path_buf(),
                message: format!("pacing_scale {} must be finite and >= 0", config.pacing_scale),
            });
        }
        Ok(config)
    }

    /// Load from a RON file.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::ConfigLoad`] if the file cannot be read, or
    /// [`ServerError::ConfigParse`] if it is invalid.
    pub fn load(path: &Path) -> Result<Self, ServerError> {
        let text = std::fs::read_to_string(path).map_err(|source| ServerError::ConfigLoad {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&text, path)
    }

    /// Load the configured tables, or the built-in ones.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::ConfigLoad`] if the file cannot be read, or
    /// [`ServerError::Core`] if it fails to parse or validate.
    pub fn load_tables(&self) -> Result<Arc<ArenaTables>, ServerError> {
        let Some(path) = &self.tables_path else {
            return Ok(Arc::new(ArenaTables::default()));
        };
        let text = std::fs::read_to_string(path).map_err(|source| ServerError::ConfigLoad {
            path: path.clone(),
            source,
        })?;
        let tables = ArenaTables::from_ron_str(&text, &path.display().to_string())?;
        info!(path = %path.display(), "Loaded arena tables");
        Ok(Arc::new(tables))
    }

    /// Pacing delay after scaling.
    #[must_use]
    pub fn scale_pacing(&self, delay: Duration) -> Duration {
        if self.pacing_scale.is_finite() && self.pacing_scale > 0.0 {
            delay.mul_f64(self.pacing_scale)
        } else {
            Duration::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config =
            ServerConfig::from_ron_str("(seed: Some(9))", Path::new("<inline>")).unwrap();
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.base_reward, 100);
        assert!(config.tables_path.is_none());
    }

    #[test]
    fn test_negative_pacing_rejected() {
        let err =
            ServerConfig::from_ron_str("(pacing_scale: -1.0)", Path::new("<inline>")).unwrap_err();
        assert!(matches!(err, ServerError::ConfigParse { .. }));
    }

    #[test]
    fn test_scale_pacing() {
        let mut config = ServerConfig::default();
        assert_eq!(
            config.scale_pacing(Duration::from_secs(2)),
            Duration::from_secs(2)
        );
        config.pacing_scale = 0.5;
        assert_eq!(
            config.scale_pacing(Duration::from_secs(2)),
            Duration::from_secs(1)
        );
        config.pacing_scale = 0.0;
        assert_eq!(config.scale_pacing(Duration::from_secs(2)), Duration::ZERO);
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let err = ServerConfig::load(Path::new("/definitely/not/here.ron")).unwrap_err();
        assert!(matches!(err, ServerError::ConfigLoad { .. }));
    }

    #[test]
    fn test_default_tables_when_no_path() {
        let tables = ServerConfig::default().load_tables().unwrap();
        assert_eq!(*tables, ArenaTables::default());
    }
}
