//! Command configuration
//!
//! [`CommandConfig`] is plain data, loadable from TOML:
//!
//! ```toml
//! hash_algorithm = "sha256"                      # omit to use the injected hashing oracle
//! enforce_profiles_on_unused_templates = false
//! ```

use crate::oracle::EntityHashingService;
use cfgedit_model::HashAlgorithm;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors raised while loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read config file '{path}': {source}")]
    Io {
        /// Path that was read
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// TOML did not match the expected shape
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Tunables shared by mutation commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandConfig {
    /// Digest used for freshness tokens
    ///
    /// When set, commands hash with this algorithm instead of asking the
    /// injected [`HashingOracle`](crate::HashingOracle).
    pub hash_algorithm: Option<HashAlgorithm>,

    /// Check changed profile references even when no pipeline uses the template
    pub enforce_profiles_on_unused_templates: bool,
}

impl CommandConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With hash algorithm
    #[inline]
    #[must_use]
    pub fn with_hash_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.hash_algorithm = Some(algorithm);
        self
    }

    /// With profile enforcement on unused templates
    #[inline]
    #[must_use]
    pub fn with_enforce_profiles_on_unused_templates(mut self, enforce: bool) -> Self {
        self.enforce_profiles_on_unused_templates = enforce;
        self
    }

    /// Parse from a TOML string
    ///
    /// # Errors
    /// Returns error if the TOML is malformed or has unknown value types
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml)?)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        tracing::debug!(path = %path.display(), ?config, "loaded command config");
        Ok(config)
    }

    /// Hashing service matching this configuration (Blake3 when unset)
    #[inline]
    #[must_use]
    pub fn hashing_service(&self) -> EntityHashingService {
        EntityHashingService::new(self.hash_algorithm.unwrap_or_default())
    }
}
