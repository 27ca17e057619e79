//! Configuration helper for interpreting config values.
//!
//! The `ConfigHelper` wraps a `Config` and provides methods for interpreting
//! configuration values, such as the effective cache capacity.

use std::num::NonZeroUsize;
use std::path::Path;

use super::{Config, Limit};

/// Helper for interpreting configuration values.
#[derive(Debug, Clone)]
pub struct ConfigHelper {
    config: Config,
}

impl ConfigHelper {
    /// Create a new ConfigHelper wrapping the given config.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Get a reference to the underlying config.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Consume the helper and return the underlying config.
    pub fn into_config(self) -> Config {
        self.config
    }

    /// Whether session caching is in effect. A capacity of zero disables it.
    pub fn caching_enabled(&self) -> bool {
        self.config.cache.enabled && self.config.cache.max_entries != Limit::Value(0)
    }

    /// Capacity of the session cache, `None` meaning unbounded.
    pub fn cache_capacity(&self) -> Option<NonZeroUsize> {
        match self.config.cache.max_entries {
            Limit::Disabled => None,
            Limit::Value(n) => NonZeroUsize::new(n),
        }
    }

    pub fn solution_root(&self) -> &Path {
        &self.config.repository.solution_root
    }

    /// The publish base handed to the storage provider.
    pub fn root_base(&self) -> String {
        self.solution_root().to_string_lossy().into_owned()
    }

    pub fn document_path(&self) -> Option<&Path> {
        self.config.repository.document.as_deref()
    }

    pub fn session_key(&self) -> &str {
        &self.config.session.key
    }
}

impl From<Config> for ConfigHelper {
    fn from(config: Config) -> Self {
        Self::new(config)
    }
}
