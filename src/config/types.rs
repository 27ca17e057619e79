//! Configuration types for solution-repository.
//!
//! This module defines the structures used to represent application configuration
//! as parsed from an INI-format config file.

use std::path::PathBuf;

/// A limit that is either switched off or set to a value.
///
/// - `Disabled`: Explicitly set to "none"; no limit applies
/// - `Value(T)`: Specific limit value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Limit<T> {
    Disabled,
    Value(T),
}

// =============================================================================
// Config Sections
// =============================================================================

/// [repository] section - where resources and the repository document live.
#[derive(Debug, Clone)]
pub struct RepositoryConfig {
    /// Root directory of the solution repository; also the publish base.
    pub solution_root: PathBuf,
    /// Pre-rendered JSON repository document. When absent the solution root
    /// is scanned instead.
    pub document: Option<PathBuf>,
}

/// [cache] section - session document cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Maximum number of cached documents across all sessions.
    pub max_entries: Limit<usize>,
}

/// [session] section - identity used to scope cached documents.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub key: String,
}

// =============================================================================
// Top-Level Config
// =============================================================================

/// Complete application configuration as parsed from config file.
#[derive(Debug, Clone)]
pub struct Config {
    pub repository: RepositoryConfig,
    pub cache: CacheConfig,
    pub session: SessionConfig,
}
