//! Configuration module.

mod config_helper;
mod read_config;
mod types;

pub use config_helper::ConfigHelper;
pub use read_config::{read_config, ConfigError, ConfigResult, ConfigSource};
pub use types::{CacheConfig, Config, Limit, RepositoryConfig, SessionConfig};
