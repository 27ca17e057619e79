//! Loading of the layered INI configuration.
//!
//! Settings are resolved from, in increasing precedence: built-in defaults,
//! the base config file, an optional override file, and `section.key=value`
//! overrides given on the command line.

use std::env;
use std::path::{Path, PathBuf};

use configparser::ini::Ini;
use thiserror::Error;

use super::{CacheConfig, Config, Limit, RepositoryConfig, SessionConfig};

// =============================================================================
// Defaults
// =============================================================================

const DEFAULT_SOLUTION_ROOT: &str = "./solutions";
const DEFAULT_MAX_ENTRIES: usize = 64;
const ANONYMOUS_SESSION: &str = "anonymous";

const CONFIG_FILE_VAR: &str = "SOLREPO_CONFIG_FILE";
const HOME_CONFIG_NAME: &str = ".solrepoconfig";

const SECTIONS: [&str; 3] = ["repository", "cache", "session"];

// =============================================================================
// Errors
// =============================================================================

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("cannot parse {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("{key}: '{value}' is not a count or \"none\"")]
    InvalidInteger { key: String, value: String },

    #[error("{key}: '{value}' is not a boolean")]
    InvalidBoolean { key: String, value: String },

    #[error("unknown config key '{0}'")]
    InvalidOverrideKey(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

// =============================================================================
// Sources
// =============================================================================

/// Where configuration comes from, as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigSource {
    /// Base config file. Must exist when given; when absent the
    /// `SOLREPO_CONFIG_FILE` variable and then `~/.solrepoconfig` are tried.
    pub config_file: Option<PathBuf>,

    /// File layered over the base config file. Must exist when given.
    pub override_file: Option<PathBuf>,

    /// `section.key` / value pairs, applied in order after both files.
    pub overrides: Vec<(String, String)>,
}

/// Loaded configuration plus anything worth telling the user about.
#[derive(Debug)]
pub struct ConfigResult {
    pub config: Config,
    pub warnings: Vec<String>,
}

/// How the base config file was found.
#[derive(Debug, PartialEq, Eq)]
enum ConfigLocation {
    Explicit(PathBuf),
    Environment(PathBuf),
    Home(PathBuf),
    /// The environment variable named a missing file.
    DanglingEnvironment(String),
    None,
}

impl ConfigLocation {
    fn path(&self) -> Option<&Path> {
        match self {
            ConfigLocation::Explicit(p) | ConfigLocation::Environment(p) | ConfigLocation::Home(p) => {
                Some(p.as_path())
            }
            ConfigLocation::DanglingEnvironment(_) | ConfigLocation::None => None,
        }
    }
}

fn locate_config_file(source: &ConfigSource) -> Result<ConfigLocation> {
    if let Some(path) = &source.config_file {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.clone()));
        }
        return Ok(ConfigLocation::Explicit(path.clone()));
    }

    if let Some(value) = env::var_os(CONFIG_FILE_VAR) {
        let path = PathBuf::from(&value);
        if path.exists() {
            return Ok(ConfigLocation::Environment(path));
        }
        return Ok(ConfigLocation::DanglingEnvironment(
            value.to_string_lossy().into_owned(),
        ));
    }

    let home_config = env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(HOME_CONFIG_NAME))
        .filter(|path| path.exists());
    Ok(home_config.map_or(ConfigLocation::None, ConfigLocation::Home))
}

// =============================================================================
// Values
// =============================================================================

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidBoolean {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

fn parse_limit(key: &str, value: &str) -> Result<Limit<usize>> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("none") {
        return Ok(Limit::Disabled);
    }
    value
        .parse()
        .map(Limit::Value)
        .map_err(|_| ConfigError::InvalidInteger {
            key: key.to_string(),
            value: value.to_string(),
        })
}

/// Empty means unset.
fn parse_optional_path(value: &str) -> Option<PathBuf> {
    let value = value.trim();
    (!value.is_empty()).then(|| PathBuf::from(value))
}

fn default_config() -> Config {
    let key = env::var("USER")
        .ok()
        .filter(|user| !user.trim().is_empty())
        .unwrap_or_else(|| ANONYMOUS_SESSION.to_string());

    Config {
        repository: RepositoryConfig {
            solution_root: PathBuf::from(DEFAULT_SOLUTION_ROOT),
            document: None,
        },
        cache: CacheConfig {
            enabled: true,
            max_entries: Limit::Value(DEFAULT_MAX_ENTRIES),
        },
        session: SessionConfig { key },
    }
}

// =============================================================================
// Layering
// =============================================================================

/// Set one `section.key` on `config`.
fn apply_override(config: &mut Config, name: &str, value: &str) -> Result<()> {
    let Some((section, key)) = name.split_once('.') else {
        return Err(ConfigError::InvalidOverrideKey(name.to_string()));
    };

    match (section, key) {
        ("repository", "solution_root") => {
            config.repository.solution_root = PathBuf::from(value.trim())
        }
        ("repository", "document") => config.repository.document = parse_optional_path(value),
        ("cache", "enabled") => config.cache.enabled = parse_bool(name, value)?,
        ("cache", "no_cache") => config.cache.enabled = !parse_bool(name, value)?,
        ("cache", "max_entries") => config.cache.max_entries = parse_limit(name, value)?,
        ("session", "key") => config.session.key = value.trim().to_string(),
        _ => return Err(ConfigError::InvalidOverrideKey(name.to_string())),
    }
    Ok(())
}

/// Layer every recognised section of `ini` over `config`.
///
/// Keys are applied in sorted order so repeated loads agree.
fn apply_ini(config: &mut Config, ini: &Ini) -> Result<()> {
    let map = ini.get_map_ref();
    for section in SECTIONS {
        let Some(entries) = map.get(section) else {
            continue;
        };
        let mut keys: Vec<&String> = entries.keys().collect();
        keys.sort();
        for key in keys {
            if let Some(value) = ini.get(section, key) {
                apply_override(config, &format!("{}.{}", section, key), &value)?;
            }
        }
    }
    Ok(())
}

fn apply_file(config: &mut Config, path: &Path) -> Result<()> {
    let mut ini = Ini::new();
    ini.load(path).map_err(|reason| ConfigError::ParseError {
        path: path.to_path_buf(),
        reason,
    })?;
    apply_ini(config, &ini)
}

/// Build the effective configuration for `source`.
pub fn read_config(source: &ConfigSource) -> Result<ConfigResult> {
    let mut config = default_config();
    let mut warnings = Vec::new();

    let location = locate_config_file(source)?;
    if let ConfigLocation::DanglingEnvironment(value) = &location {
        warnings.push(format!(
            "{} names a file that does not exist: {}",
            CONFIG_FILE_VAR, value
        ));
    }
    if let Some(path) = location.path() {
        apply_file(&mut config, path)?;
    }

    if let Some(path) = &source.override_file {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.clone()));
        }
        apply_file(&mut config, path)?;
    }

    for (name, value) in &source.overrides {
        apply_override(&mut config, name, value)?;
    }

    Ok(ConfigResult { config, warnings })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = default_config();
        assert_eq!(config.repository.solution_root, PathBuf::from("./solutions"));
        assert!(config.repository.document.is_none());
        assert!(config.cache.enabled);
        assert_eq!(config.cache.max_entries, Limit::Value(64));
        assert!(!config.session.key.is_empty());
    }

    #[test]
    fn test_repository_overrides() {
        let mut config = default_config();
        apply_override(&mut config, "repository.solution_root", "/srv/solutions").unwrap();
        apply_override(&mut config, "repository.document", "/srv/repository.json").unwrap();
        assert_eq!(config.repository.solution_root, PathBuf::from("/srv/solutions"));
        assert_eq!(
            config.repository.document,
            Some(PathBuf::from("/srv/repository.json"))
        );

        apply_override(&mut config, "repository.document", "").unwrap();
        assert!(config.repository.document.is_none());
    }

    #[test]
    fn test_cache_overrides() {
        let mut config = default_config();
        apply_override(&mut config, "cache.max_entries", "none").unwrap();
        assert_eq!(config.cache.max_entries, Limit::Disabled);

        apply_override(&mut config, "cache.max_entries", " 5 ").unwrap();
        assert_eq!(config.cache.max_entries, Limit::Value(5));

        apply_override(&mut config, "cache.no_cache", "true").unwrap();
        assert!(!config.cache.enabled);

        apply_override(&mut config, "cache.enabled", "on").unwrap();
        assert!(config.cache.enabled);
    }

    #[test]
    fn test_bad_overrides() {
        let mut config = default_config();
        assert!(matches!(
            apply_override(&mut config, "cache.enabled", "maybe"),
            Err(ConfigError::InvalidBoolean { .. })
        ));
        assert!(matches!(
            apply_override(&mut config, "cache.max_entries", "lots"),
            Err(ConfigError::InvalidInteger { .. })
        ));
        for name in ["network.speed", "session.colour", "session"] {
            assert!(matches!(
                apply_override(&mut config, name, "1"),
                Err(ConfigError::InvalidOverrideKey(n)) if n == name
            ));
        }
    }

    #[test]
    fn test_ini_sections() {
        let mut ini = Ini::new();
        ini.read(
            r#"
[repository]
solution_root = /srv/solutions
document = /srv/repository.json

[cache]
enabled = false
max_entries = 10

[session]
key = bob
"#
            .to_string(),
        )
        .unwrap();

        let mut config = default_config();
        apply_ini(&mut config, &ini).unwrap();

        assert_eq!(config.repository.solution_root, PathBuf::from("/srv/solutions"));
        assert_eq!(
            config.repository.document,
            Some(PathBuf::from("/srv/repository.json"))
        );
        assert!(!config.cache.enabled);
        assert_eq!(config.cache.max_entries, Limit::Value(10));
        assert_eq!(config.session.key, "bob");
    }

    #[test]
    fn test_layers_apply_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("base.ini");
        let layer = temp_dir.path().join("layer.ini");
        std::fs::write(&base, "[repository]\nsolution_root = /base\n\n[cache]\nmax_entries = 3\n")
            .unwrap();
        std::fs::write(&layer, "[cache]\nmax_entries = 7\n").unwrap();

        let source = ConfigSource {
            config_file: Some(base),
            override_file: Some(layer),
            overrides: vec![("session.key".to_string(), "carol".to_string())],
        };
        let result = read_config(&source).unwrap();

        assert_eq!(result.config.repository.solution_root, PathBuf::from("/base"));
        assert_eq!(result.config.cache.max_entries, Limit::Value(7));
        assert_eq!(result.config.session.key, "carol");
    }

    #[test]
    fn test_explicit_file_must_exist() {
        let source = ConfigSource {
            config_file: Some(PathBuf::from("/nonexistent/solrepo.ini")),
            ..Default::default()
        };
        assert!(matches!(
            read_config(&source),
            Err(ConfigError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_explicit_file_location() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("solrepo.ini");
        std::fs::write(&path, "").unwrap();
        let source = ConfigSource {
            config_file: Some(path.clone()),
            ..Default::default()
        };
        assert_eq!(
            locate_config_file(&source).unwrap(),
            ConfigLocation::Explicit(path)
        );
    }
}
