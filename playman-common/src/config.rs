//! Configuration loading and root folder resolution
//!
//! Bootstrap settings come from an optional TOML file. Anything missing falls
//! back to built-in defaults, so a missing config file never stops startup.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 43211;

/// Default timeout applied to each post-commit hook
pub const DEFAULT_HOOK_TIMEOUT_MS: u64 = 2000;

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Root folder holding the library manifest and database (optional)
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// SQLite database path, relative paths resolve against the root folder
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Per-hook timeout in milliseconds
    #[serde(default = "default_hook_timeout_ms")]
    pub hook_timeout_ms: u64,

    /// Start in offline mode
    #[serde(default)]
    pub offline: bool,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            root_folder: None,
            database_path: None,
            hook_timeout_ms: default_hook_timeout_ms(),
            offline: false,
            logging: LoggingConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_hook_timeout_ms() -> u64 {
    DEFAULT_HOOK_TIMEOUT_MS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file is absent
    ///
    /// A file that exists but fails to parse is still an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => default_config_file(),
        };

        match path {
            Some(p) if p.exists() => Self::load(&p),
            Some(p) => {
                warn!("Config file {} not found, using defaults", p.display());
                Ok(Self::default())
            }
            None => {
                warn!("No config file location available, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Database path resolved against the root folder
    pub fn resolve_database_path(&self, root_folder: &Path) -> PathBuf {
        match &self.database_path {
            Some(p) if p.is_absolute() => p.clone(),
            Some(p) => root_folder.join(p),
            None => root_folder.join("playman.db"),
        }
    }
}

/// Root folder resolution, highest priority first:
/// 1. Command-line argument
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent default
pub fn resolve_root_folder(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    config: &TomlConfig,
) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &config.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// Platform config file location (`<config dir>/playman/config.toml`)
pub fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("playman").join("config.toml"))
}

/// OS-dependent default root folder
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("playman"))
        .unwrap_or_else(|| PathBuf::from("./playman_data"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.hook_timeout_ms, DEFAULT_HOOK_TIMEOUT_MS);
        assert!(!config.offline);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_toml() {
        let config = TomlConfig::from_toml_str(
            r#"
            port = 9000
            offline = true

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.port, 9000);
        assert!(config.offline);
        assert_eq!(config.logging.level, "debug");
        assert!(config.root_folder.is_none());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("port = \"not a number\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_database_path_resolution() {
        let root = PathBuf::from("/srv/playman");

        let config = TomlConfig::default();
        assert_eq!(config.resolve_database_path(&root), root.join("playman.db"));

        let config = TomlConfig {
            database_path: Some(PathBuf::from("state/db.sqlite")),
            ..TomlConfig::default()
        };
        assert_eq!(
            config.resolve_database_path(&root),
            root.join("state/db.sqlite")
        );
    }
}
