//! playman-server runtime configuration
//!
//! Merges command-line arguments over the TOML bootstrap file. Settings
//! sources, highest priority first:
//! 1. Command-line arguments (and their environment fallbacks)
//! 2. TOML configuration file
//! 3. Built-in defaults

use playman_common::config::{resolve_root_folder, TomlConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable consulted for the root folder
pub const ROOT_FOLDER_ENV: &str = "PLAYMAN_ROOT_FOLDER";

/// Library manifest file name inside the root folder
pub const LIBRARY_MANIFEST: &str = "library.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub root_folder: PathBuf,
    pub database_path: PathBuf,
    pub hook_timeout: Duration,
    pub offline: bool,
    pub log_level: String,
}

impl Config {
    /// Resolve the final configuration
    ///
    /// `offline` on the command line can only switch offline mode on; the
    /// TOML value applies otherwise.
    pub fn from_sources(
        cli_port: Option<u16>,
        cli_root_folder: Option<&Path>,
        cli_offline: bool,
        toml: TomlConfig,
    ) -> Self {
        let root_folder = resolve_root_folder(cli_root_folder, ROOT_FOLDER_ENV, &toml);
        let database_path = toml.resolve_database_path(&root_folder);

        Self {
            port: cli_port.unwrap_or(toml.port),
            database_path,
            hook_timeout: Duration::from_millis(toml.hook_timeout_ms),
            offline: cli_offline || toml.offline,
            log_level: toml.logging.level,
            root_folder,
        }
    }

    pub fn library_manifest(&self) -> PathBuf {
        self.root_folder.join(LIBRARY_MANIFEST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_toml() {
        let toml = TomlConfig {
            port: 7000,
            hook_timeout_ms: 300,
            ..TomlConfig::default()
        };

        let config = Config::from_sources(
            Some(7100),
            Some(Path::new("/srv/playman")),
            true,
            toml,
        );
        assert_eq!(config.port, 7100);
        assert_eq!(config.root_folder, PathBuf::from("/srv/playman"));
        assert_eq!(config.database_path, PathBuf::from("/srv/playman/playman.db"));
        assert_eq!(config.hook_timeout, Duration::from_millis(300));
        assert!(config.offline);
        assert_eq!(
            config.library_manifest(),
            PathBuf::from("/srv/playman/library.json")
        );
    }

    #[test]
    fn test_toml_values_apply_without_cli() {
        let toml = TomlConfig {
            port: 7000,
            offline: true,
            ..TomlConfig::default()
        };

        let config = Config::from_sources(None, Some(Path::new("/srv/x")), false, toml);
        assert_eq!(config.port, 7000);
        assert!(config.offline);
        assert_eq!(config.log_level, "info");
    }
}
