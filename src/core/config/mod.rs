//! core::config
//!
//! User configuration loading and saving.
//!
//! # Location
//!
//! `<gitmend home>/config.toml` (see [`crate::core::paths`]).
//!
//! # Precedence
//!
//! 1. Built-in defaults
//! 2. Values present in the config file
//! 3. CLI flags (not handled here)
//!
//! # Failure Policy
//!
//! Loading never fails. A missing file, an unreadable file, or a file that
//! does not parse all yield the built-in defaults; the reason is logged at
//! debug level. Saving does report errors, since the operator asked for it.
//!
//! # Example
//!
//! ```no_run
//! use gitmend::core::config::Config;
//! use gitmend::core::paths::GitmendPaths;
//!
//! let paths = GitmendPaths::from_env().expect("home directory");
//! let config = Config::load(&paths);
//! println!("history cap: {}", config.max_action_history());
//! ```

pub mod schema;

pub use schema::UserConfig;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::paths::GitmendPaths;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),
}

/// Effective configuration: the stored values plus defaults.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Values as read from disk.
    pub user: UserConfig,
    /// Path the values were read from, if a file was loaded.
    loaded_from: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the gitmend home, falling back to defaults.
    pub fn load(paths: &GitmendPaths) -> Self {
        Self::load_from(&paths.config_path())
    }

    /// Load configuration from an explicit file, falling back to defaults.
    pub fn load_from(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "config not readable, using defaults");
                return Self::default();
            }
        };

        let user: UserConfig = match toml::from_str(&text) {
            Ok(user) => user,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "config not parseable, using defaults");
                return Self::default();
            }
        };

        if let Err(e) = user.validate() {
            tracing::debug!(path = %path.display(), error = %e, "config invalid, using defaults");
            return Self::default();
        }

        Self {
            user,
            loaded_from: Some(path.to_path_buf()),
        }
    }

    /// Effective configuration for explicit values, not backed by a file.
    pub fn from_user(user: UserConfig) -> Self {
        Self {
            user,
            loaded_from: None,
        }
    }

    /// Write user configuration atomically to the gitmend home.
    pub fn save(paths: &GitmendPaths, user: &UserConfig) -> Result<PathBuf, ConfigError> {
        user.validate()?;
        let path = paths.config_path();
        write_atomic(&path, user)?;
        Ok(path)
    }

    /// Whether warnings require an explicit confirmation.
    pub fn confirm_dangerous_actions(&self) -> bool {
        self.user
            .confirm_dangerous_actions
            .unwrap_or(schema::DEFAULT_CONFIRM_DANGEROUS_ACTIONS)
    }

    /// Journal capacity.
    pub fn max_action_history(&self) -> usize {
        self.user
            .max_action_history
            .unwrap_or(schema::DEFAULT_MAX_ACTION_HISTORY)
    }

    /// Whether debug logging is on by default.
    pub fn verbose(&self) -> bool {
        self.user.verbose.unwrap_or(schema::DEFAULT_VERBOSE)
    }

    /// File the configuration was read from, if any.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.loaded_from.as_deref()
    }
}

/// Write TOML to a temp file beside `path`, then rename over it.
fn write_atomic<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), ConfigError> {
    let write_err = |path: &Path, source| ConfigError::WriteError {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| write_err(path, e))?;
    }

    let contents =
        toml::to_string_pretty(value).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

    let temp_path = path.with_extension("toml.tmp");
    let mut file = fs::File::create(&temp_path).map_err(|e| write_err(&temp_path, e))?;
    file.write_all(contents.as_bytes())
        .map_err(|e| write_err(&temp_path, e))?;
    file.sync_all().map_err(|e| write_err(&temp_path, e))?;

    fs::rename(&temp_path, path).map_err(|e| write_err(path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn paths_in(temp: &TempDir) -> GitmendPaths {
        GitmendPaths::new(temp.path().to_path_buf())
    }

    #[test]
    fn missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = Config::load(&paths_in(&temp));

        assert!(config.confirm_dangerous_actions());
        assert_eq!(config.max_action_history(), 50);
        assert!(!config.verbose());
        assert!(config.loaded_from().is_none());
    }

    #[test]
    fn known_fields_override_defaults() {
        let temp = TempDir::new().unwrap();
        let paths = paths_in(&temp);
        fs::write(
            paths.config_path(),
            "confirmDangerousActions = false\nmaxActionHistory = 5\n",
        )
        .unwrap();

        let config = Config::load(&paths);
        assert!(!config.confirm_dangerous_actions());
        assert_eq!(config.max_action_history(), 5);
        assert!(!config.verbose());
        assert_eq!(config.loaded_from(), Some(paths.config_path().as_path()));
    }

    #[test]
    fn garbage_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let paths = paths_in(&temp);
        fs::write(paths.config_path(), "this is = = not toml [").unwrap();

        let config = Config::load(&paths);
        assert_eq!(config.max_action_history(), 50);
        assert!(config.loaded_from().is_none());
    }

    #[test]
    fn wrong_type_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let paths = paths_in(&temp);
        fs::write(paths.config_path(), "verbose = \"loud\"\n").unwrap();

        let config = Config::load(&paths);
        assert!(!config.verbose());
    }

    #[test]
    fn directory_in_place_of_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let paths = paths_in(&temp);
        fs::create_dir_all(paths.config_path()).unwrap();

        let config = Config::load(&paths);
        assert!(config.confirm_dangerous_actions());
    }

    #[test]
    fn save_then_load() {
        let temp = TempDir::new().unwrap();
        let paths = GitmendPaths::new(temp.path().join("nested"));
        let user = UserConfig {
            verbose: Some(true),
            max_action_history: Some(3),
            ..Default::default()
        };

        let written = Config::save(&paths, &user).unwrap();
        assert_eq!(written, paths.config_path());

        let config = Config::load(&paths);
        assert!(config.verbose());
        assert_eq!(config.max_action_history(), 3);
    }

    #[test]
    fn save_rejects_invalid() {
        let temp = TempDir::new().unwrap();
        let user = UserConfig {
            max_action_history: Some(0),
            ..Default::default()
        };
        assert!(Config::save(&paths_in(&temp), &user).is_err());
    }
}
