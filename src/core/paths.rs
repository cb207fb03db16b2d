//! core::paths
//!
//! Centralized path routing for gitmend's per-user storage.
//!
//! # Storage Layout
//!
//! Everything gitmend persists lives under a single per-user directory
//! (the "gitmend home"):
//! - `config.toml` - User configuration
//! - `history.json` - Action journal (all repositories, entries carry their repo path)
//! - `history.lock` - Advisory lock guarding journal read-modify-write
//!
//! # Resolution
//!
//! 1. `$GITMEND_HOME` if set and non-empty
//! 2. `~/.gitmend`
//!
//! No code outside this module should join these file names by hand.
//!
//! # Example
//!
//! ```
//! use gitmend::core::paths::GitmendPaths;
//! use std::path::PathBuf;
//!
//! let paths = GitmendPaths::new(PathBuf::from("/home/me/.gitmend"));
//! assert_eq!(paths.journal_path(), PathBuf::from("/home/me/.gitmend/history.json"));
//! ```

use std::path::{Path, PathBuf};

/// Environment variable overriding the gitmend home directory.
pub const HOME_ENV: &str = "GITMEND_HOME";

/// Per-user storage locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitmendPaths {
    root: PathBuf,
}

impl GitmendPaths {
    /// Route all storage under `root`.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Resolve the gitmend home from the environment.
    ///
    /// Returns `None` only when neither `$GITMEND_HOME` nor a home directory
    /// is available.
    pub fn from_env() -> Option<Self> {
        if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Some(Self::new(PathBuf::from(dir)));
        }
        dirs::home_dir().map(|home| Self::new(home.join(".gitmend")))
    }

    /// The gitmend home directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to the user configuration file.
    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    /// Path to the action journal.
    pub fn journal_path(&self) -> PathBuf {
        self.root.join("history.json")
    }

    /// Path to the journal lock file.
    pub fn journal_lock_path(&self) -> PathBuf {
        self.root.join("history.lock")
    }

    /// Create the home directory if needed.
    pub fn ensure_root(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_live_under_root() {
        let paths = GitmendPaths::new(PathBuf::from("/data/gm"));
        assert_eq!(paths.root(), Path::new("/data/gm"));
        assert_eq!(paths.config_path(), PathBuf::from("/data/gm/config.toml"));
        assert_eq!(paths.journal_path(), PathBuf::from("/data/gm/history.json"));
        assert_eq!(
            paths.journal_lock_path(),
            PathBuf::from("/data/gm/history.lock")
        );
    }

    #[test]
    fn ensure_root_creates_nested_dirs() {
        let temp = tempfile::TempDir::new().unwrap();
        let paths = GitmendPaths::new(temp.path().join("a/b/c"));
        paths.ensure_root().unwrap();
        assert!(paths.root().is_dir());
    }
}
