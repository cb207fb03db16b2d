//! engine
//!
//! Repository state and safety engine.
//!
//! # Architecture
//!
//! - [`detect`] - Concurrent snapshot of repository facts, reduced to issues
//! - [`health`] - Issue model and constructors
//! - [`safety`] - Per-operation blockers and warnings
//! - [`runner`] - Guarded lifecycle tying detection, safety, approval and the journal together
//!
//! # Command Lifecycle
//!
//! ```text
//! Detect -> Evaluate -> [Approve] -> Record -> Mutate -> Complete
//! ```
//!
//! # Invariants
//!
//! - Blocked operations never reach the journal or the repository
//! - Warnings always need an explicit override
//! - Mutations only happen after a pending journal entry exists

pub mod detect;
pub mod health;
pub mod runner;
pub mod safety;

pub use detect::{detect_state, RepoFacts, RepoState};
pub use health::{Issue, IssueCode, Severity};
pub use runner::{preflight, run_guarded, ActionRequest, RunError};
pub use safety::{evaluate_safety, Operation, SafetyBlocker, SafetyCheck, SafetyWarning};

use std::path::PathBuf;

use crate::core::config::Config;
use crate::core::ops::journal::ActionJournal;
use crate::core::paths::GitmendPaths;
use crate::git::Git;
use crate::ui::output::Verbosity;

/// Execution context for commands.
///
/// Contains global settings derived from CLI flags and user configuration.
#[derive(Debug, Clone)]
pub struct Context {
    /// Working directory override.
    pub cwd: Option<PathBuf>,
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
    /// Interactive prompts allowed.
    pub interactive: bool,
    /// Warnings pre-approved with `--yes`.
    pub assume_yes: bool,
    /// Effective user configuration.
    pub config: Config,
    /// Per-user storage locations.
    pub paths: GitmendPaths,
}

impl Context {
    /// Context with default flags storing data under `paths`.
    pub fn new(paths: GitmendPaths) -> Self {
        Self {
            cwd: None,
            debug: false,
            quiet: false,
            interactive: false,
            assume_yes: false,
            config: Config::default(),
            paths,
        }
    }

    /// Accessor bound to the working directory.
    pub fn git(&self) -> Git {
        Git::new(self.cwd.clone().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Journal for the repository `git` is bound to.
    pub async fn journal(&self, git: &Git) -> ActionJournal {
        ActionJournal::open(git.clone(), &self.paths, self.config.max_action_history()).await
    }

    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }
}
