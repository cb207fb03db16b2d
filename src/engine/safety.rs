//! engine::safety
//!
//! Pre-flight risk assessment for corrective operations.
//!
//! # Architecture
//!
//! Every mutating command describes what it is about to do as an
//! [`Operation`]. [`evaluate_safety`] inspects the minimum repository context
//! needed to classify it and returns a [`SafetyCheck`]:
//!
//! - [`SafetyCheck::Blocked`] - at least one [`SafetyBlocker`]; the command refuses
//! - [`SafetyCheck::Warned`] - only [`SafetyWarning`]s; the operator must override
//! - [`SafetyCheck::Clear`] - proceed without asking
//!
//! # Invariants
//!
//! - A check is safe iff it has no blockers
//! - Warnings never block on their own
//! - Every blocker and warning is reported, none are collapsed
//!
//! # Example
//!
//! ```
//! use gitmend::engine::safety::{SafetyBlocker, SafetyCheck, SafetyWarning};
//!
//! let check = SafetyCheck::from_findings(vec![], vec![SafetyWarning::UncommittedChangesDiscarded]);
//! assert!(check.is_safe());
//! assert!(check.requires_override());
//!
//! let check = SafetyCheck::from_findings(vec![SafetyBlocker::ZeroCount], vec![]);
//! assert!(!check.is_safe());
//! ```

use crate::core::naming::{validate_new_branch_name, NameError};
use crate::core::types::Oid;
use crate::engine::detect::RepoState;
use crate::git::{Git, RepoStatus, ResetMode};

/// A corrective operation about to be attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Remove the last `count` commits from the current branch.
    UndoCommits { count: usize, mode: ResetMode },
    /// Fold staged changes into the last commit.
    Amend,
    /// Rewrite the last commit's message.
    FixMessage,
    /// Create a branch with an operator-chosen name.
    CreateBranch { name: String },
    /// Restore a file from a revision.
    RestoreFile { path: String, source: String },
    /// Apply a stash commit.
    ApplyStash { oid: Oid },
    /// Abandon a paused merge, rebase, cherry-pick or bisect.
    AbortOperation,
    /// Delete untracked files.
    Clean,
    /// Throw away unstaged modifications (all when `paths` is empty).
    DiscardChanges { paths: Vec<String> },
    /// Move staged changes back to the working tree (all when `paths` is empty).
    Unstage { paths: Vec<String> },
    /// Reverse the last journaled action.
    JournalUndo,
}

/// A condition that prevents an operation outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SafetyBlocker {
    ZeroCount,
    NotEnoughCommits { requested: usize, available: usize },
    HardResetPastRoot,
    NoCommitToAmend,
    BranchExists { name: String },
    InvalidBranchName(NameError),
    RevisionNotFound { rev: String },
    FileNotInRevision { path: String, rev: String },
    StashNotFound { oid: Oid },
    NoOperationInProgress,
    NothingUntracked,
    NothingModified,
    NothingStaged,
}

impl std::fmt::Display for SafetyBlocker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroCount => write!(f, "Number of commits to undo must be at least 1"),
            Self::NotEnoughCommits {
                requested,
                available,
            } => write!(
                f,
                "Cannot undo {requested} commit(s): the branch only has {available}"
            ),
            Self::HardResetPastRoot => write!(
                f,
                "A hard undo cannot remove the first commit; use --soft or --mixed"
            ),
            Self::NoCommitToAmend => write!(f, "There is no commit to amend"),
            Self::BranchExists { name } => write!(f, "Branch '{name}' already exists"),
            Self::InvalidBranchName(e) => write!(
                f,
                "{e} (allowed: letters, digits, '/', '_', '-')"
            ),
            Self::RevisionNotFound { rev } => write!(f, "Revision '{rev}' does not exist"),
            Self::FileNotInRevision { path, rev } => {
                write!(f, "'{path}' does not exist in {rev}")
            }
            Self::StashNotFound { oid } => {
                write!(f, "Stash commit {} cannot be found", oid.short(7))
            }
            Self::NoOperationInProgress => write!(f, "No merge, rebase, cherry-pick or bisect is in progress"),
            Self::NothingUntracked => write!(f, "There are no untracked files"),
            Self::NothingModified => write!(f, "There are no unstaged modifications"),
            Self::NothingStaged => write!(f, "Nothing is staged"),
        }
    }
}

/// A risk the operator must accept before proceeding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SafetyWarning {
    UncommittedChangesDiscarded,
    CommitPushed { oid: Oid, message: String },
    FileChangesOverwritten { path: String },
    StashMayConflict,
    ResolutionWorkLost { conflicts: usize },
    UntrackedFilesDeleted { count: usize },
    ModificationsLost { count: usize },
}

impl std::fmt::Display for SafetyWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UncommittedChangesDiscarded => {
                write!(f, "Uncommitted changes will be discarded")
            }
            Self::CommitPushed { oid, message } => write!(
                f,
                "Commit {} ({message}) has already been pushed; rewriting it will diverge from the remote",
                oid.short(7)
            ),
            Self::FileChangesOverwritten { path } => {
                write!(f, "Uncommitted changes to '{path}' will be overwritten")
            }
            Self::StashMayConflict => write!(
                f,
                "Working tree has uncommitted changes; applying the stash may conflict"
            ),
            Self::ResolutionWorkLost { conflicts } => write!(
                f,
                "Resolution work on {conflicts} conflicted file(s) will be lost"
            ),
            Self::UntrackedFilesDeleted { count } => {
                write!(f, "{count} untracked file(s) will be permanently deleted")
            }
            Self::ModificationsLost { count } => write!(
                f,
                "Modifications to {count} file(s) will be permanently lost"
            ),
        }
    }
}

/// Outcome of a safety evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SafetyCheck {
    Clear,
    Warned {
        warnings: Vec<SafetyWarning>,
    },
    Blocked {
        blockers: Vec<SafetyBlocker>,
        warnings: Vec<SafetyWarning>,
    },
}

impl SafetyCheck {
    /// Classify a set of findings.
    pub fn from_findings(blockers: Vec<SafetyBlocker>, warnings: Vec<SafetyWarning>) -> Self {
        match (blockers.is_empty(), warnings.is_empty()) {
            (false, _) => Self::Blocked { blockers, warnings },
            (true, false) => Self::Warned { warnings },
            (true, true) => Self::Clear,
        }
    }

    /// True iff there are no blockers.
    pub fn is_safe(&self) -> bool {
        !matches!(self, Self::Blocked { .. })
    }

    /// True when the operation may proceed only with an explicit override.
    pub fn requires_override(&self) -> bool {
        matches!(self, Self::Warned { .. })
    }

    pub fn warnings(&self) -> &[SafetyWarning] {
        match self {
            Self::Clear => &[],
            Self::Warned { warnings } | Self::Blocked { warnings, .. } => warnings,
        }
    }

    pub fn blockers(&self) -> &[SafetyBlocker] {
        match self {
            Self::Blocked { blockers, .. } => blockers,
            _ => &[],
        }
    }
}

/// Classify `op` against the repository `git` is bound to.
///
/// `state`, when given, supplies working-tree facts instead of fresh queries.
pub async fn evaluate_safety(git: &Git, op: &Operation, state: Option<&RepoState>) -> SafetyCheck {
    let mut blockers = Vec::new();
    let mut warnings = Vec::new();

    match op {
        Operation::UndoCommits { count, mode } => {
            let count = *count;
            if count == 0 {
                blockers.push(SafetyBlocker::ZeroCount);
            } else {
                let available = git.commit_count(count.saturating_add(1)).await;
                if available < count {
                    blockers.push(SafetyBlocker::NotEnoughCommits {
                        requested: count,
                        available,
                    });
                } else if *mode == ResetMode::Hard && available == count {
                    blockers.push(SafetyBlocker::HardResetPastRoot);
                }

                if *mode == ResetMode::Hard && uncommitted(git, state).await {
                    warnings.push(SafetyWarning::UncommittedChangesDiscarded);
                }
                for commit in git.recent_commits(count).await {
                    if git.is_commit_pushed(&commit.oid).await {
                        warnings.push(SafetyWarning::CommitPushed {
                            oid: commit.oid,
                            message: commit.message,
                        });
                    }
                }
            }
        }

        Operation::Amend | Operation::FixMessage => {
            let last = match state {
                Some(s) => s.facts().last_commit.clone(),
                None => git.last_commit().await,
            };
            match last {
                None => blockers.push(SafetyBlocker::NoCommitToAmend),
                Some(commit) => {
                    if git.is_commit_pushed(&commit.oid).await {
                        warnings.push(SafetyWarning::CommitPushed {
                            oid: commit.oid,
                            message: commit.message,
                        });
                    }
                }
            }
            if *op == Operation::Amend && !staged(git, state).await {
                blockers.push(SafetyBlocker::NothingStaged);
            }
        }

        Operation::CreateBranch { name } => {
            if let Err(e) = validate_new_branch_name(name) {
                blockers.push(SafetyBlocker::InvalidBranchName(e));
            }
            if !name.is_empty() && git.branch_exists(name).await {
                blockers.push(SafetyBlocker::BranchExists { name: name.clone() });
            }
        }

        Operation::RestoreFile { path, source } => match git.resolve_commit(source).await {
            None => blockers.push(SafetyBlocker::RevisionNotFound {
                rev: source.clone(),
            }),
            Some(oid) => {
                if !git.file_exists_at(&oid, path).await {
                    blockers.push(SafetyBlocker::FileNotInRevision {
                        path: path.clone(),
                        rev: source.clone(),
                    });
                }
                if git.path_has_changes(path).await {
                    warnings.push(SafetyWarning::FileChangesOverwritten { path: path.clone() });
                }
            }
        },

        Operation::ApplyStash { oid } => {
            if git.resolve_commit(oid.as_str()).await.is_none() {
                blockers.push(SafetyBlocker::StashNotFound { oid: oid.clone() });
            }
            if uncommitted(git, state).await {
                warnings.push(SafetyWarning::StashMayConflict);
            }
        }

        Operation::AbortOperation => {
            let (ongoing, conflicts) = match state {
                Some(s) => (
                    s.facts().ongoing_operation.clone(),
                    s.facts().conflicted_files.len(),
                ),
                None => (
                    git.ongoing_operation().await,
                    git.conflicted_files().await.len(),
                ),
            };
            if ongoing.is_none() {
                blockers.push(SafetyBlocker::NoOperationInProgress);
            } else if conflicts > 0 {
                warnings.push(SafetyWarning::ResolutionWorkLost { conflicts });
            }
        }

        Operation::Clean => {
            let count = status(git, state).await.untracked.len();
            if count == 0 {
                blockers.push(SafetyBlocker::NothingUntracked);
            } else {
                warnings.push(SafetyWarning::UntrackedFilesDeleted { count });
            }
        }

        Operation::DiscardChanges { paths } => {
            let count = status(git, state)
                .await
                .modified
                .iter()
                .filter(|p| matches_filter(p, paths))
                .count();
            if count == 0 {
                blockers.push(SafetyBlocker::NothingModified);
            } else {
                warnings.push(SafetyWarning::ModificationsLost { count });
            }
        }

        Operation::Unstage { paths } => {
            let staged = status(git, state)
                .await
                .staged
                .iter()
                .any(|p| matches_filter(p, paths));
            if !staged {
                blockers.push(SafetyBlocker::NothingStaged);
            }
        }

        Operation::JournalUndo => {
            if uncommitted(git, state).await {
                warnings.push(SafetyWarning::UncommittedChangesDiscarded);
            }
        }
    }

    let check = SafetyCheck::from_findings(blockers, warnings);
    tracing::debug!(?op, blockers = check.blockers().len(), warnings = check.warnings().len(), "evaluated safety");
    check
}

async fn uncommitted(git: &Git, state: Option<&RepoState>) -> bool {
    match state {
        Some(s) => s.facts().has_uncommitted_changes,
        None => git.has_uncommitted_changes().await,
    }
}

async fn staged(git: &Git, state: Option<&RepoState>) -> bool {
    match state {
        Some(s) => s.facts().has_staged_changes,
        None => git.has_staged_changes().await,
    }
}

async fn status(git: &Git, state: Option<&RepoState>) -> RepoStatus {
    match state {
        Some(s) => s.facts().status.clone(),
        None => git.status().await,
    }
}

/// Whether `path` is selected by `filters` (everything when empty).
fn matches_filter(path: &str, filters: &[String]) -> bool {
    if filters.is_empty() {
        return true;
    }
    filters.iter().any(|f| {
        let f = f.trim_end_matches('/');
        f == "." || path == f || path.strip_prefix(f).is_some_and(|rest| rest.starts_with('/'))
    })
}
