//! core::ops::journal
//!
//! Action journal: a per-user log of mutating operations with one-step undo.
//!
//! # Lifecycle
//!
//! Every journaled action moves through
//!
//! ```text
//! Pending --complete--> Completed --undo--> Consumed
//! ```
//!
//! - `Pending` entries carry only a before snapshot. A mutation that fails
//!   leaves its entry pending forever; it has nothing to undo.
//! - `Completed` entries carry an after snapshot, and an undo directive when
//!   the action was undoable and moved HEAD.
//! - `Consumed` entries have been undone; they can never be undone again.
//!
//! Only a [`PendingAction`] can be completed, so the type system rules out
//! completing an entry twice.
//!
//! # Storage
//!
//! - `<gitmend home>/history.json` - JSON array of [`RecordedAction`], oldest first
//! - `<gitmend home>/history.lock` - advisory lock around each transaction
//!
//! Entries from every repository share the file. Each entry carries the
//! repository root it was recorded in, and queries only ever see entries for
//! the journal's own repository.
//!
//! # Failure Policy
//!
//! The journal never blocks the operation it tracks. A file that cannot be
//! read or parsed reads as an empty log; a write that fails is logged at
//! `warn` and dropped.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::lock::{JournalLock, LockError};
use crate::core::paths::GitmendPaths;
use crate::core::types::{Oid, UtcTimestamp};
use crate::git::{Git, ResetMode};

/// Errors from journal persistence.
///
/// These never escape the public journal API; they are logged and swallowed.
#[derive(Debug, Error)]
pub enum JournalError {
    #[error("journal i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("journal json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("journal lock error: {0}")]
    Lock(#[from] LockError),
}

/// Kind of corrective operation that was journaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionType {
    Undo,
    FixMessage,
    Amend,
    RecoverBranch,
    RecoverFile,
    RecoverStash,
    Abort,
    Clean,
    Discard,
    Unstage,
}

impl ActionType {
    /// Stable string form, as stored on disk.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Undo => "undo",
            Self::FixMessage => "fix-message",
            Self::Amend => "amend",
            Self::RecoverBranch => "recover-branch",
            Self::RecoverFile => "recover-file",
            Self::RecoverStash => "recover-stash",
            Self::Abort => "abort",
            Self::Clean => "clean",
            Self::Discard => "discard",
            Self::Unstage => "unstage",
        }
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where HEAD pointed at a moment in time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HeadSnapshot {
    /// Commit HEAD resolved to, `None` on an unborn branch.
    pub head: Option<Oid>,
    /// Branch HEAD named, `None` when detached.
    pub branch: Option<String>,
}

/// How to reverse a completed action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UndoDirective {
    /// Force HEAD, index and working tree back to `target`.
    ResetHard { target: Oid },
}

impl std::fmt::Display for UndoDirective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ResetHard { target } => write!(f, "reset --hard {}", target.short(7)),
        }
    }
}

/// Lifecycle phase of a journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionPhase {
    Pending,
    Completed,
    Consumed,
}

/// One journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedAction {
    pub id: String,
    #[serde(rename = "type")]
    pub action_type: ActionType,
    pub timestamp: UtcTimestamp,
    pub description: String,
    pub repository_path: String,
    pub before_state: HeadSnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_state: Option<HeadSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub undo: Option<UndoDirective>,
    pub undoable: bool,
    pub phase: ActionPhase,
}

impl RecordedAction {
    /// Whether this entry currently fills the undo slot for `repository_path`.
    pub fn can_undo_in(&self, repository_path: &str) -> bool {
        self.undoable && self.undo.is_some() && self.repository_path == repository_path
    }
}

/// A journal entry whose mutation has not finished yet.
///
/// Obtained from [`ActionJournal::record_action`] and consumed by
/// [`ActionJournal::complete_action`].
#[derive(Debug)]
#[must_use = "a pending action should be completed once its mutation succeeds"]
pub struct PendingAction(RecordedAction);

impl PendingAction {
    /// Identifier of the underlying entry.
    pub fn id(&self) -> &str {
        &self.0.id
    }

    /// The entry as written to the journal.
    pub fn action(&self) -> &RecordedAction {
        &self.0
    }
}

/// Result of [`ActionJournal::undo_last_action`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoOutcome {
    pub success: bool,
    pub message: String,
}

/// The action journal bound to one repository.
#[derive(Debug, Clone)]
pub struct ActionJournal {
    git: Git,
    file: PathBuf,
    lock_file: PathBuf,
    max_entries: usize,
    repository_path: String,
}

impl ActionJournal {
    /// Open the journal stored in the gitmend home for the repository `git` is bound to.
    pub async fn open(git: Git, paths: &GitmendPaths, max_entries: usize) -> Self {
        Self::with_file(git, paths.journal_path(), paths.journal_lock_path(), max_entries).await
    }

    /// Open a journal stored at explicit locations.
    pub async fn with_file(
        git: Git,
        file: PathBuf,
        lock_file: PathBuf,
        max_entries: usize,
    ) -> Self {
        let root = git
            .repository_root()
            .await
            .unwrap_or_else(|| git.workdir().to_path_buf());
        let repository_path = normalize_repo_path(&root);
        Self {
            git,
            file,
            lock_file,
            max_entries: max_entries.max(1),
            repository_path,
        }
    }

    /// Repository path entries are scoped to.
    pub fn repository_path(&self) -> &str {
        &self.repository_path
    }

    /// Path of the journal file.
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Append a pending entry capturing the current HEAD.
    ///
    /// Call this before the mutation runs.
    pub async fn record_action(
        &self,
        action_type: ActionType,
        description: impl Into<String>,
        undoable: bool,
    ) -> PendingAction {
        let action = RecordedAction {
            id: Uuid::new_v4().to_string(),
            action_type,
            timestamp: UtcTimestamp::now(),
            description: description.into(),
            repository_path: self.repository_path.clone(),
            before_state: self.snapshot().await,
            after_state: None,
            undo: None,
            undoable,
            phase: ActionPhase::Pending,
        };

        let entry = action.clone();
        self.transaction(move |entries| entries.push(entry));
        tracing::debug!(id = %action.id, action = %action_type, "recorded pending action");

        PendingAction(action)
    }

    /// Capture the after snapshot and finalize a pending entry.
    pub async fn complete_action(&self, pending: PendingAction) -> RecordedAction {
        let mut action = pending.0;
        let after = self.snapshot().await;

        action.undo = match (&action.before_state.head, &after.head) {
            (Some(before), after_head) if action.undoable && after_head.as_ref() != Some(before) => {
                Some(UndoDirective::ResetHard {
                    target: before.clone(),
                })
            }
            _ => None,
        };
        action.after_state = Some(after);
        action.phase = ActionPhase::Completed;

        let entry = action.clone();
        self.transaction(move |entries| {
            match entries.iter_mut().find(|e| e.id == entry.id) {
                Some(slot) => *slot = entry,
                // The pending entry was trimmed or the file was reset in between.
                None => entries.push(entry),
            }
        });
        tracing::debug!(id = %action.id, undo = ?action.undo, "completed action");

        action
    }

    /// Most recent entries for this repository, newest first.
    pub fn recent_actions(&self, n: usize) -> Vec<RecordedAction> {
        self.load()
            .into_iter()
            .rev()
            .filter(|e| e.repository_path == self.repository_path)
            .take(n)
            .collect()
    }

    /// The entry the next [`undo_last_action`](Self::undo_last_action) would reverse.
    pub fn last_undoable_action(&self) -> Option<RecordedAction> {
        find_undoable(&self.load(), &self.repository_path).cloned()
    }

    /// Reverse the last undoable action and consume it.
    ///
    /// On failure the entry is left as it was.
    pub async fn undo_last_action(&self) -> UndoOutcome {
        let Some(action) = self.last_undoable_action() else {
            return UndoOutcome {
                success: false,
                message: "Nothing to undo".to_string(),
            };
        };
        let Some(UndoDirective::ResetHard { target }) = action.undo.clone() else {
            return UndoOutcome {
                success: false,
                message: "Nothing to undo".to_string(),
            };
        };

        if let Err(e) = self.git.reset(ResetMode::Hard, &target).await {
            return UndoOutcome {
                success: false,
                message: format!("Failed to undo '{}': {}", action.description, e),
            };
        }

        let id = action.id.clone();
        self.transaction(move |entries| {
            if let Some(entry) = entries.iter_mut().find(|e| e.id == id) {
                entry.undoable = false;
                entry.phase = ActionPhase::Consumed;
            }
        });
        tracing::info!(id = %action.id, target = %target, "undid action");

        UndoOutcome {
            success: true,
            message: format!(
                "Undid '{}': HEAD is back at {}",
                action.description,
                target.short(7)
            ),
        }
    }

    /// All entries on disk, oldest first. Unreadable files read as empty.
    pub fn load(&self) -> Vec<RecordedAction> {
        match self.try_load() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(path = %self.file.display(), error = %e, "journal unreadable, treating as empty");
                Vec::new()
            }
        }
    }

    fn try_load(&self) -> Result<Vec<RecordedAction>, JournalError> {
        let text = match fs::read_to_string(&self.file) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&text)?)
    }

    fn save(&self, entries: &mut Vec<RecordedAction>) -> Result<(), JournalError> {
        trim_to_capacity(entries, self.max_entries);

        if let Some(parent) = self.file.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(entries)?;
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.file)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        Ok(())
    }

    /// Run one locked load, mutate, save cycle.
    ///
    /// Lock and write failures are logged; the mutation is still attempted
    /// without the lock.
    fn transaction(&self, mutate: impl FnOnce(&mut Vec<RecordedAction>)) {
        let _lock = match JournalLock::acquire(&self.lock_file) {
            Ok(lock) => Some(lock),
            Err(e) => {
                tracing::warn!(error = %e, "journal lock unavailable, writing unlocked");
                None
            }
        };

        let mut entries = self.load();
        mutate(&mut entries);
        if let Err(e) = self.save(&mut entries) {
            tracing::warn!(path = %self.file.display(), error = %e, "failed to write journal");
        }
    }

    async fn snapshot(&self) -> HeadSnapshot {
        let (head, branch) = tokio::join!(self.git.head_oid(), self.git.current_branch());
        HeadSnapshot { head, branch }
    }
}

/// Newest entry filling the undo slot for `repository_path`.
pub fn find_undoable<'a>(
    entries: &'a [RecordedAction],
    repository_path: &str,
) -> Option<&'a RecordedAction> {
    entries
        .iter()
        .rev()
        .find(|e| e.can_undo_in(repository_path))
}

/// Drop the oldest entries until at most `max` remain.
pub fn trim_to_capacity<T>(entries: &mut Vec<T>, max: usize) {
    if entries.len() > max {
        let excess = entries.len() - max;
        entries.drain(..excess);
    }
}

fn normalize_repo_path(path: &Path) -> String {
    let canonical = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    canonical.to_string_lossy().trim_end_matches('/').to_string()
}
