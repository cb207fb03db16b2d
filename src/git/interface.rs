//! git::interface
//!
//! The [`Git`] accessor: the single doorway between gitmend and a repository.
//!
//! # Reads
//!
//! Read queries go through `git2` on tokio's blocking pool. Each query opens
//! its own repository handle, so independent queries can run concurrently.
//! Reads are best-effort: any failure is logged at debug level and collapses
//! to an empty or default value. The one exception is
//! [`Git::require_repository`], the hard precondition every command checks
//! first.
//!
//! # Mutations
//!
//! Mutations run the `git` executable as a child process, so hooks, config
//! and index locking behave exactly as the operator expects. A failed
//! mutation returns [`GitError::CommandFailed`] carrying git's own stderr.
//! Mutations must never overlap with each other.
//!
//! # Paths
//!
//! Operator paths are relative to the directory the accessor is bound to.
//! [`Git::repo_path`] rewrites them relative to the top of the working tree;
//! every accessor method that takes a file path expects that form, and the
//! mutations taking paths run git from the top of the working tree.
//!
//! # Example
//!
//! ```no_run
//! use gitmend::git::Git;
//!
//! # async fn demo() -> Result<(), gitmend::git::GitError> {
//! let git = Git::new(".");
//! git.require_repository().await?;
//! if let Some(branch) = git.current_branch().await {
//!     println!("on {branch}");
//! }
//! # Ok(())
//! # }
//! ```

use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tokio::process::Command;

use crate::core::types::{Oid, UtcTimestamp};

/// Errors from repository access.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not inside a git repository with a working tree.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// A git command exited unsuccessfully.
    #[error("{command} failed: {stderr}")]
    CommandFailed {
        /// The command line that was run
        command: String,
        /// What git printed on stderr
        stderr: String,
    },

    /// The git executable could not be started.
    #[error("failed to run {command}: {message}")]
    Spawn { command: String, message: String },

    /// An operator path points outside the working tree.
    #[error("'{path}' is outside the repository")]
    OutsideRepository { path: String },

    /// The request cannot be expressed as a git command.
    #[error("refused: {reason}")]
    Refused { reason: String },
}

/// How far a reset reaches into the index and working tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResetMode {
    /// Move HEAD only; changes stay staged.
    Soft,
    /// Move HEAD and reset the index; changes stay in the working tree.
    #[default]
    Mixed,
    /// Move HEAD, index and working tree; changes are discarded.
    Hard,
}

impl ResetMode {
    /// Flag passed to `git reset`.
    pub fn as_flag(&self) -> &'static str {
        match self {
            Self::Soft => "--soft",
            Self::Mixed => "--mixed",
            Self::Hard => "--hard",
        }
    }

    /// Lowercase name of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Soft => "soft",
            Self::Mixed => "mixed",
            Self::Hard => "hard",
        }
    }
}

impl std::fmt::Display for ResetMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A multi-step git operation paused in the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum OngoingOperation {
    Merge,
    Rebase {
        /// Current step (1-indexed), if git recorded it.
        current: Option<usize>,
        /// Total steps, if git recorded it.
        total: Option<usize>,
    },
    CherryPick,
    Bisect,
}

impl OngoingOperation {
    /// Short name used in messages.
    ///
    /// ```
    /// use gitmend::git::OngoingOperation;
    ///
    /// assert_eq!(OngoingOperation::CherryPick.description(), "cherry-pick");
    /// ```
    pub fn description(&self) -> &'static str {
        match self {
            Self::Merge => "merge",
            Self::Rebase { .. } => "rebase",
            Self::CherryPick => "cherry-pick",
            Self::Bisect => "bisect",
        }
    }

    /// Arguments that abandon the operation.
    pub fn abort_args(&self) -> [&'static str; 2] {
        match self {
            Self::Merge => ["merge", "--abort"],
            Self::Rebase { .. } => ["rebase", "--abort"],
            Self::CherryPick => ["cherry-pick", "--abort"],
            Self::Bisect => ["bisect", "reset"],
        }
    }
}

impl std::fmt::Display for OngoingOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rebase {
                current: Some(c),
                total: Some(t),
            } => write!(f, "rebase ({c}/{t})"),
            _ => f.write_str(self.description()),
        }
    }
}

/// A commit as shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitRef {
    pub oid: Oid,
    /// First line of the commit message.
    pub message: String,
    pub author: String,
    pub date: UtcTimestamp,
}

impl CommitRef {
    pub(super) fn from_commit(commit: &git2::Commit<'_>) -> Self {
        Self {
            oid: commit.id().into(),
            message: commit.summary().unwrap_or("").to_string(),
            author: commit.author().name().unwrap_or("").to_string(),
            date: UtcTimestamp::from_epoch_seconds(commit.time().seconds()),
        }
    }
}

/// Point-in-time projection of `git status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepoStatus {
    /// Current branch, `None` when detached.
    pub branch: Option<String>,
    /// Upstream of the current branch, e.g. `origin/main`.
    pub tracking: Option<String>,
    pub staged: Vec<String>,
    /// Tracked paths with unstaged modifications (conflicted paths included).
    pub modified: Vec<String>,
    pub untracked: Vec<String>,
    /// Commits on the branch not on its upstream.
    pub ahead: usize,
    /// Commits on the upstream not on the branch.
    pub behind: usize,
}

impl RepoStatus {
    /// Whether nothing is staged, modified or untracked.
    pub fn is_clean(&self) -> bool {
        self.staged.is_empty() && self.modified.is_empty() && self.untracked.is_empty()
    }
}

/// An entry of `git stash list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StashEntry {
    pub index: usize,
    pub message: String,
    pub oid: Oid,
}

/// Accessor bound to one working directory.
///
/// Cheap to clone; carries no state beyond the path.
#[derive(Debug, Clone)]
pub struct Git {
    workdir: PathBuf,
}

impl Git {
    /// Bind an accessor to `path` (any directory inside the repository).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            workdir: path.into(),
        }
    }

    /// The directory this accessor was bound to.
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    // =========================================================================
    // Plumbing
    // =========================================================================

    /// Run a read query on the blocking pool, collapsing failures to `default`.
    pub(super) async fn read<T, F>(&self, query: &'static str, default: T, f: F) -> T
    where
        T: Send + 'static,
        F: FnOnce(&mut git2::Repository) -> Result<T, git2::Error> + Send + 'static,
    {
        let path = self.workdir.clone();
        let joined = tokio::task::spawn_blocking(move || {
            let mut repo = git2::Repository::discover(&path)?;
            f(&mut repo)
        })
        .await;

        match joined {
            Ok(Ok(value)) => value,
            Ok(Err(e)) => {
                tracing::debug!(query, error = %e.message(), "git query failed");
                default
            }
            Err(e) => {
                tracing::debug!(query, error = %e, "git query task failed");
                default
            }
        }
    }

    /// Run `git <args>` in the bound directory, returning stdout.
    pub(super) async fn run(&self, args: &[&str]) -> Result<String, GitError> {
        self.run_in(&self.workdir, args).await
    }

    /// Run `git <args>` from the top of the working tree, so that pathspecs
    /// are read as repository-relative.
    async fn run_at_top(&self, args: &[&str]) -> Result<String, GitError> {
        let top = self.top_level().await?;
        self.run_in(&top, args).await
    }

    async fn run_in(&self, dir: &Path, args: &[&str]) -> Result<String, GitError> {
        let command = format!("git {}", args.join(" "));
        tracing::debug!(%command, cwd = %dir.display(), "running git");

        let output = Command::new("git")
            .args(args)
            .current_dir(dir)
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .await
            .map_err(|e| GitError::Spawn {
                command: command.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(GitError::CommandFailed { command, stderr });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    // =========================================================================
    // Repository
    // =========================================================================

    /// Whether the bound directory is inside a non-bare repository.
    pub async fn is_repository(&self) -> bool {
        self.read("is_repository", false, |repo| Ok(!repo.is_bare()))
            .await
    }

    /// Fail with [`GitError::NotARepo`] unless inside a repository.
    pub async fn require_repository(&self) -> Result<(), GitError> {
        if self.is_repository().await {
            Ok(())
        } else {
            Err(GitError::NotARepo {
                path: self.workdir.clone(),
            })
        }
    }

    /// Top-level directory of the working tree.
    pub async fn repository_root(&self) -> Option<PathBuf> {
        self.read("repository_root", None, |repo| {
            Ok(repo.workdir().map(Path::to_path_buf))
        })
        .await
    }

    /// Rewrite an operator path relative to the top of the working tree,
    /// with `/` separators. The path need not exist; the top itself is `"."`.
    pub async fn repo_path(&self, path: &str) -> Result<String, GitError> {
        let top = self.top_level().await?;
        let absolute = canonical(&lexical(&canonical(&self.workdir).join(path)));
        let relative = absolute
            .strip_prefix(&top)
            .map_err(|_| GitError::OutsideRepository {
                path: path.to_string(),
            })?;

        let parts: Vec<_> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Ok(if parts.is_empty() {
            ".".to_string()
        } else {
            parts.join("/")
        })
    }

    /// [`Git::repo_path`] over a list, failing on the first bad path.
    pub async fn repo_paths(&self, paths: &[String]) -> Result<Vec<String>, GitError> {
        let mut converted = Vec::with_capacity(paths.len());
        for path in paths {
            converted.push(self.repo_path(path).await?);
        }
        Ok(converted)
    }

    async fn top_level(&self) -> Result<PathBuf, GitError> {
        match self.repository_root().await {
            Some(root) => Ok(canonical(&root)),
            None => Err(GitError::NotARepo {
                path: self.workdir.clone(),
            }),
        }
    }

    // =========================================================================
    // HEAD
    // =========================================================================

    /// Branch HEAD names, including an unborn one. `None` when detached.
    pub async fn current_branch(&self) -> Option<String> {
        self.read("current_branch", None, head_branch).await
    }

    /// Short name for HEAD: the branch, or the abbreviated commit id when
    /// detached. `None` on an unborn detached HEAD or outside a repository.
    pub async fn abbrev_head(&self) -> Option<String> {
        self.read("abbrev_head", None, |repo| {
            if let Some(branch) = head_branch(repo)? {
                return Ok(Some(branch));
            }
            Ok(head_commit(repo)?.map(|c| Oid::from(c.id()).short(7).to_string()))
        })
        .await
    }

    /// Whether HEAD points directly at a commit instead of naming a branch.
    pub async fn is_detached_head(&self) -> bool {
        self.read("is_detached_head", false, |repo| {
            let head = repo.find_reference("HEAD")?;
            Ok(head.kind() == Some(git2::ReferenceType::Direct))
        })
        .await
    }

    /// Commit HEAD resolves to, `None` on an unborn branch.
    pub async fn head_oid(&self) -> Option<Oid> {
        self.read("head_oid", None, |repo| Ok(head_commit(repo)?.map(|c| c.id().into())))
            .await
    }

    /// The commit HEAD resolves to.
    pub async fn last_commit(&self) -> Option<CommitRef> {
        self.read("last_commit", None, |repo| {
            Ok(head_commit(repo)?.map(|c| CommitRef::from_commit(&c)))
        })
        .await
    }

    /// Up to `n` commits along HEAD's first-parent chain, newest first.
    pub async fn recent_commits(&self, n: usize) -> Vec<CommitRef> {
        self.read("recent_commits", Vec::new(), move |repo| {
            let Some(_) = head_commit(repo)? else {
                return Ok(Vec::new());
            };
            let mut walk = repo.revwalk()?;
            walk.push_head()?;
            walk.simplify_first_parent()?;
            walk.take(n)
                .map(|oid| -> Result<CommitRef, git2::Error> {
                    Ok(CommitRef::from_commit(&repo.find_commit(oid?)?))
                })
                .collect()
        })
        .await
    }

    /// Length of HEAD's first-parent chain, counting at most `limit` commits.
    pub async fn commit_count(&self, limit: usize) -> usize {
        self.read("commit_count", 0, move |repo| {
            if head_commit(repo)?.is_none() {
                return Ok(0);
            }
            let mut walk = repo.revwalk()?;
            walk.push_head()?;
            walk.simplify_first_parent()?;
            Ok(walk.take(limit).count())
        })
        .await
    }

    /// Resolve a revision expression to a commit.
    pub async fn resolve_commit(&self, rev: &str) -> Option<Oid> {
        let rev = rev.to_string();
        self.read("resolve_commit", None, move |repo| {
            let commit = repo.revparse_single(&rev)?.peel_to_commit()?;
            Ok(Some(commit.id().into()))
        })
        .await
    }

    /// Whether `oid` is reachable from any remote-tracking ref.
    pub async fn is_commit_pushed(&self, oid: &Oid) -> bool {
        let oid = oid.clone();
        self.read("is_commit_pushed", false, move |repo| {
            let target = git2::Oid::from_str(oid.as_str())?;
            for reference in repo.references_glob("refs/remotes/*")? {
                let Some(tip) = reference?.resolve().ok().and_then(|r| r.target()) else {
                    continue;
                };
                if tip == target || repo.graph_descendant_of(tip, target)? {
                    return Ok(true);
                }
            }
            Ok(false)
        })
        .await
    }

    // =========================================================================
    // Working tree
    // =========================================================================

    /// Whether tracked files have staged or unstaged changes.
    ///
    /// Untracked files do not count.
    pub async fn has_uncommitted_changes(&self) -> bool {
        self.read("has_uncommitted_changes", false, |repo| {
            Ok(status_entries(repo, false)?
                .iter()
                .any(|(_, s)| is_staged(*s) || is_modified(*s)))
        })
        .await
    }

    /// Whether the index differs from HEAD.
    pub async fn has_staged_changes(&self) -> bool {
        self.read("has_staged_changes", false, |repo| {
            Ok(status_entries(repo, false)?
                .iter()
                .any(|(_, s)| is_staged(*s)))
        })
        .await
    }

    /// Whether `path` (repository-relative) differs from HEAD in the index or
    /// working tree.
    pub async fn path_has_changes(&self, path: &str) -> bool {
        let path = path.to_string();
        self.read("path_has_changes", false, move |repo| {
            let status = repo.status_file(Path::new(&path))?;
            Ok(is_staged(status) || is_modified(status))
        })
        .await
    }

    /// Paths with unresolved conflicts.
    pub async fn conflicted_files(&self) -> Vec<String> {
        self.read("conflicted_files", Vec::new(), |repo| {
            Ok(status_entries(repo, false)?
                .into_iter()
                .filter(|(_, s)| s.is_conflicted())
                .map(|(p, _)| p)
                .collect())
        })
        .await
    }

    /// Branch, upstream, file lists and ahead/behind counts.
    pub async fn status(&self) -> RepoStatus {
        self.read("status", RepoStatus::default(), |repo| {
            let mut status = RepoStatus {
                branch: head_branch(repo)?,
                ..RepoStatus::default()
            };
            if repo.find_reference("HEAD")?.kind() == Some(git2::ReferenceType::Direct) {
                status.branch = None;
            }

            for (path, s) in status_entries(repo, true)? {
                if is_staged(s) {
                    status.staged.push(path.clone());
                }
                if is_modified(s) {
                    status.modified.push(path.clone());
                }
                if s.is_wt_new() {
                    status.untracked.push(path);
                }
            }

            if let Some(branch) = status.branch.clone() {
                if let Some((tracking, ahead, behind)) = upstream_counts(repo, &branch) {
                    status.tracking = Some(tracking);
                    status.ahead = ahead;
                    status.behind = behind;
                }
            }
            Ok(status)
        })
        .await
    }

    /// Multi-step operation paused in the repository, if any.
    ///
    /// Markers are checked in the order merge, rebase, cherry-pick, bisect.
    pub async fn ongoing_operation(&self) -> Option<OngoingOperation> {
        self.read("ongoing_operation", None, |repo| {
            Ok(detect_operation(repo.path()))
        })
        .await
    }

    // =========================================================================
    // Refs
    // =========================================================================

    /// Whether any remote is configured.
    pub async fn has_remote(&self) -> bool {
        self.read("has_remote", false, |repo| Ok(!repo.remotes()?.is_empty()))
            .await
    }

    /// Names of local branches.
    pub async fn list_branches(&self) -> Vec<String> {
        self.read("list_branches", Vec::new(), |repo| local_branch_names(repo))
            .await
    }

    /// Whether a local branch named `name` exists.
    pub async fn branch_exists(&self, name: &str) -> bool {
        let name = name.to_string();
        self.read("branch_exists", false, move |repo| {
            Ok(repo.find_branch(&name, git2::BranchType::Local).is_ok())
        })
        .await
    }

    /// Entries of the stash, most recent first.
    pub async fn stash_list(&self) -> Vec<StashEntry> {
        self.read("stash_list", Vec::new(), |repo| {
            let mut entries = Vec::new();
            repo.stash_foreach(|index, message, oid| {
                entries.push(StashEntry {
                    index,
                    message: message.to_string(),
                    oid: (*oid).into(),
                });
                true
            })?;
            Ok(entries)
        })
        .await
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Remove the last `count` commits from the current branch.
    ///
    /// Removing every commit leaves the branch unborn. In soft mode the
    /// index keeps the removed content; in mixed mode the index is emptied
    /// and the files stay in the working tree. Hard mode cannot remove the
    /// root commit.
    pub async fn undo_commits(&self, count: usize, mode: ResetMode) -> Result<(), GitError> {
        let total = self.commit_count(count.saturating_add(1)).await;
        if count == 0 || count > total {
            return Err(GitError::Refused {
                reason: format!("cannot undo {count} commit(s), branch has {total}"),
            });
        }

        if count < total {
            let target = format!("HEAD~{count}");
            self.run(&["reset", "-q", mode.as_flag(), &target]).await?;
            return Ok(());
        }

        match mode {
            ResetMode::Hard => Err(GitError::Refused {
                reason: "a hard reset cannot remove the root commit".to_string(),
            }),
            ResetMode::Soft => {
                self.run(&["update-ref", "-d", "HEAD"]).await?;
                Ok(())
            }
            ResetMode::Mixed => {
                self.run(&["update-ref", "-d", "HEAD"]).await?;
                self.run(&["read-tree", "--empty"]).await?;
                Ok(())
            }
        }
    }

    /// Move the current branch to `target`; `mode` decides what happens to
    /// the index and working tree.
    pub async fn reset(&self, mode: ResetMode, target: &Oid) -> Result<(), GitError> {
        self.run(&["reset", "-q", mode.as_flag(), target.as_str()])
            .await?;
        Ok(())
    }

    /// Replace the last commit's message, leaving staged changes alone.
    pub async fn amend_message(&self, message: &str) -> Result<(), GitError> {
        self.run(&["commit", "-q", "--amend", "--only", "-m", message])
            .await?;
        Ok(())
    }

    /// Fold the staged changes into the last commit, keeping its message.
    pub async fn amend_staged(&self) -> Result<(), GitError> {
        self.run(&["commit", "-q", "--amend", "--no-edit"]).await?;
        Ok(())
    }

    /// Create a local branch pointing at `at`.
    pub async fn create_branch(&self, name: &str, at: &Oid) -> Result<(), GitError> {
        self.run(&["branch", name, at.as_str()]).await?;
        Ok(())
    }

    /// Restore repository-relative `path` in the index and working tree
    /// from revision `source`.
    pub async fn restore_file(&self, path: &str, source: &str) -> Result<(), GitError> {
        self.run_at_top(&["checkout", source, "--", path]).await?;
        Ok(())
    }

    /// Apply a stash commit on top of the working tree.
    pub async fn apply_stash(&self, oid: &Oid) -> Result<(), GitError> {
        self.run(&["stash", "apply", oid.as_str()]).await?;
        Ok(())
    }

    /// Abandon a paused operation.
    pub async fn abort_operation(&self, op: &OngoingOperation) -> Result<(), GitError> {
        self.run(&op.abort_args()).await?;
        Ok(())
    }

    /// Delete untracked files and directories.
    pub async fn clean_untracked(&self) -> Result<(), GitError> {
        self.run(&["clean", "-f", "-d", "-q"]).await?;
        Ok(())
    }

    /// Throw away unstaged modifications to repository-relative `paths`
    /// (the whole working tree when empty).
    pub async fn discard_changes(&self, paths: &[String]) -> Result<(), GitError> {
        let mut args = vec!["checkout", "--"];
        if paths.is_empty() {
            args.push(".");
        } else {
            args.extend(paths.iter().map(String::as_str));
        }
        self.run_at_top(&args).await?;
        Ok(())
    }

    /// Move staged changes for repository-relative `paths` (everything when
    /// empty) back to the working tree.
    pub async fn unstage(&self, paths: &[String]) -> Result<(), GitError> {
        let unborn = self.head_oid().await.is_none();
        let mut args = if unborn {
            vec!["rm", "--cached", "-r", "-q", "--"]
        } else {
            vec!["reset", "-q", "HEAD", "--"]
        };
        if paths.is_empty() {
            args.push(".");
        } else {
            args.extend(paths.iter().map(String::as_str));
        }
        self.run_at_top(&args).await?;
        Ok(())
    }
}

// =============================================================================
// Path helpers
// =============================================================================

/// Resolve `.` and `..` without touching the filesystem.
fn lexical(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

/// Canonicalize the longest existing ancestor of `path` and re-append the
/// rest, so paths to deleted files still resolve through symlinks.
fn canonical(path: &Path) -> PathBuf {
    let mut existing = path;
    let mut missing = Vec::new();
    loop {
        if let Ok(resolved) = std::fs::canonicalize(existing) {
            return missing
                .iter()
                .rev()
                .fold(resolved, |acc: PathBuf, part| acc.join(part));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => return path.to_path_buf(),
        }
    }
}

// =============================================================================
// git2 helpers
// =============================================================================

fn head_branch(repo: &mut git2::Repository) -> Result<Option<String>, git2::Error> {
    let head = repo.find_reference("HEAD")?;
    Ok(head
        .symbolic_target()
        .and_then(|t| t.strip_prefix("refs/heads/"))
        .map(str::to_string))
}

fn head_commit(repo: &git2::Repository) -> Result<Option<git2::Commit<'_>>, git2::Error> {
    match repo.head() {
        Ok(head) => Ok(Some(head.peel_to_commit()?)),
        Err(e)
            if e.code() == git2::ErrorCode::UnbornBranch
                || e.code() == git2::ErrorCode::NotFound =>
        {
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

pub(super) fn local_branch_names(repo: &git2::Repository) -> Result<Vec<String>, git2::Error> {
    let mut names = Vec::new();
    for branch in repo.branches(Some(git2::BranchType::Local))? {
        let (branch, _) = branch?;
        if let Some(name) = branch.name()? {
            names.push(name.to_string());
        }
    }
    Ok(names)
}

fn status_entries(
    repo: &git2::Repository,
    include_untracked: bool,
) -> Result<Vec<(String, git2::Status)>, git2::Error> {
    let mut opts = git2::StatusOptions::new();
    opts.include_untracked(include_untracked)
        .recurse_untracked_dirs(include_untracked)
        .include_ignored(false);

    let statuses = repo.statuses(Some(&mut opts))?;
    Ok(statuses
        .iter()
        .filter_map(|e| e.path().map(|p| (p.to_string(), e.status())))
        .collect())
}

fn is_staged(s: git2::Status) -> bool {
    s.intersects(
        git2::Status::INDEX_NEW
            | git2::Status::INDEX_MODIFIED
            | git2::Status::INDEX_DELETED
            | git2::Status::INDEX_RENAMED
            | git2::Status::INDEX_TYPECHANGE,
    )
}

fn is_modified(s: git2::Status) -> bool {
    s.intersects(
        git2::Status::WT_MODIFIED
            | git2::Status::WT_DELETED
            | git2::Status::WT_RENAMED
            | git2::Status::WT_TYPECHANGE
            | git2::Status::CONFLICTED,
    )
}

fn upstream_counts(repo: &git2::Repository, branch: &str) -> Option<(String, usize, usize)> {
    let local_ref = format!("refs/heads/{branch}");
    let upstream = repo.branch_upstream_name(&local_ref).ok()?;
    let upstream = upstream.as_str()?.to_string();

    let local = repo.refname_to_id(&local_ref).ok()?;
    let remote = repo.refname_to_id(&upstream).ok()?;
    let (ahead, behind) = repo.graph_ahead_behind(local, remote).ok()?;

    let short = upstream
        .strip_prefix("refs/remotes/")
        .or_else(|| upstream.strip_prefix("refs/heads/"))
        .unwrap_or(&upstream)
        .to_string();
    Some((short, ahead, behind))
}

/// Inspect the control files in `git_dir` for a paused operation.
fn detect_operation(git_dir: &Path) -> Option<OngoingOperation> {
    if git_dir.join("MERGE_HEAD").exists() {
        return Some(OngoingOperation::Merge);
    }
    for (dir, step, last) in [("rebase-merge", "msgnum", "end"), ("rebase-apply", "next", "last")] {
        let state = git_dir.join(dir);
        if state.is_dir() {
            let read = |name: &str| {
                std::fs::read_to_string(state.join(name))
                    .ok()
                    .and_then(|s| s.trim().parse().ok())
            };
            return Some(OngoingOperation::Rebase {
                current: read(step),
                total: read(last),
            });
        }
    }
    if git_dir.join("CHERRY_PICK_HEAD").exists() {
        return Some(OngoingOperation::CherryPick);
    }
    if git_dir.join("BISECT_LOG").exists() {
        return Some(OngoingOperation::Bisect);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    mod ongoing_operation {
        use super::*;

        #[test]
        fn display_includes_rebase_progress() {
            let op = OngoingOperation::Rebase {
                current: Some(2),
                total: Some(5),
            };
            assert_eq!(op.to_string(), "rebase (2/5)");
            let op = OngoingOperation::Rebase {
                current: None,
                total: None,
            };
            assert_eq!(op.to_string(), "rebase");
        }

        #[test]
        fn abort_commands() {
            assert_eq!(OngoingOperation::Merge.abort_args(), ["merge", "--abort"]);
            assert_eq!(OngoingOperation::Bisect.abort_args(), ["bisect", "reset"]);
        }

        #[test]
        fn no_markers_means_none() {
            let dir = TempDir::new().unwrap();
            assert_eq!(detect_operation(dir.path()), None);
        }

        #[test]
        fn merge_wins_over_everything() {
            let dir = TempDir::new().unwrap();
            for marker in ["MERGE_HEAD", "CHERRY_PICK_HEAD", "BISECT_LOG"] {
                std::fs::write(dir.path().join(marker), "x").unwrap();
            }
            std::fs::create_dir(dir.path().join("rebase-merge")).unwrap();
            assert_eq!(detect_operation(dir.path()), Some(OngoingOperation::Merge));
        }

        #[test]
        fn rebase_beats_cherry_pick_and_reads_progress() {
            let dir = TempDir::new().unwrap();
            std::fs::write(dir.path().join("CHERRY_PICK_HEAD"), "x").unwrap();
            let state = dir.path().join("rebase-merge");
            std::fs::create_dir(&state).unwrap();
            std::fs::write(state.join("msgnum"), "3\n").unwrap();
            std::fs::write(state.join("end"), "7\n").unwrap();

            assert_eq!(
                detect_operation(dir.path()),
                Some(OngoingOperation::Rebase {
                    current: Some(3),
                    total: Some(7)
                })
            );
        }

        #[test]
        fn rebase_apply_progress() {
            let dir = TempDir::new().unwrap();
            let state = dir.path().join("rebase-apply");
            std::fs::create_dir(&state).unwrap();
            std::fs::write(state.join("next"), "1").unwrap();
            std::fs::write(state.join("last"), "2").unwrap();

            assert_eq!(
                detect_operation(dir.path()),
                Some(OngoingOperation::Rebase {
                    current: Some(1),
                    total: Some(2)
                })
            );
        }

        #[test]
        fn cherry_pick_beats_bisect() {
            let dir = TempDir::new().unwrap();
            std::fs::write(dir.path().join("BISECT_LOG"), "x").unwrap();
            std::fs::write(dir.path().join("CHERRY_PICK_HEAD"), "x").unwrap();
            assert_eq!(
                detect_operation(dir.path()),
                Some(OngoingOperation::CherryPick)
            );
        }
    }

    mod status_flags {
        use super::*;

        #[test]
        fn staged_and_modified_are_distinct() {
            assert!(is_staged(git2::Status::INDEX_NEW));
            assert!(!is_modified(git2::Status::INDEX_NEW));
            assert!(is_modified(git2::Status::WT_MODIFIED));
            assert!(!is_staged(git2::Status::WT_MODIFIED));
            assert!(!is_staged(git2::Status::WT_NEW));
            assert!(!is_modified(git2::Status::WT_NEW));
        }

        #[test]
        fn conflicts_count_as_modified() {
            assert!(is_modified(git2::Status::CONFLICTED));
        }
    }

    mod paths {
        use super::*;

        #[test]
        fn lexical_resolves_dots() {
            assert_eq!(lexical(Path::new("/a/b/./c/../d")), PathBuf::from("/a/b/d"));
            assert_eq!(lexical(Path::new("/a/..")), PathBuf::from("/"));
        }

        #[test]
        fn canonical_keeps_missing_tail() {
            let dir = TempDir::new().unwrap();
            let real = std::fs::canonicalize(dir.path()).unwrap();
            assert_eq!(
                canonical(&dir.path().join("gone/file.txt")),
                real.join("gone/file.txt")
            );
        }
    }

    mod reads_outside_repo {
        use super::*;

        #[tokio::test]
        async fn queries_fall_back_to_defaults() {
            let dir = TempDir::new().unwrap();
            let git = Git::new(dir.path());

            assert!(!git.is_repository().await);
            assert!(matches!(
                git.require_repository().await,
                Err(GitError::NotARepo { .. })
            ));
            assert_eq!(git.current_branch().await, None);
            assert_eq!(git.head_oid().await, None);
            assert!(!git.has_uncommitted_changes().await);
            assert_eq!(git.status().await, RepoStatus::default());
            assert!(git.stash_list().await.is_empty());
            assert_eq!(git.commit_count(10).await, 0);
        }
    }

    #[test]
    fn reset_mode_flags() {
        assert_eq!(ResetMode::Soft.as_flag(), "--soft");
        assert_eq!(ResetMode::default(), ResetMode::Mixed);
        assert_eq!(ResetMode::Hard.to_string(), "hard");
    }

    #[test]
    fn command_failure_shows_stderr() {
        let err = GitError::CommandFailed {
            command: "git reset --hard HEAD~1".into(),
            stderr: "fatal: ambiguous argument".into(),
        };
        assert_eq!(
            err.to_string(),
            "git reset --hard HEAD~1 failed: fatal: ambiguous argument"
        );
    }
}
