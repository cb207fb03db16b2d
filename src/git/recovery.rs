//! git::recovery
//!
//! Queries that locate things the operator lost: deleted branches, dropped
//! stashes and old versions of files.
//!
//! All of them are reads, so they share the accessor's best-effort policy:
//! failures yield an empty result.

use std::collections::HashSet;
use std::path::Path;

use super::interface::{local_branch_names, CommitRef, Git};
use crate::core::types::{BranchName, Oid, UtcTimestamp};

/// Default number of reflog entries or commits inspected.
pub const DEFAULT_SCAN_LIMIT: usize = 100;

/// Default number of dropped stashes reported.
pub const STASH_SCAN_LIMIT: usize = 50;

/// A branch that was checked out at some point and no longer exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedBranch {
    pub name: BranchName,
    /// Commit the branch pointed at when it was last left.
    pub tip: Oid,
    /// When HEAD last moved away from the branch.
    pub left_at: UtcTimestamp,
}

/// A stash commit no longer reachable from `refs/stash`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedStash {
    pub oid: Oid,
    pub description: String,
    pub date: UtcTimestamp,
}

impl Git {
    /// Branches HEAD has left that no longer exist, most recent first.
    ///
    /// Scans at most `max` entries of the HEAD reflog. Each name is reported
    /// once, at its most recent departure.
    pub async fn deleted_branches(&self, max: usize) -> Vec<DeletedBranch> {
        self.read("deleted_branches", Vec::new(), move |repo| {
            let existing: HashSet<String> = local_branch_names(repo)?.into_iter().collect();
            let reflog = repo.reflog("HEAD")?;

            let mut seen = HashSet::new();
            let mut found = Vec::new();
            for entry in reflog.iter().take(max) {
                let Some(name) = entry.message().and_then(checkout_source) else {
                    continue;
                };
                if !seen.insert(name.to_string()) {
                    continue;
                }
                if existing.contains(name) || looks_like_oid(name) {
                    continue;
                }
                let Ok(branch) = BranchName::new(name) else {
                    continue;
                };
                let tip = entry.id_old();
                if tip.is_zero() || repo.find_commit(tip).is_err() {
                    continue;
                }
                found.push(DeletedBranch {
                    name: branch,
                    tip: tip.into(),
                    left_at: UtcTimestamp::from_epoch_seconds(entry.committer().when().seconds()),
                });
            }
            Ok(found)
        })
        .await
    }

    /// Stash commits that were dropped or cleared, most recent first.
    ///
    /// Candidates come from `git fsck --unreachable`; commits that do not
    /// look like stashes are ignored. Duplicate descriptions are reported
    /// once, and at most `max` stashes are returned.
    pub async fn dropped_stashes(&self, max: usize) -> Vec<DroppedStash> {
        let listing = match self
            .run(&["fsck", "--unreachable", "--no-reflogs", "--no-progress"])
            .await
        {
            Ok(out) => out,
            Err(e) => {
                tracing::debug!(error = %e, "unreachable object scan failed");
                return Vec::new();
            }
        };
        let candidates = unreachable_commits(&listing);

        self.read("dropped_stashes", Vec::new(), move |repo| {
            let mut stashes = Vec::new();
            for hex in candidates {
                let Ok(oid) = git2::Oid::from_str(&hex) else {
                    continue;
                };
                let Ok(commit) = repo.find_commit(oid) else {
                    continue;
                };
                let summary = commit.summary().unwrap_or("");
                if commit.parent_count() < 2 || !is_stash_message(summary) {
                    continue;
                }
                stashes.push(DroppedStash {
                    oid: oid.into(),
                    description: summary.to_string(),
                    date: UtcTimestamp::from_epoch_seconds(commit.time().seconds()),
                });
            }

            stashes.sort_by(|a, b| b.date.cmp(&a.date));
            let mut seen = HashSet::new();
            stashes.retain(|s| seen.insert(s.description.clone()));
            stashes.truncate(max);
            Ok(stashes)
        })
        .await
    }

    /// Commits reachable from HEAD that changed `path`, newest first.
    ///
    /// Inspects at most `max` commits.
    pub async fn file_history(&self, path: &str, max: usize) -> Vec<CommitRef> {
        let path = path.to_string();
        self.read("file_history", Vec::new(), move |repo| {
            let mut walk = repo.revwalk()?;
            walk.push_head()?;
            walk.set_sorting(git2::Sort::TOPOLOGICAL | git2::Sort::TIME)?;

            let mut history = Vec::new();
            for oid in walk.take(max) {
                let commit = repo.find_commit(oid?)?;
                let here = entry_id(&commit.tree()?, &path);
                let before = match commit.parent(0) {
                    Ok(parent) => entry_id(&parent.tree()?, &path),
                    Err(_) => None,
                };
                if here != before {
                    history.push(CommitRef::from_commit(&commit));
                }
            }
            Ok(history)
        })
        .await
    }

    /// Newest commit reachable from HEAD whose tree contains `path`.
    ///
    /// Inspects at most `max` commits.
    pub async fn last_commit_with_path(&self, path: &str, max: usize) -> Option<CommitRef> {
        let path = path.to_string();
        self.read("last_commit_with_path", None, move |repo| {
            let mut walk = repo.revwalk()?;
            walk.push_head()?;
            walk.set_sorting(git2::Sort::TOPOLOGICAL | git2::Sort::TIME)?;

            for oid in walk.take(max) {
                let commit = repo.find_commit(oid?)?;
                if entry_id(&commit.tree()?, &path).is_some() {
                    return Ok(Some(CommitRef::from_commit(&commit)));
                }
            }
            Ok(None)
        })
        .await
    }

    /// Whether the tree of commit `at` contains `path`.
    pub async fn file_exists_at(&self, at: &Oid, path: &str) -> bool {
        let at = at.clone();
        let path = path.to_string();
        self.read("file_exists_at", false, move |repo| {
            let commit = repo.find_commit(git2::Oid::from_str(at.as_str())?)?;
            Ok(entry_id(&commit.tree()?, &path).is_some())
        })
        .await
    }
}

fn entry_id(tree: &git2::Tree<'_>, path: &str) -> Option<git2::Oid> {
    tree.get_path(Path::new(path)).ok().map(|e| e.id())
}

/// Branch named by a `checkout: moving from X to Y` reflog message.
fn checkout_source(message: &str) -> Option<&str> {
    let rest = message.strip_prefix("checkout: moving from ")?;
    let (from, _) = rest.split_once(" to ")?;
    (!from.is_empty()).then_some(from)
}

/// Abbreviated or full hex ids show up when HEAD was detached.
fn looks_like_oid(name: &str) -> bool {
    name.len() >= 7 && name.chars().all(|c| c.is_ascii_hexdigit())
}

fn is_stash_message(summary: &str) -> bool {
    summary.starts_with("WIP on ") || summary.starts_with("On ")
}

fn unreachable_commits(fsck_output: &str) -> Vec<String> {
    fsck_output
        .lines()
        .filter_map(|line| line.strip_prefix("unreachable commit "))
        .map(|hex| hex.trim().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_checkout_messages() {
        assert_eq!(
            checkout_source("checkout: moving from feature/x to main"),
            Some("feature/x")
        );
        assert_eq!(checkout_source("commit: add things"), None);
        assert_eq!(checkout_source("checkout: moving from  to main"), None);
        assert_eq!(checkout_source("reset: moving to HEAD~1"), None);
    }

    #[test]
    fn detached_positions_are_not_branches() {
        assert!(looks_like_oid("abc1234"));
        assert!(looks_like_oid(&"f".repeat(40)));
        assert!(!looks_like_oid("feature"));
        assert!(!looks_like_oid("abc"));
        assert!(!looks_like_oid("deadbeef-fix"));
    }

    #[test]
    fn stash_messages() {
        assert!(is_stash_message("WIP on main: 1a2b3c4 add login"));
        assert!(is_stash_message("On main: my stash"));
        assert!(!is_stash_message("index on main: 1a2b3c4 add login"));
        assert!(!is_stash_message("Add feature"));
    }

    #[test]
    fn extracts_unreachable_commits_only() {
        let out = "unreachable blob 1111111111111111111111111111111111111111\n\
                   unreachable commit 2222222222222222222222222222222222222222\n\
                   dangling commit 3333333333333333333333333333333333333333\n\
                   unreachable commit 4444444444444444444444444444444444444444\n";
        assert_eq!(
            unreachable_commits(out),
            vec!["2".repeat(40), "4".repeat(40)]
        );
    }
}
