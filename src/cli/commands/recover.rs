//! recover command - Bring back deleted branches, old file versions and dropped stashes
//!
//! Candidates are found from what git still remembers:
//! - deleted branches from the HEAD reflog
//! - file versions from first-parent history
//! - dropped stashes from unreachable stash-shaped commits
//!
//! Recovery never rewrites history, so none of these actions are undoable
//! through the journal.

use crate::core::naming::recovery_name;
use crate::core::ops::journal::ActionType;
use crate::engine::{run_guarded, ActionRequest, Context, Operation};
use crate::git::{DEFAULT_SCAN_LIMIT, STASH_SCAN_LIMIT};
use crate::ui::output;
use anyhow::{bail, Result};

/// Recreate a deleted branch.
///
/// Without `name`, lists the candidates and recovers the most recent one.
pub async fn branch(ctx: &Context, name: Option<&str>, new_name: Option<&str>) -> Result<()> {
    let git = ctx.git();
    git.require_repository().await?;
    let verbosity = ctx.verbosity();

    let candidates = git.deleted_branches(DEFAULT_SCAN_LIMIT).await;
    let found = match name {
        Some(name) => match candidates.iter().find(|b| b.name.as_str() == name) {
            Some(found) => found,
            None => bail!("No deleted branch named '{name}' found in the reflog"),
        },
        None => {
            let Some(latest) = candidates.first() else {
                output::print("No deleted branches found in the reflog.", verbosity);
                return Ok(());
            };
            output::print("Deleted branches (most recent first):", verbosity);
            for b in &candidates {
                output::print(
                    format!("  {:<30} {}  left {}", b.name, b.tip.short(7), b.left_at),
                    verbosity,
                );
            }
            latest
        }
    };

    let target = match new_name {
        Some(n) => n.to_string(),
        None => {
            let existing = git.list_branches().await;
            recovery_name(found.name.as_str(), existing.iter().map(String::as_str))
        }
    };

    let journal = ctx.journal(&git).await;
    let request = ActionRequest {
        operation: Operation::CreateBranch {
            name: target.clone(),
        },
        action_type: ActionType::RecoverBranch,
        description: format!("recover branch {} as {target}", found.name),
        undoable: false,
    };
    let tip = found.tip.clone();
    run_guarded(ctx, &git, &journal, request, || git.create_branch(&target, &tip)).await?;

    output::success(
        format!("Recovered '{}' as branch '{target}' at {}", found.name, tip.short(7)),
        verbosity,
    );
    Ok(())
}

/// Restore `path` from `from`, or from the last commit that contains it.
///
/// Without `from`, lists the commits that changed the file before picking
/// the newest version still present in history.
pub async fn file(ctx: &Context, path: &str, from: Option<&str>) -> Result<()> {
    let git = ctx.git();
    git.require_repository().await?;
    let verbosity = ctx.verbosity();
    let path = git.repo_path(path).await?;

    let (source, label) = match from {
        Some(rev) => (rev.to_string(), rev.to_string()),
        None => {
            let versions = git.file_history(&path, DEFAULT_SCAN_LIMIT).await;
            if !versions.is_empty() {
                output::print(format!("Commits changing '{path}' (most recent first):"), verbosity);
                for c in &versions {
                    output::print(
                        format!("  {}  {}  {}", c.oid.short(7), c.date, c.message),
                        verbosity,
                    );
                }
            }
            match git.last_commit_with_path(&path, DEFAULT_SCAN_LIMIT).await {
                Some(commit) => (commit.oid.to_string(), commit.oid.short(7).to_string()),
                None => bail!("No commit among the last {DEFAULT_SCAN_LIMIT} contains '{path}'"),
            }
        }
    };

    let journal = ctx.journal(&git).await;
    let request = ActionRequest {
        operation: Operation::RestoreFile {
            path: path.clone(),
            source: source.clone(),
        },
        action_type: ActionType::RecoverFile,
        description: format!("restore {path} from {label}"),
        undoable: false,
    };
    run_guarded(ctx, &git, &journal, request, || git.restore_file(&path, &source)).await?;

    output::success(format!("Restored '{path}' from {label}"), verbosity);
    Ok(())
}

/// Re-apply a dropped stash.
///
/// Without `oid`, lists the candidates and applies the most recent one.
pub async fn stash(ctx: &Context, oid: Option<&str>) -> Result<()> {
    let git = ctx.git();
    git.require_repository().await?;
    let verbosity = ctx.verbosity();

    let (target, description) = match oid {
        Some(rev) => match git.resolve_commit(rev).await {
            Some(target) => (target, format!("stash {rev}")),
            None => bail!("'{rev}' does not name a commit"),
        },
        None => {
            let candidates = git.dropped_stashes(STASH_SCAN_LIMIT).await;
            let Some(latest) = candidates.first() else {
                output::print("No dropped stashes found.", verbosity);
                return Ok(());
            };
            output::print("Dropped stashes (most recent first):", verbosity);
            for s in &candidates {
                output::print(
                    format!("  {}  {}  {}", s.oid.short(7), s.date, s.description),
                    verbosity,
                );
            }
            (latest.oid.clone(), latest.description.clone())
        }
    };

    let journal = ctx.journal(&git).await;
    let request = ActionRequest {
        operation: Operation::ApplyStash {
            oid: target.clone(),
        },
        action_type: ActionType::RecoverStash,
        description: format!("apply dropped {description}"),
        undoable: false,
    };
    run_guarded(ctx, &git, &journal, request, || git.apply_stash(&target)).await?;

    output::success(
        format!("Applied stash {} to the working tree", target.short(7)),
        verbosity,
    );
    Ok(())
}
