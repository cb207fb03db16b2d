//! undo command - Remove recent commits from the current branch
//!
//! The removed commits stay reachable through the journal: a completed undo
//! records the previous HEAD, and `gitmend undo-last` resets back to it.
//!
//! # Modes
//!
//! - `--soft`: changes from the removed commits stay staged
//! - `--mixed` (default): changes stay in the working tree, unstaged
//! - `--hard`: changes are discarded, along with any uncommitted work
//!
//! Removing every commit of the branch leaves it unborn. That is allowed for
//! soft and mixed undo and blocked for hard undo.

use crate::core::ops::journal::ActionType;
use crate::engine::{run_guarded, ActionRequest, Context, Operation};
use crate::git::ResetMode;
use crate::ui::output;
use anyhow::Result;

/// Undo the last `count` commits.
pub async fn undo(ctx: &Context, count: usize, mode: ResetMode) -> Result<()> {
    let git = ctx.git();
    let journal = ctx.journal(&git).await;

    let request = ActionRequest {
        operation: Operation::UndoCommits { count, mode },
        action_type: ActionType::Undo,
        description: format!("undo {count} commit(s) ({mode})"),
        undoable: true,
    };
    let action = run_guarded(ctx, &git, &journal, request, || git.undo_commits(count, mode)).await?;

    let verbosity = ctx.verbosity();
    let kept = match mode {
        ResetMode::Soft => "their changes are staged",
        ResetMode::Mixed => "their changes are in the working tree",
        ResetMode::Hard => "their changes were discarded",
    };
    output::success(format!("Removed {count} commit(s); {kept}."), verbosity);
    if action.undo.is_some() {
        output::print("Run 'gitmend undo-last' to bring them back.", verbosity);
    }
    Ok(())
}
