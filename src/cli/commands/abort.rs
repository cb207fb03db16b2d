//! abort command - Abandon a paused merge, rebase, cherry-pick or bisect

use crate::core::ops::journal::ActionType;
use crate::engine::{run_guarded, ActionRequest, Context, Operation};
use crate::git::{Git, GitError, OngoingOperation};
use crate::ui::output;
use anyhow::Result;

/// Abort whatever multi-step operation is in progress.
pub async fn abort(ctx: &Context) -> Result<()> {
    let git = ctx.git();
    let ongoing = git.ongoing_operation().await;
    let what = ongoing
        .as_ref()
        .map_or("operation", |op| op.description());

    let journal = ctx.journal(&git).await;
    let request = ActionRequest {
        operation: Operation::AbortOperation,
        action_type: ActionType::Abort,
        description: format!("abort {what}"),
        undoable: false,
    };
    run_guarded(ctx, &git, &journal, request, || {
        abort_ongoing(&git, ongoing.as_ref())
    })
    .await?;

    output::success(format!("Aborted the {what}."), ctx.verbosity());
    Ok(())
}

async fn abort_ongoing(git: &Git, ongoing: Option<&OngoingOperation>) -> Result<(), GitError> {
    match ongoing {
        Some(op) => git.abort_operation(op).await,
        None => Err(GitError::Refused {
            reason: "no operation in progress".to_string(),
        }),
    }
}
