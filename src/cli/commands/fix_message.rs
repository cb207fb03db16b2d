//! fix-message command - Rewrite the last commit's message

use crate::core::ops::journal::ActionType;
use crate::engine::{run_guarded, ActionRequest, Context, Operation};
use crate::ui::output;
use anyhow::{bail, Result};

/// Replace the message of the last commit with `message`.
///
/// Only the message changes; staged changes are left out of the commit.
pub async fn fix_message(ctx: &Context, message: &str) -> Result<()> {
    if message.trim().is_empty() {
        bail!("Commit message cannot be empty");
    }

    let git = ctx.git();
    let journal = ctx.journal(&git).await;
    let headline = message.lines().next().unwrap_or_default();

    let request = ActionRequest {
        operation: Operation::FixMessage,
        action_type: ActionType::FixMessage,
        description: format!("fix message: {headline}"),
        undoable: true,
    };
    run_guarded(ctx, &git, &journal, request, || git.amend_message(message)).await?;

    output::success(format!("Commit message is now \"{headline}\""), ctx.verbosity());
    Ok(())
}
