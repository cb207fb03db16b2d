//! amend command - Fold staged changes into the last commit

use crate::core::ops::journal::ActionType;
use crate::engine::{run_guarded, ActionRequest, Context, Operation};
use crate::ui::output;
use anyhow::Result;

/// Add the staged changes to the last commit, keeping its message.
pub async fn amend(ctx: &Context) -> Result<()> {
    let git = ctx.git();
    git.require_repository().await?;

    let journal = ctx.journal(&git).await;
    let request = ActionRequest {
        operation: Operation::Amend,
        action_type: ActionType::Amend,
        description: "amend last commit with staged changes".to_string(),
        undoable: true,
    };
    run_guarded(ctx, &git, &journal, request, || git.amend_staged()).await?;

    output::success("Staged changes added to the last commit.", ctx.verbosity());
    Ok(())
}
