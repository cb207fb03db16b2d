//! clean command - Delete untracked files and directories

use crate::core::ops::journal::ActionType;
use crate::engine::{run_guarded, ActionRequest, Context, Operation};
use crate::ui::output;
use anyhow::Result;

/// Remove every untracked file. Ignored files are kept.
pub async fn clean(ctx: &Context) -> Result<()> {
    let git = ctx.git();
    let journal = ctx.journal(&git).await;

    let request = ActionRequest {
        operation: Operation::Clean,
        action_type: ActionType::Clean,
        description: "delete untracked files".to_string(),
        undoable: false,
    };
    run_guarded(ctx, &git, &journal, request, || git.clean_untracked()).await?;

    output::success("Untracked files removed.", ctx.verbosity());
    Ok(())
}
