//! discard command - Throw away unstaged modifications

use crate::core::ops::journal::ActionType;
use crate::engine::{run_guarded, ActionRequest, Context, Operation};
use crate::ui::output;
use anyhow::Result;

/// Revert unstaged modifications in `paths`, or across the whole working
/// tree when empty.
///
/// Staged changes are left alone.
pub async fn discard(ctx: &Context, paths: Vec<String>) -> Result<()> {
    let git = ctx.git();
    git.require_repository().await?;
    let paths = git.repo_paths(&paths).await?;
    let journal = ctx.journal(&git).await;

    let scope = if paths.is_empty() {
        "all files".to_string()
    } else {
        paths.join(", ")
    };
    let request = ActionRequest {
        operation: Operation::DiscardChanges {
            paths: paths.clone(),
        },
        action_type: ActionType::Discard,
        description: format!("discard changes in {scope}"),
        undoable: false,
    };
    run_guarded(ctx, &git, &journal, request, || git.discard_changes(&paths)).await?;

    output::success(format!("Discarded unstaged changes in {scope}."), ctx.verbosity());
    Ok(())
}
