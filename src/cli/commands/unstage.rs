//! unstage command - Move staged changes back to the working tree

use crate::core::ops::journal::ActionType;
use crate::engine::{run_guarded, ActionRequest, Context, Operation};
use crate::ui::output;
use anyhow::Result;

/// Unstage `paths`, or everything when empty. Working tree files are untouched.
pub async fn unstage(ctx: &Context, paths: Vec<String>) -> Result<()> {
    let git = ctx.git();
    git.require_repository().await?;
    let paths = git.repo_paths(&paths).await?;
    let journal = ctx.journal(&git).await;

    let scope = if paths.is_empty() {
        "everything".to_string()
    } else {
        paths.join(", ")
    };
    let request = ActionRequest {
        operation: Operation::Unstage {
            paths: paths.clone(),
        },
        action_type: ActionType::Unstage,
        description: format!("unstage {scope}"),
        undoable: false,
    };
    run_guarded(ctx, &git, &journal, request, || git.unstage(&paths)).await?;

    output::success(format!("Unstaged {scope}."), ctx.verbosity());
    Ok(())
}
