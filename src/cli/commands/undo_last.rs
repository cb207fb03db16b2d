//! undo-last command - Reverse the last undoable gitmend action
//!
//! Only one level of undo exists. The reversed entry is consumed and is
//! never offered again; the reversal itself is not journaled.

use crate::engine::{preflight, Context, Operation};
use crate::ui::output;
use anyhow::{bail, Result};

/// Reset the repository to the state before the last undoable action.
pub async fn undo_last(ctx: &Context) -> Result<()> {
    let git = ctx.git();
    git.require_repository().await?;
    let journal = ctx.journal(&git).await;
    let verbosity = ctx.verbosity();

    let Some(action) = journal.last_undoable_action() else {
        bail!("Nothing to undo");
    };
    output::print(
        format!("Undoing: {} ({})", action.description, action.timestamp),
        verbosity,
    );

    preflight(ctx, &git, &Operation::JournalUndo).await?;

    let outcome = journal.undo_last_action().await;
    if !outcome.success {
        bail!("{}", outcome.message);
    }
    output::success(outcome.message, verbosity);
    Ok(())
}
