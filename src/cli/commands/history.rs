//! history command - Show recent gitmend actions in this repository

use crate::core::ops::journal::{ActionPhase, RecordedAction};
use crate::engine::Context;
use crate::ui::output;
use anyhow::Result;

/// List the `count` most recent actions, newest first.
///
/// The action `undo-last` would reverse is marked.
pub async fn history(ctx: &Context, count: usize) -> Result<()> {
    let git = ctx.git();
    git.require_repository().await?;
    let journal = ctx.journal(&git).await;
    let verbosity = ctx.verbosity();

    let actions = journal.recent_actions(count);
    if actions.is_empty() {
        output::print("No gitmend actions recorded for this repository.", verbosity);
        return Ok(());
    }

    let slot = journal.last_undoable_action().map(|a| a.id);
    for action in &actions {
        let is_slot = slot.as_deref() == Some(action.id.as_str());
        output::print(format_entry(action, is_slot), verbosity);
    }
    Ok(())
}

fn format_entry(action: &RecordedAction, is_slot: bool) -> String {
    let mut line = format!(
        "{}  {:<14} {}",
        action.timestamp, action.action_type, action.description
    );
    match action.phase {
        ActionPhase::Pending => line.push_str("  (incomplete)"),
        ActionPhase::Consumed => line.push_str("  (undone)"),
        ActionPhase::Completed => {}
    }
    if is_slot {
        line.push_str("  <- undo-last");
    }
    line
}
