//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Validates command-specific arguments
//! 2. Describes the change as an [`Operation`](crate::engine::Operation)
//!    and hands it to the guarded runner
//! 3. Formats and displays output
//!
//! Handlers never call a mutating accessor method outside the runner.

mod abort;
mod amend;
mod clean;
mod completion;
mod config_cmd;
mod discard;
mod fix_message;
mod history;
mod recover;
mod status;
mod undo;
mod undo_last;
mod unstage;

// Re-export command functions for testing and direct invocation
pub use abort::abort;
pub use amend::amend;
pub use clean::clean;
pub use completion::completion;
pub use config_cmd::{get as config_get, list as config_list, set as config_set};
pub use discard::discard;
pub use fix_message::fix_message;
pub use history::history;
pub use recover::{branch as recover_branch, file as recover_file, stash as recover_stash};
pub use status::status;
pub use undo::undo;
pub use undo_last::undo_last;
pub use unstage::unstage;

use crate::cli::args::{Command, ConfigAction, RecoverTarget};
use crate::engine::Context;
use anyhow::Result;

/// Dispatch a command to its handler.
pub async fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        // Read-only
        Command::Status { json } => status::status(ctx, json).await,
        Command::History { count } => history::history(ctx, count).await,

        // History rewriting
        Command::Undo { count, mode } => undo::undo(ctx, count, mode.mode()).await,
        Command::FixMessage { message } => fix_message::fix_message(ctx, &message).await,
        Command::Amend => amend::amend(ctx).await,

        // Recovery
        Command::Recover { target } => match target {
            RecoverTarget::Branch { name, new_name } => {
                recover::branch(ctx, name.as_deref(), new_name.as_deref()).await
            }
            RecoverTarget::File { path, from } => {
                recover::file(ctx, &path, from.as_deref()).await
            }
            RecoverTarget::Stash { oid } => recover::stash(ctx, oid.as_deref()).await,
        },

        // Working tree
        Command::Abort => abort::abort(ctx).await,
        Command::Clean => clean::clean(ctx).await,
        Command::Discard { paths } => discard::discard(ctx, paths).await,
        Command::Unstage { paths } => unstage::unstage(ctx, paths).await,

        // Journal
        Command::UndoLast => undo_last::undo_last(ctx).await,

        // Setup
        Command::Config { action } => match action {
            ConfigAction::Get { key } => config_cmd::get(ctx, &key),
            ConfigAction::Set { key, value } => config_cmd::set(ctx, &key, &value),
            ConfigAction::List => config_cmd::list(ctx),
        },
        Command::Completion { shell } => completion::completion(shell),
    }
}
