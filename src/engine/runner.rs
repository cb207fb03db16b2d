//! engine::runner
//!
//! The guarded lifecycle every mutating command runs through.
//!
//! # Architecture
//!
//! ```text
//! require repo -> detect -> evaluate -> [confirm] -> record -> mutate -> complete
//! ```
//!
//! - Blockers stop the command before anything is recorded.
//! - Warnings are always shown. They need an override: `--yes`,
//!   `confirmDangerousActions = false`, or an interactive "y".
//! - The journal entry is recorded before the mutation runs. If the mutation
//!   fails the entry stays pending and is never offered for undo.
//!
//! # Example
//!
//! ```ignore
//! let action = run_guarded(&ctx, &git, &journal, request, || git.clean_untracked()).await?;
//! ```

use std::future::Future;

use thiserror::Error;

use super::detect::{detect_state, RepoState};
use super::safety::{evaluate_safety, Operation, SafetyBlocker};
use super::Context;
use crate::core::ops::journal::{ActionJournal, ActionType, RecordedAction};
use crate::git::{Git, GitError};
use crate::ui::output;
use crate::ui::prompts::{self, PromptError};

/// Errors from the guarded lifecycle.
#[derive(Debug, Error)]
pub enum RunError {
    /// The working directory is not a repository.
    #[error("{0}")]
    NotARepository(GitError),

    /// Safety evaluation found blocking conditions.
    #[error("operation blocked:\n{}", format_blockers(.0))]
    Blocked(Vec<SafetyBlocker>),

    /// Warnings need approval but no prompt can be shown.
    #[error("operation has warnings; re-run with --yes to proceed")]
    ApprovalRequired,

    /// The operator declined or interrupted the confirmation.
    #[error("cancelled")]
    Cancelled,

    /// The confirmation prompt itself failed.
    #[error("confirmation failed: {0}")]
    Prompt(PromptError),

    /// The git mutation failed.
    #[error("{0}")]
    Mutation(GitError),
}

fn format_blockers(blockers: &[SafetyBlocker]) -> String {
    output::format_list(blockers, "  - ")
}

/// What a guarded command is about to do and how to journal it.
#[derive(Debug, Clone)]
pub struct ActionRequest {
    pub operation: Operation,
    pub action_type: ActionType,
    pub description: String,
    pub undoable: bool,
}

/// Check the repository, evaluate `op`, and obtain approval for any warnings.
///
/// Returns the snapshot the evaluation was based on.
pub async fn preflight(ctx: &Context, git: &Git, op: &Operation) -> Result<RepoState, RunError> {
    git.require_repository()
        .await
        .map_err(RunError::NotARepository)?;

    let state = detect_state(git).await;
    let check = evaluate_safety(git, op, Some(&state)).await;

    if !check.is_safe() {
        tracing::debug!(?op, "operation blocked");
        return Err(RunError::Blocked(check.blockers().to_vec()));
    }

    let verbosity = ctx.verbosity();
    for warning in check.warnings() {
        output::warn(warning, verbosity);
    }
    if check.requires_override() {
        approve(ctx)?;
    }
    Ok(state)
}

fn approve(ctx: &Context) -> Result<(), RunError> {
    if ctx.assume_yes {
        tracing::debug!("warnings approved by --yes");
        return Ok(());
    }
    if !ctx.config.confirm_dangerous_actions() {
        tracing::debug!("warnings approved by configuration");
        return Ok(());
    }
    match prompts::confirm("Proceed anyway?", false, ctx.interactive) {
        Ok(true) => Ok(()),
        Ok(false) | Err(PromptError::Cancelled) => Err(RunError::Cancelled),
        Err(PromptError::NotInteractive) => Err(RunError::ApprovalRequired),
        Err(e) => Err(RunError::Prompt(e)),
    }
}

/// Run one mutation under safety evaluation and journaling.
pub async fn run_guarded<F, Fut>(
    ctx: &Context,
    git: &Git,
    journal: &ActionJournal,
    request: ActionRequest,
    mutate: F,
) -> Result<RecordedAction, RunError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<(), GitError>>,
{
    preflight(ctx, git, &request.operation).await?;

    let pending = journal
        .record_action(request.action_type, request.description, request.undoable)
        .await;

    if let Err(e) = mutate().await {
        tracing::debug!(id = pending.id(), error = %e, "mutation failed, journal entry left pending");
        return Err(RunError::Mutation(e));
    }

    let action = journal.complete_action(pending).await;
    tracing::info!(id = %action.id, action = %action.action_type, "action completed");
    Ok(action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{Config, UserConfig};
    use crate::core::paths::GitmendPaths;
    use tempfile::TempDir;

    fn context(assume_yes: bool, confirm: Option<bool>) -> Context {
        let temp = std::env::temp_dir();
        Context {
            assume_yes,
            interactive: false,
            config: Config::from_user(UserConfig {
                confirm_dangerous_actions: confirm,
                ..UserConfig::default()
            }),
            ..Context::new(GitmendPaths::new(temp))
        }
    }

    #[test]
    fn approval_sources() {
        assert!(approve(&context(true, None)).is_ok());
        assert!(approve(&context(false, Some(false))).is_ok());
        assert!(matches!(
            approve(&context(false, None)),
            Err(RunError::ApprovalRequired)
        ));
    }

    #[test]
    fn blocked_error_lists_every_blocker() {
        let err = RunError::Blocked(vec![
            SafetyBlocker::NoCommitToAmend,
            SafetyBlocker::NothingStaged,
        ]);
        let text = err.to_string();
        assert!(text.contains("There is no commit to amend"));
        assert!(text.contains("Nothing is staged"));
    }

    #[tokio::test]
    async fn preflight_outside_repository() {
        let dir = TempDir::new().unwrap();
        let git = Git::new(dir.path());
        let err = preflight(&context(true, None), &git, &Operation::Clean)
            .await
            .unwrap_err();
        assert!(matches!(err, RunError::NotARepository(GitError::NotARepo { .. })));
    }
}
