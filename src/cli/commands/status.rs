//! status command - Report repository state and detected issues

use crate::engine::{detect_state, Context, RepoState};
use crate::ui::output;
use anyhow::{bail, Context as _, Result};

/// Show the current snapshot and its issues.
///
/// Outside a repository (or when detection broke down) the issue is
/// reported as an error.
pub async fn status(ctx: &Context, json: bool) -> Result<()> {
    let git = ctx.git();
    let state = detect_state(&git).await;

    if json {
        let rendered =
            serde_json::to_string_pretty(&state).context("Failed to serialize repository state")?;
        println!("{rendered}");
        return Ok(());
    }

    if !state.is_repository() {
        match state.issues().first() {
            Some(issue) => bail!("{}", output::format_issue(issue)),
            None => bail!("Not inside a git repository"),
        }
    }

    let verbosity = ctx.verbosity();
    let head = git.abbrev_head().await;
    output::print(summary(&state, head.as_deref()), verbosity);

    if state.issues().is_empty() {
        output::success("No issues found.", verbosity);
    } else {
        output::print("", verbosity);
        for issue in state.issues() {
            output::print(output::format_issue(issue), verbosity);
        }
    }
    Ok(())
}

fn summary(state: &RepoState, head: Option<&str>) -> String {
    let facts = state.facts();
    let mut lines = Vec::new();

    lines.push(match (&facts.current_branch, facts.is_detached_head) {
        (_, true) => format!("HEAD detached at {}", head.unwrap_or("an unknown commit")),
        (Some(branch), false) => format!("On branch {branch}"),
        (None, false) => "Not on any branch".to_string(),
    });

    if let Some(op) = &facts.ongoing_operation {
        lines.push(format!("In progress: {op}"));
    }

    match &facts.last_commit {
        Some(commit) => lines.push(format!(
            "Last commit: {} {} ({}, {})",
            commit.oid.short(7),
            commit.message,
            commit.author,
            commit.date
        )),
        None => lines.push("No commits yet".to_string()),
    }

    if let Some(upstream) = &facts.status.tracking {
        lines.push(format!(
            "Tracking {upstream}: {} ahead, {} behind",
            facts.status.ahead, facts.status.behind
        ));
    }

    lines.push(format!(
        "Staged: {}  Modified: {}  Untracked: {}  Stashes: {}",
        facts.status.staged.len(),
        facts.status.modified.len(),
        facts.status.untracked.len(),
        facts.stash_count()
    ));

    lines.join("\n")
}
