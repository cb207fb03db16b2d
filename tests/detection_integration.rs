//! Integration tests for state detection against real repositories.

mod common;

use common::TestRepo;
use gitmend::engine::{detect_state, IssueCode, Severity};
use gitmend::git::{Git, OngoingOperation};
use tempfile::TempDir;

fn codes(state: &gitmend::engine::RepoState) -> Vec<IssueCode> {
    state.issues().iter().map(|i| i.code).collect()
}

#[tokio::test]
async fn not_a_repository() {
    let dir = TempDir::new().unwrap();
    let state = detect_state(&Git::new(dir.path())).await;

    assert!(!state.is_repository());
    assert_eq!(codes(&state), vec![IssueCode::NotGitRepo]);
    assert_eq!(state.issues()[0].severity, Severity::Error);
}

#[tokio::test]
async fn clean_repository() {
    let repo = TestRepo::new();
    let state = detect_state(&repo.git()).await;

    assert!(state.is_repository());
    assert!(state.issues().is_empty());
    let facts = state.facts();
    assert_eq!(facts.current_branch.as_deref(), Some("main"));
    assert_eq!(facts.last_commit.as_ref().unwrap().message, "Initial commit");
    assert!(facts.status.is_clean());
    assert_eq!(facts.stash_count(), 0);
}

#[tokio::test]
async fn fresh_repository_has_no_commits() {
    let repo = TestRepo::empty();
    let state = detect_state(&repo.git()).await;

    assert_eq!(codes(&state), vec![IssueCode::NoCommits]);
    assert_eq!(state.facts().current_branch.as_deref(), Some("main"));
}

#[tokio::test]
async fn merge_with_conflicts_reports_one_ongoing_operation() {
    let repo = TestRepo::new();
    repo.conflicting_merge(&["a.txt", "b.txt"]);
    let state = detect_state(&repo.git()).await;

    assert_eq!(
        state.facts().ongoing_operation,
        Some(OngoingOperation::Merge)
    );
    assert!(!state.has_issue(IssueCode::HasConflicts));

    let ongoing: Vec<_> = state
        .issues()
        .iter()
        .filter(|i| i.code == IssueCode::OngoingOperation)
        .collect();
    assert_eq!(ongoing.len(), 1);
    assert_eq!(ongoing[0].severity, Severity::Warning);
    assert!(ongoing[0]
        .suggestion
        .as_deref()
        .unwrap()
        .starts_with("Resolve 2 conflicted file(s)"));
}

#[tokio::test]
async fn detached_head_warns() {
    let repo = TestRepo::new();
    repo.commit_file("a.txt", "a\n", "Add a");
    repo.git_cmd(&["checkout", "-q", "--detach"]);
    let state = detect_state(&repo.git()).await;

    assert_eq!(codes(&state), vec![IssueCode::DetachedHead]);
}

#[tokio::test]
async fn unstaged_then_staged() {
    let repo = TestRepo::new();
    repo.write("README.md", "edited\n");
    let state = detect_state(&repo.git()).await;
    assert_eq!(codes(&state), vec![IssueCode::UnstagedChanges]);

    repo.git_cmd(&["add", "README.md"]);
    let state = detect_state(&repo.git()).await;
    assert_eq!(codes(&state), vec![IssueCode::StagedChanges]);
}

#[tokio::test]
async fn untracked_files_are_not_uncommitted() {
    let repo = TestRepo::new();
    repo.write("scratch.txt", "notes\n");
    let state = detect_state(&repo.git()).await;

    assert!(state.issues().is_empty());
    assert_eq!(state.facts().status.untracked, vec!["scratch.txt"]);
}

#[tokio::test]
async fn unpushed_and_behind() {
    let repo = TestRepo::new();
    let _remote = repo.with_remote();
    repo.commit_file("a.txt", "a\n", "Local");
    let state = detect_state(&repo.git()).await;
    assert_eq!(codes(&state), vec![IssueCode::UnpushedCommits]);
    assert!(state.facts().has_remote);

    repo.git_cmd(&["push", "-q"]);
    repo.git_cmd(&["reset", "-q", "--hard", "HEAD~1"]);
    let state = detect_state(&repo.git()).await;
    assert_eq!(codes(&state), vec![IssueCode::BehindRemote]);
}

#[tokio::test]
async fn stashes_are_counted() {
    let repo = TestRepo::new();
    repo.write("README.md", "one\n");
    repo.git_cmd(&["stash", "push", "-q"]);
    repo.write("README.md", "two\n");
    repo.git_cmd(&["stash", "push", "-q"]);
    let state = detect_state(&repo.git()).await;

    assert_eq!(state.facts().stash_count(), 2);
    assert!(state.issues().is_empty());
}
