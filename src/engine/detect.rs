//! engine::detect
//!
//! Repository state detection.
//!
//! # Architecture
//!
//! [`detect_state`] takes one point-in-time snapshot of the repository:
//!
//! 1. Gate on "is this a repository". If not, stop with `NOT_GIT_REPO`.
//! 2. Issue the independent read queries concurrently.
//! 3. Reduce the facts into issues with a fixed rule table.
//!
//! # Invariants
//!
//! - Detection is read-only
//! - The issue list is a pure function of [`RepoFacts`]; [`RepoState`]
//!   exposes no way to edit it
//! - Detection never fails: a broken batch yields `DETECTION_FAILED`
//!   instead of a partially filled snapshot

use serde::Serialize;

use crate::engine::health::{issues, Issue, IssueCode};
use crate::git::{CommitRef, Git, OngoingOperation, RepoStatus, StashEntry};

/// Raw facts gathered about the repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepoFacts {
    pub is_repository: bool,
    pub current_branch: Option<String>,
    pub has_uncommitted_changes: bool,
    pub has_staged_changes: bool,
    pub has_remote: bool,
    pub last_commit: Option<CommitRef>,
    pub status: RepoStatus,
    pub is_detached_head: bool,
    pub ongoing_operation: Option<OngoingOperation>,
    pub conflicted_files: Vec<String>,
    pub stashes: Vec<StashEntry>,
    /// Set when the query batch itself broke down.
    pub detection_error: Option<String>,
}

impl RepoFacts {
    pub fn stash_count(&self) -> usize {
        self.stashes.len()
    }
}

/// Immutable snapshot: facts plus the issues derived from them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoState {
    facts: RepoFacts,
    issues: Vec<Issue>,
}

impl RepoState {
    /// Build a state, deriving its issues.
    pub fn from_facts(facts: RepoFacts) -> Self {
        let issues = derive_issues(&facts);
        Self { facts, issues }
    }

    pub fn facts(&self) -> &RepoFacts {
        &self.facts
    }

    /// Issues in rule-table order.
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn is_repository(&self) -> bool {
        self.facts.is_repository
    }

    /// Whether an issue with `code` was raised.
    pub fn has_issue(&self, code: IssueCode) -> bool {
        self.issues.iter().any(|i| i.code == code)
    }
}

/// Take a snapshot of the repository `git` is bound to.
pub async fn detect_state(git: &Git) -> RepoState {
    if !git.is_repository().await {
        tracing::debug!(path = %git.workdir().display(), "not a repository");
        return RepoState::from_facts(RepoFacts::default());
    }

    match gather(git).await {
        Ok(facts) => RepoState::from_facts(facts),
        Err(e) => {
            tracing::warn!(error = %e, "state detection failed");
            RepoState::from_facts(RepoFacts {
                detection_error: Some(e.to_string()),
                ..RepoFacts::default()
            })
        }
    }
}

macro_rules! spawn_query {
    ($git:expr, $method:ident) => {{
        let git = $git.clone();
        tokio::spawn(async move { git.$method().await })
    }};
}

async fn gather(git: &Git) -> Result<RepoFacts, tokio::task::JoinError> {
    let (
        current_branch,
        has_uncommitted_changes,
        has_staged_changes,
        has_remote,
        last_commit,
        status,
        is_detached_head,
        ongoing_operation,
        conflicted_files,
        stashes,
    ) = tokio::try_join!(
        spawn_query!(git, current_branch),
        spawn_query!(git, has_uncommitted_changes),
        spawn_query!(git, has_staged_changes),
        spawn_query!(git, has_remote),
        spawn_query!(git, last_commit),
        spawn_query!(git, status),
        spawn_query!(git, is_detached_head),
        spawn_query!(git, ongoing_operation),
        spawn_query!(git, conflicted_files),
        spawn_query!(git, stash_list),
    )?;

    Ok(RepoFacts {
        is_repository: true,
        current_branch,
        has_uncommitted_changes,
        has_staged_changes,
        has_remote,
        last_commit,
        status,
        is_detached_head,
        ongoing_operation,
        conflicted_files,
        stashes,
        detection_error: None,
    })
}

/// Apply the rule table to `facts`.
///
/// Every matching rule contributes one issue, in table order.
pub fn derive_issues(facts: &RepoFacts) -> Vec<Issue> {
    if !facts.is_repository {
        return match &facts.detection_error {
            Some(reason) => vec![issues::detection_failed(reason)],
            None => vec![issues::not_git_repo()],
        };
    }

    let mut found = Vec::new();
    if facts.is_detached_head {
        found.push(issues::detached_head());
    }
    match &facts.ongoing_operation {
        Some(op) => found.push(issues::ongoing_operation(
            op.description(),
            facts.conflicted_files.len(),
        )),
        None if !facts.conflicted_files.is_empty() => {
            found.push(issues::has_conflicts(facts.conflicted_files.len()))
        }
        None => {}
    }
    if facts.last_commit.is_none() {
        found.push(issues::no_commits());
    }
    if facts.status.ahead > 0 {
        found.push(issues::unpushed_commits(facts.status.ahead));
    }
    if facts.status.behind > 0 {
        found.push(issues::behind_remote(facts.status.behind));
    }
    if facts.has_uncommitted_changes && !facts.has_staged_changes {
        found.push(issues::unstaged_changes());
    }
    if facts.has_staged_changes {
        found.push(issues::staged_changes());
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Oid, UtcTimestamp};
    use crate::engine::health::Severity;

    fn commit() -> CommitRef {
        CommitRef {
            oid: Oid::new("a".repeat(40)).unwrap(),
            message: "init".into(),
            author: "Test".into(),
            date: UtcTimestamp::from_epoch_seconds(0),
        }
    }

    fn clean_repo() -> RepoFacts {
        RepoFacts {
            is_repository: true,
            current_branch: Some("main".into()),
            last_commit: Some(commit()),
            ..RepoFacts::default()
        }
    }

    fn codes(facts: &RepoFacts) -> Vec<IssueCode> {
        derive_issues(facts).into_iter().map(|i| i.code).collect()
    }

    mod rules {
        use super::*;

        #[test]
        fn clean_repository_has_no_issues() {
            assert!(codes(&clean_repo()).is_empty());
        }

        #[test]
        fn not_a_repository_is_a_single_error() {
            let issues = derive_issues(&RepoFacts::default());
            assert_eq!(issues.len(), 1);
            assert_eq!(issues[0].code, IssueCode::NotGitRepo);
            assert_eq!(issues[0].severity, Severity::Error);
        }

        #[test]
        fn detection_failure_replaces_not_a_repo() {
            let facts = RepoFacts {
                detection_error: Some("task panicked".into()),
                ..RepoFacts::default()
            };
            assert_eq!(codes(&facts), vec![IssueCode::DetectionFailed]);
        }

        #[test]
        fn ongoing_merge_with_conflicts_suppresses_has_conflicts() {
            let facts = RepoFacts {
                ongoing_operation: Some(OngoingOperation::Merge),
                conflicted_files: vec!["a.txt".into(), "b.txt".into()],
                has_uncommitted_changes: true,
                ..clean_repo()
            };
            let issues = derive_issues(&facts);
            let ongoing: Vec<_> = issues
                .iter()
                .filter(|i| i.code == IssueCode::OngoingOperation)
                .collect();
            assert_eq!(ongoing.len(), 1);
            assert_eq!(ongoing[0].severity, Severity::Warning);
            assert!(ongoing[0]
                .suggestion
                .as_deref()
                .unwrap()
                .contains("Resolve 2"));
            assert!(!issues.iter().any(|i| i.code == IssueCode::HasConflicts));
        }

        #[test]
        fn conflicts_without_operation_are_an_error() {
            let facts = RepoFacts {
                conflicted_files: vec!["a.txt".into()],
                ..clean_repo()
            };
            let issues = derive_issues(&facts);
            assert_eq!(issues[0].code, IssueCode::HasConflicts);
            assert_eq!(issues[0].severity, Severity::Error);
        }

        #[test]
        fn unstaged_only_when_nothing_staged() {
            let facts = RepoFacts {
                has_uncommitted_changes: true,
                ..clean_repo()
            };
            assert_eq!(codes(&facts), vec![IssueCode::UnstagedChanges]);

            let facts = RepoFacts {
                has_uncommitted_changes: true,
                has_staged_changes: true,
                ..clean_repo()
            };
            assert_eq!(codes(&facts), vec![IssueCode::StagedChanges]);
        }

        #[test]
        fn many_rules_fire_in_table_order() {
            let facts = RepoFacts {
                is_detached_head: true,
                ongoing_operation: Some(OngoingOperation::CherryPick),
                last_commit: None,
                status: RepoStatus {
                    ahead: 2,
                    behind: 1,
                    ..RepoStatus::default()
                },
                has_staged_changes: true,
                has_uncommitted_changes: true,
                ..clean_repo()
            };
            assert_eq!(
                codes(&facts),
                vec![
                    IssueCode::DetachedHead,
                    IssueCode::OngoingOperation,
                    IssueCode::NoCommits,
                    IssueCode::UnpushedCommits,
                    IssueCode::BehindRemote,
                    IssueCode::StagedChanges,
                ]
            );
        }

        #[test]
        fn state_exposes_derived_issues() {
            let state = RepoState::from_facts(RepoFacts {
                is_detached_head: true,
                ..clean_repo()
            });
            assert!(state.is_repository());
            assert!(state.has_issue(IssueCode::DetachedHead));
            assert_eq!(state.issues().len(), 1);
        }
    }

    mod ordering {
        use super::*;
        use proptest::prelude::*;

        const TABLE: [IssueCode; 8] = [
            IssueCode::DetachedHead,
            IssueCode::OngoingOperation,
            IssueCode::HasConflicts,
            IssueCode::NoCommits,
            IssueCode::UnpushedCommits,
            IssueCode::BehindRemote,
            IssueCode::UnstagedChanges,
            IssueCode::StagedChanges,
        ];

        proptest! {
            #[test]
            fn issues_follow_table_order(
                detached in any::<bool>(),
                op in any::<bool>(),
                conflicts in 0usize..3,
                commits in any::<bool>(),
                ahead in 0usize..3,
                behind in 0usize..3,
                uncommitted in any::<bool>(),
                staged in any::<bool>(),
            ) {
                let facts = RepoFacts {
                    is_repository: true,
                    is_detached_head: detached,
                    ongoing_operation: op.then_some(OngoingOperation::Merge),
                    conflicted_files: (0..conflicts).map(|i| format!("f{i}")).collect(),
                    last_commit: commits.then(commit),
                    status: RepoStatus { ahead, behind, ..RepoStatus::default() },
                    has_uncommitted_changes: uncommitted,
                    has_staged_changes: staged,
                    ..RepoFacts::default()
                };
                let found = codes(&facts);
                let positions: Vec<usize> = found
                    .iter()
                    .map(|c| TABLE.iter().position(|t| t == c).unwrap())
                    .collect();
                prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
                prop_assert!(!(op && found.contains(&IssueCode::HasConflicts)));
                prop_assert_eq!(found.contains(&IssueCode::NoCommits), !commits);
            }
        }
    }
}
