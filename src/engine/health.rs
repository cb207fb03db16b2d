//! engine::health
//!
//! Issue model for repository state reports.
//!
//! # Architecture
//!
//! The state detector reduces repository facts into a list of [`Issue`]s.
//! Each issue carries a code from the closed [`IssueCode`] set; the string
//! form of a code is stable and is what scripts and tests match on.
//!
//! Constructors for every issue live in the [`issues`] module so that
//! messages and severities are defined in one place.
//!
//! # Example
//!
//! ```
//! use gitmend::engine::health::{issues, IssueCode, Severity};
//!
//! let issue = issues::behind_remote(3);
//! assert_eq!(issue.code, IssueCode::BehindRemote);
//! assert_eq!(issue.code.as_str(), "BEHIND_REMOTE");
//! assert_eq!(issue.severity, Severity::Warning);
//! ```

use serde::Serialize;

/// Severity of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Worth knowing; nothing is wrong.
    Info,
    /// Something the operator should look at before mutating.
    Warning,
    /// The repository is in a state that needs fixing.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Closed set of issue codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    NotGitRepo,
    DetectionFailed,
    DetachedHead,
    OngoingOperation,
    HasConflicts,
    NoCommits,
    UnpushedCommits,
    BehindRemote,
    UnstagedChanges,
    StagedChanges,
}

impl IssueCode {
    /// Stable string form of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCode::NotGitRepo => "NOT_GIT_REPO",
            IssueCode::DetectionFailed => "DETECTION_FAILED",
            IssueCode::DetachedHead => "DETACHED_HEAD",
            IssueCode::OngoingOperation => "ONGOING_OPERATION",
            IssueCode::HasConflicts => "HAS_CONFLICTS",
            IssueCode::NoCommits => "NO_COMMITS",
            IssueCode::UnpushedCommits => "UNPUSHED_COMMITS",
            IssueCode::BehindRemote => "BEHIND_REMOTE",
            IssueCode::UnstagedChanges => "UNSTAGED_CHANGES",
            IssueCode::StagedChanges => "STAGED_CHANGES",
        }
    }
}

impl std::fmt::Display for IssueCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified observation about the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub severity: Severity,
    pub code: IssueCode,
    /// Human-readable message.
    pub message: String,
    /// What the operator could do about it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Issue {
    /// Create a new issue without a suggestion.
    pub fn new(code: IssueCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            suggestion: None,
        }
    }

    /// Attach a suggestion.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Constructors for every issue the detector can raise.
pub mod issues {
    use super::*;

    pub fn not_git_repo() -> Issue {
        Issue::new(
            IssueCode::NotGitRepo,
            Severity::Error,
            "Not inside a git repository",
        )
        .with_suggestion("Run gitmend from inside a repository, or pass --cwd")
    }

    pub fn detection_failed(reason: &str) -> Issue {
        Issue::new(
            IssueCode::DetectionFailed,
            Severity::Error,
            format!("Could not read repository state: {reason}"),
        )
    }

    pub fn detached_head() -> Issue {
        Issue::new(
            IssueCode::DetachedHead,
            Severity::Warning,
            "HEAD is detached; new commits will not belong to any branch",
        )
        .with_suggestion("Create a branch here with 'git switch -c <name>'")
    }

    /// An operation is paused; the suggestion depends on whether conflicts remain.
    pub fn ongoing_operation(operation: &str, conflicts: usize) -> Issue {
        let suggestion = if conflicts > 0 {
            format!("Resolve {conflicts} conflicted file(s), or abort the {operation}")
        } else {
            format!("Continue or abort the {operation}")
        };
        Issue::new(
            IssueCode::OngoingOperation,
            Severity::Warning,
            format!("A {operation} is in progress"),
        )
        .with_suggestion(suggestion)
    }

    pub fn has_conflicts(count: usize) -> Issue {
        Issue::new(
            IssueCode::HasConflicts,
            Severity::Error,
            format!("{count} file(s) have unresolved conflicts"),
        )
        .with_suggestion("Resolve the conflicts, then stage the files")
    }

    pub fn no_commits() -> Issue {
        Issue::new(
            IssueCode::NoCommits,
            Severity::Info,
            "The repository has no commits yet",
        )
    }

    pub fn unpushed_commits(ahead: usize) -> Issue {
        Issue::new(
            IssueCode::UnpushedCommits,
            Severity::Info,
            format!("{ahead} commit(s) not pushed to the upstream"),
        )
    }

    pub fn behind_remote(behind: usize) -> Issue {
        Issue::new(
            IssueCode::BehindRemote,
            Severity::Warning,
            format!("Branch is {behind} commit(s) behind its upstream"),
        )
        .with_suggestion("Pull before rewriting history")
    }

    pub fn unstaged_changes() -> Issue {
        Issue::new(
            IssueCode::UnstagedChanges,
            Severity::Info,
            "Working tree has changes that are not staged",
        )
    }

    pub fn staged_changes() -> Issue {
        Issue::new(
            IssueCode::StagedChanges,
            Severity::Info,
            "Index has staged changes ready to commit",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_screaming_snake_case() {
        let json = serde_json::to_string(&IssueCode::UnpushedCommits).unwrap();
        assert_eq!(json, "\"UNPUSHED_COMMITS\"");
        assert_eq!(IssueCode::NotGitRepo.to_string(), "NOT_GIT_REPO");
    }

    #[test]
    fn severity_orders_by_gravity() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        assert_eq!(Severity::Error.to_string(), "error");
    }

    #[test]
    fn ongoing_operation_suggestion_depends_on_conflicts() {
        let with = issues::ongoing_operation("merge", 2);
        assert_eq!(
            with.suggestion.as_deref(),
            Some("Resolve 2 conflicted file(s), or abort the merge")
        );

        let without = issues::ongoing_operation("rebase", 0);
        assert_eq!(
            without.suggestion.as_deref(),
            Some("Continue or abort the rebase")
        );
    }

    #[test]
    fn serialized_issue_skips_missing_suggestion() {
        let value = serde_json::to_value(issues::no_commits()).unwrap();
        assert_eq!(value["code"], "NO_COMMITS");
        assert_eq!(value["severity"], "info");
        assert!(value.get("suggestion").is_none());
    }
}
