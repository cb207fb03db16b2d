//! git
//!
//! Single interface for all repository access.
//!
//! # Architecture
//!
//! This module is the **only doorway** to git. No other module imports
//! `git2` or spawns the `git` executable.
//!
//! - [`interface`] - The [`Git`] accessor: best-effort reads, verbatim-failing mutations
//! - [`recovery`] - Reflog and unreachable-object queries for lost work
//!
//! # Invariants
//!
//! - Reads never fail; they degrade to empty or default values
//! - [`Git::require_repository`] is the only hard precondition
//! - Mutation failures carry git's own stderr
//! - The accessor holds no state beyond its bound path

mod interface;
mod recovery;

pub use interface::{
    CommitRef, Git, GitError, OngoingOperation, RepoStatus, ResetMode, StashEntry,
};
pub use recovery::{DeletedBranch, DroppedStash, DEFAULT_SCAN_LIMIT, STASH_SCAN_LIMIT};
