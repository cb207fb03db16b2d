//! gitmend - Recover from git mistakes, safely
//!
//! gitmend wraps the corrective git operations people reach for after a
//! mistake (undoing commits, fixing a message, recovering a deleted branch
//! or a dropped stash, aborting a stuck merge) behind safety checks and a
//! per-user journal with a single level of undo.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - State detection, safety evaluation and the guarded command lifecycle
//! - [`core`] - Domain types, configuration, storage paths and the action journal
//! - [`git`] - Single interface for all Git access
//! - [`ui`] - User interaction utilities
//!
//! # Correctness Invariants
//!
//! gitmend maintains the following invariants:
//!
//! 1. No mutation runs when safety evaluation reports a blocker
//! 2. No mutation runs with unapproved warnings
//! 3. Every mutation is journaled before it runs
//! 4. A journaled action is undone at most once

pub mod cli;
pub mod core;
pub mod engine;
pub mod git;
pub mod ui;
