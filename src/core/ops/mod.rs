//! core::ops
//!
//! Action journaling and locking.
//!
//! # Modules
//!
//! - [`journal`] - Per-user action journal with single-slot undo
//! - [`lock`] - Advisory lock around journal transactions
//!
//! # Architecture
//!
//! Every mutating command:
//! 1. Records a pending action (before snapshot) before touching the repository
//! 2. Runs the mutation
//! 3. On success: completes the action (after snapshot, undo directive)
//! 4. On failure: leaves the action pending, invisible to undo

pub mod journal;
pub mod lock;

pub use journal::{
    ActionJournal, ActionPhase, ActionType, HeadSnapshot, JournalError, PendingAction,
    RecordedAction, UndoDirective, UndoOutcome,
};
pub use lock::{JournalLock, LockError};
