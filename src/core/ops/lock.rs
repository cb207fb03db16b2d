//! core::ops::lock
//!
//! Advisory lock serializing journal read-modify-write cycles.
//!
//! # Storage
//!
//! - `<gitmend home>/history.lock` - Lock file with an OS-level exclusive lock
//!
//! # Invariants
//!
//! - The lock guards the whole load, mutate, save sequence on the journal
//! - Lock is released on drop (RAII)
//! - The lock is per user, not per repository: the journal file is shared
//!
//! # Example
//!
//! ```no_run
//! use gitmend::core::ops::lock::JournalLock;
//! use gitmend::core::paths::GitmendPaths;
//! use std::path::PathBuf;
//!
//! let paths = GitmendPaths::new(PathBuf::from("/tmp/gitmend-home"));
//! let lock = JournalLock::acquire(&paths.journal_lock_path())?;
//! // ... read and rewrite history.json ...
//! drop(lock);
//! # Ok::<(), gitmend::core::ops::lock::LockError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::path::Path;

use fs2::FileExt;
use thiserror::Error;

/// Errors from locking operations.
#[derive(Debug, Error)]
pub enum LockError {
    /// Failed to create the lock file or its directory.
    #[error("failed to create lock: {0}")]
    CreateFailed(String),

    /// Failed to acquire the OS lock.
    #[error("failed to acquire lock: {0}")]
    AcquireFailed(String),
}

/// An exclusive lock on the journal file.
#[derive(Debug)]
pub struct JournalLock {
    file: File,
}

impl JournalLock {
    /// Acquire the lock, waiting for other holders to finish.
    ///
    /// Journal transactions are short, so waiting is preferable to failing.
    pub fn acquire(path: &Path) -> Result<Self, LockError> {
        let file = open_lock_file(path)?;
        file.lock_exclusive()
            .map_err(|e| LockError::AcquireFailed(e.to_string()))?;
        Ok(Self { file })
    }
}

impl Drop for JournalLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

fn open_lock_file(path: &Path) -> Result<File, LockError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            LockError::CreateFailed(format!("cannot create {}: {}", parent.display(), e))
        })?;
    }
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(|e| LockError::CreateFailed(format!("cannot open {}: {}", path.display(), e)))
}
