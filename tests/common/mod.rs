//! Shared fixtures for integration tests.
//!
//! Repositories are built with the `git` executable inside temporary
//! directories so that tests observe exactly what a user's git would.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

use gitmend::core::paths::GitmendPaths;
use gitmend::git::Git;

/// Test fixture that creates a real git repository.
pub struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    /// Create a new repository on `main` with an initial commit.
    pub fn new() -> Self {
        let repo = Self::empty();
        repo.commit_file("README.md", "# Test Repo\n", "Initial commit");
        repo
    }

    /// Create a new repository on `main` with no commits.
    pub fn empty() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");

        run_git(dir.path(), &["init", "-q", "-b", "main"]);
        run_git(dir.path(), &["config", "user.email", "test@example.com"]);
        run_git(dir.path(), &["config", "user.name", "Test User"]);
        run_git(dir.path(), &["config", "commit.gpgsign", "false"]);
        // Prevent git from opening editors during tests
        run_git(dir.path(), &["config", "core.editor", "true"]);

        Self { dir }
    }

    /// Get the path to the repository.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Accessor bound to this repository.
    pub fn git(&self) -> Git {
        Git::new(self.path())
    }

    /// Write a file without staging it.
    pub fn write(&self, path: &str, content: &str) {
        let full = self.path().join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(full, content).unwrap();
    }

    pub fn read(&self, path: &str) -> String {
        std::fs::read_to_string(self.path().join(path)).unwrap()
    }

    pub fn exists(&self, path: &str) -> bool {
        self.path().join(path).exists()
    }

    /// Create a file and commit it, returning the new HEAD.
    pub fn commit_file(&self, path: &str, content: &str, message: &str) -> String {
        self.write(path, content);
        self.git_cmd(&["add", path]);
        self.git_cmd(&["commit", "-q", "-m", message]);
        self.head()
    }

    /// Run a git command in the repository and return trimmed stdout.
    pub fn git_cmd(&self, args: &[&str]) -> String {
        run_git(self.path(), args)
    }

    /// Run a git command that is expected to fail (e.g. a conflicting merge).
    pub fn git_cmd_allow_failure(&self, args: &[&str]) {
        let _ = Command::new("git")
            .args(args)
            .current_dir(self.path())
            .output()
            .expect("failed to execute git");
    }

    /// HEAD as reported by git itself.
    pub fn head(&self) -> String {
        self.git_cmd(&["rev-parse", "HEAD"])
    }

    /// Subject of the HEAD commit.
    pub fn head_subject(&self) -> String {
        self.git_cmd(&["log", "-1", "--format=%s"])
    }

    /// Leave the repository in a merge with conflicts in `files`.
    pub fn conflicting_merge(&self, files: &[&str]) {
        for f in files {
            self.commit_file(f, "base\n", &format!("add {f}"));
        }
        self.git_cmd(&["checkout", "-q", "-b", "other"]);
        for f in files {
            self.commit_file(f, "other side\n", &format!("other {f}"));
        }
        self.git_cmd(&["checkout", "-q", "main"]);
        for f in files {
            self.commit_file(f, "main side\n", &format!("main {f}"));
        }
        self.git_cmd_allow_failure(&["merge", "other"]);
    }

    /// Attach a bare remote `origin`, push `main` and set it as upstream.
    pub fn with_remote(&self) -> TempDir {
        let remote = TempDir::new().expect("failed to create remote dir");
        run_git(remote.path(), &["init", "-q", "--bare"]);
        let url = remote.path().to_string_lossy().to_string();
        self.git_cmd(&["remote", "add", "origin", &url]);
        self.git_cmd(&["push", "-q", "-u", "origin", "main"]);
        remote
    }
}

/// Per-test gitmend home.
pub struct TestHome {
    dir: TempDir,
}

impl TestHome {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    pub fn paths(&self) -> GitmendPaths {
        GitmendPaths::new(self.path())
    }
}

/// Run a git command in the given directory, panicking on failure.
pub fn run_git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to execute git");

    if !output.status.success() {
        panic!(
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}
