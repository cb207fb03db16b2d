//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging
//! - `--yes` / `-y`: Accept warnings without prompting
//! - `--no-interactive`: Never prompt
//! - `--quiet` / `-q`: Minimal output

use clap::{Args, Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;

use crate::git::ResetMode;

/// gitmend - Recover from git mistakes, safely
#[derive(Parser, Debug)]
#[command(name = "gitmend")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if gitmend was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output; implies --no-interactive
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Accept safety warnings without prompting
    #[arg(short = 'y', long = "yes", global = true)]
    pub assume_yes: bool,

    /// Disable interactive prompts
    #[arg(long, global = true)]
    pub no_interactive: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// Determine if interactive mode is enabled.
    ///
    /// Interactive unless `--no-interactive` or `--quiet` was set, and only
    /// when stdin is a terminal.
    pub fn interactive(&self) -> bool {
        !(self.no_interactive || self.quiet) && std::io::stdin().is_terminal()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Report repository state and detected issues
    #[command(
        name = "status",
        long_about = "Report the repository's state and any issues worth knowing about.\n\n\
            Shows the current branch, the last commit, pending changes, and a list \
            of detected issues such as a detached HEAD, an interrupted merge or \
            rebase, unresolved conflicts, or divergence from the upstream.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Something feels off - start here
    gitmend status

    # Machine-readable output for scripts
    gitmend status --json"
    )]
    Status {
        /// Emit the snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove recent commits from the current branch
    #[command(
        name = "undo",
        long_about = "Remove the last N commits from the current branch.\n\n\
            With --soft the commits' changes stay staged. With --mixed (the default) \
            they stay in the working tree, unstaged. With --hard they are discarded. \
            Commits that already exist on a remote are flagged before anything happens.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Committed too early - keep the changes in the working tree
    gitmend undo

    # Squash the last three commits by hand
    gitmend undo -n 3 --soft

    # Throw the last commit away entirely
    gitmend undo --hard

    # Changed your mind? Put the commits back
    gitmend undo-last"
    )]
    Undo {
        /// Number of commits to remove
        #[arg(short = 'n', long = "count", default_value_t = 1)]
        count: usize,

        #[command(flatten)]
        mode: ResetModeArgs,
    },

    /// Rewrite the last commit's message
    #[command(name = "fix-message")]
    FixMessage {
        /// The new commit message
        message: String,
    },

    /// Fold staged changes into the last commit
    #[command(
        name = "amend",
        long_about = "Add the currently staged changes to the last commit, keeping its message.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Forgot a file
    git add forgotten.rs
    gitmend amend"
    )]
    Amend,

    /// Bring back lost branches, files, or stashes
    #[command(name = "recover")]
    Recover {
        #[command(subcommand)]
        target: RecoverTarget,
    },

    /// Abandon an in-progress merge, rebase, cherry-pick, or bisect
    #[command(name = "abort")]
    Abort,

    /// Delete untracked files and directories
    #[command(name = "clean")]
    Clean,

    /// Throw away unstaged modifications
    #[command(
        name = "discard",
        after_help = "\
WORKFLOW EXAMPLES:
    # Discard everything that is not staged
    gitmend discard

    # Discard changes to one file or directory
    gitmend discard src/lib.rs docs/"
    )]
    Discard {
        /// Limit to these paths (default: everything)
        paths: Vec<String>,
    },

    /// Move staged changes back to the working tree
    #[command(name = "unstage")]
    Unstage {
        /// Limit to these paths (default: everything)
        paths: Vec<String>,
    },

    /// Show recent gitmend actions in this repository
    #[command(name = "history")]
    History {
        /// Number of actions to show
        #[arg(short = 'n', long = "count", default_value_t = 10)]
        count: usize,
    },

    /// Reverse the last undoable gitmend action
    #[command(
        name = "undo-last",
        long_about = "Reverse the most recent undoable gitmend action in this repository.\n\n\
            Only a single level of undo is kept. Once reversed, an action cannot be \
            undone again.",
        after_help = "\
WORKFLOW EXAMPLES:
    gitmend undo --hard      # oops
    gitmend undo-last        # commits are back"
    )]
    UndoLast,

    /// Get, set, or list configuration values
    #[command(
        name = "config",
        after_help = "\
WORKFLOW EXAMPLES:
    # See all settings
    gitmend config list

    # Never prompt before risky actions
    gitmend config set confirmDangerousActions false

    # Keep a longer history
    gitmend config set maxActionHistory 200"
    )]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
WORKFLOW EXAMPLES:
    # Bash (add to ~/.bashrc)
    gitmend completion bash >> ~/.bashrc

    # Zsh (add to ~/.zshrc)
    gitmend completion zsh >> ~/.zshrc

    # Fish
    gitmend completion fish > ~/.config/fish/completions/gitmend.fish"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Reset mode flags shared by `undo`.
#[derive(Args, Debug, Clone, Copy, Default)]
#[group(multiple = false)]
pub struct ResetModeArgs {
    /// Keep the changes staged
    #[arg(long)]
    pub soft: bool,

    /// Keep the changes in the working tree (default)
    #[arg(long)]
    pub mixed: bool,

    /// Discard the changes
    #[arg(long)]
    pub hard: bool,
}

impl ResetModeArgs {
    pub fn mode(&self) -> ResetMode {
        if self.soft {
            ResetMode::Soft
        } else if self.hard {
            ResetMode::Hard
        } else {
            ResetMode::Mixed
        }
    }
}

/// What `recover` brings back.
#[derive(Subcommand, Debug, Clone)]
pub enum RecoverTarget {
    /// Recreate a deleted branch from the reflog
    #[command(after_help = "\
WORKFLOW EXAMPLES:
    # List recently deleted branches and restore the newest
    gitmend recover branch

    # Restore a specific branch under another name
    gitmend recover branch feature-x --as feature-x-old")]
    Branch {
        /// Deleted branch to recover (default: the most recent)
        name: Option<String>,

        /// Name for the recreated branch
        #[arg(long = "as", value_name = "NAME")]
        new_name: Option<String>,
    },

    /// Restore a file from history
    File {
        /// Path of the file, relative to the repository root
        path: String,

        /// Revision to restore from (default: last commit containing the file)
        #[arg(long = "from", value_name = "REV")]
        from: Option<String>,
    },

    /// Re-apply a dropped stash
    Stash {
        /// Commit id of the dropped stash (default: the most recent)
        oid: Option<String>,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },
    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Value to set
        value: String,
    },
    /// List all configuration values
    List,
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
