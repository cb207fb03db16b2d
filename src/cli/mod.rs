//! cli
//!
//! Command-line interface layer for gitmend.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Resolve storage paths and load user configuration
//! - Install logging
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. Read-only commands call the engine directly;
//! mutating commands go through [`crate::engine::run_guarded`] so that every
//! change is safety-checked and journaled.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use std::io::IsTerminal;

use crate::core::config::Config;
use crate::core::paths::{GitmendPaths, HOME_ENV};
use crate::engine;
use anyhow::{Context as _, Result};
use tracing_subscriber::EnvFilter;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub async fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let paths = GitmendPaths::from_env()
        .with_context(|| format!("Cannot locate a home directory; set {HOME_ENV}"))?;
    let config = Config::load(&paths);

    init_logging(cli.debug || config.verbose());

    let ctx = engine::Context {
        cwd: cli.cwd.clone(),
        debug: cli.debug,
        quiet: cli.quiet,
        interactive: cli.interactive(),
        assume_yes: cli.assume_yes,
        config,
        paths,
    };

    commands::dispatch(cli.command, &ctx).await
}

/// Install the stderr log subscriber.
///
/// `RUST_LOG` takes precedence; otherwise debug output is enabled for this
/// crate when requested and only warnings are shown when not.
fn init_logging(debug: bool) {
    let default = if debug { "gitmend=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A subscriber may already be installed when embedded in tests.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .try_init();
}
