//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`prompts`] - Interactive confirmations
//! - [`output`] - Output formatting and display
//!
//! # Design
//!
//! All operator-facing text goes through this module so that `--quiet` and
//! non-interactive mode are honored in one place. Diagnostics for developers
//! go through `tracing` instead.

pub mod output;
pub mod prompts;
