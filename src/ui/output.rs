//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Results go to stdout; warnings and errors go to stderr. Everything except
//! errors respects the quiet flag.

use std::fmt::Display;

use crate::engine::health::{Issue, Severity};

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}

/// Print a success message (respects quiet mode).
pub fn success(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Format a list of items.
pub fn format_list<T: Display>(items: &[T], prefix: &str) -> String {
    items
        .iter()
        .map(|item| format!("{}{}", prefix, item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One-line rendering of an issue, with its suggestion indented below.
pub fn format_issue(issue: &Issue) -> String {
    let marker = match issue.severity {
        Severity::Error => "✗",
        Severity::Warning => "!",
        Severity::Info => "·",
    };
    let mut line = format!("{marker} [{}] {}", issue.code, issue.message);
    if let Some(suggestion) = &issue.suggestion {
        line.push_str(&format!("\n    → {suggestion}"));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::health::issues;

    #[test]
    fn verbosity_from_flags() {
        assert_eq!(Verbosity::from_flags(true, true), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(false, true), Verbosity::Debug);
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
    }

    #[test]
    fn format_list_prefixes_each_item() {
        assert_eq!(format_list(&["a", "b"], "  - "), "  - a\n  - b");
        assert_eq!(format_list::<&str>(&[], "- "), "");
    }

    #[test]
    fn issue_rendering() {
        let text = format_issue(&issues::no_commits());
        assert_eq!(text, "· [NO_COMMITS] The repository has no commits yet");

        let text = format_issue(&issues::ongoing_operation("merge", 0));
        assert!(text.starts_with("! [ONGOING_OPERATION]"));
        assert!(text.contains("→ Continue or abort the merge"));
    }
}
