//! ui::prompts
//!
//! Interactive confirmations.
//!
//! # Design
//!
//! Prompts are only shown in interactive mode. In non-interactive mode the
//! caller gets [`PromptError::NotInteractive`] and must fail with a message
//! telling the operator which flag grants approval. End of input counts as
//! a cancellation, so an interrupted prompt never approves anything.

use std::io::{self, BufRead, Write};

use thiserror::Error;

/// Errors from prompts.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("prompt cancelled by user")]
    Cancelled,

    #[error("not in interactive mode")]
    NotInteractive,

    #[error("IO error: {0}")]
    IoError(String),
}

/// Ask a yes/no question on stderr and read the answer from stdin.
///
/// An empty answer takes `default`.
pub fn confirm(message: &str, default: bool, interactive: bool) -> Result<bool, PromptError> {
    if !interactive {
        return Err(PromptError::NotInteractive);
    }
    let hint = if default { "[Y/n]" } else { "[y/N]" };
    let mut stderr = io::stderr();
    write!(stderr, "{message} {hint} ").map_err(|e| PromptError::IoError(e.to_string()))?;
    stderr
        .flush()
        .map_err(|e| PromptError::IoError(e.to_string()))?;

    read_answer(&mut io::stdin().lock(), default)
}

/// Interpret one line of `reader` as a yes/no answer.
pub fn read_answer(reader: &mut impl BufRead, default: bool) -> Result<bool, PromptError> {
    let mut line = String::new();
    let read = reader
        .read_line(&mut line)
        .map_err(|e| PromptError::IoError(e.to_string()))?;
    if read == 0 {
        return Err(PromptError::Cancelled);
    }
    match line.trim().to_ascii_lowercase().as_str() {
        "" => Ok(default),
        "y" | "yes" => Ok(true),
        _ => Ok(false),
    }
}
