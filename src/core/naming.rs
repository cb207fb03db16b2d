//! core::naming
//!
//! Naming rules for branches the operator asks us to create.
//!
//! Recovered branches are created under names typed by a human. The accepted
//! alphabet is narrower than git's: ASCII letters, digits, `/`, `_` and `-`.
//! Anything outside that set is refused before git is invoked.

use thiserror::Error;

/// Why a proposed branch name was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("branch name cannot be empty")]
    Empty,

    #[error("branch name '{name}' contains disallowed character {found:?}")]
    DisallowedChar { name: String, found: char },
}

/// Check whether a character may appear in a new branch name.
pub fn is_allowed_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '/' | '_' | '-')
}

/// Validate a proposed name for a new branch.
///
/// # Example
///
/// ```
/// use gitmend::core::naming::validate_new_branch_name;
///
/// assert!(validate_new_branch_name("feature/recovered_1").is_ok());
/// assert!(validate_new_branch_name("has space").is_err());
/// assert!(validate_new_branch_name("v1.2").is_err());
/// ```
pub fn validate_new_branch_name(name: &str) -> Result<(), NameError> {
    if name.is_empty() {
        return Err(NameError::Empty);
    }
    match name.chars().find(|&c| !is_allowed_char(c)) {
        Some(found) => Err(NameError::DisallowedChar {
            name: name.to_string(),
            found,
        }),
        None => Ok(()),
    }
}

/// Suggest a free name for a branch being recovered.
///
/// Returns `base` when it is unused, otherwise `base-recovered`,
/// `base-recovered-2`, ... until a name not in `taken` is found.
pub fn recovery_name<'a>(base: &str, taken: impl IntoIterator<Item = &'a str> + Clone) -> String {
    let is_taken = |candidate: &str| taken.clone().into_iter().any(|t| t == candidate);
    if !is_taken(base) {
        return base.to_string();
    }
    let first = format!("{base}-recovered");
    if !is_taken(&first) {
        return first;
    }
    (2..)
        .map(|n| format!("{base}-recovered-{n}"))
        .find(|candidate| !is_taken(candidate))
        .unwrap_or(first)
}
