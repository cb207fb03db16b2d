//! core::config::schema
//!
//! User configuration schema.
//!
//! # Example
//!
//! ```toml
//! confirmDangerousActions = true
//! maxActionHistory = 50
//! verbose = false
//! ```
//!
//! Every field is optional; absent fields take the built-in default.
//! Unknown fields are ignored so that older binaries can read files written
//! by newer ones.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Default for `confirmDangerousActions`.
pub const DEFAULT_CONFIRM_DANGEROUS_ACTIONS: bool = true;

/// Default for `maxActionHistory`.
pub const DEFAULT_MAX_ACTION_HISTORY: usize = 50;

/// Default for `verbose`.
pub const DEFAULT_VERBOSE: bool = false;

/// Keys accepted by `config get` / `config set`.
pub const KNOWN_KEYS: &[&str] = &["confirmDangerousActions", "maxActionHistory", "verbose"];

/// Per-user configuration as stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct UserConfig {
    /// Ask before running an operation that raised safety warnings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirm_dangerous_actions: Option<bool>,

    /// Maximum number of journal entries kept on disk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_action_history: Option<usize>,

    /// Emit debug logging.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,
}

impl UserConfig {
    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_action_history == Some(0) {
            return Err(ConfigError::InvalidValue(
                "maxActionHistory must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Read a key as its display string, `None` when unset.
    pub fn get_key(&self, key: &str) -> Result<Option<String>, ConfigError> {
        let value = match key {
            "confirmDangerousActions" => self.confirm_dangerous_actions.map(|v| v.to_string()),
            "maxActionHistory" => self.max_action_history.map(|v| v.to_string()),
            "verbose" => self.verbose.map(|v| v.to_string()),
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        };
        Ok(value)
    }

    /// Parse `value` and store it under `key`.
    pub fn set_key(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let parse_bool = |v: &str| {
            v.parse::<bool>().map_err(|_| {
                ConfigError::InvalidValue(format!("{key} expects true or false, got '{v}'"))
            })
        };
        match key {
            "confirmDangerousActions" => self.confirm_dangerous_actions = Some(parse_bool(value)?),
            "verbose" => self.verbose = Some(parse_bool(value)?),
            "maxActionHistory" => {
                let n = value.parse::<usize>().map_err(|_| {
                    ConfigError::InvalidValue(format!(
                        "maxActionHistory expects a positive integer, got '{value}'"
                    ))
                })?;
                self.max_action_history = Some(n);
            }
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        self.validate()
    }
}
