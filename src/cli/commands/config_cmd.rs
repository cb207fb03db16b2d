//! config command - Get, set, or list configuration values
//!
//! Values live in `<gitmend home>/config.toml`. Unset keys report their
//! built-in default.

use crate::core::config::schema::{
    DEFAULT_CONFIRM_DANGEROUS_ACTIONS, DEFAULT_MAX_ACTION_HISTORY, DEFAULT_VERBOSE, KNOWN_KEYS,
};
use crate::core::config::Config;
use crate::engine::Context;
use crate::ui::output;
use anyhow::{Context as _, Result};

fn default_for(key: &str) -> String {
    match key {
        "confirmDangerousActions" => DEFAULT_CONFIRM_DANGEROUS_ACTIONS.to_string(),
        "maxActionHistory" => DEFAULT_MAX_ACTION_HISTORY.to_string(),
        "verbose" => DEFAULT_VERBOSE.to_string(),
        _ => String::new(),
    }
}

/// Get a configuration value.
pub fn get(ctx: &Context, key: &str) -> Result<()> {
    let value = ctx
        .config
        .user
        .get_key(key)?
        .unwrap_or_else(|| default_for(key));
    println!("{value}");
    Ok(())
}

/// Set a configuration value.
pub fn set(ctx: &Context, key: &str, value: &str) -> Result<()> {
    let mut user = ctx.config.user.clone();
    user.set_key(key, value)?;

    let path = Config::save(&ctx.paths, &user).context("Failed to write config")?;
    tracing::debug!(path = %path.display(), key, "config written");

    output::success(format!("Set {key} = {value}"), ctx.verbosity());
    Ok(())
}

/// List all configuration values.
pub fn list(ctx: &Context) -> Result<()> {
    match ctx.config.loaded_from() {
        Some(path) => println!("# {}", path.display()),
        None => println!("# defaults (no config file)"),
    }
    for key in KNOWN_KEYS {
        match ctx.config.user.get_key(key)? {
            Some(value) => println!("{key} = {value}"),
            None => println!("{key} = {} (default)", default_for(key)),
        }
    }
    Ok(())
}
