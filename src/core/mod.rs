//! core
//!
//! Core domain types, configuration, and operations for gitmend.
//!
//! # Modules
//!
//! - [`types`] - Strong types: BranchName, Oid, UtcTimestamp
//! - [`naming`] - Branch naming rules for recovered branches
//! - [`ops`] - Action journal and its lock
//! - [`config`] - Configuration schema and loading
//! - [`paths`] - Centralized path routing for gitmend storage
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Persisted formats are self-describing JSON and TOML
//! - Reading persisted state never fails the caller

pub mod config;
pub mod naming;
pub mod ops;
pub mod paths;
pub mod types;
