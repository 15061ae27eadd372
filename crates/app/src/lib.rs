//! # apiary-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that backend adapters must implement:
//!   - `RuleRepository`: CRUD for rules
//!   - `RuleSetRepository`: CRUD for rule sets
//!   - `GroupRepository`: list and update groups
//!   - `TagRepository`: list tags
//!   - `ChangePublisher`: announce confirmed changes
//! - Define the use-cases:
//!   - `RuleService`: create, edit, delete and describe rules
//!   - `RuleSetService`: create, toggle and delete rule sets
//!   - `GroupService`: assign rules and rule sets, toggle automatic monitoring
//!   - `CatalogService`: load the workspace
//! - Provide **in-process infrastructure** (change feed) that doesn't need IO
//! - Parse presentation settings
//!
//! Local state follows the backend: a workspace is only changed after the
//! corresponding write succeeded.
//!
//! ## Dependency rule
//! Depends on `apiary-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod change_feed;
pub mod config;
pub mod ports;
pub mod services;
