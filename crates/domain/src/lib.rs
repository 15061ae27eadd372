//! # apiary-domain
//!
//! Pure domain model for apiary monitoring rules.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions
//! - Define **Conditions** (measurement, tag and schedule initiators) and
//!   their human-readable rendering
//! - Encode recurring schedules between local time and UTC
//! - Define **Rules**, **Rule sets**, **Tags** and **Groups**, with the
//!   assignment guards between them
//! - Resolve priority against a group's automatic monitoring, and tag
//!   overrides
//! - Drive rule drafting through the wizard steps
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app` or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;

pub mod aggregation;
pub mod change;
pub mod condition;
pub mod group;
pub mod precedence;
pub mod rule;
pub mod rule_set;
pub mod tag;
pub mod workspace;
