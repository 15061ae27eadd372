//! Application services: use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic
//! parameters (constructor injection), keeping this layer decoupled from
//! concrete adapters. Mutating use-cases take the [`Workspace`] they keep in
//! step with the backend.
//!
//! [`Workspace`]: apiary_domain::workspace::Workspace

pub mod catalog_service;
pub mod group_service;
pub mod rule_service;
pub mod rule_set_service;

pub use catalog_service::CatalogService;
pub use group_service::GroupService;
pub use rule_service::RuleService;
pub use rule_set_service::RuleSetService;
