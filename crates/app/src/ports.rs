//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the backend
//! that persists and evaluates rules. They are defined here (in `app`) so
//! that both the use-case layer and the adapter layer can depend on them
//! without creating circular dependencies.

pub mod change_feed;
pub mod group_repo;
pub mod rule_repo;
pub mod rule_set_repo;
pub mod tag_repo;

pub use change_feed::ChangePublisher;
pub use group_repo::GroupRepository;
pub use rule_repo::RuleRepository;
pub use rule_set_repo::RuleSetRepository;
pub use tag_repo::TagRepository;
