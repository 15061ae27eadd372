//! Rule repository port: persistence for rules.
//!
//! Schedule values crossing this port are always UTC-encoded.

use std::future::Future;

use apiary_domain::error::ApiaryError;
use apiary_domain::id::RuleId;
use apiary_domain::rule::Rule;

/// Repository for persisting and querying [`Rule`]s.
pub trait RuleRepository {
    /// Get all rules.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Rule>, ApiaryError>> + Send;

    /// Create a new rule and return it as stored.
    fn create(&self, rule: Rule) -> impl Future<Output = Result<Rule, ApiaryError>> + Send;

    /// Replace an existing rule and return it as stored.
    fn update(&self, rule: Rule) -> impl Future<Output = Result<Rule, ApiaryError>> + Send;

    /// Delete a rule by its unique identifier.
    fn delete(&self, id: RuleId) -> impl Future<Output = Result<(), ApiaryError>> + Send;
}
