//! Rule set repository port: persistence for rule sets.

use std::future::Future;

use apiary_domain::error::ApiaryError;
use apiary_domain::id::RuleSetId;
use apiary_domain::rule_set::RuleSet;

/// Repository for persisting and querying [`RuleSet`]s.
pub trait RuleSetRepository {
    /// Get all rule sets.
    fn get_all(&self) -> impl Future<Output = Result<Vec<RuleSet>, ApiaryError>> + Send;

    /// Create a new rule set and return it as stored.
    fn create(&self, rule_set: RuleSet)
    -> impl Future<Output = Result<RuleSet, ApiaryError>> + Send;

    /// Replace an existing rule set and return it as stored.
    fn update(&self, rule_set: RuleSet)
    -> impl Future<Output = Result<RuleSet, ApiaryError>> + Send;

    /// Delete a rule set. Member rules are kept.
    fn delete(&self, id: RuleSetId) -> impl Future<Output = Result<(), ApiaryError>> + Send;
}
