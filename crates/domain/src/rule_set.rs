//! Rule set: a named, independently toggleable collection of rules.
//!
//! Membership is owned by the rules: a rule belongs to the set whose id is
//! in its `ruleSet` field. The `rules` list carried by the set is a cached
//! copy for display and is never used to decide membership.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::{RuleId, RuleSetId};

fn default_active() -> bool {
    true
}

/// A collection of rules applied to groups as a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSet {
    pub id: RuleSetId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Cached member ids, display only.
    #[serde(default)]
    pub rules: Vec<RuleId>,
}

impl RuleSet {
    /// Create a builder for constructing a [`RuleSet`].
    #[must_use]
    pub fn builder() -> RuleSetBuilder {
        RuleSetBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] when `name` is empty.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(())
    }
}

/// Step-by-step builder for [`RuleSet`].
#[derive(Debug, Default)]
pub struct RuleSetBuilder {
    id: Option<RuleSetId>,
    name: Option<String>,
    description: Option<String>,
    is_active: Option<bool>,
}

impl RuleSetBuilder {
    #[must_use]
    pub fn id(mut self, id: impl Into<RuleSetId>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    /// Consume the builder, validate, and return a [`RuleSet`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] if `name` is missing or empty.
    pub fn build(self) -> Result<RuleSet, ValidationError> {
        let rule_set = RuleSet {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            is_active: self.is_active.unwrap_or(true),
            rules: Vec::new(),
        };
        rule_set.validate()?;
        Ok(rule_set)
    }
}
