//! Rule: conditions, an action, and where the rule sits among rule sets.
//!
//! A rule fires its [`Action`] when its [`Initiator`]s hold, combined with
//! [`LogicalOperator`]. Evaluation happens in the backend; this module keeps
//! the rule's shape valid and its rule-set membership explicit.

mod action;
mod draft;
mod priority;
mod wizard;

pub use action::Action;
pub use draft::{DraftError, DraftUpdate, InitiatorUpdate, RuleDraft};
pub use priority::Priority;
pub use wizard::{RuleWizard, WizardError, WizardStep};

use serde::{Deserialize, Serialize};

use crate::condition::Initiator;
use crate::error::ValidationError;
use crate::id::{RuleId, RuleSetId, TagId};

/// How multiple initiators combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalOperator {
    #[default]
    And,
    Or,
}

/// The rule set a rule belongs to, or none.
///
/// On the wire this is the rule set id, or the sentinel `"none"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RuleSetRef {
    #[default]
    None,
    Set(RuleSetId),
}

impl RuleSetRef {
    const NONE: &'static str = "none";

    /// The referenced rule set, if any.
    #[must_use]
    pub fn id(&self) -> Option<&RuleSetId> {
        match self {
            Self::None => None,
            Self::Set(id) => Some(id),
        }
    }

    /// Whether this points at `rule_set`.
    #[must_use]
    pub fn is(&self, rule_set: &RuleSetId) -> bool {
        self.id() == Some(rule_set)
    }
}

impl From<RuleSetId> for RuleSetRef {
    fn from(value: RuleSetId) -> Self {
        Self::Set(value)
    }
}

impl From<String> for RuleSetRef {
    fn from(value: String) -> Self {
        if value.is_empty() || value == Self::NONE {
            Self::None
        } else {
            Self::Set(RuleSetId::from(value))
        }
    }
}

impl From<RuleSetRef> for String {
    fn from(value: RuleSetRef) -> Self {
        match value {
            RuleSetRef::None => RuleSetRef::NONE.to_string(),
            RuleSetRef::Set(id) => id.to_string(),
        }
    }
}

fn default_active() -> bool {
    true
}

/// An automation rule evaluated by the backend against group readings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub id: RuleId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub initiators: Vec<Initiator>,
    #[serde(default)]
    pub logical_operator: LogicalOperator,
    pub action: Action,
    #[serde(default)]
    pub action_params: serde_json::Value,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub rule_set: RuleSetRef,
    #[serde(default)]
    pub tags: Vec<TagId>,
}

impl Rule {
    /// Create a builder for constructing a [`Rule`].
    #[must_use]
    pub fn builder() -> RuleBuilder {
        RuleBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when:
    /// - `name` is empty ([`ValidationError::EmptyName`])
    /// - there are no initiators ([`ValidationError::NoInitiators`])
    /// - an initiator is incomplete (see [`Initiator::validate`])
    /// - the action is outside the catalog ([`ValidationError::UnsupportedAction`])
    /// - `actionParams` lacks a key the action needs
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.initiators.is_empty() {
            return Err(ValidationError::NoInitiators);
        }
        for initiator in &self.initiators {
            initiator.validate()?;
        }
        self.action.check_params(&self.action_params)
    }

    /// Whether this rule belongs to a rule set.
    #[must_use]
    pub fn in_rule_set(&self) -> bool {
        self.rule_set.id().is_some()
    }
}

/// Step-by-step builder for [`Rule`].
#[derive(Debug, Default)]
pub struct RuleBuilder {
    id: Option<RuleId>,
    name: Option<String>,
    description: Option<String>,
    initiators: Vec<Initiator>,
    logical_operator: Option<LogicalOperator>,
    action: Option<Action>,
    action_params: Option<serde_json::Value>,
    is_active: Option<bool>,
    priority: Option<Priority>,
    rule_set: Option<RuleSetRef>,
    tags: Vec<TagId>,
}

impl RuleBuilder {
    #[must_use]
    pub fn id(mut self, id: impl Into<RuleId>) -> Self {
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
    pub fn initiator(mut self, initiator: Initiator) -> Self {
        self.initiators.push(initiator);
        self
    }

    #[must_use]
    pub fn logical_operator(mut self, operator: LogicalOperator) -> Self {
        self.logical_operator = Some(operator);
        self
    }

    #[must_use]
    pub fn action(mut self, action: Action, params: serde_json::Value) -> Self {
        self.action = Some(action);
        self.action_params = Some(params);
        self
    }

    #[must_use]
    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    #[must_use]
    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    #[must_use]
    pub fn rule_set(mut self, rule_set: impl Into<RuleSetId>) -> Self {
        self.rule_set = Some(RuleSetRef::Set(rule_set.into()));
        self
    }

    #[must_use]
    pub fn tag(mut self, tag: impl Into<TagId>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Consume the builder, validate, and return a [`Rule`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingField`] when no action was given,
    /// or any error from [`Rule::validate`].
    pub fn build(self) -> Result<Rule, ValidationError> {
        let action = self.action.ok_or(ValidationError::MissingField("action"))?;
        let rule = Rule {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            initiators: self.initiators,
            logical_operator: self.logical_operator.unwrap_or_default(),
            action,
            action_params: self.action_params.unwrap_or_default(),
            is_active: self.is_active.unwrap_or(true),
            priority: self.priority.unwrap_or_default(),
            rule_set: self.rule_set.unwrap_or_default(),
            tags: self.tags,
        };
        rule.validate()?;
        Ok(rule)
    }
}
