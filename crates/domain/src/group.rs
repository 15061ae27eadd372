//! Group: a monitored unit (beehive, hive, weather station) rules apply to.
//!
//! A rule reaches a group in two ways: directly, through `rules`, or by
//! inheritance, when the rule's set is listed in `ruleSets`. Inherited rules
//! are not in `rules` and cannot be removed from the group by editing it.

use serde::{Deserialize, Serialize};

use crate::error::{ConflictError, ValidationError};
use crate::id::{GroupId, RuleId, RuleSetId, TagId};
use crate::rule::Rule;

/// What kind of unit a group represents.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GroupType {
    #[default]
    Beehive,
    Hive,
    WeatherStation,
    /// A type this build does not know, written back as received.
    Other(String),
}

impl From<String> for GroupType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "beehive" => Self::Beehive,
            "hive" => Self::Hive,
            "weather_station" => Self::WeatherStation,
            _ => Self::Other(value),
        }
    }
}

impl From<GroupType> for String {
    fn from(value: GroupType) -> Self {
        match value {
            GroupType::Beehive => "beehive".to_string(),
            GroupType::Hive => "hive".to_string(),
            GroupType::WeatherStation => "weather_station".to_string(),
            GroupType::Other(code) => code,
        }
    }
}

/// A monitored unit with its tags and rule assignments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: GroupType,
    #[serde(default)]
    pub tags: Vec<TagId>,
    /// Directly assigned rules.
    #[serde(default)]
    pub rules: Vec<RuleId>,
    /// Applied rule sets; their member rules are inherited.
    #[serde(default)]
    pub rule_sets: Vec<RuleSetId>,
    /// Built-in monitoring with a fixed conceptual priority of 9.
    #[serde(default)]
    pub automatic_mode: bool,
}

impl Group {
    /// Create a builder for constructing a [`Group`].
    #[must_use]
    pub fn builder() -> GroupBuilder {
        GroupBuilder::default()
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

    /// The applied rule set through which `rule` reaches this group, if any.
    #[must_use]
    pub fn inherited_via<'r>(&self, rule: &'r Rule) -> Option<&'r RuleSetId> {
        rule.rule_set
            .id()
            .filter(|set| self.rule_sets.contains(*set))
    }

    /// Whether `rule` is directly assigned to this group.
    #[must_use]
    pub fn has_direct_rule(&self, rule: &RuleId) -> bool {
        self.rules.contains(rule)
    }

    /// Whether `rule` applies to this group, directly or via a rule set.
    #[must_use]
    pub fn is_rule_applied(&self, rule: &Rule) -> bool {
        self.has_direct_rule(&rule.id) || self.inherited_via(rule).is_some()
    }

    /// Directly assign `rule`.
    ///
    /// # Errors
    ///
    /// Returns [`ConflictError::RuleAlreadyApplied`] when the rule already
    /// applies, directly or through an applied rule set. The group is left
    /// unchanged.
    pub fn assign_rule(&mut self, rule: &Rule) -> Result<(), ConflictError> {
        if self.is_rule_applied(rule) {
            return Err(ConflictError::RuleAlreadyApplied {
                rule: rule.id.to_string(),
                group: self.id.to_string(),
            });
        }
        self.rules.push(rule.id.clone());
        Ok(())
    }

    /// Remove a direct assignment of `rule`.
    ///
    /// # Errors
    ///
    /// Returns [`ConflictError::CannotUnassignInheritedRule`] when the rule
    /// reaches the group through an applied rule set, and
    /// [`ConflictError::RuleNotAssigned`] when it does not apply at all.
    pub fn unassign_rule(&mut self, rule: &Rule) -> Result<(), ConflictError> {
        if let Some(rule_set) = self.inherited_via(rule) {
            return Err(ConflictError::CannotUnassignInheritedRule {
                rule: rule.id.to_string(),
                group: self.id.to_string(),
                rule_set: rule_set.to_string(),
            });
        }
        if !self.has_direct_rule(&rule.id) {
            return Err(ConflictError::RuleNotAssigned {
                rule: rule.id.to_string(),
                group: self.id.to_string(),
            });
        }
        self.rules.retain(|id| id != &rule.id);
        Ok(())
    }

    /// Apply a rule set so its member rules are inherited.
    ///
    /// # Errors
    ///
    /// Returns [`ConflictError::RuleSetAlreadyApplied`] when already applied.
    pub fn apply_rule_set(&mut self, rule_set: &RuleSetId) -> Result<(), ConflictError> {
        if self.rule_sets.contains(rule_set) {
            return Err(ConflictError::RuleSetAlreadyApplied {
                rule_set: rule_set.to_string(),
                group: self.id.to_string(),
            });
        }
        self.rule_sets.push(rule_set.clone());
        Ok(())
    }

    /// Stop applying a rule set. Returns whether it was applied.
    pub fn remove_rule_set(&mut self, rule_set: &RuleSetId) -> bool {
        let before = self.rule_sets.len();
        self.rule_sets.retain(|id| id != rule_set);
        self.rule_sets.len() != before
    }
}

/// Step-by-step builder for [`Group`].
#[derive(Debug, Default)]
pub struct GroupBuilder {
    id: Option<GroupId>,
    name: Option<String>,
    kind: Option<GroupType>,
    tags: Vec<TagId>,
    rules: Vec<RuleId>,
    rule_sets: Vec<RuleSetId>,
    automatic_mode: bool,
}

impl GroupBuilder {
    #[must_use]
    pub fn id(mut self, id: impl Into<GroupId>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: GroupType) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn tag(mut self, tag: impl Into<TagId>) -> Self {
        self.tags.push(tag.into());
        self
    }

    #[must_use]
    pub fn rule(mut self, rule: impl Into<RuleId>) -> Self {
        self.rules.push(rule.into());
        self
    }

    #[must_use]
    pub fn rule_set(mut self, rule_set: impl Into<RuleSetId>) -> Self {
        self.rule_sets.push(rule_set.into());
        self
    }

    #[must_use]
    pub fn automatic_mode(mut self, enabled: bool) -> Self {
        self.automatic_mode = enabled;
        self
    }

    /// Consume the builder, validate, and return a [`Group`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] if `name` is missing or empty.
    pub fn build(self) -> Result<Group, ValidationError> {
        let group = Group {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            kind: self.kind.unwrap_or_default(),
            tags: self.tags,
            rules: self.rules,
            rule_sets: self.rule_sets,
            automatic_mode: self.automatic_mode,
        };
        group.validate()?;
        Ok(group)
    }
}
