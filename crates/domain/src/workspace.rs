//! Workspace: the locally held copy of rules, rule sets, tags and groups.
//!
//! The workspace has a single owner. The application layer mutates it only
//! after the backend has confirmed a write, so every method here assumes the
//! change is already durable.

use crate::aggregation::{self, AppliedRule};
use crate::error::NotFoundError;
use crate::group::Group;
use crate::id::{GroupId, RuleId, RuleSetId, TagId};
use crate::precedence::{EffectiveConfiguration, effective_configuration};
use crate::rule::Rule;
use crate::rule_set::RuleSet;
use crate::tag::Tag;

/// Everything a rule session works on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workspace {
    rules: Vec<Rule>,
    rule_sets: Vec<RuleSet>,
    tags: Vec<Tag>,
    groups: Vec<Group>,
}

/// What deleting a rule set changed besides removing the set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSetCascade {
    /// Former members, now standalone.
    pub detached_rules: Vec<RuleId>,
    /// Groups that had the set applied.
    pub groups: Vec<GroupId>,
}

fn not_found(entity: &'static str, id: impl ToString) -> NotFoundError {
    NotFoundError {
        entity,
        id: id.to_string(),
    }
}

impl Workspace {
    #[must_use]
    pub fn new(rules: Vec<Rule>, rule_sets: Vec<RuleSet>, tags: Vec<Tag>, groups: Vec<Group>) -> Self {
        let mut workspace = Self {
            rules,
            rule_sets,
            tags,
            groups,
        };
        workspace.refresh_cached_membership();
        workspace
    }

    /// Swap every collection for freshly loaded ones.
    pub fn replace_all(
        &mut self,
        rules: Vec<Rule>,
        rule_sets: Vec<RuleSet>,
        tags: Vec<Tag>,
        groups: Vec<Group>,
    ) {
        *self = Self::new(rules, rule_sets, tags, groups);
    }

    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    #[must_use]
    pub fn rule_sets(&self) -> &[RuleSet] {
        &self.rule_sets
    }

    #[must_use]
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    #[must_use]
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// # Errors
    ///
    /// Returns [`NotFoundError`] when no rule has this id.
    pub fn rule(&self, id: &RuleId) -> Result<&Rule, NotFoundError> {
        self.rules
            .iter()
            .find(|rule| &rule.id == id)
            .ok_or_else(|| not_found("Rule", id))
    }

    /// # Errors
    ///
    /// Returns [`NotFoundError`] when no rule set has this id.
    pub fn rule_set(&self, id: &RuleSetId) -> Result<&RuleSet, NotFoundError> {
        self.rule_sets
            .iter()
            .find(|rule_set| &rule_set.id == id)
            .ok_or_else(|| not_found("RuleSet", id))
    }

    /// # Errors
    ///
    /// Returns [`NotFoundError`] when no tag has this id.
    pub fn tag(&self, id: &TagId) -> Result<&Tag, NotFoundError> {
        self.tags
            .iter()
            .find(|tag| &tag.id == id)
            .ok_or_else(|| not_found("Tag", id))
    }

    /// # Errors
    ///
    /// Returns [`NotFoundError`] when no group has this id.
    pub fn group(&self, id: &GroupId) -> Result<&Group, NotFoundError> {
        self.groups
            .iter()
            .find(|group| &group.id == id)
            .ok_or_else(|| not_found("Group", id))
    }

    /// Rules of `rule_set`, derived from the rules themselves.
    #[must_use]
    pub fn rules_in_set(&self, rule_set: &RuleSetId) -> Vec<&Rule> {
        aggregation::rules_in_set(rule_set, &self.rules)
    }

    #[must_use]
    pub fn single_rules(&self) -> Vec<&Rule> {
        aggregation::single_rules(&self.rules)
    }

    /// # Errors
    ///
    /// Returns [`NotFoundError`] for an unknown group.
    pub fn applied_rules(&self, group: &GroupId) -> Result<Vec<AppliedRule<'_>>, NotFoundError> {
        let group = self.group(group)?;
        Ok(aggregation::applied_rules(group, &self.rules))
    }

    /// # Errors
    ///
    /// Returns [`NotFoundError`] for an unknown group.
    pub fn effective_configuration(
        &self,
        group: &GroupId,
    ) -> Result<EffectiveConfiguration<'_>, NotFoundError> {
        let group = self.group(group)?;
        Ok(effective_configuration(
            group,
            &self.rules,
            &self.rule_sets,
            &self.tags,
        ))
    }

    /// Insert `rule`, or replace the rule with the same id.
    pub fn upsert_rule(&mut self, rule: Rule) {
        match self.rules.iter_mut().find(|existing| existing.id == rule.id) {
            Some(existing) => *existing = rule,
            None => self.rules.push(rule),
        }
        self.refresh_cached_membership();
    }

    /// Remove a rule and its direct assignments. Returns the groups that
    /// referenced it.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] when no rule has this id.
    pub fn remove_rule(&mut self, id: &RuleId) -> Result<Vec<GroupId>, NotFoundError> {
        let position = self
            .rules
            .iter()
            .position(|rule| &rule.id == id)
            .ok_or_else(|| not_found("Rule", id))?;
        self.rules.remove(position);
        let mut touched = Vec::new();
        for group in &mut self.groups {
            if group.has_direct_rule(id) {
                group.rules.retain(|rule| rule != id);
                touched.push(group.id.clone());
            }
        }
        self.refresh_cached_membership();
        Ok(touched)
    }

    /// Insert `rule_set`, or replace the set with the same id.
    pub fn upsert_rule_set(&mut self, rule_set: RuleSet) {
        match self
            .rule_sets
            .iter_mut()
            .find(|existing| existing.id == rule_set.id)
        {
            Some(existing) => *existing = rule_set,
            None => self.rule_sets.push(rule_set),
        }
        self.refresh_cached_membership();
    }

    /// Remove a rule set and cascade: its members become standalone rules
    /// and groups stop applying it.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] when no rule set has this id.
    pub fn remove_rule_set(&mut self, id: &RuleSetId) -> Result<RuleSetCascade, NotFoundError> {
        let position = self
            .rule_sets
            .iter()
            .position(|rule_set| &rule_set.id == id)
            .ok_or_else(|| not_found("RuleSet", id))?;
        self.rule_sets.remove(position);
        let detached_rules = aggregation::detach_rule_set(id, &mut self.rules);
        let groups = self
            .groups
            .iter_mut()
            .filter_map(|group| group.remove_rule_set(id).then(|| group.id.clone()))
            .collect();
        Ok(RuleSetCascade {
            detached_rules,
            groups,
        })
    }

    /// Replace the group with the same id.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] when no group has this id.
    pub fn update_group(&mut self, group: Group) -> Result<(), NotFoundError> {
        let existing = self
            .groups
            .iter_mut()
            .find(|existing| existing.id == group.id)
            .ok_or_else(|| not_found("Group", &group.id))?;
        *existing = group;
        Ok(())
    }

    /// Rewrite every rule set's cached member list.
    pub fn refresh_cached_membership(&mut self) {
        aggregation::refresh_cached_membership(&mut self.rule_sets, &self.rules);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{Initiator, MeasurementKind, Operator};
    use crate::rule::{Action, RuleSetRef};

    fn rule(id: &str, rule_set: Option<&str>) -> Rule {
        let builder = Rule::builder()
            .id(id)
            .name(format!("Rule {id}"))
            .initiator(Initiator::measurement(MeasurementKind::Weight, Operator::Lt, 20.0))
            .action(Action::Alert, serde_json::json!({"level": "critical"}));
        match rule_set {
            Some(set) => builder.rule_set(set),
            None => builder,
        }
        .build()
        .unwrap()
    }

    fn workspace() -> Workspace {
        Workspace::new(
            vec![rule("R", Some("S")), rule("Q", None)],
            vec![RuleSet::builder().id("S").name("Spring").build().unwrap()],
            Vec::new(),
            vec![
                Group::builder()
                    .id("G")
                    .name("Hive 1")
                    .rule("Q")
                    .rule_set("S")
                    .build()
                    .unwrap(),
                Group::builder().id("H").name("Hive 2").build().unwrap(),
            ],
        )
    }

    #[test]
    fn should_fill_cached_membership_on_load() {
        let workspace = workspace();
        assert_eq!(workspace.rule_sets()[0].rules, vec![RuleId::from("R")]);
    }

    #[test]
    fn should_report_missing_ids() {
        let workspace = workspace();
        let err = workspace.rule(&RuleId::from("missing")).unwrap_err();
        assert_eq!(err.entity, "Rule");
        assert_eq!(err.id, "missing");
        assert!(workspace.group(&GroupId::from("nope")).is_err());
    }

    #[test]
    fn should_cascade_rule_set_deletion() {
        let mut workspace = workspace();
        let cascade = workspace.remove_rule_set(&RuleSetId::from("S")).unwrap();
        assert_eq!(cascade.detached_rules, vec![RuleId::from("R")]);
        assert_eq!(cascade.groups, vec![GroupId::from("G")]);
        assert_eq!(workspace.rules().len(), 2);
        assert_eq!(
            workspace.rule(&RuleId::from("R")).unwrap().rule_set,
            RuleSetRef::None
        );
        assert!(workspace.rules_in_set(&RuleSetId::from("S")).is_empty());
        assert!(workspace.group(&GroupId::from("G")).unwrap().rule_sets.is_empty());
    }

    #[test]
    fn should_strip_direct_assignments_when_rule_removed() {
        let mut workspace = workspace();
        let touched = workspace.remove_rule(&RuleId::from("Q")).unwrap();
        assert_eq!(touched, vec![GroupId::from("G")]);
        assert!(workspace.group(&GroupId::from("G")).unwrap().rules.is_empty());
        assert!(workspace.remove_rule(&RuleId::from("Q")).is_err());
    }

    #[test]
    fn should_refresh_membership_when_rule_moves_between_sets() {
        let mut workspace = workspace();
        workspace.upsert_rule(rule("Q", Some("S")));
        assert_eq!(
            workspace.rule_sets()[0].rules,
            vec![RuleId::from("R"), RuleId::from("Q")]
        );
        assert_eq!(workspace.single_rules().len(), 0);
    }

    #[test]
    fn should_list_applied_rules_of_group() {
        let workspace = workspace();
        let applied = workspace.applied_rules(&GroupId::from("G")).unwrap();
        assert_eq!(applied.len(), 2);
        let config = workspace.effective_configuration(&GroupId::from("H")).unwrap();
        assert!(config.rules.is_empty());
    }

    #[test]
    fn should_reject_update_of_unknown_group() {
        let mut workspace = workspace();
        let stranger = Group::builder().id("X").name("Stray").build().unwrap();
        assert!(workspace.update_group(stranger).is_err());
    }
}
