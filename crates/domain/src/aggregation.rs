//! Derived views over rules, rule sets and groups.
//!
//! Every view here is computed from the rules' own `ruleSet` field, the one
//! authoritative record of membership.

use crate::group::Group;
use crate::id::{RuleId, RuleSetId};
use crate::rule::{Rule, RuleSetRef};
use crate::rule_set::RuleSet;

/// How a rule reaches a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provenance {
    /// Listed in the group's `rules`.
    Direct,
    /// Member of a rule set listed in the group's `ruleSets`.
    Inherited(RuleSetId),
}

/// A rule applied to a group, with how it got there.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedRule<'a> {
    pub rule: &'a Rule,
    pub provenance: Provenance,
}

/// Rules whose `ruleSet` is `rule_set`, in their original order.
#[must_use]
pub fn rules_in_set<'a>(rule_set: &RuleSetId, rules: &'a [Rule]) -> Vec<&'a Rule> {
    rules.iter().filter(|rule| rule.rule_set.is(rule_set)).collect()
}

/// Rules that belong to no rule set.
#[must_use]
pub fn single_rules(rules: &[Rule]) -> Vec<&Rule> {
    rules.iter().filter(|rule| !rule.in_rule_set()).collect()
}

/// Whether `rule` applies to `group`, directly or through a rule set.
#[must_use]
pub fn is_rule_applied_to_group(rule: &Rule, group: &Group) -> bool {
    group.is_rule_applied(rule)
}

/// Every rule that applies to `group`, in the order of `rules`.
///
/// Rules that are both directly assigned and inherited are reported as
/// inherited, since removing the direct entry would not detach them.
#[must_use]
pub fn applied_rules<'a>(group: &Group, rules: &'a [Rule]) -> Vec<AppliedRule<'a>> {
    rules
        .iter()
        .filter_map(|rule| {
            let provenance = match group.inherited_via(rule) {
                Some(rule_set) => Provenance::Inherited(rule_set.clone()),
                None if group.has_direct_rule(&rule.id) => Provenance::Direct,
                None => return None,
            };
            Some(AppliedRule { rule, provenance })
        })
        .collect()
}

/// Reset every member of `rule_set` to no rule set.
///
/// Returns the ids of the rules that were detached. The rules themselves
/// are kept.
pub fn detach_rule_set(rule_set: &RuleSetId, rules: &mut [Rule]) -> Vec<RuleId> {
    rules
        .iter_mut()
        .filter(|rule| rule.rule_set.is(rule_set))
        .map(|rule| {
            rule.rule_set = RuleSetRef::None;
            rule.id.clone()
        })
        .collect()
}

/// Rewrite each rule set's cached `rules` list from the rules' membership.
pub fn refresh_cached_membership(rule_sets: &mut [RuleSet], rules: &[Rule]) {
    for rule_set in rule_sets {
        rule_set.rules = rules_in_set(&rule_set.id, rules)
            .into_iter()
            .map(|rule| rule.id.clone())
            .collect();
    }
}
