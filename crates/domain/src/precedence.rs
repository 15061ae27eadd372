//! Precedence between explicit rules and a group's automatic monitoring,
//! and the resulting effective configuration of a group.
//!
//! Automatic monitoring behaves like a rule of priority 9 that is not listed
//! anywhere. An explicit rule of priority 9 or more overrides it; anything
//! lower leaves automatic monitoring in charge. The evaluation engine applies
//! this policy; the functions here describe it so every surface states it
//! the same way.

use std::collections::HashMap;

use crate::aggregation::{Provenance, applied_rules};
use crate::group::Group;
use crate::id::{GroupId, RuleId};
use crate::rule::{Priority, Rule};
use crate::rule_set::RuleSet;
use crate::tag::{Tag, tag_rule_overrides};

/// The single wording of the precedence policy shown to users.
pub const PRECEDENCE_POLICY: &str = "Rules with priority 9 or higher override automatic monitoring; \
     rules with a lower priority yield to it.";

/// Who is in charge when a rule and automatic monitoring could both act.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Governing {
    Rule,
    AutomaticMonitoring,
}

/// Whether a rule of `priority` overrides automatic monitoring.
#[must_use]
pub fn overrides_automatic_monitoring(priority: Priority) -> bool {
    priority >= Priority::AUTOMATIC_MONITORING
}

/// Who governs a rule of `priority` on a group with `automatic_mode`.
#[must_use]
pub fn governing(priority: Priority, automatic_mode: bool) -> Governing {
    if automatic_mode && !overrides_automatic_monitoring(priority) {
        Governing::AutomaticMonitoring
    } else {
        Governing::Rule
    }
}

/// The winner among conflicting rules: highest priority, first on ties.
#[must_use]
pub fn strongest<'a>(rules: impl IntoIterator<Item = &'a Rule>) -> Option<&'a Rule> {
    rules.into_iter().fold(None, |best, rule| match best {
        Some(current) if current.priority >= rule.priority => Some(current),
        _ => Some(rule),
    })
}

/// One applied rule as it takes effect on a group.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveRule<'a> {
    pub rule: &'a Rule,
    pub provenance: Provenance,
    /// The rule is active and so is the rule set it belongs to.
    pub active: bool,
    /// `None` for inactive rules, which never govern.
    pub governing: Option<Governing>,
    /// Parameter override contributed by the group's tags.
    pub override_value: Option<String>,
}

/// Everything that decides how a group is monitored.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveConfiguration<'a> {
    pub group: GroupId,
    pub automatic_mode: bool,
    pub rules: Vec<EffectiveRule<'a>>,
    pub overrides: Option<HashMap<RuleId, String>>,
}

impl EffectiveConfiguration<'_> {
    /// Whether automatic monitoring is in charge: enabled, and no active
    /// rule overrides it.
    #[must_use]
    pub fn automatic_monitoring_governs(&self) -> bool {
        self.automatic_mode
            && !self
                .rules
                .iter()
                .any(|effective| effective.governing == Some(Governing::Rule))
    }

    /// The active rule that wins a conflict on this group.
    #[must_use]
    pub fn strongest_rule(&self) -> Option<&Rule> {
        strongest(
            self.rules
                .iter()
                .filter(|effective| effective.active)
                .map(|effective| effective.rule),
        )
    }

    /// One-paragraph description for previews and summaries.
    #[must_use]
    pub fn summary(&self) -> String {
        let active = self.rules.iter().filter(|effective| effective.active).count();
        let mut text = format!("{active} active rule(s) of {} applied.", self.rules.len());
        if self.automatic_mode {
            let state = if self.automatic_monitoring_governs() {
                "Automatic monitoring governs this group."
            } else {
                "A high-priority rule overrides automatic monitoring on this group."
            };
            text.push(' ');
            text.push_str(state);
            text.push(' ');
            text.push_str(PRECEDENCE_POLICY);
        }
        text
    }
}

/// Compute the effective configuration of `group`.
#[must_use]
pub fn effective_configuration<'a>(
    group: &Group,
    rules: &'a [Rule],
    rule_sets: &[RuleSet],
    tags: &[Tag],
) -> EffectiveConfiguration<'a> {
    let overrides = tag_rule_overrides(&group.tags, tags);
    let rules = applied_rules(group, rules)
        .into_iter()
        .map(|applied| {
            let set_active = applied.rule.rule_set.id().is_none_or(|id| {
                rule_sets
                    .iter()
                    .find(|rule_set| &rule_set.id == id)
                    .is_none_or(|rule_set| rule_set.is_active)
            });
            let active = applied.rule.is_active && set_active;
            EffectiveRule {
                rule: applied.rule,
                provenance: applied.provenance,
                active,
                governing: active.then(|| governing(applied.rule.priority, group.automatic_mode)),
                override_value: overrides
                    .as_ref()
                    .and_then(|map| map.get(&applied.rule.id).cloned()),
            }
        })
        .collect();
    EffectiveConfiguration {
        group: group.id.clone(),
        automatic_mode: group.automatic_mode,
        rules,
        overrides,
    }
}
