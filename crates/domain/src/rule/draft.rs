//! Rule draft: the editable state behind the rule wizard.
//!
//! The draft has a single owner. Every change goes through a
//! [`DraftUpdate`], so the set of possible edits is closed and each one is
//! checked against the condition it targets.

use serde_json::{Map, Value};

use crate::condition::{Initiator, InitiatorKind, MeasurementKind, Operator, ScheduleType};
use crate::error::{NotFoundError, ValidationError};
use crate::id::{InitiatorId, RuleId, TagId};

use super::{Action, LogicalOperator, Priority, Rule, RuleSetRef};

/// One edit to a single initiator.
#[derive(Debug, Clone, PartialEq)]
pub enum InitiatorUpdate {
    /// Turn the initiator into a measurement condition on `kind`.
    Measurement(MeasurementKind),
    Operator(Operator),
    Value(f64),
    /// Upper bound for `between`.
    UpperValue(Option<f64>),
    /// Turn the initiator into a tag condition over `tags`.
    Tags(Vec<TagId>),
    /// Turn the initiator into a schedule condition of this type.
    ScheduleType(ScheduleType),
    /// Local wall-clock schedule value.
    ScheduleValue(String),
}

impl InitiatorUpdate {
    /// Apply this update to `initiator`.
    ///
    /// Switching kind clears the fields of the previous kind.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NotApplicable`] when a field update targets
    /// an initiator of another kind.
    pub fn apply(self, initiator: &mut Initiator) -> Result<(), ValidationError> {
        match self {
            Self::Measurement(kind) => {
                if !matches!(initiator.kind, InitiatorKind::Measurement(_)) {
                    reset_fields(initiator);
                }
                initiator.kind = InitiatorKind::Measurement(kind);
            }
            Self::Operator(operator) => {
                require_measurement(initiator, "operator")?;
                initiator.operator = Some(operator);
            }
            Self::Value(value) => {
                require_measurement(initiator, "value")?;
                initiator.value = value;
            }
            Self::UpperValue(value) => {
                require_measurement(initiator, "value2")?;
                initiator.value2 = value;
            }
            Self::Tags(tags) => {
                if initiator.kind != InitiatorKind::Tag {
                    reset_fields(initiator);
                    initiator.kind = InitiatorKind::Tag;
                }
                initiator.tags = tags;
            }
            Self::ScheduleType(schedule_type) => {
                if initiator.kind != InitiatorKind::Schedule {
                    reset_fields(initiator);
                    initiator.kind = InitiatorKind::Schedule;
                }
                initiator.schedule_type = Some(schedule_type);
            }
            Self::ScheduleValue(value) => {
                if initiator.kind != InitiatorKind::Schedule {
                    return Err(ValidationError::NotApplicable("scheduleValue"));
                }
                initiator.schedule_value = Some(value);
            }
        }
        Ok(())
    }
}

fn require_measurement(initiator: &Initiator, field: &'static str) -> Result<(), ValidationError> {
    if matches!(initiator.kind, InitiatorKind::Measurement(_)) {
        Ok(())
    } else {
        Err(ValidationError::NotApplicable(field))
    }
}

fn reset_fields(initiator: &mut Initiator) {
    *initiator = Initiator {
        id: initiator.id.clone(),
        ..Initiator::default()
    };
}

/// One edit to a rule draft.
#[derive(Debug, Clone, PartialEq)]
pub enum DraftUpdate {
    Name(String),
    Description(String),
    LogicalOperator(LogicalOperator),
    /// Choose the action. Params of the previous action are kept in the
    /// draft so switching back restores them, and are dropped when the draft
    /// is finalized.
    Action(Action),
    ActionParam { key: String, value: Value },
    Priority(Priority),
    RuleSet(RuleSetRef),
    Tags(Vec<TagId>),
    Active(bool),
    AddInitiator(Initiator),
    RemoveInitiator(InitiatorId),
    Initiator {
        id: InitiatorId,
        update: InitiatorUpdate,
    },
}

/// Editable rule state with one writer at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleDraft {
    /// Set when editing an existing rule.
    pub id: Option<RuleId>,
    pub name: String,
    pub description: String,
    pub initiators: Vec<Initiator>,
    pub logical_operator: LogicalOperator,
    pub action: Option<Action>,
    pub action_params: Map<String, Value>,
    pub priority: Priority,
    pub rule_set: RuleSetRef,
    pub tags: Vec<TagId>,
    pub is_active: bool,
}

impl Default for RuleDraft {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            description: String::new(),
            initiators: Vec::new(),
            logical_operator: LogicalOperator::default(),
            action: None,
            action_params: Map::new(),
            priority: Priority::default(),
            rule_set: RuleSetRef::None,
            tags: Vec::new(),
            is_active: true,
        }
    }
}

impl RuleDraft {
    /// Draft pre-filled from an existing rule.
    #[must_use]
    pub fn from_rule(rule: &Rule) -> Self {
        Self {
            id: Some(rule.id.clone()),
            name: rule.name.clone(),
            description: rule.description.clone(),
            initiators: rule.initiators.clone(),
            logical_operator: rule.logical_operator,
            action: Some(rule.action.clone()),
            action_params: rule.action_params.as_object().cloned().unwrap_or_default(),
            priority: rule.priority,
            rule_set: rule.rule_set.clone(),
            tags: rule.tags.clone(),
            is_active: rule.is_active,
        }
    }

    /// Apply one update.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NotApplicable`] from initiator updates, and
    /// [`NotFoundError`] wrapped as [`DraftError::NotFound`] when the target
    /// initiator does not exist.
    pub fn apply(&mut self, update: DraftUpdate) -> Result<(), DraftError> {
        match update {
            DraftUpdate::Name(name) => self.name = name,
            DraftUpdate::Description(description) => self.description = description,
            DraftUpdate::LogicalOperator(operator) => self.logical_operator = operator,
            DraftUpdate::Action(action) => self.action = Some(action),
            DraftUpdate::ActionParam { key, value } => {
                self.action_params.insert(key, value);
            }
            DraftUpdate::Priority(priority) => self.priority = priority,
            DraftUpdate::RuleSet(rule_set) => self.rule_set = rule_set,
            DraftUpdate::Tags(tags) => self.tags = tags,
            DraftUpdate::Active(is_active) => self.is_active = is_active,
            DraftUpdate::AddInitiator(initiator) => self.initiators.push(initiator),
            DraftUpdate::RemoveInitiator(id) => {
                let before = self.initiators.len();
                self.initiators.retain(|initiator| initiator.id != id);
                if self.initiators.len() == before {
                    return Err(initiator_not_found(&id));
                }
            }
            DraftUpdate::Initiator { id, update } => {
                let initiator = self
                    .initiators
                    .iter_mut()
                    .find(|initiator| initiator.id == id)
                    .ok_or_else(|| initiator_not_found(&id))?;
                update.apply(initiator)?;
            }
        }
        Ok(())
    }

    /// Turn the draft into a validated [`Rule`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingField`] when no action was chosen,
    /// or any error from [`Rule::validate`].
    ///
    /// Params that belong to another catalog action are left out.
    pub fn to_rule(&self) -> Result<Rule, ValidationError> {
        let action = self
            .action
            .clone()
            .ok_or(ValidationError::MissingField("action"))?;
        let action_params = self
            .action_params
            .iter()
            .filter(|(key, _)| !action.is_foreign_param(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        let rule = Rule {
            id: self.id.clone().unwrap_or_default(),
            name: self.name.trim().to_string(),
            description: self.description.clone(),
            initiators: self.initiators.clone(),
            logical_operator: self.logical_operator,
            action,
            action_params: Value::Object(action_params),
            is_active: self.is_active,
            priority: self.priority,
            rule_set: self.rule_set.clone(),
            tags: self.tags.clone(),
        };
        rule.validate()?;
        Ok(rule)
    }
}

fn initiator_not_found(id: &InitiatorId) -> DraftError {
    NotFoundError {
        entity: "Initiator",
        id: id.to_string(),
    }
    .into()
}

/// Why a draft update was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DraftError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft_with_measurement() -> (RuleDraft, InitiatorId) {
        let initiator = Initiator::measurement(MeasurementKind::Temp, Operator::Gt, 30.0);
        let id = initiator.id.clone();
        let mut draft = RuleDraft::default();
        draft.apply(DraftUpdate::AddInitiator(initiator)).unwrap();
        (draft, id)
    }

    #[test]
    fn should_update_measurement_fields() {
        let (mut draft, id) = draft_with_measurement();
        draft
            .apply(DraftUpdate::Initiator {
                id: id.clone(),
                update: InitiatorUpdate::Operator(Operator::Between),
            })
            .unwrap();
        draft
            .apply(DraftUpdate::Initiator {
                id,
                update: InitiatorUpdate::UpperValue(Some(36.0)),
            })
            .unwrap();
        let initiator = &draft.initiators[0];
        assert_eq!(initiator.operator, Some(Operator::Between));
        assert_eq!(initiator.value2, Some(36.0));
    }

    #[test]
    fn should_reject_measurement_field_on_tag_initiator() {
        let mut initiator = Initiator::tags([TagId::from("t1")]);
        let result = InitiatorUpdate::Operator(Operator::Gt).apply(&mut initiator);
        assert_eq!(result, Err(ValidationError::NotApplicable("operator")));
        assert_eq!(initiator.operator, None);
    }

    #[test]
    fn should_reject_schedule_value_before_schedule_type() {
        let mut initiator = Initiator::default();
        let result = InitiatorUpdate::ScheduleValue("08:00".to_string()).apply(&mut initiator);
        assert_eq!(result, Err(ValidationError::NotApplicable("scheduleValue")));
    }

    #[test]
    fn should_clear_previous_kind_fields_when_switching_kind() {
        let (mut draft, id) = draft_with_measurement();
        draft
            .apply(DraftUpdate::Initiator {
                id: id.clone(),
                update: InitiatorUpdate::ScheduleType(ScheduleType::Daily),
            })
            .unwrap();
        let initiator = &draft.initiators[0];
        assert_eq!(initiator.id, id);
        assert_eq!(initiator.kind, InitiatorKind::Schedule);
        assert_eq!(initiator.operator, None);
        assert_eq!(initiator.schedule_type, Some(ScheduleType::Daily));
    }

    #[test]
    fn should_report_missing_initiator() {
        let mut draft = RuleDraft::default();
        let result = draft.apply(DraftUpdate::RemoveInitiator(InitiatorId::from("nope")));
        assert!(matches!(result, Err(DraftError::NotFound(_))));
    }

    #[test]
    fn should_build_rule_from_complete_draft() {
        let (mut draft, _) = draft_with_measurement();
        draft.apply(DraftUpdate::Name("  Heat  ".to_string())).unwrap();
        draft.apply(DraftUpdate::Action(Action::Alert)).unwrap();
        draft
            .apply(DraftUpdate::ActionParam {
                key: "level".to_string(),
                value: Value::from("critical"),
            })
            .unwrap();
        let rule = draft.to_rule().unwrap();
        assert_eq!(rule.name, "Heat");
        assert_eq!(rule.action, Action::Alert);
        assert_eq!(rule.action_params["level"], "critical");
    }

    #[test]
    fn should_drop_params_of_previous_action_when_finalized() {
        let (mut draft, _) = draft_with_measurement();
        draft.apply(DraftUpdate::Name("Swarm".to_string())).unwrap();
        draft.apply(DraftUpdate::Action(Action::AddTag)).unwrap();
        draft
            .apply(DraftUpdate::ActionParam {
                key: "tagId".to_string(),
                value: Value::from("t1"),
            })
            .unwrap();
        draft.apply(DraftUpdate::Action(Action::Notify)).unwrap();
        for (key, value) in [("message", "Swarm alert"), ("channel", "sms")] {
            draft
                .apply(DraftUpdate::ActionParam {
                    key: key.to_string(),
                    value: Value::from(value),
                })
                .unwrap();
        }

        let rule = draft.to_rule().unwrap();
        assert_eq!(
            rule.action_params,
            serde_json::json!({"message": "Swarm alert", "channel": "sms"})
        );
        assert_eq!(draft.action_params["tagId"], "t1");
    }

    #[test]
    fn should_keep_rule_id_when_editing() {
        let (mut draft, _) = draft_with_measurement();
        draft.apply(DraftUpdate::Name("Heat".to_string())).unwrap();
        draft.apply(DraftUpdate::Action(Action::Alert)).unwrap();
        draft
            .apply(DraftUpdate::ActionParam {
                key: "level".to_string(),
                value: Value::from("info"),
            })
            .unwrap();
        let original = draft.to_rule().unwrap();

        let mut edit = RuleDraft::from_rule(&original);
        edit.apply(DraftUpdate::Priority(Priority::MAX)).unwrap();
        let edited = edit.to_rule().unwrap();
        assert_eq!(edited.id, original.id);
        assert_eq!(edited.priority, Priority::MAX);
    }
}
