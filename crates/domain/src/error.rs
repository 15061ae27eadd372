//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`ApiaryError`]
//! via `#[from]`. Transport failures from adapters are carried boxed so the
//! domain stays free of IO crates.

use crate::condition::ScheduleFormatError;

/// Top-level error for every fallible operation in the workspace.
#[derive(Debug, thiserror::Error)]
pub enum ApiaryError {
    /// A domain invariant was violated.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A referenced record does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// A business rule declined the operation.
    #[error("operation declined")]
    Conflict(#[from] ConflictError),

    /// The persistence backend rejected the request or was unreachable.
    #[error("transport error")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiaryError {
    /// Wrap an adapter error as a transport failure.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Box::new(err))
    }
}

/// Invariant violations detected locally, before anything reaches the network.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A required field was left unset.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    /// The condition type is neither `tag`, `schedule` nor a catalog measurement.
    #[error("unknown condition type `{0}`")]
    UnknownConditionType(String),

    /// The operator string is not one of the supported comparisons.
    #[error("unsupported operator for measurement condition")]
    UnsupportedOperator,

    /// The action code is not one this build can save.
    #[error("unsupported action `{0}`")]
    UnsupportedAction(String),

    /// The update targets a field the condition's type does not have.
    #[error("field `{0}` does not apply to this condition type")]
    NotApplicable(&'static str),

    /// A schedule value that cannot be encoded for storage.
    #[error("invalid schedule value: {0}")]
    InvalidSchedule(#[from] ScheduleFormatError),

    /// A rule must carry at least one initiator.
    #[error("a rule needs at least one condition")]
    NoInitiators,

    /// Names must not be empty.
    #[error("name must not be empty")]
    EmptyName,

    /// Priorities live in `1..=10`.
    #[error("priority {0} is outside 1..=10")]
    PriorityOutOfRange(u8),
}

/// A lookup by id found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// Business-rule rejections surfaced to the caller as a declined operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConflictError {
    /// The rule is already applied to the group, directly or via a rule set.
    #[error("rule {rule} is already applied to group {group}")]
    RuleAlreadyApplied { rule: String, group: String },

    /// The rule reaches the group through an applied rule set and cannot be
    /// removed from the group's direct assignments.
    #[error("rule {rule} is inherited by group {group} through rule set {rule_set}")]
    CannotUnassignInheritedRule {
        rule: String,
        group: String,
        rule_set: String,
    },

    /// The rule is not applied to the group at all.
    #[error("rule {rule} is not assigned to group {group}")]
    RuleNotAssigned { rule: String, group: String },

    /// The rule set is already applied to the group.
    #[error("rule set {rule_set} is already applied to group {group}")]
    RuleSetAlreadyApplied { rule_set: String, group: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("connection refused")]
    struct Refused;

    #[test]
    fn should_convert_validation_error_via_from() {
        let err: ApiaryError = ValidationError::MissingField("operator").into();
        assert!(matches!(
            err,
            ApiaryError::Validation(ValidationError::MissingField("operator"))
        ));
    }

    #[test]
    fn should_name_missing_field_in_message() {
        let err = ValidationError::MissingField("value2");
        assert_eq!(err.to_string(), "missing required field `value2`");
    }

    #[test]
    fn should_keep_transport_source() {
        let err = ApiaryError::transport(Refused);
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("connection refused"));
    }

    #[test]
    fn should_describe_inherited_rule_conflict() {
        let err = ConflictError::CannotUnassignInheritedRule {
            rule: "r1".to_string(),
            group: "g1".to_string(),
            rule_set: "s1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "rule r1 is inherited by group g1 through rule set s1"
        );
    }
}
