//! Action: the effect the evaluation engine performs when a rule fires.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Actions with a known parameter shape.
const CATALOG: [Action; 5] = [
    Action::Alert,
    Action::Notify,
    Action::AddTag,
    Action::RemoveTag,
    Action::SetStatus,
];

/// What a rule does when its conditions hold.
///
/// The matching `actionParams` object is kept as free-form JSON on the
/// rule; [`Action::check_params`] enforces the keys each action needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Action {
    /// Raise an alert on the group (`level`).
    Alert,
    /// Send a notification to the beekeeper (`message`).
    Notify,
    /// Attach a tag to the group (`tagId`).
    AddTag,
    /// Detach a tag from the group (`tagId`).
    RemoveTag,
    /// Change the group's status label (`status`).
    SetStatus,
    /// An action code outside the catalog. Rules carrying it can be listed
    /// and described but not saved.
    Unsupported(String),
}

impl From<String> for Action {
    fn from(value: String) -> Self {
        match value.as_str() {
            "alert" => Self::Alert,
            "notify" => Self::Notify,
            "add_tag" => Self::AddTag,
            "remove_tag" => Self::RemoveTag,
            "set_status" => Self::SetStatus,
            _ => Self::Unsupported(value),
        }
    }
}

impl From<Action> for String {
    fn from(value: Action) -> Self {
        match value {
            Action::Unsupported(code) => code,
            known => known.code().to_string(),
        }
    }
}

impl Action {
    /// Wire code of the action.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::Alert => "alert",
            Self::Notify => "notify",
            Self::AddTag => "add_tag",
            Self::RemoveTag => "remove_tag",
            Self::SetStatus => "set_status",
            Self::Unsupported(code) => code,
        }
    }

    /// Keys that must be present in `actionParams`.
    #[must_use]
    pub fn required_params(&self) -> &'static [&'static str] {
        match self {
            Self::Alert => &["level"],
            Self::Notify => &["message"],
            Self::AddTag | Self::RemoveTag => &["tagId"],
            Self::SetStatus => &["status"],
            Self::Unsupported(_) => &[],
        }
    }

    /// Whether `key` is a parameter of another catalog action and has no
    /// meaning for this one.
    #[must_use]
    pub fn is_foreign_param(&self, key: &str) -> bool {
        !self.required_params().contains(&key)
            && CATALOG
                .iter()
                .any(|other| other.required_params().contains(&key))
    }

    /// Check that `params` carries every key this action requires.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnsupportedAction`] for a code outside the
    /// catalog and [`ValidationError::MissingField`] naming the first absent
    /// or null key.
    pub fn check_params(&self, params: &serde_json::Value) -> Result<(), ValidationError> {
        if let Self::Unsupported(code) = self {
            return Err(ValidationError::UnsupportedAction(code.clone()));
        }
        for &key in self.required_params() {
            if params.get(key).is_none_or(serde_json::Value::is_null) {
                return Err(ValidationError::MissingField(key));
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_accept_params_with_required_keys() {
        let params = serde_json::json!({"message": "Hive is swarming"});
        assert_eq!(Action::Notify.check_params(&params), Ok(()));
    }

    #[test]
    fn should_name_missing_param() {
        let params = serde_json::json!({"tagId": null});
        assert_eq!(
            Action::AddTag.check_params(&params),
            Err(ValidationError::MissingField("tagId"))
        );
        assert_eq!(
            Action::Alert.check_params(&serde_json::Value::Null),
            Err(ValidationError::MissingField("level"))
        );
    }

    #[test]
    fn should_deserialize_snake_case_codes() {
        let action: Action = serde_json::from_str("\"set_status\"").unwrap();
        assert_eq!(action, Action::SetStatus);
        assert_eq!(action.to_string(), "set_status");
    }

    #[test]
    fn should_keep_unknown_code_when_deserializing() {
        let action: Action = serde_json::from_str("\"webhook\"").unwrap();
        assert_eq!(action, Action::Unsupported("webhook".to_string()));
        assert_eq!(serde_json::to_value(&action).unwrap(), "webhook");
    }

    #[test]
    fn should_refuse_params_check_for_unknown_action() {
        let action = Action::from("webhook".to_string());
        assert_eq!(
            action.check_params(&serde_json::json!({"url": "https://example.org"})),
            Err(ValidationError::UnsupportedAction("webhook".to_string()))
        );
    }

    #[test]
    fn should_flag_params_of_other_actions_as_foreign() {
        assert!(Action::Notify.is_foreign_param("tagId"));
        assert!(!Action::RemoveTag.is_foreign_param("tagId"));
        assert!(!Action::Notify.is_foreign_param("channel"));
    }
}
