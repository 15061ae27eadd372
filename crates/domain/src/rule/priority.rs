//! Rule priority: precedence among conflicting rules on the same group.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A priority in `1..=10`; higher wins a conflict.
///
/// Priority only decides conflicts on a shared group. It never orders
/// unrelated rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Priority(u8);

impl Priority {
    pub const MIN: Self = Self(1);
    pub const MAX: Self = Self(10);

    /// Conceptual priority of a group's automatic monitoring.
    pub const AUTOMATIC_MONITORING: Self = Self(9);

    /// Validate and wrap a raw priority.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::PriorityOutOfRange`] outside `1..=10`.
    pub fn new(value: u8) -> Result<Self, ValidationError> {
        if (Self::MIN.0..=Self::MAX.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ValidationError::PriorityOutOfRange(value))
        }
    }

    /// The raw value.
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self(5)
    }
}

impl TryFrom<u8> for Priority {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Priority> for u8 {
    fn from(value: Priority) -> Self {
        value.0
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_accept_bounds() {
        assert_eq!(Priority::new(1), Ok(Priority::MIN));
        assert_eq!(Priority::new(10), Ok(Priority::MAX));
    }

    #[test]
    fn should_reject_out_of_range_values() {
        assert_eq!(Priority::new(0), Err(ValidationError::PriorityOutOfRange(0)));
        assert_eq!(
            Priority::new(11),
            Err(ValidationError::PriorityOutOfRange(11))
        );
    }

    #[test]
    fn should_reject_out_of_range_value_on_deserialize() {
        assert!(serde_json::from_str::<Priority>("12").is_err());
        let priority: Priority = serde_json::from_str("7").unwrap();
        assert_eq!(priority.get(), 7);
    }

    #[test]
    fn should_order_by_value() {
        assert!(Priority::MAX > Priority::AUTOMATIC_MONITORING);
        assert!(Priority::default() < Priority::AUTOMATIC_MONITORING);
    }
}
