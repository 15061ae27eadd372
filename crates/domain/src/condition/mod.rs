//! Condition: the trigger unit ("initiator") of a rule.
//!
//! An initiator watches one of three things: a sensor measurement crossing a
//! threshold, the presence of tags on a group, or a recurring schedule. The
//! wire shape is flat (`type` selects which of the remaining fields matter),
//! so [`Initiator`] mirrors it and [`Initiator::validate`] enforces which
//! fields each kind requires.

mod format;
mod measurement;
mod schedule;

pub use format::{ConditionFormatter, INVALID_CONDITION, format_all_conditions, format_condition};
pub use measurement::{MeasurementCatalog, MeasurementKind, Operator};
pub use schedule::{
    ScheduleCodec, ScheduleFormatError, ScheduleParts, ScheduleType, decode_from_utc,
    encode_to_utc, parse_time_of_day,
};

use chrono::TimeZone;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::{InitiatorId, TagId};

/// What an initiator watches, decoded from its `type` string.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InitiatorKind {
    /// No type chosen yet.
    #[default]
    Unset,
    Measurement(MeasurementKind),
    Tag,
    Schedule,
    /// A type string outside the catalog, kept so it can be reported.
    Unknown(String),
}

impl From<String> for InitiatorKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "" => return Self::Unset,
            "tag" => return Self::Tag,
            "schedule" => return Self::Schedule,
            _ => {}
        }
        match MeasurementKind::from_code(&value) {
            Some(kind) => Self::Measurement(kind),
            None => Self::Unknown(value),
        }
    }
}

impl From<InitiatorKind> for String {
    fn from(value: InitiatorKind) -> Self {
        match value {
            InitiatorKind::Unset => String::new(),
            InitiatorKind::Measurement(kind) => kind.code().to_string(),
            InitiatorKind::Tag => "tag".to_string(),
            InitiatorKind::Schedule => "schedule".to_string(),
            InitiatorKind::Unknown(code) => code,
        }
    }
}

/// A single trigger condition inside a rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Initiator {
    #[serde(default)]
    pub id: InitiatorId,
    #[serde(rename = "type", default)]
    pub kind: InitiatorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<Operator>,
    #[serde(default)]
    pub value: f64,
    /// Upper bound, only meaningful for [`Operator::Between`].
    #[serde(default)]
    pub value2: Option<f64>,
    /// Tag condition holds if the group carries any of these.
    #[serde(default)]
    pub tags: Vec<TagId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_type: Option<ScheduleType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_value: Option<String>,
}

impl Default for Initiator {
    fn default() -> Self {
        Self {
            id: InitiatorId::new(),
            kind: InitiatorKind::Unset,
            operator: None,
            value: 0.0,
            value2: None,
            tags: Vec::new(),
            schedule_type: None,
            schedule_value: None,
        }
    }
}

impl Initiator {
    /// Threshold condition on a measurement.
    #[must_use]
    pub fn measurement(kind: MeasurementKind, operator: Operator, value: f64) -> Self {
        Self {
            kind: InitiatorKind::Measurement(kind),
            operator: Some(operator),
            value,
            ..Self::default()
        }
    }

    /// Range condition on a measurement (`low ≤ reading ≤ high`).
    #[must_use]
    pub fn between(kind: MeasurementKind, low: f64, high: f64) -> Self {
        Self {
            kind: InitiatorKind::Measurement(kind),
            operator: Some(Operator::Between),
            value: low,
            value2: Some(high),
            ..Self::default()
        }
    }

    /// Holds when the group carries any of `tags`.
    #[must_use]
    pub fn tags(tags: impl IntoIterator<Item = TagId>) -> Self {
        Self {
            kind: InitiatorKind::Tag,
            tags: tags.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Recurring schedule condition.
    #[must_use]
    pub fn schedule(schedule_type: ScheduleType, value: impl Into<String>) -> Self {
        Self {
            kind: InitiatorKind::Schedule,
            schedule_type: Some(schedule_type),
            schedule_value: Some(value.into()),
            ..Self::default()
        }
    }

    /// Check that every field required by the initiator's kind is present.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingField`] naming the first missing
    /// field, [`ValidationError::UnknownConditionType`] for a type outside
    /// the catalog, [`ValidationError::UnsupportedOperator`], or
    /// [`ValidationError::InvalidSchedule`] when the schedule value does not
    /// parse for its schedule type.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.kind {
            InitiatorKind::Unset => Err(ValidationError::MissingField("type")),
            InitiatorKind::Unknown(code) => {
                Err(ValidationError::UnknownConditionType(code.clone()))
            }
            InitiatorKind::Measurement(_) => match self.operator {
                None => Err(ValidationError::MissingField("operator")),
                Some(Operator::Unsupported) => Err(ValidationError::UnsupportedOperator),
                Some(Operator::Between) if self.value2.is_none() => {
                    Err(ValidationError::MissingField("value2"))
                }
                Some(_) => Ok(()),
            },
            InitiatorKind::Tag if self.tags.is_empty() => Err(ValidationError::MissingField("tags")),
            InitiatorKind::Tag => Ok(()),
            InitiatorKind::Schedule => {
                if self.schedule_type.is_none() {
                    return Err(ValidationError::MissingField("scheduleType"));
                }
                let (Some(schedule_type), Some(value)) =
                    (self.schedule_type, self.schedule_value.as_deref())
                else {
                    return Err(ValidationError::MissingField("scheduleValue"));
                };
                if value.is_empty() {
                    return Err(ValidationError::MissingField("scheduleValue"));
                }
                ScheduleParts::parse(schedule_type, value)?;
                Ok(())
            }
        }
    }

    /// Copy of this initiator with its schedule value encoded to UTC.
    ///
    /// Non-schedule initiators and malformed values are returned unchanged.
    #[must_use]
    pub fn to_utc<Tz: TimeZone>(&self, codec: &ScheduleCodec<Tz>) -> Self {
        self.map_schedule_value(|schedule_type, value| codec.try_encode_to_utc(schedule_type, value))
    }

    /// Copy of this initiator with its schedule value decoded for display.
    ///
    /// Non-schedule initiators and malformed values are returned unchanged.
    #[must_use]
    pub fn to_local<Tz: TimeZone>(&self, codec: &ScheduleCodec<Tz>) -> Self {
        self.map_schedule_value(|schedule_type, value| {
            codec.try_decode_from_utc(schedule_type, value)
        })
    }

    fn map_schedule_value<F>(&self, convert: F) -> Self
    where
        F: FnOnce(ScheduleType, &str) -> Result<String, ScheduleFormatError>,
    {
        let mut copy = self.clone();
        if let (InitiatorKind::Schedule, Some(schedule_type), Some(value)) =
            (&self.kind, self.schedule_type, self.schedule_value.as_deref())
        {
            if let Ok(converted) = convert(schedule_type, value) {
                copy.schedule_value = Some(converted);
            }
        }
        copy
    }
}
