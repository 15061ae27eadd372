//! Human-readable descriptions of conditions.

use crate::rule::{LogicalOperator, Rule};
use crate::tag::Tag;

use super::{
    Initiator, InitiatorKind, MeasurementCatalog, MeasurementKind, Operator, ScheduleParts,
    ScheduleType,
};

/// Text shown for a condition that cannot be described.
pub const INVALID_CONDITION: &str = "Invalid condition";

const UNKNOWN_TAG: &str = "Unknown";

const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Renders initiators against a tag catalog and measurement units.
#[derive(Debug, Clone)]
pub struct ConditionFormatter<'a> {
    tags: &'a [Tag],
    units: MeasurementCatalog,
}

impl<'a> ConditionFormatter<'a> {
    /// Formatter resolving tag names from `tags` with default units.
    #[must_use]
    pub fn new(tags: &'a [Tag]) -> Self {
        Self {
            tags,
            units: MeasurementCatalog::default(),
        }
    }

    /// Use `units` instead of the catalog defaults.
    #[must_use]
    pub fn with_units(mut self, units: MeasurementCatalog) -> Self {
        self.units = units;
        self
    }

    /// Describe a single initiator.
    #[must_use]
    pub fn condition(&self, initiator: &Initiator) -> String {
        match &initiator.kind {
            InitiatorKind::Schedule => describe_schedule(initiator),
            InitiatorKind::Tag => self.describe_tags(initiator),
            InitiatorKind::Measurement(kind) => self.describe_measurement(*kind, initiator),
            InitiatorKind::Unset | InitiatorKind::Unknown(_) => None,
        }
        .unwrap_or_else(|| INVALID_CONDITION.to_string())
    }

    /// Describe every initiator of `rule`, joined by its logical operator.
    #[must_use]
    pub fn all_conditions(&self, rule: &Rule) -> String {
        self.join(&rule.initiators, rule.logical_operator)
    }

    /// Describe `initiators` joined by `operator`.
    #[must_use]
    pub fn join(&self, initiators: &[Initiator], operator: LogicalOperator) -> String {
        if let [single] = initiators {
            return self.condition(single);
        }
        let separator = match operator {
            LogicalOperator::And => " AND ",
            LogicalOperator::Or => " OR ",
        };
        initiators
            .iter()
            .map(|initiator| self.condition(initiator))
            .collect::<Vec<_>>()
            .join(separator)
    }

    fn describe_tags(&self, initiator: &Initiator) -> Option<String> {
        if initiator.tags.is_empty() {
            return Some("Has tags: None".to_string());
        }
        let names = initiator
            .tags
            .iter()
            .map(|id| {
                self.tags
                    .iter()
                    .find(|tag| &tag.id == id)
                    .map_or(UNKNOWN_TAG, |tag| tag.name.as_str())
            })
            .collect::<Vec<_>>()
            .join(", ");
        Some(format!("Has tags: {names}"))
    }

    fn describe_measurement(&self, kind: MeasurementKind, initiator: &Initiator) -> Option<String> {
        let name = kind.name();
        let unit = self.units.unit(kind);
        let value = initiator.value;
        match initiator.operator? {
            Operator::Between => {
                let upper = initiator.value2?;
                Some(format!("{name} {value} - {upper} {unit}"))
            }
            operator => {
                let symbol = operator.symbol()?;
                Some(format!("{name} {symbol} {value} {unit}"))
            }
        }
    }
}

fn describe_schedule(initiator: &Initiator) -> Option<String> {
    let schedule_type = initiator.schedule_type?;
    let value = initiator.schedule_value.as_deref()?;
    Some(specialized_schedule(schedule_type, value).unwrap_or_else(|| format!("{schedule_type}: {value}")))
}

fn specialized_schedule(schedule_type: ScheduleType, value: &str) -> Option<String> {
    let parts = ScheduleParts::parse(schedule_type, value).ok()?;
    let time = parts.time.format("%H:%M");
    match (schedule_type, parts.prefix) {
        (ScheduleType::Daily, None) => Some(format!("Daily at {time}")),
        (ScheduleType::Weekly, Some(day)) => {
            let day = DAY_NAMES.get(day.trim().parse::<usize>().ok()?)?;
            Some(format!("Weekly on {day} at {time}"))
        }
        (ScheduleType::Monthly, Some(day)) => Some(format!("Monthly on day {day} at {time}")),
        (ScheduleType::Yearly, Some(day_month)) => {
            Some(format!("Yearly on {day_month} at {time}"))
        }
        _ => None,
    }
}

/// Describe a single initiator with default units.
#[must_use]
pub fn format_condition(initiator: &Initiator, tags: &[Tag]) -> String {
    ConditionFormatter::new(tags).condition(initiator)
}

/// Describe every initiator of `rule` with default units.
#[must_use]
pub fn format_all_conditions(rule: &Rule, tags: &[Tag]) -> String {
    ConditionFormatter::new(tags).all_conditions(rule)
}
