//! Measurement catalog and comparison operators.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The fixed catalog of sensor measurements a condition can watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementKind {
    Temp,
    Humidity,
    Weight,
    Sound,
    Co2,
    Pressure,
    Battery,
    Light,
    Wind,
    Rain,
}

impl MeasurementKind {
    /// Every catalog entry, in display order.
    pub const ALL: [Self; 10] = [
        Self::Temp,
        Self::Humidity,
        Self::Weight,
        Self::Sound,
        Self::Co2,
        Self::Pressure,
        Self::Battery,
        Self::Light,
        Self::Wind,
        Self::Rain,
    ];

    /// Wire code used in the initiator `type` field.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Temp => "temp",
            Self::Humidity => "humidity",
            Self::Weight => "weight",
            Self::Sound => "sound",
            Self::Co2 => "co2",
            Self::Pressure => "pressure",
            Self::Battery => "battery",
            Self::Light => "light",
            Self::Wind => "wind",
            Self::Rain => "rain",
        }
    }

    /// Look up a catalog entry by its wire code.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }

    /// Human-readable name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Temp => "Temperature",
            Self::Humidity => "Humidity",
            Self::Weight => "Weight",
            Self::Sound => "Sound",
            Self::Co2 => "CO₂",
            Self::Pressure => "Pressure",
            Self::Battery => "Battery",
            Self::Light => "Light",
            Self::Wind => "Wind",
            Self::Rain => "Rain",
        }
    }

    /// Unit shown when no deployment override exists.
    #[must_use]
    pub fn default_unit(self) -> &'static str {
        match self {
            Self::Temp => "°C",
            Self::Humidity | Self::Battery => "%",
            Self::Weight => "kg",
            Self::Sound => "dB",
            Self::Co2 => "ppm",
            Self::Pressure => "hPa",
            Self::Light => "lux",
            Self::Wind => "km/h",
            Self::Rain => "mm",
        }
    }
}

impl std::fmt::Display for MeasurementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Display units per measurement, with per-deployment overrides.
#[derive(Debug, Clone, Default)]
pub struct MeasurementCatalog {
    units: HashMap<MeasurementKind, String>,
}

impl MeasurementCatalog {
    /// Override the unit shown for `kind`.
    #[must_use]
    pub fn with_unit(mut self, kind: MeasurementKind, unit: impl Into<String>) -> Self {
        self.units.insert(kind, unit.into());
        self
    }

    /// Unit for `kind`, falling back to the catalog default.
    #[must_use]
    pub fn unit(&self, kind: MeasurementKind) -> &str {
        self.units
            .get(&kind)
            .map_or_else(|| kind.default_unit(), String::as_str)
    }
}

/// Comparison applied to a measurement reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Gt,
    Lt,
    Eq,
    Gte,
    Lte,
    Neq,
    Between,
    Change,
    /// Any operator string the catalog does not know.
    #[serde(other)]
    Unsupported,
}

impl Operator {
    /// Symbol used in condition descriptions; `None` for `between` and
    /// unsupported operators, which have no infix form.
    #[must_use]
    pub fn symbol(self) -> Option<&'static str> {
        match self {
            Self::Gt => Some(">"),
            Self::Lt => Some("<"),
            Self::Eq => Some("="),
            Self::Gte => Some("≥"),
            Self::Lte => Some("≤"),
            Self::Neq => Some("≠"),
            Self::Change => Some("changes by"),
            Self::Between | Self::Unsupported => None,
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            Self::Gt => "gt",
            Self::Lt => "lt",
            Self::Eq => "eq",
            Self::Gte => "gte",
            Self::Lte => "lte",
            Self::Neq => "neq",
            Self::Between => "between",
            Self::Change => "change",
            Self::Unsupported => "unsupported",
        };
        f.write_str(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_resolve_every_kind_from_its_code() {
        for kind in MeasurementKind::ALL {
            assert_eq!(MeasurementKind::from_code(kind.code()), Some(kind));
        }
    }

    #[test]
    fn should_return_none_for_unknown_code() {
        assert_eq!(MeasurementKind::from_code("radiation"), None);
    }

    #[test]
    fn should_use_default_unit_without_override() {
        let catalog = MeasurementCatalog::default();
        assert_eq!(catalog.unit(MeasurementKind::Temp), "°C");
    }

    #[test]
    fn should_prefer_unit_override() {
        let catalog = MeasurementCatalog::default().with_unit(MeasurementKind::Weight, "lb");
        assert_eq!(catalog.unit(MeasurementKind::Weight), "lb");
        assert_eq!(catalog.unit(MeasurementKind::Sound), "dB");
    }

    #[test]
    fn should_deserialize_unknown_operator_as_unsupported() {
        let op: Operator = serde_json::from_str("\"approx\"").unwrap();
        assert_eq!(op, Operator::Unsupported);
        let op: Operator = serde_json::from_str("\"gte\"").unwrap();
        assert_eq!(op, Operator::Gte);
    }

    #[test]
    fn should_have_no_symbol_for_between() {
        assert_eq!(Operator::Between.symbol(), None);
        assert_eq!(Operator::Neq.symbol(), Some("≠"));
    }
}
