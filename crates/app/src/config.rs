//! Settings: how rules are presented to the people editing them.
//!
//! Parsed from a TOML document handed over by the embedder. Every field has
//! a default so an empty document is valid.
//!
//! ```toml
//! [display]
//! timezone = "+02:00"   # or "local"
//!
//! [units]
//! temp = "°F"
//! ```

use std::collections::HashMap;

use chrono::FixedOffset;
use serde::Deserialize;

use apiary_domain::condition::{Initiator, MeasurementCatalog, MeasurementKind, ScheduleCodec};

const LOCAL: &str = "local";

/// Top-level settings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Display settings.
    pub display: DisplaySettings,
    /// Unit overrides keyed by measurement code.
    pub units: HashMap<String, String>,
}

/// Display settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// `"local"` or a fixed offset such as `"+02:00"`.
    pub timezone: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            timezone: LOCAL.to_string(),
        }
    }
}

impl Settings {
    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Validation`] for values that do not make sense.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check that the timezone and unit keys are understood.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] naming the offending value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.zone()?;
        self.catalog()?;
        Ok(())
    }

    /// Build the presentation context these settings describe.
    ///
    /// # Errors
    ///
    /// See [`validate`](Self::validate).
    pub fn presentation(&self) -> Result<Presentation, ConfigError> {
        Ok(Presentation {
            zone: self.zone()?,
            units: self.catalog()?,
        })
    }

    fn zone(&self) -> Result<DisplayZone, ConfigError> {
        let timezone = self.display.timezone.trim();
        if timezone.eq_ignore_ascii_case(LOCAL) {
            return Ok(DisplayZone::Local);
        }
        timezone
            .parse::<FixedOffset>()
            .map(DisplayZone::Fixed)
            .map_err(|_| ConfigError::Validation(format!("unknown timezone `{timezone}`")))
    }

    fn catalog(&self) -> Result<MeasurementCatalog, ConfigError> {
        self.units
            .iter()
            .try_fold(MeasurementCatalog::default(), |catalog, (code, unit)| {
                let kind = MeasurementKind::from_code(code).ok_or_else(|| {
                    ConfigError::Validation(format!("unknown measurement `{code}`"))
                })?;
                Ok(catalog.with_unit(kind, unit.clone()))
            })
    }
}

/// The timezone schedules are shown and edited in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayZone {
    /// The host's timezone, with its daylight-saving rules.
    #[default]
    Local,
    Fixed(FixedOffset),
}

impl DisplayZone {
    /// Copy of `initiator` with its schedule value converted to UTC.
    #[must_use]
    pub fn to_utc(self, initiator: &Initiator) -> Initiator {
        match self {
            Self::Local => initiator.to_utc(&ScheduleCodec::local()),
            Self::Fixed(offset) => initiator.to_utc(&ScheduleCodec::new(offset)),
        }
    }

    /// Copy of `initiator` with its schedule value converted from UTC.
    #[must_use]
    pub fn to_local(self, initiator: &Initiator) -> Initiator {
        match self {
            Self::Local => initiator.to_local(&ScheduleCodec::local()),
            Self::Fixed(offset) => initiator.to_local(&ScheduleCodec::new(offset)),
        }
    }
}

/// Resolved settings used by the services.
#[derive(Debug, Clone, Default)]
pub struct Presentation {
    pub zone: DisplayZone,
    pub units: MeasurementCatalog,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse settings")]
    Parse(#[from] toml::de::Error),
    /// Semantic validation failure.
    #[error("invalid settings: {0}")]
    Validation(String),
}
