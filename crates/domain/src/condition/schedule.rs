//! Recurring schedules and the local ↔ UTC codec for their values.
//!
//! Schedule values carry an optional calendar prefix followed by a
//! time-of-day:
//!
//! | type    | value           |
//! |---------|-----------------|
//! | daily   | `HH:MM`         |
//! | weekly  | `D,HH:MM`       |
//! | monthly | `DD,HH:MM`      |
//! | yearly  | `DD/MM,HH:MM`   |
//!
//! Only the time-of-day is converted. The calendar prefix is copied
//! verbatim, so a conversion that crosses midnight keeps the original day.

use chrono::{DateTime, Local, NaiveTime, Offset, TimeDelta, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// How often a schedule condition fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleType {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl std::fmt::Display for ScheduleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        })
    }
}

/// Why a schedule value could not be converted.
///
/// The `Display` output is the placeholder text presentation layers show
/// in place of the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleFormatError {
    /// Wrong number of tokens, or a component is not a number.
    #[error("Invalid Time Format")]
    InvalidFormat,
    /// Hour or minute out of range.
    #[error("Invalid Time Values")]
    InvalidValues,
}

/// A schedule value split into its verbatim calendar prefix and its time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleParts<'a> {
    /// `D`, `DD` or `DD/MM`; `None` for daily schedules.
    pub prefix: Option<&'a str>,
    pub time: NaiveTime,
}

impl<'a> ScheduleParts<'a> {
    /// Split and validate `value` according to `schedule_type`.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleFormatError::InvalidFormat`] when the token count is
    /// wrong or a component is not numeric, and
    /// [`ScheduleFormatError::InvalidValues`] when hour or minute is out of range.
    pub fn parse(schedule_type: ScheduleType, value: &'a str) -> Result<Self, ScheduleFormatError> {
        let (prefix, time) = match schedule_type {
            ScheduleType::Daily => (None, value),
            ScheduleType::Weekly | ScheduleType::Monthly | ScheduleType::Yearly => {
                let mut tokens = value.split(',');
                match (tokens.next(), tokens.next(), tokens.next()) {
                    (Some(prefix), Some(time), None) => (Some(prefix), time),
                    _ => return Err(ScheduleFormatError::InvalidFormat),
                }
            }
        };
        Ok(Self {
            prefix,
            time: parse_time_of_day(time)?,
        })
    }

    fn render(&self, time: NaiveTime) -> String {
        let hhmm = time.format("%H:%M");
        match self.prefix {
            Some(prefix) => format!("{prefix},{hhmm}"),
            None => hhmm.to_string(),
        }
    }
}

/// Parse an `HH:MM` token.
///
/// # Errors
///
/// See [`ScheduleParts::parse`].
pub fn parse_time_of_day(text: &str) -> Result<NaiveTime, ScheduleFormatError> {
    let mut tokens = text.split(':');
    let (Some(hour), Some(minute), None) = (tokens.next(), tokens.next(), tokens.next()) else {
        return Err(ScheduleFormatError::InvalidFormat);
    };
    let hour: i32 = hour
        .trim()
        .parse()
        .map_err(|_| ScheduleFormatError::InvalidFormat)?;
    let minute: i32 = minute
        .trim()
        .parse()
        .map_err(|_| ScheduleFormatError::InvalidFormat)?;
    if !(0..=23).contains(&hour) || !(0..=59).contains(&minute) {
        return Err(ScheduleFormatError::InvalidValues);
    }
    let (Ok(hour), Ok(minute)) = (u32::try_from(hour), u32::try_from(minute)) else {
        return Err(ScheduleFormatError::InvalidValues);
    };
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or(ScheduleFormatError::InvalidValues)
}

/// Converts schedule values between a user's timezone and UTC.
///
/// Conversions anchor the time-of-day to the current date (or to a fixed
/// instant set with [`anchored_at`](Self::anchored_at)) so the offset in
/// effect on that date is used.
#[derive(Debug, Clone)]
pub struct ScheduleCodec<Tz: TimeZone> {
    tz: Tz,
    anchor: Option<DateTime<Utc>>,
}

impl ScheduleCodec<Local> {
    /// Codec for the host's local timezone.
    #[must_use]
    pub fn local() -> Self {
        Self::new(Local)
    }
}

impl<Tz: TimeZone> ScheduleCodec<Tz> {
    /// Codec acting in `tz`.
    #[must_use]
    pub fn new(tz: Tz) -> Self {
        Self { tz, anchor: None }
    }

    /// Use `instant` instead of the wall clock as the conversion anchor.
    #[must_use]
    pub fn anchored_at(mut self, instant: DateTime<Utc>) -> Self {
        self.anchor = Some(instant);
        self
    }

    fn anchor(&self) -> DateTime<Utc> {
        self.anchor.unwrap_or_else(Utc::now)
    }

    /// Convert a local schedule value to its UTC form.
    ///
    /// Empty input is returned unchanged.
    ///
    /// # Errors
    ///
    /// See [`ScheduleParts::parse`].
    pub fn try_encode_to_utc(
        &self,
        schedule_type: ScheduleType,
        local_value: &str,
    ) -> Result<String, ScheduleFormatError> {
        if local_value.is_empty() {
            return Ok(String::new());
        }
        let parts = ScheduleParts::parse(schedule_type, local_value)?;
        Ok(parts.render(self.local_to_utc(parts.time)))
    }

    /// Convert a UTC schedule value to the codec's timezone.
    ///
    /// Empty input is returned unchanged.
    ///
    /// # Errors
    ///
    /// See [`ScheduleParts::parse`].
    pub fn try_decode_from_utc(
        &self,
        schedule_type: ScheduleType,
        utc_value: &str,
    ) -> Result<String, ScheduleFormatError> {
        if utc_value.is_empty() {
            return Ok(String::new());
        }
        let parts = ScheduleParts::parse(schedule_type, utc_value)?;
        Ok(parts.render(self.utc_to_local(parts.time)))
    }

    /// Like [`try_encode_to_utc`](Self::try_encode_to_utc) but yields the
    /// placeholder text instead of an error.
    #[must_use]
    pub fn encode_to_utc(&self, schedule_type: ScheduleType, local_value: &str) -> String {
        self.try_encode_to_utc(schedule_type, local_value)
            .unwrap_or_else(|err| err.to_string())
    }

    /// Like [`try_decode_from_utc`](Self::try_decode_from_utc) but yields the
    /// placeholder text instead of an error.
    #[must_use]
    pub fn decode_from_utc(&self, schedule_type: ScheduleType, utc_value: &str) -> String {
        self.try_decode_from_utc(schedule_type, utc_value)
            .unwrap_or_else(|err| err.to_string())
    }

    fn local_to_utc(&self, time: NaiveTime) -> NaiveTime {
        let anchor = self.anchor();
        let wall = anchor.with_timezone(&self.tz).date_naive().and_time(time);
        if let Some(local) = self.tz.from_local_datetime(&wall).earliest() {
            return local.naive_utc().time();
        }
        // Wall time skipped by a DST transition: apply the offset in effect at the anchor.
        let offset = self.tz.offset_from_utc_datetime(&anchor.naive_utc()).fix();
        (wall - TimeDelta::seconds(i64::from(offset.local_minus_utc()))).time()
    }

    fn utc_to_local(&self, time: NaiveTime) -> NaiveTime {
        let instant = Utc.from_utc_datetime(&self.anchor().date_naive().and_time(time));
        instant.with_timezone(&self.tz).time()
    }
}

/// Encode a local schedule value to UTC using the host timezone.
#[must_use]
pub fn encode_to_utc(schedule_type: ScheduleType, local_value: &str) -> String {
    ScheduleCodec::local().encode_to_utc(schedule_type, local_value)
}

/// Decode a UTC schedule value to the host timezone.
#[must_use]
pub fn decode_from_utc(schedule_type: ScheduleType, utc_value: &str) -> String {
    ScheduleCodec::local().decode_from_utc(schedule_type, utc_value)
}
