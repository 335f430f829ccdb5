//! Minute-of-day values and half-open time ranges.
//!
//! Timetable times are wall-clock times within a single school day. They are
//! displayed and exchanged as zero-padded `HH:MM` strings and stored as an
//! integer minute-of-day column.
//!
//! ```ignore
//! use timetabler_models::time_of_day::{TimeOfDay, overlaps, parse_time};
//!
//! let start = parse_time("09:30")?;
//! assert_eq!(start.minutes(), 570);
//! assert_eq!(start.to_string(), "09:30");
//! ```

use serde::{Deserialize, Serialize};
use sqlx::{
    Database, Decode, Encode, Type,
    postgres::{PgHasArrayType, PgTypeInfo},
};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Number of minutes in a day; valid minute-of-day values are below this.
pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// Errors raised while parsing or constructing time values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimeFormatError {
    #[error("Invalid time format '{0}', expected HH:MM (00:00-23:59)")]
    InvalidTimeFormat(String),

    #[error("Minute of day {0} is out of range")]
    OutOfRange(u32),

    #[error("End time {end} must be after start time {start}")]
    EmptyRange { start: TimeOfDay, end: TimeOfDay },
}

/// A validated wall-clock time, stored as minutes since midnight.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ToSchema)]
#[schema(value_type = String, example = "08:00")]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    /// Create a TimeOfDay without validation.
    ///
    /// The caller must ensure `minutes < 1440`. Intended for constants.
    #[inline]
    pub const fn new_unchecked(minutes: u16) -> Self {
        Self(minutes)
    }

    /// Build from a minute-of-day value in `0..1440`.
    pub fn from_minutes(minutes: u32) -> Result<Self, TimeFormatError> {
        if minutes >= u32::from(MINUTES_PER_DAY) {
            return Err(TimeFormatError::OutOfRange(minutes));
        }
        Ok(Self(minutes as u16))
    }

    /// Build from hour and minute components.
    pub fn from_hm(hour: u32, minute: u32) -> Result<Self, TimeFormatError> {
        if hour > 23 || minute > 59 {
            return Err(TimeFormatError::InvalidTimeFormat(format!(
                "{:02}:{:02}",
                hour, minute
            )));
        }
        Ok(Self((hour * 60 + minute) as u16))
    }

    #[inline]
    pub const fn minutes(self) -> u32 {
        self.0 as u32
    }

    #[inline]
    pub const fn hour(self) -> u32 {
        self.0 as u32 / 60
    }

    #[inline]
    pub const fn minute(self) -> u32 {
        self.0 as u32 % 60
    }

    /// Adds `minutes`, returning `None` when the result would pass midnight.
    pub fn checked_add_minutes(self, minutes: u32) -> Option<Self> {
        Self::from_minutes(self.minutes() + minutes).ok()
    }

    /// Signed distance in minutes from `self` to `later`.
    #[inline]
    pub fn minutes_until(self, later: TimeOfDay) -> i64 {
        i64::from(later.minutes()) - i64::from(self.minutes())
    }
}

/// Parse a strict `HH:MM` string into a [`TimeOfDay`].
pub fn parse_time(s: &str) -> Result<TimeOfDay, TimeFormatError> {
    let invalid = || TimeFormatError::InvalidTimeFormat(s.to_string());

    let bytes = s.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return Err(invalid());
    }
    let (hh, mm) = (&s[0..2], &s[3..5]);
    if !hh.bytes().chain(mm.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let hour: u32 = hh.parse().map_err(|_| invalid())?;
    let minute: u32 = mm.parse().map_err(|_| invalid())?;
    if hour > 23 || minute > 59 {
        return Err(invalid());
    }

    Ok(TimeOfDay((hour * 60 + minute) as u16))
}

/// Render a [`TimeOfDay`] as zero-padded `HH:MM`.
pub fn format_time(time: TimeOfDay) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}

/// Half-open interval overlap: touching endpoints do not overlap.
#[inline]
pub fn overlaps(start_a: TimeOfDay, end_a: TimeOfDay, start_b: TimeOfDay, end_b: TimeOfDay) -> bool {
    start_a < end_b && end_a > start_b
}

impl fmt::Debug for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimeOfDay({})", format_time(*self))
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_time(*self))
    }
}

impl FromStr for TimeOfDay {
    type Err = TimeFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_time(s)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_time(&s).map_err(serde::de::Error::custom)
    }
}

// Stored as an INTEGER minute-of-day column.
impl Type<sqlx::Postgres> for TimeOfDay {
    fn type_info() -> PgTypeInfo {
        <i32 as Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <i32 as Type<sqlx::Postgres>>::compatible(ty)
    }
}

impl<'q> Encode<'q, sqlx::Postgres> for TimeOfDay {
    fn encode_by_ref(
        &self,
        buf: &mut <sqlx::Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        let minutes = i32::from(self.0);
        <i32 as Encode<'q, sqlx::Postgres>>::encode_by_ref(&minutes, buf)
    }
}

impl<'r> Decode<'r, sqlx::Postgres> for TimeOfDay {
    fn decode(
        value: <sqlx::Postgres as Database>::ValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let minutes = <i32 as Decode<'r, sqlx::Postgres>>::decode(value)?;
        let minutes = u32::try_from(minutes)?;
        Ok(Self::from_minutes(minutes)?)
    }
}

impl PgHasArrayType for TimeOfDay {
    fn array_type_info() -> PgTypeInfo {
        <i32 as PgHasArrayType>::array_type_info()
    }
}

/// A half-open `[start, end)` interval within one day; `start < end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "TimeRangeRepr")]
pub struct TimeRange {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

#[derive(Deserialize)]
struct TimeRangeRepr {
    start: TimeOfDay,
    end: TimeOfDay,
}

impl TryFrom<TimeRangeRepr> for TimeRange {
    type Error = TimeFormatError;

    fn try_from(repr: TimeRangeRepr) -> Result<Self, Self::Error> {
        TimeRange::new(repr.start, repr.end)
    }
}

impl TimeRange {
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Result<Self, TimeFormatError> {
        if start >= end {
            return Err(TimeFormatError::EmptyRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parse both endpoints from `HH:MM` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self, TimeFormatError> {
        Self::new(parse_time(start)?, parse_time(end)?)
    }

    /// Interval of `duration` minutes starting at `start`, if it ends before midnight.
    pub fn starting_at(start: TimeOfDay, duration: u32) -> Option<Self> {
        let end = start.checked_add_minutes(duration)?;
        Self::new(start, end).ok()
    }

    #[inline]
    pub fn duration_minutes(&self) -> u32 {
        self.end.minutes() - self.start.minutes()
    }

    #[inline]
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        overlaps(self.start, self.end, other.start, other.end)
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
