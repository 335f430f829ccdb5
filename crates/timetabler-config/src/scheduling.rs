//! Scheduling defaults loaded from the environment.
//!
//! Generation requests may omit any constraint; the omitted ones fall back to
//! these values. Statistics use the configured nominal week as the
//! utilization denominator.
//!
//! # Environment Variables
//!
//! - `SCHEDULE_DAY_START`: first minute of the school day (default `08:00`)
//! - `SCHEDULE_DAY_END`: end of the school day (default `15:00`)
//! - `SCHEDULE_BREAK_MINUTES`: gap after every period (default 15)
//! - `SCHEDULE_MAX_PERIODS_PER_DAY`: informational cap (default 8)
//! - `SCHEDULE_LUNCH_START` / `SCHEDULE_LUNCH_END`: lunch window, both or neither
//! - `SCHEDULE_WORKING_DAYS`: comma list such as `mon,tue,wed` (default Monday-Friday)
//! - `STATS_DAYS_PER_WEEK`: default 5
//! - `STATS_PERIODS_PER_DAY`: default 8
//!
//! Invalid values are logged and replaced by the default.

use std::env;
use std::str::FromStr;

use timetabler_models::{
    DayOfWeek, GenerationConstraints, StatisticsBasis, TimeOfDay, TimeRange, parse_time,
};
use tracing::warn;

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct SchedulingConfig {
    pub generation_defaults: GenerationConstraints,
    pub statistics_basis: StatisticsBasis,
}

impl SchedulingConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = GenerationConstraints::default();
        let basis = StatisticsBasis::default();

        let mut day_start = time_or(&lookup, "SCHEDULE_DAY_START", defaults.day_start);
        let mut day_end = time_or(&lookup, "SCHEDULE_DAY_END", defaults.day_end);
        if day_start >= day_end {
            warn!(
                day_start = %day_start,
                day_end = %day_end,
                "SCHEDULE_DAY_START must be before SCHEDULE_DAY_END, using defaults"
            );
            day_start = defaults.day_start;
            day_end = defaults.day_end;
        }

        let generation_defaults = GenerationConstraints {
            max_periods_per_day: parsed_or(
                &lookup,
                "SCHEDULE_MAX_PERIODS_PER_DAY",
                defaults.max_periods_per_day,
            ),
            break_duration_minutes: parsed_or(
                &lookup,
                "SCHEDULE_BREAK_MINUTES",
                defaults.break_duration_minutes,
            ),
            lunch_break: lunch_break(&lookup),
            working_days: working_days(&lookup).unwrap_or(defaults.working_days),
            day_start,
            day_end,
        };

        let statistics_basis = StatisticsBasis {
            days_per_week: positive_or(&lookup, "STATS_DAYS_PER_WEEK", basis.days_per_week),
            periods_per_day: positive_or(&lookup, "STATS_PERIODS_PER_DAY", basis.periods_per_day),
        };

        Self {
            generation_defaults,
            statistics_basis,
        }
    }
}

fn parsed_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy + std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, default = %default, "Invalid value, using default");
            default
        }),
        None => default,
    }
}

fn positive_or<F>(lookup: &F, key: &str, default: u32) -> u32
where
    F: Fn(&str) -> Option<String>,
{
    match parsed_or(lookup, key, default) {
        0 => {
            warn!(key, default, "Value must be positive, using default");
            default
        }
        value => value,
    }
}

fn time_or<F>(lookup: &F, key: &str, default: TimeOfDay) -> TimeOfDay
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => parse_time(raw.trim()).unwrap_or_else(|e| {
            warn!(key, error = %e, default = %default, "Invalid time, using default");
            default
        }),
        None => default,
    }
}

fn lunch_break<F>(lookup: &F) -> Option<TimeRange>
where
    F: Fn(&str) -> Option<String>,
{
    let start = lookup("SCHEDULE_LUNCH_START");
    let end = lookup("SCHEDULE_LUNCH_END");

    match (start, end) {
        (None, None) => None,
        (Some(start), Some(end)) => match TimeRange::parse(start.trim(), end.trim()) {
            Ok(range) => Some(range),
            Err(e) => {
                warn!(error = %e, "Invalid lunch break, scheduling without one");
                None
            }
        },
        _ => {
            warn!("SCHEDULE_LUNCH_START and SCHEDULE_LUNCH_END must be set together, ignoring");
            None
        }
    }
}

fn working_days<F>(lookup: &F) -> Option<Vec<DayOfWeek>>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup("SCHEDULE_WORKING_DAYS")?;

    let parsed: Result<Vec<DayOfWeek>, String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(DayOfWeek::from_str)
        .collect();

    match parsed {
        Ok(mut days) if !days.is_empty() => {
            days.sort();
            days.dedup();
            Some(days)
        }
        Ok(_) => {
            warn!("SCHEDULE_WORKING_DAYS is empty, using Monday-Friday");
            None
        }
        Err(e) => {
            warn!(error = %e, "Invalid SCHEDULE_WORKING_DAYS, using Monday-Friday");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> SchedulingConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        SchedulingConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = config_from(&[]);
        assert_eq!(config, SchedulingConfig::default());
        assert_eq!(config.generation_defaults.day_start.to_string(), "08:00");
        assert_eq!(config.generation_defaults.day_end.to_string(), "15:00");
        assert_eq!(config.statistics_basis.weekly_capacity(), 40);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("SCHEDULE_DAY_START", "07:30"),
            ("SCHEDULE_DAY_END", "13:00"),
            ("SCHEDULE_BREAK_MINUTES", "10"),
            ("SCHEDULE_LUNCH_START", "11:00"),
            ("SCHEDULE_LUNCH_END", "11:30"),
            ("SCHEDULE_WORKING_DAYS", "sat, mon,Tuesday,mon"),
            ("STATS_PERIODS_PER_DAY", "6"),
        ]);

        let defaults = &config.generation_defaults;
        assert_eq!(defaults.day_start.to_string(), "07:30");
        assert_eq!(defaults.day_end.to_string(), "13:00");
        assert_eq!(defaults.break_duration_minutes, 10);
        assert_eq!(
            defaults.lunch_break,
            Some(TimeRange::parse("11:00", "11:30").unwrap())
        );
        assert_eq!(
            defaults.working_days,
            vec![DayOfWeek::Monday, DayOfWeek::Tuesday, DayOfWeek::Saturday]
        );
        assert_eq!(config.statistics_basis.weekly_capacity(), 30);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[
            ("SCHEDULE_DAY_START", "8am"),
            ("SCHEDULE_BREAK_MINUTES", "-5"),
            ("SCHEDULE_WORKING_DAYS", "mon,funday"),
            ("STATS_DAYS_PER_WEEK", "0"),
        ]);

        assert_eq!(config, SchedulingConfig::default());
    }

    #[test]
    fn test_inverted_day_window_falls_back() {
        let config = config_from(&[
            ("SCHEDULE_DAY_START", "16:00"),
            ("SCHEDULE_DAY_END", "09:00"),
        ]);
        assert_eq!(config.generation_defaults.day_start.to_string(), "08:00");
        assert_eq!(config.generation_defaults.day_end.to_string(), "15:00");
    }

    #[test]
    fn test_half_lunch_is_ignored() {
        let config = config_from(&[("SCHEDULE_LUNCH_START", "12:00")]);
        assert!(config.generation_defaults.lunch_break.is_none());
    }
}
