//! Inputs and outputs of automatic timetable generation and of schedule statistics.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::ids::{ClassId, RoomId, SchoolId, SubjectId, TeacherId};
use crate::time_of_day::{TimeOfDay, TimeRange};
use crate::timetable::{DayOfWeek, PriorityLevel, TimetableEntry};

/// One subject to place in the weekly timetable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SubjectRequirement {
    pub subject_id: SubjectId,
    pub subject_name: String,
    pub teacher_id: TeacherId,
    pub teacher_name: String,
    pub periods_per_week: u32,
    pub duration_minutes: u32,
    #[serde(default)]
    pub priority_level: PriorityLevel,
    /// Room used for every generated period of this subject
    #[serde(default)]
    pub room_id: Option<RoomId>,
    #[serde(default)]
    pub room_name: Option<String>,
}

/// Day-shape constraints for generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GenerationConstraints {
    /// Informational only; slot search does not cap periods per day
    pub max_periods_per_day: u32,
    /// Gap left after every existing period
    pub break_duration_minutes: u32,
    pub lunch_break: Option<TimeRange>,
    pub working_days: Vec<DayOfWeek>,
    pub day_start: TimeOfDay,
    pub day_end: TimeOfDay,
}

impl Default for GenerationConstraints {
    fn default() -> Self {
        Self {
            max_periods_per_day: 8,
            break_duration_minutes: 15,
            lunch_break: None,
            working_days: DayOfWeek::weekdays(),
            day_start: TimeOfDay::new_unchecked(8 * 60),
            day_end: TimeOfDay::new_unchecked(15 * 60),
        }
    }
}

/// A fully resolved generation request for one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GenerateRequest {
    pub school_id: SchoolId,
    pub academic_year: String,
    pub grade_level: String,
    pub section: Option<String>,
    pub class_id: ClassId,
    pub subjects: Vec<SubjectRequirement>,
    pub constraints: GenerationConstraints,
}

/// A subject that could not be given all requested periods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Shortfall {
    pub subject_name: String,
    pub scheduled: u32,
    pub required: u32,
}

/// Result of a generation run. Shortfalls are a normal outcome, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GenerateResult {
    pub created: Vec<TimetableEntry>,
    pub shortfalls: Vec<Shortfall>,
}

/// Denominator used for utilization: the nominal teaching week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatisticsBasis {
    pub days_per_week: u32,
    pub periods_per_day: u32,
}

impl StatisticsBasis {
    /// Periods available in one week, saturating at `u32::MAX`.
    #[inline]
    pub fn weekly_capacity(&self) -> u32 {
        self.days_per_week.saturating_mul(self.periods_per_day)
    }
}

impl Default for StatisticsBasis {
    fn default() -> Self {
        Self {
            days_per_week: 5,
            periods_per_day: 8,
        }
    }
}

/// Aggregates over a scope's entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TimetableStatistics {
    pub total_entries: usize,
    /// Percentage of the weekly period capacity in use
    pub utilization_rate: f64,
    pub average_periods_per_day: f64,
    pub periods_by_day: BTreeMap<String, usize>,
    pub teacher_workload: BTreeMap<String, usize>,
    pub room_utilization: BTreeMap<String, usize>,
    pub conflicts_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekly_capacity() {
        assert_eq!(StatisticsBasis::default().weekly_capacity(), 40);

        let huge = StatisticsBasis {
            days_per_week: u32::MAX,
            periods_per_day: 8,
        };
        assert_eq!(huge.weekly_capacity(), u32::MAX);
    }
}
