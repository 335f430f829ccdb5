//! Aggregates over the entries of one scope.

use std::collections::BTreeMap;

use timetabler_models::{StatisticsBasis, TimetableEntry, TimetableStatistics};

/// Compute statistics for entries already filtered to one scope.
///
/// Utilization and the per-day average are measured against the nominal week
/// in `basis`, not against the days that actually hold entries.
pub fn aggregate_statistics(
    entries: &[TimetableEntry],
    basis: &StatisticsBasis,
) -> TimetableStatistics {
    let total_entries = entries.len();

    let mut periods_by_day: BTreeMap<String, usize> = BTreeMap::new();
    let mut teacher_workload: BTreeMap<String, usize> = BTreeMap::new();
    let mut room_utilization: BTreeMap<String, usize> = BTreeMap::new();
    let mut conflicts_count = 0;

    for entry in entries {
        let details = &entry.details;

        *periods_by_day
            .entry(details.day_of_week.to_string())
            .or_default() += 1;
        *teacher_workload
            .entry(details.teacher_name.clone())
            .or_default() += 1;

        if details.room_id.is_some() {
            let room = details
                .room_name
                .clone()
                .unwrap_or_else(|| "Unknown".to_string());
            *room_utilization.entry(room).or_default() += 1;
        }

        if entry.has_conflicts {
            conflicts_count += 1;
        }
    }

    let capacity = basis.weekly_capacity();
    let utilization_rate = if capacity == 0 {
        0.0
    } else {
        total_entries as f64 / f64::from(capacity) * 100.0
    };

    let scheduled: usize = periods_by_day.values().sum();
    let average_periods_per_day = if basis.days_per_week == 0 {
        0.0
    } else {
        scheduled as f64 / f64::from(basis.days_per_week)
    };

    TimetableStatistics {
        total_entries,
        utilization_rate,
        average_periods_per_day,
        periods_by_day,
        teacher_workload,
        room_utilization,
        conflicts_count,
    }
}
