//! Free-slot discovery for one class on one day.
//!
//! # Algorithm
//!
//! A single left-to-right sweep over the day's bookings, sorted by start:
//!
//! 1. Cursor `t` starts at the beginning of the day.
//! 2. Before each booking, if `booking.start - t >= duration + gap` the slot
//!    `[t, t + duration)` is emitted. The cursor then moves to
//!    `max(t, booking.end + gap)`.
//! 3. After the last booking, `[t, t + duration)` is emitted if it still fits
//!    before the end of the day.
//! 4. Slots touching the lunch break are dropped, never shifted.
//!
//! Only the first fit of each gap is returned, so a gap that spans lunch is
//! lost entirely.

use timetabler_models::{GenerationConstraints, TimeOfDay, TimeRange};

/// Day shape and slot length for one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotQuery {
    pub day_start: TimeOfDay,
    pub day_end: TimeOfDay,
    pub duration_minutes: u32,
    /// Gap required after every existing booking
    pub gap_minutes: u32,
    pub lunch_break: Option<TimeRange>,
}

impl SlotQuery {
    pub fn from_constraints(constraints: &GenerationConstraints, duration_minutes: u32) -> Self {
        Self {
            day_start: constraints.day_start,
            day_end: constraints.day_end,
            duration_minutes,
            gap_minutes: constraints.break_duration_minutes,
            lunch_break: constraints.lunch_break,
        }
    }
}

/// Candidate intervals of exactly `duration_minutes`, earliest first.
pub fn find_available_slots(existing: &[TimeRange], query: &SlotQuery) -> Vec<TimeRange> {
    let duration = i64::from(query.duration_minutes);
    let gap = i64::from(query.gap_minutes);
    let day_end = i64::from(query.day_end.minutes());

    if duration == 0 {
        return Vec::new();
    }

    let mut bookings = existing.to_vec();
    bookings.sort_by_key(|r| r.start);

    let mut starts = Vec::new();
    let mut cursor = i64::from(query.day_start.minutes());

    for booking in &bookings {
        if i64::from(booking.start.minutes()) - cursor >= duration + gap {
            starts.push(cursor);
        }
        cursor = cursor.max(i64::from(booking.end.minutes()) + gap);
    }

    if day_end - cursor >= duration {
        starts.push(cursor);
    }

    starts
        .into_iter()
        .filter(|&start| start + duration <= day_end)
        .filter_map(|start| {
            let start = TimeOfDay::from_minutes(u32::try_from(start).ok()?).ok()?;
            TimeRange::starting_at(start, query.duration_minutes)
        })
        .filter(|slot| query.lunch_break.is_none_or(|lunch| !slot.overlaps(&lunch)))
        .collect()
}
