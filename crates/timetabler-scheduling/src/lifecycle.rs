//! Status transitions and clock-dependent queries for timetable entries.
//!
//! ```text
//! draft ──publish──▶ published ──activate──▶ active
//!                        │                     │
//!                        └──────archive────────┴──▶ archived
//!
//! any status except cancelled ──cancel──▶ cancelled
//! ```
//!
//! The functions mutate the entry in place and leave persistence to the
//! caller. Queries that depend on the current time take it as an argument.

use chrono::{Datelike, NaiveDateTime, Timelike};

use timetabler_models::{
    Conflict, ConflictDetail, DayOfWeek, EntryStatus, TimeOfDay, TimetableEntry,
};

use crate::error::SchedulingError;

fn transition(
    entry: &mut TimetableEntry,
    allowed_from: &[EntryStatus],
    to: EntryStatus,
    action: &str,
) -> Result<(), SchedulingError> {
    if !allowed_from.contains(&entry.status) {
        return Err(SchedulingError::PreconditionFailed(format!(
            "Cannot {} an entry with status {}",
            action, entry.status
        )));
    }
    entry.status = to;
    Ok(())
}

pub fn publish(entry: &mut TimetableEntry) -> Result<(), SchedulingError> {
    transition(entry, &[EntryStatus::Draft], EntryStatus::Published, "publish")
}

pub fn activate(entry: &mut TimetableEntry) -> Result<(), SchedulingError> {
    transition(
        entry,
        &[EntryStatus::Published],
        EntryStatus::Active,
        "activate",
    )
}

pub fn archive(entry: &mut TimetableEntry) -> Result<(), SchedulingError> {
    transition(
        entry,
        &[EntryStatus::Published, EntryStatus::Active],
        EntryStatus::Archived,
        "archive",
    )
}

/// Cancel the entry. Cancelled is terminal.
pub fn cancel(entry: &mut TimetableEntry, reason: &str) -> Result<(), SchedulingError> {
    if entry.status == EntryStatus::Cancelled {
        return Err(SchedulingError::PreconditionFailed(
            "Entry is already cancelled".to_string(),
        ));
    }
    entry.status = EntryStatus::Cancelled;
    entry.is_cancelled = true;
    entry.cancellation_reason = Some(reason.to_string());
    Ok(())
}

/// Active entries must be archived or cancelled before they can be deleted.
pub fn ensure_deletable(entry: &TimetableEntry) -> Result<(), SchedulingError> {
    if entry.status == EntryStatus::Active {
        return Err(SchedulingError::PreconditionFailed(
            "Cannot delete an active timetable entry".to_string(),
        ));
    }
    Ok(())
}

/// Updates are only accepted while the entry still occupies its slot.
pub fn ensure_editable(entry: &TimetableEntry) -> Result<(), SchedulingError> {
    if !entry.status.is_non_terminal() {
        return Err(SchedulingError::PreconditionFailed(format!(
            "Cannot update an entry with status {}",
            entry.status
        )));
    }
    Ok(())
}

/// The entry recurs on `now`'s weekday and has not passed its recurrence end.
pub fn is_today(entry: &TimetableEntry, now: NaiveDateTime) -> bool {
    if entry.is_cancelled {
        return false;
    }
    let today = now.date();
    if entry
        .details
        .recurrence_end_date
        .is_some_and(|end| today > end)
    {
        return false;
    }
    entry.details.day_of_week == DayOfWeek::from(today.weekday())
}

/// `now` falls inside today's occurrence, start inclusive and end exclusive.
pub fn is_in_progress(entry: &TimetableEntry, now: NaiveDateTime) -> bool {
    if !is_today(entry, now) {
        return false;
    }
    let minute = TimeOfDay::new_unchecked((now.time().num_seconds_from_midnight() / 60) as u16);
    entry.details.start_time <= minute && minute < entry.details.end_time
}

/// Replace the conflict details with a fresh detector run.
///
/// A resolution is carried over when the new conflict has the same type and
/// description as a previously resolved one.
pub fn apply_conflicts(entry: &mut TimetableEntry, conflicts: &[Conflict]) {
    let previous = std::mem::take(&mut entry.conflict_details);

    entry.conflict_details = conflicts
        .iter()
        .map(|conflict| {
            let mut detail = ConflictDetail::from(conflict);
            detail.resolution = previous
                .iter()
                .find(|old| {
                    old.conflict_type == detail.conflict_type
                        && old.description == detail.description
                })
                .and_then(|old| old.resolution.clone());
            detail
        })
        .collect();

    recompute_has_conflicts(entry);
}

pub fn resolve_conflict(
    entry: &mut TimetableEntry,
    index: usize,
    resolution: &str,
) -> Result<(), SchedulingError> {
    let count = entry.conflict_details.len();
    let detail = entry.conflict_details.get_mut(index).ok_or_else(|| {
        SchedulingError::Validation(format!(
            "Conflict index {} out of range (entry has {} conflicts)",
            index, count
        ))
    })?;
    detail.resolution = Some(resolution.to_string());
    recompute_has_conflicts(entry);
    Ok(())
}

/// `has_conflicts` holds iff some detail is still unresolved.
pub fn recompute_has_conflicts(entry: &mut TimetableEntry) {
    entry.has_conflicts = entry
        .conflict_details
        .iter()
        .any(|d| d.resolution.is_none());
}
