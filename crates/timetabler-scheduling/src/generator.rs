//! Greedy weekly timetable generation for one class.
//!
//! # Algorithm
//!
//! 1. Sort subjects by priority, highest first. The sort is stable, so
//!    subjects of equal priority keep their request order.
//! 2. For each subject, walk the working days in request order. For each day,
//!    load the class's bookings and run the slot finder.
//! 3. Check every candidate slot against the live store and commit it as a
//!    draft when it is conflict free. Later candidates see earlier commits.
//! 4. Stop once the subject has its weekly periods; otherwise report a
//!    shortfall and move on.
//!
//! There is no backtracking. The outcome depends on subject priority and day
//! order, and is deterministic for identical inputs and store contents.

use tracing::{debug, info, instrument, warn};

use timetabler_models::{
    DayOfWeek, GenerateRequest, GenerateResult, Shortfall, SubjectRequirement, TimeRange,
    TimetableEntry, TimetableEntryDraft,
};

use crate::conflicts::detect_conflicts;
use crate::error::{SchedulingError, StoreError};
use crate::slots::{SlotQuery, find_available_slots};
use crate::store::EntryStore;

pub struct TimetableGenerator<'a> {
    store: &'a dyn EntryStore,
}

impl<'a> TimetableGenerator<'a> {
    pub fn new(store: &'a dyn EntryStore) -> Self {
        Self { store }
    }

    /// Place every subject of `request`, committing entries as it goes.
    ///
    /// Shortfalls are part of the result. Only store failures other than a
    /// slot-uniqueness rejection abort the run; entries committed before the
    /// failure stay committed.
    #[instrument(
        skip(self, request),
        fields(class_id = %request.class_id, year = %request.academic_year, subjects = request.subjects.len())
    )]
    pub async fn generate(
        &self,
        request: &GenerateRequest,
    ) -> Result<GenerateResult, SchedulingError> {
        let mut subjects: Vec<&SubjectRequirement> = request.subjects.iter().collect();
        subjects.sort_by(|a, b| b.priority_level.cmp(&a.priority_level));

        let mut created = Vec::new();
        let mut shortfalls = Vec::new();

        for subject in subjects {
            let placed = self.place_subject(request, subject).await?;
            let scheduled = placed.len() as u32;

            if scheduled < subject.periods_per_week {
                warn!(
                    subject = %subject.subject_name,
                    scheduled,
                    required = subject.periods_per_week,
                    "Could not place every period"
                );
                shortfalls.push(Shortfall {
                    subject_name: subject.subject_name.clone(),
                    scheduled,
                    required: subject.periods_per_week,
                });
            }
            created.extend(placed);
        }

        info!(
            created = created.len(),
            shortfalls = shortfalls.len(),
            "Timetable generation finished"
        );

        Ok(GenerateResult {
            created,
            shortfalls,
        })
    }

    async fn place_subject(
        &self,
        request: &GenerateRequest,
        subject: &SubjectRequirement,
    ) -> Result<Vec<TimetableEntry>, SchedulingError> {
        let required = subject.periods_per_week as usize;
        let query = SlotQuery::from_constraints(&request.constraints, subject.duration_minutes);
        let mut placed = Vec::new();

        for &day in &request.constraints.working_days {
            if placed.len() >= required {
                break;
            }

            let bookings: Vec<TimeRange> = self
                .store
                .find_by_class(
                    request.class_id,
                    request.section.as_deref(),
                    day,
                    &request.academic_year,
                )
                .await?
                .iter()
                .map(TimetableEntry::time_range)
                .collect();

            for slot in find_available_slots(&bookings, &query) {
                if placed.len() >= required {
                    break;
                }

                let candidate = candidate_entry(request, subject, day, slot);
                let conflicts = detect_conflicts(&candidate, None, self.store).await?;
                if !conflicts.is_empty() {
                    debug!(
                        subject = %subject.subject_name,
                        %day,
                        slot = %slot,
                        conflicts = conflicts.len(),
                        "Skipping conflicting slot"
                    );
                    continue;
                }

                match self.store.create(candidate).await {
                    Ok(entry) => placed.push(entry),
                    Err(StoreError::UniqueConstraintViolation(key)) => {
                        warn!(%key, "Slot taken concurrently, skipping");
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }

        Ok(placed)
    }
}

fn candidate_entry(
    request: &GenerateRequest,
    subject: &SubjectRequirement,
    day: DayOfWeek,
    slot: TimeRange,
) -> TimetableEntryDraft {
    TimetableEntryDraft {
        school_id: request.school_id,
        academic_year: request.academic_year.clone(),
        grade_level: request.grade_level.clone(),
        section: request.section.clone(),
        class_id: request.class_id,
        subject_id: subject.subject_id,
        subject_name: subject.subject_name.clone(),
        teacher_id: subject.teacher_id,
        teacher_name: subject.teacher_name.clone(),
        day_of_week: day,
        start_time: slot.start,
        end_time: slot.end,
        duration_minutes: slot.duration_minutes() as i32,
        period_number: None,
        room_id: subject.room_id,
        room_name: subject.room_name.clone(),
        room_capacity: None,
        room_type: None,
        equipment: Vec::new(),
        priority_level: subject.priority_level,
        is_fixed: false,
        recurrence_type: Default::default(),
        recurrence_end_date: None,
    }
}
