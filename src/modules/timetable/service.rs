use anyhow::anyhow;
use tracing::{error, info, instrument, warn};

use timetabler_config::SchedulingConfig;
use timetabler_core::{AppError, paginate};
use timetabler_models::dto::{
    AvailableSlotsQuery, AvailableSlotsResponse, CreateTimetableEntryDto, EntryFilterParams,
    GenerateTimetableDto, PaginatedEntriesResponse, UpdateTimetableEntryDto,
};
use timetabler_models::{
    Conflict, EntryId, EntryScope, GenerateResult, GenerationConstraints, StatisticsBasis,
    TimeRange, TimetableEntry, TimetableStatistics, parse_time,
};
use timetabler_observability::{
    track_conflicts_detected, track_entry_created, track_entry_transition, track_generation_run,
};
use timetabler_scheduling::{
    EntryStore, GenerationKey, GenerationLocks, SchedulingError, SlotQuery, TimetableGenerator,
    aggregate_statistics, detect_conflicts, find_available_slots, lifecycle,
};

/// Map a scheduling failure onto its HTTP status.
///
/// Conflicts carry the full list in the error body's `details`.
pub fn scheduling_error(err: impl Into<SchedulingError>) -> AppError {
    match err.into() {
        err @ (SchedulingError::InvalidTimeFormat(_)
        | SchedulingError::Validation(_)
        | SchedulingError::PreconditionFailed(_)) => AppError::bad_request(err),
        SchedulingError::ScheduleConflict(conflicts) => {
            let details = serde_json::to_value(&conflicts).unwrap_or_default();
            AppError::conflict(SchedulingError::ScheduleConflict(conflicts)).with_details(details)
        }
        err @ SchedulingError::UniqueConstraintViolation(_) => AppError::conflict(err),
        err @ SchedulingError::NotFound(_) => AppError::not_found(err),
        err @ SchedulingError::Store(_) => {
            error!(error = %err, "Entry store failure");
            AppError::internal(err)
        }
    }
}

fn record_conflicts(conflicts: &[Conflict]) {
    for conflict in conflicts {
        track_conflicts_detected(conflict.conflict_type.as_str(), 1);
    }
}

/// Turn a non-empty detector result into a `ScheduleConflict` rejection.
fn reject_conflicts(conflicts: Vec<Conflict>) -> Result<(), AppError> {
    if conflicts.is_empty() {
        return Ok(());
    }
    record_conflicts(&conflicts);
    warn!(count = conflicts.len(), "Rejected conflicting timetable entry");
    Err(scheduling_error(SchedulingError::ScheduleConflict(
        conflicts,
    )))
}

pub struct TimetableService;

impl TimetableService {
    #[instrument(skip(store, locks, dto), fields(subject = %dto.subject_name))]
    pub async fn create_entry(
        store: &dyn EntryStore,
        locks: &GenerationLocks,
        dto: CreateTimetableEntryDto,
    ) -> Result<TimetableEntry, AppError> {
        let draft = dto.into_draft().map_err(scheduling_error)?;
        let _guard = locks.acquire(GenerationKey::from(&draft)).await;

        let conflicts = detect_conflicts(&draft, None, store)
            .await
            .map_err(scheduling_error)?;
        reject_conflicts(conflicts)?;

        let entry = store.create(draft).await.map_err(scheduling_error)?;
        track_entry_created("manual");
        info!(entry.id = %entry.id, "Timetable entry created");

        Ok(entry)
    }

    #[instrument(skip(store))]
    pub async fn get_entry(store: &dyn EntryStore, id: EntryId) -> Result<TimetableEntry, AppError> {
        store
            .get(id)
            .await
            .map_err(scheduling_error)?
            .ok_or_else(|| scheduling_error(SchedulingError::NotFound(id)))
    }

    #[instrument(skip(store))]
    pub async fn list_entries(
        store: &dyn EntryStore,
        filters: EntryFilterParams,
    ) -> Result<PaginatedEntriesResponse, AppError> {
        let entries: Vec<TimetableEntry> = store
            .find_by_scope(&filters.scope())
            .await
            .map_err(scheduling_error)?
            .into_iter()
            .filter(|entry| filters.matches(entry))
            .collect();

        let (data, meta) = paginate(entries, &filters.pagination);
        Ok(PaginatedEntriesResponse { data, meta })
    }

    /// Merge `dto` into the entry and re-check it against everything else.
    #[instrument(skip(store, locks, dto))]
    pub async fn update_entry(
        store: &dyn EntryStore,
        locks: &GenerationLocks,
        id: EntryId,
        dto: UpdateTimetableEntryDto,
    ) -> Result<TimetableEntry, AppError> {
        let key = GenerationKey::from(&Self::get_entry(store, id).await?.details);
        let _guard = locks.acquire(key).await;

        // Re-read under the guard.
        let mut entry = Self::get_entry(store, id).await?;
        lifecycle::ensure_editable(&entry).map_err(scheduling_error)?;

        let mut draft = entry.details.clone();
        dto.apply(&mut draft).map_err(scheduling_error)?;

        let conflicts = detect_conflicts(&draft, Some(id), store)
            .await
            .map_err(scheduling_error)?;
        reject_conflicts(conflicts)?;

        entry.details = draft;
        store.update(&entry).await.map_err(scheduling_error)
    }

    #[instrument(skip(store))]
    pub async fn delete_entry(store: &dyn EntryStore, id: EntryId) -> Result<(), AppError> {
        let entry = Self::get_entry(store, id).await?;
        lifecycle::ensure_deletable(&entry).map_err(scheduling_error)?;
        store.delete(id).await.map_err(scheduling_error)
    }

    async fn transition<F>(
        store: &dyn EntryStore,
        id: EntryId,
        apply: F,
    ) -> Result<TimetableEntry, AppError>
    where
        F: FnOnce(&mut TimetableEntry) -> Result<(), SchedulingError>,
    {
        let mut entry = Self::get_entry(store, id).await?;
        apply(&mut entry).map_err(scheduling_error)?;

        let entry = store.update(&entry).await.map_err(scheduling_error)?;
        track_entry_transition(entry.status.as_str());
        info!(entry.id = %entry.id, status = %entry.status, "Timetable entry transitioned");

        Ok(entry)
    }

    pub async fn publish_entry(
        store: &dyn EntryStore,
        id: EntryId,
    ) -> Result<TimetableEntry, AppError> {
        Self::transition(store, id, lifecycle::publish).await
    }

    pub async fn activate_entry(
        store: &dyn EntryStore,
        id: EntryId,
    ) -> Result<TimetableEntry, AppError> {
        Self::transition(store, id, lifecycle::activate).await
    }

    pub async fn archive_entry(
        store: &dyn EntryStore,
        id: EntryId,
    ) -> Result<TimetableEntry, AppError> {
        Self::transition(store, id, lifecycle::archive).await
    }

    pub async fn cancel_entry(
        store: &dyn EntryStore,
        id: EntryId,
        reason: &str,
    ) -> Result<TimetableEntry, AppError> {
        Self::transition(store, id, |entry| lifecycle::cancel(entry, reason)).await
    }

    /// Run the detector for a candidate without writing anything.
    #[instrument(skip(store, dto))]
    pub async fn check_conflicts(
        store: &dyn EntryStore,
        dto: CreateTimetableEntryDto,
    ) -> Result<Vec<Conflict>, AppError> {
        let draft = dto.into_draft().map_err(scheduling_error)?;
        let conflicts = detect_conflicts(&draft, None, store)
            .await
            .map_err(scheduling_error)?;
        record_conflicts(&conflicts);
        Ok(conflicts)
    }

    /// Recompute the stored conflict details against the current timetable.
    #[instrument(skip(store))]
    pub async fn refresh_conflicts(
        store: &dyn EntryStore,
        id: EntryId,
    ) -> Result<TimetableEntry, AppError> {
        let mut entry = Self::get_entry(store, id).await?;
        let conflicts = detect_conflicts(&entry.details, Some(id), store)
            .await
            .map_err(scheduling_error)?;
        record_conflicts(&conflicts);

        lifecycle::apply_conflicts(&mut entry, &conflicts);
        store.update(&entry).await.map_err(scheduling_error)
    }

    #[instrument(skip(store, resolution))]
    pub async fn resolve_conflict(
        store: &dyn EntryStore,
        id: EntryId,
        index: usize,
        resolution: &str,
    ) -> Result<TimetableEntry, AppError> {
        let mut entry = Self::get_entry(store, id).await?;
        lifecycle::resolve_conflict(&mut entry, index, resolution).map_err(scheduling_error)?;
        store.update(&entry).await.map_err(scheduling_error)
    }

    /// Generate a class timetable. Runs for the same (school, year, class) are
    /// serialized so each sees the other's committed entries.
    #[instrument(skip_all, fields(class_id = %dto.class_id, year = %dto.academic_year))]
    pub async fn generate_timetable(
        store: &dyn EntryStore,
        locks: &GenerationLocks,
        defaults: &GenerationConstraints,
        dto: GenerateTimetableDto,
    ) -> Result<GenerateResult, AppError> {
        let request = dto.into_request(defaults).map_err(scheduling_error)?;

        let result = {
            let _guard = locks.acquire(GenerationKey::from(&request)).await;
            TimetableGenerator::new(store)
                .generate(&request)
                .await
                .map_err(scheduling_error)?
        };

        for _ in &result.created {
            track_entry_created("generated");
        }
        track_generation_run(result.created.len(), result.shortfalls.len());

        Ok(result)
    }

    /// Free intervals for one class on one day.
    #[instrument(skip(store, config))]
    pub async fn available_slots(
        store: &dyn EntryStore,
        config: &SchedulingConfig,
        query: AvailableSlotsQuery,
    ) -> Result<AvailableSlotsResponse, AppError> {
        let slot_query = slot_query_for(&config.generation_defaults, &query)?;

        let existing: Vec<TimeRange> = store
            .find_by_class(
                query.class_id,
                query.section.as_deref(),
                query.day_of_week,
                &query.academic_year,
            )
            .await
            .map_err(scheduling_error)?
            .iter()
            .map(TimetableEntry::time_range)
            .collect();

        Ok(AvailableSlotsResponse {
            day_of_week: query.day_of_week,
            slots: find_available_slots(&existing, &slot_query),
        })
    }

    /// Statistics over the scope's non-terminal entries.
    #[instrument(skip(store))]
    pub async fn get_statistics(
        store: &dyn EntryStore,
        basis: &StatisticsBasis,
        scope: EntryScope,
    ) -> Result<TimetableStatistics, AppError> {
        let entries: Vec<TimetableEntry> = store
            .find_by_scope(&scope)
            .await
            .map_err(scheduling_error)?
            .into_iter()
            .filter(TimetableEntry::participates_in_conflicts)
            .collect();

        Ok(aggregate_statistics(&entries, basis))
    }
}

/// Day shape for a slot search: query overrides on top of the configured defaults.
fn slot_query_for(
    defaults: &GenerationConstraints,
    query: &AvailableSlotsQuery,
) -> Result<SlotQuery, AppError> {
    if query.duration_minutes == 0 {
        return Err(scheduling_error(SchedulingError::Validation(
            "duration_minutes must be positive".to_string(),
        )));
    }

    let day_start = match &query.day_start {
        Some(s) => parse_time(s).map_err(scheduling_error)?,
        None => defaults.day_start,
    };
    let day_end = match &query.day_end {
        Some(s) => parse_time(s).map_err(scheduling_error)?,
        None => defaults.day_end,
    };
    TimeRange::new(day_start, day_end).map_err(scheduling_error)?;

    let lunch_break = match (&query.lunch_start, &query.lunch_end) {
        (Some(start), Some(end)) => Some(TimeRange::parse(start, end).map_err(scheduling_error)?),
        (None, None) => defaults.lunch_break,
        _ => {
            return Err(AppError::bad_request(anyhow!(
                "lunch_start and lunch_end must be given together"
            )));
        }
    };

    Ok(SlotQuery {
        day_start,
        day_end,
        duration_minutes: query.duration_minutes,
        gap_minutes: query
            .break_duration_minutes
            .unwrap_or(defaults.break_duration_minutes),
        lunch_break,
    })
}
