use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use timetabler_core::AppError;
use timetabler_models::dto::{
    AvailableSlotsQuery, AvailableSlotsResponse, CancelEntryDto, ConflictCheckResponse,
    CreateTimetableEntryDto, EntryFilterParams, GenerateTimetableDto, PaginatedEntriesResponse,
    ResolveConflictDto, StatisticsQuery, UpdateTimetableEntryDto,
};
use timetabler_models::{EntryId, GenerateResult, TimetableEntry, TimetableStatistics};

use crate::modules::timetable::service::TimetableService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/timetable/entries",
    request_body = CreateTimetableEntryDto,
    responses(
        (status = 201, description = "Entry created as draft", body = TimetableEntry),
        (status = 400, description = "Invalid time format or inconsistent times"),
        (status = 409, description = "Conflicts with existing entries (listed in details)"),
        (status = 422, description = "Validation failed")
    ),
    tag = "Timetable"
)]
#[instrument(skip(state, dto))]
pub async fn create_entry(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateTimetableEntryDto>,
) -> Result<(StatusCode, Json<TimetableEntry>), AppError> {
    let entry = TimetableService::create_entry(state.store.as_ref(), &state.locks, dto).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[utoipa::path(
    get,
    path = "/api/timetable/entries",
    params(EntryFilterParams),
    responses(
        (status = 200, description = "Entries of the scope, ordered by day then start time", body = PaginatedEntriesResponse)
    ),
    tag = "Timetable"
)]
#[instrument(skip(state))]
pub async fn get_entries(
    State(state): State<AppState>,
    Query(filters): Query<EntryFilterParams>,
) -> Result<Json<PaginatedEntriesResponse>, AppError> {
    let entries = TimetableService::list_entries(state.store.as_ref(), filters).await?;
    Ok(Json(entries))
}

#[utoipa::path(
    get,
    path = "/api/timetable/entries/{id}",
    params(
        ("id" = EntryId, Path, description = "Entry ID")
    ),
    responses(
        (status = 200, description = "Entry details", body = TimetableEntry),
        (status = 404, description = "Entry not found")
    ),
    tag = "Timetable"
)]
#[instrument(skip(state))]
pub async fn get_entry(
    State(state): State<AppState>,
    Path(id): Path<EntryId>,
) -> Result<Json<TimetableEntry>, AppError> {
    let entry = TimetableService::get_entry(state.store.as_ref(), id).await?;
    Ok(Json(entry))
}

#[utoipa::path(
    put,
    path = "/api/timetable/entries/{id}",
    params(
        ("id" = EntryId, Path, description = "Entry ID")
    ),
    request_body = UpdateTimetableEntryDto,
    responses(
        (status = 200, description = "Entry updated", body = TimetableEntry),
        (status = 400, description = "Invalid times or entry is cancelled/archived"),
        (status = 404, description = "Entry not found"),
        (status = 409, description = "Update would conflict with existing entries")
    ),
    tag = "Timetable"
)]
#[instrument(skip(state, dto))]
pub async fn update_entry(
    State(state): State<AppState>,
    Path(id): Path<EntryId>,
    ValidatedJson(dto): ValidatedJson<UpdateTimetableEntryDto>,
) -> Result<Json<TimetableEntry>, AppError> {
    let entry = TimetableService::update_entry(state.store.as_ref(), &state.locks, id, dto).await?;
    Ok(Json(entry))
}

#[utoipa::path(
    delete,
    path = "/api/timetable/entries/{id}",
    params(
        ("id" = EntryId, Path, description = "Entry ID")
    ),
    responses(
        (status = 204, description = "Entry deleted"),
        (status = 400, description = "Active entries cannot be deleted"),
        (status = 404, description = "Entry not found")
    ),
    tag = "Timetable"
)]
#[instrument(skip(state))]
pub async fn delete_entry(
    State(state): State<AppState>,
    Path(id): Path<EntryId>,
) -> Result<StatusCode, AppError> {
    TimetableService::delete_entry(state.store.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/timetable/entries/{id}/publish",
    params(("id" = EntryId, Path, description = "Entry ID")),
    responses(
        (status = 200, description = "Entry published", body = TimetableEntry),
        (status = 400, description = "Entry is not a draft"),
        (status = 404, description = "Entry not found")
    ),
    tag = "Timetable"
)]
#[instrument(skip(state))]
pub async fn publish_entry(
    State(state): State<AppState>,
    Path(id): Path<EntryId>,
) -> Result<Json<TimetableEntry>, AppError> {
    let entry = TimetableService::publish_entry(state.store.as_ref(), id).await?;
    Ok(Json(entry))
}

#[utoipa::path(
    post,
    path = "/api/timetable/entries/{id}/activate",
    params(("id" = EntryId, Path, description = "Entry ID")),
    responses(
        (status = 200, description = "Entry activated", body = TimetableEntry),
        (status = 400, description = "Entry is not published"),
        (status = 404, description = "Entry not found")
    ),
    tag = "Timetable"
)]
#[instrument(skip(state))]
pub async fn activate_entry(
    State(state): State<AppState>,
    Path(id): Path<EntryId>,
) -> Result<Json<TimetableEntry>, AppError> {
    let entry = TimetableService::activate_entry(state.store.as_ref(), id).await?;
    Ok(Json(entry))
}

#[utoipa::path(
    post,
    path = "/api/timetable/entries/{id}/archive",
    params(("id" = EntryId, Path, description = "Entry ID")),
    responses(
        (status = 200, description = "Entry archived", body = TimetableEntry),
        (status = 400, description = "Entry is neither published nor active"),
        (status = 404, description = "Entry not found")
    ),
    tag = "Timetable"
)]
#[instrument(skip(state))]
pub async fn archive_entry(
    State(state): State<AppState>,
    Path(id): Path<EntryId>,
) -> Result<Json<TimetableEntry>, AppError> {
    let entry = TimetableService::archive_entry(state.store.as_ref(), id).await?;
    Ok(Json(entry))
}

#[utoipa::path(
    post,
    path = "/api/timetable/entries/{id}/cancel",
    params(("id" = EntryId, Path, description = "Entry ID")),
    request_body = CancelEntryDto,
    responses(
        (status = 200, description = "Entry cancelled", body = TimetableEntry),
        (status = 400, description = "Entry is already cancelled"),
        (status = 404, description = "Entry not found")
    ),
    tag = "Timetable"
)]
#[instrument(skip(state, dto))]
pub async fn cancel_entry(
    State(state): State<AppState>,
    Path(id): Path<EntryId>,
    ValidatedJson(dto): ValidatedJson<CancelEntryDto>,
) -> Result<Json<TimetableEntry>, AppError> {
    let entry = TimetableService::cancel_entry(state.store.as_ref(), id, &dto.reason).await?;
    Ok(Json(entry))
}

#[utoipa::path(
    post,
    path = "/api/timetable/entries/{id}/conflicts/refresh",
    params(("id" = EntryId, Path, description = "Entry ID")),
    responses(
        (status = 200, description = "Conflict details recomputed", body = TimetableEntry),
        (status = 404, description = "Entry not found")
    ),
    tag = "Timetable"
)]
#[instrument(skip(state))]
pub async fn refresh_conflicts(
    State(state): State<AppState>,
    Path(id): Path<EntryId>,
) -> Result<Json<TimetableEntry>, AppError> {
    let entry = TimetableService::refresh_conflicts(state.store.as_ref(), id).await?;
    Ok(Json(entry))
}

#[utoipa::path(
    post,
    path = "/api/timetable/entries/{id}/conflicts/{index}/resolve",
    params(
        ("id" = EntryId, Path, description = "Entry ID"),
        ("index" = usize, Path, description = "Position in conflict_details")
    ),
    request_body = ResolveConflictDto,
    responses(
        (status = 200, description = "Conflict marked resolved", body = TimetableEntry),
        (status = 400, description = "Index out of range"),
        (status = 404, description = "Entry not found")
    ),
    tag = "Timetable"
)]
#[instrument(skip(state, dto))]
pub async fn resolve_conflict(
    State(state): State<AppState>,
    Path((id, index)): Path<(EntryId, usize)>,
    ValidatedJson(dto): ValidatedJson<ResolveConflictDto>,
) -> Result<Json<TimetableEntry>, AppError> {
    let entry =
        TimetableService::resolve_conflict(state.store.as_ref(), id, index, &dto.resolution)
            .await?;
    Ok(Json(entry))
}

#[utoipa::path(
    post,
    path = "/api/timetable/conflicts/check",
    request_body = CreateTimetableEntryDto,
    responses(
        (status = 200, description = "Conflicts the candidate would cause; nothing is stored", body = ConflictCheckResponse),
        (status = 400, description = "Invalid time format")
    ),
    tag = "Timetable"
)]
#[instrument(skip(state, dto))]
pub async fn check_conflicts(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateTimetableEntryDto>,
) -> Result<Json<ConflictCheckResponse>, AppError> {
    let conflicts = TimetableService::check_conflicts(state.store.as_ref(), dto).await?;
    Ok(Json(ConflictCheckResponse {
        has_conflicts: !conflicts.is_empty(),
        conflicts,
    }))
}

#[utoipa::path(
    post,
    path = "/api/timetable/generate",
    request_body = GenerateTimetableDto,
    responses(
        (status = 200, description = "Created entries and any shortfalls", body = GenerateResult),
        (status = 400, description = "Invalid time format in constraints"),
        (status = 422, description = "Validation failed")
    ),
    tag = "Timetable"
)]
#[instrument(skip(state, dto))]
pub async fn generate_timetable(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<GenerateTimetableDto>,
) -> Result<Json<GenerateResult>, AppError> {
    let result = TimetableService::generate_timetable(
        state.store.as_ref(),
        &state.locks,
        &state.scheduling.generation_defaults,
        dto,
    )
    .await?;
    Ok(Json(result))
}

#[utoipa::path(
    get,
    path = "/api/timetable/available-slots",
    params(AvailableSlotsQuery),
    responses(
        (status = 200, description = "Free slots for the class on that day", body = AvailableSlotsResponse),
        (status = 400, description = "Invalid query")
    ),
    tag = "Timetable"
)]
#[instrument(skip(state))]
pub async fn get_available_slots(
    State(state): State<AppState>,
    Query(query): Query<AvailableSlotsQuery>,
) -> Result<Json<AvailableSlotsResponse>, AppError> {
    let slots =
        TimetableService::available_slots(state.store.as_ref(), &state.scheduling, query).await?;
    Ok(Json(slots))
}

#[utoipa::path(
    get,
    path = "/api/timetable/statistics",
    params(StatisticsQuery),
    responses(
        (status = 200, description = "Statistics over the scope's non-terminal entries", body = TimetableStatistics)
    ),
    tag = "Timetable"
)]
#[instrument(skip(state))]
pub async fn get_statistics(
    State(state): State<AppState>,
    Query(query): Query<StatisticsQuery>,
) -> Result<Json<TimetableStatistics>, AppError> {
    let stats = TimetableService::get_statistics(
        state.store.as_ref(),
        &state.scheduling.statistics_basis,
        query.into(),
    )
    .await?;
    Ok(Json(stats))
}
