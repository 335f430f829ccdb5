use utoipa::OpenApi;

use timetabler_core::{PaginationMeta, PaginationParams};
use timetabler_models::dto::{
    AvailableSlotsResponse, CancelEntryDto, ConflictCheckResponse, CreateTimetableEntryDto,
    GenerateTimetableDto, GenerationConstraintsDto, LunchBreakDto, PaginatedEntriesResponse,
    ResolveConflictDto, SubjectRequirementDto, UpdateTimetableEntryDto,
};
use timetabler_models::{
    Conflict, ConflictDetail, ConflictSeverity, ConflictType, DayOfWeek, EntryStatus,
    EquipmentRequirement, GenerateResult, PriorityLevel, RecurrenceType, Shortfall, TimeRange,
    TimetableEntry, TimetableStatistics,
};

use crate::router::HealthResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::router::health,
        crate::modules::timetable::controller::create_entry,
        crate::modules::timetable::controller::get_entries,
        crate::modules::timetable::controller::get_entry,
        crate::modules::timetable::controller::update_entry,
        crate::modules::timetable::controller::delete_entry,
        crate::modules::timetable::controller::publish_entry,
        crate::modules::timetable::controller::activate_entry,
        crate::modules::timetable::controller::archive_entry,
        crate::modules::timetable::controller::cancel_entry,
        crate::modules::timetable::controller::refresh_conflicts,
        crate::modules::timetable::controller::resolve_conflict,
        crate::modules::timetable::controller::check_conflicts,
        crate::modules::timetable::controller::generate_timetable,
        crate::modules::timetable::controller::get_available_slots,
        crate::modules::timetable::controller::get_statistics,
    ),
    components(
        schemas(
            HealthResponse,
            TimetableEntry,
            EntryStatus,
            DayOfWeek,
            PriorityLevel,
            RecurrenceType,
            EquipmentRequirement,
            Conflict,
            ConflictDetail,
            ConflictType,
            ConflictSeverity,
            TimeRange,
            CreateTimetableEntryDto,
            UpdateTimetableEntryDto,
            CancelEntryDto,
            ResolveConflictDto,
            ConflictCheckResponse,
            SubjectRequirementDto,
            LunchBreakDto,
            GenerationConstraintsDto,
            GenerateTimetableDto,
            GenerateResult,
            Shortfall,
            AvailableSlotsResponse,
            TimetableStatistics,
            PaginatedEntriesResponse,
            PaginationMeta,
            PaginationParams,
        )
    ),
    tags(
        (name = "Health", description = "Liveness probe"),
        (name = "Timetable", description = "Timetable entries, conflict checks, generation and statistics")
    ),
    info(
        title = "Timetabler API",
        version = "0.1.0",
        description = "Class timetable scheduling with conflict detection and automatic generation, built with Rust, Axum, and PostgreSQL.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;
