//! Request and response DTOs for the timetable endpoints.
//!
//! Times arrive as `HH:MM` strings and are parsed explicitly (rather than by
//! serde) so a malformed time surfaces as `InvalidTimeFormat` instead of a
//! generic body rejection.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use timetabler_core::serde::{
    deserialize_optional_string, deserialize_optional_u32, deserialize_optional_uuid,
};
use timetabler_core::{PaginationMeta, PaginationParams};

use crate::ids::{ClassId, RoomId, SchoolId, SubjectId, TeacherId};
use crate::scheduling::{GenerateRequest, GenerationConstraints, SubjectRequirement};
use crate::time_of_day::{TimeFormatError, TimeRange, parse_time};
use crate::timetable::{
    Conflict, DayOfWeek, EntryScope, EntryStatus, EquipmentRequirement, PriorityLevel,
    RecurrenceType, TimetableEntry, TimetableEntryDraft,
};

/// DTO for creating an entry directly, or for checking a candidate for conflicts.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateTimetableEntryDto {
    pub school_id: SchoolId,
    /// Academic year label (e.g. "2024-2025")
    #[validate(length(min = 4, max = 20))]
    pub academic_year: String,
    #[validate(length(min = 1, max = 20))]
    pub grade_level: String,
    #[validate(length(min = 1, max = 10))]
    pub section: Option<String>,
    pub class_id: ClassId,
    pub subject_id: SubjectId,
    #[validate(length(min = 1, max = 100))]
    pub subject_name: String,
    pub teacher_id: TeacherId,
    #[validate(length(min = 1, max = 100))]
    pub teacher_name: String,
    pub day_of_week: DayOfWeek,
    /// Start time in HH:MM
    #[schema(example = "08:00")]
    pub start_time: String,
    /// End time in HH:MM, after start_time
    #[schema(example = "09:00")]
    pub end_time: String,
    #[validate(range(min = 1, max = 20))]
    pub period_number: Option<i32>,
    pub room_id: Option<RoomId>,
    #[validate(length(min = 1, max = 100))]
    pub room_name: Option<String>,
    #[validate(range(min = 1))]
    pub room_capacity: Option<i32>,
    pub room_type: Option<String>,
    #[serde(default)]
    pub equipment: Vec<EquipmentRequirement>,
    pub priority_level: Option<PriorityLevel>,
    pub is_fixed: Option<bool>,
    pub recurrence_type: Option<RecurrenceType>,
    pub recurrence_end_date: Option<NaiveDate>,
}

impl CreateTimetableEntryDto {
    /// Parse times and build the scheduling draft.
    pub fn into_draft(self) -> Result<TimetableEntryDraft, TimeFormatError> {
        let range = TimeRange::parse(&self.start_time, &self.end_time)?;

        Ok(TimetableEntryDraft {
            school_id: self.school_id,
            academic_year: self.academic_year,
            grade_level: self.grade_level,
            section: self.section,
            class_id: self.class_id,
            subject_id: self.subject_id,
            subject_name: self.subject_name,
            teacher_id: self.teacher_id,
            teacher_name: self.teacher_name,
            day_of_week: self.day_of_week,
            start_time: range.start,
            end_time: range.end,
            duration_minutes: range.duration_minutes() as i32,
            period_number: self.period_number,
            room_id: self.room_id,
            room_name: self.room_name,
            room_capacity: self.room_capacity,
            room_type: self.room_type,
            equipment: self.equipment,
            priority_level: self.priority_level.unwrap_or_default(),
            is_fixed: self.is_fixed.unwrap_or(false),
            recurrence_type: self.recurrence_type.unwrap_or_default(),
            recurrence_end_date: self.recurrence_end_date,
        })
    }
}

/// DTO for updating an entry. Omitted fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateTimetableEntryDto {
    pub teacher_id: Option<TeacherId>,
    #[validate(length(min = 1, max = 100))]
    pub teacher_name: Option<String>,
    pub day_of_week: Option<DayOfWeek>,
    #[schema(example = "10:00")]
    pub start_time: Option<String>,
    #[schema(example = "10:45")]
    pub end_time: Option<String>,
    #[validate(range(min = 1, max = 20))]
    pub period_number: Option<i32>,
    pub room_id: Option<RoomId>,
    #[validate(length(min = 1, max = 100))]
    pub room_name: Option<String>,
    #[validate(range(min = 1))]
    pub room_capacity: Option<i32>,
    pub room_type: Option<String>,
    pub equipment: Option<Vec<EquipmentRequirement>>,
    pub priority_level: Option<PriorityLevel>,
    pub is_fixed: Option<bool>,
    pub recurrence_type: Option<RecurrenceType>,
    pub recurrence_end_date: Option<NaiveDate>,
}

impl UpdateTimetableEntryDto {
    /// Merge into an existing draft, re-deriving the duration when times change.
    pub fn apply(self, draft: &mut TimetableEntryDraft) -> Result<(), TimeFormatError> {
        let start = match &self.start_time {
            Some(s) => parse_time(s)?,
            None => draft.start_time,
        };
        let end = match &self.end_time {
            Some(s) => parse_time(s)?,
            None => draft.end_time,
        };
        draft.set_times(TimeRange::new(start, end)?);

        if let Some(teacher_id) = self.teacher_id {
            draft.teacher_id = teacher_id;
        }
        if let Some(teacher_name) = self.teacher_name {
            draft.teacher_name = teacher_name;
        }
        if let Some(day) = self.day_of_week {
            draft.day_of_week = day;
        }
        if self.period_number.is_some() {
            draft.period_number = self.period_number;
        }
        if self.room_id.is_some() {
            draft.room_id = self.room_id;
        }
        if self.room_name.is_some() {
            draft.room_name = self.room_name;
        }
        if self.room_capacity.is_some() {
            draft.room_capacity = self.room_capacity;
        }
        if self.room_type.is_some() {
            draft.room_type = self.room_type;
        }
        if let Some(equipment) = self.equipment {
            draft.equipment = equipment;
        }
        if let Some(priority) = self.priority_level {
            draft.priority_level = priority;
        }
        if let Some(is_fixed) = self.is_fixed {
            draft.is_fixed = is_fixed;
        }
        if let Some(recurrence) = self.recurrence_type {
            draft.recurrence_type = recurrence;
        }
        if self.recurrence_end_date.is_some() {
            draft.recurrence_end_date = self.recurrence_end_date;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CancelEntryDto {
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ResolveConflictDto {
    #[validate(length(min = 1, max = 500))]
    pub resolution: String,
}

/// One subject in a generation request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SubjectRequirementDto {
    pub subject_id: SubjectId,
    #[validate(length(min = 1, max = 100))]
    pub subject_name: String,
    pub teacher_id: TeacherId,
    #[validate(length(min = 1, max = 100))]
    pub teacher_name: String,
    #[validate(range(min = 1, max = 40))]
    pub periods_per_week: u32,
    #[validate(range(min = 5, max = 480))]
    pub duration_minutes: u32,
    pub priority_level: Option<PriorityLevel>,
    pub room_id: Option<RoomId>,
    pub room_name: Option<String>,
}

impl From<SubjectRequirementDto> for SubjectRequirement {
    fn from(dto: SubjectRequirementDto) -> Self {
        Self {
            subject_id: dto.subject_id,
            subject_name: dto.subject_name,
            teacher_id: dto.teacher_id,
            teacher_name: dto.teacher_name,
            periods_per_week: dto.periods_per_week,
            duration_minutes: dto.duration_minutes,
            priority_level: dto.priority_level.unwrap_or_default(),
            room_id: dto.room_id,
            room_name: dto.room_name,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LunchBreakDto {
    #[schema(example = "12:00")]
    pub start: String,
    #[schema(example = "12:45")]
    pub end: String,
}

/// Generation constraints; omitted fields fall back to the configured defaults.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct GenerationConstraintsDto {
    #[validate(range(min = 1, max = 16))]
    pub max_periods_per_day: Option<u32>,
    #[validate(range(max = 120))]
    pub break_duration_minutes: Option<u32>,
    pub lunch_break: Option<LunchBreakDto>,
    #[validate(length(min = 1, max = 7))]
    pub working_days: Option<Vec<DayOfWeek>>,
    #[schema(example = "08:00")]
    pub day_start: Option<String>,
    #[schema(example = "15:00")]
    pub day_end: Option<String>,
}

impl GenerationConstraintsDto {
    pub fn resolve(
        self,
        defaults: &GenerationConstraints,
    ) -> Result<GenerationConstraints, TimeFormatError> {
        let day_start = match &self.day_start {
            Some(s) => parse_time(s)?,
            None => defaults.day_start,
        };
        let day_end = match &self.day_end {
            Some(s) => parse_time(s)?,
            None => defaults.day_end,
        };
        // Validates start < end for the day window.
        TimeRange::new(day_start, day_end)?;

        let lunch_break = match &self.lunch_break {
            Some(lunch) => Some(TimeRange::parse(&lunch.start, &lunch.end)?),
            None => defaults.lunch_break,
        };

        Ok(GenerationConstraints {
            max_periods_per_day: self
                .max_periods_per_day
                .unwrap_or(defaults.max_periods_per_day),
            break_duration_minutes: self
                .break_duration_minutes
                .unwrap_or(defaults.break_duration_minutes),
            lunch_break,
            working_days: self
                .working_days
                .unwrap_or_else(|| defaults.working_days.clone()),
            day_start,
            day_end,
        })
    }
}

/// DTO for generating a class timetable.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct GenerateTimetableDto {
    pub school_id: SchoolId,
    #[validate(length(min = 4, max = 20))]
    pub academic_year: String,
    #[validate(length(min = 1, max = 20))]
    pub grade_level: String,
    #[validate(length(min = 1, max = 10))]
    pub section: Option<String>,
    pub class_id: ClassId,
    #[validate(length(min = 1), nested)]
    pub subjects: Vec<SubjectRequirementDto>,
    #[validate(nested)]
    pub constraints: Option<GenerationConstraintsDto>,
}

impl GenerateTimetableDto {
    pub fn into_request(
        self,
        defaults: &GenerationConstraints,
    ) -> Result<GenerateRequest, TimeFormatError> {
        let constraints = self.constraints.unwrap_or_default().resolve(defaults)?;

        Ok(GenerateRequest {
            school_id: self.school_id,
            academic_year: self.academic_year,
            grade_level: self.grade_level,
            section: self.section,
            class_id: self.class_id,
            subjects: self.subjects.into_iter().map(Into::into).collect(),
            constraints,
        })
    }
}

/// Query parameters for listing entries of one scope.
#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct EntryFilterParams {
    pub school_id: SchoolId,
    pub academic_year: String,
    pub grade_level: String,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub section: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub class_id: Option<ClassId>,
    pub day_of_week: Option<DayOfWeek>,
    pub status: Option<EntryStatus>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

impl EntryFilterParams {
    pub fn scope(&self) -> EntryScope {
        EntryScope {
            school_id: self.school_id,
            academic_year: self.academic_year.clone(),
            grade_level: self.grade_level.clone(),
            section: self.section.clone(),
        }
    }

    pub fn matches(&self, entry: &TimetableEntry) -> bool {
        self.class_id.is_none_or(|id| entry.details.class_id == id)
            && self.day_of_week.is_none_or(|day| entry.details.day_of_week == day)
            && self.status.is_none_or(|status| entry.status == status)
    }
}

/// Query parameters for timetable statistics.
#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct StatisticsQuery {
    pub school_id: SchoolId,
    pub academic_year: String,
    pub grade_level: String,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub section: Option<String>,
}

impl From<StatisticsQuery> for EntryScope {
    fn from(query: StatisticsQuery) -> Self {
        Self {
            school_id: query.school_id,
            academic_year: query.academic_year,
            grade_level: query.grade_level,
            section: query.section,
        }
    }
}

/// Query parameters for free-slot discovery on one day.
#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct AvailableSlotsQuery {
    pub class_id: ClassId,
    pub academic_year: String,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub section: Option<String>,
    pub day_of_week: DayOfWeek,
    pub duration_minutes: u32,
    #[serde(default, deserialize_with = "deserialize_optional_u32")]
    pub break_duration_minutes: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub day_start: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub day_end: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub lunch_start: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub lunch_end: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ConflictCheckResponse {
    pub has_conflicts: bool,
    pub conflicts: Vec<Conflict>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AvailableSlotsResponse {
    pub day_of_week: DayOfWeek,
    pub slots: Vec<TimeRange>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedEntriesResponse {
    pub data: Vec<TimetableEntry>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_dto() -> CreateTimetableEntryDto {
        CreateTimetableEntryDto {
            school_id: SchoolId::from_u128(1),
            academic_year: "2024-2025".to_string(),
            grade_level: "10".to_string(),
            section: None,
            class_id: ClassId::from_u128(2),
            subject_id: SubjectId::from_u128(3),
            subject_name: "Physics".to_string(),
            teacher_id: TeacherId::from_u128(4),
            teacher_name: "Marie Curie".to_string(),
            day_of_week: DayOfWeek::Tuesday,
            start_time: "10:00".to_string(),
            end_time: "10:45".to_string(),
            period_number: None,
            room_id: None,
            room_name: None,
            room_capacity: None,
            room_type: None,
            equipment: Vec::new(),
            priority_level: None,
            is_fixed: None,
            recurrence_type: None,
            recurrence_end_date: None,
        }
    }

    #[test]
    fn test_create_dto_validation() {
        assert!(create_dto().validate().is_ok());

        let mut empty_subject = create_dto();
        empty_subject.subject_name = String::new();
        assert!(empty_subject.validate().is_err());

        let mut bad_period = create_dto();
        bad_period.period_number = Some(0);
        assert!(bad_period.validate().is_err());
    }

    #[test]
    fn test_into_draft_derives_duration_and_defaults() {
        let draft = create_dto().into_draft().unwrap();
        assert_eq!(draft.duration_minutes, 45);
        assert_eq!(draft.priority_level, PriorityLevel::Normal);
        assert_eq!(draft.recurrence_type, RecurrenceType::Weekly);
        assert!(!draft.is_fixed);
    }

    #[test]
    fn test_into_draft_rejects_bad_times() {
        let mut dto = create_dto();
        dto.start_time = "9:00".to_string();
        assert!(matches!(
            dto.into_draft(),
            Err(TimeFormatError::InvalidTimeFormat(_))
        ));

        let mut dto = create_dto();
        dto.end_time = "09:00".to_string();
        assert!(matches!(
            dto.into_draft(),
            Err(TimeFormatError::EmptyRange { .. })
        ));
    }

    #[test]
    fn test_update_apply_moves_times() {
        let mut draft = create_dto().into_draft().unwrap();
        let update = UpdateTimetableEntryDto {
            start_time: Some("13:00".to_string()),
            end_time: Some("14:30".to_string()),
            day_of_week: Some(DayOfWeek::Thursday),
            ..Default::default()
        };

        update.apply(&mut draft).unwrap();

        assert_eq!(draft.start_time.to_string(), "13:00");
        assert_eq!(draft.duration_minutes, 90);
        assert_eq!(draft.day_of_week, DayOfWeek::Thursday);
        assert_eq!(draft.subject_name, "Physics");
    }

    #[test]
    fn test_update_apply_rejects_inverted_range() {
        let mut draft = create_dto().into_draft().unwrap();
        let update = UpdateTimetableEntryDto {
            start_time: Some("11:00".to_string()),
            ..Default::default()
        };

        assert!(update.apply(&mut draft).is_err());
        assert_eq!(draft.start_time.to_string(), "10:00");
    }

    #[test]
    fn test_constraints_fall_back_to_defaults() {
        let defaults = GenerationConstraints::default();
        let resolved = GenerationConstraintsDto {
            day_end: Some("12:00".to_string()),
            ..Default::default()
        }
        .resolve(&defaults)
        .unwrap();

        assert_eq!(resolved.day_start.to_string(), "08:00");
        assert_eq!(resolved.day_end.to_string(), "12:00");
        assert_eq!(resolved.break_duration_minutes, 15);
        assert_eq!(resolved.working_days, DayOfWeek::weekdays());
        assert!(resolved.lunch_break.is_none());
    }

    #[test]
    fn test_constraints_reject_inverted_day_window() {
        let dto = GenerationConstraintsDto {
            day_start: Some("15:00".to_string()),
            day_end: Some("08:00".to_string()),
            ..Default::default()
        };
        assert!(dto.resolve(&GenerationConstraints::default()).is_err());
    }

    #[test]
    fn test_generate_dto_requires_subjects() {
        let dto = GenerateTimetableDto {
            school_id: SchoolId::from_u128(1),
            academic_year: "2024-2025".to_string(),
            grade_level: "10".to_string(),
            section: None,
            class_id: ClassId::from_u128(2),
            subjects: Vec::new(),
            constraints: None,
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_generate_dto_validates_nested_subjects() {
        let dto = GenerateTimetableDto {
            school_id: SchoolId::from_u128(1),
            academic_year: "2024-2025".to_string(),
            grade_level: "10".to_string(),
            section: None,
            class_id: ClassId::from_u128(2),
            subjects: vec![SubjectRequirementDto {
                subject_id: SubjectId::from_u128(3),
                subject_name: "Math".to_string(),
                teacher_id: TeacherId::from_u128(4),
                teacher_name: "T1".to_string(),
                periods_per_week: 0,
                duration_minutes: 60,
                priority_level: None,
                room_id: None,
                room_name: None,
            }],
            constraints: None,
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_filter_params_treat_empty_values_as_absent() {
        let params: EntryFilterParams = serde_json::from_str(
            r#"{"school_id":"00000000-0000-0000-0000-000000000001","academic_year":"2024-2025",
                "grade_level":"10","section":"","class_id":"","limit":"5"}"#,
        )
        .unwrap();

        assert!(params.section.is_none());
        assert!(params.class_id.is_none());
        assert_eq!(params.pagination.limit, Some(5));
        assert!(params.scope().section.is_none());
    }
}
