//! Timetable entry entity and its enumerations.
//!
//! A [`TimetableEntry`] is one scheduled occurrence of a subject for a class
//! section, taught by one teacher and optionally held in one room. The
//! scheduling-relevant attributes live in [`TimetableEntryDraft`], which is
//! also the shape of a candidate entry before it is stored; the entry adds
//! identity, lifecycle and conflict state on top.

use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::ids::{ClassId, EntryId, EquipmentId, RoomId, SchoolId, SubjectId, TeacherId};
use crate::time_of_day::{TimeOfDay, TimeRange};

/// Day of the week an entry repeats on.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "day_of_week", rename_all = "lowercase")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    /// Monday through Friday, the default working week.
    pub fn weekdays() -> Vec<DayOfWeek> {
        Self::ALL[..5].to_vec()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DayOfWeek::Monday => "monday",
            DayOfWeek::Tuesday => "tuesday",
            DayOfWeek::Wednesday => "wednesday",
            DayOfWeek::Thursday => "thursday",
            DayOfWeek::Friday => "friday",
            DayOfWeek::Saturday => "saturday",
            DayOfWeek::Sunday => "sunday",
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayOfWeek {
    type Err = String;

    /// Accepts full names and three-letter abbreviations, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        DayOfWeek::ALL
            .into_iter()
            .find(|day| day.as_str() == lower || day.as_str()[..3] == lower)
            .ok_or_else(|| format!("Unknown day of week: {}", s))
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

/// Lifecycle status of an entry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema, sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "timetable_status", rename_all = "lowercase")]
pub enum EntryStatus {
    #[default]
    Draft,
    Published,
    Active,
    Archived,
    Cancelled,
}

impl EntryStatus {
    /// Draft, published and active entries occupy their slot for conflict purposes.
    pub fn is_non_terminal(&self) -> bool {
        matches!(
            self,
            EntryStatus::Draft | EntryStatus::Published | EntryStatus::Active
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Draft => "draft",
            EntryStatus::Published => "published",
            EntryStatus::Active => "active",
            EntryStatus::Archived => "archived",
            EntryStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scheduling priority. Declaration order is significant: `Low < Normal < High < Urgent`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    ToSchema,
    sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "priority_level", rename_all = "lowercase")]
pub enum PriorityLevel {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema, sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "recurrence_type", rename_all = "lowercase")]
pub enum RecurrenceType {
    None,
    Daily,
    #[default]
    Weekly,
    Monthly,
    Custom,
}

/// Axis on which two entries collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    TeacherConflict,
    RoomConflict,
    ClassConflict,
}

impl ConflictType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictType::TeacherConflict => "teacher_conflict",
            ConflictType::RoomConflict => "room_conflict",
            ConflictType::ClassConflict => "class_conflict",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ConflictSeverity {
    Low,
    Medium,
    High,
}

/// A collision between a candidate and an existing non-terminal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Conflict {
    #[serde(rename = "type")]
    pub conflict_type: ConflictType,
    pub description: String,
    pub severity: ConflictSeverity,
    pub conflicting_entry_id: EntryId,
}

/// Conflict state recorded on a stored entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ConflictDetail {
    #[serde(rename = "type")]
    pub conflict_type: ConflictType,
    pub description: String,
    pub severity: ConflictSeverity,
    /// How the conflict was resolved; `None` while it is still open
    #[serde(default)]
    pub resolution: Option<String>,
}

impl From<&Conflict> for ConflictDetail {
    fn from(conflict: &Conflict) -> Self {
        Self {
            conflict_type: conflict.conflict_type,
            description: conflict.description.clone(),
            severity: conflict.severity,
            resolution: None,
        }
    }
}

/// Equipment an entry needs in its room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EquipmentRequirement {
    pub equipment_id: EquipmentId,
    pub name: String,
    pub quantity: u32,
}

/// The scheduling attributes of an entry, before it has an identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TimetableEntryDraft {
    pub school_id: SchoolId,
    /// Academic year label, e.g. "2024-2025"
    pub academic_year: String,
    pub grade_level: String,
    pub section: Option<String>,
    pub class_id: ClassId,
    pub subject_id: SubjectId,
    pub subject_name: String,
    pub teacher_id: TeacherId,
    pub teacher_name: String,
    pub day_of_week: DayOfWeek,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    /// Always `end_time - start_time`
    pub duration_minutes: i32,
    pub period_number: Option<i32>,
    pub room_id: Option<RoomId>,
    pub room_name: Option<String>,
    pub room_capacity: Option<i32>,
    pub room_type: Option<String>,
    #[sqlx(json)]
    #[serde(default)]
    pub equipment: Vec<EquipmentRequirement>,
    #[serde(default)]
    pub priority_level: PriorityLevel,
    /// Fixed entries are never moved by automatic rescheduling
    #[serde(default)]
    pub is_fixed: bool,
    #[serde(default)]
    pub recurrence_type: RecurrenceType,
    pub recurrence_end_date: Option<NaiveDate>,
}

impl TimetableEntryDraft {
    #[inline]
    pub fn time_range(&self) -> TimeRange {
        TimeRange {
            start: self.start_time,
            end: self.end_time,
        }
    }

    /// Set start/end together and keep `duration_minutes` consistent.
    pub fn set_times(&mut self, range: TimeRange) {
        self.start_time = range.start;
        self.end_time = range.end;
        self.duration_minutes = range.duration_minutes() as i32;
    }

    /// `start < end` and the stored duration matches the interval.
    pub fn has_consistent_timing(&self) -> bool {
        self.start_time < self.end_time
            && i64::from(self.duration_minutes) == self.start_time.minutes_until(self.end_time)
    }

    /// Grade and optional section, e.g. `10-A` or `10`.
    pub fn class_label(&self) -> String {
        match &self.section {
            Some(section) => format!("{}-{}", self.grade_level, section),
            None => self.grade_level.clone(),
        }
    }

    /// Key that no two stored entries may share.
    pub fn slot_key(&self) -> SlotKey {
        SlotKey {
            school_id: self.school_id,
            academic_year: self.academic_year.clone(),
            grade_level: self.grade_level.clone(),
            section: self.section.clone(),
            day_of_week: self.day_of_week,
            start_time: self.start_time,
        }
    }

    /// Promote to a stored draft entry.
    pub fn into_entry(self, id: EntryId, now: DateTime<Utc>) -> TimetableEntry {
        TimetableEntry {
            id,
            details: self,
            status: EntryStatus::Draft,
            is_cancelled: false,
            cancellation_reason: None,
            has_conflicts: false,
            conflict_details: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Uniqueness key of a stored entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotKey {
    pub school_id: SchoolId,
    pub academic_year: String,
    pub grade_level: String,
    pub section: Option<String>,
    pub day_of_week: DayOfWeek,
    pub start_time: TimeOfDay,
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "class {}", self.grade_level)?;
        if let Some(section) = &self.section {
            write!(f, "-{}", section)?;
        }
        write!(
            f,
            " ({}) on {} at {}",
            self.academic_year, self.day_of_week, self.start_time
        )
    }
}

/// A stored timetable entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TimetableEntry {
    pub id: EntryId,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub details: TimetableEntryDraft,
    pub status: EntryStatus,
    pub is_cancelled: bool,
    pub cancellation_reason: Option<String>,
    /// True iff some conflict detail has no resolution
    pub has_conflicts: bool,
    #[sqlx(json)]
    pub conflict_details: Vec<ConflictDetail>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TimetableEntry {
    #[inline]
    pub fn time_range(&self) -> TimeRange {
        self.details.time_range()
    }

    #[inline]
    pub fn participates_in_conflicts(&self) -> bool {
        self.status.is_non_terminal()
    }
}

/// The (school, year, grade, section) slice that listings and statistics cover.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct EntryScope {
    pub school_id: SchoolId,
    pub academic_year: String,
    pub grade_level: String,
    pub section: Option<String>,
}

impl EntryScope {
    pub fn matches(&self, entry: &TimetableEntryDraft) -> bool {
        entry.school_id == self.school_id
            && entry.academic_year == self.academic_year
            && entry.grade_level == self.grade_level
            && entry.section == self.section
    }
}
