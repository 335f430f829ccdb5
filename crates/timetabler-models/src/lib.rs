//! # Timetabler Models
//!
//! Domain models and DTOs for the Timetabler API.
//!
//! # Modules
//!
//! - [`ids`]: Strongly-typed UUID newtypes
//! - [`time_of_day`]: `HH:MM` parsing, minute-of-day values and time ranges
//! - [`timetable`]: The timetable entry entity, its enums and conflict types
//! - [`scheduling`]: Generation requests/results and statistics
//! - [`dto`]: HTTP request/response shapes
//!
//! # Example
//!
//! ```ignore
//! use timetabler_models::{DayOfWeek, TimeRange, parse_time};
//!
//! let period = TimeRange::parse("08:00", "08:45")?;
//! assert_eq!(period.duration_minutes(), 45);
//! ```

pub mod dto;
pub mod ids;
pub mod scheduling;
pub mod time_of_day;
pub mod timetable;

pub use ids::{ClassId, EntryId, EquipmentId, RoomId, SchoolId, SubjectId, TeacherId};

pub use time_of_day::{
    MINUTES_PER_DAY, TimeFormatError, TimeOfDay, TimeRange, format_time, overlaps, parse_time,
};

pub use timetable::{
    Conflict, ConflictDetail, ConflictSeverity, ConflictType, DayOfWeek, EntryScope, EntryStatus,
    EquipmentRequirement, PriorityLevel, RecurrenceType, SlotKey, TimetableEntry,
    TimetableEntryDraft,
};

pub use scheduling::{
    GenerateRequest, GenerateResult, GenerationConstraints, Shortfall, StatisticsBasis,
    SubjectRequirement, TimetableStatistics,
};
