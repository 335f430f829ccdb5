use thiserror::Error;
use timetabler_models::{Conflict, EntryId, TimeFormatError};

/// Failures reported by an [`EntryStore`](crate::EntryStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// Another entry already holds the (school, year, grade, section, day, start) slot.
    #[error("Timetable slot already taken: {0}")]
    UniqueConstraintViolation(String),

    #[error("Timetable entry {0} not found")]
    NotFound(EntryId),

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum SchedulingError {
    #[error("{0}")]
    InvalidTimeFormat(TimeFormatError),

    #[error("Schedule conflict detected ({} conflicting entries)", .0.len())]
    ScheduleConflict(Vec<Conflict>),

    #[error("Timetable slot already taken: {0}")]
    UniqueConstraintViolation(String),

    #[error("{0}")]
    PreconditionFailed(String),

    #[error("{0}")]
    Validation(String),

    #[error("Timetable entry {0} not found")]
    NotFound(EntryId),

    #[error("Entry store failure: {0}")]
    Store(anyhow::Error),
}

impl From<TimeFormatError> for SchedulingError {
    fn from(err: TimeFormatError) -> Self {
        match err {
            TimeFormatError::EmptyRange { .. } => SchedulingError::Validation(err.to_string()),
            other => SchedulingError::InvalidTimeFormat(other),
        }
    }
}

impl From<StoreError> for SchedulingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueConstraintViolation(key) => {
                SchedulingError::UniqueConstraintViolation(key)
            }
            StoreError::NotFound(id) => SchedulingError::NotFound(id),
            StoreError::Backend(e) => SchedulingError::Store(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_range_is_validation() {
        let err: SchedulingError = timetabler_models::TimeRange::parse("10:00", "09:00")
            .unwrap_err()
            .into();
        assert!(matches!(err, SchedulingError::Validation(_)));

        let err: SchedulingError = timetabler_models::parse_time("25:00").unwrap_err().into();
        assert!(matches!(err, SchedulingError::InvalidTimeFormat(_)));
    }

    #[test]
    fn test_conflict_message_counts_entries() {
        assert_eq!(
            SchedulingError::ScheduleConflict(Vec::new()).to_string(),
            "Schedule conflict detected (0 conflicting entries)"
        );
    }

    #[test]
    fn test_store_error_mapping() {
        let err: SchedulingError = StoreError::NotFound(EntryId::from_u128(7)).into();
        assert!(matches!(err, SchedulingError::NotFound(id) if id == EntryId::from_u128(7)));

        let err: SchedulingError = StoreError::Backend(anyhow::anyhow!("connection reset")).into();
        assert!(matches!(err, SchedulingError::Store(_)));
    }
}
