//! Double-booking detection on the teacher, room and class axes.
//!
//! [`detect_conflicts`] fetches the three axis snapshots from an
//! [`EntryStore`] and hands them to [`collect_conflicts`], which is pure.
//! Conflicts are reported in axis order (teacher, room, class) and, within an
//! axis, in the order the store returned the entries.

use tracing::{debug, instrument};

use timetabler_models::{
    Conflict, ConflictSeverity, ConflictType, EntryId, TimetableEntry, TimetableEntryDraft,
};

use crate::error::StoreError;
use crate::store::EntryStore;

/// Existing entries that share a teacher, room or class with a candidate on its day.
#[derive(Debug, Clone, Default)]
pub struct ConflictSnapshot {
    pub by_teacher: Vec<TimetableEntry>,
    /// Empty when the candidate has no room
    pub by_room: Vec<TimetableEntry>,
    pub by_class: Vec<TimetableEntry>,
}

/// Load the axis snapshots for `candidate` and detect its conflicts.
///
/// `exclude` names an entry to ignore, normally the entry being updated.
#[instrument(skip(candidate, store), fields(subject = %candidate.subject_name, day = %candidate.day_of_week))]
pub async fn detect_conflicts(
    candidate: &TimetableEntryDraft,
    exclude: Option<EntryId>,
    store: &dyn EntryStore,
) -> Result<Vec<Conflict>, StoreError> {
    let day = candidate.day_of_week;
    let year = candidate.academic_year.as_str();

    let by_teacher = store
        .find_by_teacher(candidate.teacher_id, day, year)
        .await?;
    let by_room = match candidate.room_id {
        Some(room_id) => store.find_by_room(room_id, day, year).await?,
        None => Vec::new(),
    };
    let by_class = store
        .find_by_class(candidate.class_id, candidate.section.as_deref(), day, year)
        .await?;

    let snapshot = ConflictSnapshot {
        by_teacher,
        by_room,
        by_class,
    };
    let conflicts = collect_conflicts(candidate, exclude, &snapshot);
    if !conflicts.is_empty() {
        debug!(count = conflicts.len(), "Conflicts detected");
    }
    Ok(conflicts)
}

/// Compare `candidate` against a snapshot without touching any store.
pub fn collect_conflicts(
    candidate: &TimetableEntryDraft,
    exclude: Option<EntryId>,
    snapshot: &ConflictSnapshot,
) -> Vec<Conflict> {
    let range = candidate.time_range();
    let clashing = |entries: &[TimetableEntry]| -> Vec<TimetableEntry> {
        entries
            .iter()
            .filter(|e| Some(e.id) != exclude)
            .filter(|e| e.participates_in_conflicts())
            .filter(|e| e.time_range().overlaps(&range))
            .cloned()
            .collect()
    };

    let mut conflicts = Vec::new();

    for other in clashing(&snapshot.by_teacher) {
        conflicts.push(conflict(
            ConflictType::TeacherConflict,
            format!(
                "Teacher {} is already scheduled for {} during this time.",
                candidate.teacher_name, other.details.subject_name
            ),
            other.id,
        ));
    }

    if let Some(room_id) = candidate.room_id {
        let room = candidate
            .room_name
            .clone()
            .unwrap_or_else(|| room_id.to_string());
        for other in clashing(&snapshot.by_room) {
            conflicts.push(conflict(
                ConflictType::RoomConflict,
                format!(
                    "Room {} is already booked for {} during this time.",
                    room, other.details.subject_name
                ),
                other.id,
            ));
        }
    }

    let class = candidate.class_label();
    for other in clashing(&snapshot.by_class) {
        conflicts.push(conflict(
            ConflictType::ClassConflict,
            format!(
                "Class {} already has {} scheduled during this time.",
                class, other.details.subject_name
            ),
            other.id,
        ));
    }

    conflicts
}

fn conflict(conflict_type: ConflictType, description: String, with: EntryId) -> Conflict {
    Conflict {
        conflict_type,
        description,
        severity: ConflictSeverity::High,
        conflicting_entry_id: with,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryEntryStore;
    use crate::store::tests::draft;
    use timetabler_models::{ClassId, DayOfWeek, EntryStatus, RoomId, TeacherId};

    const T: TeacherId = TeacherId::from_u128(1);
    const OTHER_TEACHER: TeacherId = TeacherId::from_u128(2);

    async fn store_with(drafts: Vec<TimetableEntryDraft>) -> InMemoryEntryStore {
        let store = InMemoryEntryStore::new();
        for d in drafts {
            store.create(d).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_overlapping_teacher_booking_conflicts() {
        let store = store_with(vec![draft("Math", T, DayOfWeek::Monday, "09:00", "10:00")]).await;

        let mut candidate = draft("Physics", T, DayOfWeek::Monday, "09:30", "10:30");
        candidate.class_id = ClassId::from_u128(0xc2);
        let conflicts = detect_conflicts(&candidate, None, &store).await.unwrap();

        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].conflict_type, ConflictType::TeacherConflict);
        assert_eq!(conflicts[0].severity, ConflictSeverity::High);
        assert_eq!(
            conflicts[0].description,
            "Teacher Teacher 1 is already scheduled for Math during this time."
        );
    }

    #[tokio::test]
    async fn test_touching_interval_does_not_conflict() {
        let store = store_with(vec![draft("Math", T, DayOfWeek::Monday, "09:00", "10:00")]).await;

        let candidate = draft("Physics", T, DayOfWeek::Monday, "10:00", "11:00");
        let conflicts = detect_conflicts(&candidate, None, &store).await.unwrap();

        assert!(conflicts.is_empty());
    }

    #[tokio::test]
    async fn test_other_day_or_year_does_not_conflict() {
        let mut last_year = draft("Math", T, DayOfWeek::Monday, "09:00", "10:00");
        last_year.academic_year = "2023-2024".to_string();
        let store = store_with(vec![
            draft("Math", T, DayOfWeek::Tuesday, "09:00", "10:00"),
            last_year,
        ])
        .await;

        let candidate = draft("Physics", T, DayOfWeek::Monday, "09:15", "09:45");
        assert!(
            detect_conflicts(&candidate, None, &store)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_all_axes_reported_in_order() {
        let room = RoomId::from_u128(0x101);
        let mut existing = draft("Math", T, DayOfWeek::Monday, "09:00", "10:00");
        existing.room_id = Some(room);
        existing.section = Some("A".to_string());
        let store = store_with(vec![existing]).await;

        let mut candidate = draft("Chemistry", T, DayOfWeek::Monday, "09:30", "10:15");
        candidate.room_id = Some(room);
        candidate.room_name = Some("Lab 1".to_string());
        candidate.section = Some("A".to_string());

        let conflicts = detect_conflicts(&candidate, None, &store).await.unwrap();
        let kinds: Vec<ConflictType> = conflicts.iter().map(|c| c.conflict_type).collect();

        assert_eq!(
            kinds,
            [
                ConflictType::TeacherConflict,
                ConflictType::RoomConflict,
                ConflictType::ClassConflict
            ]
        );
        assert_eq!(
            conflicts[1].description,
            "Room Lab 1 is already booked for Math during this time."
        );
        assert_eq!(
            conflicts[2].description,
            "Class 10-A already has Math scheduled during this time."
        );
    }

    #[tokio::test]
    async fn test_room_axis_skipped_without_room() {
        let room = RoomId::from_u128(0x101);
        let mut existing = draft("Math", OTHER_TEACHER, DayOfWeek::Monday, "09:00", "10:00");
        existing.room_id = Some(room);
        existing.class_id = ClassId::from_u128(0xc2);
        existing.grade_level = "11".to_string();
        let store = store_with(vec![existing]).await;

        let candidate = draft("Chemistry", T, DayOfWeek::Monday, "09:00", "10:00");
        assert!(
            detect_conflicts(&candidate, None, &store)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_room_name_falls_back_to_id() {
        let room = RoomId::from_u128(0x101);
        let mut existing = draft("Math", OTHER_TEACHER, DayOfWeek::Monday, "09:00", "10:00");
        existing.room_id = Some(room);
        existing.class_id = ClassId::from_u128(0xc2);
        existing.grade_level = "11".to_string();
        let store = store_with(vec![existing]).await;

        let mut candidate = draft("Chemistry", T, DayOfWeek::Monday, "09:00", "10:00");
        candidate.room_id = Some(room);
        let conflicts = detect_conflicts(&candidate, None, &store).await.unwrap();

        assert_eq!(conflicts.len(), 1);
        assert_eq!(
            conflicts[0].description,
            format!("Room {} is already booked for Math during this time.", room)
        );
    }

    #[tokio::test]
    async fn test_excluded_entry_is_ignored() {
        let store = InMemoryEntryStore::new();
        let stored = store
            .create(draft("Math", T, DayOfWeek::Monday, "09:00", "10:00"))
            .await
            .unwrap();

        let moved = draft("Math", T, DayOfWeek::Monday, "09:30", "10:30");
        assert!(
            detect_conflicts(&moved, Some(stored.id), &store)
                .await
                .unwrap()
                .is_empty()
        );
        assert_eq!(
            detect_conflicts(&moved, None, &store).await.unwrap().len(),
            2
        );
    }

    #[test]
    fn test_snapshot_ignores_terminal_entries() {
        let mut archived = draft("Math", T, DayOfWeek::Monday, "09:00", "10:00")
            .into_entry(EntryId::from_u128(1), chrono::Utc::now());
        archived.status = EntryStatus::Archived;

        let snapshot = ConflictSnapshot {
            by_teacher: vec![archived.clone()],
            by_room: Vec::new(),
            by_class: vec![archived],
        };
        let candidate = draft("Physics", T, DayOfWeek::Monday, "09:00", "10:00");

        assert!(collect_conflicts(&candidate, None, &snapshot).is_empty());
    }
}
