use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::instrument;

use timetabler_models::{
    ClassId, DayOfWeek, EntryId, EntryScope, RoomId, SchoolId, SlotKey, TeacherId, TimetableEntry,
    TimetableEntryDraft,
};
use timetabler_scheduling::{EntryStore, StoreError};

const ENTRY_COLUMNS: &str = r#"id, school_id, academic_year, grade_level, section,
    class_id, subject_id, subject_name, teacher_id, teacher_name,
    day_of_week, start_time, end_time, duration_minutes, period_number,
    room_id, room_name, room_capacity, room_type, equipment,
    priority_level, is_fixed, recurrence_type, recurrence_end_date,
    status, is_cancelled, cancellation_reason, has_conflicts, conflict_details,
    created_at, updated_at"#;

const NON_TERMINAL: &str = "status IN ('draft', 'published', 'active')";

/// [`EntryStore`] backed by the `timetable_entries` table.
#[derive(Clone, Debug)]
pub struct PgEntryStore {
    db: PgPool,
}

impl PgEntryStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub fn pool(&self) -> &PgPool {
        &self.db
    }

    /// Remove every entry of one class in one academic year, whatever its status.
    #[instrument(skip(self))]
    pub async fn delete_class_entries(
        &self,
        school_id: SchoolId,
        academic_year: &str,
        class_id: ClassId,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"DELETE FROM timetable_entries
               WHERE school_id = $1 AND academic_year = $2 AND class_id = $3"#,
        )
        .bind(school_id)
        .bind(academic_year)
        .bind(class_id)
        .execute(&self.db)
        .await
        .map_err(backend)?;

        Ok(result.rows_affected())
    }
}

fn backend(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.into())
}

fn write_error(e: sqlx::Error, key: &SlotKey) -> StoreError {
    if let sqlx::Error::Database(db_err) = &e
        && db_err.is_unique_violation()
    {
        return StoreError::UniqueConstraintViolation(key.to_string());
    }
    backend(e)
}

#[async_trait]
impl EntryStore for PgEntryStore {
    #[instrument(skip(self, draft), fields(subject = %draft.subject_name))]
    async fn create(&self, draft: TimetableEntryDraft) -> Result<TimetableEntry, StoreError> {
        let query = format!(
            r#"INSERT INTO timetable_entries (
                   school_id, academic_year, grade_level, section,
                   class_id, subject_id, subject_name, teacher_id, teacher_name,
                   day_of_week, start_time, end_time, duration_minutes, period_number,
                   room_id, room_name, room_capacity, room_type, equipment,
                   priority_level, is_fixed, recurrence_type, recurrence_end_date)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                       $15, $16, $17, $18, $19, $20, $21, $22, $23)
               RETURNING {ENTRY_COLUMNS}"#
        );

        sqlx::query_as::<_, TimetableEntry>(&query)
            .bind(draft.school_id)
            .bind(&draft.academic_year)
            .bind(&draft.grade_level)
            .bind(&draft.section)
            .bind(draft.class_id)
            .bind(draft.subject_id)
            .bind(&draft.subject_name)
            .bind(draft.teacher_id)
            .bind(&draft.teacher_name)
            .bind(draft.day_of_week)
            .bind(draft.start_time)
            .bind(draft.end_time)
            .bind(draft.duration_minutes)
            .bind(draft.period_number)
            .bind(draft.room_id)
            .bind(&draft.room_name)
            .bind(draft.room_capacity)
            .bind(&draft.room_type)
            .bind(Json(&draft.equipment))
            .bind(draft.priority_level)
            .bind(draft.is_fixed)
            .bind(draft.recurrence_type)
            .bind(draft.recurrence_end_date)
            .fetch_one(&self.db)
            .await
            .map_err(|e| write_error(e, &draft.slot_key()))
    }

    #[instrument(skip(self))]
    async fn get(&self, id: EntryId) -> Result<Option<TimetableEntry>, StoreError> {
        let query = format!("SELECT {ENTRY_COLUMNS} FROM timetable_entries WHERE id = $1");

        sqlx::query_as::<_, TimetableEntry>(&query)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(backend)
    }

    #[instrument(skip(self, entry), fields(entry.id = %entry.id))]
    async fn update(&self, entry: &TimetableEntry) -> Result<TimetableEntry, StoreError> {
        let d = &entry.details;
        let query = format!(
            r#"UPDATE timetable_entries SET
                   teacher_id = $2, teacher_name = $3,
                   day_of_week = $4, start_time = $5, end_time = $6,
                   duration_minutes = $7, period_number = $8,
                   room_id = $9, room_name = $10, room_capacity = $11, room_type = $12,
                   equipment = $13, priority_level = $14, is_fixed = $15,
                   recurrence_type = $16, recurrence_end_date = $17,
                   status = $18, is_cancelled = $19, cancellation_reason = $20,
                   has_conflicts = $21, conflict_details = $22,
                   subject_name = $23, updated_at = NOW()
               WHERE id = $1
               RETURNING {ENTRY_COLUMNS}"#
        );

        sqlx::query_as::<_, TimetableEntry>(&query)
            .bind(entry.id)
            .bind(d.teacher_id)
            .bind(&d.teacher_name)
            .bind(d.day_of_week)
            .bind(d.start_time)
            .bind(d.end_time)
            .bind(d.duration_minutes)
            .bind(d.period_number)
            .bind(d.room_id)
            .bind(&d.room_name)
            .bind(d.room_capacity)
            .bind(&d.room_type)
            .bind(Json(&d.equipment))
            .bind(d.priority_level)
            .bind(d.is_fixed)
            .bind(d.recurrence_type)
            .bind(d.recurrence_end_date)
            .bind(entry.status)
            .bind(entry.is_cancelled)
            .bind(&entry.cancellation_reason)
            .bind(entry.has_conflicts)
            .bind(Json(&entry.conflict_details))
            .bind(&d.subject_name)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| write_error(e, &d.slot_key()))?
            .ok_or(StoreError::NotFound(entry.id))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: EntryId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM timetable_entries WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn find_by_teacher(
        &self,
        teacher_id: TeacherId,
        day: DayOfWeek,
        academic_year: &str,
    ) -> Result<Vec<TimetableEntry>, StoreError> {
        let query = format!(
            r#"SELECT {ENTRY_COLUMNS} FROM timetable_entries
               WHERE teacher_id = $1 AND day_of_week = $2 AND academic_year = $3
                 AND {NON_TERMINAL}
               ORDER BY start_time"#
        );

        sqlx::query_as::<_, TimetableEntry>(&query)
            .bind(teacher_id)
            .bind(day)
            .bind(academic_year)
            .fetch_all(&self.db)
            .await
            .map_err(backend)
    }

    async fn find_by_room(
        &self,
        room_id: RoomId,
        day: DayOfWeek,
        academic_year: &str,
    ) -> Result<Vec<TimetableEntry>, StoreError> {
        let query = format!(
            r#"SELECT {ENTRY_COLUMNS} FROM timetable_entries
               WHERE room_id = $1 AND day_of_week = $2 AND academic_year = $3
                 AND {NON_TERMINAL}
               ORDER BY start_time"#
        );

        sqlx::query_as::<_, TimetableEntry>(&query)
            .bind(room_id)
            .bind(day)
            .bind(academic_year)
            .fetch_all(&self.db)
            .await
            .map_err(backend)
    }

    async fn find_by_class(
        &self,
        class_id: ClassId,
        section: Option<&str>,
        day: DayOfWeek,
        academic_year: &str,
    ) -> Result<Vec<TimetableEntry>, StoreError> {
        let query = format!(
            r#"SELECT {ENTRY_COLUMNS} FROM timetable_entries
               WHERE class_id = $1 AND section IS NOT DISTINCT FROM $2
                 AND day_of_week = $3 AND academic_year = $4
                 AND {NON_TERMINAL}
               ORDER BY start_time"#
        );

        sqlx::query_as::<_, TimetableEntry>(&query)
            .bind(class_id)
            .bind(section)
            .bind(day)
            .bind(academic_year)
            .fetch_all(&self.db)
            .await
            .map_err(backend)
    }

    async fn find_by_class_all_days(
        &self,
        class_id: ClassId,
        academic_year: &str,
    ) -> Result<Vec<TimetableEntry>, StoreError> {
        let query = format!(
            r#"SELECT {ENTRY_COLUMNS} FROM timetable_entries
               WHERE class_id = $1 AND academic_year = $2
               ORDER BY day_of_week, start_time"#
        );

        sqlx::query_as::<_, TimetableEntry>(&query)
            .bind(class_id)
            .bind(academic_year)
            .fetch_all(&self.db)
            .await
            .map_err(backend)
    }

    #[instrument(skip(self))]
    async fn find_by_scope(&self, scope: &EntryScope) -> Result<Vec<TimetableEntry>, StoreError> {
        let query = format!(
            r#"SELECT {ENTRY_COLUMNS} FROM timetable_entries
               WHERE school_id = $1 AND academic_year = $2 AND grade_level = $3
                 AND section IS NOT DISTINCT FROM $4
               ORDER BY day_of_week, start_time"#
        );

        sqlx::query_as::<_, TimetableEntry>(&query)
            .bind(scope.school_id)
            .bind(&scope.academic_year)
            .bind(&scope.grade_level)
            .bind(&scope.section)
            .fetch_all(&self.db)
            .await
            .map_err(backend)
    }
}
