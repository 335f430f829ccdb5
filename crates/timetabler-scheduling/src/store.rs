//! The entry store consumed by the scheduling core.
//!
//! The `find_by_*` lookups back the three conflict axes and only return entries
//! whose status still occupies a slot (draft, published, active). Every
//! implementation must reject a second entry with the same [`SlotKey`] with
//! [`StoreError::UniqueConstraintViolation`].

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::instrument;

use timetabler_models::{
    ClassId, DayOfWeek, EntryId, EntryScope, RoomId, SlotKey, TeacherId, TimetableEntry,
    TimetableEntryDraft,
};

use crate::error::StoreError;

#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Store a new draft entry, assigning its id and timestamps.
    async fn create(&self, draft: TimetableEntryDraft) -> Result<TimetableEntry, StoreError>;

    async fn get(&self, id: EntryId) -> Result<Option<TimetableEntry>, StoreError>;

    /// Persist every mutable field of `entry`; `updated_at` is refreshed.
    async fn update(&self, entry: &TimetableEntry) -> Result<TimetableEntry, StoreError>;

    async fn delete(&self, id: EntryId) -> Result<(), StoreError>;

    async fn find_by_teacher(
        &self,
        teacher_id: TeacherId,
        day: DayOfWeek,
        academic_year: &str,
    ) -> Result<Vec<TimetableEntry>, StoreError>;

    async fn find_by_room(
        &self,
        room_id: RoomId,
        day: DayOfWeek,
        academic_year: &str,
    ) -> Result<Vec<TimetableEntry>, StoreError>;

    /// `section` is matched exactly; `None` only matches entries without a section.
    async fn find_by_class(
        &self,
        class_id: ClassId,
        section: Option<&str>,
        day: DayOfWeek,
        academic_year: &str,
    ) -> Result<Vec<TimetableEntry>, StoreError>;

    /// Every entry of a class in one academic year, in any status.
    async fn find_by_class_all_days(
        &self,
        class_id: ClassId,
        academic_year: &str,
    ) -> Result<Vec<TimetableEntry>, StoreError>;

    /// Every entry of a scope, in any status, ordered by day then start time.
    async fn find_by_scope(&self, scope: &EntryScope) -> Result<Vec<TimetableEntry>, StoreError>;
}

/// Vec-backed store for tests and local tooling.
#[derive(Debug, Default)]
pub struct InMemoryEntryStore {
    entries: RwLock<Vec<TimetableEntry>>,
}

impl InMemoryEntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    async fn select<F>(&self, predicate: F) -> Vec<TimetableEntry>
    where
        F: Fn(&TimetableEntry) -> bool,
    {
        let mut found: Vec<TimetableEntry> = self
            .entries
            .read()
            .await
            .iter()
            .filter(|&e| predicate(e))
            .cloned()
            .collect();
        found.sort_by_key(|e| (e.details.day_of_week, e.details.start_time));
        found
    }
}

/// Only non-terminal entries hold their slot; archived and cancelled ones release it.
fn slot_taken(entries: &[TimetableEntry], key: &SlotKey, except: Option<EntryId>) -> bool {
    entries.iter().any(|e| {
        Some(e.id) != except && e.participates_in_conflicts() && e.details.slot_key() == *key
    })
}

#[async_trait]
impl EntryStore for InMemoryEntryStore {
    #[instrument(skip(self, draft), fields(subject = %draft.subject_name))]
    async fn create(&self, draft: TimetableEntryDraft) -> Result<TimetableEntry, StoreError> {
        debug_assert!(draft.has_consistent_timing());
        let mut entries = self.entries.write().await;

        let key = draft.slot_key();
        if slot_taken(&entries, &key, None) {
            return Err(StoreError::UniqueConstraintViolation(key.to_string()));
        }

        let entry = draft.into_entry(EntryId::new(), Utc::now());
        entries.push(entry.clone());
        Ok(entry)
    }

    async fn get(&self, id: EntryId) -> Result<Option<TimetableEntry>, StoreError> {
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .find(|e| e.id == id)
            .cloned())
    }

    #[instrument(skip(self, entry), fields(entry.id = %entry.id))]
    async fn update(&self, entry: &TimetableEntry) -> Result<TimetableEntry, StoreError> {
        let mut entries = self.entries.write().await;

        debug_assert!(entry.details.has_consistent_timing());
        let key = entry.details.slot_key();
        if entry.participates_in_conflicts() && slot_taken(&entries, &key, Some(entry.id)) {
            return Err(StoreError::UniqueConstraintViolation(key.to_string()));
        }

        let stored = entries
            .iter_mut()
            .find(|e| e.id == entry.id)
            .ok_or(StoreError::NotFound(entry.id))?;

        let mut updated = entry.clone();
        updated.created_at = stored.created_at;
        updated.updated_at = Utc::now();
        *stored = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, id: EntryId) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|e| e.id != id);
        if entries.len() == before {
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
        Ok(self
            .select(|e| {
                e.participates_in_conflicts()
                    && e.details.teacher_id == teacher_id
                    && e.details.day_of_week == day
                    && e.details.academic_year == academic_year
            })
            .await)
    }

    async fn find_by_room(
        &self,
        room_id: RoomId,
        day: DayOfWeek,
        academic_year: &str,
    ) -> Result<Vec<TimetableEntry>, StoreError> {
        Ok(self
            .select(|e| {
                e.participates_in_conflicts()
                    && e.details.room_id == Some(room_id)
                    && e.details.day_of_week == day
                    && e.details.academic_year == academic_year
            })
            .await)
    }

    async fn find_by_class(
        &self,
        class_id: ClassId,
        section: Option<&str>,
        day: DayOfWeek,
        academic_year: &str,
    ) -> Result<Vec<TimetableEntry>, StoreError> {
        Ok(self
            .select(|e| {
                e.participates_in_conflicts()
                    && e.details.class_id == class_id
                    && e.details.section.as_deref() == section
                    && e.details.day_of_week == day
                    && e.details.academic_year == academic_year
            })
            .await)
    }

    async fn find_by_class_all_days(
        &self,
        class_id: ClassId,
        academic_year: &str,
    ) -> Result<Vec<TimetableEntry>, StoreError> {
        Ok(self
            .select(|e| e.details.class_id == class_id && e.details.academic_year == academic_year)
            .await)
    }

    async fn find_by_scope(&self, scope: &EntryScope) -> Result<Vec<TimetableEntry>, StoreError> {
        Ok(self.select(|e| scope.matches(&e.details)).await)
    }
}
