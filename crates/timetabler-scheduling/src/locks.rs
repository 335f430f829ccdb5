//! Serialization of generation runs per (school, academic year, class).
//!
//! Two concurrent runs for the same class could each check conflicts against
//! a snapshot without the other's commits. Holding the class's guard for the
//! whole run rules that out; runs for different classes proceed in parallel.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use timetabler_models::{ClassId, GenerateRequest, SchoolId, TimetableEntryDraft};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GenerationKey {
    pub school_id: SchoolId,
    pub academic_year: String,
    pub class_id: ClassId,
}

impl From<&GenerateRequest> for GenerationKey {
    fn from(request: &GenerateRequest) -> Self {
        Self {
            school_id: request.school_id,
            academic_year: request.academic_year.clone(),
            class_id: request.class_id,
        }
    }
}

impl From<&TimetableEntryDraft> for GenerationKey {
    fn from(draft: &TimetableEntryDraft) -> Self {
        Self {
            school_id: draft.school_id,
            academic_year: draft.academic_year.clone(),
            class_id: draft.class_id,
        }
    }
}

/// Also taken by direct entry writes, so a write and a generation run for the
/// same class never interleave their check and commit.
#[derive(Debug, Clone, Default)]
pub struct GenerationLocks {
    inner: Arc<Mutex<HashMap<GenerationKey, Arc<Mutex<()>>>>>,
}

impl GenerationLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`. The guard releases it on drop.
    pub async fn acquire(&self, key: GenerationKey) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.inner.lock().await;
            // Keys nobody holds or waits on can go.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(key).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Keys currently held or awaited.
    pub async fn active(&self) -> usize {
        self.inner.lock().await.len()
    }
}
