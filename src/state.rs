use std::sync::Arc;

use timetabler_config::{CorsConfig, SchedulingConfig};
use timetabler_db::{PgEntryStore, PgPool};
use timetabler_scheduling::{EntryStore, GenerationLocks};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntryStore>,
    pub scheduling: SchedulingConfig,
    pub cors_config: CorsConfig,
    pub locks: GenerationLocks,
}

impl AppState {
    /// State over any store, with configuration read from the environment.
    pub fn from_env(store: Arc<dyn EntryStore>) -> Self {
        Self {
            store,
            scheduling: SchedulingConfig::from_env(),
            cors_config: CorsConfig::from_env(),
            locks: GenerationLocks::new(),
        }
    }
}

pub fn init_app_state(db: PgPool) -> AppState {
    AppState::from_env(Arc::new(PgEntryStore::new(db)))
}
