//! # Timetabler DB
//!
//! PostgreSQL pool, migrations and the [`PgEntryStore`].
//!
//! # Example
//!
//! ```ignore
//! use timetabler_db::{PgEntryStore, init_db_pool, run_migrations};
//!
//! let pool = init_db_pool(&database_url).await?;
//! run_migrations(&pool).await?;
//! let store = PgEntryStore::new(pool);
//! ```

mod entry_store;

pub use entry_store::PgEntryStore;
pub use sqlx::PgPool;

use sqlx::postgres::PgPoolOptions;
use tracing::info;

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Connect a pool to `database_url`.
///
/// The returned pool is cheaply cloneable and meant to be created once at startup.
pub async fn init_db_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;
    info!("Database pool initialized");
    Ok(pool)
}

/// Apply pending migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}
