//! # Schema Migrations
//!
//! The SQL under `migrations/sqlite/` is compiled into the binary and
//! applied on connect, before the legacy import looks for old tables.
//!
//! ```text
//! Database::new
//!   ├── MIGRATOR.run        _sqlx_migrations bookkeeping, 001_initial_schema
//!   └── legacy::import      vendas / financeiro → current tables (once)
//! ```
//!
//! Applied files are checksummed by sqlx; a released migration is never
//! edited, a change ships as the next `NNN_description.sql`.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations/sqlite");

/// How far a store's schema has been brought forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationStatus {
    /// Migrations shipped with this build.
    pub known: usize,
    /// Migrations recorded as applied in the store.
    pub applied: usize,
}

impl MigrationStatus {
    pub fn is_current(&self) -> bool {
        self.applied >= self.known
    }
}

/// Applies every pending migration. Already-applied ones are skipped.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    debug!(known = MIGRATOR.migrations.len(), "Applying schema migrations");
    MIGRATOR.run(pool).await?;
    info!("Schema is current");
    Ok(())
}

/// Reads the migration bookkeeping table.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<MigrationStatus> {
    let applied: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(pool)
            .await?;

    Ok(MigrationStatus {
        known: MIGRATOR.migrations.len(),
        applied: usize::try_from(applied).unwrap_or_default(),
    })
}
