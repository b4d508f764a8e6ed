//! # Database Pool Management
//!
//! Connection pool creation, configuration and whole-store snapshots.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database Lifecycle                                 │
//! │                                                                         │
//! │  Shop::open                                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbConfig::new(path) ← Configure pool settings                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await                                           │
//! │       ├── create file if missing, WAL, foreign keys                    │
//! │       ├── run migrations                                               │
//! │       └── import legacy tables (once)                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  load_snapshot() ──► Snapshot { products, sales, cash }                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ... ledgers mutate in memory ...                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  save_snapshot(&Snapshot) ── one transaction, replace-all              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! SQLite WAL (Write-Ahead Logging) mode is enabled for better crash
//! recovery: an interrupted save leaves the previous snapshot intact.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::legacy::{self, LegacyImport};
use crate::migrations;
use crate::repository::cash::CashRepository;
use crate::repository::product::ProductRepository;
use crate::repository::sale::SaleRepository;
use stockbook_core::Snapshot;

const IN_MEMORY: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/stockbook.db")
///     .max_connections(2)
///     .connect_timeout(Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 2 (one user, one writer)
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// Connection timeout duration.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Whether to run migrations (and the legacy import) on connect.
    /// Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    /// Creates a new database configuration with the given path.
    ///
    /// The file is created on first connect if it doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 2,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            run_migrations: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(IN_MEMORY),
            max_connections: 1, // In-memory requires single connection
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path == Path::new(IN_MEMORY)
    }
}

// =============================================================================
// Database
// =============================================================================

/// Main database handle providing repository access and snapshots.
#[derive(Debug, Clone)]
pub struct Database {
    /// The SQLite connection pool.
    pool: SqlitePool,

    /// Backing file; `None` for an in-memory store.
    path: Option<PathBuf>,
}

impl Database {
    /// Opens the store.
    ///
    /// ## What This Does
    /// 1. Creates the database file if it doesn't exist
    /// 2. Configures SQLite: WAL journal, NORMAL synchronous, foreign keys
    /// 3. Creates the connection pool
    /// 4. Runs migrations and converts legacy tables (if enabled)
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        let base_options = if config.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
        } else {
            SqliteConnectOptions::new()
                .filename(&config.database_path)
                .create_if_missing(true)
        };

        let connect_options = base_options
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true);

        debug!("Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        let db = Database {
            pool,
            path: (!config.is_in_memory()).then(|| config.database_path.clone()),
        };

        if config.run_migrations {
            db.run_migrations().await?;
            db.import_legacy().await?;
        }

        Ok(db)
    }

    /// Runs database migrations. Idempotent.
    pub async fn run_migrations(&self) -> DbResult<()> {
        info!("Running database migrations");
        migrations::run_migrations(&self.pool).await?;
        info!("Migrations complete");
        Ok(())
    }

    /// Converts any legacy-layout tables into the current schema.
    pub async fn import_legacy(&self) -> DbResult<LegacyImport> {
        legacy::import(&self.pool).await
    }

    /// Backing file, if the store lives on disk.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the product repository.
    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    /// Returns the sale repository.
    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.pool.clone())
    }

    /// Returns the cash repository.
    pub fn cash(&self) -> CashRepository {
        CashRepository::new(self.pool.clone())
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    /// Reads the complete store.
    ///
    /// A fresh store yields an empty snapshot.
    pub async fn load_snapshot(&self) -> DbResult<Snapshot> {
        let snapshot = Snapshot {
            products: self.products().list().await?,
            sales: self.sales().list().await?,
            cash: self.cash().list().await?,
        };

        info!(
            products = snapshot.products.len(),
            sale_lines = snapshot.sales.len(),
            cash_entries = snapshot.cash.len(),
            "Snapshot loaded"
        );
        Ok(snapshot)
    }

    /// Replaces the stored contents with `snapshot` in one transaction.
    ///
    /// Either every table is rewritten or, on error, none is.
    pub async fn save_snapshot(&self, snapshot: &Snapshot) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        ProductRepository::replace_all(&mut tx, &snapshot.products).await?;
        SaleRepository::replace_all(&mut tx, &snapshot.sales).await?;
        CashRepository::replace_all(&mut tx, &snapshot.cash).await?;

        tx.commit().await?;

        info!(
            products = snapshot.products.len(),
            sale_lines = snapshot.sales.len(),
            cash_entries = snapshot.cash.len(),
            "Snapshot saved"
        );
        Ok(())
    }

    /// Writes a consistent copy of the whole store to `target`.
    ///
    /// `target` must not exist yet. Uses `VACUUM INTO`, so the copy is
    /// compact and includes anything still in the WAL.
    pub async fn backup_to(&self, target: &Path) -> DbResult<()> {
        sqlx::query("VACUUM INTO ?")
            .bind(target.to_string_lossy().into_owned())
            .execute(&self.pool)
            .await?;

        info!(target = %target.display(), "Store backed up");
        Ok(())
    }

    /// Closes the database connection pool.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Checks if the database can execute queries.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
