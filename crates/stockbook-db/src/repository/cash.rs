//! # Cash Repository
//!
//! Database operations for cash entries. Amounts are stored as
//! non-negative cents; the `kind` column carries the sign.

use chrono::NaiveDate;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use stockbook_core::{CashEntry, CashKind, Money};

#[derive(Debug, sqlx::FromRow)]
struct CashEntryRow {
    entry_date: NaiveDate,
    kind: CashKind,
    description: String,
    amount_cents: i64,
}

impl From<CashEntryRow> for CashEntry {
    fn from(row: CashEntryRow) -> Self {
        CashEntry {
            date: row.entry_date,
            kind: row.kind,
            description: row.description,
            amount: Money::from_cents(row.amount_cents),
        }
    }
}

/// Repository for cash entry database operations.
#[derive(Debug, Clone)]
pub struct CashRepository {
    pool: SqlitePool,
}

impl CashRepository {
    /// Creates a new CashRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CashRepository { pool }
    }

    /// All entries in recorded order.
    pub async fn list(&self) -> DbResult<Vec<CashEntry>> {
        let rows: Vec<CashEntryRow> = sqlx::query_as(
            r#"
            SELECT entry_date, kind, description, amount_cents
            FROM cash_entries
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Loaded cash entries");
        Ok(rows.into_iter().map(CashEntry::from).collect())
    }

    /// Entries of one day in recorded order.
    pub async fn list_for_day(&self, date: NaiveDate) -> DbResult<Vec<CashEntry>> {
        let rows: Vec<CashEntryRow> = sqlx::query_as(
            r#"
            SELECT entry_date, kind, description, amount_cents
            FROM cash_entries
            WHERE entry_date = ?1
            ORDER BY id
            "#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CashEntry::from).collect())
    }

    /// Replaces the whole table with `entries`, preserving their order.
    pub(crate) async fn replace_all(
        conn: &mut SqliteConnection,
        entries: &[CashEntry],
    ) -> DbResult<()> {
        sqlx::query("DELETE FROM cash_entries")
            .execute(&mut *conn)
            .await?;

        for entry in entries {
            Self::insert(conn, entry).await?;
        }

        debug!(count = entries.len(), "Cash entries written");
        Ok(())
    }

    pub(crate) async fn insert(conn: &mut SqliteConnection, entry: &CashEntry) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO cash_entries (entry_date, kind, description, amount_cents)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(entry.date)
        .bind(entry.kind)
        .bind(&entry.description)
        .bind(entry.amount.cents())
        .execute(&mut *conn)
        .await?;

        Ok(())
    }
}
