//! # Sale Repository
//!
//! Database operations for sale lines.
//!
//! Sale lines are written as a block on save and read back in the order
//! they were recorded (`id` order). Each row carries its sale identifier;
//! there is no separate sales header table.

use chrono::NaiveDate;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use stockbook_core::{Money, SaleId, SaleLine};

#[derive(Debug, sqlx::FromRow)]
struct SaleLineRow {
    sale_date: NaiveDate,
    product: String,
    quantity: i64,
    value_cents: i64,
    sale_id: String,
}

impl From<SaleLineRow> for SaleLine {
    fn from(row: SaleLineRow) -> Self {
        SaleLine {
            date: row.sale_date,
            product: row.product,
            quantity: row.quantity,
            value: Money::from_cents(row.value_cents),
            sale_id: SaleId::new(row.sale_id),
        }
    }
}

/// Repository for sale line database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// All sale lines in recorded order.
    pub async fn list(&self) -> DbResult<Vec<SaleLine>> {
        let rows: Vec<SaleLineRow> = sqlx::query_as(
            r#"
            SELECT sale_date, product, quantity, value_cents, sale_id
            FROM sale_lines
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Loaded sale lines");
        Ok(rows.into_iter().map(SaleLine::from).collect())
    }

    /// Lines of one sale in recorded order.
    pub async fn get_lines(&self, sale_id: &SaleId) -> DbResult<Vec<SaleLine>> {
        let rows: Vec<SaleLineRow> = sqlx::query_as(
            r#"
            SELECT sale_date, product, quantity, value_cents, sale_id
            FROM sale_lines
            WHERE sale_id = ?1
            ORDER BY id
            "#,
        )
        .bind(sale_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(SaleLine::from).collect())
    }

    /// Sum of realized values on one day.
    pub async fn total_on(&self, date: NaiveDate) -> DbResult<Money> {
        let total: Option<i64> =
            sqlx::query_scalar("SELECT SUM(value_cents) FROM sale_lines WHERE sale_date = ?1")
                .bind(date)
                .fetch_one(&self.pool)
                .await?;

        Ok(Money::from_cents(total.unwrap_or(0)))
    }

    /// Replaces the whole table with `lines`, preserving their order.
    pub(crate) async fn replace_all(
        conn: &mut SqliteConnection,
        lines: &[SaleLine],
    ) -> DbResult<()> {
        sqlx::query("DELETE FROM sale_lines").execute(&mut *conn).await?;

        for line in lines {
            Self::insert(conn, line).await?;
        }

        debug!(count = lines.len(), "Sale lines written");
        Ok(())
    }

    pub(crate) async fn insert(conn: &mut SqliteConnection, line: &SaleLine) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sale_lines (sale_date, product, quantity, value_cents, sale_id)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(line.date)
        .bind(&line.product)
        .bind(line.quantity)
        .bind(line.value.cents())
        .bind(line.sale_id.as_str())
        .execute(&mut *conn)
        .await?;

        Ok(())
    }
}
