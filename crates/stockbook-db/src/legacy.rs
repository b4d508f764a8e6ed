//! # Legacy Layout Import
//!
//! Older Stockbook files kept the spreadsheet column layout: sales in a
//! `vendas` table valued by `lucro`, and every cash movement in one
//! `financeiro` table tagged by `tipo`. Both are converted into the current
//! tables the first time such a file is opened, then dropped.
//!
//! ## Conversion
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Legacy → Current                                   │
//! │                                                                         │
//! │  financeiro(data, tipo, descricao, valor)                              │
//! │    tipo 'entrada' ──► CashKind::Income   amount = |valor|              │
//! │    tipo 'saida'   ──► CashKind::Expense  amount = |valor|              │
//! │    'Saldo inicial do dia', 0 ──► opening balance placeholder           │
//! │    placeholders on days with other entries are dropped                 │
//! │                                                                         │
//! │  vendas(data, produto, quantidade, lucro [, id_venda])                 │
//! │    lucro ──► value                                                      │
//! │    missing id_venda ──► "L" + zero-padded rowid (one sale per line)    │
//! │                                                                         │
//! │  Dates: DD/MM/YYYY text ──► NaiveDate                                  │
//! │  Amounts: REAL ──► integer cents (rounded)                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The whole import runs in one transaction: a corrupt row leaves the file
//! exactly as it was.

use std::collections::HashSet;

use chrono::NaiveDate;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::cash::CashRepository;
use crate::repository::sale::SaleRepository;
use stockbook_core::date::parse_day;
use stockbook_core::validation::validate_cash_amount;
use stockbook_core::{CashEntry, CashKind, Money, SaleId, SaleLine};

const LEGACY_CASH_TABLE: &str = "financeiro";
const LEGACY_SALES_TABLE: &str = "vendas";
const LEGACY_OPENING_BALANCE: &str = "Saldo inicial do dia";

/// What an import converted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LegacyImport {
    pub sale_lines: usize,
    pub cash_entries: usize,
}

impl LegacyImport {
    pub fn is_empty(&self) -> bool {
        self.sale_lines == 0 && self.cash_entries == 0
    }
}

/// Converts and drops any legacy tables found in the database.
pub async fn import(pool: &SqlitePool) -> DbResult<LegacyImport> {
    let mut tx = pool.begin().await?;
    let mut report = LegacyImport::default();

    if table_exists(&mut tx, LEGACY_SALES_TABLE).await? {
        report.sale_lines = import_sales(&mut tx).await?;
        sqlx::query("DROP TABLE vendas").execute(&mut *tx).await?;
    }

    if table_exists(&mut tx, LEGACY_CASH_TABLE).await? {
        report.cash_entries = import_cash_movements(&mut tx).await?;
        sqlx::query("DROP TABLE financeiro").execute(&mut *tx).await?;
    }

    tx.commit().await?;

    if !report.is_empty() {
        info!(
            sale_lines = report.sale_lines,
            cash_entries = report.cash_entries,
            "Legacy layout imported"
        );
    }
    Ok(report)
}

async fn table_exists(conn: &mut SqliteConnection, table: &str) -> DbResult<bool> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1")
            .bind(table)
            .fetch_one(&mut *conn)
            .await?;

    Ok(count > 0)
}

async fn has_column(conn: &mut SqliteConnection, table: &str, column: &str) -> DbResult<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pragma_table_info(?1) WHERE name = ?2")
        .bind(table)
        .bind(column)
        .fetch_one(&mut *conn)
        .await?;

    Ok(count > 0)
}

// =============================================================================
// Sales
// =============================================================================

async fn import_sales(conn: &mut SqliteConnection) -> DbResult<usize> {
    let sale_id_column = if has_column(conn, LEGACY_SALES_TABLE, "id_venda").await? {
        "id_venda"
    } else {
        "NULL"
    };

    let sql = format!(
        "SELECT rowid, data, produto, quantidade, lucro, {} FROM vendas ORDER BY rowid",
        sale_id_column
    );
    let rows: Vec<(i64, String, String, i64, Option<f64>, Option<String>)> =
        sqlx::query_as(&sql).fetch_all(&mut *conn).await?;

    for (rowid, date, product, quantity, lucro, sale_id) in &rows {
        let line = SaleLine {
            date: legacy_day(LEGACY_SALES_TABLE, date)?,
            product: product.clone(),
            quantity: *quantity,
            value: legacy_amount(LEGACY_SALES_TABLE, *lucro)?,
            sale_id: match sale_id {
                Some(id) if !id.trim().is_empty() => SaleId::new(id.trim()),
                _ => SaleId::new(format!("L{:07}", rowid)),
            },
        };
        SaleRepository::insert(conn, &line).await?;
    }

    Ok(rows.len())
}

// =============================================================================
// Cash Movements
// =============================================================================

async fn import_cash_movements(conn: &mut SqliteConnection) -> DbResult<usize> {
    let rows: Vec<(String, String, String, Option<f64>)> = sqlx::query_as(
        "SELECT data, tipo, COALESCE(descricao, ''), valor FROM financeiro ORDER BY rowid",
    )
    .fetch_all(&mut *conn)
    .await?;

    let mut entries = Vec::with_capacity(rows.len());
    for (date, kind, description, value) in rows {
        entries.push(convert_cash_row(&date, &kind, description, value)?);
    }

    let entries = drop_busy_placeholders(entries);
    for entry in &entries {
        CashRepository::insert(conn, entry).await?;
    }

    Ok(entries.len())
}

fn convert_cash_row(
    date: &str,
    kind: &str,
    description: String,
    value: Option<f64>,
) -> DbResult<CashEntry> {
    let date = legacy_day(LEGACY_CASH_TABLE, date)?;
    let amount = legacy_amount(LEGACY_CASH_TABLE, value)?.abs();

    let kind = match kind.trim().to_lowercase().as_str() {
        "entrada" => CashKind::Income,
        "saida" | "saída" => CashKind::Expense,
        other => {
            return Err(DbError::corrupt(
                LEGACY_CASH_TABLE,
                format!("unknown tipo '{}'", other),
            ))
        }
    };

    if kind == CashKind::Income && amount.is_zero() && description == LEGACY_OPENING_BALANCE {
        return Ok(CashEntry::opening_balance(date));
    }

    Ok(CashEntry {
        date,
        kind,
        description,
        amount,
    })
}

/// Removes placeholders from days that also hold real entries.
fn drop_busy_placeholders(entries: Vec<CashEntry>) -> Vec<CashEntry> {
    let busy: HashSet<NaiveDate> = entries
        .iter()
        .filter(|e| !e.is_opening_balance())
        .map(|e| e.date)
        .collect();

    let before = entries.len();
    let kept: Vec<CashEntry> = entries
        .into_iter()
        .filter(|e| !(e.is_opening_balance() && busy.contains(&e.date)))
        .collect();

    if kept.len() < before {
        warn!(
            dropped = before - kept.len(),
            "Dropped empty opening balances from legacy cash movements"
        );
    }
    kept
}

// =============================================================================
// Value Conversion
// =============================================================================

fn legacy_day(table: &str, text: &str) -> DbResult<NaiveDate> {
    parse_day(text).map_err(|e| DbError::corrupt(table, e.to_string()))
}

fn legacy_amount(table: &str, value: Option<f64>) -> DbResult<Money> {
    let amount = match value {
        Some(v) if v.is_finite() => Money::from_cents((v * 100.0).round() as i64),
        Some(v) => return Err(DbError::corrupt(table, format!("invalid amount {}", v))),
        None => return Err(DbError::corrupt(table, "missing amount")),
    };

    validate_cash_amount(amount).map_err(|e| DbError::corrupt(table, e.to_string()))?;
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_convert_cash_row_kinds() {
        let income = convert_cash_row("01/03/2024", "entrada", "Sale".into(), Some(12.5)).unwrap();
        assert_eq!(income.kind, CashKind::Income);
        assert_eq!(income.amount.cents(), 1250);
        assert_eq!(income.date, day(2024, 3, 1));

        let expense = convert_cash_row("01/03/2024", "saida", "Rent".into(), Some(-40.0)).unwrap();
        assert_eq!(expense.kind, CashKind::Expense);
        assert_eq!(expense.amount.cents(), 4000);

        assert!(convert_cash_row("01/03/2024", "transfer", "X".into(), Some(1.0)).is_err());
        assert!(convert_cash_row("2024/03/01x", "entrada", "X".into(), Some(1.0)).is_err());
        assert!(convert_cash_row("01/03/2024", "entrada", "X".into(), None).is_err());
    }

    #[test]
    fn test_legacy_placeholder_becomes_opening_balance() {
        let entry = convert_cash_row(
            "02/03/2024",
            "entrada",
            LEGACY_OPENING_BALANCE.to_string(),
            Some(0.0),
        )
        .unwrap();
        assert!(entry.is_opening_balance());
    }

    #[test]
    fn test_drop_busy_placeholders() {
        let entries = vec![
            CashEntry::opening_balance(day(2024, 3, 1)),
            CashEntry {
                date: day(2024, 3, 1),
                kind: CashKind::Expense,
                description: "Rent".into(),
                amount: Money::from_cents(100),
            },
            CashEntry::opening_balance(day(2024, 3, 2)),
        ];

        let kept = drop_busy_placeholders(entries);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].description, "Rent");
        assert!(kept[1].is_opening_balance());
    }

    #[test]
    fn test_legacy_amount_rounding() {
        assert_eq!(legacy_amount("t", Some(0.1 + 0.2)).unwrap().cents(), 30);
        assert_eq!(legacy_amount("t", Some(19.99)).unwrap().cents(), 1999);
        assert_eq!(legacy_amount("t", Some(-7.5)).unwrap().cents(), -750);
        assert!(legacy_amount("t", Some(f64::NAN)).is_err());
        assert!(legacy_amount("t", Some(1e300)).is_err());
    }
}
