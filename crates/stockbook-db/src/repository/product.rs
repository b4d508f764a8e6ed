//! # Product Repository
//!
//! Database operations for the product catalog.
//!
//! ## Row Mapping
//! ```text
//! ┌──────────────────────────────┐        ┌──────────────────────────────┐
//! │ products (table)             │        │ Product (stockbook-core)     │
//! │  name         TEXT  PK       │ ─────► │  name                        │
//! │  price_cents  INTEGER        │ ─────► │  price: Money                │
//! │  stock        INTEGER        │ ─────► │  stock                       │
//! │  cost_cents   INTEGER NULL   │ ─────► │  cost: Option<Money>         │
//! └──────────────────────────────┘        └──────────────────────────────┘
//! ```

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use stockbook_core::{Money, Product};

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    name: String,
    price_cents: i64,
    stock: i64,
    cost_cents: Option<i64>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            name: row.name,
            price: Money::from_cents(row.price_cents),
            stock: row.stock,
            cost: row.cost_cents.map(Money::from_cents),
        }
    }
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
/// let all = repo.list().await?;
/// let widget = repo.get("Widget").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// All products, in name order.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(
            r#"
            SELECT name, price_cents, stock, cost_cents
            FROM products
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Loaded products");
        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Gets a product by name.
    pub async fn get(&self, name: &str) -> DbResult<Product> {
        let row: Option<ProductRow> = sqlx::query_as(
            r#"
            SELECT name, price_cents, stock, cost_cents
            FROM products
            WHERE name = ?1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::from)
            .ok_or_else(|| DbError::not_found("Product", name))
    }

    /// Counts stored products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Replaces the whole table with `products`.
    ///
    /// Runs on the caller's connection so it can share a transaction with
    /// the other tables.
    pub(crate) async fn replace_all(
        conn: &mut SqliteConnection,
        products: &[Product],
    ) -> DbResult<()> {
        sqlx::query("DELETE FROM products").execute(&mut *conn).await?;

        for product in products {
            sqlx::query(
                r#"
                INSERT INTO products (name, price_cents, stock, cost_cents)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )
            .bind(&product.name)
            .bind(product.price.cents())
            .bind(product.stock)
            .bind(product.cost.map(|c| c.cents()))
            .execute(&mut *conn)
            .await?;
        }

        debug!(count = products.len(), "Products written");
        Ok(())
    }
}
