//! # Shop Session
//!
//! One open store: the catalog, both ledgers, the working cart and the
//! database they are saved to.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Shop Lifecycle                                 │
//! │                                                                         │
//! │  Shop::open(config)                                                    │
//! │       ├── create the data directory                                    │
//! │       ├── Database::new (migrations + legacy import)                   │
//! │       ├── load_snapshot → Catalog, SalesLedger, CashLedger             │
//! │       └── cash.open_day()  (opening-balance placeholder)               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  add_product / sell / add_to_cart / finalize_cart / add_expense ...    │
//! │  (memory only; a failed call changes nothing)                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  save().await ──► backup (per policy) ──► save_snapshot (one tx)       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  close().await                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cart is never persisted. Unsaved changes are lost when the shop is
//! dropped.

use chrono::{Local, NaiveDate};
use std::path::PathBuf;
use tracing::{info, warn};

use stockbook_core::{
    Cart, CartItem, CashEntry, CashLedger, Catalog, Discount, Money, Product, SaleId,
    SalesLedger, SharedClock, Snapshot,
};
use stockbook_db::Database;

use crate::config::{AppConfig, BackupPolicy};
use crate::error::AppResult;

/// An open shop.
#[derive(Debug)]
pub struct Shop {
    config: AppConfig,
    db: Database,
    catalog: Catalog,
    sales: SalesLedger,
    cash: CashLedger,
    cart: Cart,
}

impl Shop {
    /// Opens the configured store using the system clock.
    pub async fn open(config: AppConfig) -> AppResult<Self> {
        Self::open_with_clock(config, SharedClock::default()).await
    }

    /// Opens the configured store, creating its file and directory if needed.
    pub async fn open_with_clock(config: AppConfig, clock: SharedClock) -> AppResult<Self> {
        let db_config = config.db_config()?;
        if let Some(parent) = db_config.database_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let db = Database::new(db_config).await?;
        Self::with_database(config, db, clock).await
    }

    /// Builds a shop over an already-open database.
    pub async fn with_database(
        config: AppConfig,
        db: Database,
        clock: SharedClock,
    ) -> AppResult<Self> {
        let snapshot = db.load_snapshot().await?;

        let catalog = Catalog::from_products(snapshot.products);
        let sales = SalesLedger::from_lines(snapshot.sales, clock.clone(), config.valuation());
        let mut cash = CashLedger::from_entries(snapshot.cash, clock);
        cash.open_day();

        info!(
            products = catalog.len(),
            sale_lines = sales.len(),
            cash_entries = cash.len(),
            valuation = %sales.valuation(),
            "Shop opened"
        );

        Ok(Shop {
            config,
            db,
            catalog,
            sales,
            cash,
            cart: Cart::new(),
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn sales(&self) -> &SalesLedger {
        &self.sales
    }

    pub fn cash(&self) -> &CashLedger {
        &self.cash
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn today(&self) -> NaiveDate {
        self.cash.today()
    }

    /// Renders an amount with the configured currency display.
    pub fn format_money(&self, amount: Money) -> String {
        self.config.format_money(amount)
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    pub fn add_product(
        &mut self,
        name: &str,
        price: Money,
        stock: i64,
        cost: Option<Money>,
    ) -> AppResult<&Product> {
        Ok(self.catalog.add(name, price, stock, cost)?)
    }

    pub fn edit_product(
        &mut self,
        name: &str,
        price: Option<Money>,
        cost: Option<Money>,
    ) -> AppResult<()> {
        Ok(self.catalog.edit(name, price, cost)?)
    }

    /// Adds `delta` (may be negative) to a product's stock; returns the new level.
    pub fn adjust_stock(&mut self, name: &str, delta: i64) -> AppResult<i64> {
        Ok(self.catalog.adjust_stock(name, delta)?)
    }

    /// Removes a product. Past sale lines that name it are kept.
    pub fn remove_product(&mut self, name: &str) -> AppResult<Product> {
        Ok(self.catalog.remove(name)?)
    }

    // =========================================================================
    // Sales
    // =========================================================================

    /// Sells one product immediately, returning the sale id and its value.
    pub fn sell(
        &mut self,
        product: &str,
        quantity: i64,
        discount: Discount,
    ) -> AppResult<(SaleId, Money)> {
        Ok(self
            .sales
            .sell_direct(&mut self.catalog, product, quantity, discount)?)
    }

    pub fn add_to_cart(
        &mut self,
        product: &str,
        quantity: i64,
        discount: Discount,
    ) -> AppResult<&CartItem> {
        Ok(self.cart.add(&self.catalog, product, quantity, discount)?)
    }

    pub fn remove_from_cart(&mut self, index: usize) -> AppResult<CartItem> {
        Ok(self.cart.remove(index)?)
    }

    pub fn clear_cart(&mut self) {
        self.cart.clear();
    }

    /// Commits the cart as one sale. On error nothing changes.
    pub fn finalize_cart(&mut self) -> AppResult<(SaleId, Money)> {
        Ok(self
            .sales
            .finalize_cart(&mut self.cart, &mut self.catalog)?)
    }

    // =========================================================================
    // Cash
    // =========================================================================

    /// Records income, dated today unless `date` is given.
    pub fn add_income(
        &mut self,
        description: &str,
        amount: Money,
        date: Option<NaiveDate>,
    ) -> AppResult<&CashEntry> {
        Ok(self.cash.add_income(description, amount, date)?)
    }

    /// Records an expense. Only today is accepted.
    pub fn add_expense(
        &mut self,
        description: &str,
        amount: Money,
        date: Option<NaiveDate>,
    ) -> AppResult<&CashEntry> {
        Ok(self.cash.add_expense(description, amount, date)?)
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Current contents in store shape.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            products: self.catalog.iter().cloned().collect(),
            sales: self.sales.lines().to_vec(),
            cash: self.cash.entries().to_vec(),
        }
    }

    /// Writes everything to the store in one transaction, after copying the
    /// previous contents aside if the backup policy asks for it.
    pub async fn save(&self) -> AppResult<()> {
        self.backup().await?;
        self.db.save_snapshot(&self.snapshot()).await?;
        Ok(())
    }

    /// Copies the stored contents to a timestamped file in the backup
    /// directory, following the configured policy.
    ///
    /// Returns the path written, or `None` when the policy is off, the store
    /// is in memory, or a best-effort copy failed.
    pub async fn backup(&self) -> AppResult<Option<PathBuf>> {
        let policy = self.config.store.backup;
        let db_path = match (policy, self.db.path()) {
            (BackupPolicy::Off, _) | (_, None) => return Ok(None),
            (_, Some(path)) => path,
        };

        let dir = self.config.backup_dir(db_path);
        let stem = db_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "stockbook".to_string());
        let stamp = Local::now().format("%Y%m%d-%H%M%S-%3f").to_string();

        let written: AppResult<PathBuf> = async {
            tokio::fs::create_dir_all(&dir).await?;

            let mut target = dir.join(format!("{}-{}.db", stem, stamp));
            let mut attempt = 1;
            while tokio::fs::try_exists(&target).await? {
                target = dir.join(format!("{}-{}-{}.db", stem, stamp, attempt));
                attempt += 1;
            }

            self.db.backup_to(&target).await?;
            Ok(target)
        }
        .await;

        match written {
            Ok(target) => Ok(Some(target)),
            Err(err) if policy == BackupPolicy::BestEffort => {
                warn!(error = %err, dir = %dir.display(), "Backup failed, saving anyway");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Closes the store without saving.
    pub async fn close(self) {
        self.db.close().await;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use stockbook_core::{ErrorKind, SaleFilter, Valuation};
    use stockbook_db::DbConfig;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn cents(c: i64) -> Money {
        Money::from_cents(c)
    }

    async fn shop_on(today: NaiveDate, config: AppConfig) -> Shop {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        Shop::with_database(config, db, SharedClock::fixed(today))
            .await
            .unwrap()
    }

    async fn stocked_shop() -> Shop {
        let mut shop = shop_on(day(2024, 3, 15), AppConfig::default()).await;
        shop.add_product("Widget", cents(1000), 5, Some(cents(600)))
            .unwrap();
        shop.add_product("Gadget", cents(250), 10, None).unwrap();
        shop
    }

    #[tokio::test]
    async fn test_open_records_opening_balance() {
        let shop = shop_on(day(2024, 3, 15), AppConfig::default()).await;

        assert_eq!(shop.cash().len(), 1);
        assert!(shop.cash().entries()[0].is_opening_balance());

        let daily = shop.cash().daily_summary();
        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].date, day(2024, 3, 15));
        assert!(daily[0].net.is_zero());
    }

    #[tokio::test]
    async fn test_direct_sale() {
        let mut shop = stocked_shop().await;

        let (sale_id, value) = shop
            .sell("Widget", 2, Discount::from_percentage(10.0).unwrap())
            .unwrap();

        assert_eq!(value, cents(1800));
        assert_eq!(shop.catalog().get("Widget").unwrap().stock, 3);
        assert_eq!(shop.sales().details_for_sale(&sale_id).len(), 1);
    }

    #[tokio::test]
    async fn test_cart_checkout() {
        let mut shop = stocked_shop().await;

        shop.add_to_cart("Widget", 1, Discount::none()).unwrap();
        shop.add_to_cart("Gadget", 4, Discount::none()).unwrap();
        assert_eq!(shop.cart().total(), cents(2000));

        let (sale_id, total) = shop.finalize_cart().unwrap();
        assert_eq!(total, cents(2000));
        assert!(shop.cart().is_empty());
        assert_eq!(shop.catalog().get("Widget").unwrap().stock, 4);
        assert_eq!(shop.catalog().get("Gadget").unwrap().stock, 6);

        let grouped: Vec<_> = shop.sales().grouped_sales().collect();
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[0].sale_id, sale_id);
        assert_eq!(grouped[0].quantity, 5);
        assert_eq!(grouped[0].value, cents(2000));
    }

    #[tokio::test]
    async fn test_failed_checkout_changes_nothing() {
        let mut shop = stocked_shop().await;

        shop.add_to_cart("Widget", 3, Discount::none()).unwrap();
        shop.add_to_cart("Gadget", 1, Discount::none()).unwrap();
        shop.adjust_stock("Widget", -4).unwrap();

        let err = shop.finalize_cart().unwrap_err();
        assert_eq!(err.core_kind(), Some(ErrorKind::InvalidState));
        assert_eq!(shop.cart().len(), 2);
        assert_eq!(shop.catalog().get("Gadget").unwrap().stock, 10);
        assert!(shop.sales().is_empty());
    }

    #[tokio::test]
    async fn test_profit_valuation_from_config() {
        let mut config = AppConfig::default();
        config.sales.valuation = Valuation::Profit;

        let mut shop = shop_on(day(2024, 3, 15), config).await;
        shop.add_product("Widget", cents(1000), 5, Some(cents(600)))
            .unwrap();

        let (_, value) = shop.sell("Widget", 2, Discount::none()).unwrap();
        assert_eq!(value, cents(800));
    }

    #[tokio::test]
    async fn test_expense_only_today() {
        let mut shop = stocked_shop().await;

        let err = shop
            .add_expense("Rent", cents(40000), Some(day(2024, 3, 14)))
            .unwrap_err();
        assert_eq!(err.core_kind(), Some(ErrorKind::InvalidState));

        shop.add_expense("Rent", cents(40000), None).unwrap();
        shop.add_income("Float", cents(5000), Some(day(2024, 3, 1)))
            .unwrap();

        // The placeholder for today is replaced by the real entry
        assert_eq!(shop.cash().len(), 2);
        assert_eq!(shop.cash().total_for_day(shop.today()), cents(-40000));
    }

    #[tokio::test]
    async fn test_errors_surface_with_kind() {
        let mut shop = stocked_shop().await;

        let dup = shop.add_product("Widget", cents(1), 1, None).unwrap_err();
        assert_eq!(dup.core_kind(), Some(ErrorKind::DuplicateKey));

        let missing = shop.sell("Ghost", 1, Discount::none()).unwrap_err();
        assert_eq!(missing.core_kind(), Some(ErrorKind::NotFound));

        let index = shop.remove_from_cart(0).unwrap_err();
        assert_eq!(index.core_kind(), Some(ErrorKind::IndexError));
    }

    #[tokio::test]
    async fn test_save_and_reopen() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let clock = SharedClock::fixed(day(2024, 3, 15));

        let mut shop = Shop::with_database(AppConfig::default(), db.clone(), clock.clone())
            .await
            .unwrap();
        shop.add_product("Widget", cents(1000), 5, None).unwrap();
        shop.sell("Widget", 1, Discount::none()).unwrap();
        shop.add_income("Sales", cents(1000), None).unwrap();
        shop.add_to_cart("Widget", 1, Discount::none()).unwrap();
        shop.save().await.unwrap();
        let saved = shop.snapshot();

        let reopened = Shop::with_database(AppConfig::default(), db, clock)
            .await
            .unwrap();
        assert_eq!(reopened.snapshot(), saved);
        assert!(reopened.cart().is_empty());
        assert_eq!(
            reopened
                .sales()
                .filter_by_date(&SaleFilter::new().month(3).year(2024))
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn test_format_money_uses_display_settings() {
        let mut config = AppConfig::default();
        config.display.currency_symbol = "€".into();
        config.display.decimal_separator = ",".into();

        let shop = shop_on(day(2024, 3, 15), config).await;
        assert_eq!(shop.format_money(cents(1805)), "€18,05");
    }
}
