//! # Sales Ledger
//!
//! Append-only record of sold line items, grouped by sale identifier.
//!
//! ## Sale Flows
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Two Ways To Sell                                 │
//! │                                                                         │
//! │  Direct sale                       Cart sale                            │
//! │  ───────────                       ─────────                            │
//! │  sell_direct(product, qty, disc)   cart.add(...) × N                    │
//! │       │                                 │                               │
//! │       ▼                                 ▼                               │
//! │  check stock                       finalize_cart(cart, catalog)         │
//! │       │                                 │                               │
//! │       ▼                                 ▼                               │
//! │  stock -= qty                      stage: every item re-checked         │
//! │  1 line, fresh SaleId                   │  (nothing mutated yet)        │
//! │                                         ▼                               │
//! │                                    apply: stock -= qty per item         │
//! │                                    N lines, one shared SaleId           │
//! │                                    cart cleared                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Sale Identifiers
//! Identifiers are eight uppercase hex characters taken from a UUID v4.
//! A candidate that already names a sale in the ledger is discarded and a
//! new one drawn, so identifiers stay unique within a ledger.

use std::collections::{HashMap, HashSet};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::cart::Cart;
use crate::catalog::Catalog;
use crate::clock::SharedClock;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Discount, SaleId, SaleLine, Valuation};
use crate::validation::{validate_discount, validate_product_amounts, validate_quantity};

const SALE_ID_LEN: usize = 8;

// =============================================================================
// Query Types
// =============================================================================

/// One row of the grouped sales view: every line of a sale folded together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleSummary {
    /// Date of the first line seen for this sale.
    pub date: NaiveDate,
    pub sale_id: SaleId,
    /// Distinct product names, in the order they first appear.
    pub products: Vec<String>,
    pub quantity: i64,
    pub value: Money,
}

impl SaleSummary {
    /// Product names joined for display (`"Widget, Gadget"`).
    pub fn products_label(&self) -> String {
        self.products.join(", ")
    }
}

/// Criteria for [`SalesLedger::filter_by_date`]. Unset fields match anything.
///
/// ```rust
/// use stockbook_core::sales::SaleFilter;
///
/// let march = SaleFilter::new().month(3).year(2024);
/// let widget_today = SaleFilter::new().on_day(15).month(3).year(2024).product("Widget");
/// # let _ = (march, widget_today);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaleFilter {
    pub day: Option<u32>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub product: Option<String>,
}

impl SaleFilter {
    pub fn new() -> Self {
        SaleFilter::default()
    }

    /// Day of month (1-31).
    pub fn on_day(mut self, day: u32) -> Self {
        self.day = Some(day);
        self
    }

    pub fn month(mut self, month: u32) -> Self {
        self.month = Some(month);
        self
    }

    pub fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    /// Exact, case-sensitive product name.
    pub fn product(mut self, product: impl Into<String>) -> Self {
        self.product = Some(product.into());
        self
    }

    /// Checks a line against every supplied criterion.
    pub fn matches(&self, line: &SaleLine) -> bool {
        self.day.map_or(true, |d| line.date.day() == d)
            && self.month.map_or(true, |m| line.date.month() == m)
            && self.year.map_or(true, |y| line.date.year() == y)
            && self.product.as_deref().map_or(true, |p| line.product == p)
    }
}

// =============================================================================
// Sales Ledger
// =============================================================================

/// Append-only sales history.
///
/// ## Invariants
/// - Lines are never edited or removed
/// - Every line belongs to exactly one `SaleId`; all lines of a cart sale
///   share theirs
#[derive(Debug, Clone)]
pub struct SalesLedger {
    lines: Vec<SaleLine>,
    known_ids: HashSet<SaleId>,
    valuation: Valuation,
    clock: SharedClock,
}

impl SalesLedger {
    /// Creates an empty ledger.
    pub fn new(clock: SharedClock, valuation: Valuation) -> Self {
        SalesLedger::from_lines(Vec::new(), clock, valuation)
    }

    /// Rebuilds a ledger from stored lines, keeping their order.
    pub fn from_lines(lines: Vec<SaleLine>, clock: SharedClock, valuation: Valuation) -> Self {
        let known_ids = lines.iter().map(|l| l.sale_id.clone()).collect();
        SalesLedger {
            lines,
            known_ids,
            valuation,
            clock,
        }
    }

    pub fn valuation(&self) -> Valuation {
        self.valuation
    }

    // =========================================================================
    // Recording Sales
    // =========================================================================

    /// Sells one product immediately.
    ///
    /// Returns the new sale's identifier and its realized value.
    ///
    /// ## Errors
    /// - `ProductNotFound` if the product is not in the catalog
    /// - `InsufficientStock` if `quantity` exceeds stock (nothing changes)
    pub fn sell_direct(
        &mut self,
        catalog: &mut Catalog,
        product: &str,
        quantity: i64,
        discount: Discount,
    ) -> CoreResult<(SaleId, Money)> {
        validate_quantity(quantity)?;
        validate_discount(discount)?;

        let (unit_price, unit_cost) = {
            let p = catalog.get(product)?;
            validate_product_amounts(p)?;
            if !p.can_sell(quantity) {
                return Err(CoreError::InsufficientStock {
                    product: p.name.clone(),
                    available: p.stock,
                    requested: quantity,
                });
            }
            (p.discounted_price(discount), p.cost)
        };

        catalog.apply_stock_deltas(&[(product, -quantity)])?;

        let value = self.valuation.realize(unit_price, unit_cost, quantity);
        let sale_id = self.next_sale_id();
        self.push_line(product.to_string(), quantity, value, sale_id.clone());

        info!(
            sale_id = %sale_id,
            product = %product,
            quantity,
            value = %value,
            "Direct sale recorded"
        );

        Ok((sale_id, value))
    }

    /// Commits every cart item as one sale.
    ///
    /// The whole cart is checked against current stock first (a product may
    /// have been edited, restocked or removed since its item was added). Only
    /// when every item passes are stock levels decremented and lines appended,
    /// in cart order, under one shared identifier. The cart is then cleared.
    ///
    /// On any error the catalog, this ledger and the cart are left as they
    /// were.
    pub fn finalize_cart(
        &mut self,
        cart: &mut Cart,
        catalog: &mut Catalog,
    ) -> CoreResult<(SaleId, Money)> {
        if cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        let deltas: Vec<(&str, i64)> = cart
            .items()
            .iter()
            .map(|item| (item.product.as_str(), -item.quantity))
            .collect();
        catalog.apply_stock_deltas(&deltas)?;

        let sale_id = self.next_sale_id();
        let mut total = Money::zero();
        for item in cart.items() {
            let value = self
                .valuation
                .realize(item.unit_price, item.unit_cost, item.quantity);
            total += value;
            self.push_line(item.product.clone(), item.quantity, value, sale_id.clone());
        }

        info!(
            sale_id = %sale_id,
            items = cart.len(),
            total = %total,
            "Cart sale recorded"
        );

        cart.clear();
        Ok((sale_id, total))
    }

    fn push_line(&mut self, product: String, quantity: i64, value: Money, sale_id: SaleId) {
        self.known_ids.insert(sale_id.clone());
        self.lines.push(SaleLine {
            date: self.clock.today(),
            product,
            quantity,
            value,
            sale_id,
        });
    }

    /// Draws a sale identifier not yet used in this ledger.
    fn next_sale_id(&self) -> SaleId {
        loop {
            let mut candidate = Uuid::new_v4().simple().to_string();
            candidate.truncate(SALE_ID_LEN);
            candidate.make_ascii_uppercase();

            let id = SaleId::new(candidate);
            if !self.known_ids.contains(&id) {
                return id;
            }
            debug!(sale_id = %id, "Sale id collision, drawing again");
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Per-sale aggregates, newest date first.
    ///
    /// Sales on the same date keep the order in which they were first seen.
    pub fn grouped_sales(&self) -> impl Iterator<Item = SaleSummary> {
        let mut positions: HashMap<&SaleId, usize> = HashMap::new();
        let mut groups: Vec<SaleSummary> = Vec::new();

        for line in &self.lines {
            match positions.get(&line.sale_id) {
                Some(&pos) => {
                    let group = &mut groups[pos];
                    if !group.products.contains(&line.product) {
                        group.products.push(line.product.clone());
                    }
                    group.quantity += line.quantity;
                    group.value += line.value;
                }
                None => {
                    positions.insert(&line.sale_id, groups.len());
                    groups.push(SaleSummary {
                        date: line.date,
                        sale_id: line.sale_id.clone(),
                        products: vec![line.product.clone()],
                        quantity: line.quantity,
                        value: line.value,
                    });
                }
            }
        }

        // stable: ties stay in first-seen order
        groups.sort_by(|a, b| b.date.cmp(&a.date));
        groups.into_iter()
    }

    /// Lines matching every criterion in `filter`, in ledger order.
    pub fn filter_by_date(&self, filter: &SaleFilter) -> Vec<&SaleLine> {
        self.lines.iter().filter(|l| filter.matches(l)).collect()
    }

    /// All lines of one sale, in ledger order.
    pub fn details_for_sale(&self, sale_id: &SaleId) -> Vec<&SaleLine> {
        self.lines.iter().filter(|l| &l.sale_id == sale_id).collect()
    }

    /// Lines dated `date`.
    pub fn sales_on(&self, date: NaiveDate) -> Vec<&SaleLine> {
        self.lines.iter().filter(|l| l.date == date).collect()
    }

    /// Lines dated today.
    pub fn sales_today(&self) -> Vec<&SaleLine> {
        self.sales_on(self.clock.today())
    }

    pub fn lines(&self) -> &[SaleLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of realized values over the whole ledger.
    pub fn total_value(&self) -> Money {
        self.lines.iter().map(|l| l.value).sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn ledger() -> SalesLedger {
        SalesLedger::new(SharedClock::fixed(today()), Valuation::Revenue)
    }

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog
            .add("Widget", Money::from_cents(1000), 5, Some(Money::from_cents(600)))
            .unwrap();
        catalog
            .add("Gadget", Money::from_cents(250), 4, None)
            .unwrap();
        catalog
    }

    fn line(date: NaiveDate, product: &str, qty: i64, cents: i64, id: &str) -> SaleLine {
        SaleLine {
            date,
            product: product.to_string(),
            quantity: qty,
            value: Money::from_cents(cents),
            sale_id: SaleId::new(id),
        }
    }

    #[test]
    fn test_sell_direct_out_of_range_price() {
        let mut sales = ledger();

        // Largest accepted price times the largest quantity
        let mut catalog = Catalog::new();
        catalog
            .add("Bulk", Money::from_cents(crate::MAX_AMOUNT_CENTS), 2_000, None)
            .unwrap();
        let (_, value) = sales
            .sell_direct(&mut catalog, "Bulk", crate::MAX_ITEM_QUANTITY, Discount::none())
            .unwrap();
        assert_eq!(
            value.cents(),
            crate::MAX_AMOUNT_CENTS * crate::MAX_ITEM_QUANTITY
        );

        // A store row that never went through Catalog::add
        let mut catalog = Catalog::from_products([crate::types::Product {
            name: "Widget".to_string(),
            price: Money::from_cents(i64::MAX / 2),
            stock: 5,
            cost: None,
        }]);
        let err = sales
            .sell_direct(&mut catalog, "Widget", 3, Discount::none())
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(catalog.get("Widget").unwrap().stock, 5);
        assert_eq!(sales.len(), 1);
    }

    #[test]
    fn test_sell_direct_with_discount() {
        let mut catalog = catalog();
        let mut sales = ledger();

        let (id, value) = sales
            .sell_direct(&mut catalog, "Widget", 2, Discount::from_bps(1000))
            .unwrap();

        assert_eq!(value.cents(), 1800);
        assert_eq!(catalog.get("Widget").unwrap().stock, 3);
        assert_eq!(sales.len(), 1);

        let recorded = &sales.lines()[0];
        assert_eq!(recorded.sale_id, id);
        assert_eq!(recorded.date, today());
        assert_eq!(recorded.quantity, 2);
        assert_eq!(id.as_str().len(), 8);
    }

    #[test]
    fn test_sell_direct_insufficient_stock_changes_nothing() {
        let mut catalog = catalog();
        let mut sales = ledger();

        let err = sales
            .sell_direct(&mut catalog, "Widget", 6, Discount::none())
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert_eq!(catalog.get("Widget").unwrap().stock, 5);
        assert!(sales.is_empty());
    }

    #[test]
    fn test_sell_direct_unknown_product() {
        let mut catalog = catalog();
        let mut sales = ledger();
        let err = sales
            .sell_direct(&mut catalog, "Ghost", 1, Discount::none())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_profit_valuation() {
        let mut catalog = catalog();
        let mut sales = SalesLedger::new(SharedClock::fixed(today()), Valuation::Profit);

        let (_, value) = sales
            .sell_direct(&mut catalog, "Widget", 2, Discount::from_bps(1000))
            .unwrap();
        assert_eq!(value.cents(), 600); // (900 - 600) * 2

        // No cost recorded: whole price counts
        let (_, value) = sales
            .sell_direct(&mut catalog, "Gadget", 1, Discount::none())
            .unwrap();
        assert_eq!(value.cents(), 250);
    }

    #[test]
    fn test_finalize_cart_shares_one_id() {
        let mut catalog = catalog();
        let mut sales = ledger();
        let mut cart = Cart::new();

        cart.add(&catalog, "Widget", 2, Discount::from_bps(1000)).unwrap();
        cart.add(&catalog, "Gadget", 3, Discount::none()).unwrap();

        let (id, total) = sales.finalize_cart(&mut cart, &mut catalog).unwrap();

        assert_eq!(total.cents(), 1800 + 750);
        assert!(cart.is_empty());
        assert_eq!(catalog.get("Widget").unwrap().stock, 3);
        assert_eq!(catalog.get("Gadget").unwrap().stock, 1);

        let details = sales.details_for_sale(&id);
        assert_eq!(details.len(), 2);
        assert_eq!(details[0].product, "Widget");
        assert_eq!(details[1].product, "Gadget");

        let grouped: Vec<SaleSummary> = sales.grouped_sales().collect();
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[0].sale_id, id);
        assert_eq!(grouped[0].quantity, 5);
        assert_eq!(grouped[0].value.cents(), 2550);
        assert_eq!(grouped[0].products_label(), "Widget, Gadget");
    }

    #[test]
    fn test_finalize_empty_cart() {
        let mut catalog = catalog();
        let mut sales = ledger();
        let err = sales
            .finalize_cart(&mut Cart::new(), &mut catalog)
            .unwrap_err();
        assert!(matches!(err, CoreError::EmptyCart));
    }

    #[test]
    fn test_failed_finalize_mutates_nothing() {
        let mut catalog = catalog();
        let mut sales = ledger();
        let mut cart = Cart::new();

        cart.add(&catalog, "Widget", 2, Discount::none()).unwrap();
        cart.add(&catalog, "Gadget", 4, Discount::none()).unwrap();

        // Stock drops after the item was added to the cart
        catalog.adjust_stock("Gadget", -1).unwrap();

        let err = sales.finalize_cart(&mut cart, &mut catalog).unwrap_err();
        assert!(matches!(err, CoreError::InsufficientStock { .. }));
        assert_eq!(catalog.get("Widget").unwrap().stock, 5);
        assert_eq!(catalog.get("Gadget").unwrap().stock, 3);
        assert!(sales.is_empty());
        assert_eq!(cart.len(), 2);

        // Removed product
        catalog.remove("Gadget").unwrap();
        let err = sales.finalize_cart(&mut cart, &mut catalog).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(catalog.get("Widget").unwrap().stock, 5);
        assert!(sales.is_empty());
    }

    #[test]
    fn test_grouped_sales_order_and_distinct_products() {
        let d1 = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let sales = SalesLedger::from_lines(
            vec![
                line(d1, "A", 1, 100, "OLD"),
                line(d2, "B", 1, 200, "FIRST"),
                line(d2, "C", 2, 300, "SECOND"),
                line(d2, "B", 1, 200, "FIRST"),
                line(d2, "D", 1, 50, "FIRST"),
            ],
            SharedClock::fixed(today()),
            Valuation::Revenue,
        );

        let grouped: Vec<SaleSummary> = sales.grouped_sales().collect();
        let ids: Vec<&str> = grouped.iter().map(|g| g.sale_id.as_str()).collect();
        assert_eq!(ids, vec!["FIRST", "SECOND", "OLD"]);

        assert_eq!(grouped[0].products, vec!["B".to_string(), "D".to_string()]);
        assert_eq!(grouped[0].quantity, 3);
        assert_eq!(grouped[0].value.cents(), 450);
    }

    #[test]
    fn test_filter_by_date() {
        let lines = vec![
            line(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(), "A", 1, 100, "S1"),
            line(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), "A", 1, 100, "S2"),
            line(NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(), "B", 1, 100, "S3"),
            line(NaiveDate::from_ymd_opt(2023, 3, 10).unwrap(), "A", 1, 100, "S4"),
        ];
        let sales = SalesLedger::from_lines(lines, SharedClock::fixed(today()), Valuation::Revenue);

        let march = sales.filter_by_date(&SaleFilter::new().month(3).year(2024));
        let ids: Vec<&str> = march.iter().map(|l| l.sale_id.as_str()).collect();
        assert_eq!(ids, vec!["S2", "S3"]);

        let a_in_march = sales.filter_by_date(&SaleFilter::new().month(3).product("A"));
        assert_eq!(a_in_march.len(), 2);

        let first_day = sales.filter_by_date(&SaleFilter::new().on_day(1));
        assert_eq!(first_day.len(), 1);

        assert!(sales
            .filter_by_date(&SaleFilter::new().year(1999))
            .is_empty());
        assert_eq!(sales.filter_by_date(&SaleFilter::new()).len(), 4);
    }

    #[test]
    fn test_sale_ids_are_unique() {
        let mut catalog = Catalog::new();
        catalog.add("Pin", Money::from_cents(1), 500, None).unwrap();
        let mut sales = ledger();

        for _ in 0..200 {
            sales
                .sell_direct(&mut catalog, "Pin", 1, Discount::none())
                .unwrap();
        }

        let ids: HashSet<&SaleId> = sales.lines().iter().map(|l| &l.sale_id).collect();
        assert_eq!(ids.len(), 200);
        assert!(ids
            .iter()
            .all(|id| id.as_str().chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())));
    }

    #[test]
    fn test_sales_today_and_total() {
        let yesterday = today().pred_opt().unwrap();
        let sales = SalesLedger::from_lines(
            vec![
                line(yesterday, "A", 1, 100, "S1"),
                line(today(), "B", 2, 400, "S2"),
            ],
            SharedClock::fixed(today()),
            Valuation::Revenue,
        );

        assert_eq!(sales.sales_today().len(), 1);
        assert_eq!(sales.sales_on(yesterday)[0].sale_id.as_str(), "S1");
        assert_eq!(sales.total_value().cents(), 500);
    }
}
