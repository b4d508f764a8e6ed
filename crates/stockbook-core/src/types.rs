//! # Domain Types
//!
//! Core domain types used throughout Stockbook.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    SaleLine     │   │   CashEntry     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  name (key)     │   │  date           │   │  date           │       │
//! │  │  price          │   │  product        │   │  kind           │       │
//! │  │  stock          │   │  quantity       │   │  description    │       │
//! │  │  cost?          │   │  value          │   │  amount (≥ 0)   │       │
//! │  └─────────────────┘   │  sale_id        │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Discount     │   │     SaleId      │   │    CashKind     │       │
//! │  │  bps (u32)      │   │  "7F3A9C01"     │   │  Income         │       │
//! │  │  1000 = 10%     │   │                 │   │  Expense        │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Products are keyed by their name (case-sensitive). Sale lines carry the
//! product name as a plain reference: deleting a product never touches the
//! sales history.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Discount
// =============================================================================

/// Discount rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000, so 1000 bps = 10%.
/// Keeping the rate integral lets the discounted price be computed with
/// integer cents (see [`Money::apply_discount`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Discount(u32);

impl Discount {
    /// Full discount (100%).
    pub const MAX_BPS: u32 = 10_000;

    /// Creates a discount from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Discount(bps)
    }

    /// Creates a discount from a fraction (`0.1` = 10%).
    ///
    /// ## Example
    /// ```rust
    /// use stockbook_core::types::Discount;
    ///
    /// assert_eq!(Discount::from_fraction(0.1).unwrap().bps(), 1000);
    /// assert!(Discount::from_fraction(1.5).is_err());
    /// assert!(Discount::from_fraction(-0.1).is_err());
    /// ```
    pub fn from_fraction(fraction: f64) -> Result<Self, ValidationError> {
        if !fraction.is_finite() || !(0.0..=1.0).contains(&fraction) {
            return Err(ValidationError::OutOfRange {
                field: "discount".to_string(),
                min: 0,
                max: 1,
            });
        }
        Ok(Discount((fraction * Self::MAX_BPS as f64).round() as u32))
    }

    /// Creates a discount from a percentage (`10.0` = 10%).
    pub fn from_percentage(pct: f64) -> Result<Self, ValidationError> {
        Self::from_fraction(pct / 100.0)
    }

    /// No discount.
    #[inline]
    pub const fn none() -> Self {
        Discount(0)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a fraction (for display only).
    #[inline]
    pub fn fraction(&self) -> f64 {
        self.0 as f64 / Self::MAX_BPS as f64
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product tracked in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique, case-sensitive name. Also the catalog key.
    pub name: String,

    /// Unit sale price.
    pub price: Money,

    /// Units on hand. Never negative.
    pub stock: i64,

    /// Unit cost (for profit valuation).
    pub cost: Option<Money>,
}

impl Product {
    /// Price after applying `discount`.
    #[inline]
    pub fn discounted_price(&self, discount: Discount) -> Money {
        self.price.apply_discount(discount)
    }

    /// Checks if `quantity` units can be taken from stock.
    #[inline]
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}

// =============================================================================
// Sale Identifier
// =============================================================================

/// Groups the sale lines created by one checkout.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SaleId(String);

impl SaleId {
    /// Wraps an existing identifier (e.g. one read back from storage).
    pub fn new(id: impl Into<String>) -> Self {
        SaleId(id.into())
    }

    /// Returns the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SaleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SaleId {
    fn from(id: &str) -> Self {
        SaleId::new(id)
    }
}

// =============================================================================
// Sale Line
// =============================================================================

/// One recorded product quantity sold at a computed value.
///
/// Lines are immutable once appended to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleLine {
    /// Day of the sale.
    pub date: NaiveDate,

    /// Product name at the time of sale.
    pub product: String,

    /// Units sold.
    pub quantity: i64,

    /// Realized value (revenue or profit, see [`Valuation`]).
    pub value: Money,

    /// Checkout this line belongs to.
    pub sale_id: SaleId,
}

// =============================================================================
// Valuation
// =============================================================================

/// How a sale line's realized value is computed.
///
/// ```text
/// Revenue: (price × (1 − discount)) × quantity
/// Profit:  (price × (1 − discount) − cost) × quantity
/// ```
///
/// `Profit` is the older cost-adjusted bookkeeping; products without a cost
/// are valued as if their cost were zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Valuation {
    #[default]
    Revenue,
    Profit,
}

impl Valuation {
    /// Realized value of `quantity` units sold at `unit_price`.
    pub fn realize(&self, unit_price: Money, unit_cost: Option<Money>, quantity: i64) -> Money {
        match self {
            Valuation::Revenue => unit_price * quantity,
            Valuation::Profit => (unit_price - unit_cost.unwrap_or_default()) * quantity,
        }
    }
}

impl fmt::Display for Valuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Valuation::Revenue => write!(f, "revenue"),
            Valuation::Profit => write!(f, "profit"),
        }
    }
}

impl FromStr for Valuation {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "revenue" => Ok(Valuation::Revenue),
            "profit" => Ok(Valuation::Profit),
            _ => Err(ValidationError::NotAllowed {
                field: "valuation".to_string(),
                allowed: vec!["revenue".to_string(), "profit".to_string()],
            }),
        }
    }
}

// =============================================================================
// Cash Entries
// =============================================================================

/// Description used for the zero-value placeholder that opens a day.
pub const OPENING_BALANCE_DESCRIPTION: &str = "Opening balance";

/// Direction of a cash movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum CashKind {
    Income,
    Expense,
}

impl CashKind {
    /// Applies the aggregation sign convention: expenses subtract.
    #[inline]
    pub fn signed(&self, amount: Money) -> Money {
        match self {
            CashKind::Income => amount,
            CashKind::Expense => -amount,
        }
    }
}

impl fmt::Display for CashKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CashKind::Income => write!(f, "income"),
            CashKind::Expense => write!(f, "expense"),
        }
    }
}

/// One dated income or expense record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashEntry {
    pub date: NaiveDate,
    pub kind: CashKind,
    pub description: String,
    /// Magnitude of the movement; the kind carries the sign.
    pub amount: Money,
}

impl CashEntry {
    /// The zero-value placeholder recorded for a day without movements.
    pub fn opening_balance(date: NaiveDate) -> Self {
        CashEntry {
            date,
            kind: CashKind::Income,
            description: OPENING_BALANCE_DESCRIPTION.to_string(),
            amount: Money::zero(),
        }
    }

    /// Checks if this entry is the zero-value day placeholder.
    pub fn is_opening_balance(&self) -> bool {
        self.kind == CashKind::Income
            && self.amount.is_zero()
            && self.description == OPENING_BALANCE_DESCRIPTION
    }

    /// Amount with the aggregation sign applied.
    #[inline]
    pub fn signed_amount(&self) -> Money {
        self.kind.signed(self.amount)
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// Normalized contents exchanged with the persistence layer.
///
/// The store produces one on load and consumes one on save; any legacy
/// layout is converted before it reaches this shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub products: Vec<Product>,
    pub sales: Vec<SaleLine>,
    pub cash: Vec<CashEntry>,
}

impl Snapshot {
    /// Checks if the snapshot holds no data at all.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty() && self.sales.is_empty() && self.cash.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discount_from_fraction() {
        assert_eq!(Discount::from_fraction(0.0).unwrap(), Discount::none());
        assert_eq!(Discount::from_fraction(0.1).unwrap().bps(), 1000);
        assert_eq!(Discount::from_fraction(1.0).unwrap().bps(), 10_000);
        assert!(Discount::from_fraction(f64::NAN).is_err());
        assert!(Discount::from_fraction(1.01).is_err());
    }

    #[test]
    fn test_discount_from_percentage() {
        assert_eq!(Discount::from_percentage(12.5).unwrap().bps(), 1250);
        assert!((Discount::from_bps(1250).fraction() - 0.125).abs() < 1e-9);
    }

    #[test]
    fn test_valuation_revenue_and_profit() {
        let price = Money::from_cents(900);
        let cost = Some(Money::from_cents(600));

        assert_eq!(Valuation::Revenue.realize(price, cost, 2).cents(), 1800);
        assert_eq!(Valuation::Profit.realize(price, cost, 2).cents(), 600);
        assert_eq!(Valuation::Profit.realize(price, None, 2).cents(), 1800);
    }

    #[test]
    fn test_valuation_parsing() {
        assert_eq!("Profit".parse::<Valuation>().unwrap(), Valuation::Profit);
        assert_eq!(" revenue ".parse::<Valuation>().unwrap(), Valuation::Revenue);
        assert!("margin".parse::<Valuation>().is_err());
    }

    #[test]
    fn test_cash_kind_sign() {
        let amount = Money::from_cents(250);
        assert_eq!(CashKind::Income.signed(amount).cents(), 250);
        assert_eq!(CashKind::Expense.signed(amount).cents(), -250);
    }

    #[test]
    fn test_opening_balance_detection() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let placeholder = CashEntry::opening_balance(day);
        assert!(placeholder.is_opening_balance());

        let real = CashEntry {
            amount: Money::from_cents(1),
            ..placeholder.clone()
        };
        assert!(!real.is_opening_balance());
    }

    #[test]
    fn test_sale_id_serializes_as_string() {
        let id = SaleId::new("AB12CD34");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"AB12CD34\"");
        assert_eq!(id.to_string(), "AB12CD34");
    }
}
