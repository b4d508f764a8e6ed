//! # stockbook-core: Pure Business Logic for Stockbook
//!
//! This crate is the **heart** of Stockbook. It holds the product catalog,
//! the sales ledger, the cart and the cash ledger, with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockbook Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 stockbook-app (Shop session)                    │   │
//! │  │    config ──► open store ──► load ──► operate ──► save         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ stockbook-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  catalog  │  │   sales   │  │   cart    │  │   cash    │  │   │
//! │  │   │  Product  │  │ SaleLine  │  │ CartItem  │  │ CashEntry │  │   │
//! │  │   │  stock    │  │ SaleId    │  │ staging   │  │ summaries │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • TIME ONLY THROUGH Clock               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │ Snapshot                               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 stockbook-db (Database Layer)                   │   │
//! │  │         SQLite, migrations, repositories, legacy import         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, SaleLine, CashEntry, Discount, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`catalog`] - Products keyed by name, stock adjustments
//! - [`cart`] - Pending items of a multi-item sale
//! - [`sales`] - Sales ledger: direct and cart sales, grouped views, filters
//! - [`cash`] - Cash ledger: income/expense with daily/monthly/yearly roll-ups
//! - [`clock`] - Source of "today"
//! - [`date`] - `DD/MM/YYYY` text form of a day
//! - [`error`] - Domain error types
//! - [`validation`] - Input shape checks
//!
//! ## Design Principles
//!
//! 1. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 2. **Integer Money**: All monetary values are in cents (i64)
//! 3. **Explicit Errors**: All errors are typed, never strings or panics
//! 4. **Failed operations change nothing**: every mutation checks first
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use stockbook_core::{Catalog, Discount, Money, SalesLedger, SharedClock, Valuation};
//!
//! let clock = SharedClock::fixed(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
//! let mut catalog = Catalog::new();
//! let mut sales = SalesLedger::new(clock, Valuation::Revenue);
//!
//! catalog.add("Widget", Money::from_cents(1000), 5, None).unwrap();
//!
//! // 2 × $10.00 at 10% off
//! let (_sale_id, value) = sales
//!     .sell_direct(&mut catalog, "Widget", 2, Discount::from_bps(1000))
//!     .unwrap();
//!
//! assert_eq!(value.cents(), 1800);
//! assert_eq!(catalog.get("Widget").unwrap().stock, 3);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod cash;
pub mod catalog;
pub mod clock;
pub mod date;
pub mod error;
pub mod money;
pub mod sales;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use stockbook_core::Money` instead of
// `use stockbook_core::money::Money`

pub use cart::{Cart, CartItem};
pub use cash::{CashLedger, DailySummary, MonthKey, MonthlySummary, YearlySummary};
pub use catalog::Catalog;
pub use clock::{Clock, FixedClock, SharedClock, SystemClock};
pub use error::{CoreError, CoreResult, ErrorKind, ValidationError};
pub use money::Money;
pub use sales::{SaleFilter, SaleSummary, SalesLedger};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum items allowed in a single cart
///
/// ## Business Reason
/// Prevents runaway carts and keeps a single sale reviewable.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single sale line
///
/// ## Business Reason
/// Prevents accidental over-selling (e.g., typing 1000 instead of 10)
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Largest price, cost or cash amount accepted, in cents
///
/// ## Business Reason
/// A line of `MAX_ITEM_QUANTITY` units at this price, and a sum of many
/// such lines, stays well inside `i64`.
pub const MAX_AMOUNT_CENTS: i64 = 100_000_000_000;
