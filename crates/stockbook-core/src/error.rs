//! # Error Types
//!
//! Domain-specific error types for stockbook-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockbook-core errors (this file)                                     │
//! │  ├── CoreError        - Catalog, ledger and cart rule violations       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  stockbook-db errors (separate crate)                                  │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  stockbook-app errors                                                  │
//! │  └── AppError         - Session, config and the two above              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → AppError → caller                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Error Kinds
//! Every [`CoreError`] variant belongs to one of four kinds, which is what
//! callers usually branch on:
//!
//! | Kind           | Variants                                               |
//! |----------------|--------------------------------------------------------|
//! | `DuplicateKey` | `DuplicateProduct`                                     |
//! | `NotFound`     | `ProductNotFound`                                      |
//! | `InvalidState` | `InsufficientStock`, `NegativeStock`, `ExpenseNotToday`, `EmptyCart`, `Validation` |
//! | `IndexError`   | `CartIndexOutOfRange`                                  |

use chrono::NaiveDate;
use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Coarse classification of a [`CoreError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    DuplicateKey,
    NotFound,
    InvalidState,
    IndexError,
}

/// Core business logic errors.
///
/// These errors represent business rule violations. Every operation that
/// fails with one of them leaves the catalog, ledgers and cart unchanged.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A product with this name already exists.
    #[error("Product already exists: {0}")]
    DuplicateProduct(String),

    /// Product cannot be found in the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Insufficient stock to complete a sale or cart reservation.
    ///
    /// ## User Workflow
    /// ```text
    /// Add to Cart (qty: 5)
    ///      │
    ///      ▼
    /// Check stock: available=3 (1 already in cart → 2 free)
    ///      │
    ///      ▼
    /// InsufficientStock { product: "Widget", available: 3, requested: 6 }
    /// ```
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// A manual adjustment would take stock below zero.
    #[error("Stock for {product} cannot go negative: current {current}, delta {delta}")]
    NegativeStock {
        product: String,
        current: i64,
        delta: i64,
    },

    /// Expenses may only be recorded for the current day.
    #[error("Expenses can only be recorded for today ({today}), got {date}")]
    ExpenseNotToday { date: NaiveDate, today: NaiveDate },

    /// Finalizing a cart with no items.
    #[error("Cart is empty")]
    EmptyCart,

    /// Removing a cart position that does not exist.
    #[error("Cart index {index} out of range (cart has {len} items)")]
    CartIndexOutOfRange { index: usize, len: usize },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Returns the coarse kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::DuplicateProduct(_) => ErrorKind::DuplicateKey,
            CoreError::ProductNotFound(_) => ErrorKind::NotFound,
            CoreError::InsufficientStock { .. }
            | CoreError::NegativeStock { .. }
            | CoreError::ExpenseNotToday { .. }
            | CoreError::EmptyCart
            | CoreError::Validation(_) => ErrorKind::InvalidState,
            CoreError::CartIndexOutOfRange { .. } => ErrorKind::IndexError,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., unparseable date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
