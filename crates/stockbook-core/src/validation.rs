//! # Validation Module
//!
//! Input validation utilities for Stockbook.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Caller (form / session)                                      │
//! │  └── Type parsing (text → integer, fraction → Discount)                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                   │
//! │  └── Simple shape checks: non-empty, non-negative, in range            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Catalog / ledgers                                            │
//! │  └── Business rules: uniqueness, stock availability, expense date      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockbook_core::validation::{validate_product_name, validate_quantity};
//!
//! validate_product_name("Widget").unwrap();
//! validate_quantity(5).unwrap();
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{Discount, Product};
use crate::{MAX_AMOUNT_CENTS, MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;
const MAX_DESCRIPTION_LEN: usize = 500;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - At most 200 characters
///
/// Names are otherwise kept verbatim: the catalog is case-sensitive and
/// does not trim.
///
/// ```rust
/// use stockbook_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Coffee 500g").is_ok());
/// assert!(validate_product_name("  ").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    if name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a cash entry description. Empty descriptions are allowed.
pub fn validate_description(description: &str) -> ValidationResult<()> {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: MAX_DESCRIPTION_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a sale quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates an initial stock level.
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "stock".to_string(),
        });
    }

    Ok(())
}

/// Validates a price or cost. Zero is allowed (free items).
///
/// ## Rules
/// - Must not be negative
/// - Must not exceed MAX_AMOUNT_CENTS
///
/// ```rust
/// use stockbook_core::money::Money;
/// use stockbook_core::validation::validate_amount;
///
/// assert!(validate_amount("price", Money::from_cents(1099)).is_ok());
/// assert!(validate_amount("price", Money::zero()).is_ok());
/// assert!(validate_amount("price", Money::from_cents(-100)).is_err());
/// assert!(validate_amount("price", Money::from_cents(i64::MAX / 2)).is_err());
/// ```
pub fn validate_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    if amount.cents() > MAX_AMOUNT_CENTS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_AMOUNT_CENTS,
        });
    }

    Ok(())
}

/// Validates a cash entry amount.
///
/// The sign is dropped when the entry is stored, so only the magnitude
/// is bounded.
pub fn validate_cash_amount(amount: Money) -> ValidationResult<()> {
    if amount.cents().unsigned_abs() > MAX_AMOUNT_CENTS.unsigned_abs() {
        return Err(ValidationError::OutOfRange {
            field: "amount".to_string(),
            min: -MAX_AMOUNT_CENTS,
            max: MAX_AMOUNT_CENTS,
        });
    }

    Ok(())
}

/// Validates the stored price and cost of a product about to be sold.
///
/// Products loaded from a store skip `Catalog::add`, so selling re-checks
/// the amounts a line total is computed from.
pub fn validate_product_amounts(product: &Product) -> ValidationResult<()> {
    validate_amount("price", product.price)?;
    if let Some(cost) = product.cost {
        validate_amount("cost", cost)?;
    }

    Ok(())
}

/// Validates a discount (0% to 100%).
pub fn validate_discount(discount: Discount) -> ValidationResult<()> {
    if discount.bps() > Discount::MAX_BPS {
        return Err(ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: Discount::MAX_BPS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates that one more item fits in the cart.
///
/// ## Rules
/// - Must not exceed MAX_CART_ITEMS (100)
pub fn validate_cart_size(current_items: usize) -> ValidationResult<()> {
    if current_items >= MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "cart items".to_string(),
            min: 0,
            max: MAX_CART_ITEMS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
