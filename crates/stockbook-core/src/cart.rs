//! # Cart
//!
//! Transient staging area for a multi-item sale.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Operation            Check                          Cart Change        │
//! │  ─────────            ─────                          ───────────        │
//! │  add(product, qty)    in cart + qty <= stock ──────► items.push(item)  │
//! │  remove(index)        index < len ─────────────────► items.remove(i)   │
//! │  clear()              (none) ──────────────────────► items.clear()     │
//! │                                                                         │
//! │  Stock is only reserved on paper: nothing in the catalog moves until  │
//! │  SalesLedger::finalize_cart commits the whole cart.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::Catalog;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Discount, Product};
use crate::validation::{
    validate_cart_size, validate_discount, validate_product_amounts, validate_quantity,
};

/// An item waiting in the cart.
///
/// ## Price Freezing
/// The discounted unit price and unit cost are captured when the item is
/// added. Editing the product afterwards does not change what this line
/// will be sold for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Product name (catalog key).
    pub product: String,

    pub quantity: i64,

    pub discount: Discount,

    /// Unit price after discount (frozen).
    pub unit_price: Money,

    /// Unit cost at time of adding (frozen).
    pub unit_cost: Option<Money>,

    /// `unit_price × quantity`.
    pub line_total: Money,
}

impl CartItem {
    /// Creates a cart item from a product, quantity and discount.
    pub fn from_product(product: &Product, quantity: i64, discount: Discount) -> Self {
        let unit_price = product.discounted_price(discount);
        CartItem {
            product: product.name.clone(),
            quantity,
            discount,
            unit_price,
            unit_cost: product.cost,
            line_total: unit_price.multiply_quantity(quantity),
        }
    }
}

/// The checkout cart.
///
/// ## Invariants
/// - Items keep insertion order; the same product may appear on several
///   lines (e.g. with different discounts)
/// - For every product, the summed quantity of its lines did not exceed
///   its stock at the time each line was added
/// - At most `MAX_CART_ITEMS` lines
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart::default()
    }

    /// Adds a product line to the cart.
    ///
    /// ## Errors
    /// - `ProductNotFound` if the product is not in the catalog
    /// - `InsufficientStock` if the quantity already in the cart for this
    ///   product plus `quantity` exceeds its stock
    /// - `Validation` for a non-positive quantity, bad discount, full cart or
    ///   a stored price/cost outside the accepted range
    pub fn add(
        &mut self,
        catalog: &Catalog,
        product: &str,
        quantity: i64,
        discount: Discount,
    ) -> CoreResult<&CartItem> {
        validate_quantity(quantity)?;
        validate_discount(discount)?;
        validate_cart_size(self.items.len())?;

        let product = catalog.get(product)?;
        validate_product_amounts(product)?;
        let requested = self.reserved(&product.name).saturating_add(quantity);
        if !product.can_sell(requested) {
            return Err(CoreError::InsufficientStock {
                product: product.name.clone(),
                available: product.stock,
                requested,
            });
        }

        let item = CartItem::from_product(product, quantity, discount);
        debug!(
            product = %item.product,
            quantity,
            unit_price = %item.unit_price,
            "Item added to cart"
        );
        self.items.push(item);
        let index = self.items.len() - 1;
        Ok(&self.items[index])
    }

    /// Removes the line at `index`.
    pub fn remove(&mut self, index: usize) -> CoreResult<CartItem> {
        if index >= self.items.len() {
            return Err(CoreError::CartIndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }

        let item = self.items.remove(index);
        debug!(product = %item.product, index, "Item removed from cart");
        Ok(item)
    }

    /// Clears all items from the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Quantity of `product` already held across all cart lines.
    pub fn reserved(&self, product: &str) -> i64 {
        self.items
            .iter()
            .filter(|i| i.product == product)
            .map(|i| i.quantity)
            .sum()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the total quantity of all items.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Sum of line totals.
    pub fn total(&self) -> Money {
        self.items.iter().map(|i| i.line_total).sum()
    }
}
