//! # Product Catalog
//!
//! The set of tracked products keyed by name.
//!
//! ## Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Catalog Operations                               │
//! │                                                                         │
//! │  add(name, price, stock, cost?) ──► DuplicateProduct if name exists    │
//! │  edit(name, price?, cost?)      ──► ProductNotFound if absent          │
//! │  adjust_stock(name, delta)      ──► NegativeStock if result < 0        │
//! │  remove(name)                   ──► ProductNotFound if absent          │
//! │                                                                         │
//! │  Sales never call adjust_stock directly: they go through              │
//! │  apply_stock_deltas, which checks every delta before touching any.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Persistence is the caller's job; the catalog only mutates memory.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::Product;
use crate::validation::{validate_amount, validate_product_name, validate_stock};

/// Product catalog, iterated in name order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    products: BTreeMap<String, Product>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Catalog::default()
    }

    /// Builds a catalog from stored products.
    ///
    /// Later duplicates of a name replace earlier ones.
    pub fn from_products(products: impl IntoIterator<Item = Product>) -> Self {
        Catalog {
            products: products
                .into_iter()
                .map(|p| (p.name.clone(), p))
                .collect(),
        }
    }

    /// Adds a new product.
    ///
    /// ## Errors
    /// - `DuplicateProduct` if the name is taken
    /// - `Validation` for an empty name, a negative or oversized price/cost,
    ///   or negative stock
    pub fn add(
        &mut self,
        name: &str,
        price: Money,
        stock: i64,
        cost: Option<Money>,
    ) -> CoreResult<&Product> {
        validate_product_name(name)?;
        validate_amount("price", price)?;
        validate_stock(stock)?;
        if let Some(cost) = cost {
            validate_amount("cost", cost)?;
        }

        match self.products.entry(name.to_string()) {
            Entry::Occupied(_) => Err(CoreError::DuplicateProduct(name.to_string())),
            Entry::Vacant(slot) => {
                info!(product = %name, price = %price, stock, "Product added");
                let product: &Product = slot.insert(Product {
                    name: name.to_string(),
                    price,
                    stock,
                    cost,
                });
                Ok(product)
            }
        }
    }

    /// Updates price and/or cost. Fields passed as `None` are left alone.
    pub fn edit(&mut self, name: &str, price: Option<Money>, cost: Option<Money>) -> CoreResult<()> {
        if let Some(price) = price {
            validate_amount("price", price)?;
        }
        if let Some(cost) = cost {
            validate_amount("cost", cost)?;
        }

        let product = self.get_mut(name)?;
        if let Some(price) = price {
            product.price = price;
        }
        if let Some(cost) = cost {
            product.cost = Some(cost);
        }

        debug!(product = %name, ?price, ?cost, "Product edited");
        Ok(())
    }

    /// Applies a manual stock delta (positive restock or negative write-off).
    ///
    /// Returns the new stock level. Stock is unchanged on error, including
    /// when the sum would not fit.
    pub fn adjust_stock(&mut self, name: &str, delta: i64) -> CoreResult<i64> {
        let product = self.get_mut(name)?;
        let next = product
            .stock
            .checked_add(delta)
            .ok_or_else(stock_overflow)?;
        if next < 0 {
            return Err(CoreError::NegativeStock {
                product: name.to_string(),
                current: product.stock,
                delta,
            });
        }

        product.stock = next;
        debug!(product = %name, delta, stock = next, "Stock adjusted");
        Ok(next)
    }

    /// Removes a product. Past sales that reference it are untouched.
    pub fn remove(&mut self, name: &str) -> CoreResult<Product> {
        let removed = self
            .products
            .remove(name)
            .ok_or_else(|| CoreError::ProductNotFound(name.to_string()))?;

        info!(product = %name, "Product removed");
        Ok(removed)
    }

    /// Applies a batch of stock deltas all-or-nothing.
    ///
    /// Deltas for the same product are summed first, so two cart lines for
    /// one product are checked against its stock together.
    pub fn apply_stock_deltas(&mut self, deltas: &[(&str, i64)]) -> CoreResult<()> {
        let mut combined: BTreeMap<&str, i64> = BTreeMap::new();
        for &(name, delta) in deltas {
            let sum = combined.entry(name).or_insert(0);
            *sum = sum.checked_add(delta).ok_or_else(stock_overflow)?;
        }

        let mut next_levels = Vec::with_capacity(combined.len());
        for (&name, &delta) in &combined {
            let product = self.get(name)?;
            let next = product.stock.checked_add(delta).ok_or_else(stock_overflow)?;
            if next < 0 {
                return Err(CoreError::InsufficientStock {
                    product: name.to_string(),
                    available: product.stock,
                    requested: delta.saturating_neg(),
                });
            }
            next_levels.push((name, next));
        }

        for (name, next) in next_levels {
            if let Some(product) = self.products.get_mut(name) {
                product.stock = next;
            }
        }

        Ok(())
    }

    /// Looks up a product by name.
    pub fn get(&self, name: &str) -> CoreResult<&Product> {
        self.products
            .get(name)
            .ok_or_else(|| CoreError::ProductNotFound(name.to_string()))
    }

    fn get_mut(&mut self, name: &str) -> CoreResult<&mut Product> {
        self.products
            .get_mut(name)
            .ok_or_else(|| CoreError::ProductNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.products.contains_key(name)
    }

    /// Products in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    /// Product names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.products.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

fn stock_overflow() -> ValidationError {
    ValidationError::OutOfRange {
        field: "stock".to_string(),
        min: 0,
        max: i64::MAX,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn catalog_with_widget() -> Catalog {
        let mut catalog = Catalog::new();
        catalog
            .add("Widget", Money::from_cents(1000), 5, Some(Money::from_cents(600)))
            .unwrap();
        catalog
    }

    #[test]
    fn test_add_and_get() {
        let catalog = catalog_with_widget();
        let widget = catalog.get("Widget").unwrap();
        assert_eq!(widget.price.cents(), 1000);
        assert_eq!(widget.stock, 5);
        assert_eq!(widget.cost, Some(Money::from_cents(600)));
        assert!(catalog.get("widget").is_err()); // case-sensitive
    }

    #[test]
    fn test_add_duplicate_fails() {
        let mut catalog = catalog_with_widget();
        let err = catalog
            .add("Widget", Money::from_cents(1), 1, None)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateKey);
        assert_eq!(catalog.get("Widget").unwrap().price.cents(), 1000);
    }

    #[test]
    fn test_add_rejects_invalid_input() {
        let mut catalog = Catalog::new();
        assert!(catalog.add("", Money::from_cents(1), 1, None).is_err());
        assert!(catalog.add("A", Money::from_cents(-1), 1, None).is_err());
        assert!(catalog.add("A", Money::from_cents(1), -1, None).is_err());
        assert!(catalog
            .add("A", Money::from_cents(1), 1, Some(Money::from_cents(-1)))
            .is_err());
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_edit_updates_only_supplied_fields() {
        let mut catalog = catalog_with_widget();
        catalog.edit("Widget", Some(Money::from_cents(1200)), None).unwrap();

        let widget = catalog.get("Widget").unwrap();
        assert_eq!(widget.price.cents(), 1200);
        assert_eq!(widget.cost, Some(Money::from_cents(600)));

        catalog.edit("Widget", None, Some(Money::from_cents(700))).unwrap();
        assert_eq!(catalog.get("Widget").unwrap().cost, Some(Money::from_cents(700)));
    }

    #[test]
    fn test_edit_missing_product() {
        let mut catalog = Catalog::new();
        let err = catalog.edit("Ghost", Some(Money::zero()), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_adjust_stock() {
        let mut catalog = catalog_with_widget();
        assert_eq!(catalog.adjust_stock("Widget", 3).unwrap(), 8);
        assert_eq!(catalog.adjust_stock("Widget", -8).unwrap(), 0);

        let err = catalog.adjust_stock("Widget", -1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert_eq!(catalog.get("Widget").unwrap().stock, 0);

        let err = catalog.adjust_stock("Ghost", 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_adjust_stock_overflow() {
        let mut catalog = catalog_with_widget();
        let err = catalog.adjust_stock("Widget", i64::MAX).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { .. })
        ));
        assert_eq!(catalog.get("Widget").unwrap().stock, 5);

        let err = catalog.adjust_stock("Widget", i64::MIN).unwrap_err();
        assert!(matches!(err, CoreError::NegativeStock { .. }));
        assert_eq!(catalog.get("Widget").unwrap().stock, 5);

        let err = catalog
            .apply_stock_deltas(&[("Widget", i64::MAX), ("Widget", 1)])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert_eq!(catalog.get("Widget").unwrap().stock, 5);
    }

    #[test]
    fn test_add_rejects_oversized_price() {
        let mut catalog = Catalog::new();
        let huge = Money::from_cents(i64::MAX / 2);
        assert!(catalog.add("Widget", huge, 5, None).is_err());
        assert!(catalog.add("Widget", Money::from_cents(100), 5, Some(huge)).is_err());
        assert!(catalog.is_empty());

        catalog.add("Widget", Money::from_cents(100), 5, None).unwrap();
        assert!(catalog.edit("Widget", Some(huge), None).is_err());
        assert_eq!(catalog.get("Widget").unwrap().price, Money::from_cents(100));
    }

    #[test]
    fn test_remove() {
        let mut catalog = catalog_with_widget();
        let removed = catalog.remove("Widget").unwrap();
        assert_eq!(removed.name, "Widget");
        assert!(catalog.is_empty());
        assert_eq!(catalog.remove("Widget").unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_apply_stock_deltas_is_all_or_nothing() {
        let mut catalog = catalog_with_widget();
        catalog.add("Gadget", Money::from_cents(500), 1, None).unwrap();

        // Gadget fails, so Widget must not move either
        let err = catalog
            .apply_stock_deltas(&[("Widget", -2), ("Gadget", -2)])
            .unwrap_err();
        assert!(matches!(err, CoreError::InsufficientStock { .. }));
        assert_eq!(catalog.get("Widget").unwrap().stock, 5);
        assert_eq!(catalog.get("Gadget").unwrap().stock, 1);

        // Same product twice is checked as a sum
        assert!(catalog
            .apply_stock_deltas(&[("Widget", -3), ("Widget", -3)])
            .is_err());

        catalog
            .apply_stock_deltas(&[("Widget", -3), ("Widget", -2), ("Gadget", -1)])
            .unwrap();
        assert_eq!(catalog.get("Widget").unwrap().stock, 0);
        assert_eq!(catalog.get("Gadget").unwrap().stock, 0);
    }

    #[test]
    fn test_iteration_is_name_ordered() {
        let mut catalog = Catalog::new();
        for name in ["b", "C", "a"] {
            catalog.add(name, Money::zero(), 0, None).unwrap();
        }
        let names: Vec<&str> = catalog.names().collect();
        assert_eq!(names, vec!["C", "a", "b"]);
    }
}
