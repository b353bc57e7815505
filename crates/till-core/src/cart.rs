//! # Cart Module
//!
//! The session shopping cart: an explicit value object owned by the
//! session context and handed to checkout, never ambient global state.
//!
//! ## Invariants
//! - Lines are unique by `product_id`; adding the same product again
//!   increments its quantity.
//! - A stored line always has quantity >= 1. Setting a quantity <= 0
//!   deletes the line instead.
//! - Name and unit price are snapshotted when the line is added, so later
//!   catalog edits do not retroactively change an open cart.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::money::Money;
use crate::types::Product;
use crate::{MAX_CART_LINES, MAX_LINE_QUANTITY};

/// One product's snapshot in the cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: String,

    /// Product name at add time (frozen).
    pub name: String,

    /// Price in cents at add time (frozen).
    pub unit_price_cents: i64,

    pub quantity: i64,
}

impl CartLine {
    /// Creates a line from a product and quantity, freezing name and price.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        CartLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price_cents: product.price_cents,
            quantity,
        }
    }

    /// unit price x quantity, exact (no rounding happens at line level).
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents).multiply_quantity(self.quantity)
    }
}

/// The shopping cart. Ordered by insertion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Adds a product to the cart, or increments its quantity if a line
    /// for it already exists.
    pub fn add_line(&mut self, product: &Product, quantity: i64) -> Result<(), CoreError> {
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == product.id)
        {
            let new_qty = line.quantity + quantity;
            if new_qty > MAX_LINE_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_LINE_QUANTITY,
                });
            }
            line.quantity = new_qty;
            return Ok(());
        }

        if self.lines.len() >= MAX_CART_LINES {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_LINES,
            });
        }

        self.lines.push(CartLine::from_product(product, quantity));
        Ok(())
    }

    /// Overwrites the quantity of a line (does not increment).
    ///
    /// A quantity <= 0 deletes the line. Errors when the cart is empty or
    /// the line is absent.
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) -> Result<(), CoreError> {
        if self.lines.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        if quantity <= 0 {
            let before = self.lines.len();
            self.lines.retain(|l| l.product_id != product_id);
            if self.lines.len() == before {
                return Err(CoreError::LineNotInCart(product_id.to_string()));
            }
            return Ok(());
        }

        if quantity > MAX_LINE_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_LINE_QUANTITY,
            });
        }

        match self.lines.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) => {
                line.quantity = quantity;
                Ok(())
            }
            None => Err(CoreError::LineNotInCart(product_id.to_string())),
        }
    }

    /// Removes a line. No-op when the product is not in the cart.
    pub fn remove_line(&mut self, product_id: &str) {
        self.lines.retain(|l| l.product_id != product_id);
    }

    /// Clears all lines.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Exact sum of line totals; no rounding until tax is computed.
    pub fn subtotal(&self) -> Money {
        self.lines
            .iter()
            .fold(Money::zero(), |acc, l| acc + l.line_total())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_product(id: &str, price_cents: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            category: "snacks".to_string(),
            price_cents,
            stock_quantity: 999,
            description: None,
            image_url: None,
            is_available: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_add_line() {
        let mut cart = Cart::new();
        cart.add_line(&test_product("1", 999), 2).unwrap();

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.subtotal().cents(), 1998);
    }

    #[test]
    fn test_add_same_product_increments_quantity() {
        let mut cart = Cart::new();
        let product = test_product("1", 999);

        cart.add_line(&product, 2).unwrap();
        cart.add_line(&product, 3).unwrap();

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines()[0].quantity, 5);
    }

    #[test]
    fn test_price_snapshot_survives_catalog_edit() {
        let mut cart = Cart::new();
        let mut product = test_product("1", 1000);
        cart.add_line(&product, 1).unwrap();

        // Catalog price change after the line was added.
        product.price_cents = 9999;

        assert_eq!(cart.lines()[0].unit_price_cents, 1000);
        assert_eq!(cart.subtotal().cents(), 1000);
    }

    #[test]
    fn test_set_quantity_overwrites() {
        let mut cart = Cart::new();
        cart.add_line(&test_product("1", 500), 2).unwrap();

        cart.set_quantity("1", 7).unwrap();
        assert_eq!(cart.lines()[0].quantity, 7);
    }

    #[test]
    fn test_set_quantity_zero_removes_line() {
        let mut cart = Cart::new();
        cart.add_line(&test_product("1", 500), 2).unwrap();

        cart.set_quantity("1", 0).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_on_absent_line_fails() {
        let mut cart = Cart::new();
        cart.add_line(&test_product("1", 500), 1).unwrap();

        let err = cart.set_quantity("2", 3).unwrap_err();
        assert!(matches!(err, CoreError::LineNotInCart(_)));
    }

    #[test]
    fn test_set_quantity_on_empty_cart_fails() {
        let mut cart = Cart::new();
        let err = cart.set_quantity("1", 3).unwrap_err();
        assert!(matches!(err, CoreError::EmptyCart));
    }

    #[test]
    fn test_remove_line_is_idempotent() {
        let mut cart = Cart::new();
        cart.add_line(&test_product("1", 500), 1).unwrap();

        cart.remove_line("1");
        assert!(cart.is_empty());

        // Removing again is a no-op, not an error.
        cart.remove_line("1");
        cart.remove_line("never-added");
        assert!(cart.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add_line(&test_product("1", 500), 1).unwrap();
        cart.add_line(&test_product("2", 700), 1).unwrap();

        cart.clear();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_subtotal_is_exact_sum() {
        let mut cart = Cart::new();
        cart.add_line(&test_product("a", 1000), 2).unwrap();
        cart.add_line(&test_product("b", 500), 1).unwrap();

        assert_eq!(cart.subtotal().cents(), 2500);
    }
}
