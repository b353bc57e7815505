//! # Checkout Totals
//!
//! The arithmetic half of order processing. Persisting the order graph is
//! the data layer's job; this module only turns a cart, a tax rate and a
//! requested discount into the four stored amounts.

use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::error::{CoreError, ValidationError};
use crate::money::Money;
use crate::types::TaxRate;

/// The derived amounts of an order.
///
/// Invariants held by [`compute_totals`]:
/// - `subtotal` is the exact sum of line totals (no rounding).
/// - `tax` is never negative.
/// - `discount` is clamped to `subtotal`, so `total` is never negative.
/// - `total = subtotal + tax - discount`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutTotals {
    pub subtotal: Money,
    pub tax: Money,
    pub discount: Money,
    pub total: Money,
}

/// Computes order totals from a cart.
///
/// ## Errors
/// - [`CoreError::EmptyCart`] when the cart has no lines.
/// - A validation error when the requested discount is negative.
pub fn compute_totals(
    cart: &Cart,
    tax_rate: TaxRate,
    requested_discount: Money,
) -> Result<CheckoutTotals, CoreError> {
    if cart.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    if requested_discount.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "discount".to_string(),
        }
        .into());
    }

    let subtotal = cart.subtotal();
    let tax = subtotal.calculate_tax(tax_rate);
    let discount = requested_discount.min(subtotal);
    let total = subtotal + tax - discount;

    Ok(CheckoutTotals {
        subtotal,
        tax,
        discount,
        total,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
