//! # Money Module
//!
//! Monetary values as integer minor units (cents). Floating point is only
//! allowed at the API edge, where user input arrives as decimal numbers;
//! every calculation inside the system is integer arithmetic.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::types::TaxRate;

/// A monetary value in the smallest currency unit.
///
/// Signed so that refunds and discounts can be represented; the checkout
/// math itself never produces a negative total.
///
/// ## Example
/// ```rust
/// use till_core::money::Money;
///
/// let price = Money::from_cents(1099);
/// let line = price.multiply_quantity(2);
/// assert_eq!(line.cents(), 2198);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Converts a decimal currency amount (API input) to cents.
    ///
    /// Rounds to the nearest cent. Only for the serialization edge; never
    /// use the result of float arithmetic as a source of truth.
    pub fn from_currency_f64(amount: f64) -> Self {
        Money((amount * 100.0).round() as i64)
    }

    /// Returns the value as a decimal currency amount (API output).
    #[inline]
    pub fn as_currency_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Calculates tax on this amount, rounding half-up on the cent.
    ///
    /// Integer math throughout: `(cents * bps + 5000) / 10000`, widened to
    /// i128 so large subtotals cannot overflow.
    ///
    /// ## Example
    /// ```rust
    /// use till_core::money::Money;
    /// use till_core::types::TaxRate;
    ///
    /// let subtotal = Money::from_cents(2500); // 25.00
    /// let rate = TaxRate::from_bps(500);      // 5.0%
    /// assert_eq!(subtotal.calculate_tax(rate).cents(), 125); // 1.25
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        let tax_cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(tax_cents as i64)
    }

    /// Multiplies money by a quantity.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

/// Display without a currency symbol ("26.25", "-5.50"); callers that
/// render invoices or receipts prepend the shop's currency prefix.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.units().abs(), self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
