//! # Domain Types
//!
//! Core domain types used throughout Till POS.
//!
//! ## Dual representation of money
//! Entities store monetary values as `*_cents` integer fields so the sqlx
//! row mapping stays flat; accessor methods lift them into [`Money`].
//!
//! ## Identity
//! Every entity uses a UUID v4 string primary key. Human-readable business
//! identifiers (invoice numbers, usernames) sit next to it where needed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 500 bps = 5.0%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage ("5.0" -> 500 bps).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Role
// =============================================================================

/// Account role. Admins manage the back office; cashiers only bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Cashier,
}

impl Default for Role {
    fn default() -> Self {
        Role::Cashier
    }
}

// =============================================================================
// User
// =============================================================================

/// A staff account (admin or cashier).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: String,
    /// Unique login name.
    pub username: String,
    /// Argon2 PHC-string hash; never the plain password.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Checks if the user holds the admin role.
    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    pub id: String,

    /// Display name shown on the menu and on invoices.
    pub name: String,

    /// Free-form category tag (chips, sweets, bakery, drinks, ...).
    pub category: String,

    /// Price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Legacy stock counter. Stock tracking is disabled in this build;
    /// rows are created at [`crate::DEFAULT_STOCK_QUANTITY`] so the
    /// checkout stock guard stays inert.
    pub stock_quantity: i64,

    pub description: Option<String>,

    /// File name of the uploaded product image, if any.
    pub image_url: Option<String>,

    /// Whether the product shows up on the menu and can be added to carts.
    pub is_available: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Order
// =============================================================================

/// A finalized order (bill/invoice). Immutable once created; the only
/// later mutation is a cascading delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: String,

    /// Unique human-readable identifier, `INV-YYYYMMDD-XXXXXXXX`.
    pub invoice_number: String,

    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,

    /// Derived amounts, stored redundantly for audit and history.
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,

    /// Id of the user who created the order.
    pub created_by: String,

    pub created_at: DateTime<Utc>,
}

impl Order {
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    #[inline]
    pub fn tax(&self) -> Money {
        Money::from_cents(self.tax_cents)
    }

    #[inline]
    pub fn discount(&self) -> Money {
        Money::from_cents(self.discount_cents)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Order Item
// =============================================================================

/// A line item in an order.
///
/// Uses the snapshot pattern: display name and unit price are frozen at
/// checkout time, so later catalog edits never change a stored invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,

    /// Product name at checkout time (frozen).
    pub name_snapshot: String,

    pub quantity: i64,

    /// Unit price in cents at checkout time (frozen, from the cart).
    pub unit_price_cents: i64,

    /// quantity x unit_price, stored for audit.
    pub total_cents: i64,

    /// Insertion order within the parent order.
    pub position: i64,
}

impl OrderItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Setting
// =============================================================================

/// A key/value configuration entry. Untyped at rest; numeric settings are
/// parsed leniently on read.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Setting {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Offer
// =============================================================================

/// A promotional offer shown on the home page. Display only; offers do not
/// affect checkout math.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Offer {
    pub id: String,
    pub title: String,
    pub description: String,
    pub display_order: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_from_bps() {
        let rate = TaxRate::from_bps(500);
        assert_eq!(rate.bps(), 500);
        assert!((rate.percentage() - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_tax_rate_from_percentage() {
        assert_eq!(TaxRate::from_percentage(5.0).bps(), 500);
        assert_eq!(TaxRate::from_percentage(8.25).bps(), 825);
    }

    #[test]
    fn test_role_default_is_cashier() {
        assert_eq!(Role::default(), Role::Cashier);
    }
}
