//! # till-core: Pure Business Logic for Till POS
//!
//! Everything in this crate is a deterministic function over plain data:
//! no database, no network, no file system. The data layer (`till-db`),
//! the invoice renderer (`till-invoice`) and the HTTP server build on top
//! of these types.
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`types`] - Domain types (Product, Order, OrderItem, Setting, ...)
//! - [`cart`] - The session shopping cart
//! - [`checkout`] - Order totals computation
//! - [`validation`] - Business rule validation
//! - [`error`] - Domain error types

pub mod cart;
pub mod checkout;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

pub use cart::{Cart, CartLine};
pub use checkout::CheckoutTotals;
pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single line in a cart.
///
/// Guards against typo-sized orders (1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Maximum number of distinct lines in a cart.
pub const MAX_CART_LINES: usize = 100;

/// Default tax rate in basis points (5.0%), used when the `tax_rate`
/// setting is missing or unparseable.
pub const DEFAULT_TAX_RATE_BPS: u32 = 500;

/// Stock level assigned to products on creation. Stock tracking is
/// disabled in this build, so every product starts effectively unlimited.
pub const DEFAULT_STOCK_QUANTITY: i64 = 999;
