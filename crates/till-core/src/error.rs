//! # Error Types
//!
//! Domain-specific error types for till-core.
//!
//! Errors ladder upward through the system: `ValidationError` ->
//! `CoreError` -> `DbError` (till-db) -> `ApiError` (server), each layer
//! adding its own context before the final JSON payload.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product id does not resolve to a known product.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Checkout attempted against an empty cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// A cart operation referenced a product that has no line.
    #[error("Item not in cart: {0}")]
    LineNotInCart(String),

    /// The stock guard refused a checkout line.
    ///
    /// Vestigial in this build (stock defaults are high), but when it does
    /// fire the whole checkout transaction must be rolled back.
    #[error("Insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// Cart has exceeded the maximum number of distinct lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Line quantity exceeds the maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors, raised before business logic runs.
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

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative (zero allowed).
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (bad UUID, non-numeric price, ...).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
