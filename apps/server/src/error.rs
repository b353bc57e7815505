//! # API Error Type
//!
//! Unified error type for route handlers. Every lower-layer error converts
//! into an `ApiError`, which renders as a JSON `{"error": ...}` payload
//! with an appropriate status code. The underlying reason text is kept in
//! the message for operator visibility.
//!
//! Permission failures never reach this type: the auth extractors turn
//! them into silent redirects instead of error payloads.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use till_core::CoreError;
use till_db::DbError;
use till_invoice::InvoiceError;

/// API error returned from handlers.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Machine-readable error code.
    pub code: ErrorCode,

    /// Human-readable error message for the JSON payload.
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Cart operation failed (400)
    CartError,

    /// Insufficient stock aborted a checkout (400)
    InsufficientStock,

    /// Bad credentials (401)
    Unauthorized,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthorized, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// The HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self.code {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError | ErrorCode::CartError | ErrorCode::InsufficientStock => {
                StatusCode::BAD_REQUEST
            }
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status_code().is_server_error() {
            tracing::error!(code = ?self.code, message = %self.message, "Request failed");
        }
        (self.status_code(), Json(json!({ "error": self.message }))).into_response()
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                ApiError::new(ErrorCode::ValidationError, format!("Invalid reference: {}", message))
            }
            other => ApiError::new(ErrorCode::DatabaseError, other.to_string()),
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match &err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", id),
            CoreError::EmptyCart | CoreError::LineNotInCart(_) => {
                ApiError::new(ErrorCode::CartError, err.to_string())
            }
            CoreError::InsufficientStock { .. } => {
                ApiError::new(ErrorCode::InsufficientStock, err.to_string())
            }
            CoreError::CartTooLarge { .. }
            | CoreError::QuantityTooLarge { .. }
            | CoreError::Validation(_) => ApiError::validation(err.to_string()),
        }
    }
}

/// Converts invoice rendering errors to API errors.
impl From<InvoiceError> for ApiError {
    fn from(err: InvoiceError) -> Self {
        ApiError::internal(err.to_string())
    }
}

/// Converts multipart decoding errors to API errors.
impl From<axum::extract::multipart::MultipartError> for ApiError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        ApiError::validation(format!("Invalid multipart form: {}", err))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Unit Tests
// =============================================================================
