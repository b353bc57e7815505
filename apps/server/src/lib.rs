//! # till-server: HTTP Application for Till POS
//!
//! Axum application serving the shop: public catalog, session-based cart,
//! order checkout with PDF invoices, and the admin back office.
//!
//! ## Request Flow
//! ```text
//! Router -> auth extractors (CurrentUser / AdminUser)
//!        -> handler
//!        -> till-core (cart/checkout math) + till-db (repositories)
//!        -> ApiError -> JSON error payload
//! ```
//!
//! ## Configuration
//! Environment variables (see [`config::ServerConfig`]):
//! - `TILL_BIND_ADDR` - listen address (default: 127.0.0.1:8080)
//! - `TILL_DATABASE_PATH` - SQLite file path (default: till.db)
//! - `TILL_SECRET_KEY` - session signing secret
//! - `TILL_UPLOAD_DIR` - product image / logo directory
//! - `TILL_SESSION_LIFETIME_HOURS` - session lifetime (default: 8)
//! - `TILL_STOCK_GUARD` - enable the vestigial checkout stock guard

pub mod auth;
pub mod bootstrap;
pub mod carts;
pub mod checkout;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod uploads;

pub use config::ServerConfig;
pub use error::{ApiError, ErrorCode};
pub use routes::build_router;
pub use state::AppState;
