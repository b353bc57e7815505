//! # till-db: Database Layer for Till POS
//!
//! SQLite storage for the shop: products, orders and their items, users,
//! settings and offers. Built on sqlx with an async connection pool and
//! embedded migrations.
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use till_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("till.db")).await?;
//! let products = db.products().list(None, Some("chips"), true).await?;
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::offer::OfferRepository;
pub use repository::order::{generate_invoice_number, OrderRepository};
pub use repository::product::ProductRepository;
pub use repository::setting::SettingRepository;
pub use repository::user::UserRepository;
