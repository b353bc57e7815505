//! # Repository Module
//!
//! Repository implementations for Till POS. Each repository owns the SQL
//! for one aggregate; callers never see raw queries.
//!
//! Per the single-shop data model there are no lazy relationship
//! back-references: related rows are fetched with explicit queries
//! (`OrderRepository::items_by_order`) returning owned collections.
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Catalog CRUD, search, popularity
//! - [`order::OrderRepository`] - Orders and order items
//! - [`setting::SettingRepository`] - Key/value shop settings
//! - [`user::UserRepository`] - Staff accounts
//! - [`offer::OfferRepository`] - Promotional offers

pub mod offer;
pub mod order;
pub mod product;
pub mod setting;
pub mod user;
