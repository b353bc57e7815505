//! # Route Handlers
//!
//! Thin HTTP adapters: decode the request, call into the cart store /
//! checkout engine / repositories, encode the response. Authorization is
//! handled by the extractors in [`crate::auth`] before a handler runs.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod orders;
