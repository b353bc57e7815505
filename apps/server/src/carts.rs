//! # Cart Store
//!
//! Holds one [`Cart`] per session id. The store is the "session state" of
//! the cart: every mutation happens under the lock and is immediately
//! visible to the next request on the same session. Carts are never
//! persisted; they die with their session.

use std::collections::HashMap;
use std::sync::RwLock;

use till_core::Cart;

/// Per-session cart storage.
///
/// A plain `RwLock<HashMap>`: cart operations are short and mostly writes,
/// and sessions never contend on each other's entries for long.
#[derive(Debug, Default)]
pub struct CartStore {
    carts: RwLock<HashMap<String, Cart>>,
}

impl CartStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        CartStore {
            carts: RwLock::new(HashMap::new()),
        }
    }

    /// Executes a function with read access to a session's cart. Sessions
    /// without a cart see an empty one.
    pub fn with_cart<F, R>(&self, session_id: &str, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let carts = self.carts.read().expect("cart store lock poisoned");
        match carts.get(session_id) {
            Some(cart) => f(cart),
            None => f(&Cart::new()),
        }
    }

    /// Executes a function with write access to a session's cart, creating
    /// an empty cart on first mutation.
    pub fn with_cart_mut<F, R>(&self, session_id: &str, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut carts = self.carts.write().expect("cart store lock poisoned");
        let cart = carts.entry(session_id.to_string()).or_default();
        f(cart)
    }

    /// Returns a snapshot of a session's cart for checkout.
    pub fn snapshot(&self, session_id: &str) -> Cart {
        self.with_cart(session_id, |cart| cart.clone())
    }

    /// Drops a session's cart entirely (logout).
    pub fn remove_session(&self, session_id: &str) {
        let mut carts = self.carts.write().expect("cart store lock poisoned");
        carts.remove(session_id);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use till_core::Product;

    fn test_product(id: &str, price_cents: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            category: "snacks".to_string(),
            price_cents,
            stock_quantity: 999,
            description: None,
            image_url: None,
            is_available: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_sessions_are_isolated() {
        let store = CartStore::new();
        let product = test_product("1", 500);

        store
            .with_cart_mut("session-a", |cart| cart.add_line(&product, 2))
            .unwrap();

        assert_eq!(store.with_cart("session-a", |c| c.len()), 1);
        assert_eq!(store.with_cart("session-b", |c| c.len()), 0);
    }

    #[test]
    fn test_mutations_persist_across_accesses() {
        let store = CartStore::new();
        let product = test_product("1", 500);

        store
            .with_cart_mut("sid", |cart| cart.add_line(&product, 1))
            .unwrap();
        store
            .with_cart_mut("sid", |cart| cart.set_quantity("1", 4))
            .unwrap();

        let snapshot = store.snapshot("sid");
        assert_eq!(snapshot.lines()[0].quantity, 4);
    }

    #[test]
    fn test_remove_session_clears_cart() {
        let store = CartStore::new();
        let product = test_product("1", 500);

        store
            .with_cart_mut("sid", |cart| cart.add_line(&product, 1))
            .unwrap();
        store.remove_session("sid");

        assert!(store.with_cart("sid", |c| c.is_empty()));
    }
}
