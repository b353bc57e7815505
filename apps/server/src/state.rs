//! # Application State
//!
//! Shared state handed to every handler. Separate concerns stay in
//! separate fields: the database pool is internally synchronized, the cart
//! store carries its own lock, and config/sessions are read-only after
//! startup.

use std::sync::Arc;

use crate::auth::SessionManager;
use crate::carts::CartStore;
use crate::config::ServerConfig;
use till_db::Database;

/// Shared application state. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub carts: Arc<CartStore>,
    pub sessions: Arc<SessionManager>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Creates the application state from a connected database and config.
    pub fn new(db: Database, config: ServerConfig) -> Self {
        let sessions = SessionManager::new(
            config.secret_key.clone(),
            config.session_lifetime_hours,
        );

        AppState {
            db,
            carts: Arc::new(CartStore::new()),
            sessions: Arc::new(sessions),
            config: Arc::new(config),
        }
    }
}
