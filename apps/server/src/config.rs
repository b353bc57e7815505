//! Server configuration, loaded from environment variables with fallback
//! to development defaults.

use std::env;
use std::path::PathBuf;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address, e.g. "127.0.0.1:8080".
    pub bind_addr: String,

    /// SQLite database file path.
    pub database_path: PathBuf,

    /// Secret for signing session tokens.
    pub secret_key: String,

    /// Directory for uploaded product images and the shop logo. Also
    /// served at `/static/images`.
    pub upload_dir: PathBuf,

    /// Session lifetime in hours.
    pub session_lifetime_hours: i64,

    /// Whether checkout enforces the stock guard. The guard is vestigial
    /// (stock defaults are high) but kept behind an explicit flag so its
    /// semantics stay testable.
    pub enforce_stock_guard: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ServerConfig {
            bind_addr: env::var("TILL_BIND_ADDR")
                .unwrap_or_else(|_| "127.0.0.1:8080".to_string()),

            database_path: env::var("TILL_DATABASE_PATH")
                .unwrap_or_else(|_| "till.db".to_string())
                .into(),

            secret_key: env::var("TILL_SECRET_KEY").unwrap_or_else(|_| {
                // In production this MUST be set via environment variable.
                "till-dev-secret-change-in-production".to_string()
            }),

            upload_dir: env::var("TILL_UPLOAD_DIR")
                .unwrap_or_else(|_| "static/images".to_string())
                .into(),

            session_lifetime_hours: env::var("TILL_SESSION_LIFETIME_HOURS")
                .unwrap_or_else(|_| "8".to_string())
                .parse()
                .map_err(|_| {
                    ConfigError::InvalidValue("TILL_SESSION_LIFETIME_HOURS".to_string())
                })?,

            enforce_stock_guard: env::var("TILL_STOCK_GUARD")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
        };

        Ok(config)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        // Only exercise the default branch; env overrides are process-wide
        // and would race other tests.
        let config = ServerConfig::load().unwrap();
        assert!(!config.bind_addr.is_empty());
        assert_eq!(config.session_lifetime_hours, 8);
    }
}
