//! # Setting Repository
//!
//! Key/value shop configuration. Values are untyped text at rest; the
//! typed readers here parse leniently and fall back to defaults, so a
//! malformed setting can never take checkout down.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use till_core::{Setting, TaxRate, DEFAULT_TAX_RATE_BPS};

/// Repository for settings.
#[derive(Debug, Clone)]
pub struct SettingRepository {
    pool: SqlitePool,
}

impl SettingRepository {
    /// Creates a new SettingRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SettingRepository { pool }
    }

    /// Gets a setting value by key.
    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM settings WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(value)
    }

    /// Gets a setting value, falling back to a default when unset.
    pub async fn get_or(&self, key: &str, default: &str) -> DbResult<String> {
        Ok(self.get(key).await?.unwrap_or_else(|| default.to_string()))
    }

    /// Inserts or overwrites a setting.
    pub async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        debug!(key = %key, "Writing setting");

        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO settings (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Inserts a setting only if the key is not present yet. Used by the
    /// startup bootstrap so admin edits survive restarts.
    pub async fn set_if_absent(&self, key: &str, value: &str) -> DbResult<()> {
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO settings (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (key) DO NOTHING
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Returns all settings.
    pub async fn all(&self) -> DbResult<Vec<Setting>> {
        let settings = sqlx::query_as::<_, Setting>(
            "SELECT key, value, updated_at FROM settings ORDER BY key",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(settings)
    }

    /// Reads the checkout tax rate.
    ///
    /// Unset or unparseable text falls back to the 5.0% default rather
    /// than failing the checkout.
    pub async fn tax_rate(&self) -> DbResult<TaxRate> {
        let rate = self
            .get("tax_rate")
            .await?
            .and_then(|text| text.trim().parse::<f64>().ok())
            .filter(|pct| *pct >= 0.0)
            .map(TaxRate::from_percentage)
            .unwrap_or(TaxRate::from_bps(DEFAULT_TAX_RATE_BPS));

        Ok(rate)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_set_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.settings();

        assert!(repo.get("shop_name").await.unwrap().is_none());

        repo.set("shop_name", "Trio Snacks").await.unwrap();
        assert_eq!(
            repo.get("shop_name").await.unwrap().as_deref(),
            Some("Trio Snacks")
        );

        // Overwrite.
        repo.set("shop_name", "New Name").await.unwrap();
        assert_eq!(
            repo.get("shop_name").await.unwrap().as_deref(),
            Some("New Name")
        );
    }

    #[tokio::test]
    async fn test_set_if_absent_does_not_overwrite() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.settings();

        repo.set("tax_rate", "12.0").await.unwrap();
        repo.set_if_absent("tax_rate", "5.0").await.unwrap();

        assert_eq!(repo.get("tax_rate").await.unwrap().as_deref(), Some("12.0"));
    }

    #[tokio::test]
    async fn test_tax_rate_parses_setting() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.settings();

        repo.set("tax_rate", "8.25").await.unwrap();
        assert_eq!(repo.tax_rate().await.unwrap().bps(), 825);
    }

    #[tokio::test]
    async fn test_tax_rate_defaults_when_missing_or_malformed() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.settings();

        // Unset.
        assert_eq!(repo.tax_rate().await.unwrap().bps(), 500);

        // Malformed text must not crash checkout.
        repo.set("tax_rate", "not-a-number").await.unwrap();
        assert_eq!(repo.tax_rate().await.unwrap().bps(), 500);

        repo.set("tax_rate", "-3").await.unwrap();
        assert_eq!(repo.tax_rate().await.unwrap().bps(), 500);
    }

    #[tokio::test]
    async fn test_all_returns_sorted_keys() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.settings();

        repo.set("b_key", "2").await.unwrap();
        repo.set("a_key", "1").await.unwrap();

        let all = repo.all().await.unwrap();
        let keys: Vec<&str> = all.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["a_key", "b_key"]);
    }
}
