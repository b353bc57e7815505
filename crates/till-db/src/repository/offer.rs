//! # Offer Repository
//!
//! CRUD for the promotional offers shown on the home page.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use till_core::Offer;

const OFFER_COLUMNS: &str = "id, title, description, display_order, is_active, created_at, updated_at";

/// Repository for offers.
#[derive(Debug, Clone)]
pub struct OfferRepository {
    pool: SqlitePool,
}

impl OfferRepository {
    /// Creates a new OfferRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OfferRepository { pool }
    }

    /// All offers, in display order.
    pub async fn list_all(&self) -> DbResult<Vec<Offer>> {
        let offers = sqlx::query_as::<_, Offer>(&format!(
            "SELECT {} FROM offers ORDER BY display_order, id",
            OFFER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(offers)
    }

    /// Active offers only, in display order.
    pub async fn list_active(&self) -> DbResult<Vec<Offer>> {
        let offers = sqlx::query_as::<_, Offer>(&format!(
            "SELECT {} FROM offers WHERE is_active = 1 ORDER BY display_order, id",
            OFFER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(offers)
    }

    /// Gets an offer by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Offer>> {
        let offer = sqlx::query_as::<_, Offer>(&format!(
            "SELECT {} FROM offers WHERE id = ?1",
            OFFER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(offer)
    }

    /// Inserts a new offer.
    pub async fn insert(&self, offer: &Offer) -> DbResult<()> {
        debug!(id = %offer.id, title = %offer.title, "Inserting offer");

        sqlx::query(
            r#"
            INSERT INTO offers (
                id, title, description, display_order, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&offer.id)
        .bind(&offer.title)
        .bind(&offer.description)
        .bind(offer.display_order)
        .bind(offer.is_active)
        .bind(offer.created_at)
        .bind(offer.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates an existing offer.
    pub async fn update(&self, offer: &Offer) -> DbResult<()> {
        debug!(id = %offer.id, "Updating offer");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE offers SET
                title = ?2,
                description = ?3,
                display_order = ?4,
                is_active = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&offer.id)
        .bind(&offer.title)
        .bind(&offer.description)
        .bind(offer.display_order)
        .bind(offer.is_active)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Offer", &offer.id));
        }

        Ok(())
    }

    /// Deletes an offer.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM offers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Offer", id));
        }

        Ok(())
    }

    /// Counts all offers.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM offers")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Generates a new offer ID.
pub fn generate_offer_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn sample_offer(title: &str, display_order: i64, is_active: bool) -> Offer {
        let now = Utc::now();
        Offer {
            id: generate_offer_id(),
            title: title.to_string(),
            description: "details".to_string(),
            display_order,
            is_active,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_list_orders_by_display_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.offers();

        repo.insert(&sample_offer("Second", 1, true)).await.unwrap();
        repo.insert(&sample_offer("First", 0, true)).await.unwrap();
        repo.insert(&sample_offer("Hidden", 2, false)).await.unwrap();

        let all = repo.list_all().await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].title, "First");
        assert_eq!(all[1].title, "Second");

        let active = repo.list_active().await.unwrap();
        assert_eq!(active.len(), 2);
        assert!(active.iter().all(|o| o.is_active));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.offers();

        let mut offer = sample_offer("Weekend Special", 0, true);
        repo.insert(&offer).await.unwrap();

        offer.title = "Weekday Special".to_string();
        offer.is_active = false;
        repo.update(&offer).await.unwrap();

        let fetched = repo.get_by_id(&offer.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "Weekday Special");
        assert!(!fetched.is_active);

        repo.delete(&offer.id).await.unwrap();
        assert!(repo.get_by_id(&offer.id).await.unwrap().is_none());

        let err = repo.delete(&offer.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
