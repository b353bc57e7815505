//! # Startup Bootstrap
//!
//! Seeds the database on first run: the default admin account, the default
//! settings, and the initial home-page offers. Every step is conditional,
//! so admin edits survive restarts.

use chrono::Utc;
use tracing::info;

use crate::auth::hash_password;
use crate::error::ApiError;
use till_core::{Offer, Role, User};
use till_db::repository::offer::generate_offer_id;
use till_db::repository::user::generate_user_id;
use till_db::Database;

/// Default settings written when the keys are absent.
pub const DEFAULT_SETTINGS: &[(&str, &str)] = &[
    ("shop_name", "Trio Snacks"),
    ("shop_address", "123 Main Street, City"),
    ("shop_phone", "+91 9876543210"),
    ("tax_rate", "5.0"),
    ("gst_rate", "0.0"),
    ("stock_alert_threshold", "10"),
    ("invoice_footer", "Thank you for your business!"),
];

/// Default admin credentials created when no admin account exists.
const DEFAULT_ADMIN_USERNAME: &str = "admin";
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Offers seeded when the offers table is empty.
const DEFAULT_OFFERS: &[(&str, &str, i64)] = &[
    ("Buy 2 Get 1 Free", "On selected chips and snacks", 0),
    ("Weekend Special", "20% off on all bakery items", 1),
    ("Happy Hours", "10% discount on snacks (7 PM - 9 PM)", 2),
];

/// Runs the bootstrap against a migrated database.
pub async fn run(db: &Database) -> Result<(), ApiError> {
    ensure_admin(db).await?;
    ensure_settings(db).await?;
    ensure_offers(db).await?;
    Ok(())
}

async fn ensure_admin(db: &Database) -> Result<(), ApiError> {
    if db.users().admin_exists().await? {
        return Ok(());
    }

    let admin = User {
        id: generate_user_id(),
        username: DEFAULT_ADMIN_USERNAME.to_string(),
        password_hash: hash_password(DEFAULT_ADMIN_PASSWORD)?,
        role: Role::Admin,
        created_at: Utc::now(),
    };

    db.users().insert(&admin).await?;
    info!(username = DEFAULT_ADMIN_USERNAME, "Created default admin account");

    Ok(())
}

async fn ensure_settings(db: &Database) -> Result<(), ApiError> {
    let settings = db.settings();

    for (key, value) in DEFAULT_SETTINGS {
        settings.set_if_absent(key, value).await?;
    }

    Ok(())
}

async fn ensure_offers(db: &Database) -> Result<(), ApiError> {
    let offers = db.offers();

    if offers.count().await? > 0 {
        return Ok(());
    }

    let now = Utc::now();
    for (title, description, display_order) in DEFAULT_OFFERS {
        offers
            .insert(&Offer {
                id: generate_offer_id(),
                title: (*title).to_string(),
                description: (*description).to_string(),
                display_order: *display_order,
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .await?;
    }

    info!(count = DEFAULT_OFFERS.len(), "Seeded default offers");
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verify_password;
    use till_db::DbConfig;

    #[tokio::test]
    async fn test_bootstrap_seeds_defaults() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        run(&db).await.unwrap();

        let admin = db
            .users()
            .find_by_username("admin")
            .await
            .unwrap()
            .unwrap();
        assert!(admin.is_admin());
        assert!(verify_password("admin123", &admin.password_hash));

        assert_eq!(
            db.settings().get("tax_rate").await.unwrap().as_deref(),
            Some("5.0")
        );
        assert_eq!(db.offers().count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_bootstrap_is_idempotent_and_preserves_edits() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        run(&db).await.unwrap();

        db.settings().set("tax_rate", "12.5").await.unwrap();

        run(&db).await.unwrap();

        assert_eq!(
            db.settings().get("tax_rate").await.unwrap().as_deref(),
            Some("12.5")
        );
        assert_eq!(db.offers().count().await.unwrap(), 3);
    }
}
