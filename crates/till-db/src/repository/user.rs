//! # User Repository
//!
//! Staff account storage. Password hashing itself lives at the
//! application layer; this repository only ever sees the finished hash.

use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use till_core::{Role, User};

const USER_COLUMNS: &str = "id, username, password_hash, role, created_at";

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Gets a user by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = ?1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Looks a user up by login name.
    pub async fn find_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE username = ?1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Inserts a new user. A duplicate username surfaces as
    /// [`DbError::UniqueViolation`].
    pub async fn insert(&self, user: &User) -> DbResult<()> {
        debug!(username = %user.username, role = ?user.role, "Inserting user");

        sqlx::query(
            r#"
            INSERT INTO users (id, username, password_hash, role, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Checks whether any admin account exists. Drives the startup
    /// bootstrap of the default admin.
    pub async fn admin_exists(&self) -> DbResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = ?1")
            .bind(Role::Admin)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }
}

/// Generates a new user ID.
pub fn generate_user_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;

    fn sample_user(username: &str, role: Role) -> User {
        User {
            id: generate_user_id(),
            username: username.to_string(),
            password_hash: "$argon2id$fake".to_string(),
            role,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.users();

        let user = sample_user("admin", Role::Admin);
        repo.insert(&user).await.unwrap();

        let fetched = repo.find_by_username("admin").await.unwrap().unwrap();
        assert_eq!(fetched.id, user.id);
        assert!(fetched.is_admin());

        assert!(repo.find_by_username("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_is_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.users();

        repo.insert(&sample_user("admin", Role::Admin)).await.unwrap();
        let err = repo
            .insert(&sample_user("admin", Role::Cashier))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_admin_exists() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.users();

        assert!(!repo.admin_exists().await.unwrap());

        repo.insert(&sample_user("cashier1", Role::Cashier))
            .await
            .unwrap();
        assert!(!repo.admin_exists().await.unwrap());

        repo.insert(&sample_user("admin", Role::Admin)).await.unwrap();
        assert!(repo.admin_exists().await.unwrap());
    }
}
