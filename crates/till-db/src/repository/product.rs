//! # Product Repository
//!
//! Catalog database operations: filtered listing, CRUD, and the
//! popularity query backing the home page.
//!
//! Search is a case-insensitive substring match on the product name
//! (SQLite `LIKE` is case-insensitive for ASCII), optionally combined
//! with an exact category filter.

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use till_core::Product;

const PRODUCT_COLUMNS: &str = "id, name, category, price_cents, stock_quantity, description, \
     image_url, is_available, created_at, updated_at";

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists products, optionally filtered by category and/or a
    /// case-insensitive name substring. `only_available` restricts to
    /// products visible on the menu.
    pub async fn list(
        &self,
        category: Option<&str>,
        search: Option<&str>,
        only_available: bool,
    ) -> DbResult<Vec<Product>> {
        debug!(?category, ?search, only_available, "Listing products");

        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {} FROM products WHERE 1 = 1",
            PRODUCT_COLUMNS
        ));

        if only_available {
            qb.push(" AND is_available = 1");
        }

        if let Some(category) = category {
            qb.push(" AND category = ");
            qb.push_bind(category.to_string());
        }

        if let Some(search) = search {
            if !search.is_empty() {
                qb.push(" AND name LIKE ");
                qb.push_bind(format!("%{}%", search));
            }
        }

        qb.push(" ORDER BY name");

        let products = qb
            .build_query_as::<Product>()
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Listing returned products");
        Ok(products)
    }

    /// Returns the distinct category tags in use.
    pub async fn categories(&self) -> DbResult<Vec<String>> {
        let categories: Vec<String> =
            sqlx::query_scalar("SELECT DISTINCT category FROM products ORDER BY category")
                .fetch_all(&self.pool)
                .await?;

        Ok(categories)
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products WHERE id = ?1",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by ID on an open transaction/connection. Used by the
    /// checkout stock guard so the read is part of the order transaction.
    pub async fn get_by_id_in(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
    ) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products WHERE id = ?1",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(product)
    }

    /// Inserts a new product.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, category, price_cents, stock_quantity,
                description, image_url, is_available, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.price_cents)
        .bind(product.stock_quantity)
        .bind(&product.description)
        .bind(&product.image_url)
        .bind(product.is_available)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates an existing product.
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                category = ?3,
                price_cents = ?4,
                stock_quantity = ?5,
                description = ?6,
                image_url = ?7,
                is_available = ?8,
                updated_at = ?9
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.price_cents)
        .bind(product.stock_quantity)
        .bind(&product.description)
        .bind(&product.image_url)
        .bind(product.is_available)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Deletes a product. Historical order items keep their snapshots, but
    /// the delete fails with a foreign key violation while order items
    /// still reference the row.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Returns the best-selling products by total units sold, for the home
    /// page "popular" strip.
    pub async fn popular(&self, limit: u32) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT p.id, p.name, p.category, p.price_cents, p.stock_quantity,
                   p.description, p.image_url, p.is_available, p.created_at, p.updated_at
            FROM products p
            INNER JOIN order_items oi ON oi.product_id = p.id
            GROUP BY p.id
            ORDER BY SUM(oi.quantity) DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Counts all products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use till_core::DEFAULT_STOCK_QUANTITY;

    fn sample_product(name: &str, category: &str, price_cents: i64) -> Product {
        let now = Utc::now();
        Product {
            id: generate_product_id(),
            name: name.to_string(),
            category: category.to_string(),
            price_cents,
            stock_quantity: DEFAULT_STOCK_QUANTITY,
            description: None,
            image_url: None,
            is_available: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let product = sample_product("Potato Chips", "chips", 1500);
        repo.insert(&product).await.unwrap();

        let fetched = repo.get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Potato Chips");
        assert_eq!(fetched.price_cents, 1500);
        assert!(fetched.is_available);
    }

    #[tokio::test]
    async fn test_list_filters_by_category_and_search() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        repo.insert(&sample_product("Potato Chips", "chips", 1500))
            .await
            .unwrap();
        repo.insert(&sample_product("Banana Chips", "chips", 1200))
            .await
            .unwrap();
        repo.insert(&sample_product("Chocolate Cake", "bakery", 4500))
            .await
            .unwrap();

        let chips = repo.list(Some("chips"), None, true).await.unwrap();
        assert_eq!(chips.len(), 2);

        // Case-insensitive substring search.
        let found = repo.list(None, Some("pOtAtO"), true).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Potato Chips");

        let both = repo.list(Some("chips"), Some("banana"), true).await.unwrap();
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].name, "Banana Chips");
    }

    #[tokio::test]
    async fn test_categories_are_distinct_and_sorted() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        repo.insert(&sample_product("A", "sweets", 100)).await.unwrap();
        repo.insert(&sample_product("B", "chips", 100)).await.unwrap();
        repo.insert(&sample_product("C", "chips", 100)).await.unwrap();

        let categories = repo.categories().await.unwrap();
        assert_eq!(categories, vec!["chips".to_string(), "sweets".to_string()]);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let mut product = sample_product("Old Name", "chips", 1000);
        repo.insert(&product).await.unwrap();

        product.name = "New Name".to_string();
        product.price_cents = 1100;
        repo.update(&product).await.unwrap();

        let fetched = repo.get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "New Name");
        assert_eq!(fetched.price_cents, 1100);

        repo.delete(&product.id).await.unwrap();
        assert!(repo.get_by_id(&product.id).await.unwrap().is_none());

        let err = repo.delete(&product.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
