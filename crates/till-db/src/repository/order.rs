//! # Order Repository
//!
//! Database operations for orders and their line items.
//!
//! ## Write Path
//! Checkout writes an order atomically: the caller opens a transaction
//! via [`crate::Database::begin`], inserts the header with [`insert_in`],
//! inserts each item with [`insert_item_in`], and commits. Any error on
//! the way drops the transaction, which rolls everything back; a partial
//! order is never visible.
//!
//! [`insert_in`]: OrderRepository::insert_in
//! [`insert_item_in`]: OrderRepository::insert_item_in

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use till_core::{Order, OrderItem};

const ORDER_COLUMNS: &str = "id, invoice_number, customer_name, customer_phone, subtotal_cents, \
     tax_cents, discount_cents, total_cents, created_by, created_at";

const ORDER_ITEM_COLUMNS: &str =
    "id, order_id, product_id, name_snapshot, quantity, unit_price_cents, total_cents, position";

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Inserts an order header on an open transaction/connection.
    ///
    /// A duplicate invoice number surfaces as [`DbError::UniqueViolation`]
    /// from the `orders.invoice_number` unique constraint.
    pub async fn insert_in(&self, conn: &mut SqliteConnection, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, invoice_number = %order.invoice_number, "Inserting order");

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, invoice_number, customer_name, customer_phone,
                subtotal_cents, tax_cents, discount_cents, total_cents,
                created_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&order.id)
        .bind(&order.invoice_number)
        .bind(&order.customer_name)
        .bind(&order.customer_phone)
        .bind(order.subtotal_cents)
        .bind(order.tax_cents)
        .bind(order.discount_cents)
        .bind(order.total_cents)
        .bind(&order.created_by)
        .bind(order.created_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Inserts an order item on an open transaction/connection.
    pub async fn insert_item_in(
        &self,
        conn: &mut SqliteConnection,
        item: &OrderItem,
    ) -> DbResult<()> {
        debug!(order_id = %item.order_id, product_id = %item.product_id, "Inserting order item");

        sqlx::query(
            r#"
            INSERT INTO order_items (
                id, order_id, product_id, name_snapshot,
                quantity, unit_price_cents, total_cents, position
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&item.id)
        .bind(&item.order_id)
        .bind(&item.product_id)
        .bind(&item.name_snapshot)
        .bind(item.quantity)
        .bind(item.unit_price_cents)
        .bind(item.total_cents)
        .bind(item.position)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {} FROM orders WHERE id = ?1",
            ORDER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Gets all items for an order, in insertion order.
    pub async fn items_by_order(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(&format!(
            "SELECT {} FROM order_items WHERE order_id = ?1 ORDER BY position",
            ORDER_ITEM_COLUMNS
        ))
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists orders newest-first, optionally restricted to one creator
    /// and/or a start timestamp.
    pub async fn list(
        &self,
        created_by: Option<&str>,
        since: Option<DateTime<Utc>>,
    ) -> DbResult<Vec<Order>> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {} FROM orders WHERE 1 = 1",
            ORDER_COLUMNS
        ));

        if let Some(created_by) = created_by {
            qb.push(" AND created_by = ");
            qb.push_bind(created_by.to_string());
        }

        if let Some(since) = since {
            qb.push(" AND created_at >= ");
            qb.push_bind(since);
        }

        qb.push(" ORDER BY created_at DESC");

        let orders = qb.build_query_as::<Order>().fetch_all(&self.pool).await?;
        Ok(orders)
    }

    /// The most recent orders, for the admin dashboard.
    pub async fn recent(&self, limit: u32) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {} FROM orders ORDER BY created_at DESC LIMIT ?1",
            ORDER_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Best-selling products since a timestamp: (product name, units sold),
    /// highest first.
    pub async fn top_sellers_since(
        &self,
        since: DateTime<Utc>,
        limit: u32,
    ) -> DbResult<Vec<(String, i64)>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT oi.name_snapshot, SUM(oi.quantity) AS units
            FROM order_items oi
            INNER JOIN orders o ON o.id = oi.order_id
            WHERE o.created_at >= ?1
            GROUP BY oi.product_id, oi.name_snapshot
            ORDER BY units DESC
            LIMIT ?2
            "#,
        )
        .bind(since)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Deletes an order; the `ON DELETE CASCADE` constraint removes its
    /// items. Product rows are untouched.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting order");

        let result = sqlx::query("DELETE FROM orders WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        Ok(())
    }

    /// Counts all orders.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Counts the items belonging to an order.
    pub async fn count_items(&self, order_id: &str) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM order_items WHERE order_id = ?1")
                .bind(order_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

/// Generates an invoice number: `INV-<YYYYMMDD>-<8 uppercase hex chars>`.
///
/// The random token comes from a UUID v4; actual uniqueness is enforced by
/// the `orders.invoice_number` unique constraint, not by randomness alone.
pub fn generate_invoice_number() -> String {
    let date_part = Utc::now().format("%Y%m%d");
    let uuid_hex = Uuid::new_v4().simple().to_string();
    let token = uuid_hex[..8].to_uppercase();

    format!("INV-{}-{}", date_part, token)
}

/// Generates a new order ID.
pub fn generate_order_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generates a new order item ID.
pub fn generate_order_item_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
