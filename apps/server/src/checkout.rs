//! # Checkout Engine
//!
//! Turns a session cart plus customer input into a persisted order graph.
//!
//! The whole write happens inside one transaction: order header first,
//! then one item per cart line, each line re-reading its product inside
//! the transaction for the stock guard. Any failure drops the transaction
//! and rolls everything back; a partial order is never visible. The caller
//! clears the session cart only after a successful commit.

use chrono::Utc;
use tracing::info;

use crate::error::ApiError;
use till_core::checkout::compute_totals;
use till_core::validation::validate_discount_cents;
use till_core::{Cart, CoreError, Money, Order, OrderItem};
use till_db::repository::order::{generate_order_id, generate_order_item_id};
use till_db::{generate_invoice_number, Database, DbError};

/// Customer-facing checkout input.
#[derive(Debug, Clone)]
pub struct OrderInput {
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    /// Requested flat discount; clamped to the subtotal during totals
    /// computation.
    pub discount: Money,
}

/// Processes an order: computes totals, persists the order with its items
/// atomically, and returns the stored order.
///
/// `enforce_stock` is the vestigial stock guard flag. Products default to
/// a high stock quantity so the guard rarely fires, but when it does the
/// entire transaction is rolled back and the failing product is named.
pub async fn process_order(
    db: &Database,
    cart: &Cart,
    input: &OrderInput,
    actor_id: &str,
    enforce_stock: bool,
) -> Result<Order, ApiError> {
    validate_discount_cents(input.discount.cents()).map_err(CoreError::from)?;

    // Tax rate from settings; a malformed value falls back to the default
    // rather than failing the checkout.
    let tax_rate = db.settings().tax_rate().await?;

    let totals = compute_totals(cart, tax_rate, input.discount)?;

    let order = Order {
        id: generate_order_id(),
        invoice_number: generate_invoice_number(),
        customer_name: clean_optional(input.customer_name.as_deref()),
        customer_phone: clean_optional(input.customer_phone.as_deref()),
        subtotal_cents: totals.subtotal.cents(),
        tax_cents: totals.tax.cents(),
        discount_cents: totals.discount.cents(),
        total_cents: totals.total.cents(),
        created_by: actor_id.to_string(),
        created_at: Utc::now(),
    };

    let orders = db.orders();
    let products = db.products();

    let mut tx = db.begin().await?;

    orders.insert_in(&mut tx, &order).await?;

    for (position, line) in cart.lines().iter().enumerate() {
        // Re-fetch inside the transaction so the stock guard reads the
        // same snapshot the order is written against.
        let product = products
            .get_by_id_in(&mut tx, &line.product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(line.product_id.clone()))
            .map_err(ApiError::from)?;

        if enforce_stock && product.stock_quantity < line.quantity {
            // Returning drops the transaction, rolling back the header and
            // every item written so far.
            return Err(CoreError::InsufficientStock {
                name: product.name,
                available: product.stock_quantity,
                requested: line.quantity,
            }
            .into());
        }

        let item = OrderItem {
            id: generate_order_item_id(),
            order_id: order.id.clone(),
            product_id: line.product_id.clone(),
            name_snapshot: line.name.clone(),
            quantity: line.quantity,
            // Snapshot price from the cart, not the live product row.
            unit_price_cents: line.unit_price_cents,
            total_cents: line.unit_price_cents * line.quantity,
            position: position as i64,
        };

        orders.insert_item_in(&mut tx, &item).await?;
    }

    tx.commit().await.map_err(DbError::from)?;

    info!(
        order_id = %order.id,
        invoice_number = %order.invoice_number,
        total_cents = order.total_cents,
        items = cart.len(),
        "Order created"
    );

    Ok(order)
}

fn clean_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use till_db::repository::product::generate_product_id;
    use till_db::repository::user::generate_user_id;
    use till_db::DbConfig;
    use till_core::{Product, Role, User, DEFAULT_STOCK_QUANTITY};

    async fn seeded_db() -> (Database, User) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let user = User {
            id: generate_user_id(),
            username: "cashier1".to_string(),
            password_hash: "x".to_string(),
            role: Role::Cashier,
            created_at: Utc::now(),
        };
        db.users().insert(&user).await.unwrap();

        (db, user)
    }

    async fn insert_product(db: &Database, price_cents: i64, stock: i64) -> Product {
        let now = Utc::now();
        let product = Product {
            id: generate_product_id(),
            name: format!("Product {}", price_cents),
            category: "snacks".to_string(),
            price_cents,
            stock_quantity: stock,
            description: None,
            image_url: None,
            is_available: true,
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&product).await.unwrap();
        product
    }

    fn input(discount_cents: i64) -> OrderInput {
        OrderInput {
            customer_name: Some("Asha".to_string()),
            customer_phone: None,
            discount: Money::from_cents(discount_cents),
        }
    }

    #[tokio::test]
    async fn test_process_order_persists_order_and_items() {
        let (db, user) = seeded_db().await;
        let a = insert_product(&db, 1000, DEFAULT_STOCK_QUANTITY).await;
        let b = insert_product(&db, 500, DEFAULT_STOCK_QUANTITY).await;

        let mut cart = Cart::new();
        cart.add_line(&a, 2).unwrap();
        cart.add_line(&b, 1).unwrap();

        let order = process_order(&db, &cart, &input(0), &user.id, true)
            .await
            .unwrap();

        // Default 5% tax: subtotal 25.00, tax 1.25, total 26.25.
        assert_eq!(order.subtotal_cents, 2500);
        assert_eq!(order.tax_cents, 125);
        assert_eq!(order.total_cents, 2625);

        let stored = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(stored.invoice_number, order.invoice_number);
        assert_eq!(db.orders().count_items(&order.id).await.unwrap(), 2);

        let items = db.orders().items_by_order(&order.id).await.unwrap();
        assert_eq!(items[0].position, 0);
        assert_eq!(items[0].name_snapshot, a.name);
        assert_eq!(items[1].position, 1);
    }

    #[tokio::test]
    async fn test_empty_cart_creates_no_order() {
        let (db, user) = seeded_db().await;

        let err = process_order(&db, &Cart::new(), &input(0), &user.id, true)
            .await
            .unwrap_err();

        assert!(err.message.contains("Cart is empty"));
        assert_eq!(db.orders().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_discount_is_clamped() {
        let (db, user) = seeded_db().await;
        let a = insert_product(&db, 1000, DEFAULT_STOCK_QUANTITY).await;
        let b = insert_product(&db, 500, DEFAULT_STOCK_QUANTITY).await;

        let mut cart = Cart::new();
        cart.add_line(&a, 2).unwrap();
        cart.add_line(&b, 1).unwrap();

        let order = process_order(&db, &cart, &input(10000), &user.id, true)
            .await
            .unwrap();

        assert_eq!(order.discount_cents, 2500);
        assert_eq!(order.total_cents, 125);
    }

    #[tokio::test]
    async fn test_stock_guard_rolls_back_whole_order() {
        let (db, user) = seeded_db().await;
        let plenty = insert_product(&db, 1000, DEFAULT_STOCK_QUANTITY).await;
        let scarce = insert_product(&db, 500, 1).await;

        let mut cart = Cart::new();
        cart.add_line(&plenty, 2).unwrap();
        cart.add_line(&scarce, 5).unwrap();

        let err = process_order(&db, &cart, &input(0), &user.id, true)
            .await
            .unwrap_err();

        assert!(err.message.contains("Insufficient stock"));
        assert!(err.message.contains(&scarce.name));

        // All-or-nothing: the first line must not survive either.
        assert_eq!(db.orders().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_stock_guard_can_be_disabled() {
        let (db, user) = seeded_db().await;
        let scarce = insert_product(&db, 500, 1).await;

        let mut cart = Cart::new();
        cart.add_line(&scarce, 5).unwrap();

        let order = process_order(&db, &cart, &input(0), &user.id, false)
            .await
            .unwrap();

        assert_eq!(db.orders().count_items(&order.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_tax_rate_setting_is_used() {
        let (db, user) = seeded_db().await;
        db.settings().set("tax_rate", "10").await.unwrap();

        let product = insert_product(&db, 1000, DEFAULT_STOCK_QUANTITY).await;
        let mut cart = Cart::new();
        cart.add_line(&product, 1).unwrap();

        let order = process_order(&db, &cart, &input(0), &user.id, true)
            .await
            .unwrap();

        assert_eq!(order.tax_cents, 100);
        assert_eq!(order.total_cents, 1100);
    }

    #[tokio::test]
    async fn test_unit_price_comes_from_cart_snapshot() {
        let (db, user) = seeded_db().await;
        let mut product = insert_product(&db, 1000, DEFAULT_STOCK_QUANTITY).await;

        let mut cart = Cart::new();
        cart.add_line(&product, 1).unwrap();

        // Price raised after the product entered the cart.
        product.price_cents = 9999;
        db.products().update(&product).await.unwrap();

        let order = process_order(&db, &cart, &input(0), &user.id, true)
            .await
            .unwrap();

        let items = db.orders().items_by_order(&order.id).await.unwrap();
        assert_eq!(items[0].unit_price_cents, 1000);
        assert_eq!(order.subtotal_cents, 1000);
    }
}
