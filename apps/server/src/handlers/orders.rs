//! Order processing, history and PDF invoices.

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth::{AdminUser, CurrentUser};
use crate::checkout::{process_order, OrderInput};
use crate::error::ApiError;
use crate::state::AppState;
use till_core::{Money, Order, OrderItem};
use till_invoice::{render_invoice, ShopInfo};

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ProcessOrderRequest {
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    /// Flat discount in currency units.
    #[serde(default)]
    pub discount: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct ProcessOrderResponse {
    pub success: bool,
    pub order_id: String,
    pub invoice_number: String,
}

#[derive(Debug, Deserialize)]
pub struct OrdersQuery {
    pub period: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OrderDto {
    pub id: String,
    pub invoice_number: String,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub subtotal: f64,
    pub tax: f64,
    pub discount: f64,
    pub total: f64,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Order> for OrderDto {
    fn from(order: &Order) -> Self {
        OrderDto {
            id: order.id.clone(),
            invoice_number: order.invoice_number.clone(),
            customer_name: order.customer_name.clone(),
            customer_phone: order.customer_phone.clone(),
            subtotal: order.subtotal().as_currency_f64(),
            tax: order.tax().as_currency_f64(),
            discount: order.discount().as_currency_f64(),
            total: order.total().as_currency_f64(),
            created_by: order.created_by.clone(),
            created_at: order.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderItemDto {
    pub product_id: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub total: f64,
}

impl From<&OrderItem> for OrderItemDto {
    fn from(item: &OrderItem) -> Self {
        OrderItemDto {
            product_id: item.product_id.clone(),
            name: item.name_snapshot.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price().as_currency_f64(),
            total: item.line_total().as_currency_f64(),
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /api/order/process` - checkout. On success the session cart is
/// cleared and the new order's identifiers are returned.
pub async fn process(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Json(req): Json<ProcessOrderRequest>,
) -> Result<Json<ProcessOrderResponse>, ApiError> {
    let cart = state.carts.snapshot(&claims.sid);

    let input = OrderInput {
        customer_name: req.customer_name,
        customer_phone: req.customer_phone,
        discount: Money::from_currency_f64(req.discount.unwrap_or(0.0)),
    };

    let order = process_order(
        &state.db,
        &cart,
        &input,
        &claims.sub,
        state.config.enforce_stock_guard,
    )
    .await?;

    // Only a committed order clears the cart.
    state.carts.with_cart_mut(&claims.sid, |cart| cart.clear());

    Ok(Json(ProcessOrderResponse {
        success: true,
        order_id: order.id,
        invoice_number: order.invoice_number,
    }))
}

/// `GET /invoice/{order_id}/pdf` - renders the invoice as a PDF
/// attachment. Only the order's creator or an admin may download it;
/// anyone else is silently redirected to the billing view.
pub async fn invoice_pdf(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Path(order_id): Path<String>,
) -> Result<Response, ApiError> {
    let order = state
        .db
        .orders()
        .get_by_id(&order_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order", &order_id))?;

    if !claims.is_admin() && order.created_by != claims.sub {
        return Ok(Redirect::to("/billing").into_response());
    }

    let items = state.db.orders().items_by_order(&order_id).await?;
    let shop = shop_info(&state).await?;

    let bytes = render_invoice(&order, &items, &shop)?;

    let disposition = format!(
        "attachment; filename=\"invoice_{}.pdf\"",
        order.invoice_number
    );
    let headers = [
        (
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/pdf"),
        ),
        (
            header::CONTENT_DISPOSITION,
            HeaderValue::from_str(&disposition)
                .map_err(|e| ApiError::internal(e.to_string()))?,
        ),
    ];

    Ok((headers, bytes).into_response())
}

/// `GET /orders?period=today|week|month|all` - order history with a sales
/// summary. Cashiers only see their own orders.
pub async fn list(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Query(query): Query<OrdersQuery>,
) -> Result<Json<Value>, ApiError> {
    let period = query.period.unwrap_or_else(|| "today".to_string());
    let since = period_start(&period);

    let created_by = if claims.is_admin() {
        None
    } else {
        Some(claims.sub.clone())
    };

    let orders = state.db.orders().list(created_by.as_deref(), since).await?;

    let total_sales_cents: i64 = orders.iter().map(|o| o.total_cents).sum();
    let dtos: Vec<OrderDto> = orders.iter().map(OrderDto::from).collect();
    let total_orders = dtos.len();

    Ok(Json(json!({
        "orders": dtos,
        "period": period,
        "total_orders": total_orders,
        "total_sales": Money::from_cents(total_sales_cents).as_currency_f64(),
    })))
}

/// `GET /orders/{order_id}` - order details with items. Creator or admin
/// only; others are redirected back to the history page.
pub async fn detail(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Path(order_id): Path<String>,
) -> Result<Response, ApiError> {
    let order = state
        .db
        .orders()
        .get_by_id(&order_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order", &order_id))?;

    if !claims.is_admin() && order.created_by != claims.sub {
        return Ok(Redirect::to("/orders").into_response());
    }

    let items = state.db.orders().items_by_order(&order_id).await?;
    let item_dtos: Vec<OrderItemDto> = items.iter().map(OrderItemDto::from).collect();

    Ok(Json(json!({
        "order": OrderDto::from(&order),
        "items": item_dtos,
    }))
    .into_response())
}

/// `POST /orders/{order_id}/delete` - admin-only; removing an order
/// cascades to its items and leaves products untouched.
pub async fn delete(
    State(state): State<AppState>,
    AdminUser(_claims): AdminUser,
    Path(order_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.db.orders().delete(&order_id).await?;
    Ok(Json(json!({ "success": true })))
}

// =============================================================================
// Helpers
// =============================================================================

fn period_start(period: &str) -> Option<DateTime<Utc>> {
    let now = Utc::now();
    match period {
        "today" => Some(now.date_naive().and_time(NaiveTime::MIN).and_utc()),
        "week" => Some(now - Duration::days(7)),
        "month" => Some(now - Duration::days(30)),
        _ => None,
    }
}

/// Resolves shop branding from settings, with hardcoded fallbacks.
async fn shop_info(state: &AppState) -> Result<ShopInfo, ApiError> {
    let settings = state.db.settings();
    let fallback = ShopInfo::default();

    Ok(ShopInfo {
        name: settings.get_or("shop_name", &fallback.name).await?,
        address: settings.get_or("shop_address", "").await?,
        phone: settings.get_or("shop_phone", "").await?,
        footer: settings.get_or("invoice_footer", &fallback.footer).await?,
    })
}
