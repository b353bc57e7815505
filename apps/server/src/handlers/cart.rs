//! Cart API: add, update, remove, clear, get. All state lives in the
//! session's cart inside [`crate::carts::CartStore`]; the catalog is only
//! consulted on `add` to take the name/price snapshot.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::state::AppState;
use till_core::validation::validate_quantity;
use till_core::{Cart, CoreError, Money};

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct AddRequest {
    pub product_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    pub product_id: String,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct RemoveRequest {
    pub product_id: String,
}

/// One cart line on the wire.
#[derive(Debug, Clone, Serialize)]
pub struct CartLineDto {
    pub name: String,
    pub price: f64,
    pub quantity: i64,
}

/// The cart on the wire: product id -> line snapshot.
pub type CartDto = BTreeMap<String, CartLineDto>;

#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub success: bool,
    pub cart: CartDto,
}

fn cart_dto(cart: &Cart) -> CartDto {
    cart.lines()
        .iter()
        .map(|line| {
            (
                line.product_id.clone(),
                CartLineDto {
                    name: line.name.clone(),
                    price: Money::from_cents(line.unit_price_cents).as_currency_f64(),
                    quantity: line.quantity,
                },
            )
        })
        .collect()
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /api/cart` - current cart contents.
pub async fn get_cart(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
) -> Json<Value> {
    let cart = state.carts.with_cart(&claims.sid, cart_dto);
    Json(json!({ "cart": cart }))
}

/// `POST /api/cart/add` - adds a product, snapshotting name and price.
/// 404 when the product is unknown. No stock check here; stock tracking
/// is disabled.
pub async fn add(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Json(req): Json<AddRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    debug!(product_id = %req.product_id, quantity = req.quantity, "cart add");

    validate_quantity(req.quantity).map_err(CoreError::from)?;

    let product = state
        .db
        .products()
        .get_by_id(&req.product_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", &req.product_id))?;

    if !product.is_available {
        return Err(ApiError::validation("Product is not available for sale"));
    }

    let cart = state.carts.with_cart_mut(&claims.sid, |cart| {
        cart.add_line(&product, req.quantity)?;
        Ok::<CartDto, CoreError>(cart_dto(cart))
    })?;

    Ok(Json(CartResponse {
        success: true,
        cart,
    }))
}

/// `POST /api/cart/update` - overwrites a line's quantity. Quantity <= 0
/// deletes the line; an empty cart or absent line is a 400.
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Json(req): Json<UpdateRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    debug!(product_id = %req.product_id, quantity = req.quantity, "cart update");

    let cart = state.carts.with_cart_mut(&claims.sid, |cart| {
        cart.set_quantity(&req.product_id, req.quantity)?;
        Ok::<CartDto, CoreError>(cart_dto(cart))
    })?;

    Ok(Json(CartResponse {
        success: true,
        cart,
    }))
}

/// `POST /api/cart/remove` - removes a line; a no-op when absent.
pub async fn remove(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Json(req): Json<RemoveRequest>,
) -> Json<CartResponse> {
    debug!(product_id = %req.product_id, "cart remove");

    let cart = state.carts.with_cart_mut(&claims.sid, |cart| {
        cart.remove_line(&req.product_id);
        cart_dto(cart)
    });

    Json(CartResponse {
        success: true,
        cart,
    })
}

/// `POST /api/cart/clear` - empties the cart.
pub async fn clear(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
) -> Json<Value> {
    state.carts.with_cart_mut(&claims.sid, |cart| cart.clear());
    Json(json!({ "success": true }))
}
