//! Admin back office: dashboard, product CRUD (with image uploads), offer
//! CRUD and shop settings.

use axum::extract::{Multipart, Path, State};
use axum::{Form, Json};
use chrono::{NaiveTime, Utc};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::info;

use crate::auth::AdminUser;
use crate::error::ApiError;
use crate::handlers::catalog::ProductDto;
use crate::handlers::orders::OrderDto;
use crate::state::AppState;
use crate::uploads::{delete_upload, save_upload};
use till_core::validation::{
    validate_category, validate_price_cents, validate_product_name,
};
use till_core::{CoreError, Money, Offer, Product, ValidationError, DEFAULT_STOCK_QUANTITY};
use till_db::repository::offer::generate_offer_id;
use till_db::repository::product::generate_product_id;

/// Settings keys editable through the settings form.
const EDITABLE_SETTINGS: &[&str] = &[
    "shop_name",
    "shop_address",
    "shop_phone",
    "tax_rate",
    "gst_rate",
    "stock_alert_threshold",
    "invoice_footer",
];

// =============================================================================
// Dashboard
// =============================================================================

/// `GET /admin/dashboard` - today's sales summary.
pub async fn dashboard(
    State(state): State<AppState>,
    AdminUser(_claims): AdminUser,
) -> Result<Json<Value>, ApiError> {
    let today = Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc();

    let total_products = state.db.products().count().await?;
    let today_orders = state.db.orders().list(None, Some(today)).await?;
    let today_sales_cents: i64 = today_orders.iter().map(|o| o.total_cents).sum();

    let top_items: Vec<Value> = state
        .db
        .orders()
        .top_sellers_since(today, 5)
        .await?
        .into_iter()
        .map(|(name, units)| json!({ "name": name, "units_sold": units }))
        .collect();

    let recent: Vec<OrderDto> = state
        .db
        .orders()
        .recent(10)
        .await?
        .iter()
        .map(OrderDto::from)
        .collect();

    Ok(Json(json!({
        "total_products": total_products,
        "today_sales": Money::from_cents(today_sales_cents).as_currency_f64(),
        "today_orders_count": today_orders.len(),
        "top_items": top_items,
        "recent_orders": recent,
    })))
}

// =============================================================================
// Products
// =============================================================================

/// `GET /admin/products` - full catalog, including unavailable products.
pub async fn products(
    State(state): State<AppState>,
    AdminUser(_claims): AdminUser,
) -> Result<Json<Value>, ApiError> {
    let products: Vec<ProductDto> = state
        .db
        .products()
        .list(None, None, false)
        .await?
        .into_iter()
        .map(ProductDto::from)
        .collect();

    let categories = state.db.products().categories().await?;

    Ok(Json(json!({
        "products": products,
        "categories": categories,
    })))
}

#[derive(Debug, Default)]
struct ProductFields {
    name: String,
    category: String,
    price: String,
    description: String,
    image: Option<(String, Vec<u8>)>,
}

async fn read_product_fields(mut multipart: Multipart) -> Result<ProductFields, ApiError> {
    let mut fields = ProductFields::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "name" => fields.name = field.text().await?,
            "category" => fields.category = field.text().await?,
            "price" => fields.price = field.text().await?,
            "description" => fields.description = field.text().await?,
            "image" => {
                let file_name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await?;
                if let Some(file_name) = file_name {
                    if !file_name.is_empty() && !bytes.is_empty() {
                        fields.image = Some((file_name, bytes.to_vec()));
                    }
                }
            }
            _ => {}
        }
    }

    Ok(fields)
}

fn parse_price_cents(text: &str) -> Result<i64, ApiError> {
    let value: f64 = text.trim().parse().map_err(|_| {
        ApiError::from(CoreError::from(ValidationError::InvalidFormat {
            field: "price".to_string(),
            reason: "must be a number".to_string(),
        }))
    })?;

    let cents = Money::from_currency_f64(value).cents();
    validate_price_cents(cents).map_err(CoreError::from)?;
    Ok(cents)
}

fn optional_text(text: String) -> Option<String> {
    let trimmed = text.trim().to_string();
    Some(trimmed).filter(|s| !s.is_empty())
}

/// `POST /admin/products/add` - multipart form with an optional image.
pub async fn products_add(
    State(state): State<AppState>,
    AdminUser(_claims): AdminUser,
    multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let fields = read_product_fields(multipart).await?;

    validate_product_name(&fields.name).map_err(CoreError::from)?;
    validate_category(&fields.category).map_err(CoreError::from)?;
    let price_cents = parse_price_cents(&fields.price)?;

    let image_url = match &fields.image {
        Some((file_name, bytes)) => {
            Some(save_upload(&state.config.upload_dir, file_name, bytes).await?)
        }
        None => None,
    };

    let now = Utc::now();
    let product = Product {
        id: generate_product_id(),
        name: fields.name.trim().to_string(),
        category: fields.category.trim().to_string(),
        price_cents,
        stock_quantity: DEFAULT_STOCK_QUANTITY,
        description: optional_text(fields.description),
        image_url,
        is_available: true,
        created_at: now,
        updated_at: now,
    };

    state.db.products().insert(&product).await?;
    info!(id = %product.id, name = %product.name, "Product created");

    Ok(Json(json!({ "success": true, "id": product.id })))
}

/// `POST /admin/products/{product_id}/edit` - multipart form; a new image
/// replaces (and deletes) the old file.
pub async fn products_edit(
    State(state): State<AppState>,
    AdminUser(_claims): AdminUser,
    Path(product_id): Path<String>,
    multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let mut product = state
        .db
        .products()
        .get_by_id(&product_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", &product_id))?;

    let fields = read_product_fields(multipart).await?;

    validate_product_name(&fields.name).map_err(CoreError::from)?;
    validate_category(&fields.category).map_err(CoreError::from)?;

    product.name = fields.name.trim().to_string();
    product.category = fields.category.trim().to_string();
    product.price_cents = parse_price_cents(&fields.price)?;
    product.description = optional_text(fields.description);
    // Stock tracking is disabled: edits reset the legacy counter high and
    // keep the product sellable.
    product.stock_quantity = DEFAULT_STOCK_QUANTITY;
    product.is_available = true;

    if let Some((file_name, bytes)) = &fields.image {
        if let Some(old) = &product.image_url {
            delete_upload(&state.config.upload_dir, old).await;
        }
        product.image_url =
            Some(save_upload(&state.config.upload_dir, file_name, bytes).await?);
    }

    state.db.products().update(&product).await?;
    info!(id = %product.id, "Product updated");

    Ok(Json(json!({ "success": true })))
}

/// `POST /admin/products/{product_id}/delete`
pub async fn products_delete(
    State(state): State<AppState>,
    AdminUser(_claims): AdminUser,
    Path(product_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if let Some(product) = state.db.products().get_by_id(&product_id).await? {
        if let Some(image) = &product.image_url {
            delete_upload(&state.config.upload_dir, image).await;
        }
    }

    state.db.products().delete(&product_id).await?;
    info!(id = %product_id, "Product deleted");

    Ok(Json(json!({ "success": true })))
}

// =============================================================================
// Offers
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct OfferForm {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub display_order: Option<i64>,
    /// Checkbox semantics: present ("on") means active.
    #[serde(default)]
    pub is_active: Option<String>,
}

impl OfferForm {
    fn validate(&self) -> Result<(), ApiError> {
        if self.title.trim().is_empty() {
            return Err(ApiError::from(CoreError::from(ValidationError::Required {
                field: "title".to_string(),
            })));
        }
        if self.description.trim().is_empty() {
            return Err(ApiError::from(CoreError::from(ValidationError::Required {
                field: "description".to_string(),
            })));
        }
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.is_active.as_deref() == Some("on")
    }
}

/// `GET /admin/offers`
pub async fn offers(
    State(state): State<AppState>,
    AdminUser(_claims): AdminUser,
) -> Result<Json<Value>, ApiError> {
    let offers = state.db.offers().list_all().await?;
    Ok(Json(json!({ "offers": offers })))
}

/// `POST /admin/offers/add`
pub async fn offers_add(
    State(state): State<AppState>,
    AdminUser(_claims): AdminUser,
    Form(form): Form<OfferForm>,
) -> Result<Json<Value>, ApiError> {
    form.validate()?;

    let now = Utc::now();
    let offer = Offer {
        id: generate_offer_id(),
        title: form.title.trim().to_string(),
        description: form.description.trim().to_string(),
        display_order: form.display_order.unwrap_or(0),
        is_active: form.is_active(),
        created_at: now,
        updated_at: now,
    };

    state.db.offers().insert(&offer).await?;

    Ok(Json(json!({ "success": true, "id": offer.id })))
}

/// `POST /admin/offers/{offer_id}/edit`
pub async fn offers_edit(
    State(state): State<AppState>,
    AdminUser(_claims): AdminUser,
    Path(offer_id): Path<String>,
    Form(form): Form<OfferForm>,
) -> Result<Json<Value>, ApiError> {
    form.validate()?;

    let mut offer = state
        .db
        .offers()
        .get_by_id(&offer_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Offer", &offer_id))?;

    offer.title = form.title.trim().to_string();
    offer.description = form.description.trim().to_string();
    offer.display_order = form.display_order.unwrap_or(0);
    offer.is_active = form.is_active();

    state.db.offers().update(&offer).await?;

    Ok(Json(json!({ "success": true })))
}

/// `POST /admin/offers/{offer_id}/delete`
pub async fn offers_delete(
    State(state): State<AppState>,
    AdminUser(_claims): AdminUser,
    Path(offer_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.db.offers().delete(&offer_id).await?;
    Ok(Json(json!({ "success": true })))
}

// =============================================================================
// Settings
// =============================================================================

/// `GET /admin/settings` - every setting as a key/value map.
pub async fn settings(
    State(state): State<AppState>,
    AdminUser(_claims): AdminUser,
) -> Result<Json<Value>, ApiError> {
    let mut map = Map::new();
    for setting in state.db.settings().all().await? {
        map.insert(setting.key, Value::String(setting.value));
    }

    Ok(Json(json!({ "settings": map })))
}

/// `POST /admin/settings/update` - multipart form carrying the scalar
/// settings plus an optional logo upload (the old logo file is deleted).
pub async fn settings_update(
    State(state): State<AppState>,
    AdminUser(_claims): AdminUser,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let repo = state.db.settings();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        if name == "logo" {
            let file_name = field.file_name().map(str::to_string);
            let bytes = field.bytes().await?;

            if let Some(file_name) = file_name {
                if !file_name.is_empty() && !bytes.is_empty() {
                    if let Some(old) = repo.get("shop_logo").await? {
                        delete_upload(&state.config.upload_dir, &old).await;
                    }
                    let stored =
                        save_upload(&state.config.upload_dir, &file_name, &bytes).await?;
                    repo.set("shop_logo", &stored).await?;
                }
            }
        } else if EDITABLE_SETTINGS.contains(&name.as_str()) {
            let value = field.text().await?;
            repo.set(&name, value.trim()).await?;
        }
    }

    info!("Settings updated");
    Ok(Json(json!({ "success": true })))
}
