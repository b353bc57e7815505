//! Public catalog pages and the authenticated product API.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::state::AppState;
use till_core::validation::validate_search_query;
use till_core::{CoreError, Product};

/// Category / search filters shared by the menu and product API.
#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    pub category: Option<String>,
    pub search: Option<String>,
}

impl CatalogQuery {
    /// `"all"` and empty are "no category filter".
    fn category_filter(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty() && *c != "all")
    }

    fn search_filter(&self) -> Result<Option<String>, ApiError> {
        let search = validate_search_query(self.search.as_deref().unwrap_or(""))
            .map_err(CoreError::from)?;
        Ok(Some(search).filter(|s| !s.is_empty()))
    }
}

/// Product representation on the wire; money as decimal currency.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDto {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub description: String,
    pub image_url: String,
}

impl From<Product> for ProductDto {
    fn from(product: Product) -> Self {
        let price = product.price().as_currency_f64();
        ProductDto {
            id: product.id,
            name: product.name,
            category: product.category,
            price,
            description: product.description.unwrap_or_default(),
            image_url: product.image_url.unwrap_or_default(),
        }
    }
}

/// `GET /` - shop front: branding, active offers, popular products.
pub async fn home(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let settings = state.db.settings();

    let shop_name = settings.get_or("shop_name", "Trio Snacks").await?;
    let shop_logo = settings.get("shop_logo").await?;
    let offers = state.db.offers().list_active().await?;
    let popular: Vec<ProductDto> = state
        .db
        .products()
        .popular(6)
        .await?
        .into_iter()
        .map(ProductDto::from)
        .collect();

    Ok(Json(json!({
        "shop_name": shop_name,
        "shop_logo": shop_logo,
        "offers": offers,
        "popular_products": popular,
    })))
}

/// `GET /menu?category=&search=` - public catalog listing.
pub async fn menu(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<Value>, ApiError> {
    let search = query.search_filter()?;

    let products: Vec<ProductDto> = state
        .db
        .products()
        .list(query.category_filter(), search.as_deref(), true)
        .await?
        .into_iter()
        .map(ProductDto::from)
        .collect();

    let categories = state.db.products().categories().await?;

    Ok(Json(json!({
        "products": products,
        "categories": categories,
        "current_category": query.category_filter().unwrap_or("all"),
        "search": search.unwrap_or_default(),
    })))
}

/// `GET /billing` - the POS view: every available product plus categories.
pub async fn billing(
    State(state): State<AppState>,
    CurrentUser(_claims): CurrentUser,
) -> Result<Json<Value>, ApiError> {
    let products: Vec<ProductDto> = state
        .db
        .products()
        .list(None, None, true)
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

/// `GET /api/products?category=&search=` - filtered product list for the
/// billing screen.
pub async fn api_products(
    State(state): State<AppState>,
    CurrentUser(_claims): CurrentUser,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<Vec<ProductDto>>, ApiError> {
    let search = query.search_filter()?;

    let products = state
        .db
        .products()
        .list(query.category_filter(), search.as_deref(), true)
        .await?
        .into_iter()
        .map(ProductDto::from)
        .collect();

    Ok(Json(products))
}
