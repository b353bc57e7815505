//! # Router
//!
//! Every route of the application in one place. Authorization is carried
//! by the handler signatures (`CurrentUser` / `AdminUser` extractors), not
//! by per-route middleware, so the table below is the complete surface.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers::{admin, auth, cart, catalog, orders};
use crate::state::AppState;

/// Maximum request body size; bounds image/logo uploads.
const MAX_UPLOAD_SIZE: usize = 5 * 1024 * 1024;

/// Builds the application router.
pub fn build_router(state: AppState) -> Router {
    let upload_dir = state.config.upload_dir.clone();

    Router::new()
        // Public
        .route("/", get(catalog::home))
        .route("/menu", get(catalog::menu))
        .route("/login", post(auth::login))
        .route("/logout", get(auth::logout))
        // Billing / POS
        .route("/billing", get(catalog::billing))
        .route("/api/products", get(catalog::api_products))
        .route("/api/cart", get(cart::get_cart))
        .route("/api/cart/add", post(cart::add))
        .route("/api/cart/update", post(cart::update))
        .route("/api/cart/remove", post(cart::remove))
        .route("/api/cart/clear", post(cart::clear))
        .route("/api/order/process", post(orders::process))
        .route("/invoice/{order_id}/pdf", get(orders::invoice_pdf))
        // Order history
        .route("/orders", get(orders::list))
        .route("/orders/{order_id}", get(orders::detail))
        .route("/orders/{order_id}/delete", post(orders::delete))
        // Admin back office
        .route("/admin/dashboard", get(admin::dashboard))
        .route("/admin/products", get(admin::products))
        .route("/admin/products/add", post(admin::products_add))
        .route("/admin/products/{product_id}/edit", post(admin::products_edit))
        .route(
            "/admin/products/{product_id}/delete",
            post(admin::products_delete),
        )
        .route("/admin/offers", get(admin::offers))
        .route("/admin/offers/add", post(admin::offers_add))
        .route("/admin/offers/{offer_id}/edit", post(admin::offers_edit))
        .route("/admin/offers/{offer_id}/delete", post(admin::offers_delete))
        .route("/admin/settings", get(admin::settings))
        .route("/admin/settings/update", post(admin::settings_update))
        // Uploaded images
        .nest_service("/static/images", ServeDir::new(upload_dir))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
