//! End-to-end API tests: login -> cart -> checkout -> invoice against an
//! in-memory database, driving the real router with `tower::oneshot`.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::util::ServiceExt;

use till_core::{Product, DEFAULT_STOCK_QUANTITY};
use till_db::repository::product::generate_product_id;
use till_db::{Database, DbConfig};
use till_server::{bootstrap, build_router, AppState, ServerConfig};

async fn test_app() -> (Router, Database) {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    bootstrap::run(&db).await.unwrap();

    let config = ServerConfig {
        bind_addr: "127.0.0.1:0".to_string(),
        database_path: ":memory:".into(),
        secret_key: "test-secret".to_string(),
        upload_dir: std::env::temp_dir().join("till-api-test-uploads"),
        session_lifetime_hours: 8,
        enforce_stock_guard: true,
    };

    let state = AppState::new(db.clone(), config);
    (build_router(state), db)
}

async fn insert_product(db: &Database, name: &str, price_cents: i64) -> Product {
    let now = Utc::now();
    let product = Product {
        id: generate_product_id(),
        name: name.to_string(),
        category: "snacks".to_string(),
        price_cents,
        stock_quantity: DEFAULT_STOCK_QUANTITY,
        description: None,
        image_url: None,
        is_available: true,
        created_at: now,
        updated_at: now,
    };
    db.products().insert(&product).await.unwrap();
    product
}

/// Logs in as the bootstrapped admin and returns the session cookie value.
async fn login(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/login")
                .header(
                    header::CONTENT_TYPE,
                    "application/x-www-form-urlencoded",
                )
                .body(Body::from("username=admin&password=admin123"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();

    // "till_session=<token>; Path=/; HttpOnly" -> "till_session=<token>"
    set_cookie
        .split(';')
        .next()
        .unwrap()
        .trim()
        .to_string()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, cookie: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, cookie)
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_protected_route_redirects_to_login() {
    let (app, _db) = test_app().await;

    let response = app
        .oneshot(Request::builder().uri("/billing").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert!(response.status().is_redirection());
    let location = response.headers().get(header::LOCATION).unwrap();
    assert_eq!(location, "/login?next=/billing");
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let (app, _db) = test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/login")
                .header(
                    header::CONTENT_TYPE,
                    "application/x-www-form-urlencoded",
                )
                .body(Body::from("username=admin&password=nope"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_menu_is_public_and_filters() {
    let (app, db) = test_app().await;
    insert_product(&db, "Potato Chips", 1500).await;
    insert_product(&db, "Chocolate Cake", 4500).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/menu?search=potato")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let products = body["products"].as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["name"], "Potato Chips");
    assert_eq!(products[0]["price"], 15.0);
}

#[tokio::test]
async fn test_cart_checkout_invoice_flow() {
    let (app, db) = test_app().await;
    let chips = insert_product(&db, "Potato Chips", 1000).await;
    let soda = insert_product(&db, "Lemon Soda", 500).await;
    let cookie = login(&app).await;

    // Add 2x chips and 1x soda.
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/cart/add",
            &cookie,
            json!({ "product_id": &chips.id, "quantity": 2 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/cart/add",
            &cookie,
            json!({ "product_id": &soda.id }),
        ))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["cart"][&chips.id]["quantity"], 2);
    assert_eq!(body["cart"][&soda.id]["price"], 5.0);

    // Checkout at the bootstrapped 5% tax rate.
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/order/process",
            &cookie,
            json!({ "customer_name": "Asha", "discount": 0 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    let order_id = body["order_id"].as_str().unwrap().to_string();
    let invoice_number = body["invoice_number"].as_str().unwrap();
    assert!(invoice_number.starts_with("INV-"));

    // Stored amounts: subtotal 25.00, tax 1.25, total 26.25.
    let order = db.orders().get_by_id(&order_id).await.unwrap().unwrap();
    assert_eq!(order.subtotal_cents, 2500);
    assert_eq!(order.tax_cents, 125);
    assert_eq!(order.total_cents, 2625);
    assert_eq!(db.orders().count_items(&order_id).await.unwrap(), 2);

    // Checkout cleared the cart.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/cart")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["cart"], json!({}));

    // Invoice PDF download.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/invoice/{}/pdf", order_id))
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/pdf"
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_checkout_with_empty_cart_is_rejected() {
    let (app, db) = test_app().await;
    let cookie = login(&app).await;

    let response = app
        .clone()
        .oneshot(post_json("/api/order/process", &cookie, json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Cart is empty");
    assert_eq!(db.orders().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_cart_update_on_missing_line_is_rejected() {
    let (app, db) = test_app().await;
    let chips = insert_product(&db, "Potato Chips", 1000).await;
    let cookie = login(&app).await;

    // Empty cart -> 400.
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/cart/update",
            &cookie,
            json!({ "product_id": &chips.id, "quantity": 3 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Quantity 0 removes the line.
    app.clone()
        .oneshot(post_json(
            "/api/cart/add",
            &cookie,
            json!({ "product_id": &chips.id }),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/cart/update",
            &cookie,
            json!({ "product_id": &chips.id, "quantity": 0 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["cart"], json!({}));
}

#[tokio::test]
async fn test_unknown_product_add_is_404() {
    let (app, _db) = test_app().await;
    let cookie = login(&app).await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/cart/add",
            &cookie,
            json!({ "product_id": "no-such-product" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_dashboard_requires_admin() {
    let (app, _db) = test_app().await;
    let cookie = login(&app).await;

    // The bootstrapped admin can see the dashboard.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/admin/dashboard")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Anonymous requests are bounced to login.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/admin/dashboard")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(response.status().is_redirection());
}
