//! CRUD surface over the router: catalog, carts, orders, payments.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use kdm_market_server::kv::{KvStore, MemoryKv};
use kdm_market_server::mailer::{spawn_dispatcher, MailError, Mailer};
use kdm_market_server::routes;
use kdm_market_server::state::AppState;
use migration::{Migrator, MigratorTrait};
use sea_orm::Database;
use serde_json::{json, Value};
use tower::ServiceExt;

struct Discard;

#[async_trait::async_trait]
impl Mailer for Discard {
    async fn send_code(&self, _: &str, _: &str) -> Result<(), MailError> {
        Ok(())
    }
}

struct TestApp {
    router: Router,
    kv: Arc<MemoryKv>,
}

async fn test_app() -> TestApp {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();

    let kv = Arc::new(MemoryKv::new());
    let sender = spawn_dispatcher(Arc::new(Discard));
    let state = AppState::from_parts(db, kv.clone() as Arc<dyn KvStore>, sender, b"secret".as_slice());

    TestApp {
        router: routes::router(state),
        kv,
    }
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(resp: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(router: &Router, req: Request<Body>) -> Response<Body> {
    router.clone().oneshot(req).await.unwrap()
}

/// Seed one category, one brand, one product. Returns (category, brand,
/// product) ids.
async fn seed_catalog(router: &Router) -> (i64, i64, i64) {
    let resp = send(
        router,
        json_request("POST", "/api/categories", json!({"name": "Объективы"})),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let category = body_json(resp).await["id"].as_i64().unwrap();

    let resp = send(
        router,
        json_request("POST", "/api/brands", json!({"name": "Canon"})),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let brand = body_json(resp).await["id"].as_i64().unwrap();

    let resp = send(
        router,
        json_request(
            "POST",
            "/api/products",
            json!({
                "name": "Широкоугольный объектив",
                "quantity": 3,
                "price": 1000.0,
                "discount": 25.0,
                "is_on_sale": true,
                "category_id": category,
                "brand_id": brand,
            }),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let product = body_json(resp).await["id"].as_i64().unwrap();

    (category, brand, product)
}

/// Create a user through the login flow; the crate has no direct user
/// create endpoint.
async fn seed_user(app: &TestApp, email: &str) -> i64 {
    let resp = send(
        &app.router,
        json_request("POST", "/api/auth/request-code", json!({"email": email})),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let code = app
        .kv
        .get(&format!("verification_code:{email}"))
        .await
        .unwrap()
        .unwrap();
    let resp = send(
        &app.router,
        json_request(
            "POST",
            "/api/auth/verify-code",
            json!({"email": email, "code": code}),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = send(&app.router, get("/api/users")).await;
    let users = body_json(resp).await;
    users
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["email"] == email)
        .unwrap()["id"]
        .as_i64()
        .unwrap()
}

#[tokio::test]
async fn category_slug_is_derived_from_the_name() {
    let app = test_app().await;

    let resp = send(
        &app.router,
        json_request("POST", "/api/categories", json!({"name": "Wide Lenses"})),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["slug"], "wide-lenses");

    let resp = send(&app.router, get("/api/categories")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn product_representation_carries_final_price() {
    let app = test_app().await;
    let (_, _, product) = seed_catalog(&app.router).await;

    let resp = send(&app.router, get(&format!("/api/products/{product}"))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["price"], 1000.0);
    assert_eq!(body["final_price"], 750.0);
}

#[tokio::test]
async fn product_filters_narrow_the_listing() {
    let app = test_app().await;
    let (category, brand, _) = seed_catalog(&app.router).await;

    send(
        &app.router,
        json_request(
            "POST",
            "/api/products",
            json!({
                "name": "Штатив",
                "quantity": 10,
                "price": 100.0,
                "category_id": category,
                "brand_id": brand,
            }),
        ),
    )
    .await;

    let resp = send(&app.router, get("/api/products?is_on_sale=true")).await;
    let on_sale = body_json(resp).await;
    assert_eq!(on_sale.as_array().unwrap().len(), 1);

    let resp = send(&app.router, get("/api/products?min_price=500")).await;
    let expensive = body_json(resp).await;
    assert_eq!(expensive.as_array().unwrap().len(), 1);
    assert_eq!(expensive[0]["name"], "Широкоугольный объектив");
}

#[tokio::test]
async fn out_of_range_discount_is_rejected() {
    let app = test_app().await;
    let (category, brand, product) = seed_catalog(&app.router).await;

    let resp = send(
        &app.router,
        json_request(
            "POST",
            "/api/products",
            json!({
                "name": "X",
                "quantity": 1,
                "price": 10.0,
                "discount": 120.0,
                "category_id": category,
                "brand_id": brand,
            }),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = send(
        &app.router,
        json_request(
            "PATCH",
            &format!("/api/products/{product}"),
            json!({"discount": -1.0}),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn patching_a_product_updates_the_row() {
    let app = test_app().await;
    let (_, _, product) = seed_catalog(&app.router).await;

    let resp = send(
        &app.router,
        json_request(
            "PATCH",
            &format!("/api/products/{product}"),
            json!({"quantity": 7, "description": "обновлено"}),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["quantity"], 7);
    assert_eq!(body["description"], "обновлено");
}

#[tokio::test]
async fn missing_records_are_404() {
    let app = test_app().await;

    for uri in [
        "/api/products/999",
        "/api/categories/999",
        "/api/brands/999",
        "/api/orders/999",
        "/api/payments/999",
    ] {
        let resp = send(&app.router, get(uri)).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
    }

    let resp = send(
        &app.router,
        Request::builder()
            .method("DELETE")
            .uri("/api/products/999")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cart_lines_require_existing_user_and_product() {
    let app = test_app().await;
    let (_, _, product) = seed_catalog(&app.router).await;
    let user = seed_user(&app, "cart@b.com").await;

    let resp = send(
        &app.router,
        json_request(
            "POST",
            "/api/carts",
            json!({"user_id": user, "product_id": product, "quantity": 2}),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = send(
        &app.router,
        json_request(
            "POST",
            "/api/carts",
            json!({"user_id": 999, "product_id": product, "quantity": 2}),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = send(&app.router, get(&format!("/api/carts?user={user}"))).await;
    assert_eq!(body_json(resp).await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn order_flow_with_items_and_status_filter() {
    let app = test_app().await;
    let (_, _, product) = seed_catalog(&app.router).await;
    let user = seed_user(&app, "order@b.com").await;

    let resp = send(
        &app.router,
        json_request(
            "POST",
            "/api/orders",
            json!({
                "user_id": user,
                "requires_delivery": true,
                "delivery_address": "Москва, Тверская 1",
                "payment_method": "online_payment",
                "total_price": 750.0,
            }),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let order = body_json(resp).await;
    assert_eq!(order["status"], "pending");
    let order_id = order["id"].as_i64().unwrap();

    let resp = send(
        &app.router,
        json_request(
            "POST",
            "/api/order-items",
            json!({"order_id": order_id, "product_id": product, "quantity": 1, "price": 750.0}),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = send(
        &app.router,
        json_request(
            "PATCH",
            &format!("/api/orders/{order_id}"),
            json!({"status": "shipped"}),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = send(&app.router, get("/api/orders?status=shipped")).await;
    assert_eq!(body_json(resp).await.as_array().unwrap().len(), 1);
    let resp = send(&app.router, get("/api/orders?status=pending")).await;
    assert_eq!(body_json(resp).await.as_array().unwrap().len(), 0);

    let resp = send(&app.router, get(&format!("/api/order-items?order={order_id}"))).await;
    assert_eq!(body_json(resp).await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn invalid_payment_method_and_currency_are_rejected() {
    let app = test_app().await;
    let user = seed_user(&app, "pay@b.com").await;

    let resp = send(
        &app.router,
        json_request(
            "POST",
            "/api/orders",
            json!({"user_id": user, "payment_method": "barter", "total_price": 1.0}),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = send(
        &app.router,
        json_request(
            "POST",
            "/api/orders",
            json!({"user_id": user, "payment_method": "cash_on_delivery", "total_price": 1.0}),
        ),
    )
    .await;
    let order_id = body_json(resp).await["id"].as_i64().unwrap();

    let resp = send(
        &app.router,
        json_request(
            "POST",
            "/api/payments",
            json!({
                "transaction_id": "tx-1",
                "user_id": user,
                "order_id": order_id,
                "amount": 1.0,
                "payment_method": "online_payment",
                "currency": "GBP",
            }),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = send(
        &app.router,
        json_request(
            "POST",
            "/api/payments",
            json!({
                "transaction_id": "tx-1",
                "user_id": user,
                "order_id": order_id,
                "amount": 1.0,
                "payment_method": "online_payment",
                "currency": "RUB",
            }),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = send(&app.router, get(&format!("/api/payments?user={user}"))).await;
    assert_eq!(body_json(resp).await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn health_endpoint_answers() {
    let app = test_app().await;

    let resp = send(&app.router, get("/health")).await;
    assert_eq!(resp.status(), StatusCode::OK);
}
