//! End-to-end login flow over the router: request a code, redeem it,
//! use the minted token.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use entity::verification_code;
use kdm_market_server::kv::{KvStore, MemoryKv};
use kdm_market_server::mailer::{spawn_dispatcher, MailError, Mailer};
use kdm_market_server::routes;
use kdm_market_server::state::AppState;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ColumnTrait, Database, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::{json, Value};
use tower::ServiceExt;

const SECRET: &[u8] = b"integration-secret";

struct Recording(parking_lot::Mutex<Vec<(String, String)>>);

#[async_trait::async_trait]
impl Mailer for Recording {
    async fn send_code(&self, to: &str, code: &str) -> Result<(), MailError> {
        self.0.lock().push((to.to_string(), code.to_string()));
        Ok(())
    }
}

struct TestApp {
    router: Router,
    db: DatabaseConnection,
    kv: Arc<MemoryKv>,
}

async fn test_app() -> TestApp {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();

    let kv = Arc::new(MemoryKv::new());
    let sender = spawn_dispatcher(Arc::new(Recording(parking_lot::Mutex::new(Vec::new()))));

    let state = AppState::from_parts(db.clone(), kv.clone() as Arc<dyn KvStore>, sender, SECRET);
    TestApp {
        router: routes::router(state),
        db,
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

async fn body_json(resp: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn issued_code(kv: &MemoryKv, email: &str) -> String {
    kv.get(&format!("verification_code:{email}"))
        .await
        .unwrap()
        .expect("code key must be set after request-code")
}

#[tokio::test]
async fn request_then_verify_creates_the_account() {
    let app = test_app().await;

    let resp = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/request-code",
            json!({"email": "a@b.com"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let code = issued_code(&app.kv, "a@b.com").await;

    let resp = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/verify-code",
            json!({"email": "a@b.com", "code": code}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body = body_json(resp).await;
    let access = body["access"].as_str().unwrap().to_string();
    assert!(body["refresh"].as_str().is_some());

    // The access token works against the profile endpoint.
    let resp = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/auth/profile")
                .header("authorization", format!("Bearer {access}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let profile = body_json(resp).await;
    assert_eq!(profile["email"], "a@b.com");

    // The row is consumed and the ephemeral key is gone.
    let unused = entity::VerificationCode::find()
        .filter(verification_code::Column::IsUsed.eq(false))
        .count(&app.db)
        .await
        .unwrap();
    assert_eq!(unused, 0);
    assert!(app
        .kv
        .get("verification_code:a@b.com")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn immediate_second_request_is_throttled() {
    let app = test_app().await;

    let resp = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/request-code",
            json!({"email": "a@b.com"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/request-code",
            json!({"email": "a@b.com"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "Слишком много запросов. Попробуйте позже.");
}

#[tokio::test]
async fn used_code_cannot_log_in_again() {
    let app = test_app().await;

    app.router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/request-code",
            json!({"email": "a@b.com"}),
        ))
        .await
        .unwrap();
    let code = issued_code(&app.kv, "a@b.com").await;

    let resp = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/verify-code",
            json!({"email": "a@b.com", "code": code}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    // Even with the ephemeral key restored, the consumed row blocks a
    // second redemption.
    app.kv
        .set(
            "verification_code:a@b.com",
            &code,
            std::time::Duration::from_secs(180),
        )
        .await
        .unwrap();
    let resp = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/verify-code",
            json!({"email": "a@b.com", "code": code}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "Код не валиден или истек.");
}

#[tokio::test]
async fn returning_user_gets_200_not_201() {
    let app = test_app().await;

    for expected in [StatusCode::CREATED, StatusCode::OK] {
        app.router
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/auth/request-code",
                json!({"email": "a@b.com"}),
            ))
            .await
            .unwrap();
        let code = issued_code(&app.kv, "a@b.com").await;

        let resp = app
            .router
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/auth/verify-code",
                json!({"email": "a@b.com", "code": code}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), expected);

        // End the throttle window before the next round.
        app.kv.del("sms_rate_limit:a@b.com").await.unwrap();
    }

    let users = entity::User::find().count(&app.db).await.unwrap();
    assert_eq!(users, 1);
}

#[tokio::test]
async fn wrong_code_is_rejected_opaquely() {
    let app = test_app().await;

    app.router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/request-code",
            json!({"email": "a@b.com"}),
        ))
        .await
        .unwrap();
    let code = issued_code(&app.kv, "a@b.com").await;
    let wrong = if code == "0000" { "0001" } else { "0000" };

    let resp = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/verify-code",
            json!({"email": "a@b.com", "code": wrong}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "Код не валиден или истек.");

    assert_eq!(entity::User::find().count(&app.db).await.unwrap(), 0);
}

#[tokio::test]
async fn profile_requires_a_bearer_token() {
    let app = test_app().await;

    let resp = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/auth/profile")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
