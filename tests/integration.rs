//! Integration tests: health, register, login over the HTTP router.
//!
//! Run with `cargo test`. Most tests use the in-memory user store. The
//! Postgres round trip needs `TEST_DATABASE_URL` (skipped when unset).

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use authd::auth::SessionTokens;
use authd::config::{Config, DatabaseConfig};
use authd::db::{self, MemoryUserStore, PgUserStore, UserStore};
use authd::{create_app, AppState};
use chrono::Duration;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;

const SECRET: &str = "integration-test-secret";

fn test_config(legacy_error_status: bool) -> Config {
    Config {
        server_addr: "127.0.0.1:0".parse().unwrap(),
        database: DatabaseConfig {
            url: None,
            host: "localhost".into(),
            port: 5432,
            user: "authd".into(),
            password: "authd".into(),
            name: "authd".into(),
        },
        jwt_secret: SECRET.into(),
        jwt_expires_in: Duration::days(90),
        jwt_cookie_expires_days: 90,
        cookie_secure: false,
        legacy_error_status,
        log_level: "info".into(),
    }
}

fn memory_app(store: MemoryUserStore, legacy_error_status: bool) -> axum::Router {
    let state = AppState::new(&test_config(legacy_error_status), Arc::new(store)).unwrap();
    create_app(state)
}

async fn post(app: &axum::Router, uri: &str, body: Value) -> Response {
    post_raw(app, uri, "application/json", body.to_string()).await
}

async fn post_raw(app: &axum::Router, uri: &str, content_type: &str, body: String) -> Response {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", content_type)
        .body(Body::from(body))
        .unwrap();
    app.clone().oneshot(req).await.unwrap()
}

async fn body_bytes(res: Response) -> Vec<u8> {
    axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(res: Response) -> Value {
    serde_json::from_slice(&body_bytes(res).await).unwrap()
}

async fn register(app: &axum::Router, email: &str, password: &str, confirm: &str) -> Response {
    post(
        app,
        "/auth/register",
        json!({ "email": email, "password": password, "passwordConfirm": confirm }),
    )
    .await
}

#[tokio::test]
async fn health_returns_ok() {
    let app = memory_app(MemoryUserStore::new(), false);
    let req = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json.get("status").and_then(|v| v.as_str()), Some("ok"));
}

#[tokio::test]
async fn register_and_login() {
    let store = MemoryUserStore::new();
    let app = memory_app(store.clone(), false);

    let res = register(&app, "a@x.com", "p1", "p1").await;
    assert_eq!(res.status(), StatusCode::OK, "register should succeed");
    let json = body_json(res).await;
    assert_eq!(json, json!({ "status": 200, "message": "User registered" }));

    let row = store.find_by_email("a@x.com").await.unwrap().unwrap();
    assert_ne!(row.password, "p1", "password must be stored hashed");

    let res = post(
        &app,
        "/auth/login",
        json!({ "email": "a@x.com", "password": "p1" }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK, "login should succeed");

    let cookie = res
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .expect("login should set a cookie");
    assert!(cookie.starts_with("jwt="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Max-Age=7776000"));

    let json = body_json(res).await;
    assert_eq!(json["status"], 200);
    assert_eq!(json["message"], "User Login");
    assert_eq!(json["id"], row.id.to_string());
    let token = json["token"].as_str().expect("response should contain token");
    assert!(cookie.starts_with(&format!("jwt={token};")));

    let claims = SessionTokens::new(SECRET, Duration::days(90))
        .validate(token)
        .unwrap();
    assert_eq!(claims.id, row.id);

    let row = store.find_by_email("a@x.com").await.unwrap().unwrap();
    assert!(row.updated_at.is_some(), "login should record the login time");
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let app = memory_app(MemoryUserStore::new(), false);
    register(&app, "a@x.com", "p1", "p1").await;

    let wrong = post(
        &app,
        "/auth/login",
        json!({ "email": "a@x.com", "password": "wrong" }),
    )
    .await;
    let unknown = post(
        &app,
        "/auth/login",
        json!({ "email": "nobody@x.com", "password": "p1" }),
    )
    .await;

    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    assert!(wrong.headers().get(header::SET_COOKIE).is_none());

    let wrong = body_bytes(wrong).await;
    let unknown = body_bytes(unknown).await;
    assert_eq!(wrong, unknown);
    let json: Value = serde_json::from_slice(&wrong).unwrap();
    assert_eq!(json["error"]["message"], "Email or Password is incorrect");
}

#[tokio::test]
async fn login_requires_email_and_password() {
    let app = memory_app(MemoryUserStore::new(), false);
    for body in [
        json!({ "email": "a@x.com" }),
        json!({ "password": "p1" }),
        json!({ "email": "", "password": "p1" }),
        json!({}),
    ] {
        let res = post(&app, "/auth/login", body).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let json = body_json(res).await;
        assert_eq!(
            json["error"]["message"],
            "Please provide an email and password"
        );
    }
}

#[tokio::test]
async fn unreadable_bodies_use_the_error_envelope() {
    let store = MemoryUserStore::new();
    let app = memory_app(store.clone(), false);
    for uri in ["/auth/login", "/auth/register"] {
        for (content_type, body) in [
            ("application/json", "{not json".to_string()),
            ("application/json", json!({ "email": 5, "password": "p1" }).to_string()),
            ("text/plain", json!({ "email": "a@x.com", "password": "p1" }).to_string()),
        ] {
            let res = post_raw(&app, uri, content_type, body).await;
            assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{uri} {content_type}");
            let json = body_json(res).await;
            assert!(json["error"]["message"].as_str().is_some_and(|m| !m.is_empty()));
        }
    }
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let store = MemoryUserStore::new();
    let app = memory_app(store.clone(), false);

    assert_eq!(register(&app, "a@x.com", "p1", "p1").await.status(), StatusCode::OK);

    // conflict is reported even though the passwords also disagree
    for confirm in ["p1", "different"] {
        let res = register(&app, "a@x.com", "p1", confirm).await;
        assert_eq!(res.status(), StatusCode::CONFLICT);
        let json = body_json(res).await;
        assert_eq!(json["error"]["message"], "That email is already in use");
    }
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn password_mismatch_is_rejected() {
    let store = MemoryUserStore::new();
    let app = memory_app(store.clone(), false);

    let res = register(&app, "a@x.com", "p1", "p2").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let json = body_json(res).await;
    assert_eq!(json["error"]["message"], "Passwords do not match");

    let res = post(
        &app,
        "/auth/register",
        json!({ "email": "a@x.com", "password": "p1" }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn legacy_mode_answers_register_errors_with_ok() {
    let app = memory_app(MemoryUserStore::new(), true);
    register(&app, "a@x.com", "p1", "p1").await;

    let res = register(&app, "a@x.com", "p1", "p1").await;
    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["error"]["message"], "That email is already in use");

    let res = register(&app, "b@x.com", "p1", "p2").await;
    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["error"]["message"], "Passwords do not match");

    // login keeps conventional codes
    let res = post(
        &app,
        "/auth/login",
        json!({ "email": "a@x.com", "password": "nope" }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn postgres_register_and_login() {
    let database_url = match std::env::var("TEST_DATABASE_URL") {
        Ok(u) => u,
        Err(_) => {
            eprintln!("Skip integration test: set TEST_DATABASE_URL");
            return;
        }
    };
    let pool = match db::create_pool(&database_url).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Skip integration test: {}", e);
            return;
        }
    };
    db::run_migrations(&pool).await.unwrap();

    let store = PgUserStore::new(pool);
    let state = AppState::new(&test_config(false), Arc::new(store.clone())).unwrap();
    let app = create_app(state);

    let email = format!(
        "test-{}@example.com",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_millis()
    );

    assert_eq!(register(&app, &email, "p1", "p1").await.status(), StatusCode::OK);
    assert_eq!(
        register(&app, &email, "p1", "p1").await.status(),
        StatusCode::CONFLICT
    );

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = $1")
        .bind(&email)
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(count.0, 1);

    let res = post(&app, "/auth/login", json!({ "email": email, "password": "p1" })).await;
    assert_eq!(res.status(), StatusCode::OK);

    let row = store.find_by_email(&email).await.unwrap().unwrap();
    assert!(row.updated_at.is_some());

    sqlx::query("DELETE FROM users WHERE email = $1")
        .bind(&email)
        .execute(store.pool())
        .await
        .unwrap();
}
