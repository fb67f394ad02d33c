//! End-to-end request flows against the real router and an in-memory store.

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
};
use chrono::{Duration, NaiveDate};
use serde_json::{Value, json};
use tower::ServiceExt;

use lateshow_api::auth::{AppState, AppStateInner};
use lateshow_api::tokens::TokenService;
use lateshow_db::Database;

const SECRET: &str = "flow-test-secret";

struct TestApp {
    router: Router,
    db: Arc<Database>,
}

fn app() -> TestApp {
    let db = Arc::new(Database::open_in_memory().unwrap());
    db.create_guest("Tom Hanks", "Actor").unwrap();
    db.create_episode(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(), 1).unwrap();

    let tokens = TokenService::new(SECRET, Duration::minutes(15));
    let state: AppState = Arc::new(AppStateInner::new(db.clone(), tokens).unwrap());

    TestApp {
        router: lateshow_api::router(state),
        db,
    }
}

async fn send(router: &Router, method: &str, uri: &str, token: Option<&str>, body: Value) -> Response {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();

    router.clone().oneshot(request).await.unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn register_and_login(router: &Router, username: &str, password: &str) -> String {
    let creds = json!({ "username": username, "password": password });

    let response = send(router, "POST", "/register", None, creds.clone()).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send(router, "POST", "/login", None, creds).await;
    assert_eq!(response.status(), StatusCode::OK);
    json_body(response).await["access_token"]
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn register_login_create_scenario() {
    let app = app();

    let creds = json!({ "username": "alice", "password": "pw123" });
    let response = send(&app.router, "POST", "/register", None, creds.clone()).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(json_body(response).await["message"], "User registered successfully");

    let response = send(&app.router, "POST", "/login", None, creds).await;
    assert_eq!(response.status(), StatusCode::OK);
    let token = json_body(response).await["access_token"].as_str().unwrap().to_string();

    let response = send(
        &app.router,
        "POST",
        "/appearances",
        Some(&token),
        json!({ "rating": 5, "guest_id": 1, "episode_id": 1 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        json_body(response).await,
        json!({ "id": 1, "rating": 5, "guest_id": 1, "episode_id": 1 })
    );

    let stored = app.db.get_appearance(1).unwrap().unwrap();
    assert_eq!((stored.rating, stored.guest_id, stored.episode_id), (5, 1, 1));
}

#[tokio::test]
async fn login_token_resolves_to_registered_user() {
    let app = app();
    let token = register_and_login(&app.router, "alice", "pw123").await;

    let tokens = TokenService::new(SECRET, Duration::minutes(15));
    let user = app.db.get_user_by_username("alice").unwrap().unwrap();
    assert_eq!(tokens.validate(&token).unwrap(), user.id);
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let app = app();
    let creds = json!({ "username": "alice", "password": "pw123" });

    let first = send(&app.router, "POST", "/register", None, creds.clone()).await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = send(&app.router, "POST", "/register", None, creds).await;
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(second).await["error"], "Username already exists");
}

#[tokio::test]
async fn register_requires_both_fields() {
    let app = app();

    for body in [
        json!({ "username": "alice" }),
        json!({ "password": "pw123" }),
        json!({ "username": "", "password": "pw123" }),
    ] {
        let response = send(&app.router, "POST", "/register", None, body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["error"].is_string());
    }
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let app = app();
    let request = Request::builder()
        .method("POST")
        .uri("/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(response).await["error"].is_string());
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = app();
    register_and_login(&app.router, "alice", "pw123").await;

    let response = send(
        &app.router,
        "POST",
        "/login",
        None,
        json!({ "username": "alice", "password": "nope" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["error"], "Invalid credentials");

    let response = send(
        &app.router,
        "POST",
        "/login",
        None,
        json!({ "username": "nobody", "password": "pw123" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["error"], "Invalid credentials");
}

#[tokio::test]
async fn appearance_requires_token() {
    let app = app();
    let body = json!({ "rating": 5, "guest_id": 1, "episode_id": 1 });

    let response = send(&app.router, "POST", "/appearances", None, body.clone()).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(&app.router, "POST", "/appearances", Some("garbage"), body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["error"], "Invalid token");

    assert_eq!(app.db.count_appearances().unwrap(), 0);
}

#[tokio::test]
async fn expired_token_is_reported_as_expired() {
    let app = app();
    register_and_login(&app.router, "alice", "pw123").await;
    let user = app.db.get_user_by_username("alice").unwrap().unwrap();

    let stale = TokenService::new(SECRET, Duration::minutes(-5)).issue(user.id).unwrap();
    let response = send(
        &app.router,
        "POST",
        "/appearances",
        Some(&stale),
        json!({ "rating": 5, "guest_id": 1, "episode_id": 1 }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["error"], "Token has expired");
}

#[tokio::test]
async fn dangling_guest_writes_no_row() {
    let app = app();
    let token = register_and_login(&app.router, "alice", "pw123").await;

    let response = send(
        &app.router,
        "POST",
        "/appearances",
        Some(&token),
        json!({ "rating": 5, "guest_id": 42, "episode_id": 1 }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "Invalid guest_id or episode_id");
    assert_eq!(app.db.count_appearances().unwrap(), 0);
}

#[tokio::test]
async fn missing_appearance_fields_are_bad_request() {
    let app = app();
    let token = register_and_login(&app.router, "alice", "pw123").await;

    let response = send(
        &app.router,
        "POST",
        "/appearances",
        Some(&token),
        json!({ "rating": 5, "guest_id": 1 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await["error"],
        "rating, guest_id, and episode_id required"
    );

    // Explicit zero is a value, not an absent field.
    let response = send(
        &app.router,
        "POST",
        "/appearances",
        Some(&token),
        json!({ "rating": 0, "guest_id": 1, "episode_id": 1 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(json_body(response).await["rating"], 0);
}

#[tokio::test]
async fn health_is_public() {
    let app = app();
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "status": "ok" }));
}

#[tokio::test]
async fn unknown_path_is_not_found_without_token() {
    let app = app();

    let response = send(&app.router, "POST", "/nope", None, json!({})).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn login_ignores_extra_keys() {
    let app = app();
    register_and_login(&app.router, "alice", "pw123").await;

    let response = send(
        &app.router,
        "POST",
        "/login",
        None,
        json!({ "username": "alice", "password": "pw123", "remember": true }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(json_body(response).await["access_token"].is_string());
}

#[tokio::test]
async fn storage_failure_returns_generic_error() {
    let app = app();
    let token = register_and_login(&app.router, "alice", "pw123").await;
    app.db
        .with_conn(|conn| {
            conn.execute_batch(
                "CREATE TRIGGER reject_appearances BEFORE INSERT ON appearances
                 BEGIN SELECT RAISE(ABORT, 'internal constraint detail'); END;",
            )?;
            Ok(())
        })
        .unwrap();

    let response = send(
        &app.router,
        "POST",
        "/appearances",
        Some(&token),
        json!({ "rating": 5, "guest_id": 1, "episode_id": 1 }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "Could not save appearance" })
    );
    assert_eq!(app.db.count_appearances().unwrap(), 0);
}
