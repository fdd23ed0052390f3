//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use sqlx::SqlitePool;
use tower::ServiceExt;

use geowolf_api::routes;
use geowolf_api::state::AppState;
use geowolf_core::geo::Position;
use geowolf_core::model::Mission;
use geowolf_core::rng::GameRng;
use geowolf_game::GameSession;
use geowolf_game::config::GameConfig;
use geowolf_store::SessionStore;
use geowolf_test_support::{FixedClock, MockRng};

/// Lobby threshold used across all integration tests.
pub const TEST_THRESHOLD: usize = 4;

/// Five-mission catalog used across all integration tests.
pub fn test_catalog() -> Vec<Mission> {
    (1..=5)
        .map(|id| Mission {
            id,
            name: format!("mission {id}"),
            place: format!("place {id}"),
            position: Position {
                lat: 0.001 * id as f64,
                lng: 0.0,
            },
        })
        .collect()
}

/// Build the full app router with a real store and deterministic clock/RNG.
/// Uses the same route structure as `main.rs`.
pub fn build_test_app(pool: SqlitePool) -> Router {
    build_test_app_with_rng(pool, Box::new(MockRng))
}

/// Build the full app router with a custom RNG for tests that need
/// deterministic draws (mission selection, tie-break executions).
pub fn build_test_app_with_rng(pool: SqlitePool, rng: Box<dyn GameRng>) -> Router {
    let clock = Arc::new(FixedClock(
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
    ));
    let session = GameSession::new(
        SessionStore::new(pool),
        test_catalog(),
        clock,
        rng,
        GameConfig::default(),
    );
    let app_state = AppState::new(session, TEST_THRESHOLD);

    routes::app_router().with_state(app_state)
}

/// Send a request with a JSON body and return status plus parsed response.
async fn send_json(
    app: Router,
    method: &str,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };

    (status, json)
}

/// Send a POST request with a JSON body.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send_json(app, "POST", uri, body).await
}

/// Send a PUT request with a JSON body.
pub async fn put_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send_json(app, "PUT", uri, body).await
}

/// Send a PATCH request with a JSON body.
pub async fn patch_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send_json(app, "PATCH", uri, body).await
}

/// Send a DELETE request.
pub async fn delete(app: Router, uri: &str) -> StatusCode {
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap().status()
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Register a player through the API and return the assigned task ids.
pub async fn register(app: Router, device_id: &str, name: &str) -> Vec<i64> {
    let (status, json) = post_json(
        app,
        "/players",
        &serde_json::json!({ "deviceId": device_id, "name": name, "color": "#ff0000" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    json["taskIds"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_i64().unwrap())
        .collect()
}
