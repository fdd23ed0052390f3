//! Integration tests for vote endpoints.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::SqlitePool;

#[sqlx::test(migrations = "../../migrations")]
async fn test_vote_create_update_conflict(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    common::register(app.clone(), "dev-a", "Alice").await;
    common::register(app.clone(), "dev-b", "Bob").await;
    common::register(app.clone(), "dev-c", "Carol").await;

    let (status, body) = common::post_json(
        app.clone(),
        "/votes",
        &json!({ "deviceId": "dev-a", "targetDeviceId": "dev-b" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["action"], "created");

    let (status, body) = common::post_json(
        app.clone(),
        "/votes",
        &json!({ "deviceId": "dev-a", "targetDeviceId": "dev-c" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["action"], "updated");

    let (status, body) = common::post_json(
        app,
        "/votes",
        &json!({ "deviceId": "dev-a", "targetDeviceId": "dev-c" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_vote_for_unknown_target_returns_404(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    common::register(app.clone(), "dev-a", "Alice").await;

    let (status, _) = common::post_json(
        app,
        "/votes",
        &json!({ "deviceId": "dev-a", "targetDeviceId": "ghost" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_vote_status_and_counts(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    common::register(app.clone(), "dev-a", "Alice").await;
    common::register(app.clone(), "dev-b", "Bob").await;

    let (_, body) = common::get_json(app.clone(), "/votes/status/dev-a").await;
    assert_eq!(body["hasVoted"], false);

    common::post_json(
        app.clone(),
        "/votes",
        &json!({ "deviceId": "dev-a", "targetDeviceId": "dev-b" }),
    )
    .await;

    let (_, body) = common::get_json(app.clone(), "/votes/status/dev-a").await;
    assert_eq!(body["hasVoted"], true);
    assert_eq!(body["targetName"], "Bob");
    assert_eq!(body["targetDeviceId"], "dev-b");

    let (status, body) = common::get_json(app, "/votes/counts").await;
    assert_eq!(status, StatusCode::OK);
    let counts = body.as_array().unwrap();
    assert_eq!(counts.len(), 1);
    assert_eq!(counts[0]["name"], "Bob");
    assert_eq!(counts[0]["count"], 1);
}
