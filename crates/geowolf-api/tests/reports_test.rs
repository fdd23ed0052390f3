//! Integration tests for report endpoints.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::SqlitePool;

#[sqlx::test(migrations = "../../migrations")]
async fn test_report_opens_meeting_and_is_listed(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    common::register(app.clone(), "dev-a", "Alice").await;
    common::register(app.clone(), "dev-b", "Bob").await;

    let (status, body) = common::post_json(
        app.clone(),
        "/reports",
        &json!({ "deviceId": "dev-a", "reportedDeviceId": "dev-b" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["reportId"].is_i64());

    // Filing a report starts a five-minute report meeting.
    let (_, meeting) = common::get_json(app.clone(), "/meetings/status").await;
    assert_eq!(meeting["active"], true);
    assert_eq!(meeting["trigger"], "report");
    assert_eq!(meeting["durationSecs"], 300);

    let (status, body) = common::get_json(app.clone(), "/reports").await;
    assert_eq!(status, StatusCode::OK);
    let reports = body.as_array().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["reporterName"], "Alice");
    assert_eq!(reports[0]["reportedName"], "Bob");

    common::post_json(app, "/meetings/end", &json!({})).await;
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_report_without_named_player(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    common::register(app.clone(), "dev-a", "Alice").await;

    let (status, _) = common::post_json(
        app.clone(),
        "/reports",
        &json!({ "deviceId": "dev-a" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = common::get_json(app.clone(), "/reports").await;
    assert!(body[0].get("reportedName").is_none());

    common::post_json(app, "/meetings/end", &json!({})).await;
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_report_from_unknown_device_returns_404(pool: SqlitePool) {
    let app = common::build_test_app(pool);

    let (status, _) = common::post_json(
        app,
        "/reports",
        &json!({ "deviceId": "ghost" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
