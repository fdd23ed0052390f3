//! Integration tests for the mission catalog endpoint.

mod common;

use axum::http::StatusCode;
use sqlx::SqlitePool;

#[sqlx::test(migrations = "../../migrations")]
async fn test_catalog_is_served_verbatim(pool: SqlitePool) {
    let app = common::build_test_app(pool);

    let (status, body) = common::get_json(app, "/missions").await;

    assert_eq!(status, StatusCode::OK);
    let missions = body.as_array().unwrap();
    assert_eq!(missions.len(), 5);
    assert_eq!(missions[0]["id"], 1);
    assert_eq!(missions[0]["name"], "mission 1");
    assert_eq!(missions[0]["place"], "place 1");
    assert!(missions[0]["position"]["lat"].is_f64());
}
