//! Integration tests for the health check endpoint and general HTTP behaviour.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, post};
use kopilot_events::BusConnectionManager;

// ---------------------------------------------------------------------------
// Test: GET /health returns 200 with expected JSON fields
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_check_returns_ok_with_json() {
    let app = common::build_test_app();
    app.bus.ensure_connected().await.unwrap();

    let response = get(&app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["db_healthy"], true);
    assert_eq!(json["bus_connected"], true);
}

// ---------------------------------------------------------------------------
// Test: store outage degrades health, bus outage does not
// ---------------------------------------------------------------------------

#[tokio::test]
async fn store_outage_reports_degraded() {
    let app = common::build_test_app();
    app.store.set_failing(true);

    let json = body_json(get(&app, "/health").await).await;

    assert_eq!(json["status"], "degraded");
    assert_eq!(json["db_healthy"], false);
}

#[tokio::test]
async fn bus_outage_is_informational() {
    let app = common::build_test_app_with_bus(BusConnectionManager::new(
        common::UnreachableTransport,
    ));

    let json = body_json(get(&app, "/health").await).await;

    assert_eq!(json["status"], "ok");
    assert_eq!(json["bus_connected"], false);
}

// ---------------------------------------------------------------------------
// Test: unknown routes and wrong methods
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_route_returns_404() {
    let app = common::build_test_app();
    let response = get(&app, "/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_on_webhook_returns_405() {
    let app = common::build_test_app();
    let response = get(&app, "/webhook/telegram").await;

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn unknown_source_returns_404() {
    let app = common::build_test_app();
    let response = post(&app, "/webhook/slack", &[], "{}").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: x-request-id header is present in response
// ---------------------------------------------------------------------------

#[tokio::test]
async fn response_contains_x_request_id_header() {
    let app = common::build_test_app();
    let response = get(&app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let request_id = response.headers().get("x-request-id");
    assert!(
        request_id.is_some(),
        "Response must contain an x-request-id header"
    );

    // The value should be a valid UUID (36 chars with hyphens).
    let id_str = request_id.unwrap().to_str().unwrap();
    assert_eq!(id_str.len(), 36, "x-request-id should be a UUID string");
}
