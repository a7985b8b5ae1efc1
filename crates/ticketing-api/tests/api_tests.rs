//! Integration tests for the control API endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. Each test builds its own controller, so runs do
//! not leak between tests.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use ticketing_api::router::build_router;
use ticketing_api::state::AppState;
use ticketing_core::config::SimulationSettings;
use ticketing_core::SimulationController;
use tower::ServiceExt;

fn make_router() -> (Router, Arc<SimulationController>) {
    let controller = Arc::new(SimulationController::new(SimulationSettings {
        vendors: 1,
        customers: 1,
        batch_size: 1,
        stop_timeout_ms: 1_000,
    }));
    let state = Arc::new(AppState::new(Arc::clone(&controller)));
    (build_router(state), controller)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(path: &str, body: &Value) -> Request<Body> {
    Request::post(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn put_json(path: &str, body: &Value) -> Request<Body> {
    Request::put(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(path: &str) -> Request<Body> {
    Request::get(path).body(Body::empty()).unwrap()
}

fn post_empty(path: &str) -> Request<Body> {
    Request::post(path).body(Body::empty()).unwrap()
}

// =========================================================================
// Status
// =========================================================================

#[tokio::test]
async fn test_status_initially_stopped() {
    let (router, _) = make_router();

    let response = router
        .oneshot(get("/api/v1/simulating/status"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["systemStatus"], "STOPPED");
    assert_eq!(json["ticketsAvailable"], 0);
    assert_eq!(json["ticketsReleased"], 0);
    assert_eq!(json["ticketsRetrieved"], 0);
    assert!(json["runId"].is_null());
}

// =========================================================================
// Start
// =========================================================================

#[tokio::test]
async fn test_start_with_numbers() {
    let (router, controller) = make_router();

    let body = json!({
        "totalTickets": 10,
        "releaseRate": 5,
        "retrievalRate": 1,
        "maxCapacity": 5
    });
    let response = router
        .clone()
        .oneshot(post_json("/api/v1/simulating/start", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["ok"], true);
    assert_eq!(json["config"]["totalTickets"], 10);
    assert!(json["runId"].is_string());

    let response = router
        .oneshot(get("/api/v1/simulating/status"))
        .await
        .unwrap();
    let status = body_to_json(response.into_body()).await;
    assert_eq!(status["systemStatus"], "RUNNING");
    assert_eq!(status["runId"], json["runId"]);
    assert_eq!(status["maxCapacity"], 5);

    controller.stop().await;
}

#[tokio::test]
async fn test_start_with_numeric_strings() {
    let (router, controller) = make_router();

    let body = json!({
        "totalTickets": "10",
        "releaseRate": "2",
        "retrievalRate": "1",
        "maxCapacity": "5"
    });
    let response = router
        .oneshot(post_json("/api/v1/simulating/start", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(controller.status().running);
    assert_eq!(controller.status().total_tickets, 10);

    controller.stop().await;
}

#[tokio::test]
async fn test_start_rejects_zero_rate() {
    let (router, controller) = make_router();

    let body = json!({
        "totalTickets": 10,
        "releaseRate": 0,
        "retrievalRate": 1,
        "maxCapacity": 5
    });
    let response = router
        .oneshot(post_json("/api/v1/simulating/start", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], 400);
    assert!(json["error"].as_str().unwrap().contains("releaseRate"));
    assert!(!controller.status().running);
}

#[tokio::test]
async fn test_start_rejects_non_numeric_string() {
    let (router, controller) = make_router();

    let body = json!({
        "totalTickets": "ten",
        "releaseRate": "1",
        "retrievalRate": "1",
        "maxCapacity": "5"
    });
    let response = router
        .oneshot(post_json("/api/v1/simulating/start", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("totalTickets"));
    assert!(!controller.status().running);
}

#[tokio::test]
async fn test_start_rejects_malformed_json() {
    let (router, controller) = make_router();

    let request = Request::post("/api/v1/simulating/start")
        .header("content-type", "application/json")
        .body(Body::from("{\"totalTickets\": 10,"))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], 400);
    assert!(!controller.status().running);
}

#[tokio::test]
async fn test_start_rejects_missing_field() {
    let (router, _) = make_router();

    let body = json!({ "totalTickets": 10, "releaseRate": 1, "retrievalRate": 1 });
    let response = router
        .oneshot(post_json("/api/v1/simulating/start", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("maxCapacity"));
}

#[tokio::test]
async fn test_second_start_conflicts() {
    let (router, controller) = make_router();

    let body = json!({
        "totalTickets": 100,
        "releaseRate": 1,
        "retrievalRate": 1,
        "maxCapacity": 10
    });
    let first = router
        .clone()
        .oneshot(post_json("/api/v1/simulating/start", &body))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let run_id = controller.status().run_id;

    let second = router
        .oneshot(post_json("/api/v1/simulating/start", &body))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let json = body_to_json(second.into_body()).await;
    assert_eq!(json["status"], 409);
    assert_eq!(controller.status().run_id, run_id);

    controller.stop().await;
}

// =========================================================================
// Stop
// =========================================================================

#[tokio::test]
async fn test_stop_when_stopped_is_ok() {
    let (router, _) = make_router();

    let response = router
        .oneshot(post_empty("/api/v1/simulating/stop"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["ok"], true);
    assert!(json["summary"].is_null());
}

#[tokio::test]
async fn test_start_then_stop_returns_summary() {
    let (router, _) = make_router();

    let body = json!({
        "totalTickets": 3,
        "releaseRate": 1,
        "retrievalRate": 1,
        "maxCapacity": 3
    });
    let response = router
        .clone()
        .oneshot(post_json("/api/v1/simulating/start", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .clone()
        .oneshot(post_empty("/api/v1/simulating/stop"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["summary"]["workers"].as_array().unwrap().len(), 2);
    assert_eq!(json["summary"]["ticketsUnsold"], 0);

    let response = router
        .oneshot(get("/api/v1/simulating/status"))
        .await
        .unwrap();
    let status = body_to_json(response.into_body()).await;
    assert_eq!(status["systemStatus"], "STOPPED");
    assert_eq!(status["ticketsAvailable"], 0);
}

// =========================================================================
// Update config
// =========================================================================

#[tokio::test]
async fn test_update_config_without_run_conflicts() {
    let (router, _) = make_router();

    let response = router
        .oneshot(put_json(
            "/api/v1/simulating/updateConfig",
            &json!({ "releaseRate": 3 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_update_config_changes_rates() {
    let (router, controller) = make_router();

    let body = json!({
        "totalTickets": 100,
        "releaseRate": 1,
        "retrievalRate": 1,
        "maxCapacity": 10
    });
    router
        .clone()
        .oneshot(post_json("/api/v1/simulating/start", &body))
        .await
        .unwrap();

    let response = router
        .clone()
        .oneshot(put_json(
            "/api/v1/simulating/updateConfig",
            &json!({ "releaseRate": "4" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["previousReleaseRate"], 1);
    assert_eq!(json["releaseRate"], 4);
    assert_eq!(json["retrievalRate"], 1);

    let response = router
        .oneshot(put_json(
            "/api/v1/simulating/updateConfig",
            &json!({ "retrievalRate": 0 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    controller.stop().await;
}

// =========================================================================
// Routing
// =========================================================================

#[tokio::test]
async fn test_nonexistent_route_returns_404() {
    let (router, _) = make_router();

    let response = router.oneshot(get("/api/v1/nonexistent")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_status_rejects_post() {
    let (router, _) = make_router();

    let response = router
        .oneshot(post_empty("/api/v1/simulating/status"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
