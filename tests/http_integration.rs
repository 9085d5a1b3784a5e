//! Integration tests for the HTTP API.
//!
//! Requests go through the full router (including the tracing, CORS and
//! timeout layers) with in-memory stores behind it.

use axum::body::{to_bytes, Body};
use axum::Router;
use http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use catchup::adapters::http::{app_router, AppState};
use catchup::adapters::{InMemoryPreparationStore, InMemorySessionStore, MarkdownReportRenderer};
use catchup::domain::category::{Category, CategoryRegistry};

// =============================================================================
// Test Infrastructure
// =============================================================================

fn app() -> Router {
    let registry = CategoryRegistry::new(vec![
        Category::new("Workload", "How manageable is your workload?"),
        Category::new("Growth", "Are you learning?"),
    ])
    .unwrap();
    let state = AppState::new(
        Arc::new(InMemoryPreparationStore::new()),
        Arc::new(InMemorySessionStore::new()),
        Arc::new(MarkdownReportRenderer::new()),
        registry,
    );
    app_router(state, &[], Duration::from_secs(5))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, _, bytes) = send_raw(app, method, uri, body).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn send_raw(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, http::HeaderMap, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, bytes.to_vec())
}

async fn prepare_pair(app: &Router) {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/preparations",
        Some(json!({
            "role": "employee",
            "name": "Eve",
            "partnerName": "Max",
            "ratings": {"Workload": 4, "Growth": 2},
            "comments": {"Growth": "Want a mentor"}
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);

    let (status, _) = send(
        app,
        Method::POST,
        "/api/preparations",
        Some(json!({
            "role": "manager",
            "name": "Max",
            "partnerName": "Eve",
            "ratings": {"Workload": 4, "Growth": 5}
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn health_reports_ok() {
    let (status, body) = send(&app(), Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn categories_are_listed_in_order() {
    let (status, body) = send(&app(), Method::GET, "/api/categories", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["name"], "Workload");
    assert_eq!(body[1]["name"], "Growth");
}

#[tokio::test]
async fn preparation_pair_loads_in_either_order() {
    let app = app();
    prepare_pair(&app).await;

    let (status, body) = send(&app, Method::GET, "/api/preparations/max/EVE", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["complete"], true);
    assert_eq!(body["employee"]["ratings"]["Growth"], 2);
}

#[tokio::test]
async fn out_of_range_rating_is_rejected() {
    let (status, body) = send(
        &app(),
        Method::POST,
        "/api/preparations",
        Some(json!({
            "role": "employee",
            "name": "Eve",
            "partnerName": "Max",
            "ratings": {"Workload": 7}
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn live_session_without_manager_is_unprocessable() {
    let app = app();
    send(
        &app,
        Method::POST,
        "/api/preparations",
        Some(json!({"role": "employee", "name": "Eve", "partnerName": "Max"})),
    )
    .await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/live",
        Some(json!({"managerName": "Max", "employeeName": "Eve"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "INCOMPLETE_DATA");
}

#[tokio::test]
async fn full_live_session_over_http() {
    let app = app();
    prepare_pair(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/live",
        Some(json!({"managerName": "Max", "employeeName": "Eve"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["session"]["state"], "active");
    let id = body["id"].as_str().unwrap().to_string();
    let live = |path: &str| format!("/api/live/{}{}", id, path);

    // Manager first is out of order.
    let (status, body) = send(&app, Method::POST, &live("/reveal/manager"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INVALID_STATE_TRANSITION");

    let (status, body) = send(&app, Method::POST, &live("/reveal/employee"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rating"]["value"], 4);

    let (_, body) = send(&app, Method::POST, &live("/reveal/manager"), None).await;
    assert_eq!(body["alignment"], "perfect");

    let (_, body) = send(&app, Method::POST, &live("/advance"), None).await;
    assert_eq!(body["outcome"], "next_category");
    assert_eq!(body["index"], 1);

    send(&app, Method::POST, &live("/reveal/employee"), None).await;
    let (_, body) = send(&app, Method::POST, &live("/reveal/manager"), None).await;
    assert_eq!(body["difference"], 3);

    let (_, body) = send(&app, Method::POST, &live("/advance"), None).await;
    assert_eq!(body["outcome"], "completed");

    let (status, headers, bytes) = send_raw(&app, Method::GET, &live("/report?format=markdown"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/markdown"));
    assert!(headers[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("catchup_Eve_"));
    let markdown = String::from_utf8(bytes).unwrap();
    assert!(markdown.contains("Want a mentor"));

    // Unsaved completed sessions cannot be dropped.
    let (status, _) = send(&app, Method::DELETE, &live(""), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, Method::POST, &live("/save"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::DELETE, &live(""), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::GET, &live(""), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, Method::GET, "/api/sessions/Eve/Max", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (_, body) = send(&app, Method::GET, "/api/history", None).await;
    assert_eq!(body[0]["display"], "Max & Eve");
    assert_eq!(body[0]["trendAvailable"], false);

    let (_, body) = send(&app, Method::GET, "/api/history/Max/Eve/trend/Growth", None).await;
    assert_eq!(body["status"], "insufficient_data");
    assert_eq!(body["available"], 1);
}

#[tokio::test]
async fn recorded_sessions_are_listed_newest_first() {
    let app = app();
    for date in ["2024-01-10T10:00:00Z", "2024-03-01T10:00:00Z"] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/sessions",
            Some(json!({
                "managerName": "Max",
                "employeeName": "Eve",
                "sessionDate": date,
                "employee": {"name": "Eve", "partnerName": "Max", "ratings": {"Growth": 3}},
                "manager": {"name": "Max", "partnerName": "Eve", "ratings": {"Growth": 4}}
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, Method::GET, "/api/sessions", None).await;
    assert_eq!(status, StatusCode::OK);
    let dates: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["sessionDate"].as_str().unwrap().to_string())
        .collect();
    assert!(dates[0].starts_with("2024-03-01"));
    assert!(dates[1].starts_with("2024-01-10"));

    let (_, body) = send(&app, Method::GET, "/api/history/Max/Eve/trend/Growth", None).await;
    assert_eq!(body["status"], "series");
    assert_eq!(body["points"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn unknown_and_malformed_live_ids() {
    let app = app();
    let (status, _) = send(&app, Method::GET, "/api/live/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/live/00000000-0000-4000-8000-000000000000/advance",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "LIVE_SESSION_NOT_FOUND");
}
