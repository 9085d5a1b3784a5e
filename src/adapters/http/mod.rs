//! HTTP adapters - REST API implementations.

pub mod api;

pub use api::{api_routes, AppState, ErrorResponse};

use std::time::Duration;

use axum::Router;
use http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Full application router: the API under `/api` with tracing, CORS and a
/// request timeout.
///
/// An empty `cors_origins` list allows any origin.
pub fn app_router(state: AppState, cors_origins: &[String], request_timeout: Duration) -> Router {
    Router::new()
        .nest("/api", api_routes(state))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();
    if parsed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(parsed)
    }
}
