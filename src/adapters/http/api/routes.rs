//! HTTP routes for the catch-up API.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    advance, close_live_session, export_report, get_category_trend, get_history,
    get_live_session, get_preparation, health, list_categories, list_pair_sessions,
    list_sessions, record_session, reveal_employee, reveal_manager, save_live_session,
    start_live_session, submit_preparation, AppState,
};

/// Creates the API router. Mount it under `/api`.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/categories", get(list_categories))
        .route("/preparations", post(submit_preparation))
        .route("/preparations/:a/:b", get(get_preparation))
        .route("/sessions", post(record_session).get(list_sessions))
        .route("/sessions/:a/:b", get(list_pair_sessions))
        .route("/live", post(start_live_session))
        .route("/live/:id", get(get_live_session).delete(close_live_session))
        .route("/live/:id/reveal/employee", post(reveal_employee))
        .route("/live/:id/reveal/manager", post(reveal_manager))
        .route("/live/:id/advance", post(advance))
        .route("/live/:id/save", post(save_live_session))
        .route("/live/:id/report", get(export_report))
        .route("/history", get(get_history))
        .route(
            "/history/:manager/:employee/trend/:category",
            get(get_category_trend),
        )
        .with_state(state)
}
