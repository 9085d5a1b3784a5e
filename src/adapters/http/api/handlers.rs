//! HTTP handlers for the catch-up API.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::application::{
    CategoryTrendQuery, GetCategoryTrendHandler, GetHistoryHandler, GetPreparationHandler,
    GetPreparationQuery, ListSessionsHandler, ListSessionsQuery, LiveSessions,
    RecordSessionCommand, RecordSessionHandler, StartLiveSessionCommand, SubmitPreparationCommand,
    SubmitPreparationHandler,
};
use crate::domain::category::CategoryRegistry;
use crate::domain::foundation::{DomainError, ErrorCode, LiveSessionId};
use crate::ports::{PreparationStore, ReportRenderer, SessionStore};

use super::dto::{
    AdvanceResponse, ErrorResponse, HealthResponse, LiveSessionResponse, PreparationPairResponse,
    PreparationResponse, RecordSessionRequest, ReportQuery, StartLiveSessionRequest,
    SubmitPreparationRequest,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct AppState {
    live: Arc<LiveSessions>,
    submit_preparation: Arc<SubmitPreparationHandler>,
    get_preparation: Arc<GetPreparationHandler>,
    record_session: Arc<RecordSessionHandler>,
    list_sessions: Arc<ListSessionsHandler>,
    history: Arc<GetHistoryHandler>,
    trend: Arc<GetCategoryTrendHandler>,
    renderer: Arc<dyn ReportRenderer>,
    registry: CategoryRegistry,
}

impl AppState {
    /// Wires every handler to the same store chains and category registry.
    pub fn new(
        preparations: Arc<dyn PreparationStore>,
        sessions: Arc<dyn SessionStore>,
        renderer: Arc<dyn ReportRenderer>,
        registry: CategoryRegistry,
    ) -> Self {
        Self {
            live: Arc::new(LiveSessions::new(
                preparations.clone(),
                sessions.clone(),
                registry.clone(),
            )),
            submit_preparation: Arc::new(SubmitPreparationHandler::new(
                preparations.clone(),
                registry.clone(),
            )),
            get_preparation: Arc::new(GetPreparationHandler::new(preparations)),
            record_session: Arc::new(RecordSessionHandler::new(sessions.clone(), registry.clone())),
            list_sessions: Arc::new(ListSessionsHandler::new(sessions.clone())),
            history: Arc::new(GetHistoryHandler::new(sessions.clone())),
            trend: Arc::new(GetCategoryTrendHandler::new(sessions)),
            renderer,
            registry,
        }
    }

    pub fn live_sessions(&self) -> &Arc<LiveSessions> {
        &self.live
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Health and categories
// ════════════════════════════════════════════════════════════════════════════

/// GET /api/health
pub async fn health() -> Response {
    let body = HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// GET /api/categories - Categories in reveal order
pub async fn list_categories(State(state): State<AppState>) -> Response {
    (StatusCode::OK, Json(state.registry.snapshot())).into_response()
}

// ════════════════════════════════════════════════════════════════════════════
// Preparations
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/preparations - Submit or replace one party's preparation
pub async fn submit_preparation(
    State(state): State<AppState>,
    Json(req): Json<SubmitPreparationRequest>,
) -> Response {
    let cmd = SubmitPreparationCommand {
        role: req.role,
        name: req.submission.name,
        partner_name: req.submission.partner_name,
        ratings: req.submission.ratings,
        comments: req.submission.comments,
    };

    match state.submit_preparation.handle(cmd).await {
        Ok(result) => {
            let response = PreparationResponse {
                key: result.key.to_string(),
                role: req.role,
                submission: result.submission,
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// GET /api/preparations/:a/:b - Both preparations of a pair, in either order
pub async fn get_preparation(
    State(state): State<AppState>,
    Path((first_name, second_name)): Path<(String, String)>,
) -> Response {
    let query = GetPreparationQuery {
        first_name,
        second_name,
    };

    match state.get_preparation.handle(query).await {
        Ok(pair) => (StatusCode::OK, Json(PreparationPairResponse::from(pair))).into_response(),
        Err(e) => error_response(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Stored sessions
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/sessions - Store a session completed elsewhere
pub async fn record_session(
    State(state): State<AppState>,
    Json(req): Json<RecordSessionRequest>,
) -> Response {
    let employee = match req.employee.into_submission() {
        Ok(s) => s,
        Err(e) => return error_response(e),
    };
    let manager = match req.manager.into_submission() {
        Ok(s) => s,
        Err(e) => return error_response(e),
    };

    let cmd = RecordSessionCommand {
        manager_name: req.manager_name,
        employee_name: req.employee_name,
        session_date: req.session_date,
        employee,
        manager,
        categories: req.categories,
    };

    match state.record_session.handle(cmd).await {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /api/sessions - Every stored session, newest first
pub async fn list_sessions(State(state): State<AppState>) -> Response {
    match state.list_sessions.handle(ListSessionsQuery::default()).await {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /api/sessions/:a/:b - Sessions involving both people, newest first
pub async fn list_pair_sessions(
    State(state): State<AppState>,
    Path((a, b)): Path<(String, String)>,
) -> Response {
    let query = ListSessionsQuery { pair: Some((a, b)) };
    match state.list_sessions.handle(query).await {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(e) => error_response(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Live sessions
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/live - Load both preparations and start revealing
pub async fn start_live_session(
    State(state): State<AppState>,
    Json(req): Json<StartLiveSessionRequest>,
) -> Response {
    let cmd = StartLiveSessionCommand {
        manager_name: req.manager_name,
        employee_name: req.employee_name,
    };

    match state.live.start(cmd).await {
        Ok((id, session)) => {
            (StatusCode::CREATED, Json(LiveSessionResponse { id, session })).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// GET /api/live/:id - Current view of a live session
pub async fn get_live_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_live_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match state.live.snapshot(id).await {
        Ok(session) => (StatusCode::OK, Json(LiveSessionResponse { id, session })).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/live/:id/reveal/employee
pub async fn reveal_employee(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let id = match parse_live_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match state.live.reveal_employee(id).await {
        Ok(entry) => (StatusCode::OK, Json(entry)).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/live/:id/reveal/manager
pub async fn reveal_manager(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let id = match parse_live_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match state.live.reveal_manager(id).await {
        Ok(comparison) => (StatusCode::OK, Json(comparison)).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/live/:id/advance
pub async fn advance(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let id = match parse_live_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match state.live.advance(id).await {
        Ok(outcome) => (StatusCode::OK, Json(AdvanceResponse::from(outcome))).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/live/:id/save - Persist the completed record
pub async fn save_live_session(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let id = match parse_live_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match state.live.persist(id).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /api/live/:id/report?format=markdown|html - Download the report
pub async fn export_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ReportQuery>,
) -> Response {
    let id = match parse_live_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let format = match query.export_format() {
        Ok(format) => format,
        Err(e) => return error_response(e),
    };
    let report = match state.live.report(id).await {
        Ok(report) => report,
        Err(e) => return error_response(e),
    };

    match state.renderer.render(&report, format) {
        Ok(rendered) => {
            let disposition = format!("attachment; filename=\"{}\"", rendered.filename);
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, rendered.content_type.to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                rendered.content,
            )
                .into_response()
        }
        Err(e) => error_response(e),
    }
}

/// DELETE /api/live/:id - Abandon, or release a saved session
pub async fn close_live_session(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let id = match parse_live_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match state.live.close(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// History
// ════════════════════════════════════════════════════════════════════════════

/// GET /api/history - Relationships with per-session averages
pub async fn get_history(State(state): State<AppState>) -> Response {
    match state.history.handle().await {
        Ok(pairs) => (StatusCode::OK, Json(pairs)).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /api/history/:manager/:employee/trend/:category
pub async fn get_category_trend(
    State(state): State<AppState>,
    Path((manager_name, employee_name, category)): Path<(String, String, String)>,
) -> Response {
    let query = CategoryTrendQuery {
        manager_name,
        employee_name,
        category,
    };
    match state.trend.handle(query).await {
        Ok(trend) => (StatusCode::OK, Json(trend)).into_response(),
        Err(e) => error_response(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

fn parse_live_id(raw: &str) -> Result<LiveSessionId, Response> {
    raw.parse::<LiveSessionId>().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("Invalid live session ID")),
        )
            .into_response()
    })
}

pub(crate) fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::ValidationFailed => StatusCode::BAD_REQUEST,
        ErrorCode::LiveSessionNotFound => StatusCode::NOT_FOUND,
        ErrorCode::IncompleteData => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::InvalidStateTransition => StatusCode::CONFLICT,
        ErrorCode::StoreUnavailable | ErrorCode::StoreRejected => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: impl Into<DomainError>) -> Response {
    let error = error.into();
    let status = status_for(error.code);
    if status.is_server_error() {
        tracing::warn!(code = %error.code, message = %error.message, "Request failed");
    }
    (status, Json(ErrorResponse::from(error))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::PartyRole;
    use crate::domain::session::SessionError;
    use crate::ports::StoreError;

    #[test]
    fn invalid_state_maps_to_409() {
        let response = error_response(SessionError::invalid_state("advance", "idle"));
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn incomplete_data_maps_to_422() {
        let response = error_response(SessionError::incomplete(vec![PartyRole::Manager]));
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn unknown_live_session_maps_to_404() {
        let response = error_response(SessionError::NotFound(LiveSessionId::new()));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn store_failures_map_to_503() {
        let response = error_response(StoreError::unavailable("postgres", "down"));
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let response = error_response(StoreError::AllFailed { attempts: vec![] });
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn malformed_live_id_is_bad_request() {
        let response = parse_live_id("not-a-uuid").unwrap_err();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
