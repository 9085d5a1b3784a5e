//! HTTP adapter for preparations, live sessions, stored sessions and history.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    AdvanceResponse, ErrorResponse, HealthResponse, LiveSessionResponse, PreparationPairResponse,
    PreparationResponse, RecordSessionRequest, ReportQuery, StartLiveSessionRequest,
    SubmissionPayload, SubmitPreparationRequest,
};
pub use handlers::AppState;
pub use routes::api_routes;
