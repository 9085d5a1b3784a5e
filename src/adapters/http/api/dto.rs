//! Request and response bodies for the catch-up API.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::category::Category;
use crate::domain::foundation::{DomainError, LiveSessionId, PartyRole, Timestamp, ValidationError};
use crate::domain::preparation::{ratings_from_raw, PartySubmission, PreparationPair};
use crate::domain::session::{AdvanceOutcome, SessionRecord, SessionSnapshot};
use crate::ports::{ExportFormat, RenderError};

// ════════════════════════════════════════════════════════════════════════════
// Requests
// ════════════════════════════════════════════════════════════════════════════

/// One party's ratings as sent by a client. Ratings are raw 1-5 values.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub name: String,
    pub partner_name: String,
    #[serde(default)]
    pub ratings: BTreeMap<String, u8>,
    #[serde(default)]
    pub comments: BTreeMap<String, String>,
}

impl SubmissionPayload {
    pub fn into_submission(self) -> Result<PartySubmission, ValidationError> {
        let ratings = ratings_from_raw(self.ratings)?;
        PartySubmission::new(&self.name, &self.partner_name, ratings, self.comments)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitPreparationRequest {
    pub role: PartyRole,
    #[serde(flatten)]
    pub submission: SubmissionPayload,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSessionRequest {
    pub manager_name: String,
    pub employee_name: String,
    pub session_date: Option<Timestamp>,
    pub employee: SubmissionPayload,
    pub manager: SubmissionPayload,
    pub categories: Option<Vec<Category>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartLiveSessionRequest {
    pub manager_name: String,
    pub employee_name: String,
}

/// Query string of the report endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportQuery {
    #[serde(default)]
    pub format: Option<String>,
}

impl ReportQuery {
    pub fn export_format(&self) -> Result<ExportFormat, RenderError> {
        match &self.format {
            None => Ok(ExportFormat::default()),
            Some(raw) => raw.parse(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Responses
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparationResponse {
    pub key: String,
    pub role: PartyRole,
    pub submission: PartySubmission,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparationPairResponse {
    pub employee: Option<PartySubmission>,
    pub manager: Option<PartySubmission>,
    pub complete: bool,
    pub missing: Vec<PartyRole>,
}

impl From<PreparationPair> for PreparationPairResponse {
    fn from(pair: PreparationPair) -> Self {
        Self {
            employee: pair.get(PartyRole::Employee).cloned(),
            manager: pair.get(PartyRole::Manager).cloned(),
            complete: pair.is_complete(),
            missing: pair.missing_roles(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveSessionResponse {
    pub id: LiveSessionId,
    pub session: SessionSnapshot,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AdvanceResponse {
    NextCategory { index: usize },
    Completed { record: SessionRecord },
}

impl From<AdvanceOutcome> for AdvanceResponse {
    fn from(outcome: AdvanceOutcome) -> Self {
        match outcome {
            AdvanceOutcome::NextCategory { index } => AdvanceResponse::NextCategory { index },
            AdvanceOutcome::Completed(record) => AdvanceResponse::Completed { record },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
            details: None,
        }
    }
}

impl From<DomainError> for ErrorResponse {
    fn from(err: DomainError) -> Self {
        let details = (!err.details.is_empty()).then(|| {
            serde_json::Value::Object(
                err.details
                    .into_iter()
                    .map(|(k, v)| (k, serde_json::Value::String(v)))
                    .collect(),
            )
        });
        Self {
            code: err.code.to_string(),
            message: err.message,
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;

    #[test]
    fn submit_request_reads_role_and_flattened_fields() {
        let req: SubmitPreparationRequest = serde_json::from_value(serde_json::json!({
            "role": "employee",
            "name": "Eve",
            "partnerName": "Max",
            "ratings": {"Workload": 4}
        }))
        .unwrap();
        assert_eq!(req.role, PartyRole::Employee);
        assert_eq!(req.submission.ratings["Workload"], 4);
        assert!(req.submission.comments.is_empty());
    }

    #[test]
    fn payload_with_bad_rating_fails_conversion() {
        let payload = SubmissionPayload {
            name: "Eve".into(),
            partner_name: "Max".into(),
            ratings: [("Workload".to_string(), 9u8)].into_iter().collect(),
            comments: BTreeMap::new(),
        };
        assert!(payload.into_submission().is_err());
    }

    #[test]
    fn report_query_defaults_to_markdown() {
        assert_eq!(ReportQuery::default().export_format().unwrap(), ExportFormat::Markdown);
        let html = ReportQuery {
            format: Some("html".into()),
        };
        assert_eq!(html.export_format().unwrap(), ExportFormat::Html);
        let pdf = ReportQuery {
            format: Some("pdf".into()),
        };
        assert!(pdf.export_format().is_err());
    }

    #[test]
    fn error_response_carries_code_and_details() {
        let err = DomainError::new(ErrorCode::ValidationFailed, "bad").with_detail("field", "name");
        let body = ErrorResponse::from(err);
        assert_eq!(body.code, "VALIDATION_FAILED");
        assert_eq!(body.details.unwrap()["field"], "name");
    }
}
