//! Session-specific error types.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, LiveSessionId, PartyRole, ValidationError};
use crate::ports::StoreError;

/// Errors raised while running or persisting a reveal session.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    /// One or both preparations are missing; the session cannot start.
    #[error("Incomplete preparation data: missing {}", format_roles(.missing))]
    IncompleteData { missing: Vec<PartyRole> },

    /// An operation was attempted from a state that does not allow it.
    #[error("Cannot {operation} while session is {state}")]
    InvalidState {
        operation: &'static str,
        state: String,
    },

    /// Caller input was malformed (e.g. a blank party name).
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No live session exists under this id.
    #[error("Live session not found: {0}")]
    NotFound(LiveSessionId),

    /// A store collaborator failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SessionError {
    pub fn incomplete(missing: Vec<PartyRole>) -> Self {
        SessionError::IncompleteData { missing }
    }

    pub fn invalid_state(operation: &'static str, state: impl Into<String>) -> Self {
        SessionError::InvalidState {
            operation,
            state: state.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            SessionError::IncompleteData { .. } => ErrorCode::IncompleteData,
            SessionError::InvalidState { .. } => ErrorCode::InvalidStateTransition,
            SessionError::Validation(_) => ErrorCode::ValidationFailed,
            SessionError::NotFound(_) => ErrorCode::LiveSessionNotFound,
            SessionError::Store(err) => err.code(),
        }
    }

    /// Usage faults are surfaced immediately and never retried.
    pub fn is_usage_fault(&self) -> bool {
        matches!(
            self,
            SessionError::IncompleteData { .. }
                | SessionError::InvalidState { .. }
                | SessionError::Validation(_)
        )
    }
}

fn format_roles(roles: &[PartyRole]) -> String {
    roles
        .iter()
        .map(|r| r.as_str())
        .collect::<Vec<_>>()
        .join(" and ")
}

impl From<SessionError> for DomainError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Validation(e) => e.into(),
            SessionError::Store(e) => e.into(),
            other => DomainError::new(other.code(), other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incomplete_data_lists_missing_roles() {
        let err = SessionError::incomplete(vec![PartyRole::Employee, PartyRole::Manager]);
        assert_eq!(
            err.to_string(),
            "Incomplete preparation data: missing employee and manager"
        );
        assert_eq!(err.code(), ErrorCode::IncompleteData);
    }

    #[test]
    fn invalid_state_names_operation_and_state() {
        let err = SessionError::invalid_state("reveal manager", "not revealed");
        assert_eq!(
            err.to_string(),
            "Cannot reveal manager while session is not revealed"
        );
        assert!(err.is_usage_fault());
    }

    #[test]
    fn store_errors_are_not_usage_faults() {
        let err: SessionError = StoreError::unavailable("postgres", "connection refused").into();
        assert!(!err.is_usage_fault());
        assert_eq!(err.code(), ErrorCode::StoreUnavailable);
    }
}
