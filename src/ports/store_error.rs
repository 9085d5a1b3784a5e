//! Store Error - Failure taxonomy shared by every persistence port.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Errors raised by preparation and session stores.
///
/// `Clone` so that a failed attempt can be both logged and kept in an
/// [`StoreError::AllFailed`] aggregate.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The backend could not be reached (network down, pool exhausted).
    #[error("{store} unavailable: {message}")]
    Unavailable { store: String, message: String },

    /// The backend answered but refused the operation.
    #[error("{store} rejected the request: {message}")]
    Rejected { store: String, message: String },

    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Database error: {0}")]
    Database(String),

    /// The adapter is compiled in but has no configuration.
    #[error("{0} is not configured")]
    NotConfigured(String),

    /// Every store in a fallback chain failed.
    #[error("All stores failed: {}", format_attempts(.attempts))]
    AllFailed { attempts: Vec<StoreAttempt> },
}

/// One failed attempt inside a fallback chain.
#[derive(Debug, Clone, Serialize)]
pub struct StoreAttempt {
    pub store: String,
    pub error: String,
}

impl fmt::Display for StoreAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.store, self.error)
    }
}

fn format_attempts(attempts: &[StoreAttempt]) -> String {
    if attempts.is_empty() {
        return "no stores configured".to_string();
    }
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl StoreError {
    pub fn unavailable(store: impl Into<String>, message: impl Into<String>) -> Self {
        StoreError::Unavailable {
            store: store.into(),
            message: message.into(),
        }
    }

    pub fn rejected(store: impl Into<String>, message: impl Into<String>) -> Self {
        StoreError::Rejected {
            store: store.into(),
            message: message.into(),
        }
    }

    /// Whether a later attempt, or another store, might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StoreError::Unavailable { .. }
                | StoreError::Io(_)
                | StoreError::Database(_)
                | StoreError::AllFailed { .. }
        )
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            StoreError::Rejected { .. } | StoreError::Serialization(_) => ErrorCode::StoreRejected,
            _ => ErrorCode::StoreUnavailable,
        }
    }
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        let domain = DomainError::new(err.code(), err.to_string());
        match err {
            StoreError::AllFailed { attempts } => attempts
                .into_iter()
                .fold(domain, |d, a| d.with_detail(a.store, a.error)),
            _ => domain,
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for StoreError {
    fn from(err: serde_yaml::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::unavailable("postgres", err.to_string())
            }
            other => StoreError::Database(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_failed_lists_every_attempt() {
        let err = StoreError::AllFailed {
            attempts: vec![
                StoreAttempt {
                    store: "postgres".into(),
                    error: "down".into(),
                },
                StoreAttempt {
                    store: "local".into(),
                    error: "disk full".into(),
                },
            ],
        };
        assert_eq!(
            err.to_string(),
            "All stores failed: postgres: down; local: disk full"
        );
        assert_eq!(err.code(), ErrorCode::StoreUnavailable);
    }

    #[test]
    fn rejected_is_not_retryable() {
        let err = StoreError::rejected("supabase", "409 conflict");
        assert!(!err.is_retryable());
        assert_eq!(err.code(), ErrorCode::StoreRejected);
        assert!(StoreError::unavailable("supabase", "timeout").is_retryable());
    }

    #[test]
    fn all_failed_becomes_domain_error_with_details() {
        let err = StoreError::AllFailed {
            attempts: vec![StoreAttempt {
                store: "local".into(),
                error: "disk full".into(),
            }],
        };
        let domain: DomainError = err.into();
        assert_eq!(domain.code, ErrorCode::StoreUnavailable);
        assert_eq!(domain.details.get("local").map(String::as_str), Some("disk full"));
    }

    #[test]
    fn io_errors_convert() {
        let err: StoreError = std::io::Error::new(std::io::ErrorKind::Other, "boom").into();
        assert!(matches!(err, StoreError::Io(ref msg) if msg == "boom"));
    }
}
