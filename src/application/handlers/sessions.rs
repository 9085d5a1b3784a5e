//! Session record handlers - direct saves and listings.

use std::sync::Arc;
use tracing::info;

use crate::domain::category::{Category, CategoryRegistry};
use crate::domain::foundation::{DomainError, Timestamp, ValidationError};
use crate::domain::preparation::PartySubmission;
use crate::domain::session::SessionRecord;
use crate::ports::SessionStore;

/// Command to store an already completed session.
///
/// Used by clients that ran the reveal themselves; live sessions are saved
/// through [`crate::application::LiveSessions::persist`].
#[derive(Debug, Clone)]
pub struct RecordSessionCommand {
    pub manager_name: String,
    pub employee_name: String,
    /// Defaults to now.
    pub session_date: Option<Timestamp>,
    pub employee: PartySubmission,
    pub manager: PartySubmission,
    /// Defaults to the current registry.
    pub categories: Option<Vec<Category>>,
}

/// Handler for storing completed sessions.
pub struct RecordSessionHandler {
    store: Arc<dyn SessionStore>,
    registry: CategoryRegistry,
}

impl RecordSessionHandler {
    pub fn new(store: Arc<dyn SessionStore>, registry: CategoryRegistry) -> Self {
        Self { store, registry }
    }

    pub async fn handle(&self, cmd: RecordSessionCommand) -> Result<SessionRecord, DomainError> {
        let manager_name = required("manager_name", &cmd.manager_name)?;
        let employee_name = required("employee_name", &cmd.employee_name)?;

        // Validates names, order and uniqueness of a supplied snapshot.
        let categories = match cmd.categories {
            Some(categories) => CategoryRegistry::new(categories)?.snapshot(),
            None => self.registry.snapshot(),
        };

        let record = SessionRecord::new(
            manager_name,
            employee_name,
            cmd.session_date.unwrap_or_else(Timestamp::now),
            cmd.employee,
            cmd.manager,
            categories,
        );
        self.store.save(&record).await?;

        info!(record_id = %record.id(), "Session record stored");
        Ok(record)
    }
}

fn required(field: &str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::empty_field(field));
    }
    Ok(trimmed.to_string())
}

/// Query for stored sessions, optionally restricted to one pair of people.
#[derive(Debug, Clone, Default)]
pub struct ListSessionsQuery {
    pub pair: Option<(String, String)>,
}

/// Handler for listing stored sessions, newest first.
pub struct ListSessionsHandler {
    store: Arc<dyn SessionStore>,
}

impl ListSessionsHandler {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, query: ListSessionsQuery) -> Result<Vec<SessionRecord>, DomainError> {
        let records = match &query.pair {
            Some((a, b)) => self.store.list_by_pair(a, b).await?,
            None => self.store.list_all().await?,
        };
        Ok(records)
    }
}
