//! Completed session record.
//!
//! The record is the unit of history. It is created once, when the last
//! category has been revealed, and never modified afterwards. It carries its
//! own copy of the category order so that it stays readable if the registry
//! changes later.

use serde::{Deserialize, Serialize};

use crate::domain::category::Category;
use crate::domain::foundation::{PartyRole, Rating, SessionRecordId, Timestamp};
use crate::domain::preparation::{normalize_name, PartySubmission};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    id: SessionRecordId,
    manager_name: String,
    employee_name: String,
    session_date: Timestamp,
    employee_submission: PartySubmission,
    manager_submission: PartySubmission,
    category_order: Vec<Category>,
}

impl SessionRecord {
    /// Creates a record with a fresh id.
    pub fn new(
        manager_name: impl Into<String>,
        employee_name: impl Into<String>,
        session_date: Timestamp,
        employee_submission: PartySubmission,
        manager_submission: PartySubmission,
        category_order: Vec<Category>,
    ) -> Self {
        Self::reconstitute(
            SessionRecordId::new(),
            manager_name.into(),
            employee_name.into(),
            session_date,
            employee_submission,
            manager_submission,
            category_order,
        )
    }

    /// Reconstitute a record from persistence (no validation).
    pub fn reconstitute(
        id: SessionRecordId,
        manager_name: String,
        employee_name: String,
        session_date: Timestamp,
        employee_submission: PartySubmission,
        manager_submission: PartySubmission,
        category_order: Vec<Category>,
    ) -> Self {
        Self {
            id,
            manager_name,
            employee_name,
            session_date,
            employee_submission,
            manager_submission,
            category_order,
        }
    }

    pub fn id(&self) -> &SessionRecordId {
        &self.id
    }

    pub fn manager_name(&self) -> &str {
        &self.manager_name
    }

    pub fn employee_name(&self) -> &str {
        &self.employee_name
    }

    pub fn session_date(&self) -> &Timestamp {
        &self.session_date
    }

    pub fn category_order(&self) -> &[Category] {
        &self.category_order
    }

    pub fn submission(&self, role: PartyRole) -> &PartySubmission {
        match role {
            PartyRole::Employee => &self.employee_submission,
            PartyRole::Manager => &self.manager_submission,
        }
    }

    pub fn rating(&self, role: PartyRole, category: &str) -> Option<Rating> {
        self.submission(role).rating(category)
    }

    /// One entry per category in the record's own order.
    pub fn ratings_for(&self, role: PartyRole) -> impl Iterator<Item = Option<Rating>> + '_ {
        let submission = self.submission(role);
        self.category_order
            .iter()
            .map(move |c| submission.rating(&c.name))
    }

    /// True if the two names are this record's parties, in either role.
    pub fn involves(&self, a: &str, b: &str) -> bool {
        let manager = normalize_name(&self.manager_name);
        let employee = normalize_name(&self.employee_name);
        let (a, b) = (normalize_name(a), normalize_name(b));
        (manager == a && employee == b) || (manager == b && employee == a)
    }
}
