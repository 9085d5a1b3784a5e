//! Supabase implementation of SessionStore.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::category::Category;
use crate::domain::foundation::{PartyRole, SessionRecordId, Timestamp};
use crate::domain::preparation::{normalize_name, PartySubmission};
use crate::domain::session::SessionRecord;
use crate::ports::{SessionStore, StoreError};

use super::client::{quote_filter_value, SupabaseClient, STORE_NAME};

const TABLE: &str = "sessions";

/// Row shape of the `sessions` table.
#[derive(Debug, Serialize, Deserialize)]
struct SessionRow {
    id: SessionRecordId,
    manager_name: String,
    employee_name: String,
    session_date: Timestamp,
    employee_data: PartySubmission,
    manager_data: PartySubmission,
    categories: Vec<Category>,
}

impl From<&SessionRecord> for SessionRow {
    fn from(record: &SessionRecord) -> Self {
        Self {
            id: *record.id(),
            manager_name: record.manager_name().to_string(),
            employee_name: record.employee_name().to_string(),
            session_date: *record.session_date(),
            employee_data: record.submission(PartyRole::Employee).clone(),
            manager_data: record.submission(PartyRole::Manager).clone(),
            categories: record.category_order().to_vec(),
        }
    }
}

impl From<SessionRow> for SessionRecord {
    fn from(row: SessionRow) -> Self {
        SessionRecord::reconstitute(
            row.id,
            row.manager_name,
            row.employee_name,
            row.session_date,
            row.employee_data,
            row.manager_data,
            row.categories,
        )
    }
}

/// Supabase (PostgREST) implementation of SessionStore.
#[derive(Debug, Clone)]
pub struct SupabaseSessionStore {
    client: SupabaseClient,
}

impl SupabaseSessionStore {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    async fn fetch(&self, filters: Vec<(&str, String)>) -> Result<Vec<SessionRecord>, StoreError> {
        let mut query = vec![
            ("select", "*".to_string()),
            ("order", "session_date.desc".to_string()),
        ];
        query.extend(filters);

        let rows: Vec<SessionRow> = self
            .client
            .send(self.client.get(TABLE).query(&query))
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        Ok(rows.into_iter().map(SessionRecord::from).collect())
    }
}

#[async_trait]
impl SessionStore for SupabaseSessionStore {
    fn name(&self) -> &str {
        STORE_NAME
    }

    async fn save(&self, record: &SessionRecord) -> Result<(), StoreError> {
        let request = self
            .client
            .upsert(TABLE, "id", false)
            .json(&[SessionRow::from(record)]);
        self.client.send(request).await?;
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<SessionRecord>, StoreError> {
        self.fetch(Vec::new()).await
    }

    async fn list_by_pair(&self, a: &str, b: &str) -> Result<Vec<SessionRecord>, StoreError> {
        let records = self.fetch(vec![("or", pair_filter(a, b))]).await?;
        // ilike treats `%` and `_` as wildcards and does not trim, so it may
        // over-match; the exact comparison happens here.
        Ok(records.into_iter().filter(|r| r.involves(a, b)).collect())
    }
}

/// PostgREST filter matching the two names in either role.
fn pair_filter(a: &str, b: &str) -> String {
    let (a, b) = (
        quote_filter_value(&normalize_name(a)),
        quote_filter_value(&normalize_name(b)),
    );
    format!(
        "(and(manager_name.ilike.{a},employee_name.ilike.{b}),and(manager_name.ilike.{b},employee_name.ilike.{a}))",
        a = a,
        b = b
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_filter_matches_both_orientations() {
        let filter = pair_filter("Max ", "Eve");
        assert_eq!(
            filter,
            "(and(manager_name.ilike.\"max\",employee_name.ilike.\"eve\"),and(manager_name.ilike.\"eve\",employee_name.ilike.\"max\"))"
        );
    }
}
