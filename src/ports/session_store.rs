//! Session Store Port - Persistence for completed session records.

use async_trait::async_trait;

use crate::domain::session::SessionRecord;

use super::StoreError;

/// Port for persisting and listing completed sessions.
///
/// # Contract
///
/// - `save` stores a record under its own id. Saving the same id twice
///   replaces the earlier copy, so a retried save never duplicates history.
/// - `list_all` is ordered by session date, newest first.
/// - `list_by_pair` matches the two names in either role, compared after
///   trimming and ignoring case, newest first.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Short name used in logs and aggregate errors.
    fn name(&self) -> &str;

    async fn save(&self, record: &SessionRecord) -> Result<(), StoreError>;

    async fn list_all(&self) -> Result<Vec<SessionRecord>, StoreError>;

    async fn list_by_pair(&self, a: &str, b: &str) -> Result<Vec<SessionRecord>, StoreError>;
}

/// Sorts records newest first. Shared by adapters that cannot sort natively.
pub fn sort_newest_first(records: &mut [SessionRecord]) {
    records.sort_by(|a, b| b.session_date().cmp(a.session_date()));
}
