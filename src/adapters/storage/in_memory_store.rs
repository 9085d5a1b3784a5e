//! In-Memory Store Adapters
//!
//! Keep preparations and session records in memory.
//! Useful for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{PartyRole, SessionRecordId};
use crate::domain::preparation::{PairingKey, PartySubmission, PreparationPair};
use crate::domain::session::SessionRecord;
use crate::ports::{sort_newest_first, PreparationStore, SessionStore, StoreError};

/// In-memory preparation storage keyed by `(PairingKey, PartyRole)`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPreparationStore {
    submissions: Arc<RwLock<HashMap<(PairingKey, PartyRole), PartySubmission>>>,
}

impl InMemoryPreparationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored submissions across all pairings.
    pub async fn submission_count(&self) -> usize {
        self.submissions.read().await.len()
    }
}

#[async_trait]
impl PreparationStore for InMemoryPreparationStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn save(
        &self,
        key: &PairingKey,
        role: PartyRole,
        submission: &PartySubmission,
    ) -> Result<(), StoreError> {
        let mut submissions = self.submissions.write().await;
        submissions.insert((key.clone(), role), submission.clone());
        Ok(())
    }

    async fn load(&self, key: &PairingKey) -> Result<PreparationPair, StoreError> {
        let submissions = self.submissions.read().await;
        let mut pair = PreparationPair::empty();
        for role in PartyRole::ALL {
            if let Some(submission) = submissions.get(&(key.clone(), role)) {
                pair.set(role, submission.clone());
            }
        }
        Ok(pair)
    }
}

/// In-memory session storage keyed by record id.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    records: Arc<RwLock<HashMap<SessionRecordId, SessionRecord>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record_count(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn save(&self, record: &SessionRecord) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        records.insert(*record.id(), record.clone());
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<SessionRecord>, StoreError> {
        let mut all: Vec<_> = self.records.read().await.values().cloned().collect();
        sort_newest_first(&mut all);
        Ok(all)
    }

    async fn list_by_pair(&self, a: &str, b: &str) -> Result<Vec<SessionRecord>, StoreError> {
        let mut matching: Vec<_> = self
            .records
            .read()
            .await
            .values()
            .filter(|r| r.involves(a, b))
            .cloned()
            .collect();
        sort_newest_first(&mut matching);
        Ok(matching)
    }
}
