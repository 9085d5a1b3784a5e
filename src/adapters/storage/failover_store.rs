//! Failover Stores - Ordered chains of store adapters behind one port.
//!
//! Stores are tried in the order given (typically PostgreSQL, then Supabase,
//! then the local file store). Any error from one store moves on to the next;
//! only when every store has failed is a [`StoreError::AllFailed`] returned,
//! carrying each attempt.
//!
//! Session listings are the exception: every store is asked and the answers
//! are merged, deduplicated by record id. A session saved locally while the
//! primary store was down stays visible after the primary recovers.
//!
//! # Example
//!
//! ```ignore
//! let store = FailoverSessionStore::new(vec![
//!     Arc::new(PostgresSessionStore::new(pool)),
//!     Arc::new(FileSessionStore::new("./data")),
//! ]);
//! ```

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::domain::foundation::PartyRole;
use crate::domain::preparation::{PairingKey, PartySubmission, PreparationPair};
use crate::domain::session::SessionRecord;
use crate::ports::{sort_newest_first, PreparationStore, SessionStore, StoreAttempt, StoreError};

/// Notification that a store failed and the chain moved on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreFallback {
    pub operation: &'static str,
    pub failed_store: String,
    pub next_store: String,
    pub reason: String,
}

/// Callback for fallback notifications, e.g. to surface "saved locally only".
pub trait FallbackObserver: Send + Sync {
    fn on_fallback(&self, event: StoreFallback);
}

/// No-op observer for when fallback tracking isn't needed.
#[derive(Debug, Clone, Copy)]
pub struct NoOpFallbackObserver;

impl FallbackObserver for NoOpFallbackObserver {
    fn on_fallback(&self, _event: StoreFallback) {}
}

/// Shared bookkeeping for both chains.
struct Chain {
    attempts: Vec<StoreAttempt>,
    operation: &'static str,
}

impl Chain {
    fn new(operation: &'static str) -> Self {
        Self {
            attempts: Vec::new(),
            operation,
        }
    }

    fn record_failure(
        &mut self,
        store: &str,
        next: Option<&str>,
        err: &StoreError,
        observer: &dyn FallbackObserver,
    ) {
        match next {
            Some(next) => {
                warn!(
                    operation = self.operation,
                    store,
                    next,
                    error = %err,
                    "Store failed, falling back"
                );
                observer.on_fallback(StoreFallback {
                    operation: self.operation,
                    failed_store: store.to_string(),
                    next_store: next.to_string(),
                    reason: err.to_string(),
                });
            }
            None => warn!(operation = self.operation, store, error = %err, "Last store failed"),
        }
        self.attempts.push(StoreAttempt {
            store: store.to_string(),
            error: err.to_string(),
        });
    }

    fn exhausted(self) -> StoreError {
        error!(
            operation = self.operation,
            attempts = self.attempts.len(),
            "Every store in the chain failed"
        );
        StoreError::AllFailed {
            attempts: self.attempts,
        }
    }
}

/// Preparation store that tries each configured store in order.
pub struct FailoverPreparationStore {
    stores: Vec<Arc<dyn PreparationStore>>,
    observer: Arc<dyn FallbackObserver>,
}

impl FailoverPreparationStore {
    pub fn new(stores: Vec<Arc<dyn PreparationStore>>) -> Self {
        Self {
            stores,
            observer: Arc::new(NoOpFallbackObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn FallbackObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Names of the chained stores, in order.
    pub fn store_names(&self) -> Vec<String> {
        self.stores.iter().map(|s| s.name().to_string()).collect()
    }

    fn next_name(&self, index: usize) -> Option<&str> {
        self.stores.get(index + 1).map(|s| s.name())
    }
}

#[async_trait]
impl PreparationStore for FailoverPreparationStore {
    fn name(&self) -> &str {
        "failover"
    }

    /// Succeeds on the first store that accepts the submission.
    async fn save(
        &self,
        key: &PairingKey,
        role: PartyRole,
        submission: &PartySubmission,
    ) -> Result<(), StoreError> {
        let mut chain = Chain::new("save_preparation");
        for (index, store) in self.stores.iter().enumerate() {
            match store.save(key, role, submission).await {
                Ok(()) => {
                    debug!(store = store.name(), %key, role = role.as_str(), "Preparation saved");
                    return Ok(());
                }
                Err(err) => {
                    chain.record_failure(store.name(), self.next_name(index), &err, &*self.observer)
                }
            }
        }
        Err(chain.exhausted())
    }

    /// Returns the first complete pair. If no store holds a complete pair,
    /// the first successfully loaded partial pair is returned instead.
    async fn load(&self, key: &PairingKey) -> Result<PreparationPair, StoreError> {
        let mut chain = Chain::new("load_preparation");
        let mut partial: Option<PreparationPair> = None;

        for (index, store) in self.stores.iter().enumerate() {
            match store.load(key).await {
                Ok(pair) if pair.is_complete() => {
                    debug!(store = store.name(), %key, "Complete preparation pair loaded");
                    return Ok(pair);
                }
                Ok(pair) => {
                    debug!(
                        store = store.name(),
                        %key,
                        missing = ?pair.missing_roles(),
                        "Partial preparation pair, trying next store"
                    );
                    if partial.is_none() {
                        partial = Some(pair);
                    }
                }
                Err(err) => {
                    chain.record_failure(store.name(), self.next_name(index), &err, &*self.observer)
                }
            }
        }

        partial.ok_or_else(|| chain.exhausted())
    }
}

/// Session store that tries each configured store in order.
pub struct FailoverSessionStore {
    stores: Vec<Arc<dyn SessionStore>>,
    observer: Arc<dyn FallbackObserver>,
}

impl FailoverSessionStore {
    pub fn new(stores: Vec<Arc<dyn SessionStore>>) -> Self {
        Self {
            stores,
            observer: Arc::new(NoOpFallbackObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn FallbackObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn store_names(&self) -> Vec<String> {
        self.stores.iter().map(|s| s.name().to_string()).collect()
    }

    fn next_name(&self, index: usize) -> Option<&str> {
        self.stores.get(index + 1).map(|s| s.name())
    }

    /// Merges the answers of every store that responds, newest first.
    /// Fails only when no store answered at all.
    async fn merged_listing<'a, F, Fut>(
        &'a self,
        operation: &'static str,
        call: F,
    ) -> Result<Vec<SessionRecord>, StoreError>
    where
        F: Fn(&'a dyn SessionStore) -> Fut,
        Fut: std::future::Future<Output = Result<Vec<SessionRecord>, StoreError>>,
    {
        let mut chain = Chain::new(operation);
        let mut answered = false;
        let mut seen = HashSet::new();
        let mut merged = Vec::new();

        for (index, store) in self.stores.iter().enumerate() {
            match call(store.as_ref()).await {
                Ok(records) => {
                    answered = true;
                    debug!(store = store.name(), count = records.len(), operation, "Sessions listed");
                    merged.extend(records.into_iter().filter(|r| seen.insert(*r.id())));
                }
                Err(err) => {
                    chain.record_failure(store.name(), self.next_name(index), &err, &*self.observer)
                }
            }
        }

        if !answered {
            return Err(chain.exhausted());
        }
        sort_newest_first(&mut merged);
        Ok(merged)
    }
}

#[async_trait]
impl SessionStore for FailoverSessionStore {
    fn name(&self) -> &str {
        "failover"
    }

    async fn save(&self, record: &SessionRecord) -> Result<(), StoreError> {
        let mut chain = Chain::new("save_session");
        for (index, store) in self.stores.iter().enumerate() {
            match store.save(record).await {
                Ok(()) => {
                    debug!(store = store.name(), record_id = %record.id(), "Session saved");
                    return Ok(());
                }
                Err(err) => {
                    chain.record_failure(store.name(), self.next_name(index), &err, &*self.observer)
                }
            }
        }
        Err(chain.exhausted())
    }

    async fn list_all(&self) -> Result<Vec<SessionRecord>, StoreError> {
        self.merged_listing("list_sessions", |store| store.list_all())
            .await
    }

    async fn list_by_pair(&self, a: &str, b: &str) -> Result<Vec<SessionRecord>, StoreError> {
        self.merged_listing("list_sessions_by_pair", |store| store.list_by_pair(a, b))
            .await
    }
}
