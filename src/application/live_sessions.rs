//! Live session registry.
//!
//! Each live reveal session gets its own [`SessionEngine`], owned here and
//! addressed by a [`LiveSessionId`]. Engines are independent: concurrent
//! sessions for different pairs never share state. Calls on one engine are
//! serialized by its own lock, and the engine itself rejects out-of-order
//! calls, so a duplicated client request fails instead of skipping ahead.
//!
//! A completed record stays here until a store confirms it. Closing a
//! session whose record has not been saved is refused.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::domain::category::CategoryRegistry;
use crate::domain::foundation::{LiveSessionId, ValidationError};
use crate::domain::preparation::PairingKey;
use crate::domain::report::SessionReport;
use crate::domain::session::{
    AdvanceOutcome, CategoryComparison, RevealedEntry, SessionEngine, SessionError,
    SessionRecord, SessionSnapshot,
};
use crate::ports::{PreparationStore, SessionStore};

/// Command to open a live session for a manager and an employee.
#[derive(Debug, Clone)]
pub struct StartLiveSessionCommand {
    pub manager_name: String,
    pub employee_name: String,
}

/// Registry of live sessions.
pub struct LiveSessions {
    engines: RwLock<HashMap<LiveSessionId, Arc<Mutex<SessionEngine>>>>,
    preparations: Arc<dyn PreparationStore>,
    sessions: Arc<dyn SessionStore>,
    registry: CategoryRegistry,
}

impl LiveSessions {
    pub fn new(
        preparations: Arc<dyn PreparationStore>,
        sessions: Arc<dyn SessionStore>,
        registry: CategoryRegistry,
    ) -> Self {
        Self {
            engines: RwLock::new(HashMap::new()),
            preparations,
            sessions,
            registry,
        }
    }

    /// Number of sessions currently held.
    pub async fn len(&self) -> usize {
        self.engines.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.engines.read().await.is_empty()
    }

    /// Loads both preparations and starts the reveal at the first category.
    ///
    /// Nothing is registered unless the start succeeds.
    pub async fn start(
        &self,
        cmd: StartLiveSessionCommand,
    ) -> Result<(LiveSessionId, SessionSnapshot), SessionError> {
        if cmd.manager_name.trim().is_empty() {
            return Err(ValidationError::empty_field("manager_name").into());
        }
        if cmd.employee_name.trim().is_empty() {
            return Err(ValidationError::empty_field("employee_name").into());
        }

        let mut engine = SessionEngine::new(self.registry.clone());
        engine.begin_loading(&cmd.manager_name, &cmd.employee_name)?;

        let key = PairingKey::new(&cmd.manager_name, &cmd.employee_name);
        let pair = match self.preparations.load(&key).await {
            Ok(pair) => pair,
            Err(err) => {
                engine.abandon()?;
                return Err(err.into());
            }
        };
        engine.start(pair)?;

        let id = LiveSessionId::new();
        let snapshot = engine.snapshot();
        self.engines
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(engine)));

        info!(live_session_id = %id, %key, "Live session started");
        Ok((id, snapshot))
    }

    pub async fn snapshot(&self, id: LiveSessionId) -> Result<SessionSnapshot, SessionError> {
        let engine = self.engine(id).await?;
        let engine = engine.lock().await;
        Ok(engine.snapshot())
    }

    pub async fn reveal_employee(&self, id: LiveSessionId) -> Result<RevealedEntry, SessionError> {
        let engine = self.engine(id).await?;
        let mut engine = engine.lock().await;
        engine.reveal_employee()
    }

    pub async fn reveal_manager(&self, id: LiveSessionId) -> Result<CategoryComparison, SessionError> {
        let engine = self.engine(id).await?;
        let mut engine = engine.lock().await;
        engine.reveal_manager()
    }

    pub async fn advance(&self, id: LiveSessionId) -> Result<AdvanceOutcome, SessionError> {
        let engine = self.engine(id).await?;
        let mut engine = engine.lock().await;
        engine.advance()
    }

    /// Saves the completed record through the session store.
    ///
    /// On failure the record stays in the engine and the call can be
    /// retried. Saving an already saved session returns the record again.
    pub async fn persist(&self, id: LiveSessionId) -> Result<SessionRecord, SessionError> {
        let engine = self.engine(id).await?;
        let mut engine = engine.lock().await;

        let record = engine
            .record()
            .cloned()
            .ok_or_else(|| SessionError::invalid_state("save", engine.state_name()))?;
        if engine.is_persisted() {
            debug!(live_session_id = %id, "Session already saved");
            return Ok(record);
        }

        if let Err(err) = self.sessions.save(&record).await {
            warn!(
                live_session_id = %id,
                record_id = %record.id(),
                error = %err,
                "Saving session failed, record kept for retry"
            );
            return Err(err.into());
        }

        engine.mark_persisted()?;
        info!(live_session_id = %id, record_id = %record.id(), "Session saved");
        Ok(record)
    }

    /// Report of a completed session, saved or not.
    pub async fn report(&self, id: LiveSessionId) -> Result<SessionReport, SessionError> {
        let engine = self.engine(id).await?;
        let engine = engine.lock().await;
        engine
            .record()
            .map(SessionReport::from_record)
            .ok_or_else(|| SessionError::invalid_state("export report", engine.state_name()))
    }

    /// Abandons an in-progress session, or releases a saved one.
    ///
    /// A completed session whose record has not been saved is kept and the
    /// call fails, so no completed record is ever dropped unsaved.
    pub async fn close(&self, id: LiveSessionId) -> Result<(), SessionError> {
        let engine = self.engine(id).await?;
        {
            let mut engine = engine.lock().await;
            if !engine.is_persisted() {
                engine.abandon()?;
            }
        }
        self.engines.write().await.remove(&id);
        debug!(live_session_id = %id, "Live session closed");
        Ok(())
    }

    async fn engine(&self, id: LiveSessionId) -> Result<Arc<Mutex<SessionEngine>>, SessionError> {
        self.engines
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(SessionError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::{InMemoryPreparationStore, InMemorySessionStore};
    use crate::domain::category::Category;
    use crate::domain::foundation::{Alignment, PartyRole, Rating};
    use crate::domain::preparation::PartySubmission;
    use crate::ports::StoreError;
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Session store that fails until switched on.
    #[derive(Default)]
    struct FlakySessionStore {
        inner: InMemorySessionStore,
        healthy: AtomicBool,
    }

    #[async_trait]
    impl SessionStore for FlakySessionStore {
        fn name(&self) -> &str {
            "flaky"
        }
        async fn save(&self, record: &SessionRecord) -> Result<(), StoreError> {
            if !self.healthy.load(Ordering::SeqCst) {
                return Err(StoreError::unavailable("flaky", "offline"));
            }
            self.inner.save(record).await
        }
        async fn list_all(&self) -> Result<Vec<SessionRecord>, StoreError> {
            self.inner.list_all().await
        }
        async fn list_by_pair(&self, a: &str, b: &str) -> Result<Vec<SessionRecord>, StoreError> {
            self.inner.list_by_pair(a, b).await
        }
    }

    fn registry() -> CategoryRegistry {
        CategoryRegistry::new(vec![Category::new("A", "a"), Category::new("B", "b")]).unwrap()
    }

    fn submission(name: &str, partner: &str, ratings: &[(&str, u8)]) -> PartySubmission {
        let ratings = ratings
            .iter()
            .map(|(c, v)| (c.to_string(), Rating::try_from_u8(*v).unwrap()))
            .collect();
        PartySubmission::new(name, partner, ratings, BTreeMap::new()).unwrap()
    }

    async fn preparations(with_manager: bool) -> Arc<InMemoryPreparationStore> {
        let store = Arc::new(InMemoryPreparationStore::new());
        let employee = submission("Eve", "Max", &[("A", 4), ("B", 2)]);
        store
            .save(&employee.pairing_key(), PartyRole::Employee, &employee)
            .await
            .unwrap();
        if with_manager {
            let manager = submission("Max", "Eve", &[("A", 4), ("B", 5)]);
            store
                .save(&manager.pairing_key(), PartyRole::Manager, &manager)
                .await
                .unwrap();
        }
        store
    }

    fn start_cmd() -> StartLiveSessionCommand {
        StartLiveSessionCommand {
            manager_name: "Max".into(),
            employee_name: "Eve".into(),
        }
    }

    async fn run_to_completion(live: &LiveSessions, id: LiveSessionId) {
        for _ in 0..2 {
            live.reveal_employee(id).await.unwrap();
            live.reveal_manager(id).await.unwrap();
            live.advance(id).await.unwrap();
        }
    }

    #[tokio::test]
    async fn start_fails_without_manager_and_registers_nothing() {
        let live = LiveSessions::new(
            preparations(false).await,
            Arc::new(InMemorySessionStore::new()),
            registry(),
        );
        let err = live.start(start_cmd()).await.unwrap_err();
        assert!(matches!(err, SessionError::IncompleteData { .. }));
        assert!(live.is_empty().await);
    }

    #[tokio::test]
    async fn reveal_flow_and_persist() {
        let sessions = Arc::new(InMemorySessionStore::new());
        let live = LiveSessions::new(preparations(true).await, sessions.clone(), registry());
        let (id, _) = live.start(start_cmd()).await.unwrap();

        assert!(matches!(
            live.reveal_manager(id).await,
            Err(SessionError::InvalidState { .. })
        ));
        live.reveal_employee(id).await.unwrap();
        let comparison = live.reveal_manager(id).await.unwrap();
        assert_eq!(comparison.alignment, Alignment::Perfect);
        live.advance(id).await.unwrap();
        live.reveal_employee(id).await.unwrap();
        assert_eq!(live.reveal_manager(id).await.unwrap().alignment, Alignment::Large);
        assert!(matches!(
            live.advance(id).await.unwrap(),
            AdvanceOutcome::Completed(_)
        ));

        let report = live.report(id).await.unwrap();
        assert_eq!(report.employee_average, 3.0);
        assert_eq!(report.manager_average, 4.5);

        let record = live.persist(id).await.unwrap();
        assert_eq!(sessions.record_count().await, 1);
        // Saving twice is harmless.
        assert_eq!(live.persist(id).await.unwrap(), record);
        assert_eq!(sessions.record_count().await, 1);

        live.close(id).await.unwrap();
        assert!(matches!(
            live.snapshot(id).await,
            Err(SessionError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn failed_persist_keeps_record_for_retry() {
        let sessions = Arc::new(FlakySessionStore::default());
        let live = LiveSessions::new(preparations(true).await, sessions.clone(), registry());
        let (id, _) = live.start(start_cmd()).await.unwrap();
        run_to_completion(&live, id).await;

        let err = live.persist(id).await.unwrap_err();
        assert!(matches!(err, SessionError::Store(_)));
        // Closing now would drop an unsaved record.
        assert!(live.close(id).await.is_err());
        assert_eq!(live.len().await, 1);

        sessions.healthy.store(true, Ordering::SeqCst);
        live.persist(id).await.unwrap();
        assert_eq!(sessions.inner.record_count().await, 1);
        live.close(id).await.unwrap();
        assert!(live.is_empty().await);
    }

    #[tokio::test]
    async fn persist_before_completion_is_invalid() {
        let live = LiveSessions::new(
            preparations(true).await,
            Arc::new(InMemorySessionStore::new()),
            registry(),
        );
        let (id, _) = live.start(start_cmd()).await.unwrap();
        assert!(matches!(
            live.persist(id).await,
            Err(SessionError::InvalidState { .. })
        ));
        assert!(matches!(
            live.report(id).await,
            Err(SessionError::InvalidState { .. })
        ));
    }

    #[tokio::test]
    async fn close_abandons_in_progress_session() {
        let sessions = Arc::new(InMemorySessionStore::new());
        let live = LiveSessions::new(preparations(true).await, sessions.clone(), registry());
        let (id, _) = live.start(start_cmd()).await.unwrap();
        live.reveal_employee(id).await.unwrap();

        live.close(id).await.unwrap();
        assert!(live.is_empty().await);
        assert_eq!(sessions.record_count().await, 0);
    }

    #[tokio::test]
    async fn sessions_are_independent() {
        let live = LiveSessions::new(
            preparations(true).await,
            Arc::new(InMemorySessionStore::new()),
            registry(),
        );
        let (first, _) = live.start(start_cmd()).await.unwrap();
        let (second, _) = live.start(start_cmd()).await.unwrap();

        live.reveal_employee(first).await.unwrap();
        // The second session is still at the start of its first category.
        live.reveal_employee(second).await.unwrap();
        assert!(live.reveal_employee(first).await.is_err());
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let live = LiveSessions::new(
            Arc::new(InMemoryPreparationStore::new()),
            Arc::new(InMemorySessionStore::new()),
            registry(),
        );
        assert!(matches!(
            live.advance(LiveSessionId::new()).await,
            Err(SessionError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn blank_names_are_rejected() {
        let live = LiveSessions::new(
            Arc::new(InMemoryPreparationStore::new()),
            Arc::new(InMemorySessionStore::new()),
            registry(),
        );
        let err = live
            .start(StartLiveSessionCommand {
                manager_name: " ".into(),
                employee_name: "Eve".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Validation(_)));
    }
}
