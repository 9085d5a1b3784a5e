//! Reveal session engine.
//!
//! One engine instance drives one live session:
//!
//! ```text
//! Idle ─begin_loading─> Loading ─start─> Active(index, phase) ─advance (last)─> Completed
//!   └──────────────start──────────────────┘
//! ```
//!
//! Inside `Active` every category walks `NotRevealed -> EmployeeRevealed ->
//! BothRevealed`. Out-of-order calls are rejected with
//! [`SessionError::InvalidState`] rather than ignored, so a duplicated UI
//! event can never skip the employee-first ordering.
//!
//! The engine is owned by its caller. Nothing here is shared or global.

use serde::Serialize;
use tracing::{debug, info};

use crate::domain::category::{Category, CategoryRegistry};
use crate::domain::foundation::{PartyRole, StateMachine, Timestamp};
use crate::domain::preparation::{PartySubmission, PreparationPair};

use super::errors::SessionError;
use super::record::SessionRecord;
use super::reveal::{CategoryComparison, RevealPhase, RevealState, RevealedEntry};

#[derive(Debug, Clone)]
enum SessionState {
    Idle,
    Loading {
        manager_name: String,
        employee_name: String,
    },
    Active(Box<ActiveSession>),
    Completed { record: SessionRecord, persisted: bool },
}

#[derive(Debug, Clone)]
struct ActiveSession {
    manager_name: String,
    employee_name: String,
    employee: PartySubmission,
    manager: PartySubmission,
    categories: Vec<Category>,
    started_at: Timestamp,
    reveal: RevealState,
}

impl ActiveSession {
    fn current_category(&self) -> &Category {
        // index < categories.len() holds while Active; advance() completes
        // before it could run past the end.
        &self.categories[self.reveal.current_category_index]
    }

    fn employee_entry(&self) -> RevealedEntry {
        RevealedEntry::from_submission(
            PartyRole::Employee,
            &self.employee,
            &self.current_category().name,
        )
    }

    fn comparison(&self) -> CategoryComparison {
        let category = self.current_category();
        CategoryComparison::new(
            category.clone(),
            self.employee_entry(),
            RevealedEntry::from_submission(PartyRole::Manager, &self.manager, &category.name),
        )
    }
}

/// Result of [`SessionEngine::advance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Moved on to the category at this index.
    NextCategory { index: usize },
    /// The last category was done; the record is now held by the engine.
    Completed(SessionRecord),
}

/// Read-only view of the engine for renderers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionSnapshot {
    Idle,
    Loading {
        manager_name: String,
        employee_name: String,
    },
    Active(ActiveView),
    Completed {
        record: SessionRecord,
        persisted: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveView {
    pub manager_name: String,
    pub employee_name: String,
    pub category: Category,
    pub category_index: usize,
    pub category_count: usize,
    pub phase: RevealPhase,
    /// Present once the employee has been revealed.
    pub employee: Option<RevealedEntry>,
    /// Present once both parties have been revealed.
    pub comparison: Option<CategoryComparison>,
}

/// State machine for one live reveal session.
#[derive(Debug, Clone)]
pub struct SessionEngine {
    registry: CategoryRegistry,
    state: SessionState,
}

impl SessionEngine {
    pub fn new(registry: CategoryRegistry) -> Self {
        Self {
            registry,
            state: SessionState::Idle,
        }
    }

    pub fn registry(&self) -> &CategoryRegistry {
        &self.registry
    }

    /// Short name of the current state, used in error messages.
    pub fn state_name(&self) -> String {
        match &self.state {
            SessionState::Idle => "idle".to_string(),
            SessionState::Loading { .. } => "loading".to_string(),
            SessionState::Active(active) => format!("active ({})", active.reveal.phase),
            SessionState::Completed { .. } => "completed".to_string(),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.state, SessionState::Completed { .. })
    }

    /// Current reveal cursor, only while active.
    pub fn reveal_state(&self) -> Option<RevealState> {
        match &self.state {
            SessionState::Active(active) => Some(active.reveal),
            _ => None,
        }
    }

    /// Marks that preparations for this pairing are being fetched.
    ///
    /// The names are the role labels recorded on the finished session.
    pub fn begin_loading(
        &mut self,
        manager_name: &str,
        employee_name: &str,
    ) -> Result<(), SessionError> {
        if !matches!(self.state, SessionState::Idle) {
            return Err(self.invalid("begin loading"));
        }

        debug!(manager = manager_name, employee = employee_name, "Loading preparations");
        self.state = SessionState::Loading {
            manager_name: manager_name.trim().to_string(),
            employee_name: employee_name.trim().to_string(),
        };
        Ok(())
    }

    /// Starts the reveal at the first category.
    ///
    /// Valid from `Idle` or `Loading`. A pair missing either role fails with
    /// [`SessionError::IncompleteData`] and leaves the engine `Idle`.
    pub fn start(&mut self, pair: PreparationPair) -> Result<(), SessionError> {
        let labels = match &self.state {
            SessionState::Idle => None,
            SessionState::Loading {
                manager_name,
                employee_name,
            } => Some((manager_name.clone(), employee_name.clone())),
            _ => return Err(self.invalid("start")),
        };

        let (employee, manager) = match (pair.employee, pair.manager) {
            (Some(employee), Some(manager)) => (employee, manager),
            (employee, manager) => {
                self.state = SessionState::Idle;
                let missing = [
                    (PartyRole::Employee, employee.is_none()),
                    (PartyRole::Manager, manager.is_none()),
                ]
                .into_iter()
                .filter_map(|(role, absent)| absent.then_some(role))
                .collect();
                return Err(SessionError::incomplete(missing));
            }
        };

        let (manager_name, employee_name) =
            labels.unwrap_or_else(|| (manager.name.clone(), employee.name.clone()));

        debug!(
            manager = %manager_name,
            employee = %employee_name,
            categories = self.registry.len(),
            "Session started"
        );

        self.state = SessionState::Active(Box::new(ActiveSession {
            manager_name,
            employee_name,
            employee,
            manager,
            categories: self.registry.snapshot(),
            started_at: Timestamp::now(),
            reveal: RevealState::default(),
        }));
        Ok(())
    }

    /// Discloses the employee's rating and comment for the current category.
    pub fn reveal_employee(&mut self) -> Result<RevealedEntry, SessionError> {
        let active = self.active_in_phase("reveal employee", RevealPhase::EmployeeRevealed)?;
        active.reveal.phase = RevealPhase::EmployeeRevealed;
        debug!(
            category = %active.current_category().name,
            "Employee revealed"
        );
        Ok(active.employee_entry())
    }

    /// Discloses the manager's side and the alignment for the current category.
    pub fn reveal_manager(&mut self) -> Result<CategoryComparison, SessionError> {
        let active = self.active_in_phase("reveal manager", RevealPhase::BothRevealed)?;
        active.reveal.phase = RevealPhase::BothRevealed;
        let comparison = active.comparison();
        debug!(
            category = %comparison.category.name,
            alignment = ?comparison.alignment,
            "Manager revealed"
        );
        Ok(comparison)
    }

    /// Moves to the next category, or completes the session after the last.
    pub fn advance(&mut self) -> Result<AdvanceOutcome, SessionError> {
        let active = self.active_in_phase("advance", RevealPhase::NotRevealed)?;

        let next = active.reveal.current_category_index + 1;
        if next < active.categories.len() {
            active.reveal = RevealState {
                current_category_index: next,
                phase: RevealPhase::NotRevealed,
            };
            debug!(index = next, "Advanced to next category");
            return Ok(AdvanceOutcome::NextCategory { index: next });
        }

        self.complete()
    }

    /// Freezes the active session into its record.
    fn complete(&mut self) -> Result<AdvanceOutcome, SessionError> {
        let active = match std::mem::replace(&mut self.state, SessionState::Idle) {
            SessionState::Active(active) => *active,
            other => {
                self.state = other;
                return Err(self.invalid("advance"));
            }
        };
        let record = SessionRecord::new(
            active.manager_name,
            active.employee_name,
            active.started_at,
            active.employee,
            active.manager,
            active.categories,
        );

        info!(
            record_id = %record.id(),
            manager = record.manager_name(),
            employee = record.employee_name(),
            "Session completed"
        );

        self.state = SessionState::Completed {
            record: record.clone(),
            persisted: false,
        };
        Ok(AdvanceOutcome::Completed(record))
    }

    /// Drops any in-progress session without persisting anything.
    ///
    /// Valid from every state except `Completed`.
    pub fn abandon(&mut self) -> Result<(), SessionError> {
        if self.is_completed() {
            return Err(self.invalid("abandon"));
        }
        if !matches!(self.state, SessionState::Idle) {
            debug!(state = %self.state_name(), "Session abandoned");
        }
        self.state = SessionState::Idle;
        Ok(())
    }

    /// The finished record, kept until a store confirms it.
    pub fn record(&self) -> Option<&SessionRecord> {
        match &self.state {
            SessionState::Completed { record, .. } => Some(record),
            _ => None,
        }
    }

    pub fn is_persisted(&self) -> bool {
        matches!(self.state, SessionState::Completed { persisted: true, .. })
    }

    /// Records that a store accepted the completed record.
    pub fn mark_persisted(&mut self) -> Result<(), SessionError> {
        if let SessionState::Completed { persisted, .. } = &mut self.state {
            *persisted = true;
            return Ok(());
        }
        Err(self.invalid("mark persisted"))
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        match &self.state {
            SessionState::Idle => SessionSnapshot::Idle,
            SessionState::Loading {
                manager_name,
                employee_name,
            } => SessionSnapshot::Loading {
                manager_name: manager_name.clone(),
                employee_name: employee_name.clone(),
            },
            SessionState::Active(active) => SessionSnapshot::Active(ActiveView {
                manager_name: active.manager_name.clone(),
                employee_name: active.employee_name.clone(),
                category: active.current_category().clone(),
                category_index: active.reveal.current_category_index,
                category_count: active.categories.len(),
                phase: active.reveal.phase,
                employee: active
                    .reveal
                    .employee_revealed()
                    .then(|| active.employee_entry()),
                comparison: active.reveal.manager_revealed().then(|| active.comparison()),
            }),
            SessionState::Completed { record, persisted } => SessionSnapshot::Completed {
                record: record.clone(),
                persisted: *persisted,
            },
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Private helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the active session if its phase may move to `target`.
    fn active_in_phase(
        &mut self,
        operation: &'static str,
        target: RevealPhase,
    ) -> Result<&mut ActiveSession, SessionError> {
        let state = self.state_name();
        match &mut self.state {
            SessionState::Active(active) if active.reveal.phase.can_transition_to(&target) => {
                Ok(active)
            }
            _ => Err(SessionError::invalid_state(operation, state)),
        }
    }

    fn invalid(&self, operation: &'static str) -> SessionError {
        SessionError::invalid_state(operation, self.state_name())
    }
}

impl Default for SessionEngine {
    fn default() -> Self {
        Self::new(CategoryRegistry::standard())
    }
}
