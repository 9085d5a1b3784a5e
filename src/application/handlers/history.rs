//! History handlers - pair overviews and per-category trends.

use serde::Serialize;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, ValidationError};
use crate::domain::history::{
    group_by_pair, per_category_trend, PairLabel, SessionSummary, TrendOutcome, TrendPoint,
    MIN_TREND_SESSIONS,
};
use crate::ports::SessionStore;

/// One manager/employee relationship in the history view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairOverview {
    pub manager: String,
    pub employee: String,
    pub display: String,
    /// Oldest first.
    pub sessions: Vec<SessionSummary>,
    pub trend_available: bool,
}

/// Handler listing every relationship with its per-session averages.
pub struct GetHistoryHandler {
    store: Arc<dyn SessionStore>,
}

impl GetHistoryHandler {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self) -> Result<Vec<PairOverview>, DomainError> {
        let records = self.store.list_all().await?;
        Ok(group_by_pair(records)
            .into_iter()
            .map(|(label, history)| PairOverview {
                manager: label.manager,
                employee: label.employee,
                trend_available: history.len() >= MIN_TREND_SESSIONS,
                sessions: history.summaries(),
                display: history.display,
            })
            .collect())
    }
}

/// Query for one category's trend within one relationship.
#[derive(Debug, Clone)]
pub struct CategoryTrendQuery {
    pub manager_name: String,
    pub employee_name: String,
    pub category: String,
}

/// Owned form of [`TrendOutcome`] for transport.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CategoryTrend {
    InsufficientData { available: usize, required: usize },
    Series { category: String, points: Vec<TrendPoint> },
}

/// Handler producing the trend of one category for one relationship.
pub struct GetCategoryTrendHandler {
    store: Arc<dyn SessionStore>,
}

impl GetCategoryTrendHandler {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, query: CategoryTrendQuery) -> Result<CategoryTrend, DomainError> {
        if query.category.trim().is_empty() {
            return Err(ValidationError::empty_field("category").into());
        }

        let records = self
            .store
            .list_by_pair(&query.manager_name, &query.employee_name)
            .await?;

        // The store matches either orientation; trends follow recorded roles.
        let label = PairLabel::new(&query.manager_name, &query.employee_name);
        let sessions = group_by_pair(records)
            .remove(&label)
            .map(|history| history.sessions)
            .unwrap_or_default();

        let known = sessions
            .iter()
            .any(|r| r.category_order().iter().any(|c| c.name == query.category));
        if !sessions.is_empty() && !known {
            return Err(ValidationError::unknown_category(query.category).into());
        }

        Ok(match per_category_trend(&sessions, &query.category) {
            TrendOutcome::InsufficientData { available } => CategoryTrend::InsufficientData {
                available,
                required: MIN_TREND_SESSIONS,
            },
            TrendOutcome::Series(series) => CategoryTrend::Series {
                category: series.category().to_string(),
                points: series.iter().collect(),
            },
        })
    }
}
