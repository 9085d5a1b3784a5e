//! History and trend aggregation over completed sessions.
//!
//! Everything here is a pure function of a set of [`SessionRecord`]s. Sessions
//! are grouped by their recorded roles: "Max & Eve" (Max managing Eve) and
//! "Eve & Max" are different relationships and never merged.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::foundation::{rating, PartyRole, Rating, SessionRecordId, Timestamp};
use crate::domain::preparation::normalize_name;
use crate::domain::session::SessionRecord;

/// Number of sessions needed before a trend is meaningful.
pub const MIN_TREND_SESSIONS: usize = 2;

/// Grouping key for a manager/employee relationship.
///
/// Holds normalized names, so "Max" and " max" group together, while the
/// manager and employee slots are never swapped.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PairLabel {
    pub manager: String,
    pub employee: String,
}

impl PairLabel {
    pub fn new(manager_name: &str, employee_name: &str) -> Self {
        Self {
            manager: normalize_name(manager_name),
            employee: normalize_name(employee_name),
        }
    }

    pub fn of(record: &SessionRecord) -> Self {
        Self::new(record.manager_name(), record.employee_name())
    }
}

/// All sessions of one relationship, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairHistory {
    /// Display label with the names as first recorded, e.g. "Max & Eve".
    pub display: String,
    pub sessions: Vec<SessionRecord>,
}

impl PairHistory {
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn trend<'a>(&'a self, category: &'a str) -> TrendOutcome<'a> {
        per_category_trend(&self.sessions, category)
    }

    /// Per-session averages, oldest first.
    pub fn summaries(&self) -> Vec<SessionSummary> {
        self.sessions.iter().map(SessionSummary::of).collect()
    }
}

/// Groups sessions by recorded (manager, employee), each group sorted by
/// ascending session date.
pub fn group_by_pair<I>(sessions: I) -> BTreeMap<PairLabel, PairHistory>
where
    I: IntoIterator<Item = SessionRecord>,
{
    let mut groups: BTreeMap<PairLabel, PairHistory> = BTreeMap::new();
    for record in sessions {
        groups
            .entry(PairLabel::of(&record))
            .or_insert_with(|| PairHistory {
                display: display_label(&record),
                sessions: Vec::new(),
            })
            .sessions
            .push(record);
    }

    for history in groups.values_mut() {
        history
            .sessions
            .sort_by(|a, b| a.session_date().cmp(b.session_date()));
    }
    groups
}

fn display_label(record: &SessionRecord) -> String {
    format!("{} & {}", record.manager_name(), record.employee_name())
}

/// One session's ratings for a single category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub date: Timestamp,
    pub employee_rating: Option<Rating>,
    pub manager_rating: Option<Rating>,
}

/// Lazy per-category series over a borrowed, date-ascending slice.
///
/// Iterating twice yields the same points.
#[derive(Debug, Clone, Copy)]
pub struct TrendSeries<'a> {
    sessions: &'a [SessionRecord],
    category: &'a str,
}

impl<'a> TrendSeries<'a> {
    pub fn category(&self) -> &'a str {
        self.category
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = TrendPoint> + 'a {
        let category = self.category;
        self.sessions.iter().map(move |record| TrendPoint {
            date: *record.session_date(),
            employee_rating: record.rating(PartyRole::Employee, category),
            manager_rating: record.rating(PartyRole::Manager, category),
        })
    }
}

impl<'a> IntoIterator for &TrendSeries<'a> {
    type Item = TrendPoint;
    type IntoIter = Box<dyn Iterator<Item = TrendPoint> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

/// Result of a trend request.
#[derive(Debug, Clone, Copy)]
pub enum TrendOutcome<'a> {
    /// Fewer than [`MIN_TREND_SESSIONS`] sessions.
    InsufficientData { available: usize },
    Series(TrendSeries<'a>),
}

impl<'a> TrendOutcome<'a> {
    pub fn series(self) -> Option<TrendSeries<'a>> {
        match self {
            TrendOutcome::Series(series) => Some(series),
            TrendOutcome::InsufficientData { .. } => None,
        }
    }
}

/// Builds the trend of one category across sessions ordered oldest first.
///
/// Absent ratings stay absent; nothing is interpolated.
pub fn per_category_trend<'a>(sessions: &'a [SessionRecord], category: &'a str) -> TrendOutcome<'a> {
    if sessions.len() < MIN_TREND_SESSIONS {
        return TrendOutcome::InsufficientData {
            available: sessions.len(),
        };
    }
    TrendOutcome::Series(TrendSeries { sessions, category })
}

/// Presence-aware average of one role's ratings in a session.
///
/// `0.0` when the role rated nothing.
pub fn session_average(record: &SessionRecord, role: PartyRole) -> f64 {
    rating::average(record.ratings_for(role))
}

/// Averages of one session, as listed in the history view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: SessionRecordId,
    pub date: Timestamp,
    pub employee_average: f64,
    pub manager_average: f64,
    pub employee_rated: usize,
    pub manager_rated: usize,
}

impl SessionSummary {
    pub fn of(record: &SessionRecord) -> Self {
        Self {
            id: *record.id(),
            date: *record.session_date(),
            employee_average: session_average(record, PartyRole::Employee),
            manager_average: session_average(record, PartyRole::Manager),
            employee_rated: rating::present_count(record.ratings_for(PartyRole::Employee)),
            manager_rated: rating::present_count(record.ratings_for(PartyRole::Manager)),
        }
    }
}
