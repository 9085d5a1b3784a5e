//! Reveal phase and the views produced by each reveal step.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::category::Category;
use crate::domain::foundation::rating::{difference, distance};
use crate::domain::foundation::{Alignment, PartyRole, Rating, StateMachine};
use crate::domain::preparation::PartySubmission;

/// Per-category reveal progress. The employee is always revealed first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RevealPhase {
    #[default]
    NotRevealed,
    EmployeeRevealed,
    BothRevealed,
}

impl StateMachine for RevealPhase {
    fn can_transition_to(&self, target: &Self) -> bool {
        use RevealPhase::*;
        matches!(
            (self, target),
            (NotRevealed, EmployeeRevealed)
                | (EmployeeRevealed, BothRevealed)
                | (BothRevealed, NotRevealed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use RevealPhase::*;
        match self {
            NotRevealed => vec![EmployeeRevealed],
            EmployeeRevealed => vec![BothRevealed],
            BothRevealed => vec![NotRevealed],
        }
    }
}

impl fmt::Display for RevealPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RevealPhase::NotRevealed => "not revealed",
            RevealPhase::EmployeeRevealed => "employee revealed",
            RevealPhase::BothRevealed => "both revealed",
        };
        write!(f, "{}", s)
    }
}

/// Transient cursor of a live session. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealState {
    pub current_category_index: usize,
    pub phase: RevealPhase,
}

impl RevealState {
    pub fn employee_revealed(&self) -> bool {
        matches!(
            self.phase,
            RevealPhase::EmployeeRevealed | RevealPhase::BothRevealed
        )
    }

    pub fn manager_revealed(&self) -> bool {
        self.phase == RevealPhase::BothRevealed
    }
}

/// A rating as shown to the parties. Absent ratings show as `Unknown`,
/// never as a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RatingView {
    Rated { value: Rating },
    Unknown,
}

impl From<Option<Rating>> for RatingView {
    fn from(rating: Option<Rating>) -> Self {
        match rating {
            Some(value) => RatingView::Rated { value },
            None => RatingView::Unknown,
        }
    }
}

impl fmt::Display for RatingView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RatingView::Rated { value } => write!(f, "{}/5", value),
            RatingView::Unknown => write!(f, "?"),
        }
    }
}

/// One party's disclosed rating and comment for a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealedEntry {
    pub role: PartyRole,
    pub name: String,
    pub rating: RatingView,
    pub comment: Option<String>,
}

impl RevealedEntry {
    pub fn from_submission(role: PartyRole, submission: &PartySubmission, category: &str) -> Self {
        Self {
            role,
            name: submission.name.clone(),
            rating: submission.rating(category).into(),
            comment: submission.comment(category).map(str::to_string),
        }
    }

    fn rating_value(&self) -> Option<Rating> {
        match self.rating {
            RatingView::Rated { value } => Some(value),
            RatingView::Unknown => None,
        }
    }
}

/// Both parties' entries for a category and how far apart they are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryComparison {
    pub category: Category,
    pub employee: RevealedEntry,
    pub manager: RevealedEntry,
    pub difference: Option<u8>,
    pub alignment: Alignment,
}

impl CategoryComparison {
    pub fn new(category: Category, employee: RevealedEntry, manager: RevealedEntry) -> Self {
        let (e, m) = (employee.rating_value(), manager.rating_value());
        Self {
            category,
            difference: difference(e, m),
            alignment: distance(e, m),
            employee,
            manager,
        }
    }
}
