//! Session report model.
//!
//! A [`SessionReport`] is the renderer-facing digest of a completed session:
//! one row per category in the record's frozen order, the per-role averages,
//! and the comments worth discussing. Renderers turn it into text; they never
//! read the record directly.

use serde::Serialize;

use crate::domain::foundation::{rating, Alignment, PartyRole, Rating, SessionRecordId, Timestamp};
use crate::domain::history::session_average;
use crate::domain::session::SessionRecord;

/// Title printed at the top of every export.
pub const REPORT_TITLE: &str = "One-to-One Catch-up Report";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub category: String,
    pub employee_rating: Option<Rating>,
    pub manager_rating: Option<Rating>,
    /// Absent unless both sides rated the category.
    pub difference: Option<u8>,
    pub alignment: Alignment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentEntry {
    pub category: String,
    pub employee: Option<String>,
    pub manager: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub record_id: SessionRecordId,
    pub manager_name: String,
    pub employee_name: String,
    pub session_date: Timestamp,
    pub rows: Vec<ReportRow>,
    pub employee_average: f64,
    pub manager_average: f64,
    /// Only categories where at least one side left a non-empty comment.
    pub comments: Vec<CommentEntry>,
}

impl SessionReport {
    pub fn from_record(record: &SessionRecord) -> Self {
        let rows = record
            .category_order()
            .iter()
            .map(|category| {
                let employee = record.rating(PartyRole::Employee, &category.name);
                let manager = record.rating(PartyRole::Manager, &category.name);
                ReportRow {
                    category: category.name.clone(),
                    employee_rating: employee,
                    manager_rating: manager,
                    difference: rating::difference(employee, manager),
                    alignment: rating::distance(employee, manager),
                }
            })
            .collect();

        let comments = record
            .category_order()
            .iter()
            .filter_map(|category| {
                let employee = record
                    .submission(PartyRole::Employee)
                    .comment(&category.name)
                    .map(str::to_string);
                let manager = record
                    .submission(PartyRole::Manager)
                    .comment(&category.name)
                    .map(str::to_string);
                (employee.is_some() || manager.is_some()).then(|| CommentEntry {
                    category: category.name.clone(),
                    employee,
                    manager,
                })
            })
            .collect();

        Self {
            record_id: *record.id(),
            manager_name: record.manager_name().to_string(),
            employee_name: record.employee_name().to_string(),
            session_date: *record.session_date(),
            rows,
            employee_average: session_average(record, PartyRole::Employee),
            manager_average: session_average(record, PartyRole::Manager),
            comments,
        }
    }

    /// Absolute difference between the two averages.
    pub fn overall_gap(&self) -> f64 {
        (self.employee_average - self.manager_average).abs()
    }

    /// Export file name, e.g. `catchup_Eve_2024-03-01.md`.
    pub fn file_name(&self, extension: &str) -> String {
        let employee: String = self
            .employee_name
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        format!(
            "catchup_{}_{}.{}",
            employee,
            self.session_date.date_label(),
            extension
        )
    }
}

/// One-decimal formatting used for every average in reports.
pub fn format_average(value: f64) -> String {
    format!("{:.1}", value)
}

/// `n/5`, or `N/A` for an absent rating.
pub fn format_rating(rating: Option<Rating>) -> String {
    rating.map_or_else(|| "N/A".to_string(), |r| format!("{}/5", r))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::category::Category;
    use crate::domain::preparation::PartySubmission;
    use std::collections::BTreeMap;

    fn submission(name: &str, partner: &str, ratings: &[(&str, u8)], comments: &[(&str, &str)]) -> PartySubmission {
        let ratings = ratings
            .iter()
            .map(|(c, v)| (c.to_string(), Rating::try_from_u8(*v).unwrap()))
            .collect();
        let comments = comments
            .iter()
            .map(|(c, t)| (c.to_string(), t.to_string()))
            .collect::<BTreeMap<_, _>>();
        PartySubmission::new(name, partner, ratings, comments).unwrap()
    }

    fn report() -> SessionReport {
        let record = SessionRecord::new(
            "Max",
            "Eve Smith",
            Timestamp::from_unix_secs(1_709_251_200), // 2024-03-01
            submission("Eve Smith", "Max", &[("A", 4), ("B", 2)], &[("A", ""), ("B", "stretched")]),
            submission("Max", "Eve Smith", &[("A", 4), ("B", 5)], &[("C", "")]),
            vec![
                Category::new("A", "a"),
                Category::new("B", "b"),
                Category::new("C", "c"),
            ],
        );
        SessionReport::from_record(&record)
    }

    #[test]
    fn rows_follow_category_order_with_differences() {
        let report = report();
        let names: Vec<_> = report.rows.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(report.rows[0].difference, Some(0));
        assert_eq!(report.rows[1].difference, Some(3));
        assert_eq!(report.rows[1].alignment, Alignment::Large);
        assert_eq!(report.rows[2].difference, None);
        assert_eq!(report.rows[2].alignment, Alignment::Incomparable);
    }

    #[test]
    fn averages_and_gap_ignore_unrated_categories() {
        let report = report();
        assert_eq!(report.employee_average, 3.0);
        assert_eq!(report.manager_average, 4.5);
        assert_eq!(format_average(report.overall_gap()), "1.5");
    }

    #[test]
    fn comments_skip_empty_entries() {
        let report = report();
        assert_eq!(report.comments.len(), 1);
        assert_eq!(report.comments[0].category, "B");
        assert_eq!(report.comments[0].employee.as_deref(), Some("stretched"));
        assert_eq!(report.comments[0].manager, None);
    }

    #[test]
    fn file_name_uses_employee_and_date() {
        assert_eq!(report().file_name("md"), "catchup_Eve_Smith_2024-03-01.md");
    }

    #[test]
    fn format_rating_marks_absent_as_na() {
        assert_eq!(format_rating(None), "N/A");
        assert_eq!(format_rating(Some(Rating::Neutral)), "3/5");
    }
}
