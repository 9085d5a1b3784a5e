//! Markdown report renderer.
//!
//! Builds the session report as Markdown and, for HTML export, converts it
//! with pulldown-cmark (pure Rust, no external tools). User-supplied text is
//! escaped before it reaches the Markdown source, so names and comments can
//! neither break the table nor inject raw HTML.

use pulldown_cmark::{html, Options, Parser};
use std::fmt::Write;

use crate::domain::report::{format_average, format_rating, SessionReport, REPORT_TITLE};
use crate::ports::{ExportFormat, RenderError, RenderedReport, ReportRenderer};

/// Renders [`SessionReport`]s as Markdown or styled HTML.
#[derive(Debug, Clone)]
pub struct MarkdownReportRenderer {
    include_default_css: bool,
}

impl MarkdownReportRenderer {
    pub fn new() -> Self {
        Self {
            include_default_css: true,
        }
    }

    /// Disable default CSS styling for HTML output.
    pub fn without_default_css(mut self) -> Self {
        self.include_default_css = false;
        self
    }

    /// The Markdown source of a report.
    pub fn to_markdown(&self, report: &SessionReport) -> Result<String, RenderError> {
        build_markdown(report).map_err(|e| RenderError::Failed(e.to_string()))
    }

    pub fn to_html(&self, report: &SessionReport) -> Result<String, RenderError> {
        let markdown = self.to_markdown(report)?;
        let parser = Parser::new_ext(&markdown, Options::ENABLE_TABLES);
        let mut body = String::new();
        html::push_html(&mut body, parser);
        Ok(self.wrap_html(body, report))
    }

    fn wrap_html(&self, body: String, report: &SessionReport) -> String {
        let css = if self.include_default_css {
            DEFAULT_CSS
        } else {
            ""
        };
        let title = format!("{} - {}", REPORT_TITLE, report.employee_name);

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
{css}
    </style>
</head>
<body>
    <article class="catchup-report">
{body}
    </article>
</body>
</html>"#,
            title = html_escape(&title),
            css = css,
            body = body
        )
    }
}

impl Default for MarkdownReportRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportRenderer for MarkdownReportRenderer {
    fn render(&self, report: &SessionReport, format: ExportFormat) -> Result<RenderedReport, RenderError> {
        let content = match format {
            ExportFormat::Markdown => self.to_markdown(report)?,
            ExportFormat::Html => self.to_html(report)?,
        };
        Ok(RenderedReport::new(content, format, report))
    }
}

fn build_markdown(report: &SessionReport) -> Result<String, std::fmt::Error> {
    let employee = escape_markdown(&report.employee_name);
    let manager = escape_markdown(&report.manager_name);
    let mut out = String::new();

    writeln!(out, "# {}", REPORT_TITLE)?;
    writeln!(out)?;
    writeln!(out, "**Manager:** {}  ", manager)?;
    writeln!(out, "**Employee:** {}  ", employee)?;
    writeln!(out, "**Date:** {}", report.session_date.date_label())?;
    writeln!(out)?;

    writeln!(out, "## Ratings Summary")?;
    writeln!(out)?;
    writeln!(out, "| Category | {} | {} | Difference | Alignment |", employee, manager)?;
    writeln!(out, "|---|:---:|:---:|:---:|---|")?;
    for row in &report.rows {
        writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            escape_markdown(&row.category),
            format_rating(row.employee_rating),
            format_rating(row.manager_rating),
            row.difference.map_or_else(|| "N/A".to_string(), |d| d.to_string()),
            row.alignment.label()
        )?;
    }
    writeln!(out)?;

    writeln!(out, "## Overall Averages")?;
    writeln!(out)?;
    writeln!(out, "- **{} (employee):** {}", employee, format_average(report.employee_average))?;
    writeln!(out, "- **{} (manager):** {}", manager, format_average(report.manager_average))?;
    writeln!(
        out,
        "- **Overall alignment:** {} point difference",
        format_average(report.overall_gap())
    )?;
    writeln!(out)?;

    writeln!(out, "## Comments & Discussion")?;
    writeln!(out)?;
    if report.comments.is_empty() {
        writeln!(out, "No comments were provided.")?;
    }
    for entry in &report.comments {
        writeln!(out, "### {}", escape_markdown(&entry.category))?;
        writeln!(out)?;
        if let Some(comment) = &entry.employee {
            writeln!(out, "- *Employee:* {}", escape_markdown(comment))?;
        }
        if let Some(comment) = &entry.manager {
            writeln!(out, "- *Manager:* {}", escape_markdown(comment))?;
        }
        writeln!(out)?;
    }

    Ok(out)
}

/// Escapes Markdown punctuation and HTML-significant characters in
/// user-supplied text, and folds line breaks into spaces.
fn escape_markdown(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '\n' | '\r' => out.push(' '),
            '\\' | '`' | '*' | '_' | '[' | ']' | '|' | '#' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Default CSS for styled HTML output.
const DEFAULT_CSS: &str = r#"
body {
    font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
    color: #1f2937;
    max-width: 52rem;
    margin: 2rem auto;
    padding: 0 1rem;
    line-height: 1.5;
}
h1 { border-bottom: 2px solid #2563eb; padding-bottom: 0.5rem; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid #e5e7eb; padding: 0.5rem 0.75rem; }
th { background: #f3f4f6; }
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::category::Category;
    use crate::domain::foundation::{Rating, Timestamp};
    use crate::domain::preparation::PartySubmission;
    use crate::domain::session::SessionRecord;
    use std::collections::BTreeMap;

    fn report(employee_comment: &str) -> SessionReport {
        let mut employee_ratings = BTreeMap::new();
        employee_ratings.insert("A".to_string(), Rating::Satisfied);
        let mut manager_ratings = BTreeMap::new();
        manager_ratings.insert("A".to_string(), Rating::Neutral);
        let mut comments = BTreeMap::new();
        comments.insert("A".to_string(), employee_comment.to_string());

        let record = SessionRecord::new(
            "Max",
            "Eve",
            Timestamp::from_unix_secs(1_709_251_200),
            PartySubmission::new("Eve", "Max", employee_ratings, comments).unwrap(),
            PartySubmission::new("Max", "Eve", manager_ratings, BTreeMap::new()).unwrap(),
            vec![Category::new("A", "a"), Category::new("B", "b")],
        );
        SessionReport::from_record(&record)
    }

    #[test]
    fn markdown_contains_table_rows_and_averages() {
        let md = MarkdownReportRenderer::new().to_markdown(&report("fine")).unwrap();
        assert!(md.starts_with("# One-to-One Catch-up Report"));
        assert!(md.contains("| A | 4/5 | 3/5 | 1 | Close alignment |"));
        assert!(md.contains("| B | N/A | N/A | N/A | Not comparable |"));
        assert!(md.contains("- **Overall alignment:** 1.0 point difference"));
        assert!(md.contains("- *Employee:* fine"));
    }

    #[test]
    fn markdown_without_comments_says_so() {
        let md = MarkdownReportRenderer::new().to_markdown(&report("")).unwrap();
        assert!(md.contains("No comments were provided."));
    }

    #[test]
    fn html_escapes_user_text() {
        let html = MarkdownReportRenderer::new()
            .to_html(&report("<script>alert(1)</script>"))
            .unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("<table>"));
        assert!(html.contains("<title>One-to-One Catch-up Report - Eve</title>"));
    }

    #[test]
    fn pipe_in_comment_does_not_break_table() {
        assert_eq!(escape_markdown("a | b"), "a \\| b");
        assert_eq!(escape_markdown("line\nbreak"), "line break");
    }

    #[test]
    fn render_sets_download_metadata() {
        let rendered = MarkdownReportRenderer::new()
            .render(&report("x"), ExportFormat::Html)
            .unwrap();
        assert_eq!(rendered.filename, "catchup_Eve_2024-03-01.html");
        assert!(rendered.content_type.starts_with("text/html"));
    }

    #[test]
    fn without_default_css_omits_styles() {
        let html = MarkdownReportRenderer::new()
            .without_default_css()
            .to_html(&report("x"))
            .unwrap();
        assert!(!html.contains("border-collapse"));
    }
}
