//! Report Renderer Port - Turns a session report into an export document.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::report::SessionReport;

/// Port for rendering a [`SessionReport`].
///
/// Renderers only read the report; they never see the live engine.
pub trait ReportRenderer: Send + Sync {
    fn render(&self, report: &SessionReport, format: ExportFormat) -> Result<RenderedReport, RenderError>;
}

/// Export formats supported by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    #[default]
    Markdown,
    Html,
}

impl ExportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "text/markdown; charset=utf-8",
            ExportFormat::Html => "text/html; charset=utf-8",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::Html => "html",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Markdown => write!(f, "markdown"),
            ExportFormat::Html => write!(f, "html"),
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            "html" | "htm" => Ok(ExportFormat::Html),
            _ => Err(RenderError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Rendered document with download metadata.
#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub content: String,
    pub content_type: &'static str,
    pub filename: String,
    pub format: ExportFormat,
}

impl RenderedReport {
    pub fn new(content: String, format: ExportFormat, report: &SessionReport) -> Self {
        Self {
            content,
            content_type: format.content_type(),
            filename: report.file_name(format.extension()),
            format,
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    #[error("Rendering failed: {0}")]
    Failed(String),
}

impl From<RenderError> for DomainError {
    fn from(err: RenderError) -> Self {
        match &err {
            RenderError::UnsupportedFormat(format) => {
                DomainError::new(ErrorCode::ValidationFailed, err.to_string())
                    .with_detail("format", format.clone())
            }
            RenderError::Failed(_) => DomainError::new(ErrorCode::InternalError, err.to_string()),
        }
    }
}
