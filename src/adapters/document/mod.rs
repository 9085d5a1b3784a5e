//! Document adapters - Report rendering.
//!
//! - `MarkdownReportRenderer` - Markdown source and pulldown-cmark HTML export

mod markdown_report_renderer;

pub use markdown_report_renderer::MarkdownReportRenderer;
