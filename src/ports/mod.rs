//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `PreparationStore` - Per-role preparation submissions, keyed by pairing
//! - `SessionStore` - Completed session records
//! - `StoreError` - Failure taxonomy shared by both
//!
//! ## Rendering Ports
//!
//! - `ReportRenderer` - Export of a finished session report

mod preparation_store;
mod report_renderer;
mod session_store;
mod store_error;

pub use preparation_store::PreparationStore;
pub use report_renderer::{ExportFormat, RenderError, RenderedReport, ReportRenderer};
pub use session_store::{sort_newest_first, SessionStore};
pub use store_error::{StoreAttempt, StoreError};
