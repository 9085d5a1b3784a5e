//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod history;
pub mod preparation;
pub mod sessions;

pub use history::{
    CategoryTrend, CategoryTrendQuery, GetCategoryTrendHandler, GetHistoryHandler, PairOverview,
};
pub use preparation::{
    GetPreparationHandler, GetPreparationQuery, SubmitPreparationCommand,
    SubmitPreparationHandler, SubmitPreparationResult,
};
pub use sessions::{ListSessionsHandler, ListSessionsQuery, RecordSessionCommand, RecordSessionHandler};
