//! Application layer - Commands, Queries, and Handlers.
//!
//! Orchestrates domain operations over the store ports. Write paths
//! (submitting preparations, recording sessions) and read paths (history,
//! trends) are separate handlers; live reveal sessions are owned by
//! [`LiveSessions`].

pub mod handlers;
pub mod live_sessions;

pub use handlers::{
    CategoryTrend, CategoryTrendQuery, GetCategoryTrendHandler, GetHistoryHandler,
    GetPreparationHandler, GetPreparationQuery, ListSessionsHandler, ListSessionsQuery,
    PairOverview, RecordSessionCommand, RecordSessionHandler, SubmitPreparationCommand,
    SubmitPreparationHandler, SubmitPreparationResult,
};
pub use live_sessions::{LiveSessions, StartLiveSessionCommand};
