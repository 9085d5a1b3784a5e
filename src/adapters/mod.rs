//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `storage` - In-memory, local file and failover stores
//! - `postgres` - PostgreSQL stores (sqlx)
//! - `supabase` - Hosted PostgREST stores (reqwest)
//! - `document` - Markdown/HTML report rendering
//! - `http` - REST API (axum)

pub mod document;
pub mod http;
pub mod postgres;
pub mod storage;
pub mod supabase;

pub use document::MarkdownReportRenderer;
pub use storage::{
    FailoverPreparationStore, FailoverSessionStore, FilePreparationStore, FileSessionStore,
    InMemoryPreparationStore, InMemorySessionStore,
};
