//! PostgreSQL adapters - Database implementations of the store ports.
//!
//! - `PostgresPreparationStore` - Upserts submissions keyed by (pairing, role)
//! - `PostgresSessionStore` - Completed session records
//! - `ensure_schema` - Creates both tables on startup

mod preparation_store;
mod schema;
mod session_store;

pub use preparation_store::PostgresPreparationStore;
pub use schema::ensure_schema;
pub use session_store::PostgresSessionStore;
