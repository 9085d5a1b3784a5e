//! Supabase adapters - Store ports over the PostgREST API.
//!
//! - `SupabaseClient` - Shared HTTP client carrying the anon key
//! - `SupabasePreparationStore` - Upserts with `resolution=merge-duplicates`
//! - `SupabaseSessionStore` - Listing ordered by `session_date.desc`

mod client;
mod preparation_store;
mod session_store;

pub use client::{SupabaseClient, SupabaseRestConfig};
pub use preparation_store::SupabasePreparationStore;
pub use session_store::SupabaseSessionStore;
