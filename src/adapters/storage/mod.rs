//! Storage Adapters
//!
//! Implementations of the `PreparationStore` and `SessionStore` ports that
//! do not need a database server, plus the failover chain that combines
//! any of them.
//!
//! ## Available Adapters
//!
//! - **InMemory{Preparation,Session}Store** - In memory (testing/development)
//! - **File{Preparation,Session}Store** - YAML files on disk, the local fallback
//! - **Failover{Preparation,Session}Store** - Ordered chain of stores
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{FailoverSessionStore, FileSessionStore};
//!
//! let sessions = FailoverSessionStore::new(vec![
//!     Arc::new(postgres_sessions),
//!     Arc::new(FileSessionStore::new("./data")),
//! ]);
//! ```

mod failover_store;
mod file_store;
mod in_memory_store;

pub use failover_store::{
    FailoverPreparationStore, FailoverSessionStore, FallbackObserver, NoOpFallbackObserver,
    StoreFallback,
};
pub use file_store::{FilePreparationStore, FileSessionStore};
pub use in_memory_store::{InMemoryPreparationStore, InMemorySessionStore};
