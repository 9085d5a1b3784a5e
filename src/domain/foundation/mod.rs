//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, enums, and error types
//! that form the vocabulary of the catch-up domain.

mod errors;
mod ids;
pub mod rating;
mod role;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{LiveSessionId, SessionRecordId};
pub use rating::{Alignment, Rating};
pub use role::PartyRole;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
