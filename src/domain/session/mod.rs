//! Reveal session module.
//!
//! A live session walks both parties through the category registry, one
//! category at a time, revealing the employee's rating before the manager's.
//! Completing the walk produces a [`SessionRecord`], the unit of history.
//!
//! - [`SessionEngine`] - the reveal state machine
//! - [`RevealPhase`] - per-category reveal progress
//! - [`SessionRecord`] - immutable completed session
//! - [`SessionError`] - usage faults and store failures

mod engine;
mod errors;
mod record;
mod reveal;

pub use engine::{ActiveView, AdvanceOutcome, SessionEngine, SessionSnapshot};
pub use errors::SessionError;
pub use record::SessionRecord;
pub use reveal::{CategoryComparison, RatingView, RevealPhase, RevealState, RevealedEntry};
