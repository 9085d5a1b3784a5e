//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (rating scale, ids, roles, errors)
//! - `category` - The ordered category registry
//! - `preparation` - Party submissions and pairing identity
//! - `session` - Reveal state machine and completed session records
//! - `history` - Grouping and trend aggregation over past sessions
//! - `report` - Renderer-facing session digest

pub mod category;
pub mod foundation;
pub mod history;
pub mod preparation;
pub mod report;
pub mod session;
