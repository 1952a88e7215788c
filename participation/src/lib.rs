//! Participation tracker.
//!
//! Appends a denormalized record whenever a member is registered or casts a
//! ballot. Recording is best-effort: a failed write is logged and never fails
//! the operation that triggered it.

pub mod report;
pub mod tracker;

pub use report::{summarize, ParticipationSummary};
pub use tracker::{for_event, for_identity, record, record_ballot, record_registration};
