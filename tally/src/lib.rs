//! Vote submission validator and tally engine.
//!
//! - [`validate_ballot`]: the ordered precondition checks a ballot must pass,
//!   as a pure function of poll, event, entries and member state.
//! - [`submit_ballot`]: loads that state, validates, and writes through the
//!   store's atomic `cast_ballot`.
//! - [`compute_tally`]: recomputes the ranked result set from a consistent
//!   snapshot of every persisted ballot. There is no running total.

pub mod curve;
pub mod engine;
pub mod error;
pub mod quorum;
pub mod rules;
pub mod submit;
pub mod validator;

#[cfg(test)]
mod testutil;

pub use curve::{max_rank, points_for_rank, validate_curve, CurveError};
pub use engine::{ballot_points, compute_tally, EntryPoints, EntryResult, Tally};
pub use error::{RejectReason, ShapeError, TallyError, WindowViolation};
pub use quorum::{quorum_warnings, TallyWarning};
pub use rules::{resolve_rank_curve, validate_poll, PollRuleError, PollRules};
pub use submit::{submit_ballot, BallotRequest, SubmitOutcome};
pub use validator::{validate_ballot, ValidationContext, Verdict};
