//! Tie resolver.
//!
//! [`detect_ties`] finds exact `total_score` equality at a cutoff of
//! interest; [`create_tie_breaker`] spawns a narrower poll over the tied
//! entries once an organizer confirms.

pub mod create;
pub mod detect;
pub mod error;

pub use create::{create_tie_breaker, TieBreakRequest, TieBreaker};
pub use detect::{all_tie_groups, detect_ties, TieGroup};
pub use error::TieBreakError;
