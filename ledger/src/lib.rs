//! Integrity ledger.
//!
//! A commitment is the Blake2b digest of a payload's canonical JSON, stored
//! next to the canonical text itself. One row exists per `(event, type)`;
//! committing again supersedes it. [`verify`] recomputes the digest of the
//! text as currently stored, so any edit that bypassed [`commit`] shows up as
//! a mismatch. Mismatches are reported, never repaired.

pub mod commit;
pub mod error;
pub mod verify;

pub use commit::{anchor, commit};
pub use error::LedgerError;
pub use verify::{require_valid, verify, verify_all, EventVerification, Verification};
