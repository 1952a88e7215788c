//! Event lifecycle: `draft → live → closed → finalized`.
//!
//! Guard logic ([`check_transition`], [`plan_reconcile`]) is pure. The
//! appliers write through [`EventStore::update_event_if_status`], so every
//! transition is a single conditional update keyed on the status it was
//! computed from and a repeated or concurrent application is a no-op.
//!
//! [`EventStore::update_event_if_status`]: verdict_store::EventStore::update_event_if_status

pub mod error;
pub mod reconcile;
pub mod transition;

pub use error::{LifecycleError, TransitionDenied, TransitionGuard};
pub use reconcile::{
    plan_reconcile, reconcile_event, reconcile_statuses, ForcedReason, PlannedTransition,
    ReconcileFailure, ReconcileReport, ReconciledEvent,
};
pub use transition::{apply_transition, check_transition, next_event_state, TransitionApplied};
