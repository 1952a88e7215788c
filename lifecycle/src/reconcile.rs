//! Date-driven reconciliation sweep.
//!
//! Forced transitions bypass the manual guards but stay monotonic: an event
//! past `end_date` is finalized, an event past `voting_closes_at` that is
//! still live is closed. Each write is conditional on the status the plan
//! was computed from, so overlapping sweeps apply every transition once.

use serde::Serialize;
use tracing::{error, info};
use verdict_store::EventStore;
use verdict_types::{Event, EventId, EventStatus, Timestamp};

use crate::error::LifecycleError;
use crate::transition::next_event_state;

/// Statuses the sweep looks at.
const SWEPT: [EventStatus; 2] = [EventStatus::Live, EventStatus::Closed];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ForcedReason {
    EventEnded,
    VotingClosed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedTransition {
    pub from: EventStatus,
    pub to: EventStatus,
    pub reason: ForcedReason,
}

/// The forced transition `event` is due for at `now`, if any.
pub fn plan_reconcile(event: &Event, now: Timestamp) -> Option<PlannedTransition> {
    if !SWEPT.contains(&event.status) {
        return None;
    }
    if event.end_date.is_some_and(|t| t.has_passed(now)) {
        return Some(PlannedTransition {
            from: event.status,
            to: EventStatus::Finalized,
            reason: ForcedReason::EventEnded,
        });
    }
    if event.status == EventStatus::Live && event.voting_closes_at.is_some_and(|t| t.has_passed(now)) {
        return Some(PlannedTransition {
            from: EventStatus::Live,
            to: EventStatus::Closed,
            reason: ForcedReason::VotingClosed,
        });
    }
    None
}

/// A forced transition this sweep actually wrote.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReconciledEvent {
    pub event: Event,
    pub from: EventStatus,
    pub to: EventStatus,
    pub reason: ForcedReason,
    /// This write locked submissions.
    pub locked_submissions: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReconcileFailure {
    pub event: EventId,
    pub error: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ReconcileReport {
    pub updated: Vec<ReconciledEvent>,
    /// Writes that failed; surfaced to operators, never retried here.
    pub failures: Vec<ReconcileFailure>,
}

/// Plan and conditionally apply the forced transition for one event.
///
/// Returns `None` when nothing was due or another sweep got there first.
pub fn reconcile_event<S: EventStore + ?Sized>(
    store: &S,
    event: &Event,
    now: Timestamp,
) -> Result<Option<ReconciledEvent>, LifecycleError> {
    let Some(plan) = plan_reconcile(event, now) else {
        return Ok(None);
    };
    let (next, locked_submissions) = next_event_state(event, plan.to);
    if !store.update_event_if_status(&next, plan.from)? {
        return Ok(None);
    }

    info!(
        event = %event.id,
        from = %plan.from,
        to = %plan.to,
        reason = ?plan.reason,
        locked_submissions,
        "forced status transition"
    );
    Ok(Some(ReconciledEvent {
        event: next,
        from: plan.from,
        to: plan.to,
        reason: plan.reason,
        locked_submissions,
    }))
}

/// Sweep one event, or every live/closed event when `only` is `None`.
pub fn reconcile_statuses<S: EventStore + ?Sized>(
    store: &S,
    only: Option<&EventId>,
    now: Timestamp,
) -> Result<ReconcileReport, LifecycleError> {
    let candidates = match only {
        Some(id) => vec![store.get_event(id)?],
        None => store.events_with_status(&SWEPT)?,
    };

    let mut report = ReconcileReport::default();
    for event in &candidates {
        match reconcile_event(store, event, now) {
            Ok(Some(done)) => report.updated.push(done),
            Ok(None) => {}
            Err(e) => {
                error!(event = %event.id, error = %e, "reconcile write failed");
                report.failures.push(ReconcileFailure {
                    event: event.id.clone(),
                    error: e.to_string(),
                });
            }
        }
    }
    Ok(report)
}
