//! Manual status transitions.

use serde::Serialize;
use tracing::{debug, info};
use verdict_store::EventStore;
use verdict_types::{Event, EventId, EventStatus, Timestamp};

use crate::error::{LifecycleError, TransitionDenied, TransitionGuard};

/// Decide whether a manual move from `current` to `requested` is legal.
///
/// Guards, in order:
/// - a finalized event never changes again;
/// - once `voting_closes_at` has passed, only `closed`/`finalized` are allowed;
/// - once `end_date` has passed, only `finalized` is allowed.
///
/// Anything else is honored, including moves back to an earlier status (the
/// administrative override).
pub fn check_transition(
    current: EventStatus,
    requested: EventStatus,
    now: Timestamp,
    voting_closes_at: Option<Timestamp>,
    end_date: Option<Timestamp>,
) -> Result<(), TransitionDenied> {
    let deny = |guard| {
        Err(TransitionDenied {
            from: current,
            to: requested,
            guard,
        })
    };

    if current == EventStatus::Finalized {
        return deny(TransitionGuard::Finalized);
    }
    if voting_closes_at.is_some_and(|t| t.has_passed(now))
        && matches!(requested, EventStatus::Live | EventStatus::Draft)
    {
        return deny(TransitionGuard::VotingClosed);
    }
    if end_date.is_some_and(|t| t.has_passed(now)) && requested != EventStatus::Finalized {
        return deny(TransitionGuard::EventEnded);
    }
    Ok(())
}

/// The event as it looks after entering `status`.
///
/// Entering `closed`/`finalized` locks submissions unless they already are;
/// the returned flag is `true` only for the write that performs the lock.
/// Moving back to `draft`/`live` unlocks.
pub fn next_event_state(event: &Event, status: EventStatus) -> (Event, bool) {
    let mut next = event.clone();
    next.status = status;
    let locks_now = status.locks_submissions() && !event.submissions_locked;
    next.submissions_locked = status.locks_submissions();
    (next, locks_now)
}

/// Outcome of a successful manual transition.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TransitionApplied {
    pub event: Event,
    pub previous: EventStatus,
    /// This transition locked submissions.
    pub locked_submissions: bool,
}

impl TransitionApplied {
    pub fn finalized(&self) -> bool {
        self.previous != EventStatus::Finalized && self.event.status == EventStatus::Finalized
    }
}

/// Check and apply a manual transition.
pub fn apply_transition<S: EventStore + ?Sized>(
    store: &S,
    event_id: &EventId,
    requested: EventStatus,
    now: Timestamp,
) -> Result<TransitionApplied, LifecycleError> {
    let event = store.get_event(event_id)?;
    check_transition(
        event.status,
        requested,
        now,
        event.voting_closes_at,
        event.end_date,
    )?;

    if event.status == requested {
        debug!(event = %event_id, status = %requested, "transition is a no-op");
        return Ok(TransitionApplied {
            previous: event.status,
            event,
            locked_submissions: false,
        });
    }

    let (next, locked_submissions) = next_event_state(&event, requested);
    if !store.update_event_if_status(&next, event.status)? {
        return Err(LifecycleError::Conflict {
            event: event_id.clone(),
            expected: event.status,
        });
    }

    info!(
        event = %event_id,
        from = %event.status,
        to = %requested,
        locked_submissions,
        "status transition applied"
    );
    Ok(TransitionApplied {
        event: next,
        previous: event.status,
        locked_submissions,
    })
}
